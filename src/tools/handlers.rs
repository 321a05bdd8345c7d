//! The eight lookup functions. Each one is a pure read of the knowledge base.

use chrono::NaiveDate;

use super::types::{
    CertificationResult, CompletionRequirements, ContactMethods, CourseDetail, CourseInfoResult,
    CoursePricing, CourseSummary, Discounts, EnrollmentCourse, EnrollmentResult, FaqResult,
    PaymentResult, PrerequisiteResult, ScheduleDetail, ScheduleResult, SupportResult, ToolStatus,
};
use crate::constants::{SUPPORT_EMAIL, SUPPORT_PHONE};
use crate::knowledge::{KnowledgeBase, PolicyKind};

const SCHEDULE_DETAILS: &str =
    "Classes are held twice weekly (2 hours each), with both live and recorded sessions available.";
const SCHEDULE_NOTE: &str = "All times are flexible with recorded sessions available 24/7";
const NO_FAQ_MESSAGE: &str = "I couldn't find specific FAQs matching your question, but I can \
help you with course information, schedules, payments, or support services. Please feel free to ask!";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Course details by id or name; the whole catalog when nothing matches
pub fn get_course_information(kb: &KnowledgeBase, query: &str) -> CourseInfoResult {
    match kb.find_course(query) {
        Some(course) => CourseInfoResult::Success {
            course: CourseDetail::from(course),
        },
        None => CourseInfoResult::MultipleCourses {
            message: "I found multiple courses that might interest you. Here are all available courses:"
                .to_string(),
            courses: kb.all_courses().iter().map(CourseSummary::from).collect(),
        },
    }
}

/// Schedule for one course, or the general schedule with every course's dates
pub fn get_schedule_and_timing(
    kb: &KnowledgeBase,
    course_query: &str,
    today: NaiveDate,
) -> ScheduleResult {
    if !course_query.trim().is_empty() {
        if let Some(course) = kb.find_course(course_query) {
            return ScheduleResult {
                status: ToolStatus::Success,
                detail: ScheduleDetail::Course {
                    course_name: course.name.clone(),
                    duration: course.duration_label(),
                    upcoming_start_dates: course.start_dates.clone(),
                    next_start_date: kb.next_start_date(&course.id, today),
                    schedule_details: SCHEDULE_DETAILS.to_string(),
                },
            };
        }
    }

    ScheduleResult {
        status: ToolStatus::Success,
        detail: ScheduleDetail::General {
            general_schedule: kb.policy(PolicyKind::Schedule).details.clone(),
            upcoming_courses: kb.upcoming_start_dates(None),
            note: SCHEDULE_NOTE.to_string(),
        },
    }
}

/// Payment policy, methods and discounts, plus pricing when the course resolves
pub fn get_payment_information(kb: &KnowledgeBase, course_query: &str) -> PaymentResult {
    let course_pricing = if course_query.trim().is_empty() {
        None
    } else {
        kb.find_course(course_query).map(CoursePricing::from)
    };

    PaymentResult {
        status: ToolStatus::Success,
        payment_options: kb.policy(PolicyKind::Payment).details.clone(),
        payment_methods: strings(&["Credit Card", "PayPal", "Bank Transfer"]),
        discounts: Discounts {
            full_payment: "10% discount for full upfront payment".to_string(),
            early_bird: "5% discount for enrollment 30 days before start date".to_string(),
        },
        course_pricing,
    }
}

pub fn get_support_services(kb: &KnowledgeBase) -> SupportResult {
    SupportResult {
        status: ToolStatus::Success,
        support_services: kb.policy(PolicyKind::Support).details.clone(),
        technical_requirements: kb.policy(PolicyKind::Technical).details.clone(),
        contact_methods: ContactMethods {
            chat: "24/7 live chat support".to_string(),
            email: SUPPORT_EMAIL.to_string(),
            phone: SUPPORT_PHONE.to_string(),
            office_hours: "Weekly with instructors".to_string(),
        },
    }
}

pub fn get_certification_info(kb: &KnowledgeBase) -> CertificationResult {
    CertificationResult {
        status: ToolStatus::Success,
        certification_details: kb.policy(PolicyKind::Certification).details.clone(),
        completion_requirements: CompletionRequirements {
            attendance: "Complete 80% of course modules".to_string(),
            assignments: "Submit all required assignments".to_string(),
            final_project: "Complete capstone project with passing grade".to_string(),
            participation: "Active participation in discussions (recommended)".to_string(),
        },
        certificate_benefits: strings(&[
            "Industry-recognized completion certificate",
            "Digital badges for LinkedIn and portfolios",
            "Transcript available for university credit transfer",
            "Access to alumni network and job placement services",
        ]),
    }
}

pub fn search_faqs(kb: &KnowledgeBase, question: &str) -> FaqResult {
    let matching: Vec<_> = kb.search_faqs(question).into_iter().cloned().collect();
    if matching.is_empty() {
        return FaqResult::NoMatches {
            message: NO_FAQ_MESSAGE.to_string(),
        };
    }
    FaqResult::Success {
        count: matching.len(),
        matching_faqs: matching,
    }
}

pub fn get_enrollment_process(kb: &KnowledgeBase, course_query: &str) -> EnrollmentResult {
    let course_specific = if course_query.trim().is_empty() {
        None
    } else {
        kb.find_course(course_query).map(EnrollmentCourse::from)
    };

    EnrollmentResult {
        status: ToolStatus::Success,
        enrollment_steps: strings(&[
            "Browse course catalog and select your desired course",
            "Check prerequisites and ensure you meet requirements",
            "Choose your preferred start date",
            "Complete the online enrollment form",
            "Select payment option and complete payment",
            "Receive confirmation email with access credentials",
            "Join the pre-course orientation session",
            "Begin your learning journey!",
        ]),
        required_information: strings(&[
            "Full name and contact details",
            "Educational background",
            "Payment information",
            "Learning goals and expectations",
        ]),
        processing_time:
            "Instant approval for most courses, 24-48 hours for courses with prerequisites"
                .to_string(),
        course_specific,
    }
}

pub fn check_prerequisites(
    kb: &KnowledgeBase,
    course_query: &str,
    student_background: &str,
) -> PrerequisiteResult {
    let Some(course) = kb.find_course(course_query) else {
        return PrerequisiteResult::CourseNotFound {
            message: format!(
                "I couldn't find a course matching '{}'. Please check the course name or ID.",
                course_query
            ),
        };
    };

    let mut recommendations = Vec::new();
    match course.prerequisites.first() {
        Some(first) => {
            if first.contains("Python") {
                recommendations.push(
                    "Consider taking 'Python Programming Fundamentals' first if you're new to programming"
                        .to_string(),
                );
            }
            recommendations.push("Review prerequisite topics before starting the course".to_string());
            recommendations.push("Contact support if you're unsure about your readiness".to_string());
        }
        None => recommendations
            .push("This course is designed for beginners - no prior experience required!".to_string()),
    }

    let background = student_background.trim();
    PrerequisiteResult::Success {
        course_name: course.name.clone(),
        prerequisites: PrerequisiteResult::beginner_prerequisites(course),
        recommendations,
        student_background: (!background.is_empty()).then(|| background.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::embedded().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_course_information_found() {
        let result = get_course_information(&kb(), "py101");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["course"]["name"], "Python Programming Fundamentals");
        assert_eq!(value["course"]["price"], "$299.99");
        assert_eq!(value["course"]["duration"], "8 weeks");
        assert_eq!(value["course"]["prerequisites"], json!(["None"]));
        assert_eq!(value["course"]["start_dates"][0], "2025-02-15");
    }

    #[test]
    fn test_course_information_by_name_fragment() {
        match get_course_information(&kb(), "Data Science") {
            CourseInfoResult::Success { course } => assert_eq!(course.id, "ds201"),
            other => panic!("expected a course, got {other:?}"),
        }
    }

    #[test]
    fn test_course_information_lists_catalog_when_unknown() {
        let value = serde_json::to_value(get_course_information(&kb(), "underwater basket weaving"))
            .unwrap();
        assert_eq!(value["status"], "multiple_courses");
        assert_eq!(value["courses"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_schedule_for_course() {
        let result = get_schedule_and_timing(&kb(), "ai101", date("2025-03-01"));
        match result.detail {
            ScheduleDetail::Course {
                course_name,
                next_start_date,
                upcoming_start_dates,
                ..
            } => {
                assert_eq!(course_name, "Introduction to Artificial Intelligence");
                assert_eq!(next_start_date, Some(date("2025-04-01")));
                assert_eq!(upcoming_start_dates.len(), 3);
            }
            other => panic!("expected course schedule, got {other:?}"),
        }
    }

    #[test]
    fn test_schedule_general_when_no_course() {
        let value =
            serde_json::to_value(get_schedule_and_timing(&kb(), "", date("2025-01-01"))).unwrap();
        assert_eq!(value["status"], "success");
        let courses: Vec<&str> = value["upcoming_courses"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            courses,
            vec![
                "Python Programming Fundamentals",
                "Introduction to Artificial Intelligence",
                "Data Science and Analytics",
            ]
        );
        assert!(value.get("course_name").is_none());
    }

    #[test]
    fn test_payment_pricing_and_installments() {
        let result = get_payment_information(&kb(), "ds201");
        let pricing = result.course_pricing.unwrap();
        assert_eq!(pricing.full_price, "$449.99");
        assert_eq!(pricing.discounted_price, "$404.99");
        assert!(pricing.installment_available);
        assert_eq!(pricing.monthly_payment, "$150.00 (3 months)");

        let cheap = get_payment_information(&kb(), "python").course_pricing.unwrap();
        assert!(!cheap.installment_available);
        assert_eq!(cheap.monthly_payment, "Not available");
    }

    #[test]
    fn test_payment_without_course_omits_pricing() {
        let value = serde_json::to_value(get_payment_information(&kb(), "")).unwrap();
        assert!(value.get("course_pricing").is_none());
        assert_eq!(value["payment_methods"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_support_and_certification() {
        let support = get_support_services(&kb());
        assert_eq!(support.contact_methods.email, "support@scoreazy.edu");
        assert!(!support.technical_requirements.is_empty());

        let cert = get_certification_info(&kb());
        assert_eq!(cert.certificate_benefits.len(), 4);
    }

    #[test]
    fn test_search_faqs() {
        match search_faqs(&kb(), "refund") {
            FaqResult::Success { count, matching_faqs } => {
                assert_eq!(count, matching_faqs.len());
                assert!(count >= 1);
            }
            other => panic!("expected matches, got {other:?}"),
        }
        let value = serde_json::to_value(search_faqs(&kb(), "quantum teleportation")).unwrap();
        assert_eq!(value["status"], "no_matches");
    }

    #[test]
    fn test_enrollment_course_specific() {
        let result = get_enrollment_process(&kb(), "ai101");
        assert_eq!(result.enrollment_steps.len(), 8);
        let specific = result.course_specific.unwrap();
        assert_eq!(specific.prerequisites, vec!["Basic Python knowledge".to_string()]);
        assert_eq!(specific.price, "$599.99");

        assert!(get_enrollment_process(&kb(), "").course_specific.is_none());
    }

    #[test]
    fn test_prerequisites_recommendations() {
        match check_prerequisites(&kb(), "ai101", "  I know some Java ") {
            PrerequisiteResult::Success {
                recommendations,
                student_background,
                ..
            } => {
                assert_eq!(recommendations.len(), 3);
                assert!(recommendations[0].contains("Python Programming Fundamentals"));
                assert_eq!(student_background.as_deref(), Some("I know some Java"));
            }
            other => panic!("expected success, got {other:?}"),
        }

        match check_prerequisites(&kb(), "py101", "") {
            PrerequisiteResult::Success {
                prerequisites,
                recommendations,
                student_background,
                ..
            } => {
                assert_eq!(prerequisites, vec!["None - This is a beginner-friendly course"]);
                assert_eq!(recommendations.len(), 1);
                assert!(student_background.is_none());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_prerequisites_unknown_course() {
        let value = serde_json::to_value(check_prerequisites(&kb(), "cooking", "")).unwrap();
        assert_eq!(value["status"], "course_not_found");
        assert!(value["message"].as_str().unwrap().contains("cooking"));
    }
}
