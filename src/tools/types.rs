use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::knowledge::{Course, Faq};

/// Outcome tag carried by every tool result as `"status"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    MultipleCourses,
    NoMatches,
    CourseNotFound,
}

/// Dollar amount with two decimals, e.g. `$299.99`
pub(crate) fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Prerequisites as shown to students; an empty list reads as "None"
fn prerequisites_or(course: &Course, none: &str) -> Vec<String> {
    if course.prerequisites.is_empty() {
        vec![none.to_string()]
    } else {
        course.prerequisites.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDetail {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub price: String,
    pub instructor: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    pub modules: Vec<String>,
    pub start_dates: Vec<NaiveDate>,
}

impl From<&Course> for CourseDetail {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            duration: course.duration_label(),
            price: money(course.price),
            instructor: course.instructor.clone(),
            description: course.description.clone(),
            prerequisites: prerequisites_or(course, "None"),
            modules: course.modules.clone(),
            start_dates: course.start_dates.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub duration: String,
    pub price: String,
    pub instructor: String,
    pub description: String,
    pub start_dates: Vec<NaiveDate>,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            duration: course.duration_label(),
            price: money(course.price),
            instructor: course.instructor.clone(),
            description: course.description.clone(),
            start_dates: course.start_dates.clone(),
        }
    }
}

/// `get_course_information`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CourseInfoResult {
    Success {
        course: CourseDetail,
    },
    MultipleCourses {
        message: String,
        courses: Vec<CourseSummary>,
    },
}

/// `get_schedule_and_timing`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    pub status: ToolStatus,
    #[serde(flatten)]
    pub detail: ScheduleDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScheduleDetail {
    Course {
        course_name: String,
        duration: String,
        upcoming_start_dates: Vec<NaiveDate>,
        /// First start date on or after today, if any is left
        next_start_date: Option<NaiveDate>,
        schedule_details: String,
    },
    General {
        general_schedule: Vec<String>,
        /// Serialized as an object keyed by course name, in catalog order
        #[serde(serialize_with = "catalog_ordered")]
        upcoming_courses: Vec<(String, Vec<NaiveDate>)>,
        note: String,
    },
}

fn catalog_ordered<S: Serializer>(
    courses: &[(String, Vec<NaiveDate>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(courses.iter().map(|(name, dates)| (name, dates)))
}

/// `get_payment_information`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentResult {
    pub status: ToolStatus,
    pub payment_options: Vec<String>,
    pub payment_methods: Vec<String>,
    pub discounts: Discounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_pricing: Option<CoursePricing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discounts {
    pub full_payment: String,
    pub early_bird: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePricing {
    pub course_name: String,
    pub full_price: String,
    pub discounted_price: String,
    pub installment_available: bool,
    pub monthly_payment: String,
}

impl From<&Course> for CoursePricing {
    fn from(course: &Course) -> Self {
        let installment_available = course.price > INSTALLMENT_THRESHOLD;
        let monthly_payment = if installment_available {
            format!(
                "{} ({} months)",
                money(course.price / INSTALLMENT_MONTHS as f64),
                INSTALLMENT_MONTHS
            )
        } else {
            "Not available".to_string()
        };
        Self {
            course_name: course.name.clone(),
            full_price: money(course.price),
            discounted_price: money(course.discounted_price()),
            installment_available,
            monthly_payment,
        }
    }
}

/// Courses priced above this can be paid in installments
pub const INSTALLMENT_THRESHOLD: f64 = 300.0;
pub const INSTALLMENT_MONTHS: u32 = 3;

/// `get_support_services`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportResult {
    pub status: ToolStatus,
    pub support_services: Vec<String>,
    pub technical_requirements: Vec<String>,
    pub contact_methods: ContactMethods,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMethods {
    pub chat: String,
    pub email: String,
    pub phone: String,
    pub office_hours: String,
}

/// `get_certification_info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificationResult {
    pub status: ToolStatus,
    pub certification_details: Vec<String>,
    pub completion_requirements: CompletionRequirements,
    pub certificate_benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequirements {
    pub attendance: String,
    pub assignments: String,
    pub final_project: String,
    pub participation: String,
}

/// `search_faqs`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FaqResult {
    Success { matching_faqs: Vec<Faq>, count: usize },
    NoMatches { message: String },
}

/// `get_enrollment_process`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentResult {
    pub status: ToolStatus,
    pub enrollment_steps: Vec<String>,
    pub required_information: Vec<String>,
    pub processing_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_specific: Option<EnrollmentCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentCourse {
    pub course_name: String,
    pub prerequisites: Vec<String>,
    pub next_start_dates: Vec<NaiveDate>,
    pub price: String,
    pub enrollment_deadline: String,
}

impl From<&Course> for EnrollmentCourse {
    fn from(course: &Course) -> Self {
        Self {
            course_name: course.name.clone(),
            prerequisites: prerequisites_or(course, "None"),
            next_start_dates: course.start_dates.clone(),
            price: money(course.price),
            enrollment_deadline: "1 week before start date".to_string(),
        }
    }
}

/// `check_prerequisites`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrerequisiteResult {
    Success {
        course_name: String,
        prerequisites: Vec<String>,
        recommendations: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        student_background: Option<String>,
    },
    CourseNotFound {
        message: String,
    },
}

impl PrerequisiteResult {
    pub(crate) fn beginner_prerequisites(course: &Course) -> Vec<String> {
        prerequisites_or(course, "None - This is a beginner-friendly course")
    }
}

/// Any tool's result, serialized without an extra wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    CourseInfo(CourseInfoResult),
    Schedule(ScheduleResult),
    Payment(PaymentResult),
    Support(SupportResult),
    Certification(CertificationResult),
    Faq(FaqResult),
    Enrollment(EnrollmentResult),
    Prerequisites(PrerequisiteResult),
}

impl ToolOutput {
    /// The `status` value this result serializes with
    pub fn status(&self) -> ToolStatus {
        match self {
            ToolOutput::CourseInfo(CourseInfoResult::Success { .. }) => ToolStatus::Success,
            ToolOutput::CourseInfo(CourseInfoResult::MultipleCourses { .. }) => {
                ToolStatus::MultipleCourses
            }
            ToolOutput::Schedule(r) => r.status,
            ToolOutput::Payment(r) => r.status,
            ToolOutput::Support(r) => r.status,
            ToolOutput::Certification(r) => r.status,
            ToolOutput::Faq(FaqResult::Success { .. }) => ToolStatus::Success,
            ToolOutput::Faq(FaqResult::NoMatches { .. }) => ToolStatus::NoMatches,
            ToolOutput::Enrollment(r) => r.status,
            ToolOutput::Prerequisites(PrerequisiteResult::Success { .. }) => ToolStatus::Success,
            ToolOutput::Prerequisites(PrerequisiteResult::CourseNotFound { .. }) => {
                ToolStatus::CourseNotFound
            }
        }
    }
}
