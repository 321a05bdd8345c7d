//! Plain-text rendering of tool results, used when no model writes the answer

use chrono::NaiveDate;
use std::fmt::{self, Display, Formatter};

use super::types::{
    CertificationResult, CourseInfoResult, EnrollmentResult, FaqResult, PaymentResult,
    PrerequisiteResult, ScheduleDetail, ScheduleResult, SupportResult, ToolOutput,
};

fn dates(list: &[NaiveDate]) -> String {
    list.iter()
        .map(|d| d.format("%B %-d, %Y").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn bullets(f: &mut Formatter<'_>, items: &[String]) -> fmt::Result {
    for item in items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}

impl Display for CourseInfoResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CourseInfoResult::Success { course } => {
                writeln!(f, "{} ({})", course.name, course.id)?;
                writeln!(f, "{}", course.description)?;
                writeln!(f, "Instructor: {}", course.instructor)?;
                writeln!(f, "Duration: {}", course.duration)?;
                writeln!(f, "Price: {}", course.price)?;
                writeln!(f, "Prerequisites: {}", course.prerequisites.join(", "))?;
                writeln!(f, "Start dates: {}", dates(&course.start_dates))?;
                writeln!(f, "Modules:")?;
                bullets(f, &course.modules)
            }
            CourseInfoResult::MultipleCourses { message, courses } => {
                writeln!(f, "{message}")?;
                for course in courses {
                    writeln!(
                        f,
                        "  - {} ({}): {}, {}. Starts {}",
                        course.name,
                        course.id,
                        course.duration,
                        course.price,
                        dates(&course.start_dates)
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl Display for ScheduleResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.detail {
            ScheduleDetail::Course {
                course_name,
                duration,
                upcoming_start_dates,
                next_start_date,
                schedule_details,
            } => {
                writeln!(f, "{course_name} runs for {duration}.")?;
                match next_start_date {
                    Some(next) => writeln!(f, "Next start date: {}", dates(&[*next]))?,
                    None => writeln!(f, "No upcoming start dates are scheduled yet.")?,
                }
                writeln!(f, "All start dates: {}", dates(upcoming_start_dates))?;
                writeln!(f, "{schedule_details}")
            }
            ScheduleDetail::General {
                general_schedule,
                upcoming_courses,
                note,
            } => {
                writeln!(f, "Class schedule:")?;
                bullets(f, general_schedule)?;
                writeln!(f, "Upcoming start dates:")?;
                for (course, starts) in upcoming_courses {
                    writeln!(f, "  - {course}: {}", dates(starts))?;
                }
                writeln!(f, "{note}")
            }
        }
    }
}

impl Display for PaymentResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(pricing) = &self.course_pricing {
            writeln!(f, "{}", pricing.course_name)?;
            writeln!(
                f,
                "Price: {} (or {} when paid in full upfront)",
                pricing.full_price, pricing.discounted_price
            )?;
            writeln!(f, "Installments: {}", pricing.monthly_payment)?;
        }
        writeln!(f, "Payment options:")?;
        bullets(f, &self.payment_options)?;
        writeln!(f, "Accepted methods: {}", self.payment_methods.join(", "))?;
        writeln!(f, "Discounts:")?;
        writeln!(f, "  - {}", self.discounts.full_payment)?;
        writeln!(f, "  - {}", self.discounts.early_bird)
    }
}

impl Display for SupportResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Support services:")?;
        bullets(f, &self.support_services)?;
        writeln!(f, "Technical requirements:")?;
        bullets(f, &self.technical_requirements)?;
        let contact = &self.contact_methods;
        writeln!(f, "Contact us:")?;
        writeln!(f, "  - Chat: {}", contact.chat)?;
        writeln!(f, "  - Email: {}", contact.email)?;
        writeln!(f, "  - Phone: {}", contact.phone)?;
        writeln!(f, "  - Office hours: {}", contact.office_hours)
    }
}

impl Display for CertificationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Certification:")?;
        bullets(f, &self.certification_details)?;
        let req = &self.completion_requirements;
        writeln!(f, "To complete a course:")?;
        writeln!(f, "  - {}", req.attendance)?;
        writeln!(f, "  - {}", req.assignments)?;
        writeln!(f, "  - {}", req.final_project)?;
        writeln!(f, "  - {}", req.participation)?;
        writeln!(f, "Benefits:")?;
        bullets(f, &self.certificate_benefits)
    }
}

impl Display for FaqResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FaqResult::Success { matching_faqs, .. } => {
                for faq in matching_faqs {
                    writeln!(f, "Q: {}", faq.question)?;
                    writeln!(f, "A: {}", faq.answer)?;
                }
                Ok(())
            }
            FaqResult::NoMatches { message } => writeln!(f, "{message}"),
        }
    }
}

impl Display for EnrollmentResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(course) = &self.course_specific {
            writeln!(f, "Enrolling in {} ({})", course.course_name, course.price)?;
            writeln!(f, "Prerequisites: {}", course.prerequisites.join(", "))?;
            writeln!(f, "Start dates: {}", dates(&course.next_start_dates))?;
            writeln!(f, "Enrollment deadline: {}", course.enrollment_deadline)?;
        }
        writeln!(f, "Enrollment steps:")?;
        for (i, step) in self.enrollment_steps.iter().enumerate() {
            writeln!(f, "  {}. {step}", i + 1)?;
        }
        writeln!(f, "You will need:")?;
        bullets(f, &self.required_information)?;
        writeln!(f, "Processing time: {}", self.processing_time)
    }
}

impl Display for PrerequisiteResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PrerequisiteResult::Success {
                course_name,
                prerequisites,
                recommendations,
                ..
            } => {
                writeln!(f, "Prerequisites for {course_name}: {}", prerequisites.join(", "))?;
                writeln!(f, "Recommendations:")?;
                bullets(f, recommendations)
            }
            PrerequisiteResult::CourseNotFound { message } => writeln!(f, "{message}"),
        }
    }
}

impl Display for ToolOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::CourseInfo(r) => r.fmt(f),
            ToolOutput::Schedule(r) => r.fmt(f),
            ToolOutput::Payment(r) => r.fmt(f),
            ToolOutput::Support(r) => r.fmt(f),
            ToolOutput::Certification(r) => r.fmt(f),
            ToolOutput::Faq(r) => r.fmt(f),
            ToolOutput::Enrollment(r) => r.fmt(f),
            ToolOutput::Prerequisites(r) => r.fmt(f),
        }
    }
}
