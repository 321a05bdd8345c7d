// Gateway module for tools - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod handlers;
mod registry;
mod render;
mod types;

// Public re-exports - the ONLY way to access tool functionality
pub use handlers::{
    check_prerequisites, get_certification_info, get_course_information, get_enrollment_process,
    get_payment_information, get_schedule_and_timing, get_support_services, search_faqs,
};
pub use registry::{ToolError, ToolName, ToolRegistry};
pub use types::{
    CertificationResult, CourseDetail, CourseInfoResult, CoursePricing, CourseSummary,
    EnrollmentCourse, EnrollmentResult, FaqResult, PaymentResult, PrerequisiteResult,
    ScheduleDetail, ScheduleResult, SupportResult, ToolOutput, ToolStatus,
};
