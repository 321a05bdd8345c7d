// Gateway module for runtime - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod demo;
mod non_interactive;
mod orchestrator;
mod responder;

// Public re-exports - the ONLY way to access runtime functionality
pub use demo::{run_demo, SAMPLE_QUESTIONS};
pub use non_interactive::{format_result, ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::{run_session, Orchestrator};
pub use responder::Responder;
