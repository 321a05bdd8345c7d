pub mod agent;
pub mod app;
pub mod cli;
pub mod constants;
pub mod knowledge;
pub mod models;
pub mod runtime;
pub mod tools;
pub mod utils;

pub use agent::{OfflineRouter, SupportAgent};
pub use app::{load_config, AppContext, Config};
pub use knowledge::KnowledgeBase;
pub use models::{Model, ModelFactory};
pub use tools::ToolRegistry;
pub use utils::SupportError;
