// Gateway module for app - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod config;
mod credentials;
mod selection;
mod state;

// Public re-exports - the ONLY way to access app functionality
pub use config::{
    get_config_dir, init_config, load_config, save_config, AgentSettings, Config,
    KnowledgeSettings, ModelSettings, CONFIG_FILE_NAME,
};
pub use credentials::Credentials;
pub use selection::{model_settings, select_provider, ProviderSelection};
pub use state::AppContext;
