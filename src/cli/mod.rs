// Gateway module for the command line - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod args;
mod commands;

// Public re-exports - the ONLY way to access cli functionality
pub use args::{Cli, Commands, OutputFormat};
pub use commands::{handle_command, list_providers, run_tool, show_version};
