use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::{
    app::{init_config, AppContext},
    models::{ProviderKind, ToolCall},
    runtime::{run_demo, Responder},
    tools::{ToolName, ToolRegistry},
    utils::SupportError,
};

use super::{Cli, Commands};

/// Handle CLI subcommands. Returns false when the chat session should start.
pub async fn handle_command(command: &Commands, ctx: &AppContext, cli: &Cli) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing student-support configuration...");
            let created = init_config()?;
            if created.is_empty() {
                println!("Nothing to do, configuration already exists.");
            }
            for path in created {
                println!("  {} {}", "created".green(), path.display());
            }
            Ok(true)
        }
        Commands::Status => {
            show_status(ctx, cli.provider);
            Ok(true)
        }
        Commands::Providers => {
            list_providers(ctx);
            Ok(true)
        }
        Commands::Tools => {
            let definitions = ToolRegistry::definitions();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
            Ok(true)
        }
        Commands::Tool { name, args } => {
            let result = run_tool(ctx, name, args)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(true)
        }
        Commands::Demo { offline } => {
            let mut responder = Responder::build(ctx, cli.provider, *offline || cli.offline)?;
            let mut stdout = std::io::stdout();
            run_demo(&mut responder, &mut stdout).await?;
            Ok(true)
        }
        Commands::Info => {
            let responder = Responder::build(ctx, cli.provider, cli.offline)?;
            let info = match responder.info() {
                Some(info) => serde_json::to_value(info)?,
                None => json!({
                    "agent_name": ctx.config.agent.name,
                    "mode": "offline",
                    "tools_available": ToolName::ALL.len(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("student-support v{}", env!("CARGO_PKG_VERSION"));
    println!("   Course, enrollment and payment answers for students");
}

/// Providers in priority order with their configured models
pub fn list_providers(ctx: &AppContext) {
    println!("Providers (priority order):");
    for (i, provider) in ProviderKind::PRIORITY.iter().enumerate() {
        let settings = ctx.config.settings(*provider);
        let marker = if ctx.is_available(*provider) {
            "ready".green()
        } else {
            "no key".dimmed()
        };
        println!(
            "  {}. {:<10} {:<28} [{}]",
            i + 1,
            provider.as_str(),
            settings.model_id,
            marker
        );
    }
}

/// Show credentials and the provider that would answer
fn show_status(ctx: &AppContext, requested: Option<ProviderKind>) {
    println!("student-support Status:");
    println!();

    for provider in ProviderKind::PRIORITY {
        if ctx.is_available(provider) {
            println!("  [OK] {}: {} is set", provider.display_name(), provider.api_key_env());
        } else {
            println!(
                "  [--] {}: {} not set",
                provider.display_name(),
                provider.api_key_env()
            );
        }
    }
    if ctx.credentials.use_vertex_ai {
        println!("  [INFO] Vertex AI requested (GOOGLE_GENAI_USE_VERTEXAI)");
    }
    println!(
        "  [INFO] Knowledge base: {} courses, {} FAQs",
        ctx.knowledge.all_courses().len(),
        ctx.knowledge.faqs().len()
    );
    println!();

    match ctx.select_provider(requested) {
        Ok(selection) => {
            let note = if selection.fell_back { " (fallback)" } else { "" };
            println!(
                "  Using: {}/{}{}",
                selection.provider.as_str().green(),
                selection.settings.model_id,
                note
            );
        }
        Err(SupportError::NoCredentials) => {
            println!("  {}", "No API key configured.".red());
            println!("  Set one of GOOGLE_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY,");
            println!("  or run with --offline.");
        }
        Err(e) => println!("  {} {}", "Error:".red(), e),
    }
}

/// Run one tool from `key=value` pairs
pub fn run_tool(ctx: &AppContext, name: &str, args: &[(String, String)]) -> Result<Value> {
    let tool: ToolName = name.parse()?;
    let call = ToolCall {
        id: "cli".to_string(),
        name: tool.as_str().to_string(),
        arguments: tool_arguments(args),
    };
    ToolRegistry::new(Arc::clone(&ctx.knowledge))
        .dispatch(&call)
        .with_context(|| format!("Tool '{tool}' failed"))
}

fn tool_arguments(args: &[(String, String)]) -> Value {
    let map: Map<String, Value> = args
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Config, Credentials};
    use crate::knowledge::KnowledgeBase;
    use crate::tools::ToolError;

    fn context() -> AppContext {
        AppContext::new(
            Config::default(),
            Credentials::from_lookup(|_| None),
            KnowledgeBase::embedded().unwrap(),
        )
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_run_tool_with_arguments() {
        let result = run_tool(
            &context(),
            "check_prerequisites",
            &[pair("course_query", "ai101"), pair("student_background", "CS degree")],
        )
        .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["student_background"], "CS degree");
    }

    #[test]
    fn test_run_tool_unknown_name() {
        let err = run_tool(&context(), "drop_course", &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::UnknownTool(name)) if name == "drop_course"
        ));
    }

    #[test]
    fn test_run_tool_missing_argument() {
        let err = run_tool(&context(), "search_faqs", &[]).unwrap_err();
        assert!(err.to_string().contains("search_faqs"));
    }

    #[tokio::test]
    async fn test_info_without_credentials_fails_with_no_credentials() {
        let cli = <Cli as clap::Parser>::try_parse_from(["student-support", "info"]).unwrap();
        let err = handle_command(&Commands::Info, &context(), &cli).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SupportError>(),
            Some(SupportError::NoCredentials)
        ));
    }

    #[tokio::test]
    async fn test_chat_continues_to_session() {
        let cli = <Cli as clap::Parser>::try_parse_from(["student-support"]).unwrap();
        assert!(!handle_command(&Commands::Chat, &context(), &cli).await.unwrap());
    }
}
