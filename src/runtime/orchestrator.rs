use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::non_interactive::{format_result, NonInteractiveRunner};
use super::responder::Responder;
use crate::{
    agent::ReplyOutcome,
    app::AppContext,
    cli::{handle_command, Cli},
    constants::{EXIT_COMMANDS, INSTITUTION_NAME},
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    ctx: AppContext,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let ctx = AppContext::load(cli.config.as_deref(), cli.knowledge_base.as_deref())
            .context("Failed to load configuration")?;
        Ok(Self { cli, ctx })
    }

    /// Run the orchestrator. Returns the process exit code.
    pub async fn run(self) -> Result<i32> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.ctx, &self.cli).await? {
                return Ok(0);
            }
            // Continue to chat for Commands::Chat
        }

        let responder = Responder::build(&self.ctx, self.cli.provider, self.cli.offline)?;

        if let Some(prompt) = self.cli.prompt.clone() {
            let mut runner = NonInteractiveRunner::new(responder);
            let result = runner.execute(prompt).await;
            println!("{}", format_result(&result, self.cli.output_format));
            // Exit with appropriate code
            return Ok(if result.outcome == ReplyOutcome::ModelError { 1 } else { 0 });
        }

        let mut responder = responder;
        print_banner(&responder);
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_session(&mut responder, stdin, &mut stdout).await?;
        Ok(0)
    }
}

fn print_banner(responder: &Responder) {
    println!("{} {}", "🎓".bold(), format!("{INSTITUTION_NAME} Student Support").bold());
    println!("Using: {}", responder.label().green());
    if let Some(info) = responder.info() {
        if info.fell_back {
            println!(
                "{}",
                "Requested provider has no API key, using the next available one.".yellow()
            );
        }
    }
    println!("Type your questions (or 'quit' to exit). Commands: /reset, /info, /save <file>");
    println!("{}", "-".repeat(40));
}

/// Interactive loop over any line source. Returns how many questions were answered.
pub async fn run_session<R, W>(responder: &mut Responder, input: R, out: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut answered = 0;

    loop {
        write!(out, "\n{} ", "Your question:".cyan())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        if let Some(command) = line.strip_prefix('/') {
            handle_slash_command(responder, command, out)?;
            continue;
        }

        let reply = responder.respond(line).await;
        info!(outcome = ?reply.outcome, tools = ?reply.tools_used, "answered");
        answered += 1;
        writeln!(out, "{}", "Agent:".green().bold())?;
        writeln!(out, "{}", reply.text)?;
        writeln!(out, "{}", "-".repeat(40))?;
    }

    writeln!(out, "Goodbye! 👋")?;
    Ok(answered)
}

fn handle_slash_command<W: Write>(responder: &mut Responder, command: &str, out: &mut W) -> Result<()> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "reset" => {
            responder.reset();
            writeln!(out, "Conversation cleared.")?;
        }
        "info" => match responder.info() {
            Some(info) => writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?,
            None => writeln!(out, "Offline mode: answers come straight from the knowledge base.")?,
        },
        "save" => {
            let path = rest.trim();
            if path.is_empty() {
                writeln!(out, "Usage: /save <file>")?;
            } else {
                match responder.save_transcript(Path::new(path)) {
                    Ok(true) => writeln!(out, "Conversation saved to {path}")?,
                    Ok(false) => writeln!(out, "Offline mode keeps no conversation to save.")?,
                    Err(e) => {
                        warn!(error = %e, "failed to save conversation");
                        writeln!(out, "{} {e}", "Could not save:".red())?;
                    }
                }
            }
        }
        other => writeln!(out, "Unknown command '/{other}'. Try /reset, /info or /save <file>.")?,
    }
    Ok(())
}
