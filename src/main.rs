use clap::Parser;
use colored::Colorize;

use student_support::{
    cli::Cli,
    runtime::Orchestrator,
    utils::{init_logger, SupportError},
};

#[tokio::main]
async fn main() {
    // A missing .env is fine, keys may come from the environment
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let code = e
                .downcast_ref::<SupportError>()
                .map_or(1, SupportError::exit_code);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let orchestrator = Orchestrator::new(cli)?;
    orchestrator.run().await
}
