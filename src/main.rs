//! gcu - git conflict utilities
//!
//! Walks the files a merge left in conflict and resolves each one in a
//! dialogue with a chat model, asking the user whenever the model is unsure.

mod cli;
mod config;
mod conflicts;
mod fence;
mod llm;
mod notes;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;
mod tools;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, MergeConflictsArgs};
use config::Config;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{ServiceLlmClient, StdConsole, ToolRegistryExecutor};
use session::{Session, SessionOptions};
use std::process::ExitCode;
use std::sync::Arc;
use tools::ToolRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List => {
            list_utilities();
            ExitCode::SUCCESS
        }
        Commands::MergeConflicts(args) => match merge_conflicts(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gcu=debug" } else { "gcu=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let json = std::env::var("GCU_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn list_utilities() {
    println!("Available utilities:");
    for sub in Cli::command().get_subcommands() {
        let name = sub.get_name();
        if name == "list" || name == "help" {
            continue;
        }
        match sub.get_about() {
            Some(about) => println!("  {name:<18} {about}"),
            None => println!("  {name}"),
        }
    }
}

async fn merge_conflicts(args: MergeConflictsArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    config::load_dotenv();
    let config = Config::from_env()?.with_overrides(args.model, args.max_turns);
    tracing::debug!(?config, "Loaded configuration");

    let openai: Arc<dyn LlmService> = Arc::new(OpenAIService::new(
        config.api_key.clone(),
        config.model.clone(),
        &config.base_url,
    )?);
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(openai));

    let options = SessionOptions {
        merge_from: args.merge_from,
        merge_to: args.merge_to,
        max_turns: config.max_turns,
        repo_root: args.repo,
    };
    let mut session = Session::new(
        options,
        Arc::new(ServiceLlmClient::new(service)),
        Arc::new(ToolRegistryExecutor::new(ToolRegistry::standard())),
        Arc::new(StdConsole::new()),
    );

    let scan = session.locate()?;
    for unreadable in &scan.unreadable {
        println!(
            "Warning: cannot read {}: {}; skipping it",
            unreadable.path, unreadable.error
        );
    }
    if scan.files.is_empty() {
        println!("No merge conflicts found.");
        return Ok(ExitCode::SUCCESS);
    }

    let report = session.run(scan.files).await?;
    println!("{}", runtime::rule('-'));
    println!("{report}");

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
