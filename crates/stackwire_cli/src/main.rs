//! stackwire CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Any error (the message and its cause chain go to stderr)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod aws;
mod commands;
mod context;
mod packaging;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::CreateStack(ref args) => commands::stack::create(&cli.global, args).await,
        Commands::UpdateStack(ref args) => commands::stack::update(&cli.global, args).await,
        Commands::DeleteStack(ref args) => commands::stack::delete(&cli.global, args).await,
        Commands::GenerateAwsConfig(ref args) => {
            commands::aws_config::generate(&cli.global, args).await
        }
        Commands::DescribeStackConfig => commands::aws_config::describe(&cli.global).await,
        Commands::UploadFunctions(ref args) => {
            commands::upload_functions::execute(&cli.global, args).await
        }
        Commands::AddDummyUser(ref args) => commands::add_dummy_user::execute(&cli.global, args).await,
        Commands::Query(ref args) => commands::query::execute(&cli.global, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stackwire={level},warn")));

    // Ignore a second initialization (tests, embedding).
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}
