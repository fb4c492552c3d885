use clap::Parser;
use std::process::ExitCode;

mod app;
mod cli;
mod commands;
mod copy;
mod json;
mod util;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Setup tracing subscriber for CLI
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match app::run(cli) {
        Ok(code) => code,
        Err(_) => ExitCode::FAILURE,
    }
}
