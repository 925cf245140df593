//! chefboot - compose Chef bootstrap scripts for node groups

use std::process::ExitCode;

use chefboot_cli::cli::Cli;
use chefboot_cli::output::json;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CHEFBOOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let as_json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, as_json);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error, as_json: bool) {
    if as_json {
        if let Ok(text) = json::format_error(&format!("{err:#}"), json::error_code(err)) {
            println!("{text}");
            return;
        }
    }
    eprintln!("Error: {err:#}");
}
