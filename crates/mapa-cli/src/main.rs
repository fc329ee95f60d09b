//! `mapa` binary entry point.

use clap::Parser;
use mapa_cli::{init_tracing, render_summary, run, Cli};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let summary = match run(&cli) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render_summary(&summary));
    }
    ExitCode::SUCCESS
}
