//! Seinfeld CLI binary.
//!
//! Generates a themed episode script and writes it to a markdown file.

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    use cli::{Cli, run_generator};

    let cli = Cli::parse();

    // Settings from .env become ordinary environment variables
    dotenvy::dotenv().ok();

    #[cfg(feature = "observability")]
    let logging = {
        let level = if cli.verbose {
            "warn,seinfeld=debug,seinfeld_pipeline=debug,seinfeld_retrieval=debug,seinfeld_models=debug"
        } else {
            "warn,seinfeld=info,seinfeld_pipeline=info,seinfeld_retrieval=info"
        };
        seinfeld::observability::init_observability(
            seinfeld::observability::ObservabilityConfig::default()
                .with_log_level(level)
                .with_json_logs(cli.json_logs),
        )
    };
    #[cfg(not(feature = "observability"))]
    let logging = seinfeld::init_logging(cli.verbose, cli.json_logs);

    if let Err(e) = logging {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let config = match seinfeld::SeinfeldConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\nError loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_generator(&cli, config).await {
        Ok(Some(_)) => ExitCode::SUCCESS,
        Ok(None) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\nError generating script: {}", e);
            if cli.verbose {
                eprintln!("{:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}
