// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load .env and the YAML config
// 3. Find a GitHub token (environment first, then a hidden prompt)
// 4. Run the pipeline and write the document to disk
// 5. Exit with proper code (0 = success, 1 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - YAML config file
mod error; // src/error.rs - typed errors
mod filter; // src/filter/ - include/exclude rules
mod github; // src/github/ - GitHub API access
mod notebook; // src/notebook/ - notebook to script conversion
mod pipeline; // src/pipeline.rs - the end-to-end flow
mod report; // src/report/ - tree and document rendering

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Password;
use log::{error, info};
use simple_logger::SimpleLogger;

use cli::Cli;
use config::Config;
use github::{GitHubClient, TokenProvider, TOKEN_ENV_VAR};
use notebook::NbconvertExporter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging goes to stderr (simple_logger's `stderr` feature); if a logger
    // is already set we just keep it
    SimpleLogger::new().with_level(cli.log_level()).init().ok();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let config = Config::load(&cli.config)?;

    let token = TokenProvider::from_env(TOKEN_ENV_VAR)
        .with_prompt(|| {
            Password::new()
                .with_prompt("Enter your GitHub personal access token (hidden, empty for none)")
                .allow_empty_password(true)
                .interact()
                .context("Failed to read token")
        })
        .resolve()?;

    let client = GitHubClient::new(token, config.request_timeout())?;
    let workers = cli.workers.unwrap_or(config.max_workers);

    let exporter = NbconvertExporter::default();

    let (document, repo) = pipeline::retrieve_info(&config, &client, &exporter, workers).await?;

    let file_name = report::output_filename(&repo.name, &repo.branch, chrono::Local::now());
    let path = report::write_document(&cli.output_dir, &file_name, &document)?;

    info!("Result saved to {}", path.display());
    Ok(())
}
