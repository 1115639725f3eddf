// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Everything about *what* to fetch lives in the YAML config file; the
// command line only says where that file is and how the run should behave.
//
//   repo-flatten                     # uses ./config.yaml
//   repo-flatten my-repo.yaml -v     # custom config, debug logging
// =============================================================================

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "repo-flatten",
    version = "0.1.0",
    about = "Flatten a GitHub repository into a single text document",
    long_about = "repo-flatten lists a GitHub repository, keeps the files matched by the \
                  include/exclude rules in the config file, converts notebooks to plain \
                  source and writes everything into one text file."
)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory the output file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of concurrent file downloads (overrides max_workers)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log every request
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }
}
