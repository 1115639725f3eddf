// src/github/mod.rs
// =============================================================================
// This module handles everything that talks to GitHub.
//
// Submodules:
// - repo_url: Parsing repository URLs into owner/repo/branch
// - client: REST API and raw mirror requests
// - fetch: Fetching many files concurrently
// - token: Finding an access token
// =============================================================================

mod client;
mod fetch;
mod repo_url;
mod token;

// Re-export what the pipeline needs
pub use client::GitHubClient;
pub use fetch::{fetch_all_contents, FileSource, RepoFiles, DEFAULT_WORKERS};
pub use repo_url::{parse_github_url, RepositoryRef};
pub use token::{TokenProvider, TOKEN_ENV_VAR};
