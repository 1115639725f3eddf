// src/github/fetch.rs
// =============================================================================
// Fetches the contents of many repository files at once.
//
// Strategy:
// - Public repositories are read from raw.githubusercontent.com, which
//   doesn't count against the API rate limit
// - Everything else goes through the authenticated contents API
// - Up to `workers` requests are in flight at the same time
//
// A failure for one path never aborts the batch: each path maps to its own
// Result and the document renders failures inline.
// =============================================================================

use std::collections::HashMap;

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use log::{debug, warn};

use super::client::GitHubClient;
use super::repo_url::RepositoryRef;
use crate::error::Result;

/// Default number of concurrent content requests
pub const DEFAULT_WORKERS: usize = 8;

// Anything that can produce the text of a repository path
//
// The pipeline only talks to this trait, which lets tests swap the network
// for canned answers.
pub trait FileSource {
    async fn fetch(&self, path: &str) -> Result<String>;
}

// The real source: a GitHub client bound to one repository
pub struct RepoFiles<'a> {
    client: &'a GitHubClient,
    repo: &'a RepositoryRef,
    public: bool,
}

impl<'a> RepoFiles<'a> {
    pub fn new(client: &'a GitHubClient, repo: &'a RepositoryRef, public: bool) -> Self {
        Self {
            client,
            repo,
            public,
        }
    }
}

impl FileSource for RepoFiles<'_> {
    async fn fetch(&self, path: &str) -> Result<String> {
        if self.public {
            self.client.fetch_raw_content(self.repo, path).await
        } else {
            self.client.fetch_content(self.repo, path).await
        }
    }
}

// Fetches every path concurrently, keyed by path
//
// Completion order doesn't matter: callers iterate their own path list to
// build output, so the map is only a lookup table.
pub async fn fetch_all_contents<S: FileSource>(
    source: &S,
    paths: &[String],
    workers: usize,
) -> HashMap<String, Result<String>> {
    let requests = paths.iter().map(|path| async move {
        debug!("Fetching {}", path);
        let result = source.fetch(path).await;
        if let Err(e) = &result {
            warn!("Could not fetch {}: {}", path, e);
        }
        (path.clone(), result)
    });

    stream::iter(requests)
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why buffer_unordered instead of spawning a task per file?
//    - buffer_unordered(N) polls at most N futures at a time
//    - That is our worker limit: never more than N requests in flight
//    - Nothing is spawned, so the futures can borrow `source` and `paths`
//
// 2. What is `async fn` in a trait?
//    - FileSource::fetch returns a future, just like an async function
//    - We only use the trait through generics (S: FileSource), which keeps
//      the future's type known at compile time
//
// 3. Why a HashMap of Results?
//    - Each path gets its own outcome, success or failure
//    - One bad file can't make the whole batch fail
// -----------------------------------------------------------------------------
