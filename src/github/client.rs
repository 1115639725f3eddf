// src/github/client.rs
// =============================================================================
// Thin wrapper around the GitHub REST API and the raw content mirror.
//
// Endpoints used:
// - GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1  (list every path)
// - GET /repos/{owner}/{repo}/contents/{path}?ref={ref}    (base64 payload)
// - GET /repos/{owner}/{repo}                              (visibility check)
// - GET https://raw.githubusercontent.com/{owner}/{repo}/{ref}/{path}
//
// The base URLs are fields rather than constants so tests can point the
// client at a local mock server.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, warn};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::repo_url::RepositoryRef;
use crate::error::{ParserError, Result};

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

const USER_AGENT: &str = "repo-flatten";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

// Kind of an entry in the git tree listing
//
// GitHub calls files "blob" and directories "tree". Submodules show up as
// "commit"; anything we don't know lands in Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "blob")]
    File,
    #[serde(rename = "tree")]
    Directory,
    #[serde(other)]
    Other,
}

// One path from the recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl PathEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[derive(Debug, Deserialize)]
struct TreeListing {
    tree: Vec<PathEntry>,
    #[serde(default)]
    truncated: bool,
}

// Response of the contents endpoint (only the fields we need)
#[derive(Debug, Default, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client for github.com
    pub fn new(token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_urls(token, timeout, GITHUB_API_URL, GITHUB_RAW_URL)
    }

    /// Creates a client against custom endpoints (GitHub Enterprise, tests)
    pub fn with_base_urls(
        token: Option<String>,
        timeout: Duration,
        api_base: &str,
        raw_base: &str,
    ) -> anyhow::Result<Self> {
        // One client for every request so connections get pooled
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // Lists every entry of the repository at the given ref
    //
    // A 404 usually means the ref could not be resolved as given, so we try
    // once more with the fully qualified `refs/heads/<branch>` form.
    pub async fn fetch_tree(&self, repo: &RepositoryRef) -> Result<Vec<PathEntry>> {
        let url = self.tree_url(repo, &repo.branch)?;
        let mut response = self.send(self.api_get(&url), url.as_str()).await?;

        if response.status() == StatusCode::NOT_FOUND {
            let qualified = format!("refs/heads/{}", repo.branch);
            debug!("Ref '{}' not found, retrying as '{}'", repo.branch, qualified);
            let url = self.tree_url(repo, &qualified)?;
            response = self.send(self.api_get(&url), url.as_str()).await?;
        }

        let url = response.url().to_string();
        let listing: TreeListing = check_status(&url, response)?
            .json()
            .await
            .map_err(|e| ParserError::transport(&url, e))?;

        if listing.truncated {
            warn!(
                "GitHub truncated the tree listing for {}/{}; some files will be missing",
                repo.owner, repo.name
            );
        }

        Ok(listing.tree)
    }

    // Asks GitHub whether the repository is public
    //
    // This call is deliberately unauthenticated: a repository that only the
    // token can see is private for our purposes. Any failure means "no".
    pub async fn is_public_repo(&self, repo: &RepositoryRef) -> bool {
        let segments = ["repos", repo.owner.as_str(), repo.name.as_str()];
        let url = match build_url(&self.api_base, &segments) {
            Ok(url) => url,
            Err(_) => return false,
        };

        debug!("GET {}", url);
        let response = match self.http.get(url.as_str()).send().await {
            Ok(response) if response.status() == StatusCode::OK => response,
            Ok(response) => {
                debug!("Visibility check answered HTTP {}", response.status());
                return false;
            }
            Err(e) => {
                debug!("Visibility check failed: {}", e);
                return false;
            }
        };

        match response.json::<RepoMetadata>().await {
            Ok(metadata) => !metadata.private,
            Err(_) => false,
        }
    }

    // Fetches a file from the raw content mirror (public repositories only)
    pub async fn fetch_raw_content(&self, repo: &RepositoryRef, path: &str) -> Result<String> {
        let mut segments = vec![repo.owner.as_str(), repo.name.as_str()];
        segments.extend(repo.branch.split('/'));
        segments.extend(path.split('/'));
        let url = build_url(&self.raw_base, &segments)?;

        debug!("GET {}", url);
        let response = self.send(self.http.get(url.as_str()), url.as_str()).await?;
        check_status(url.as_str(), response)?
            .text()
            .await
            .map_err(|e| ParserError::transport(url.as_str(), e))
    }

    // Fetches a file through the contents API and decodes its payload
    pub async fn fetch_content(&self, repo: &RepositoryRef, path: &str) -> Result<String> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        segments.extend(path.split('/'));
        let mut url = build_url(&self.api_base, &segments)?;
        url.query_pairs_mut().append_pair("ref", &repo.branch);

        let response = self.send(self.api_get(&url), url.as_str()).await?;
        let info: FileInfo = check_status(url.as_str(), response)?
            .json()
            .await
            .map_err(|e| ParserError::transport(url.as_str(), e))?;

        decode_file_content(path, &info)
    }

    fn tree_url(&self, repo: &RepositoryRef, reference: &str) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str(), "git", "trees"];
        segments.extend(reference.split('/'));
        let mut url = build_url(&self.api_base, &segments)?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    // GET request with the API headers and, if we have one, the token
    fn api_get(&self, url: &Url) -> RequestBuilder {
        debug!("GET {}", url);
        let request = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, ACCEPT_V3);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| ParserError::transport(url, e))
    }
}

// Decodes the `content` field of a contents API response
//
// GitHub wraps base64 payloads at 60 columns, so whitespace is removed
// before decoding.
pub fn decode_file_content(path: &str, info: &FileInfo) -> Result<String> {
    let content = info.content.clone().unwrap_or_default();

    if info.encoding.as_deref() != Some("base64") {
        return Ok(content);
    }

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(compact).map_err(|e| ParserError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|e| ParserError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

// Maps HTTP status codes onto our error taxonomy
fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::NOT_FOUND {
        Err(ParserError::NotFound(url.to_string()))
    } else {
        Err(ParserError::Transport {
            url: url.to_string(),
            message: format!("HTTP {}", status),
        })
    }
}

// Appends percent-encoded path segments to a base URL
fn build_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ParserError::InvalidInput(format!("bad base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ParserError::InvalidInput(format!("'{}' cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments.iter().filter(|s| !s.is_empty()));

    Ok(url)
}
