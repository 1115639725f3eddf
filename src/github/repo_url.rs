// src/github/repo_url.rs
// =============================================================================
// Turns a repository URL into owner / repository / branch.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/<branch>
//   - github.com/owner/repo (scheme is optional)
//
// When no `tree/<ref>` pair is present the branch defaults to `main`.
// =============================================================================

use url::Url;

use crate::error::{ParserError, Result};

/// Branch used when the URL does not name one
pub const DEFAULT_BRANCH: &str = "main";

// Identifies one repository at one ref for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

// Parses a GitHub URL into a RepositoryRef
//
// Example:
//   "https://github.com/acme/widgets/tree/dev" -> acme / widgets / dev
pub fn parse_github_url(input: &str) -> Result<RepositoryRef> {
    let trimmed = input.trim();

    // Url::parse needs a scheme, so add one for inputs like "github.com/a/b"
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ParserError::InvalidInput(format!("'{}' is not a URL: {}", input, e)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|parts| parts.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if segments.len() < 2 {
        return Err(ParserError::InvalidInput(format!(
            "Invalid GitHub URL provided: {}",
            input
        )));
    }

    let owner = segments[0].to_string();
    let name = segments[1].trim_end_matches(".git").to_string();

    // Only look for `tree` after owner/repo, so a repository called "tree"
    // is not mistaken for the marker
    let branch = segments[2..]
        .iter()
        .position(|s| *s == "tree")
        .and_then(|idx| segments.get(idx + 3))
        .map(|s| s.to_string())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

    Ok(RepositoryRef { owner, name, branch })
}
