// src/error.rs
// =============================================================================
// Typed errors for the parts of the pipeline that callers need to inspect.
//
// The CLI glue (config loading, writing the output file) uses anyhow, just
// like the rest of the application. The GitHub client and the notebook
// converter return these variants instead so the pipeline can decide which
// failures are fatal and which become inline placeholders in the document.
//
// Rust concepts:
// - thiserror: derives Display and std::error::Error from attributes
// - Enums with data: each failure kind carries the details it needs
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    /// The input could not be understood (e.g. a URL without owner/repo)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// GitHub answered 404 for the resource
    #[error("not found: {0}")]
    NotFound(String),

    /// The request failed or GitHub answered with a non-success status
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The payload arrived but could not be decoded (bad base64, bad UTF-8)
    #[error("could not decode {path}: {message}")]
    Decode { path: String, message: String },

    /// Notebook export failed
    #[error("notebook conversion failed: {0}")]
    Conversion(String),
}

impl ParserError {
    /// Builds a Transport error from a reqwest failure
    pub fn transport(url: &str, error: reqwest::Error) -> Self {
        ParserError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParserError::InvalidInput("missing repository".to_string());
        assert_eq!(err.to_string(), "invalid input: missing repository");

        let err = ParserError::Transport {
            url: "https://api.github.com/x".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request to https://api.github.com/x failed: HTTP 500"
        );
    }
}
