// src/filter/rules.rs
// =============================================================================
// Decides which repository paths end up in the document.
//
// Evaluation order for one path:
// 1. Any exclude pattern matches        -> excluded
// 2. Any include pattern matches        -> included
// 3. The path ends with an extension    -> included
// 4. Otherwise                          -> excluded
//
// Exclude always wins. Within each list the order of patterns is irrelevant.
// =============================================================================

use super::pattern::{normalize_path, Pattern};
use crate::error::{ParserError, Result};

#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    extensions: Vec<String>,
}

impl FilterRules {
    // Compiles the three lists from the config
    //
    // Fails only when a glob can't be compiled.
    pub fn new(include: &[String], exclude: &[String], extensions: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
            // An empty suffix would match every path
            extensions: extensions
                .iter()
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
        })
    }

    pub fn should_include(&self, path: &str) -> bool {
        let path = normalize_path(path);

        if self.exclude.iter().any(|p| p.matches(&path)) {
            return false;
        }
        if self.include.iter().any(|p| p.matches(&path)) {
            return true;
        }
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    /// Keeps the paths that pass, in their original order
    pub fn filter_paths<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths
            .into_iter()
            .filter(|path| self.should_include(path))
            .map(str::to_string)
            .collect()
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            Pattern::parse(raw).map_err(|e| {
                ParserError::InvalidInput(format!("bad pattern '{}': {}", raw, e))
            })
        })
        .collect()
}
