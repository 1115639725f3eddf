// src/filter/pattern.rs
// =============================================================================
// A single include/exclude pattern from the config file.
//
// Three forms are recognised:
// - "src/main.py"  exact path (after normalisation)
// - "tests/"       a directory: the directory itself and everything below it
// - "*.ipynb"      a glob: `*` and `?` also match `/`, `[abc]` / `[!abc]`
//                  are character classes
//
// Globs are compiled once, when the config is loaded. A glob that can't be
// compiled (unclosed `[`, reversed range) is a config error.
// =============================================================================

use globset::{GlobBuilder, GlobMatcher};

#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Directory(String),
    Glob(GlobMatcher),
}

impl Pattern {
    // Classifies and compiles a raw pattern string
    pub fn parse(raw: &str) -> Result<Self, globset::Error> {
        let raw = raw.trim().replace('\\', "/");

        if raw.ends_with('/') {
            Ok(Pattern::Directory(normalize_path(&raw)))
        } else if raw.contains(['*', '?', '[']) {
            let glob = GlobBuilder::new(&normalize_path(&raw))
                .literal_separator(false)
                .build()?;
            Ok(Pattern::Glob(glob.compile_matcher()))
        } else {
            Ok(Pattern::Exact(normalize_path(&raw)))
        }
    }

    /// `path` must already be normalised
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => path == exact,
            Pattern::Directory(dir) => {
                // "/" normalises to the empty string: the repository root
                dir.is_empty()
                    || path == dir
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Pattern::Glob(glob) => glob.is_match(path),
        }
    }
}

// Normalises a repository path
//
// Backslashes become slashes, repeated slashes collapse, `.` segments and
// leading/trailing slashes disappear:
//   "./src//utils/" -> "src/utils"
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
