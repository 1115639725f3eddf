// src/report/output.rs
// =============================================================================
// Names and writes the output file.
//
// File name: output_<repo>_<branch>_<YYYYmmdd_HHMMSS>.txt
// Anything outside [A-Za-z0-9_-] in repo or branch becomes '_', so a branch
// like "feature/login" can't create subdirectories.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

pub fn output_filename(repo: &str, branch: &str, now: DateTime<Local>) -> String {
    format!(
        "output_{}_{}_{}.txt",
        sanitize(repo),
        sanitize(branch),
        now.format("%Y%m%d_%H%M%S")
    )
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// Writes the document into `dir`, creating the directory if needed
pub fn write_document(dir: &Path, file_name: &str, document: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(file_name);
    fs::write(&path, document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
