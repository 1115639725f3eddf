// src/notebook/mod.rs
// =============================================================================
// This module converts Jupyter notebooks into readable source text.
//
// Submodules:
// - export: NotebookExporter trait and the built-in script exporter
// - nbconvert: Exporter backed by `jupyter nbconvert`
// - clean: Strips notebook artefacts from the exported script
// =============================================================================

mod clean;
mod export;
mod nbconvert;

pub use clean::clean_converted_code;
pub use export::{NotebookExporter, NotebookOptions, ScriptExporter};
pub use nbconvert::NbconvertExporter;

use crate::error::Result;

/// File suffix that marks a path as a notebook
pub const NOTEBOOK_EXTENSION: &str = ".ipynb";

pub fn is_notebook(path: &str) -> bool {
    path.ends_with(NOTEBOOK_EXTENSION)
}

// Exports a notebook and cleans the result
pub fn ipynb_to_py<E>(
    exporter: &E,
    notebook_json: &str,
    options: &NotebookOptions,
) -> Result<String>
where
    E: NotebookExporter + ?Sized,
{
    let exported = exporter.export(notebook_json, options)?;
    Ok(clean_converted_code(&exported))
}
