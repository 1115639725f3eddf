// src/report/mod.rs
// =============================================================================
// This module turns fetched files into the final text document.
//
// Submodules:
// - tree: Nested directory view of the included paths
// - document: README section, tree and fenced file blocks
// - output: Output file naming and writing
// =============================================================================

mod document;
mod output;
mod tree;

pub use document::{
    conversion_error_placeholder, fetch_error_placeholder, Document, README_PATH,
};
pub use output::{output_filename, write_document};
