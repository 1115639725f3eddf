// src/filter/mod.rs
// =============================================================================
// This module decides which files of the repository we keep.
//
// Submodules:
// - pattern: Parsing and matching a single include/exclude pattern
// - rules: The include / exclude / extension rule set
//
// Filtering is pure: it only looks at path strings, never at the network.
// =============================================================================

mod pattern;
mod rules;

pub use rules::FilterRules;
