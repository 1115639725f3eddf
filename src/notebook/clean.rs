// src/notebook/clean.rs
// =============================================================================
// Post-processing for exported notebook scripts.
//
// The exporter output is full of notebook artefacts that add nothing when
// the code is read as plain text. Dropped lines:
// - IPython magics (`get_ipython()...`)
// - shebang and `# coding:` declarations
// - markdown headings turned into comments (`# # Title`)
// - execution-count markers (`# In[12]:`)
// Runs of blank lines collapse into one, and the result ends with exactly
// one newline.
// =============================================================================

use std::sync::OnceLock;

use regex::Regex;

fn cell_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^# In\[.*\]").expect("cell marker regex is valid"))
}

fn is_noise(stripped: &str) -> bool {
    stripped.starts_with("get_ipython()")
        || stripped.starts_with("#!")
        || stripped.starts_with("# coding:")
        || stripped.starts_with("# #")
        || cell_marker().is_match(stripped)
}

pub fn clean_converted_code(code: &str) -> String {
    let mut cleaned: Vec<&str> = Vec::new();

    for line in code.split('\n') {
        let stripped = line.trim();

        if is_noise(stripped) {
            continue;
        }

        let previous_blank = cleaned.last().is_some_and(|prev| prev.trim().is_empty());
        if stripped.is_empty() && previous_blank {
            continue;
        }

        cleaned.push(line);
    }

    format!("{}\n", cleaned.join("\n").trim())
}
