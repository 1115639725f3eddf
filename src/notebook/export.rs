// src/notebook/export.rs
// =============================================================================
// Turns notebook JSON (nbformat 4) into a plain script.
//
// The pipeline only depends on the NotebookExporter trait. ScriptExporter is
// the built-in implementation, used when jupyter isn't installed, and
// produces the same shape of output as `nbconvert --to script`:
//
//   #!/usr/bin/env python
//   # coding: utf-8
//
//   # # Markdown heading            <- markdown cells become comments
//
//   # In[3]:                        <- one marker per code cell
//
//
//   get_ipython().run_line_magic('matplotlib', 'inline')
//
// Templates:
// - python              code and markdown only (default)
// - python_with_output  also appends each cell's text output as comments
// =============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ParserError, Result};

/// Heading placed before a cell's output by the python_with_output template
pub const OUTPUT_MARKER: &str = "# ── Cell Output ──";

// `ipynb_conversion` section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookOptions {
    /// Template name or path; the file stem picks the built-in template
    #[serde(default)]
    pub template_file: Option<String>,

    /// Directories a relative `template_file` must be found in
    #[serde(default, deserialize_with = "one_or_many")]
    pub extra_template_basedirs: Vec<PathBuf>,
}

// Accepts `dir`, `[dir, ...]` or null
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(dir)) => vec![dir],
        Some(OneOrMany::Many(dirs)) => dirs,
        None => Vec::new(),
    })
}

pub trait NotebookExporter {
    fn export(&self, notebook_json: &str, options: &NotebookOptions) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Python,
    PythonWithOutput,
}

impl Template {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "python" => Some(Template::Python),
            "python_with_output" => Some(Template::PythonWithOutput),
            _ => None,
        }
    }
}

// Picks the template named by the options
pub fn resolve_template(options: &NotebookOptions) -> Result<Template> {
    let Some(template_file) = options.template_file.as_deref() else {
        return Ok(Template::Python);
    };

    let path = Path::new(template_file);

    if !options.extra_template_basedirs.is_empty() {
        let found = if path.is_absolute() {
            path.is_file()
        } else {
            options
                .extra_template_basedirs
                .iter()
                .any(|dir| dir.join(path).is_file())
        };

        if !found {
            return Err(ParserError::Conversion(format!(
                "template '{}' not found in {:?}",
                template_file, options.extra_template_basedirs
            )));
        }
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(template_file);

    Template::from_name(stem).ok_or_else(|| {
        ParserError::Conversion(format!(
            "unknown template '{}' (available: python, python_with_output)",
            template_file
        ))
    })
}

// Only the parts of nbformat we read
#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default = "default_nbformat")]
    nbformat: u64,
    #[serde(default)]
    cells: Vec<Cell>,
    #[serde(default)]
    metadata: Value,
}

fn default_nbformat() -> u64 {
    4
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: MultilineText,
    #[serde(default)]
    execution_count: Option<u64>,
    #[serde(default)]
    outputs: Vec<Value>,
}

// nbformat stores text either as one string or as a list of lines
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum MultilineText {
    #[default]
    Empty,
    One(String),
    Lines(Vec<String>),
}

impl MultilineText {
    fn joined(&self) -> String {
        match self {
            MultilineText::Empty => String::new(),
            MultilineText::One(text) => text.clone(),
            MultilineText::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExporter;

impl NotebookExporter for ScriptExporter {
    fn export(&self, notebook_json: &str, options: &NotebookOptions) -> Result<String> {
        let template = resolve_template(options)?;

        let notebook: Notebook = serde_json::from_str(notebook_json)
            .map_err(|e| ParserError::Conversion(format!("invalid notebook JSON: {}", e)))?;

        if notebook.nbformat < 4 {
            return Err(ParserError::Conversion(format!(
                "nbformat {} is not supported",
                notebook.nbformat
            )));
        }

        let language = notebook
            .metadata
            .pointer("/kernelspec/language")
            .or_else(|| notebook.metadata.pointer("/language_info/name"))
            .and_then(Value::as_str)
            .unwrap_or("python");

        let mut script = format!("#!/usr/bin/env {}\n# coding: utf-8\n", language);

        for cell in &notebook.cells {
            match cell.cell_type.as_str() {
                "markdown" => {
                    script.push('\n');
                    for line in cell.source.joined().lines() {
                        script.push_str(&format!("# {}\n", line));
                    }
                }
                "code" => {
                    let count = cell
                        .execution_count
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| " ".to_string());
                    script.push_str(&format!("\n# In[{}]:\n\n\n", count));
                    script.push_str(&transform_magics(&cell.source.joined()));
                    script.push_str("\n\n");

                    if template == Template::PythonWithOutput {
                        push_outputs(&mut script, &cell.outputs);
                    }
                }
                // Raw cells are copied as they are
                _ => {
                    script.push('\n');
                    script.push_str(&cell.source.joined());
                    script.push('\n');
                }
            }
        }

        Ok(script)
    }
}

fn push_outputs(script: &mut String, outputs: &[Value]) {
    let text: Vec<String> = outputs.iter().filter_map(output_text).collect();
    if text.is_empty() {
        return;
    }

    script.push_str(OUTPUT_MARKER);
    script.push('\n');
    for line in text.concat().lines() {
        script.push_str(&format!("# {}\n", line));
    }
    script.push('\n');
}

// Plain-text rendering of one output entry, if it has one
fn output_text(output: &Value) -> Option<String> {
    let as_text = |value: &Value| -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    };

    let text = match output.get("output_type")?.as_str()? {
        "stream" => as_text(output.get("text")?)?,
        "execute_result" | "display_data" => as_text(output.pointer("/data/text~1plain")?)?,
        "error" => format!(
            "{}: {}",
            output.get("ename")?.as_str()?,
            output.get("evalue")?.as_str()?
        ),
        _ => return None,
    };

    if text.ends_with('\n') {
        Some(text)
    } else {
        Some(format!("{}\n", text))
    }
}

// Rewrites IPython syntax into the calls IPython itself would make
//
//   %%timeit ...   -> get_ipython().run_cell_magic('timeit', '...', '<body>')
//   %matplotlib x  -> get_ipython().run_line_magic('matplotlib', 'x')
//   !pip install y -> get_ipython().system('pip install y')
fn transform_magics(source: &str) -> String {
    if let Some(rest) = source.strip_prefix("%%") {
        let (first, body) = rest.split_once('\n').unwrap_or((rest, ""));
        let (name, args) = split_magic(first);
        return format!(
            "get_ipython().run_cell_magic({}, {}, {})",
            py_repr(name),
            py_repr(args),
            py_repr(body)
        );
    }

    source
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];

            if let Some(magic) = trimmed.strip_prefix('%') {
                let (name, args) = split_magic(magic);
                format!(
                    "{}get_ipython().run_line_magic({}, {})",
                    indent,
                    py_repr(name),
                    py_repr(args)
                )
            } else if let Some(command) = trimmed.strip_prefix('!') {
                format!("{}get_ipython().system({})", indent, py_repr(command))
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_magic(text: &str) -> (&str, &str) {
    let text = text.trim_end();
    match text.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim_start()),
        None => (text, ""),
    }
}

// Single-quoted Python string literal
fn py_repr(text: &str) -> String {
    let mut out = String::from("'");
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
