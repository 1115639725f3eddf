// src/notebook/nbconvert.rs
// =============================================================================
// Exports notebooks with `jupyter nbconvert`.
//
// The notebook JSON goes in on stdin and the script comes back on stdout:
//
//   jupyter nbconvert --to script --stdin --stdout \
//       [--template-file <file>] \
//       [--TemplateExporter.extra_template_basedirs=<dir> ...]
//
// nbconvert renders any template the user points at, so custom templates
// work here. When jupyter isn't installed at all we fall back to the
// built-in ScriptExporter (which only knows the python and
// python_with_output templates).
// =============================================================================

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::export::{NotebookExporter, NotebookOptions, ScriptExporter};
use crate::error::{ParserError, Result};

const DEFAULT_PROGRAM: &str = "jupyter";

#[derive(Debug)]
pub struct NbconvertExporter {
    program: PathBuf,
    fallback: ScriptExporter,
    warned: AtomicBool,
}

impl Default for NbconvertExporter {
    fn default() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }
}

impl NbconvertExporter {
    /// Runs `<program> nbconvert ...` instead of `jupyter nbconvert ...`
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            fallback: ScriptExporter,
            warned: AtomicBool::new(false),
        }
    }

    fn run(&self, notebook_json: &str, options: &NotebookOptions) -> std::io::Result<Output> {
        let mut child = Command::new(&self.program)
            .args(nbconvert_args(options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::BrokenPipe, "stdin not captured"))?;

        // Feed stdin from its own thread so a chatty child can't fill the
        // stdout pipe while we're still writing
        let output = std::thread::scope(|scope| {
            scope.spawn(move || {
                if let Err(e) = stdin.write_all(notebook_json.as_bytes()) {
                    debug!("nbconvert closed stdin early: {}", e);
                }
            });
            child.wait_with_output()
        })?;

        Ok(Output {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

struct Output {
    success: bool,
    stdout: Vec<u8>,
    stderr: String,
}

impl NotebookExporter for NbconvertExporter {
    fn export(&self, notebook_json: &str, options: &NotebookOptions) -> Result<String> {
        let output = match self.run(notebook_json, options) {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        "{} not found, using the built-in notebook exporter",
                        self.program.display()
                    );
                }
                return self.fallback.export(notebook_json, options);
            }
            Err(e) => {
                return Err(ParserError::Conversion(format!(
                    "could not run {}: {}",
                    self.program.display(),
                    e
                )))
            }
        };

        if !output.success {
            return Err(ParserError::Conversion(format!(
                "nbconvert failed: {}",
                output.stderr
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ParserError::Conversion(format!("nbconvert output is not UTF-8: {}", e)))
    }
}

fn nbconvert_args(options: &NotebookOptions) -> Vec<String> {
    let mut args: Vec<String> = ["nbconvert", "--to", "script", "--stdin", "--stdout"]
        .iter()
        .map(|arg| arg.to_string())
        .collect();

    if let Some(template) = &options.template_file {
        args.push("--template-file".to_string());
        args.push(template.clone());
    }
    for dir in &options.extra_template_basedirs {
        args.push(format!(
            "--TemplateExporter.extra_template_basedirs={}",
            dir.display()
        ));
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = r#"{"nbformat": 4, "nbformat_minor": 5, "metadata": {},
        "cells": [{"cell_type": "code", "execution_count": 1, "metadata": {},
                   "outputs": [], "source": "x = 1"}]}"#;

    #[test]
    fn test_args_carry_template_options() {
        let options = NotebookOptions {
            template_file: Some("my_script.tpl".to_string()),
            extra_template_basedirs: vec![PathBuf::from("templates"), PathBuf::from("more")],
        };

        assert_eq!(
            nbconvert_args(&options),
            vec![
                "nbconvert",
                "--to",
                "script",
                "--stdin",
                "--stdout",
                "--template-file",
                "my_script.tpl",
                "--TemplateExporter.extra_template_basedirs=templates",
                "--TemplateExporter.extra_template_basedirs=more",
            ]
        );
    }

    #[test]
    fn test_missing_program_falls_back_to_builtin() {
        let exporter = NbconvertExporter::with_program("repo-flatten-no-such-jupyter");
        let script = exporter.export(NOTEBOOK, &NotebookOptions::default()).unwrap();
        assert!(script.contains("# In[1]:"));
        assert!(script.contains("x = 1"));
    }

    #[cfg(unix)]
    fn fake_jupyter(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("jupyter");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_custom_template_is_passed_to_nbconvert() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my_script.tpl"), "{{ nb }}").unwrap();
        // Echoes its arguments, then the notebook it was given
        let program = fake_jupyter(dir.path(), "echo \"$@\"\ncat");

        let options = NotebookOptions {
            template_file: Some("my_script.tpl".to_string()),
            extra_template_basedirs: vec![dir.path().to_path_buf()],
        };
        let script = NbconvertExporter::with_program(program)
            .export(NOTEBOOK, &options)
            .unwrap();

        assert!(script.contains("--template-file my_script.tpl"));
        assert!(script.contains(&format!(
            "--TemplateExporter.extra_template_basedirs={}",
            dir.path().display()
        )));
        assert!(script.contains("\"source\": \"x = 1\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_is_a_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_jupyter(dir.path(), "echo 'no such template' >&2\nexit 1");

        let result = NbconvertExporter::with_program(program)
            .export(NOTEBOOK, &NotebookOptions::default());

        match result {
            Err(ParserError::Conversion(message)) => {
                assert!(message.contains("no such template"))
            }
            other => panic!("expected a conversion error, got {:?}", other),
        }
    }
}
