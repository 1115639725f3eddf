// src/config.rs
// =============================================================================
// Loads the YAML configuration file.
//
// Example config.yaml:
//
//   github_url: https://github.com/acme/widgets/tree/dev
//   include:
//     - Dockerfile
//   exclude:
//     - tests/
//     - "*.lock"
//   include_extensions: [".py", ".ipynb", ".md"]
//   ipynb_conversion:
//     template_file: python_with_output.tpl
//     extra_template_basedirs: templates
//   max_workers: 8
//
// Missing lists (or lists set to null) are treated as empty.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Deserializer};

use crate::filter::FilterRules;
use crate::github::DEFAULT_WORKERS;
use crate::notebook::NotebookOptions;

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub github_url: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub include: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub exclude: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub include_extensions: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ipynb_conversion: NotebookOptions,

    #[serde(default = "default_workers")]
    pub max_workers: usize,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Leave out the README section at the top of the document
    #[serde(default)]
    pub skip_readme: bool,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D>(deserializer: D) -> std::result::Result<NotebookOptions, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NotebookOptions>::deserialize(deserializer)?.unwrap_or_default())
}

impl Config {
    // Reads and validates a config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "{} not found! Please provide a valid config YAML.",
                path.display()
            );
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_yaml(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;

        if config.github_url.trim().is_empty() {
            return Err(anyhow!("github_url must not be empty"));
        }
        if config.max_workers == 0 {
            return Err(anyhow!("max_workers must be at least 1"));
        }
        if config.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be at least 1"));
        }

        Ok(config)
    }

    pub fn filter_rules(&self) -> Result<FilterRules> {
        Ok(FilterRules::new(
            &self.include,
            &self.exclude,
            &self.include_extensions,
        )?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[serde(default)] do?
//    - If the key is missing from the YAML, the field gets its Default value
//    - `default = "default_workers"` calls our own function instead
//
// 2. Why deserialize_with for the lists?
//    - `include:` with nothing after it is YAML null, not an empty list
//    - Reading an Option first and then unwrapping to [] accepts both
//
// 3. bail! vs anyhow!
//    - anyhow!(...) builds an error value
//    - bail!(...) is shorthand for `return Err(anyhow!(...))`
// -----------------------------------------------------------------------------
