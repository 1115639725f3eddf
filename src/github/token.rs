// src/github/token.rs
// =============================================================================
// Works out which access token (if any) to send to GitHub.
//
// Lookup order:
// 1. An environment variable (GITHUB_TOKEN by default, .env is loaded first)
// 2. An injected prompt callback (the CLI asks on the terminal)
//
// The provider itself never touches the console; whoever builds it decides
// how (or whether) to prompt.
// =============================================================================

use anyhow::Result;

pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

type Lookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;
type Prompt<'a> = Box<dyn Fn() -> Result<String> + 'a>;

pub struct TokenProvider<'a> {
    env_var: String,
    lookup: Lookup<'a>,
    prompt: Option<Prompt<'a>>,
}

impl<'a> TokenProvider<'a> {
    /// Reads the token from the process environment
    pub fn from_env(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            lookup: Box::new(|name: &str| std::env::var(name).ok()),
            prompt: None,
        }
    }

    /// Replaces the environment lookup
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Callback used when the environment has no token
    pub fn with_prompt(mut self, prompt: impl Fn() -> Result<String> + 'a) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    // Returns the token, or None when neither source produced one
    //
    // Blank values count as "no token" so a user can just press Enter at the
    // prompt for public repositories.
    pub fn resolve(&self) -> Result<Option<String>> {
        if let Some(token) = non_blank((self.lookup)(&self.env_var)) {
            return Ok(Some(token));
        }

        match &self.prompt {
            Some(prompt) => Ok(non_blank(Some(prompt()?))),
            None => Ok(None),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
