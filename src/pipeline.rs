// src/pipeline.rs
// =============================================================================
// Runs one repository through the whole flow:
//
//   parse URL -> list tree -> filter -> fetch (concurrently) -> convert
//   notebooks -> render document
//
// URL parsing and the tree listing are fatal when they fail. Everything
// after that is best effort: a README, file or notebook that fails shows up
// as an inline comment in the document and the run carries on.
// =============================================================================

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::Config;
use crate::filter::FilterRules;
use crate::github::{
    fetch_all_contents, parse_github_url, FileSource, GitHubClient, RepoFiles, RepositoryRef,
};
use crate::notebook::{ipynb_to_py, is_notebook, NotebookExporter, NotebookOptions};
use crate::report::{
    conversion_error_placeholder, fetch_error_placeholder, Document, README_PATH,
};

// Knobs for building the document from a list of candidate paths
pub struct BuildOptions<'a> {
    pub workers: usize,
    pub notebook: &'a NotebookOptions,
    pub include_readme: bool,
}

// Fetches a repository and renders it into one document
//
// Returns the document and the repository it was built from (used for
// naming the output file).
pub async fn retrieve_info<E: NotebookExporter>(
    config: &Config,
    client: &GitHubClient,
    exporter: &E,
    workers: usize,
) -> Result<(String, RepositoryRef)> {
    let repo = parse_github_url(&config.github_url)?;
    info!(
        "Repository {}/{} at branch '{}'",
        repo.owner, repo.name, repo.branch
    );

    let rules = config.filter_rules()?;

    let entries = client
        .fetch_tree(&repo)
        .await
        .with_context(|| format!("Failed to list files of {}/{}", repo.owner, repo.name))?;
    let candidates: Vec<String> = entries
        .into_iter()
        .filter(|entry| entry.is_file())
        .map(|entry| entry.path)
        .collect();

    // Only anonymous runs can use the raw mirror
    let public = !client.has_token() && client.is_public_repo(&repo).await;
    info!(
        "Fetching contents via {}",
        if public { "raw.githubusercontent.com" } else { "the contents API" }
    );

    let source = RepoFiles::new(client, &repo, public);
    let options = BuildOptions {
        workers,
        notebook: &config.ipynb_conversion,
        include_readme: !config.skip_readme,
    };

    let document = build_document(&source, exporter, &rules, &candidates, &options).await;
    Ok((document, repo))
}

// Filters, fetches and renders the candidate paths
pub async fn build_document<S, E>(
    source: &S,
    exporter: &E,
    rules: &FilterRules,
    candidates: &[String],
    options: &BuildOptions<'_>,
) -> String
where
    S: FileSource,
    E: NotebookExporter + ?Sized,
{
    let included = rules.filter_paths(candidates.iter().map(String::as_str));
    info!(
        "{} of {} files match the filter rules",
        included.len(),
        candidates.len()
    );

    let mut document = Document::new(&included);

    // The README goes first and on its own, so a failure there can't affect
    // the rest of the document
    if options.include_readme && rules.should_include(README_PATH) {
        let readme = source.fetch(README_PATH).await;
        if let Err(e) = &readme {
            warn!("Could not fetch {}: {}", README_PATH, e);
        }
        document.set_readme(readme);
    }

    let to_fetch: Vec<String> = included
        .iter()
        .filter(|path| path.as_str() != README_PATH)
        .cloned()
        .collect();
    let mut fetched = fetch_all_contents(source, &to_fetch, options.workers).await;

    for path in &to_fetch {
        let content = match fetched.remove(path) {
            Some(Ok(content)) => render_content(exporter, path, content, options.notebook),
            Some(Err(e)) => fetch_error_placeholder(&e),
            None => String::new(),
        };
        document.push_file(path, content);
    }

    document.render()
}

// Converts notebooks; everything else passes through unchanged
fn render_content<E>(exporter: &E, path: &str, content: String, options: &NotebookOptions) -> String
where
    E: NotebookExporter + ?Sized,
{
    if !is_notebook(path) {
        return content;
    }

    match ipynb_to_py(exporter, &content, options) {
        Ok(script) => script,
        Err(e) => {
            warn!("Could not convert {}: {}", path, e);
            conversion_error_placeholder(path, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParserError, Result as FetchResult};
    use crate::notebook::ScriptExporter;
    use std::collections::HashMap;
    use std::time::Duration;

    // Serves canned files; any path missing from the map fails like a
    // dropped connection
    struct CannedSource(HashMap<&'static str, &'static str>);

    impl FileSource for CannedSource {
        async fn fetch(&self, path: &str) -> FetchResult<String> {
            self.0
                .get(path)
                .map(|content| content.to_string())
                .ok_or_else(|| ParserError::Transport {
                    url: path.to_string(),
                    message: "connection reset by peer".to_string(),
                })
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn options(notebook: &NotebookOptions) -> BuildOptions<'_> {
        BuildOptions {
            workers: 4,
            notebook,
            include_readme: true,
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_becomes_placeholder() {
        let source = CannedSource(HashMap::from([
            ("README.md", "# Widgets"),
            ("src/a.py", "print('a')"),
            ("src/c.py", "print('c')"),
        ]));
        let rules = FilterRules::new(&[], &[], &strings(&[".py", ".md"])).unwrap();
        let candidates = strings(&["README.md", "src/a.py", "src/b.py", "src/c.py"]);
        let notebook = NotebookOptions::default();

        let text = build_document(
            &source,
            &ScriptExporter,
            &rules,
            &candidates,
            &options(&notebook),
        )
        .await;

        assert!(text.starts_with("README.md:\n```\n# Widgets\n```\n\n"));
        assert!(text.contains("src/a.py:\n```\nprint('a')\n```\n"));
        assert!(text.contains("src/c.py:\n```\nprint('c')\n```\n"));
        assert!(text.contains(concat!(
            "src/b.py:\n```\n",
            "# ERROR: Could not fetch file: request to src/b.py failed: connection reset by peer\n",
            "```\n",
        )));
        // README only appears in its own section and the tree
        assert_eq!(text.matches("README.md:").count(), 1);
    }

    #[tokio::test]
    async fn test_filtering_and_notebook_conversion() {
        let notebook_json = r#"{"nbformat": 4, "nbformat_minor": 5, "metadata": {},
            "cells": [{"cell_type": "code", "execution_count": 3, "metadata": {},
                       "outputs": [], "source": "%time\ny = 2"}]}"#;
        let source = CannedSource(HashMap::from([
            ("src/a.py", "x = 1"),
            ("notebooks/demo.ipynb", notebook_json),
            ("notebooks/broken.ipynb", "{ nope"),
            ("tests/test_a.py", "assert True"),
        ]));
        let rules =
            FilterRules::new(&[], &strings(&["tests/"]), &strings(&[".py", ".ipynb"])).unwrap();
        let candidates = strings(&[
            "src/a.py",
            "tests/test_a.py",
            "notebooks/demo.ipynb",
            "notebooks/broken.ipynb",
        ]);
        let notebook = NotebookOptions::default();

        let text = build_document(
            &source,
            &ScriptExporter,
            &rules,
            &candidates,
            &options(&notebook),
        )
        .await;

        assert!(!text.contains("test_a.py"));
        assert!(text.contains("notebooks/demo.ipynb:\n```\ny = 2\n\n```\n"));
        assert!(text.contains(concat!(
            "notebooks/broken.ipynb:\n```\n",
            "# Failed to convert notebooks/broken.ipynb: ",
            "notebook conversion failed: invalid notebook JSON",
        )));
        // README is not matched by the rules, so no README section
        assert!(text.starts_with("Directory Structure:\n"));
    }

    #[tokio::test]
    async fn test_missing_readme_does_not_block_document() {
        let source = CannedSource(HashMap::from([("main.md", "hello")]));
        let rules = FilterRules::new(&[], &[], &strings(&[".md"])).unwrap();
        let notebook = NotebookOptions::default();

        let text = build_document(
            &source,
            &ScriptExporter,
            &rules,
            &strings(&["main.md"]),
            &options(&notebook),
        )
        .await;

        assert!(text.starts_with("README.md:\n```\n# ERROR: Could not fetch README.md:"));
        assert!(text.contains("main.md:\n```\nhello\n```\n"));
    }

    #[tokio::test]
    async fn test_retrieve_info_against_mock_github() {
        let mut server = mockito::Server::new_async().await;
        let _tree = server
            .mock("GET", "/repos/acme/widgets/git/trees/main")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"tree":[{"path":"src","type":"tree"},
                            {"path":"src/a.py","type":"blob"},
                            {"path":"tests/test_a.py","type":"blob"}]}"#,
            )
            .create_async()
            .await;
        let _meta = server
            .mock("GET", "/repos/acme/widgets")
            .with_status(200)
            .with_body(r#"{"private": false}"#)
            .create_async()
            .await;
        let _raw = server
            .mock("GET", "/acme/widgets/main/src/a.py")
            .with_status(200)
            .with_body("print('hi')")
            .create_async()
            .await;

        let config = Config::from_yaml(concat!(
            "github_url: https://github.com/acme/widgets\n",
            "exclude: [\"tests/\"]\n",
            "include_extensions: [\".py\"]\n",
        ))
        .unwrap();
        let client = GitHubClient::with_base_urls(
            None,
            Duration::from_secs(5),
            &server.url(),
            &server.url(),
        )
        .unwrap();

        let (text, repo) = retrieve_info(&config, &client, &ScriptExporter, 2).await.unwrap();

        assert_eq!(repo.name, "widgets");
        assert_eq!(
            text,
            "Directory Structure:\n[src/]\n    a.py\n\n\nsrc/a.py:\n```\nprint('hi')\n```\n"
        );
    }

    #[tokio::test]
    async fn test_retrieve_info_invalid_url_is_fatal() {
        let config = Config::from_yaml("github_url: https://github.com/acme\n").unwrap();
        let client = GitHubClient::new(None, Duration::from_secs(1)).unwrap();

        let result = retrieve_info(&config, &client, &ScriptExporter, 1).await;
        assert!(result.is_err());
    }
}
