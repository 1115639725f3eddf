// src/report/document.rs
// =============================================================================
// Assembles the final text document.
//
// Layout:
//
//   README.md:
//   ```
//   <readme>
//   ```
//
//   Directory Structure:
//   <tree>
//
//   src/main.py:
//   ```
//   <content>
//   ```
//
// Files appear in the order of the included path list. Files whose content
// is blank are left out of the content section but stay in the tree.
// README.md has its own section and is never repeated as a file block.
// =============================================================================

use super::tree::DirectoryTree;
use crate::error::ParserError;

/// Path of the README that gets its own section
pub const README_PATH: &str = "README.md";

// Builder for the document
//
// Sections can be added in any order; `render` always lays them out as
// README, tree, files.
#[derive(Debug, Default)]
pub struct Document {
    readme: Option<String>,
    tree: DirectoryTree,
    files: Vec<(String, String)>,
}

impl Document {
    pub fn new(included: &[String]) -> Self {
        Self {
            readme: None,
            tree: DirectoryTree::from_paths(included.iter().map(String::as_str)),
            files: Vec::new(),
        }
    }

    /// Sets the README section from a fetch result
    pub fn set_readme(&mut self, fetched: Result<String, ParserError>) {
        self.readme = Some(match fetched {
            Ok(content) => content,
            Err(e) => format!("# ERROR: Could not fetch {}: {}", README_PATH, e),
        });
    }

    /// Adds a file block unless its content is blank
    pub fn push_file(&mut self, path: &str, content: String) {
        if path == README_PATH || content.trim().is_empty() {
            return;
        }
        self.files.push((path.to_string(), content));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(readme) = &self.readme {
            out.push_str(&format!("{}:\n```\n{}\n```\n\n", README_PATH, readme));
        }

        out.push_str("Directory Structure:\n");
        out.push_str(&self.tree.render());
        out.push('\n');

        for (path, content) in &self.files {
            out.push_str(&format!("\n{}:\n```\n{}\n```\n", path, content));
        }

        out
    }
}

// Text shown in place of a file we couldn't fetch
pub fn fetch_error_placeholder(error: &ParserError) -> String {
    format!("# ERROR: Could not fetch file: {}", error)
}

// Text shown in place of a notebook we couldn't convert
pub fn conversion_error_placeholder(path: &str, error: &ParserError) -> String {
    format!("# Failed to convert {}: {}", path, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Same flow the pipeline uses: tree from all paths, then file blocks
    fn assemble_document(
        readme: Option<Result<String, ParserError>>,
        included: &[String],
        contents: &HashMap<String, String>,
    ) -> String {
        let mut document = Document::new(included);
        if let Some(readme) = readme {
            document.set_readme(readme);
        }
        for path in included {
            document.push_file(path, contents.get(path).cloned().unwrap_or_default());
        }
        document.render()
    }

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_layout() {
        let included = paths(&["README.md", "src/a.py", "src/b.py"]);
        let contents = HashMap::from([
            ("src/a.py".to_string(), "print('a')".to_string()),
            ("src/b.py".to_string(), "print('b')".to_string()),
        ]);

        let text = assemble_document(Some(Ok("# Widgets".to_string())), &included, &contents);

        let expected = "\
README.md:
```
# Widgets
```

Directory Structure:
README.md
[src/]
    a.py
    b.py


src/a.py:
```
print('a')
```

src/b.py:
```
print('b')
```
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_blank_files_only_in_tree() {
        let included = paths(&["empty.py", "full.py"]);
        let contents = HashMap::from([
            ("empty.py".to_string(), "  \n\n".to_string()),
            ("full.py".to_string(), "x = 1".to_string()),
        ]);

        let text = assemble_document(None, &included, &contents);

        assert!(text.contains("Directory Structure:\nempty.py\nfull.py\n"));
        assert!(!text.contains("empty.py:\n"));
        assert!(text.contains("full.py:\n```\nx = 1\n```\n"));
    }

    #[test]
    fn test_readme_error_is_inline() {
        let text = assemble_document(
            Some(Err(ParserError::NotFound("README.md".to_string()))),
            &[],
            &HashMap::new(),
        );
        assert!(text.starts_with(
            "README.md:\n```\n# ERROR: Could not fetch README.md: not found: README.md\n```\n\n"
        ));
    }

    #[test]
    fn test_file_order_follows_path_list() {
        let included = paths(&["z.py", "a.py"]);
        let contents = HashMap::from([
            ("a.py".to_string(), "a".to_string()),
            ("z.py".to_string(), "z".to_string()),
        ]);

        let text = assemble_document(None, &included, &contents);
        let z = text.find("z.py:\n").unwrap();
        let a = text.find("a.py:\n").unwrap();
        assert!(z < a);
    }
}
