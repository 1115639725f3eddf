// src/report/tree.rs
// =============================================================================
// Builds and renders the directory tree shown at the top of the document.
//
// Input is a flat list of paths; output looks like:
//
//   README.md
//   [src/]
//       main.py
//       [utils/]
//           helpers.py
//
// Siblings are sorted by name at every level, so the rendering only depends
// on the set of paths, never on the order GitHub listed them in.
// =============================================================================

use std::collections::BTreeMap;

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File(String),
    Directory { name: String, children: Vec<TreeNode> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    pub nodes: Vec<TreeNode>,
}

// Intermediate prefix tree: None marks a file, Some a directory
#[derive(Default)]
struct Level(BTreeMap<String, Option<Level>>);

impl DirectoryTree {
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut root = Level::default();

        for path in paths {
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            let Some((file, dirs)) = parts.split_last() else {
                continue;
            };

            let mut current = &mut root;
            for dir in dirs {
                current = current
                    .0
                    .entry(dir.to_string())
                    .or_insert(None)
                    .get_or_insert_with(Level::default);
            }
            current.0.entry(file.to_string()).or_insert(None);
        }

        Self {
            nodes: into_nodes(root),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, 0, &mut out);
        out
    }
}

fn into_nodes(level: Level) -> Vec<TreeNode> {
    level
        .0
        .into_iter()
        .map(|(name, child)| match child {
            None => TreeNode::File(name),
            Some(children) => TreeNode::Directory {
                name,
                children: into_nodes(children),
            },
        })
        .collect()
}

fn render_nodes(nodes: &[TreeNode], depth: usize, out: &mut String) {
    let prefix = INDENT.repeat(depth);

    for node in nodes {
        match node {
            TreeNode::File(name) => {
                out.push_str(&format!("{}{}\n", prefix, name));
            }
            TreeNode::Directory { name, children } => {
                out.push_str(&format!("{}[{}/]\n", prefix, name));
                render_nodes(children, depth + 1, out);
            }
        }
    }
}
