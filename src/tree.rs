use colored::Colorize;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Root name standing for the working directory. It is never created itself, only its children.
pub const CURRENT_DIR: &str = ".";

/// Represents a node in the tree (either file or directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub is_file: bool,
    pub children: Vec<TreeNode>,
    /// Nesting level assigned by the ASCII builder (root = 0). Always 0 for JSON input.
    pub depth: usize,
}
impl TreeNode {
    pub fn new(name: impl Into<String>, is_file: bool, depth: usize) -> Self {
        Self {
            name: name.into(),
            is_file,
            children: Vec::new(),
            depth,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, false, 0)
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, true, 0)
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_current_dir(&self) -> bool {
        self.name == CURRENT_DIR
    }

    /// Counts every node of the tree, the root included, into exactly one bucket.
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            if node.is_file {
                counts.files += 1;
            } else {
                counts.directories += 1;
            }
            pending.extend(node.children.iter());
        }

        counts
    }

    pub fn preview(&self) -> Preview<'_> {
        Preview(self)
    }
}

/// Totals of a tree, or of what was written to disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub directories: usize,
    pub files: usize,
}
impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories and {} files",
            self.directories, self.files
        )
    }
}

/// Naming heuristic used when no explicit type is available: any dotted name other than `.` is a file.
///
/// Extensionless files (`Makefile`) and dotted directories (`v1.2`) are misclassified by it,
/// which is why the ASCII parser lets a trailing separator force a directory.
pub fn looks_like_file(name: &str) -> bool {
    name != CURRENT_DIR && name.contains('.')
}

#[derive(Debug, Error, Diagnostic)]
#[error("invalid node name '{name}'")]
#[diagnostic(
    code(seed::tree::invalid_name),
    help("A name must be a single path segment: no '/' or '\\', and not '.' or '..' below the root")
)]
pub struct InvalidName {
    pub name: String,
}

/// Checks that `name` can be joined onto a parent path without escaping it.
pub fn validate_name(name: &str, is_root: bool) -> Result<(), InvalidName> {
    let escapes = name.is_empty()
        || name.contains(['/', '\\'])
        || name == ".."
        || (name == CURRENT_DIR && !is_root);

    if escapes {
        return Err(InvalidName {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Renders a tree in the familiar box-drawing style. Directories are blue, files green.
pub struct Preview<'a>(&'a TreeNode);
impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", paint(self.0))?;

        let len = self.0.children.len();
        for (i, child) in self.0.children.iter().enumerate() {
            write_branch(f, child, "", i + 1 == len)?;
        }

        Ok(())
    }
}

fn paint(node: &TreeNode) -> colored::ColoredString {
    if node.is_file {
        node.name.green()
    } else {
        node.name.blue()
    }
}

fn write_branch(
    f: &mut fmt::Formatter<'_>,
    node: &TreeNode,
    prefix: &str,
    is_last: bool,
) -> fmt::Result {
    let connector = if is_last { "└── " } else { "├── " };

    writeln!(
        f,
        "{}{}{}",
        prefix.yellow(),
        connector.yellow(),
        paint(node)
    )?;

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        write_branch(f, child, &child_prefix, i + 1 == len)?;
    }

    Ok(())
}
