use crate::{
    config::ParseOptions,
    tree::{looks_like_file, validate_name, InvalidName, TreeNode},
};
use miette::Diagnostic;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TreeError {
    #[error("no tree provided")]
    #[diagnostic(
        code(seed::ascii::empty),
        help("Pass a tree diagram as an argument, with --file, or with --clipboard")
    )]
    Empty,

    #[error("a root is required (line {line})")]
    #[diagnostic(
        code(seed::ascii::missing_root),
        help("The first line of the diagram must name the root, or be '.' for the current directory")
    )]
    MissingRoot { line: usize },

    #[error("invalid tree structure: node '{name}' at depth {depth} has no parent (line {line})")]
    #[diagnostic(
        code(seed::ascii::missing_parent),
        help("Each line may be indented at most one level deeper than the line it belongs to")
    )]
    MissingParent {
        depth: usize,
        name: String,
        line: usize,
    },

    #[error("'{name}' is nested under '{parent}', which looks like a file (line {line})")]
    #[diagnostic(
        code(seed::ascii::child_of_file),
        help("Names containing a '.' are files. Write the parent with a trailing '/' to make it a directory")
    )]
    ChildOfFile {
        parent: String,
        name: String,
        line: usize,
    },

    #[error("line {line}: {source}")]
    #[diagnostic(code(seed::ascii::invalid_name))]
    InvalidName {
        line: usize,
        #[source]
        source: InvalidName,
    },
}

const CONTINUATION_UNITS: [&str; 2] = ["│   ", "    "];
const BRANCH_UNITS: [&str; 2] = ["├── ", "└── "];
const CONNECTORS: [char; 4] = ['│', '└', '├', '─'];
const PATH_SEPARATORS: [char; 2] = ['/', '\\'];
const NO_BREAK_SPACE: char = '\u{a0}';
/// First line emitted when a diagram is copied together with the command that produced it.
const TREE_COMMAND: &str = "tree";

/// Pasted diagrams frequently carry no-break spaces where plain spaces belong.
fn normalize(line: &str) -> Cow<'_, str> {
    if line.contains(NO_BREAK_SPACE) {
        Cow::Owned(line.replace(NO_BREAK_SPACE, " "))
    } else {
        Cow::Borrowed(line)
    }
}

/// Returns the nesting depth of a diagram line.
///
/// The line is consumed in units of four characters from the left: each continuation unit
/// (`│   ` or four spaces) adds one level, and a branch marker (`├── ` or `└── `) adds one
/// level and ends the scan. Anything else ends the scan as well.
///
/// ```
/// assert_eq!(seed::ascii::depth("│   └── file.txt"), 2);
/// assert_eq!(seed::ascii::depth("root"), 0);
/// ```
pub fn depth(line: &str) -> usize {
    let line = normalize(line);
    let mut rest: &str = &line;
    let mut depth = 0;

    loop {
        if let Some(tail) = CONTINUATION_UNITS
            .iter()
            .find_map(|unit| rest.strip_prefix(*unit))
        {
            depth += 1;
            rest = tail;
        } else if BRANCH_UNITS.iter().any(|unit| rest.starts_with(*unit)) {
            return depth + 1;
        } else {
            return depth;
        }
    }
}

/// Strips every structural glyph from a diagram line and returns the bare name.
///
/// Trailing `/` or `\` are dropped too. A structural-only line yields an empty string.
pub fn extract_name(line: &str) -> String {
    split_name(line).0
}

/// Like [`extract_name`], also reporting whether a trailing separator was removed.
fn split_name(line: &str) -> (String, bool) {
    let mut name = normalize(line).trim().to_string();

    for unit in BRANCH_UNITS.iter().chain(CONTINUATION_UNITS.iter()) {
        name = name.replace(*unit, "");
    }

    let name: String = name.chars().filter(|c| !CONNECTORS.contains(c)).collect();
    let name = name.trim();
    let stripped = name.trim_end_matches(PATH_SEPARATORS).trim_end();

    (stripped.to_string(), stripped.len() != name.len())
}

fn classify(name: &str, trailing_separator: bool, options: &ParseOptions) -> bool {
    if trailing_separator && options.trailing_slash_dirs {
        return false;
    }

    looks_like_file(name)
}

struct Slot {
    node: TreeNode,
    children: Vec<usize>,
}

/// Folds lines into an arena. `last_at_depth[d]` indexes the most recent node seen at depth `d`
/// on the current chain; it never owns nodes, the `children` index lists do.
struct Builder {
    slots: Vec<Slot>,
    last_at_depth: Vec<usize>,
}
impl Builder {
    fn new(root: TreeNode) -> Self {
        Self {
            slots: vec![Slot {
                node: root,
                children: Vec::new(),
            }],
            last_at_depth: vec![0],
        }
    }

    fn attach(&mut self, node: TreeNode, line: usize) -> Result<(), TreeError> {
        let depth = node.depth;

        let parent = match depth.checked_sub(1) {
            Some(parent_depth) => self.last_at_depth.get(parent_depth).copied(),
            None => None,
        };
        let Some(parent) = parent else {
            return Err(TreeError::MissingParent {
                depth,
                name: node.name,
                line,
            });
        };

        let parent_node = &self.slots[parent].node;
        if parent_node.is_file {
            return Err(TreeError::ChildOfFile {
                parent: parent_node.name.clone(),
                name: node.name,
                line,
            });
        }

        log::trace!(
            "line {}: '{}' at depth {} under '{}'",
            line,
            node.name,
            depth,
            parent_node.name
        );

        let index = self.slots.len();
        self.slots.push(Slot {
            node,
            children: Vec::new(),
        });
        self.slots[parent].children.push(index);

        // a shallower node closes every deeper chain
        self.last_at_depth.truncate(depth);
        self.last_at_depth.push(index);

        Ok(())
    }

    fn finish(self) -> Result<TreeNode, TreeError> {
        let mut built: Vec<Option<TreeNode>> = self.slots.iter().map(|_| None).collect();

        // children always sit after their parent in the arena
        for (index, slot) in self.slots.into_iter().enumerate().rev() {
            let mut node = slot.node;
            node.children = slot
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[index] = Some(node);
        }

        built.swap_remove(0).ok_or(TreeError::Empty)
    }
}

/// Builds a tree from an ASCII diagram.
///
/// An optional leading `tree` line is discarded, the first remaining non-blank line names the
/// root, and every following non-blank line becomes a child of the closest open node one
/// level shallower than itself.
pub fn parse(text: &str, options: &ParseOptions) -> Result<TreeNode, TreeError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .peekable();

    if lines
        .peek()
        .is_some_and(|(_, line)| line.trim() == TREE_COMMAND)
    {
        lines.next();
    }

    let (root_line, root_text) = lines.next().ok_or(TreeError::Empty)?;

    let (root_name, trailing_separator) = split_name(root_text);
    if root_name.is_empty() {
        return Err(TreeError::MissingRoot { line: root_line });
    }
    validate_name(&root_name, true).map_err(|source| TreeError::InvalidName {
        line: root_line,
        source,
    })?;

    let is_file = classify(&root_name, trailing_separator, options);
    let mut builder = Builder::new(TreeNode::new(root_name, is_file, 0));

    for (line_number, line) in lines {
        let (name, trailing_separator) = split_name(line);
        if name.is_empty() {
            continue;
        }

        validate_name(&name, false).map_err(|source| TreeError::InvalidName {
            line: line_number,
            source,
        })?;

        let is_file = classify(&name, trailing_separator, options);
        builder.attach(TreeNode::new(name, is_file, depth(line)), line_number)?;
    }

    let root = builder.finish()?;

    log::debug!("parsed tree diagram: {}", root.counts());

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_depth() {
        let cases = [
            ("│   └── file.txt", 2),
            ("    └── file.txt", 2),
            ("├── dir", 1),
            ("        └── file.txt", 3),
            ("│   │   ├── level3", 3),
            ("file.txt", 0),
        ];

        for (line, expected) in cases {
            assert_eq!(depth(line), expected, "depth({:?})", line);
        }
    }

    #[test]
    fn test_depth_stops_after_branch_marker() {
        assert_eq!(depth("├── └── odd"), 1);
    }

    #[test]
    fn test_depth_stops_on_unknown_glyph() {
        assert_eq!(depth("  ├── dir"), 0);
        assert_eq!(depth("│   x   ├── dir"), 1);
    }

    #[test]
    fn test_depth_normalizes_no_break_spaces() {
        assert_eq!(depth("│\u{a0}\u{a0} └── file.txt"), 2);
        assert_eq!(depth("\u{a0}\u{a0}\u{a0}\u{a0}├── dir"), 2);
    }

    #[test]
    fn test_extract_name() {
        let cases = [
            ("├── file.txt", "file.txt"),
            ("│   └── file.txt", "file.txt"),
            ("└── dir", "dir"),
            ("file.txt", "file.txt"),
            ("├── dir1\\", "dir1"),
            ("└── dir2/", "dir2"),
            ("│\u{a0}\u{a0} └── notes.md", "notes.md"),
            ("│   │", ""),
            ("   ", ""),
        ];

        for (line, expected) in cases {
            assert_eq!(extract_name(line), expected, "extract_name({:?})", line);
        }
    }

    #[test]
    fn test_simple_structure() {
        let input = "root\n├── dir1\n└── dir2\n    └── file.txt";

        let root = parse(input, &ParseOptions::default()).unwrap();

        assert_eq!(root.name, "root");
        assert!(!root.is_file);
        assert_eq!(names(&root), vec!["dir1", "dir2"]);
        assert!(!root.children[0].is_file);

        let dir2 = &root.children[1];
        assert_eq!(dir2.depth, 1);
        assert_eq!(names(dir2), vec!["file.txt"]);
        assert!(dir2.children[0].is_file);
        assert_eq!(dir2.children[0].depth, 2);
    }

    #[test]
    fn test_tree_prefix_is_discarded() {
        let input = "tree\nroot\n├── file1.txt\n└── file2.txt";

        let root = parse(input, &ParseOptions::default()).unwrap();

        assert_eq!(root.name, "root");
        assert_eq!(names(&root), vec!["file1.txt", "file2.txt"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = "\n\nroot\n├── src\n\n│   └── main.rs\n   \n└── README.md\n";

        let root = parse(input, &ParseOptions::default()).unwrap();

        assert_eq!(names(&root), vec!["src", "README.md"]);
        assert_eq!(names(&root.children[0]), vec!["main.rs"]);
    }

    #[test]
    fn test_depths_follow_parents() {
        let input = "\
project
├── src
│   ├── main.go
│   └── utils
│       └── helper.go
└── tests
    ├── main_test.go
    └── utils
        └── helper_test.go";

        let root = parse(input, &ParseOptions::default()).unwrap();

        fn check(node: &TreeNode) {
            for child in &node.children {
                assert_eq!(child.depth, node.depth + 1, "depth of {}", child.name);
                check(child);
            }
        }
        check(&root);
        assert_eq!(root.counts().directories, 5);
        assert_eq!(root.counts().files, 4);
    }

    #[test]
    fn test_dot_root() {
        let input = ".\n├── poopy\n│   └── bar\n└── test.txt";

        let root = parse(input, &ParseOptions::default()).unwrap();

        assert!(root.is_current_dir());
        assert!(!root.is_file);
        assert_eq!(names(&root), vec!["poopy", "test.txt"]);
    }

    #[test]
    fn test_skipped_level_is_structural_error() {
        let input = "root\n│   └── orphan.txt";

        let err = parse(input, &ParseOptions::default()).unwrap_err();

        match err {
            TreeError::MissingParent { depth, name, line } => {
                assert_eq!(depth, 2);
                assert_eq!(name, "orphan.txt");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_closed_chain_is_not_reused() {
        // `deep` would otherwise attach to `b`, which belongs to a closed branch
        let input = "root\n├── a\n│   └── b\n├── c\n│   │   └── deep";

        let err = parse(input, &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, TreeError::MissingParent { depth: 3, .. }));
    }

    #[test]
    fn test_unindented_second_line_has_no_parent() {
        let err = parse("root\nsibling", &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, TreeError::MissingParent { depth: 0, .. }));
    }

    #[test]
    fn test_child_of_file_is_rejected() {
        let input = "root\n└── v1.2\n    └── notes";

        let err = parse(input, &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, TreeError::ChildOfFile { ref parent, .. } if parent == "v1.2"));
    }

    #[test]
    fn test_trailing_slash_forces_directory() {
        let input = "root\n└── v1.2/\n    └── notes";

        let root = parse(input, &ParseOptions::default()).unwrap();

        let version = &root.children[0];
        assert_eq!(version.name, "v1.2");
        assert!(!version.is_file);
        assert_eq!(names(version), vec!["notes"]);
    }

    #[test]
    fn test_trailing_slash_override_can_be_disabled() {
        let options = ParseOptions {
            trailing_slash_dirs: false,
        };

        let root = parse("root\n└── v1.2/", &options).unwrap();

        assert!(root.children[0].is_file);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse("", &ParseOptions::default()), Err(TreeError::Empty)));
        assert!(matches!(parse(" \n\n", &ParseOptions::default()), Err(TreeError::Empty)));
        assert!(matches!(parse("tree\n", &ParseOptions::default()), Err(TreeError::Empty)));
    }

    #[test]
    fn test_structural_only_root() {
        let err = parse("├──\n└── a", &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, TreeError::MissingRoot { line: 1 }));
    }

    #[test]
    fn test_interior_separator_is_invalid_name() {
        let err = parse("root\n└── src/main.rs", &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, TreeError::InvalidName { line: 2, .. }));
    }
}
