use crate::tree::{validate_name, Counts, InvalidName, TreeNode};
use miette::Diagnostic;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum JsonError {
    #[error("no tree provided")]
    #[diagnostic(code(seed::json::empty))]
    Empty,

    #[error("invalid JSON: {source}")]
    #[diagnostic(
        code(seed::json::invalid_json),
        help("Expected an array such as the output of `tree -J`")
    )]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("empty JSON array")]
    #[diagnostic(code(seed::json::empty_array))]
    EmptyArray,

    #[error("expected a root node and an optional report, found {count} elements")]
    #[diagnostic(code(seed::json::too_many_elements))]
    TooManyElements { count: usize },

    #[error("invalid node at '{pointer}': {reason}")]
    #[diagnostic(code(seed::json::invalid_node))]
    InvalidNode {
        pointer: String,
        reason: &'static str,
    },

    #[error("missing {field} field at '{pointer}'")]
    #[diagnostic(
        code(seed::json::missing_field),
        help("Every node needs a non-empty \"type\" and \"name\"")
    )]
    MissingField {
        field: &'static str,
        pointer: String,
    },

    #[error("invalid name at '{pointer}': {source}")]
    #[diagnostic(code(seed::json::invalid_name))]
    InvalidName {
        pointer: String,
        #[source]
        source: InvalidName,
    },

    #[error("file '{name}' at '{pointer}' has contents")]
    #[diagnostic(
        code(seed::json::file_with_contents),
        help("Only nodes whose type is not \"file\" may have contents")
    )]
    FileWithContents { name: String, pointer: String },

    #[error("failed to parse report: {source}")]
    #[diagnostic(
        code(seed::json::invalid_report),
        help("A report looks like {{\"type\":\"report\",\"directories\":1,\"files\":2}}")
    )]
    InvalidReport {
        #[source]
        source: serde_json::Error,
    },

    #[error("file system count mismatch - expected: {expected}, got: {actual}")]
    #[diagnostic(code(seed::json::count_mismatch))]
    CountMismatch { expected: Counts, actual: Counts },
}

const FILE_TYPE: &str = "file";

#[derive(Debug, Deserialize)]
struct JsonNode {
    r#type: String,
    name: String,
    #[serde(default)]
    contents: Option<Vec<JsonNode>>,
}
impl From<JsonNode> for TreeNode {
    fn from(node: JsonNode) -> Self {
        let children = node
            .contents
            .unwrap_or_default()
            .into_iter()
            .map(TreeNode::from)
            .collect();

        TreeNode::new(node.name, node.r#type == FILE_TYPE, 0).with_children(children)
    }
}

/// Trailer asserting how many entries the tree holds.
#[derive(Debug, Deserialize)]
struct Report {
    directories: usize,
    files: usize,
}
impl From<Report> for Counts {
    fn from(report: Report) -> Self {
        Counts {
            directories: report.directories,
            files: report.files,
        }
    }
}

fn required_str<'v>(
    object: &'v serde_json::Map<String, Value>,
    field: &'static str,
    pointer: &str,
) -> Result<&'v str, JsonError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| JsonError::MissingField {
            field,
            pointer: pointer.to_string(),
        })
}

/// Checks a raw node and everything below it before anything is converted.
fn validate_node(value: &Value, pointer: &str, is_root: bool) -> Result<(), JsonError> {
    let Some(object) = value.as_object() else {
        return Err(JsonError::InvalidNode {
            pointer: pointer.to_string(),
            reason: "expected an object",
        });
    };

    let kind = required_str(object, "type", pointer)?;
    let name = required_str(object, "name", pointer)?;

    validate_name(name, is_root).map_err(|source| JsonError::InvalidName {
        pointer: pointer.to_string(),
        source,
    })?;

    let contents = match object.get("contents") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(contents)) => contents,
        Some(_) => {
            return Err(JsonError::InvalidNode {
                pointer: pointer.to_string(),
                reason: "contents must be an array",
            })
        }
    };

    if kind == FILE_TYPE && !contents.is_empty() {
        return Err(JsonError::FileWithContents {
            name: name.to_string(),
            pointer: pointer.to_string(),
        });
    }

    for (index, child) in contents.iter().enumerate() {
        validate_node(child, &format!("{}/contents/{}", pointer, index), false)?;
    }

    Ok(())
}

/// Builds a tree from a JSON document shaped like `[root]` or `[root, report]`.
///
/// Every node is validated before conversion. When a report is present the converted tree must
/// hold exactly the directories and files it announces.
pub fn parse(text: &str) -> Result<TreeNode, JsonError> {
    if text.trim().is_empty() {
        return Err(JsonError::Empty);
    }

    let mut elements: Vec<Value> =
        serde_json::from_str(text).map_err(|source| JsonError::InvalidJson { source })?;

    match elements.len() {
        0 => return Err(JsonError::EmptyArray),
        1 | 2 => {}
        count => return Err(JsonError::TooManyElements { count }),
    }

    let report = if elements.len() == 2 {
        elements.pop()
    } else {
        None
    };
    let root_value = elements.swap_remove(0);

    validate_node(&root_value, "/0", true)?;

    let root: JsonNode =
        serde_json::from_value(root_value).map_err(|source| JsonError::InvalidJson { source })?;
    let root = TreeNode::from(root);

    let actual = root.counts();

    if let Some(report) = report {
        let report: Report = serde_json::from_value(report)
            .map_err(|source| JsonError::InvalidReport { source })?;
        let expected = Counts::from(report);

        if expected != actual {
            return Err(JsonError::CountMismatch { expected, actual });
        }

        log::debug!("report reconciled: {}", actual);
    }

    log::debug!("parsed JSON tree: {}", actual);

    Ok(root)
}
