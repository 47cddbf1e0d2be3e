use crate::{
    errors::{FileOperation, IoError},
    logger::Logger,
    tree::{Counts, TreeNode},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// rwxr-xr-x
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Creates the directory and any missing parents. An existing directory is not an error.
fn create_directory(path: &Path) -> Result<(), IoError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }

    builder
        .create(path)
        .map_err(|error| IoError::new(FileOperation::Mkdir, path.into(), error))
}

/// Creates an empty file, truncating it if it already exists.
fn create_file(path: &Path) -> Result<(), IoError> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map(drop)
        .map_err(|error| IoError::new(FileOperation::Write, path.into(), error))
}

/// Writes `root` to disk below `base`, depth first and in stored order.
///
/// An empty `base` means the working directory. A `.` root is not created itself; its children
/// land directly in `base`. Each created entry is reported once through `logger.info`.
///
/// # Errors
///
/// Stops at the first failing entry and returns it with the offending path. Entries created
/// before the failure stay on disk.
pub fn materialize(root: &TreeNode, base: &Path, logger: &dyn Logger) -> Result<Counts, IoError> {
    let mut created = Counts::default();

    plant(root, base, logger, &mut created)?;

    log::debug!("materialized {} under '{}'", created, base.display());

    Ok(created)
}

fn plant(
    node: &TreeNode,
    parent_path: &Path,
    logger: &dyn Logger,
    created: &mut Counts,
) -> Result<(), IoError> {
    let current_path: PathBuf = if node.is_current_dir() {
        parent_path.to_path_buf()
    } else {
        parent_path.join(&node.name)
    };

    if !node.is_current_dir() {
        if node.is_file {
            if let Some(parent) = current_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                create_directory(parent)?;
            }

            create_file(&current_path)?;

            logger.info(format_args!("Planted file: {}", current_path.display()));
            created.files += 1;
        } else {
            create_directory(&current_path)?;

            logger.info(format_args!(
                "Planted directory: {}",
                current_path.display()
            ));
            created.directories += 1;
        }
    }

    if node.is_file && !node.children.is_empty() {
        log::warn!(
            "skipping {} children of file '{}'",
            node.children.len(),
            current_path.display()
        );
        return Ok(());
    }

    for child in &node.children {
        plant(child, &current_path, logger, created)?;
    }

    Ok(())
}
