use crate::{
    ascii::{self, TreeError},
    config::{ConfigError, Format, ParseOptions},
    errors::IoError,
    json::{self, JsonError},
    logger::Logger,
    materialize::materialize,
    source::{Clipboard, Source, SourceError},
    tree::{Counts, TreeNode},
};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SeedError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

const MSG_SUCCESS: &str = "Your directory tree has grown successfully!";

/// Parses `text` in the given format into a validated tree. Nothing is written to disk.
///
/// # Errors
///
/// Returns a [`SeedError`] if the text is empty, malformed, structurally inconsistent, or (for
/// JSON) disagrees with its own report.
pub fn parse(text: &str, format: Format, options: &ParseOptions) -> Result<TreeNode, SeedError> {
    log::debug!("parsing input as {}", format);

    let root = match format {
        Format::Tree => ascii::parse(text, options)?,
        Format::Json => json::parse(text)?,
    };

    Ok(root)
}

/// Parses `text` and grows the resulting tree below `base`.
///
/// Parsing and validation finish before the first entry is created.
///
/// # Errors
///
/// Returns a [`SeedError`] if:
///
/// - The text cannot be parsed or validated (nothing is created).
/// - A directory or file cannot be created (entries created before it stay on disk).
pub fn plant(
    text: &str,
    format: Format,
    options: &ParseOptions,
    base: &Path,
    logger: &dyn Logger,
) -> Result<Counts, SeedError> {
    let root = parse(text, format, options)?;

    let created = materialize(&root, base, logger)?;

    Ok(created)
}

/// Everything a single invocation needs to know.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// `None` when the caller supplied no tree at all.
    pub source: Option<Source>,
    pub format: Format,
    pub options: ParseOptions,
    /// Directory the tree grows into. Empty means the working directory.
    pub base: PathBuf,
    /// Parse and validate only.
    pub dry_run: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Planted(Counts),
    Previewed(TreeNode),
    NoSource,
}

/// Resolves the input, then parses and plants it, reporting progress through a [`Logger`].
pub struct Runner<'a, C: Clipboard> {
    clipboard: C,
    logger: &'a dyn Logger,
}
impl<'a, C: Clipboard> Runner<'a, C> {
    pub fn new(clipboard: C, logger: &'a dyn Logger) -> Self {
        Self { clipboard, logger }
    }

    /// # Errors
    ///
    /// Returns a [`SeedError`] if the input cannot be read, parsed, or planted.
    pub fn run(&mut self, request: &Request) -> Result<Outcome, SeedError> {
        let Some(source) = &request.source else {
            return Ok(Outcome::NoSource);
        };

        log::debug!("reading tree from {}", source);

        let text = source.read(&mut self.clipboard, self.logger)?;

        if request.dry_run {
            let root = parse(&text, request.format, &request.options)?;

            return Ok(Outcome::Previewed(root));
        }

        let created = plant(
            &text,
            request.format,
            &request.options,
            &request.base,
            self.logger,
        )?;

        self.logger.success(format_args!("{}", MSG_SUCCESS));

        Ok(Outcome::Planted(created))
    }
}
