use crate::{
    errors::{FileOperation, IoError},
    logger::Logger,
};
use miette::Diagnostic;
use std::{fmt, fs, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum SourceError {
    #[error("file read error")]
    #[diagnostic(code(seed::source::io))]
    Io(#[from] IoError),

    #[error("clipboard read error: {source}")]
    #[diagnostic(
        code(seed::source::clipboard),
        help("Make sure the clipboard holds text, or pass the tree as an argument instead")
    )]
    Clipboard {
        #[source]
        source: arboard::Error,
    },
}

/// Anything that can hand over the text currently on the clipboard.
pub trait Clipboard {
    fn paste_text(&mut self) -> Result<String, SourceError>;
}

/// The desktop clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;
impl Clipboard for SystemClipboard {
    fn paste_text(&mut self) -> Result<String, SourceError> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .map_err(|source| SourceError::Clipboard { source })
    }
}

/// Where the tree text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Clipboard,
    File(PathBuf),
    Argument(String),
}
impl Source {
    /// Picks a source by precedence: clipboard, then file, then the positional argument.
    pub fn select(
        from_clipboard: bool,
        file: Option<PathBuf>,
        argument: Option<String>,
    ) -> Option<Self> {
        if from_clipboard {
            Some(Self::Clipboard)
        } else if let Some(path) = file {
            Some(Self::File(path))
        } else {
            argument.map(Self::Argument)
        }
    }

    pub fn read(
        &self,
        clipboard: &mut dyn Clipboard,
        logger: &dyn Logger,
    ) -> Result<String, SourceError> {
        match self {
            Self::Clipboard => {
                let text = clipboard.paste_text()?;

                logger.log(format_args!("Planting from clipboard..."));

                Ok(text)
            }
            Self::File(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|error| IoError::new(FileOperation::Read, path.clone(), error))?;

                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_else(|| path.to_string_lossy());
                logger.log(format_args!("Sowing the seeds of {}...", file_name));

                Ok(text)
            }
            Self::Argument(text) => {
                logger.log(format_args!("Sprouting directories from seed: {}", text));

                Ok(text.clone())
            }
        }
    }
}
impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clipboard => write!(f, "clipboard"),
            Self::File(path) => write!(f, "file '{}'", path.display()),
            Self::Argument(_) => write!(f, "argument"),
        }
    }
}
