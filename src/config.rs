use crate::errors::{FileOperation, IoError};
use miette::Diagnostic;
use serde::Deserialize;
use std::{fmt, fs, path::Path, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(seed::config::io))]
    Io(#[from] IoError),

    #[error("Unable to parse toml file at '{path}': {source}")]
    #[diagnostic(code(seed::config::parse_toml), help("Review toml file"))]
    ParseToml {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported format: {value}")]
    #[diagnostic(
        code(seed::config::unsupported_format),
        help("Valid formats are: ['tree', 'json']")
    )]
    UnsupportedFormat { value: String },
}

/// The shape of the text handed to the parser.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Tree,
    Json,
}
impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tree => "tree",
            Self::Json => "json",
        }
    }
}
impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tree" => Ok(Self::Tree),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat {
                value: other.to_string(),
            }),
        }
    }
}

/// Knobs for the ASCII parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// A name written with a trailing `/` or `\` is a directory even if it contains a dot.
    pub trailing_slash_dirs: bool,
}
impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trailing_slash_dirs: true,
        }
    }
}

/// Optional settings file. Every key may be omitted; command line flags win over it.
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub format: Option<Format>,
    pub silent: Option<bool>,
    pub trailing_slash_dirs: Option<bool>,
}
impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        let parsed = toml::from_str(&content).map_err(|err| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })?;

        log::debug!("loaded config from: {}", path.display());

        Ok(parsed)
    }

    pub fn parse_options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();

        ParseOptions {
            trailing_slash_dirs: self
                .trailing_slash_dirs
                .unwrap_or(defaults.trailing_slash_dirs),
        }
    }
}
