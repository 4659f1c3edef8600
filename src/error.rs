//! Error types for jaiml

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using jaiml's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jaiml
#[derive(Debug, Error)]
pub enum Error {
    /// A provider produced a value of the wrong shape
    #[error("provider '{provider}' returned a malformed fragment: {message}")]
    Shape { provider: String, message: String },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Template lookup, compile or render failure
    #[error("template error in provider '{provider}': {message}")]
    Template { provider: String, message: String },

    /// Provider manifest errors
    #[error("manifest error: {0}")]
    Manifest(String),

    /// File not found
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Manifest(_) => 1,
            Error::Shape { .. } | Error::Template { .. } => 2,
            Error::FileNotFound { .. } => 1,
            Error::Io(_) | Error::TomlParse(_) | Error::TomlSerialize(_) | Error::Json(_) => 1,
        }
    }

    /// Get the error kind as a string for JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Shape { .. } => "shape_error",
            Error::Config(_) => "config_error",
            Error::Template { .. } => "template_error",
            Error::Manifest(_) => "manifest_error",
            Error::FileNotFound { .. } => "file_not_found",
            Error::Io(_) => "io_error",
            Error::TomlParse(_) => "toml_parse_error",
            Error::TomlSerialize(_) => "toml_serialize_error",
            Error::Json(_) => "json_error",
        }
    }
}

/// Wrap an IO error with the action and path that produced it
pub(crate) fn io_context(e: std::io::Error, action: &str, path: &std::path::Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("{} {}: {}", action, path.display(), e),
    ))
}
