//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for every operation in the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Python syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Malformed diff: {0}")]
    DiffParse(String),

    #[error("Missing required argument: {0}")]
    MissingField(&'static str),

    #[error("File {path} not found at revision {revision}")]
    NotFound { revision: String, path: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Cannot determine GitHub repository: {0}")]
    RemoteUrl(String),

    #[error("GitHub API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("No GitHub token found in config or environment")]
    MissingToken,

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
