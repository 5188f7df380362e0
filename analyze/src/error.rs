use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopicsError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("corpus `{0}` has no terms left after preprocessing")]
    EmptyVocabulary(String),

    #[error("failed to render {}: {message}", .path.display())]
    Render { path: PathBuf, message: String },

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl TopicsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TopicsError::Io { path: path.into(), source }
    }

    pub fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        TopicsError::Render { path: path.into(), message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, TopicsError>;
