use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while obtaining a quiz definition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("failed to read quiz file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("quiz document is not valid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no embedded quiz named `{0}`")]
    UnknownEmbedded(String),
    #[error("quiz has no questions")]
    NoQuestions,
}
