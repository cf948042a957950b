use thiserror::Error;

/// Why a single formula could not be typeset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("empty formula")]
    Empty,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("parse error: unsupported LaTeX command or token")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaperError {
    #[error("no questions match the filter")]
    NoMatchingQuestions,
    #[error("question count must be at least 1")]
    InvalidCount,
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid render config: {0}")]
    Json(#[from] serde_json::Error),
}
