use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// The analysis core favors defensive defaults over failures, so most variants
/// come from collaborators (entity recognizer, lexicon, storage) or from startup
/// configuration.
#[derive(Debug, Error)]
pub enum AppError {
    /// The entity-recognition collaborator failed or broke its span contract.
    #[error("Entity recognizer error: {0}")]
    Recognizer(String),

    /// The lexicon-scoring collaborator failed.
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Represents errors originating from the persistence collaborator.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents data validation errors (e.g., malformed JSON input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (bad taxonomy, bad environment values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart generation failed (distinct from having no data to chart).
    #[error("Render error: {0}")]
    Render(String),
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Recognizer(s) => AppError::Recognizer(s.clone()),
            AppError::Lexicon(s) => AppError::Lexicon(s.clone()),
            AppError::Database(e) => AppError::Database(sqlx::Error::Protocol(e.to_string())),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Render(s) => AppError::Render(s.clone()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(err: std::fmt::Error) -> Self {
        AppError::Render(format!("Formatting error: {}", err))
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("Pattern error: {}", err))
    }
}
