//! Error types for the netspace application layer.

use netspace_search::SearchError;

/// Top-level error type for configuration, input, export and prompting.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Search core error (validation, configuration, provider failures).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Target input could not be parsed.
    #[error("input error: {0}")]
    Input(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Interactive prompt error.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// The user left an interactive prompt (Esc or Ctrl-C).
    #[error("cancelled")]
    Cancelled,
}

impl AppError {
    /// Whether the failure is the user's input or configuration, as opposed
    /// to an environment problem.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::Search(e) => e.is_fatal(),
            Self::Config(_) | Self::Input(_) => true,
            _ => false,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<inquire::InquireError> for AppError {
    fn from(e: inquire::InquireError) -> Self {
        match e {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => Self::Cancelled,
            other => Self::Prompt(other.to_string()),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
