use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(calroute::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calroute::config))]
    Config(String),

    #[error("LLM error: {0}")]
    #[diagnostic(code(calroute::llm))]
    Llm(String),

    #[error("Extraction error: {0}")]
    #[diagnostic(code(calroute::extraction))]
    Extraction(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(calroute::google_calendar))]
    GoogleCalendar(String),

    #[error("Gmail API error: {0}")]
    #[diagnostic(code(calroute::gmail))]
    Gmail(String),

    #[error("Record store error: {0}")]
    #[diagnostic(code(calroute::store))]
    Store(String),

    #[error("No matching event record: {0}")]
    #[diagnostic(code(calroute::event_not_found))]
    EventNotFound(String),

    #[error("Ambiguous event match: {0}")]
    #[diagnostic(code(calroute::ambiguous_match))]
    AmbiguousMatch(String),

    #[error(transparent)]
    #[diagnostic(code(calroute::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calroute::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calroute::other))]
    Other(String),
}

// Implement From for JSON serialization errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create LLM errors
pub fn llm_error(message: &str) -> Error {
    Error::Llm(message.to_string())
}

/// Helper to create extraction errors
pub fn extraction_error(message: &str) -> Error {
    Error::Extraction(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Gmail errors
pub fn gmail_error(message: &str) -> Error {
    Error::Gmail(message.to_string())
}

/// Helper to create record store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}
