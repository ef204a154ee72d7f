//! Shared error types for the application

use thiserror::Error;

/// Main error type for automap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown industry key
    #[error("Industry not found: {0}")]
    IndustryNotFound(String),

    /// Unknown function id within a known industry
    #[error("Function not found: {industry}/{function}")]
    FunctionNotFound { industry: String, function: String },

    /// Unknown subfunction id within a known function
    #[error("Subfunction not found: {industry}/{function}/{subfunction}")]
    SubfunctionNotFound {
        industry: String,
        function: String,
        subfunction: String,
    },

    /// Dataset rows that fail schema validation at the repository boundary
    #[error("Schema error in {source_name}: {message}")]
    Schema {
        source_name: String,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors (programmer errors, e.g. incompatible scales)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a schema error with the offending source name
    pub fn schema(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
