//! # Error Types
//!
//! Error types for the listener service using `thiserror`.
//!
//! Client-facing failures (`BadRequest`, `NotFound`) carry a human readable
//! reason and a suggested solution. Everything else is an internal failure
//! that is logged in full and reported to callers with a generic message.

/// Custom result type for listener operations
pub type Result<T> = std::result::Result<T, ListenerError>;

/// Main error type for the listener service
#[derive(thiserror::Error, Debug)]
pub enum ListenerError {
    /// Malformed client input
    #[error("Bad request: {reason}")]
    BadRequest { reason: String, solution: String },

    /// Order, metric or analysis record absent
    #[error("Not found: {reason}")]
    NotFound { reason: String, solution: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ListenerError {
    /// Create a bad request error
    pub fn bad_request<R: Into<String>, S: Into<String>>(reason: R, solution: S) -> Self {
        Self::BadRequest { reason: reason.into(), solution: solution.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, S: Into<String>>(reason: R, solution: S) -> Self {
        Self::NotFound { reason: reason.into(), solution: solution.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a database error with context
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }

    // === Request validation ===

    pub fn no_owner_specified() -> Self {
        Self::bad_request(
            "No owner was specified",
            concat!(
                "Specify an owner. For example: 'dotnet' ",
                "(who is the owner for example of the repo 'core')"
            ),
        )
    }

    pub fn no_repository_specified() -> Self {
        Self::bad_request(
            "No repository was specified",
            concat!(
                "Specify a repository. For example: 'core' ",
                "(the owner 'dotnet' provides for example a 'core' repository)"
            ),
        )
    }

    pub fn all_filter_options_disabled() -> Self {
        Self::bad_request(
            "All repository filter options are disabled",
            "Enable at least one repository filter option",
        )
    }

    pub fn invalid_id(raw: &str) -> Self {
        Self::bad_request(
            format!("Invalid id '{}' was given", raw),
            "Provide a valid id. Example id: 55",
        )
    }

    pub fn no_rdf_file_available_yet() -> Self {
        Self::bad_request(
            concat!(
                "Specified repository was not yet processed ",
                "and therefore also doesnt contain a rdf file to download"
            ),
            concat!(
                "Wait until the repository was successfully processed ",
                "(ie. status of repository is 'DONE')"
            ),
        )
    }

    // === Lookups ===

    pub fn order_not_found(id: i64) -> Self {
        Self::not_found(
            format!("No github to rdf entry found for id '{}'", id),
            "Provide an id for an existing github to rdf entry",
        )
    }

    pub fn metric_not_found(metric_id: &str) -> Self {
        Self::not_found(
            format!("No ratings found for metric '{}'", metric_id),
            "Provide a metric ID that has ratings in the system",
        )
    }

    pub fn order_metric_not_found(order_id: i64, metric_id: &str) -> Self {
        Self::not_found(
            format!("No ratings found for order '{}' and metric '{}'", order_id, metric_id),
            "Provide valid order ID and metric ID combination that exists in the system",
        )
    }

    pub fn analysis_not_found(id: i64) -> Self {
        Self::not_found(
            format!("No analysis record found for id '{}'", id),
            "Provide an id for an existing analysis record",
        )
    }

    pub fn no_rdf_data_found<S: std::fmt::Display>(context: S) -> Self {
        Self::not_found(
            format!("No RDF data available for {}", context),
            "Ensure the ratings have been processed and contain RDF data",
        )
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ListenerError::BadRequest { .. } => 400,
            ListenerError::NotFound { .. } => 404,
            ListenerError::Config { .. }
            | ListenerError::Database { .. }
            | ListenerError::Io { .. }
            | ListenerError::Serialization { .. }
            | ListenerError::Internal { .. } => 500,
        }
    }

    /// Whether the error was caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ListenerError::BadRequest { .. } | ListenerError::NotFound { .. })
    }
}

// Error conversions for common external error types
impl From<sqlx::Error> for ListenerError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<std::io::Error> for ListenerError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for ListenerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for ListenerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}
