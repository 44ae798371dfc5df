//! Error types for dialogate.

use serde::Serialize;

/// Top-level error type for the gateway.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

/// Configuration resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    MissingValue { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Request or parameter validation failures.
///
/// These surface to the caller as a 400 with a human-readable message and
/// are never logged as server faults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body is not valid JSON")]
    MalformedBody,

    #[error("Request body is empty")]
    EmptyBody,

    #[error("Request is missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Missing required parameters: {}", params.join(", "))]
    MissingParameters { params: Vec<String> },

    #[error("Request must be either GET with query parameters or POST with JSON body")]
    UnsupportedShape,

    #[error("Invalid value for {field}: '{value}'. Allowed values: {}", allowed.join(", "))]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{field} must be at least {min}, got {actual}")]
    ValueTooLow {
        field: String,
        min: f64,
        actual: f64,
    },

    #[error("{field} must be at most {max}, got {actual}")]
    ValueTooHigh {
        field: String,
        max: f64,
        actual: f64,
    },

    #[error("{field} must be at least {min} characters, got {actual}")]
    StringTooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("{field} must be at most {max} characters, got {actual}")]
    StringTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("{field} must contain at least {min} items, got {actual}")]
    ListTooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("{field} must contain at most {max} items, got {actual}")]
    ListTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("{field} cannot be empty")]
    EmptyField { field: String },
}

/// Failures raised inside intent handlers.
///
/// The dispatcher contains these at its boundary; they never unwind past
/// `dispatch`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Required parameter '{name}' is missing")]
    MissingParameter { name: String },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Ad-hoc handler failure with a free-form message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// HTTP channel failures (startup, binding).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel '{name}' failed to start: {reason}")]
    StartupFailed { name: String, reason: String },
}

/// Outbound API client failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse response from {url} as JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Wire shape for REST error envelopes: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<&ValidationError> for ErrorBody {
    fn from(err: &ValidationError) -> Self {
        Self::new(err.to_string())
    }
}
