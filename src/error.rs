//! Typed error hierarchy for the schema detection engine.
//!
//! Every error carries a stable `code()` and an optional `details` map so a
//! caller (or a collaborator forwarding the error to a browser client) can
//! serialize it as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Stable, machine-readable error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmptyData,
    InvalidData,
    InsufficientSamples,
    AnalysisTimeout,
    ConnectionFailed,
    PersistenceFailed,
    SchemaNotFound,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyData => "EMPTY_DATA",
            ErrorCode::InvalidData => "INVALID_DATA",
            ErrorCode::InsufficientSamples => "INSUFFICIENT_SAMPLES",
            ErrorCode::AnalysisTimeout => "ANALYSIS_TIMEOUT",
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::PersistenceFailed => "PERSISTENCE_FAILED",
            ErrorCode::SchemaNotFound => "SCHEMA_NOT_FOUND",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The engine's typed error taxonomy.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code", content = "details", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaDetectionError {
    #[error("no samples were provided: {message}")]
    EmptyData { message: String },

    #[error("sample data could not be interpreted as JSON: {message}")]
    InvalidData { message: String },

    #[error("only {found} sample(s) available, need at least {required}")]
    InsufficientSamples { found: usize, required: usize },

    #[error("analysis exceeded its deadline: {message}")]
    AnalysisTimeout { message: String },

    #[error("could not reach the persistence collaborator: {message}")]
    ConnectionFailed { message: String },

    #[error("persistence collaborator failed: {message}")]
    PersistenceFailed { message: String },

    #[error("schema '{schema_id}' was not found")]
    SchemaNotFound { schema_id: String },

    #[error("unexpected internal error: {message}")]
    Unknown { message: String },
}

impl SchemaDetectionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaDetectionError::EmptyData { .. } => ErrorCode::EmptyData,
            SchemaDetectionError::InvalidData { .. } => ErrorCode::InvalidData,
            SchemaDetectionError::InsufficientSamples { .. } => ErrorCode::InsufficientSamples,
            SchemaDetectionError::AnalysisTimeout { .. } => ErrorCode::AnalysisTimeout,
            SchemaDetectionError::ConnectionFailed { .. } => ErrorCode::ConnectionFailed,
            SchemaDetectionError::PersistenceFailed { .. } => ErrorCode::PersistenceFailed,
            SchemaDetectionError::SchemaNotFound { .. } => ErrorCode::SchemaNotFound,
            SchemaDetectionError::Unknown { .. } => ErrorCode::UnknownError,
        }
    }

    pub fn empty_data(message: impl Into<String>) -> Self {
        SchemaDetectionError::EmptyData { message: message.into() }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        SchemaDetectionError::InvalidData { message: message.into() }
    }

    pub fn insufficient_samples(found: usize, required: usize) -> Self {
        SchemaDetectionError::InsufficientSamples { found, required }
    }

    pub fn schema_not_found(schema_id: impl Into<String>) -> Self {
        SchemaDetectionError::SchemaNotFound { schema_id: schema_id.into() }
    }

    /// Wrap an arbitrary error surfaced from inside an analyzer into
    /// `UNKNOWN_ERROR`, carrying the original message.
    pub fn wrap_error(err: impl std::error::Error) -> Self {
        SchemaDetectionError::Unknown { message: err.to_string() }
    }

    /// Structured details mapping for serialization to collaborators.
    pub fn details(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            SchemaDetectionError::InsufficientSamples { found, required } => {
                map.insert("found".into(), Value::from(*found));
                map.insert("required".into(), Value::from(*required));
            }
            SchemaDetectionError::SchemaNotFound { schema_id } => {
                map.insert("schemaId".into(), Value::String(schema_id.clone()));
            }
            _ => {}
        }
        map
    }
}

pub type Result<T> = std::result::Result<T, SchemaDetectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_round_trips_through_json() {
        let err = SchemaDetectionError::insufficient_samples(2, 5);
        assert_eq!(err.code(), ErrorCode::InsufficientSamples);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_SAMPLES");
    }

    #[test]
    fn wrap_error_produces_unknown_code() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let wrapped = SchemaDetectionError::wrap_error(parse_err);
        assert_eq!(wrapped.code(), ErrorCode::UnknownError);
    }

    #[test]
    fn empty_data_error_carries_message() {
        let err = SchemaDetectionError::empty_data("no samples");
        assert!(err.to_string().contains("no samples"));
    }
}
