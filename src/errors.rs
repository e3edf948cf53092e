//! # Error Types
//!
//! Error handling for the firm-rules MCP service.
//! Provides structured error types that can be converted to MCP ErrorData.

use rmcp::model::ErrorData;
use std::fmt;
use std::path::PathBuf;

/// Error types that can occur during rule store operations.
///
/// The first group are operation-level failures carrying the message shown to
/// the caller. The second group are the low-level causes they are built from.
/// All errors implement conversion to MCP `ErrorData` for proper error reporting.
#[derive(Debug)]
pub enum ServiceError {
    /// Rejected input; nothing was written
    Validation(String),
    /// Unknown or evicted edit session
    Session(String),
    /// Rule store could not be loaded for listing
    Load(String),
    /// Rule store could not be read while fetching rules
    Retrieval(String),
    /// A store could not be written
    Write(String),
    /// Internal service error with custom message
    Internal(String),
    /// I/O error reading/writing files
    Io(std::io::Error),
    /// Error reading or writing the tabular store
    Csv(csv::Error),
    /// Error parsing YAML project configuration
    SerdeYaml(serde_yaml::Error),
    /// Error parsing JSON data
    SerdeJson(serde_json::Error),
    /// Regular expression compilation error
    Regex(regex::Error),
    /// Requested file not found
    FileNotFound(PathBuf),
}

impl ServiceError {
    /// True for failures caused by the caller's input rather than by storage.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_) | ServiceError::Session(_))
    }

    /// True when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::FileNotFound(_) => true,
            ServiceError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            ServiceError::Csv(err) => matches!(
                err.kind(),
                csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "{msg}"),
            ServiceError::Session(msg) => write!(f, "{msg}"),
            ServiceError::Load(msg) => write!(f, "{msg}"),
            ServiceError::Retrieval(msg) => write!(f, "{msg}"),
            ServiceError::Write(msg) => write!(f, "{msg}"),
            ServiceError::Internal(msg) => write!(f, "Internal error: {msg}"),
            ServiceError::Io(err) => write!(f, "IO error: {err}"),
            ServiceError::Csv(err) => write!(f, "CSV error: {err}"),
            ServiceError::SerdeYaml(err) => write!(f, "YAML parsing error: {err}"),
            ServiceError::SerdeJson(err) => write!(f, "JSON parsing error: {err}"),
            ServiceError::Regex(err) => write!(f, "Regex error: {err}"),
            ServiceError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err)
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        ServiceError::Csv(err)
    }
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceError::SerdeYaml(err)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerdeJson(err)
    }
}

impl From<regex::Error> for ServiceError {
    fn from(err: regex::Error) -> Self {
        ServiceError::Regex(err)
    }
}

impl From<ServiceError> for ErrorData {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        if err.is_client_error() {
            ErrorData::invalid_params(message, None)
        } else {
            let data = serde_json::json!({ "error": message });
            ErrorData::internal_error(message, Some(data))
        }
    }
}
