//! Error types for the folio backend.
//!
//! The backend uses a hierarchical error system:
//! - `BackendError` is the top-level error returned by all public APIs
//! - Specific error types (`PersistenceError`, `ValidationError`,
//!   `GateDenied`, `RelayError`) provide detail
//!
//! # Error Handling Pattern
//! ```rust,ignore
//! use folio::{ProjectStore, Result};
//!
//! fn example(store: &ProjectStore) -> Result<()> {
//!     store.delete("3")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Top-level error enum for all backend operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested entity not found.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Durable write to the projects file failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Request denied by the gate before reaching the store.
    #[error("{0}")]
    Denied(#[from] GateDenied),

    /// Outbound mail transport failure.
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of what's wrong with the configuration.
        reason: String,
    },

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Creates a configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a persistence error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Returns true if this is a gate denial.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// Returns true if this is a relay error.
    pub fn is_relay(&self) -> bool {
        matches!(self, Self::Relay(_))
    }
}

/// Validation errors for client-supplied input.
///
/// These errors indicate problems with data provided by the caller
/// and are never retried.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },
}

impl ValidationError {
    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Not found errors for referenced entities.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// Project with the given id not found.
    #[error("Project not found: {0}")]
    Project(String),
}

impl NotFoundError {
    /// Creates a project not found error.
    pub fn project(id: impl ToString) -> Self {
        Self::Project(id.to_string())
    }
}

/// Persistence-related errors.
///
/// These errors indicate the durable write of the collection failed.
/// The store rolls back the in-memory mutation before reporting them.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The projects file exists but could not be parsed.
    #[error("Projects file corrupted: {0}")]
    Corrupted(String),

    /// Serialization of the collection failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writing the collection to disk failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Path of the projects file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the collection from disk failed.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Path of the projects file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Creates a corruption error with the given message.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a write error for the given path.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a read error for the given path.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// Gate denials, raised before any store interaction.
#[derive(Debug, Error)]
pub enum GateDenied {
    /// No credentials were supplied on a gated route.
    #[error("Unauthorized: Please provide valid credentials")]
    MissingCredentials,

    /// Supplied credentials did not match the configured admin account.
    #[error("Unauthorized: Please provide valid credentials")]
    InvalidCredentials,

    /// Client address is not on the allowlist.
    #[error("Access denied: IP not whitelisted")]
    IpBlocked(std::net::IpAddr),
}

impl GateDenied {
    /// Returns true if this denial should carry a Basic auth challenge.
    pub fn wants_challenge(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::InvalidCredentials)
    }
}

/// Outbound mail relay errors.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A mailbox address could not be parsed.
    #[error("Invalid address: {0}")]
    Address(String),

    /// Building the MIME message failed.
    #[error("Message build failed: {0}")]
    Message(String),

    /// The SMTP transport reported a failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RelayError {
    /// Creates an invalid address error.
    pub fn address(msg: impl Into<String>) -> Self {
        Self::Address(msg.into())
    }

    /// Creates a message build error.
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// Creates a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::config("ADMIN_PASS missing");
        assert_eq!(err.to_string(), "Configuration error: ADMIN_PASS missing");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::required_field("title");
        assert_eq!(err.to_string(), "Required field missing: title");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = NotFoundError::project("42");
        assert_eq!(err.to_string(), "Project not found: 42");
    }

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::corrupted("unexpected EOF");
        assert_eq!(err.to_string(), "Projects file corrupted: unexpected EOF");
    }

    #[test]
    fn test_is_not_found() {
        let err: BackendError = NotFoundError::project("7").into();
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_is_validation() {
        let err: BackendError = ValidationError::required_field("github").into();
        assert!(err.is_validation());
        assert!(!err.is_persistence());
    }

    #[test]
    fn test_gate_denied_challenge() {
        assert!(GateDenied::MissingCredentials.wants_challenge());
        assert!(GateDenied::InvalidCredentials.wants_challenge());
        assert!(!GateDenied::IpBlocked("10.0.0.1".parse().unwrap()).wants_challenge());
    }

    #[test]
    fn test_error_conversion_chain() {
        // Simulate a persistence error propagating up
        fn inner() -> Result<()> {
            Err(PersistenceError::corrupted("test corruption"))?
        }

        let result = inner();
        assert!(result.is_err());
        assert!(result.unwrap_err().is_persistence());
    }
}
