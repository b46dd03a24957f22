//! Error types for podman client operations.
//!
//! Every failure surfaced by the client crates is one of these variants. Errors
//! raised by a connector or by the remote service are passed through unchanged;
//! this layer never retries or translates them.

use thiserror::Error;

/// Main error type for podman client operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A projection was built from a payload describing a different object.
    #[error("Requested id({expected}) does not match store id({found})")]
    Consistency {
        /// Id the caller asked for
        expected: String,
        /// Id found in the payload
        found: String,
    },

    /// The connector could not produce a session
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The remote service rejected a call
    #[error("RPC {method} failed: {error}")]
    Rpc {
        /// Fully qualified method name
        method: String,
        /// Error reported by the service
        error: String,
    },

    /// Operation timed out in the transport
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A reply or payload could not be parsed into the expected shape
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Caller supplied input with an invalid shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation precondition does not hold
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Client configuration failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The service URI could not be parsed
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for podman client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Consistency { .. } => "CONSISTENCY",
            Self::Connection(_) => "CONNECTION",
            Self::Rpc { .. } => "RPC_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::MalformedData(_) => "MALFORMED_DATA",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Precondition(_) => "PRECONDITION_FAILED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Builds an [`Error::Rpc`] for the given method.
    #[must_use]
    pub fn rpc(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Rpc {
            method: method.into(),
            error: error.into(),
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Consistency { .. }
                | Self::ValidationError(_)
                | Self::InvalidEndpoint(_)
                | Self::Connection(_)
        )
    }
}

// Conversions from external error types
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedData(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Consistency {
                expected: "a".to_string(),
                found: "b".to_string()
            }
            .error_code(),
            "CONSISTENCY"
        );
        assert_eq!(
            Error::Connection("test".to_string()).error_code(),
            "CONNECTION"
        );
        assert_eq!(Error::rpc("io.podman.ListImages", "boom").error_code(), "RPC_ERROR");
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::MalformedData("test".to_string()).error_code(),
            "MALFORMED_DATA"
        );
        assert_eq!(
            Error::InvalidInput("test".to_string()).error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            Error::Precondition("test".to_string()).error_code(),
            "PRECONDITION_FAILED"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Consistency {
            expected: "abc".to_string(),
            found: "def".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Requested id(abc) does not match store id(def)"
        );

        let err = Error::rpc("io.podman.RemoveImage", "io.podman.ImageNotFound");
        assert_eq!(
            err.to_string(),
            "RPC io.podman.RemoveImage failed: io.podman.ImageNotFound"
        );
    }

    #[test]
    fn test_should_log() {
        assert!(Error::Connection("test".to_string()).should_log());
        assert!(Error::ValidationError("test".to_string()).should_log());
        assert!(Error::InvalidEndpoint("test".to_string()).should_log());
        assert!(!Error::InvalidInput("test".to_string()).should_log());
        assert!(!Error::rpc("m", "e").should_log());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let podman_err: Error = err.into();
        assert!(matches!(podman_err, Error::MalformedData(_)));
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let podman_err: Error = err.into();
        assert!(matches!(podman_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::InvalidInput("test".to_string());
        let err2 = err1.clone();
        let err3 = Error::InvalidInput("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
