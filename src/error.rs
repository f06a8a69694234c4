//! Error types for the Pilum library.
//!
//! Indexing and querying never fail: they report state changes through
//! booleans and unknown values through empty results. Errors only come from
//! building an index, i.e. field registration and configuration.
//!
//! # Examples
//!
//! ```
//! use pilum::error::{PilumError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PilumError::field("field 'title' registered twice"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for Pilum operations.
#[derive(Error, Debug)]
pub enum PilumError {
    /// Field registration errors
    #[error("Field error: {0}")]
    Field(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with PilumError.
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new field error.
    pub fn field<S: Into<String>>(msg: S) -> Self {
        PilumError::Field(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PilumError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PilumError::field("duplicate field");
        assert_eq!(error.to_string(), "Field error: duplicate field");

        let error = PilumError::invalid_config("empty name");
        assert_eq!(error.to_string(), "Config error: empty name");

        let error = PilumError::other("boom");
        assert_eq!(error.to_string(), "Error: boom");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let pilum_error = PilumError::from(json_error);

        match pilum_error {
            PilumError::Json(_) => {} // Expected
            _ => panic!("Expected JSON error variant"),
        }
    }
}
