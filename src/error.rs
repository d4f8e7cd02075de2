//! Error handling module for possumgen
//!
//! Provides the error type shared by configuration resolution, geometry and
//! script emission. Every variant is fatal: generation is a single pass and
//! nothing is retried.

use thiserror::Error;

/// Main error type for possumgen
#[derive(Error, Debug)]
pub enum PossumGenError {
    /// IO errors (reading the FSF file, writing the script)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A parameter expected to be numeric could not be parsed
    #[error("Value conversion error: parameter '{key}' = {value:?} is not a valid {expected}")]
    ValueConversion {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Numeric parameters parsed but describe an impossible volume
    #[error("Geometry error: {0}")]
    Geometry(String),
}

/// Result type alias for possumgen operations
pub type Result<T> = std::result::Result<T, PossumGenError>;

impl PossumGenError {
    /// Create a value conversion error for `key`
    pub fn value_conversion(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::ValueConversion {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }
}
