//! Unified error types for the domain layer
//!
//! Identifier parsing reports through `DomainError`; the property codec has its
//! own `PropertyError` so callers can tell malformed client data apart from
//! everything else.

use thiserror::Error;

use crate::property::PropertyDataType;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// A property record that cannot be trusted.
///
/// Every variant means the same thing to callers: the record is malformed and
/// must not be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Malformed property: invalid base64 ({0})")]
    InvalidBase64(String),

    #[error("Malformed property: base64 is not canonical")]
    NonCanonical,

    #[error("Malformed property: unknown data type tag {0:#04x}")]
    UnknownDataType(u8),

    #[error("Malformed property: {data_type} record is {len} bytes, needs at least {required}")]
    Truncated {
        data_type: PropertyDataType,
        len: usize,
        required: usize,
    },

    #[error("Malformed property: record is {0} bytes, too short for a header")]
    MissingHeader(usize),
}
