//! Input validation utilities.
//!
//! Syntax checks for CSDL identifiers and limits on incoming documents.
//! These run before a document is parsed or when a qualified name is built
//! from user input; they never look at cross-references.
//!
//! # Rules
//!
//! - A simple identifier starts with a letter or underscore, continues with
//!   letters, digits or underscores, and is at most 128 characters long
//! - A namespace is a dot-separated list of simple identifiers, at most 511
//!   characters long

use serde::Serialize;
use thiserror::Error;

/// Maximum length for simple identifiers
pub const MAX_SIMPLE_IDENTIFIER_LENGTH: usize = 128;

/// Maximum length for namespaces
pub const MAX_NAMESPACE_LENGTH: usize = 511;

/// Default maximum size for metadata documents (10MB)
pub const MAX_METADATA_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum InputValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),

    /// Document exceeds the configured size limit
    #[error("metadata document exceeds maximum size (max: {max} bytes, got: {actual} bytes)")]
    DocumentTooLarge { max: u64, actual: u64 },
}

/// Result type for input validation operations.
pub type InputValidationResult<T> = Result<T, InputValidationError>;

/// Validate a CSDL simple identifier.
///
/// # Examples
///
/// ```
/// use odata_metadata_sdk::validation::input::validate_simple_identifier;
///
/// assert!(validate_simple_identifier("ETTwoKeyNav").is_ok());
/// assert!(validate_simple_identifier("_hidden").is_ok());
/// assert!(validate_simple_identifier("").is_err());
/// assert!(validate_simple_identifier("1stPlace").is_err());
/// assert!(validate_simple_identifier("Has.Dot").is_err());
/// ```
pub fn validate_simple_identifier(name: &str) -> InputValidationResult<()> {
    check_identifier("simple identifier", name)
}

/// Validate a CSDL namespace.
///
/// # Examples
///
/// ```
/// use odata_metadata_sdk::validation::input::validate_namespace;
///
/// assert!(validate_namespace("Microsoft.Exchange.Services.OData.Model").is_ok());
/// assert!(validate_namespace("olingo.odata.test1").is_ok());
/// assert!(validate_namespace("Bad..Namespace").is_err());
/// assert!(validate_namespace(".Leading").is_err());
/// ```
pub fn validate_namespace(namespace: &str) -> InputValidationResult<()> {
    if namespace.is_empty() {
        return Err(InputValidationError::Empty("namespace"));
    }

    let length = namespace.chars().count();
    if length > MAX_NAMESPACE_LENGTH {
        return Err(InputValidationError::TooLong {
            field: "namespace",
            max: MAX_NAMESPACE_LENGTH,
            actual: length,
        });
    }

    for part in namespace.split('.') {
        if part.is_empty() {
            return Err(InputValidationError::InvalidFormat(
                "namespace",
                format!("'{}' contains an empty segment", namespace),
            ));
        }
        check_identifier("namespace", part)?;
    }

    Ok(())
}

/// Validate the size of an incoming metadata document.
///
/// ```
/// use odata_metadata_sdk::validation::input::{validate_document_size, MAX_METADATA_DOCUMENT_SIZE};
///
/// assert!(validate_document_size(1024, MAX_METADATA_DOCUMENT_SIZE).is_ok());
/// assert!(validate_document_size(MAX_METADATA_DOCUMENT_SIZE + 1, MAX_METADATA_DOCUMENT_SIZE).is_err());
/// ```
pub fn validate_document_size(size: u64, max: u64) -> InputValidationResult<()> {
    if size > max {
        return Err(InputValidationError::DocumentTooLarge { max, actual: size });
    }
    Ok(())
}

fn check_identifier(field: &'static str, name: &str) -> InputValidationResult<()> {
    let mut chars = name.chars();
    let Some(first_char) = chars.next() else {
        return Err(InputValidationError::Empty(field));
    };

    let length = name.chars().count();
    if length > MAX_SIMPLE_IDENTIFIER_LENGTH {
        return Err(InputValidationError::TooLong {
            field,
            max: MAX_SIMPLE_IDENTIFIER_LENGTH,
            actual: length,
        });
    }

    if !first_char.is_alphabetic() && first_char != '_' {
        return Err(InputValidationError::InvalidFormat(
            field,
            format!("'{}' must start with a letter or underscore", name),
        ));
    }

    if let Some(c) = chars.find(|c| !c.is_alphanumeric() && *c != '_') {
        return Err(InputValidationError::InvalidCharacters {
            field,
            reason: format!("invalid character: '{}'", c),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_length_is_limited() {
        let long = "a".repeat(MAX_SIMPLE_IDENTIFIER_LENGTH + 1);
        assert!(matches!(
            validate_simple_identifier(&long),
            Err(InputValidationError::TooLong { .. })
        ));
        assert!(validate_simple_identifier(&long[1..]).is_ok());
    }

    #[test]
    fn namespace_segments_are_identifiers() {
        assert!(validate_namespace("NS.1Bad").is_err());
        assert!(validate_namespace("Trailing.").is_err());
        assert!(validate_namespace("Ünïcode.Namespace").is_ok());
    }

    #[test]
    fn invalid_character_is_reported() {
        let err = validate_simple_identifier("Name-With-Dash").unwrap_err();
        assert_eq!(
            err.to_string(),
            "simple identifier contains invalid characters: invalid character: '-'"
        );
    }
}
