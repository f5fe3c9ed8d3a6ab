//! Validation functionality
//!
//! Provides validation logic for:
//! - CSDL version classification (V4 vs V2/V3 schema namespaces)
//! - Metadata validation (keys, base types, bindings, constraints, operations)
//! - Input validation (identifier syntax, document size limits)

mod bindings;
pub mod input;
pub mod metadata;
pub mod version;

pub use input::{
    InputValidationError, InputValidationResult, validate_document_size, validate_namespace,
    validate_simple_identifier,
};
pub use metadata::{
    MetadataValidationError, MetadataValidationResult, MetadataValidator, ValidationOptions,
    validate_csdl, validate_metadata,
};
pub use version::{ClassificationError, CSDL_V4_NAMESPACE, is_v4_metadata};
