//! Reference resolution
//!
//! Turns the raw item tree produced by a reader into a [`ResolvedModel`]:
//! - alias table (alias to namespace) built once per document
//! - index of every named schema item keyed by its canonical qualified name
//! - inheritance hierarchy for entity and complex types, memoized and
//!   checked for cycles

pub mod alias;
pub mod hierarchy;
pub mod index;
pub mod model;
pub mod type_ref;

pub use alias::AliasTable;
pub use hierarchy::TypeHierarchy;
pub use index::{ItemKind, ItemLocation, SchemaIndex};
pub use model::{ResolvedModel, ResolvedType, ResolvedTypeKind};
pub use type_ref::{EdmPrimitiveType, TypeReference, TypeTarget};

use crate::models::CsdlMetadata;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Errors raised while mapping type references to schema items
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ResolutionError {
    /// Namespace or alias part of the reference is not loaded
    #[error("Unknown namespace or alias {namespace} in type reference {token}")]
    UnknownNamespace { token: String, namespace: String },

    /// Namespace is known but holds no item with that local name
    #[error("Unknown type {qualified_name} in type reference {token}")]
    UnknownType {
        token: String,
        qualified_name: String,
    },

    #[error("Malformed type reference: {0}")]
    InvalidTypeReference(String),

    #[error("Inheritance cycle detected at type {0}")]
    InheritanceCycle(String),

    #[error("Namespace {0} is declared by more than one schema")]
    DuplicateNamespace(String),

    #[error("Alias {0} is declared more than once or shadows a namespace")]
    DuplicateAlias(String),

    #[error("Schema without a namespace")]
    MissingNamespace,
}

/// Build a [`ResolvedModel`] from a raw metadata tree.
///
/// # Example
///
/// ```rust
/// use odata_metadata_sdk::models::{CsdlMetadata, CsdlSchema, EntityType};
/// use odata_metadata_sdk::resolver::resolve_metadata;
///
/// let metadata = CsdlMetadata::new().with_schema(
///     CsdlSchema::new("Namespace1")
///         .with_alias("Namespace1_Alias")
///         .with_entity_type(EntityType::new("ETTwoKeyNav").with_key(&["PropertyInt16"])),
/// );
/// let model = resolve_metadata(metadata).unwrap();
/// assert_eq!(
///     model.canonical_name("Namespace1_Alias.ETTwoKeyNav").unwrap(),
///     "Namespace1.ETTwoKeyNav"
/// );
/// ```
///
/// # Errors
///
/// Returns [`ResolutionError`] on duplicate namespaces or aliases and on
/// inheritance cycles. Dangling base types are kept and reported by the
/// validator.
pub fn resolve_metadata(
    metadata: impl Into<Arc<CsdlMetadata>>,
) -> Result<ResolvedModel, ResolutionError> {
    ResolvedModel::build(metadata.into())
}
