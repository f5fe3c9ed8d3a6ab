//! CSDL version classification
//!
//! Only looks at the XML namespace each schema was declared in; no other
//! part of the document is checked.

use crate::models::CsdlMetadata;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CSDL namespace of OData V4 schemas
pub const CSDL_V4_NAMESPACE: &str = "http://docs.oasis-open.org/odata/ns/edm";

/// CSDL namespaces used by OData V2/V3 schemas
pub const CSDL_LEGACY_NAMESPACES: &[&str] = &[
    "http://schemas.microsoft.com/ado/2006/04/edm",
    "http://schemas.microsoft.com/ado/2007/05/edm",
    "http://schemas.microsoft.com/ado/2008/01/edm",
    "http://schemas.microsoft.com/ado/2008/09/edm",
    "http://schemas.microsoft.com/ado/2009/11/edm",
];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ClassificationError {
    #[error("No schema namespaces found in XMLMetadata")]
    NoSchemaNamespaces,
}

/// True when every schema was declared in the V4 CSDL namespace.
///
/// # Example
///
/// ```rust
/// use odata_metadata_sdk::models::{CsdlMetadata, CsdlSchema};
/// use odata_metadata_sdk::validation::version::{is_v4_metadata, CSDL_V4_NAMESPACE};
///
/// let md = CsdlMetadata::new()
///     .with_schema(CsdlSchema::new("NS1").with_xml_namespace(CSDL_V4_NAMESPACE))
///     .with_schema(CsdlSchema::new("NS2").with_xml_namespace(CSDL_V4_NAMESPACE));
/// assert!(is_v4_metadata(&md).unwrap());
/// ```
///
/// # Errors
///
/// Returns [`ClassificationError::NoSchemaNamespaces`] when no schema
/// carries an XML namespace at all.
pub fn is_v4_metadata(metadata: &CsdlMetadata) -> Result<bool, ClassificationError> {
    let namespaces = metadata.schema_xml_namespaces();
    if namespaces.is_empty() {
        return Err(ClassificationError::NoSchemaNamespaces);
    }
    Ok(namespaces.iter().all(|ns| *ns == CSDL_V4_NAMESPACE))
}

/// True for the CSDL namespaces of OData V2/V3
pub fn is_legacy_namespace(uri: &str) -> bool {
    CSDL_LEGACY_NAMESPACES.contains(&uri)
}
