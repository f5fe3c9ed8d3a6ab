//! Metadata document root

use super::schema::CsdlSchema;
use serde::{Deserialize, Serialize};

/// `Include` inside an EDMX `Reference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// `IncludeAnnotations` inside an EDMX `Reference`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeAnnotations {
    pub term_namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
}

/// EDMX `Reference` to an external metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub uri: String,
    #[serde(default)]
    pub includes: Vec<Include>,
    #[serde(default)]
    pub include_annotations: Vec<IncludeAnnotations>,
}

/// A whole metadata document as produced by a reader
///
/// This is the raw tree: type references are plain strings and nothing has
/// been checked. Hand it to [`crate::resolver::resolve_metadata`] to build
/// the indexed model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlMetadata {
    /// EDMX `Version` attribute, e.g. `4.0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub schemas: Vec<CsdlSchema>,
}

impl CsdlMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_schema(mut self, schema: CsdlSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// Schema by namespace or alias
    pub fn schema(&self, namespace_or_alias: &str) -> Option<&CsdlSchema> {
        self.schemas
            .iter()
            .find(|s| s.answers_to(namespace_or_alias))
    }

    /// XML namespace URIs declared on schema elements, skipping blanks
    pub fn schema_xml_namespaces(&self) -> Vec<&str> {
        self.schemas
            .iter()
            .filter_map(|s| s.xml_namespace.as_deref())
            .filter(|ns| !ns.trim().is_empty())
            .collect()
    }

    /// Namespaces declared by the schemas of this document
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.namespace.as_str())
    }
}
