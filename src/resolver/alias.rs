//! Namespace alias table

use super::ResolutionError;
use crate::models::CsdlMetadata;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Alias to namespace mapping, built once per document.
///
/// Holds the namespaces declared by local schemas, plus the namespaces
/// pulled in through `edmx:Reference`/`edmx:Include`.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
    namespaces: HashSet<String>,
    external_namespaces: HashSet<String>,
}

impl AliasTable {
    /// Build the table, enforcing namespace and alias uniqueness.
    ///
    /// # Errors
    ///
    /// Returns an error when a schema has no namespace, or when a namespace
    /// or alias is declared twice.
    pub fn build(metadata: &CsdlMetadata) -> Result<Self, ResolutionError> {
        let mut table = AliasTable::default();

        for schema in &metadata.schemas {
            if schema.namespace.trim().is_empty() {
                return Err(ResolutionError::MissingNamespace);
            }
            if !table.namespaces.insert(schema.namespace.clone()) {
                return Err(ResolutionError::DuplicateNamespace(schema.namespace.clone()));
            }
        }

        for schema in &metadata.schemas {
            if let Some(alias) = &schema.alias {
                table.register_alias(alias, &schema.namespace)?;
            }
        }

        for reference in &metadata.references {
            for include in &reference.includes {
                if !table.namespaces.contains(&include.namespace) {
                    table.external_namespaces.insert(include.namespace.clone());
                }
                if let Some(alias) = &include.alias {
                    table.register_alias(alias, &include.namespace)?;
                }
            }
        }

        debug!(
            "Built alias table: {} namespaces, {} aliases, {} external namespaces",
            table.namespaces.len(),
            table.aliases.len(),
            table.external_namespaces.len()
        );

        Ok(table)
    }

    fn register_alias(&mut self, alias: &str, namespace: &str) -> Result<(), ResolutionError> {
        if self.namespaces.contains(alias) || self.aliases.contains_key(alias) {
            return Err(ResolutionError::DuplicateAlias(alias.to_string()));
        }
        self.aliases.insert(alias.to_string(), namespace.to_string());
        Ok(())
    }

    /// Map a namespace or alias to the namespace it stands for
    pub fn resolve_namespace<'a>(&'a self, namespace_or_alias: &'a str) -> Option<&'a str> {
        if self.namespaces.contains(namespace_or_alias)
            || self.external_namespaces.contains(namespace_or_alias)
        {
            return Some(namespace_or_alias);
        }
        self.aliases.get(namespace_or_alias).map(String::as_str)
    }

    /// True for namespaces declared by a local schema
    pub fn is_local_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// True for namespaces known only through a reference
    pub fn is_external_namespace(&self, namespace: &str) -> bool {
        self.external_namespaces.contains(namespace)
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CsdlSchema, Include, Reference};

    fn metadata() -> CsdlMetadata {
        CsdlMetadata::new()
            .with_schema(CsdlSchema::new("Namespace1").with_alias("Namespace1_Alias"))
            .with_reference(Reference {
                uri: "http://docs.oasis-open.org/odata/odata/v4.0/os/vocabularies/Org.OData.Core.V1.xml"
                    .to_string(),
                includes: vec![Include {
                    namespace: "Org.OData.Core.V1".to_string(),
                    alias: Some("Core".to_string()),
                }],
                include_annotations: Vec::new(),
            })
    }

    #[test]
    fn resolves_aliases_and_namespaces() {
        let table = AliasTable::build(&metadata()).unwrap();
        assert_eq!(table.resolve_namespace("Namespace1_Alias"), Some("Namespace1"));
        assert_eq!(table.resolve_namespace("Namespace1"), Some("Namespace1"));
        assert_eq!(table.resolve_namespace("Core"), Some("Org.OData.Core.V1"));
        assert!(table.is_external_namespace("Org.OData.Core.V1"));
        assert_eq!(table.resolve_namespace("Unknown"), None);
    }

    #[test]
    fn rejects_duplicate_namespace() {
        let md = CsdlMetadata::new()
            .with_schema(CsdlSchema::new("NS"))
            .with_schema(CsdlSchema::new("NS"));
        assert!(matches!(
            AliasTable::build(&md),
            Err(ResolutionError::DuplicateNamespace(ns)) if ns == "NS"
        ));
    }

    #[test]
    fn rejects_alias_shadowing_a_namespace() {
        let md = CsdlMetadata::new()
            .with_schema(CsdlSchema::new("NS1"))
            .with_schema(CsdlSchema::new("NS2").with_alias("NS1"));
        assert!(matches!(
            AliasTable::build(&md),
            Err(ResolutionError::DuplicateAlias(a)) if a == "NS1"
        ));
    }
}
