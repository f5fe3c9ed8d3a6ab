//! Index of named schema items
//!
//! Built by a single pass over all schemas. Locations are positions into
//! the owned metadata tree, so the index itself holds no borrows.

use crate::models::{CsdlMetadata, FullQualifiedName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Kind of a uniquely named schema item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    EntityType,
    ComplexType,
    EnumType,
    TypeDefinition,
    Term,
    EntityContainer,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::EntityType => "EntityType",
            ItemKind::ComplexType => "ComplexType",
            ItemKind::EnumType => "EnumType",
            ItemKind::TypeDefinition => "TypeDefinition",
            ItemKind::Term => "Term",
            ItemKind::EntityContainer => "EntityContainer",
        };
        f.write_str(label)
    }
}

/// Where an item lives in the metadata tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemLocation {
    /// Position of the schema in `CsdlMetadata::schemas`
    pub schema: usize,
    pub kind: ItemKind,
    /// Position within the schema's collection for `kind`
    pub index: usize,
}

/// Canonical qualified name to item location
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    items: HashMap<FullQualifiedName, ItemLocation>,
    actions: HashMap<FullQualifiedName, Vec<(usize, usize)>>,
    functions: HashMap<FullQualifiedName, Vec<(usize, usize)>>,
    containers: Vec<FullQualifiedName>,
}

impl SchemaIndex {
    /// Index every named item. Duplicate names keep the first declaration.
    pub fn build(metadata: &CsdlMetadata) -> Self {
        let mut index = SchemaIndex::default();

        for (schema_idx, schema) in metadata.schemas.iter().enumerate() {
            let ns = schema.namespace.as_str();

            for (i, t) in schema.entity_types.iter().enumerate() {
                index.insert(ns, &t.name, schema_idx, ItemKind::EntityType, i);
            }
            for (i, t) in schema.complex_types.iter().enumerate() {
                index.insert(ns, &t.name, schema_idx, ItemKind::ComplexType, i);
            }
            for (i, t) in schema.enum_types.iter().enumerate() {
                index.insert(ns, &t.name, schema_idx, ItemKind::EnumType, i);
            }
            for (i, t) in schema.type_definitions.iter().enumerate() {
                index.insert(ns, &t.name, schema_idx, ItemKind::TypeDefinition, i);
            }
            for (i, t) in schema.terms.iter().enumerate() {
                index.insert(ns, &t.name, schema_idx, ItemKind::Term, i);
            }
            if let Some(container) = &schema.entity_container {
                index.insert(ns, &container.name, schema_idx, ItemKind::EntityContainer, 0);
                index
                    .containers
                    .push(FullQualifiedName::new(ns, container.name.as_str()));
            }

            for (i, action) in schema.actions.iter().enumerate() {
                index
                    .actions
                    .entry(FullQualifiedName::new(ns, action.name.as_str()))
                    .or_default()
                    .push((schema_idx, i));
            }
            for (i, function) in schema.functions.iter().enumerate() {
                index
                    .functions
                    .entry(FullQualifiedName::new(ns, function.name.as_str()))
                    .or_default()
                    .push((schema_idx, i));
            }
        }

        debug!(
            "Indexed {} schemas: {} items, {} actions, {} functions",
            metadata.schemas.len(),
            index.items.len(),
            index.actions.len(),
            index.functions.len()
        );

        index
    }

    fn insert(&mut self, ns: &str, name: &str, schema: usize, kind: ItemKind, idx: usize) {
        let fqn = FullQualifiedName::new(ns, name);
        if let Some(existing) = self.items.get(&fqn) {
            warn!(
                "Duplicate schema item {}: {} ignored, keeping {}",
                fqn, kind, existing.kind
            );
            return;
        }
        self.items.insert(
            fqn,
            ItemLocation {
                schema,
                kind,
                index: idx,
            },
        );
    }

    pub fn get(&self, fqn: &FullQualifiedName) -> Option<ItemLocation> {
        self.items.get(fqn).copied()
    }

    /// `(schema, index)` of every overload of an action
    pub fn actions(&self, fqn: &FullQualifiedName) -> &[(usize, usize)] {
        self.actions.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(schema, index)` of every overload of a function
    pub fn functions(&self, fqn: &FullQualifiedName) -> &[(usize, usize)] {
        self.functions.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when an action or function with this name exists
    pub fn has_operation(&self, fqn: &FullQualifiedName) -> bool {
        self.actions.contains_key(fqn) || self.functions.contains_key(fqn)
    }

    /// Qualified names of all containers, in schema order
    pub fn containers(&self) -> &[FullQualifiedName] {
        &self.containers
    }

    /// Every indexed item of one kind
    pub fn items_of_kind(
        &self,
        kind: ItemKind,
    ) -> impl Iterator<Item = (&FullQualifiedName, ItemLocation)> {
        self.items
            .iter()
            .filter(move |(_, loc)| loc.kind == kind)
            .map(|(fqn, loc)| (fqn, *loc))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, ComplexType, CsdlSchema, EntityContainer, EntityType};

    #[test]
    fn indexes_items_by_canonical_name() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_alias("A")
                .with_entity_type(EntityType::new("Customer"))
                .with_complex_type(ComplexType::new("Address"))
                .with_action(Action::new("Reset"))
                .with_action(Action::new("Reset"))
                .with_entity_container(EntityContainer::new("Container")),
        );
        let index = SchemaIndex::build(&md);

        let loc = index.get(&FullQualifiedName::new("NS", "Customer")).unwrap();
        assert_eq!(loc.kind, ItemKind::EntityType);
        assert!(index.get(&FullQualifiedName::new("A", "Customer")).is_none());
        assert_eq!(index.actions(&FullQualifiedName::new("NS", "Reset")).len(), 2);
        assert_eq!(index.containers(), &[FullQualifiedName::new("NS", "Container")]);
    }

    #[test]
    fn first_declaration_wins_on_duplicates() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("Thing"))
                .with_complex_type(ComplexType::new("Thing")),
        );
        let index = SchemaIndex::build(&md);
        let loc = index.get(&FullQualifiedName::new("NS", "Thing")).unwrap();
        assert_eq!(loc.kind, ItemKind::EntityType);
        assert_eq!(index.len(), 1);
    }
}
