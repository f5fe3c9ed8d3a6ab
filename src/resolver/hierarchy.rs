//! Inheritance hierarchy of entity and complex types
//!
//! Ancestor chains are computed once per type and cached. A type reached
//! twice in a single walk is an inheritance cycle, which is fatal. A base
//! type that does not resolve is recorded as dangling and the chain stops
//! there; the validator turns it into a diagnostic.

use super::ResolutionError;
use super::index::ItemKind;
use crate::models::{CsdlMetadata, FullQualifiedName, StructuralType};
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, Reversed};
use petgraph::{Directed, Graph};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Resolved inheritance relations for all structural types in a document
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    bases: HashMap<FullQualifiedName, FullQualifiedName>,
    ancestors: HashMap<FullQualifiedName, Vec<FullQualifiedName>>,
    dangling: HashMap<FullQualifiedName, String>,
    /// Edges point from derived to base
    graph: Graph<FullQualifiedName, (), Directed>,
    node_map: HashMap<FullQualifiedName, NodeIndex>,
}

impl TypeHierarchy {
    /// Build the hierarchy.
    ///
    /// `lookup` maps a raw type token (alias or namespace qualified) to the
    /// canonical name and kind of the item it denotes.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InheritanceCycle`] naming the first type
    /// whose base chain loops back on itself.
    pub fn build(
        metadata: &CsdlMetadata,
        lookup: impl Fn(&str) -> Option<(FullQualifiedName, ItemKind)>,
    ) -> Result<Self, ResolutionError> {
        let mut hierarchy = TypeHierarchy::default();

        for schema in &metadata.schemas {
            let ns = schema.namespace.as_str();
            for t in &schema.entity_types {
                hierarchy.register(ns, t, ItemKind::EntityType, &lookup);
            }
            for t in &schema.complex_types {
                hierarchy.register(ns, t, ItemKind::ComplexType, &lookup);
            }
        }

        let mut types: Vec<FullQualifiedName> = hierarchy.node_map.keys().cloned().collect();
        types.sort();
        for fqn in &types {
            hierarchy.walk(fqn)?;
        }

        debug!(
            "Built type hierarchy: {} types, {} inheritance edges, {} dangling base types",
            hierarchy.node_map.len(),
            hierarchy.bases.len(),
            hierarchy.dangling.len()
        );

        Ok(hierarchy)
    }

    fn node(&mut self, fqn: &FullQualifiedName) -> NodeIndex {
        if let Some(idx) = self.node_map.get(fqn) {
            return *idx;
        }
        let idx = self.graph.add_node(fqn.clone());
        self.node_map.insert(fqn.clone(), idx);
        idx
    }

    fn register(
        &mut self,
        ns: &str,
        item: &dyn StructuralType,
        kind: ItemKind,
        lookup: &impl Fn(&str) -> Option<(FullQualifiedName, ItemKind)>,
    ) {
        let fqn = FullQualifiedName::new(ns, item.name());
        let derived = self.node(&fqn);

        let Some(token) = item.base_type() else {
            return;
        };

        match lookup(token) {
            Some((base, base_kind)) if base_kind == kind => {
                let base_node = self.node(&base);
                self.graph.add_edge(derived, base_node, ());
                self.bases.insert(fqn, base);
            }
            _ => {
                self.dangling.insert(fqn, token.to_string());
            }
        }
    }

    fn walk(&mut self, start: &FullQualifiedName) -> Result<(), ResolutionError> {
        if self.ancestors.contains_key(start) {
            return Ok(());
        }

        let mut chain = Vec::new();
        let mut visited = HashSet::from([start.clone()]);
        let mut current = start;

        while let Some(base) = self.bases.get(current) {
            if !visited.insert(base.clone()) {
                return Err(ResolutionError::InheritanceCycle(start.to_string()));
            }
            chain.push(base.clone());
            if let Some(cached) = self.ancestors.get(base) {
                chain.extend(cached.iter().cloned());
                break;
            }
            current = base;
        }

        self.ancestors.insert(start.clone(), chain);
        Ok(())
    }

    /// Direct base of a type, if it resolved
    pub fn base_of(&self, fqn: &FullQualifiedName) -> Option<&FullQualifiedName> {
        self.bases.get(fqn)
    }

    /// Ancestors ordered nearest first; empty for roots and unknown types
    pub fn ancestors(&self, fqn: &FullQualifiedName) -> &[FullQualifiedName] {
        self.ancestors.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw base type token that failed to resolve
    pub fn dangling_base(&self, fqn: &FullQualifiedName) -> Option<&str> {
        self.dangling.get(fqn).map(String::as_str)
    }

    /// True when `ancestor` appears in the chain of `fqn`
    pub fn is_derived_from(&self, fqn: &FullQualifiedName, ancestor: &FullQualifiedName) -> bool {
        self.ancestors(fqn).contains(ancestor)
    }

    /// Every direct and indirect subtype, sorted by name
    pub fn derived_types(&self, fqn: &FullQualifiedName) -> Vec<FullQualifiedName> {
        let Some(&start) = self.node_map.get(fqn) else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut derived = Vec::new();
        while let Some(node) = dfs.next(reversed) {
            if node != start {
                derived.push(self.graph[node].clone());
            }
        }
        derived.sort();
        derived
    }

    /// True when the types are equal or one derives from the other.
    /// Siblings under a common base are not related.
    pub fn same_family(&self, a: &FullQualifiedName, b: &FullQualifiedName) -> bool {
        a == b || self.is_derived_from(a, b) || self.is_derived_from(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplexType, CsdlSchema, EntityType};

    fn lookup_in(md: &CsdlMetadata) -> impl Fn(&str) -> Option<(FullQualifiedName, ItemKind)> + '_ {
        move |token| {
            let (ns, name) = FullQualifiedName::split(token)?;
            let schema = md.schema(ns)?;
            let fqn = FullQualifiedName::new(schema.namespace.as_str(), name);
            if schema.get_entity_type(name).is_some() {
                Some((fqn, ItemKind::EntityType))
            } else if schema.get_complex_type(name).is_some() {
                Some((fqn, ItemKind::ComplexType))
            } else {
                None
            }
        }
    }

    #[test]
    fn ancestor_chain_length_matches_hops() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_alias("A")
                .with_entity_type(EntityType::new("Root").with_key(&["Id"]))
                .with_entity_type(EntityType::new("Mid").with_base_type("A.Root"))
                .with_entity_type(EntityType::new("Leaf").with_base_type("NS.Mid")),
        );
        let h = TypeHierarchy::build(&md, lookup_in(&md)).unwrap();
        let leaf = FullQualifiedName::new("NS", "Leaf");
        let root = FullQualifiedName::new("NS", "Root");

        assert_eq!(
            h.ancestors(&leaf),
            &[FullQualifiedName::new("NS", "Mid"), root.clone()]
        );
        assert!(h.ancestors(&root).is_empty());
        assert!(h.is_derived_from(&leaf, &root));
        assert_eq!(
            h.derived_types(&root),
            vec![leaf.clone(), FullQualifiedName::new("NS", "Mid")]
        );
    }

    #[test]
    fn siblings_are_not_one_family() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("Root").with_key(&["Id"]))
                .with_entity_type(EntityType::new("Left").with_base_type("NS.Root"))
                .with_entity_type(EntityType::new("Right").with_base_type("NS.Root")),
        );
        let h = TypeHierarchy::build(&md, lookup_in(&md)).unwrap();
        let root = FullQualifiedName::new("NS", "Root");
        let left = FullQualifiedName::new("NS", "Left");
        let right = FullQualifiedName::new("NS", "Right");

        assert!(h.same_family(&left, &left));
        assert!(h.same_family(&left, &root));
        assert!(h.same_family(&root, &right));
        assert!(!h.same_family(&left, &right));
    }

    #[test]
    fn cycle_is_fatal() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("A").with_base_type("NS.B"))
                .with_entity_type(EntityType::new("B").with_base_type("NS.A")),
        );
        assert!(matches!(
            TypeHierarchy::build(&md, lookup_in(&md)),
            Err(ResolutionError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn base_of_wrong_kind_is_dangling() {
        let md = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("Person"))
                .with_complex_type(ComplexType::new("Address").with_base_type("NS.Person")),
        );
        let h = TypeHierarchy::build(&md, lookup_in(&md)).unwrap();
        let address = FullQualifiedName::new("NS", "Address");
        assert_eq!(h.dangling_base(&address), Some("NS.Person"));
        assert!(h.ancestors(&address).is_empty());
    }
}
