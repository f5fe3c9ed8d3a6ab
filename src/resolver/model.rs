//! Resolved metadata model
//!
//! Owns the raw tree behind an `Arc` together with the alias table, the
//! item index and the inheritance hierarchy. Built once, read-only after
//! that, and safe to share between threads.

use super::ResolutionError;
use super::alias::AliasTable;
use super::hierarchy::TypeHierarchy;
use super::index::{ItemKind, ItemLocation, SchemaIndex};
use super::type_ref::{EDM_NAMESPACE, EdmPrimitiveType, TypeReference, TypeTarget};
use crate::models::qualified_name::join_collection;
use crate::models::{
    Action, ActionImport, BindingTarget, ComplexType, CsdlMetadata, CsdlSchema, EntityContainer, EntityType,
    EnumType, FullQualifiedName, Function, FunctionImport, NavigationProperty, Property, PropertyRef,
    StructuralType, Term, TypeDefinition,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// What a resolved type reference denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedTypeKind {
    Primitive(EdmPrimitiveType),
    Item(ItemKind),
    /// Namespace pulled in through an `edmx:Reference`; the item itself is
    /// not part of this document
    External,
}

/// A type reference bound to its canonical qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub name: FullQualifiedName,
    pub is_collection: bool,
    pub kind: ResolvedTypeKind,
}

impl ResolvedType {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, ResolvedTypeKind::Primitive(_))
    }

    pub fn is_entity_type(&self) -> bool {
        self.kind == ResolvedTypeKind::Item(ItemKind::EntityType)
    }
}

/// Namespace-qualified form, `Collection(...)` preserved
impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_collection(&self.name.to_string(), self.is_collection))
    }
}

/// Indexed, alias-free view over one metadata document
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    metadata: Arc<CsdlMetadata>,
    aliases: AliasTable,
    index: SchemaIndex,
    hierarchy: TypeHierarchy,
}

impl ResolvedModel {
    pub(crate) fn build(metadata: Arc<CsdlMetadata>) -> Result<Self, ResolutionError> {
        let aliases = AliasTable::build(&metadata)?;
        let index = SchemaIndex::build(&metadata);
        let hierarchy = TypeHierarchy::build(&metadata, |token| {
            let (ns, name) = FullQualifiedName::split(token)?;
            let ns = aliases.resolve_namespace(ns)?;
            let fqn = FullQualifiedName::new(ns, name);
            let loc = index.get(&fqn)?;
            Some((fqn, loc.kind))
        })?;

        info!(
            "Resolved metadata: {} schemas, {} items, {} aliases",
            metadata.schemas.len(),
            index.len(),
            aliases.alias_count()
        );

        Ok(Self {
            metadata,
            aliases,
            index,
            hierarchy,
        })
    }

    /// Raw tree this model was built from
    pub fn metadata(&self) -> &CsdlMetadata {
        &self.metadata
    }

    pub fn shared_metadata(&self) -> Arc<CsdlMetadata> {
        Arc::clone(&self.metadata)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn schemas(&self) -> &[CsdlSchema] {
        &self.metadata.schemas
    }

    /// Replace the alias in a qualified name with its namespace.
    ///
    /// Only the namespace is checked; the item may not exist.
    pub fn resolve_name(&self, token: &str) -> Result<FullQualifiedName, ResolutionError> {
        let (ns, name) = FullQualifiedName::split(token)
            .ok_or_else(|| ResolutionError::InvalidTypeReference(token.to_string()))?;
        if ns == EDM_NAMESPACE {
            return Ok(FullQualifiedName::new(ns, name));
        }
        let namespace =
            self.aliases
                .resolve_namespace(ns)
                .ok_or_else(|| ResolutionError::UnknownNamespace {
                    token: token.to_string(),
                    namespace: ns.to_string(),
                })?;
        Ok(FullQualifiedName::new(namespace, name))
    }

    /// Resolve a qualified name to a uniquely named item
    pub fn lookup(&self, token: &str) -> Result<(FullQualifiedName, ItemLocation), ResolutionError> {
        let fqn = self.resolve_name(token)?;
        match self.index.get(&fqn) {
            Some(loc) => Ok((fqn, loc)),
            None => Err(ResolutionError::UnknownType {
                token: token.to_string(),
                qualified_name: fqn.to_string(),
            }),
        }
    }

    /// Resolve a raw type reference such as `Collection(Alias.Customer)`.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::UnknownNamespace`] when neither a namespace nor an
    /// alias matches, [`ResolutionError::UnknownType`] when the namespace is
    /// local but holds no such item.
    pub fn resolve_type(&self, token: &str) -> Result<ResolvedType, ResolutionError> {
        let reference = TypeReference::parse(token)?;
        match reference.target {
            TypeTarget::Primitive(primitive) => Ok(ResolvedType {
                name: FullQualifiedName::new(EDM_NAMESPACE, primitive.name()),
                is_collection: reference.is_collection,
                kind: ResolvedTypeKind::Primitive(primitive),
            }),
            TypeTarget::Named(raw) => {
                let namespace = self.aliases.resolve_namespace(&raw.namespace).ok_or_else(|| {
                    ResolutionError::UnknownNamespace {
                        token: token.to_string(),
                        namespace: raw.namespace.clone(),
                    }
                })?;
                let name = FullQualifiedName::new(namespace, raw.name.as_str());

                let kind = if let Some(loc) = self.index.get(&name) {
                    ResolvedTypeKind::Item(loc.kind)
                } else if self.aliases.is_external_namespace(namespace) {
                    ResolvedTypeKind::External
                } else {
                    return Err(ResolutionError::UnknownType {
                        token: token.to_string(),
                        qualified_name: name.to_string(),
                    });
                };

                Ok(ResolvedType {
                    name,
                    is_collection: reference.is_collection,
                    kind,
                })
            }
        }
    }

    /// Namespace-qualified form of a type reference
    pub fn canonical_name(&self, token: &str) -> Result<String, ResolutionError> {
        self.resolve_type(token).map(|t| t.to_string())
    }

    fn located(&self, fqn: &FullQualifiedName, kind: ItemKind) -> Option<(&CsdlSchema, usize)> {
        let loc = self.index.get(fqn).filter(|loc| loc.kind == kind)?;
        let schema = self.metadata.schemas.get(loc.schema)?;
        Some((schema, loc.index))
    }

    pub fn entity_type(&self, fqn: &FullQualifiedName) -> Option<&EntityType> {
        let (schema, i) = self.located(fqn, ItemKind::EntityType)?;
        schema.entity_types.get(i)
    }

    pub fn complex_type(&self, fqn: &FullQualifiedName) -> Option<&ComplexType> {
        let (schema, i) = self.located(fqn, ItemKind::ComplexType)?;
        schema.complex_types.get(i)
    }

    pub fn enum_type(&self, fqn: &FullQualifiedName) -> Option<&EnumType> {
        let (schema, i) = self.located(fqn, ItemKind::EnumType)?;
        schema.enum_types.get(i)
    }

    pub fn type_definition(&self, fqn: &FullQualifiedName) -> Option<&TypeDefinition> {
        let (schema, i) = self.located(fqn, ItemKind::TypeDefinition)?;
        schema.type_definitions.get(i)
    }

    pub fn term(&self, fqn: &FullQualifiedName) -> Option<&Term> {
        let (schema, i) = self.located(fqn, ItemKind::Term)?;
        schema.terms.get(i)
    }

    pub fn entity_container(&self, fqn: &FullQualifiedName) -> Option<&EntityContainer> {
        let (schema, _) = self.located(fqn, ItemKind::EntityContainer)?;
        schema.entity_container.as_ref()
    }

    /// Entity or complex type, whichever the name denotes
    pub fn structural_type(&self, fqn: &FullQualifiedName) -> Option<&dyn StructuralType> {
        if let Some(t) = self.entity_type(fqn) {
            return Some(t as &dyn StructuralType);
        }
        self.complex_type(fqn).map(|t| t as &dyn StructuralType)
    }

    /// Every overload of an action
    pub fn actions(&self, fqn: &FullQualifiedName) -> Vec<&Action> {
        self.index
            .actions(fqn)
            .iter()
            .filter_map(|&(s, i)| self.metadata.schemas.get(s)?.actions.get(i))
            .collect()
    }

    /// Every overload of a function
    pub fn functions(&self, fqn: &FullQualifiedName) -> Vec<&Function> {
        self.index
            .functions(fqn)
            .iter()
            .filter_map(|&(s, i)| self.metadata.schemas.get(s)?.functions.get(i))
            .collect()
    }

    /// All entity types with their canonical names, in document order
    pub fn entity_types(&self) -> impl Iterator<Item = (FullQualifiedName, &EntityType)> {
        self.metadata.schemas.iter().flat_map(|s| {
            s.entity_types
                .iter()
                .map(move |t| (FullQualifiedName::new(s.namespace.as_str(), t.name.as_str()), t))
        })
    }

    /// All complex types with their canonical names, in document order
    pub fn complex_types(&self) -> impl Iterator<Item = (FullQualifiedName, &ComplexType)> {
        self.metadata.schemas.iter().flat_map(|s| {
            s.complex_types
                .iter()
                .map(move |t| (FullQualifiedName::new(s.namespace.as_str(), t.name.as_str()), t))
        })
    }

    /// All containers with their canonical names, in document order
    pub fn containers(&self) -> impl Iterator<Item = (FullQualifiedName, &EntityContainer)> {
        self.metadata.schemas.iter().filter_map(|s| {
            let container = s.entity_container.as_ref()?;
            Some((
                FullQualifiedName::new(s.namespace.as_str(), container.name.as_str()),
                container,
            ))
        })
    }

    /// A container followed by every container it extends.
    ///
    /// An `Extends` that does not resolve ends the chain, and so does a
    /// container seen before.
    pub fn container_chain(
        &self,
        fqn: &FullQualifiedName,
    ) -> Vec<(FullQualifiedName, &EntityContainer)> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(fqn.clone());

        while let Some(current) = next.take() {
            if !seen.insert(current.clone()) {
                debug!("Container {} extends itself through its chain", current);
                break;
            }
            let Some(container) = self.entity_container(&current) else {
                break;
            };
            next = container
                .extends
                .as_deref()
                .and_then(|token| self.resolve_name(token).ok());
            chain.push((current, container));
        }

        chain
    }

    /// Entity set or singleton visible from a container, including the
    /// containers it extends. Returns the owning container's name.
    pub fn find_binding_target(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> Option<(FullQualifiedName, BindingTarget<'_>)> {
        self.container_chain(container)
            .into_iter()
            .find_map(|(fqn, c)| c.get_binding_target(name).map(|target| (fqn, target)))
    }

    /// Action import visible from a container
    pub fn find_action_import(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> Option<&ActionImport> {
        self.container_chain(container)
            .into_iter()
            .find_map(|(_, c)| c.get_action_import(name))
    }

    /// Function import visible from a container
    pub fn find_function_import(
        &self,
        container: &FullQualifiedName,
        name: &str,
    ) -> Option<&FunctionImport> {
        self.container_chain(container)
            .into_iter()
            .find_map(|(_, c)| c.get_function_import(name))
    }

    /// Ancestors of a structural type, nearest first
    pub fn ancestors(&self, fqn: &FullQualifiedName) -> &[FullQualifiedName] {
        self.hierarchy.ancestors(fqn)
    }

    /// Base type token of `fqn` that did not resolve
    pub fn dangling_base_type(&self, fqn: &FullQualifiedName) -> Option<&str> {
        self.hierarchy.dangling_base(fqn)
    }

    pub fn is_derived_from(&self, fqn: &FullQualifiedName, ancestor: &FullQualifiedName) -> bool {
        self.hierarchy.is_derived_from(fqn, ancestor)
    }

    pub fn derived_types(&self, fqn: &FullQualifiedName) -> Vec<FullQualifiedName> {
        self.hierarchy.derived_types(fqn)
    }

    /// The type itself followed by its ancestors
    fn lineage<'a>(
        &'a self,
        fqn: &'a FullQualifiedName,
    ) -> impl Iterator<Item = &'a FullQualifiedName> + 'a {
        std::iter::once(fqn).chain(self.ancestors(fqn).iter())
    }

    /// Key of an entity type, declared locally or inherited
    pub fn key_of(&self, fqn: &FullQualifiedName) -> Option<&[PropertyRef]> {
        self.lineage(fqn)
            .filter_map(|t| self.entity_type(t))
            .find(|t| !t.key.is_empty())
            .map(|t| t.key.as_slice())
    }

    /// Structural property declared on the type or an ancestor
    pub fn find_property(&self, fqn: &FullQualifiedName, name: &str) -> Option<&Property> {
        self.lineage(fqn)
            .filter_map(|t| self.structural_type(t))
            .find_map(|t| t.get_property(name))
    }

    /// Navigation property declared on the type or an ancestor
    pub fn find_navigation_property(
        &self,
        fqn: &FullQualifiedName,
        name: &str,
    ) -> Option<&NavigationProperty> {
        self.lineage(fqn)
            .filter_map(|t| self.structural_type(t))
            .find_map(|t| t.get_navigation_property(name))
    }

    /// Every structural property of a type, root ancestor's first
    pub fn all_properties(&self, fqn: &FullQualifiedName) -> Vec<&Property> {
        let mut lineage: Vec<&FullQualifiedName> = self.lineage(fqn).collect();
        lineage.reverse();
        lineage
            .into_iter()
            .filter_map(|t| self.structural_type(t))
            .flat_map(|t| t.properties().iter())
            .collect()
    }
}
