//! Entity containers and their members

use super::annotation::Annotation;
use serde::{Deserialize, Serialize};

/// A (path, target) pair on an entity set or singleton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPropertyBinding {
    /// Slash-separated path; segments are navigation or complex property
    /// names, or qualified type-cast segments
    pub path: String,
    /// `Name` in the same container, or `Namespace.Container/Name`
    pub target: String,
}

impl NavigationPropertyBinding {
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }

    /// Split a qualified target into container and member name
    pub fn qualified_target(&self) -> Option<(&str, &str)> {
        self.target.split_once('/')
    }
}

/// `EntitySet` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub name: String,
    /// Qualified entity type reference
    pub entity_type: String,
    #[serde(default = "default_true")]
    pub include_in_service_document: bool,
    #[serde(default)]
    pub navigation_property_bindings: Vec<NavigationPropertyBinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

fn default_true() -> bool {
    true
}

impl EntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            include_in_service_document: true,
            navigation_property_bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.navigation_property_bindings
            .push(NavigationPropertyBinding::new(path, target));
        self
    }
}

/// `Singleton` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Singleton {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub navigation_property_bindings: Vec<NavigationPropertyBinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Singleton {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            navigation_property_bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.navigation_property_bindings
            .push(NavigationPropertyBinding::new(path, target));
        self
    }
}

/// Either kind of binding target, borrowed from a container
#[derive(Debug, Clone, Copy)]
pub enum BindingTarget<'a> {
    EntitySet(&'a EntitySet),
    Singleton(&'a Singleton),
}

impl<'a> BindingTarget<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            BindingTarget::EntitySet(s) => &s.name,
            BindingTarget::Singleton(s) => &s.name,
        }
    }

    /// Entity type reference of the set or singleton
    pub fn entity_type(&self) -> &'a str {
        match self {
            BindingTarget::EntitySet(s) => &s.entity_type,
            BindingTarget::Singleton(s) => &s.type_name,
        }
    }

    pub fn navigation_property_bindings(&self) -> &'a [NavigationPropertyBinding] {
        match self {
            BindingTarget::EntitySet(s) => &s.navigation_property_bindings,
            BindingTarget::Singleton(s) => &s.navigation_property_bindings,
        }
    }
}

/// `ActionImport` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionImport {
    pub name: String,
    /// Qualified action reference
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ActionImport {
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            entity_set: None,
            annotations: Vec::new(),
        }
    }
}

/// `FunctionImport` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionImport {
    pub name: String,
    /// Qualified function reference
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set: Option<String>,
    #[serde(default)]
    pub include_in_service_document: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl FunctionImport {
    pub fn new(name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            entity_set: None,
            include_in_service_document: false,
            annotations: Vec::new(),
        }
    }
}

/// `EntityContainer` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityContainer {
    pub name: String,
    /// Qualified name of a container this one extends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub entity_sets: Vec<EntitySet>,
    #[serde(default)]
    pub singletons: Vec<Singleton>,
    #[serde(default)]
    pub action_imports: Vec<ActionImport>,
    #[serde(default)]
    pub function_imports: Vec<FunctionImport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl EntityContainer {
    /// Create an empty container
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::models::{EntityContainer, EntitySet};
    ///
    /// let container = EntityContainer::new("Container")
    ///     .with_entity_set(EntitySet::new("ESTwoKeyNav", "NS.ETTwoKeyNav"));
    /// assert!(container.get_binding_target("ESTwoKeyNav").is_some());
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_extends(mut self, extends: impl Into<String>) -> Self {
        self.extends = Some(extends.into());
        self
    }

    pub fn with_entity_set(mut self, entity_set: EntitySet) -> Self {
        self.entity_sets.push(entity_set);
        self
    }

    pub fn with_singleton(mut self, singleton: Singleton) -> Self {
        self.singletons.push(singleton);
        self
    }

    pub fn with_action_import(mut self, import: ActionImport) -> Self {
        self.action_imports.push(import);
        self
    }

    pub fn with_function_import(mut self, import: FunctionImport) -> Self {
        self.function_imports.push(import);
        self
    }

    pub fn get_entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn get_singleton(&self, name: &str) -> Option<&Singleton> {
        self.singletons.iter().find(|s| s.name == name)
    }

    /// Entity set or singleton with the given name; entity sets win on a clash
    pub fn get_binding_target(&self, name: &str) -> Option<BindingTarget<'_>> {
        self.get_entity_set(name)
            .map(BindingTarget::EntitySet)
            .or_else(|| self.get_singleton(name).map(BindingTarget::Singleton))
    }

    /// All entity sets and singletons, entity sets first
    pub fn binding_targets(&self) -> impl Iterator<Item = BindingTarget<'_>> {
        self.entity_sets
            .iter()
            .map(BindingTarget::EntitySet)
            .chain(self.singletons.iter().map(BindingTarget::Singleton))
    }

    pub fn get_action_import(&self, name: &str) -> Option<&ActionImport> {
        self.action_imports.iter().find(|i| i.name == name)
    }

    pub fn get_function_import(&self, name: &str) -> Option<&FunctionImport> {
        self.function_imports.iter().find(|i| i.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_binding_target_splits_on_slash() {
        let b = NavigationPropertyBinding::new("NavPropertyETKeyNavOne", "NS.Other/ESKeyNav");
        assert_eq!(b.qualified_target(), Some(("NS.Other", "ESKeyNav")));
        let local = NavigationPropertyBinding::new("NavPropertyETKeyNavOne", "ESKeyNav");
        assert_eq!(local.qualified_target(), None);
    }

    #[test]
    fn binding_target_lookup_covers_singletons() {
        let c = EntityContainer::new("Container")
            .with_entity_set(EntitySet::new("People", "NS.Person"))
            .with_singleton(Singleton::new("Me", "NS.Person"));
        let me = c.get_binding_target("Me").unwrap();
        assert!(matches!(me, BindingTarget::Singleton(_)));
        assert_eq!(me.entity_type(), "NS.Person");
        assert_eq!(c.binding_targets().count(), 2);
    }
}
