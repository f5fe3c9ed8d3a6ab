//! Structural types: entity types, complex types and their members
//!
//! Type references (`type_name`, `base_type`) are stored as the raw strings
//! found in the document. They may use a namespace alias and are only
//! checked by the resolver and validator.

use super::annotation::Annotation;
use super::qualified_name::{join_collection, split_collection};
use serde::{Deserialize, Serialize};

/// A structural property
///
/// Facets are presentation-only and never checked for consistency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Element type without the `Collection(...)` wrapper
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Scale is either a number or `variable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Property {
    /// Create a property from a type reference, which may be `Collection(...)`
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::models::Property;
    ///
    /// let p = Property::new("Tags", "Collection(Edm.String)");
    /// assert_eq!(p.type_name, "Edm.String");
    /// assert!(p.is_collection);
    /// ```
    pub fn new(name: impl Into<String>, type_ref: &str) -> Self {
        let (type_name, is_collection) = split_collection(type_ref);
        Self {
            name: name.into(),
            type_name: type_name.to_string(),
            is_collection,
            ..Default::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Type reference as written in CSDL, including the collection wrapper
    pub fn type_ref(&self) -> String {
        join_collection(&self.type_name, self.is_collection)
    }
}

/// `OnDelete` action of a navigation property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDeleteAction {
    Cascade,
    None,
    SetNull,
    SetDefault,
}

impl OnDeleteAction {
    pub fn from_csdl(value: &str) -> Option<Self> {
        match value {
            "Cascade" => Some(Self::Cascade),
            "None" => Some(Self::None),
            "SetNull" => Some(Self::SetNull),
            "SetDefault" => Some(Self::SetDefault),
            _ => None,
        }
    }
}

/// A source-property to target-property equality on a navigation property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferentialConstraint {
    /// Property (path) on the declaring type
    pub property: String,
    /// Property (path) on the navigation target type
    pub referenced_property: String,
}

impl ReferentialConstraint {
    pub fn new(property: impl Into<String>, referenced_property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            referenced_property: referenced_property.into(),
        }
    }
}

/// A typed relationship to an entity type or a collection of it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationProperty {
    pub name: String,
    /// Target entity type without the `Collection(...)` wrapper
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Name of the navigation property on the target type pointing back here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
    #[serde(default)]
    pub contains_target: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referential_constraints: Vec<ReferentialConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<OnDeleteAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl NavigationProperty {
    pub fn new(name: impl Into<String>, type_ref: &str) -> Self {
        let (type_name, is_collection) = split_collection(type_ref);
        Self {
            name: name.into(),
            type_name: type_name.to_string(),
            is_collection,
            ..Default::default()
        }
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn with_constraint(mut self, constraint: ReferentialConstraint) -> Self {
        self.referential_constraints.push(constraint);
        self
    }

    pub fn type_ref(&self) -> String {
        join_collection(&self.type_name, self.is_collection)
    }
}

/// Reference to a key property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    /// Property name or path into a complex property
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl PropertyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// Behaviour shared by entity and complex types
///
/// The resolver walks inheritance chains through this trait, so both kinds
/// are handled by one code path.
pub trait StructuralType {
    fn name(&self) -> &str;
    fn base_type(&self) -> Option<&str>;
    fn is_abstract(&self) -> bool;
    fn is_open_type(&self) -> bool;
    fn properties(&self) -> &[Property];
    fn navigation_properties(&self) -> &[NavigationProperty];

    /// Locally declared property by name
    fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Locally declared navigation property by name
    fn get_navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties().iter().find(|p| p.name == name)
    }
}

/// `EntityType` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_open_type: bool,
    #[serde(default)]
    pub has_stream: bool,
    /// Locally declared key; empty when inherited or missing
    #[serde(default)]
    pub key: Vec<PropertyRef>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub navigation_properties: Vec<NavigationProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl EntityType {
    /// Create an empty entity type
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::models::{EntityType, Property};
    ///
    /// let et = EntityType::new("ETTwoKeyNav")
    ///     .with_key(&["PropertyInt16", "PropertyString"])
    ///     .with_property(Property::new("PropertyInt16", "Edm.Int16"))
    ///     .with_property(Property::new("PropertyString", "Edm.String"));
    /// assert_eq!(et.key.len(), 2);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_key(mut self, names: &[&str]) -> Self {
        self.key = names.iter().map(|n| PropertyRef::new(*n)).collect();
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation_property(mut self, navigation: NavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }
}

impl StructuralType for EntityType {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_type(&self) -> Option<&str> {
        self.base_type.as_deref()
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_open_type(&self) -> bool {
        self.is_open_type
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }

    fn navigation_properties(&self) -> &[NavigationProperty] {
        &self.navigation_properties
    }
}

/// `ComplexType` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexType {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_open_type: bool,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub navigation_properties: Vec<NavigationProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation_property(mut self, navigation: NavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }
}

impl StructuralType for ComplexType {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_type(&self) -> Option<&str> {
        self.base_type.as_deref()
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_open_type(&self) -> bool {
        self.is_open_type
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }

    fn navigation_properties(&self) -> &[NavigationProperty] {
        &self.navigation_properties
    }
}
