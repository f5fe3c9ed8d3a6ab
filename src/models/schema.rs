//! Schema model for the SDK

use super::annotation::{Annotation, Annotations};
use super::container::EntityContainer;
use super::enum_type::{EnumType, Term, TypeDefinition};
use super::operation::{Action, Function};
use super::structural::{ComplexType, EntityType};
use serde::{Deserialize, Serialize};

/// A CSDL `Schema` element
///
/// Collections are unordered as far as CSDL is concerned; insertion order
/// is kept so diagnostics are deterministic. No validation happens here:
/// duplicate names and dangling references are representable.
///
/// # Example
///
/// ```rust
/// use odata_metadata_sdk::models::{CsdlSchema, EntityType};
///
/// let schema = CsdlSchema::new("Namespace1")
///     .with_alias("Namespace1_Alias")
///     .with_entity_type(EntityType::new("ETTwoKeyNav"));
/// assert!(schema.get_entity_type("ETTwoKeyNav").is_some());
/// assert!(schema.answers_to("Namespace1_Alias"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlSchema {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// XML namespace URI the `Schema` element was declared in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_namespace: Option<String>,
    #[serde(default)]
    pub enum_types: Vec<EnumType>,
    #[serde(default)]
    pub type_definitions: Vec<TypeDefinition>,
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub complex_types: Vec<ComplexType>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub annotation_groups: Vec<Annotations>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_container: Option<EntityContainer>,
}

impl CsdlSchema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_xml_namespace(mut self, uri: impl Into<String>) -> Self {
        self.xml_namespace = Some(uri.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_types.push(entity_type);
        self
    }

    pub fn with_complex_type(mut self, complex_type: ComplexType) -> Self {
        self.complex_types.push(complex_type);
        self
    }

    pub fn with_enum_type(mut self, enum_type: EnumType) -> Self {
        self.enum_types.push(enum_type);
        self
    }

    pub fn with_type_definition(mut self, definition: TypeDefinition) -> Self {
        self.type_definitions.push(definition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_entity_container(mut self, container: EntityContainer) -> Self {
        self.entity_container = Some(container);
        self
    }

    /// True when `namespace_or_alias` names this schema
    pub fn answers_to(&self, namespace_or_alias: &str) -> bool {
        self.namespace == namespace_or_alias || self.alias.as_deref() == Some(namespace_or_alias)
    }

    pub fn get_entity_type(&self, name: &str) -> Option<&EntityType> {
        get_by_name(&self.entity_types, name, |t| &t.name)
    }

    pub fn get_complex_type(&self, name: &str) -> Option<&ComplexType> {
        get_by_name(&self.complex_types, name, |t| &t.name)
    }

    pub fn get_enum_type(&self, name: &str) -> Option<&EnumType> {
        get_by_name(&self.enum_types, name, |t| &t.name)
    }

    pub fn get_type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        get_by_name(&self.type_definitions, name, |t| &t.name)
    }

    pub fn get_term(&self, name: &str) -> Option<&Term> {
        get_by_name(&self.terms, name, |t| &t.name)
    }

    /// All overloads of an action
    pub fn get_actions(&self, name: &str) -> Vec<&Action> {
        get_all_by_name(&self.actions, name, |a| &a.name)
    }

    /// All overloads of a function
    pub fn get_functions(&self, name: &str) -> Vec<&Function> {
        get_all_by_name(&self.functions, name, |f| &f.name)
    }

    /// Annotation group for a target path
    pub fn get_annotation_group(&self, target: &str) -> Option<&Annotations> {
        get_by_name(&self.annotation_groups, target, |g| &g.target)
    }
}

/// First item whose name matches
pub fn get_by_name<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    items.iter().find(|item| key(item) == name)
}

/// Every item whose name matches, for kinds that allow duplicates (overloads)
pub fn get_all_by_name<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &str) -> Vec<&'a T> {
    items.iter().filter(|item| key(item) == name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::operation::Parameter;

    #[test]
    fn overloaded_actions_are_all_returned() {
        let schema = CsdlSchema::new("NS")
            .with_action(
                Action::new("BAETTwoKeyNavRTETTwoKeyNav")
                    .bound(true)
                    .with_parameter(Parameter::new("ParameterETTwoKeyNav", "NS.ETTwoKeyNav")),
            )
            .with_action(
                Action::new("BAETTwoKeyNavRTETTwoKeyNav")
                    .bound(true)
                    .with_parameter(Parameter::new("ParameterETTwoKeyNav", "Collection(NS.ETTwoKeyNav)")),
            );
        assert_eq!(schema.get_actions("BAETTwoKeyNavRTETTwoKeyNav").len(), 2);
        assert!(schema.get_actions("Missing").is_empty());
    }
}
