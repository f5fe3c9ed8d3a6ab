//! Enum types, type definitions and terms

use super::annotation::Annotation;
use serde::{Deserialize, Serialize};

/// A member of an enum type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    /// Explicit value; implicit members are numbered by position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: Option<i64>) -> Self {
        Self {
            name: name.into(),
            value,
            annotations: Vec::new(),
        }
    }
}

/// `EnumType` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    /// Underlying integer type; `Edm.Int32` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<String>,
    #[serde(default)]
    pub is_flags: bool,
    #[serde(default)]
    pub members: Vec<EnumMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_member(mut self, member: EnumMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn get_member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Underlying type, applying the CSDL default
    pub fn underlying_type(&self) -> &str {
        self.underlying_type.as_deref().unwrap_or("Edm.Int32")
    }

    /// Value of a member, numbering implicit members by position
    pub fn member_value(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .position(|m| m.name == name)
            .map(|idx| self.members[idx].value.unwrap_or(idx as i64))
    }
}

/// `TypeDefinition` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub underlying_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, underlying_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying_type: underlying_type.into(),
            ..Default::default()
        }
    }
}

/// `Term` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_term: Option<String>,
    /// Space-separated list of element kinds the term applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Term {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_member_values_follow_position() {
        let e = EnumType::new("Color")
            .with_member(EnumMember::new("Red", None))
            .with_member(EnumMember::new("Green", None))
            .with_member(EnumMember::new("Blue", Some(8)));
        assert_eq!(e.member_value("Green"), Some(1));
        assert_eq!(e.member_value("Blue"), Some(8));
        assert_eq!(e.member_value("Black"), None);
        assert_eq!(e.underlying_type(), "Edm.Int32");
    }
}
