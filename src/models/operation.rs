//! Actions and functions

use super::annotation::Annotation;
use super::qualified_name::{join_collection, split_collection};
use serde::{Deserialize, Serialize};

/// Operation parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_ref: &str) -> Self {
        let (type_name, is_collection) = split_collection(type_ref);
        Self {
            name: name.into(),
            type_name: type_name.to_string(),
            is_collection,
            ..Default::default()
        }
    }

    pub fn type_ref(&self) -> String {
        join_collection(&self.type_name, self.is_collection)
    }
}

/// Operation return type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnType {
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl ReturnType {
    pub fn new(type_ref: &str) -> Self {
        let (type_name, is_collection) = split_collection(type_ref);
        Self {
            type_name: type_name.to_string(),
            is_collection,
            nullable: None,
        }
    }
}

/// Shape shared by actions and functions
pub trait Operation {
    fn name(&self) -> &str;
    fn is_bound(&self) -> bool;
    fn parameters(&self) -> &[Parameter];
    fn return_type(&self) -> Option<&ReturnType>;

    /// The binding parameter of a bound operation (always the first one)
    fn binding_parameter(&self) -> Option<&Parameter> {
        if self.is_bound() {
            self.parameters().first()
        } else {
            None
        }
    }
}

/// `Action` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn bound(mut self, is_bound: bool) -> Self {
        self.is_bound = is_bound;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

impl Operation for Action {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bound(&self) -> bool {
        self.is_bound
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&ReturnType> {
        self.return_type.as_ref()
    }
}

/// `Function` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub is_composable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Required by CSDL for functions, but kept optional while building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn bound(mut self, is_bound: bool) -> Self {
        self.is_bound = is_bound;
        self
    }

    pub fn composable(mut self, is_composable: bool) -> Self {
        self.is_composable = is_composable;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

impl Operation for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_bound(&self) -> bool {
        self.is_bound
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&ReturnType> {
        self.return_type.as_ref()
    }
}
