//! Annotation model
//!
//! Annotations are carried as opaque payload: they are parsed into an
//! expression tree so callers can read them, but the validator never
//! inspects them.

use serde::{Deserialize, Serialize};

/// A single annotation: a term reference plus an optional expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified name of the term (may use an alias)
    pub term: String,
    /// Optional qualifier distinguishing multiple applications of one term
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// Annotation value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,
    /// Annotations on the annotation itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Annotation {
    /// Create an annotation without a value
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }
}

/// An `Annotations` group targeting a model element by path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Target path, e.g. `NS.Container/Customers` or `NS.Customer/Name`
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Annotations {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Find the annotation for a term, ignoring qualifiers
    pub fn get_by_term(&self, term: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.term == term)
    }
}

/// Kind of a constant expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantKind {
    Binary,
    Bool,
    Date,
    DateTimeOffset,
    Decimal,
    Duration,
    EnumMember,
    Float,
    Guid,
    Int,
    String,
    TimeOfDay,
}

impl ConstantKind {
    /// Map a CSDL element or attribute name to a constant kind
    pub fn from_csdl_name(name: &str) -> Option<Self> {
        Some(match name {
            "Binary" => Self::Binary,
            "Bool" => Self::Bool,
            "Date" => Self::Date,
            "DateTimeOffset" => Self::DateTimeOffset,
            "Decimal" => Self::Decimal,
            "Duration" => Self::Duration,
            "EnumMember" => Self::EnumMember,
            "Float" => Self::Float,
            "Guid" => Self::Guid,
            "Int" => Self::Int,
            "String" => Self::String,
            "TimeOfDay" => Self::TimeOfDay,
            _ => return None,
        })
    }
}

/// Kind of a path expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    Path,
    AnnotationPath,
    NavigationPropertyPath,
    PropertyPath,
}

impl PathKind {
    pub fn from_csdl_name(name: &str) -> Option<Self> {
        Some(match name {
            "Path" => Self::Path,
            "AnnotationPath" => Self::AnnotationPath,
            "NavigationPropertyPath" => Self::NavigationPropertyPath,
            "PropertyPath" => Self::PropertyPath,
            _ => return None,
        })
    }
}

/// Logical and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// A property value inside a record expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub property: String,
    pub value: Expression,
}

/// Annotation expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expression {
    Constant {
        constant: ConstantKind,
        value: String,
    },
    Path {
        path: PathKind,
        value: String,
    },
    Null,
    Apply {
        function: String,
        parameters: Vec<Expression>,
    },
    Cast {
        type_name: String,
        value: Box<Expression>,
    },
    IsOf {
        type_name: String,
        value: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Option<Box<Expression>>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        value: Box<Expression>,
    },
    Collection {
        items: Vec<Expression>,
    },
    Record {
        type_name: Option<String>,
        properties: Vec<PropertyValue>,
    },
    LabeledElement {
        name: String,
        value: Box<Expression>,
    },
    LabeledElementReference {
        name: String,
    },
    UrlRef {
        value: Box<Expression>,
    },
}

impl Expression {
    /// Shorthand for a string constant
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Constant {
            constant: ConstantKind::String,
            value: value.into(),
        }
    }

    /// Shorthand for a boolean constant
    pub fn bool(value: bool) -> Self {
        Expression::Constant {
            constant: ConstantKind::Bool,
            value: value.to_string(),
        }
    }

    /// Return the literal text of a constant expression
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Expression::Constant { value, .. } => Some(value),
            _ => None,
        }
    }
}
