//! CSDL XML (EDMX) reader
//!
//! Deserializes the document with `quick-xml`'s serde support into a set of
//! `De*` structs mirroring the EDMX elements, then converts them into the
//! item model. Element prefixes (`edmx:`) are ignored by the deserializer.
//!
//! Children CSDL allows in any order are collected per element name, which
//! needs the `overlapped-lists` feature. Elements the model has no place
//! for (V2 `Association`, `AssociationSet`, ...) are skipped, so V2/V3
//! documents still load far enough to be classified.

use super::ImportError;
use crate::models::qualified_name::split_collection;
use crate::models::{
    Action, ActionImport, Annotation, Annotations, BinaryOperator, ComplexType, ConstantKind,
    CsdlMetadata, CsdlSchema, EntityContainer, EntitySet, EntityType, EnumMember, EnumType,
    Expression, Function, FunctionImport, Include, IncludeAnnotations, NavigationProperty,
    NavigationPropertyBinding, OnDeleteAction, Parameter, PathKind, Property, PropertyRef,
    PropertyValue, Reference, ReferentialConstraint, ReturnType, Singleton, Term, TypeDefinition,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Reader for CSDL XML documents
#[derive(Debug, Default)]
pub struct XmlMetadataImporter;

impl XmlMetadataImporter {
    /// Create a new XML reader.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::import::xml::XmlMetadataImporter;
    ///
    /// let importer = XmlMetadataImporter::new();
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Parse an EDMX document into the raw item tree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::import::xml::XmlMetadataImporter;
    ///
    /// let xml = r#"
    /// <edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
    ///   <edmx:DataServices>
    ///     <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS" Alias="A">
    ///       <EntityType Name="Customer">
    ///         <Key><PropertyRef Name="ID"/></Key>
    ///         <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
    ///       </EntityType>
    ///     </Schema>
    ///   </edmx:DataServices>
    /// </edmx:Edmx>"#;
    /// let metadata = XmlMetadataImporter::new().import(xml).unwrap();
    /// let schema = metadata.schema("A").unwrap();
    /// assert_eq!(schema.entity_types[0].key[0].name, "ID");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ParseError`] for malformed XML or attribute
    /// values of the wrong type.
    pub fn import(&self, content: &str) -> Result<CsdlMetadata, ImportError> {
        let edmx: DeEdmx = quick_xml::de::from_str(content)
            .map_err(|e| ImportError::ParseError(format!("Failed to parse EDMX: {}", e)))?;
        let metadata = edmx.into_metadata();
        debug!(
            "Parsed EDMX document: {} schemas, {} references",
            metadata.schemas.len(),
            metadata.references.len()
        );
        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct DeEdmx {
    #[serde(rename = "@Version")]
    version: Option<String>,
    #[serde(rename = "Reference", default)]
    references: Vec<DeReference>,
    #[serde(rename = "DataServices")]
    data_services: Option<DeDataServices>,
}

#[derive(Debug, Deserialize)]
struct DeReference {
    #[serde(rename = "@Uri")]
    uri: String,
    #[serde(rename = "Include", default)]
    includes: Vec<DeInclude>,
    #[serde(rename = "IncludeAnnotations", default)]
    include_annotations: Vec<DeIncludeAnnotations>,
}

#[derive(Debug, Deserialize)]
struct DeInclude {
    #[serde(rename = "@Namespace")]
    namespace: String,
    #[serde(rename = "@Alias")]
    alias: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeIncludeAnnotations {
    #[serde(rename = "@TermNamespace")]
    term_namespace: String,
    #[serde(rename = "@Qualifier")]
    qualifier: Option<String>,
    #[serde(rename = "@TargetNamespace")]
    target_namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeDataServices {
    #[serde(rename = "Schema", default)]
    schemas: Vec<DeSchema>,
}

#[derive(Debug, Deserialize)]
struct DeSchema {
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    #[serde(rename = "@Namespace", default)]
    namespace: String,
    #[serde(rename = "@Alias")]
    alias: Option<String>,
    #[serde(rename = "EntityType", default)]
    entity_types: Vec<DeEntityType>,
    #[serde(rename = "ComplexType", default)]
    complex_types: Vec<DeComplexType>,
    #[serde(rename = "EnumType", default)]
    enum_types: Vec<DeEnumType>,
    #[serde(rename = "TypeDefinition", default)]
    type_definitions: Vec<DeTypeDefinition>,
    #[serde(rename = "Action", default)]
    actions: Vec<DeAction>,
    #[serde(rename = "Function", default)]
    functions: Vec<DeFunction>,
    #[serde(rename = "Term", default)]
    terms: Vec<DeTerm>,
    #[serde(rename = "Annotations", default)]
    annotation_groups: Vec<DeAnnotations>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
    #[serde(rename = "EntityContainer", default)]
    entity_containers: Vec<DeEntityContainer>,
}

#[derive(Debug, Deserialize)]
struct DeEntityType {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@BaseType")]
    base_type: Option<String>,
    #[serde(rename = "@Abstract")]
    is_abstract: Option<bool>,
    #[serde(rename = "@OpenType")]
    open_type: Option<bool>,
    #[serde(rename = "@HasStream")]
    has_stream: Option<bool>,
    #[serde(rename = "Key")]
    key: Option<DeKey>,
    #[serde(rename = "Property", default)]
    properties: Vec<DeProperty>,
    #[serde(rename = "NavigationProperty", default)]
    navigation_properties: Vec<DeNavigationProperty>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeComplexType {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@BaseType")]
    base_type: Option<String>,
    #[serde(rename = "@Abstract")]
    is_abstract: Option<bool>,
    #[serde(rename = "@OpenType")]
    open_type: Option<bool>,
    #[serde(rename = "Property", default)]
    properties: Vec<DeProperty>,
    #[serde(rename = "NavigationProperty", default)]
    navigation_properties: Vec<DeNavigationProperty>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeKey {
    #[serde(rename = "PropertyRef", default)]
    property_refs: Vec<DePropertyRef>,
}

#[derive(Debug, Deserialize)]
struct DePropertyRef {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Alias")]
    alias: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeProperty {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "@Nullable")]
    nullable: Option<bool>,
    #[serde(rename = "@MaxLength")]
    max_length: Option<String>,
    #[serde(rename = "@Precision")]
    precision: Option<u32>,
    #[serde(rename = "@Scale")]
    scale: Option<String>,
    #[serde(rename = "@SRID")]
    srid: Option<String>,
    #[serde(rename = "@Unicode")]
    unicode: Option<bool>,
    #[serde(rename = "@DefaultValue")]
    default_value: Option<String>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeNavigationProperty {
    #[serde(rename = "@Name")]
    name: String,
    /// Absent on V2 navigation properties, which use associations instead
    #[serde(rename = "@Type")]
    type_name: Option<String>,
    #[serde(rename = "@Nullable")]
    nullable: Option<bool>,
    #[serde(rename = "@Partner")]
    partner: Option<String>,
    #[serde(rename = "@ContainsTarget")]
    contains_target: Option<bool>,
    #[serde(rename = "ReferentialConstraint", default)]
    referential_constraints: Vec<DeReferentialConstraint>,
    #[serde(rename = "OnDelete")]
    on_delete: Option<DeOnDelete>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeReferentialConstraint {
    #[serde(rename = "@Property")]
    property: String,
    #[serde(rename = "@ReferencedProperty")]
    referenced_property: String,
}

#[derive(Debug, Deserialize)]
struct DeOnDelete {
    #[serde(rename = "@Action")]
    action: String,
}

#[derive(Debug, Deserialize)]
struct DeEnumType {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@UnderlyingType")]
    underlying_type: Option<String>,
    #[serde(rename = "@IsFlags")]
    is_flags: Option<bool>,
    #[serde(rename = "Member", default)]
    members: Vec<DeEnumMember>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeEnumMember {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Value")]
    value: Option<String>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeTypeDefinition {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@UnderlyingType")]
    underlying_type: String,
    #[serde(rename = "@MaxLength")]
    max_length: Option<String>,
    #[serde(rename = "@Precision")]
    precision: Option<u32>,
    #[serde(rename = "@Scale")]
    scale: Option<String>,
    #[serde(rename = "@SRID")]
    srid: Option<String>,
    #[serde(rename = "@Unicode")]
    unicode: Option<bool>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeTerm {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "@BaseTerm")]
    base_term: Option<String>,
    #[serde(rename = "@AppliesTo")]
    applies_to: Option<String>,
    #[serde(rename = "@DefaultValue")]
    default_value: Option<String>,
    #[serde(rename = "@Nullable")]
    nullable: Option<bool>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeParameter {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "@Nullable")]
    nullable: Option<bool>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeReturnType {
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "@Nullable")]
    nullable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct DeAction {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@IsBound")]
    is_bound: Option<bool>,
    #[serde(rename = "@EntitySetPath")]
    entity_set_path: Option<String>,
    #[serde(rename = "Parameter", default)]
    parameters: Vec<DeParameter>,
    #[serde(rename = "ReturnType")]
    return_type: Option<DeReturnType>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeFunction {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@IsBound")]
    is_bound: Option<bool>,
    #[serde(rename = "@IsComposable")]
    is_composable: Option<bool>,
    #[serde(rename = "@EntitySetPath")]
    entity_set_path: Option<String>,
    #[serde(rename = "Parameter", default)]
    parameters: Vec<DeParameter>,
    #[serde(rename = "ReturnType")]
    return_type: Option<DeReturnType>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeEntityContainer {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Extends")]
    extends: Option<String>,
    #[serde(rename = "EntitySet", default)]
    entity_sets: Vec<DeEntitySet>,
    #[serde(rename = "Singleton", default)]
    singletons: Vec<DeSingleton>,
    #[serde(rename = "ActionImport", default)]
    action_imports: Vec<DeActionImport>,
    #[serde(rename = "FunctionImport", default)]
    function_imports: Vec<DeFunctionImport>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeEntitySet {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@EntityType", default)]
    entity_type: String,
    #[serde(rename = "@IncludeInServiceDocument")]
    include_in_service_document: Option<bool>,
    #[serde(rename = "NavigationPropertyBinding", default)]
    bindings: Vec<DeNavigationPropertyBinding>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeSingleton {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "NavigationPropertyBinding", default)]
    bindings: Vec<DeNavigationPropertyBinding>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeNavigationPropertyBinding {
    #[serde(rename = "@Path")]
    path: String,
    #[serde(rename = "@Target")]
    target: String,
}

#[derive(Debug, Deserialize)]
struct DeActionImport {
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@Action", default)]
    action: String,
    #[serde(rename = "@EntitySet")]
    entity_set: Option<String>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeFunctionImport {
    #[serde(rename = "@Name")]
    name: String,
    /// Absent on V2 function imports
    #[serde(rename = "@Function", default)]
    function: String,
    #[serde(rename = "@EntitySet")]
    entity_set: Option<String>,
    #[serde(rename = "@IncludeInServiceDocument")]
    include_in_service_document: Option<bool>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DeAnnotations {
    #[serde(rename = "@Target")]
    target: String,
    #[serde(rename = "@Qualifier")]
    qualifier: Option<String>,
    #[serde(rename = "Annotation", default)]
    annotations: Vec<DeAnnotation>,
}

/// Declares an element that may carry its value either as an attribute
/// (`String="..."`, `Path="..."`) or as child elements
macro_rules! inline_expression_element {
    ($name:ident { $($(#[$fmeta:meta])* $field:ident: $ty:ty,)* }) => {
        #[derive(Debug, Deserialize)]
        struct $name {
            $($(#[$fmeta])* $field: $ty,)*
            #[serde(rename = "@Binary")]
            binary: Option<String>,
            #[serde(rename = "@Bool")]
            bool_value: Option<String>,
            #[serde(rename = "@Date")]
            date: Option<String>,
            #[serde(rename = "@DateTimeOffset")]
            date_time_offset: Option<String>,
            #[serde(rename = "@Decimal")]
            decimal: Option<String>,
            #[serde(rename = "@Duration")]
            duration: Option<String>,
            #[serde(rename = "@EnumMember")]
            enum_member: Option<String>,
            #[serde(rename = "@Float")]
            float: Option<String>,
            #[serde(rename = "@Guid")]
            guid: Option<String>,
            #[serde(rename = "@Int")]
            int: Option<String>,
            #[serde(rename = "@String")]
            string: Option<String>,
            #[serde(rename = "@TimeOfDay")]
            time_of_day: Option<String>,
            #[serde(rename = "@Path")]
            path: Option<String>,
            #[serde(rename = "@AnnotationPath")]
            annotation_path: Option<String>,
            #[serde(rename = "@NavigationPropertyPath")]
            navigation_property_path: Option<String>,
            #[serde(rename = "@PropertyPath")]
            property_path: Option<String>,
            #[serde(rename = "@UrlRef")]
            url_ref: Option<String>,
            #[serde(rename = "$value", default)]
            children: Vec<DeExpression>,
        }

        impl $name {
            /// Expression given in attribute form
            fn attribute_expression(&self) -> Option<Expression> {
                let constants = [
                    (ConstantKind::Binary, &self.binary),
                    (ConstantKind::Bool, &self.bool_value),
                    (ConstantKind::Date, &self.date),
                    (ConstantKind::DateTimeOffset, &self.date_time_offset),
                    (ConstantKind::Decimal, &self.decimal),
                    (ConstantKind::Duration, &self.duration),
                    (ConstantKind::EnumMember, &self.enum_member),
                    (ConstantKind::Float, &self.float),
                    (ConstantKind::Guid, &self.guid),
                    (ConstantKind::Int, &self.int),
                    (ConstantKind::String, &self.string),
                    (ConstantKind::TimeOfDay, &self.time_of_day),
                ];
                for (constant, value) in constants {
                    if let Some(value) = value {
                        return Some(Expression::Constant {
                            constant,
                            value: value.clone(),
                        });
                    }
                }

                let paths = [
                    (PathKind::Path, &self.path),
                    (PathKind::AnnotationPath, &self.annotation_path),
                    (PathKind::NavigationPropertyPath, &self.navigation_property_path),
                    (PathKind::PropertyPath, &self.property_path),
                ];
                for (path, value) in paths {
                    if let Some(value) = value {
                        return Some(Expression::Path {
                            path,
                            value: value.clone(),
                        });
                    }
                }

                self.url_ref.as_ref().map(|url| Expression::UrlRef {
                    value: Box::new(Expression::string(url.clone())),
                })
            }

            /// Attribute form first, then the first child expression
            fn expression(&self) -> Option<Expression> {
                self.attribute_expression()
                    .or_else(|| convert_expressions(&self.children).into_iter().next())
            }
        }
    };
}

inline_expression_element!(DeAnnotation {
    #[serde(rename = "@Term")]
    term: String,
    #[serde(rename = "@Qualifier")]
    qualifier: Option<String>,
});

inline_expression_element!(DePropertyValue {
    #[serde(rename = "@Property")]
    property: String,
});

inline_expression_element!(DeLabeledElement {
    #[serde(rename = "@Name")]
    name: String,
});

#[derive(Debug, Deserialize)]
struct DeChildren {
    #[serde(rename = "$value", default)]
    children: Vec<DeExpression>,
}

#[derive(Debug, Deserialize)]
struct DeApply {
    #[serde(rename = "@Function")]
    function: String,
    #[serde(rename = "$value", default)]
    children: Vec<DeExpression>,
}

#[derive(Debug, Deserialize)]
struct DeTyped {
    #[serde(rename = "@Type")]
    type_name: String,
    #[serde(rename = "$value", default)]
    children: Vec<DeExpression>,
}

#[derive(Debug, Deserialize)]
struct DeRecord {
    #[serde(rename = "@Type")]
    type_name: Option<String>,
    #[serde(rename = "PropertyValue", default)]
    property_values: Vec<DePropertyValue>,
}

/// Expression in element form; the element name selects the variant
#[derive(Debug, Deserialize)]
enum DeExpression {
    Binary(String),
    Bool(String),
    Date(String),
    DateTimeOffset(String),
    Decimal(String),
    Duration(String),
    EnumMember(String),
    Float(String),
    Guid(String),
    Int(String),
    String(String),
    TimeOfDay(String),
    Path(String),
    AnnotationPath(String),
    NavigationPropertyPath(String),
    PropertyPath(String),
    Null,
    Apply(DeApply),
    Cast(DeTyped),
    IsOf(DeTyped),
    If(DeChildren),
    And(DeChildren),
    Or(DeChildren),
    Eq(DeChildren),
    Ne(DeChildren),
    Gt(DeChildren),
    Ge(DeChildren),
    Lt(DeChildren),
    Le(DeChildren),
    Not(DeChildren),
    Collection(DeChildren),
    Record(DeRecord),
    LabeledElement(DeLabeledElement),
    LabeledElementReference(String),
    UrlRef(DeChildren),
    Annotation(DeAnnotation),
    #[serde(other)]
    Unknown,
}

impl DeExpression {
    fn to_expression(&self) -> Option<Expression> {
        let constant = |constant: ConstantKind, value: &String| Expression::Constant {
            constant,
            value: value.clone(),
        };
        let path = |path: PathKind, value: &String| Expression::Path {
            path,
            value: value.clone(),
        };

        let expression = match self {
            DeExpression::Binary(v) => constant(ConstantKind::Binary, v),
            DeExpression::Bool(v) => constant(ConstantKind::Bool, v),
            DeExpression::Date(v) => constant(ConstantKind::Date, v),
            DeExpression::DateTimeOffset(v) => constant(ConstantKind::DateTimeOffset, v),
            DeExpression::Decimal(v) => constant(ConstantKind::Decimal, v),
            DeExpression::Duration(v) => constant(ConstantKind::Duration, v),
            DeExpression::EnumMember(v) => constant(ConstantKind::EnumMember, v),
            DeExpression::Float(v) => constant(ConstantKind::Float, v),
            DeExpression::Guid(v) => constant(ConstantKind::Guid, v),
            DeExpression::Int(v) => constant(ConstantKind::Int, v),
            DeExpression::String(v) => constant(ConstantKind::String, v),
            DeExpression::TimeOfDay(v) => constant(ConstantKind::TimeOfDay, v),
            DeExpression::Path(v) => path(PathKind::Path, v),
            DeExpression::AnnotationPath(v) => path(PathKind::AnnotationPath, v),
            DeExpression::NavigationPropertyPath(v) => path(PathKind::NavigationPropertyPath, v),
            DeExpression::PropertyPath(v) => path(PathKind::PropertyPath, v),
            DeExpression::Null => Expression::Null,
            DeExpression::Apply(apply) => Expression::Apply {
                function: apply.function.clone(),
                parameters: convert_expressions(&apply.children),
            },
            DeExpression::Cast(typed) => Expression::Cast {
                type_name: typed.type_name.clone(),
                value: Box::new(first_operand(&typed.children)?),
            },
            DeExpression::IsOf(typed) => Expression::IsOf {
                type_name: typed.type_name.clone(),
                value: Box::new(first_operand(&typed.children)?),
            },
            DeExpression::If(c) => {
                let mut operands = convert_expressions(&c.children).into_iter();
                let condition = operands.next()?;
                let then = operands.next()?;
                Expression::If {
                    condition: Box::new(condition),
                    then: Box::new(then),
                    otherwise: operands.next().map(Box::new),
                }
            }
            DeExpression::And(c) => binary(BinaryOperator::And, c)?,
            DeExpression::Or(c) => binary(BinaryOperator::Or, c)?,
            DeExpression::Eq(c) => binary(BinaryOperator::Eq, c)?,
            DeExpression::Ne(c) => binary(BinaryOperator::Ne, c)?,
            DeExpression::Gt(c) => binary(BinaryOperator::Gt, c)?,
            DeExpression::Ge(c) => binary(BinaryOperator::Ge, c)?,
            DeExpression::Lt(c) => binary(BinaryOperator::Lt, c)?,
            DeExpression::Le(c) => binary(BinaryOperator::Le, c)?,
            DeExpression::Not(c) => Expression::Not {
                value: Box::new(first_operand(&c.children)?),
            },
            DeExpression::Collection(c) => Expression::Collection {
                items: convert_expressions(&c.children),
            },
            DeExpression::Record(record) => Expression::Record {
                type_name: record.type_name.clone(),
                properties: record
                    .property_values
                    .iter()
                    .filter_map(|pv| {
                        Some(PropertyValue {
                            property: pv.property.clone(),
                            value: pv.expression()?,
                        })
                    })
                    .collect(),
            },
            DeExpression::LabeledElement(labeled) => Expression::LabeledElement {
                name: labeled.name.clone(),
                value: Box::new(labeled.expression()?),
            },
            DeExpression::LabeledElementReference(name) => {
                Expression::LabeledElementReference { name: name.clone() }
            }
            DeExpression::UrlRef(c) => Expression::UrlRef {
                value: Box::new(first_operand(&c.children)?),
            },
            DeExpression::Annotation(_) | DeExpression::Unknown => return None,
        };
        Some(expression)
    }
}

fn convert_expressions(children: &[DeExpression]) -> Vec<Expression> {
    children.iter().filter_map(DeExpression::to_expression).collect()
}

fn first_operand(children: &[DeExpression]) -> Option<Expression> {
    convert_expressions(children).into_iter().next()
}

fn binary(operator: BinaryOperator, c: &DeChildren) -> Option<Expression> {
    let mut operands = convert_expressions(&c.children).into_iter();
    let left = operands.next()?;
    let right = operands.next()?;
    Some(Expression::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}

impl DeAnnotation {
    fn to_annotation(&self) -> Annotation {
        Annotation {
            term: self.term.clone(),
            qualifier: self.qualifier.clone(),
            expression: self.expression(),
            annotations: self.nested_annotations(),
        }
    }

    /// Annotations nested among the child elements
    fn nested_annotations(&self) -> Vec<Annotation> {
        self.children
            .iter()
            .filter_map(|child| match child {
                DeExpression::Annotation(a) => Some(a.to_annotation()),
                _ => None,
            })
            .collect()
    }
}

fn annotations(items: Vec<DeAnnotation>) -> Vec<Annotation> {
    items.iter().map(DeAnnotation::to_annotation).collect()
}

impl DeEdmx {
    fn into_metadata(self) -> CsdlMetadata {
        let references = self
            .references
            .into_iter()
            .map(|r| Reference {
                uri: r.uri,
                includes: r
                    .includes
                    .into_iter()
                    .map(|i| Include {
                        namespace: i.namespace,
                        alias: i.alias,
                    })
                    .collect(),
                include_annotations: r
                    .include_annotations
                    .into_iter()
                    .map(|i| IncludeAnnotations {
                        term_namespace: i.term_namespace,
                        qualifier: i.qualifier,
                        target_namespace: i.target_namespace,
                    })
                    .collect(),
            })
            .collect();

        let schemas = match self.data_services {
            Some(data_services) => data_services
                .schemas
                .into_iter()
                .map(DeSchema::into_schema)
                .collect(),
            None => {
                warn!("EDMX document has no DataServices element");
                Vec::new()
            }
        };

        CsdlMetadata {
            version: self.version,
            references,
            schemas,
        }
    }
}

impl DeSchema {
    fn into_schema(self) -> CsdlSchema {
        let mut containers = self.entity_containers.into_iter();
        let entity_container = containers.next().map(DeEntityContainer::into_container);
        for extra in containers {
            warn!(
                "Schema {} declares more than one EntityContainer, ignoring {}",
                self.namespace, extra.name
            );
        }

        CsdlSchema {
            namespace: self.namespace,
            alias: self.alias,
            xml_namespace: self.xmlns,
            enum_types: self.enum_types.into_iter().map(DeEnumType::into_enum_type).collect(),
            type_definitions: self
                .type_definitions
                .into_iter()
                .map(|t| TypeDefinition {
                    name: t.name,
                    underlying_type: t.underlying_type,
                    max_length: t.max_length,
                    precision: t.precision,
                    scale: t.scale,
                    srid: t.srid,
                    unicode: t.unicode,
                    annotations: annotations(t.annotations),
                })
                .collect(),
            entity_types: self
                .entity_types
                .into_iter()
                .map(DeEntityType::into_entity_type)
                .collect(),
            complex_types: self
                .complex_types
                .into_iter()
                .map(DeComplexType::into_complex_type)
                .collect(),
            actions: self.actions.into_iter().map(DeAction::into_action).collect(),
            functions: self.functions.into_iter().map(DeFunction::into_function).collect(),
            terms: self.terms.into_iter().map(DeTerm::into_term).collect(),
            annotation_groups: self
                .annotation_groups
                .into_iter()
                .map(|g| Annotations {
                    target: g.target,
                    qualifier: g.qualifier,
                    annotations: annotations(g.annotations),
                })
                .collect(),
            annotations: annotations(self.annotations),
            entity_container,
        }
    }
}

impl DeEntityType {
    fn into_entity_type(self) -> EntityType {
        EntityType {
            name: self.name,
            base_type: self.base_type,
            is_abstract: self.is_abstract.unwrap_or(false),
            is_open_type: self.open_type.unwrap_or(false),
            has_stream: self.has_stream.unwrap_or(false),
            key: self
                .key
                .map(|k| {
                    k.property_refs
                        .into_iter()
                        .map(|r| PropertyRef {
                            name: r.name,
                            alias: r.alias,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            properties: self.properties.into_iter().map(DeProperty::into_property).collect(),
            navigation_properties: self
                .navigation_properties
                .into_iter()
                .map(DeNavigationProperty::into_navigation_property)
                .collect(),
            annotations: annotations(self.annotations),
        }
    }
}

impl DeComplexType {
    fn into_complex_type(self) -> ComplexType {
        ComplexType {
            name: self.name,
            base_type: self.base_type,
            is_abstract: self.is_abstract.unwrap_or(false),
            is_open_type: self.open_type.unwrap_or(false),
            properties: self.properties.into_iter().map(DeProperty::into_property).collect(),
            navigation_properties: self
                .navigation_properties
                .into_iter()
                .map(DeNavigationProperty::into_navigation_property)
                .collect(),
            annotations: annotations(self.annotations),
        }
    }
}

impl DeProperty {
    fn into_property(self) -> Property {
        let mut property = Property::new(self.name, &self.type_name);
        property.nullable = self.nullable;
        property.max_length = self.max_length;
        property.precision = self.precision;
        property.scale = self.scale;
        property.srid = self.srid;
        property.unicode = self.unicode;
        property.default_value = self.default_value;
        property.annotations = annotations(self.annotations);
        property
    }
}

impl DeNavigationProperty {
    fn into_navigation_property(self) -> NavigationProperty {
        let mut navigation = NavigationProperty::new(self.name, self.type_name.as_deref().unwrap_or(""));
        navigation.nullable = self.nullable;
        navigation.partner = self.partner;
        navigation.contains_target = self.contains_target.unwrap_or(false);
        navigation.referential_constraints = self
            .referential_constraints
            .into_iter()
            .map(|c| ReferentialConstraint::new(c.property, c.referenced_property))
            .collect();
        navigation.on_delete = self.on_delete.and_then(|d| {
            let action = OnDeleteAction::from_csdl(&d.action);
            if action.is_none() {
                warn!("Unknown OnDelete action {} on {}", d.action, navigation.name);
            }
            action
        });
        navigation.annotations = annotations(self.annotations);
        navigation
    }
}

impl DeEnumType {
    fn into_enum_type(self) -> EnumType {
        let enum_name = self.name;
        let members = self
            .members
            .into_iter()
            .map(|m| {
                let value = m.value.as_deref().and_then(|v| match v.trim().parse::<i64>() {
                    Ok(parsed) => Some(parsed),
                    Err(_) => {
                        warn!("Non-numeric value {} for member {}.{}", v, enum_name, m.name);
                        None
                    }
                });
                EnumMember {
                    name: m.name,
                    value,
                    annotations: annotations(m.annotations),
                }
            })
            .collect();

        EnumType {
            name: enum_name,
            underlying_type: self.underlying_type,
            is_flags: self.is_flags.unwrap_or(false),
            members,
            annotations: annotations(self.annotations),
        }
    }
}

impl DeTerm {
    fn into_term(self) -> Term {
        let (type_name, is_collection) = split_collection(&self.type_name);
        Term {
            name: self.name,
            type_name: type_name.to_string(),
            is_collection,
            base_term: self.base_term,
            applies_to: self
                .applies_to
                .map(|a| a.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            default_value: self.default_value,
            nullable: self.nullable,
            annotations: annotations(self.annotations),
        }
    }
}

fn parameters(items: Vec<DeParameter>) -> Vec<Parameter> {
    items
        .into_iter()
        .map(|p| {
            let mut parameter = Parameter::new(p.name, &p.type_name);
            parameter.nullable = p.nullable;
            parameter.annotations = annotations(p.annotations);
            parameter
        })
        .collect()
}

fn return_type(item: Option<DeReturnType>) -> Option<ReturnType> {
    item.map(|r| {
        let mut return_type = ReturnType::new(&r.type_name);
        return_type.nullable = r.nullable;
        return_type
    })
}

impl DeAction {
    fn into_action(self) -> Action {
        Action {
            name: self.name,
            is_bound: self.is_bound.unwrap_or(false),
            entity_set_path: self.entity_set_path,
            parameters: parameters(self.parameters),
            return_type: return_type(self.return_type),
            annotations: annotations(self.annotations),
        }
    }
}

impl DeFunction {
    fn into_function(self) -> Function {
        Function {
            name: self.name,
            is_bound: self.is_bound.unwrap_or(false),
            is_composable: self.is_composable.unwrap_or(false),
            entity_set_path: self.entity_set_path,
            parameters: parameters(self.parameters),
            return_type: return_type(self.return_type),
            annotations: annotations(self.annotations),
        }
    }
}

fn bindings(items: Vec<DeNavigationPropertyBinding>) -> Vec<NavigationPropertyBinding> {
    items
        .into_iter()
        .map(|b| NavigationPropertyBinding::new(b.path, b.target))
        .collect()
}

impl DeEntityContainer {
    fn into_container(self) -> EntityContainer {
        EntityContainer {
            name: self.name,
            extends: self.extends,
            entity_sets: self
                .entity_sets
                .into_iter()
                .map(|s| EntitySet {
                    name: s.name,
                    entity_type: s.entity_type,
                    include_in_service_document: s.include_in_service_document.unwrap_or(true),
                    navigation_property_bindings: bindings(s.bindings),
                    annotations: annotations(s.annotations),
                })
                .collect(),
            singletons: self
                .singletons
                .into_iter()
                .map(|s| Singleton {
                    name: s.name,
                    type_name: s.type_name,
                    navigation_property_bindings: bindings(s.bindings),
                    annotations: annotations(s.annotations),
                })
                .collect(),
            action_imports: self
                .action_imports
                .into_iter()
                .map(|i| ActionImport {
                    name: i.name,
                    action: i.action,
                    entity_set: i.entity_set,
                    annotations: annotations(i.annotations),
                })
                .collect(),
            function_imports: self
                .function_imports
                .into_iter()
                .map(|i| FunctionImport {
                    name: i.name,
                    function: i.function,
                    entity_set: i.entity_set,
                    include_in_service_document: i.include_in_service_document.unwrap_or(false),
                    annotations: annotations(i.annotations),
                })
                .collect(),
            annotations: annotations(self.annotations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:Reference Uri="http://docs.oasis-open.org/odata/odata/v4.0/os/vocabularies/Org.OData.Core.V1.xml">
    <edmx:Include Namespace="Org.OData.Core.V1" Alias="Core"/>
  </edmx:Reference>
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="olingo.odata.test1" Alias="Namespace1_Alias">
      <EntityType Name="ETTwoKeyNav">
        <Key>
          <PropertyRef Name="PropertyInt16"/>
          <PropertyRef Name="PropertyString"/>
        </Key>
        <Property Name="PropertyInt16" Type="Edm.Int16" Nullable="false"/>
        <NavigationProperty Name="NavPropertyETTwoKeyNavOne" Type="olingo.odata.test1.ETTwoKeyNav">
          <ReferentialConstraint Property="PropertyInt16" ReferencedProperty="PropertyInt16"/>
          <OnDelete Action="Cascade"/>
        </NavigationProperty>
        <Property Name="PropertyString" Type="Edm.String" Nullable="false" MaxLength="max"/>
        <Annotation Term="Core.Description" String="Two keys"/>
      </EntityType>
      <EnumType Name="ENString" IsFlags="true" UnderlyingType="Edm.Int16">
        <Member Name="String1" Value="1"/>
        <Member Name="String2" Value="2"/>
      </EnumType>
      <Action Name="BAETTwoKeyNavRTETTwoKeyNav" IsBound="true">
        <Parameter Name="ParameterETTwoKeyNav" Type="Collection(olingo.odata.test1.ETTwoKeyNav)"/>
        <ReturnType Type="olingo.odata.test1.ETTwoKeyNav"/>
      </Action>
      <EntityContainer Name="Container">
        <EntitySet Name="ESTwoKeyNav" EntityType="Namespace1_Alias.ETTwoKeyNav">
          <NavigationPropertyBinding Path="NavPropertyETTwoKeyNavOne" Target="ESTwoKeyNav"/>
        </EntitySet>
        <ActionImport Name="AIRTETTwoKeyNav" Action="olingo.odata.test1.BAETTwoKeyNavRTETTwoKeyNav"/>
      </EntityContainer>
      <Annotations Target="olingo.odata.test1.ETTwoKeyNav">
        <Annotation Term="Core.Computed">
          <Bool>true</Bool>
        </Annotation>
      </Annotations>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

    #[test]
    fn parses_schema_items_in_any_order() {
        let md = XmlMetadataImporter::new().import(SAMPLE).unwrap();
        assert_eq!(md.version.as_deref(), Some("4.0"));
        assert_eq!(md.references[0].includes[0].alias.as_deref(), Some("Core"));

        let schema = &md.schemas[0];
        assert_eq!(
            schema.xml_namespace.as_deref(),
            Some("http://docs.oasis-open.org/odata/ns/edm")
        );
        let et = schema.get_entity_type("ETTwoKeyNav").unwrap();
        assert_eq!(et.key.len(), 2);
        assert_eq!(et.properties.len(), 2);
        let nav = &et.navigation_properties[0];
        assert_eq!(nav.referential_constraints[0].property, "PropertyInt16");
        assert_eq!(nav.on_delete, Some(OnDeleteAction::Cascade));
        assert_eq!(
            et.annotations[0].expression,
            Some(Expression::string("Two keys"))
        );

        let enum_type = schema.get_enum_type("ENString").unwrap();
        assert!(enum_type.is_flags);
        assert_eq!(enum_type.member_value("String2"), Some(2));

        let action = &schema.get_actions("BAETTwoKeyNavRTETTwoKeyNav")[0];
        assert!(action.is_bound);
        assert!(action.parameters[0].is_collection);

        let container = schema.entity_container.as_ref().unwrap();
        assert_eq!(
            container.entity_sets[0].navigation_property_bindings[0].target,
            "ESTwoKeyNav"
        );
        let group = schema
            .get_annotation_group("olingo.odata.test1.ETTwoKeyNav")
            .unwrap();
        assert_eq!(group.annotations[0].expression, Some(Expression::bool(true)));
    }

    #[test]
    fn v2_documents_load_for_classification() {
        let xml = r#"<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" m:DataServiceVersion="2.0">
    <Schema Namespace="ODataDemo" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Product">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
        <NavigationProperty Name="Category" Relationship="ODataDemo.Product_Category_Category_Products" FromRole="Product_Category" ToRole="Category_Products"/>
      </EntityType>
      <Association Name="Product_Category_Category_Products">
        <End Role="Product_Category" Type="ODataDemo.Product" Multiplicity="*"/>
      </Association>
      <EntityContainer Name="DemoService" m:IsDefaultEntityContainer="true">
        <EntitySet Name="Products" EntityType="ODataDemo.Product"/>
        <AssociationSet Name="Products_Category_Categories" Association="ODataDemo.Product_Category_Category_Products"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
        let md = XmlMetadataImporter::new().import(xml).unwrap();
        assert_eq!(
            md.schemas[0].xml_namespace.as_deref(),
            Some("http://schemas.microsoft.com/ado/2008/09/edm")
        );
        assert_eq!(md.schemas[0].entity_types[0].navigation_properties[0].type_name, "");
    }

    #[test]
    fn element_form_expressions_are_converted() {
        let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
      <Annotation Term="NS.Rule">
        <If>
          <Eq><Path>Status</Path><Int>1</Int></Eq>
          <String>active</String>
          <Null/>
        </If>
      </Annotation>
      <Annotation Term="NS.Info">
        <Record Type="NS.InfoType">
          <PropertyValue Property="Name" String="demo"/>
          <PropertyValue Property="Tags">
            <Collection><String>a</String><String>b</String></Collection>
          </PropertyValue>
        </Record>
      </Annotation>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
        let md = XmlMetadataImporter::new().import(xml).unwrap();
        let annotations = &md.schemas[0].annotations;

        match &annotations[0].expression {
            Some(Expression::If {
                condition,
                otherwise,
                ..
            }) => {
                assert!(matches!(
                    condition.as_ref(),
                    Expression::Binary {
                        operator: BinaryOperator::Eq,
                        ..
                    }
                ));
                assert_eq!(otherwise.as_deref(), Some(&Expression::Null));
            }
            other => panic!("unexpected expression {:?}", other),
        }

        match &annotations[1].expression {
            Some(Expression::Record {
                type_name,
                properties,
            }) => {
                assert_eq!(type_name.as_deref(), Some("NS.InfoType"));
                assert_eq!(properties.len(), 2);
                assert!(matches!(
                    &properties[1].value,
                    Expression::Collection { items } if items.len() == 2
                ));
            }
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn nested_annotations_attach_to_the_annotation() {
        let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
      <Annotation Term="Core.Description" String="Orders">
        <Annotation Term="Core.IsLanguageDependent" Bool="true"/>
      </Annotation>
      <Annotation Term="NS.Info">
        <Record>
          <PropertyValue Property="Name">
            <Annotation Term="Core.Description" String="ignored"/>
            <String>demo</String>
          </PropertyValue>
        </Record>
      </Annotation>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
        let md = XmlMetadataImporter::new().import(xml).unwrap();
        let annotations = &md.schemas[0].annotations;

        assert_eq!(annotations[0].expression, Some(Expression::string("Orders")));
        assert_eq!(annotations[0].annotations.len(), 1);
        assert_eq!(annotations[0].annotations[0].term, "Core.IsLanguageDependent");

        match &annotations[1].expression {
            Some(Expression::Record { properties, .. }) => {
                assert_eq!(properties[0].value, Expression::string("demo"));
            }
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = XmlMetadataImporter::new()
            .import("<edmx:Edmx><edmx:DataServices>")
            .unwrap_err();
        assert!(matches!(err, ImportError::ParseError(_)));
    }
}
