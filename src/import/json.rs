//! CSDL JSON reader
//!
//! Reads the OData 4.01 JSON representation of a metadata document. The
//! root object carries `$Version`, `$Reference` and one member per schema;
//! schema members are discriminated by `$Kind`, with properties (no
//! `$Kind`) as the default. Annotations are members named `@Term#Qualifier`
//! on the annotated object, or `member@Term` next to an annotated member.

use super::ImportError;
use crate::models::{
    Action, ActionImport, Annotation, Annotations, BinaryOperator, ComplexType, ConstantKind,
    CsdlMetadata, CsdlSchema, EntityContainer, EntitySet, EntityType, EnumMember, EnumType,
    Expression, Function, FunctionImport, Include, IncludeAnnotations, NavigationProperty,
    NavigationPropertyBinding, OnDeleteAction, Parameter, PathKind, Property, PropertyRef,
    PropertyValue, Reference, ReferentialConstraint, ReturnType, Singleton, Term, TypeDefinition,
};
use crate::validation::version::CSDL_V4_NAMESPACE;
use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use tracing::{debug, warn};

type Object = Map<String, Value>;

/// Default `$Type` of a property that omits it
const DEFAULT_PROPERTY_TYPE: &str = "Edm.String";

/// Reader for CSDL JSON documents
#[derive(Debug, Default)]
pub struct JsonMetadataImporter;

impl JsonMetadataImporter {
    /// Create a new JSON reader.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::import::json::JsonMetadataImporter;
    ///
    /// let importer = JsonMetadataImporter::new();
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSDL JSON document into the raw item tree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::import::json::JsonMetadataImporter;
    ///
    /// let json = r#"{
    ///   "$Version": "4.01",
    ///   "NS": {
    ///     "Customer": {
    ///       "$Kind": "EntityType",
    ///       "$Key": ["ID"],
    ///       "ID": { "$Type": "Edm.Int32" },
    ///       "Name": {}
    ///     }
    ///   }
    /// }"#;
    /// let metadata = JsonMetadataImporter::new().import(json).unwrap();
    /// let customer = metadata.schema("NS").unwrap().get_entity_type("Customer").unwrap();
    /// assert_eq!(customer.properties[1].type_name, "Edm.String");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ParseError`] when the content is not JSON or
    /// the root is not an object.
    pub fn import(&self, content: &str) -> Result<CsdlMetadata, ImportError> {
        self.parse(content)
            .map_err(|e| ImportError::ParseError(format!("{:#}", e)))
    }

    fn parse(&self, content: &str) -> Result<CsdlMetadata> {
        let document: Value =
            serde_json::from_str(content).context("Failed to parse CSDL JSON")?;
        let root = document
            .as_object()
            .ok_or_else(|| anyhow!("CSDL JSON document must be an object"))?;

        let mut metadata = CsdlMetadata {
            version: str_member(root, "$Version"),
            references: Vec::new(),
            schemas: Vec::new(),
        };

        if let Some(references) = root.get("$Reference").and_then(Value::as_object) {
            metadata.references = references
                .iter()
                .filter_map(|(uri, reference)| Some(parse_reference(uri, reference.as_object()?)))
                .collect();
        }

        for (key, value) in root {
            if key.starts_with('$') || key.starts_with('@') {
                continue;
            }
            match value.as_object() {
                Some(schema) => metadata.schemas.push(parse_schema(key, schema)),
                None => warn!("Ignoring non-object root member {}", key),
            }
        }

        debug!(
            "Parsed CSDL JSON document: {} schemas, {} references",
            metadata.schemas.len(),
            metadata.references.len()
        );
        Ok(metadata)
    }
}

fn parse_reference(uri: &str, reference: &Object) -> Reference {
    let includes = array_member(reference, "$Include")
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|include| {
            Some(Include {
                namespace: str_member(include, "$Namespace")?,
                alias: str_member(include, "$Alias"),
            })
        })
        .collect();
    let include_annotations = array_member(reference, "$IncludeAnnotations")
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|include| {
            Some(IncludeAnnotations {
                term_namespace: str_member(include, "$TermNamespace")?,
                qualifier: str_member(include, "$Qualifier"),
                target_namespace: str_member(include, "$TargetNamespace"),
            })
        })
        .collect();

    Reference {
        uri: uri.to_string(),
        includes,
        include_annotations,
    }
}

fn parse_schema(namespace: &str, object: &Object) -> CsdlSchema {
    let mut schema = CsdlSchema::new(namespace).with_xml_namespace(CSDL_V4_NAMESPACE);
    schema.alias = str_member(object, "$Alias");
    schema.annotations = own_annotations(object);

    if let Some(groups) = object.get("$Annotations").and_then(Value::as_object) {
        schema.annotation_groups = groups
            .iter()
            .filter_map(|(target, annotations)| {
                let annotations = annotations.as_object()?;
                Some(Annotations {
                    target: target.clone(),
                    qualifier: None,
                    annotations: own_annotations(annotations),
                })
            })
            .collect();
    }

    for (name, member) in object {
        if name.starts_with('$') || name.contains('@') {
            continue;
        }

        if let Some(overloads) = member.as_array() {
            for overload in overloads.iter().filter_map(Value::as_object) {
                match str_member(overload, "$Kind").as_deref() {
                    Some("Action") => schema.actions.push(parse_action(name, overload)),
                    Some("Function") => schema.functions.push(parse_function(name, overload)),
                    other => warn!("Ignoring overload of {} with kind {:?}", name, other),
                }
            }
            continue;
        }

        let Some(item) = member.as_object() else {
            warn!("Ignoring schema member {} in {}", name, namespace);
            continue;
        };
        match str_member(item, "$Kind").as_deref() {
            Some("EntityType") => schema.entity_types.push(parse_entity_type(name, item)),
            Some("ComplexType") => schema.complex_types.push(parse_complex_type(name, item)),
            Some("EnumType") => schema.enum_types.push(parse_enum_type(name, item)),
            Some("TypeDefinition") => schema.type_definitions.push(parse_type_definition(name, item)),
            Some("Term") => schema.terms.push(parse_term(name, item)),
            Some("EntityContainer") => {
                if schema.entity_container.is_some() {
                    warn!(
                        "Schema {} declares more than one EntityContainer, ignoring {}",
                        namespace, name
                    );
                } else {
                    schema.entity_container = Some(parse_container(name, item));
                }
            }
            other => warn!("Ignoring schema member {} with kind {:?}", name, other),
        }
    }

    schema
}

/// Properties and navigation properties of a structured type, in
/// declaration order
fn parse_members(object: &Object) -> (Vec<Property>, Vec<NavigationProperty>) {
    let mut properties = Vec::new();
    let mut navigation_properties = Vec::new();

    for (name, member) in object {
        if name.starts_with('$') || name.contains('@') {
            continue;
        }
        let Some(member_object) = member.as_object() else {
            continue;
        };
        let annotations = member_annotations(object, name);
        match str_member(member_object, "$Kind").as_deref() {
            Some("NavigationProperty") => {
                let mut navigation = parse_navigation_property(name, member_object);
                navigation.annotations = annotations;
                navigation_properties.push(navigation);
            }
            None | Some("Property") => {
                let mut property = parse_property(name, member_object);
                property.annotations = annotations;
                properties.push(property);
            }
            Some(other) => warn!("Ignoring member {} with kind {}", name, other),
        }
    }

    (properties, navigation_properties)
}

fn parse_entity_type(name: &str, object: &Object) -> EntityType {
    let (properties, navigation_properties) = parse_members(object);
    let key = array_member(object, "$Key")
        .iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(PropertyRef::new(name.clone())),
            Value::Object(aliased) => {
                let (alias, path) = aliased.iter().next()?;
                Some(PropertyRef {
                    name: path.as_str()?.to_string(),
                    alias: Some(alias.clone()),
                })
            }
            _ => None,
        })
        .collect();

    EntityType {
        name: name.to_string(),
        base_type: str_member(object, "$BaseType"),
        is_abstract: bool_member(object, "$Abstract").unwrap_or(false),
        is_open_type: bool_member(object, "$OpenType").unwrap_or(false),
        has_stream: bool_member(object, "$HasStream").unwrap_or(false),
        key,
        properties,
        navigation_properties,
        annotations: own_annotations(object),
    }
}

fn parse_complex_type(name: &str, object: &Object) -> ComplexType {
    let (properties, navigation_properties) = parse_members(object);
    ComplexType {
        name: name.to_string(),
        base_type: str_member(object, "$BaseType"),
        is_abstract: bool_member(object, "$Abstract").unwrap_or(false),
        is_open_type: bool_member(object, "$OpenType").unwrap_or(false),
        properties,
        navigation_properties,
        annotations: own_annotations(object),
    }
}

fn parse_property(name: &str, object: &Object) -> Property {
    let type_name = str_member(object, "$Type").unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string());
    let mut property = Property::new(name, &type_name);
    property.is_collection = bool_member(object, "$Collection").unwrap_or(false);
    property.nullable = bool_member(object, "$Nullable");
    property.max_length = facet_member(object, "$MaxLength");
    property.precision = u32_member(object, "$Precision");
    property.scale = facet_member(object, "$Scale");
    property.srid = facet_member(object, "$SRID");
    property.unicode = bool_member(object, "$Unicode");
    property.default_value = facet_member(object, "$DefaultValue");
    property
}

fn parse_navigation_property(name: &str, object: &Object) -> NavigationProperty {
    let type_name = str_member(object, "$Type").unwrap_or_default();
    let mut navigation = NavigationProperty::new(name, &type_name);
    navigation.is_collection = bool_member(object, "$Collection").unwrap_or(false);
    navigation.nullable = bool_member(object, "$Nullable");
    navigation.partner = str_member(object, "$Partner");
    navigation.contains_target = bool_member(object, "$ContainsTarget").unwrap_or(false);

    if let Some(constraints) = object.get("$ReferentialConstraint").and_then(Value::as_object) {
        navigation.referential_constraints = constraints
            .iter()
            .filter(|(property, _)| !property.contains('@'))
            .filter_map(|(property, referenced)| {
                Some(ReferentialConstraint::new(property.clone(), referenced.as_str()?))
            })
            .collect();
    }

    if let Some(action) = str_member(object, "$OnDelete") {
        navigation.on_delete = OnDeleteAction::from_csdl(&action);
        if navigation.on_delete.is_none() {
            warn!("Unknown OnDelete action {} on {}", action, name);
        }
    }
    navigation
}

fn parse_enum_type(name: &str, object: &Object) -> EnumType {
    let members = object
        .iter()
        .filter(|(member, _)| !member.starts_with('$') && !member.contains('@'))
        .map(|(member, value)| {
            let numeric = value.as_i64();
            if numeric.is_none() {
                warn!("Non-numeric value {} for member {}.{}", value, name, member);
            }
            EnumMember {
                name: member.clone(),
                value: numeric,
                annotations: member_annotations(object, member),
            }
        })
        .collect();

    EnumType {
        name: name.to_string(),
        underlying_type: str_member(object, "$UnderlyingType"),
        is_flags: bool_member(object, "$IsFlags").unwrap_or(false),
        members,
        annotations: own_annotations(object),
    }
}

fn parse_type_definition(name: &str, object: &Object) -> TypeDefinition {
    TypeDefinition {
        name: name.to_string(),
        underlying_type: str_member(object, "$UnderlyingType").unwrap_or_default(),
        max_length: facet_member(object, "$MaxLength"),
        precision: u32_member(object, "$Precision"),
        scale: facet_member(object, "$Scale"),
        srid: facet_member(object, "$SRID"),
        unicode: bool_member(object, "$Unicode"),
        annotations: own_annotations(object),
    }
}

fn parse_term(name: &str, object: &Object) -> Term {
    Term {
        name: name.to_string(),
        type_name: str_member(object, "$Type").unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string()),
        is_collection: bool_member(object, "$Collection").unwrap_or(false),
        base_term: str_member(object, "$BaseTerm"),
        applies_to: array_member(object, "$AppliesTo")
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        default_value: facet_member(object, "$DefaultValue"),
        nullable: bool_member(object, "$Nullable"),
        annotations: own_annotations(object),
    }
}

fn parse_parameters(object: &Object) -> Vec<Parameter> {
    array_member(object, "$Parameter")
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|p| {
            let name = str_member(p, "$Name")?;
            let type_name =
                str_member(p, "$Type").unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string());
            let mut parameter = Parameter::new(name, &type_name);
            parameter.is_collection = bool_member(p, "$Collection").unwrap_or(false);
            parameter.nullable = bool_member(p, "$Nullable");
            parameter.annotations = own_annotations(p);
            Some(parameter)
        })
        .collect()
}

fn parse_return_type(object: &Object) -> Option<ReturnType> {
    let return_type = object.get("$ReturnType")?.as_object()?;
    let type_name =
        str_member(return_type, "$Type").unwrap_or_else(|| DEFAULT_PROPERTY_TYPE.to_string());
    let mut parsed = ReturnType::new(&type_name);
    parsed.is_collection = bool_member(return_type, "$Collection").unwrap_or(false);
    parsed.nullable = bool_member(return_type, "$Nullable");
    Some(parsed)
}

fn parse_action(name: &str, object: &Object) -> Action {
    Action {
        name: name.to_string(),
        is_bound: bool_member(object, "$IsBound").unwrap_or(false),
        entity_set_path: str_member(object, "$EntitySetPath"),
        parameters: parse_parameters(object),
        return_type: parse_return_type(object),
        annotations: own_annotations(object),
    }
}

fn parse_function(name: &str, object: &Object) -> Function {
    Function {
        name: name.to_string(),
        is_bound: bool_member(object, "$IsBound").unwrap_or(false),
        is_composable: bool_member(object, "$IsComposable").unwrap_or(false),
        entity_set_path: str_member(object, "$EntitySetPath"),
        parameters: parse_parameters(object),
        return_type: parse_return_type(object),
        annotations: own_annotations(object),
    }
}

fn parse_bindings(object: &Object) -> Vec<NavigationPropertyBinding> {
    object
        .get("$NavigationPropertyBinding")
        .and_then(Value::as_object)
        .map(|bindings| {
            bindings
                .iter()
                .filter_map(|(path, target)| {
                    Some(NavigationPropertyBinding::new(path.clone(), target.as_str()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_container(name: &str, object: &Object) -> EntityContainer {
    let mut container = EntityContainer::new(name);
    container.extends = str_member(object, "$Extends");
    container.annotations = own_annotations(object);

    for (child_name, child) in object {
        if child_name.starts_with('$') || child_name.contains('@') {
            continue;
        }
        let Some(child_object) = child.as_object() else {
            continue;
        };
        let annotations = member_annotations(object, child_name);

        if let Some(action) = str_member(child_object, "$Action") {
            container.action_imports.push(ActionImport {
                name: child_name.clone(),
                action,
                entity_set: str_member(child_object, "$EntitySet"),
                annotations,
            });
        } else if let Some(function) = str_member(child_object, "$Function") {
            container.function_imports.push(FunctionImport {
                name: child_name.clone(),
                function,
                entity_set: str_member(child_object, "$EntitySet"),
                include_in_service_document: bool_member(child_object, "$IncludeInServiceDocument")
                    .unwrap_or(false),
                annotations,
            });
        } else if bool_member(child_object, "$Collection").unwrap_or(false) {
            container.entity_sets.push(EntitySet {
                name: child_name.clone(),
                entity_type: str_member(child_object, "$Type").unwrap_or_default(),
                include_in_service_document: bool_member(child_object, "$IncludeInServiceDocument")
                    .unwrap_or(true),
                navigation_property_bindings: parse_bindings(child_object),
                annotations,
            });
        } else {
            container.singletons.push(Singleton {
                name: child_name.clone(),
                type_name: str_member(child_object, "$Type").unwrap_or_default(),
                navigation_property_bindings: parse_bindings(child_object),
                annotations,
            });
        }
    }

    container
}

/// Annotations written as `@Term#Qualifier` members of `object`. A member
/// `@A@B` annotates the annotation `@A`.
fn own_annotations(object: &Object) -> Vec<Annotation> {
    annotations_with_prefix(object, "")
}

/// Annotations written as `member@Term#Qualifier` members next to `member`
fn member_annotations(object: &Object, member: &str) -> Vec<Annotation> {
    annotations_with_prefix(object, member)
}

fn annotations_with_prefix(object: &Object, prefix: &str) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = Vec::new();
    let mut nested: Vec<(&str, Annotation)> = Vec::new();

    for (key, value) in object {
        let Some(rest) = key.strip_prefix(prefix).and_then(|r| r.strip_prefix('@')) else {
            continue;
        };
        match rest.split_once('@') {
            None => annotations.push(parse_annotation(rest, value)),
            Some((outer, inner)) => nested.push((outer, parse_annotation(inner, value))),
        }
    }

    for (outer, annotation) in nested {
        match annotations.iter_mut().find(|a| annotation_key(a) == outer) {
            Some(parent) => parent.annotations.push(annotation),
            None => warn!("Annotation {} annotates missing annotation {}", annotation.term, outer),
        }
    }
    annotations
}

fn annotation_key(annotation: &Annotation) -> String {
    match &annotation.qualifier {
        Some(qualifier) => format!("{}#{}", annotation.term, qualifier),
        None => annotation.term.clone(),
    }
}

fn parse_annotation(key: &str, value: &Value) -> Annotation {
    let (term, qualifier) = match key.split_once('#') {
        Some((term, qualifier)) => (term, Some(qualifier.to_string())),
        None => (key, None),
    };
    Annotation {
        term: term.to_string(),
        qualifier,
        expression: Some(parse_expression(value)),
        annotations: Vec::new(),
    }
}

const CONSTANT_MEMBERS: [(&str, ConstantKind); 8] = [
    ("$Binary", ConstantKind::Binary),
    ("$Date", ConstantKind::Date),
    ("$DateTimeOffset", ConstantKind::DateTimeOffset),
    ("$Decimal", ConstantKind::Decimal),
    ("$Duration", ConstantKind::Duration),
    ("$EnumMember", ConstantKind::EnumMember),
    ("$Guid", ConstantKind::Guid),
    ("$TimeOfDay", ConstantKind::TimeOfDay),
];

const PATH_MEMBERS: [(&str, PathKind); 4] = [
    ("$Path", PathKind::Path),
    ("$AnnotationPath", PathKind::AnnotationPath),
    ("$NavigationPropertyPath", PathKind::NavigationPropertyPath),
    ("$PropertyPath", PathKind::PropertyPath),
];

const BINARY_MEMBERS: [(&str, BinaryOperator); 8] = [
    ("$And", BinaryOperator::And),
    ("$Or", BinaryOperator::Or),
    ("$Eq", BinaryOperator::Eq),
    ("$Ne", BinaryOperator::Ne),
    ("$Gt", BinaryOperator::Gt),
    ("$Ge", BinaryOperator::Ge),
    ("$Lt", BinaryOperator::Lt),
    ("$Le", BinaryOperator::Le),
];

fn parse_expression(value: &Value) -> Expression {
    match value {
        Value::Null => Expression::Null,
        Value::Bool(b) => Expression::bool(*b),
        Value::Number(n) => Expression::Constant {
            constant: if n.is_i64() || n.is_u64() {
                ConstantKind::Int
            } else {
                ConstantKind::Float
            },
            value: n.to_string(),
        },
        Value::String(s) => Expression::string(s.clone()),
        Value::Array(items) => Expression::Collection {
            items: items.iter().map(parse_expression).collect(),
        },
        Value::Object(object) => parse_object_expression(object),
    }
}

fn parse_object_expression(object: &Object) -> Expression {
    for (member, constant) in CONSTANT_MEMBERS {
        if let Some(value) = object.get(member) {
            return Expression::Constant {
                constant,
                value: scalar_text(value),
            };
        }
    }
    for (member, path) in PATH_MEMBERS {
        if let Some(value) = object.get(member) {
            return Expression::Path {
                path,
                value: scalar_text(value),
            };
        }
    }
    for (member, operator) in BINARY_MEMBERS {
        if let Some(operands) = object.get(member).and_then(Value::as_array)
            && let [left, right] = operands.as_slice()
        {
            return Expression::Binary {
                operator,
                left: Box::new(parse_expression(left)),
                right: Box::new(parse_expression(right)),
            };
        }
    }

    if object.contains_key("$Null") {
        return Expression::Null;
    }
    if let Some(parameters) = object.get("$Apply").and_then(Value::as_array) {
        return Expression::Apply {
            function: str_member(object, "$Function").unwrap_or_default(),
            parameters: parameters.iter().map(parse_expression).collect(),
        };
    }
    if let Some(value) = object.get("$Cast") {
        return Expression::Cast {
            type_name: str_member(object, "$Type").unwrap_or_default(),
            value: Box::new(parse_expression(value)),
        };
    }
    if let Some(value) = object.get("$IsOf") {
        return Expression::IsOf {
            type_name: str_member(object, "$Type").unwrap_or_default(),
            value: Box::new(parse_expression(value)),
        };
    }
    if let Some(operands) = object.get("$If").and_then(Value::as_array)
        && let [condition, then, rest @ ..] = operands.as_slice()
    {
        return Expression::If {
            condition: Box::new(parse_expression(condition)),
            then: Box::new(parse_expression(then)),
            otherwise: rest.first().map(|e| Box::new(parse_expression(e))),
        };
    }
    if let Some(value) = object.get("$Not") {
        return Expression::Not {
            value: Box::new(parse_expression(value)),
        };
    }
    if let Some(value) = object.get("$LabeledElement") {
        return Expression::LabeledElement {
            name: str_member(object, "$Name").unwrap_or_default(),
            value: Box::new(parse_expression(value)),
        };
    }
    if let Some(name) = str_member(object, "$LabeledElementReference") {
        return Expression::LabeledElementReference { name };
    }
    if let Some(value) = object.get("$UrlRef") {
        return Expression::UrlRef {
            value: Box::new(parse_expression(value)),
        };
    }

    // Anything else is a record; `@type` carries the record type as a
    // context URL fragment
    let type_name = str_member(object, "@type").map(|t| match t.rsplit_once('#') {
        Some((_, fragment)) => fragment.to_string(),
        None => t,
    });
    Expression::Record {
        type_name,
        properties: object
            .iter()
            .filter(|(key, _)| !key.starts_with('$') && !key.contains('@'))
            .map(|(property, value)| PropertyValue {
                property: property.clone(),
                value: parse_expression(value),
            })
            .collect(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn str_member(object: &Object, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_member(object: &Object, key: &str) -> Option<bool> {
    object.get(key).and_then(Value::as_bool)
}

fn u32_member(object: &Object, key: &str) -> Option<u32> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

/// Facets may be numbers or keywords such as `max` and `variable`
fn facet_member(object: &Object, key: &str) -> Option<String> {
    object.get(key).filter(|v| !v.is_null()).map(scalar_text)
}

fn array_member<'a>(object: &'a Object, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
