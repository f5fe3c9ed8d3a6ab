//! Metadata validation
//!
//! Runs a fixed sequence of structural checks over a [`ResolvedModel`]:
//!
//! 1. singletons (rejected unless configured otherwise)
//! 2. entity types: base type resolves, concrete types have a key
//! 3. complex types: base type resolves
//! 4. entity sets: entity type resolves, navigation property bindings
//! 5. referential constraints on entity and complex types
//! 6. action and function imports
//! 7. bound actions and functions
//!
//! [`MetadataValidator::validate`] stops at the first violation.
//! [`MetadataValidator::validate_all`] walks every check and returns all
//! violations in the same order. Messages are identical in both modes.

use super::bindings::validate_binding_target;
use crate::models::{
    BindingTarget, CsdlMetadata, FullQualifiedName, NavigationProperty, Operation, StructuralType,
};
use crate::resolver::{ItemKind, ResolutionError, ResolvedModel, resolve_metadata};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Structural defects found in a metadata document
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MetadataValidationError {
    #[error("Validations of Singletons are not supported: {0}")]
    SingletonsNotSupported(String),

    #[error("Missing key for EntityType {0}")]
    MissingKey(String),

    #[error("Can't find base type with name: {base_type} for entity type: {name}")]
    EntityBaseTypeNotFound { base_type: String, name: String },

    #[error("Can't find base type with name: {base_type} for complex type: {name}")]
    ComplexBaseTypeNotFound { base_type: String, name: String },

    #[error("Invalid Entity Type {0}")]
    InvalidEntityType(String),

    #[error("The fully Qualified type {0} mentioned in navigation binding path not found ")]
    BindingPathTypeNotFound(String),

    #[error("Navigation Property {path} not found in type {type_name}")]
    NavigationPropertyNotFound { path: String, type_name: String },

    #[error("Navigation Property Type {target_type} does not match the binding target type {navigation_type}")]
    BindingTypeMismatch {
        target_type: String,
        navigation_type: String,
    },

    #[error("Container with FullyQualifiedName {0} not found.")]
    ContainerNotFound(String),

    #[error("Target Entity Set mentioned in navigationBindingProperty not found in the container {0}")]
    TargetNotInContainer(String),

    #[error("Navigation Property Target {target} is not part of the same container {container}")]
    TargetNotInSameContainer { target: String, container: String },

    #[error("Property name {0} not part of the source entity.")]
    SourcePropertyNotFound(String),

    #[error("Property name {0} not part of the target entity.")]
    TargetPropertyNotFound(String),

    #[error("Invalid Action {0}")]
    InvalidAction(String),

    #[error("Invalid Function {0}")]
    InvalidFunction(String),

    #[error("Invalid binding parameter type {type_name} for operation {operation}")]
    InvalidBindingParameterType { type_name: String, operation: String },

    #[error("Bound operation {0} has no binding parameter")]
    MissingBindingParameter(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Validator switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Stop at the first violation when the caller asks for the configured mode
    pub fail_fast: bool,
    /// Fail as soon as a container declares a singleton
    pub reject_singletons: bool,
    /// Accept binding targets whose entity type is a base of the
    /// navigation property's type
    pub allow_base_type_binding_targets: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            reject_singletons: true,
            allow_base_type_binding_targets: true,
        }
    }
}

/// Every violation found by [`MetadataValidator::validate_all`], in check order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use = "validation results should be checked for errors"]
pub struct MetadataValidationResult {
    pub errors: Vec<MetadataValidationError>,
}

impl MetadataValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first(&self) -> Option<&MetadataValidationError> {
        self.errors.first()
    }

    /// Messages of every violation
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_result(self) -> Result<(), MetadataValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Either stops at the first violation or records it and carries on
pub(crate) struct Collector {
    fail_fast: bool,
    errors: Vec<MetadataValidationError>,
}

impl Collector {
    fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast,
            errors: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, err: MetadataValidationError) -> Result<(), MetadataValidationError> {
        if self.fail_fast {
            return Err(err);
        }
        warn!("Metadata violation: {}", err);
        self.errors.push(err);
        Ok(())
    }

    /// Report the error of a single check, if any
    pub(crate) fn check(
        &mut self,
        result: Result<(), MetadataValidationError>,
    ) -> Result<(), MetadataValidationError> {
        match result {
            Ok(()) => Ok(()),
            Err(err) => self.report(err),
        }
    }
}

/// Metadata validator
#[derive(Debug, Clone, Default)]
pub struct MetadataValidator {
    options: ValidationOptions,
}

impl MetadataValidator {
    /// Create a validator with default options
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::validation::metadata::MetadataValidator;
    ///
    /// let validator = MetadataValidator::new();
    /// assert!(validator.options().reject_singletons);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`MetadataValidationError`] in check order.
    pub fn validate(&self, model: &ResolvedModel) -> Result<(), MetadataValidationError> {
        debug!("Validating metadata (fail fast)");
        let mut collector = Collector::new(true);
        let outcome = self.run(model, &mut collector);
        match &outcome {
            Ok(()) => info!("Metadata validation passed"),
            Err(err) => warn!("Metadata validation failed: {}", err),
        }
        outcome
    }

    /// Validate, recording every violation
    pub fn validate_all(&self, model: &ResolvedModel) -> MetadataValidationResult {
        debug!("Validating metadata (all violations)");
        let mut collector = Collector::new(false);
        // Never short-circuits when fail_fast is off
        let _ = self.run(model, &mut collector);
        info!(
            "Metadata validation finished with {} violation(s)",
            collector.errors.len()
        );
        MetadataValidationResult {
            errors: collector.errors,
        }
    }

    /// Validate in the mode selected by [`ValidationOptions::fail_fast`]
    pub fn validate_configured(&self, model: &ResolvedModel) -> MetadataValidationResult {
        if self.options.fail_fast {
            MetadataValidationResult {
                errors: self.validate(model).err().into_iter().collect(),
            }
        } else {
            self.validate_all(model)
        }
    }

    fn run(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        if self.options.reject_singletons {
            self.check_singletons(model, collector)?;
        }
        self.check_entity_types(model, collector)?;
        self.check_complex_types(model, collector)?;
        self.check_binding_targets(model, collector)?;
        self.check_referential_constraints(model, collector)?;
        self.check_imports(model, collector)?;
        self.check_bound_operations(model, collector)?;
        Ok(())
    }

    fn check_singletons(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (_, container) in model.containers() {
            for singleton in &container.singletons {
                collector.report(MetadataValidationError::SingletonsNotSupported(
                    singleton.name.clone(),
                ))?;
            }
        }
        Ok(())
    }

    fn check_entity_types(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (fqn, entity_type) in model.entity_types() {
            if let Some(base) = model.dangling_base_type(&fqn) {
                collector.report(MetadataValidationError::EntityBaseTypeNotFound {
                    base_type: display_name(model, base),
                    name: entity_type.name.clone(),
                })?;
                continue;
            }
            if !entity_type.is_abstract && model.key_of(&fqn).is_none() {
                collector.report(MetadataValidationError::MissingKey(entity_type.name.clone()))?;
            }
        }
        Ok(())
    }

    fn check_complex_types(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (fqn, complex_type) in model.complex_types() {
            if let Some(base) = model.dangling_base_type(&fqn) {
                collector.report(MetadataValidationError::ComplexBaseTypeNotFound {
                    base_type: display_name(model, base),
                    name: complex_type.name.clone(),
                })?;
            }
        }
        Ok(())
    }

    fn check_binding_targets(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (container_name, container) in model.containers() {
            for target in container.binding_targets() {
                let is_singleton = matches!(target, BindingTarget::Singleton(_));
                if is_singleton && self.options.reject_singletons {
                    continue;
                }
                validate_binding_target(model, &self.options, &container_name, target, collector)?;
            }
        }
        Ok(())
    }

    fn check_referential_constraints(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (fqn, entity_type) in model.entity_types() {
            for navigation in entity_type.navigation_properties() {
                collector.check(check_constraints(model, &fqn, navigation))?;
            }
        }
        for (fqn, complex_type) in model.complex_types() {
            for navigation in complex_type.navigation_properties() {
                collector.check(check_constraints(model, &fqn, navigation))?;
            }
        }
        Ok(())
    }

    fn check_imports(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for (_, container) in model.containers() {
            for import in &container.action_imports {
                let found = model
                    .resolve_name(&import.action)
                    .map(|fqn| !model.actions(&fqn).is_empty())
                    .unwrap_or(false);
                if !found {
                    collector.report(MetadataValidationError::InvalidAction(import.action.clone()))?;
                }
            }
            for import in &container.function_imports {
                let found = model
                    .resolve_name(&import.function)
                    .map(|fqn| !model.functions(&fqn).is_empty())
                    .unwrap_or(false);
                if !found {
                    collector.report(MetadataValidationError::InvalidFunction(
                        import.function.clone(),
                    ))?;
                }
            }
        }
        Ok(())
    }

    fn check_bound_operations(
        &self,
        model: &ResolvedModel,
        collector: &mut Collector,
    ) -> Result<(), MetadataValidationError> {
        for schema in model.schemas() {
            let operations = schema
                .actions
                .iter()
                .map(|a| a as &dyn Operation)
                .chain(schema.functions.iter().map(|f| f as &dyn Operation));
            for operation in operations {
                if !operation.is_bound() {
                    continue;
                }
                let fqn = FullQualifiedName::new(schema.namespace.as_str(), operation.name());
                collector.check(check_binding_parameter(model, &fqn, operation))?;
            }
        }
        Ok(())
    }
}

/// Canonical form of a qualified name when its namespace resolves,
/// otherwise the name as written
fn display_name(model: &ResolvedModel, token: &str) -> String {
    model
        .resolve_name(token)
        .map(|fqn| fqn.to_string())
        .unwrap_or_else(|_| token.to_string())
}

/// Resolve a reference that must denote an entity type
pub(crate) fn resolve_entity_type(
    model: &ResolvedModel,
    token: &str,
) -> Result<FullQualifiedName, MetadataValidationError> {
    match model.lookup(token) {
        Ok((fqn, loc)) if loc.kind == ItemKind::EntityType => Ok(fqn),
        _ => Err(MetadataValidationError::InvalidEntityType(token.to_string())),
    }
}

fn check_constraints(
    model: &ResolvedModel,
    source: &FullQualifiedName,
    navigation: &NavigationProperty,
) -> Result<(), MetadataValidationError> {
    if navigation.referential_constraints.is_empty() {
        return Ok(());
    }

    for constraint in &navigation.referential_constraints {
        if model.find_property(source, &constraint.property).is_none() {
            return Err(MetadataValidationError::SourcePropertyNotFound(
                constraint.property.clone(),
            ));
        }
    }

    let target = resolve_entity_type(model, &navigation.type_name)?;
    for constraint in &navigation.referential_constraints {
        if model
            .find_property(&target, &constraint.referenced_property)
            .is_none()
        {
            return Err(MetadataValidationError::TargetPropertyNotFound(
                constraint.referenced_property.clone(),
            ));
        }
    }
    Ok(())
}

fn check_binding_parameter(
    model: &ResolvedModel,
    fqn: &FullQualifiedName,
    operation: &dyn Operation,
) -> Result<(), MetadataValidationError> {
    let parameter = operation
        .binding_parameter()
        .ok_or_else(|| MetadataValidationError::MissingBindingParameter(fqn.to_string()))?;

    let type_ref = parameter.type_ref();
    model
        .resolve_type(&type_ref)
        .map(|_| ())
        .map_err(|_| MetadataValidationError::InvalidBindingParameterType {
            type_name: type_ref,
            operation: fqn.to_string(),
        })
}

/// Validate a resolved model with default options, stopping at the first violation
///
/// # Example
///
/// ```rust
/// use odata_metadata_sdk::models::{CsdlMetadata, CsdlSchema, EntityType};
/// use odata_metadata_sdk::resolver::resolve_metadata;
/// use odata_metadata_sdk::validation::metadata::validate_metadata;
///
/// let model = resolve_metadata(
///     CsdlMetadata::new().with_schema(CsdlSchema::new("NS").with_entity_type(EntityType::new("NoKey"))),
/// )
/// .unwrap();
/// let err = validate_metadata(&model).unwrap_err();
/// assert_eq!(err.to_string(), "Missing key for EntityType NoKey");
/// ```
pub fn validate_metadata(model: &ResolvedModel) -> Result<(), MetadataValidationError> {
    MetadataValidator::new().validate(model)
}

/// Resolve a raw tree, then validate it with default options
pub fn validate_csdl(metadata: impl Into<Arc<CsdlMetadata>>) -> Result<(), MetadataValidationError> {
    let model = resolve_metadata(metadata)?;
    validate_metadata(&model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Action, ActionImport, ComplexType, CsdlSchema, EntityContainer, EntitySet, EntityType, FunctionImport,
        NavigationProperty, Parameter, Property, ReferentialConstraint, Singleton,
    };

    fn keyed(name: &str) -> EntityType {
        EntityType::new(name)
            .with_key(&["PropertyInt16"])
            .with_property(Property::new("PropertyInt16", "Edm.Int16"))
    }

    fn resolve(schema: CsdlSchema) -> ResolvedModel {
        resolve_metadata(CsdlMetadata::new().with_schema(schema)).unwrap()
    }

    #[test]
    fn key_is_inherited_from_base() {
        let model = resolve(
            CsdlSchema::new("NS")
                .with_entity_type(keyed("Base"))
                .with_entity_type(EntityType::new("Derived").with_base_type("NS.Base")),
        );
        assert!(validate_metadata(&model).is_ok());
    }

    #[test]
    fn abstract_type_needs_no_key() {
        let model = resolve(
            CsdlSchema::new("NS").with_entity_type(EntityType::new("Abstract").with_abstract(true)),
        );
        assert!(validate_metadata(&model).is_ok());
    }

    #[test]
    fn missing_entity_base_type_is_reported() {
        let model = resolve(
            CsdlSchema::new("NS").with_entity_type(keyed("Person").with_base_type("NS.Missing")),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Can't find base type with name: NS.Missing for entity type: Person"
        );
    }

    #[test]
    fn missing_complex_base_type_is_reported() {
        let model = resolve(
            CsdlSchema::new("NS")
                .with_alias("A")
                .with_complex_type(ComplexType::new("CTTwoPrim").with_base_type("A.CTMissing")),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Can't find base type with name: NS.CTMissing for complex type: CTTwoPrim"
        );
    }

    #[test]
    fn singleton_fails_before_anything_else() {
        let model = resolve(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("NoKey"))
                .with_entity_container(
                    EntityContainer::new("Container").with_singleton(Singleton::new("SI", "NS.NoKey")),
                ),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Validations of Singletons are not supported: SI"
        );
    }

    #[test]
    fn target_constraint_property_must_exist() {
        let model = resolve(
            CsdlSchema::new("NS").with_entity_type(
                keyed("ETOne").with_navigation_property(
                    NavigationProperty::new("NavOne", "NS.ETOne")
                        .with_constraint(ReferentialConstraint::new("PropertyInt16", "PropertyMissing")),
                ),
            ),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Property name PropertyMissing not part of the target entity."
        );
    }

    #[test]
    fn imports_must_reference_declared_operations() {
        let model = resolve(
            CsdlSchema::new("NS")
                .with_action(Action::new("UARTString"))
                .with_entity_container(
                    EntityContainer::new("Container")
                        .with_action_import(ActionImport::new("AIRTString", "NS.UARTString"))
                        .with_function_import(FunctionImport::new("FINRTInt16", "NS.UFNRTInt16")),
                ),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Invalid Function NS.UFNRTInt16"
        );
    }

    #[test]
    fn bound_operation_needs_resolvable_binding_parameter() {
        let model = resolve(
            CsdlSchema::new("NS").with_action(
                Action::new("BAMissing")
                    .bound(true)
                    .with_parameter(Parameter::new("Param", "NS.Unknown")),
            ),
        );
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Invalid binding parameter type NS.Unknown for operation NS.BAMissing"
        );

        let model = resolve(CsdlSchema::new("NS").with_action(Action::new("BAEmpty").bound(true)));
        assert_eq!(
            validate_metadata(&model).unwrap_err().to_string(),
            "Bound operation NS.BAEmpty has no binding parameter"
        );
    }

    #[test]
    fn validate_all_keeps_check_order() {
        let model = resolve(
            CsdlSchema::new("NS")
                .with_entity_type(EntityType::new("NoKey"))
                .with_entity_container(
                    EntityContainer::new("Container")
                        .with_singleton(Singleton::new("SI", "NS.NoKey"))
                        .with_entity_set(EntitySet::new("ESBad", "NS.Missing")),
                ),
        );
        let result = MetadataValidator::new().validate_all(&model);
        assert_eq!(
            result.messages(),
            vec![
                "Validations of Singletons are not supported: SI".to_string(),
                "Missing key for EntityType NoKey".to_string(),
                "Invalid Entity Type NS.Missing".to_string(),
            ]
        );
        assert_eq!(
            result.into_result().unwrap_err(),
            MetadataValidationError::SingletonsNotSupported("SI".to_string())
        );
    }

    #[test]
    fn raw_tree_is_resolved_before_validation() {
        let valid = CsdlMetadata::new().with_schema(CsdlSchema::new("NS").with_entity_type(keyed("ETOne")));
        assert_eq!(validate_csdl(valid), Ok(()));

        let cyclic = CsdlMetadata::new().with_schema(
            CsdlSchema::new("NS")
                .with_entity_type(keyed("X").with_base_type("NS.Y"))
                .with_entity_type(EntityType::new("Y").with_base_type("NS.X"))
                .with_entity_container(
                    EntityContainer::new("Container").with_singleton(Singleton::new("SI", "NS.X")),
                ),
        );
        let err = validate_csdl(cyclic).unwrap_err();
        assert!(matches!(
            err,
            MetadataValidationError::Resolution(ResolutionError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn validation_is_idempotent() {
        let model = resolve(CsdlSchema::new("NS").with_entity_type(EntityType::new("NoKey")));
        let first = validate_metadata(&model).unwrap_err();
        let second = validate_metadata(&model).unwrap_err();
        assert_eq!(first, second);
    }
}
