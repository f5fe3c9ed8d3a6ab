//! Navigation property binding checks
//!
//! A binding `path` is a `/`-separated list of segments walked from the
//! binding target's entity type. A segment is a navigation property, a
//! complex-typed structural property, or a type cast written as a qualified
//! name. The last segment names the navigation property being bound.
//!
//! A binding `target` is either a bare set/singleton name looked up in the
//! owning container (and the containers it extends) or
//! `Namespace.Container/Name`.

use super::metadata::{Collector, MetadataValidationError, ValidationOptions, resolve_entity_type};
use crate::models::{BindingTarget, FullQualifiedName, NavigationPropertyBinding};
use crate::resolver::{ItemKind, ResolvedModel};
use tracing::debug;

/// Check a binding target's entity type and every navigation property
/// binding it declares
pub(crate) fn validate_binding_target(
    model: &ResolvedModel,
    options: &ValidationOptions,
    container: &FullQualifiedName,
    target: BindingTarget<'_>,
    collector: &mut Collector,
) -> Result<(), MetadataValidationError> {
    let source_type = match resolve_entity_type(model, target.entity_type()) {
        Ok(fqn) => fqn,
        Err(err) => return collector.report(err),
    };

    for binding in target.navigation_property_bindings() {
        debug!(
            "Checking binding {} -> {} on {}",
            binding.path,
            binding.target,
            target.name()
        );
        collector.check(validate_binding(
            model,
            options,
            container,
            &source_type,
            binding,
        ))?;
    }
    Ok(())
}

fn validate_binding(
    model: &ResolvedModel,
    options: &ValidationOptions,
    container: &FullQualifiedName,
    source_type: &FullQualifiedName,
    binding: &NavigationPropertyBinding,
) -> Result<(), MetadataValidationError> {
    let navigation_type = resolve_path(model, source_type, &binding.path)?;
    let target_type = resolve_target(model, container, binding)?;

    let compatible = navigation_type == target_type
        || model.is_derived_from(&target_type, &navigation_type)
        || (options.allow_base_type_binding_targets
            && model.is_derived_from(&navigation_type, &target_type));

    if !compatible {
        return Err(MetadataValidationError::BindingTypeMismatch {
            target_type: target_type.to_string(),
            navigation_type: navigation_type.to_string(),
        });
    }
    Ok(())
}

/// Walk a binding path and return the entity type of the bound navigation
/// property
fn resolve_path(
    model: &ResolvedModel,
    source_type: &FullQualifiedName,
    path: &str,
) -> Result<FullQualifiedName, MetadataValidationError> {
    let not_found = |type_name: &FullQualifiedName| MetadataValidationError::NavigationPropertyNotFound {
        path: path.to_string(),
        type_name: type_name.to_string(),
    };

    let segments: Vec<&str> = path.split('/').collect();
    let Some((last, prefix)) = segments.split_last() else {
        return Err(not_found(source_type));
    };

    let mut current = source_type.clone();
    for segment in prefix {
        current = if segment.contains('.') {
            resolve_cast(model, &current, segment)?
        } else if let Some(property) = model.find_property(&current, segment) {
            match model.lookup(&property.type_name) {
                Ok((fqn, loc)) if loc.kind == ItemKind::ComplexType => fqn,
                _ => return Err(not_found(&current)),
            }
        } else if let Some(navigation) = model.find_navigation_property(&current, segment) {
            resolve_entity_type(model, &navigation.type_name)?
        } else {
            return Err(not_found(&current));
        };
    }

    let navigation = model
        .find_navigation_property(&current, last)
        .ok_or_else(|| not_found(&current))?;
    resolve_entity_type(model, &navigation.type_name)
}

/// A type cast segment must name a structural type in the same inheritance
/// family as the type reached so far
fn resolve_cast(
    model: &ResolvedModel,
    current: &FullQualifiedName,
    segment: &str,
) -> Result<FullQualifiedName, MetadataValidationError> {
    let not_found = || MetadataValidationError::BindingPathTypeNotFound(segment.to_string());

    let (fqn, loc) = model.lookup(segment).map_err(|_| not_found())?;
    let structural = matches!(loc.kind, ItemKind::EntityType | ItemKind::ComplexType);
    if !structural || !model.hierarchy().same_family(current, &fqn) {
        return Err(not_found());
    }
    Ok(fqn)
}

/// Resolve the binding target and return its entity type
fn resolve_target(
    model: &ResolvedModel,
    container: &FullQualifiedName,
    binding: &NavigationPropertyBinding,
) -> Result<FullQualifiedName, MetadataValidationError> {
    let target = match binding.qualified_target() {
        Some((container_token, name)) => {
            let other = model
                .resolve_name(container_token)
                .ok()
                .and_then(|fqn| model.entity_container(&fqn))
                .ok_or_else(|| MetadataValidationError::ContainerNotFound(container_token.to_string()))?;
            other.get_binding_target(name).ok_or_else(|| {
                MetadataValidationError::TargetNotInContainer(container_token.to_string())
            })?
        }
        None => model
            .find_binding_target(container, &binding.target)
            .map(|(_, target)| target)
            .ok_or_else(|| MetadataValidationError::TargetNotInSameContainer {
                target: binding.target.clone(),
                container: container.name.clone(),
            })?,
    };

    resolve_entity_type(model, target.entity_type())
}
