//! Inspect command implementation

use super::{input_format, load_config, load_input, resolve_input};
use crate::cli::error::CliError;
use crate::resolver::{ItemKind, ResolvedModel, ResolvedTypeKind};
use std::fmt::Write;

/// Handle the inspect command
pub fn handle_inspect(input: &str, type_name: Option<&str>) -> Result<(), CliError> {
    let config = load_config(None)?;
    let content = load_input(input)?;
    let model = resolve_input(&content, input_format(input), &config)?;

    let report = match type_name {
        Some(type_name) => describe_type(&model, type_name)?,
        None => describe_schemas(&model),
    };
    print!("{}", report);
    Ok(())
}

/// One block per schema with item counts and the container
pub fn describe_schemas(model: &ResolvedModel) -> String {
    let mut out = String::new();
    for schema in model.schemas() {
        let _ = write!(out, "Schema {}", schema.namespace);
        if let Some(alias) = &schema.alias {
            let _ = write!(out, " (alias {})", alias);
        }
        out.push('\n');
        let counts = [
            ("entity types", schema.entity_types.len()),
            ("complex types", schema.complex_types.len()),
            ("enum types", schema.enum_types.len()),
            ("type definitions", schema.type_definitions.len()),
            ("actions", schema.actions.len()),
            ("functions", schema.functions.len()),
            ("terms", schema.terms.len()),
        ];
        for (label, count) in counts.iter().filter(|(_, count)| *count > 0) {
            let _ = writeln!(out, "  {}: {}", label, count);
        }
        if let Some(container) = &schema.entity_container {
            let _ = writeln!(
                out,
                "  container {}: {} entity sets, {} singletons, {} imports",
                container.name,
                container.entity_sets.len(),
                container.singletons.len(),
                container.action_imports.len() + container.function_imports.len()
            );
        }
    }
    out
}

/// Resolved view of a single type: kind, inheritance, key and members
pub fn describe_type(model: &ResolvedModel, type_name: &str) -> Result<String, CliError> {
    let resolved = model.resolve_type(type_name)?;
    let fqn = &resolved.name;
    let mut out = String::new();
    let _ = writeln!(out, "{}", resolved);

    match resolved.kind {
        ResolvedTypeKind::Primitive(_) => {
            let _ = writeln!(out, "  kind: primitive");
            return Ok(out);
        }
        ResolvedTypeKind::External => {
            let _ = writeln!(out, "  kind: external (referenced document)");
            return Ok(out);
        }
        ResolvedTypeKind::Item(kind) => {
            let _ = writeln!(out, "  kind: {}", kind);
            if !matches!(kind, ItemKind::EntityType | ItemKind::ComplexType) {
                return Ok(out);
            }
        }
    }

    let ancestors = model.ancestors(fqn);
    if !ancestors.is_empty() {
        let names: Vec<String> = ancestors.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  base types: {}", names.join(" -> "));
    }
    if let Some(base) = model.dangling_base_type(fqn) {
        let _ = writeln!(out, "  unresolved base type: {}", base);
    }
    let derived = model.derived_types(fqn);
    if !derived.is_empty() {
        let names: Vec<String> = derived.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  derived types: {}", names.join(", "));
    }

    if let Some(key) = model.key_of(fqn) {
        let names: Vec<&str> = key.iter().map(|k| k.name.as_str()).collect();
        let _ = writeln!(out, "  key: {}", names.join(", "));
    }

    let properties = model.all_properties(fqn);
    if !properties.is_empty() {
        let _ = writeln!(out, "  properties:");
        for property in properties {
            let _ = writeln!(out, "    {}: {}", property.name, property.type_ref());
        }
    }

    let mut lineage: Vec<_> = std::iter::once(fqn).chain(ancestors.iter()).collect();
    lineage.reverse();
    let navigation: Vec<_> = lineage
        .into_iter()
        .filter_map(|t| model.structural_type(t))
        .flat_map(|t| t.navigation_properties().iter())
        .collect();
    if !navigation.is_empty() {
        let _ = writeln!(out, "  navigation properties:");
        for property in navigation {
            let _ = writeln!(out, "    {}: {}", property.name, property.type_ref());
        }
    }
    Ok(out)
}
