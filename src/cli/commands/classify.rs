//! Classify command implementation

use super::{input_format, load_input};
use crate::cli::error::CliError;
use crate::import::{MetadataFormat, import_metadata, import_with_format};
use crate::validation::is_v4_metadata;

/// Handle the classify command
pub fn handle_classify(input: &str) -> Result<(), CliError> {
    let content = load_input(input)?;
    println!("{}", classify_content(&content, input_format(input))?);
    Ok(())
}

/// Report the OData version family of a document and the schema namespaces
/// it was judged on
pub fn classify_content(content: &str, format: Option<MetadataFormat>) -> Result<String, CliError> {
    let metadata = match format {
        Some(format) => import_with_format(content, format)?,
        None => import_metadata(content)?,
    };

    let family = if is_v4_metadata(&metadata)? {
        "OData V4"
    } else {
        "OData V2/V3"
    };

    let mut report = family.to_string();
    for namespace in metadata.schema_xml_namespaces() {
        report.push_str("\n  ");
        report.push_str(namespace);
    }
    Ok(report)
}
