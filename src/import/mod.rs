//! Import functionality
//!
//! Provides readers that turn a metadata document into the raw
//! [`CsdlMetadata`] tree:
//! - CSDL XML (EDMX), OData V4, with enough tolerance for V2/V3 documents
//!   to classify them
//! - CSDL JSON (OData 4.01)
//!
//! Readers only populate the tree. Type references are left as written and
//! nothing is cross-checked; see [`crate::resolver`] and
//! [`crate::validation`].

pub mod json;
pub mod xml;

pub use json::JsonMetadataImporter;
pub use xml::XmlMetadataImporter;

use crate::models::CsdlMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Error during import
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(String),
}

/// Serialization of a metadata document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataFormat {
    Xml,
    Json,
}

impl MetadataFormat {
    /// Sniff the format from the first non-whitespace character
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::import::MetadataFormat;
    ///
    /// assert_eq!(MetadataFormat::detect("  <?xml version=\"1.0\"?>").unwrap(), MetadataFormat::Xml);
    /// assert_eq!(MetadataFormat::detect("{\"$Version\":\"4.01\"}").unwrap(), MetadataFormat::Json);
    /// assert!(MetadataFormat::detect("Version: 4").is_err());
    /// ```
    pub fn detect(content: &str) -> Result<Self, ImportError> {
        match content.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('<') => Ok(MetadataFormat::Xml),
            Some('{') => Ok(MetadataFormat::Json),
            Some(c) => Err(ImportError::UnsupportedFormat(format!(
                "document starts with '{}', expected XML or JSON",
                c
            ))),
            None => Err(ImportError::ParseError("empty document".to_string())),
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "xml" | "edmx" | "csdl" => Some(MetadataFormat::Xml),
            "json" => Some(MetadataFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataFormat::Xml => f.write_str("xml"),
            MetadataFormat::Json => f.write_str("json"),
        }
    }
}

/// Parse a document of a known format
pub fn import_with_format(content: &str, format: MetadataFormat) -> Result<CsdlMetadata, ImportError> {
    match format {
        MetadataFormat::Xml => XmlMetadataImporter::new().import(content),
        MetadataFormat::Json => JsonMetadataImporter::new().import(content),
    }
}

/// Parse a document, detecting its format
pub fn import_metadata(content: &str) -> Result<CsdlMetadata, ImportError> {
    import_with_format(content, MetadataFormat::detect(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_after_bom() {
        assert_eq!(
            MetadataFormat::detect("\u{feff}<edmx:Edmx/>").unwrap(),
            MetadataFormat::Xml
        );
        assert!(matches!(
            MetadataFormat::detect("   "),
            Err(ImportError::ParseError(_))
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            MetadataFormat::from_path(Path::new("service/$metadata.EDMX")),
            Some(MetadataFormat::Xml)
        );
        assert_eq!(
            MetadataFormat::from_path(Path::new("csdl.json")),
            Some(MetadataFormat::Json)
        );
        assert_eq!(MetadataFormat::from_path(Path::new("notes.txt")), None);
    }
}
