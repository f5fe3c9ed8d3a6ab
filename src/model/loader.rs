//! Metadata loading
//!
//! Turns a metadata document (string or file) into a shared
//! [`ResolvedModel`]:
//!
//! 1. size check against `loader.max_document_size`
//! 2. format detection (file extension first, then content sniffing)
//! 3. parsing into the raw item tree
//! 4. optional V4 requirement
//! 5. resolution
//! 6. optional validation with the configured options

use crate::config::MetadataConfig;
use crate::import::{ImportError, MetadataFormat, import_with_format};
use crate::resolver::{ResolutionError, ResolvedModel, resolve_metadata};
use crate::validation::input::{InputValidationError, validate_document_size};
use crate::validation::metadata::{MetadataValidationResult, MetadataValidator};
use crate::validation::version::{
    CSDL_V4_NAMESPACE, ClassificationError, is_legacy_namespace, is_v4_metadata,
};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading a metadata document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error(transparent)]
    Input(#[from] InputValidationError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error("Metadata is not OData V4 (schema namespaces: {})", .0.join(", "))]
    NotV4(Vec<String>),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("Metadata validation failed: {}", .0.messages().join("; "))]
    Invalid(MetadataValidationResult),
}

/// A resolved model together with the ETag of the document it came from
#[derive(Debug, Clone)]
pub struct LoadedMetadata {
    pub model: Arc<ResolvedModel>,
    pub etag: String,
}

/// Compute the SHA-256 fingerprint used as the default ETag
pub fn compute_etag(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Config-driven metadata loader
#[derive(Debug, Clone, Default)]
pub struct MetadataLoader {
    config: MetadataConfig,
}

impl MetadataLoader {
    /// Create a loader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MetadataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    /// Load a document held in memory, detecting its format.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::model::MetadataLoader;
    ///
    /// let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
    ///   <edmx:DataServices>
    ///     <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
    ///       <EntityType Name="Customer">
    ///         <Key><PropertyRef Name="ID"/></Key>
    ///         <Property Name="ID" Type="Edm.Int32"/>
    ///       </EntityType>
    ///     </Schema>
    ///   </edmx:DataServices>
    /// </edmx:Edmx>"#;
    /// let loaded = MetadataLoader::new().load_str(xml).unwrap();
    /// assert_eq!(loaded.etag.len(), 64);
    /// assert!(loaded.model.entity_types().next().is_some());
    /// ```
    pub fn load_str(&self, content: &str) -> Result<LoadedMetadata, LoadError> {
        self.load_with_format(content, None)
    }

    /// Load a document from disk. The file extension picks the format when
    /// it is recognized.
    pub fn load_path(&self, path: &Path) -> Result<LoadedMetadata, LoadError> {
        let size = std::fs::metadata(path)
            .map_err(|e| LoadError::Io(format!("Failed to stat {}: {}", path.display(), e)))?
            .len();
        validate_document_size(size, self.config.loader.max_document_size)?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        info!("Loading metadata from {}", path.display());
        self.load_with_format(&content, MetadataFormat::from_path(path))
    }

    /// Load a document of a known (or detected) format
    pub fn load_with_format(
        &self,
        content: &str,
        format: Option<MetadataFormat>,
    ) -> Result<LoadedMetadata, LoadError> {
        let etag = compute_etag(content.as_bytes());
        let model = self.build_model(content, format)?;
        info!("Loaded metadata document {}", etag);
        Ok(LoadedMetadata {
            model: Arc::new(model),
            etag,
        })
    }

    /// Parse, resolve and (optionally) validate a document
    pub fn build_model(
        &self,
        content: &str,
        format: Option<MetadataFormat>,
    ) -> Result<ResolvedModel, LoadError> {
        validate_document_size(content.len() as u64, self.config.loader.max_document_size)?;

        let format = match format {
            Some(format) => format,
            None => MetadataFormat::detect(content)?,
        };
        debug!("Parsing metadata document as {}", format);
        let metadata = import_with_format(content, format)?;

        if self.config.loader.require_v4 && !is_v4_metadata(&metadata)? {
            let namespaces: Vec<String> = metadata
                .schema_xml_namespaces()
                .into_iter()
                .filter(|ns| *ns != CSDL_V4_NAMESPACE)
                .map(str::to_string)
                .collect();
            for namespace in namespaces.iter().filter(|ns| !is_legacy_namespace(ns)) {
                warn!("Unrecognized CSDL namespace {}", namespace);
            }
            return Err(LoadError::NotV4(namespaces));
        }

        let model = resolve_metadata(metadata)?;

        if self.config.loader.validate_on_load {
            let validator = MetadataValidator::with_options(self.config.validation_options());
            let result = validator.validate_configured(&model);
            if !result.is_valid() {
                return Err(LoadError::Invalid(result));
            }
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V2: &str = r#"<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices>
    <Schema Namespace="ODataDemo" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Product">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
      </EntityType>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

    #[test]
    fn etag_is_sha256_hex() {
        assert_eq!(
            compute_etag(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn require_v4_rejects_legacy_documents() {
        let mut config = MetadataConfig::default();
        config.loader.require_v4 = true;
        let err = MetadataLoader::with_config(config).load_str(V2).unwrap_err();
        assert!(matches!(err, LoadError::NotV4(ref ns) if ns == &["http://schemas.microsoft.com/ado/2008/09/edm"]));

        assert!(MetadataLoader::new().load_str(V2).is_ok());
    }

    #[test]
    fn not_v4_names_only_the_offending_namespaces() {
        let mixed = V2.replace(
            "<Schema Namespace=\"ODataDemo\"",
            "<Schema Namespace=\"Current\" xmlns=\"http://docs.oasis-open.org/odata/ns/edm\"/>\n    <Schema Namespace=\"ODataDemo\"",
        );
        let mut config = MetadataConfig::default();
        config.loader.require_v4 = true;
        let err = MetadataLoader::with_config(config).load_str(&mixed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Metadata is not OData V4 (schema namespaces: http://schemas.microsoft.com/ado/2008/09/edm)"
        );
    }

    #[test]
    fn oversized_documents_are_rejected() {
        let mut config = MetadataConfig::default();
        config.loader.max_document_size = 16;
        let err = MetadataLoader::with_config(config).load_str(V2).unwrap_err();
        assert!(matches!(err, LoadError::Input(InputValidationError::DocumentTooLarge { .. })));
    }

    #[test]
    fn validation_can_be_skipped() {
        let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
      <EntityType Name="NoKey"/>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
        let err = MetadataLoader::new().load_str(xml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Metadata validation failed: Missing key for EntityType NoKey"
        );

        let mut config = MetadataConfig::default();
        config.loader.validate_on_load = false;
        assert!(MetadataLoader::with_config(config).load_str(xml).is_ok());
    }
}
