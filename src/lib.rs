//! OData Metadata SDK - CSDL metadata model, reference resolver and validator
//!
//! Provides unified interfaces for:
//! - Reading CSDL XML (EDMX) and CSDL JSON documents into an item tree
//! - Resolving aliases, type references and inheritance into a shared model
//! - Classifying documents as OData V4 or V2/V3
//! - Validating structural consistency (keys, base types, bindings,
//!   referential constraints, operation imports, bound operations)
//! - Loading, sharing and refreshing resolved models
//!
//! # Example
//!
//! ```rust
//! use odata_metadata_sdk::{MetadataValidator, import_metadata, resolve_metadata};
//!
//! let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
//!   <edmx:DataServices>
//!     <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS" Alias="A">
//!       <EntityType Name="Customer">
//!         <Key><PropertyRef Name="ID"/></Key>
//!         <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
//!       </EntityType>
//!       <EntityContainer Name="Container">
//!         <EntitySet Name="Customers" EntityType="A.Customer"/>
//!       </EntityContainer>
//!     </Schema>
//!   </edmx:DataServices>
//! </edmx:Edmx>"#;
//!
//! let model = resolve_metadata(import_metadata(xml).unwrap()).unwrap();
//! assert_eq!(model.canonical_name("A.Customer").unwrap(), "NS.Customer");
//! assert!(MetadataValidator::new().validate(&model).is_ok());
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod import;
pub mod model;
pub mod models;
pub mod resolver;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, MetadataConfig};
pub use import::{
    ImportError, JsonMetadataImporter, MetadataFormat, XmlMetadataImporter, import_metadata,
};
pub use model::{LoadError, LoadedMetadata, MetadataLoader, MetadataStore};
pub use models::{CsdlMetadata, CsdlSchema, FullQualifiedName};
pub use resolver::{ResolutionError, ResolvedModel, resolve_metadata};
pub use validation::{
    ClassificationError, MetadataValidationError, MetadataValidationResult, MetadataValidator,
    ValidationOptions, is_v4_metadata, validate_metadata,
};
