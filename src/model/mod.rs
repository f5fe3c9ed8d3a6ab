//! Model loading and sharing
//!
//! Provides high-level operations for turning metadata documents into
//! shared, resolved models and for swapping them when the document changes.

pub mod loader;
pub mod store;

pub use loader::{LoadError, LoadedMetadata, MetadataLoader, compute_etag};
pub use store::MetadataStore;
