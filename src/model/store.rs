//! Shared, refreshable metadata
//!
//! [`MetadataStore`] hands out the current [`ResolvedModel`] as an `Arc`.
//! A refresh builds a brand-new model off to the side and swaps it in under
//! a short write lock; readers holding the previous `Arc` keep using it.

use super::loader::{LoadError, LoadedMetadata, MetadataLoader, compute_etag};
use crate::resolver::ResolvedModel;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Holder of the current metadata model
#[derive(Debug)]
pub struct MetadataStore {
    loader: MetadataLoader,
    current: RwLock<LoadedMetadata>,
}

impl MetadataStore {
    /// Load the initial document
    pub fn load(loader: MetadataLoader, content: &str) -> Result<Self, LoadError> {
        let loaded = loader.load_str(content)?;
        Ok(Self::from_loaded(loader, loaded))
    }

    /// Wrap an already loaded model
    pub fn from_loaded(loader: MetadataLoader, loaded: LoadedMetadata) -> Self {
        Self {
            loader,
            current: RwLock::new(loaded),
        }
    }

    /// The model in use right now
    pub fn current(&self) -> Arc<ResolvedModel> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.model)
    }

    /// ETag of the document behind [`MetadataStore::current`]
    pub fn etag(&self) -> String {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.etag.clone()
    }

    /// Replace the model when `etag` differs from the current one.
    ///
    /// Returns `Ok(true)` when a new model was swapped in. On error the
    /// current model stays in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::model::{MetadataLoader, MetadataStore};
    ///
    /// let v1 = r#"{"$Version":"4.01","NS":{"A":{"$Kind":"EntityType","$Key":["Id"],"Id":{}}}}"#;
    /// let v2 = r#"{"$Version":"4.01","NS":{"B":{"$Kind":"EntityType","$Key":["Id"],"Id":{}}}}"#;
    ///
    /// let store = MetadataStore::load(MetadataLoader::new(), v1).unwrap();
    /// let before = store.current();
    /// assert!(store.refresh("v2", v2).unwrap());
    /// assert!(!store.refresh("v2", v2).unwrap());
    ///
    /// assert_eq!(before.entity_types().next().unwrap().1.name, "A");
    /// assert_eq!(store.current().entity_types().next().unwrap().1.name, "B");
    /// ```
    pub fn refresh(&self, etag: &str, content: &str) -> Result<bool, LoadError> {
        if self.etag() == etag {
            debug!("Metadata ETag {} unchanged, keeping current model", etag);
            return Ok(false);
        }

        let model = Arc::new(self.loader.build_model(content, None)?);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.etag == etag {
            return Ok(false);
        }
        info!("Metadata refreshed: {} -> {}", guard.etag, etag);
        *guard = LoadedMetadata {
            model,
            etag: etag.to_string(),
        };
        Ok(true)
    }

    /// Refresh using the document's SHA-256 fingerprint as its ETag
    pub fn refresh_content(&self, content: &str) -> Result<bool, LoadError> {
        self.refresh(&compute_etag(content.as_bytes()), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn document(type_name: &str) -> String {
        format!(
            r#"{{"$Version":"4.01","NS":{{"{}":{{"$Kind":"EntityType","$Key":["Id"],"Id":{{}}}}}}}}"#,
            type_name
        )
    }

    #[test]
    fn unchanged_content_keeps_model() {
        let store = MetadataStore::load(MetadataLoader::new(), &document("A")).unwrap();
        let before = store.current();
        assert!(!store.refresh_content(&document("A")).unwrap());
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[test]
    fn failed_refresh_keeps_previous_model() {
        let store = MetadataStore::load(MetadataLoader::new(), &document("A")).unwrap();
        let etag = store.etag();
        assert!(store.refresh("broken", "{ nope").is_err());
        assert_eq!(store.etag(), etag);
    }

    #[test]
    fn readers_share_across_threads() {
        let store = Arc::new(MetadataStore::load(MetadataLoader::new(), &document("A")).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.current().entity_types().count())
            })
            .collect();
        store.refresh_content(&document("B")).unwrap();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
