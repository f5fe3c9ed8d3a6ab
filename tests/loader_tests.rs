//! Loader, store and configuration tests

use odata_metadata_sdk::config::{CONFIG_FILENAME, MetadataConfig};
use odata_metadata_sdk::model::{LoadError, MetadataLoader, MetadataStore, compute_etag};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const XML: &str = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
      <EntityType Name="Customer">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
      </EntityType>
      <EntityContainer Name="Container">
        <EntitySet Name="Customers" EntityType="NS.Customer"/>
        <Singleton Name="Me" Type="NS.Customer"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

mod loader_tests {
    use super::*;

    #[test]
    fn loads_from_path_with_etag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("service.edmx");
        fs::write(&path, XML).unwrap();

        let mut config = MetadataConfig::default();
        config.validation.reject_singletons = false;
        let loaded = MetadataLoader::with_config(config).load_path(&path).unwrap();

        assert_eq!(loaded.etag, compute_etag(XML.as_bytes()));
        assert!(loaded.model.entity_container(&"NS.Container".parse().unwrap()).is_some());
    }

    #[test]
    fn default_config_rejects_singletons_on_load() {
        let err = MetadataLoader::new().load_str(XML).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        assert_eq!(
            err.to_string(),
            "Metadata validation failed: Validations of Singletons are not supported: Me"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = MetadataLoader::new()
            .load_path(&dir.path().join("absent.xml"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn config_file_is_read_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[validation]\nreject_singletons = false\n\n[loader]\nvalidate_on_load = true\n",
        )
        .unwrap();

        let config = MetadataConfig::from_file(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(!config.validation.reject_singletons);
        assert!(MetadataLoader::with_config(config).load_str(XML).is_ok());
    }
}

mod store_tests {
    use super::*;

    fn relaxed_loader() -> MetadataLoader {
        let mut config = MetadataConfig::default();
        config.validation.reject_singletons = false;
        MetadataLoader::with_config(config)
    }

    #[test]
    fn refresh_swaps_only_on_new_etag() {
        let store = MetadataStore::load(relaxed_loader(), XML).unwrap();
        let first = store.current();

        assert!(!store.refresh(&compute_etag(XML.as_bytes()), XML).unwrap());
        assert!(Arc::ptr_eq(&first, &store.current()));

        let renamed = XML.replace("Customers", "Clients");
        assert!(store.refresh("\"v2\"", &renamed).unwrap());
        assert_eq!(store.etag(), "\"v2\"");

        let container = "NS.Container".parse().unwrap();
        assert!(
            first
                .entity_container(&container)
                .unwrap()
                .get_entity_set("Customers")
                .is_some()
        );
        assert!(
            store
                .current()
                .entity_container(&container)
                .unwrap()
                .get_entity_set("Clients")
                .is_some()
        );
    }
}
