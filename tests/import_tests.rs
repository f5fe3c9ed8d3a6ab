//! Reader tests for CSDL XML and CSDL JSON

use odata_metadata_sdk::import::{
    ImportError, MetadataFormat, import_metadata, import_with_format,
};
use odata_metadata_sdk::models::{ConstantKind, Expression};
use odata_metadata_sdk::resolver::resolve_metadata;
use odata_metadata_sdk::validation::{is_v4_metadata, validate_metadata};

const XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="org.example" Alias="self">
      <EntityType Name="Category">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
        <Property Name="Name" Type="Edm.String" MaxLength="50">
          <Annotation Term="Core.Description" String="Display name"/>
        </Property>
        <NavigationProperty Name="Products" Type="Collection(self.Product)" Partner="Category"/>
      </EntityType>
      <EntityType Name="Product">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
        <Property Name="CategoryID" Type="Edm.Int32"/>
        <NavigationProperty Name="Category" Type="self.Category" Partner="Products">
          <ReferentialConstraint Property="CategoryID" ReferencedProperty="ID"/>
        </NavigationProperty>
      </EntityType>
      <Action Name="Discontinue" IsBound="true">
        <Parameter Name="product" Type="self.Product"/>
      </Action>
      <EntityContainer Name="Container">
        <EntitySet Name="Categories" EntityType="self.Category">
          <NavigationPropertyBinding Path="Products" Target="Products"/>
        </EntitySet>
        <EntitySet Name="Products" EntityType="self.Product">
          <NavigationPropertyBinding Path="Category" Target="Categories"/>
        </EntitySet>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

const JSON: &str = r#"{
  "$Version": "4.01",
  "org.example": {
    "$Alias": "self",
    "Category": {
      "$Kind": "EntityType",
      "$Key": ["ID"],
      "ID": { "$Type": "Edm.Int32" },
      "Name": { "$MaxLength": 50, "$Nullable": true },
      "Name@Core.Description": "Display name",
      "Products": { "$Kind": "NavigationProperty", "$Type": "self.Product", "$Collection": true, "$Partner": "Category" }
    },
    "Product": {
      "$Kind": "EntityType",
      "$Key": ["ID"],
      "ID": { "$Type": "Edm.Int32" },
      "CategoryID": { "$Type": "Edm.Int32", "$Nullable": true },
      "Category": {
        "$Kind": "NavigationProperty",
        "$Type": "self.Category",
        "$Partner": "Products",
        "$ReferentialConstraint": { "CategoryID": "ID" }
      }
    },
    "Discontinue": [
      { "$Kind": "Action", "$IsBound": true, "$Parameter": [{ "$Name": "product", "$Type": "self.Product" }] }
    ],
    "Container": {
      "$Kind": "EntityContainer",
      "Categories": { "$Collection": true, "$Type": "self.Category", "$NavigationPropertyBinding": { "Products": "Products" } },
      "Products": { "$Collection": true, "$Type": "self.Product", "$NavigationPropertyBinding": { "Category": "Categories" } }
    }
  }
}"#;

mod reader_tests {
    use super::*;

    #[test]
    fn xml_and_json_describe_the_same_model() {
        let from_xml = import_metadata(XML).unwrap();
        let from_json = import_metadata(JSON).unwrap();

        for metadata in [from_xml, from_json] {
            let schema = metadata.schema("self").unwrap();
            let category = schema.get_entity_type("Category").unwrap();
            assert_eq!(category.properties[1].max_length.as_deref(), Some("50"));
            assert_eq!(
                category.properties[1].annotations[0].expression,
                Some(Expression::Constant {
                    constant: ConstantKind::String,
                    value: "Display name".to_string(),
                })
            );
            assert!(category.navigation_properties[0].is_collection);

            let model = resolve_metadata(metadata).unwrap();
            assert!(validate_metadata(&model).is_ok());
            assert_eq!(
                model.canonical_name("self.Product").unwrap(),
                "org.example.Product"
            );
        }
    }

    #[test]
    fn both_formats_classify_as_v4() {
        assert_eq!(is_v4_metadata(&import_metadata(XML).unwrap()), Ok(true));
        assert_eq!(is_v4_metadata(&import_metadata(JSON).unwrap()), Ok(true));
    }

    #[test]
    fn explicit_format_overrides_detection() {
        let err = import_with_format(XML, MetadataFormat::Json).unwrap_err();
        assert!(matches!(err, ImportError::ParseError(_)));
    }

    #[test]
    fn unknown_content_is_unsupported() {
        assert!(matches!(
            import_metadata("Version: 4.0"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn document_without_schema_namespaces_cannot_be_classified() {
        let xml = r#"<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
    <Schema Namespace="NS"/>
  </edmx:DataServices>
</edmx:Edmx>"#;
        let err = is_v4_metadata(&import_metadata(xml).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "No schema namespaces found in XMLMetadata");
    }
}
