//! End-to-end metadata validation over EDMX documents

use odata_metadata_sdk::import::XmlMetadataImporter;
use odata_metadata_sdk::resolver::{ResolvedModel, resolve_metadata};
use odata_metadata_sdk::validation::{
    MetadataValidator, ValidationOptions, is_v4_metadata, validate_metadata,
};

const V4_EDM: &str = "http://docs.oasis-open.org/odata/ns/edm";

fn edmx(schemas: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx" Version="4.0">
  <edmx:DataServices>
{}
  </edmx:DataServices>
</edmx:Edmx>"#,
        schemas
    )
}

fn resolve(schemas: &str) -> ResolvedModel {
    let metadata = XmlMetadataImporter::new().import(&edmx(schemas)).unwrap();
    resolve_metadata(metadata).unwrap()
}

fn first_error(schemas: &str) -> Option<String> {
    validate_metadata(&resolve(schemas)).err().map(|e| e.to_string())
}

mod scenario_tests {
    use super::*;

    #[test]
    fn cast_to_unknown_type_in_binding_path() {
        let schema = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="OData.Model">
      <EntityType Name="Person">
        <Key><PropertyRef Name="ID"/></Key>
        <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
        <NavigationProperty Name="Friends" Type="Collection(OData.Model.Person)"/>
      </EntityType>
      <EntityContainer Name="Container">
        <EntitySet Name="People" EntityType="OData.Model.Person">
          <NavigationPropertyBinding Path="OData.Model.Human/Friends" Target="People"/>
        </EntitySet>
      </EntityContainer>
    </Schema>"#;
        assert_eq!(
            first_error(schema).as_deref(),
            Some("The fully Qualified type OData.Model.Human mentioned in navigation binding path not found ")
        );
    }

    #[test]
    fn binding_target_of_unrelated_type() {
        let schema = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="Microsoft.Exchange.Services.OData.Model">
      <EntityType Name="User">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
        <NavigationProperty Name="Folders" Type="Collection(Microsoft.Exchange.Services.OData.Model.Folder)"/>
      </EntityType>
      <EntityType Name="Folder">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
      </EntityType>
      <EntityType Name="EmailMessage">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.String" Nullable="false"/>
      </EntityType>
      <EntityContainer Name="EntityContainer">
        <EntitySet Name="Users" EntityType="Microsoft.Exchange.Services.OData.Model.User">
          <NavigationPropertyBinding Path="Folders" Target="Messages"/>
        </EntitySet>
        <EntitySet Name="Messages" EntityType="Microsoft.Exchange.Services.OData.Model.EmailMessage"/>
      </EntityContainer>
    </Schema>"#;
        assert_eq!(
            first_error(schema).as_deref(),
            Some(
                "Navigation Property Type Microsoft.Exchange.Services.OData.Model.EmailMessage does not match the binding target type Microsoft.Exchange.Services.OData.Model.Folder"
            )
        );
    }

    #[test]
    fn compound_key_with_binding_through_complex_collection() {
        let schema = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="olingo.odata.test1" Alias="Namespace1_Alias">
      <EntityType Name="ETTwoKeyNav">
        <Key>
          <PropertyRef Name="PropertyInt16"/>
          <PropertyRef Name="PropertyString"/>
        </Key>
        <Property Name="PropertyInt16" Type="Edm.Int16" Nullable="false"/>
        <Property Name="PropertyString" Type="Edm.String" Nullable="false"/>
        <Property Name="CollPropertyCompNav" Type="Collection(Namespace1_Alias.CTNavFiveProp)"/>
        <NavigationProperty Name="NavPropertyETTwoKeyNavOne" Type="Namespace1_Alias.ETTwoKeyNav"/>
      </EntityType>
      <ComplexType Name="CTNavFiveProp">
        <Property Name="PropertyInt16" Type="Edm.Int16"/>
        <NavigationProperty Name="NavPropertyETTwoKeyNavOne" Type="Namespace1_Alias.ETTwoKeyNav"/>
      </ComplexType>
      <EntityContainer Name="Container">
        <EntitySet Name="ESTwoKeyNav" EntityType="Namespace1_Alias.ETTwoKeyNav">
          <NavigationPropertyBinding Path="CollPropertyCompNav/NavPropertyETTwoKeyNavOne" Target="ESTwoKeyNav"/>
        </EntitySet>
      </EntityContainer>
    </Schema>"#;
        assert_eq!(first_error(schema), None);
    }

    #[test]
    fn singleton_is_rejected_before_anything_else() {
        let schema = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS">
      <EntityType Name="NoKey">
        <Property Name="Name" Type="Edm.String"/>
      </EntityType>
      <EntityContainer Name="Container">
        <Singleton Name="Me" Type="NS.NoKey"/>
      </EntityContainer>
    </Schema>"#;
        assert_eq!(
            first_error(schema).as_deref(),
            Some("Validations of Singletons are not supported: Me")
        );
    }

    #[test]
    fn constraint_on_missing_source_property() {
        let schema = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="olingo.odata.test1">
      <EntityType Name="ETTwoKeyNav">
        <Key>
          <PropertyRef Name="PropertyInt16"/>
          <PropertyRef Name="PropertyString"/>
        </Key>
        <Property Name="PropertyInt16" Type="Edm.Int16" Nullable="false"/>
        <Property Name="PropertyString" Type="Edm.String" Nullable="false"/>
        <NavigationProperty Name="NavPropertyETTwoKeyNavOne" Type="olingo.odata.test1.ETTwoKeyNav">
          <ReferentialConstraint Property="PropertyInt1" ReferencedProperty="PropertyInt16"/>
        </NavigationProperty>
      </EntityType>
    </Schema>"#;
        assert_eq!(
            first_error(schema).as_deref(),
            Some("Property name PropertyInt1 not part of the source entity.")
        );
    }

    #[test]
    fn version_classification_by_schema_namespace() {
        let v4 = edmx(&format!(
            r#"<Schema xmlns="{0}" Namespace="A"/><Schema xmlns="{0}" Namespace="B"/>"#,
            V4_EDM
        ));
        let metadata = XmlMetadataImporter::new().import(&v4).unwrap();
        assert_eq!(is_v4_metadata(&metadata), Ok(true));

        let mixed = edmx(&format!(
            r#"<Schema xmlns="{}" Namespace="A"/><Schema xmlns="http://schemas.microsoft.com/ado/2009/11/edm" Namespace="B"/>"#,
            V4_EDM
        ));
        let metadata = XmlMetadataImporter::new().import(&mixed).unwrap();
        assert_eq!(is_v4_metadata(&metadata), Ok(false));
    }
}

mod multi_error_tests {
    use super::*;

    const BROKEN: &str = r#"
    <Schema xmlns="http://docs.oasis-open.org/odata/ns/edm" Namespace="NS" Alias="self">
      <EntityType Name="NoKey">
        <Property Name="Name" Type="Edm.String"/>
      </EntityType>
      <EntityType Name="Orphan" BaseType="self.Missing"/>
      <EntityType Name="Order">
        <Key><PropertyRef Name="Id"/></Key>
        <Property Name="Id" Type="Edm.Int32"/>
      </EntityType>
      <EntityContainer Name="Container">
        <Singleton Name="Me" Type="self.Order"/>
        <EntitySet Name="Orders" EntityType="self.Order"/>
        <ActionImport Name="Approve" Action="self.Approve"/>
      </EntityContainer>
    </Schema>"#;

    #[test]
    fn all_violations_in_check_order() {
        let model = resolve(BROKEN);
        let result = MetadataValidator::new().validate_all(&model);
        assert_eq!(
            result.messages(),
            vec![
                "Validations of Singletons are not supported: Me",
                "Missing key for EntityType NoKey",
                "Can't find base type with name: NS.Missing for entity type: Orphan",
                "Invalid Action self.Approve",
            ]
        );
    }

    #[test]
    fn fail_fast_returns_first_of_the_same_list() {
        let model = resolve(BROKEN);
        let all = MetadataValidator::new().validate_all(&model);
        let first = MetadataValidator::new().validate(&model).unwrap_err();
        assert_eq!(Some(&first), all.first());
    }

    #[test]
    fn singletons_can_be_validated_like_entity_sets() {
        let options = ValidationOptions {
            reject_singletons: false,
            ..ValidationOptions::default()
        };
        let model = resolve(BROKEN);
        let result = MetadataValidator::with_options(options).validate_all(&model);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.messages()[0], "Missing key for EntityType NoKey");
    }
}
