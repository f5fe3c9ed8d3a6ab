//! Models module for the SDK
//!
//! Defines the CSDL item tree: schemas, structural types, enums, operations,
//! containers and annotations. The tree is permissive by construction;
//! readers may populate it in any order, and all checks happen in the
//! resolver and validator.

pub mod annotation;
pub mod container;
pub mod enum_type;
pub mod metadata;
pub mod operation;
pub mod qualified_name;
pub mod schema;
pub mod structural;

pub use annotation::{
    Annotation, Annotations, BinaryOperator, ConstantKind, Expression, PathKind, PropertyValue,
};
pub use container::{
    ActionImport, BindingTarget, EntityContainer, EntitySet, FunctionImport,
    NavigationPropertyBinding, Singleton,
};
pub use enum_type::{EnumMember, EnumType, Term, TypeDefinition};
pub use metadata::{CsdlMetadata, Include, IncludeAnnotations, Reference};
pub use operation::{Action, Function, Operation, Parameter, ReturnType};
pub use qualified_name::FullQualifiedName;
pub use schema::CsdlSchema;
pub use structural::{
    ComplexType, EntityType, NavigationProperty, OnDeleteAction, Property, PropertyRef,
    ReferentialConstraint, StructuralType,
};
