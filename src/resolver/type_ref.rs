//! Type reference parsing
//!
//! A type reference is the raw string found in a `Type`, `BaseType`,
//! `EntityType` or similar attribute: `Edm.String`, `NS.Customer`,
//! `Alias.Customer` or any of those wrapped in `Collection(...)`.

use super::ResolutionError;
use crate::models::FullQualifiedName;
use crate::models::qualified_name::split_collection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of the built-in primitive types
pub const EDM_NAMESPACE: &str = "Edm";

static QUALIFIED_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*(\.[\p{L}_][\p{L}\p{N}_]*)+$")
        .expect("qualified name pattern is valid")
});

macro_rules! edm_primitives {
    ($($variant:ident),+ $(,)?) => {
        /// Built-in `Edm.*` types, including the abstract ones
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum EdmPrimitiveType {
            $($variant),+
        }

        impl EdmPrimitiveType {
            /// Look up a type by its local name (without `Edm.`)
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Local name of the type
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

edm_primitives!(
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
    PrimitiveType,
    Untyped,
    EntityType,
    ComplexType,
    AnnotationPath,
    PropertyPath,
    NavigationPropertyPath,
    AnyPropertyPath,
    ModelElementPath,
);

impl fmt::Display for EdmPrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", EDM_NAMESPACE, self.name())
    }
}

/// What an unresolved reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
    Primitive(EdmPrimitiveType),
    /// Namespace part may still be an alias
    Named(FullQualifiedName),
}

/// A parsed, not yet resolved, type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Token as written in the document
    pub raw: String,
    pub is_collection: bool,
    pub target: TypeTarget,
}

impl TypeReference {
    /// Parse a raw type reference.
    ///
    /// `Edm.*` names are recognised before anything else and never need a
    /// schema lookup.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_metadata_sdk::resolver::type_ref::{TypeReference, TypeTarget, EdmPrimitiveType};
    ///
    /// let r = TypeReference::parse("Collection(Edm.String)").unwrap();
    /// assert!(r.is_collection);
    /// assert_eq!(r.target, TypeTarget::Primitive(EdmPrimitiveType::String));
    ///
    /// let r = TypeReference::parse("Namespace1_Alias.ETTwoKeyNav").unwrap();
    /// assert!(matches!(r.target, TypeTarget::Named(ref fqn) if fqn.namespace == "Namespace1_Alias"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidTypeReference`] when the token is not
    /// a qualified name, and [`ResolutionError::UnknownType`] for an unknown
    /// `Edm.*` name.
    pub fn parse(token: &str) -> Result<Self, ResolutionError> {
        let (inner, is_collection) = split_collection(token);

        if !QUALIFIED_TOKEN.is_match(inner) {
            return Err(ResolutionError::InvalidTypeReference(token.to_string()));
        }

        let (namespace, name) = FullQualifiedName::split(inner)
            .ok_or_else(|| ResolutionError::InvalidTypeReference(token.to_string()))?;

        let target = if namespace == EDM_NAMESPACE {
            let primitive = EdmPrimitiveType::from_name(name).ok_or_else(|| {
                ResolutionError::UnknownType {
                    token: token.to_string(),
                    qualified_name: inner.to_string(),
                }
            })?;
            TypeTarget::Primitive(primitive)
        } else {
            TypeTarget::Named(FullQualifiedName::new(namespace, name))
        };

        Ok(Self {
            raw: token.to_string(),
            is_collection,
            target,
        })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.target, TypeTarget::Primitive(_))
    }
}

/// True when a token names an `Edm.*` type, with or without collection
pub fn is_primitive_reference(token: &str) -> bool {
    let (inner, _) = split_collection(token);
    inner
        .strip_prefix("Edm.")
        .and_then(EdmPrimitiveType::from_name)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_primitive_name() {
        for name in ["Int16", "String", "GeographyPoint", "Untyped", "TimeOfDay"] {
            let r = TypeReference::parse(&format!("Edm.{}", name)).unwrap();
            assert!(r.is_primitive(), "{} should be primitive", name);
        }
    }

    #[test]
    fn unknown_edm_name_is_an_unknown_type() {
        let err = TypeReference::parse("Edm.DateTime").unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownType { .. }));
    }

    #[test]
    fn unqualified_token_is_invalid() {
        assert!(matches!(
            TypeReference::parse("Customer"),
            Err(ResolutionError::InvalidTypeReference(_))
        ));
        assert!(matches!(
            TypeReference::parse("Collection()"),
            Err(ResolutionError::InvalidTypeReference(_))
        ));
        assert!(matches!(
            TypeReference::parse("NS.Bad Name"),
            Err(ResolutionError::InvalidTypeReference(_))
        ));
    }

    #[test]
    fn primitive_display_is_qualified() {
        assert_eq!(EdmPrimitiveType::Int32.to_string(), "Edm.Int32");
        assert!(is_primitive_reference("Collection(Edm.Guid)"));
        assert!(!is_primitive_reference("NS.Guid"));
    }
}
