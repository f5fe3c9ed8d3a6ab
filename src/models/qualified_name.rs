//! Fully qualified names for CSDL schema items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::input::{InputValidationError, validate_namespace, validate_simple_identifier};

/// Prefix of the `Collection(...)` wrapper used in CSDL type references
const COLLECTION_PREFIX: &str = "Collection(";

/// A (namespace, name) pair identifying a schema item.
///
/// Equality is structural: two names are equal when both parts are equal.
/// Aliases are never stored here; the resolver substitutes them first.
///
/// # Example
///
/// ```rust
/// use odata_metadata_sdk::models::FullQualifiedName;
///
/// let fqn: FullQualifiedName = "Microsoft.OData.Service.Sample.Customer".parse().unwrap();
/// assert_eq!(fqn.namespace, "Microsoft.OData.Service.Sample");
/// assert_eq!(fqn.name, "Customer");
/// assert_eq!(fqn.to_string(), "Microsoft.OData.Service.Sample.Customer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FullQualifiedName {
    /// Namespace (or, before resolution, an alias)
    pub namespace: String,
    /// Local name inside the namespace
    pub name: String,
}

impl FullQualifiedName {
    /// Create a name from its two parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split a dotted token on its last `.`.
    ///
    /// Returns `None` when the token has no namespace part.
    pub fn split(token: &str) -> Option<(&str, &str)> {
        let (namespace, name) = token.rsplit_once('.')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some((namespace, name))
    }

    /// Render as `namespace.name`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for FullQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for FullQualifiedName {
    type Err = InputValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = Self::split(s.trim()).ok_or_else(|| {
            InputValidationError::InvalidFormat(
                "qualified name",
                format!("'{}' has no namespace part", s),
            )
        })?;
        validate_namespace(namespace)?;
        validate_simple_identifier(name)?;
        Ok(Self::new(namespace, name))
    }
}

/// Strip an optional `Collection(...)` wrapper from a type reference.
///
/// Returns the inner token and whether the wrapper was present.
///
/// ```rust
/// use odata_metadata_sdk::models::qualified_name::split_collection;
///
/// assert_eq!(split_collection("Collection(Edm.String)"), ("Edm.String", true));
/// assert_eq!(split_collection("NS.Customer"), ("NS.Customer", false));
/// ```
pub fn split_collection(type_ref: &str) -> (&str, bool) {
    let trimmed = type_ref.trim();
    match trimmed
        .strip_prefix(COLLECTION_PREFIX)
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    }
}

/// Re-apply the `Collection(...)` wrapper when `is_collection` is set
pub fn join_collection(type_name: &str, is_collection: bool) -> String {
    if is_collection {
        format!("{}{})", COLLECTION_PREFIX, type_name)
    } else {
        type_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_dot() {
        assert_eq!(
            FullQualifiedName::split("Namespace1_Alias.ETTwoKeyNav"),
            Some(("Namespace1_Alias", "ETTwoKeyNav"))
        );
        assert_eq!(FullQualifiedName::split("NoNamespace"), None);
        assert_eq!(FullQualifiedName::split(".Name"), None);
    }

    #[test]
    fn parse_rejects_unqualified_names() {
        assert!("Customer".parse::<FullQualifiedName>().is_err());
        assert!("OData.Model.9Customer".parse::<FullQualifiedName>().is_err());
    }

    #[test]
    fn collection_wrapper_round_trips() {
        let (inner, collection) = split_collection("Collection(NS.ETKey)");
        assert_eq!(inner, "NS.ETKey");
        assert!(collection);
        assert_eq!(join_collection(inner, collection), "Collection(NS.ETKey)");
        assert_eq!(join_collection("NS.ETKey", false), "NS.ETKey");
    }
}
