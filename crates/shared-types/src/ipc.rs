//! # Package Payloads
//!
//! Package types and the typed bodies carried in `MessagePackage::data`.
//!
//! ## Payload Layout
//!
//! | Type | Request data | Reply data |
//! |------|--------------|------------|
//! | `ConnectionCheck` | empty | `[true]` |
//! | `Pull` | `[PullRequest]` | translated objects |
//! | `Push` | domain objects | `[TransactionOutcome]` |
//! | `Delete` | `ElementLocator`s | `[TransactionOutcome]` |

use crate::entities::{ElementIdentifiers, NativeClass};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of exchange a package belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    ConnectionCheck,
    Pull,
    Push,
    Delete,
}

impl PackageType {
    /// True for exchanges that change the host document.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Push | Self::Delete)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionCheck => "connection_check",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// How a domain object points at the native element it stands for.
///
/// `identifiers` is the persisted identity link. When it is missing (or has
/// no unique id) the element is looked up by `name` among elements of the
/// native class registered for `domain_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementLocator {
    #[serde(default)]
    pub identifiers: Option<ElementIdentifiers>,
    #[serde(default)]
    pub name: Option<String>,
    pub domain_type: String,
}

impl ElementLocator {
    pub fn by_unique_id(unique_id: impl Into<String>, domain_type: impl Into<String>) -> Self {
        Self {
            identifiers: Some(ElementIdentifiers::from_unique_id(unique_id)),
            name: None,
            domain_type: domain_type.into(),
        }
    }

    pub fn by_name(name: impl Into<String>, domain_type: impl Into<String>) -> Self {
        Self {
            identifiers: None,
            name: Some(name.into()),
            domain_type: domain_type.into(),
        }
    }

    /// The persisted unique id, if the locator has a usable one.
    pub fn unique_id(&self) -> Option<&str> {
        self.identifiers
            .as_ref()
            .map(|ids| ids.unique_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

impl fmt::Display for ElementLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.unique_id(), &self.name) {
            (Some(uid), _) => write!(f, "{} '{}'", self.domain_type, uid),
            (None, Some(name)) => write!(f, "{} named '{}'", self.domain_type, name),
            (None, None) => write!(f, "{} without identity", self.domain_type),
        }
    }
}

/// Body of a `Pull` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub native_class: NativeClass,
}

/// Serialize typed items into package data.
pub fn to_data<T: Serialize>(items: &[T]) -> Result<Vec<Value>, serde_json::Error> {
    items.iter().map(serde_json::to_value).collect()
}

/// Deserialize package data into typed items. Fails on the first bad item.
pub fn from_data<T: DeserializeOwned>(data: &[Value]) -> Result<Vec<T>, serde_json::Error> {
    data.iter()
        .map(|value| serde_json::from_value(value.clone()))
        .collect()
}
