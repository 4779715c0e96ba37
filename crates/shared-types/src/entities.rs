//! # Element Identity
//!
//! How native elements of the host document are identified from outside the
//! host process.
//!
//! | Identity | Lifetime | Used for |
//! |----------|----------|----------|
//! | `unique_id` | persists across document reopenings | resolution (preferred) |
//! | `NumericId` | valid while the document stays open | policy lists, selection, batch delete |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Session-transient element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericId(pub i64);

impl NumericId {
    /// Marker used by the host for "no element".
    pub const INVALID: NumericId = NumericId(-1);

    /// Returns true unless this is the invalid marker.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of a workset, the collaborative partition an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorksetId(pub i64);

impl fmt::Display for WorksetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native class used to scope element queries (e.g. `Level`, `FloorType`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeClass(String);

impl NativeClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NativeClass {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for NativeClass {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Identity of a native element as seen by the write-access policy.
///
/// Never cached across document reloads: build a fresh reference for every
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementReference {
    /// Session-stable id.
    pub unique_id: Option<String>,
    /// Session-transient id.
    pub numeric_id: Option<NumericId>,
    /// Category name of the element, if it has one.
    pub category: Option<String>,
}

impl ElementReference {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn with_numeric_id(mut self, id: NumericId) -> Self {
        self.numeric_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when a persisted identity link exists.
    #[must_use]
    pub fn has_identity_link(&self) -> bool {
        self.unique_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

impl fmt::Display for ElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.unique_id, self.numeric_id) {
            (Some(uid), Some(id)) => write!(f, "{} ({})", uid, id),
            (Some(uid), None) => f.write_str(uid),
            (None, Some(id)) => write!(f, "#{}", id),
            (None, None) => f.write_str("<anonymous>"),
        }
    }
}

/// State of the partition an element lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub id: WorksetId,
    pub name: String,
    pub is_open: bool,
}

/// Where an element sits with respect to the document's partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionState {
    /// The document is not workshared.
    NotWorkshared,
    /// Workshared document, but the element carries no workset id.
    Unassigned,
    /// Workset id missing from the host's workset table.
    Unknown(WorksetId),
    Known(PartitionInfo),
}

impl PartitionState {
    /// Partition details, when the host could resolve them.
    #[must_use]
    pub fn info(&self) -> Option<&PartitionInfo> {
        match self {
            Self::Known(info) => Some(info),
            _ => None,
        }
    }
}

impl From<PartitionInfo> for PartitionState {
    fn from(info: PartitionInfo) -> Self {
        Self::Known(info)
    }
}

/// Identifier fragment a domain object carries to link back to the native
/// element it was translated from.
///
/// Empty strings and `-1` mean "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIdentifiers {
    pub unique_id: String,
    pub element_id: i64,
    pub category_name: String,
    pub family_name: String,
    pub family_type_name: String,
    pub family_type_id: i64,
    /// Owning view, `-1` when the element is not view-dependent.
    pub owner_view_id: i64,
    /// Parent element, `-1` when the element is not nested.
    pub parent_element_id: i64,
}

impl Default for ElementIdentifiers {
    fn default() -> Self {
        Self {
            unique_id: String::new(),
            element_id: -1,
            category_name: String::new(),
            family_name: String::new(),
            family_type_name: String::new(),
            family_type_id: -1,
            owner_view_id: -1,
            parent_element_id: -1,
        }
    }
}

impl ElementIdentifiers {
    /// Identifiers holding only a unique id.
    pub fn from_unique_id(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..Self::default()
        }
    }

    /// Convert to the reference shape the policy evaluates.
    pub fn to_reference(&self) -> ElementReference {
        ElementReference {
            unique_id: non_empty(&self.unique_id),
            numeric_id: (self.element_id >= 0).then_some(NumericId(self.element_id)),
            category: non_empty(&self.category_name),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Result of one mutating batch.
///
/// `affected` is what the host reported, which can be larger than the
/// requested set when dependents are removed with their hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub success: bool,
    pub affected: BTreeSet<NumericId>,
}

impl TransactionOutcome {
    /// Failed batch: nothing affected.
    pub fn failure() -> Self {
        Self::default()
    }

    pub fn committed(affected: impl IntoIterator<Item = NumericId>) -> Self {
        Self {
            success: true,
            affected: affected.into_iter().collect(),
        }
    }
}
