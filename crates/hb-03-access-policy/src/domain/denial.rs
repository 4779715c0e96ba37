use shared_types::{AdapterError, ElementReference, NumericId, WorksetId};
use thiserror::Error;

/// Why the write-access policy skipped an element.
///
/// A denial is a silent skip, not a fault: callers log it at debug level and
/// move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyDenial {
    /// Unique id missing or outside the allow-list.
    #[error("unique id {unique_id:?} is not in the allow-list")]
    UniqueIdNotAllowed {
        /// The element's unique id.
        unique_id: Option<String>,
    },

    /// Numeric id outside the allow-list and live selection not consulted.
    #[error("numeric id {numeric_id:?} is not in the allow-list")]
    NumericIdNotAllowed {
        /// The element's numeric id.
        numeric_id: Option<NumericId>,
    },

    /// Live selection was needed but the host could not provide it.
    #[error("live selection is unavailable")]
    SelectionUnavailable,

    /// Element not part of the host's live selection.
    #[error("numeric id {numeric_id:?} is not selected")]
    NotSelected {
        /// The element's numeric id.
        numeric_id: Option<NumericId>,
    },

    /// Category missing or outside the allow-list.
    #[error("category {category:?} is not in the allow-list")]
    CategoryNotAllowed {
        /// The element's category.
        category: Option<String>,
    },

    /// Element sits in a closed workset and only open worksets are writable.
    #[error("workset '{name}' is closed")]
    WorksetClosed {
        /// Workset id.
        id: WorksetId,
        /// Workset name.
        name: String,
    },

    /// Workset id absent or unknown to the host while the policy restricts
    /// worksets.
    #[error("workset {id:?} cannot be resolved")]
    WorksetUnresolved {
        /// The element's workset id, if it carries one.
        id: Option<WorksetId>,
    },

    /// Workset matches neither the id nor the name allow-list.
    #[error("workset '{name}' ({id}) is not in the allow-list")]
    WorksetNotAllowed {
        /// Workset id.
        id: WorksetId,
        /// Workset name.
        name: String,
    },
}

impl PolicyDenial {
    /// Rule family that denied, used as the metric label.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::WorksetClosed { .. }
            | Self::WorksetNotAllowed { .. }
            | Self::WorksetUnresolved { .. } => "workset",
            _ => "selection",
        }
    }

    /// Boundary error for this denial.
    pub fn into_adapter_error(self, element: &ElementReference) -> AdapterError {
        AdapterError::PolicyDenied {
            element: element.to_string(),
            reason: self.to_string(),
        }
    }
}
