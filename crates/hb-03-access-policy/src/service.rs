//! # Write-Access Policy
//!
//! Conjunction of the selection and workset criteria, evaluated before any
//! element is written (and before any element is read back on pull).

use crate::domain::{PolicyDenial, SelectionRules, WorksetRules};
use crate::ports::SelectionSource;
use hb_telemetry::{metric_inc, POLICY_DENIALS};
use shared_types::{
    ElementReference, PartitionState, SelectionPolicy, SettingsBundle, WorksetPolicy,
};
use tracing::debug;

/// Decides whether an element may be touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteAccessPolicy {
    selection: SelectionPolicy,
    workset: WorksetPolicy,
}

impl WriteAccessPolicy {
    pub fn new(selection: SelectionPolicy, workset: WorksetPolicy) -> Self {
        Self { selection, workset }
    }

    pub fn from_settings(settings: &SettingsBundle) -> Self {
        Self::new(settings.selection.clone(), settings.workset.clone())
    }

    /// Policy that allows every element.
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.selection.is_open() && self.workset.is_open()
    }

    pub fn selection(&self) -> &SelectionPolicy {
        &self.selection
    }

    pub fn workset(&self) -> &WorksetPolicy {
        &self.workset
    }

    /// Evaluate both criteria, selection first.
    pub fn check_element<S: SelectionSource + ?Sized>(
        &self,
        reference: &ElementReference,
        partition: &PartitionState,
        selection: &S,
    ) -> Result<(), PolicyDenial> {
        self.check_selection(reference, selection)?;
        self.check_workset(partition)
    }

    pub fn check_selection<S: SelectionSource + ?Sized>(
        &self,
        reference: &ElementReference,
        selection: &S,
    ) -> Result<(), PolicyDenial> {
        SelectionRules::evaluate(&self.selection, reference, selection)
    }

    pub fn check_workset(&self, partition: &PartitionState) -> Result<(), PolicyDenial> {
        WorksetRules::evaluate(&self.workset, partition)
    }

    /// Boolean form of [`check_element`](Self::check_element). Denials are
    /// logged at debug level and counted.
    pub fn allow_element<S: SelectionSource + ?Sized>(
        &self,
        reference: &ElementReference,
        partition: &PartitionState,
        selection: &S,
    ) -> bool {
        match self.check_element(reference, partition, selection) {
            Ok(()) => true,
            Err(denial) => {
                metric_inc!(POLICY_DENIALS, &[denial.rule()]);
                debug!(element = %reference, reason = %denial, "Element skipped by write-access policy");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoSelection;
    use shared_types::{NumericId, PartitionInfo, WorksetId};

    fn reference(uid: &str, id: i64) -> ElementReference {
        ElementReference::new()
            .with_unique_id(uid)
            .with_numeric_id(NumericId(id))
    }

    #[test]
    fn test_open_policy_allows() {
        let policy = WriteAccessPolicy::open();
        assert!(policy.is_open());
        assert!(policy.allow_element(
            &reference("a", 1),
            &PartitionState::NotWorkshared,
            &NoSelection
        ));
    }

    #[test]
    fn test_both_criteria_required() {
        let policy = WriteAccessPolicy::new(
            SelectionPolicy::open().allow_unique_ids(["a"]),
            WorksetPolicy::open().allow_names(["Levels"]),
        );
        let levels = PartitionState::from(PartitionInfo {
            id: WorksetId(1),
            name: "Levels".into(),
            is_open: true,
        });
        let walls = PartitionState::from(PartitionInfo {
            id: WorksetId(2),
            name: "Walls".into(),
            is_open: true,
        });

        assert!(policy.allow_element(&reference("a", 1), &levels, &NoSelection));
        assert!(!policy.allow_element(&reference("a", 1), &walls, &NoSelection));
        assert!(!policy.allow_element(&reference("b", 2), &levels, &NoSelection));
        assert!(!policy.allow_element(
            &reference("a", 1),
            &PartitionState::Unknown(WorksetId(99)),
            &NoSelection
        ));
    }

    #[test]
    fn test_selection_checked_first() {
        let policy = WriteAccessPolicy::new(
            SelectionPolicy::open().allow_unique_ids(["a"]),
            WorksetPolicy::open().open_worksets_only(true),
        );
        let closed = PartitionState::from(PartitionInfo {
            id: WorksetId(1),
            name: "Closed".into(),
            is_open: false,
        });

        let denial = policy
            .check_element(&reference("b", 2), &closed, &NoSelection)
            .unwrap_err();
        assert_eq!(denial.rule(), "selection");
    }

    #[test]
    fn test_from_settings() {
        let settings = SettingsBundle::default()
            .with_selection(SelectionPolicy::open().include_selected(true));
        let policy = WriteAccessPolicy::from_settings(&settings);
        assert!(policy.selection().include_selected);
        assert!(!policy.is_open());
    }
}
