use super::denial::PolicyDenial;
use shared_types::{PartitionInfo, PartitionState, WorksetId, WorksetPolicy};

/// Workset (collaborative partition) criterion of the write-access policy.
pub struct WorksetRules;

impl WorksetRules {
    /// Evaluate the workset criterion.
    ///
    /// Documents that are not workshared are always allowed. The
    /// open-workset requirement is checked before the allow-lists and cannot
    /// be overridden by them. A partition the host cannot resolve passes only
    /// an unrestricted policy, or an id list naming its workset id when open
    /// worksets are not required.
    pub fn evaluate(policy: &WorksetPolicy, partition: &PartitionState) -> Result<(), PolicyDenial> {
        match partition {
            PartitionState::NotWorkshared => Ok(()),
            PartitionState::Known(partition) => {
                Self::validate_open(policy, partition)?;
                Self::validate_listed(policy, partition)
            }
            PartitionState::Unassigned => Self::validate_unresolved(policy, None),
            PartitionState::Unknown(id) => Self::validate_unresolved(policy, Some(*id)),
        }
    }

    pub fn validate_unresolved(
        policy: &WorksetPolicy,
        id: Option<WorksetId>,
    ) -> Result<(), PolicyDenial> {
        if policy.is_open() {
            return Ok(());
        }

        let listed = !policy.open_worksets_only
            && id.is_some_and(|id| policy.workset_ids.contains(&id));
        if listed {
            Ok(())
        } else {
            Err(PolicyDenial::WorksetUnresolved { id })
        }
    }

    pub fn validate_open(
        policy: &WorksetPolicy,
        partition: &PartitionInfo,
    ) -> Result<(), PolicyDenial> {
        if policy.open_worksets_only && !partition.is_open {
            return Err(PolicyDenial::WorksetClosed {
                id: partition.id,
                name: partition.name.clone(),
            });
        }
        Ok(())
    }

    pub fn validate_listed(
        policy: &WorksetPolicy,
        partition: &PartitionInfo,
    ) -> Result<(), PolicyDenial> {
        if Self::is_listed(policy, partition) {
            Ok(())
        } else {
            Err(PolicyDenial::WorksetNotAllowed {
                id: partition.id,
                name: partition.name.clone(),
            })
        }
    }

    /// True when both lists are empty or either one names the partition.
    #[must_use]
    pub fn is_listed(policy: &WorksetPolicy, partition: &PartitionInfo) -> bool {
        (policy.workset_ids.is_empty() && policy.workset_names.is_empty())
            || policy.workset_ids.contains(&partition.id)
            || policy.workset_names.contains(&partition.name)
    }
}
