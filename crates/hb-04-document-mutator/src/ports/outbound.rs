//! # Outbound Ports (Driven Ports)
//!
//! What the mutator needs from the host application.
//!
//! Production: the host's own document API.
//! Testing: `InMemoryDocument` (adapters/in_memory.rs)

use crate::domain::errors::{DocumentError, TranslationError};
use crate::domain::NativeElement;
use hb_03_access_policy::SelectionSource;
use serde_json::Value;
use shared_types::{
    NativeClass, NumericId, PartitionInfo, PartitionState, SettingsBundle, WorksetId,
};
use std::collections::BTreeSet;

/// The open host document.
///
/// Writes are only valid between `start_transaction` and
/// `commit_transaction`/`rollback_transaction`. At most one transaction is
/// active at a time.
pub trait HostDocument: Send {
    /// Document title, for diagnostics.
    fn title(&self) -> String;

    fn element(&self, id: NumericId) -> Option<NativeElement>;

    fn element_by_unique_id(&self, unique_id: &str) -> Option<NativeElement>;

    /// Elements of one native class, in host enumeration order.
    fn elements_of_class(&self, class: &NativeClass) -> Vec<NativeElement>;

    fn is_workshared(&self) -> bool;

    /// Partition state of a workset. `None` for unknown ids.
    fn workset(&self, id: WorksetId) -> Option<PartitionInfo>;

    /// Live selection, `None` when no UI context is available.
    fn current_selection(&self) -> Option<BTreeSet<NumericId>>;

    fn start_transaction(&mut self, name: &str) -> Result<(), DocumentError>;

    fn commit_transaction(&mut self) -> Result<(), DocumentError>;

    fn rollback_transaction(&mut self) -> Result<(), DocumentError>;

    /// Delete elements in one call.
    ///
    /// Returns every id the host removed, dependents included. An empty set
    /// means nothing was deleted.
    fn delete(&mut self, ids: &[NumericId]) -> Result<BTreeSet<NumericId>, DocumentError>;

    /// Add an element. Ids left unset are assigned by the host.
    fn insert(&mut self, element: NativeElement) -> Result<NumericId, DocumentError>;

    /// Overwrite the stored element with the same numeric id. Identity and
    /// class are kept by the host.
    fn update(&mut self, element: NativeElement) -> Result<(), DocumentError>;

    /// Partition the element lives in.
    fn partition_of(&self, element: &NativeElement) -> PartitionState {
        if !self.is_workshared() {
            return PartitionState::NotWorkshared;
        }
        match element.workset {
            None => PartitionState::Unassigned,
            Some(id) => self
                .workset(id)
                .map_or(PartitionState::Unknown(id), PartitionState::Known),
        }
    }
}

/// External translator between native elements and domain objects.
pub trait Translator<D: HostDocument + ?Sized>: Send + Sync {
    /// Native element to domain object.
    fn translate(
        &self,
        element: &NativeElement,
        settings: &SettingsBundle,
    ) -> Result<Value, TranslationError>;

    /// Domain object to native element, written into `document`.
    fn translate_back(
        &self,
        object: &Value,
        document: &mut D,
        settings: &SettingsBundle,
    ) -> Result<NumericId, TranslationError>;

    /// Unique id of the native element `object` was translated from, if it
    /// still carries the link.
    fn identity(&self, object: &Value) -> Option<String>;

    /// Write the parameters of `object` onto the existing `element`.
    fn update(
        &self,
        object: &Value,
        element: &NativeElement,
        document: &mut D,
        settings: &SettingsBundle,
    ) -> Result<NumericId, TranslationError>;
}

/// Reads the live selection of a document for the selection rule.
pub struct DocumentSelection<'a, D: HostDocument + ?Sized>(pub &'a D);

impl<D: HostDocument + ?Sized> SelectionSource for DocumentSelection<'_, D> {
    fn current_selection(&self) -> Option<BTreeSet<NumericId>> {
        self.0.current_selection()
    }
}
