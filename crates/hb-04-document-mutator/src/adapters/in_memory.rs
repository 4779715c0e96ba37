//! # In-Memory Host Document
//!
//! Document kept in process memory. Used by the reference dispatcher and by
//! tests. Transactions snapshot the element list on start and restore it on
//! rollback.

use crate::domain::errors::DocumentError;
use crate::domain::NativeElement;
use crate::ports::HostDocument;
use shared_types::{NativeClass, NumericId, PartitionInfo, WorksetId};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Transaction counters, for assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentCounters {
    pub transactions_started: u64,
    pub commits: u64,
    pub rollbacks: u64,
}

#[derive(Debug, Clone)]
struct Snapshot {
    elements: Vec<NativeElement>,
    next_id: i64,
}

#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    title: String,
    elements: Vec<NativeElement>,
    /// `None` when the document is not workshared.
    worksets: Option<BTreeMap<WorksetId, PartitionInfo>>,
    selection: Option<BTreeSet<NumericId>>,
    active: Option<(String, Snapshot)>,
    next_id: i64,
    fail_commits: bool,
    report_nothing_deleted: bool,
    counters: DocumentCounters,
}

impl InMemoryDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
            worksets: None,
            selection: None,
            active: None,
            next_id: 1,
            fail_commits: false,
            report_nothing_deleted: false,
            counters: DocumentCounters::default(),
        }
    }

    /// Make the document workshared with the given partitions.
    #[must_use]
    pub fn workshared(mut self, partitions: impl IntoIterator<Item = PartitionInfo>) -> Self {
        self.worksets = Some(
            partitions
                .into_iter()
                .map(|partition| (partition.id, partition))
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: NativeElement) -> Self {
        self.add(element);
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: impl IntoIterator<Item = NumericId>) -> Self {
        self.selection = Some(selection.into_iter().collect());
        self
    }

    /// Every commit fails with a host error.
    #[must_use]
    pub fn failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    /// Deletes succeed but report no affected element.
    #[must_use]
    pub fn reporting_nothing_deleted(mut self) -> Self {
        self.report_nothing_deleted = true;
        self
    }

    /// Seed an element outside any transaction and return its numeric id.
    pub fn add(&mut self, element: NativeElement) -> NumericId {
        let element = self.assign_ids(element);
        let id = element.numeric_id;
        self.elements.push(element);
        id
    }

    pub fn set_selection(&mut self, selection: Option<BTreeSet<NumericId>>) {
        self.selection = selection;
    }

    pub fn elements(&self) -> &[NativeElement] {
        &self.elements
    }

    pub fn contains(&self, id: NumericId) -> bool {
        self.elements.iter().any(|element| element.numeric_id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn in_transaction(&self) -> bool {
        self.active.is_some()
    }

    pub fn counters(&self) -> DocumentCounters {
        self.counters
    }

    fn assign_ids(&mut self, mut element: NativeElement) -> NativeElement {
        if element.numeric_id.is_valid() {
            self.next_id = self.next_id.max(element.numeric_id.0 + 1);
        } else {
            element.numeric_id = NumericId(self.next_id);
            self.next_id += 1;
        }
        if element.unique_id.is_empty() {
            element.unique_id = Uuid::new_v4().to_string();
        }
        element
    }

    fn require_transaction(&self) -> Result<(), DocumentError> {
        if self.active.is_some() {
            Ok(())
        } else {
            Err(DocumentError::NoTransaction)
        }
    }

    /// The given ids plus everything hosted by them, transitively.
    fn with_dependents(&self, ids: &[NumericId]) -> BTreeSet<NumericId> {
        let mut doomed: BTreeSet<NumericId> = ids
            .iter()
            .copied()
            .filter(|id| self.contains(*id))
            .collect();
        loop {
            let before = doomed.len();
            for element in &self.elements {
                if element.host.is_some_and(|host| doomed.contains(&host)) {
                    doomed.insert(element.numeric_id);
                }
            }
            if doomed.len() == before {
                return doomed;
            }
        }
    }
}

impl HostDocument for InMemoryDocument {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn element(&self, id: NumericId) -> Option<NativeElement> {
        self.elements.iter().find(|e| e.numeric_id == id).cloned()
    }

    fn element_by_unique_id(&self, unique_id: &str) -> Option<NativeElement> {
        self.elements
            .iter()
            .find(|e| e.unique_id == unique_id)
            .cloned()
    }

    fn elements_of_class(&self, class: &NativeClass) -> Vec<NativeElement> {
        self.elements
            .iter()
            .filter(|e| &e.class == class)
            .cloned()
            .collect()
    }

    fn is_workshared(&self) -> bool {
        self.worksets.is_some()
    }

    fn workset(&self, id: WorksetId) -> Option<PartitionInfo> {
        self.worksets.as_ref()?.get(&id).cloned()
    }

    fn current_selection(&self) -> Option<BTreeSet<NumericId>> {
        self.selection.clone()
    }

    fn start_transaction(&mut self, name: &str) -> Result<(), DocumentError> {
        if self.active.is_some() {
            return Err(DocumentError::TransactionActive);
        }
        let snapshot = Snapshot {
            elements: self.elements.clone(),
            next_id: self.next_id,
        };
        self.active = Some((name.to_string(), snapshot));
        self.counters.transactions_started += 1;
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), DocumentError> {
        self.require_transaction()?;
        if self.fail_commits {
            return Err(DocumentError::Host("commit rejected".into()));
        }
        self.active = None;
        self.counters.commits += 1;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), DocumentError> {
        let (_, snapshot) = self.active.take().ok_or(DocumentError::NoTransaction)?;
        self.elements = snapshot.elements;
        self.next_id = snapshot.next_id;
        self.counters.rollbacks += 1;
        Ok(())
    }

    fn delete(&mut self, ids: &[NumericId]) -> Result<BTreeSet<NumericId>, DocumentError> {
        self.require_transaction()?;
        if self.report_nothing_deleted {
            return Ok(BTreeSet::new());
        }
        let doomed = self.with_dependents(ids);
        self.elements.retain(|e| !doomed.contains(&e.numeric_id));
        Ok(doomed)
    }

    fn insert(&mut self, element: NativeElement) -> Result<NumericId, DocumentError> {
        self.require_transaction()?;
        if element.numeric_id.is_valid() && self.contains(element.numeric_id) {
            return Err(DocumentError::Host(format!(
                "element {} already exists",
                element.numeric_id
            )));
        }
        if let Some(host) = element.host {
            if !self.contains(host) {
                return Err(DocumentError::ElementNotFound(host));
            }
        }
        Ok(self.add(element))
    }

    fn update(&mut self, element: NativeElement) -> Result<(), DocumentError> {
        self.require_transaction()?;
        let stored = self
            .elements
            .iter_mut()
            .find(|e| e.numeric_id == element.numeric_id)
            .ok_or(DocumentError::ElementNotFound(element.numeric_id))?;
        stored.name = element.name;
        stored.category = element.category;
        stored.workset = element.workset;
        stored.host = element.host;
        Ok(())
    }
}
