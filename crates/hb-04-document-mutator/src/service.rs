//! # Transactional Mutator
//!
//! Resolves targets, filters them through the write-access policy and
//! applies the batch inside exactly one host transaction.
//!
//! | Outcome | Transaction |
//! |---------|-------------|
//! | missing document or input | none |
//! | empty input | none |
//! | nothing left after resolution and policy | none |
//! | host reports nothing affected | rolled back |
//! | document fault mid-batch | rolled back |
//! | otherwise | committed |
//!
//! Push writes each domain object back: unlinked objects are created, linked
//! ones are resolved, gated by the write-access policy and then updated in
//! place or replaced according to the session's `AdapterMode`.
//!
//! Every failure is recorded on the event recorder and turned into a failed
//! outcome by the non-`try_` operations.

use crate::domain::{
    DocumentError, MutationError, NativeElement, ResolutionTable, TieBreak, TransactionScope,
    TranslationError,
};
use crate::ports::{DocumentSelection, HostDocument, Translator};
use hb_03_access_policy::WriteAccessPolicy;
use hb_telemetry::{metric_add, ELEMENTS_DELETED};
use serde_json::Value;
use shared_types::{
    AdapterMode, ElementLocator, EventRecord, EventRecorder, NativeClass, NumericId,
    SettingsBundle, TransactionOutcome,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DELETE_TRANSACTION: &str = "Delete elements";
const CREATE_TRANSACTION: &str = "Create elements";
const PUSH_TRANSACTION: &str = "Push elements";

pub struct TransactionalMutator {
    policy: WriteAccessPolicy,
    table: ResolutionTable,
    tie_break: TieBreak,
    settings: Arc<SettingsBundle>,
    recorder: Arc<dyn EventRecorder>,
}

impl TransactionalMutator {
    /// Mutator gated by the policies of `settings`, resolving names through
    /// the standard table.
    pub fn new(settings: Arc<SettingsBundle>, recorder: Arc<dyn EventRecorder>) -> Self {
        Self {
            policy: WriteAccessPolicy::from_settings(&settings),
            table: ResolutionTable::standard(),
            tie_break: TieBreak::default(),
            settings,
            recorder,
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: ResolutionTable) -> Self {
        self.table = table;
        self
    }

    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn policy(&self) -> &WriteAccessPolicy {
        &self.policy
    }

    pub fn table(&self) -> &ResolutionTable {
        &self.table
    }

    pub fn settings(&self) -> &SettingsBundle {
        &self.settings
    }

    /// Delete the elements `targets` resolve to, all or nothing.
    pub fn delete<D: HostDocument + ?Sized>(
        &self,
        document: Option<&mut D>,
        targets: Option<&[ElementLocator]>,
    ) -> TransactionOutcome {
        self.try_delete(document, targets)
            .unwrap_or_else(|e| self.fail(e))
    }

    pub fn try_delete<D: HostDocument + ?Sized>(
        &self,
        document: Option<&mut D>,
        targets: Option<&[ElementLocator]>,
    ) -> Result<TransactionOutcome, MutationError> {
        let document = document.ok_or(MutationError::NullInput("document is missing"))?;
        let targets = targets.ok_or(MutationError::NullInput("element collection is missing"))?;
        if targets.is_empty() {
            return Err(MutationError::EmptyInput);
        }

        let mut seen = BTreeSet::new();
        let mut ids = Vec::with_capacity(targets.len());
        for locator in targets {
            let element = match self.resolve(&*document, locator) {
                Ok(element) => element,
                Err(e) => {
                    warn!(target_element = %locator, "Delete target not resolved");
                    self.recorder.record(e.to_event());
                    continue;
                }
            };
            if self.is_writable(&*document, &element) && seen.insert(element.numeric_id) {
                ids.push(element.numeric_id);
            }
        }
        if ids.is_empty() {
            return Err(MutationError::NothingToMutate);
        }

        let mut scope = TransactionScope::start(document, DELETE_TRANSACTION)?;
        let affected = scope.document().delete(&ids)?;
        if affected.is_empty() {
            scope.rollback()?;
            return Err(MutationError::TransactionFailure(format!(
                "host deleted none of {} elements",
                ids.len()
            )));
        }
        scope.commit()?;

        metric_add!(ELEMENTS_DELETED, affected.len() as u64);
        info!(
            requested = ids.len(),
            affected = affected.len(),
            "Delete committed"
        );
        Ok(TransactionOutcome::committed(affected))
    }

    /// Create elements from domain objects through `translator`.
    ///
    /// Objects the translator rejects are recorded and skipped. A document
    /// fault aborts the whole batch.
    pub fn create<D, T>(
        &self,
        document: Option<&mut D>,
        objects: Option<&[Value]>,
        translator: &T,
    ) -> TransactionOutcome
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        self.try_create(document, objects, translator)
            .unwrap_or_else(|e| self.fail(e))
    }

    pub fn try_create<D, T>(
        &self,
        document: Option<&mut D>,
        objects: Option<&[Value]>,
        translator: &T,
    ) -> Result<TransactionOutcome, MutationError>
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        let document = document.ok_or(MutationError::NullInput("document is missing"))?;
        let objects = objects.ok_or(MutationError::NullInput("object collection is missing"))?;
        if objects.is_empty() {
            return Err(MutationError::EmptyInput);
        }

        let mut scope = TransactionScope::start(document, CREATE_TRANSACTION)?;
        let mut created = BTreeSet::new();
        for (index, object) in objects.iter().enumerate() {
            match translator.translate_back(object, scope.document(), &self.settings) {
                Ok(id) => {
                    created.insert(id);
                }
                Err(TranslationError::Document(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(index, error = %e, "Object not created");
                    self.recorder
                        .record(EventRecord::error(format!("Object {index} not created: {e}")));
                }
            }
        }
        if created.is_empty() {
            scope.rollback()?;
            return Err(MutationError::TransactionFailure(
                "no object could be created".into(),
            ));
        }
        scope.commit()?;

        info!(created = created.len(), "Create committed");
        Ok(TransactionOutcome::committed(created))
    }

    /// Write domain objects back into the document, all in one transaction.
    ///
    /// Objects without an identity link are created. Linked objects are
    /// resolved by unique id and skipped when the policy denies the element;
    /// allowed ones are updated or replaced per [`AdapterMode`].
    pub fn push<D, T>(
        &self,
        document: Option<&mut D>,
        objects: Option<&[Value]>,
        translator: &T,
    ) -> TransactionOutcome
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        self.try_push(document, objects, translator)
            .unwrap_or_else(|e| self.fail(e))
    }

    pub fn try_push<D, T>(
        &self,
        document: Option<&mut D>,
        objects: Option<&[Value]>,
        translator: &T,
    ) -> Result<TransactionOutcome, MutationError>
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        let document = document.ok_or(MutationError::NullInput("document is missing"))?;
        let objects = objects.ok_or(MutationError::NullInput("object collection is missing"))?;
        if objects.is_empty() {
            return Err(MutationError::EmptyInput);
        }

        let mode = self.settings.adapter_mode;
        let mut scope = TransactionScope::start(document, PUSH_TRANSACTION)?;
        let mut written = BTreeSet::new();
        for (index, object) in objects.iter().enumerate() {
            match self.push_one(scope.document(), object, translator, mode) {
                Ok(Some(id)) => {
                    written.insert(id);
                }
                Ok(None) => {}
                Err(TranslationError::Document(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(index, error = %e, "Object not pushed");
                    self.recorder
                        .record(EventRecord::error(format!("Object {index} not pushed: {e}")));
                }
            }
        }
        if written.is_empty() {
            scope.rollback()?;
            return Err(MutationError::NothingToMutate);
        }
        scope.commit()?;

        info!(mode = %mode, written = written.len(), "Push committed");
        Ok(TransactionOutcome::committed(written))
    }

    /// Push one object. `Ok(None)` means it was skipped.
    fn push_one<D, T>(
        &self,
        document: &mut D,
        object: &Value,
        translator: &T,
        mode: AdapterMode,
    ) -> Result<Option<NumericId>, TranslationError>
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        let Some(unique_id) = translator.identity(object) else {
            return translator
                .translate_back(object, document, &self.settings)
                .map(Some);
        };

        let Some(existing) = document.element_by_unique_id(&unique_id) else {
            return match mode {
                AdapterMode::Replace => {
                    debug!(unique_id = %unique_id, "Linked element gone, creating afresh");
                    translator
                        .translate_back(object, document, &self.settings)
                        .map(Some)
                }
                AdapterMode::Update => {
                    let error = MutationError::IdentityNotFound(unique_id);
                    warn!(error = %error, "Push target not resolved");
                    self.recorder.record(error.to_event());
                    Ok(None)
                }
            };
        };

        if !self.is_writable(&*document, &existing) {
            return Ok(None);
        }

        match mode {
            AdapterMode::Update => translator
                .update(object, &existing, document, &self.settings)
                .map(Some),
            AdapterMode::Replace => {
                if document.delete(&[existing.numeric_id])?.is_empty() {
                    return Err(DocumentError::Host(format!(
                        "element {} could not be removed for replacement",
                        existing.numeric_id
                    ))
                    .into());
                }
                translator
                    .translate_back(object, document, &self.settings)
                    .map(Some)
            }
        }
    }

    /// Translate the elements of `class` the policy lets this session see.
    pub fn pull<D, T>(&self, document: Option<&D>, class: &NativeClass, translator: &T) -> Vec<Value>
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        self.try_pull(document, class, translator)
            .unwrap_or_else(|e| {
                self.recorder.record(e.to_event());
                Vec::new()
            })
    }

    pub fn try_pull<D, T>(
        &self,
        document: Option<&D>,
        class: &NativeClass,
        translator: &T,
    ) -> Result<Vec<Value>, MutationError>
    where
        D: HostDocument + ?Sized,
        T: Translator<D> + ?Sized,
    {
        let document = document.ok_or(MutationError::NullInput("document is missing"))?;

        let mut objects = Vec::new();
        for element in document.elements_of_class(class) {
            if !self.is_writable(document, &element) {
                continue;
            }
            match translator.translate(&element, &self.settings) {
                Ok(object) => objects.push(object),
                Err(e) => {
                    warn!(element = %element.numeric_id, error = %e, "Element not translated");
                    self.recorder.record(EventRecord::error(format!(
                        "Element {} not translated: {e}",
                        element.numeric_id
                    )));
                }
            }
        }
        debug!(class = %class, count = objects.len(), "Pulled elements");
        Ok(objects)
    }

    /// Find the element a locator stands for.
    ///
    /// A locator carrying a unique id is resolved by that id alone. Only
    /// locators without one fall back to a name lookup within the native
    /// class registered for their domain type.
    pub fn resolve<D: HostDocument + ?Sized>(
        &self,
        document: &D,
        locator: &ElementLocator,
    ) -> Result<NativeElement, MutationError> {
        let not_found = || MutationError::IdentityNotFound(locator.to_string());

        if let Some(unique_id) = locator.unique_id() {
            return document.element_by_unique_id(unique_id).ok_or_else(not_found);
        }

        let name = locator.name.as_deref().ok_or_else(not_found)?;
        let capability = self.table.lookup(&locator.domain_type).ok_or_else(not_found)?;
        let candidates = document
            .elements_of_class(&capability.native_class)
            .into_iter()
            .filter(|element| capability.name_matches(&element.name, name));

        self.tie_break.pick(candidates).ok_or_else(not_found)
    }

    fn is_writable<D: HostDocument + ?Sized>(&self, document: &D, element: &NativeElement) -> bool {
        let partition = document.partition_of(element);
        self.policy
            .allow_element(&element.reference(), &partition, &DocumentSelection(document))
    }

    fn fail(&self, error: MutationError) -> TransactionOutcome {
        debug!(error = %error, "Mutation failed");
        self.recorder.record(error.to_event());
        TransactionOutcome::failure()
    }
}
