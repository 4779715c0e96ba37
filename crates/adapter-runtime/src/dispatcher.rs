//! # Reference Dispatcher
//!
//! `PackageHandler` that serves requests against a shared host document.
//!
//! | Request | Data | Reply data |
//! |---------|------|------------|
//! | `ConnectionCheck` | - | `[true]` |
//! | `Pull` | `[PullRequest]` | translated elements the policy allows |
//! | `Push` | domain objects | `[TransactionOutcome]`, linked objects handled per `AdapterMode` |
//! | `Delete` | `ElementLocator`s | `[TransactionOutcome]` |
//!
//! Events recorded while serving a request travel back with its reply.

use crate::listener::PackageHandler;
use async_trait::async_trait;
use hb_04_document_mutator::{
    HostDocument, ResolutionTable, TieBreak, TransactionalMutator, Translator,
};
use hb_telemetry::EventLog;
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{
    from_data, ElementLocator, EventRecord, EventRecorder, MessagePackage, PackageType,
    PullRequest, SettingsBundle, TransactionOutcome,
};
use std::sync::Arc;
use tracing::debug;

pub struct Dispatcher<D, T> {
    document: Arc<Mutex<D>>,
    translator: T,
    mutator: TransactionalMutator,
    log: Arc<EventLog>,
}

impl<D, T> Dispatcher<D, T>
where
    D: HostDocument,
    T: Translator<D>,
{
    pub fn new(document: Arc<Mutex<D>>, translator: T, settings: Arc<SettingsBundle>) -> Self {
        let log = Arc::new(EventLog::new());
        let recorder: Arc<dyn EventRecorder> = log.clone();
        Self {
            document,
            translator,
            mutator: TransactionalMutator::new(settings, recorder),
            log,
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: ResolutionTable) -> Self {
        self.mutator = self.mutator.with_table(table);
        self
    }

    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.mutator = self.mutator.with_tie_break(tie_break);
        self
    }

    pub fn document(&self) -> Arc<Mutex<D>> {
        Arc::clone(&self.document)
    }

    /// Events of every request served so far.
    pub fn events(&self) -> Vec<EventRecord> {
        self.log.all()
    }

    /// Reply data for one request. The document lock is held only here.
    pub fn dispatch(&self, request: &MessagePackage) -> Vec<Value> {
        match request.package_type() {
            PackageType::ConnectionCheck => vec![Value::Bool(true)],
            PackageType::Pull => self.pull(request.data()),
            PackageType::Push => {
                let mut document = self.document.lock();
                let outcome = self.mutator.push(
                    Some(&mut *document),
                    Some(request.data()),
                    &self.translator,
                );
                self.outcome_payload(&outcome)
            }
            PackageType::Delete => {
                let outcome = match from_data::<ElementLocator>(request.data()) {
                    Ok(targets) => {
                        let mut document = self.document.lock();
                        self.mutator.delete(Some(&mut *document), Some(&targets))
                    }
                    Err(e) => {
                        self.log
                            .record(EventRecord::error(format!("Malformed delete request: {e}")));
                        TransactionOutcome::failure()
                    }
                };
                self.outcome_payload(&outcome)
            }
        }
    }

    fn pull(&self, data: &[Value]) -> Vec<Value> {
        let request = match from_data::<PullRequest>(data) {
            Ok(requests) => requests.into_iter().next(),
            Err(e) => {
                self.log
                    .record(EventRecord::error(format!("Malformed pull request: {e}")));
                return Vec::new();
            }
        };
        let Some(request) = request else {
            self.log
                .record(EventRecord::error("Pull request names no native class"));
            return Vec::new();
        };

        let document = self.document.lock();
        self.mutator
            .pull(Some(&*document), &request.native_class, &self.translator)
    }

    fn outcome_payload(&self, outcome: &TransactionOutcome) -> Vec<Value> {
        match serde_json::to_value(outcome) {
            Ok(value) => vec![value],
            Err(e) => {
                self.log
                    .record(EventRecord::error(format!("Outcome not encoded: {e}")));
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<D, T> PackageHandler for Dispatcher<D, T>
where
    D: HostDocument + 'static,
    T: Translator<D> + 'static,
{
    async fn handle(&self, request: &MessagePackage) -> (Vec<Value>, Vec<EventRecord>) {
        let data = self.dispatch(request);
        let events = self.log.drain_current();
        debug!(
            request_id = %request.request_id(),
            items = data.len(),
            events = events.len(),
            "Request dispatched"
        );
        (data, events)
    }
}
