//! # Adapter Session
//!
//! Caller side of the bridge. Owns the two channels and the correlator, and
//! turns every host exchange into a plain result: failures are recorded on
//! the session's event recorder and surface as an empty list or a failed
//! outcome.

use crate::config::load_settings;
use anyhow::Context;
use hb_01_message_channel::{Endpoint, MessageChannel};
use hb_02_request_correlator::RequestCorrelator;
use serde_json::Value;
use shared_types::{
    from_data, to_data, ElementLocator, EventRecord, EventRecorder, NativeClass, PackageType,
    PullRequest, SettingsBundle, TransactionOutcome,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct AdapterSession {
    id: Uuid,
    settings: Arc<SettingsBundle>,
    push: Arc<MessageChannel>,
    pull: Arc<MessageChannel>,
    correlator: RequestCorrelator<Arc<MessageChannel>>,
    recorder: Arc<dyn EventRecorder>,
}

impl AdapterSession {
    /// Apply environment overrides, validate, and open both channels.
    ///
    /// The pull channel listens on `host:pull_port`; the push channel
    /// connects to `host:push_port` on the first request.
    pub async fn open(
        settings: SettingsBundle,
        recorder: Arc<dyn EventRecorder>,
    ) -> anyhow::Result<Self> {
        let settings = load_settings(settings).context("invalid adapter settings")?;
        let connection = &settings.connection;

        let pull = MessageChannel::open(Endpoint::Listen(connection.pull_addr()))
            .await
            .with_context(|| format!("cannot listen on {}", connection.pull_addr()))?;
        let push = MessageChannel::open(Endpoint::Connect(connection.push_addr()))
            .await
            .with_context(|| format!("cannot open push channel to {}", connection.push_addr()))?;

        Ok(Self::from_channels(settings, push, pull, recorder))
    }

    /// Assemble a session from channels opened by the caller.
    pub fn from_channels(
        settings: SettingsBundle,
        push: MessageChannel,
        pull: MessageChannel,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        let push = Arc::new(push);
        let pull = Arc::new(pull);
        let correlator = RequestCorrelator::new(
            Arc::clone(&push),
            settings.connection.max_wait,
            Arc::clone(&recorder),
        );

        let delivery = correlator.delivery();
        pull.on_receive(move |package| {
            let request_id = package.request_id();
            if !delivery.deliver(package) {
                debug!(request_id = %request_id, "Reply discarded, no matching request");
            }
        });

        let id = Uuid::new_v4();
        info!(
            session = %id,
            push = %push.endpoint(),
            pull = %pull.endpoint(),
            "Adapter session opened"
        );

        Self {
            id,
            settings: Arc::new(settings),
            push,
            pull,
            correlator,
            recorder,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &SettingsBundle {
        &self.settings
    }

    pub fn correlator(&self) -> &RequestCorrelator<Arc<MessageChannel>> {
        &self.correlator
    }

    /// True while both channels are open.
    pub fn is_valid(&self) -> bool {
        self.push.is_open() && self.pull.is_open()
    }

    /// Round-trip a connection check with the host.
    pub async fn check_connection(&self) -> bool {
        if !self.ensure_valid() {
            return false;
        }
        self.correlator.check_connection().await
    }

    /// Translated elements of `class`, filtered by the host-side policy.
    pub async fn pull(&self, class: &NativeClass) -> Vec<Value> {
        if !self.ensure_valid() {
            return Vec::new();
        }
        let request = PullRequest {
            native_class: class.clone(),
        };
        let data = match to_data(&[request]) {
            Ok(data) => data,
            Err(e) => {
                self.record_error(format!("Pull request not encoded: {e}"));
                return Vec::new();
            }
        };

        match self.correlator.send(PackageType::Pull, data).await {
            Ok(response) => response.payload,
            Err(e) => {
                debug!(session = %self.id, error = %e, "Pull failed");
                Vec::new()
            }
        }
    }

    /// Create host elements from domain objects in one transaction.
    pub async fn push(&self, objects: Vec<Value>) -> TransactionOutcome {
        if !self.ensure_valid() {
            return TransactionOutcome::failure();
        }
        self.mutate(PackageType::Push, objects).await
    }

    /// Delete the host elements `targets` stand for, all or nothing.
    pub async fn delete(&self, targets: &[ElementLocator]) -> TransactionOutcome {
        if !self.ensure_valid() {
            return TransactionOutcome::failure();
        }
        match to_data(targets) {
            Ok(data) => self.mutate(PackageType::Delete, data).await,
            Err(e) => {
                self.record_error(format!("Delete request not encoded: {e}"));
                TransactionOutcome::failure()
            }
        }
    }

    /// Close both channels. Later calls fail fast.
    pub async fn close(&self) {
        self.push.close().await;
        self.pull.close().await;
        info!(session = %self.id, "Adapter session closed");
    }

    async fn mutate(&self, package_type: PackageType, data: Vec<Value>) -> TransactionOutcome {
        let response = match self.correlator.send(package_type, data).await {
            Ok(response) => response,
            Err(e) => {
                debug!(session = %self.id, package_type = %package_type, error = %e, "Request failed");
                return TransactionOutcome::failure();
            }
        };

        match from_data::<TransactionOutcome>(&response.payload) {
            Ok(outcomes) => match outcomes.into_iter().next() {
                Some(outcome) => outcome,
                None => {
                    self.record_error(format!("Host {package_type} reply carried no outcome"));
                    TransactionOutcome::failure()
                }
            },
            Err(e) => {
                self.record_error(format!("Host {package_type} reply not understood: {e}"));
                TransactionOutcome::failure()
            }
        }
    }

    fn ensure_valid(&self) -> bool {
        if self.is_valid() {
            return true;
        }
        self.record_error("Adapter session is closed".to_string());
        false
    }

    fn record_error(&self, message: String) {
        warn!(session = %self.id, "{}", message);
        self.recorder.record(EventRecord::error(message));
    }
}
