//! Test fixtures shared by the integration flows.

use adapter_runtime::{AdapterSession, Dispatcher, HostListener};
use hb_01_message_channel::{Endpoint, MessageChannel};
use hb_04_document_mutator::{InMemoryDocument, NativeElement, PassthroughTranslator, ResolutionTable};
use hb_telemetry::EventLog;
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{
    EventRecord, MessagePackage, NumericId, PartitionInfo, SettingsBundle, WorksetId,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Levels L1 (u-1) and L2 (u-2) in an open workset, a wall (u-3) in a
/// closed one hosting a door (u-4).
pub fn sample_document() -> InMemoryDocument {
    InMemoryDocument::new("Tower")
        .workshared([
            PartitionInfo {
                id: WorksetId(1),
                name: "Levels".into(),
                is_open: true,
            },
            PartitionInfo {
                id: WorksetId(2),
                name: "Walls".into(),
                is_open: false,
            },
        ])
        .with_element(
            NativeElement::new("L1", "Level")
                .with_ids(NumericId(1), "u-1")
                .with_category("Levels")
                .in_workset(WorksetId(1)),
        )
        .with_element(
            NativeElement::new("L2", "Level")
                .with_ids(NumericId(2), "u-2")
                .with_category("Levels")
                .in_workset(WorksetId(1)),
        )
        .with_element(
            NativeElement::new("Wall", "Wall")
                .with_ids(NumericId(3), "u-3")
                .with_category("Walls")
                .in_workset(WorksetId(2)),
        )
        .with_element(
            NativeElement::new("Door", "Door")
                .with_ids(NumericId(4), "u-4")
                .with_category("Doors")
                .in_workset(WorksetId(2))
                .hosted_by(NumericId(3)),
        )
}

/// Caller session wired to a dispatcher-backed host listener.
pub struct Bridge {
    pub session: AdapterSession,
    pub host: HostListener,
    pub document: Arc<Mutex<InMemoryDocument>>,
    pub caller_log: Arc<EventLog>,
}

pub async fn start_bridge(document: InMemoryDocument, settings: SettingsBundle) -> Bridge {
    let pull = MessageChannel::open(Endpoint::Listen(loopback()))
        .await
        .unwrap();
    let pull_addr = pull.local_addr().unwrap();

    let document = Arc::new(Mutex::new(document));
    let dispatcher = Dispatcher::new(
        Arc::clone(&document),
        PassthroughTranslator::with_table(ResolutionTable::standard()),
        Arc::new(settings.clone()),
    );
    let host = HostListener::start(loopback(), pull_addr, dispatcher)
        .await
        .unwrap();

    let push = MessageChannel::open(Endpoint::Connect(host.local_addr().unwrap()))
        .await
        .unwrap();
    let caller_log = Arc::new(EventLog::new());
    let session = AdapterSession::from_channels(settings, push, pull, caller_log.clone());

    Bridge {
        session,
        host,
        document,
        caller_log,
    }
}

/// Host whose replies are sent by the test.
pub struct ScriptedHost {
    requests: mpsc::UnboundedReceiver<MessagePackage>,
    listener: MessageChannel,
    replies: MessageChannel,
}

impl ScriptedHost {
    pub async fn next_request(&mut self) -> MessagePackage {
        timeout(WAIT, self.requests.recv()).await.unwrap().unwrap()
    }

    /// The next request if one arrives within `wait`.
    pub async fn request_within(&mut self, wait: Duration) -> Option<MessagePackage> {
        timeout(wait, self.requests.recv()).await.ok().flatten()
    }

    pub async fn reply(&self, request: &MessagePackage, data: Vec<Value>, events: Vec<EventRecord>) {
        self.send(&MessagePackage::reply(request, data, events)).await;
    }

    pub async fn send(&self, package: &MessagePackage) {
        self.replies.send(package).await.unwrap();
    }
}

/// Session talking to a [`ScriptedHost`], waiting at most `max_wait`.
pub async fn scripted_bridge(max_wait: Duration) -> (Arc<AdapterSession>, ScriptedHost, Arc<EventLog>) {
    let pull = MessageChannel::open(Endpoint::Listen(loopback()))
        .await
        .unwrap();
    let listener = MessageChannel::open(Endpoint::Listen(loopback()))
        .await
        .unwrap();
    let replies = MessageChannel::open(Endpoint::Connect(pull.local_addr().unwrap()))
        .await
        .unwrap();
    let push = MessageChannel::open(Endpoint::Connect(listener.local_addr().unwrap()))
        .await
        .unwrap();

    let (tx, requests) = mpsc::unbounded_channel();
    listener.on_receive(move |package| {
        let _ = tx.send(package);
    });

    let mut settings = SettingsBundle::default();
    settings.connection.max_wait = max_wait;
    let log = Arc::new(EventLog::new());
    let session = AdapterSession::from_channels(settings, push, pull, log.clone());

    let host = ScriptedHost {
        requests,
        listener,
        replies,
    };
    (Arc::new(session), host, log)
}
