//! # `MessagePackage` Envelope
//!
//! The unit carried by the message channel in both directions.
//!
//! ## Properties
//!
//! - **Versioning**: every package carries the protocol `version`.
//! - **Correlation**: requests are stamped with a monotonically increasing
//!   `RequestId`; replies echo it so late replies to abandoned requests can be
//!   told apart from the reply currently awaited.
//! - **Immutability**: fields are private. A package is built once and only
//!   read afterwards.

use crate::events::EventRecord;
use crate::ipc::PackageType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Current protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Request sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Packages that do not answer any request.
    pub const UNSOLICITED: RequestId = RequestId(0);

    /// First id handed out by a correlator.
    pub const FIRST: RequestId = RequestId(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1).max(1))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered data items plus ordered diagnostic events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePackage {
    version: u16,
    request_id: RequestId,
    package_type: PackageType,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    events: Vec<EventRecord>,
}

impl MessagePackage {
    /// Build a request. Requests carry no events.
    pub fn request(request_id: RequestId, package_type: PackageType, data: Vec<Value>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id,
            package_type,
            data,
            events: Vec::new(),
        }
    }

    /// Build the reply to `request`, echoing its id and type.
    pub fn reply(request: &MessagePackage, data: Vec<Value>, events: Vec<EventRecord>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id: request.request_id,
            package_type: request.package_type,
            data,
            events,
        }
    }

    /// Build a package that answers no request.
    pub fn unsolicited(package_type: PackageType, data: Vec<Value>, events: Vec<EventRecord>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id: RequestId::UNSOLICITED,
            package_type,
            data,
            events,
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// True when this package answers `request_id`.
    #[must_use]
    pub fn is_reply_to(&self, request_id: RequestId) -> bool {
        self.request_id != RequestId::UNSOLICITED && self.request_id == request_id
    }

    /// Consume the package, yielding data and events.
    pub fn into_parts(self) -> (Vec<Value>, Vec<EventRecord>) {
        (self.data, self.events)
    }
}
