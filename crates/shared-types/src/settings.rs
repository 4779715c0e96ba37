//! # Adapter Settings
//!
//! The immutable bundle an adapter session is built from: connection
//! parameters plus the two write-access policies.
//!
//! Every field is optional. Absent fields take the "fully open" value: no
//! id, name or category restriction and no open-workset requirement.

use crate::entities::{NumericId, WorksetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Lowest port accepted for either channel.
pub const MIN_PORT: u16 = 3000;
/// Highest port accepted for either channel.
pub const MAX_PORT: u16 = 65000;

/// Complete settings for one adapter session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsBundle {
    pub connection: ConnectionSettings,
    pub selection: SelectionPolicy,
    pub workset: WorksetPolicy,
    pub adapter_mode: AdapterMode,
}

impl SettingsBundle {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.connection.validate()
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_workset(mut self, workset: WorksetPolicy) -> Self {
        self.workset = workset;
        self
    }

    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    #[must_use]
    pub fn with_adapter_mode(mut self, adapter_mode: AdapterMode) -> Self {
        self.adapter_mode = adapter_mode;
        self
    }
}

/// What a push does to an element the pushed object is already linked to.
///
/// Objects without an identity link are always created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterMode {
    /// Overwrite the linked element's parameters in place. A link to a
    /// missing element is reported and skipped.
    #[default]
    Update,
    /// Delete the linked element and create a new one from the object. A
    /// link to a missing element creates the object afresh.
    Replace,
}

impl std::fmt::Display for AdapterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Transport parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Address both channels use.
    pub host: IpAddr,
    /// Port carrying caller -> host requests.
    pub push_port: u16,
    /// Port carrying host -> caller replies.
    pub pull_port: u16,
    /// Longest time a call waits for its reply.
    #[serde(with = "duration_serde")]
    pub max_wait: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            push_port: 14128,
            pull_port: 14129,
            max_wait: Duration::from_secs(10 * 60),
        }
    }
}

impl ConnectionSettings {
    /// Validate ports and wait duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for port in [self.push_port, self.pull_port] {
            if !(MIN_PORT..=MAX_PORT).contains(&port) {
                return Err(ConfigError::PortOutOfRange { port });
            }
        }

        if self.push_port == self.pull_port {
            return Err(ConfigError::DuplicatePorts);
        }

        if self.max_wait.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "max_wait cannot be 0".into(),
            ));
        }

        Ok(())
    }

    pub fn push_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.push_port)
    }

    pub fn pull_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.pull_port)
    }
}

/// Selection criterion of the write-access policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Allowed session-stable ids.
    pub unique_ids: BTreeSet<String>,
    /// Allowed session-transient ids.
    pub numeric_ids: BTreeSet<NumericId>,
    /// Allowed category names.
    pub category_names: BTreeSet<String>,
    /// Fall back to the host's live selection for ids outside the lists.
    pub include_selected: bool,
}

impl SelectionPolicy {
    /// Policy that allows everything.
    pub fn open() -> Self {
        Self::default()
    }

    /// True when the policy places no restriction at all.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.unique_ids.is_empty()
            && self.numeric_ids.is_empty()
            && self.category_names.is_empty()
            && !self.include_selected
    }

    #[must_use]
    pub fn allow_unique_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn allow_numeric_ids(mut self, ids: impl IntoIterator<Item = NumericId>) -> Self {
        self.numeric_ids.extend(ids);
        self
    }

    #[must_use]
    pub fn allow_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn include_selected(mut self, include: bool) -> Self {
        self.include_selected = include;
        self
    }
}

/// Partition (workset) criterion of the write-access policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksetPolicy {
    pub workset_ids: BTreeSet<WorksetId>,
    pub workset_names: BTreeSet<String>,
    /// Deny elements in closed worksets, whatever the lists say.
    pub open_worksets_only: bool,
}

impl WorksetPolicy {
    /// Policy that allows everything.
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.workset_ids.is_empty() && self.workset_names.is_empty() && !self.open_worksets_only
    }

    #[must_use]
    pub fn allow_ids(mut self, ids: impl IntoIterator<Item = WorksetId>) -> Self {
        self.workset_ids.extend(ids);
        self
    }

    #[must_use]
    pub fn allow_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workset_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn open_worksets_only(mut self, only_open: bool) -> Self {
        self.open_worksets_only = only_open;
        self
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Push and pull share a port
    #[error("push and pull ports must differ")]
    DuplicatePorts,
    /// Port outside the accepted range
    #[error("port {port} outside {MIN_PORT}-{MAX_PORT}")]
    PortOutOfRange { port: u16 },
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Duration as a human string: `"30s"`, `"500ms"`, `"10m"` or plain seconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            let minutes = mins.trim().parse::<u64>().map_err(|_| "invalid minutes")?;
            minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("minutes out of range")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

pub use duration_serde::parse_duration;
