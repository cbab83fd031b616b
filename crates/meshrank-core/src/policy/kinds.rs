//! Concrete connection policy kinds.
//!
//! Each kind carries its own `conf`; the selection core does not look at it.
//! Translating a selected policy into proxy configuration is the job of
//! whoever consumes the selection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConnectionPolicy, Selector, DEFAULT_MESH};
use crate::tags::TagSelector;

fn default_mesh() -> String {
    DEFAULT_MESH.into()
}

/// Active health checking of the destination's endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthCheck {
    pub name: String,
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: Vec<Selector>,
    #[serde(default)]
    pub destinations: Vec<Selector>,
    #[serde(default)]
    pub conf: Option<HealthCheckConf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthCheckConf {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    pub unhealthy_threshold: u32,
    pub healthy_threshold: u32,
    #[serde(default)]
    pub tcp: Option<TcpCheck>,
    #[serde(default)]
    pub http: Option<HttpCheck>,
}

/// The checker a health check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checker<'a> {
    Tcp(Option<&'a TcpCheck>),
    Http(&'a HttpCheck),
}

impl HealthCheckConf {
    /// HTTP wins when configured; otherwise a (possibly bare) TCP connect check.
    pub fn checker(&self) -> Checker<'_> {
        match &self.http {
            Some(http) => Checker::Http(http),
            None => Checker::Tcp(self.tcp.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcpCheck {
    /// Payload written after connect.
    #[serde(default)]
    pub send: Option<String>,
    /// Any of these payloads counts as healthy.
    #[serde(default)]
    pub receive: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpCheck {
    pub path: String,
    #[serde(default)]
    pub expected_statuses: Vec<u32>,
    #[serde(default)]
    pub request_headers_to_add: Vec<HttpHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpHeader {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub append: bool,
}

/// Allows traffic from sources to destinations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficPermission {
    pub name: String,
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: Vec<Selector>,
    #[serde(default)]
    pub destinations: Vec<Selector>,
}

/// Connection and request timeouts towards a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeout {
    pub name: String,
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: Vec<Selector>,
    #[serde(default)]
    pub destinations: Vec<Selector>,
    #[serde(default)]
    pub conf: TimeoutConf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConf {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub http: Option<HttpTimeouts>,
}

impl Default for TimeoutConf {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            http: None,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpTimeouts {
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub idle_timeout_ms: Option<u64>,
}

/// Access logging of connections to a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficLog {
    pub name: String,
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: Vec<Selector>,
    #[serde(default)]
    pub destinations: Vec<Selector>,
    #[serde(default)]
    pub conf: TrafficLogConf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficLogConf {
    /// Logging backend name; `None` means the mesh default backend.
    #[serde(default)]
    pub backend: Option<String>,
}

macro_rules! connection_policy_kind {
    ($($kind:ident),+ $(,)?) => {$(
        impl $kind {
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    mesh: default_mesh(),
                    ..Default::default()
                }
            }

            pub fn in_mesh(mut self, mesh: impl Into<String>) -> Self {
                self.mesh = mesh.into();
                self
            }

            pub fn with_source(mut self, matcher: TagSelector) -> Self {
                self.sources.push(Selector::new(matcher));
                self
            }

            pub fn with_destination(mut self, matcher: TagSelector) -> Self {
                self.destinations.push(Selector::new(matcher));
                self
            }
        }

        impl ConnectionPolicy for $kind {
            fn name(&self) -> &str {
                &self.name
            }
            fn mesh(&self) -> &str {
                &self.mesh
            }
            fn creation_time(&self) -> Option<DateTime<Utc>> {
                self.creation_time
            }
            fn sources(&self) -> &[Selector] {
                &self.sources
            }
            fn destinations(&self) -> &[Selector] {
                &self.destinations
            }
        }

        impl From<$kind> for Policy {
            fn from(p: $kind) -> Self {
                Policy::$kind(p)
            }
        }
    )+};
}

connection_policy_kind!(HealthCheck, TrafficPermission, Timeout, TrafficLog);

/// Discriminant of [`Policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    HealthCheck,
    TrafficPermission,
    Timeout,
    TrafficLog,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::HealthCheck,
        PolicyKind::TrafficPermission,
        PolicyKind::Timeout,
        PolicyKind::TrafficLog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::HealthCheck => "HealthCheck",
            PolicyKind::TrafficPermission => "TrafficPermission",
            PolicyKind::Timeout => "Timeout",
            PolicyKind::TrafficLog => "TrafficLog",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any connection policy, tagged by `type` in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Policy {
    HealthCheck(HealthCheck),
    TrafficPermission(TrafficPermission),
    Timeout(Timeout),
    TrafficLog(TrafficLog),
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::HealthCheck(_) => PolicyKind::HealthCheck,
            Policy::TrafficPermission(_) => PolicyKind::TrafficPermission,
            Policy::Timeout(_) => PolicyKind::Timeout,
            Policy::TrafficLog(_) => PolicyKind::TrafficLog,
        }
    }

    fn inner(&self) -> &dyn ConnectionPolicy {
        match self {
            Policy::HealthCheck(p) => p,
            Policy::TrafficPermission(p) => p,
            Policy::Timeout(p) => p,
            Policy::TrafficLog(p) => p,
        }
    }
}

impl ConnectionPolicy for Policy {
    fn name(&self) -> &str {
        self.inner().name()
    }
    fn mesh(&self) -> &str {
        self.inner().mesh()
    }
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.inner().creation_time()
    }
    fn sources(&self) -> &[Selector] {
        self.inner().sources()
    }
    fn destinations(&self) -> &[Selector] {
        self.inner().destinations()
    }
}
