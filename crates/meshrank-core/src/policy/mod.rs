//! Connection policies.
//!
//! Every policy kind scoped by `sources`/`destinations` selectors exposes the
//! same capability set through [`ConnectionPolicy`]; the matching engine only
//! ever sees that trait.

pub mod kinds;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tags::TagSelector;

pub use kinds::{
    Checker, HealthCheck, HealthCheckConf, HttpCheck, HttpHeader, HttpTimeouts, Policy, PolicyKind,
    TcpCheck, Timeout, TimeoutConf, TrafficLog, TrafficLogConf, TrafficPermission,
};

/// Mesh assumed when a resource does not name one.
pub const DEFAULT_MESH: &str = "default";

/// One entry of a policy's `sources` or `destinations` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selector {
    #[serde(rename = "match")]
    pub matcher: TagSelector,
}

impl Selector {
    pub fn new(matcher: TagSelector) -> Self {
        Self { matcher }
    }
}

impl From<TagSelector> for Selector {
    fn from(matcher: TagSelector) -> Self {
        Self::new(matcher)
    }
}

/// Capability set shared by all connection policy kinds.
pub trait ConnectionPolicy {
    /// Resource name. Used for deterministic tie-breaking.
    fn name(&self) -> &str;

    fn mesh(&self) -> &str {
        DEFAULT_MESH
    }

    /// Not consulted by the matching engine; equal ranks are settled by name.
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn sources(&self) -> &[Selector];

    fn destinations(&self) -> &[Selector];
}

impl<T: ConnectionPolicy + ?Sized> ConnectionPolicy for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn mesh(&self) -> &str {
        (**self).mesh()
    }
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        (**self).creation_time()
    }
    fn sources(&self) -> &[Selector] {
        (**self).sources()
    }
    fn destinations(&self) -> &[Selector] {
        (**self).destinations()
    }
}

impl<T: ConnectionPolicy + ?Sized> ConnectionPolicy for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn mesh(&self) -> &str {
        (**self).mesh()
    }
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        (**self).creation_time()
    }
    fn sources(&self) -> &[Selector] {
        (**self).sources()
    }
    fn destinations(&self) -> &[Selector] {
        (**self).destinations()
    }
}

impl<T: ConnectionPolicy + ?Sized> ConnectionPolicy for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn mesh(&self) -> &str {
        (**self).mesh()
    }
    fn creation_time(&self) -> Option<DateTime<Utc>> {
        (**self).creation_time()
    }
    fn sources(&self) -> &[Selector] {
        (**self).sources()
    }
    fn destinations(&self) -> &[Selector] {
        (**self).destinations()
    }
}

/// References to `policies`, stably sorted by name. The input is left untouched.
pub fn sorted_by_name<'a, P>(policies: impl IntoIterator<Item = &'a P>) -> Vec<&'a P>
where
    P: ConnectionPolicy + ?Sized + 'a,
{
    let mut sorted: Vec<&'a P> = policies.into_iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    sorted
}
