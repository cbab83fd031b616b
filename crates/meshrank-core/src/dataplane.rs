//! Proxy descriptions.
//!
//! A dataplane is identified by the tags of its inbound interfaces and reaches
//! other services through its outbound interfaces. The matching core only
//! needs two things from it: "does a selector match you" ([`Proxy`]) and the
//! sequence of services it talks to ([`Dataplane::outbound_services`]).

use serde::{Deserialize, Serialize};

use crate::policy::DEFAULT_MESH;
use crate::tags::{TagSelector, TagSet};

/// Name of a destination service.
pub type ServiceName = String;

/// Anything a `sources` selector can be evaluated against.
pub trait Proxy {
    fn matches(&self, selector: &TagSelector) -> bool;
}

/// A bare identity.
impl Proxy for TagSet {
    fn matches(&self, selector: &TagSelector) -> bool {
        selector.matches(self)
    }
}

impl<T: Proxy + ?Sized> Proxy for &T {
    fn matches(&self, selector: &TagSelector) -> bool {
        (**self).matches(selector)
    }
}

fn default_mesh() -> String {
    DEFAULT_MESH.into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataplane {
    pub name: String,
    #[serde(default = "default_mesh")]
    pub mesh: String,
    #[serde(default)]
    pub networking: Networking,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Networking {
    #[serde(default)]
    pub inbound: Vec<InboundInterface>,
    #[serde(default)]
    pub outbound: Vec<OutboundInterface>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InboundInterface {
    pub port: u16,
    #[serde(default)]
    pub tags: TagSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutboundInterface {
    pub port: u16,
    pub service: ServiceName,
}

impl Dataplane {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: default_mesh(),
            networking: Networking::default(),
        }
    }

    pub fn in_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = mesh.into();
        self
    }

    pub fn with_inbound(mut self, port: u16, tags: TagSet) -> Self {
        self.networking.inbound.push(InboundInterface { port, tags });
        self
    }

    pub fn with_outbound(mut self, port: u16, service: impl Into<ServiceName>) -> Self {
        self.networking.outbound.push(OutboundInterface {
            port,
            service: service.into(),
        });
        self
    }

    /// Tag sets of all inbound interfaces, in configured order.
    pub fn inbound_tags(&self) -> impl Iterator<Item = &TagSet> {
        self.networking.inbound.iter().map(|i| &i.tags)
    }

    /// One entry per outbound interface, in configured order. Not deduplicated.
    pub fn outbound_services(&self) -> impl Iterator<Item = &str> {
        self.networking.outbound.iter().map(|o| o.service.as_str())
    }
}

/// A dataplane matches when any of its inbound interfaces does.
impl Proxy for Dataplane {
    fn matches(&self, selector: &TagSelector) -> bool {
        self.inbound_tags().any(|tags| selector.matches(tags))
    }
}
