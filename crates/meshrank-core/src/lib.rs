//! meshrank core: tags, selectors, ranks, connection policies, and proxy
//! descriptions.
//!
//! Everything here is a plain value type. The crate carries no runtime or
//! logging dependencies so that control-plane components can share it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Misuse such as
//! ranking a selector against tags it does not match surfaces as
//! `MeshError::InvalidSelectorUse`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod dataplane;
pub mod error;
pub mod policy;
pub mod tags;

/// Shared result type.
pub use error::{ErrorCode, MeshError, Result};

pub use dataplane::{Dataplane, Proxy, ServiceName};
pub use policy::{ConnectionPolicy, Policy, PolicyKind, Selector};
pub use tags::{SelectorRank, TagMatch, TagSelector, TagSet};
