//! meshrank engine library entry.
//!
//! Hosts the connection policy matcher and the layers that feed it from a
//! YAML mesh snapshot. Consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod config;
pub mod matcher;
pub mod snapshot;

pub use matcher::{
    select_connection_policies, select_outbound_connection_policies, ConnectionPolicyMap,
};
pub use snapshot::{MeshSnapshot, SelectionReport};
