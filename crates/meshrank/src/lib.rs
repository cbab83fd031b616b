//! Top-level facade crate for meshrank.
//!
//! Re-exports the core types and the engine so users can depend on a single crate.

pub mod core {
    pub use meshrank_core::*;
}

pub mod engine {
    pub use meshrank_engine::*;
}
