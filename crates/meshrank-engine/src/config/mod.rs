//! Mesh snapshot config loader (strict parsing).

pub mod schema;

use std::fs;

use meshrank_core::error::{MeshError, Result};

pub use schema::MeshConfig;

pub fn load_from_file(path: &str) -> Result<MeshConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeshError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MeshConfig> {
    let cfg: MeshConfig = serde_yaml::from_str(s)
        .map_err(|e| MeshError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
