use std::collections::BTreeSet;

use serde::Deserialize;

use meshrank_core::dataplane::Dataplane;
use meshrank_core::error::{MeshError, Result};
use meshrank_core::policy::{ConnectionPolicy, Policy};
use meshrank_core::tags::SERVICE_TAG;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshConfig {
    pub version: u32,

    #[serde(default)]
    pub dataplanes: Vec<Dataplane>,

    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl MeshConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeshError::UnsupportedVersion);
        }

        let mut names = BTreeSet::new();
        for dp in &self.dataplanes {
            validate_dataplane(dp)?;
            if !names.insert(dp.name.as_str()) {
                return Err(MeshError::InvalidConfig(format!(
                    "duplicate dataplane name: {}",
                    dp.name
                )));
            }
        }

        let mut names = BTreeSet::new();
        for policy in &self.policies {
            if policy.name().is_empty() {
                return Err(MeshError::InvalidConfig(format!(
                    "{} policy name must not be empty",
                    policy.kind()
                )));
            }
            if policy.mesh().is_empty() {
                return Err(MeshError::InvalidConfig(format!(
                    "policy {}: mesh must not be empty",
                    policy.name()
                )));
            }
            // Kept as is; selection breaks rank ties by name order.
            if !names.insert((policy.kind(), policy.mesh(), policy.name())) {
                tracing::warn!(
                    kind = %policy.kind(),
                    mesh = policy.mesh(),
                    name = policy.name(),
                    "duplicate policy name"
                );
            }
        }

        Ok(())
    }
}

fn validate_dataplane(dp: &Dataplane) -> Result<()> {
    if dp.name.is_empty() {
        return Err(MeshError::InvalidConfig("dataplane name must not be empty".into()));
    }
    if dp.mesh.is_empty() {
        return Err(MeshError::InvalidConfig(format!(
            "dataplane {}: mesh must not be empty",
            dp.name
        )));
    }
    for inbound in &dp.networking.inbound {
        if !inbound.tags.contains_key(SERVICE_TAG) {
            return Err(MeshError::InvalidConfig(format!(
                "dataplane {}: inbound port {} must carry a `{SERVICE_TAG}` tag",
                dp.name, inbound.port
            )));
        }
    }
    for outbound in &dp.networking.outbound {
        if outbound.service.is_empty() {
            return Err(MeshError::InvalidConfig(format!(
                "dataplane {}: outbound port {} has an empty service",
                dp.name, outbound.port
            )));
        }
    }
    Ok(())
}
