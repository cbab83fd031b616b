//! Validated mesh snapshot and per-dataplane selection.
//!
//! Built once from a [`MeshConfig`]; afterwards it is read-only and may be
//! shared freely. Policies are scoped by mesh and kind before they reach the
//! matcher, since a selection only makes sense for one kind at a time.

use std::collections::BTreeMap;

use serde::Serialize;

use meshrank_core::dataplane::{Dataplane, ServiceName};
use meshrank_core::error::{MeshError, Result};
use meshrank_core::policy::{ConnectionPolicy, Policy, PolicyKind};

use crate::config::MeshConfig;
use crate::matcher::{select_outbound_connection_policies, ConnectionPolicyMap};

/// Selection result for one dataplane: kind -> service -> policy name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
    pub dataplane: String,
    pub mesh: String,
    pub policies: BTreeMap<PolicyKind, BTreeMap<ServiceName, String>>,
}

#[derive(Debug)]
pub struct MeshSnapshot {
    dataplanes: Vec<Dataplane>,
    policies: Vec<Policy>,
}

impl MeshSnapshot {
    /// Index a config produced by [`crate::config::load_from_str`] or
    /// [`crate::config::load_from_file`], which already validated it.
    pub fn new(cfg: MeshConfig) -> Self {
        tracing::debug!(
            dataplanes = cfg.dataplanes.len(),
            policies = cfg.policies.len(),
            "mesh snapshot loaded"
        );
        Self {
            dataplanes: cfg.dataplanes,
            policies: cfg.policies,
        }
    }

    pub fn dataplanes(&self) -> &[Dataplane] {
        &self.dataplanes
    }

    pub fn dataplane(&self, name: &str) -> Option<&Dataplane> {
        self.dataplanes.iter().find(|dp| dp.name == name)
    }

    /// Policies of one kind in one mesh, in config order.
    pub fn policies_of(&self, kind: PolicyKind, mesh: &str) -> impl Iterator<Item = &Policy> + '_ {
        let mesh = mesh.to_owned();
        self.policies
            .iter()
            .filter(move |p| p.kind() == kind && p.mesh() == mesh)
    }

    /// Selection of `kind` policies for the outbound services of `dataplane`.
    pub fn select(&self, dataplane: &Dataplane, kind: PolicyKind) -> ConnectionPolicyMap<'_, Policy> {
        select_outbound_connection_policies(dataplane, self.policies_of(kind, &dataplane.mesh))
    }

    /// Selection of every policy kind present in the dataplane's mesh.
    pub fn select_for(&self, dataplane_name: &str) -> Result<SelectionReport> {
        let dataplane = self
            .dataplane(dataplane_name)
            .ok_or_else(|| MeshError::UnknownDataplane(dataplane_name.to_string()))?;

        let mut policies = BTreeMap::new();
        for kind in PolicyKind::ALL {
            if self.policies_of(kind, &dataplane.mesh).next().is_none() {
                continue;
            }
            let selected: BTreeMap<ServiceName, String> = self
                .select(dataplane, kind)
                .into_iter()
                .map(|(service, policy)| (service, policy.name().to_string()))
                .collect();
            policies.insert(kind, selected);
        }

        Ok(SelectionReport {
            dataplane: dataplane.name.clone(),
            mesh: dataplane.mesh.clone(),
            policies,
        })
    }
}
