#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meshrank_core::policy::{ConnectionPolicy, PolicyKind};
use meshrank_engine::{config, MeshSnapshot};

const MESH: &str = r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - port: 8080
          tags: { service: web, version: v1 }
      outbound:
        - { port: 10001, service: payments }
        - { port: 10002, service: orders }
        - { port: 10003, service: payments }
  - name: batch-1
    mesh: jobs
    networking:
      inbound:
        - port: 9000
          tags: { service: batch }
      outbound:
        - { port: 10001, service: payments }
policies:
  - type: HealthCheck
    name: hc-any
    sources: [ { match: { service: "*" } } ]
    destinations: [ { match: { service: "*" } } ]
  - type: HealthCheck
    name: hc-web-payments
    sources: [ { match: { service: web } } ]
    destinations: [ { match: { service: payments } } ]
  - type: TrafficPermission
    name: allow-orders
    sources: [ { match: { service: web, version: "*" } } ]
    destinations: [ { match: { service: orders } } ]
  - type: Timeout
    name: jobs-timeout
    mesh: jobs
    sources: [ { match: { service: batch } } ]
    destinations: [ { match: { service: "*" } } ]
"#;

fn snapshot() -> MeshSnapshot {
    MeshSnapshot::new(config::load_from_str(MESH).unwrap())
}

#[test]
fn selection_is_per_kind() {
    let snap = snapshot();
    let dp = snap.dataplane("web-1").unwrap();

    let hc = snap.select(dp, PolicyKind::HealthCheck);
    assert_eq!(hc["payments"].name(), "hc-web-payments");
    assert_eq!(hc["orders"].name(), "hc-any");

    let tp = snap.select(dp, PolicyKind::TrafficPermission);
    assert_eq!(tp.len(), 1);
    assert_eq!(tp["orders"].name(), "allow-orders");

    assert!(snap.select(dp, PolicyKind::TrafficLog).is_empty());
}

#[test]
fn selection_is_scoped_by_mesh() {
    let snap = snapshot();
    let report = snap.select_for("batch-1").unwrap();
    assert_eq!(report.mesh, "jobs");
    assert_eq!(report.policies.len(), 1);
    assert_eq!(report.policies[&PolicyKind::Timeout]["payments"], "jobs-timeout");

    let web = snap.select_for("web-1").unwrap();
    assert!(!web.policies.contains_key(&PolicyKind::Timeout));
}

#[test]
fn report_lists_kinds_present_in_mesh() {
    let report = snapshot().select_for("web-1").unwrap();
    let kinds: Vec<PolicyKind> = report.policies.keys().copied().collect();
    assert_eq!(kinds, [PolicyKind::HealthCheck, PolicyKind::TrafficPermission]);
    assert_eq!(report.policies[&PolicyKind::HealthCheck].len(), 2);
}

#[test]
fn report_serializes_deterministically() {
    let snap = snapshot();
    let a = serde_json::to_string(&snap.select_for("web-1").unwrap()).unwrap();
    let b = serde_json::to_string(&snap.select_for("web-1").unwrap()).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a,
        r#"{"dataplane":"web-1","mesh":"default","policies":{"HealthCheck":{"orders":"hc-any","payments":"hc-web-payments"},"TrafficPermission":{"orders":"allow-orders"}}}"#
    );
}

#[test]
fn unknown_dataplane_is_an_error() {
    let err = snapshot().select_for("nope").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNKNOWN_DATAPLANE");
}

#[test]
fn snapshot_keeps_duplicate_policy_names() {
    let cfg = config::load_from_str(
        r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - { port: 8080, tags: { service: web } }
      outbound:
        - { port: 10001, service: orders }
policies:
  - type: TrafficPermission
    name: allow
    sources: [ { match: { service: "*" } } ]
    destinations: [ { match: { service: "*" } } ]
  - type: TrafficPermission
    name: allow
    sources: [ { match: { service: web } } ]
    destinations: [ { match: { service: orders } } ]
"#,
    )
    .unwrap();
    let snap = MeshSnapshot::new(cfg);

    assert_eq!(snap.policies_of(PolicyKind::TrafficPermission, "default").count(), 2);
    let dp = snap.dataplane("web-1").unwrap();
    let selected = snap.select(dp, PolicyKind::TrafficPermission);
    assert_eq!(selected["orders"].sources()[0].matcher.get("service").unwrap().as_str(), "web");
}
