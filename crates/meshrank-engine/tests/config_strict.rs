#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use meshrank_core::policy::{ConnectionPolicy, PolicyKind};
use meshrank_engine::{config, MeshSnapshot};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - port: 8080
          tagz: { service: web } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn unknown_policy_type_fails() {
    let bad = r#"
version: 1
policies:
  - type: RetryBudget
    name: r1
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn unsupported_version_fails() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn inbound_requires_service_tag() {
    let bad = r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - port: 8080
          tags: { app: web }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
    assert!(err.to_string().contains("service"));
}

#[test]
fn duplicate_dataplane_names_fail() {
    let bad = r#"
version: 1
dataplanes:
  - name: web-1
  - name: web-1
    mesh: other
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn empty_policy_name_fails() {
    let bad = r#"
version: 1
policies:
  - type: TrafficPermission
    name: ""
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn duplicate_policy_names_are_kept() {
    let ok = r#"
version: 1
policies:
  - type: TrafficPermission
    name: allow
  - type: TrafficPermission
    name: allow
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.policies.len(), 2);
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(cfg.dataplanes.is_empty());
    assert!(cfg.policies.is_empty());
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - port: 8080
          tags: { service: web, version: v1 }
      outbound:
        - port: 10001
          service: payments
policies:
  - type: HealthCheck
    name: payments-hc
    sources: [ { match: { service: "*" } } ]
    destinations: [ { match: { service: payments } } ]
    conf:
      interval_ms: 10000
      timeout_ms: 2000
      unhealthy_threshold: 3
      healthy_threshold: 1
      tcp: {}
  - type: Timeout
    name: payments-timeout
    mesh: prod
    conf:
      http: { request_timeout_ms: 1500 }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.dataplanes[0].mesh, "default");
    assert_eq!(cfg.dataplanes[0].networking.outbound[0].service, "payments");
    assert_eq!(cfg.policies[0].kind(), PolicyKind::HealthCheck);
    assert_eq!(cfg.policies[1].kind(), PolicyKind::Timeout);
}

#[test]
fn missing_file_is_internal_error() {
    let err = config::load_from_file("does/not/exist.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INTERNAL");
}

#[test]
fn unquoted_scalar_tag_values_load_in_policy_selectors() {
    let ok = r#"
version: 1
dataplanes:
  - name: web-1
    networking:
      inbound:
        - port: 8080
          tags: { service: web, version: 1, canary: true }
      outbound:
        - { port: 10001, service: orders }
policies:
  - type: TrafficPermission
    name: v1-only
    sources: [ { match: { service: web, version: 1, canary: true } } ]
    destinations: [ { match: { service: orders } } ]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let selector = &cfg.policies[0].sources()[0].matcher;
    assert_eq!(selector.get("version").unwrap().as_str(), "1");
    assert_eq!(selector.get("canary").unwrap().as_str(), "true");
    assert_eq!(cfg.dataplanes[0].networking.inbound[0].tags.get("version"), Some("1"));

    let snap = MeshSnapshot::new(cfg);
    let dp = snap.dataplane("web-1").unwrap();
    let selected = snap.select(dp, PolicyKind::TrafficPermission);
    assert_eq!(selected["orders"].name(), "v1-only");
}
