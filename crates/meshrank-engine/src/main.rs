//! meshrank-engine
//!
//! Loads a mesh snapshot and prints, for every dataplane, the connection
//! policy selected per outbound service and policy kind (one JSON line each).
//!
//! Usage: `meshrank-engine [path]` (default `meshrank.yaml`).
//! Log level via `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

use meshrank_engine::{config, MeshSnapshot};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "meshrank.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let snapshot = MeshSnapshot::new(cfg);

    tracing::info!(%path, dataplanes = snapshot.dataplanes().len(), "selecting connection policies");

    for dp in snapshot.dataplanes() {
        let report = snapshot.select_for(&dp.name).expect("dataplane listed by snapshot");
        let line = serde_json::to_string(&report).expect("report serializes");
        println!("{line}");
    }
}
