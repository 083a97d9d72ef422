//! tigcluster simulator
//!
//! Runs every node of a cluster config in one process and routes stanzas
//! through it:
//! - config path: first argument, default `tigcluster.yaml`
//! - stdin: one JSON stanza tree per line, submitted on the local node
//! - outcomes are logged per node (`RUST_LOG=info`)

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use tigcluster_core::{Element, Packet};
use tigcluster_node::{config, LocalCluster};

const QUIET_PERIOD: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "tigcluster.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");

    let mut cluster = LocalCluster::start(&cfg).expect("cluster start failed");
    tracing::info!(node = %cfg.node.jid, members = cluster.nodes().len(), "tigcluster-sim started");

    match cluster.local().announce_join().await {
        Ok(n) => tracing::info!(peers = n, "join announced"),
        Err(e) => tracing::warn!(error = %e, "join announcement failed"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let stanza: Element = match serde_json::from_str(&line) {
            Ok(el) => el,
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid stanza json");
                continue;
            }
        };
        match cluster.local().submit(Packet::new(stanza)).await {
            Ok(outcome) => tracing::info!(outcome = outcome.as_str(), "stanza submitted"),
            Err(e) => tracing::warn!(code = e.code().as_str(), error = %e, "stanza submit failed"),
        }
    }

    // Drain outcomes until the cluster goes quiet.
    while let Ok(Some(ev)) = tokio::time::timeout(QUIET_PERIOD, cluster.next_event()).await {
        tracing::info!(node = %ev.node, outcome = ev.outcome.as_str(), "cluster event");
    }

    print!("{}", cluster.local().metrics().render());
    cluster.stop().await;
}
