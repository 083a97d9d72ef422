use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tigcluster_core::ClusterEnvelope;

pub const FIRST_UNVISITED: &str = "first-unvisited";
pub const ROUND_ROBIN: &str = "round-robin";

/// Names accepted by [`by_name`] (and by `cluster.policy` in config).
pub const POLICY_NAMES: [&str; 2] = [FIRST_UNVISITED, ROUND_ROBIN];

/// Peer selection strategy.
///
/// `candidates` is never empty, sorted, excludes the local node and holds no
/// node the envelope already visited. Returning `None` gives up on the
/// remaining candidates and sends the envelope back to its first node.
pub trait ForwardingPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(&self, envelope: &ClusterEnvelope, candidates: &[String]) -> Option<String>;
}

/// Always the first candidate in sorted order; deterministic.
#[derive(Debug, Default)]
pub struct FirstUnvisited;

impl ForwardingPolicy for FirstUnvisited {
    fn name(&self) -> &'static str {
        FIRST_UNVISITED
    }

    fn select(&self, _envelope: &ClusterEnvelope, candidates: &[String]) -> Option<String> {
        candidates.first().cloned()
    }
}

/// Rotates over the candidates so consecutive envelopes spread across peers.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForwardingPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        ROUND_ROBIN
    }

    fn select(&self, _envelope: &ClusterEnvelope, candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        candidates.get(n % candidates.len()).cloned()
    }
}

/// Registry of built-in policies keyed by name.
pub fn by_name(name: &str) -> Option<Arc<dyn ForwardingPolicy>> {
    match name {
        FIRST_UNVISITED => Some(Arc::new(FirstUnvisited)),
        ROUND_ROBIN => Some(Arc::new(RoundRobin::new())),
        _ => None,
    }
}
