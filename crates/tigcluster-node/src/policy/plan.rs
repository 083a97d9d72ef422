use tigcluster_core::ClusterEnvelope;

use super::ForwardingPolicy;

/// Next step for an envelope the local node could not service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopPlan {
    /// Hand the envelope to an unvisited peer.
    Forward(ClusterEnvelope),
    /// Nothing left to try: send it back to the first node.
    Fallback(ClusterEnvelope),
}

impl HopPlan {
    pub fn envelope(&self) -> &ClusterEnvelope {
        match self {
            HopPlan::Forward(env) | HopPlan::Fallback(env) => env,
        }
    }

    /// Node the planned envelope is addressed to.
    pub fn target(&self) -> &str {
        self.envelope().to().unwrap_or_default()
    }
}

/// Derive the next hop for `envelope` on node `local`.
///
/// `local` is marked visited first (also making it the first node of a fresh
/// envelope). Peers in `reachable` that already saw the envelope are never
/// offered to the policy. When no candidate is left, the policy declines, or
/// `max_hops` (if non-zero) is reached, the envelope is addressed to its
/// first node.
pub fn plan_next_hop(
    policy: &dyn ForwardingPolicy,
    envelope: &ClusterEnvelope,
    local: &str,
    reachable: &[String],
    max_hops: usize,
) -> HopPlan {
    let mut current = envelope.clone();
    current.mark_visited(local);

    let limit_reached = max_hops > 0 && current.hop_count() >= max_hops;
    let mut candidates: Vec<String> = if limit_reached {
        Vec::new()
    } else {
        reachable
            .iter()
            .filter(|node| node.as_str() != local && !current.is_visited(node))
            .cloned()
            .collect()
    };
    candidates.sort();
    candidates.dedup();

    if let Some(target) = choose(policy, &current, &candidates) {
        tracing::debug!(
            node = %local,
            to = %target,
            policy = policy.name(),
            hops = current.hop_count(),
            "forwarding to next cluster node"
        );
        return HopPlan::Forward(current.next_hop(target));
    }

    let first = current.first_node().unwrap_or(local).to_owned();
    tracing::debug!(
        node = %local,
        first_node = %first,
        hops = current.hop_count(),
        limit_reached,
        "no unvisited cluster node left, falling back to first node"
    );
    HopPlan::Fallback(current.next_hop(first))
}

fn choose(
    policy: &dyn ForwardingPolicy,
    envelope: &ClusterEnvelope,
    candidates: &[String],
) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    match policy.select(envelope, candidates) {
        Some(target) if candidates.contains(&target) => Some(target),
        Some(target) => {
            tracing::warn!(
                policy = policy.name(),
                target = %target,
                "policy picked a visited or unknown node, using first candidate"
            );
            candidates.first().cloned()
        }
        None => None,
    }
}
