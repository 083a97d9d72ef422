//! Local view of the cluster: which peers are currently reachable.

use dashmap::DashSet;

use tigcluster_core::ClusterEnvelope;

/// Peer changes actually applied from one announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChange {
    pub connected: Vec<String>,
    pub disconnected: Vec<String>,
}

impl MembershipChange {
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty() && self.disconnected.is_empty()
    }
}

/// Reachable peers of one node. The local node itself is never a member.
pub struct ClusterView {
    local: String,
    peers: DashSet<String>,
}

impl ClusterView {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            peers: DashSet::new(),
        }
    }

    /// Returns false for the local node or a peer already known.
    pub fn add(&self, peer: &str) -> bool {
        if peer == self.local {
            return false;
        }
        self.peers.insert(peer.to_string())
    }

    pub fn remove(&self, peer: &str) -> bool {
        self.peers.remove(peer).is_some()
    }

    pub fn contains(&self, peer: &str) -> bool {
        self.peers.contains(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Reachable peers, sorted.
    pub fn reachable(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.peers.iter().map(|p| p.key().to_string()).collect();
        peers.sort();
        peers
    }

    /// Apply a membership announcement: connected nodes join, disconnected
    /// nodes leave (a node listed in both ends up removed).
    pub fn apply(&self, envelope: &ClusterEnvelope) -> MembershipChange {
        let mut change = MembershipChange::default();
        for peer in envelope.connected_nodes().unwrap_or_default() {
            if self.add(&peer) {
                change.connected.push(peer);
            }
        }
        for peer in envelope.disconnected_nodes().unwrap_or_default() {
            if self.remove(&peer) {
                change.disconnected.push(peer);
            }
        }
        change
    }
}
