//! Routing state rules over an envelope's control metadata.
//!
//! Invariants:
//! - `first_node` is set exactly once, by the first `mark_visited`, and equals
//!   the first visited id.
//! - `visited_nodes` only grows, which bounds any forwarding loop by the
//!   cluster size.
//! - `next_hop` never marks anything visited. Callers mark the local node
//!   before deriving a hop; skipping that step lets an envelope bounce
//!   between nodes forever.

use indexmap::IndexSet;

use super::envelope::ClusterEnvelope;
use super::StanzaType;

impl ClusterEnvelope {
    /// Record that `node` attempted this envelope.
    ///
    /// The first call also fixes the first node. Marking a node twice is a
    /// no-op.
    pub fn mark_visited(&mut self, node: impl Into<String>) {
        let node = node.into();
        if self.control.visited.is_empty() {
            self.control.first_node = Some(node.clone());
        }
        self.control.visited.insert(node);
    }

    /// Whether `node` already attempted this envelope. Forwarding code must
    /// check this before offering the envelope to a peer.
    pub fn is_visited(&self, node: &str) -> bool {
        self.control.visited.contains(node)
    }

    pub fn visited_nodes(&self) -> &IndexSet<String> {
        &self.control.visited
    }

    /// Node that started this routing attempt; the final fallback target.
    pub fn first_node(&self) -> Option<&str> {
        self.control.first_node.as_deref()
    }

    /// Number of nodes that attempted this envelope.
    pub fn hop_count(&self) -> usize {
        self.control.visited.len()
    }

    /// Envelope for the next hop: `from` becomes the current `to`, `to`
    /// becomes `target`, type becomes `set`. Stanzas and routing history are
    /// carried over; `self` is left untouched.
    pub fn next_hop(&self, target: impl Into<String>) -> ClusterEnvelope {
        let mut next = self.clone();
        next.from = self.to.clone();
        next.to = Some(target.into());
        next.kind = Some(StanzaType::Set);
        next
    }

    /// Nodes announced as connected, `None` if the envelope carries none.
    pub fn connected_nodes(&self) -> Option<IndexSet<String>> {
        collapse(&self.control.connected)
    }

    /// Nodes announced as disconnected, `None` if the envelope carries none.
    pub fn disconnected_nodes(&self) -> Option<IndexSet<String>> {
        collapse(&self.control.disconnected)
    }

    pub fn add_connected_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.control.connected.extend(nodes.into_iter().map(Into::into));
    }

    pub fn add_disconnected_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.control.disconnected.extend(nodes.into_iter().map(Into::into));
    }

    /// Payload-less envelope carrying membership changes.
    pub fn is_membership_announcement(&self) -> bool {
        self.packets().is_empty()
            && !(self.control.connected.is_empty() && self.control.disconnected.is_empty())
    }
}

fn collapse(entries: &[String]) -> Option<IndexSet<String>> {
    if entries.is_empty() {
        None
    } else {
        Some(entries.iter().cloned().collect())
    }
}
