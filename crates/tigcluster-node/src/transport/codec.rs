//! Decode-once codec for inbound cluster trees.
//!
//! - Membership announcements are surfaced separately from routed envelopes
//! - Anything outside `tigase:cluster` is rejected as malformed

use tigcluster_core::error::Result;
use tigcluster_core::{ClusterEnvelope, Element};

#[derive(Debug)]
pub enum Inbound {
    /// Stanzas to handle or forward.
    Routed(ClusterEnvelope),
    /// Peer join/leave notice, no stanzas.
    Membership(ClusterEnvelope),
}

pub fn decode(tree: &Element) -> Result<Inbound> {
    let env = ClusterEnvelope::parse(tree)?;
    if env.is_membership_announcement() {
        Ok(Inbound::Membership(env))
    } else {
        Ok(Inbound::Routed(env))
    }
}
