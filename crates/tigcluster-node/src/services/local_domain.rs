use async_trait::async_trait;

use tigcluster_core::error::Result;
use tigcluster_core::{jid, ClusterEnvelope, Element};

use crate::dispatch::{Handled, PacketHandler};

/// Stanza names a domain handler is registered for.
pub const STANZAS: [&str; 3] = ["message", "presence", "iq"];

/// Accepts stanzas addressed to one of this node's hostnames.
pub struct LocalDomainHandler {
    hostnames: Vec<String>,
}

impl LocalDomainHandler {
    pub fn new(hostnames: Vec<String>) -> Self {
        Self { hostnames }
    }

    pub fn serves(&self, addr: &str) -> bool {
        let domain = jid::domain(addr);
        self.hostnames.iter().any(|h| h == domain)
    }
}

#[async_trait]
impl PacketHandler for LocalDomainHandler {
    fn name(&self) -> &'static str {
        "local-domain"
    }

    async fn handle(&self, envelope: &ClusterEnvelope, packet: &Element) -> Result<Handled> {
        let Some(to) = packet.attr("to") else {
            return Ok(Handled::Declined);
        };
        if !self.serves(to) {
            return Ok(Handled::Declined);
        }
        tracing::info!(
            stanza = packet.name(),
            to = %to,
            packet_from = envelope.packet_from().unwrap_or("unknown"),
            hops = envelope.hop_count(),
            "delivered locally"
        );
        Ok(Handled::Accepted)
    }
}
