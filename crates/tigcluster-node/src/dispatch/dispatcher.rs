use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use tigcluster_core::error::Result;
use tigcluster_core::{ClusterEnvelope, Element};

/// Result of offering a stanza to local handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Delivered or processed on this node.
    Accepted,
    /// Not for this node; the cluster should try elsewhere.
    Declined,
}

/// Local stanza handler (session manager, component, ...).
#[async_trait]
pub trait PacketHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, envelope: &ClusterEnvelope, packet: &Element) -> Result<Handled>;
}

/// Registry of local handlers keyed by stanza element name
/// (`message`, `presence`, `iq`, ...).
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<String, Arc<dyn PacketHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, stanza: &str, handler: Arc<dyn PacketHandler>) {
        self.handlers.insert(stanza.to_string(), handler);
    }

    /// Offer one stanza to its handler. No handler means declined.
    pub async fn dispatch(&self, envelope: &ClusterEnvelope, packet: &Element) -> Result<Handled> {
        let Some(handler) = self.handlers.get(packet.name()).map(|e| e.value().clone()) else {
            return Ok(Handled::Declined);
        };
        handler.handle(envelope, packet).await
    }

    /// Offer every stanza of the envelope, in order. The verdicts line up
    /// with `envelope.packets()`.
    pub async fn dispatch_all(&self, envelope: &ClusterEnvelope) -> Result<Vec<Handled>> {
        let mut verdicts = Vec::with_capacity(envelope.packets().len());
        for packet in envelope.packets() {
            verdicts.push(self.dispatch(envelope, packet).await?);
        }
        Ok(verdicts)
    }
}
