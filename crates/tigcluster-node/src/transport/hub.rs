use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use tigcluster_core::error::{ClusterError, Result};
use tigcluster_core::Element;

use crate::node::{ClusterNode, Outcome};

/// Hands a serialized envelope to the node it is addressed to.
#[async_trait]
pub trait EnvelopeSink: Send + Sync {
    async fn deliver(&self, to: &str, tree: Element) -> Result<()>;
}

/// In-process delivery: node jid -> inbound queue.
#[derive(Default)]
pub struct LocalHub {
    nodes: DashMap<String, mpsc::Sender<Element>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }

    /// Register a node and return its inbound queue. Re-attaching replaces the
    /// previous queue.
    pub fn attach(&self, jid: &str, capacity: usize) -> mpsc::Receiver<Element> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.nodes.insert(jid.to_string(), tx);
        rx
    }

    pub fn detach(&self, jid: &str) -> bool {
        self.nodes.remove(jid).is_some()
    }
}

#[async_trait]
impl EnvelopeSink for LocalHub {
    async fn deliver(&self, to: &str, tree: Element) -> Result<()> {
        // Clone the sender out so no map guard is held across the await.
        let tx = self
            .nodes
            .get(to)
            .map(|e| e.value().clone())
            .ok_or_else(|| ClusterError::UnknownNode(to.to_string()))?;
        tx.send(tree)
            .await
            .map_err(|_| ClusterError::Delivery(format!("{to} inbound queue closed")))
    }
}

/// What a node did with one inbound tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    pub node: String,
    pub outcome: Outcome,
}

/// Run a node's inbound loop until its queue closes.
///
/// Each tree is handled on its own task, so a node waiting on a full peer
/// queue never stops draining its own. Errors are logged per tree; they never
/// stop the loop. Once the queue closes, in-flight trees are awaited.
pub fn spawn_node(
    node: Arc<ClusterNode>,
    mut rx: mpsc::Receiver<Element>,
    events: Option<mpsc::UnboundedSender<NodeEvent>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                maybe_tree = rx.recv() => {
                    let Some(tree) = maybe_tree else { break; };
                    in_flight.spawn(handle_tree(Arc::clone(&node), tree, events.clone()));
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }
        while in_flight.join_next().await.is_some() {}
        tracing::debug!(node = %node.jid(), "inbound queue closed");
    })
}

async fn handle_tree(
    node: Arc<ClusterNode>,
    tree: Element,
    events: Option<mpsc::UnboundedSender<NodeEvent>>,
) {
    match node.handle_inbound(&tree).await {
        Ok(outcome) => {
            if let Some(events) = &events {
                let _ = events.send(NodeEvent {
                    node: node.jid().to_string(),
                    outcome,
                });
            }
        }
        Err(e) => {
            tracing::warn!(node = %node.jid(), code = e.code().as_str(), error = %e, "inbound envelope failed");
        }
    }
}
