//! A whole cluster running in one process over a [`LocalHub`].
//!
//! Every member gets a [`LocalDomainHandler`] for its configured hostnames,
//! so a stanza is accepted by whichever node serves the recipient's domain.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tigcluster_core::error::Result;

use crate::config::NodeConfig;
use crate::node::ClusterNode;
use crate::services::{local_domain, LocalDomainHandler};
use crate::transport::{spawn_node, LocalHub, NodeEvent};

pub struct LocalCluster {
    hub: Arc<LocalHub>,
    nodes: Vec<Arc<ClusterNode>>,
    tasks: Vec<JoinHandle<()>>,
    events: mpsc::UnboundedReceiver<NodeEvent>,
}

impl LocalCluster {
    /// Start the local node of `cfg` and every configured peer.
    /// Must be called from within a tokio runtime.
    pub fn start(cfg: &NodeConfig) -> Result<Self> {
        let hub = Arc::new(LocalHub::new());
        let (events_tx, events) = mpsc::unbounded_channel();

        let mut members = vec![cfg.clone()];
        members.extend(cfg.cluster.peers.iter().map(|p| cfg.for_peer(p)));

        let mut nodes = Vec::with_capacity(members.len());
        let mut tasks = Vec::with_capacity(members.len());
        for member in &members {
            let node = Arc::new(build_node(member, Arc::clone(&hub))?);
            let rx = hub.attach(node.jid(), member.cluster.queue_capacity);
            tasks.push(spawn_node(Arc::clone(&node), rx, Some(events_tx.clone())));
            tracing::debug!(node = %node.jid(), peers = node.view().len(), "cluster node started");
            nodes.push(node);
        }

        Ok(Self {
            hub,
            nodes,
            tasks,
            events,
        })
    }

    /// The node the config describes (as opposed to its peers).
    pub fn local(&self) -> &Arc<ClusterNode> {
        &self.nodes[0]
    }

    pub fn node(&self, jid: &str) -> Option<&Arc<ClusterNode>> {
        self.nodes.iter().find(|n| n.jid() == jid)
    }

    pub fn nodes(&self) -> &[Arc<ClusterNode>] {
        &self.nodes
    }

    pub fn hub(&self) -> Arc<LocalHub> {
        Arc::clone(&self.hub)
    }

    /// Next outcome reported by any member's inbound loop.
    pub async fn next_event(&mut self) -> Option<NodeEvent> {
        self.events.recv().await
    }

    /// Close every inbound queue and wait for the loops to finish.
    pub async fn stop(self) {
        for node in &self.nodes {
            self.hub.detach(node.jid());
        }
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

fn build_node(cfg: &NodeConfig, hub: Arc<LocalHub>) -> Result<ClusterNode> {
    let node = ClusterNode::from_config(cfg, hub)?;
    let handler = Arc::new(LocalDomainHandler::new(cfg.node.hostnames.clone()));
    for stanza in local_domain::STANZAS {
        node.dispatcher().register(stanza, handler.clone());
    }
    Ok(node)
}
