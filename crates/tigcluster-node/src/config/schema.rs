use std::collections::HashSet;

use serde::Deserialize;
use tigcluster_core::error::{ClusterError, Result};

use crate::policy;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub version: u32,

    pub node: NodeSection,

    #[serde(default)]
    pub cluster: ClusterSection,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ClusterError::UnsupportedVersion);
        }
        if self.node.jid.trim().is_empty() {
            return Err(ClusterError::BadRequest("node.jid must not be empty".into()));
        }

        self.cluster.validate(&self.node.jid)?;

        Ok(())
    }

    /// Config as seen from `peer`: that peer becomes the local node and every
    /// other member (including this one) becomes a peer.
    pub fn for_peer(&self, peer: &PeerConfig) -> NodeConfig {
        let mut peers = vec![PeerConfig {
            jid: self.node.jid.clone(),
            hostnames: self.node.hostnames.clone(),
        }];
        peers.extend(self.cluster.peers.iter().filter(|p| p.jid != peer.jid).cloned());

        NodeConfig {
            version: self.version,
            node: NodeSection {
                jid: peer.jid.clone(),
                hostnames: peer.hostnames.clone(),
            },
            cluster: ClusterSection {
                peers,
                ..self.cluster.clone()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSection {
    /// Cluster address of this node.
    pub jid: String,

    /// Domains whose stanzas this node delivers locally.
    #[serde(default)]
    pub hostnames: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSection {
    /// When off, peers are ignored and routing falls back to this node.
    #[serde(default = "default_mode")]
    pub mode: bool,

    #[serde(default = "default_policy")]
    pub policy: String,

    /// 0 means bounded only by cluster size.
    #[serde(default)]
    pub max_hops: usize,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            policy: default_policy(),
            max_hops: 0,
            queue_capacity: default_queue_capacity(),
            peers: Vec::new(),
        }
    }
}

impl ClusterSection {
    pub fn validate(&self, local_jid: &str) -> Result<()> {
        if policy::by_name(&self.policy).is_none() {
            return Err(ClusterError::BadRequest(format!(
                "cluster.policy must be one of {:?}, got {}",
                policy::POLICY_NAMES,
                self.policy
            )));
        }
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(ClusterError::BadRequest(
                "cluster.queue_capacity must be between 1 and 65536".into(),
            ));
        }

        let mut seen = HashSet::new();
        for peer in &self.peers {
            if peer.jid.trim().is_empty() {
                return Err(ClusterError::BadRequest("cluster.peers[].jid must not be empty".into()));
            }
            if peer.jid == local_jid {
                return Err(ClusterError::BadRequest(format!(
                    "cluster.peers must not contain the local node ({local_jid})"
                )));
            }
            if !seen.insert(peer.jid.as_str()) {
                return Err(ClusterError::BadRequest(format!(
                    "cluster.peers contains {} twice",
                    peer.jid
                )));
            }
        }
        Ok(())
    }
}

fn default_mode() -> bool {
    true
}
fn default_policy() -> String {
    policy::FIRST_UNVISITED.into()
}
fn default_queue_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerConfig {
    pub jid: String,
    #[serde(default)]
    pub hostnames: Vec<String>,
}
