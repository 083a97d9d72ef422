//! Cluster node: local handling first, then hop-by-hop forwarding.
//!
//! Per inbound envelope:
//! - membership announcement -> update the cluster view
//! - `set` -> offer stanzas to local handlers; the ones nobody here takes
//!   are forwarded to an unvisited peer (this node marked visited), or back
//!   to the first node
//! - `set` arriving back at its first node -> final local attempt, never
//!   forwarded again
//! - other types (replies) -> local handlers only
//! - addressed to another node -> dropped

use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;

use tigcluster_core::error::{ClusterError, Result};
use tigcluster_core::{ClusterEnvelope, Element, Packet, StanzaType};

use crate::config::NodeConfig;
use crate::dispatch::{Dispatcher, Handled};
use crate::membership::{ClusterView, MembershipChange};
use crate::obs::NodeMetrics;
use crate::policy::{self, plan_next_hop, FirstUnvisited, ForwardingPolicy, HopPlan};
use crate::transport::{decode, EnvelopeSink, Inbound};

/// What happened to one envelope on this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A local handler took the stanzas.
    Consumed,
    /// Sent on to an unvisited peer.
    Forwarded { to: String },
    /// Every peer was tried; sent back to the first node.
    FellBack { to: String },
    /// Back on the first node with nobody able to take it. Final disposition
    /// belongs to the caller.
    Returned { envelope: ClusterEnvelope },
    /// Membership announcement applied to the cluster view.
    Membership(MembershipChange),
    /// Reply nobody here wanted.
    Dropped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Consumed => "consumed",
            Outcome::Forwarded { .. } => "forwarded",
            Outcome::FellBack { .. } => "fell_back",
            Outcome::Returned { .. } => "returned",
            Outcome::Membership(_) => "membership",
            Outcome::Dropped => "dropped",
        }
    }
}

pub struct ClusterNode {
    jid: String,
    cluster_mode: bool,
    max_hops: usize,
    view: ClusterView,
    dispatcher: Dispatcher,
    policy: Arc<dyn ForwardingPolicy>,
    sink: Arc<dyn EnvelopeSink>,
    metrics: Arc<NodeMetrics>,
}

impl ClusterNode {
    pub fn new(jid: impl Into<String>, sink: Arc<dyn EnvelopeSink>) -> Self {
        let jid = jid.into();
        Self {
            view: ClusterView::new(jid.clone()),
            jid,
            cluster_mode: true,
            max_hops: 0,
            dispatcher: Dispatcher::new(),
            policy: Arc::new(FirstUnvisited),
            sink,
            metrics: Arc::new(NodeMetrics::default()),
        }
    }

    /// Node with peers, policy and limits taken from config.
    pub fn from_config(cfg: &NodeConfig, sink: Arc<dyn EnvelopeSink>) -> Result<Self> {
        let policy = policy::by_name(&cfg.cluster.policy).ok_or_else(|| {
            ClusterError::BadRequest(format!("unknown forwarding policy: {}", cfg.cluster.policy))
        })?;

        let node = Self::new(cfg.node.jid.clone(), sink)
            .with_policy(policy)
            .with_max_hops(cfg.cluster.max_hops)
            .with_cluster_mode(cfg.cluster.mode);

        if cfg.cluster.mode {
            for peer in &cfg.cluster.peers {
                node.view.add(&peer.jid);
            }
        } else {
            tracing::info!(node = %node.jid, "cluster mode is off, peers ignored");
        }
        node.record_peers();
        Ok(node)
    }

    pub fn with_policy(mut self, policy: Arc<dyn ForwardingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_cluster_mode(mut self, on: bool) -> Self {
        self.cluster_mode = on;
        self
    }

    pub fn jid(&self) -> &str {
        &self.jid
    }

    pub fn view(&self) -> &ClusterView {
        &self.view
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn metrics(&self) -> Arc<NodeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Entry point for a stanza produced on this node: handle it locally if
    /// possible, otherwise start a cluster routing attempt.
    pub async fn submit(&self, packet: Packet) -> Result<Outcome> {
        let env = ClusterEnvelope::build(self.jid.as_str(), self.jid.as_str(), StanzaType::Set, Some(packet));
        match self.dispatch_local(&env).await? {
            None => Ok(self.finish(Outcome::Consumed)),
            Some(rest) => self.forward(&rest).await,
        }
    }

    /// Start a routing attempt for a stanza this node cannot service.
    pub async fn route(&self, packet: Packet) -> Result<Outcome> {
        let env = ClusterEnvelope::build(self.jid.as_str(), self.jid.as_str(), StanzaType::Set, Some(packet));
        self.forward(&env).await
    }

    /// Decode and process one tree received from the cluster.
    pub async fn handle_inbound(&self, tree: &Element) -> Result<Outcome> {
        match decode(tree) {
            Ok(Inbound::Membership(env)) => Ok(self.apply_membership(&env)),
            Ok(Inbound::Routed(env)) => self.handle_envelope(env).await,
            Err(e) => {
                tracing::warn!(node = %self.jid, error = %e, "dropping malformed cluster envelope");
                self.metrics.errors.inc(&[("code", e.code().as_str())]);
                Err(e)
            }
        }
    }

    pub async fn handle_envelope(&self, env: ClusterEnvelope) -> Result<Outcome> {
        if env.is_membership_announcement() {
            return Ok(self.apply_membership(&env));
        }
        if let Some(to) = env.to().filter(|to| *to != self.jid) {
            tracing::warn!(node = %self.jid, to = %to, from = ?env.from(), "dropping envelope addressed to another node");
            return Ok(self.finish(Outcome::Dropped));
        }

        if env.kind() != Some(&StanzaType::Set) {
            let outcome = match self.dispatch_local(&env).await? {
                Some(rest) if rest.packets().len() == env.packets().len() => {
                    tracing::debug!(node = %self.jid, kind = ?env.kind(), "no local handler for reply");
                    Outcome::Dropped
                }
                _ => Outcome::Consumed,
            };
            return Ok(self.finish(outcome));
        }

        let Some(rest) = self.dispatch_local(&env).await? else {
            return Ok(self.finish(Outcome::Consumed));
        };

        // Came back to where it started: nobody in the cluster took it.
        if rest.first_node() == Some(self.jid.as_str()) && rest.is_visited(&self.jid) {
            tracing::info!(
                node = %self.jid,
                hops = rest.hop_count(),
                packet_from = ?rest.packet_from(),
                "routing attempt returned to first node"
            );
            return Ok(self.finish(Outcome::Returned { envelope: rest }));
        }

        self.forward(&rest).await
    }

    /// Tell every reachable peer that this node joined. Returns how many
    /// peers were notified.
    pub async fn announce_join(&self) -> Result<usize> {
        let jid = self.jid.clone();
        self.broadcast_membership(vec![jid], Vec::new()).await
    }

    /// Drop `peer` from the local view and tell the remaining peers.
    pub async fn announce_leave(&self, peer: &str) -> Result<usize> {
        if self.view.remove(peer) {
            self.record_peers();
        }
        self.broadcast_membership(Vec::new(), vec![peer.to_string()]).await
    }

    async fn broadcast_membership(
        &self,
        connected: Vec<String>,
        disconnected: Vec<String>,
    ) -> Result<usize> {
        let peers = self.view.reachable();
        let mut futs = FuturesUnordered::new();
        for peer in peers {
            let env = ClusterEnvelope::membership_announcement(
                self.jid.as_str(),
                peer.as_str(),
                StanzaType::Set,
                connected.iter().cloned(),
                disconnected.iter().cloned(),
            );
            futs.push(async move {
                let res = self.sink.deliver(&peer, env.to_element()).await;
                (peer, res)
            });
        }

        let mut notified = 0;
        while let Some((peer, res)) = futs.next().await {
            match res {
                Ok(()) => notified += 1,
                Err(e) => {
                    tracing::warn!(node = %self.jid, peer = %peer, error = %e, "membership announcement not delivered");
                    self.metrics.errors.inc(&[("code", e.code().as_str())]);
                }
            }
        }
        Ok(notified)
    }

    fn apply_membership(&self, env: &ClusterEnvelope) -> Outcome {
        let change = self.view.apply(env);
        if !change.is_empty() {
            tracing::info!(
                node = %self.jid,
                from = ?env.from(),
                connected = ?change.connected,
                disconnected = ?change.disconnected,
                "cluster membership changed"
            );
            self.record_peers();
        }
        self.finish(Outcome::Membership(change))
    }

    async fn forward(&self, env: &ClusterEnvelope) -> Result<Outcome> {
        let reachable = if self.cluster_mode {
            self.view.reachable()
        } else {
            Vec::new()
        };

        let plan = plan_next_hop(self.policy.as_ref(), env, &self.jid, &reachable, self.max_hops);
        let target = plan.target().to_string();

        let outcome = match plan {
            HopPlan::Fallback(next) if target == self.jid => {
                tracing::info!(node = %self.jid, "no cluster node could take the stanza");
                Outcome::Returned { envelope: next }
            }
            HopPlan::Fallback(next) => {
                self.send(&target, &next).await?;
                tracing::info!(node = %self.jid, to = %target, hops = next.hop_count(), "fell back to first node");
                Outcome::FellBack { to: target }
            }
            HopPlan::Forward(next) => {
                self.send(&target, &next).await?;
                Outcome::Forwarded { to: target }
            }
        };
        Ok(self.finish(outcome))
    }

    async fn send(&self, to: &str, env: &ClusterEnvelope) -> Result<()> {
        if let Err(e) = self.sink.deliver(to, env.to_element()).await {
            tracing::warn!(node = %self.jid, to = %to, error = %e, "cluster delivery failed");
            self.metrics.errors.inc(&[("code", e.code().as_str())]);
            return Err(e);
        }
        Ok(())
    }

    /// Offer the stanzas to local handlers. Returns the envelope narrowed to
    /// the stanzas nobody here took, or `None` once every stanza is taken.
    async fn dispatch_local(&self, env: &ClusterEnvelope) -> Result<Option<ClusterEnvelope>> {
        let started = Instant::now();
        let verdicts = self.dispatcher.dispatch_all(env).await?;
        for packet in env.packets() {
            self.metrics
                .local_dispatch_duration
                .observe(&[("stanza", packet.name())], started.elapsed());
        }

        let declined = verdicts.iter().filter(|v| **v == Handled::Declined).count();
        if declined == 0 {
            return Ok(None);
        }
        let mut rest = env.clone();
        if declined < verdicts.len() {
            tracing::debug!(node = %self.jid, accepted = verdicts.len() - declined, declined, "stanzas partly taken locally");
            let mut verdicts = verdicts.into_iter();
            rest.retain_packets(|_| verdicts.next() == Some(Handled::Declined));
        }
        Ok(Some(rest))
    }

    fn finish(&self, outcome: Outcome) -> Outcome {
        self.metrics.envelopes.inc(&[("outcome", outcome.as_str())]);
        outcome
    }

    fn record_peers(&self) {
        self.metrics.reachable_peers.set(self.view.len() as i64);
    }
}
