//! tigcluster node runtime.
//!
//! This crate wires config, the cluster membership view, forwarding policies,
//! local stanza handlers and envelope delivery into a cluster node. It is
//! consumed by the simulator binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cluster;
pub mod config;
pub mod dispatch;
pub mod membership;
pub mod node;
pub mod obs;
pub mod policy;
pub mod services;
pub mod transport;

pub use cluster::LocalCluster;
pub use node::{ClusterNode, Outcome};
