//! Envelope delivery between nodes.
//!
//! Socket transport is outside this crate; `LocalHub` moves wire trees over
//! in-process channels so whole clusters can run inside one process.

pub mod codec;
pub mod hub;

pub use codec::{decode, Inbound};
pub use hub::{spawn_node, EnvelopeSink, LocalHub, NodeEvent};
