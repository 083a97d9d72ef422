//! tigcluster core: transport-agnostic cluster envelope primitives.
//!
//! This crate defines the wire-level contract nodes use to relay stanzas to
//! each other: the XML tree the envelope is carried in, the opaque stanza
//! payload, the envelope codec and the routing metadata rules. It carries no
//! runtime or transport dependencies so it can be reused by any node runtime.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `ClusterError`/`Result` so a malformed
//! inbound envelope never takes a node down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod jid;
pub mod protocol;
pub mod stanza;
pub mod xml;

/// Shared result type.
pub use error::{ClusterError, Result};
pub use protocol::{ClusterEnvelope, StanzaType};
pub use stanza::Packet;
pub use xml::Element;
