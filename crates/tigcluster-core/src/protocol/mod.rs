//! Cluster wire protocol (`tigase:cluster`).
//!
//! ```text
//! <cluster xmlns="tigase:cluster" from="..." to="..." type="set">
//!   <data packet-from="origin-jid">...stanzas...</data>
//!   <control>
//!     <first-node>node-jid</first-node>
//!     <visited-nodes><node-id>node-jid</node-id>...</visited-nodes>
//!     <connected-node>peer-jid</connected-node>
//!     <disconnected-node>peer-jid</disconnected-node>
//!   </control>
//! </cluster>
//! ```
//!
//! - `envelope`: the value type and its codec (build / parse / serialize).
//! - `routing`: visited-node bookkeeping, next hop derivation and membership
//!   lists.
//!
//! If no node can process the stanza it goes back to the first node, which is
//! the node most likely to process it correctly.

pub mod envelope;
pub mod routing;

use std::fmt;

pub use envelope::{ClusterEnvelope, Control};

/// Cluster namespace.
pub const XMLNS: &str = "tigase:cluster";

pub const CLUSTER_EL_NAME: &str = "cluster";
pub const DATA_EL_NAME: &str = "data";
pub const CONTROL_EL_NAME: &str = "control";
pub const FIRST_NODE_EL_NAME: &str = "first-node";
pub const VISITED_NODES_EL_NAME: &str = "visited-nodes";
pub const NODE_ID_EL_NAME: &str = "node-id";
pub const CONNECTED_NODE_EL_NAME: &str = "connected-node";
pub const DISCONNECTED_NODE_EL_NAME: &str = "disconnected-node";
pub const PACKET_FROM_ATTR_NAME: &str = "packet-from";

pub const DATA_PATH: &str = "/cluster/data";
pub const CONTROL_PATH: &str = "/cluster/control";
pub const FIRST_NODE_PATH: &str = "/cluster/control/first-node";
pub const VISITED_NODES_PATH: &str = "/cluster/control/visited-nodes";

/// Envelope disposition (`type` attribute).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StanzaType {
    Get,
    /// Routing / forwarding attempt.
    Set,
    Result,
    Error,
    /// Unrecognized value, carried through untouched.
    Other(String),
}

impl StanzaType {
    pub fn as_str(&self) -> &str {
        match self {
            StanzaType::Get => "get",
            StanzaType::Set => "set",
            StanzaType::Result => "result",
            StanzaType::Error => "error",
            StanzaType::Other(s) => s,
        }
    }
}

impl From<&str> for StanzaType {
    fn from(s: &str) -> Self {
        match s {
            "get" => StanzaType::Get,
            "set" => StanzaType::Set,
            "result" => StanzaType::Result,
            "error" => StanzaType::Error,
            other => StanzaType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StanzaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
