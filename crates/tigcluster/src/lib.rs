//! Top-level facade crate for tigcluster.
//!
//! Re-exports the envelope core and the node runtime so users can depend on a single crate.

pub mod core {
    pub use tigcluster_core::*;
}

pub mod node {
    pub use tigcluster_node::*;
}
