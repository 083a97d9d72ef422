//! Node config loader (strict parsing).

pub mod schema;

use std::fs;

use tigcluster_core::error::{ClusterError, Result};

pub use schema::{ClusterSection, NodeConfig, NodeSection, PeerConfig};

pub fn load_from_file(path: &str) -> Result<NodeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ClusterError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<NodeConfig> {
    let cfg: NodeConfig = serde_yaml::from_str(s)
        .map_err(|e| ClusterError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
