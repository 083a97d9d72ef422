//! Forwarding policy layer.
//!
//! A policy only picks which peer to try next. The contract around it
//! (never offer a visited node, mark the local node before every hop, fall
//! back to the first node once nothing is left) lives in `plan` so no policy
//! can skip it.

pub mod forwarding;
pub mod plan;

pub use forwarding::{by_name, FirstUnvisited, ForwardingPolicy, RoundRobin, FIRST_UNVISITED, POLICY_NAMES, ROUND_ROBIN};
pub use plan::{plan_next_hop, HopPlan};
