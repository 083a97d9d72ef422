//! Built-in local handlers.

pub mod local_domain;

pub use local_domain::LocalDomainHandler;
