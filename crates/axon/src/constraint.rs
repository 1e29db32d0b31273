//! Relationship constraints.
//!
//! - [`registry`]: bounded cache of known containers and configuration nodes
//! - [`rules`]: per-kind relationship support and connection-time rejection
//! - [`monitor`]: observers that correct derived relationship state after changes

pub mod monitor;
pub mod registry;
pub mod rules;

pub use monitor::{ChangeObserver, NextLabelMonitor};
pub use registry::{BoundedIdSet, ElementRegistry, EvictionPolicy, InsertionOrder};
pub use rules::ConnectionError;
