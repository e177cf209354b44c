//! Link reconciliation.
//!
//! This module turns the raw connection records of a discovery run into a
//! deduplicated list of undirected links between canonical device names.

pub mod canonical;
pub mod reconcile;

// Re-export key types and functions for easier access
pub use canonical::{canonical_hostname, LinkKey};
pub use reconcile::{is_management_link, reconcile, Diagnostic, Reconciliation};
