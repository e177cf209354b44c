//! Link reconciliation.
//!
//! Turns the raw, per-observer connection records of a discovery run into
//! the list of unique physical links:
//!
//! 1. drop links that touch a management interface on either end;
//! 2. canonicalize both endpoint hostnames, dropping records where that is
//!    impossible;
//! 3. keep the first record for each unordered endpoint pair, so a link seen
//!    from both ends is reported once, from the end visited first.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};
use serde::Serialize;

use super::canonical::LinkKey;
use crate::discovery::types::ConnectionRecord;

/// Non-fatal problem found while reconciling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum Diagnostic {
    #[error("Cannot canonicalize link {source_hostname:?} ({source_ip}) -> {neighbor_id:?}; record dropped")]
    UncanonicalizableHostname {
        source_hostname: String,
        source_ip: String,
        neighbor_id: String,
    },
}

/// Result of reconciling one run's records
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Unique links in first-seen order
    pub links: Vec<ConnectionRecord>,
    /// Records removed because they touch a management interface
    pub management_filtered: usize,
    /// Records that were the same link seen again, usually from the far end
    pub duplicates: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// True when either end of `record` is a management interface
pub fn is_management_link(record: &ConnectionRecord, management_interfaces: &BTreeSet<String>) -> bool {
    management_interfaces.contains(&record.local_interface)
        || management_interfaces.contains(&record.remote_port)
}

/// Filter, canonicalize and deduplicate connection records.
///
/// Records are processed in the order given, which for a discovery run is
/// traversal order.
pub fn reconcile(
    records: &[ConnectionRecord],
    management_interfaces: &BTreeSet<String>,
) -> Reconciliation {
    let mut result = Reconciliation::default();
    let mut seen: HashSet<LinkKey> = HashSet::new();

    for record in records {
        if is_management_link(record, management_interfaces) {
            debug!(
                "Skipping management link {} {} -> {} {}",
                record.source_hostname, record.local_interface, record.neighbor_id, record.remote_port
            );
            result.management_filtered += 1;
            continue;
        }

        let Some(key) = LinkKey::between(&record.source_hostname, &record.neighbor_id) else {
            let diagnostic = Diagnostic::UncanonicalizableHostname {
                source_hostname: record.source_hostname.clone(),
                source_ip: record.source_ip.clone(),
                neighbor_id: record.neighbor_id.clone(),
            };
            warn!("{}", diagnostic);
            result.diagnostics.push(diagnostic);
            continue;
        };

        if seen.insert(key) {
            result.links.push(record.clone());
        } else {
            result.duplicates += 1;
        }
    }

    info!(
        "Reconciled {} records into {} unique links ({} management, {} duplicates, {} dropped)",
        records.len(),
        result.links.len(),
        result.management_filtered,
        result.duplicates,
        result.diagnostics.len()
    );

    result
}
