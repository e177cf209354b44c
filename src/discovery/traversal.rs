//! Traversal state for one discovery run.
//!
//! Queue, visited set, records and failures live in a single owned value so
//! that only one place ever mutates them. Workers (if any) only return
//! probe results; the coordinator applies them here.

use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};

use super::types::{
    ConnectionRecord, DefaultCredentials, DeviceDescriptor, DeviceFailure, DiscoveryRun,
};
use crate::gateway::SessionError;
use crate::neighbor_parser::NeighborRecord;

/// What a successful visit to one device produced
#[derive(Debug, Clone)]
pub struct DeviceProbe {
    /// Self-reported hostname from the prompt
    pub hostname: String,
    pub neighbors: Vec<NeighborRecord>,
}

#[derive(Debug)]
pub struct Traversal {
    queue: VecDeque<DeviceDescriptor>,
    visited: HashSet<String>,
    records: Vec<ConnectionRecord>,
    failures: Vec<DeviceFailure>,
    defaults: DefaultCredentials,
}

impl Traversal {
    /// Seed the queue in inventory order
    pub fn new(seeds: Vec<DeviceDescriptor>, defaults: DefaultCredentials) -> Self {
        Self {
            queue: seeds.into(),
            visited: HashSet::new(),
            records: Vec::new(),
            failures: Vec::new(),
            defaults,
        }
    }

    pub fn is_visited(&self, host: &str) -> bool {
        self.visited.contains(host)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn records(&self) -> &[ConnectionRecord] {
        &self.records
    }

    /// Pop the next descriptor whose host has not been processed yet.
    ///
    /// Entries for visited hosts are discarded here rather than at enqueue.
    pub fn next_unvisited(&mut self) -> Option<DeviceDescriptor> {
        while let Some(descriptor) = self.queue.pop_front() {
            if self.is_visited(descriptor.host()) {
                debug!(
                    "Device {} ({}) already visited, skipping",
                    descriptor.name,
                    descriptor.host()
                );
                continue;
            }
            return Some(descriptor);
        }
        None
    }

    /// Drain the current breadth level.
    ///
    /// Visited hosts are skipped and a host queued twice in the same level is
    /// kept only at its first position, so applying the level's results in
    /// order matches a sequential run.
    pub fn take_level(&mut self) -> Vec<DeviceDescriptor> {
        let mut in_level = HashSet::new();
        let mut level = Vec::with_capacity(self.queue.len());
        while let Some(descriptor) = self.next_unvisited() {
            if in_level.insert(descriptor.host().to_string()) {
                level.push(descriptor);
            } else {
                debug!("Device {} queued twice in one level, skipping", descriptor.host());
            }
        }
        level
    }

    fn mark_visited(&mut self, host: &str) -> bool {
        self.visited.insert(host.to_string())
    }

    /// Fold the outcome of visiting `descriptor` into the run state
    pub fn apply(&mut self, descriptor: DeviceDescriptor, outcome: Result<DeviceProbe, SessionError>) {
        match outcome {
            Ok(probe) => self.apply_probe(&descriptor, probe),
            Err(error) => self.apply_failure(descriptor, error),
        }
    }

    fn apply_failure(&mut self, descriptor: DeviceDescriptor, error: SessionError) {
        warn!("Failed to process device {} ({}): {}", descriptor.name, descriptor.host(), error);
        self.mark_visited(descriptor.host());
        self.failures.push(DeviceFailure {
            host: descriptor.host().to_string(),
            name: descriptor.name,
            error,
        });
    }

    fn apply_probe(&mut self, descriptor: &DeviceDescriptor, probe: DeviceProbe) {
        info!("Device {} identified as '{}'", descriptor.host(), probe.hostname);
        self.mark_visited(descriptor.host());

        info!("{} neighbors reported by '{}'", probe.neighbors.len(), probe.hostname);
        for neighbor in &probe.neighbors {
            self.records
                .push(ConnectionRecord::observed(descriptor, &probe.hostname, neighbor));

            if let Some(ip) = neighbor.neighbor_ip.as_deref() {
                if !self.is_visited(ip) {
                    info!("New neighbor found: {} ({}), adding to queue", neighbor.neighbor_id, ip);
                    let next = self.defaults.descriptor_for(neighbor, ip);
                    self.queue.push_back(next);
                }
            }
        }
    }

    pub fn finish(self) -> DiscoveryRun {
        DiscoveryRun {
            visited: self.visited.len(),
            records: self.records,
            failures: self.failures,
        }
    }
}
