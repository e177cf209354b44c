//! Breadth-first discovery over device sessions.

use log::info;
use rayon::prelude::*;

use super::traversal::{DeviceProbe, Traversal};
use super::types::{
    DefaultCredentials, DeviceDescriptor, DiscoveryError, DiscoveryRun, DEFAULT_NEIGHBOR_COMMAND,
};
use crate::gateway::{hostname_from_prompt, DeviceGateway, DeviceSession, SessionError};
use crate::neighbor_parser::parse_neighbors;

/// Settings fixed for the lifetime of an engine
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Command whose output lists link-layer neighbors
    pub neighbor_command: String,
    /// Credentials for discovered neighbors; `None` means the first seed's
    pub default_credentials: Option<DefaultCredentials>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            neighbor_command: DEFAULT_NEIGHBOR_COMMAND.to_string(),
            default_credentials: None,
        }
    }
}

pub struct DiscoveryEngine<G> {
    gateway: G,
    options: DiscoveryOptions,
}

impl<G: DeviceGateway> DiscoveryEngine<G> {
    pub fn new(gateway: G, options: DiscoveryOptions) -> Self {
        Self { gateway, options }
    }

    fn start(&self, seeds: Vec<DeviceDescriptor>) -> Result<Traversal, DiscoveryError> {
        if seeds.is_empty() {
            return Err(DiscoveryError::NoSeeds);
        }
        let defaults = match &self.options.default_credentials {
            Some(defaults) => defaults.clone(),
            None => DefaultCredentials::from_first_seed(&seeds).ok_or(DiscoveryError::NoSeeds)?,
        };
        info!("Starting discovery from {} seed devices", seeds.len());
        Ok(Traversal::new(seeds, defaults))
    }

    /// Visit every reachable device one at a time, in FIFO order.
    ///
    /// A device that cannot be reached or fails mid-session is recorded as a
    /// failure and never aborts the run.
    pub fn run(&self, seeds: Vec<DeviceDescriptor>) -> Result<DiscoveryRun, DiscoveryError> {
        let mut traversal = self.start(seeds)?;

        while let Some(descriptor) = traversal.next_unvisited() {
            info!("Processing device: {} ({})", descriptor.name, descriptor.host());
            let outcome = probe_device(&self.gateway, &descriptor, &self.options.neighbor_command);
            traversal.apply(descriptor, outcome);
        }

        let run = traversal.finish();
        info!(
            "Discovery complete: {} devices visited, {} connections found, {} failures",
            run.visited,
            run.records.len(),
            run.failures.len()
        );
        Ok(run)
    }
}

impl<G> DiscoveryEngine<G>
where
    G: DeviceGateway + Sync,
{
    /// Visit devices one breadth level at a time on up to `jobs` workers.
    ///
    /// Each level is probed in parallel, then its results are applied in
    /// queue order, so the records and their order match [`Self::run`].
    /// `jobs == 0` lets rayon pick the worker count.
    pub fn run_parallel(
        &self,
        seeds: Vec<DeviceDescriptor>,
        jobs: usize,
    ) -> Result<DiscoveryRun, DiscoveryError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| DiscoveryError::WorkerPool(e.to_string()))?;

        let mut traversal = self.start(seeds)?;
        let mut depth = 0usize;

        loop {
            let level = traversal.take_level();
            if level.is_empty() {
                break;
            }
            info!("Processing depth {} ({} devices)", depth, level.len());

            let command = self.options.neighbor_command.as_str();
            let outcomes: Vec<Result<DeviceProbe, SessionError>> = pool.install(|| {
                level
                    .par_iter()
                    .map(|descriptor| probe_device(&self.gateway, descriptor, command))
                    .collect()
            });

            for (descriptor, outcome) in level.into_iter().zip(outcomes) {
                traversal.apply(descriptor, outcome);
            }
            depth += 1;
        }

        let run = traversal.finish();
        info!(
            "Discovery complete: {} devices visited, {} connections found, {} failures",
            run.visited,
            run.records.len(),
            run.failures.len()
        );
        Ok(run)
    }
}

/// Closes the wrapped session when dropped, including while unwinding.
struct SessionGuard<S: DeviceSession>(S);

impl<S: DeviceSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Open a session to one device, interrogate it and close the session.
///
/// The session is closed whether or not interrogation succeeds.
pub fn probe_device<G: DeviceGateway>(
    gateway: &G,
    descriptor: &DeviceDescriptor,
    neighbor_command: &str,
) -> Result<DeviceProbe, SessionError> {
    let mut session = SessionGuard(gateway.open(&descriptor.params)?);
    interrogate(&mut session.0, neighbor_command)
}

fn interrogate<S: DeviceSession>(
    session: &mut S,
    neighbor_command: &str,
) -> Result<DeviceProbe, SessionError> {
    session.escalate_privilege()?;
    let hostname = hostname_from_prompt(&session.identify()?);
    let output = session.execute(neighbor_command)?;
    let neighbors = parse_neighbors(&output).collect();
    Ok(DeviceProbe { hostname, neighbors })
}
