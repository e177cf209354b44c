//! Discovery engine.
//!
//! Seeds the traversal queue from the inventory, visits each device through
//! a [`crate::gateway::DeviceGateway`], parses its neighbor table and queues
//! every neighbor not yet visited. The run ends when the queue is empty.

pub mod engine;
pub mod traversal;
pub mod types;

pub use engine::{probe_device, DiscoveryEngine, DiscoveryOptions};
pub use traversal::{DeviceProbe, Traversal};
pub use types::{
    ConnectionParams, ConnectionRecord, DefaultCredentials, DeviceDescriptor, DeviceFailure,
    DiscoveryError, DiscoveryRun, DEFAULT_NEIGHBOR_COMMAND,
};
