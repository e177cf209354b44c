//! Core data types for the discovery run.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gateway::SessionError;
use crate::neighbor_parser::NeighborRecord;

/// Default SSH port when the inventory does not name one
pub const DEFAULT_PORT: u16 = 22;

/// Default device-type hint handed to the gateway
pub const DEFAULT_DEVICE_TYPE: &str = "cisco_ios";

/// Command that lists link-layer neighbors on Cisco-style devices
pub const DEFAULT_NEIGHBOR_COMMAND: &str = "show cdp neighbors detail";

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_device_type() -> String {
    DEFAULT_DEVICE_TYPE.to_string()
}

/// Everything a gateway needs to open a session to one device
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionParams {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Enable secret used for privilege escalation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default = "default_device_type")]
    pub device_type: String,
    /// Per-call timeout enforced by the gateway
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("device_type", &self.device_type)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A unit of work in the traversal queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Display label: the inventory name, or the advertised id for discovered neighbors
    pub name: String,
    /// Platform string reported in `source_platform` when this device is visited
    pub platform: Option<String>,
    pub params: ConnectionParams,
}

impl DeviceDescriptor {
    /// Address used to reach the device; the visited-set key
    pub fn host(&self) -> &str {
        &self.params.host
    }

    /// Platform label used for records sourced at this device
    pub fn source_platform(&self) -> &str {
        self.platform.as_deref().unwrap_or(&self.name)
    }
}

/// Credentials applied to every neighbor discovered during a run.
///
/// Captured once at run start and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCredentials(ConnectionParams);

impl DefaultCredentials {
    pub fn new(params: ConnectionParams) -> Self {
        Self(params)
    }

    /// Credentials of the first seed descriptor, if any
    pub fn from_first_seed(seeds: &[DeviceDescriptor]) -> Option<Self> {
        seeds.first().map(|seed| Self(seed.params.clone()))
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.0
    }

    /// Build the queue entry for a neighbor reachable at `ip`.
    ///
    /// Only `host` and `name` differ from the default credentials.
    pub fn descriptor_for(&self, neighbor: &NeighborRecord, ip: &str) -> DeviceDescriptor {
        let mut params = self.0.clone();
        params.host = ip.to_string();
        DeviceDescriptor {
            name: neighbor.neighbor_id.clone(),
            platform: neighbor.neighbor_platform.clone(),
            params,
        }
    }
}

/// One discovered edge, as seen from the device that ran the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub source_hostname: String,
    pub source_platform: String,
    pub source_ip: String,
    pub local_interface: String,
    pub neighbor_id: String,
    pub neighbor_ip: Option<String>,
    pub remote_port: String,
    pub neighbor_platform: Option<String>,
}

impl ConnectionRecord {
    /// Combine the observing device's identity with one of its neighbors
    pub fn observed(source: &DeviceDescriptor, source_hostname: &str, neighbor: &NeighborRecord) -> Self {
        Self {
            source_hostname: source_hostname.to_string(),
            source_platform: source.source_platform().to_string(),
            source_ip: source.host().to_string(),
            local_interface: neighbor.local_interface.clone(),
            neighbor_id: neighbor.neighbor_id.clone(),
            neighbor_ip: neighbor.neighbor_ip.clone(),
            remote_port: neighbor.remote_port.clone(),
            neighbor_platform: neighbor.neighbor_platform.clone(),
        }
    }
}

/// A device that could not be processed
#[derive(Debug, Clone)]
pub struct DeviceFailure {
    pub host: String,
    pub name: String,
    pub error: SessionError,
}

/// Outcome of one discovery run
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRun {
    /// Hosts processed, successfully or not
    pub visited: usize,
    /// Raw connection records in traversal order
    pub records: Vec<ConnectionRecord>,
    pub failures: Vec<DeviceFailure>,
}

/// Errors that stop a run before traversal starts
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No seed devices to start discovery from")]
    NoSeeds,
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}
