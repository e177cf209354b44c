//! Inventory file structures.
//!
//! The inventory lists the seed devices to start discovery from, the
//! credentials used to reach them, and the discovery settings shared by the
//! whole run.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::types::{
    ConnectionParams, DefaultCredentials, DeviceDescriptor, DEFAULT_DEVICE_TYPE,
    DEFAULT_NEIGHBOR_COMMAND, DEFAULT_PORT,
};
use crate::utils::ip_utils;

fn default_neighbor_command() -> String {
    DEFAULT_NEIGHBOR_COMMAND.to_string()
}

/// Top-level inventory file
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    #[serde(default)]
    pub discovery: DiscoverySettings,
    pub devices: Vec<DeviceEntry>,
}

/// Run-wide discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySettings {
    #[serde(default = "default_neighbor_command")]
    pub neighbor_command: String,
    /// Out-of-band interfaces excluded from the link report
    #[serde(default)]
    pub management_interfaces: Vec<String>,
    /// Credentials for discovered neighbors; defaults to the first device's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_credentials: Option<CredentialOverride>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            neighbor_command: default_neighbor_command(),
            management_interfaces: Vec::new(),
            default_credentials: None,
        }
    }
}

/// Field-by-field override applied on top of the first device's parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl CredentialOverride {
    fn apply(&self, params: &mut ConnectionParams) {
        if let Some(username) = &self.username {
            params.username = username.clone();
        }
        if let Some(password) = &self.password {
            params.password = password.clone();
        }
        if let Some(secret) = &self.secret {
            params.secret = Some(secret.clone());
        }
        if let Some(device_type) = &self.device_type {
            params.device_type = device_type.clone();
        }
        if let Some(port) = self.port {
            params.port = port;
        }
        if let Some(timeout) = self.timeout {
            params.timeout = Some(timeout);
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_device_type() -> String {
    DEFAULT_DEVICE_TYPE.to_string()
}

/// One seed device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default = "default_device_type")]
    pub device_type: String,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl DeviceEntry {
    /// Session parameters; the host is trimmed so it matches advertised addresses
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.host.trim().to_string(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            secret: self.secret.clone(),
            device_type: self.device_type.clone(),
            timeout: self.timeout,
        }
    }

    pub fn descriptor(&self) -> DeviceDescriptor {
        let params = self.connection_params();
        DeviceDescriptor {
            name: self.name.clone().unwrap_or_else(|| params.host.clone()),
            platform: self.platform.clone(),
            params,
        }
    }
}

impl Inventory {
    /// Validate the inventory
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.devices.is_empty() {
            return Err(ValidationError::EmptyInventory);
        }

        if self.discovery.neighbor_command.trim().is_empty() {
            return Err(ValidationError::InvalidDiscovery(
                "neighbor_command cannot be empty".to_string(),
            ));
        }

        if let Some(overrides) = &self.discovery.default_credentials {
            if overrides.port == Some(0) {
                return Err(ValidationError::InvalidDiscovery(
                    "default_credentials.port cannot be 0".to_string(),
                ));
            }
        }

        let mut seen = HashSet::new();
        for (index, device) in self.devices.iter().enumerate() {
            Self::validate_device(index, device)?;
            let host = device.host.trim();
            if !seen.insert(host) {
                log::warn!(
                    "Host '{}' is listed more than once; only the first entry will be visited",
                    host
                );
            }
        }

        Ok(())
    }

    fn validate_device(index: usize, device: &DeviceEntry) -> Result<(), ValidationError> {
        let host = device.host.trim();
        if host.is_empty() {
            return Err(ValidationError::InvalidDevice(format!(
                "device #{} has an empty host",
                index + 1
            )));
        }
        if !ip_utils::is_valid_ip(host) && !ip_utils::is_valid_hostname(host) {
            return Err(ValidationError::InvalidDevice(format!(
                "device #{} host '{}' is neither an IP address nor a hostname",
                index + 1,
                host
            )));
        }
        if device.username.trim().is_empty() {
            return Err(ValidationError::InvalidDevice(format!(
                "device '{}' has an empty username",
                host
            )));
        }
        if device.port == 0 {
            return Err(ValidationError::InvalidDevice(format!(
                "device '{}' has port 0",
                host
            )));
        }
        Ok(())
    }

    /// Seed descriptors in inventory order
    pub fn seeds(&self) -> Vec<DeviceDescriptor> {
        self.devices.iter().map(DeviceEntry::descriptor).collect()
    }

    /// Credentials applied to every discovered neighbor.
    ///
    /// The first device's parameters, with `discovery.default_credentials`
    /// applied on top when present.
    pub fn default_credentials(&self) -> Option<DefaultCredentials> {
        let mut params = self.devices.first()?.connection_params();
        if let Some(overrides) = &self.discovery.default_credentials {
            overrides.apply(&mut params);
        }
        Some(DefaultCredentials::new(params))
    }

    /// Management interface names from the inventory merged with `extra`
    pub fn management_interfaces<'a>(
        &'a self,
        extra: impl IntoIterator<Item = &'a String>,
    ) -> BTreeSet<String> {
        self.discovery
            .management_interfaces
            .iter()
            .chain(extra)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Inventory validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Inventory lists no devices")]
    EmptyInventory,
    #[error("Invalid device entry: {0}")]
    InvalidDevice(String),
    #[error("Invalid discovery settings: {0}")]
    InvalidDiscovery(String),
}
