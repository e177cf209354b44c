//! Parsing for `show cdp neighbors detail` output.
//!
//! The output is a sequence of advertisement blocks separated by a dashed
//! line. Every block is decoded independently and best-effort: a block that
//! lacks the neighbor identity or the interface pair is dropped, never
//! reported as an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Line that delimits one neighbor's advertisement from the next
pub const BLOCK_SEPARATOR: &str = "-------------------------";

/// One neighbor decoded from a device's advertisement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// Advertised identity (`Device ID`)
    pub neighbor_id: String,
    /// Entry address; without it the neighbor cannot be visited
    pub neighbor_ip: Option<String>,
    pub neighbor_platform: Option<String>,
    /// Interface on the querying device
    pub local_interface: String,
    /// Interface on the neighbor (`Port ID (outgoing port)`)
    pub remote_port: String,
}

/// Compiled regex patterns for advertisement blocks
pub struct NeighborPatterns {
    /// Match: "Device ID: <id>"
    pub device_id: Regex,
    /// Match: "IP address: <ip>"
    pub ip_address: Regex,
    /// Match: "Platform: <platform>,  Capabilities: ..."
    pub platform: Regex,
    /// Match: "Interface: <local>,  Port ID (outgoing port): <remote>"
    pub interfaces: Regex,
}

impl NeighborPatterns {
    pub fn new() -> Self {
        Self {
            device_id: Regex::new(
                r"Device ID:[ \t]*([^\r\n]*)"
            ).expect("Invalid device_id regex"),
            ip_address: Regex::new(
                r"IP address:[ \t]*([^\r\n]*)"
            ).expect("Invalid ip_address regex"),
            platform: Regex::new(
                r"Platform:[ \t]*([^,\r\n]*),"
            ).expect("Invalid platform regex"),
            interfaces: Regex::new(
                r"Interface:[ \t]*([^,\r\n]*),[^\r\n]*?Port ID \(outgoing port\):[ \t]*([^\r\n]*)"
            ).expect("Invalid interfaces regex"),
        }
    }
}

impl Default for NeighborPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<NeighborPatterns> = LazyLock::new(NeighborPatterns::new);

/// First capture group of `re` in `block`, trimmed. Blank captures count as absent.
fn capture(re: &Regex, block: &str) -> Option<String> {
    let value = re.captures(block)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decode a single advertisement block.
///
/// Returns `None` when the block has no `Device ID` or no complete
/// local/remote interface pair.
pub fn parse_block(block: &str) -> Option<NeighborRecord> {
    if block.trim().is_empty() {
        return None;
    }

    let neighbor_id = match capture(&PATTERNS.device_id, block) {
        Some(id) => id,
        None => {
            log::debug!("Dropping neighbor block without a Device ID");
            return None;
        }
    };

    let neighbor_ip = capture(&PATTERNS.ip_address, block);
    let neighbor_platform = capture(&PATTERNS.platform, block);

    let Some(caps) = PATTERNS.interfaces.captures(block) else {
        log::debug!("Dropping neighbor '{}': no interface/port pair", neighbor_id);
        return None;
    };
    let local_interface = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let remote_port = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    if local_interface.is_empty() || remote_port.is_empty() {
        log::debug!("Dropping neighbor '{}': incomplete interface/port pair", neighbor_id);
        return None;
    }

    Some(NeighborRecord {
        neighbor_id,
        neighbor_ip,
        neighbor_platform,
        local_interface: local_interface.to_string(),
        remote_port: remote_port.to_string(),
    })
}

/// Decode every usable neighbor from raw command output, in input order.
///
/// Never fails: malformed blocks are skipped, so the result may be shorter
/// than the number of blocks in `output`.
pub fn parse_neighbors(output: &str) -> impl Iterator<Item = NeighborRecord> + '_ {
    output.split(BLOCK_SEPARATOR).filter_map(parse_block)
}
