//! # cdpwalk - Physical topology discovery from CDP neighbor tables
//!
//! This library logs into seed devices, reads their link-layer neighbor
//! tables and walks outward to every neighbor it can reach, producing a
//! deduplicated list of point-to-point links.
//!
//! ## Overview
//!
//! Discovery is a breadth-first traversal. Each device is visited at most
//! once; every neighbor it advertises becomes a connection record, and every
//! neighbor with an address not yet visited is queued using the run's
//! default credentials. Devices that cannot be reached are recorded as
//! failures and never stop the run.
//!
//! ## Architecture
//!
//! - `neighbor_parser`: best-effort decoding of `show cdp neighbors detail`
//! - `gateway`: device session traits and the transcript-replay gateway
//! - `discovery`: traversal state and the discovery engine
//! - `topology`: management filtering, hostname canonicalization, link dedup
//! - `inventory` / `config_loader`: YAML inventory structures and loading
//! - `report`: JSON and text reports
//! - `utils`: host address helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cdpwalk::{config_loader, discovery, gateway::ReplayGateway, topology};
//! use std::path::Path;
//!
//! let inventory = config_loader::load_inventory(Path::new("inventory.yml"))?;
//! let gateway = ReplayGateway::load(Path::new("transcripts.yml"))?;
//!
//! let options = discovery::DiscoveryOptions {
//!     neighbor_command: inventory.discovery.neighbor_command.clone(),
//!     default_credentials: inventory.default_credentials(),
//! };
//! let engine = discovery::DiscoveryEngine::new(gateway, options);
//! let run = engine.run(inventory.seeds())?;
//!
//! let management = inventory.management_interfaces(&Vec::new());
//! let links = topology::reconcile(&run.records, &management).links;
//! println!("{} unique links", links.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed errors (`thiserror`). Only inventory loading
//! and an empty seed list stop a run; per-device session errors are
//! collected in [`discovery::DiscoveryRun::failures`] and unusable records
//! are reported as [`topology::Diagnostic`]s. The binary wraps everything in
//! `color_eyre` for reporting.

pub mod config_loader;
pub mod discovery;
pub mod gateway;
pub mod inventory;
pub mod neighbor_parser;
pub mod report;
pub mod topology;
pub mod utils;
