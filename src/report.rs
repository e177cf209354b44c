//! Report generation for discovery results.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::discovery::types::{ConnectionRecord, DiscoveryRun};
use crate::topology::{Diagnostic, Reconciliation};

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub inventory: String,
    pub seed_devices: usize,
    pub devices_visited: usize,
    pub failed_devices: usize,
    pub raw_connections: usize,
    pub management_filtered: usize,
    pub duplicate_connections: usize,
    pub unique_links: usize,
}

/// A device that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    pub host: String,
    pub name: String,
    pub kind: String,
    pub message: String,
}

/// Complete discovery report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub metadata: ReportMetadata,
    pub links: Vec<ConnectionRecord>,
    pub failures: Vec<FailureEntry>,
    pub diagnostics: Vec<String>,
}

impl DiscoveryReport {
    pub fn new(
        inventory: &Path,
        seed_devices: usize,
        run: &DiscoveryRun,
        reconciliation: &Reconciliation,
    ) -> Self {
        let metadata = ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            inventory: inventory.display().to_string(),
            seed_devices,
            devices_visited: run.visited,
            failed_devices: run.failures.len(),
            raw_connections: run.records.len(),
            management_filtered: reconciliation.management_filtered,
            duplicate_connections: reconciliation.duplicates,
            unique_links: reconciliation.links.len(),
        };

        let failures = run
            .failures
            .iter()
            .map(|f| FailureEntry {
                host: f.host.clone(),
                name: f.name.clone(),
                kind: f.error.kind().to_string(),
                message: f.error.to_string(),
            })
            .collect();

        Self {
            metadata,
            links: reconciliation.links.clone(),
            failures,
            diagnostics: reconciliation.diagnostics.iter().map(Diagnostic::to_string).collect(),
        }
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &DiscoveryReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

fn cell(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

fn table_row(connection: &str, ip: &str, interface: &str, device: &str, platform: &str) -> String {
    format!(
        "{:<20} {:<16} {:<24} {:<24} {}",
        connection, ip, interface, device, platform
    )
    .trim_end()
    .to_string()
}

/// Render the human-readable report.
///
/// Each link is a two-row block: the device that reported it, then the
/// connected neighbor, followed by a blank line.
pub fn render_text_report(report: &DiscoveryReport) -> String {
    let meta = &report.metadata;
    let mut lines: Vec<String> = Vec::new();

    // Header
    lines.push("=".repeat(80));
    lines.push("                        NETWORK TOPOLOGY DISCOVERY REPORT".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Generated: {}", meta.generated_at));
    lines.push(format!("Inventory: {}", meta.inventory));
    lines.push(format!("Seed devices: {}", meta.seed_devices));
    lines.push(format!("Devices visited: {}", meta.devices_visited));
    lines.push(format!("Failed devices: {}", meta.failed_devices));
    lines.push(format!("Connections discovered: {}", meta.raw_connections));
    lines.push(format!(
        "  Management links removed: {}",
        meta.management_filtered
    ));
    lines.push(format!(
        "  Seen from both ends / repeated: {}",
        meta.duplicate_connections
    ));
    lines.push(format!("Unique links: {}", meta.unique_links));
    lines.push(String::new());

    // Links
    lines.push("-".repeat(80));
    lines.push(table_row("Connection", "IP", "Interface", "Device", "Platform"));
    lines.push("-".repeat(80));
    for link in &report.links {
        lines.push(table_row(
            "Root device",
            cell(Some(link.source_ip.as_str())),
            cell(Some(link.local_interface.as_str())),
            cell(Some(link.source_hostname.as_str())),
            cell(Some(link.source_platform.as_str())),
        ));
        lines.push(table_row(
            "Connected neighbor",
            cell(link.neighbor_ip.as_deref()),
            cell(Some(link.remote_port.as_str())),
            cell(Some(link.neighbor_id.as_str())),
            cell(link.neighbor_platform.as_deref()),
        ));
        lines.push(String::new());
    }

    if !report.failures.is_empty() {
        lines.push("-".repeat(80));
        lines.push("Unreachable devices:".to_string());
        for failure in &report.failures {
            lines.push(format!(
                "  {} ({}): [{}] {}",
                failure.host, failure.name, failure.kind, failure.message
            ));
        }
        lines.push(String::new());
    }

    if !report.diagnostics.is_empty() {
        lines.push("-".repeat(80));
        lines.push("Dropped records:".to_string());
        for diagnostic in &report.diagnostics {
            lines.push(format!("  {}", diagnostic));
        }
        lines.push(String::new());
    }

    // Footer
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Generate human-readable text report
pub fn generate_text_report(report: &DiscoveryReport, output_path: &Path) -> Result<()> {
    let content = render_text_report(report);
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &DiscoveryReport) {
    let meta = &report.metadata;
    println!("\n=== NETWORK DISCOVERY SUMMARY ===\n");
    println!("Devices visited: {}", meta.devices_visited);
    println!("Connections found: {}", meta.raw_connections);
    println!("Unique links: {}", meta.unique_links);
    if meta.failed_devices > 0 {
        println!("Unreachable devices: {}", meta.failed_devices);
    }
    println!();
}
