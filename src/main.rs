use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use cdpwalk::config_loader::load_inventory;
use cdpwalk::discovery::{DiscoveryEngine, DiscoveryOptions};
use cdpwalk::gateway::ReplayGateway;
use cdpwalk::report::{self, DiscoveryReport};
use cdpwalk::topology;

/// Map physical network topology by walking CDP neighbor tables
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the device inventory YAML file
    #[arg(short, long, default_value = "config/inventory.yml")]
    inventory: PathBuf,

    /// Path to the captured device transcripts to replay
    #[arg(short, long)]
    transcripts: PathBuf,

    /// Output directory for the discovery reports
    #[arg(short, long, default_value = "reports")]
    output: PathBuf,

    /// Extra management interface to exclude from the report (repeatable)
    #[arg(short, long = "management-interface")]
    management_interfaces: Vec<String>,

    /// Number of parallel workers (1 = sequential, 0 = auto-detect)
    #[arg(short, long, default_value = "1")]
    jobs: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Skip writing report files
    #[arg(long)]
    no_report: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with the requested default filter level
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let started = Instant::now();
    info!("Starting network discovery");
    info!("Inventory file: {:?}", args.inventory);

    let inventory = load_inventory(&args.inventory)
        .wrap_err_with(|| format!("Failed to load inventory '{}'", args.inventory.display()))?;
    let gateway = ReplayGateway::load(&args.transcripts)
        .wrap_err_with(|| format!("Failed to load transcripts '{}'", args.transcripts.display()))?;

    let seeds = inventory.seeds();
    let seed_count = seeds.len();
    let options = DiscoveryOptions {
        neighbor_command: inventory.discovery.neighbor_command.clone(),
        default_credentials: inventory.default_credentials(),
    };
    let engine = DiscoveryEngine::new(gateway, options);

    let run = if args.jobs == 1 {
        engine.run(seeds)?
    } else {
        engine.run_parallel(seeds, args.jobs)?
    };

    info!("Total devices visited: {}", run.visited);
    info!("Total connections found: {}", run.records.len());

    let management = inventory.management_interfaces(&args.management_interfaces);
    let reconciliation = topology::reconcile(&run.records, &management);
    let report = DiscoveryReport::new(&args.inventory, seed_count, &run, &reconciliation);

    if reconciliation.links.is_empty() {
        warn!("No connections were discovered");
    } else if !args.no_report {
        fs::create_dir_all(&args.output).wrap_err_with(|| {
            format!("Failed to create output directory '{}'", args.output.display())
        })?;
        report::generate_text_report(&report, &args.output.join("discovery_report.txt"))?;
        report::generate_json_report(&report, &args.output.join("discovery_data.json"))?;
    }

    report::print_summary(&report);
    info!("Total run time: {:.2} seconds", started.elapsed().as_secs_f64());
    Ok(())
}
