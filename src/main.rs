use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use baymap::cache::{default_cache_dir, CommandCache};
use baymap::collectors::{detect_controller, LsblkCollector, MultipathCollector, ZpoolCollector};
use baymap::command::CommandRunner;
use baymap::config::TopologyConfig;
use baymap::domain::{EnclosureClassifier, TopologyMapper};
use baymap::output;

#[derive(Parser, Debug)]
#[command(name = "baymap")]
#[command(about = "Maps OS block devices to physical disk bays via RAID/HBA controller tools")]
#[command(version)]
struct Args {
    /// Print results as JSON instead of a table
    #[arg(short, long)]
    json: bool,

    /// Show all identity and location columns
    #[arg(short, long)]
    long: bool,

    /// Annotate zpool status with disk locations
    #[arg(short, long)]
    zpool: bool,

    /// Show enclosure details and a config snippet, optionally for one id
    #[arg(short, long, value_name = "ID", num_args = 0..=1, default_missing_value = "all")]
    enclosures: Option<String>,

    /// Ignore cached controller output and query the tools again
    #[arg(short, long)]
    refresh: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let cache = CommandCache::new(default_cache_dir()).with_refresh(args.refresh);
    let runner = CommandRunner::new(cache);

    info!("Detecting RAID/HBA controller tools");
    let adapter = detect_controller(&runner);

    if let Some(selector) = args.enclosures.as_deref() {
        let adapter = adapter.context("no controller tool available to query enclosures")?;
        let enclosures = adapter
            .enclosures(&runner)
            .context("failed to enumerate enclosures")?;
        let filter = (selector != "all").then_some(selector);
        print!("{}", output::render_enclosure_report(&enclosures, filter));
        return Ok(());
    }

    let config = TopologyConfig::load(args.config.as_deref());

    let (controller_disks, controller_enclosures) = match &adapter {
        Some(adapter) => {
            info!("Collecting drive records from {}", adapter.name());
            let disks = adapter.disks(&runner).unwrap_or_else(|e| {
                warn!("Failed to collect controller drives: {}", e);
                Vec::new()
            });
            let enclosures = adapter.enclosures(&runner).unwrap_or_else(|e| {
                warn!("Failed to collect controller enclosures: {}", e);
                Vec::new()
            });
            (disks, enclosures)
        }
        None => {
            warn!("No controller tool found; physical locations will be unresolved");
            (Vec::new(), Vec::new())
        }
    };

    info!("Enumerating block devices");
    let system_disks = match LsblkCollector::new().collect(&runner) {
        Ok(disks) => disks,
        Err(e) if controller_disks.is_empty() => {
            warn!("Block device enumeration failed: {}", e);
            return Err(baymap::Error::NoUsableSource.into());
        }
        Err(e) => {
            warn!("Block device enumeration failed: {}", e);
            Vec::new()
        }
    };

    let multipath = MultipathCollector::new().collect(&runner);
    let enclosures =
        EnclosureClassifier::new().classify(&controller_disks, &controller_enclosures, &config);

    info!("Matching controller records with block devices");
    let disks = TopologyMapper::new().reconcile(
        &controller_disks,
        &system_disks,
        &multipath,
        &enclosures,
        &config,
    );

    if args.json {
        println!("{}", output::render_json(&disks)?);
    } else {
        print!("{}", output::render_table(&disks, args.long));
    }

    if args.zpool {
        info!("Annotating zpool status");
        match ZpoolCollector::new().collect(&runner) {
            Ok(status) => {
                println!();
                print!("{}", output::overlay_status(&status, &disks));
            }
            Err(e) => warn!("Failed to get zpool status: {}", e),
        }
    }

    Ok(())
}
