pub mod lsblk;
pub mod multipath;
pub mod sas_ircu;
pub mod storcli;
pub mod zpool;

pub use lsblk::LsblkCollector;
pub use multipath::{device_alias, MultipathCollector};
pub use sas_ircu::SasIrcuCollector;
pub use storcli::StorcliCollector;
pub use zpool::ZpoolCollector;

use crate::command::CommandRunner;
use crate::domain::{ControllerDisk, ControllerEnclosure};
use crate::error::Result;
use log::{debug, info};

/// One RAID/HBA management tool. Exactly one adapter serves an invocation;
/// `detect_controller` picks the first whose probe succeeds.
pub trait ControllerCollector {
    fn name(&self) -> &'static str;

    /// Checks the tool is present and sees at least one controller.
    fn probe(&self, runner: &CommandRunner) -> bool;

    fn disks(&self, runner: &CommandRunner) -> Result<Vec<ControllerDisk>>;

    fn enclosures(&self, runner: &CommandRunner) -> Result<Vec<ControllerEnclosure>>;
}

/// Probes known controller tools, newest first.
pub fn detect_controller(runner: &CommandRunner) -> Option<Box<dyn ControllerCollector>> {
    let candidates: [Box<dyn ControllerCollector>; 4] = [
        Box::new(StorcliCollector::new("storcli2")),
        Box::new(StorcliCollector::new("storcli")),
        Box::new(SasIrcuCollector::new("sas2ircu")),
        Box::new(SasIrcuCollector::new("sas3ircu")),
    ];
    for candidate in candidates {
        if candidate.probe(runner) {
            info!("Selected controller tool: {}", candidate.name());
            return Some(candidate);
        }
        debug!("{} not usable", candidate.name());
    }
    None
}
