use crate::command::CommandRunner;
use crate::error::Result;
use log::debug;
use std::collections::HashMap;

pub struct MultipathCollector;

impl MultipathCollector {
    pub fn new() -> Self {
        Self
    }

    /// Maps WWIDs to dm device names. Hosts without multipathd are common,
    /// so failures degrade to an empty map.
    pub fn collect(&self, runner: &CommandRunner) -> HashMap<String, String> {
        match self.maps(runner) {
            Ok(maps) => maps,
            Err(e) => {
                debug!("Multipath not available: {}", e);
                HashMap::new()
            }
        }
    }

    fn maps(&self, runner: &CommandRunner) -> Result<HashMap<String, String>> {
        let output = runner.run("multipathd", &["show", "maps", "format", "%w %d"])?;
        Ok(self.parse_maps(&output))
    }

    fn parse_maps(&self, output: &str) -> HashMap<String, String> {
        let mut maps = HashMap::new();
        for line in output.lines() {
            let mut parts = line.split_whitespace();
            let (Some(wwid), Some(device)) = (parts.next(), parts.next()) else {
                continue;
            };
            // first line is the format header
            if wwid.eq_ignore_ascii_case("uuid") {
                continue;
            }
            maps.insert(wwid.to_ascii_lowercase(), device.to_string());
        }
        debug!("Found {} multipath maps", maps.len());
        maps
    }
}

impl Default for MultipathCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a normalized WWN to its dm alias. SCSI WWIDs carry a leading NAA
/// type digit, so a bare WWN is also tried with "3" prepended.
pub fn device_alias(maps: &HashMap<String, String>, wwn: &str) -> Option<String> {
    maps.get(wwn)
        .or_else(|| maps.get(&format!("3{}", wwn)))
        .cloned()
}
