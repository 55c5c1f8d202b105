use crate::error::{Error, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "baymap.conf";
const SYSTEM_CONFIG_PATH: &str = "/etc/baymap.conf";

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    enclosures: Vec<RawEnclosure>,
    #[serde(default)]
    disks: Vec<RawDisk>,
}

#[derive(Deserialize)]
struct RawEnclosure {
    id: Option<String>,
    name: Option<String>,
    start_slot: Option<i64>,
    offset: Option<i64>,
}

#[derive(Deserialize)]
struct RawDisk {
    serial: Option<String>,
    enclosure: Option<String>,
    slot: Option<i64>,
    disk: Option<i64>,
}

/// Naming and slot numbering rule for one enclosure. The id is matched
/// against the enclosure logical id first, then the bare controller-local id.
#[derive(Clone, Debug)]
pub struct EnclosureOverride {
    pub id: String,
    pub name: String,
    pub start_slot: i64,
    pub offset: i64,
}

/// Pins one disk, looked up by serial number, to a fixed location.
#[derive(Clone, Debug)]
pub struct DiskOverride {
    pub serial: String,
    pub enclosure: String,
    pub slot: i64,
    pub disk: i64,
}

/// User-defined enclosure naming and per-disk location overrides, from YAML.
#[derive(Clone, Debug, Default)]
pub struct TopologyConfig {
    pub enclosures: Vec<EnclosureOverride>,
    pub disks: Vec<DiskOverride>,
}

impl TopologyConfig {
    /// Loads the first config found on the search path. A missing file is
    /// normal; a malformed one is reported and ignored.
    pub fn load(explicit: Option<&Path>) -> Self {
        let Some(path) = Self::resolve_path(explicit) else {
            debug!("No configuration file found, using defaults");
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(text) => match Self::parse(&text) {
                Ok(config) => {
                    debug!(
                        "Loaded {} enclosure and {} disk overrides from {}",
                        config.enclosures.len(),
                        config.disks.len(),
                        path.display()
                    );
                    config
                }
                Err(e) => {
                    warn!("Ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Cannot read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        for candidate in [DEFAULT_CONFIG_NAME, SYSTEM_CONFIG_PATH] {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<RawConfig> =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        let raw = raw.unwrap_or_default();

        let mut config = Self::default();
        for entry in raw.enclosures {
            let id = entry.id.unwrap_or_default();
            let name = entry.name.unwrap_or_default();
            if id.is_empty() || name.is_empty() {
                warn!("Skipping enclosure override without id and name");
                continue;
            }
            config.enclosures.push(EnclosureOverride {
                id,
                name,
                start_slot: entry.start_slot.unwrap_or(1),
                offset: entry.offset.unwrap_or(0),
            });
        }
        for entry in raw.disks {
            let serial = entry.serial.unwrap_or_default();
            if serial.is_empty() {
                warn!("Skipping disk override without serial");
                continue;
            }
            config.disks.push(DiskOverride {
                serial,
                enclosure: entry.enclosure.unwrap_or_else(|| "Custom".to_string()),
                slot: entry.slot.unwrap_or(0),
                disk: entry.disk.unwrap_or(0),
            });
        }
        Ok(config)
    }

    /// Override for an enclosure, preferring a logical id match.
    pub fn enclosure_override(
        &self,
        logical_id: Option<&str>,
        id: &str,
    ) -> Option<&EnclosureOverride> {
        if let Some(logical) = logical_id {
            if let Some(hit) = self.enclosures.iter().find(|o| o.id == logical) {
                return Some(hit);
            }
        }
        self.enclosures.iter().find(|o| o.id == id)
    }

    pub fn disk_override(&self, serial: &str) -> Option<&DiskOverride> {
        self.disks.iter().find(|o| o.serial == serial)
    }
}
