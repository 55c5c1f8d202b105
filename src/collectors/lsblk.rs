use crate::command::CommandRunner;
use crate::domain::SystemDisk;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;

const LSBLK_COLUMNS: &str = "NAME,WWN,VENDOR,MODEL,REV,SERIAL,SIZE,PTUUID,HCTL,TRAN,TYPE";

#[derive(Deserialize)]
struct LsblkReport {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Deserialize)]
struct LsblkDevice {
    name: String,
    wwn: Option<String>,
    vendor: Option<String>,
    model: Option<String>,
    rev: Option<String>,
    serial: Option<String>,
    size: Option<String>,
    ptuuid: Option<String>,
    hctl: Option<String>,
    tran: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub struct LsblkCollector;

impl LsblkCollector {
    pub fn new() -> Self {
        Self
    }

    /// Lists whole block devices with identity columns. Never cached, the
    /// device list is live system state.
    pub fn collect(&self, runner: &CommandRunner) -> Result<Vec<SystemDisk>> {
        let output = runner.run("lsblk", &["-p", "-d", "-o", LSBLK_COLUMNS, "-J"])?;
        let disks = self.parse(&output)?;
        debug!("Found {} block devices", disks.len());
        Ok(disks)
    }

    fn parse(&self, output: &str) -> Result<Vec<SystemDisk>> {
        let report: LsblkReport = serde_json::from_str(output).map_err(|e| Error::ToolFailed {
            tool: "lsblk".to_string(),
            reason: format!("unparseable JSON: {}", e),
        })?;
        Ok(report
            .blockdevices
            .into_iter()
            .map(|dev| SystemDisk {
                name: dev.name,
                wwn: trimmed(dev.wwn),
                vendor: trimmed(dev.vendor),
                model: trimmed(dev.model),
                revision: trimmed(dev.rev),
                serial: trimmed(dev.serial),
                size: trimmed(dev.size),
                ptuuid: trimmed(dev.ptuuid),
                hctl: trimmed(dev.hctl),
                transport: trimmed(dev.tran),
                kind: trimmed(dev.kind),
                multipath: None,
            })
            .collect())
    }
}

impl Default for LsblkCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// lsblk pads some columns with spaces (VENDOR in particular).
fn trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
   "blockdevices": [
      {"name":"/dev/sda", "wwn":"0x50014EE058FFCEE8", "vendor":"ATA     ", "model":"WDC WD30EFRX-68A", "rev":"0A80", "serial":"WD-WMC1T2880908", "size":"2.7T", "ptuuid":"1e4f2c5b", "hctl":"0:0:0:0", "tran":"sas", "type":"disk"},
      {"name":"/dev/zd0", "wwn":null, "vendor":null, "model":null, "rev":null, "serial":null, "size":"10G", "ptuuid":null, "hctl":null, "tran":null, "type":"disk"},
      {"name":"/dev/nvme0n1", "wwn":"eui.002538c471b0b2a3", "vendor":null, "model":"Samsung SSD 980", "rev":"1B4QFXO7", "serial":"S649NX0T509284", "size":"931.5G", "ptuuid":null, "hctl":null, "tran":"nvme", "type":"disk"}
   ]
}"#;

    #[test]
    fn test_parse_report() {
        let collector = LsblkCollector::new();
        let disks = collector.parse(SAMPLE).unwrap();
        assert_eq!(disks.len(), 3);

        assert_eq!(disks[0].name, "/dev/sda");
        assert_eq!(disks[0].vendor.as_deref(), Some("ATA"));
        assert_eq!(disks[0].hctl.as_deref(), Some("0:0:0:0"));
        let identity = disks[0].identity();
        assert_eq!(identity.wwn.as_deref(), Some("50014ee058ffcee8"));
        assert_eq!(identity.serial.as_deref(), Some("WD-WMC1T2880908"));

        assert_eq!(disks[1].name, "/dev/zd0");
        assert_eq!(disks[1].wwn, None);
        assert_eq!(disks[1].serial, None);

        assert_eq!(disks[2].transport.as_deref(), Some("nvme"));
    }

    #[test]
    fn test_parse_empty_report() {
        let collector = LsblkCollector::new();
        assert!(collector.parse(r#"{"blockdevices": []}"#).unwrap().is_empty());
        assert!(collector.parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_fails() {
        let collector = LsblkCollector::new();
        let err = collector.parse("lsblk: invalid option -- 'J'").unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }
}
