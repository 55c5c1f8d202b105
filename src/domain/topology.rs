use crate::collectors::device_alias;
use crate::config::TopologyConfig;
use crate::domain::enclosure::EnclosureDescriptor;
use crate::domain::{ControllerDisk, DiskIdentity, SystemDisk};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Placeholder for a drive index the controller could not report.
const MISSING_DRIVE_LABEL: &str = "xxx";

/// Sentinel shown for locations that could not be resolved.
const UNRESOLVED: &str = "-";

/// One OS block device with its resolved physical location, if any.
#[derive(Clone, Debug, Serialize)]
pub struct ReconciledDisk {
    pub device: String,
    pub wwn: Option<String>,
    pub serial: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub vendor: Option<String>,
    pub size: Option<String>,
    pub transport: Option<String>,
    pub multipath: Option<String>,
    pub controller: Option<String>,
    pub enclosure: Option<String>,
    pub drive: Option<String>, // raw controller drive token
    pub drive_label: String,
    pub enclosure_name: Option<String>,
    pub physical_slot: Option<i64>,
    pub logical_disk: Option<i64>,
    pub location: String,
}

pub struct TopologyMapper;

impl TopologyMapper {
    pub fn new() -> Self {
        Self
    }

    /// Produces exactly one row per OS block device, locating each one
    /// through its controller record where possible. Rows are sorted by
    /// enclosure name and physical slot, unresolved devices last.
    pub fn reconcile(
        &self,
        controller_disks: &[ControllerDisk],
        system_disks: &[SystemDisk],
        multipath: &HashMap<String, String>,
        enclosures: &HashMap<(String, String), EnclosureDescriptor>,
        config: &TopologyConfig,
    ) -> Vec<ReconciledDisk> {
        let mut rows: Vec<ReconciledDisk> = system_disks
            .iter()
            .map(|disk| self.reconcile_disk(disk, controller_disks, multipath, enclosures, config))
            .collect();

        rows.sort_by(|a, b| match (&a.enclosure_name, &b.enclosure_name) {
            (Some(name_a), Some(name_b)) => name_a
                .cmp(name_b)
                .then_with(|| a.physical_slot.cmp(&b.physical_slot))
                .then_with(|| a.device.cmp(&b.device)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.device.cmp(&b.device),
        });

        debug!(
            "Reconciled {} block devices against {} controller records",
            rows.len(),
            controller_disks.len()
        );
        rows
    }

    fn reconcile_disk(
        &self,
        disk: &SystemDisk,
        records: &[ControllerDisk],
        multipath: &HashMap<String, String>,
        enclosures: &HashMap<(String, String), EnclosureDescriptor>,
        config: &TopologyConfig,
    ) -> ReconciledDisk {
        let identity = disk.identity();
        let multipath_alias = disk.multipath.clone().or_else(|| {
            identity
                .wwn
                .as_deref()
                .and_then(|wwn| device_alias(multipath, wwn))
        });

        let Some(record) = find_record(&identity, records) else {
            debug!("{} has no controller record", disk.name);
            return ReconciledDisk {
                device: disk.name.clone(),
                wwn: identity.wwn,
                serial: identity.serial,
                model: disk.model.clone(),
                manufacturer: None,
                vendor: disk.vendor.clone(),
                size: disk.size.clone(),
                transport: disk.transport.clone(),
                multipath: multipath_alias,
                controller: None,
                enclosure: None,
                drive: None,
                drive_label: UNRESOLVED.to_string(),
                enclosure_name: None,
                physical_slot: None,
                logical_disk: None,
                location: UNRESOLVED.to_string(),
            };
        };

        // the controller is the authority on identity once a match is made
        let serial = record.identity.serial.clone().or(identity.serial.clone());
        let (enclosure_name, physical_slot, logical_disk) =
            resolve_location(record, serial.as_deref(), enclosures, config);
        let location = format!(
            "{};SLOT:{};DISK:{}",
            enclosure_name, physical_slot, logical_disk
        );
        debug!("{} -> {}", disk.name, location);

        ReconciledDisk {
            device: disk.name.clone(),
            wwn: identity.wwn.or_else(|| record.identity.wwn.clone()),
            serial,
            model: record.model.clone().or_else(|| disk.model.clone()),
            manufacturer: record.manufacturer.clone(),
            vendor: disk.vendor.clone(),
            size: disk.size.clone(),
            transport: disk.transport.clone(),
            multipath: multipath_alias,
            controller: Some(record.controller.clone()),
            enclosure: Some(record.enclosure.clone()),
            drive: Some(record.drive.clone()),
            drive_label: drive_label(record, disk),
            enclosure_name: Some(enclosure_name),
            physical_slot: Some(physical_slot),
            logical_disk: Some(logical_disk),
            location,
        }
    }
}

impl Default for TopologyMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// WWN equality wins; serial equality is the fallback. A device without a
/// WWN never matches, so two blank identities are never the same disk.
fn find_record<'a>(
    identity: &DiskIdentity,
    records: &'a [ControllerDisk],
) -> Option<&'a ControllerDisk> {
    let wwn = identity.wwn.as_deref()?;
    if let Some(hit) = records
        .iter()
        .find(|r| r.identity.wwn.as_deref() == Some(wwn))
    {
        return Some(hit);
    }
    let serial = identity.serial.as_deref()?;
    records
        .iter()
        .find(|r| r.identity.serial.as_deref() == Some(serial))
}

/// Bay label: the raw drive token when the tool reported one, otherwise the
/// device vendor, otherwise a fixed placeholder.
fn drive_label(record: &ControllerDisk, disk: &SystemDisk) -> String {
    let token = record.drive.trim();
    if token.is_empty() {
        MISSING_DRIVE_LABEL.to_string()
    } else if token.eq_ignore_ascii_case("n/a") {
        disk.vendor
            .clone()
            .unwrap_or_else(|| MISSING_DRIVE_LABEL.to_string())
    } else {
        token.to_string()
    }
}

fn resolve_location(
    record: &ControllerDisk,
    serial: Option<&str>,
    enclosures: &HashMap<(String, String), EnclosureDescriptor>,
    config: &TopologyConfig,
) -> (String, i64, i64) {
    if let Some(ov) = serial.and_then(|s| config.disk_override(s)) {
        debug!("Serial {} pinned to {} slot {}", ov.serial, ov.enclosure, ov.slot);
        return (ov.enclosure.clone(), ov.slot, ov.disk);
    }
    let key = (record.controller.clone(), record.enclosure.clone());
    if let Some(descriptor) = enclosures.get(&key) {
        match record.drive_index() {
            Some(index) => {
                let slot = index as i64 + descriptor.start_slot + descriptor.offset;
                (descriptor.name.clone(), slot, slot - 1)
            }
            None => (descriptor.name.clone(), 0, 0),
        }
    } else {
        // an enclosure the classifier never saw, e.g. direct-attached drives
        match record.drive_index() {
            Some(index) => (
                format!("Unknown-{}", record.enclosure),
                index as i64 + 1,
                index as i64,
            ),
            None => (format!("Unknown-{}", record.enclosure), 1, 0),
        }
    }
}
