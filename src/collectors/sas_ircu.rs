use crate::collectors::ControllerCollector;
use crate::command::CommandRunner;
use crate::domain::{clean_field, ControllerDisk, ControllerEnclosure, DiskIdentity};
use crate::error::Result;
use log::debug;

#[derive(Default)]
struct DriveStanza {
    enclosure: String,
    slot: String,
    sas_address: String,
    manufacturer: String,
    model: String,
    serial: String,
    guid: String,
}

/// Adapter for LSI SAS IR controllers via sas2ircu or sas3ircu.
///
/// These tools only speak fixed-width text: drives arrive as "Device is a
/// Hard disk" stanzas and enclosures as a boxed "Enclosure information"
/// section at the end of the display output.
pub struct SasIrcuCollector {
    program: &'static str,
}

impl SasIrcuCollector {
    pub fn new(program: &'static str) -> Self {
        Self { program }
    }

    fn controller_ids(&self, runner: &CommandRunner) -> Result<Vec<String>> {
        let output = runner.run_cached(self.program, &["LIST"])?;
        Ok(parse_controller_ids(&output))
    }

    fn display(&self, runner: &CommandRunner, controller: &str) -> Result<String> {
        runner.run_cached(self.program, &[controller, "display"])
    }
}

impl ControllerCollector for SasIrcuCollector {
    fn name(&self) -> &'static str {
        self.program
    }

    fn probe(&self, runner: &CommandRunner) -> bool {
        match runner.run_cached(self.program, &["LIST"]) {
            Ok(_) => true,
            Err(e) => {
                debug!("{} probe failed: {}", self.program, e);
                false
            }
        }
    }

    fn disks(&self, runner: &CommandRunner) -> Result<Vec<ControllerDisk>> {
        let mut disks = Vec::new();
        for controller in self.controller_ids(runner)? {
            match self.display(runner, &controller) {
                Ok(output) => parse_display_disks(&output, &controller, &mut disks),
                Err(e) => debug!("{} {} display failed: {}", self.program, controller, e),
            }
        }
        debug!("Found {} drives via {}", disks.len(), self.program);
        Ok(disks)
    }

    fn enclosures(&self, runner: &CommandRunner) -> Result<Vec<ControllerEnclosure>> {
        let mut enclosures = Vec::new();
        for controller in self.controller_ids(runner)? {
            match self.display(runner, &controller) {
                Ok(output) => parse_display_enclosures(&output, &controller, &mut enclosures),
                Err(e) => debug!("{} {} display failed: {}", self.program, controller, e),
            }
        }
        debug!("Found {} enclosures via {}", enclosures.len(), self.program);
        Ok(enclosures)
    }
}

/// Controller indices from the LIST table: rows start with a bare number.
fn parse_controller_ids(output: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(first), Some(_)) = (parts.next(), parts.next()) else {
            continue;
        };
        if first.bytes().all(|b| b.is_ascii_digit()) {
            ids.push(first.to_string());
        }
    }
    ids
}

fn parse_display_disks(output: &str, controller: &str, disks: &mut Vec<ControllerDisk>) {
    let mut current: Option<DriveStanza> = None;
    for line in output.lines() {
        if line.contains("Device is a") {
            if let Some(stanza) = current.take() {
                push_drive(stanza, controller, disks);
            }
            if line.contains("Device is a Hard disk") {
                current = Some(DriveStanza::default());
            }
            continue;
        }
        let Some(stanza) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.contains("Enclosure #") {
            stanza.enclosure = value.to_string();
        } else if key.contains("Slot #") {
            stanza.slot = value.to_string();
        } else if key.contains("SAS Address") {
            stanza.sas_address = value.to_string();
        } else if key.contains("Model Number") {
            stanza.model = value.to_string();
        } else if key.contains("Manufacturer") {
            stanza.manufacturer = value.to_string();
        } else if key.contains("Serial No") {
            stanza.serial = value.to_string();
        } else if key.contains("GUID") {
            stanza.guid = value.to_string();
        }
    }
    if let Some(stanza) = current {
        push_drive(stanza, controller, disks);
    }
}

fn push_drive(stanza: DriveStanza, controller: &str, disks: &mut Vec<ControllerDisk>) {
    // the controller's own SEP shows up as a hard disk made by LSI
    if stanza.manufacturer.is_empty() || stanza.manufacturer.trim() == "LSI" {
        debug!(
            "Skipping device '{}' (manufacturer '{}')",
            stanza.sas_address, stanza.manufacturer
        );
        return;
    }
    let name = if stanza.guid.is_empty() {
        stanza.sas_address.clone()
    } else {
        stanza.guid.clone()
    };
    disks.push(ControllerDisk {
        name,
        controller: controller.to_string(),
        enclosure: stanza.enclosure.clone(),
        drive: stanza.slot.clone(),
        identity: DiskIdentity::new(Some(&stanza.guid), Some(&stanza.serial)),
        model: clean_field(&stanza.model),
        manufacturer: clean_field(&stanza.manufacturer),
    });
}

fn parse_display_enclosures(
    output: &str,
    controller: &str,
    enclosures: &mut Vec<ControllerEnclosure>,
) {
    let mut in_section = false;
    let mut seen_content = false;
    let mut number = String::new();
    let mut logical = String::new();
    let mut slots = String::new();
    for line in output.lines() {
        if line.contains("Enclosure information") {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '-') {
            // first rule closes the header box, the next one ends the section
            if seen_content {
                break;
            }
            continue;
        }
        seen_content = true;
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.contains("Enclosure#") {
            number = value.to_string();
        } else if key.contains("Logical ID") {
            logical = value.to_string();
        } else if key.contains("Numslots") {
            slots = value.to_string();
        } else if key.contains("StartSlot") {
            enclosures.push(ControllerEnclosure {
                controller: controller.to_string(),
                id: number.clone(),
                logical_id: clean_field(&logical),
                product: None,
                slots: slots.trim().parse().ok(),
                start_slot: value.parse().ok(),
            });
            number.clear();
            logical.clear();
            slots.clear();
        }
    }
}
