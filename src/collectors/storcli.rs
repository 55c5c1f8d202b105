use crate::collectors::ControllerCollector;
use crate::command::CommandRunner;
use crate::domain::{clean_field, ControllerDisk, ControllerEnclosure, DiskIdentity};
use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
struct DriveDetail {
    serial: String,
    vendor: String,
    wwn: String,
    model: String,
}

/// Adapter for Broadcom/LSI MegaRAID controllers via storcli or storcli2.
///
/// The two generations emit different JSON shapes: storcli2 reports drives in
/// a flat "PD LIST" with identity details in a separate per-slot query, while
/// classic storcli nests everything under per-drive "Physical Device
/// Information" sections. Both are handled here.
pub struct StorcliCollector {
    program: &'static str,
}

impl StorcliCollector {
    pub fn new(program: &'static str) -> Self {
        Self { program }
    }

    fn json(&self, output: &str) -> Result<Value> {
        serde_json::from_str(output).map_err(|e| Error::ToolFailed {
            tool: self.program.to_string(),
            reason: format!("unparseable JSON: {}", e),
        })
    }

    fn controller_count(output: &str) -> Option<u32> {
        for line in output.lines() {
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "Controller Count" {
                    return value.trim().parse().ok();
                }
            }
        }
        None
    }

    fn collect_disks(&self, runner: &CommandRunner) -> Result<Vec<ControllerDisk>> {
        let output = runner.run_cached(self.program, &["/call", "show", "all", "J"])?;
        let json = self.json(&output)?;
        let mut disks = Vec::new();
        let Some(controllers) = json.get("Controllers").and_then(Value::as_array) else {
            return Ok(disks);
        };
        for (index, controller) in controllers.iter().enumerate() {
            let Some(response) = controller.get("Response Data") else {
                continue;
            };
            let controller_num = controller_number(controller, index);
            if response.get("PD LIST").is_some() {
                let details = self.drive_details(runner, &controller_num);
                parse_pd_list(response, &controller_num, &details, &mut disks);
            } else {
                parse_drive_sections(response, &controller_num, &mut disks);
            }
        }
        debug!("Found {} drives via {}", disks.len(), self.program);
        Ok(disks)
    }

    /// Identity details for storcli2 drives, keyed by "enclosure:slot".
    fn drive_details(&self, runner: &CommandRunner, controller: &str) -> HashMap<String, DriveDetail> {
        let targets = [
            "/call/eall/sall".to_string(),
            format!("/c{}/eall/sall", controller),
        ];
        for target in &targets {
            match runner.run_cached(self.program, &[target, "show", "all", "J"]) {
                Ok(output) => {
                    if let Ok(json) = self.json(&output) {
                        let details = parse_drive_details(&json);
                        if !details.is_empty() {
                            return details;
                        }
                    }
                }
                Err(e) => debug!("{} {} show all failed: {}", self.program, target, e),
            }
        }
        HashMap::new()
    }

    fn collect_enclosures(&self, runner: &CommandRunner) -> Result<Vec<ControllerEnclosure>> {
        let output = runner.run_cached(self.program, &["/call/eall", "show", "all", "J"])?;
        let json = self.json(&output)?;
        let mut enclosures = Vec::new();
        let Some(controllers) = json.get("Controllers").and_then(Value::as_array) else {
            return Ok(enclosures);
        };
        for (index, controller) in controllers.iter().enumerate() {
            let Some(response) = controller.get("Response Data") else {
                continue;
            };
            let controller_num = controller_number(controller, index);
            let list = response
                .get("Enclosures")
                .or_else(|| response.get("Enclosure List"))
                .and_then(Value::as_array);
            if let Some(list) = list {
                parse_enclosure_list(list, &controller_num, &mut enclosures);
            } else {
                parse_enclosure_sections(response, &controller_num, &mut enclosures);
            }
        }
        debug!("Found {} enclosures via {}", enclosures.len(), self.program);
        Ok(enclosures)
    }
}

impl ControllerCollector for StorcliCollector {
    fn name(&self) -> &'static str {
        self.program
    }

    fn probe(&self, runner: &CommandRunner) -> bool {
        match runner.run_cached(self.program, &["show", "ctrlcount"]) {
            Ok(output) => Self::controller_count(&output).is_some_and(|n| n > 0),
            Err(e) => {
                debug!("{} probe failed: {}", self.program, e);
                false
            }
        }
    }

    fn disks(&self, runner: &CommandRunner) -> Result<Vec<ControllerDisk>> {
        self.collect_disks(runner)
    }

    fn enclosures(&self, runner: &CommandRunner) -> Result<Vec<ControllerEnclosure>> {
        self.collect_enclosures(runner)
    }
}

fn controller_number(controller: &Value, index: usize) -> String {
    let num = text(controller.get("Command Status"), "Controller");
    if num.is_empty() {
        index.to_string()
    } else {
        num
    }
}

/// String view of a JSON field; storcli mixes strings and bare numbers.
fn text(value: Option<&Value>, key: &str) -> String {
    match value.and_then(|v| v.get(key)) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Enclosure and slot digits from a "/cX/eY/sZ" path. The enclosure part is
/// optional, direct-attached drives have none.
fn parse_drive_path(path: &str) -> Option<(String, String)> {
    let mut enclosure = String::new();
    let mut slot = String::new();
    for segment in path.split('/') {
        if let Some(rest) = segment.strip_prefix('e') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                enclosure = rest.to_string();
            }
        } else if let Some(rest) = segment.strip_prefix('s') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                slot = rest.to_string();
            }
        }
    }
    if slot.is_empty() {
        None
    } else {
        Some((enclosure, slot))
    }
}

fn parse_enclosure_path(path: &str) -> Option<String> {
    for segment in path.split('/') {
        if let Some(rest) = segment.strip_prefix('e') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return Some(rest.to_string());
            }
        }
    }
    None
}

fn parse_pd_list(
    response: &Value,
    controller: &str,
    details: &HashMap<String, DriveDetail>,
    disks: &mut Vec<ControllerDisk>,
) {
    let Some(list) = response.get("PD LIST").and_then(Value::as_array) else {
        return;
    };
    for entry in list {
        let eid_slt = text(Some(entry), "EID:Slt");
        let Some((enclosure, slot)) = eid_slt.split_once(':') else {
            continue;
        };
        let (enclosure, slot) = (enclosure.trim(), slot.trim());
        if enclosure.is_empty() || slot.is_empty() {
            continue;
        }
        let detail = details.get(&format!("{}:{}", enclosure, slot));
        let model = {
            let from_list = text(Some(entry), "Model");
            if from_list.is_empty() {
                detail.map(|d| d.model.clone()).unwrap_or_default()
            } else {
                from_list
            }
        };
        disks.push(ControllerDisk {
            name: format!("/c{}/e{}/s{}", controller, enclosure, slot),
            controller: controller.to_string(),
            enclosure: enclosure.to_string(),
            drive: slot.to_string(),
            identity: DiskIdentity::new(
                detail.map(|d| d.wwn.as_str()),
                detail.map(|d| d.serial.as_str()),
            ),
            model: clean_field(&model),
            manufacturer: detail.and_then(|d| clean_field(&d.vendor)),
        });
    }
}

fn parse_drive_sections(response: &Value, controller: &str, disks: &mut Vec<ControllerDisk>) {
    let Some(section) = response
        .get("Physical Device Information")
        .and_then(Value::as_object)
    else {
        return;
    };
    for (key, entry) in section {
        if !key.starts_with("Drive ") || key.contains("Detailed Information") {
            continue;
        }
        let path = key.trim_start_matches("Drive ").trim();
        let attrs = section
            .get(&format!("{} - Detailed Information", key))
            .and_then(|d| d.get(format!("{} Device attributes", key)));
        let serial = text(attrs, "SN");
        // classic storcli lists configured-away slots with blank attributes
        if serial.is_empty() {
            continue;
        }
        let first = entry.as_array().and_then(|a| a.first());
        let (enclosure, slot) = match parse_drive_path(path) {
            Some(pair) => pair,
            None => {
                let eid_slt = text(first, "EID:Slt");
                match eid_slt.split_once(':') {
                    Some((e, s)) => (e.trim().to_string(), s.trim().to_string()),
                    None => continue,
                }
            }
        };
        let model = {
            let from_list = text(first, "Model");
            if from_list.is_empty() {
                text(attrs, "Model Number")
            } else {
                from_list
            }
        };
        disks.push(ControllerDisk {
            name: path.to_string(),
            controller: controller.to_string(),
            enclosure,
            drive: slot,
            identity: DiskIdentity::new(Some(&text(attrs, "WWN")), Some(&serial)),
            model: clean_field(&model),
            manufacturer: clean_field(&text(attrs, "Manufacturer Id")),
        });
    }
}

fn parse_drive_details(json: &Value) -> HashMap<String, DriveDetail> {
    let mut details = HashMap::new();
    let Some(controllers) = json.get("Controllers").and_then(Value::as_array) else {
        return details;
    };
    for controller in controllers {
        let Some(response) = controller.get("Response Data") else {
            continue;
        };
        if let Some(list) = response.get("Drives List").and_then(Value::as_array) {
            for item in list {
                let eid_slt = text(item.get("Drive Information"), "EID:Slt");
                if eid_slt.is_empty() {
                    continue;
                }
                let info = item.get("Drive Detailed Information");
                details.insert(
                    eid_slt,
                    DriveDetail {
                        serial: text(info, "Serial Number"),
                        vendor: text(info, "Vendor"),
                        wwn: text(info, "WWN"),
                        model: text(info, "Model"),
                    },
                );
            }
        } else if let Some(section) = response
            .get("Physical Device Information")
            .and_then(Value::as_object)
        {
            for key in section.keys() {
                if !key.starts_with("Drive ") || key.contains("Detailed Information") {
                    continue;
                }
                let path = key.trim_start_matches("Drive ").trim();
                let Some((enclosure, slot)) = parse_drive_path(path) else {
                    continue;
                };
                let attrs = section
                    .get(&format!("{} - Detailed Information", key))
                    .and_then(|d| d.get(format!("{} Device attributes", key)));
                details.insert(
                    format!("{}:{}", enclosure, slot),
                    DriveDetail {
                        serial: text(attrs, "SN"),
                        vendor: text(attrs, "Manufacturer Id"),
                        wwn: text(attrs, "WWN"),
                        model: text(attrs, "Model Number"),
                    },
                );
            }
        }
    }
    details
}

fn parse_enclosure_list(list: &[Value], controller: &str, enclosures: &mut Vec<ControllerEnclosure>) {
    for entry in list {
        let props = entry
            .get("Properties")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .unwrap_or(entry);
        let id = text(Some(props), "EID");
        if id.is_empty() {
            continue;
        }
        enclosures.push(ControllerEnclosure {
            controller: controller.to_string(),
            id,
            logical_id: None,
            product: clean_field(&text(Some(props), "ProdID")),
            slots: parse_number(&text(Some(props), "Slots")),
            start_slot: None,
        });
    }
}

fn parse_enclosure_sections(
    response: &Value,
    controller: &str,
    enclosures: &mut Vec<ControllerEnclosure>,
) {
    let Some(section) = response.as_object() else {
        return;
    };
    for (key, entry) in section {
        if !key.starts_with("Enclosure ") {
            continue;
        }
        let Some(id) = parse_enclosure_path(key.trim_start_matches("Enclosure ").trim()) else {
            continue;
        };
        let props = entry.get("Properties").and_then(Value::as_array).and_then(|a| a.first());
        enclosures.push(ControllerEnclosure {
            controller: controller.to_string(),
            id,
            logical_id: None,
            product: clean_field(&text(entry.get("Inquiry Data"), "Product Identification")),
            slots: parse_number(&text(props, "Slots")),
            start_slot: None,
        });
    }
}
