pub mod zpool;

pub use zpool::overlay_status;

use crate::domain::{ControllerEnclosure, ReconciledDisk};
use crate::error::Result;

const SHORT_HEADERS: [&str; 7] = [
    "Device",
    "Serial",
    "Model",
    "Controller",
    "Enclosure",
    "Slot",
    "Location",
];

const LONG_HEADERS: [&str; 16] = [
    "Device",
    "WWN",
    "Serial",
    "Model",
    "Manufacturer",
    "Vendor",
    "Size",
    "Tran",
    "MPath",
    "Ctrl",
    "Enc",
    "Drive",
    "Enclosure",
    "PhysSlot",
    "LogDisk",
    "Location",
];

pub fn render_table(disks: &[ReconciledDisk], long: bool) -> String {
    if long {
        let rows: Vec<Vec<String>> = disks.iter().map(long_row).collect();
        format_table(&LONG_HEADERS, &rows)
    } else {
        let rows: Vec<Vec<String>> = disks.iter().map(short_row).collect();
        format_table(&SHORT_HEADERS, &rows)
    }
}

pub fn render_json(disks: &[ReconciledDisk]) -> Result<String> {
    Ok(serde_json::to_string_pretty(disks)?)
}

fn short_row(disk: &ReconciledDisk) -> Vec<String> {
    vec![
        disk.device.clone(),
        opt(&disk.serial),
        opt(&disk.model),
        opt(&disk.controller),
        opt(&disk.enclosure_name),
        num(disk.physical_slot),
        disk.location.clone(),
    ]
}

fn long_row(disk: &ReconciledDisk) -> Vec<String> {
    vec![
        disk.device.clone(),
        opt(&disk.wwn),
        opt(&disk.serial),
        opt(&disk.model),
        opt(&disk.manufacturer),
        opt(&disk.vendor),
        opt(&disk.size),
        opt(&disk.transport),
        opt(&disk.multipath),
        opt(&disk.controller),
        opt(&disk.enclosure),
        disk.drive_label.clone(),
        opt(&disk.enclosure_name),
        num(disk.physical_slot),
        num(disk.logical_disk),
        disk.location.clone(),
    ]
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn num(value: Option<i64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let rule = "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format_row(&header_cells, &widths));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        if i + 1 == cells.len() {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}", cell, width = widths[i]));
        }
    }
    line.trim_end().to_string()
}

/// Enclosure inventory plus a ready-to-paste config snippet.
pub fn render_enclosure_report(enclosures: &[ControllerEnclosure], filter: Option<&str>) -> String {
    let selected: Vec<&ControllerEnclosure> = match filter {
        Some(id) => enclosures.iter().filter(|e| e.id == id).collect(),
        None => enclosures.iter().collect(),
    };

    let mut out = String::new();
    if selected.is_empty() {
        match filter {
            Some(id) => out.push_str(&format!("No enclosure found with ID: {}\n", id)),
            None => out.push_str("No enclosures found\n"),
        }
        return out;
    }

    let bar = "=".repeat(80);
    out.push_str(&bar);
    out.push('\n');
    out.push_str("Enclosure Information\n");
    out.push_str(&bar);
    out.push('\n');
    for enclosure in &selected {
        out.push('\n');
        out.push_str(&format!("Controller: {}\n", enclosure.controller));
        out.push_str(&format!("Enclosure ID: {}\n", enclosure.id));
        if let Some(product) = &enclosure.product {
            out.push_str(&format!("Product ID: {}\n", product));
        }
        if let Some(logical) = &enclosure.logical_id {
            out.push_str(&format!("Logical ID: {}\n", logical));
        }
        if let Some(slots) = enclosure.slots {
            out.push_str(&format!("Slots: {}\n", slots));
        }
        if let Some(start) = enclosure.start_slot {
            out.push_str(&format!("Hardware start slot: {}\n", start));
        }
    }
    out.push('\n');
    out.push_str(&bar);
    out.push('\n');
    out.push_str(&format!(
        "Config Snippet for {}\n",
        crate::config::DEFAULT_CONFIG_NAME
    ));
    out.push_str(&bar);
    out.push('\n');
    out.push('\n');
    out.push_str("# Add to 'enclosures:' section:\n");
    for enclosure in &selected {
        let id = config_id(enclosure);
        out.push('\n');
        out.push_str(&format!("  - id: \"{}\"\n", id));
        out.push_str(&format!("    name: \"{}\"\n", id));
        out.push_str("    start_slot: 1\n");
    }
    out
}

/// The most stable identifier available for matching in a config file.
fn config_id(enclosure: &ControllerEnclosure) -> String {
    enclosure
        .product
        .clone()
        .or_else(|| enclosure.logical_id.clone())
        .unwrap_or_else(|| format!("Enclosure-{}", enclosure.id))
}
