use crate::domain::ReconciledDisk;
use std::collections::HashMap;

/// Rewrites device member lines of `zpool status` to carry the physical
/// location and serial; everything else passes through untouched.
pub fn overlay_status(status: &str, disks: &[ReconciledDisk]) -> String {
    let by_device: HashMap<&str, &ReconciledDisk> =
        disks.iter().map(|d| (d.device.as_str(), d)).collect();

    let mut out = String::new();
    for line in status.lines() {
        match annotate_line(line, &by_device) {
            Some(annotated) => out.push_str(&annotated),
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

fn annotate_line(line: &str, by_device: &HashMap<&str, &ReconciledDisk>) -> Option<String> {
    if !line.contains("/dev/") {
        return None;
    }
    let mut parts = line.split_whitespace();
    let device = parts.next()?;
    let state = parts.next().unwrap_or("");
    // pool members are usually partitions, so fall back to the whole disk
    let row = by_device
        .get(device)
        .or_else(|| by_device.get(resolve_base_device(device)))
        .copied()?;
    let indent = &line[..line.len() - line.trim_start().len()];
    Some(format!(
        "{}{} {} {} (S/N: {})",
        indent,
        device,
        state,
        row.location,
        row.serial.as_deref().unwrap_or("-")
    ))
}

/// Strips a partition suffix to find the whole-disk device. NVMe partitions
/// end in pN; other device names end in bare digits.
pub fn resolve_base_device(device: &str) -> &str {
    if device.contains("nvme") {
        if let Some(pos) = device.rfind('p') {
            let suffix = &device[pos + 1..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                return &device[..pos];
            }
        }
        return device;
    }
    device.trim_end_matches(|c: char| c.is_ascii_digit())
}
