use crate::config::TopologyConfig;
use crate::domain::{ControllerDisk, ControllerEnclosure};
use log::debug;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnclosureKind {
    Internal,
    Jbod,
    Unknown,
    Other(String), // product identification reported by the tool
}

impl EnclosureKind {
    /// Heuristic from the slot count: backplanes are small, JBOD shelves large.
    pub fn from_slots(slots: Option<u32>) -> Self {
        match slots {
            Some(n) if n > 20 => EnclosureKind::Jbod,
            Some(n) if n <= 8 => EnclosureKind::Internal,
            _ => EnclosureKind::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EnclosureKind::Internal => "Internal",
            EnclosureKind::Jbod => "JBOD",
            EnclosureKind::Unknown => "Unknown",
            EnclosureKind::Other(name) => name,
        }
    }
}

/// A classified enclosure with its display name and slot numbering base.
#[derive(Clone, Debug)]
pub struct EnclosureDescriptor {
    pub controller: String,
    pub id: String,
    pub logical_id: Option<String>,
    pub kind: EnclosureKind,
    pub slots: Option<u32>,
    pub name: String,
    pub start_slot: i64,
    pub offset: i64,
    pub seen_index: usize, // position in first-seen order among the host's drives
}

pub struct EnclosureClassifier;

impl EnclosureClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Builds a descriptor for every enclosure that hosts at least one drive,
    /// keyed by (controller, enclosure id), in the order drives were reported.
    pub fn classify(
        &self,
        disks: &[ControllerDisk],
        enclosures: &[ControllerEnclosure],
        config: &TopologyConfig,
    ) -> HashMap<(String, String), EnclosureDescriptor> {
        let reported: HashMap<(String, String), &ControllerEnclosure> = enclosures
            .iter()
            .map(|e| ((e.controller.clone(), e.id.clone()), e))
            .collect();

        let mut descriptors = HashMap::new();
        let mut seen = 0usize;
        for disk in disks {
            // direct-attached drives have no enclosure
            if disk.enclosure.is_empty() {
                continue;
            }
            let key = (disk.controller.clone(), disk.enclosure.clone());
            if descriptors.contains_key(&key) {
                continue;
            }
            let descriptor = build_descriptor(&key, reported.get(&key).copied(), seen, config);
            debug!(
                "Enclosure {}:{} classified as '{}' (start slot {})",
                key.0, key.1, descriptor.name, descriptor.start_slot
            );
            descriptors.insert(key, descriptor);
            seen += 1;
        }
        descriptors
    }
}

impl Default for EnclosureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn build_descriptor(
    key: &(String, String),
    reported: Option<&ControllerEnclosure>,
    index: usize,
    config: &TopologyConfig,
) -> EnclosureDescriptor {
    let logical_id = reported.and_then(|r| r.logical_id.clone());
    let kind = match reported {
        Some(r) => match &r.product {
            Some(product) => EnclosureKind::Other(product.clone()),
            None => EnclosureKind::from_slots(r.slots),
        },
        None => EnclosureKind::Unknown,
    };

    let (name, start_slot, offset) = match config.enclosure_override(logical_id.as_deref(), &key.1)
    {
        Some(ov) => (ov.name.clone(), ov.start_slot, ov.offset),
        None => (
            default_name(index, &kind, &key.1),
            default_start_slot(index),
            0,
        ),
    };

    EnclosureDescriptor {
        controller: key.0.clone(),
        id: key.1.clone(),
        logical_id,
        kind,
        slots: reported.and_then(|r| r.slots),
        name,
        start_slot,
        offset,
        seen_index: index,
    }
}

/// The first enclosure seen is almost always the server chassis itself.
fn default_name(index: usize, kind: &EnclosureKind, id: &str) -> String {
    match index {
        0 => "Local".to_string(),
        1 | 2 => kind.label().to_string(),
        _ => format!("{}-{}", kind.label(), id),
    }
}

/// External shelves commonly continue bay numbering above the chassis bays.
fn default_start_slot(index: usize) -> i64 {
    if index == 2 {
        31
    } else {
        1
    }
}
