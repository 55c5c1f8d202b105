use std::collections::HashMap;

use baymap::config::TopologyConfig;
use baymap::domain::{
    ControllerDisk, ControllerEnclosure, DiskIdentity, EnclosureClassifier, SystemDisk,
    TopologyMapper,
};
use baymap::output;

fn record(enclosure: &str, drive: &str, wwn: &str, serial: &str) -> ControllerDisk {
    ControllerDisk {
        name: format!("/c0/e{}/s{}", enclosure, drive),
        controller: "0".to_string(),
        enclosure: enclosure.to_string(),
        drive: drive.to_string(),
        identity: DiskIdentity::new(Some(wwn), Some(serial)),
        model: Some("WDC WD30EFRX-68AX9N0".to_string()),
        manufacturer: Some("WDC".to_string()),
    }
}

fn reported(enclosure: &str, slots: u32, logical_id: Option<&str>, product: Option<&str>) -> ControllerEnclosure {
    ControllerEnclosure {
        controller: "0".to_string(),
        id: enclosure.to_string(),
        logical_id: logical_id.map(str::to_string),
        product: product.map(str::to_string),
        slots: Some(slots),
        start_slot: None,
    }
}

fn device(name: &str, wwn: Option<&str>, serial: Option<&str>) -> SystemDisk {
    SystemDisk {
        name: name.to_string(),
        wwn: wwn.map(str::to_string),
        serial: serial.map(str::to_string),
        vendor: Some("ATA".to_string()),
        model: Some("WDC WD30EFRX".to_string()),
        size: Some("2.7T".to_string()),
        transport: Some("sas".to_string()),
        ..SystemDisk::default()
    }
}

fn lab_host() -> (Vec<ControllerDisk>, Vec<ControllerEnclosure>, Vec<SystemDisk>, TopologyConfig) {
    let records = vec![
        record("8", "0", "aa01", "SER-A0"),
        record("8", "1", "aa02", "SER-A1"),
        record("8", "7", "aa07", "PINNED01"),
        record("9", "0", "bb00", "SER-B0"),
        record("10", "0", "cc00", "SER-C0"),
    ];
    let enclosures = vec![
        reported("8", 8, None, Some("SGPIO")),
        reported("9", 44, Some("50030480:1e706a00"), None),
        reported("10", 44, None, None),
    ];
    let devices = vec![
        device("/dev/sda", Some("0xAA01"), Some("SER-A0")),
        device("/dev/sdb", Some("0xAA02"), Some("SER-A1")),
        device("/dev/sdc", Some("0xAA07"), Some("PINNED01")),
        device("/dev/sdd", Some("0xBB00"), Some("SER-B0")),
        device("/dev/sde", Some("0xCC00"), Some("SER-C0")),
        device("/dev/zd0", None, None),
    ];
    let config = TopologyConfig::parse(
        r#"
enclosures:
  - id: "50030480:1e706a00"
    name: "Shelf A"
    start_slot: 100
disks:
  - serial: "PINNED01"
    enclosure: "Bench"
    slot: 42
    disk: 41
"#,
    )
    .unwrap();
    (records, enclosures, devices, config)
}

#[test]
fn test_full_pipeline_locations() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let rows = TopologyMapper::new().reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &descriptors,
        &config,
    );

    assert_eq!(rows.len(), devices.len());
    let location = |device: &str| {
        rows.iter()
            .find(|r| r.device == device)
            .map(|r| r.location.clone())
            .unwrap()
    };

    // chassis backplane keeps the default name and base
    assert_eq!(location("/dev/sda"), "Local;SLOT:1;DISK:0");
    assert_eq!(location("/dev/sdb"), "Local;SLOT:2;DISK:1");
    // serial override beats enclosure numbering
    assert_eq!(location("/dev/sdc"), "Bench;SLOT:42;DISK:41");
    // renamed shelf uses the configured slot base
    assert_eq!(location("/dev/sdd"), "Shelf A;SLOT:100;DISK:99");
    // third enclosure continues bay numbering at 31
    assert_eq!(location("/dev/sde"), "JBOD;SLOT:31;DISK:30");
    // ZFS volumes have no identity and stay unresolved
    assert_eq!(location("/dev/zd0"), "-");
}

#[test]
fn test_full_pipeline_row_order() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let rows = TopologyMapper::new().reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &descriptors,
        &config,
    );

    let order: Vec<&str> = rows.iter().map(|r| r.device.as_str()).collect();
    assert_eq!(
        order,
        vec!["/dev/sdc", "/dev/sde", "/dev/sda", "/dev/sdb", "/dev/sdd", "/dev/zd0"]
    );
}

#[test]
fn test_multipath_alias_carried_into_rows() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let mut maps = HashMap::new();
    maps.insert("3bb00".to_string(), "dm-3".to_string());

    let rows = TopologyMapper::new().reconcile(&records, &devices, &maps, &descriptors, &config);
    let sdd = rows.iter().find(|r| r.device == "/dev/sdd").unwrap();
    assert_eq!(sdd.multipath.as_deref(), Some("dm-3"));
}

#[test]
fn test_json_rendering_round_trip() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let rows = TopologyMapper::new().reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &descriptors,
        &config,
    );

    let json = output::render_json(&rows).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), devices.len());

    let zd0 = entries
        .iter()
        .find(|e| e["device"] == "/dev/zd0")
        .unwrap();
    assert!(zd0["physical_slot"].is_null());
    assert!(zd0["controller"].is_null());
    assert_eq!(zd0["location"], "-");

    let sda = entries
        .iter()
        .find(|e| e["device"] == "/dev/sda")
        .unwrap();
    assert_eq!(sda["wwn"], "aa01");
    assert_eq!(sda["physical_slot"], 1);
    assert_eq!(sda["logical_disk"], 0);
}

#[test]
fn test_table_rendering_contains_locations() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let rows = TopologyMapper::new().reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &descriptors,
        &config,
    );

    let table = output::render_table(&rows, false);
    assert!(table.contains("Local;SLOT:1;DISK:0"));
    assert!(table.contains("Shelf A;SLOT:100;DISK:99"));

    let long = output::render_table(&rows, true);
    assert!(long.contains("aa01"));
    assert!(long.contains("PhysSlot"));
}

#[test]
fn test_zpool_overlay_uses_resolved_locations() {
    let (records, enclosures, devices, config) = lab_host();
    let descriptors = EnclosureClassifier::new().classify(&records, &enclosures, &config);
    let rows = TopologyMapper::new().reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &descriptors,
        &config,
    );

    let status = "  pool: tank\nconfig:\n\n\
\tNAME        STATE     READ WRITE CKSUM\n\
\ttank        ONLINE       0     0     0\n\
\t    /dev/sda1  ONLINE       0     0     0\n\
\t    /dev/sdd1  ONLINE       0     0     0\n";
    let annotated = output::overlay_status(status, &rows);

    assert!(annotated.contains("\t    /dev/sda1 ONLINE Local;SLOT:1;DISK:0 (S/N: SER-A0)\n"));
    assert!(annotated.contains("\t    /dev/sdd1 ONLINE Shelf A;SLOT:100;DISK:99 (S/N: SER-B0)\n"));
    assert!(annotated.contains("  pool: tank\n"));
}

#[test]
fn test_host_without_controller_degrades() {
    let devices = vec![
        device("/dev/sda", Some("0xAA01"), Some("SER-A0")),
        device("/dev/sdb", None, Some("SER-A1")),
    ];
    let config = TopologyConfig::default();
    let descriptors = EnclosureClassifier::new().classify(&[], &[], &config);
    let rows =
        TopologyMapper::new().reconcile(&[], &devices, &HashMap::new(), &descriptors, &config);

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.location == "-"));
    assert!(rows.iter().all(|r| r.physical_slot.is_none()));
    // unresolved rows keep device order
    assert_eq!(rows[0].device, "/dev/sda");
    assert_eq!(rows[1].device, "/dev/sdb");
}

#[test]
fn test_pipeline_is_deterministic() {
    let (records, enclosures, devices, config) = lab_host();
    let classifier = EnclosureClassifier::new();
    let mapper = TopologyMapper::new();

    let first_descriptors = classifier.classify(&records, &enclosures, &config);
    let first = mapper.reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &first_descriptors,
        &config,
    );
    let second_descriptors = classifier.classify(&records, &enclosures, &config);
    let second = mapper.reconcile(
        &records,
        &devices,
        &HashMap::new(),
        &second_descriptors,
        &config,
    );

    let locations = |rows: &[baymap::domain::ReconciledDisk]| -> Vec<(String, String)> {
        rows.iter()
            .map(|r| (r.device.clone(), r.location.clone()))
            .collect()
    };
    assert_eq!(locations(&first), locations(&second));
}
