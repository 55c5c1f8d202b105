/// Normalized identifiers used to match controller records against OS block devices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskIdentity {
    pub wwn: Option<String>,    // lowercase hex, no 0x prefix
    pub serial: Option<String>, // case preserved
}

impl DiskIdentity {
    pub fn new(wwn: Option<&str>, serial: Option<&str>) -> Self {
        Self {
            wwn: wwn.and_then(normalize_wwn),
            serial: serial.and_then(clean_field),
        }
    }
}

/// Strips placeholder values tools emit for fields they do not know.
pub fn clean_field(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for placeholder in ["n/a", "null", "none"] {
        if value.eq_ignore_ascii_case(placeholder) {
            return None;
        }
    }
    Some(value.to_string())
}

/// Canonical WWN form: lowercase hex without the 0x prefix.
pub fn normalize_wwn(value: &str) -> Option<String> {
    let value = clean_field(value)?;
    let stripped = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(&value);
    Some(stripped.to_ascii_lowercase())
}

/// A physical drive as seen by a RAID/HBA controller tool.
#[derive(Clone, Debug)]
pub struct ControllerDisk {
    pub name: String,       // tool-specific handle, e.g. "/c0/e8/s4" or a GUID
    pub controller: String, // controller number
    pub enclosure: String,  // controller-local enclosure id, may be empty
    pub drive: String,      // raw drive index token, verbatim from the tool
    pub identity: DiskIdentity,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

impl ControllerDisk {
    /// The drive token parsed as a numeric index, when it is one.
    pub fn drive_index(&self) -> Option<u32> {
        self.drive.trim().parse().ok()
    }
}

/// An enclosure as reported by a controller tool, before classification.
#[derive(Clone, Debug)]
pub struct ControllerEnclosure {
    pub controller: String,
    pub id: String,
    pub logical_id: Option<String>,
    pub product: Option<String>,
    pub slots: Option<u32>,
    pub start_slot: Option<u32>,
}

/// A block device as reported by the OS device enumerator.
#[derive(Clone, Debug, Default)]
pub struct SystemDisk {
    pub name: String, // device path, e.g. /dev/sda
    pub wwn: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub revision: Option<String>,
    pub serial: Option<String>,
    pub size: Option<String>,
    pub ptuuid: Option<String>,
    pub hctl: Option<String>,
    pub transport: Option<String>,
    pub kind: Option<String>,      // lsblk device type (disk, rom, ...)
    pub multipath: Option<String>, // dm alias when the device is multipathed
}

impl SystemDisk {
    pub fn identity(&self) -> DiskIdentity {
        DiskIdentity::new(self.wwn.as_deref(), self.serial.as_deref())
    }
}
