pub mod device;
pub mod enclosure;
pub mod topology;

pub use device::{
    clean_field, normalize_wwn, ControllerDisk, ControllerEnclosure, DiskIdentity, SystemDisk,
};
pub use enclosure::{EnclosureClassifier, EnclosureDescriptor, EnclosureKind};
pub use topology::{ReconciledDisk, TopologyMapper};
