//! Physical disk bay location reconciliation.
//!
//! Correlates RAID/HBA controller tool output (storcli, storcli2, sas2ircu,
//! sas3ircu) with the OS block device list to work out which bay each disk
//! sits in, with YAML overrides for enclosure naming and slot numbering.

pub mod cache;
pub mod collectors;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;

pub use error::{Error, Result};
