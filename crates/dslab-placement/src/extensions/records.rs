//! Plain text machine records.
//!
//! Each line holds one machine. Written records separate fields with single spaces:
//!
//! ```text
//! PM_1 24 64 800
//! VM_1_1 4 16 120 30 415
//! ```
//!
//! Host records are `name cpu ram storage`, VM records are `name cpu ram storage arrival departure`.
//! When reading, fields may be separated by any run of spaces or tabs and empty lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::StringRecord;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::error::{Error, Result};

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let record: T = StringRecord::from(fields)
            .deserialize(None)
            .map_err(|e| Error::Parse {
                path: path.display().to_string(),
                line: idx as u64 + 1,
                message: e.to_string(),
            })?;
        records.push(record);
    }
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Writes records to the file, one per line.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads host records from the file.
pub fn read_hosts(path: &Path) -> Result<Vec<PhysicalMachine>> {
    read_records(path)
}

/// Reads VM records from the file.
pub fn read_vms(path: &Path) -> Result<Vec<VirtualMachine>> {
    read_records(path)
}
