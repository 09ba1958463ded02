//! Error type of placement library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("VM {vm} arrives at {arrival} after its departure at {departure}")]
    InvalidTimeWindow { vm: String, arrival: u32, departure: u32 },

    #[error("VM {vm} uses time {time} outside of the day (0..=1440)")]
    TimeOutOfRange { vm: String, time: u32 },

    #[error("Duplicate machine name: {name}")]
    DuplicateMachine { name: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Can't parse {path} at line {line}: {message}")]
    Parse { path: String, line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
