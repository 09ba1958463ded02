//! Scenario directories.
//!
//! A directory holds the host list in `hosts.txt` and the VM batch of scenario `k` in `vms_{k}.txt`, all in the
//! [record format](crate::extensions::records).

use std::fs;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::validation::{validate_hosts, validate_vms};
use crate::error::Result;
use crate::extensions::records::{read_hosts, read_vms, write_records};

pub const HOSTS_FILE: &str = "hosts.txt";

/// Independent VM batch placed in a single optimization run.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Scenario {
    pub id: usize,
    pub vms: Vec<VirtualMachine>,
}

/// Hosts shared by a series of scenarios.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ScenarioSet {
    pub hosts: Vec<PhysicalMachine>,
    pub scenarios: Vec<Scenario>,
}

/// Returns the name of file with VMs of the specified scenario.
pub fn scenario_file_name(id: usize) -> String {
    format!("vms_{}.txt", id)
}

/// Extracts scenario number from a file name like `vms_12.txt`.
fn parse_scenario_id(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("vms_")?
        .strip_suffix(".txt")?
        .parse::<usize>()
        .ok()
}

impl ScenarioSet {
    /// Loads hosts and all scenarios from the directory, ordered by scenario number.
    ///
    /// Files not matching the naming scheme are ignored. Loaded machines are validated.
    pub fn load(dir: &Path) -> Result<Self> {
        let hosts = read_hosts(&dir.join(HOSTS_FILE))?;
        validate_hosts(&hosts)?;

        let mut scenario_files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(parse_scenario_id) {
                scenario_files.push((id, entry.path()));
            }
        }
        scenario_files.sort_by_key(|(id, _)| *id);

        let mut scenarios = Vec::with_capacity(scenario_files.len());
        for (id, path) in scenario_files {
            let vms = read_vms(&path)?;
            validate_vms(&vms)?;
            scenarios.push(Scenario { id, vms });
        }

        info!(
            "Loaded {} hosts and {} scenarios from {}",
            hosts.len(),
            scenarios.len(),
            dir.display()
        );
        Ok(Self { hosts, scenarios })
    }

    /// Saves hosts and scenarios to the directory, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        write_records(&dir.join(HOSTS_FILE), &self.hosts)?;
        for scenario in &self.scenarios {
            write_records(&dir.join(scenario_file_name(scenario.id)), &scenario.vms)?;
        }
        info!("Saved {} scenarios to {}", self.scenarios.len(), dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::parse_scenario_id;

    #[test]
    fn test_parse_scenario_id() {
        assert_eq!(parse_scenario_id("vms_1.txt"), Some(1));
        assert_eq!(parse_scenario_id("vms_12.txt"), Some(12));
        assert_eq!(parse_scenario_id("hosts.txt"), None);
        assert_eq!(parse_scenario_id("vms_x.txt"), None);
        assert_eq!(parse_scenario_id("vms_3.csv"), None);
    }
}
