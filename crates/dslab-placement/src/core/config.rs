//! Placement configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::machine::PhysicalMachine;
use crate::core::tabu_search::{OptimizerConfig, TabuSearch};
use crate::core::vm_placement_algorithm::placement_algorithm_resolver;
use crate::error::{Error, Result};
use crate::extensions::generator::GeneratorConfig;

/// Holds raw placement config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawPlacementConfig {
    pub iterations: Option<usize>,
    pub tabu_size: Option<usize>,
    pub threads: Option<usize>,
    pub initial_algorithm: Option<String>,
    pub hosts: Option<Vec<HostConfig>>,
    pub generator: Option<GeneratorConfig>,
}

/// Holds configuration of a single physical host or a set of identical hosts.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Host name.
    /// Should be set if count = 1.
    pub name: Option<String>,
    /// Host name prefix.
    /// Full name is produced by appending host instance number (starting from 1) to the prefix.
    /// Should be set if count > 1.
    pub name_prefix: Option<String>,
    /// Host CPU capacity.
    pub cpu: u32,
    /// Host RAM capacity.
    pub ram: u64,
    /// Host storage capacity.
    pub storage: u64,
    /// Number of such hosts.
    pub count: Option<u32>,
}

impl HostConfig {
    /// Expands the config into the list of hosts it describes.
    pub fn physical_machines(&self) -> Result<Vec<PhysicalMachine>> {
        let count = self.count.unwrap_or(1);
        if count == 1 {
            if let Some(name) = &self.name {
                return Ok(vec![PhysicalMachine::new(name, self.cpu, self.ram, self.storage)]);
            }
        }
        let prefix = self.name_prefix.as_ref().ok_or_else(|| {
            Error::InvalidConfig(format!("host config with count = {} should have name_prefix", count))
        })?;
        Ok((1..=count)
            .map(|i| PhysicalMachine::new(&format!("{}{}", prefix, i), self.cpu, self.ram, self.storage))
            .collect())
    }
}

/// Represents placement configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct PlacementConfig {
    /// Tabu search parameters.
    pub optimizer: OptimizerConfig,
    /// Name of the algorithm used to build the initial placement.
    pub initial_algorithm: String,
    /// Configurations of physical hosts. Used instead of randomly generated hosts if not empty.
    pub hosts: Vec<HostConfig>,
    /// Parameters of random scenario generation.
    pub generator: Option<GeneratorConfig>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            initial_algorithm: "FirstFit".to_string(),
            hosts: Vec::new(),
            generator: None,
        }
    }
}

impl PlacementConfig {
    /// Creates placement config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Creates placement config from YAML string (uses default values if some parameters are absent).
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawPlacementConfig = serde_yaml::from_str(yaml)?;
        let defaults = Self::default();

        let config = Self {
            optimizer: OptimizerConfig {
                iterations: raw.iterations.unwrap_or(defaults.optimizer.iterations),
                tabu_size: raw.tabu_size.unwrap_or(defaults.optimizer.tabu_size),
                threads: raw.threads.unwrap_or(defaults.optimizer.threads),
            },
            initial_algorithm: raw.initial_algorithm.unwrap_or(defaults.initial_algorithm),
            hosts: raw.hosts.unwrap_or_default(),
            generator: raw.generator,
        };

        if config.optimizer.threads == 0 {
            return Err(Error::InvalidConfig("threads should be positive".to_string()));
        }
        placement_algorithm_resolver(&config.initial_algorithm)?;
        Ok(config)
    }

    /// Returns hosts described in the config, in config order.
    pub fn physical_machines(&self) -> Result<Vec<PhysicalMachine>> {
        let mut pms = Vec::new();
        for host in &self.hosts {
            pms.extend(host.physical_machines()?);
        }
        Ok(pms)
    }

    /// Creates optimizer with the configured parameters and initial placement algorithm.
    pub fn optimizer(&self) -> Result<TabuSearch> {
        let algorithm = placement_algorithm_resolver(&self.initial_algorithm)?;
        Ok(TabuSearch::with_algorithm(self.optimizer.clone(), algorithm))
    }
}
