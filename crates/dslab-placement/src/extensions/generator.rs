//! Random scenario generator.

use log::info;
use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::core::machine::{PhysicalMachine, VirtualMachine, DAY_LENGTH};
use crate::error::{Error, Result};
use crate::extensions::scenario::{Scenario, ScenarioSet};

/// Parameters of random scenario generation.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// Number of generated hosts.
    pub hosts: usize,
    /// Minimal number of VMs in a scenario.
    pub vm_min: usize,
    /// Maximal number of VMs in a scenario.
    pub vm_max: usize,
    /// Step between possible VM counts, which are `vm_min`, `vm_min + step`, ... up to `vm_max`.
    pub step: usize,
    /// Number of scenarios.
    pub scenarios: usize,
    /// Random seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    123
}

/// Generates hosts and independent VM batches.
///
/// Host CPU, RAM and storage are drawn uniformly from `[16, 32]`, `[32, 128]` and `[500, 1000]`.
/// VM CPU, RAM and storage are drawn from `[1, 8]`, `[1, 32]` and `[10, 200]`, arrival time from the whole day and
/// departure time from `[arrival, DAY_LENGTH]`.
pub struct ScenarioGenerator {
    config: GeneratorConfig,
    rand: Pcg64,
}

impl ScenarioGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        if config.vm_min > config.vm_max {
            return Err(Error::InvalidConfig(format!(
                "vm_min = {} is greater than vm_max = {}",
                config.vm_min, config.vm_max
            )));
        }
        if config.step == 0 {
            return Err(Error::InvalidConfig("step should be positive".to_string()));
        }
        let rand = Pcg64::seed_from_u64(config.seed);
        Ok(Self { config, rand })
    }

    /// Generates hosts named `PM_1`, `PM_2`, ...
    pub fn generate_hosts(&mut self) -> Vec<PhysicalMachine> {
        (1..=self.config.hosts)
            .map(|i| PhysicalMachine {
                name: format!("PM_{}", i),
                cpu: self.rand.gen_range(16..=32),
                ram: self.rand.gen_range(32..=128),
                storage: self.rand.gen_range(500..=1000),
            })
            .collect()
    }

    /// Generates VM batch of scenario `id` with VMs named `VM_{id}_1`, `VM_{id}_2`, ...
    pub fn generate_scenario(&mut self, id: usize) -> Scenario {
        let choices = (self.config.vm_max - self.config.vm_min) / self.config.step + 1;
        let vm_count = self.config.vm_min + self.config.step * self.rand.gen_range(0..choices);

        let mut vms = Vec::with_capacity(vm_count);
        for i in 1..=vm_count {
            let arrival = self.rand.gen_range(0..=DAY_LENGTH);
            let departure = self.rand.gen_range(arrival..=DAY_LENGTH);
            vms.push(VirtualMachine {
                name: format!("VM_{}_{}", id, i),
                cpu: self.rand.gen_range(1..=8),
                ram: self.rand.gen_range(1..=32),
                storage: self.rand.gen_range(10..=200),
                arrival,
                departure,
            });
        }
        Scenario { id, vms }
    }

    /// Generates scenario set. Uses the specified hosts or generates random ones if `hosts` is `None`.
    pub fn generate(&mut self, hosts: Option<Vec<PhysicalMachine>>) -> ScenarioSet {
        let hosts = hosts.unwrap_or_else(|| self.generate_hosts());
        let scenarios: Vec<Scenario> = (1..=self.config.scenarios)
            .map(|id| self.generate_scenario(id))
            .collect();
        info!(
            "Generated {} scenarios with {} hosts and {} VMs in total",
            scenarios.len(),
            hosts.len(),
            scenarios.iter().map(|s| s.vms.len()).sum::<usize>()
        );
        ScenarioSet { hosts, scenarios }
    }
}
