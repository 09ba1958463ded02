//! Tools for running experiments with multiple independent scenarios.

use std::fs;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dyn_clone::{clone_trait_object, DynClone};
use indexmap::map::IndexMap;
use log::info;
use serde::Serialize;
use threadpool::ThreadPool;

use crate::core::machine::PhysicalMachine;
use crate::core::tabu_search::TabuSearch;
use crate::core::usage::{analyze_usage, UsageReport};
use crate::core::validation::validate_input;
use crate::error::Result;
use crate::extensions::scenario::{Scenario, ScenarioSet};

/// Trait for implementing custom callbacks for scenario runs within an experiment.
pub trait ScenarioCallbacks: DynClone + Send {
    /// Runs before optimizing a scenario.
    fn on_scenario_start(&mut self, _scenario: &Scenario) {}

    /// Runs upon the completion of a scenario, returns additional results of this run.
    fn on_scenario_finish(&mut self, _result: &ScenarioResult) -> IndexMap<String, String> {
        IndexMap::new()
    }
}

clone_trait_object!(ScenarioCallbacks);

/// Callbacks doing nothing.
#[derive(Clone, Default)]
pub struct NoCallbacks;

impl ScenarioCallbacks for NoCallbacks {}

/// Contains result of one scenario run.
#[derive(Serialize, Clone, Debug)]
pub struct ScenarioResult {
    pub id: usize,
    pub total_vms: usize,
    /// Number of placed VMs (final score).
    pub placed_vms: usize,
    pub rejected_vms: usize,
    /// Percentage of VMs left unplaced.
    pub rejection_rate: f64,
    /// Score of the initial placement.
    pub initial_score: usize,
    /// Names of VMs left unplaced.
    pub unplaced: Vec<String>,
    /// Usage of every host, in host order.
    pub usage: IndexMap<String, UsageReport>,
    /// Mean of host CPU utilization percentages.
    pub avg_cpu_percent: f64,
    /// Mean of host RAM utilization percentages.
    pub avg_ram_percent: f64,
    /// Mean of host storage utilization percentages.
    pub avg_storage_percent: f64,
    /// Optimization time in seconds.
    pub elapsed: f64,
    /// Values returned by callbacks.
    pub extra: IndexMap<String, String>,
}

/// Metrics averaged over all scenarios of experiment.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ExperimentSummary {
    pub scenarios: usize,
    pub avg_rejection_rate: f64,
    pub avg_cpu_percent: f64,
    pub avg_ram_percent: f64,
    pub avg_storage_percent: f64,
}

/// Contains results of all scenario runs ordered by scenario id.
#[derive(Serialize, Clone, Debug)]
pub struct ExperimentResults {
    pub scenarios: Vec<ScenarioResult>,
    pub summary: ExperimentSummary,
}

impl ExperimentResults {
    /// Saves results as `results.json` in the specified directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut file = File::create(dir.join("results.json"))?;
        serde_json::to_writer_pretty(&mut file, self)?;
        Ok(())
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0., 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.
    } else {
        sum / count as f64
    }
}

/// Optimizes placement of a single scenario and collects its metrics.
pub fn run_scenario(optimizer: &TabuSearch, hosts: &[PhysicalMachine], scenario: &Scenario) -> ScenarioResult {
    let start_time = Instant::now();
    let result = optimizer.optimize(&scenario.vms, hosts);
    let elapsed = start_time.elapsed().as_secs_f64();

    let usage = analyze_usage(&result.placement, hosts);
    let total_vms = scenario.vms.len();
    let rejected_vms = result.unplaced.len();
    let rejection_rate = if total_vms > 0 {
        rejected_vms as f64 / total_vms as f64 * 100.
    } else {
        0.
    };

    ScenarioResult {
        id: scenario.id,
        total_vms,
        placed_vms: result.score,
        rejected_vms,
        rejection_rate,
        initial_score: result.initial_score,
        unplaced: result.unplaced.iter().map(|vm| vm.name.clone()).collect(),
        avg_cpu_percent: mean(usage.values().map(|u| u.cpu_percent)),
        avg_ram_percent: mean(usage.values().map(|u| u.ram_percent)),
        avg_storage_percent: mean(usage.values().map(|u| u.storage_percent)),
        usage,
        elapsed,
        extra: IndexMap::new(),
    }
}

/// Computes experiment-wide averages.
pub fn summarize(results: &[ScenarioResult]) -> ExperimentSummary {
    ExperimentSummary {
        scenarios: results.len(),
        avg_rejection_rate: mean(results.iter().map(|r| r.rejection_rate)),
        avg_cpu_percent: mean(results.iter().map(|r| r.avg_cpu_percent)),
        avg_ram_percent: mean(results.iter().map(|r| r.avg_ram_percent)),
        avg_storage_percent: mean(results.iter().map(|r| r.avg_storage_percent)),
    }
}

/// Implements execution of experiment.
pub struct Experiment {
    hosts: Arc<Vec<PhysicalMachine>>,
    scenarios: Vec<Scenario>,
    optimizer: TabuSearch,
    callbacks: Box<dyn ScenarioCallbacks>,
}

impl Experiment {
    /// Creates experiment, validating hosts and all scenarios.
    pub fn new(set: ScenarioSet, optimizer: TabuSearch, callbacks: Box<dyn ScenarioCallbacks>) -> Result<Self> {
        for scenario in &set.scenarios {
            validate_input(&scenario.vms, &set.hosts)?;
        }
        Ok(Self {
            hosts: Arc::new(set.hosts),
            scenarios: set.scenarios,
            optimizer,
            callbacks,
        })
    }

    /// Runs the experiment using the specified number of threads. Scenarios are processed independently.
    pub fn run(self, num_threads: usize) -> ExperimentResults {
        let total_runs = self.scenarios.len();
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads.max(1));
        let start_time = Instant::now();

        for scenario in self.scenarios.into_iter() {
            let hosts = self.hosts.clone();
            let optimizer = self.optimizer.clone();
            let mut callbacks = self.callbacks.clone();
            let results = results.clone();

            pool.execute(move || {
                callbacks.on_scenario_start(&scenario);
                let mut result = run_scenario(&optimizer, &hosts, &scenario);
                result.extra = callbacks.on_scenario_finish(&result);
                info!(
                    "Scenario {}: placed {}/{} VMs, rejection rate {:.2}%",
                    result.id, result.placed_vms, result.total_vms, result.rejection_rate
                );
                results.lock().unwrap().push(result);
            });
        }

        pool.join();
        info!("Finished {} runs in {:.2?}", total_runs, start_time.elapsed());

        let mut scenarios = Arc::try_unwrap(results)
            .map(|results| results.into_inner().unwrap())
            .unwrap_or_else(|shared| shared.lock().unwrap().clone());
        scenarios.sort_by_key(|r| r.id);
        let summary = summarize(&scenarios);
        ExperimentResults { scenarios, summary }
    }
}
