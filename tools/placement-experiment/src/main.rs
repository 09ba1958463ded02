use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use indexmap::map::IndexMap;
use log::info;

use dslab_placement::core::config::PlacementConfig;
use dslab_placement::error::{Error, Result};
use dslab_placement::experiment::{Experiment, ExperimentResults, ScenarioCallbacks, ScenarioResult};
use dslab_placement::extensions::generator::ScenarioGenerator;
use dslab_placement::extensions::scenario::{Scenario, ScenarioSet};

fn init_logger() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Places VMs with time windows onto hosts using tabu search
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generates random scenarios and saves them to a directory
    Generate {
        /// Path to YAML file with placement configuration containing generator section
        #[arg(short, long)]
        config: PathBuf,

        /// Directory for produced scenario files
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Places VMs of all scenarios from a directory
    Run {
        /// Directory with hosts.txt and vms_<N>.txt files
        #[arg(short, long)]
        scenarios: PathBuf,

        /// Path to YAML file with placement configuration (default values are used if not set)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for produced results.json
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of threads to use (default - use all available cores)
        #[arg(short, long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
        threads: usize,
    },
}

#[derive(Clone)]
struct ReportCallbacks;

impl ScenarioCallbacks for ReportCallbacks {
    fn on_scenario_start(&mut self, scenario: &Scenario) {
        info!("Scenario {}: {} VMs", scenario.id, scenario.vms.len());
    }

    fn on_scenario_finish(&mut self, result: &ScenarioResult) -> IndexMap<String, String> {
        let mut extra = IndexMap::new();
        extra.insert(
            "search_gain".to_string(),
            format!("{}", result.placed_vms - result.initial_score),
        );
        extra
    }
}

fn print_scenario(result: &ScenarioResult) {
    println!("\n=== Scenario {} ===", result.id);
    println!("VMs: {}", result.total_vms);
    for (host, usage) in result.usage.iter() {
        println!("\n{}:", host);
        println!(
            "- CPU used: {:.2}% ({}/{})",
            usage.cpu_percent, usage.used_cpu, usage.cpu_capacity
        );
        println!(
            "- RAM used: {:.2}% ({}/{})",
            usage.ram_percent, usage.used_ram, usage.ram_capacity
        );
        println!(
            "- Storage used: {:.2}% ({}/{})",
            usage.storage_percent, usage.used_storage, usage.storage_capacity
        );
        if usage.vms.is_empty() {
            println!("- Placed VMs: none");
        } else {
            println!("- Placed VMs: {}", usage.vms.join(", "));
        }
    }
    println!("\nSummary for scenario {}:", result.id);
    println!("- Placed VMs: {}", result.placed_vms);
    println!("- Rejected VMs: {}", result.rejected_vms);
    println!("- Rejection rate: {:.2}%", result.rejection_rate);
    println!("- Average CPU used: {:.2}%", result.avg_cpu_percent);
    println!("- Average RAM used: {:.2}%", result.avg_ram_percent);
    println!("- Average storage used: {:.2}%", result.avg_storage_percent);
}

fn print_results(results: &ExperimentResults) {
    for result in &results.scenarios {
        print_scenario(result);
    }
    if results.summary.scenarios == 0 {
        return;
    }
    println!("\n=== Global results ===");
    println!("Average rejection rate: {:.2}%", results.summary.avg_rejection_rate);
    println!("Average CPU used: {:.2}%", results.summary.avg_cpu_percent);
    println!("Average RAM used: {:.2}%", results.summary.avg_ram_percent);
    println!("Average storage used: {:.2}%", results.summary.avg_storage_percent);
}

fn generate(config_path: &Path, output: &Path) -> Result<()> {
    let config = PlacementConfig::from_file(config_path)?;
    let generator_config = config
        .generator
        .clone()
        .ok_or_else(|| Error::InvalidConfig("generator section is missing".to_string()))?;
    let hosts = config.physical_machines()?;
    let hosts = if hosts.is_empty() { None } else { Some(hosts) };

    let set = ScenarioGenerator::new(generator_config)?.generate(hosts);
    set.save(output)
}

fn run(scenarios: &Path, config_path: Option<&Path>, output: Option<&Path>, threads: usize) -> Result<()> {
    let config = match config_path {
        Some(path) => PlacementConfig::from_file(path)?,
        None => PlacementConfig::default(),
    };
    let set = ScenarioSet::load(scenarios)?;
    let experiment = Experiment::new(set, config.optimizer()?, Box::new(ReportCallbacks))?;

    let results = experiment.run(threads);
    print_results(&results);
    if let Some(dir) = output {
        results.save(dir)?;
        info!("Results saved to {}", dir.join("results.json").display());
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    match args.command {
        Command::Generate { config, output } => generate(&config, &output),
        Command::Run {
            scenarios,
            config,
            output,
            threads,
        } => run(&scenarios, config.as_deref(), output.as_deref(), threads),
    }
}
