use std::collections::HashSet;

use rand::prelude::*;
use rand_pcg::Pcg64;

use dslab_placement::core::initial_placement::build_initial;
use dslab_placement::core::machine::{PhysicalMachine, VirtualMachine, DAY_LENGTH};
use dslab_placement::core::placement::Placement;
use dslab_placement::core::tabu_search::{OptimizationResult, OptimizerConfig, TabuSearch};
use dslab_placement::core::usage::analyze_usage;
use dslab_placement::core::validation::validate_input;
use dslab_placement::core::vm_placement_algorithm::{placement_algorithm_resolver, VMPlacementAlgorithm};
use dslab_placement::extensions::generator::{GeneratorConfig, ScenarioGenerator};

#[derive(Clone)]
struct RejectAll;

impl VMPlacementAlgorithm for RejectAll {
    fn select_host(&self, _vm: &VirtualMachine, _placement: &Placement, _pms: &[PhysicalMachine]) -> Option<usize> {
        None
    }
}

// Small hosts and coarse time grid, so that windows often touch or coincide and hosts are overloaded.
fn random_instance(rand: &mut Pcg64, hosts: usize, vms: usize) -> (Vec<VirtualMachine>, Vec<PhysicalMachine>) {
    let pms = (0..hosts)
        .map(|i| {
            PhysicalMachine::new(
                &format!("h{}", i),
                rand.gen_range(4..=12),
                rand.gen_range(8..=32),
                rand.gen_range(50..=200),
            )
        })
        .collect();
    let vms = (0..vms)
        .map(|i| {
            let arrival = rand.gen_range(0..=10) * 10;
            let departure = arrival + rand.gen_range(0..=5) * 10;
            VirtualMachine::new(
                &format!("v{}", i),
                rand.gen_range(1..=6),
                rand.gen_range(1..=16),
                rand.gen_range(5..=100),
                arrival,
                departure,
            )
        })
        .collect();
    (vms, pms)
}

fn generated_instance(seed: u64) -> (Vec<VirtualMachine>, Vec<PhysicalMachine>) {
    let mut generator = ScenarioGenerator::new(GeneratorConfig {
        hosts: 3,
        vm_min: 40,
        vm_max: 80,
        step: 10,
        scenarios: 1,
        seed,
    })
    .unwrap();
    let mut set = generator.generate(None);
    (set.scenarios.remove(0).vms, set.hosts)
}

fn search(threads: usize, algorithm: Box<dyn VMPlacementAlgorithm>) -> TabuSearch {
    TabuSearch::with_algorithm(
        OptimizerConfig {
            iterations: 200,
            tabu_size: 10,
            threads,
        },
        algorithm,
    )
}

// Checks that placed and unplaced VMs partition the batch and no host exceeds its capacity at any instant.
fn check_result(vms: &[VirtualMachine], pms: &[PhysicalMachine], result: &OptimizationResult) {
    let mut seen = HashSet::new();
    for (host, host_vms) in result.placement.iter() {
        assert!(pms.iter().any(|pm| &pm.name == host));
        for vm in host_vms {
            assert!(seen.insert(vm.name.clone()), "{} is placed twice", vm.name);
        }
    }
    for vm in &result.unplaced {
        assert!(seen.insert(vm.name.clone()), "{} is both placed and unplaced", vm.name);
    }
    assert_eq!(seen.len(), vms.len());
    assert_eq!(result.score, vms.len() - result.unplaced.len());
    assert_eq!(result.score, result.placement.score());

    for window in result.unplaced.windows(2) {
        assert!(window[0].arrival <= window[1].arrival);
    }

    for (host, usage) in analyze_usage(&result.placement, pms) {
        assert!(usage.used_cpu <= usage.cpu_capacity as u64, "CPU overload on {}", host);
        assert!(usage.used_ram <= usage.ram_capacity, "RAM overload on {}", host);
        assert!(usage.used_storage <= usage.storage_capacity, "storage overload on {}", host);
        assert!(usage.cpu_percent <= 100.);
        assert!(usage.ram_percent <= 100.);
        assert!(usage.storage_percent <= 100.);
    }
}

#[test]
fn test_generated_placements_are_feasible() {
    for seed in 0..10 {
        let (vms, pms) = generated_instance(seed);
        validate_input(&vms, &pms).unwrap();
        for name in ["FirstFit", "BestFit", "WorstFit"] {
            let result = search(1, placement_algorithm_resolver(name).unwrap()).optimize(&vms, &pms);
            check_result(&vms, &pms, &result);
            assert!(result.score >= result.initial_score);
        }
    }
}

#[test]
fn test_random_placements_are_feasible() {
    let mut rand = Pcg64::seed_from_u64(123);
    for _ in 0..50 {
        let (vms, pms) = random_instance(&mut rand, 3, 30);
        validate_input(&vms, &pms).unwrap();

        let initial = build_initial(&vms, &pms);
        assert_eq!(initial.placement.score() + initial.unplaced.len(), vms.len());

        let result = search(1, placement_algorithm_resolver("FirstFit").unwrap()).optimize(&vms, &pms);
        check_result(&vms, &pms, &result);
        assert_eq!(result.initial_score, initial.placement.score());
        assert!(result.score >= result.initial_score);

        let result = search(1, Box::new(RejectAll)).optimize(&vms, &pms);
        check_result(&vms, &pms, &result);
        assert_eq!(result.initial_score, 0);
        assert_eq!(result.accepted_moves, result.score);
    }
}

#[test]
// Search cannot place a VM which the greedy builder rejected, since rejection only depends on VMs already placed.
fn test_search_keeps_first_fit_result() {
    let mut rand = Pcg64::seed_from_u64(7);
    for _ in 0..20 {
        let (vms, pms) = random_instance(&mut rand, 2, 25);
        let initial = build_initial(&vms, &pms);
        let result = TabuSearch::new(OptimizerConfig::default()).optimize(&vms, &pms);
        assert_eq!(result.placement, initial.placement);
        assert_eq!(result.unplaced, initial.unplaced);
        assert_eq!(result.accepted_moves, 0);
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut rand = Pcg64::seed_from_u64(42);
    for _ in 0..10 {
        let (vms, pms) = random_instance(&mut rand, 4, 40);
        let first = search(1, Box::new(RejectAll)).optimize(&vms, &pms);
        let second = search(1, Box::new(RejectAll)).optimize(&vms, &pms);
        assert_eq!(first, second);
    }
}

#[test]
// Parallel neighbor evaluation produces exactly the same result as the serial one.
fn test_parallel_search_matches_serial() {
    let mut rand = Pcg64::seed_from_u64(2024);
    for _ in 0..10 {
        let (vms, pms) = random_instance(&mut rand, 4, 40);
        let serial = search(1, Box::new(RejectAll)).optimize(&vms, &pms);
        for threads in [2, 3, 8] {
            let parallel = search(threads, Box::new(RejectAll)).optimize(&vms, &pms);
            assert_eq!(parallel, serial, "{} threads", threads);
        }
    }

    let (vms, pms) = generated_instance(5);
    let serial = search(1, Box::new(RejectAll)).optimize(&vms, &pms);
    let parallel = search(4, Box::new(RejectAll)).optimize(&vms, &pms);
    assert_eq!(parallel, serial);
}

#[test]
fn test_generated_windows_are_valid() {
    let (vms, _) = generated_instance(1);
    for vm in &vms {
        assert!(vm.arrival <= vm.departure);
        assert!(vm.departure <= DAY_LENGTH);
    }
}
