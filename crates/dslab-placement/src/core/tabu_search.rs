//! Tabu search admitting unplaced VMs into the placement.
//!
//! The search starts from the [initial placement](crate::core::initial_placement) and on each iteration inspects
//! all neighbors of the incumbent, i.e. placements obtained by inserting one currently unplaced VM into one host
//! which can accommodate it. The best neighbor replaces the incumbent only if it strictly improves the score, so
//! placed VMs are never moved or removed. Accepted placements are remembered in a bounded FIFO memory and neighbors
//! equal to remembered placements are skipped.

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc;
use std::sync::Arc;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use crate::core::capacity::can_allocate;
use crate::core::common::AllocationVerdict;
use crate::core::initial_placement::{arrival_order, build_initial_with};
use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;
use crate::core::vm_placement_algorithm::VMPlacementAlgorithm;
use crate::core::vm_placement_algorithms::first_fit::FirstFit;

/// Parameters of tabu search.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizerConfig {
    /// Maximum number of search iterations.
    pub iterations: usize,
    /// Maximum number of placements kept in tabu memory.
    pub tabu_size: usize,
    /// Number of threads evaluating neighbors. With 1 thread neighbors are evaluated in the calling thread.
    pub threads: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            tabu_size: 10,
            threads: 1,
        }
    }
}

/// Outcome of optimization run.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    pub placement: Placement,
    /// VMs absent from the final placement, ordered by arrival time.
    pub unplaced: Vec<VirtualMachine>,
    /// Number of placed VMs.
    pub score: usize,
    /// Score of the initial placement.
    pub initial_score: usize,
    /// Number of neighbors accepted as the new incumbent.
    pub accepted_moves: usize,
}

/// Bounded FIFO memory of previously accepted placements.
pub struct TabuMemory {
    capacity: usize,
    entries: VecDeque<Placement>,
}

impl TabuMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Remembers placement, evicting the oldest ones if the memory is over capacity.
    pub fn push(&mut self, placement: Placement) {
        self.entries.push_back(placement);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn contains(&self, placement: &Placement) -> bool {
        self.entries.iter().any(|entry| entry == placement)
    }

    /// Checks whether the placement obtained by inserting the VM into the host is remembered.
    ///
    /// The candidate placement is materialized only if some remembered placement has the same score.
    pub fn contains_insertion(&self, base: &Placement, host: &str, vm: &VirtualMachine) -> bool {
        let score = base.score() + 1;
        let mut candidate: Option<Placement> = None;
        for entry in self.entries.iter().filter(|entry| entry.score() == score) {
            let candidate = candidate.get_or_insert_with(|| {
                let mut placement = base.clone();
                placement.assign(host, vm.clone());
                placement
            });
            if entry == candidate {
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Insertion of an unplaced VM into a host.
struct Neighbor<'a> {
    vm: &'a VirtualMachine,
    host: usize,
    score: usize,
}

/// Returns the neighbor with the highest score, the earliest one among equal scores.
fn select_best<'a, 'b>(neighbors: &'b [Neighbor<'a>]) -> Option<&'b Neighbor<'a>> {
    let mut best: Option<&Neighbor> = None;
    for neighbor in neighbors {
        if best.map_or(true, |b| neighbor.score > b.score) {
            best = Some(neighbor);
        }
    }
    best
}

/// Returns `(vm index, host index)` pairs of feasible insertions in VM-major order.
/// VM indices are shifted by `offset`.
fn feasible_insertions<'v>(
    pms: &[PhysicalMachine],
    placement: &Placement,
    vms: impl IntoIterator<Item = &'v VirtualMachine>,
    offset: usize,
) -> Vec<(usize, usize)> {
    let mut moves = Vec::new();
    for (i, vm) in vms.into_iter().enumerate() {
        for (j, pm) in pms.iter().enumerate() {
            let verdict = can_allocate(pm, vm, placement.host_vms(&pm.name));
            trace!("vm {} on host {}: {:?}", vm.name, pm.name, verdict);
            if verdict == AllocationVerdict::Success {
                moves.push((offset + i, j));
            }
        }
    }
    moves
}

/// Evaluates feasibility of all candidate insertions, optionally splitting the VMs between pool threads.
struct MoveEvaluator {
    pms: Arc<Vec<PhysicalMachine>>,
    pool: Option<ThreadPool>,
    threads: usize,
}

impl MoveEvaluator {
    fn new(pms: &[PhysicalMachine], threads: usize) -> Self {
        Self {
            pms: Arc::new(pms.to_vec()),
            pool: if threads > 1 { Some(ThreadPool::new(threads)) } else { None },
            threads,
        }
    }

    fn feasible_moves(&self, placement: &Placement, candidates: &[&VirtualMachine]) -> Vec<(usize, usize)> {
        let pool = match &self.pool {
            Some(pool) if !candidates.is_empty() => pool,
            _ => return feasible_insertions(&self.pms, placement, candidates.iter().copied(), 0),
        };

        let chunk_size = (candidates.len() + self.threads - 1) / self.threads;
        let placement = Arc::new(placement.clone());
        let (tx, rx) = mpsc::channel();
        let mut jobs = 0;
        for (chunk_id, chunk) in candidates.chunks(chunk_size).enumerate() {
            let vms: Vec<VirtualMachine> = chunk.iter().map(|&vm| vm.clone()).collect();
            let pms = self.pms.clone();
            let placement = placement.clone();
            let tx = tx.clone();
            pool.execute(move || {
                let moves = feasible_insertions(&pms, &placement, &vms, chunk_id * chunk_size);
                // receiver outlives all jobs
                let _ = tx.send((chunk_id, moves));
            });
            jobs += 1;
        }
        drop(tx);

        let mut results: Vec<(usize, Vec<(usize, usize)>)> = rx.iter().take(jobs).collect();
        results.sort_by_key(|(chunk_id, _)| *chunk_id);
        results.into_iter().flat_map(|(_, moves)| moves).collect()
    }
}

/// Tabu search optimizer maximizing the number of placed VMs.
#[derive(Clone)]
pub struct TabuSearch {
    config: OptimizerConfig,
    algorithm: Box<dyn VMPlacementAlgorithm>,
}

impl TabuSearch {
    /// Creates optimizer building the initial placement with [`FirstFit`].
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_algorithm(config, Box::new(FirstFit::new()))
    }

    /// Creates optimizer building the initial placement with the specified algorithm.
    pub fn with_algorithm(config: OptimizerConfig, algorithm: Box<dyn VMPlacementAlgorithm>) -> Self {
        Self { config, algorithm }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Places the VM batch onto the hosts.
    ///
    /// The result is deterministic for the same inputs and does not depend on the number of threads.
    pub fn optimize(&self, vms: &[VirtualMachine], pms: &[PhysicalMachine]) -> OptimizationResult {
        info!(
            "Optimizing placement of {} VMs on {} hosts ({} iterations, tabu size {})",
            vms.len(),
            pms.len(),
            self.config.iterations,
            self.config.tabu_size
        );

        let initial = build_initial_with(vms, pms, self.algorithm.as_ref());
        let order = arrival_order(vms);
        let mut best = initial.placement;
        let mut best_score = best.score();
        let initial_score = best_score;
        let mut placed: HashSet<String> = best.placed_names().into_iter().map(String::from).collect();
        let mut tabu = TabuMemory::new(self.config.tabu_size);
        let mut accepted_moves = 0;
        let evaluator = MoveEvaluator::new(pms, self.config.threads);

        for iteration in 0..self.config.iterations {
            let candidates: Vec<&VirtualMachine> = order
                .iter()
                .copied()
                .filter(|vm| !placed.contains(&vm.name))
                .collect();

            // inserting a VM adds exactly one to the placed count
            let neighbor_score = best_score + 1;
            let neighbors: Vec<Neighbor> = evaluator
                .feasible_moves(&best, &candidates)
                .into_iter()
                .filter(|&(vm, host)| !tabu.contains_insertion(&best, &pms[host].name, candidates[vm]))
                .map(|(vm, host)| Neighbor {
                    vm: candidates[vm],
                    host,
                    score: neighbor_score,
                })
                .collect();

            let selected = match select_best(&neighbors) {
                Some(neighbor) => neighbor,
                None => {
                    // the incumbent stays the same, so do all later iterations
                    debug!("Iteration {}: no neighbors, stopping", iteration);
                    break;
                }
            };
            // every neighbor places one more VM than the incumbent
            debug_assert!(selected.score > best_score);

            let host = &pms[selected.host].name;
            best.assign(host, selected.vm.clone());
            placed.insert(selected.vm.name.clone());
            best_score = selected.score;
            tabu.push(best.clone());
            accepted_moves += 1;
            debug!(
                "Iteration {}: placed vm {} on host {}, score = {}",
                iteration, selected.vm.name, host, best_score
            );
        }

        let unplaced: Vec<VirtualMachine> = order
            .into_iter()
            .filter(|vm| !placed.contains(&vm.name))
            .cloned()
            .collect();

        info!(
            "Placed {} of {} VMs (initial placement: {})",
            best_score,
            vms.len(),
            initial_score
        );

        OptimizationResult {
            placement: best,
            unplaced,
            score: best_score,
            initial_score,
            accepted_moves,
        }
    }
}
