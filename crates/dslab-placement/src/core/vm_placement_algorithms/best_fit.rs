//! Best Fit algorithm.

use crate::core::capacity::{is_feasible, remaining_capacity};
use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;
use crate::core::vm_placement_algorithm::VMPlacementAlgorithm;

/// Uses the suitable host with the least CPU left during the VM lifetime.
#[derive(Clone, Default)]
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl VMPlacementAlgorithm for BestFit {
    fn select_host(&self, vm: &VirtualMachine, placement: &Placement, pms: &[PhysicalMachine]) -> Option<usize> {
        let mut result: Option<usize> = None;
        let mut min_available_cpu = i64::MAX;

        for (idx, pm) in pms.iter().enumerate() {
            let assigned = placement.host_vms(&pm.name);
            if is_feasible(pm, vm, assigned) {
                let available_cpu = remaining_capacity(pm, vm, assigned).cpu;
                if available_cpu < min_available_cpu {
                    min_available_cpu = available_cpu;
                    result = Some(idx);
                }
            }
        }
        result
    }
}
