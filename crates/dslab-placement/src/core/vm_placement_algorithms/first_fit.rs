//! First Fit algorithm.

use crate::core::capacity::is_feasible;
use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;
use crate::core::vm_placement_algorithm::VMPlacementAlgorithm;

/// Uses the first suitable host in host list order.
#[derive(Clone, Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl VMPlacementAlgorithm for FirstFit {
    fn select_host(&self, vm: &VirtualMachine, placement: &Placement, pms: &[PhysicalMachine]) -> Option<usize> {
        pms.iter()
            .position(|pm| is_feasible(pm, vm, placement.host_vms(&pm.name)))
    }
}
