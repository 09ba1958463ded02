//! Greedy construction of the starting placement.

use log::{debug, trace};
use serde::Serialize;

use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;
use crate::core::vm_placement_algorithm::VMPlacementAlgorithm;
use crate::core::vm_placement_algorithms::first_fit::FirstFit;

/// Placement produced by the initial builder together with the VMs it could not place.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct InitialPlacement {
    pub placement: Placement,
    pub unplaced: Vec<VirtualMachine>,
}

/// Returns the batch ordered by arrival time. Sorting is stable, so VMs arriving at the same time keep their input
/// order.
pub fn arrival_order(vms: &[VirtualMachine]) -> Vec<&VirtualMachine> {
    let mut order: Vec<&VirtualMachine> = vms.iter().collect();
    order.sort_by_key(|vm| vm.arrival);
    order
}

/// Builds initial placement with [`FirstFit`]: VMs are taken by arrival time and each one goes to the first host
/// which can accommodate it.
pub fn build_initial(vms: &[VirtualMachine], pms: &[PhysicalMachine]) -> InitialPlacement {
    build_initial_with(vms, pms, &FirstFit::new())
}

/// Builds initial placement taking VMs by arrival time and asking the algorithm for a host for each of them.
///
/// VMs rejected by the algorithm are recorded as unplaced and never retried.
pub fn build_initial_with(
    vms: &[VirtualMachine],
    pms: &[PhysicalMachine],
    algorithm: &dyn VMPlacementAlgorithm,
) -> InitialPlacement {
    let mut placement = Placement::new(pms);
    let mut unplaced = Vec::new();

    for vm in arrival_order(vms) {
        match algorithm.select_host(vm, &placement, pms) {
            Some(idx) => {
                trace!("initial placement: vm {} -> host {}", vm.name, pms[idx].name);
                placement.assign(&pms[idx].name, vm.clone());
            }
            None => {
                debug!("initial placement: no suitable host for vm {}", vm.name);
                unplaced.push(vm.clone());
            }
        }
    }

    InitialPlacement { placement, unplaced }
}
