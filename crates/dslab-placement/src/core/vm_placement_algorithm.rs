//! Host selection algorithms used to build the initial placement.

use dyn_clone::{clone_trait_object, DynClone};

use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;
use crate::core::vm_placement_algorithms::best_fit::BestFit;
use crate::core::vm_placement_algorithms::first_fit::FirstFit;
use crate::core::vm_placement_algorithms::worst_fit::WorstFit;
use crate::error::{Error, Result};

/// Trait for implementation of VM placement algorithms.
///
/// The algorithm is defined as a function of VM, current placement and host list, which returns an index of the host
/// selected for VM placement or `None` if there is no suitable host. Returned host must be feasible for the VM
/// according to the [capacity model](crate::core::capacity).
pub trait VMPlacementAlgorithm: DynClone + Send + Sync {
    fn select_host(&self, vm: &VirtualMachine, placement: &Placement, pms: &[PhysicalMachine]) -> Option<usize>;
}

clone_trait_object!(VMPlacementAlgorithm);

/// Creates placement algorithm by its name from config.
pub fn placement_algorithm_resolver(name: &str) -> Result<Box<dyn VMPlacementAlgorithm>> {
    match name {
        "FirstFit" => Ok(Box::new(FirstFit::new())),
        "BestFit" => Ok(Box::new(BestFit::new())),
        "WorstFit" => Ok(Box::new(WorstFit::new())),
        _ => Err(Error::InvalidConfig(format!("unknown placement algorithm: {}", name))),
    }
}
