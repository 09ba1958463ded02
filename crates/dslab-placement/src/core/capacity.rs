//! Capacity model deciding whether a VM fits onto a host.

use crate::core::common::{AllocationVerdict, RemainingCapacity};
use crate::core::machine::{PhysicalMachine, VirtualMachine};

/// Returns host capacity left for the candidate VM after subtracting the demand of every assigned VM whose window
/// overlaps the candidate's window.
///
/// The value is recomputed from scratch on every call by scanning all assigned VMs.
pub fn remaining_capacity(pm: &PhysicalMachine, vm: &VirtualMachine, assigned: &[VirtualMachine]) -> RemainingCapacity {
    let mut remaining = RemainingCapacity {
        cpu: pm.cpu as i64,
        ram: pm.ram as i64,
        storage: pm.storage as i64,
    };
    for other in assigned.iter().filter(|other| vm.overlaps(other)) {
        remaining.cpu -= other.cpu as i64;
        remaining.ram -= other.ram as i64;
        remaining.storage -= other.storage as i64;
    }
    remaining
}

/// Checks if the VM can be added to the host next to the already assigned VMs.
pub fn can_allocate(pm: &PhysicalMachine, vm: &VirtualMachine, assigned: &[VirtualMachine]) -> AllocationVerdict {
    let remaining = remaining_capacity(pm, vm, assigned);
    if remaining.cpu < vm.cpu as i64 {
        return AllocationVerdict::NotEnoughCPU;
    }
    if remaining.ram < vm.ram as i64 {
        return AllocationVerdict::NotEnoughRAM;
    }
    if remaining.storage < vm.storage as i64 {
        return AllocationVerdict::NotEnoughStorage;
    }
    AllocationVerdict::Success
}

/// Returns true if the VM fits onto the host on all resources at once.
pub fn is_feasible(pm: &PhysicalMachine, vm: &VirtualMachine, assigned: &[VirtualMachine]) -> bool {
    can_allocate(pm, vm, assigned) == AllocationVerdict::Success
}
