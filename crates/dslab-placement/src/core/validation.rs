//! Input checks performed before optimization.
//!
//! Placement algorithms trust their input. Loaders and the experiment runner call [`validate_input`] so that
//! malformed batches are rejected up front instead of producing meaningless placements.

use std::collections::HashSet;

use crate::core::machine::{PhysicalMachine, VirtualMachine, DAY_LENGTH};
use crate::error::{Error, Result};

/// Checks host list on its own.
pub fn validate_hosts(pms: &[PhysicalMachine]) -> Result<()> {
    let mut names = HashSet::new();
    for pm in pms {
        if !names.insert(pm.name.as_str()) {
            return Err(Error::DuplicateMachine { name: pm.name.clone() });
        }
    }
    Ok(())
}

/// Checks VM batch on its own.
pub fn validate_vms(vms: &[VirtualMachine]) -> Result<()> {
    let mut names = HashSet::new();
    for vm in vms {
        if !names.insert(vm.name.as_str()) {
            return Err(Error::DuplicateMachine { name: vm.name.clone() });
        }
        if vm.arrival > vm.departure {
            return Err(Error::InvalidTimeWindow {
                vm: vm.name.clone(),
                arrival: vm.arrival,
                departure: vm.departure,
            });
        }
        if vm.departure > DAY_LENGTH {
            return Err(Error::TimeOutOfRange {
                vm: vm.name.clone(),
                time: vm.departure,
            });
        }
    }
    Ok(())
}

/// Checks that names are unique and every VM window satisfies `arrival <= departure <= DAY_LENGTH`.
///
/// Empty host list and empty batch are valid.
pub fn validate_input(vms: &[VirtualMachine], pms: &[PhysicalMachine]) -> Result<()> {
    validate_hosts(pms)?;
    validate_vms(vms)
}
