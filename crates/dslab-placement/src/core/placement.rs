//! Assignment of VMs to hosts.

use std::collections::HashSet;

use indexmap::map::IndexMap;
use serde::Serialize;

use crate::core::machine::{PhysicalMachine, VirtualMachine};

/// Maps each host name to the list of VMs assigned to it, in acceptance order.
///
/// Hosts keep the order in which they were passed to [`Placement::new`]. VMs missing from every list are unplaced.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    hosts: IndexMap<String, Vec<VirtualMachine>>,
}

impl Placement {
    /// Creates placement with no VMs assigned to the specified hosts.
    pub fn new(pms: &[PhysicalMachine]) -> Self {
        Self {
            hosts: pms.iter().map(|pm| (pm.name.clone(), Vec::new())).collect(),
        }
    }

    /// Appends the VM to the host list. Returns false if there is no such host.
    ///
    /// Capacity is not checked here, callers are expected to consult the capacity model first.
    pub fn assign(&mut self, host: &str, vm: VirtualMachine) -> bool {
        match self.hosts.get_mut(host) {
            Some(vms) => {
                vms.push(vm);
                true
            }
            None => false,
        }
    }

    /// Returns VMs assigned to the specified host (empty for unknown hosts).
    pub fn host_vms(&self, host: &str) -> &[VirtualMachine] {
        self.hosts.get(host).map(|vms| vms.as_slice()).unwrap_or(&[])
    }

    /// Returns the name of the host running the specified VM.
    pub fn host_of(&self, vm_name: &str) -> Option<&str> {
        self.hosts
            .iter()
            .find(|(_, vms)| vms.iter().any(|vm| vm.name == vm_name))
            .map(|(host, _)| host.as_str())
    }

    pub fn contains_vm(&self, vm_name: &str) -> bool {
        self.host_of(vm_name).is_some()
    }

    /// Returns an iterator over host names and their VMs in host order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<VirtualMachine>)> {
        self.hosts.iter()
    }

    /// Returns the number of hosts.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Returns the total number of assigned VMs, which is the placement score.
    pub fn score(&self) -> usize {
        self.hosts.values().map(|vms| vms.len()).sum()
    }

    /// Returns names of all assigned VMs.
    pub fn placed_names(&self) -> HashSet<&str> {
        self.hosts
            .values()
            .flat_map(|vms| vms.iter().map(|vm| vm.name.as_str()))
            .collect()
    }

    /// Returns VMs from the batch which are not assigned to any host, keeping the batch order.
    pub fn unplaced(&self, vms: &[VirtualMachine]) -> Vec<VirtualMachine> {
        let placed = self.placed_names();
        vms.iter()
            .filter(|vm| !placed.contains(vm.name.as_str()))
            .cloned()
            .collect()
    }
}
