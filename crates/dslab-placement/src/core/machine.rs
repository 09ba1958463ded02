//! Physical and virtual machine descriptions.

use serde::{Deserialize, Serialize};

/// Length of the scheduling day in minutes. VM arrival and departure times lie within `[0, DAY_LENGTH]`.
pub const DAY_LENGTH: u32 = 1440;

/// Represents physical machine (host) with fixed resource capacity.
///
/// Field order matches the on-disk record layout `name cpu ram storage`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhysicalMachine {
    pub name: String,
    pub cpu: u32,
    pub ram: u64,
    pub storage: u64,
}

impl PhysicalMachine {
    pub fn new(name: &str, cpu: u32, ram: u64, storage: u64) -> Self {
        Self {
            name: name.to_string(),
            cpu,
            ram,
            storage,
        }
    }
}

/// Represents virtual machine with resource demand and activity window.
///
/// VM consumes its resources at every instant of the half-open interval `[arrival, departure)`.
/// Field order matches the on-disk record layout `name cpu ram storage arrival departure`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VirtualMachine {
    pub name: String,
    pub cpu: u32,
    pub ram: u64,
    pub storage: u64,
    pub arrival: u32,
    pub departure: u32,
}

impl VirtualMachine {
    pub fn new(name: &str, cpu: u32, ram: u64, storage: u64, arrival: u32, departure: u32) -> Self {
        Self {
            name: name.to_string(),
            cpu,
            ram,
            storage,
            arrival,
            departure,
        }
    }

    /// Checks whether activity windows of two VMs intersect.
    ///
    /// Windows touching at a single endpoint (one VM departs exactly when the other arrives) do not overlap.
    pub fn overlaps(&self, other: &VirtualMachine) -> bool {
        self.arrival < other.departure && self.departure > other.arrival
    }
}
