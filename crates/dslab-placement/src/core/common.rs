use serde::Serialize;

/// Capacity left on a host for the lifetime of a candidate VM.
///
/// Values are signed: VMs overlapping the candidate are all subtracted from the host capacity even if they do not
/// overlap each other, so the result can drop below zero.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemainingCapacity {
    pub cpu: i64,
    pub ram: i64,
    pub storage: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationVerdict {
    NotEnoughCPU,
    NotEnoughRAM,
    NotEnoughStorage,
    Success,
}
