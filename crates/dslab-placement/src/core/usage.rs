//! Peak resource usage of hosts computed with a sweep line.

use indexmap::map::IndexMap;
use serde::Serialize;

use crate::core::machine::{PhysicalMachine, VirtualMachine};
use crate::core::placement::Placement;

/// Resource usage of a single host.
///
/// Percentages are peak usage relative to capacity, capped at 100. Resources with zero capacity report 0%.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct UsageReport {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub storage_percent: f64,
    /// Names of VMs assigned to the host.
    pub vms: Vec<String>,
    pub cpu_capacity: u32,
    pub ram_capacity: u64,
    pub storage_capacity: u64,
    /// Maximum amount of CPU used at once.
    pub used_cpu: u64,
    /// Maximum amount of RAM used at once.
    pub used_ram: u64,
    /// Maximum amount of storage used at once.
    pub used_storage: u64,
}

// At equal timestamps ends go first, so VMs meeting at a boundary are never counted together. A zero-length VM is a
// single instant event counted on top of the VMs strictly containing its timestamp, as in the capacity model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Instant,
    Start,
}

struct Event<'a> {
    time: u32,
    kind: EventKind,
    vm: &'a VirtualMachine,
}

#[derive(Default)]
struct Peaks {
    cpu: u64,
    ram: u64,
    storage: u64,
}

impl Peaks {
    fn update(&mut self, cpu: i64, ram: i64, storage: i64) {
        self.cpu = self.cpu.max(cpu.max(0) as u64);
        self.ram = self.ram.max(ram.max(0) as u64);
        self.storage = self.storage.max(storage.max(0) as u64);
    }
}

fn sweep(vms: &[VirtualMachine]) -> Peaks {
    let mut events = Vec::with_capacity(vms.len() * 2);
    for vm in vms {
        if vm.arrival == vm.departure {
            events.push(Event {
                time: vm.arrival,
                kind: EventKind::Instant,
                vm,
            });
            continue;
        }
        events.push(Event {
            time: vm.arrival,
            kind: EventKind::Start,
            vm,
        });
        events.push(Event {
            time: vm.departure,
            kind: EventKind::End,
            vm,
        });
    }
    events.sort_by_key(|e| (e.time, e.kind));

    let (mut cpu, mut ram, mut storage) = (0i64, 0i64, 0i64);
    let mut peaks = Peaks::default();
    for event in events {
        let vm = event.vm;
        let (vm_cpu, vm_ram, vm_storage) = (vm.cpu as i64, vm.ram as i64, vm.storage as i64);
        match event.kind {
            EventKind::Start => {
                cpu += vm_cpu;
                ram += vm_ram;
                storage += vm_storage;
                peaks.update(cpu, ram, storage);
            }
            EventKind::End => {
                cpu -= vm_cpu;
                ram -= vm_ram;
                storage -= vm_storage;
            }
            EventKind::Instant => peaks.update(cpu + vm_cpu, ram + vm_ram, storage + vm_storage),
        }
    }
    peaks
}

fn utilization(used: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.;
    }
    (used as f64 / capacity as f64).min(1.) * 100.
}

/// Computes the usage report of every host in host list order.
///
/// The computation does not rely on the capacity model, so it also serves as an independent check that a placement
/// respects host capacities.
pub fn analyze_usage(placement: &Placement, pms: &[PhysicalMachine]) -> IndexMap<String, UsageReport> {
    let mut reports = IndexMap::new();
    for pm in pms {
        let vms = placement.host_vms(&pm.name);
        let peaks = sweep(vms);
        reports.insert(
            pm.name.clone(),
            UsageReport {
                cpu_percent: utilization(peaks.cpu, pm.cpu as u64),
                ram_percent: utilization(peaks.ram, pm.ram),
                storage_percent: utilization(peaks.storage, pm.storage),
                vms: vms.iter().map(|vm| vm.name.clone()).collect(),
                cpu_capacity: pm.cpu,
                ram_capacity: pm.ram,
                storage_capacity: pm.storage,
                used_cpu: peaks.cpu,
                used_ram: peaks.ram,
                used_storage: peaks.storage,
            },
        );
    }
    reports
}
