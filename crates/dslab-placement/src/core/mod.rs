pub mod capacity;
pub mod common;
pub mod config;
pub mod initial_placement;
pub mod machine;
pub mod placement;
pub mod tabu_search;
pub mod usage;
pub mod validation;
pub mod vm_placement_algorithm;
pub mod vm_placement_algorithms;
