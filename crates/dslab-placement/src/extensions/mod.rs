pub mod generator;
pub mod records;
pub mod scenario;
