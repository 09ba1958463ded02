pub mod best_fit;
pub mod first_fit;
pub mod worst_fit;
