#![doc = include_str!("../readme.md")]

pub mod core;
pub mod error;
pub mod experiment;
pub mod extensions;
