//! CLI command implementations.

pub mod birth;
pub mod doctor;
pub mod process;
