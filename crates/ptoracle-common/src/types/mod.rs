//! Core data types for the PT oracle

pub mod fixed;
pub mod parameters;
