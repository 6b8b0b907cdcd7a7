#![forbid(unsafe_code)]

//! Terminal showcase for the risk score visualizer.

pub mod cli;
pub mod render;
pub mod showcase;
