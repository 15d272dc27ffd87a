//! Small helpers shared across the asset pipeline

pub mod paths;
