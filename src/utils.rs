//! Utilities that are used across the `dragen-qc` subcommands.

pub mod display;
pub mod genome;
pub mod histogram;
