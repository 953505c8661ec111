//! Functionality related to the `dragen-qc list` subcommand.

pub mod command;
