//! `dragen-qc` is a command line tool that aggregates the quality control
//! metric files written by the DRAGEN pipeline into one per-sample model, and
//! derives summary tables and chart series from it. This package is composed
//! of both a library crate, as well as a binary crate.
//!
//! This documentation generally refers to the library crate documentation for
//! use by developers of `dragen-qc`. The entry point is
//! [`aggregate::engine::AggregationEngine`].
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod aggregate;
pub mod errors;
pub mod list;
pub mod plot;
pub mod utils;
