//! Aggregation of DRAGEN metric files into a per-sample model.
//!
//! The pieces, from the leaves up:
//!
//! * [`classify`] maps a file name to a [`kind::MetricKind`] and a
//!   [`record::SampleKey`].
//! * [`parsers`] turn the contents of one file into a
//!   [`record::ParsedRecord`].
//! * [`store`] accumulates records per sample and detects conflicts.
//! * [`engine`] drives the above for every kind against a [`source`].
//! * [`views`] projects the frozen store into tables and chart series.

pub mod classify;
pub mod command;
pub mod engine;
pub mod errors;
pub mod kind;
pub mod module;
pub mod parsers;
pub mod record;
pub mod results;
pub mod source;
pub mod store;
pub mod value;
pub mod views;
