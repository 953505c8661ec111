//! Rendering of the derived views as plotly HTML charts.

pub mod bar;
pub mod command;
pub mod histogram;
