//! Views derived from a frozen sample store.
//!
//! Every view is a pure projection of the store and is recomputed on every
//! run. There are four classes of views:
//!
//! * [General statistics](general_stats): one row per sample with a small,
//!   fixed selection of headline metrics.
//! * [Detail tables](tables): one table per kind with every metric.
//! * [Histograms](histograms): per chart, aligned series with a cumulative
//!   transform.
//! * [Bars](bars): categorical series (per-contig coverage, read categories).

pub mod bars;
pub mod general_stats;
pub mod histograms;
pub mod tables;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::store::FrozenStore;

pub use bars::BarSeries;
pub use bars::BarView;
pub use general_stats::GeneralStats;
pub use histograms::HistogramSeries;
pub use histograms::HistogramView;
pub use tables::DetailTable;

/// Static description of a chart.
#[derive(Debug)]
pub struct ChartInfo {
    /// Identifier, used in file names.
    pub id: &'static str,

    /// Title of the chart.
    pub title: &'static str,

    /// Label of the x-axis.
    pub x_label: &'static str,

    /// Label of the y-axis.
    pub y_label: &'static str,
}

/// All views of one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DerivedViews {
    /// Headline metrics per sample.
    pub general_stats: GeneralStats,

    /// One table per kind with data.
    pub detail_tables: Vec<DetailTable>,

    /// Histogram charts with data.
    pub histograms: Vec<HistogramView>,

    /// Bar charts with data.
    pub bars: Vec<BarView>,
}

/// Builds every view from the store.
pub fn build(store: &FrozenStore) -> DerivedViews {
    let views = DerivedViews {
        general_stats: general_stats::build(store),
        detail_tables: tables::build(store),
        histograms: histograms::build(store),
        bars: bars::build(store),
    };

    debug!(
        "  [*] Built {} general stats rows, {} tables, {} histograms and {} bar charts.",
        views.general_stats.rows.len(),
        views.detail_tables.len(),
        views.histograms.len(),
        views.bars.len()
    );

    views
}
