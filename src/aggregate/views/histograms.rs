//! Histogram charts.
//!
//! All series of one chart are aligned on the union of their buckets, ordered
//! by bucket bound. A bucket missing from a series counts zero. The cumulative
//! transform is always recomputed from the aligned per-bucket values.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::ChartInfo;
use crate::aggregate::parsers::coverage_histogram;
use crate::aggregate::parsers::fragment_length;
use crate::aggregate::parsers::quality_profile;
use crate::aggregate::record::SampleKey;
use crate::aggregate::record::SeriesData;
use crate::aggregate::store::FrozenStore;
use crate::utils::histogram::Bucket;
use crate::utils::histogram::Histogram;

/// Identifier of the chart derived from the coverage histogram that shows the
/// share of the genome covered at or above each depth.
pub const COVERAGE_AT_OR_ABOVE_CHART: &str = "coverage_at_or_above";

/// Every histogram chart, in display order.
pub const CHARTS: &[ChartInfo] = &[
    ChartInfo {
        id: coverage_histogram::CHART,
        title: "Coverage Distribution",
        x_label: "Depth (x)",
        y_label: "Bases",
    },
    ChartInfo {
        id: COVERAGE_AT_OR_ABOVE_CHART,
        title: "Genome Fraction Covered at ≥ X",
        x_label: "Depth (x)",
        y_label: "% of bases",
    },
    ChartInfo {
        id: fragment_length::CHART,
        title: "Fragment Length Distribution",
        x_label: "Fragment length (bp)",
        y_label: "Fragments",
    },
    ChartInfo {
        id: quality_profile::MEAN_QUALITY_CHART,
        title: "Mean Read Quality",
        x_label: "Mean quality (Phred)",
        y_label: "Reads",
    },
    ChartInfo {
        id: quality_profile::GC_CONTENT_CHART,
        title: "Read GC Content",
        x_label: "GC content (%)",
        y_label: "Reads",
    },
    ChartInfo {
        id: quality_profile::READ_LENGTHS_CHART,
        title: "Read Lengths",
        x_label: "Read length (bp)",
        y_label: "Reads",
    },
];

/// One series of a histogram chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    /// Display name (sample, qualifier and series label).
    pub name: String,

    /// The sample the series belongs to.
    pub sample: String,

    /// One value per bucket of the chart.
    pub values: Vec<f64>,

    /// Running sum of `values` from the lowest bucket, for charts of counts.
    pub cumulative: Option<Vec<f64>>,
}

/// A histogram chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramView {
    /// Identifier of the chart.
    pub chart: String,

    /// Title of the chart.
    pub title: String,

    /// Label of the x-axis.
    pub x_label: String,

    /// Label of the y-axis.
    pub y_label: String,

    /// Buckets shared by every series.
    pub buckets: Vec<Bucket>,

    /// Series, in sample order.
    pub series: Vec<HistogramSeries>,
}

/// Builds every histogram chart that has data.
pub fn build(store: &FrozenStore) -> Vec<HistogramView> {
    let mut views = Vec::new();

    for info in CHARTS {
        if info.id == COVERAGE_AT_OR_ABOVE_CHART {
            let derived = views
                .iter()
                .find(|v: &&HistogramView| v.chart == coverage_histogram::CHART)
                .and_then(|coverage| at_or_above(coverage, info));
            views.extend(derived);
            continue;
        }

        let collected = collect(store, info.id);
        if !collected.is_empty() {
            views.push(align(info, collected));
        }
    }

    views
}

/// Every histogram of a chart, named after its slot and label.
fn collect<'a>(store: &'a FrozenStore, chart: &str) -> Vec<(String, String, &'a Histogram)> {
    let mut found = Vec::new();

    for (sample, record) in store.samples() {
        for (_, qualifier, slot) in record.slots() {
            for series in slot.record.series_for(chart) {
                if let SeriesData::Histogram(hist) = &series.data {
                    let key = SampleKey::new(sample, qualifier.map(String::from));
                    let name = match &series.label {
                        Some(label) if label != sample => format!("{} - {}", key, label),
                        _ => key.to_string(),
                    };
                    found.push((name, sample.to_string(), hist));
                }
            }
        }
    }

    found
}

/// Aligns histograms on the union of their buckets.
fn align(info: &ChartInfo, collected: Vec<(String, String, &Histogram)>) -> HistogramView {
    // The first label seen for a bound is the one displayed.
    let mut union: BTreeMap<u64, String> = BTreeMap::new();
    for (_, _, hist) in &collected {
        for bucket in hist.buckets() {
            union
                .entry(bucket.bound)
                .or_insert_with(|| bucket.label.clone());
        }
    }

    let series = collected
        .into_iter()
        .map(|(name, sample, hist)| {
            let values: Vec<f64> = union
                .keys()
                .map(|bound| hist.get(*bound).unwrap_or(0) as f64)
                .collect();

            HistogramSeries {
                name,
                sample,
                cumulative: Some(running_sum(&values)),
                values,
            }
        })
        .collect();

    HistogramView {
        chart: info.id.to_string(),
        title: info.title.to_string(),
        x_label: info.x_label.to_string(),
        y_label: info.y_label.to_string(),
        buckets: union
            .into_iter()
            .map(|(bound, label)| Bucket { label, bound })
            .collect(),
        series,
    }
}

/// Running sum from the lowest bucket.
pub fn running_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Derives the share of the total at or above each bucket from the running
/// sum of a count chart. Series whose total is zero are left out.
fn at_or_above(coverage: &HistogramView, info: &ChartInfo) -> Option<HistogramView> {
    let series: Vec<HistogramSeries> = coverage
        .series
        .iter()
        .filter_map(|s| {
            let cumulative = s.cumulative.clone().unwrap_or_else(|| running_sum(&s.values));
            let total = *cumulative.last()?;
            if total <= 0.0 {
                return None;
            }

            let values = std::iter::once(0.0)
                .chain(cumulative.iter().copied())
                .take(cumulative.len())
                .map(|below| (total - below) / total * 100.0)
                .collect();

            Some(HistogramSeries {
                name: s.name.clone(),
                sample: s.sample.clone(),
                values,
                cumulative: None,
            })
        })
        .collect();

    if series.is_empty() {
        return None;
    }

    Some(HistogramView {
        chart: info.id.to_string(),
        title: info.title.to_string(),
        x_label: info.x_label.to_string(),
        y_label: info.y_label.to_string(),
        buckets: coverage.buckets.clone(),
        series,
    })
}
