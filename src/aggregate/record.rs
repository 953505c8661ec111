//! Sample identities and the typed record produced by parsing one file.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::value::MetricValue;
use crate::utils::histogram::Histogram;

//============//
// Sample key //
//============//

/// Identity under which all metrics for one sequencing sample are aggregated,
/// along with the optional qualifier (e.g. `tumor`/`normal`) of the subset
/// a file describes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleKey {
    sample: String,
    qualifier: Option<String>,
}

impl SampleKey {
    /// Creates a new [`SampleKey`].
    pub fn new(sample: impl Into<String>, qualifier: Option<String>) -> Self {
        Self {
            sample: sample.into(),
            qualifier,
        }
    }

    /// The sample name. This is the identity used by the sample store.
    pub fn sample(&self) -> &str {
        &self.sample
    }

    /// The subset qualifier, if any.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{} ({})", self.sample, q),
            None => f.write_str(&self.sample),
        }
    }
}

/// Prefixes a metric name with a qualifier, e.g. `tumor:Ploidy estimation`.
///
/// ```
/// use dragen_qc::aggregate::record::qualified_name;
///
/// assert_eq!(qualified_name(Some("tumor"), "Ploidy estimation"), "tumor:Ploidy estimation");
/// assert_eq!(qualified_name(None, "Ploidy estimation"), "Ploidy estimation");
/// ```
pub fn qualified_name(qualifier: Option<&str>, name: &str) -> String {
    match qualifier {
        Some(q) => format!("{}:{}", q, name),
        None => name.to_string(),
    }
}

//========//
// Series //
//========//

/// The data behind one chart-able series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SeriesData {
    /// Counts over ordered buckets.
    Histogram(Histogram),

    /// Values over named categories, in file order.
    Categorical(IndexMap<String, f64>),
}

/// A series extracted from a metric file, tagged with the chart it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    /// Identifier of the chart this series is drawn in.
    pub chart: String,

    /// Distinguishes several series of the same chart within one file (e.g.
    /// `Read1`/`Read2`, or the `#Sample:` blocks of a fragment length file).
    pub label: Option<String>,

    /// The values.
    pub data: SeriesData,
}

//===============//
// Parsed record //
//===============//

/// The typed result of parsing one metric file for one sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Scalar metrics by name, in file order.
    pub metrics: IndexMap<String, MetricValue>,

    /// Histograms and categorical series.
    pub series: Vec<NamedSeries>,
}

impl ParsedRecord {
    /// Gets a metric by name.
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// All series drawn in the given chart, in file order.
    pub fn series_for(&self, chart: &str) -> Vec<&NamedSeries> {
        self.series.iter().filter(|s| s.chart == chart).collect()
    }
}
