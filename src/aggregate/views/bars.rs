//! Categorical bar charts.

use serde::Deserialize;
use serde::Serialize;

use super::ChartInfo;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::parsers::coverage_per_contig;
use crate::aggregate::record::SampleKey;
use crate::aggregate::record::SeriesData;
use crate::aggregate::store::FrozenStore;
use crate::utils::genome::classify_contig;
use crate::utils::genome::is_autosome;
use crate::utils::genome::SequenceKind;

/// Name of the synthetic category holding the mean over the autosomes.
pub const AUTOSOMAL_AVERAGE: &str = "Autosomal average";

/// Identifier of the mapping read category chart.
pub const READ_CATEGORIES_CHART: &str = "mapping_read_categories";

/// The mapping metrics that partition the input reads.
pub const READ_CATEGORIES: &[&str] = &[
    "Number of unique & mapped reads (excl. duplicate marked reads)",
    "Number of duplicate marked reads",
    "Unmapped reads",
];

/// Every bar chart, in display order.
pub const CHARTS: &[ChartInfo] = &[
    ChartInfo {
        id: coverage_per_contig::CHART,
        title: "Mean Coverage per Contig",
        x_label: "Contig",
        y_label: "Mean coverage (x)",
    },
    ChartInfo {
        id: READ_CATEGORIES_CHART,
        title: "Mapped Read Categories",
        x_label: "Category",
        y_label: "Reads",
    },
];

/// One series of a bar chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Display name (sample and qualifier).
    pub name: String,

    /// The sample the series belongs to.
    pub sample: String,

    /// One value per category of the chart; `None` where the sample has no
    /// value.
    pub values: Vec<Option<f64>>,
}

/// A bar chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarView {
    /// Identifier of the chart.
    pub chart: String,

    /// Title of the chart.
    pub title: String,

    /// Label of the x-axis.
    pub x_label: String,

    /// Label of the y-axis.
    pub y_label: String,

    /// Categories shared by every series.
    pub categories: Vec<String>,

    /// Series, in sample order.
    pub series: Vec<BarSeries>,
}

impl BarView {
    fn new(info: &ChartInfo, categories: Vec<String>, series: Vec<BarSeries>) -> Self {
        Self {
            chart: info.id.to_string(),
            title: info.title.to_string(),
            x_label: info.x_label.to_string(),
            y_label: info.y_label.to_string(),
            categories,
            series,
        }
    }
}

/// Builds every bar chart that has data.
pub fn build(store: &FrozenStore) -> Vec<BarView> {
    CHARTS
        .iter()
        .filter_map(|info| match info.id {
            coverage_per_contig::CHART => contig_coverage(store, info),
            READ_CATEGORIES_CHART => read_categories(store, info),
            _ => None,
        })
        .collect()
}

//==========================//
// Mean coverage per contig //
//==========================//

// Autosomes in numeric order, then X, Y and the mitochondrion, then the
// synthetic average.
fn contig_order(name: &str) -> (u8, u32) {
    if name == AUTOSOMAL_AVERAGE {
        return (3, 0);
    }

    let stripped = name
        .strip_prefix("chr")
        .or_else(|| name.strip_prefix("Chr"))
        .unwrap_or(name);

    match classify_contig(name) {
        SequenceKind::Autosome => (0, stripped.parse().unwrap_or(u32::MAX)),
        SequenceKind::SexChromosome => (1, u32::from(stripped == "Y")),
        _ => (2, 0),
    }
}

/// Per-contig mean coverage over the primary chromosomes, plus the unweighted
/// mean over the autosomes the sample has a value for.
fn contig_coverage(store: &FrozenStore, info: &ChartInfo) -> Option<BarView> {
    let mut rows: Vec<(String, String, Vec<(String, f64)>)> = Vec::new();

    for (sample, record) in store.samples() {
        for (qualifier, slot) in record.slots_of(MetricKind::CoveragePerContig) {
            for series in slot.record.series_for(info.id) {
                let SeriesData::Categorical(means) = &series.data else {
                    continue;
                };

                let mut values: Vec<(String, f64)> = means
                    .iter()
                    .filter(|(contig, _)| classify_contig(contig).is_primary_chromosome())
                    .map(|(contig, mean)| (contig.clone(), *mean))
                    .collect();

                if let Some(average) = autosomal_average(&values) {
                    values.push((AUTOSOMAL_AVERAGE.to_string(), average));
                }

                if values.is_empty() {
                    continue;
                }

                let key = SampleKey::new(sample, qualifier.map(String::from));
                rows.push((key.to_string(), sample.to_string(), values));
            }
        }
    }

    if rows.is_empty() {
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    for (_, _, values) in &rows {
        for (contig, _) in values {
            if !categories.contains(contig) {
                categories.push(contig.clone());
            }
        }
    }
    categories.sort_by_key(|c| contig_order(c));

    let series = rows
        .into_iter()
        .map(|(name, sample, values)| BarSeries {
            name,
            sample,
            values: categories
                .iter()
                .map(|c| values.iter().find(|(contig, _)| contig == c).map(|(_, v)| *v))
                .collect(),
        })
        .collect();

    Some(BarView::new(info, categories, series))
}

/// The unweighted mean over the autosomes present. `None` when there are
/// none.
pub fn autosomal_average(values: &[(String, f64)]) -> Option<f64> {
    let autosomes: Vec<f64> = values
        .iter()
        .filter(|(contig, _)| is_autosome(contig))
        .map(|(_, mean)| *mean)
        .collect();

    if autosomes.is_empty() {
        return None;
    }

    Some(autosomes.iter().sum::<f64>() / autosomes.len() as f64)
}

//=================//
// Read categories //
//=================//

fn read_categories(store: &FrozenStore, info: &ChartInfo) -> Option<BarView> {
    let mut series = Vec::new();

    for (sample, record) in store.samples() {
        for (qualifier, slot) in record.slots_of(MetricKind::Mapping) {
            let values: Vec<Option<f64>> = READ_CATEGORIES
                .iter()
                .map(|name| slot.record.get(name).and_then(|v| v.as_f64()))
                .collect();

            if values.iter().all(Option::is_none) {
                continue;
            }

            series.push(BarSeries {
                name: SampleKey::new(sample, qualifier.map(String::from)).to_string(),
                sample: sample.to_string(),
                values,
            });
        }
    }

    if series.is_empty() {
        return None;
    }

    let categories = READ_CATEGORIES.iter().map(|c| c.to_string()).collect();
    Some(BarView::new(info, categories, series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::parsers::coverage_per_contig::CoveragePerContigParser;
    use crate::aggregate::parsers::mapping::MappingParser;
    use crate::aggregate::parsers::KindParser;
    use crate::aggregate::store::SampleStore;

    fn contigs(store: &mut SampleStore, sample: &str, contents: &str) {
        store
            .merge(
                &SampleKey::new(sample, None),
                MetricKind::CoveragePerContig,
                CoveragePerContigParser.parse(contents).unwrap(),
                format!("{}.csv", sample),
            )
            .unwrap();
    }

    #[test]
    fn test_autosomal_average_over_present_autosomes_only() {
        let mut store = SampleStore::new();
        contigs(
            &mut store,
            "a",
            "chr2,1,20.0\nchr1,1,30.0\nchrX,1,15.0\nchrUn_x,1,99.0\nAutosomal regions,1,25.0\n",
        );

        let views = build(&store.freeze());
        let view = &views[0];

        assert_eq!(
            view.categories,
            ["chr1", "chr2", "chrX", AUTOSOMAL_AVERAGE]
        );
        assert_eq!(
            view.series[0].values,
            [Some(30.0), Some(20.0), Some(15.0), Some(25.0)]
        );
    }

    #[test]
    fn test_average_is_omitted_without_autosomes() {
        let mut store = SampleStore::new();
        contigs(&mut store, "a", "chrX,1,15.0\nchrY,1,1.0\n");
        contigs(&mut store, "b", "chr1,1,10.0\n");

        let views = build(&store.freeze());
        let view = &views[0];

        assert_eq!(view.categories, ["chr1", "chrX", "chrY", AUTOSOMAL_AVERAGE]);
        assert_eq!(view.series[0].values, [None, Some(15.0), Some(1.0), None]);
        assert_eq!(
            view.series[1].values,
            [Some(10.0), None, None, Some(10.0)]
        );
    }

    #[test]
    fn test_contig_order_is_numeric() {
        let mut names = vec!["chr10", "chrM", "chr2", "chrY", "chrX", "chr1"];
        names.sort_by_key(|c| contig_order(c));
        assert_eq!(names, ["chr1", "chr2", "chr10", "chrX", "chrY", "chrM"]);
    }

    #[test]
    fn test_read_categories() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("a", None),
                MetricKind::Mapping,
                MappingParser
                    .parse(
                        "MAPPING/ALIGNING SUMMARY,,Number of duplicate marked reads,10,10.00\n\
                         MAPPING/ALIGNING SUMMARY,,Number of unique & mapped reads (excl. duplicate marked reads),85,85.00\n\
                         MAPPING/ALIGNING SUMMARY,,Unmapped reads,5,5.00\n",
                    )
                    .unwrap(),
                "a.csv",
            )
            .unwrap();

        let views = build(&store.freeze());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].chart, READ_CATEGORIES_CHART);
        assert_eq!(views[0].series[0].values, [Some(85.0), Some(10.0), Some(5.0)]);
    }
}
