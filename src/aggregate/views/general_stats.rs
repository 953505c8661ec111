//! The general statistics table: one row per sample, one column per selected
//! metric.

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::qualified_name;
use crate::aggregate::store::FrozenStore;
use crate::aggregate::value::MetricValue;
use crate::aggregate::value::Unit;

/// The headline metrics shown in the general statistics table, in column
/// order.
pub const SELECTION: &[(MetricKind, &str)] = &[
    (MetricKind::VariantCalling, "Total"),
    (MetricKind::VariantCalling, "Ti/Tv ratio"),
    (MetricKind::Ploidy, "Ploidy estimation"),
    (
        MetricKind::CoverageSummary,
        "Average alignment coverage over genome",
    ),
    (
        MetricKind::CoverageSummary,
        "PCT of genome with coverage [ 20x: inf)",
    ),
    (MetricKind::Mapping, "Total input reads"),
    (MetricKind::Mapping, "Mapped reads pct"),
    (MetricKind::Mapping, "Number of duplicate marked reads pct"),
];

/// A column of the general statistics table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// The key of the column within each row (the qualified metric name).
    pub key: String,

    /// The kind the metric comes from.
    pub kind: MetricKind,

    /// The bare metric name.
    pub metric: String,

    /// The qualifier of the slot the metric comes from.
    pub qualifier: Option<String>,

    /// The unit values of the column are displayed with.
    pub unit: Unit,
}

/// One row of the general statistics table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// The sample.
    pub sample: String,

    /// Values by column key. Absent metrics have no entry.
    pub values: IndexMap<String, MetricValue>,
}

/// The general statistics table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralStats {
    /// Columns, in display order.
    pub columns: Vec<Column>,

    /// Rows, in sample order.
    pub rows: Vec<Row>,
}

impl GeneralStats {
    /// Gets the row of a sample.
    pub fn row(&self, sample: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.sample == sample)
    }
}

/// Builds the general statistics table.
pub fn build(store: &FrozenStore) -> GeneralStats {
    let mut columns: IndexSet<Column> = IndexSet::new();
    let mut rows = Vec::new();

    // Column order follows the selection first and the qualifiers second.
    for (kind, metric) in SELECTION {
        for (_, record) in store.samples() {
            for (qualifier, slot) in record.slots_of(*kind) {
                if slot.record.get(metric).is_some() {
                    columns.insert(Column {
                        key: qualified_name(qualifier, metric),
                        kind: *kind,
                        metric: metric.to_string(),
                        qualifier: qualifier.map(String::from),
                        unit: kind.schema().unit_of(metric),
                    });
                }
            }
        }
    }

    for (sample, record) in store.samples() {
        let values = columns
            .iter()
            .filter_map(|column| {
                let slot = record.slot(column.kind, column.qualifier.as_deref())?;
                let value = slot.record.get(&column.metric)?;
                Some((column.key.clone(), value.clone()))
            })
            .collect();

        rows.push(Row {
            sample: sample.to_string(),
            values,
        });
    }

    GeneralStats {
        columns: columns.into_iter().collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::record::ParsedRecord;
    use crate::aggregate::record::SampleKey;
    use crate::aggregate::store::SampleStore;

    fn record(pairs: &[(&str, MetricValue)]) -> ParsedRecord {
        ParsedRecord {
            metrics: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            series: Vec::new(),
        }
    }

    #[test]
    fn test_single_ploidy_sample() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("sampleA", None),
                MetricKind::Ploidy,
                record(&[("Ploidy estimation", MetricValue::Float(2.1))]),
                "sampleA.ploidy_estimation_metrics.csv",
            )
            .unwrap();

        let stats = build(&store.freeze());

        assert_eq!(stats.columns.len(), 1);
        assert_eq!(stats.rows.len(), 1);
        assert_eq!(stats.rows[0].sample, "sampleA");
        assert_eq!(
            stats.rows[0].values.iter().collect::<Vec<_>>(),
            [(
                &String::from("Ploidy estimation"),
                &MetricValue::Float(2.1)
            )]
        );
    }

    #[test]
    fn test_absent_metrics_are_empty_not_zero() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("a", None),
                MetricKind::Mapping,
                record(&[
                    ("Total input reads", MetricValue::Integer(10)),
                    ("Mapped reads pct", MetricValue::Percentage(90.0)),
                ]),
                "a.csv",
            )
            .unwrap();
        store
            .merge(
                &SampleKey::new("b", None),
                MetricKind::Mapping,
                record(&[("Total input reads", MetricValue::Integer(20))]),
                "b.csv",
            )
            .unwrap();

        let stats = build(&store.freeze());

        let keys: Vec<_> = stats.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["Total input reads", "Mapped reads pct"]);
        assert_eq!(stats.columns[0].unit, Unit::Reads);
        assert_eq!(stats.columns[1].unit, Unit::Percent);
        assert!(stats.row("b").unwrap().values.get("Mapped reads pct").is_none());
        assert_eq!(
            stats.row("a").unwrap().values["Mapped reads pct"],
            MetricValue::Percentage(90.0)
        );
    }

    #[test]
    fn test_qualified_columns() {
        let mut store = SampleStore::new();
        for (qualifier, value) in [("normal", "XX"), ("tumor", "X0")] {
            store
                .merge(
                    &SampleKey::new("a", Some(qualifier.to_string())),
                    MetricKind::Ploidy,
                    record(&[("Ploidy estimation", MetricValue::Text(value.to_string()))]),
                    format!("a_{}.csv", qualifier),
                )
                .unwrap();
        }

        let stats = build(&store.freeze());
        let row = stats.row("a").unwrap();

        assert_eq!(
            row.values["tumor:Ploidy estimation"],
            MetricValue::Text(String::from("X0"))
        );
        assert_eq!(
            row.values["normal:Ploidy estimation"],
            MetricValue::Text(String::from("XX"))
        );
    }

    #[test]
    fn test_unselected_metrics_are_left_out() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("a", None),
                MetricKind::Mapping,
                record(&[("QC-failed reads", MetricValue::Integer(1))]),
                "a.csv",
            )
            .unwrap();

        let stats = build(&store.freeze());
        assert!(stats.columns.is_empty());
        assert!(stats.rows[0].values.is_empty());
    }
}
