//! Detail tables: every metric of a kind, one row per (sample, qualifier).

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::aggregate::kind::MetricKind;
use crate::aggregate::store::FrozenStore;
use crate::aggregate::value::MetricValue;

/// One row of a detail table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    /// The sample.
    pub sample: String,

    /// The qualifier of the slot.
    pub qualifier: Option<String>,

    /// Values by column. Absent metrics have no entry.
    pub values: IndexMap<String, MetricValue>,
}

/// The detail table of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailTable {
    /// The kind.
    pub kind: MetricKind,

    /// Every schema metric in schema order, followed by the metrics not
    /// covered by the schema in the order they were first seen.
    pub columns: Vec<String>,

    /// Rows in sample order.
    pub rows: Vec<DetailRow>,
}

/// Builds the detail table of every kind that holds data.
pub fn build(store: &FrozenStore) -> Vec<DetailTable> {
    MetricKind::ALL
        .into_iter()
        .filter_map(|kind| build_one(store, kind))
        .collect()
}

fn build_one(store: &FrozenStore, kind: MetricKind) -> Option<DetailTable> {
    let mut columns: IndexSet<String> = kind
        .schema()
        .metrics
        .iter()
        .map(|m| m.name.to_string())
        .collect();
    let mut rows = Vec::new();

    for (sample, record) in store.samples() {
        for (qualifier, slot) in record.slots_of(kind) {
            for name in slot.record.metrics.keys() {
                if !columns.contains(name) {
                    columns.insert(name.clone());
                }
            }

            rows.push(DetailRow {
                sample: sample.to_string(),
                qualifier: qualifier.map(String::from),
                values: slot.record.metrics.clone(),
            });
        }
    }

    if rows.is_empty() {
        return None;
    }

    Some(DetailTable {
        kind,
        columns: columns.into_iter().collect(),
        rows,
    })
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
    fn test_schema_columns_first_then_unknown() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("a", None),
                MetricKind::Ploidy,
                record(&[
                    ("Brand new metric", MetricValue::Integer(1)),
                    ("Ploidy estimation", MetricValue::Text(String::from("XX"))),
                ]),
                "a.csv",
            )
            .unwrap();

        let tables = build(&store.freeze());
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        let schema = MetricKind::Ploidy.schema().metrics;
        assert_eq!(table.columns.len(), schema.len() + 1);
        assert_eq!(table.columns[0], schema[0].name);
        assert_eq!(table.columns.last().unwrap(), "Brand new metric");
    }

    #[test]
    fn test_one_row_per_slot() {
        let mut store = SampleStore::new();
        for (sample, qualifier) in [("b", Some("tumor")), ("a", None), ("b", Some("normal"))] {
            store
                .merge(
                    &SampleKey::new(sample, qualifier.map(String::from)),
                    MetricKind::CoverageSummary,
                    record(&[("Aligned bases", MetricValue::Integer(1))]),
                    format!("{}_{:?}.csv", sample, qualifier),
                )
                .unwrap();
        }

        let tables = build(&store.freeze());
        let rows: Vec<_> = tables[0]
            .rows
            .iter()
            .map(|r| (r.sample.as_str(), r.qualifier.as_deref()))
            .collect();

        assert_eq!(
            rows,
            [("a", None), ("b", Some("tumor")), ("b", Some("normal"))]
        );
    }
}
