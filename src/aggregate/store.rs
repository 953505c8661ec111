//! Accumulation of parsed records per sample.
//!
//! The [`SampleStore`] is owned by the aggregation engine while files are
//! being merged. Once every kind has been processed, it is frozen into a
//! [`FrozenStore`], which only exposes read-only lookups.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use super::errors::MergeConflict;
use super::kind::MetricKind;
use super::record::qualified_name;
use super::record::ParsedRecord;
use super::record::SampleKey;
use super::value::MetricValue;

/// One populated (kind, qualifier) slot of a sample.
#[derive(Clone, Debug, Serialize)]
pub struct Slot {
    /// The parsed record.
    pub record: ParsedRecord,

    /// The file the record was parsed from.
    pub provenance: PathBuf,
}

/// Everything known about one sample, keyed by (kind, qualifier).
#[derive(Clone, Debug, Default, Serialize)]
pub struct SampleRecord {
    #[serde(with = "slot_list")]
    slots: IndexMap<(MetricKind, Option<String>), Slot>,
}

impl SampleRecord {
    /// Gets a slot.
    pub fn slot(&self, kind: MetricKind, qualifier: Option<&str>) -> Option<&Slot> {
        self.slots.get(&(kind, qualifier.map(String::from)))
    }

    /// Every slot, as `(kind, qualifier, slot)` in merge order.
    pub fn slots(&self) -> impl Iterator<Item = (MetricKind, Option<&str>, &Slot)> {
        self.slots
            .iter()
            .map(|((kind, q), slot)| (*kind, q.as_deref(), slot))
    }

    /// Every slot of the given kind, as `(qualifier, slot)` pairs in merge
    /// order.
    pub fn slots_of(&self, kind: MetricKind) -> impl Iterator<Item = (Option<&str>, &Slot)> {
        self.slots
            .iter()
            .filter(move |((k, _), _)| *k == kind)
            .map(|((_, q), slot)| (q.as_deref(), slot))
    }

    /// Every metric of the given kind, addressed by its qualified name
    /// (`tumor:Ploidy estimation`) so that subsets never shadow each other.
    pub fn metrics(&self, kind: MetricKind) -> IndexMap<String, &MetricValue> {
        self.slots_of(kind)
            .flat_map(|(qualifier, slot)| {
                slot.record
                    .metrics
                    .iter()
                    .map(move |(name, value)| (qualified_name(qualifier, name), value))
            })
            .collect()
    }

    /// Whether the sample holds any data for the kind.
    pub fn has_kind(&self, kind: MetricKind) -> bool {
        self.slots.keys().any(|(k, _)| *k == kind)
    }
}

//==============//
// Sample store //
//==============//

/// Mutable mapping from sample name to its accumulated record.
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: BTreeMap<String, SampleRecord>,
    samples_found: BTreeSet<String>,
}

impl SampleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a parsed record into the store.
    ///
    /// A second record for the same (sample, kind, qualifier) is rejected with
    /// a [`MergeConflict`] naming both files, and the store is left unchanged.
    pub fn merge(
        &mut self,
        key: &SampleKey,
        kind: MetricKind,
        record: ParsedRecord,
        provenance: impl AsRef<Path>,
    ) -> Result<(), MergeConflict> {
        let provenance = provenance.as_ref();
        let slot_key = (kind, key.qualifier().map(String::from));

        if let Some(existing) = self
            .samples
            .get(key.sample())
            .and_then(|s| s.slots.get(&slot_key))
        {
            return Err(MergeConflict {
                key: key.clone(),
                kind,
                existing: existing.provenance.clone(),
                incoming: provenance.to_path_buf(),
            });
        }

        self.samples
            .entry(key.sample().to_string())
            .or_default()
            .slots
            .insert(
                slot_key,
                Slot {
                    record,
                    provenance: provenance.to_path_buf(),
                },
            );

        self.samples_found.insert(key.sample().to_string());
        Ok(())
    }

    /// Qualified view of every metric a sample holds for a kind.
    pub fn get(&self, sample: &str, kind: MetricKind) -> Option<IndexMap<String, &MetricValue>> {
        lookup(&self.samples, sample, kind)
    }

    /// Gets one slot.
    pub fn get_slot(
        &self,
        sample: &str,
        kind: MetricKind,
        qualifier: Option<&str>,
    ) -> Option<&Slot> {
        self.samples.get(sample)?.slot(kind, qualifier)
    }

    /// Every (sample, kind, qualifier) key populated in the store.
    pub fn all_keys(&self) -> Vec<(SampleKey, MetricKind)> {
        keys_of(&self.samples)
    }

    /// Samples that contributed at least one usable record.
    pub fn samples_found(&self) -> &BTreeSet<String> {
        &self.samples_found
    }

    /// Consumes the store, producing its read-only form.
    pub fn freeze(self) -> FrozenStore {
        FrozenStore {
            samples: self.samples,
            samples_found: self.samples_found,
        }
    }
}

//==============//
// Frozen store //
//==============//

/// Read-only form of a [`SampleStore`], handed to the view builder.
#[derive(Debug, Default, Serialize)]
pub struct FrozenStore {
    samples: BTreeMap<String, SampleRecord>,
    samples_found: BTreeSet<String>,
}

impl FrozenStore {
    /// Qualified view of every metric a sample holds for a kind.
    pub fn get(&self, sample: &str, kind: MetricKind) -> Option<IndexMap<String, &MetricValue>> {
        lookup(&self.samples, sample, kind)
    }

    /// Gets one slot.
    pub fn get_slot(
        &self,
        sample: &str,
        kind: MetricKind,
        qualifier: Option<&str>,
    ) -> Option<&Slot> {
        self.samples.get(sample)?.slot(kind, qualifier)
    }

    /// Every (sample, kind, qualifier) key populated in the store.
    pub fn all_keys(&self) -> Vec<(SampleKey, MetricKind)> {
        keys_of(&self.samples)
    }

    /// Samples in name order.
    pub fn samples(&self) -> impl Iterator<Item = (&str, &SampleRecord)> {
        self.samples.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Samples that contributed at least one usable record.
    pub fn samples_found(&self) -> &BTreeSet<String> {
        &self.samples_found
    }
}

fn lookup<'a>(
    samples: &'a BTreeMap<String, SampleRecord>,
    sample: &str,
    kind: MetricKind,
) -> Option<IndexMap<String, &'a MetricValue>> {
    let record = samples.get(sample)?;
    if !record.has_kind(kind) {
        return None;
    }
    Some(record.metrics(kind))
}

fn keys_of(samples: &BTreeMap<String, SampleRecord>) -> Vec<(SampleKey, MetricKind)> {
    samples
        .iter()
        .flat_map(|(sample, record)| {
            record
                .slots
                .keys()
                .map(move |(kind, qualifier)| (SampleKey::new(sample, qualifier.clone()), *kind))
        })
        .collect()
}

// Tuple keys cannot be JSON object keys, so slots are written as a list.
mod slot_list {
    use indexmap::IndexMap;
    use serde::ser::SerializeSeq;
    use serde::Serialize;
    use serde::Serializer;

    use super::Slot;
    use crate::aggregate::kind::MetricKind;

    #[derive(Serialize)]
    struct Entry<'a> {
        kind: MetricKind,
        qualifier: &'a Option<String>,
        #[serde(flatten)]
        slot: &'a Slot,
    }

    pub fn serialize<S: Serializer>(
        slots: &IndexMap<(MetricKind, Option<String>), Slot>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(slots.len()))?;
        for ((kind, qualifier), slot) in slots {
            seq.serialize_element(&Entry {
                kind: *kind,
                qualifier,
                slot,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, MetricValue)]) -> ParsedRecord {
        ParsedRecord {
            metrics: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            series: Vec::new(),
        }
    }

    fn ploidy(value: &str) -> ParsedRecord {
        record(&[(
            "Ploidy estimation",
            MetricValue::Text(value.to_string()),
        )])
    }

    #[test]
    fn test_qualified_subsets_coexist() {
        let mut store = SampleStore::new();
        let normal = SampleKey::new("sampleA", Some(String::from("normal")));
        let tumor = SampleKey::new("sampleA", Some(String::from("tumor")));

        store
            .merge(&normal, MetricKind::Ploidy, ploidy("XX"), "a_normal.csv")
            .unwrap();
        store
            .merge(&tumor, MetricKind::Ploidy, ploidy("XO"), "a_tumor.csv")
            .unwrap();

        let metrics = store.get("sampleA", MetricKind::Ploidy).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(
            metrics["normal:Ploidy estimation"],
            &MetricValue::Text(String::from("XX"))
        );
        assert_eq!(
            metrics["tumor:Ploidy estimation"],
            &MetricValue::Text(String::from("XO"))
        );
        assert_eq!(store.samples_found().len(), 1);
    }

    #[test]
    fn test_conflict_leaves_store_unchanged() {
        let mut store = SampleStore::new();
        let key = SampleKey::new("sampleA", None);

        store
            .merge(&key, MetricKind::Ploidy, ploidy("XX"), "run1/a.csv")
            .unwrap();
        let err = store
            .merge(&key, MetricKind::Ploidy, ploidy("XY"), "run2/a.csv")
            .unwrap_err();

        assert_eq!(err.existing, PathBuf::from("run1/a.csv"));
        assert_eq!(err.incoming, PathBuf::from("run2/a.csv"));
        assert_eq!(err.kind, MetricKind::Ploidy);

        let slot = store.get_slot("sampleA", MetricKind::Ploidy, None).unwrap();
        assert_eq!(slot.provenance, PathBuf::from("run1/a.csv"));
        assert_eq!(
            slot.record.get("Ploidy estimation"),
            Some(&MetricValue::Text(String::from("XX")))
        );
        assert_eq!(store.all_keys().len(), 1);
    }

    #[test]
    fn test_kinds_of_one_sample_are_independent() {
        let mut store = SampleStore::new();
        let key = SampleKey::new("sampleA", None);

        store
            .merge(&key, MetricKind::Ploidy, ploidy("XX"), "a.ploidy.csv")
            .unwrap();
        store
            .merge(
                &key,
                MetricKind::Mapping,
                record(&[("Total input reads", MetricValue::Integer(10))]),
                "a.mapping.csv",
            )
            .unwrap();

        let frozen = store.freeze();
        assert_eq!(frozen.all_keys().len(), 2);
        assert!(frozen.get("sampleA", MetricKind::Mapping).is_some());
        assert!(frozen.get("sampleA", MetricKind::VariantCalling).is_none());
        assert!(frozen.get("sampleB", MetricKind::Mapping).is_none());
    }

    #[test]
    fn test_frozen_store_serializes() {
        let mut store = SampleStore::new();
        store
            .merge(
                &SampleKey::new("s", Some(String::from("tumor"))),
                MetricKind::Ploidy,
                ploidy("XX"),
                "s.csv",
            )
            .unwrap();

        let json = serde_json::to_value(store.freeze()).unwrap();
        let slot = &json["samples"]["s"]["slots"][0];
        assert_eq!(slot["kind"], "Ploidy");
        assert_eq!(slot["qualifier"], "tumor");
        assert_eq!(slot["provenance"], "s.csv");
    }
}
