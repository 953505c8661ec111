//! Classification of file paths into metric kinds and sample keys.
//!
//! Discovery is deliberately broader than classification: every CSV file
//! whose name mentions the stem of a kind is a candidate. Candidates that then
//! fail to classify are the near-misses reported as unrecognized.

use std::path::Path;

use regex::Regex;
use regex::RegexSet;

use super::kind::MetricKind;
use super::record::SampleKey;

/// Qualifiers DRAGEN appends to the kind stem for tumor/normal analyses.
pub const QUALIFIERS: &[&str] = &["normal", "tumor"];

/// Maps file names onto a [`MetricKind`] and a [`SampleKey`] by their fixed
/// suffixes. Classification is a pure function of the file name.
#[derive(Debug)]
pub struct FileClassifier {
    patterns: Vec<(MetricKind, Regex)>,
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FileClassifier {
    /// Creates a classifier for every supported kind.
    pub fn new() -> Self {
        let patterns = MetricKind::ALL
            .into_iter()
            .map(|kind| (kind, Regex::new(&pattern_for(kind)).unwrap()))
            .collect();

        Self { patterns }
    }

    /// Classifies a path. Returns `None` when the file name matches none of
    /// the known suffixes; such files are simply skipped by the caller.
    ///
    /// ```
    /// use dragen_qc::aggregate::classify::FileClassifier;
    /// use dragen_qc::aggregate::kind::MetricKind;
    ///
    /// let classifier = FileClassifier::new();
    /// let (kind, key) = classifier.classify("out/S1.wgs_fine_hist_tumor.csv").unwrap();
    ///
    /// assert_eq!(kind, MetricKind::CoverageHistogram);
    /// assert_eq!(key.sample(), "S1");
    /// assert_eq!(key.qualifier(), Some("tumor"));
    /// assert!(classifier.classify("out/S1.bam").is_none());
    /// ```
    pub fn classify(&self, path: impl AsRef<Path>) -> Option<(MetricKind, SampleKey)> {
        let file_name = path.as_ref().file_name()?.to_str()?;

        self.patterns.iter().find_map(|(kind, regex)| {
            let captures = regex.captures(file_name)?;
            let sample = captures.name("sample")?.as_str();
            let qualifier = captures.name("qualifier").map(|m| m.as_str().to_string());
            Some((*kind, SampleKey::new(sample, qualifier)))
        })
    }

    /// The pattern-set handed to the file source when listing candidates for
    /// the given kinds.
    pub fn discovery_set(&self, kinds: &[MetricKind]) -> RegexSet {
        RegexSet::new(kinds.iter().map(|kind| discovery_pattern_for(*kind))).unwrap()
    }

    /// The first of the given kinds whose stem the file name mentions. Used to
    /// attribute a candidate that does not classify to a kind.
    pub fn mentioned_kind(
        &self,
        path: impl AsRef<Path>,
        kinds: &[MetricKind],
    ) -> Option<MetricKind> {
        let file_name = path.as_ref().file_name()?.to_str()?;
        kinds
            .iter()
            .copied()
            .find(|kind| file_name.contains(kind.file_stem()))
    }
}

/// The file name pattern for a kind: `<sample>.<stem>[_<qualifier>].csv`.
fn pattern_for(kind: MetricKind) -> String {
    format!(
        r"^(?P<sample>.+)\.{}(?:_(?P<qualifier>{}))?\.csv$",
        regex::escape(kind.file_stem()),
        QUALIFIERS.join("|")
    )
}

/// The file name pattern that makes a file a candidate for a kind.
fn discovery_pattern_for(kind: MetricKind) -> String {
    format!(r"{}.*\.csv", regex::escape(kind.file_stem()))
}
