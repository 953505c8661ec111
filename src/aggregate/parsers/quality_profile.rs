//! Parser for `*.fastqc_metrics.csv`.
//!
//! Every row is kept as a scalar metric (named `<SECTION> [<read>]: <metric>`).
//! In addition, three sections are read back into per-read histograms:
//!
//! | Section             | Row metric            | Chart               |
//! |---------------------|-----------------------|---------------------|
//! | `READ MEAN QUALITY` | `Q<n> Reads`          | `read_mean_quality` |
//! | `READ GC CONTENT`   | `<n>% GC Reads`       | `read_gc_content`   |
//! | `READ LENGTHS`      | `[<a>-]<b>bp Length Reads` | `read_lengths` |
//!
//! Each read (`Read1`, `Read2`) yields its own series.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use super::key_value;
use super::key_value::KeyValueRow;
use super::push_bucket;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::NamedSeries;
use crate::aggregate::record::ParsedRecord;
use crate::aggregate::record::SeriesData;
use crate::utils::histogram::Histogram;

/// Chart identifier of the mean read quality distribution.
pub const MEAN_QUALITY_CHART: &str = "read_mean_quality";

/// Chart identifier of the read GC content distribution.
pub const GC_CONTENT_CHART: &str = "read_gc_content";

/// Chart identifier of the read length distribution.
pub const READ_LENGTHS_CHART: &str = "read_lengths";

struct HistogramSection {
    section: &'static str,
    chart: &'static str,
    pattern: &'static str,
}

const HISTOGRAM_SECTIONS: &[HistogramSection] = &[
    HistogramSection {
        section: "READ MEAN QUALITY",
        chart: MEAN_QUALITY_CHART,
        pattern: r"^Q(\d+) Reads$",
    },
    HistogramSection {
        section: "READ GC CONTENT",
        chart: GC_CONTENT_CHART,
        pattern: r"^(\d+)% GC Reads$",
    },
    HistogramSection {
        section: "READ LENGTHS",
        chart: READ_LENGTHS_CHART,
        pattern: r"^(?:\d+-)?(\d+)bp Length Reads$",
    },
];

fn section_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        HISTOGRAM_SECTIONS
            .iter()
            .map(|s| Regex::new(s.pattern).unwrap())
            .collect()
    })
}

/// Parser for quality profile metrics.
pub struct QualityProfileParser;

impl KindParser for QualityProfileParser {
    fn kind(&self) -> MetricKind {
        MetricKind::QualityProfile
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let rows = key_value::read_key_value_rows(contents)?;
        let mut record = key_value::to_record(self.kind(), &rows)?;
        record.series = histograms(&rows)?;
        Ok(record)
    }
}

/// Collects the histogram rows of every read, keyed by (chart, read).
fn histograms(rows: &[KeyValueRow]) -> Result<Vec<NamedSeries>, ParseError> {
    let patterns = section_patterns();

    let mut buckets: IndexMap<(&'static str, Option<String>), Vec<(u64, &KeyValueRow, u64)>> =
        IndexMap::new();

    for row in rows {
        let Some(section) = row.section.as_deref() else {
            continue;
        };

        for (spec, pattern) in HISTOGRAM_SECTIONS.iter().zip(patterns) {
            if !spec.section.eq_ignore_ascii_case(section) {
                continue;
            }

            let bound = pattern
                .captures(&row.metric)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok());

            // Missing or non-integral counts leave the bucket out.
            if let (Some(bound), Ok(count)) = (bound, row.value.parse::<u64>()) {
                buckets
                    .entry((spec.chart, row.group.clone()))
                    .or_default()
                    .push((bound, row, count));
            }
        }
    }

    let mut series = Vec::with_capacity(buckets.len());
    for ((chart, label), mut entries) in buckets {
        entries.sort_by_key(|(bound, _, _)| *bound);

        let mut hist = Histogram::default();
        for (bound, row, count) in entries {
            push_bucket(&mut hist, row.line, row.metric.clone(), bound, count)?;
        }

        series.push(NamedSeries {
            chart: chart.to_string(),
            label,
            data: SeriesData::Histogram(hist),
        });
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::value::MetricValue;

    const FASTQC: &str = "\
READ MEAN QUALITY,Read1,Q30 Reads,700
READ MEAN QUALITY,Read1,Q20 Reads,200
READ MEAN QUALITY,Read1,Q10 Reads,100
READ MEAN QUALITY,Read2,Q30 Reads,650
READ GC CONTENT,Read1,40% GC Reads,300
READ GC CONTENT,Read1,50% GC Reads,500
READ LENGTHS,Read1,145-150bp Length Reads,10
READ LENGTHS,Read1,151bp Length Reads,990
POSITIONAL BASE CONTENT,Read1,ReadPos 1 A Bases,250
";

    fn histogram<'a>(record: &'a ParsedRecord, chart: &str, read: &str) -> &'a Histogram {
        let series = record
            .series_for(chart)
            .into_iter()
            .find(|s| s.label.as_deref() == Some(read))
            .unwrap();
        match &series.data {
            SeriesData::Histogram(h) => h,
            SeriesData::Categorical(_) => panic!("expected a histogram"),
        }
    }

    #[test]
    fn test_every_row_is_a_metric() {
        let record = QualityProfileParser.parse(FASTQC).unwrap();

        assert_eq!(record.metrics.len(), 9);
        assert_eq!(
            record.get("POSITIONAL BASE CONTENT [Read1]: ReadPos 1 A Bases"),
            Some(&MetricValue::Integer(250))
        );
    }

    #[test]
    fn test_histograms_per_read_are_sorted_by_bound() {
        let record = QualityProfileParser.parse(FASTQC).unwrap();

        let quality = histogram(&record, MEAN_QUALITY_CHART, "Read1");
        assert_eq!(quality.values(), [100, 200, 700]);
        assert_eq!(quality.buckets()[0].label, "Q10 Reads");

        let quality = histogram(&record, MEAN_QUALITY_CHART, "Read2");
        assert_eq!(quality.values(), [650]);

        let gc = histogram(&record, GC_CONTENT_CHART, "Read1");
        assert_eq!(gc.buckets()[1].bound, 50);

        let lengths = histogram(&record, READ_LENGTHS_CHART, "Read1");
        assert_eq!(lengths.buckets()[0].bound, 150);
        assert_eq!(lengths.buckets()[1].bound, 151);
    }

    #[test]
    fn test_file_without_histogram_sections() {
        let record = QualityProfileParser
            .parse("SEQUENCE POSITIONS,Read1,'AGATCGGAAG' 1bp Starts,3\n")
            .unwrap();
        assert!(record.series.is_empty());
        assert_eq!(record.metrics.len(), 1);
    }
}
