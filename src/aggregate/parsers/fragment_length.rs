//! Parser for `*.fragment_length_hist.csv`.
//!
//! ```text
//! #Sample: sampleA
//! FragmentLength,Count
//! 36,1
//! 37,0
//! ...
//! ```
//!
//! A file may hold several `#Sample:` blocks (one per read group or sample of
//! a joint run). Each block becomes its own series in the `fragment_length`
//! chart, labeled with the block name. When there is more than one block, the
//! summary metrics of each block are prefixed with its label.

use super::expect_columns;
use super::is_header;
use super::parse_bucket;
use super::parse_count;
use super::push_bucket;
use super::read_rows;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::NamedSeries;
use crate::aggregate::record::ParsedRecord;
use crate::aggregate::record::SeriesData;
use crate::aggregate::value::MetricValue;
use crate::utils::histogram::Histogram;

/// Chart identifier of the fragment length distribution.
pub const CHART: &str = "fragment_length";

const BLOCK_MARKER: &str = "#Sample:";

struct Block {
    label: Option<String>,
    hist: Histogram,
}

/// Parser for fragment length histograms.
pub struct FragmentLengthParser;

impl KindParser for FragmentLengthParser {
    fn kind(&self) -> MetricKind {
        MetricKind::FragmentLength
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let header = self
            .kind()
            .schema()
            .header
            .unwrap_or(&["FragmentLength", "Count"]);

        let mut blocks: Vec<Block> = Vec::new();

        for row in read_rows(contents)? {
            let first = row.first();

            if let Some(name) = first.strip_prefix(BLOCK_MARKER) {
                let label = name.trim().to_string();
                if blocks.iter().any(|b| b.label.as_deref() == Some(label.as_str())) {
                    return Err(ParseError::DuplicateSeries {
                        line: row.line,
                        name: label,
                    });
                }

                blocks.push(Block {
                    label: Some(label),
                    hist: Histogram::default(),
                });
                continue;
            }

            if first.starts_with('#') || is_header(&row, header) {
                continue;
            }

            expect_columns(&row, 2, "2")?;
            let (label, bound) = parse_bucket(&row, header[0])?;
            let count = parse_count(&row, 1, header[1])?;

            if blocks.is_empty() {
                blocks.push(Block {
                    label: None,
                    hist: Histogram::default(),
                });
            }

            if let Some(block) = blocks.last_mut() {
                push_bucket(&mut block.hist, row.line, label, bound, count)?;
            }
        }

        blocks.retain(|b| !b.hist.is_empty());
        if blocks.is_empty() {
            return Err(ParseError::Empty);
        }

        let prefixed = blocks.len() > 1;
        let mut record = ParsedRecord::default();

        for block in blocks {
            let name = |metric: &str| match (&block.label, prefixed) {
                (Some(label), true) => format!("{}: {}", label, metric),
                _ => metric.to_string(),
            };

            if let Ok(total) = i64::try_from(block.hist.sum()) {
                record
                    .metrics
                    .insert(name("Total fragments"), MetricValue::Integer(total));
            }
            if let Some(mean) = block.hist.mean() {
                record
                    .metrics
                    .insert(name("Mean fragment length"), MetricValue::Float(mean));
            }
            if let Some(median) = block.hist.median().and_then(|m| i64::try_from(m).ok()) {
                record
                    .metrics
                    .insert(name("Median fragment length"), MetricValue::Integer(median));
            }

            record.series.push(NamedSeries {
                chart: CHART.to_string(),
                label: block.label,
                data: SeriesData::Histogram(block.hist),
            });
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let record = FragmentLengthParser
            .parse("#Sample: sampleA\nFragmentLength,Count\n100,1\n200,2\n300,1\n")
            .unwrap();

        assert_eq!(record.series.len(), 1);
        assert_eq!(record.series[0].label.as_deref(), Some("sampleA"));
        assert_eq!(record.get("Total fragments"), Some(&MetricValue::Integer(4)));
        assert_eq!(
            record.get("Mean fragment length"),
            Some(&MetricValue::Float(200.0))
        );
        assert_eq!(
            record.get("Median fragment length"),
            Some(&MetricValue::Integer(200))
        );
    }

    #[test]
    fn test_several_blocks_are_kept_apart() {
        let record = FragmentLengthParser
            .parse(
                "#Sample: RG1\nFragmentLength,Count\n100,1\n\
                 #Sample: RG2\nFragmentLength,Count\n100,3\n150,1\n",
            )
            .unwrap();

        let labels: Vec<_> = record
            .series_for(CHART)
            .into_iter()
            .map(|s| s.label.clone().unwrap())
            .collect();
        assert_eq!(labels, ["RG1", "RG2"]);

        assert_eq!(record.get("RG1: Total fragments"), Some(&MetricValue::Integer(1)));
        assert_eq!(record.get("RG2: Total fragments"), Some(&MetricValue::Integer(4)));
        assert!(record.get("Total fragments").is_none());
    }

    #[test]
    fn test_rows_without_block_marker() {
        let record = FragmentLengthParser
            .parse("FragmentLength,Count\n1,1\n2,1\n")
            .unwrap();
        assert_eq!(record.series[0].label, None);
        assert_eq!(record.get("Total fragments"), Some(&MetricValue::Integer(2)));
    }

    #[test]
    fn test_duplicate_block() {
        let err = FragmentLengthParser
            .parse("#Sample: A\n1,1\n#Sample: A\n1,1\n")
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::DuplicateSeries {
                line: 3,
                name: String::from("A")
            }
        );
    }

    #[test]
    fn test_bucket_order_is_checked_per_block() {
        assert!(FragmentLengthParser
            .parse("#Sample: A\n5,1\n6,1\n#Sample: B\n1,1\n2,1\n")
            .is_ok());

        let err = FragmentLengthParser
            .parse("#Sample: A\n5,1\n5,1\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::BucketOrder { line: 3, .. }));
    }

    #[test]
    fn test_round_trip_of_block_counts() {
        let contents = "#Sample: RG1\nFragmentLength,Count\n36,1\n37,0\n400,25\n\
                        #Sample: RG2\nFragmentLength,Count\n36,7\n";
        let record = FragmentLengthParser.parse(contents).unwrap();

        let mut block = None;
        for line in contents.lines() {
            if let Some(name) = line.strip_prefix(BLOCK_MARKER) {
                block = Some(name.trim());
                continue;
            }
            let Some((bound, count)) = line.split_once(',') else {
                continue;
            };
            let Ok(bound) = bound.parse::<u64>() else {
                continue;
            };

            let series = record
                .series_for(CHART)
                .into_iter()
                .find(|s| s.label.as_deref() == block)
                .unwrap();
            let SeriesData::Histogram(hist) = &series.data else {
                panic!("expected a histogram");
            };
            assert_eq!(hist.get(bound), Some(count.parse().unwrap()), "{}", line);
        }

        let mut written = String::new();
        for series in record.series_for(CHART) {
            let SeriesData::Histogram(hist) = &series.data else {
                panic!("expected a histogram");
            };
            written.push_str(&format!("#Sample: {}\n", series.label.as_deref().unwrap()));
            for (bucket, count) in hist.iter() {
                written.push_str(&format!("{},{}\n", bucket.label, count));
            }
        }
        assert_eq!(FragmentLengthParser.parse(&written).unwrap(), record);
    }

    #[test]
    fn test_markers_only_is_empty() {
        let err = FragmentLengthParser
            .parse("#Sample: A\nFragmentLength,Count\n")
            .unwrap_err();
        assert_eq!(err, ParseError::Empty);
    }
}
