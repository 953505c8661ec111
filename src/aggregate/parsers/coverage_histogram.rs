//! Parser for `*.wgs_fine_hist_<normal|tumor>.csv`.
//!
//! ```text
//! Depth,Overall
//! 0,104062
//! 1,9984
//! ...
//! 1000+,12
//! ```
//!
//! The per-depth counts become a histogram in the `coverage` chart; the total,
//! mean and median depth are derived from it.

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

/// Chart identifier of the per-depth coverage histogram.
pub const CHART: &str = "coverage";

/// Parser for fine coverage histograms.
pub struct CoverageHistogramParser;

impl KindParser for CoverageHistogramParser {
    fn kind(&self) -> MetricKind {
        MetricKind::CoverageHistogram
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let header = self.kind().schema().header.unwrap_or(&["Depth", "Overall"]);
        let rows = read_rows(contents)?;
        let mut rows = rows.into_iter().peekable();

        // The header is optional, but a non-numeric first row must be it.
        if let Some(first) = rows.peek() {
            if is_header(first, header) {
                rows.next();
            } else if first.first().trim_end_matches('+').parse::<u64>().is_err() {
                return Err(ParseError::Header {
                    line: first.line,
                    found: first.fields.join(","),
                    expected: header.join(","),
                });
            }
        }

        let mut hist = Histogram::default();
        for row in rows {
            expect_columns(&row, 2, "2")?;
            let (label, bound) = parse_bucket(&row, header[0])?;
            let count = parse_count(&row, 1, header[1])?;
            push_bucket(&mut hist, row.line, label, bound, count)?;
        }

        if hist.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut record = ParsedRecord::default();
        if let Ok(total) = i64::try_from(hist.sum()) {
            record
                .metrics
                .insert(String::from("Total"), MetricValue::Integer(total));
        }
        if let Some(mean) = hist.mean() {
            record
                .metrics
                .insert(String::from("Mean depth"), MetricValue::Float(mean));
        }
        if let Some(median) = hist.median().and_then(|m| i64::try_from(m).ok()) {
            record
                .metrics
                .insert(String::from("Median depth"), MetricValue::Integer(median));
        }

        record.series.push(NamedSeries {
            chart: CHART.to_string(),
            label: None,
            data: SeriesData::Histogram(hist),
        });

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(record: &ParsedRecord) -> &Histogram {
        match &record.series_for(CHART)[0].data {
            SeriesData::Histogram(h) => h,
            SeriesData::Categorical(_) => panic!("expected a histogram"),
        }
    }

    #[test]
    fn test_histogram_with_open_ended_bucket() {
        let record = CoverageHistogramParser
            .parse("Depth,Overall\n0,10\n1,20\n2,30\n3+,40\n")
            .unwrap();

        let hist = histogram(&record);
        assert_eq!(hist.values(), [10, 20, 30, 40]);
        assert_eq!(hist.buckets()[3].label, "3+");
        assert_eq!(hist.buckets()[3].bound, 3);

        assert_eq!(record.get("Total"), Some(&MetricValue::Integer(100)));
        assert_eq!(record.get("Mean depth"), Some(&MetricValue::Float(2.0)));
        assert_eq!(record.get("Median depth"), Some(&MetricValue::Integer(2)));
    }

    #[test]
    fn test_header_is_optional() {
        let record = CoverageHistogramParser.parse("0,1\n1,1\n").unwrap();
        assert_eq!(histogram(&record).len(), 2);
    }

    #[test]
    fn test_unexpected_header() {
        let err = CoverageHistogramParser
            .parse("Coverage,Bases\n0,1\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Header { line: 1, .. }));
    }

    #[test]
    fn test_bucket_order_violation() {
        let err = CoverageHistogramParser
            .parse("Depth,Overall\n0,1\n2,1\n1,1\n")
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::BucketOrder {
                line: 4,
                label: String::from("1"),
                previous: 2
            }
        );
    }

    #[test]
    fn test_non_numeric_count() {
        let err = CoverageHistogramParser
            .parse("Depth,Overall\n0,many\n")
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::NotNumeric {
                line: 2,
                column: String::from("Overall"),
                value: String::from("many"),
            }
        );
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = CoverageHistogramParser.parse("Depth,Overall\n").unwrap_err();
        assert_eq!(err, ParseError::Empty);
    }

    #[test]
    fn test_counts_that_overflow_the_total_are_an_error() {
        let half = i64::MAX as u64 / 2 + 10;
        let err = CoverageHistogramParser
            .parse(&format!("Depth,Overall\n0,{}\n1,{}\n", half, half))
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::CountOverflow {
                line: 3,
                label: String::from("1")
            }
        );

        let err = CoverageHistogramParser
            .parse(&format!("0,{}\n", u64::MAX))
            .unwrap_err();
        assert!(matches!(err, ParseError::CountOverflow { line: 1, .. }));
    }

    #[test]
    fn test_round_trip_of_bucket_counts() {
        let contents = "Depth,Overall\n0,104062\n1,9984\n2,0\n5,3\n1000+,12\n";
        let record = CoverageHistogramParser.parse(contents).unwrap();
        let hist = histogram(&record);

        for line in contents.lines().skip(1) {
            let (label, count) = line.split_once(',').unwrap();
            let bound: u64 = label.trim_end_matches('+').parse().unwrap();
            assert_eq!(hist.get(bound), Some(count.parse().unwrap()), "{}", line);
        }

        let written: String = hist
            .iter()
            .map(|(bucket, count)| format!("{},{}\n", bucket.label, count))
            .collect();
        assert_eq!(CoverageHistogramParser.parse(&written).unwrap(), record);
    }

    #[test]
    fn test_all_zero_histogram_has_no_mean() {
        let record = CoverageHistogramParser.parse("0,0\n1,0\n").unwrap();
        assert_eq!(record.get("Total"), Some(&MetricValue::Integer(0)));
        assert!(record.get("Mean depth").is_none());
    }
}
