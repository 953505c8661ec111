//! Parser for `*.wgs_contig_mean_cov_<normal|tumor>.csv`.
//!
//! Each row is `contig,aligned bases,mean coverage`; there is no header. DRAGEN
//! may append summary rows such as `Autosomal regions` after the contigs, which
//! are kept like any other category.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::expect_columns;
use super::parse_count;
use super::read_rows;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::NamedSeries;
use crate::aggregate::record::ParsedRecord;
use crate::aggregate::record::SeriesData;
use crate::aggregate::value::MetricValue;

/// Chart identifier of the per-contig mean coverage.
pub const CHART: &str = "contig_mean_coverage";

/// Parser for per-contig mean coverage.
pub struct CoveragePerContigParser;

impl KindParser for CoveragePerContigParser {
    fn kind(&self) -> MetricKind {
        MetricKind::CoveragePerContig
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let mut means: IndexMap<String, f64> = IndexMap::new();

        for row in read_rows(contents)? {
            expect_columns(&row, 3, "3")?;

            // Only validated; the bases are not reported on their own.
            parse_count(&row, 1, "Aligned bases")?;

            let contig = row.first().to_string();
            let mean = row.fields[2]
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseError::NotNumeric {
                    line: row.line,
                    column: contig.clone(),
                    value: row.fields[2].clone(),
                })?;

            match means.entry(contig) {
                Entry::Occupied(e) => {
                    return Err(ParseError::DuplicateContig {
                        line: row.line,
                        name: e.key().clone(),
                    })
                }
                Entry::Vacant(e) => {
                    e.insert(mean);
                }
            }
        }

        let metrics = means
            .iter()
            .map(|(contig, mean)| (contig.clone(), MetricValue::Float(*mean)))
            .collect();

        Ok(ParsedRecord {
            metrics,
            series: vec![NamedSeries {
                chart: CHART.to_string(),
                label: None,
                data: SeriesData::Categorical(means),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contigs_in_file_order() {
        let record = CoveragePerContigParser
            .parse("chr1,1000,30.5\nchr2,900,29\nchrX,400,15.25\nAutosomal regions,1900,29.8\n")
            .unwrap();

        let SeriesData::Categorical(means) = &record.series[0].data else {
            panic!("expected categorical data");
        };
        let contigs: Vec<_> = means.keys().map(String::as_str).collect();
        assert_eq!(contigs, ["chr1", "chr2", "chrX", "Autosomal regions"]);
        assert_eq!(means["chr2"], 29.0);
        assert_eq!(record.get("chrX"), Some(&MetricValue::Float(15.25)));
    }

    #[test]
    fn test_round_trip_of_contig_means() {
        let contents = "chr1,1000,30.5\nchr2,900,29\nchrM,10,2000.125\nchrX,400,0.0\n";
        let record = CoveragePerContigParser.parse(contents).unwrap();

        let SeriesData::Categorical(means) = &record.series[0].data else {
            panic!("expected categorical data");
        };
        for line in contents.lines() {
            let fields: Vec<&str> = line.split(',').collect();
            let expected: f64 = fields[2].parse().unwrap();
            assert_eq!(means[fields[0]], expected, "{}", line);
            assert_eq!(record.get(fields[0]), Some(&MetricValue::Float(expected)));
        }

        let written: String = means
            .iter()
            .map(|(contig, mean)| format!("{},1,{}\n", contig, mean))
            .collect();
        assert_eq!(CoveragePerContigParser.parse(&written).unwrap(), record);
    }

    #[test]
    fn test_duplicate_contig() {
        let err = CoveragePerContigParser
            .parse("chr1,1,1.0\nchr1,1,1.0\n")
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateContig {
                line: 2,
                name: String::from("chr1")
            }
        );
    }

    #[test]
    fn test_wrong_column_count() {
        let err = CoveragePerContigParser.parse("chr1,1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::ColumnCount {
                line: 1,
                expected: "3",
                found: 2
            }
        );
    }

    #[test]
    fn test_non_numeric_mean() {
        let err = CoveragePerContigParser.parse("chr1,10,high\n").unwrap_err();
        assert!(matches!(err, ParseError::NotNumeric { line: 1, .. }));
    }
}
