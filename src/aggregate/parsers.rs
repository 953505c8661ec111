//! Parsers for each DRAGEN metric file kind.
//!
//! Every kind is handled by one implementation of [`KindParser`]. The
//! aggregation engine never calls a parser directly: it looks the parser up in
//! a [`ParserRegistry`] by [`MetricKind`].

pub mod coverage_histogram;
pub mod coverage_per_contig;
pub mod coverage_summary;
pub mod fragment_length;
pub mod key_value;
pub mod mapping;
pub mod ploidy;
pub mod quality_profile;
pub mod variant_calling;

use std::sync::Arc;

use indexmap::IndexMap;

use super::errors::ParseError;
use super::kind::MetricKind;
use super::record::ParsedRecord;
use crate::utils::histogram::Histogram;
use crate::utils::histogram::PushError;

//=============//
// Parser trait //
//=============//

/// A parser for exactly one kind of metric file. Parsers are stateless: the
/// same parser is shared by every concurrent parse of its kind.
pub trait KindParser: Send + Sync {
    /// The kind this parser understands.
    fn kind(&self) -> MetricKind;

    /// Parses the full contents of one file.
    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError>;
}

/// Maps each [`MetricKind`] to the parser that handles it.
pub struct ParserRegistry {
    parsers: IndexMap<MetricKind, Arc<dyn KindParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_all_kinds()
    }
}

impl ParserRegistry {
    /// Creates a registry holding a parser for every supported kind.
    pub fn with_all_kinds() -> Self {
        let parsers: Vec<Arc<dyn KindParser>> = vec![
            Arc::new(variant_calling::VariantCallingParser),
            Arc::new(ploidy::PloidyParser),
            Arc::new(coverage_histogram::CoverageHistogramParser),
            Arc::new(coverage_summary::CoverageSummaryParser),
            Arc::new(coverage_per_contig::CoveragePerContigParser),
            Arc::new(mapping::MappingParser),
            Arc::new(fragment_length::FragmentLengthParser),
            Arc::new(quality_profile::QualityProfileParser),
        ];

        Self {
            parsers: parsers.into_iter().map(|p| (p.kind(), p)).collect(),
        }
    }

    /// Gets the parser registered for a kind.
    pub fn get(&self, kind: MetricKind) -> Option<Arc<dyn KindParser>> {
        self.parsers.get(&kind).cloned()
    }
}

//==============//
// Row handling //
//==============//

/// A non-empty row of a metric file.
#[derive(Debug)]
pub struct Row {
    /// One-based line number of the row.
    pub line: usize,

    /// Trimmed fields.
    pub fields: Vec<String>,
}

impl Row {
    /// The first field, if any.
    pub fn first(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }
}

// Turns record positions into one-based line numbers. The CSV reader places
// a record at the end of the previous one, before any blank lines it skips,
// so lines are counted from the raw text up to the first byte of the record.
// Positions must be asked for in increasing order.
struct LineCounter<'a> {
    text: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: Option<&csv::Position>) -> usize {
        let Some(position) = position else {
            return self.line;
        };

        let mut byte = usize::try_from(position.byte())
            .unwrap_or(usize::MAX)
            .min(self.text.len());
        while matches!(self.text.get(byte), Some(b'\r' | b'\n')) {
            byte += 1;
        }

        if byte > self.offset {
            self.line += self.text[self.offset..byte]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.offset = byte;
        }

        self.line
    }
}

/// Splits the contents of a metric file into rows. Blank lines are skipped;
/// rows may have any number of fields.
pub fn read_rows(contents: &str) -> Result<Vec<Row>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());
    let mut lines = LineCounter::new(contents);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                return Err(ParseError::Malformed {
                    line: lines.line_at(e.position()),
                    message: e.to_string(),
                })
            }
        };

        let line = lines.line_at(record.position());
        let fields: Vec<String> = record.iter().map(String::from).collect();

        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        rows.push(Row { line, fields });
    }

    if rows.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(rows)
}

/// Parses a non-negative integer column of a row-oriented file.
pub(crate) fn parse_count(row: &Row, index: usize, column: &str) -> Result<u64, ParseError> {
    let raw = row.fields.get(index).map(String::as_str).unwrap_or("");
    raw.parse::<u64>().map_err(|_| ParseError::NotNumeric {
        line: row.line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Parses the bucket label of a histogram row. Open-ended buckets (`1000+`)
/// are bounded by their lower end.
pub(crate) fn parse_bucket(row: &Row, column: &str) -> Result<(String, u64), ParseError> {
    let label = row.first();
    label
        .trim_end_matches('+')
        .trim()
        .parse::<u64>()
        .map(|bound| (label.to_string(), bound))
        .map_err(|_| ParseError::NotNumeric {
            line: row.line,
            column: column.to_string(),
            value: label.to_string(),
        })
}

/// Appends a parsed bucket to a histogram, turning a rejected bucket into a
/// [`ParseError`] that names the line. The total of the histogram is kept
/// within `i64` so that it can be reported as an integer metric.
pub(crate) fn push_bucket(
    hist: &mut Histogram,
    line: usize,
    label: String,
    bound: u64,
    count: u64,
) -> Result<(), ParseError> {
    let fits = hist
        .sum()
        .checked_add(count)
        .is_some_and(|total| i64::try_from(total).is_ok());
    if !fits {
        return Err(ParseError::CountOverflow { line, label });
    }

    hist.push(label.clone(), bound, count).map_err(|e| match e {
        PushError::Order { previous, .. } => ParseError::BucketOrder {
            line,
            label,
            previous,
        },
        PushError::Overflow { .. } => ParseError::CountOverflow { line, label },
    })
}

/// Checks that a row has exactly the expected number of columns.
pub(crate) fn expect_columns(
    row: &Row,
    count: usize,
    expected: &'static str,
) -> Result<(), ParseError> {
    if row.fields.len() != count {
        return Err(ParseError::ColumnCount {
            line: row.line,
            expected,
            found: row.fields.len(),
        });
    }

    Ok(())
}

/// Checks whether a row is the schema header of a row-oriented kind.
pub(crate) fn is_header(row: &Row, header: &[&str]) -> bool {
    row.fields.len() == header.len()
        && row
            .fields
            .iter()
            .zip(header)
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected))
}
