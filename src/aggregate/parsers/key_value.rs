//! Shared handling for the key-value shaped kinds (mapping, ploidy, variant
//! calling, coverage summary and quality profile).
//!
//! DRAGEN writes these files as `section,group,metric,value[,percentage]`.
//! Shorter rows are accepted as well:
//!
//! | Fields | Layout                                                            |
//! |--------|-------------------------------------------------------------------|
//! | 2      | `metric,value`                                                    |
//! | 3      | `section,metric,value`                                            |
//! | 4      | `section,group,metric,value` or `section,metric,value,percentage` |
//! | 5      | `section,group,metric,value,percentage`                           |
//!
//! A four-field row is read as `section,metric,value,percentage` only when its
//! third field is numeric and its second is not, as metric names are never
//! numbers.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::read_rows;
use super::Row;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::ParsedRecord;
use crate::aggregate::value::is_missing;
use crate::aggregate::value::MetricValue;
use crate::aggregate::value::ValueType;

/// Suffix of the metric holding the percentage column of a row.
pub const PERCENTAGE_SUFFIX: &str = " pct";

//=====================//
// Rows and row layout //
//=====================//

/// One row of a key-value file, split into its logical fields.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyValueRow {
    /// One-based line number.
    pub line: usize,

    /// Section (first column), if present and non-empty.
    pub section: Option<String>,

    /// Group (read group, sample or read), if present and non-empty.
    pub group: Option<String>,

    /// The metric name as written.
    pub metric: String,

    /// The raw value.
    pub value: String,

    /// The raw percentage, if present.
    pub percentage: Option<String>,
}

enum Layout {
    MetricValue,
    SectionMetricValue,
    SectionGroupMetricValue,
    SectionMetricValuePercentage,
    Full,
}

fn layout_of(row: &Row) -> Result<Layout, ParseError> {
    match row.fields.len() {
        2 => Ok(Layout::MetricValue),
        3 => Ok(Layout::SectionMetricValue),
        4 => {
            let second = MetricValue::parse(&row.fields[1]);
            let third = MetricValue::parse(&row.fields[2]);
            if third.is_numeric() && !second.is_numeric() {
                Ok(Layout::SectionMetricValuePercentage)
            } else {
                Ok(Layout::SectionGroupMetricValue)
            }
        }
        5 => Ok(Layout::Full),
        found => Err(ParseError::ColumnCount {
            line: row.line,
            expected: "2 to 5",
            found,
        }),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl KeyValueRow {
    /// Splits a raw row into its logical fields.
    pub fn from_row(row: Row) -> Result<Self, ParseError> {
        let layout = layout_of(&row)?;
        let line = row.line;

        let mut fields = row.fields.into_iter();
        let mut next = move || fields.next().unwrap_or_default();

        let (section, group, metric, value, percentage) = match layout {
            Layout::MetricValue => (None, None, next(), next(), None),
            Layout::SectionMetricValue => {
                let section = non_empty(next());
                (section, None, next(), next(), None)
            }
            Layout::SectionGroupMetricValue => {
                let section = non_empty(next());
                let group = non_empty(next());
                (section, group, next(), next(), None)
            }
            Layout::SectionMetricValuePercentage => {
                let section = non_empty(next());
                let metric = next();
                let value = next();
                (section, None, metric, value, Some(next()))
            }
            Layout::Full => {
                let section = non_empty(next());
                let group = non_empty(next());
                let metric = next();
                let value = next();
                (section, group, metric, value, Some(next()))
            }
        };

        Ok(Self {
            line,
            section,
            group,
            metric,
            value,
            percentage,
        })
    }

    /// Whether this row belongs to one of the kind's primary sections (rows
    /// without a section always do).
    pub fn is_primary(&self, kind: MetricKind) -> bool {
        match &self.section {
            Some(section) => kind
                .primary_sections()
                .iter()
                .any(|p| p.eq_ignore_ascii_case(section)),
            None => true,
        }
    }

    /// The name this row's metric is stored under for the given kind. Rows in
    /// one of the kind's primary sections keep the bare metric name; rows from
    /// other sections are prefixed with the section (and group).
    pub fn metric_name(&self, kind: MetricKind) -> String {
        if self.is_primary(kind) {
            return self.metric.clone();
        }

        let section = self.section.as_deref().unwrap_or_default();
        match &self.group {
            Some(group) => format!("{} [{}]: {}", section, group, self.metric),
            None => format!("{}: {}", section, self.metric),
        }
    }
}

/// Reads every row of a key-value file.
pub fn read_key_value_rows(contents: &str) -> Result<Vec<KeyValueRow>, ParseError> {
    read_rows(contents)?
        .into_iter()
        .map(KeyValueRow::from_row)
        .collect()
}

//====================//
// Building a record //
//====================//

/// Builds the scalar metrics of a record from key-value rows.
///
/// Known metrics are coerced to the type their schema declares; unknown
/// metrics are kept verbatim, as text when they are not numeric.
pub fn to_record(kind: MetricKind, rows: &[KeyValueRow]) -> Result<ParsedRecord, ParseError> {
    let schema = kind.schema();
    let mut pending = PendingRecord::default();

    for row in rows {
        let name = row.metric_name(kind);
        let declared = if row.is_primary(kind) {
            schema
                .get(&row.metric)
                .map(|s| s.value_type)
                .unwrap_or(ValueType::Text)
        } else {
            ValueType::Text
        };

        let value = MetricValue::parse_as(&row.value, declared).map_err(|_| {
            ParseError::NotNumeric {
                line: row.line,
                column: name.clone(),
                value: row.value.clone(),
            }
        })?;

        let percentage = match &row.percentage {
            Some(raw) if !is_missing(raw) => {
                match MetricValue::parse_as(raw, ValueType::Percentage) {
                    Ok(p) => p,
                    Err(_) => {
                        return Err(ParseError::NotNumeric {
                            line: row.line,
                            column: format!("{}{}", name, PERCENTAGE_SUFFIX),
                            value: raw.clone(),
                        })
                    }
                }
            }
            _ => None,
        };

        // The name is claimed even when the value is missing, so that a second
        // row with the same name is still reported as a duplicate.
        insert(&mut pending, row.line, name.clone(), value)?;
        if let Some(p) = percentage {
            insert(
                &mut pending,
                row.line,
                format!("{}{}", name, PERCENTAGE_SUFFIX),
                Some(p),
            )?;
        }
    }

    Ok(ParsedRecord {
        metrics: pending
            .metrics
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect(),
        series: Vec::new(),
    })
}

// Metrics collected so far, including names whose value was missing.
#[derive(Default)]
struct PendingRecord {
    metrics: IndexMap<String, Option<MetricValue>>,
}

fn insert(
    record: &mut PendingRecord,
    line: usize,
    name: String,
    value: Option<MetricValue>,
) -> Result<(), ParseError> {
    match record.metrics.entry(name) {
        Entry::Occupied(e) => Err(ParseError::DuplicateMetric {
            line,
            name: e.key().clone(),
        }),
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: usize, fields: &[&str]) -> Row {
        Row {
            line,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_layouts() {
        let two = KeyValueRow::from_row(row(1, &["Ploidy estimation", "XX"])).unwrap();
        assert_eq!(two.section, None);
        assert_eq!(two.metric, "Ploidy estimation");

        let three = KeyValueRow::from_row(row(1, &["S", "m", "1"])).unwrap();
        assert_eq!(three.section.as_deref(), Some("S"));
        assert_eq!(three.group, None);
        assert_eq!(three.value, "1");

        let grouped = KeyValueRow::from_row(row(1, &["S", "RG1", "m", "1"])).unwrap();
        assert_eq!(grouped.group.as_deref(), Some("RG1"));
        assert_eq!(grouped.metric, "m");
        assert_eq!(grouped.percentage, None);

        let with_pct = KeyValueRow::from_row(row(1, &["S", "m", "10", "50.0"])).unwrap();
        assert_eq!(with_pct.group, None);
        assert_eq!(with_pct.metric, "m");
        assert_eq!(with_pct.value, "10");
        assert_eq!(with_pct.percentage.as_deref(), Some("50.0"));

        let full = KeyValueRow::from_row(row(1, &["S", "", "m", "10", "50.0"])).unwrap();
        assert_eq!(full.group, None);
        assert_eq!(full.percentage.as_deref(), Some("50.0"));
    }

    #[test]
    fn test_too_few_columns() {
        let err = KeyValueRow::from_row(row(4, &["lonely"])).unwrap_err();
        assert_eq!(
            err,
            ParseError::ColumnCount {
                line: 4,
                expected: "2 to 5",
                found: 1
            }
        );
    }

    #[test]
    fn test_metric_names_outside_the_primary_section() {
        let rows = read_key_value_rows(
            "MAPPING/ALIGNING SUMMARY,,Mapped reads,10,50.00\n\
             MAPPING/ALIGNING PER RG,RG1,Mapped reads,10,50.00\n\
             OTHER,Mapped reads,3\n",
        )
        .unwrap();

        let names: Vec<_> = rows
            .iter()
            .map(|r| r.metric_name(MetricKind::Mapping))
            .collect();
        assert_eq!(
            names,
            [
                "Mapped reads",
                "MAPPING/ALIGNING PER RG [RG1]: Mapped reads",
                "OTHER: Mapped reads",
            ]
        );
    }

    #[test]
    fn test_missing_value_still_claims_the_name() {
        let rows = read_key_value_rows(
            "MAPPING/ALIGNING SUMMARY,,Mapped reads,NA\n\
             MAPPING/ALIGNING SUMMARY,,Mapped reads,5\n",
        )
        .unwrap();

        let err = to_record(MetricKind::Mapping, &rows).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateMetric {
                line: 2,
                name: String::from("Mapped reads")
            }
        );
    }

    #[test]
    fn test_missing_percentage_is_skipped() {
        let rows =
            read_key_value_rows("MAPPING/ALIGNING SUMMARY,,Unmapped reads,0,NA\n").unwrap();
        let record = to_record(MetricKind::Mapping, &rows).unwrap();

        assert_eq!(record.get("Unmapped reads"), Some(&MetricValue::Integer(0)));
        assert!(record.get("Unmapped reads pct").is_none());
    }

    #[test]
    fn test_non_numeric_percentage() {
        let rows =
            read_key_value_rows("MAPPING/ALIGNING SUMMARY,,Unmapped reads,0,half\n").unwrap();
        let err = to_record(MetricKind::Mapping, &rows).unwrap_err();

        assert_eq!(
            err,
            ParseError::NotNumeric {
                line: 1,
                column: String::from("Unmapped reads pct"),
                value: String::from("half"),
            }
        );
    }
}
