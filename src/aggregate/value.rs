//! Typed metric values.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Values that DRAGEN writes when a metric could not be computed.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "na", "n/a"];

/// The type a metric is declared with in a kind's schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// A raw count.
    Integer,

    /// A non-integral measurement (e.g. a mean).
    Float,

    /// A value in the range `[0, 100]`, with or without the `%` sign.
    Percentage,

    /// A ratio of two quantities (e.g. Ti/Tv).
    Ratio,

    /// Anything, coerced permissively. Used for metrics such as the ploidy
    /// estimation which may be either numeric or textual.
    Text,
}

impl ValueType {
    /// Whether a value of this type must be numeric.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueType::Text)
    }
}

/// The unit a metric is displayed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// No particular unit.
    None,

    /// A number of reads.
    Reads,

    /// A number of bases.
    Bases,

    /// A length in base pairs.
    BasePairs,

    /// A fold coverage (`x`).
    Fold,

    /// A percentage.
    Percent,

    /// A ratio.
    Ratio,

    /// A number of variants.
    Variants,

    /// A plain count of something else.
    Count,
}

/// A single metric value. The distinction between a raw count and a derived
/// percentage is kept so that formatting rules can differ downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// A whole number.
    Integer(i64),

    /// A fractional number.
    Float(f64),

    /// A percentage (the `%` sign is stripped).
    Percentage(f64),

    /// A ratio.
    Ratio(f64),

    /// Anything that could not be coerced to a number.
    Text(String),
}

/// Returned when a value declared numeric holds something else.
#[derive(Debug, PartialEq, Eq)]
pub struct NotNumericError;

impl MetricValue {
    /// Parses a raw value permissively: values containing `%` become a
    /// [`Percentage`](MetricValue::Percentage), values without a fractional
    /// part become an [`Integer`](MetricValue::Integer), other numbers become a
    /// [`Float`](MetricValue::Float) and everything else is kept as
    /// [`Text`](MetricValue::Text).
    ///
    /// ```
    /// use dragen_qc::aggregate::value::MetricValue;
    ///
    /// assert_eq!(MetricValue::parse("42"), MetricValue::Integer(42));
    /// assert_eq!(MetricValue::parse("98.5%"), MetricValue::Percentage(98.5));
    /// assert_eq!(MetricValue::parse("2.1"), MetricValue::Float(2.1));
    /// assert_eq!(MetricValue::parse("XY"), MetricValue::Text(String::from("XY")));
    /// ```
    pub fn parse(raw: &str) -> MetricValue {
        let raw = raw.trim();

        if raw.contains('%') {
            let stripped = raw.replace('%', "");
            return match parse_finite(stripped.trim()) {
                Some(v) => MetricValue::Percentage(v),
                None => MetricValue::Text(raw.to_string()),
            };
        }

        if let Ok(i) = raw.parse::<i64>() {
            return MetricValue::Integer(i);
        }

        match parse_finite(raw) {
            Some(v) => MetricValue::Float(v),
            None => MetricValue::Text(raw.to_string()),
        }
    }

    /// Parses a raw value for a metric declared with the given type.
    ///
    /// Returns `Ok(None)` when the value is empty, or when it is one of
    /// DRAGEN's missing markers (`NA`) and the declared type is numeric. Any
    /// other non-numeric value for a numeric type is an error.
    pub fn parse_as(
        raw: &str,
        value_type: ValueType,
    ) -> Result<Option<MetricValue>, NotNumericError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let value = MetricValue::parse(raw);

        if !value_type.is_numeric() {
            return Ok(Some(value));
        }

        let number = match value.as_f64() {
            Some(n) => n,
            None if is_missing(raw) => return Ok(None),
            None => return Err(NotNumericError),
        };

        Ok(Some(match value_type {
            ValueType::Percentage => MetricValue::Percentage(number),
            ValueType::Ratio => MetricValue::Ratio(number),
            _ => value,
        }))
    }

    /// The numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(i) => Some(*i as f64),
            MetricValue::Float(v) | MetricValue::Percentage(v) | MetricValue::Ratio(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    /// Whether this value holds a number.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(i) => write!(f, "{}", i),
            MetricValue::Float(v) | MetricValue::Percentage(v) | MetricValue::Ratio(v) => {
                write!(f, "{}", v)
            }
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Whether a raw value is one of DRAGEN's missing markers.
pub fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_parsing() {
        assert_eq!(MetricValue::parse(" 100 "), MetricValue::Integer(100));
        assert_eq!(MetricValue::parse("-3"), MetricValue::Integer(-3));
        assert_eq!(MetricValue::parse("2.0"), MetricValue::Float(2.0));
        assert_eq!(MetricValue::parse("12.50 %"), MetricValue::Percentage(12.5));
        assert_eq!(MetricValue::parse("inf"), MetricValue::Text(String::from("inf")));
        assert_eq!(MetricValue::parse("NA"), MetricValue::Text(String::from("NA")));
        assert_eq!(MetricValue::parse("%"), MetricValue::Text(String::from("%")));
    }

    #[test]
    fn test_declared_types() {
        assert_eq!(
            MetricValue::parse_as("2.07", ValueType::Ratio),
            Ok(Some(MetricValue::Ratio(2.07)))
        );
        assert_eq!(
            MetricValue::parse_as("95", ValueType::Percentage),
            Ok(Some(MetricValue::Percentage(95.0)))
        );
        assert_eq!(
            MetricValue::parse_as("12", ValueType::Float),
            Ok(Some(MetricValue::Integer(12)))
        );
        assert_eq!(MetricValue::parse_as("NA", ValueType::Integer), Ok(None));
        assert_eq!(
            MetricValue::parse_as("lots", ValueType::Integer),
            Err(NotNumericError)
        );
        assert_eq!(
            MetricValue::parse_as("XX", ValueType::Text),
            Ok(Some(MetricValue::Text(String::from("XX"))))
        );
    }

    #[test]
    fn test_display_reproduces_numeric_values() {
        for raw in ["0", "1234567", "55.63", "0.001", "1e-7", "-2.5"] {
            let value = MetricValue::parse(raw);
            let reparsed = MetricValue::parse(&value.to_string());
            assert_eq!(value.as_f64(), reparsed.as_f64(), "{}", raw);
        }
    }
}
