//! Parser for `*.ploidy_estimation_metrics.csv`.

use super::key_value;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::ParsedRecord;

/// Parser for ploidy estimation metrics.
pub struct PloidyParser;

impl KindParser for PloidyParser {
    fn kind(&self) -> MetricKind {
        MetricKind::Ploidy
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let rows = key_value::read_key_value_rows(contents)?;
        key_value::to_record(self.kind(), &rows)
    }
}
