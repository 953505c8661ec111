//! Parser for `*.wgs_coverage_metrics_<normal|tumor>.csv`.

use super::key_value;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::ParsedRecord;

/// Parser for whole genome coverage summary metrics.
pub struct CoverageSummaryParser;

impl KindParser for CoverageSummaryParser {
    fn kind(&self) -> MetricKind {
        MetricKind::CoverageSummary
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let rows = key_value::read_key_value_rows(contents)?;
        key_value::to_record(self.kind(), &rows)
    }
}
