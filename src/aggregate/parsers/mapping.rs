//! Parser for `*.mapping_metrics.csv`.
//!
//! ```text
//! MAPPING/ALIGNING SUMMARY,,Total input reads,2000000,100.00
//! MAPPING/ALIGNING SUMMARY,,Mapped reads,1990000,99.50
//! MAPPING/ALIGNING PER RG,RG1,Total reads in RG,2000000,100.00
//! ```
//!
//! Summary rows keep their bare metric names; per read group rows are stored
//! as `MAPPING/ALIGNING PER RG [<rg>]: <metric>`.

use super::key_value;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::ParsedRecord;

/// Parser for mapping metrics.
pub struct MappingParser;

impl KindParser for MappingParser {
    fn kind(&self) -> MetricKind {
        MetricKind::Mapping
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let rows = key_value::read_key_value_rows(contents)?;
        key_value::to_record(self.kind(), &rows)
    }
}
