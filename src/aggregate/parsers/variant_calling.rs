//! Parser for `*.vc_metrics.csv`.
//!
//! The summary and post-filter sections provide the bare metric names; the
//! pre-filter section is kept under `VARIANT CALLER PREFILTER [<sample>]: ...`
//! so both sets of counts coexist.

use super::key_value;
use super::KindParser;
use crate::aggregate::errors::ParseError;
use crate::aggregate::kind::MetricKind;
use crate::aggregate::record::ParsedRecord;

/// Parser for variant calling metrics.
pub struct VariantCallingParser;

impl KindParser for VariantCallingParser {
    fn kind(&self) -> MetricKind {
        MetricKind::VariantCalling
    }

    fn parse(&self, contents: &str) -> Result<ParsedRecord, ParseError> {
        let rows = key_value::read_key_value_rows(contents)?;
        key_value::to_record(self.kind(), &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::value::MetricValue;

    const VC: &str = "\
VARIANT CALLER SUMMARY,,Number of samples,1
VARIANT CALLER SUMMARY,,Reads Processed,2000000
VARIANT CALLER PREFILTER,sampleA,Total,5100,100.00
VARIANT CALLER PREFILTER,sampleA,Ti/Tv ratio,2.01
VARIANT CALLER POSTFILTER,sampleA,Total,4900,100.00
VARIANT CALLER POSTFILTER,sampleA,SNPs,4000,81.63
VARIANT CALLER POSTFILTER,sampleA,Ti/Tv ratio,2.07
";

    #[test]
    fn test_prefilter_and_postfilter_coexist() {
        let record = VariantCallingParser.parse(VC).unwrap();

        assert_eq!(record.get("Total"), Some(&MetricValue::Integer(4900)));
        assert_eq!(
            record.get("VARIANT CALLER PREFILTER [sampleA]: Total"),
            Some(&MetricValue::Integer(5100))
        );
        assert_eq!(record.get("SNPs pct"), Some(&MetricValue::Percentage(81.63)));
        assert_eq!(record.get("Ti/Tv ratio"), Some(&MetricValue::Ratio(2.07)));
        assert_eq!(
            record.get("VARIANT CALLER PREFILTER [sampleA]: Ti/Tv ratio"),
            Some(&MetricValue::Float(2.01))
        );
        assert_eq!(record.get("Number of samples"), Some(&MetricValue::Integer(1)));
    }
}
