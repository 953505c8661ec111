//! The closed set of DRAGEN metric file kinds and their schemas.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::parsers::key_value::PERCENTAGE_SUFFIX;
use super::value::Unit;
use super::value::ValueType;
use super::value::ValueType::{Float, Integer, Percentage, Ratio, Text};

//==============//
// Metric kinds //
//==============//

/// A kind of metric file emitted by DRAGEN.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    /// `*.vc_metrics.csv`
    VariantCalling,

    /// `*.ploidy_estimation_metrics.csv`
    Ploidy,

    /// `*.wgs_fine_hist_<normal|tumor>.csv`
    CoverageHistogram,

    /// `*.wgs_coverage_metrics_<normal|tumor>.csv`
    CoverageSummary,

    /// `*.wgs_contig_mean_cov_<normal|tumor>.csv`
    CoveragePerContig,

    /// `*.mapping_metrics.csv`
    Mapping,

    /// `*.fragment_length_hist.csv`
    FragmentLength,

    /// `*.fastqc_metrics.csv`
    QualityProfile,
}

impl MetricKind {
    /// Every kind, in the order the aggregation engine processes them.
    pub const ALL: [MetricKind; 8] = [
        MetricKind::VariantCalling,
        MetricKind::Ploidy,
        MetricKind::CoverageHistogram,
        MetricKind::CoverageSummary,
        MetricKind::CoveragePerContig,
        MetricKind::Mapping,
        MetricKind::FragmentLength,
        MetricKind::QualityProfile,
    ];

    /// Human-readable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::VariantCalling => "Variant Calling",
            MetricKind::Ploidy => "Ploidy Estimation",
            MetricKind::CoverageHistogram => "Coverage Histogram",
            MetricKind::CoverageSummary => "Coverage Summary",
            MetricKind::CoveragePerContig => "Coverage per Contig",
            MetricKind::Mapping => "Mapping",
            MetricKind::FragmentLength => "Fragment Length",
            MetricKind::QualityProfile => "Quality Profile",
        }
    }

    /// The stem that identifies the kind within a file name, i.e. the part
    /// between the sample name and the optional qualifier.
    pub fn file_stem(&self) -> &'static str {
        match self {
            MetricKind::VariantCalling => "vc_metrics",
            MetricKind::Ploidy => "ploidy_estimation_metrics",
            MetricKind::CoverageHistogram => "wgs_fine_hist",
            MetricKind::CoverageSummary => "wgs_coverage_metrics",
            MetricKind::CoveragePerContig => "wgs_contig_mean_cov",
            MetricKind::Mapping => "mapping_metrics",
            MetricKind::FragmentLength => "fragment_length_hist",
            MetricKind::QualityProfile => "fastqc_metrics",
        }
    }

    /// A glob-like rendering of the file names this kind matches. Only used for
    /// display purposes; matching itself is done by the classifier.
    pub fn display_pattern(&self) -> String {
        format!("*.{}[_normal|_tumor].csv", self.file_stem())
    }

    /// The sections of a key-value file whose metrics keep their bare name.
    /// Metrics from any other section are prefixed with the section name.
    pub fn primary_sections(&self) -> &'static [&'static str] {
        match self {
            MetricKind::VariantCalling => &["VARIANT CALLER SUMMARY", "VARIANT CALLER POSTFILTER"],
            MetricKind::Ploidy => &["PLOIDY ESTIMATION"],
            MetricKind::CoverageSummary => &["COVERAGE SUMMARY"],
            MetricKind::Mapping => &["MAPPING/ALIGNING SUMMARY"],
            _ => &[],
        }
    }

    /// The schema of the kind.
    pub fn schema(&self) -> &'static Schema {
        match self {
            MetricKind::VariantCalling => &VARIANT_CALLING_SCHEMA,
            MetricKind::Ploidy => &PLOIDY_SCHEMA,
            MetricKind::CoverageHistogram => &COVERAGE_HISTOGRAM_SCHEMA,
            MetricKind::CoverageSummary => &COVERAGE_SUMMARY_SCHEMA,
            MetricKind::CoveragePerContig => &COVERAGE_PER_CONTIG_SCHEMA,
            MetricKind::Mapping => &MAPPING_SCHEMA,
            MetricKind::FragmentLength => &FRAGMENT_LENGTH_SCHEMA,
            MetricKind::QualityProfile => &QUALITY_PROFILE_SCHEMA,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    /// Accepts the human-readable name, the file stem or the variant name,
    /// ignoring case, spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .collect::<String>()
                .to_ascii_lowercase()
        };

        let wanted = normalize(s);
        MetricKind::ALL
            .into_iter()
            .find(|kind| {
                wanted == normalize(kind.name())
                    || wanted == normalize(kind.file_stem())
                    || wanted == normalize(&format!("{:?}", kind))
            })
            .ok_or_else(|| format!("unknown metric kind: {}", s))
    }
}

//=========//
// Schemas //
//=========//

/// A single entry of a kind's schema.
#[derive(Debug)]
pub struct MetricSpec {
    /// Metric name as written by DRAGEN.
    pub name: &'static str,

    /// Declared value type.
    pub value_type: ValueType,

    /// Display unit.
    pub unit: Unit,
}

/// The fixed, versioned schema of a metric kind.
#[derive(Debug)]
pub struct Schema {
    /// Version of the schema (DRAGEN output format it was written against).
    pub version: &'static str,

    /// Header row expected at the top of row-oriented files.
    pub header: Option<&'static [&'static str]>,

    /// Known metrics, in display order.
    pub metrics: &'static [MetricSpec],
}

impl Schema {
    /// Looks up a metric by name.
    pub fn get(&self, name: &str) -> Option<&'static MetricSpec> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// The display unit of a metric. Percentage companions (`<metric> pct`)
    /// are always percentages; metrics outside the schema have no unit.
    pub fn unit_of(&self, name: &str) -> Unit {
        if name.ends_with(PERCENTAGE_SUFFIX) {
            return Unit::Percent;
        }

        self.get(name).map(|m| m.unit).unwrap_or(Unit::None)
    }

    /// The position of a metric within the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m.name == name)
    }
}

const fn spec(name: &'static str, value_type: ValueType, unit: Unit) -> MetricSpec {
    MetricSpec {
        name,
        value_type,
        unit,
    }
}

static VARIANT_CALLING_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[
        spec("Number of samples", Integer, Unit::Count),
        spec("Reads Processed", Integer, Unit::Reads),
        spec("Total", Integer, Unit::Variants),
        spec("Biallelic", Integer, Unit::Variants),
        spec("Multiallelic", Integer, Unit::Variants),
        spec("SNPs", Integer, Unit::Variants),
        spec("Insertions (Hom)", Integer, Unit::Variants),
        spec("Insertions (Het)", Integer, Unit::Variants),
        spec("Deletions (Hom)", Integer, Unit::Variants),
        spec("Deletions (Het)", Integer, Unit::Variants),
        spec("Indels (Het)", Integer, Unit::Variants),
        spec("Chr X number of SNPs over genome", Integer, Unit::Variants),
        spec("Chr Y number of SNPs over genome", Integer, Unit::Variants),
        spec("(Chr X SNPs)/(chr Y SNPs) ratio over genome", Ratio, Unit::Ratio),
        spec("SNP Transitions", Integer, Unit::Variants),
        spec("SNP Transversions", Integer, Unit::Variants),
        spec("Ti/Tv ratio", Ratio, Unit::Ratio),
        spec("Heterozygous", Integer, Unit::Variants),
        spec("Homozygous", Integer, Unit::Variants),
        spec("Het/Hom ratio", Ratio, Unit::Ratio),
        spec("In dbSNP", Integer, Unit::Variants),
        spec("Not in dbSNP", Integer, Unit::Variants),
        spec("Percent Autosome Callability", Percentage, Unit::Percent),
    ],
};

static PLOIDY_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[
        spec("Autosomal median coverage", Float, Unit::Fold),
        spec("X median coverage", Float, Unit::Fold),
        spec("Y median coverage", Float, Unit::Fold),
        spec("X median / Autosomal median", Ratio, Unit::Ratio),
        spec("Y median / Autosomal median", Ratio, Unit::Ratio),
        spec("Ploidy estimation", Text, Unit::None),
    ],
};

static COVERAGE_HISTOGRAM_SCHEMA: Schema = Schema {
    version: "3.x",
    header: Some(&["Depth", "Overall"]),
    metrics: &[
        spec("Total", Integer, Unit::Bases),
        spec("Mean depth", Float, Unit::Fold),
        spec("Median depth", Integer, Unit::Fold),
    ],
};

static COVERAGE_SUMMARY_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[
        spec("Aligned bases", Integer, Unit::Bases),
        spec("Aligned bases in genome", Integer, Unit::Bases),
        spec("Average alignment coverage over genome", Float, Unit::Fold),
        spec("Uniformity of coverage (PCT > 0.2*mean) over genome", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [100x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [ 50x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [ 20x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [ 15x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [ 10x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [  3x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [  1x: inf)", Percentage, Unit::Percent),
        spec("PCT of genome with coverage [  0x: inf)", Percentage, Unit::Percent),
        spec("Average chr X coverage over genome", Float, Unit::Fold),
        spec("Average chr Y coverage over genome", Float, Unit::Fold),
        spec("Average mitochondrial coverage over genome", Float, Unit::Fold),
        spec("Average autosomal coverage over genome", Float, Unit::Fold),
        spec("Median autosomal coverage over genome", Float, Unit::Fold),
        spec("Mean/Median autosomal coverage ratio over genome", Ratio, Unit::Ratio),
        spec("Aligned reads", Integer, Unit::Reads),
        spec("Aligned reads in genome", Integer, Unit::Reads),
    ],
};

static COVERAGE_PER_CONTIG_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[],
};

static MAPPING_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[
        spec("Total input reads", Integer, Unit::Reads),
        spec("Number of duplicate marked reads", Integer, Unit::Reads),
        spec("Number of duplicate marked and mate reads removed", Integer, Unit::Reads),
        spec("Number of unique reads (excl. duplicate marked reads)", Integer, Unit::Reads),
        spec("Reads with mate sequenced", Integer, Unit::Reads),
        spec("Reads without mate sequenced", Integer, Unit::Reads),
        spec("QC-failed reads", Integer, Unit::Reads),
        spec("Mapped reads", Integer, Unit::Reads),
        spec("Mapped reads R1", Integer, Unit::Reads),
        spec("Mapped reads R2", Integer, Unit::Reads),
        spec("Number of unique & mapped reads (excl. duplicate marked reads)", Integer, Unit::Reads),
        spec("Unmapped reads", Integer, Unit::Reads),
        spec("Singleton reads (itself mapped; mate unmapped)", Integer, Unit::Reads),
        spec("Paired reads (itself & mate mapped)", Integer, Unit::Reads),
        spec("Properly paired reads", Integer, Unit::Reads),
        spec("Not properly paired reads (discordant)", Integer, Unit::Reads),
        spec("Paired reads mapped to different chromosomes", Integer, Unit::Reads),
        spec("Paired reads mapped to different chromosomes (MAPQ>=10)", Integer, Unit::Reads),
        spec("Reads with indel R1", Integer, Unit::Reads),
        spec("Reads with indel R2", Integer, Unit::Reads),
        spec("Total bases", Integer, Unit::Bases),
        spec("Total bases R1", Integer, Unit::Bases),
        spec("Total bases R2", Integer, Unit::Bases),
        spec("Mapped bases R1", Integer, Unit::Bases),
        spec("Mapped bases R2", Integer, Unit::Bases),
        spec("Soft-clipped bases R1", Integer, Unit::Bases),
        spec("Soft-clipped bases R2", Integer, Unit::Bases),
        spec("Mismatched bases R1", Integer, Unit::Bases),
        spec("Mismatched bases R2", Integer, Unit::Bases),
        spec("Q30 bases", Integer, Unit::Bases),
        spec("Q30 bases R1", Integer, Unit::Bases),
        spec("Q30 bases R2", Integer, Unit::Bases),
        spec("Total alignments", Integer, Unit::Count),
        spec("Secondary alignments", Integer, Unit::Count),
        spec("Supplementary (chimeric) alignments", Integer, Unit::Count),
        spec("Estimated read length", Float, Unit::BasePairs),
        spec("Average sequenced coverage over genome", Float, Unit::Fold),
        spec("Insert length: mean", Float, Unit::BasePairs),
        spec("Insert length: median", Float, Unit::BasePairs),
        spec("Insert length: standard deviation", Float, Unit::BasePairs),
        spec("Provided sex chromosome ploidy", Text, Unit::None),
        spec("DRAGEN mapping rate [mil. reads/second]", Float, Unit::None),
    ],
};

static FRAGMENT_LENGTH_SCHEMA: Schema = Schema {
    version: "3.x",
    header: Some(&["FragmentLength", "Count"]),
    metrics: &[
        spec("Total fragments", Integer, Unit::Count),
        spec("Mean fragment length", Float, Unit::BasePairs),
        spec("Median fragment length", Integer, Unit::BasePairs),
    ],
};

static QUALITY_PROFILE_SCHEMA: Schema = Schema {
    version: "3.x",
    header: None,
    metrics: &[],
};
