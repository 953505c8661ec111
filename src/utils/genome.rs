//! Utilities related to the contigs of the human reference genome.
//!
//! DRAGEN reports per-contig values using whatever names the reference
//! provided: `chr1` for UCSC-style references and `1` for Ensembl/1000 Genomes
//! style references. These helpers classify a contig name regardless of the
//! naming convention used.

//====================//
// Types of sequences //
//====================//

/// A kind of sequence that can be included in a reference genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceKind {
    /// A canonical sequence containing non-sex-linked DNA (chromosomes 1-22).
    Autosome,

    /// One of the sex chromosomes (X or Y).
    SexChromosome,

    /// A sequence representing mitochondrial DNA.
    Mitochondrion,

    /// Everything else: alternative contigs, unplaced and unlocalized
    /// sequences, decoys, viral sequences, etc.
    Other,
}

impl SequenceKind {
    /// Whether or not this sequence is part of the primary chromosomes.
    pub fn is_primary_chromosome(&self) -> bool {
        !matches!(self, SequenceKind::Other)
    }
}

/// Number of autosomes in the human reference genome.
pub const NUM_AUTOSOMES: u8 = 22;

/// Classifies a contig name as reported by DRAGEN.
///
/// ```
/// use dragen_qc::utils::genome::{classify_contig, SequenceKind};
///
/// assert_eq!(classify_contig("chr1"), SequenceKind::Autosome);
/// assert_eq!(classify_contig("22"), SequenceKind::Autosome);
/// assert_eq!(classify_contig("chrX"), SequenceKind::SexChromosome);
/// assert_eq!(classify_contig("MT"), SequenceKind::Mitochondrion);
/// assert_eq!(classify_contig("chr1_KI270706v1_random"), SequenceKind::Other);
/// ```
pub fn classify_contig(name: &str) -> SequenceKind {
    let stripped = name
        .strip_prefix("chr")
        .or_else(|| name.strip_prefix("Chr"))
        .unwrap_or(name);

    match stripped {
        "X" | "Y" => SequenceKind::SexChromosome,
        "M" | "MT" => SequenceKind::Mitochondrion,
        s => match s.parse::<u8>() {
            Ok(n) if (1..=NUM_AUTOSOMES).contains(&n) && !s.starts_with('0') => {
                SequenceKind::Autosome
            }
            _ => SequenceKind::Other,
        },
    }
}

/// Shorthand for checking whether a contig is an autosome.
pub fn is_autosome(name: &str) -> bool {
    classify_contig(name) == SequenceKind::Autosome
}
