//! Strains, genes and their reference sequences
//!
//! Every gene is the pair of a [`Strain`] and an abstract [`GeneKind`]. All
//! per-gene facts (reference sequence, length, genome offset, alignment
//! adjustments, drug classes) are resolved by exhaustive matches over that
//! pair, so the set of genes is closed and known at compile time.
//!
//! # Example
//!
//! ```
//! use hivfacts::{Gene, GeneKind, Strain};
//!
//! let rt = Gene::new(Strain::Hiv1, GeneKind::RT);
//! assert_eq!(rt.length(), 560);
//! assert_eq!(rt.reference_at(41).unwrap(), 'M');
//! assert_eq!(rt.to_string(), "HIV1RT");
//! ```

mod reference;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alignment::{self, AlignmentAdjustment, SequenceMode};
use crate::drug::DrugClass;
use crate::error::FactsError;
use crate::position::GenePosition;

/// Virus strain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strain {
    #[serde(rename = "HIV1")]
    Hiv1,
    #[serde(rename = "HIV2A")]
    Hiv2a,
    #[serde(rename = "HIV2B")]
    Hiv2b,
}

impl Strain {
    /// All strains in declaration order
    pub const ALL: [Strain; 3] = [Strain::Hiv1, Strain::Hiv2a, Strain::Hiv2b];

    pub fn name(&self) -> &'static str {
        match self {
            Strain::Hiv1 => "HIV1",
            Strain::Hiv2a => "HIV2A",
            Strain::Hiv2b => "HIV2B",
        }
    }

    /// Human-readable strain name
    pub fn display_text(&self) -> &'static str {
        match self {
            Strain::Hiv1 => "HIV-1",
            Strain::Hiv2a => "HIV-2 Group A",
            Strain::Hiv2b => "HIV-2 Group B",
        }
    }

    /// Profile name used by the nucleotide aligner for this strain
    pub fn aligner_profile(&self) -> &'static str {
        match self {
            Strain::Hiv1 => "hiv1b",
            Strain::Hiv2a => "hiv2a",
            Strain::Hiv2b => "hiv2b",
        }
    }

    /// Lower-case suffix used in resource names (e.g. `drms_hiv1.json`)
    ///
    /// Both HIV-2 groups read the same `_hiv2` resources.
    pub fn resource_suffix(&self) -> &'static str {
        match self {
            Strain::Hiv1 => "hiv1",
            Strain::Hiv2a | Strain::Hiv2b => "hiv2",
        }
    }

    /// Genes of this strain in declaration order (PR, RT, IN)
    pub fn genes(&self) -> [Gene; 3] {
        GeneKind::ALL.map(|kind| Gene::new(*self, kind))
    }

    pub fn gene(&self, kind: GeneKind) -> Gene {
        Gene::new(*self, kind)
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strain {
    type Err = FactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strain::ALL
            .into_iter()
            .find(|strain| strain.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FactsError::unknown_name("strain", s))
    }
}

/// Abstract gene, independent of strain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeneKind {
    PR,
    RT,
    IN,
}

impl GeneKind {
    pub const ALL: [GeneKind; 3] = [GeneKind::PR, GeneKind::RT, GeneKind::IN];

    pub fn name(&self) -> &'static str {
        match self {
            GeneKind::PR => "PR",
            GeneKind::RT => "RT",
            GeneKind::IN => "IN",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            GeneKind::PR => "Protease",
            GeneKind::RT => "Reverse Transcriptase",
            GeneKind::IN => "Integrase",
        }
    }

    /// Case-insensitive lookup of a two-letter gene abbreviation
    pub fn from_abbr(s: &str) -> Option<Self> {
        GeneKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
    }

    /// Position of the first nucleotide of this gene in the genome
    pub fn first_na(&self) -> u32 {
        match self {
            GeneKind::PR => 2253,
            GeneKind::RT => 2550,
            GeneKind::IN => 4230,
        }
    }
}

impl fmt::Display for GeneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const NO_ADJUSTMENTS: &[AlignmentAdjustment] = &[];
const HIV2_RT_ADJUSTMENTS: &[AlignmentAdjustment] = &[AlignmentAdjustment::new(345, 1)];
const HIV2_IN_ADJUSTMENTS: &[AlignmentAdjustment] = &[
    AlignmentAdjustment::new(-272, 2),
    AlignmentAdjustment::new(-283, 1),
    AlignmentAdjustment::new(-288, 0),
];

/// A gene of a specific strain
///
/// Ordered by strain first, then by gene kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gene {
    strain: Strain,
    kind: GeneKind,
}

impl Gene {
    pub const fn new(strain: Strain, kind: GeneKind) -> Self {
        Self { strain, kind }
    }

    pub fn strain(&self) -> Strain {
        self.strain
    }

    pub fn kind(&self) -> GeneKind {
        self.kind
    }

    /// Full gene name, e.g. `HIV1RT`
    pub fn name(&self) -> &'static str {
        match (self.strain, self.kind) {
            (Strain::Hiv1, GeneKind::PR) => "HIV1PR",
            (Strain::Hiv1, GeneKind::RT) => "HIV1RT",
            (Strain::Hiv1, GeneKind::IN) => "HIV1IN",
            (Strain::Hiv2a, GeneKind::PR) => "HIV2APR",
            (Strain::Hiv2a, GeneKind::RT) => "HIV2ART",
            (Strain::Hiv2a, GeneKind::IN) => "HIV2AIN",
            (Strain::Hiv2b, GeneKind::PR) => "HIV2BPR",
            (Strain::Hiv2b, GeneKind::RT) => "HIV2BRT",
            (Strain::Hiv2b, GeneKind::IN) => "HIV2BIN",
        }
    }

    /// Abstract gene name, e.g. `RT`
    pub fn abstract_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Consensus amino-acid sequence of this gene
    pub fn reference(&self) -> &'static str {
        match (self.strain, self.kind) {
            (Strain::Hiv1, GeneKind::PR) => reference::HIV1_PR,
            (Strain::Hiv1, GeneKind::RT) => reference::HIV1_RT,
            (Strain::Hiv1, GeneKind::IN) => reference::HIV1_IN,
            (Strain::Hiv2a, GeneKind::PR) => reference::HIV2A_PR,
            (Strain::Hiv2a, GeneKind::RT) => reference::HIV2A_RT,
            (Strain::Hiv2a, GeneKind::IN) => reference::HIV2A_IN,
            (Strain::Hiv2b, GeneKind::PR) => reference::HIV2B_PR,
            (Strain::Hiv2b, GeneKind::RT) => reference::HIV2B_RT,
            (Strain::Hiv2b, GeneKind::IN) => reference::HIV2B_IN,
        }
    }

    /// Length in amino acids
    pub fn length(&self) -> u32 {
        self.reference().len() as u32
    }

    /// Length in nucleotides
    pub fn na_length(&self) -> u32 {
        self.length() * 3
    }

    pub fn first_na(&self) -> u32 {
        self.kind.first_na()
    }

    /// Operations that re-express this gene in HIV-1 numbering
    pub fn adjustments(&self) -> &'static [AlignmentAdjustment] {
        match (self.strain, self.kind) {
            (Strain::Hiv1, _) | (_, GeneKind::PR) => NO_ADJUSTMENTS,
            (_, GeneKind::RT) => HIV2_RT_ADJUSTMENTS,
            (_, GeneKind::IN) => HIV2_IN_ADJUSTMENTS,
        }
    }

    /// Drug classes that target this gene
    pub fn drug_classes(&self) -> &'static [DrugClass] {
        match (self.strain, self.kind) {
            (_, GeneKind::PR) => &[DrugClass::PI],
            (Strain::Hiv1, GeneKind::RT) => &[DrugClass::NRTI, DrugClass::NNRTI],
            (_, GeneKind::RT) => &[DrugClass::NRTI],
            (_, GeneKind::IN) => &[DrugClass::INSTI],
        }
    }

    /// Rank of this gene over all strains (strain-major)
    pub fn ordinal(&self) -> usize {
        self.strain as usize * GeneKind::ALL.len() + self.kind as usize
    }

    fn check_position(&self, pos: u32) -> Result<(), FactsError> {
        if pos == 0 || pos > self.length() {
            return Err(FactsError::out_of_range(
                format!("{} position", self.name()),
                i64::from(pos),
                1,
                i64::from(self.length()),
            ));
        }
        Ok(())
    }

    /// Reference amino acid at a 1-indexed position
    pub fn reference_at(&self, pos: u32) -> Result<char, FactsError> {
        self.check_position(pos)?;
        let idx = (pos - 1) as usize;
        Ok(self.reference().as_bytes()[idx] as char)
    }

    /// `len` reference amino acids starting at a 1-indexed position
    pub fn reference_slice(&self, pos: u32, len: u32) -> Result<&'static str, FactsError> {
        self.check_position(pos)?;
        let end = u64::from(pos) + u64::from(len) - 1;
        if len > 0 && end > u64::from(self.length()) {
            return Err(FactsError::out_of_range(
                format!("{} slice end", self.name()),
                end as i64,
                1,
                i64::from(self.length()),
            ));
        }
        let start = (pos - 1) as usize;
        Ok(&self.reference()[start..start + len as usize])
    }

    /// Validated [`GenePosition`] in this gene
    pub fn position(&self, pos: u32) -> Result<GenePosition, FactsError> {
        self.check_position(pos)?;
        Ok(GenePosition::new(*self, pos))
    }

    /// Positions `start..=end` of this gene, clamped to `[1, length]`
    pub fn positions_between(&self, start: u32, end: u32) -> Vec<GenePosition> {
        let start = start.max(1);
        let end = end.min(self.length());
        (start..=end).map(|pos| GenePosition::new(*self, pos)).collect()
    }

    /// Pad an aligned amino-acid window and express it in HIV-1 numbering
    pub fn adjust_aa_alignment(
        &self,
        aligned: &str,
        first_aa: u32,
        last_aa: u32,
    ) -> Result<String, FactsError> {
        alignment::adjust_alignment(self, aligned, first_aa, last_aa, SequenceMode::AminoAcid)
    }

    /// Pad an aligned nucleotide window and express it in HIV-1 numbering
    ///
    /// `first_aa` and `last_aa` are codon positions.
    pub fn adjust_na_alignment(
        &self,
        aligned: &str,
        first_aa: u32,
        last_aa: u32,
    ) -> Result<String, FactsError> {
        alignment::adjust_alignment(self, aligned, first_aa, last_aa, SequenceMode::Nucleotide)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gene {
    type Err = FactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strain::ALL
            .iter()
            .flat_map(|strain| strain.genes())
            .find(|gene| gene.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FactsError::unknown_name("gene", s))
    }
}
