//! Aligner output consumed by the validators
//!
//! The nucleotide aligner itself lives outside this crate. These types
//! carry just what the rules inspect: per-gene coverage, mutations,
//! frameshifts and read counts.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gene::{Gene, GeneKind, Strain};
use crate::mutation::{AminoAcid, MutationSet};
use crate::position::{GenePosition, GeneRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameShiftKind {
    Insertion,
    Deletion,
}

/// A run of nucleotides that is not a multiple of three
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameShift {
    pub gene: Gene,
    pub position: u32,
    pub kind: FrameShiftKind,
    /// Number of nucleotides inserted or deleted
    pub size: u32,
    #[serde(default)]
    pub nas: String,
}

impl FrameShift {
    pub fn insertion(gene: Gene, position: u32, nas: impl Into<String>) -> Self {
        let nas = nas.into();
        Self {
            gene,
            position,
            kind: FrameShiftKind::Insertion,
            size: nas.len() as u32,
            nas,
        }
    }

    pub fn deletion(gene: Gene, position: u32, size: u32) -> Self {
        Self {
            gene,
            position,
            kind: FrameShiftKind::Deletion,
            size,
            nas: String::new(),
        }
    }
}

/// `RT186ins1bp_A` or `RT186del2bp`
impl fmt::Display for FrameShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gene = self.gene.abstract_name();
        match self.kind {
            FrameShiftKind::Insertion => {
                write!(f, "{}{}ins{}bp", gene, self.position, self.size)?;
                if !self.nas.is_empty() {
                    write!(f, "_{}", self.nas)?;
                }
                Ok(())
            }
            FrameShiftKind::Deletion => write!(f, "{}{}del{}bp", gene, self.position, self.size),
        }
    }
}

/// Gaps between covered spans of a gene, including both ends
fn uncovered_regions(gene: Gene, covered: &BTreeSet<u32>) -> Vec<GeneRegion> {
    let missing: Vec<GenePosition> = (1..=gene.length())
        .filter(|pos| !covered.contains(pos))
        .map(|pos| GenePosition::new(gene, pos))
        .collect();
    GeneRegion::from_positions(&missing)
}

/// One gene of an aligned sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedGeneSequence {
    pub gene: Gene,
    pub first_aa: u32,
    pub last_aa: u32,
    /// Internal runs that were not sequenced (e.g. stretches of `N`)
    #[serde(default)]
    pub gaps: Vec<GeneRegion>,
    /// Codons trimmed for poor quality at the 5′ and 3′ ends
    #[serde(default)]
    pub trimmed: (u32, u32),
    #[serde(default)]
    pub mutations: MutationSet,
    #[serde(default)]
    pub frameshifts: Vec<FrameShift>,
}

impl AlignedGeneSequence {
    pub fn new(gene: Gene, first_aa: u32, last_aa: u32) -> Self {
        Self {
            gene,
            first_aa,
            last_aa,
            gaps: Vec::new(),
            trimmed: (0, 0),
            mutations: MutationSet::new(),
            frameshifts: Vec::new(),
        }
    }

    pub fn with_mutations(mut self, mutations: MutationSet) -> Self {
        self.mutations = mutations;
        self
    }

    pub fn with_gaps(mut self, gaps: Vec<GeneRegion>) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn with_trimmed(mut self, left: u32, right: u32) -> Self {
        self.trimmed = (left, right);
        self
    }

    pub fn with_frameshifts(mut self, frameshifts: Vec<FrameShift>) -> Self {
        self.frameshifts = frameshifts;
        self
    }

    /// Number of aligned codons
    pub fn size(&self) -> u32 {
        (self.last_aa + 1).saturating_sub(self.first_aa)
    }

    /// Regions outside `[first_aa, last_aa]` plus internal gaps
    pub fn unsequenced_regions(&self) -> Vec<GeneRegion> {
        let covered: BTreeSet<u32> = (self.first_aa.max(1)..=self.last_aa.min(self.gene.length()))
            .filter(|pos| !self.gaps.iter().any(|r| r.start() <= *pos && *pos <= r.end()))
            .collect();
        uncovered_regions(self.gene, &covered)
    }

    pub fn insertions(&self) -> MutationSet {
        self.mutations.filter_by(|m| m.is_insertion())
    }

    pub fn deletions(&self) -> MutationSet {
        self.mutations.filter_by(|m| m.is_deletion())
    }
}

/// A sequence aligned against the genes of one strain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSequence {
    pub strain: Strain,
    /// Aligned genes in gene order
    pub genes: Vec<AlignedGeneSequence>,
    #[serde(default)]
    pub reverse_complement: bool,
    /// Characters dropped from the input before alignment
    #[serde(default)]
    pub removed_invalid_chars: String,
}

impl AlignedSequence {
    pub fn new(strain: Strain, mut genes: Vec<AlignedGeneSequence>) -> Self {
        genes.sort_by_key(|g| g.gene);
        Self {
            strain,
            genes,
            reverse_complement: false,
            removed_invalid_chars: String::new(),
        }
    }

    pub fn with_reverse_complement(mut self, reverse_complement: bool) -> Self {
        self.reverse_complement = reverse_complement;
        self
    }

    pub fn with_removed_invalid_chars(mut self, chars: impl Into<String>) -> Self {
        self.removed_invalid_chars = chars.into();
        self
    }

    pub fn available_genes(&self) -> Vec<Gene> {
        self.genes.iter().map(|g| g.gene).collect()
    }

    pub fn gene_sequence(&self, gene: Gene) -> Option<&AlignedGeneSequence> {
        self.genes.iter().find(|g| g.gene == gene)
    }

    /// Aligned genes whose kind is in `include`
    pub fn included_genes<'a>(
        &'a self,
        include: &'a [GeneKind],
    ) -> impl Iterator<Item = &'a AlignedGeneSequence> {
        self.genes.iter().filter(|g| include.contains(&g.gene.kind()))
    }

    /// Mutations of every gene
    pub fn mutations(&self) -> MutationSet {
        self.genes
            .iter()
            .fold(MutationSet::new(), |acc, g| acc.merge_with(&g.mutations))
    }
}

/// Reads supporting one codon at one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodonReads {
    pub codon: String,
    /// Translation of the codon
    pub aa: AminoAcid,
    pub reads: u64,
}

/// All codon reads at one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCodonReads {
    pub position: u32,
    pub total_reads: u64,
    pub codon_reads: Vec<CodonReads>,
}

impl PositionCodonReads {
    pub fn new(position: u32, codon_reads: Vec<CodonReads>) -> Self {
        let total_reads = codon_reads.iter().map(|cr| cr.reads).sum();
        Self {
            position,
            total_reads,
            codon_reads,
        }
    }

    pub fn proportion(&self, reads: &CodonReads) -> f64 {
        if self.total_reads == 0 {
            0.0
        } else {
            reads.reads as f64 / self.total_reads as f64
        }
    }

    /// Codon reads with a proportion in `[min, max]`
    ///
    /// With `mutation_only`, reads translating to `reference` are skipped.
    pub fn codon_reads_between(
        &self,
        reference: Option<AminoAcid>,
        mutation_only: bool,
        min: f64,
        max: f64,
    ) -> impl Iterator<Item = &CodonReads> {
        self.codon_reads.iter().filter(move |cr| {
            let prop = self.proportion(cr);
            prop >= min && prop <= max && !(mutation_only && Some(cr.aa) == reference)
        })
    }
}

/// Codon read counts of one gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSequenceReads {
    pub gene: Gene,
    pub positions: Vec<PositionCodonReads>,
    /// Mutations called at the prevalence cutoff
    #[serde(default)]
    pub mutations: MutationSet,
}

impl GeneSequenceReads {
    pub fn new(gene: Gene, mut positions: Vec<PositionCodonReads>) -> Self {
        positions.sort_by_key(|p| p.position);
        Self {
            gene,
            positions,
            mutations: MutationSet::new(),
        }
    }

    pub fn with_mutations(mut self, mutations: MutationSet) -> Self {
        self.mutations = mutations;
        self
    }

    /// Positions without any reads
    pub fn unsequenced_regions(&self) -> Vec<GeneRegion> {
        let covered: BTreeSet<u32> = self
            .positions
            .iter()
            .filter(|p| p.total_reads > 0)
            .map(|p| p.position)
            .collect();
        uncovered_regions(self.gene, &covered)
    }

    pub fn reference_aa(&self, pos: u32) -> Option<AminoAcid> {
        self.gene
            .reference_at(pos)
            .ok()
            .and_then(AminoAcid::from_char)
    }
}

/// Depth at one covered position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadsCoverage {
    pub position: GenePosition,
    pub total_reads: u64,
    /// True when the depth is below the minimum read depth
    pub is_trimmed: bool,
}

/// Deep-sequencing reads of one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceReads {
    pub strain: Strain,
    pub genes: Vec<GeneSequenceReads>,
    /// Minimal proportion for a codon to count as present
    pub min_prevalence: f64,
    pub min_read_depth: u64,
}

impl SequenceReads {
    pub fn new(strain: Strain, mut genes: Vec<GeneSequenceReads>) -> Self {
        genes.sort_by_key(|g| g.gene);
        Self {
            strain,
            genes,
            min_prevalence: 0.01,
            min_read_depth: 1000,
        }
    }

    pub fn with_min_prevalence(mut self, min_prevalence: f64) -> Self {
        self.min_prevalence = min_prevalence;
        self
    }

    pub fn with_min_read_depth(mut self, min_read_depth: u64) -> Self {
        self.min_read_depth = min_read_depth;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genes.iter().all(|g| g.positions.is_empty())
    }

    /// Genes with any position reads
    pub fn available_genes(&self) -> Vec<Gene> {
        self.genes
            .iter()
            .filter(|g| !g.positions.is_empty())
            .map(|g| g.gene)
            .collect()
    }

    pub fn gene_reads(&self, gene: Gene) -> Option<&GeneSequenceReads> {
        self.genes.iter().find(|g| g.gene == gene)
    }

    pub fn included_genes<'a>(
        &'a self,
        include: &'a [GeneKind],
    ) -> impl Iterator<Item = &'a GeneSequenceReads> {
        self.genes.iter().filter(|g| include.contains(&g.gene.kind()))
    }

    /// Coverage of every position of the included genes, in order
    pub fn coverage(&self, include: &[GeneKind]) -> Vec<ReadsCoverage> {
        self.included_genes(include)
            .flat_map(|g| {
                g.positions.iter().map(move |p| ReadsCoverage {
                    position: GenePosition::new(g.gene, p.position),
                    total_reads: p.total_reads,
                    is_trimmed: p.total_reads < self.min_read_depth,
                })
            })
            .collect()
    }

    /// Mutations of every gene
    pub fn mutations(&self) -> MutationSet {
        self.genes
            .iter()
            .fold(MutationSet::new(), |acc, g| acc.merge_with(&g.mutations))
    }
}
