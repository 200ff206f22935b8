//! Validation of deep-sequencing codon reads
//!
//! HIV-1 and HIV-2 share the depth, unusual-fraction and APOBEC rules but
//! report missing positions and stop codons differently.

use std::collections::BTreeSet;

use crate::gene::{Gene, GeneKind};
use crate::mutation::{Mutation, MutationSet};
use crate::position::GenePosition;
use crate::tables::ReferenceTables;
use crate::validation::input::{GeneSequenceReads, PositionCodonReads, SequenceReads};
use crate::validation::message::ValidationMessage;
use crate::validation::rules::{self, StopCodonLevels};
use crate::validation::{ValidationLevel, ValidationResult, Validator};

/// Fraction of positions with an unusual codon above which reads are suspect
const UNUSUAL_THRESHOLD: f64 = 0.01;
/// Positions with an APOBEC codon above which reads are suspect
const APOBEC_THRESHOLD: usize = 2;

const STOP_CODON_LEVELS: StopCodonLevels = StopCodonLevels {
    single: ValidationLevel::Warning,
    multiple: ValidationLevel::Warning,
};

/// True when a non-reference codon read at or above `cutoff` satisfies `pred`
fn has_codon_read<F>(
    gene_reads: &GeneSequenceReads,
    pcr: &PositionCodonReads,
    cutoff: f64,
    pred: F,
) -> bool
where
    F: Fn(&Mutation) -> bool,
{
    let reference = gene_reads.reference_aa(pcr.position);
    pcr.codon_reads_between(reference, true, cutoff, 1.0)
        .filter_map(|cr| Mutation::new(gene_reads.gene, pcr.position, [cr.aa]).ok())
        .any(|m| pred(&m))
}

fn validate_min_read_depth(reads: &SequenceReads, include: &[GeneKind]) -> Vec<ValidationResult> {
    let coverage = reads.coverage(include);
    let trimmed = coverage.iter().filter(|c| c.is_trimmed).count();
    if trimmed == 0 {
        return Vec::new();
    }
    vec![ValidationResult::new(
        ValidationLevel::Warning,
        ValidationMessage::NgsMinReadDepthTooLow {
            min_read_depth: reads.min_read_depth,
            positions: trimmed,
            percent: trimmed as f64 / coverage.len() as f64 * 100.0,
        },
    )]
}

fn validate_unusual_fraction(
    reads: &SequenceReads,
    include: &[GeneKind],
    tables: &ReferenceTables,
) -> Vec<ValidationResult> {
    let cutoff = reads.min_prevalence;
    let mut unusual = 0usize;
    let mut positions = 0usize;
    for gene_reads in reads.included_genes(include) {
        unusual += gene_reads
            .positions
            .iter()
            .filter(|pcr| has_codon_read(gene_reads, pcr, cutoff, |m| tables.is_unusual(m)))
            .count();
        positions += gene_reads.positions.len();
    }
    if positions == 0 || (unusual as f64 / positions as f64) <= UNUSUAL_THRESHOLD {
        return Vec::new();
    }
    vec![ValidationResult::new(
        ValidationLevel::SevereWarning,
        ValidationMessage::NgsTooManyUnusualMutations { cutoff },
    )]
}

fn validate_apobec(
    reads: &SequenceReads,
    include: &[GeneKind],
    tables: &ReferenceTables,
) -> Vec<ValidationResult> {
    let cutoff = reads.min_prevalence;
    let mut apobecs = 0usize;
    let mut apobec_drms = MutationSet::new();
    for gene_reads in reads.included_genes(include) {
        apobecs += gene_reads
            .positions
            .iter()
            .filter(|pcr| {
                has_codon_read(gene_reads, pcr, cutoff, |m| tables.is_apobec_mutation(m))
            })
            .count();
        apobec_drms.extend(tables.apobecs.apobec_drms_of(&gene_reads.mutations));
    }
    if apobecs <= APOBEC_THRESHOLD {
        return Vec::new();
    }
    let mut drms: Vec<Mutation> = apobec_drms.iter().cloned().collect();
    let message = match drms.len() {
        0 => ValidationMessage::NgsTooManyApobecMutationsNoApobecDrm { cutoff },
        1 => match drms.pop() {
            Some(mutation) => {
                ValidationMessage::NgsTooManyApobecMutationsOneApobecDrm { cutoff, mutation }
            }
            None => ValidationMessage::NgsTooManyApobecMutationsNoApobecDrm { cutoff },
        },
        _ => ValidationMessage::NgsTooManyApobecMutationsMultipleApobecDrms {
            cutoff,
            mutations: drms,
        },
    };
    vec![ValidationResult::new(ValidationLevel::Warning, message)]
}

/// Genes of the coverage list, in order
fn covered_genes(reads: &SequenceReads, include: &[GeneKind]) -> Vec<Gene> {
    let mut genes: Vec<Gene> = reads
        .coverage(include)
        .iter()
        .map(|c| c.position.gene())
        .collect();
    genes.dedup();
    genes
}

/// Quality rules for HIV-1 codon reads
#[derive(Debug, Clone)]
pub struct Hiv1ReadsValidator {
    tables: ReferenceTables,
}

impl Hiv1ReadsValidator {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }
}

impl Validator for Hiv1ReadsValidator {
    type Input = SequenceReads;

    fn validate(&self, reads: &SequenceReads, include: &[GeneKind]) -> Vec<ValidationResult> {
        let empty = rules::validate_not_empty(&reads.available_genes(), include);
        if !empty.is_empty() {
            return empty;
        }

        let mut results = rules::validate_too_low_threshold(reads.min_prevalence);
        results.extend(rules::validate_missing_gene_positions(
            &covered_genes(reads, include),
            include,
            &self.tables,
            |gene| reads.gene_reads(gene).map(|r| r.unsequenced_regions()),
        ));
        results.extend(validate_min_read_depth(reads, include));
        results.extend(rules::validate_stop_codons(
            &reads.mutations(),
            include,
            STOP_CODON_LEVELS,
        ));
        results.extend(validate_unusual_fraction(reads, include, &self.tables));
        results.extend(validate_apobec(reads, include, &self.tables));
        results
    }
}

/// Quality rules for HIV-2 codon reads
#[derive(Debug, Clone)]
pub struct Hiv2ReadsValidator {
    tables: ReferenceTables,
}

impl Hiv2ReadsValidator {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    /// Positions without reads between the first and last covered position
    fn validate_missing_positions(
        &self,
        reads: &SequenceReads,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        let coverage = reads.coverage(include);
        let (Some(first), Some(last)) = (coverage.first(), coverage.last()) else {
            return Vec::new();
        };
        let (start, end) = (first.position, last.position);
        let needed = match GenePosition::positions_between_in(&start, &end, include) {
            Ok(needed) => needed,
            Err(e) => {
                log::warn!("Cannot compute expected positions: {}", e);
                return Vec::new();
            }
        };
        let needed_drps: Vec<&GenePosition> = needed
            .iter()
            .filter(|gp| self.tables.is_drug_resistance_position(gp))
            .collect();
        let available: BTreeSet<GenePosition> = coverage.iter().map(|c| c.position).collect();

        let missing = needed.iter().filter(|gp| !available.contains(gp)).count();
        let missing_drps = needed_drps
            .iter()
            .filter(|gp| !available.contains(gp))
            .count();

        let mut results = Vec::new();
        if missing > 0 {
            results.push(ValidationResult::new(
                ValidationLevel::Warning,
                ValidationMessage::PositionsMissing {
                    count: missing,
                    percent: missing as f64 / needed.len() as f64 * 100.0,
                    start,
                    end,
                },
            ));
        }
        if missing_drps > 0 {
            results.push(ValidationResult::new(
                ValidationLevel::Warning,
                ValidationMessage::DrpPositionsMissing {
                    count: missing_drps,
                    percent: missing_drps as f64 / needed_drps.len() as f64 * 100.0,
                    total: needed_drps.len(),
                    start,
                    end,
                },
            ));
        }
        results
    }

    /// Stop codons of every gene in one message
    fn validate_stop_codons(
        &self,
        reads: &SequenceReads,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        let mutations: Vec<Mutation> = reads
            .mutations()
            .iter()
            .filter(|m| m.is_stop_codon() && rules::is_included(include, m))
            .cloned()
            .collect();
        if mutations.is_empty() {
            return Vec::new();
        }
        vec![ValidationResult::new(
            ValidationLevel::Warning,
            ValidationMessage::StopCodons { mutations },
        )]
    }
}

impl Validator for Hiv2ReadsValidator {
    type Input = SequenceReads;

    fn validate(&self, reads: &SequenceReads, include: &[GeneKind]) -> Vec<ValidationResult> {
        if reads.included_genes(include).all(|g| g.positions.is_empty()) {
            return vec![ValidationResult::new(
                ValidationLevel::Critical,
                ValidationMessage::NoKnownGeneFound,
            )];
        }

        let mut results = rules::validate_too_low_threshold(reads.min_prevalence);
        results.extend(self.validate_missing_positions(reads, include));
        results.extend(validate_min_read_depth(reads, include));
        results.extend(self.validate_stop_codons(reads, include));
        results.extend(validate_unusual_fraction(reads, include, &self.tables));
        results.extend(validate_apobec(reads, include, &self.tables));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::Strain;
    use crate::mutation::{parse_mutation_set, AminoAcid};
    use crate::tables::registry::names;
    use crate::tables::{MemorySource, TableRegistry, TableSource};
    use crate::validation::input::CodonReads;

    fn tables(strain: Strain) -> ReferenceTables {
        let hiv1 = MemorySource::with_test_data();
        let copy = |name: fn(Strain) -> String| {
            hiv1.read(&name(Strain::Hiv1)).unwrap_or_default()
        };
        let source = hiv1
            .clone()
            .with(names::apobecs(strain), copy(names::apobecs))
            .with(names::apobec_drms(strain), copy(names::apobec_drms))
            .with(names::drms(strain), copy(names::drms))
            .with(names::sdrms(strain), copy(names::sdrms));
        TableRegistry::new(source)
            .reference_tables(strain, "all", "All")
            .unwrap()
    }

    fn codon(aa: AminoAcid, reads: u64) -> CodonReads {
        CodonReads {
            codon: "NNN".to_string(),
            aa,
            reads,
        }
    }

    fn reference(gene: Gene, pos: u32) -> AminoAcid {
        AminoAcid::from_char(gene.reference_at(pos).unwrap()).unwrap()
    }

    /// Reads at `positions` with 2000 reference reads, plus `extra` codons
    fn gene_reads(
        gene: Gene,
        positions: impl IntoIterator<Item = u32>,
        extra: &[(u32, AminoAcid, u64)],
    ) -> GeneSequenceReads {
        let pcrs = positions
            .into_iter()
            .map(|pos| {
                let mut codons = vec![codon(reference(gene, pos), 2000)];
                codons.extend(
                    extra
                        .iter()
                        .filter(|(p, _, _)| *p == pos)
                        .map(|(_, aa, n)| codon(*aa, *n)),
                );
                PositionCodonReads::new(pos, codons)
            })
            .collect();
        GeneSequenceReads::new(gene, pcrs)
    }

    fn rt(strain: Strain) -> Gene {
        Gene::new(strain, GeneKind::RT)
    }

    fn hiv1(reads: SequenceReads) -> Vec<ValidationResult> {
        Hiv1ReadsValidator::new(tables(Strain::Hiv1)).validate(&reads, &[GeneKind::RT])
    }

    fn full_rt(extra: &[(u32, AminoAcid, u64)]) -> SequenceReads {
        let gene = rt(Strain::Hiv1);
        SequenceReads::new(Strain::Hiv1, vec![gene_reads(gene, 1..=560, extra)])
    }

    #[test]
    fn test_clean_reads() {
        assert!(hiv1(full_rt(&[])).is_empty());
    }

    #[test]
    fn test_empty_reads() {
        let results = hiv1(SequenceReads::new(Strain::Hiv1, vec![]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Critical);
    }

    #[test]
    fn test_too_low_threshold() {
        let results = hiv1(full_rt(&[]).with_min_prevalence(0.001));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, ValidationMessage::NgsTooLowThreshold);
    }

    #[test]
    fn test_missing_positions() {
        let gene = rt(Strain::Hiv1);
        let reads = SequenceReads::new(Strain::Hiv1, vec![gene_reads(gene, 1..=240, &[])]);
        let results = hiv1(reads);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].text(),
            "320 positions were not sequenced or aligned: RT 241-560."
        );
    }

    #[test]
    fn test_min_read_depth() {
        let results = hiv1(full_rt(&[]).with_min_read_depth(3000));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Warning);
        assert!(matches!(
            results[0].message,
            ValidationMessage::NgsMinReadDepthTooLow { positions: 560, .. }
        ));
        assert!(results[0].text().contains("560 (100.0%) positions in your sequence have"));
    }

    #[test]
    fn test_stop_codons() {
        let gene = rt(Strain::Hiv1);
        let reads = SequenceReads::new(
            Strain::Hiv1,
            vec![gene_reads(gene, 1..=560, &[])
                .with_mutations(parse_mutation_set(Some("RT:300* RT:301*"), None).unwrap())],
        );
        let results = hiv1(reads);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Warning);
        assert!(matches!(results[0].message, ValidationMessage::MultipleStopCodons { .. }));
    }

    #[test]
    fn test_unusual_fraction() {
        let few: Vec<(u32, AminoAcid, u64)> =
            (100..105).map(|p| (p, AminoAcid::Trp, 100)).collect();
        assert!(hiv1(full_rt(&few)).is_empty());

        let many: Vec<(u32, AminoAcid, u64)> =
            (100..111).map(|p| (p, AminoAcid::Trp, 100)).collect();
        let results = hiv1(full_rt(&many));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::SevereWarning);
        assert!(results[0].text().starts_with("At this threshold (1.0%), >= 1.0% of positions"));

        // below the prevalence cutoff
        let rare: Vec<(u32, AminoAcid, u64)> =
            (100..111).map(|p| (p, AminoAcid::Trp, 10)).collect();
        assert!(hiv1(full_rt(&rare)).is_empty());
    }

    #[test]
    fn test_apobec() {
        let apobecs = [
            (42, AminoAcid::Lys, 100),
            (28, AminoAcid::Lys, 100),
            (44, AminoAcid::Lys, 100),
        ];
        let results = hiv1(full_rt(&apobecs[..2]));
        assert!(results.is_empty());

        let results = hiv1(full_rt(&apobecs));
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].message,
            ValidationMessage::NgsTooManyApobecMutationsNoApobecDrm { .. }
        ));

        let gene = rt(Strain::Hiv1);
        let reads = SequenceReads::new(
            Strain::Hiv1,
            vec![gene_reads(gene, 1..=560, &apobecs)
                .with_mutations(parse_mutation_set(Some("RT:M184I"), None).unwrap())],
        );
        let results = hiv1(reads);
        assert_eq!(results.len(), 1);
        assert!(results[0].text().contains("(RT_M184I)"));
    }

    #[test]
    fn test_hiv2_missing_positions() {
        let strain = Strain::Hiv2a;
        let gene = rt(strain);
        let positions = (1..=gene.length()).filter(|p| !(200..210).contains(p));
        let reads = SequenceReads::new(strain, vec![gene_reads(gene, positions, &[])]);
        let results = Hiv2ReadsValidator::new(tables(strain)).validate(&reads, &GeneKind::ALL);
        assert_eq!(results.len(), 1);
        assert!(results[0]
            .text()
            .starts_with("10 (1.8%) positions are missing between"));

        let positions = (1..=gene.length()).filter(|p| *p != 184);
        let reads = SequenceReads::new(strain, vec![gene_reads(gene, positions, &[])]);
        let results = Hiv2ReadsValidator::new(tables(strain)).validate(&reads, &GeneKind::ALL);
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[1].message,
            ValidationMessage::DrpPositionsMissing { count: 1, total: 5, .. }
        ));
    }

    #[test]
    fn test_hiv2_empty_and_stop_codons() {
        let strain = Strain::Hiv2b;
        let validator = Hiv2ReadsValidator::new(tables(strain));
        let results = validator.validate(&SequenceReads::new(strain, vec![]), &GeneKind::ALL);
        assert_eq!(results[0].message, ValidationMessage::NoKnownGeneFound);

        let gene = rt(strain);
        let stop = Mutation::new(gene, 300, [AminoAcid::Ter]).unwrap();
        let reads = SequenceReads::new(
            strain,
            vec![gene_reads(gene, 1..=gene.length(), &[])
                .with_mutations(std::iter::once(stop).collect())],
        );
        let results = validator.validate(&reads, &GeneKind::ALL);
        assert_eq!(results.len(), 1);
        assert!(results[0].text().starts_with("There is one stop codon: HIV2BRT_"));
    }
}
