//! Validation of aligned sequences

use crate::gene::GeneKind;
use crate::mutation::Mutation;
use crate::tables::ReferenceTables;
use crate::validation::input::{AlignedGeneSequence, AlignedSequence};
use crate::validation::message::{SequenceEnd, ValidationMessage};
use crate::validation::rules::{self, ApobecTiers, StopCodonLevels};
use crate::validation::{ValidationLevel, ValidationResult, Validator};

const STOP_CODON_LEVELS: StopCodonLevels = StopCodonLevels {
    single: ValidationLevel::Note,
    multiple: ValidationLevel::SevereWarning,
};

const APOBEC_TIERS: ApobecTiers = ApobecTiers {
    single_at: 2,
    warning_above: 2,
    severe_above: 4,
};

/// Running indel count above which a gap is too long
const MAX_GAP_INDELS: u32 = 10;
/// Inserted nucleotides above which a single insertion is too long
const MAX_INSERTED_NAS: usize = 30;

/// Quality rules for one aligned sequence
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    tables: ReferenceTables,
}

impl SequenceValidator {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    fn validate_reverse_complement(&self, sequence: &AlignedSequence) -> Vec<ValidationResult> {
        if sequence.reverse_complement {
            vec![ValidationResult::new(
                ValidationLevel::Warning,
                ValidationMessage::ReverseComplement,
            )]
        } else {
            Vec::new()
        }
    }

    fn validate_missing_positions(
        &self,
        sequence: &AlignedSequence,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        rules::validate_missing_gene_positions(
            &sequence.available_genes(),
            include,
            &self.tables,
            |gene| sequence.gene_sequence(gene).map(|g| g.unsequenced_regions()),
        )
    }

    fn validate_trimming(
        &self,
        sequence: &AlignedSequence,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        for gene_seq in sequence.included_genes(include) {
            let (left, right) = gene_seq.trimmed;
            for (count, end) in [(left, SequenceEnd::FivePrime), (right, SequenceEnd::ThreePrime)] {
                if count > 0 {
                    results.push(ValidationResult::new(
                        ValidationLevel::Warning,
                        ValidationMessage::SequenceTrimmed {
                            gene: gene_seq.gene.kind(),
                            count,
                            end,
                        },
                    ));
                }
            }
        }
        results
    }

    /// Runs of consecutive indels longer than ten codons
    ///
    /// Deletions add one, insertions add their inserted codons and any
    /// other mutation resets the count.
    fn validate_long_gap(
        &self,
        sequence: &AlignedSequence,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        let mut total_indels: u32 = 0;
        for gene_seq in sequence.included_genes(include) {
            for mutation in gene_seq.mutations.iter() {
                if mutation.inserted_nas().len() > MAX_INSERTED_NAS {
                    return vec![gap_too_long()];
                }
                if mutation.is_deletion() {
                    total_indels += 1;
                } else if mutation.is_insertion() {
                    total_indels += (mutation.inserted_nas().len() / 3) as u32;
                } else {
                    total_indels = 0;
                }
                if total_indels > MAX_GAP_INDELS {
                    return vec![gap_too_long()];
                }
            }
        }
        Vec::new()
    }

    fn validate_invalid_nas(&self, sequence: &AlignedSequence) -> Vec<ValidationResult> {
        if sequence.removed_invalid_chars.is_empty() {
            return Vec::new();
        }
        vec![ValidationResult::new(
            ValidationLevel::Note,
            ValidationMessage::InvalidNasRemoved {
                chars: sequence.removed_invalid_chars.clone(),
            },
        )]
    }

    fn validate_indels(
        &self,
        sequence: &AlignedSequence,
        include: &[GeneKind],
    ) -> Vec<ValidationResult> {
        sequence
            .included_genes(include)
            .filter_map(|gene_seq| self.validate_gene_indels(gene_seq))
            .collect()
    }

    fn validate_gene_indels(&self, gene_seq: &AlignedGeneSequence) -> Option<ValidationResult> {
        let gene = gene_seq.gene.kind();
        let frameshifts = gene_seq.frameshifts.clone();
        let indels: Vec<Mutation> = gene_seq
            .insertions()
            .iter()
            .chain(gene_seq.deletions().iter())
            .filter(|m| self.tables.is_unusual(m))
            .cloned()
            .collect();
        let count = frameshifts.len() + indels.len();

        let (level, message) = match count {
            0 => return None,
            1 => match frameshifts.into_iter().next() {
                Some(frameshift) => (
                    ValidationLevel::Warning,
                    ValidationMessage::SingleFrameshift { gene, frameshift },
                ),
                None => (
                    ValidationLevel::Warning,
                    ValidationMessage::SingleUnusualIndel { gene, indels },
                ),
            },
            _ if !frameshifts.is_empty() && !indels.is_empty() => (
                ValidationLevel::SevereWarning,
                ValidationMessage::MultipleUnusualIndelsAndFrameshifts {
                    gene,
                    count,
                    indels,
                    frameshifts,
                },
            ),
            _ if indels.is_empty() => (
                ValidationLevel::SevereWarning,
                ValidationMessage::MultipleFrameShifts {
                    gene,
                    count,
                    frameshifts,
                },
            ),
            _ => (
                ValidationLevel::SevereWarning,
                ValidationMessage::MultipleUnusualIndels {
                    gene,
                    count,
                    indels,
                },
            ),
        };
        Some(ValidationResult::new(level, message))
    }
}

fn gap_too_long() -> ValidationResult {
    ValidationResult::new(ValidationLevel::Critical, ValidationMessage::FastaGapTooLong)
}

impl Validator for SequenceValidator {
    type Input = AlignedSequence;

    fn validate(&self, sequence: &AlignedSequence, include: &[GeneKind]) -> Vec<ValidationResult> {
        let empty = rules::validate_not_empty(&sequence.available_genes(), include);
        if !empty.is_empty() {
            return empty;
        }

        let mutations = sequence.mutations();
        let mut results = self.validate_reverse_complement(sequence);
        results.extend(self.validate_missing_positions(sequence, include));
        results.extend(self.validate_trimming(sequence, include));
        results.extend(self.validate_long_gap(sequence, include));
        results.extend(self.validate_invalid_nas(sequence));
        results.extend(self.validate_indels(sequence, include));
        results.extend(rules::validate_apobec(
            &mutations,
            include,
            &self.tables,
            APOBEC_TIERS,
        ));
        results.extend(rules::validate_stop_codons(
            &mutations,
            include,
            STOP_CODON_LEVELS,
        ));
        results.extend(rules::validate_unusual_for_sequence(
            &mutations,
            include,
            &self.tables,
        ));
        log::debug!(
            "Validated {} sequence: {} results",
            sequence.strain,
            results.len()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{Gene, Strain};
    use crate::mutation::{parse_mutation_set, MutationSet};
    use crate::position::GeneRegion;
    use crate::tables::{MemorySource, TableRegistry};
    use crate::validation::input::FrameShift;

    fn validator() -> SequenceValidator {
        let registry = TableRegistry::new(MemorySource::with_test_data());
        SequenceValidator::new(registry.reference_tables(Strain::Hiv1, "all", "All").unwrap())
    }

    fn gene(kind: GeneKind) -> Gene {
        Gene::new(Strain::Hiv1, kind)
    }

    fn full(kind: GeneKind) -> AlignedGeneSequence {
        let g = gene(kind);
        AlignedGeneSequence::new(g, 1, g.length())
    }

    fn mutations(text: &str) -> MutationSet {
        parse_mutation_set(Some(text), None).unwrap()
    }

    fn validate(genes: Vec<AlignedGeneSequence>) -> Vec<ValidationResult> {
        let sequence = AlignedSequence::new(Strain::Hiv1, genes);
        validator().validate(&sequence, &GeneKind::ALL)
    }

    #[test]
    fn test_clean_sequence() {
        let results = validate(vec![full(GeneKind::PR), full(GeneKind::RT), full(GeneKind::IN)]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_no_gene_found() {
        let sequence = AlignedSequence::new(Strain::Hiv1, vec![full(GeneKind::RT)])
            .with_reverse_complement(true);
        let results = validator().validate(&sequence, &[GeneKind::PR, GeneKind::IN]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Critical);
        assert_eq!(
            results[0].text(),
            "There were no PR and IN genes found, refuse to process."
        );
    }

    #[test]
    fn test_reverse_complement_and_invalid_nas() {
        let sequence = AlignedSequence::new(Strain::Hiv1, vec![full(GeneKind::RT)])
            .with_reverse_complement(true)
            .with_removed_invalid_chars("@!");
        let results = validator().validate(&sequence, &[GeneKind::RT]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].message, ValidationMessage::ReverseComplement);
        assert_eq!(results[1].level, ValidationLevel::Note);
        assert!(results[1].text().contains("\"@!\""));
    }

    #[test]
    fn test_missing_positions() {
        let rt = gene(GeneKind::RT);
        let results = validate(vec![AlignedGeneSequence::new(rt, 1, 240)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Warning);
        assert_eq!(
            results[0].text(),
            "320 positions were not sequenced or aligned: RT 241-560."
        );

        let results = validate(vec![AlignedGeneSequence::new(rt, 50, 560)]);
        assert!(matches!(
            results[0].message,
            ValidationMessage::MultiplePositionsMissingWithSingleDrp { .. }
        ));
    }

    #[test]
    fn test_missing_whole_gene_between() {
        let results = validate(vec![full(GeneKind::PR), full(GeneKind::IN)]);
        assert_eq!(results.len(), 1);
        match &results[0].message {
            ValidationMessage::MultiplePositionsMissingWithMultipleDrps {
                positions, drps, ..
            } => {
                assert_eq!(*positions, 560);
                assert_eq!(*drps, 5);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(results[0].level, ValidationLevel::Warning);
    }

    #[test]
    fn test_internal_gap_is_missing() {
        let rt = gene(GeneKind::RT);
        let seq = full(GeneKind::RT).with_gaps(vec![GeneRegion::new(rt, 300, 300)]);
        let results = validate(vec![seq]);
        assert!(matches!(
            results[0].message,
            ValidationMessage::SinglePositionMissingWithoutDrp { .. }
        ));
        assert_eq!(results[0].level, ValidationLevel::Note);
    }

    #[test]
    fn test_trimmed() {
        let results = validate(vec![full(GeneKind::RT).with_trimmed(3, 0)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Warning);
        assert!(matches!(
            results[0].message,
            ValidationMessage::SequenceTrimmed {
                count: 3,
                end: SequenceEnd::FivePrime,
                ..
            }
        ));
    }

    #[test]
    fn test_long_gap() {
        let deletions: Vec<String> = (300..312).map(|p| format!("RT:{}-", p)).collect();
        let seq = full(GeneKind::RT).with_mutations(mutations(&deletions.join(" ")));
        let results = validate(vec![seq]);
        assert!(results
            .iter()
            .any(|r| r.level == ValidationLevel::Critical
                && r.message == ValidationMessage::FastaGapTooLong));

        let deletions: Vec<String> = (300..310).map(|p| format!("RT:{}-", p)).collect();
        let seq = full(GeneKind::RT).with_mutations(mutations(&deletions.join(" ")));
        let results = validate(vec![seq]);
        assert!(!results
            .iter()
            .any(|r| r.message == ValidationMessage::FastaGapTooLong));
    }

    #[test]
    fn test_frameshifts() {
        let rt = gene(GeneKind::RT);
        let seq = full(GeneKind::RT).with_frameshifts(vec![FrameShift::insertion(rt, 186, "A")]);
        let results = validate(vec![seq]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), "The RT gene has a frameshift: RT186ins1bp_A.");

        let seq = full(GeneKind::RT).with_frameshifts(vec![
            FrameShift::insertion(rt, 186, "A"),
            FrameShift::deletion(rt, 200, 2),
        ]);
        let results = validate(vec![seq]);
        assert_eq!(results[0].level, ValidationLevel::SevereWarning);
        assert!(matches!(
            results[0].message,
            ValidationMessage::MultipleFrameShifts { count: 2, .. }
        ));
    }

    #[test]
    fn test_unusual_indels() {
        let rt = gene(GeneKind::RT);
        let seq = full(GeneKind::RT)
            .with_mutations(mutations("RT:105-"))
            .with_frameshifts(vec![FrameShift::deletion(rt, 200, 1)]);
        let results = validate(vec![seq]);
        assert_eq!(results[0].level, ValidationLevel::SevereWarning);
        assert!(matches!(
            results[0].message,
            ValidationMessage::MultipleUnusualIndelsAndFrameshifts { count: 2, .. }
        ));

        // RT 300 is not tabled, so the deletion is not unusual
        let seq = full(GeneKind::RT).with_mutations(mutations("RT:300-"));
        assert!(validate(vec![seq]).is_empty());
    }

    #[test]
    fn test_apobec_and_stop_codon_levels() {
        let seq = full(GeneKind::RT).with_mutations(mutations("RT:42K RT:300*"));
        let results = validate(vec![seq]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Note);
        assert!(matches!(results[0].message, ValidationMessage::SingleStopCodon { .. }));

        let seq = full(GeneKind::RT).with_mutations(mutations("RT:42K RT:28K"));
        let results = validate(vec![seq]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Note);
        assert!(matches!(results[0].message, ValidationMessage::SingleApobec { .. }));

        let seq = full(GeneKind::RT).with_mutations(mutations("RT:42K RT:28K RT:44K RT:56K RT:60K"));
        assert_eq!(validate(vec![seq])[0].level, ValidationLevel::SevereWarning);
    }

    #[test]
    fn test_unusual_tiers() {
        let seq = full(GeneKind::RT).with_mutations(mutations("RT:100W RT:101W"));
        assert!(validate(vec![seq]).is_empty());

        let seq = full(GeneKind::RT).with_mutations(mutations("RT:100W RT:101W RT:102W"));
        let results = validate(vec![seq]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ValidationLevel::Note);

        let seq = full(GeneKind::RT).with_mutations(mutations(
            "RT:41W RT:65W RT:100W RT:101W RT:102W RT:104W RT:105W RT:106W RT:107W",
        ));
        let results = validate(vec![seq]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].level, ValidationLevel::SevereWarning);
        assert_eq!(results[1].level, ValidationLevel::Warning);
        assert!(matches!(
            results[1].message,
            ValidationMessage::MultipleUnusualMutationsAtDrp { .. }
        ));
    }
}
