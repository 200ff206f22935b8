//! Validation of bare mutation lists

use crate::gene::GeneKind;
use crate::mutation::MutationSet;
use crate::tables::ReferenceTables;
use crate::validation::rules::{self, ApobecTiers, StopCodonLevels};
use crate::validation::{ValidationLevel, ValidationResult, Validator};

const STOP_CODON_LEVELS: StopCodonLevels = StopCodonLevels {
    single: ValidationLevel::Warning,
    multiple: ValidationLevel::SevereWarning,
};

const APOBEC_TIERS: ApobecTiers = ApobecTiers {
    single_at: 1,
    warning_above: 1,
    severe_above: 3,
};

/// Stop codons, APOBEC signatures and unusual mutations of a mutation list
#[derive(Debug, Clone)]
pub struct MutationsValidator {
    tables: ReferenceTables,
}

impl MutationsValidator {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }
}

impl Validator for MutationsValidator {
    type Input = MutationSet;

    fn validate(&self, mutations: &MutationSet, include: &[GeneKind]) -> Vec<ValidationResult> {
        let mut results = rules::validate_stop_codons(mutations, include, STOP_CODON_LEVELS);
        results.extend(rules::validate_apobec(
            mutations,
            include,
            &self.tables,
            APOBEC_TIERS,
        ));
        results.extend(rules::validate_unusual_for_mutations(
            mutations,
            include,
            &self.tables,
        ));
        results
    }
}
