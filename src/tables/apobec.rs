//! APOBEC hypermutation signatures

use crate::error::FactsError;
use crate::gene::Strain;
use crate::mutation::{Mutation, MutationSet};
use crate::tables::load_mutation_list;

/// APOBEC signature mutations and the subset that are also DRMs
#[derive(Debug, Clone, Default)]
pub struct ApobecMutations {
    apobecs: MutationSet,
    apobec_drms: MutationSet,
}

impl ApobecMutations {
    /// Build from the `apobecs.json` and `apobec_drms.json` resources
    pub fn from_json(strain: Strain, apobecs: &str, apobec_drms: &str) -> Result<Self, FactsError> {
        Ok(Self {
            apobecs: load_mutation_list(strain, apobecs)?,
            apobec_drms: load_mutation_list(strain, apobec_drms)?,
        })
    }

    pub fn apobecs(&self) -> &MutationSet {
        &self.apobecs
    }

    pub fn apobec_drms(&self) -> &MutationSet {
        &self.apobec_drms
    }

    /// True when any AA of `mutation` is an APOBEC signature at its position
    pub fn is_apobec_mutation(&self, mutation: &Mutation) -> bool {
        self.apobecs.has_shared_aa(mutation)
    }

    /// True when any AA of `mutation` is an APOBEC-context DRM
    pub fn is_apobec_drm(&self, mutation: &Mutation) -> bool {
        self.apobec_drms.has_shared_aa(mutation)
    }

    /// Mutations of `set` carrying APOBEC signatures, split to single AAs
    pub fn apobec_mutations_of(&self, set: &MutationSet) -> Vec<Mutation> {
        set.filter_and_split_by(|m| self.is_apobec_mutation(m))
    }

    pub fn apobec_drms_of(&self, set: &MutationSet) -> Vec<Mutation> {
        set.filter_and_split_by(|m| self.is_apobec_drm(m))
    }
}
