//! Immutable reference tables
//!
//! Tables are parsed from JSON resources once and shared behind [`Arc`]s.
//! [`TableRegistry`] resolves resource names through a [`TableSource`] and
//! memoizes each parsed table; [`ReferenceTables`] bundles the tables one
//! strain/treatment/subtype needs and answers the classification
//! predicates.
//!
//! All lookups are infallible: a missing entry is a negative answer.

pub mod aapcnt;
pub mod apobec;
pub mod codonpcnt;
pub mod drm;
pub mod registry;

use std::sync::Arc;

use serde::Deserialize;

pub use aapcnt::{AminoAcidPercent, AminoAcidPercents};
pub use apobec::ApobecMutations;
pub use codonpcnt::{CodonPercent, CodonPercents};
pub use drm::DrugResistanceMutations;
pub use registry::{DirectorySource, MemorySource, TableRegistry, TableSource};

use crate::error::FactsError;
use crate::gene::{Gene, GeneKind, Strain};
use crate::mutation::{normalize_aas, Mutation, MutationSet};
use crate::position::GenePosition;

/// Resolve a table `gene` field: an abstract name in `strain`, or a full name
pub(crate) fn resolve_gene(strain: Strain, text: &str) -> Option<Gene> {
    match GeneKind::from_abbr(text) {
        Some(kind) => Some(strain.gene(kind)),
        None => text.parse::<Gene>().ok(),
    }
}

/// `{gene, position, aas}` record shared by the APOBEC and DRM resources
#[derive(Debug, Deserialize)]
pub(crate) struct MutationRecord {
    gene: String,
    position: u32,
    #[serde(alias = "aa")]
    aas: String,
}

pub(crate) fn mutations_from_records(strain: Strain, records: Vec<MutationRecord>) -> MutationSet {
    let mut set = MutationSet::new();
    for rec in records {
        let Some(gene) = resolve_gene(strain, &rec.gene) else {
            log::warn!("Skipping mutation record with unknown gene '{}'", rec.gene);
            continue;
        };
        // inserted residues after `_` are not part of the key
        let aas = if rec.aas.contains('_') { "_" } else { rec.aas.as_str() };
        let Some(aas) = normalize_aas(aas) else {
            log::warn!(
                "Skipping mutation record with invalid AAs '{}' at {}{}",
                rec.aas,
                gene,
                rec.position
            );
            continue;
        };
        match Mutation::new(gene, rec.position, aas) {
            Ok(m) => set.insert(m),
            Err(e) => log::warn!("Skipping mutation record: {}", e),
        }
    }
    set
}

pub(crate) fn load_mutation_list(strain: Strain, json: &str) -> Result<MutationSet, FactsError> {
    let records: Vec<MutationRecord> = serde_json::from_str(json)?;
    Ok(mutations_from_records(strain, records))
}

/// The tables needed to classify mutations of one strain, treatment and subtype
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub strain: Strain,
    pub aa_percents: Arc<AminoAcidPercents>,
    pub codon_percents: Arc<CodonPercents>,
    pub apobecs: Arc<ApobecMutations>,
    pub drms: Arc<DrugResistanceMutations>,
    pub sdrms: Arc<DrugResistanceMutations>,
}

impl ReferenceTables {
    pub fn is_unusual(&self, mutation: &Mutation) -> bool {
        self.aa_percents.is_unusual(mutation)
    }

    pub fn is_apobec_mutation(&self, mutation: &Mutation) -> bool {
        self.apobecs.is_apobec_mutation(mutation)
    }

    pub fn is_apobec_drm(&self, mutation: &Mutation) -> bool {
        self.apobecs.is_apobec_drm(mutation)
    }

    pub fn is_drm(&self, mutation: &Mutation) -> bool {
        self.drms.contains(mutation)
    }

    pub fn is_sdrm(&self, mutation: &Mutation) -> bool {
        self.sdrms.contains(mutation)
    }

    /// True when the mutation sits at a position listed in the DRM table
    pub fn is_at_drug_resistance_position(&self, mutation: &Mutation) -> bool {
        self.is_drug_resistance_position(&mutation.gene_position())
    }

    pub fn is_drug_resistance_position(&self, position: &GenePosition) -> bool {
        self.drms.is_listed_position(position)
    }
}
