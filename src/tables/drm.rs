//! Drug-resistance mutation lists
//!
//! The same shape serves both the DRM list and the surveillance DRM list:
//! a map from drug class to the mutations that confer resistance to it.

use std::collections::{BTreeMap, BTreeSet};

use crate::drug::DrugClass;
use crate::error::FactsError;
use crate::gene::{Gene, Strain};
use crate::mutation::{AminoAcid, Mutation, MutationSet};
use crate::position::GenePosition;
use crate::tables::{mutations_from_records, MutationRecord};

#[derive(Debug, Clone, Default)]
pub struct DrugResistanceMutations {
    by_class: BTreeMap<DrugClass, MutationSet>,
    all: MutationSet,
}

impl DrugResistanceMutations {
    /// Parse a `drms_*.json` or `sdrms_*.json` resource
    pub fn from_json(strain: Strain, json: &str) -> Result<Self, FactsError> {
        let raw: BTreeMap<String, Vec<MutationRecord>> = serde_json::from_str(json)?;
        let mut by_class = BTreeMap::new();
        let mut all = MutationSet::new();
        for (class_name, records) in raw {
            let class = match class_name.parse::<DrugClass>() {
                Ok(class) => class,
                Err(_) => {
                    log::warn!("Skipping mutations of unknown drug class '{}'", class_name);
                    continue;
                }
            };
            let set = mutations_from_records(strain, records);
            all = all.merge_with(&set);
            by_class.insert(class, set);
        }
        Ok(Self { by_class, all })
    }

    /// Every listed mutation regardless of drug class
    pub fn all(&self) -> &MutationSet {
        &self.all
    }

    pub fn for_class(&self, class: DrugClass) -> Option<&MutationSet> {
        self.by_class.get(&class)
    }

    pub fn drug_classes(&self) -> impl Iterator<Item = DrugClass> + '_ {
        self.by_class.keys().copied()
    }

    /// True when any AA of `mutation` is listed at its position
    ///
    /// An insertion is matched on the insertion itself only.
    pub fn contains(&self, mutation: &Mutation) -> bool {
        let Some(listed) = self.all.get(&mutation.gene_position()) else {
            return false;
        };
        if mutation.is_insertion() {
            return listed.contains(AminoAcid::Ins);
        }
        mutation.aas().iter().any(|aa| listed.contains(*aa))
    }

    pub fn contains_for_class(&self, class: DrugClass, mutation: &Mutation) -> bool {
        self.for_class(class)
            .and_then(|set| set.get(&mutation.gene_position()))
            .is_some_and(|listed| listed.overlaps(mutation))
    }

    /// True when the position carries any listed mutation
    pub fn is_listed_position(&self, position: &GenePosition) -> bool {
        self.all.contains_position(position)
    }

    /// Listed positions of one gene
    pub fn positions_of(&self, gene: Gene) -> BTreeSet<GenePosition> {
        self.all
            .positions()
            .filter(|gp| gp.gene() == gene)
            .copied()
            .collect()
    }

    /// Every listed position
    pub fn positions(&self) -> BTreeSet<GenePosition> {
        self.all.positions().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::GeneKind;

    const FIXTURE: &str = r#"{
        "NRTI": [
            {"gene": "RT", "position": 65, "aa": "R"},
            {"gene": "RT", "position": 69, "aa": "_"},
            {"gene": "RT", "position": 184, "aas": "IV"}
        ],
        "NNRTI": [{"gene": "RT", "position": 103, "aa": "N"}],
        "PI": [{"gene": "PR", "position": 90, "aa": "M"}],
        "INI": [{"gene": "IN", "position": 148, "aas": "HKR"}],
        "FI": [{"gene": "RT", "position": 1, "aa": "A"}]
    }"#;

    fn gene(kind: GeneKind) -> Gene {
        Gene::new(Strain::Hiv1, kind)
    }

    fn table() -> DrugResistanceMutations {
        DrugResistanceMutations::from_json(Strain::Hiv1, FIXTURE).unwrap()
    }

    #[test]
    fn test_load_by_class() {
        let t = table();
        assert_eq!(t.drug_classes().count(), 4);
        assert_eq!(t.for_class(DrugClass::NRTI).map(|s| s.len()), Some(3));
        assert_eq!(t.for_class(DrugClass::INSTI).map(|s| s.len()), Some(1));
        assert_eq!(t.all().len(), 6);
    }

    #[test]
    fn test_contains() {
        let t = table();
        let rt = gene(GeneKind::RT);
        assert!(t.contains(&Mutation::from_aas_text(rt, 184, "V").unwrap()));
        assert!(t.contains(&Mutation::from_aas_text(rt, 184, "IL").unwrap()));
        assert!(!t.contains(&Mutation::from_aas_text(rt, 184, "L").unwrap()));
        assert!(!t.contains(&Mutation::from_aas_text(rt, 41, "L").unwrap()));
        let ins = Mutation::from_aas_text(rt, 69, "_").unwrap().with_inserted_aas("SS");
        assert!(t.contains(&ins));
        assert!(t.contains_for_class(
            DrugClass::NNRTI,
            &Mutation::from_aas_text(rt, 103, "N").unwrap()
        ));
        assert!(!t.contains_for_class(
            DrugClass::NRTI,
            &Mutation::from_aas_text(rt, 103, "N").unwrap()
        ));
    }

    #[test]
    fn test_positions() {
        let t = table();
        assert!(t.is_listed_position(&GenePosition::new(gene(GeneKind::PR), 90)));
        assert!(!t.is_listed_position(&GenePosition::new(gene(GeneKind::PR), 91)));
        assert_eq!(t.positions_of(gene(GeneKind::RT)).len(), 4);
        assert_eq!(t.positions().len(), 6);
    }
}
