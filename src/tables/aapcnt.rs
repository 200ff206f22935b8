//! Amino-acid prevalence at each gene position

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::FactsError;
use crate::gene::{Gene, Strain};
use crate::mutation::model::normalize_aa;
use crate::mutation::{AminoAcid, Mutation};
use crate::position::GenePosition;
use crate::tables::resolve_gene;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAminoAcidPercent {
    gene: String,
    position: u32,
    aa: char,
    percent: f64,
    count: u64,
    total: u64,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    is_unusual: bool,
}

/// Prevalence of one amino acid at one position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AminoAcidPercent {
    pub gene: Gene,
    pub position: u32,
    pub aa: AminoAcid,
    pub percent: f64,
    pub count: u64,
    pub total: u64,
    pub reason: String,
    pub is_unusual: bool,
}

impl AminoAcidPercent {
    pub fn gene_position(&self) -> GenePosition {
        GenePosition::new(self.gene, self.position)
    }
}

/// Amino-acid percents for one treatment/subtype, grouped by position
#[derive(Debug, Clone, Default)]
pub struct AminoAcidPercents {
    by_position: BTreeMap<GenePosition, Vec<AminoAcidPercent>>,
}

impl AminoAcidPercents {
    /// Parse an `aapcnt` resource, resolving gene names in `strain`
    pub fn from_json(strain: Strain, json: &str) -> Result<Self, FactsError> {
        let raw: Vec<RawAminoAcidPercent> = serde_json::from_str(json)?;
        let mut by_position: BTreeMap<GenePosition, Vec<AminoAcidPercent>> = BTreeMap::new();
        for rec in raw {
            let Some(gene) = resolve_gene(strain, &rec.gene) else {
                log::warn!("Skipping amino-acid percent with unknown gene '{}'", rec.gene);
                continue;
            };
            let Some(aa) = normalize_aa(rec.aa) else {
                log::warn!(
                    "Skipping amino-acid percent with unknown residue '{}' at {}{}",
                    rec.aa,
                    gene,
                    rec.position
                );
                continue;
            };
            let pcnt = AminoAcidPercent {
                gene,
                position: rec.position,
                aa,
                percent: rec.percent,
                count: rec.count,
                total: rec.total,
                reason: rec.reason,
                is_unusual: rec.is_unusual,
            };
            by_position
                .entry(pcnt.gene_position())
                .or_default()
                .push(pcnt);
        }
        Ok(Self { by_position })
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.by_position.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// All records in position order
    pub fn iter(&self) -> impl Iterator<Item = &AminoAcidPercent> {
        self.by_position.values().flatten()
    }

    /// Records of one gene
    pub fn for_gene(&self, gene: Gene) -> impl Iterator<Item = &AminoAcidPercent> {
        self.iter().filter(move |p| p.gene == gene)
    }

    /// Records at one position, in file order
    pub fn get_at(&self, gene: Gene, pos: u32) -> &[AminoAcidPercent] {
        self.by_position
            .get(&GenePosition::new(gene, pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, gene: Gene, pos: u32, aa: AminoAcid) -> Option<&AminoAcidPercent> {
        self.get_at(gene, pos).iter().find(|p| p.aa == aa)
    }

    /// True when the table has any record at the position
    pub fn is_tabled(&self, gene: Gene, pos: u32) -> bool {
        self.by_position
            .contains_key(&GenePosition::new(gene, pos))
    }

    /// Highest percent among `aas`; missing entries count as zero
    pub fn highest_aa_percent<I>(&self, gene: Gene, pos: u32, aas: I) -> f64
    where
        I: IntoIterator<Item = AminoAcid>,
    {
        aas.into_iter()
            .map(|aa| self.get(gene, pos, aa).map_or(0.0, |p| p.percent))
            .fold(0.0, f64::max)
    }

    /// True when any of `aas` is unusual at the position
    ///
    /// An AA is unusual when it is flagged so or when the position is tabled
    /// but the AA has no record. `X` and untabled positions never are.
    pub fn contains_unusual_aa<'a, I>(&self, gene: Gene, pos: u32, aas: I) -> bool
    where
        I: IntoIterator<Item = &'a AminoAcid>,
    {
        let records = self.get_at(gene, pos);
        if records.is_empty() {
            return false;
        }
        aas.into_iter()
            .filter(|aa| **aa != AminoAcid::Xaa)
            .any(|aa| match records.iter().find(|p| p.aa == *aa) {
                Some(p) => p.is_unusual,
                None => true,
            })
    }

    pub fn is_unusual(&self, mutation: &Mutation) -> bool {
        self.contains_unusual_aa(mutation.gene(), mutation.position(), mutation.aas())
    }

    /// The AAs flagged unusual at a position
    pub fn unusual_aas(&self, gene: Gene, pos: u32) -> BTreeSet<AminoAcid> {
        self.get_at(gene, pos)
            .iter()
            .filter(|p| p.is_unusual)
            .map(|p| p.aa)
            .collect()
    }
}
