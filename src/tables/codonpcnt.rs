//! Codon prevalence at each gene position

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FactsError};
use crate::gene::{Gene, Strain};
use crate::mutation::model::normalize_aa;
use crate::mutation::AminoAcid;
use crate::position::GenePosition;
use crate::tables::resolve_gene;

#[derive(Debug, Deserialize)]
struct RawCodonPercent {
    gene: String,
    position: u32,
    codon: String,
    aa: char,
    percent: f64,
    count: u64,
    total: u64,
}

/// Prevalence of one codon at one position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonPercent {
    pub gene: Gene,
    pub position: u32,
    pub codon: String,
    pub aa: AminoAcid,
    pub percent: f64,
    pub count: u64,
    pub total: u64,
}

/// True for three unambiguous nucleotides, `ins` or `del`
fn is_valid_codon(codon: &str) -> bool {
    codon == "ins"
        || codon == "del"
        || (codon.len() == 3 && codon.bytes().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')))
}

#[derive(Debug, Clone, Default)]
pub struct CodonPercents {
    by_position: BTreeMap<GenePosition, Vec<CodonPercent>>,
}

impl CodonPercents {
    /// Parse a `codonpcnt` resource, resolving gene names in `strain`
    pub fn from_json(strain: Strain, json: &str) -> Result<Self, FactsError> {
        let raw: Vec<RawCodonPercent> = serde_json::from_str(json)?;
        let mut by_position: BTreeMap<GenePosition, Vec<CodonPercent>> = BTreeMap::new();
        for rec in raw {
            let Some(gene) = resolve_gene(strain, &rec.gene) else {
                log::warn!("Skipping codon percent with unknown gene '{}'", rec.gene);
                continue;
            };
            let aa = normalize_aa(rec.aa).unwrap_or(AminoAcid::Xaa);
            by_position
                .entry(GenePosition::new(gene, rec.position))
                .or_default()
                .push(CodonPercent {
                    gene,
                    position: rec.position,
                    codon: rec.codon,
                    aa,
                    percent: rec.percent,
                    count: rec.count,
                    total: rec.total,
                });
        }
        Ok(Self { by_position })
    }

    pub fn len(&self) -> usize {
        self.by_position.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodonPercent> {
        self.by_position.values().flatten()
    }

    pub fn for_gene(&self, gene: Gene) -> impl Iterator<Item = &CodonPercent> {
        self.iter().filter(move |p| p.gene == gene)
    }

    /// Records at one position, in file order
    pub fn get_at(&self, gene: Gene, pos: u32) -> &[CodonPercent] {
        self.by_position
            .get(&GenePosition::new(gene, pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up one codon
    ///
    /// Returns `None` for an untabled position. A tabled position without
    /// the codon yields a zero-percent `X` record sharing the position's
    /// total.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `pos` is outside the gene, `InvalidMutationNotation`
    /// when `codon` is not three of `ACGT`, `ins` or `del`.
    pub fn get(&self, gene: Gene, pos: u32, codon: &str) -> Result<Option<CodonPercent>, FactsError> {
        gene.position(pos)?;
        if !is_valid_codon(codon) {
            return Err(FactsError::notation(
                codon,
                0,
                format!("Invalid argument codon \"{}\" at {}{}", codon, gene, pos),
                ErrorCode::InvalidNotation,
            ));
        }
        let records = self.get_at(gene, pos);
        let Some(first) = records.first() else {
            return Ok(None);
        };
        let found = records
            .iter()
            .find(|p| p.codon == codon)
            .cloned()
            .unwrap_or_else(|| CodonPercent {
                gene,
                position: pos,
                codon: codon.to_string(),
                aa: AminoAcid::Xaa,
                percent: 0.0,
                count: 0,
                total: first.total,
            });
        Ok(Some(found))
    }

    /// Highest percent among the codons of a mixture
    pub fn highest_codon_percent(
        &self,
        gene: Gene,
        pos: u32,
        codons: &[&str],
    ) -> Result<f64, FactsError> {
        let mut highest = 0.0_f64;
        for codon in codons {
            if let Some(p) = self.get(gene, pos, codon)? {
                highest = highest.max(p.percent);
            }
        }
        Ok(highest)
    }
}
