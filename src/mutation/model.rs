//! A single mutation at one gene position

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FactsError};
use crate::gene::Gene;
use crate::mutation::aa::{aas_to_string, AminoAcid};
use crate::position::GenePosition;

/// Whether a mutation carries its source codon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationFlavor {
    /// Amino acids only
    Amino,
    /// Amino acids plus the nucleotide triplet they were called from
    Codon,
}

/// Normalize amino-acid notation to a set of [`AminoAcid`]s
///
/// Accepts upper-case letters, the aliases `i # _` (insertion), `d ~ -`
/// (deletion) and `Z . *` (stop), and the words `Insertion`/`Deletion`.
/// Returns `None` for anything else or for empty input.
pub fn normalize_aas(text: &str) -> Option<BTreeSet<AminoAcid>> {
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "ins" | "insertion" => return Some(BTreeSet::from([AminoAcid::Ins])),
        "del" | "deletion" => return Some(BTreeSet::from([AminoAcid::Del])),
        _ => {}
    }
    let mut aas = BTreeSet::new();
    for c in text.chars() {
        aas.insert(normalize_aa(c)?);
    }
    if aas.is_empty() {
        None
    } else {
        Some(aas)
    }
}

pub(crate) fn normalize_aa(c: char) -> Option<AminoAcid> {
    match c {
        'i' | '#' | '_' => Some(AminoAcid::Ins),
        'd' | '~' | '-' => Some(AminoAcid::Del),
        'Z' | '.' | '*' => Some(AminoAcid::Ter),
        _ => AminoAcid::from_char(c),
    }
}

/// A set of amino acids observed at one gene position
///
/// The amino-acid set is never empty. Insertions may carry the inserted
/// residues (`69_SS`); codon mutations carry the nucleotide triplet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mutation {
    position: GenePosition,
    aas: BTreeSet<AminoAcid>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inserted_aas: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    triplet: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    inserted_nas: String,
}

impl Mutation {
    /// Create a mutation, validating the position and the AA set
    pub fn new<I>(gene: Gene, pos: u32, aas: I) -> Result<Self, FactsError>
    where
        I: IntoIterator<Item = AminoAcid>,
    {
        let position = gene.position(pos)?;
        let aas: BTreeSet<AminoAcid> = aas.into_iter().collect();
        if aas.is_empty() {
            return Err(FactsError::notation(
                &position.to_string(),
                0,
                "a mutation needs at least one amino acid",
                ErrorCode::InvalidAminoAcid,
            ));
        }
        Ok(Self {
            position,
            aas,
            inserted_aas: String::new(),
            triplet: None,
            inserted_nas: String::new(),
        })
    }

    /// Create a mutation from amino-acid notation such as `"KR"` or `"_"`
    pub fn from_aas_text(gene: Gene, pos: u32, aas: &str) -> Result<Self, FactsError> {
        let set = normalize_aas(aas).ok_or_else(|| {
            FactsError::notation(
                aas,
                0,
                format!("invalid amino acids {:?}", aas),
                ErrorCode::InvalidAminoAcid,
            )
        })?;
        Self::new(gene, pos, set)
    }

    /// Attach inserted residues; adds the insertion sentinel
    pub fn with_inserted_aas(mut self, inserted: impl Into<String>) -> Self {
        let inserted = inserted.into();
        if !inserted.is_empty() {
            self.aas.insert(AminoAcid::Ins);
        }
        self.inserted_aas = inserted;
        self
    }

    /// Attach the nucleotide triplet, making this a codon mutation
    pub fn with_triplet(mut self, triplet: impl Into<String>) -> Self {
        self.triplet = Some(triplet.into());
        self
    }

    pub fn with_inserted_nas(mut self, inserted: impl Into<String>) -> Self {
        self.inserted_nas = inserted.into();
        self
    }

    pub fn gene(&self) -> Gene {
        self.position.gene()
    }

    pub fn position(&self) -> u32 {
        self.position.position()
    }

    pub fn gene_position(&self) -> GenePosition {
        self.position
    }

    pub fn aas(&self) -> &BTreeSet<AminoAcid> {
        &self.aas
    }

    pub fn contains(&self, aa: AminoAcid) -> bool {
        self.aas.contains(&aa)
    }

    pub fn inserted_aas(&self) -> &str {
        &self.inserted_aas
    }

    pub fn triplet(&self) -> Option<&str> {
        self.triplet.as_deref()
    }

    pub fn inserted_nas(&self) -> &str {
        &self.inserted_nas
    }

    pub fn flavor(&self) -> MutationFlavor {
        if self.triplet.is_some() {
            MutationFlavor::Codon
        } else {
            MutationFlavor::Amino
        }
    }

    /// Reference amino acid at this position
    pub fn reference(&self) -> char {
        // positions are validated on construction
        self.position.reference().unwrap_or('X')
    }

    pub fn is_insertion(&self) -> bool {
        self.contains(AminoAcid::Ins)
    }

    pub fn is_deletion(&self) -> bool {
        self.contains(AminoAcid::Del)
    }

    pub fn is_indel(&self) -> bool {
        self.is_insertion() || self.is_deletion()
    }

    pub fn is_stop_codon(&self) -> bool {
        self.contains(AminoAcid::Ter)
    }

    /// More than one amino acid
    pub fn is_mixture(&self) -> bool {
        self.aas.len() > 1
    }

    fn check_same_position(&self, other: &Mutation) -> Result<(), FactsError> {
        if self.position != other.position {
            return Err(FactsError::MismatchedPosition {
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        Ok(())
    }

    fn with_aas(&self, aas: BTreeSet<AminoAcid>) -> Mutation {
        let keeps_insertion = aas.contains(&AminoAcid::Ins);
        let triplet = if aas == self.aas {
            self.triplet.clone()
        } else {
            None
        };
        Mutation {
            position: self.position,
            aas,
            inserted_aas: if keeps_insertion {
                self.inserted_aas.clone()
            } else {
                String::new()
            },
            triplet,
            inserted_nas: if keeps_insertion {
                self.inserted_nas.clone()
            } else {
                String::new()
            },
        }
    }

    /// Union of both AA sets
    ///
    /// Insertion metadata is taken from `self` when present, else from
    /// `other`. The triplet survives only when the AA set is unchanged.
    pub fn merge_with(&self, other: &Mutation) -> Result<Mutation, FactsError> {
        self.check_same_position(other)?;
        let aas: BTreeSet<AminoAcid> = self.aas.union(&other.aas).copied().collect();
        let mut merged = self.with_aas(aas);
        if merged.inserted_aas.is_empty() {
            merged.inserted_aas = other.inserted_aas.clone();
        }
        if merged.inserted_nas.is_empty() {
            merged.inserted_nas = other.inserted_nas.clone();
        }
        Ok(merged)
    }

    /// AAs of `self` not in `other`, or `None` when nothing is left
    pub fn subtract_by(&self, other: &Mutation) -> Result<Option<Mutation>, FactsError> {
        self.check_same_position(other)?;
        let aas: BTreeSet<AminoAcid> = self.aas.difference(&other.aas).copied().collect();
        Ok((!aas.is_empty()).then(|| self.with_aas(aas)))
    }

    /// AAs shared by both, or `None` when there are none
    pub fn intersect_with(&self, other: &Mutation) -> Result<Option<Mutation>, FactsError> {
        self.check_same_position(other)?;
        let aas: BTreeSet<AminoAcid> = self.aas.intersection(&other.aas).copied().collect();
        Ok((!aas.is_empty()).then(|| self.with_aas(aas)))
    }

    /// True when any AA is shared
    pub fn overlaps(&self, other: &Mutation) -> bool {
        self.position == other.position && !self.aas.is_disjoint(&other.aas)
    }

    /// One single-AA mutation per AA, in canonical AA order
    pub fn split(&self) -> Vec<Mutation> {
        self.aas
            .iter()
            .map(|aa| self.with_aas(BTreeSet::from([*aa])))
            .collect()
    }

    /// Non-insertion AAs come first so `_` always ends the group,
    /// e.g. `67D-`, `69-_` or `69*_SS`
    fn aas_text(&self) -> String {
        if self.is_insertion() {
            let others: String = self
                .aas
                .iter()
                .filter(|aa| **aa != AminoAcid::Ins)
                .map(|aa| aa.to_char())
                .collect();
            format!("{}_{}", others, self.inserted_aas)
        } else {
            aas_to_string(&self.aas)
        }
    }

    /// Position and AAs, e.g. `41L`, `69_SS`, `44-`
    pub fn short_text(&self) -> String {
        format!("{}{}", self.position(), self.aas_text())
    }

    /// Reference, position and AAs, e.g. `M41L` or `T69Insertion`
    pub fn human_format(&self) -> String {
        let aas = match (self.aas.len(), self.aas.first()) {
            (1, Some(AminoAcid::Ins)) if self.inserted_aas.is_empty() => "Insertion".to_string(),
            (1, Some(AminoAcid::Del)) => "Deletion".to_string(),
            _ => self.aas_text(),
        };
        format!("{}{}{}", self.reference(), self.position(), aas)
    }

    /// [`Mutation::human_format`] prefixed by the abstract gene, e.g. `RT_M41L`
    pub fn human_format_with_gene(&self) -> String {
        format!("{}_{}", self.gene().abstract_name(), self.human_format())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.human_format_with_gene())
    }
}
