//! Re-fitting aligned HIV-2 windows into HIV-1 numbering
//!
//! Aligners report a window of the target gene (`first..=last`). The window
//! is padded with [`WILDCARD`] to the full gene length and then rewritten by
//! the gene's [`AlignmentAdjustment`] list so that HIV-2 RT and IN line up
//! residue-for-residue with their HIV-1 counterparts.

use serde::{Deserialize, Serialize};

use crate::error::FactsError;
use crate::gene::Gene;

/// Placeholder for positions the aligner did not cover
pub const WILDCARD: char = '.';

/// One rewrite step applied to a padded alignment
///
/// - `pos > 0, size > 0`: insert `size` wildcards at index `pos`
/// - `pos < 0, size > 0`: remove `size` residues at index `|pos|`
/// - `pos < 0, size == 0`: truncate to `|pos|` residues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentAdjustment {
    pub pos: i32,
    pub size: i32,
}

impl AlignmentAdjustment {
    pub const fn new(pos: i32, size: i32) -> Self {
        Self { pos, size }
    }
}

/// Unit of the aligned string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    AminoAcid,
    /// Three characters per amino-acid position
    Nucleotide,
}

impl SequenceMode {
    fn scale(&self) -> usize {
        match self {
            SequenceMode::AminoAcid => 1,
            SequenceMode::Nucleotide => 3,
        }
    }
}

/// Pad `aligned` to the full length of `gene` and apply its adjustments
///
/// `first_aa` and `last_aa` are the 1-based amino-acid positions covered by
/// `aligned`. The result has the length of the HIV-1 gene of the same kind
/// (times three in nucleotide mode).
pub fn adjust_alignment(
    gene: &Gene,
    aligned: &str,
    first_aa: u32,
    last_aa: u32,
    mode: SequenceMode,
) -> Result<String, FactsError> {
    let scale = mode.scale();
    let gene_len = gene.length() as usize * scale;

    if first_aa == 0 || first_aa > gene.length() {
        return Err(FactsError::out_of_range(
            format!("{} first position", gene),
            i64::from(first_aa),
            1,
            i64::from(gene.length()),
        ));
    }
    if last_aa + 1 < first_aa || last_aa > gene.length() {
        return Err(FactsError::out_of_range(
            format!("{} last position", gene),
            i64::from(last_aa),
            i64::from(first_aa) - 1,
            i64::from(gene.length()),
        ));
    }

    let mut seq: Vec<char> = aligned.chars().collect();
    let prefix = (first_aa as usize - 1) * scale;
    let room = gene_len - prefix;
    if seq.len() > room {
        return Err(FactsError::out_of_range(
            format!("{} aligned length", gene),
            seq.len() as i64,
            0,
            room as i64,
        ));
    }
    let suffix = room - seq.len();

    let mut padded = Vec::with_capacity(gene_len);
    padded.extend(std::iter::repeat(WILDCARD).take(prefix));
    padded.append(&mut seq);
    padded.extend(std::iter::repeat(WILDCARD).take(suffix));

    for adj in gene.adjustments() {
        apply(&mut padded, gene, adj, scale)?;
    }
    Ok(padded.into_iter().collect())
}

fn apply(
    seq: &mut Vec<char>,
    gene: &Gene,
    adj: &AlignmentAdjustment,
    scale: usize,
) -> Result<(), FactsError> {
    let invalid = || FactsError::InvalidAlignmentAdjustment {
        gene: gene.to_string(),
        pos: adj.pos,
        size: adj.size,
    };
    let index = adj.pos.unsigned_abs() as usize * scale;
    let size = usize::try_from(adj.size).map_err(|_| invalid())? * scale;

    match (adj.pos.signum(), size) {
        (1, n) if n > 0 => {
            if index > seq.len() {
                return Err(invalid());
            }
            seq.splice(index..index, std::iter::repeat(WILDCARD).take(n));
        }
        (-1, n) if n > 0 => {
            if index + n > seq.len() {
                return Err(invalid());
            }
            seq.drain(index..index + n);
        }
        (-1, 0) => {
            if index > seq.len() {
                return Err(invalid());
            }
            seq.truncate(index);
        }
        _ => return Err(invalid()),
    }
    Ok(())
}
