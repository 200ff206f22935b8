//! Amino-acid alphabet used in mutations

use std::fmt;

use serde::{Deserialize, Serialize};

/// A residue, or one of the insertion/deletion/stop sentinels
///
/// Declaration order is the canonical sort order `ACDEFGHIKLMNPQRSTVWYX_-*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum AminoAcid {
    Ala, // A
    Cys, // C
    Asp, // D
    Glu, // E
    Phe, // F
    Gly, // G
    His, // H
    Ile, // I
    Lys, // K
    Leu, // L
    Met, // M
    Asn, // N
    Pro, // P
    Gln, // Q
    Arg, // R
    Ser, // S
    Thr, // T
    Val, // V
    Trp, // W
    Tyr, // Y
    /// Unknown residue or mixture placeholder
    Xaa, // X
    Ins, // _
    Del, // -
    Ter, // *
}

impl AminoAcid {
    pub const ALL: [AminoAcid; 24] = [
        AminoAcid::Ala,
        AminoAcid::Cys,
        AminoAcid::Asp,
        AminoAcid::Glu,
        AminoAcid::Phe,
        AminoAcid::Gly,
        AminoAcid::His,
        AminoAcid::Ile,
        AminoAcid::Lys,
        AminoAcid::Leu,
        AminoAcid::Met,
        AminoAcid::Asn,
        AminoAcid::Pro,
        AminoAcid::Gln,
        AminoAcid::Arg,
        AminoAcid::Ser,
        AminoAcid::Thr,
        AminoAcid::Val,
        AminoAcid::Trp,
        AminoAcid::Tyr,
        AminoAcid::Xaa,
        AminoAcid::Ins,
        AminoAcid::Del,
        AminoAcid::Ter,
    ];

    /// Parse a canonical one-letter code
    ///
    /// Only upper-case letters and the sentinels `_`, `-`, `*` are accepted;
    /// notation aliases such as `i`, `#` or `Z` are handled by the parser.
    pub fn from_char(c: char) -> Option<Self> {
        let aa = match c {
            'A' => Self::Ala,
            'C' => Self::Cys,
            'D' => Self::Asp,
            'E' => Self::Glu,
            'F' => Self::Phe,
            'G' => Self::Gly,
            'H' => Self::His,
            'I' => Self::Ile,
            'K' => Self::Lys,
            'L' => Self::Leu,
            'M' => Self::Met,
            'N' => Self::Asn,
            'P' => Self::Pro,
            'Q' => Self::Gln,
            'R' => Self::Arg,
            'S' => Self::Ser,
            'T' => Self::Thr,
            'V' => Self::Val,
            'W' => Self::Trp,
            'Y' => Self::Tyr,
            'X' => Self::Xaa,
            '_' => Self::Ins,
            '-' => Self::Del,
            '*' => Self::Ter,
            _ => return None,
        };
        Some(aa)
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Ala => 'A',
            Self::Cys => 'C',
            Self::Asp => 'D',
            Self::Glu => 'E',
            Self::Phe => 'F',
            Self::Gly => 'G',
            Self::His => 'H',
            Self::Ile => 'I',
            Self::Lys => 'K',
            Self::Leu => 'L',
            Self::Met => 'M',
            Self::Asn => 'N',
            Self::Pro => 'P',
            Self::Gln => 'Q',
            Self::Arg => 'R',
            Self::Ser => 'S',
            Self::Thr => 'T',
            Self::Val => 'V',
            Self::Trp => 'W',
            Self::Tyr => 'Y',
            Self::Xaa => 'X',
            Self::Ins => '_',
            Self::Del => '-',
            Self::Ter => '*',
        }
    }

    /// True for insertion and deletion sentinels
    pub fn is_indel(self) -> bool {
        matches!(self, Self::Ins | Self::Del)
    }

    /// True for the 20 standard residues
    pub fn is_standard(self) -> bool {
        !matches!(self, Self::Xaa | Self::Ins | Self::Del | Self::Ter)
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl From<AminoAcid> for char {
    fn from(aa: AminoAcid) -> char {
        aa.to_char()
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        AminoAcid::from_char(c).ok_or_else(|| format!("invalid amino acid '{}'", c))
    }
}

/// Render amino acids as a string of one-letter codes
pub fn aas_to_string<'a, I>(aas: I) -> String
where
    I: IntoIterator<Item = &'a AminoAcid>,
{
    aas.into_iter().map(|aa| aa.to_char()).collect()
}
