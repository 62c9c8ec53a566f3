// sequence.rs - Sequence records and alphabet classification

use std::collections::BTreeSet;
use std::fmt;

/// Gap character used by aligners
pub const GAP: u8 = b'-';

/// Symbols accepted as nucleotide residues (upper case)
pub const NUCLEOTIDE_SYMBOLS: &[u8] = b"ACGTN-";

/// A named residue string.
///
/// Residues are stored upper-cased so every comparison downstream is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub residues: Vec<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, residues: impl AsRef<[u8]>) -> Self {
        Self {
            id: id.into(),
            residues: residues.as_ref().to_ascii_uppercase(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residues without gap characters
    pub fn ungapped(&self) -> Vec<u8> {
        self.residues.iter().copied().filter(|&r| r != GAP).collect()
    }

    pub fn residues_str(&self) -> String {
        String::from_utf8_lossy(&self.residues).into_owned()
    }
}

/// Residue alphabet of a sequence set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Nucleotide,
    AminoAcid,
}

impl Alphabet {
    /// Nucleotide when every residue is one of `ACGTN-`, amino acid otherwise
    pub fn classify(residues: &BTreeSet<u8>) -> Self {
        if residues.iter().all(|r| NUCLEOTIDE_SYMBOLS.contains(r)) {
            Alphabet::Nucleotide
        } else {
            Alphabet::AminoAcid
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Alphabet::Nucleotide => "nucleotide",
            Alphabet::AminoAcid => "amino acid",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Distinct residues present across a set of sequences
pub fn residue_set<'a, I>(sequences: I) -> BTreeSet<u8>
where
    I: IntoIterator<Item = &'a Sequence>,
{
    let mut present = [false; 256];
    for seq in sequences {
        for &r in &seq.residues {
            present[r as usize] = true;
        }
    }
    (0..=255u8).filter(|&r| present[r as usize]).collect()
}
