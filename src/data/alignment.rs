// alignment.rs - Validated multiple sequence alignment

use std::collections::{BTreeSet, HashSet};

use crate::data::sequence::{residue_set, Alphabet, Sequence};
use crate::error::{PhyloError, Result};

/// Equal-length gapped sequences with unique ids, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    sequences: Vec<Sequence>,
}

impl Alignment {
    /// Validate and wrap aligned sequences.
    ///
    /// Rejects empty rows, duplicate ids and rows of unequal length with an
    /// input error.
    pub fn new(sequences: Vec<Sequence>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(sequences.len());
        for seq in &sequences {
            if seq.id.is_empty() {
                return Err(PhyloError::input("sequence with empty id in alignment"));
            }
            if !seen.insert(seq.id.as_str()) {
                return Err(PhyloError::input(format!(
                    "duplicate sequence id '{}' in alignment",
                    seq.id
                )));
            }
        }

        if let Some(first) = sequences.first() {
            if first.is_empty() {
                return Err(PhyloError::input(format!(
                    "sequence '{}' has no residues",
                    first.id
                )));
            }
            let width = first.len();
            if let Some(ragged) = sequences.iter().find(|s| s.len() != width) {
                return Err(PhyloError::input(format!(
                    "alignment rows differ in length: '{}' has {} columns, '{}' has {}",
                    first.id,
                    width,
                    ragged.id,
                    ragged.len()
                )));
            }
        }

        Ok(Self { sequences })
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Number of alignment columns (0 for an empty alignment)
    pub fn width(&self) -> usize {
        self.sequences.first().map(|s| s.len()).unwrap_or(0)
    }

    pub fn ids(&self) -> Vec<String> {
        self.sequences.iter().map(|s| s.id.clone()).collect()
    }

    /// Distinct residues over every row
    pub fn residue_set(&self) -> BTreeSet<u8> {
        residue_set(&self.sequences)
    }

    pub fn alphabet(&self) -> Alphabet {
        Alphabet::classify(&self.residue_set())
    }

    /// Keep rows whose id passes `keep`, preserving order
    pub fn retain<F>(self, mut keep: F) -> Result<Self>
    where
        F: FnMut(&str) -> bool,
    {
        let sequences = self
            .sequences
            .into_iter()
            .filter(|s| keep(&s.id))
            .collect();
        Self::new(sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_alignment() {
        let aln = Alignment::new(vec![
            Sequence::new("a", "AC-T"),
            Sequence::new("b", "ACGT"),
        ])
        .unwrap();
        assert_eq!(aln.len(), 2);
        assert_eq!(aln.width(), 4);
        assert_eq!(aln.ids(), vec!["a", "b"]);
        assert_eq!(aln.alphabet(), Alphabet::Nucleotide);
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        let err = Alignment::new(vec![
            Sequence::new("a", "ACGT"),
            Sequence::new("b", "ACG"),
        ])
        .unwrap_err();
        assert!(matches!(err, PhyloError::Input { .. }));
        assert!(err.to_string().contains("differ in length"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Alignment::new(vec![
            Sequence::new("a", "ACGT"),
            Sequence::new("a", "ACGA"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_retain() {
        let aln = Alignment::new(vec![
            Sequence::new("keep1", "AC"),
            Sequence::new("drop", "AG"),
            Sequence::new("keep2", "AT"),
        ])
        .unwrap();
        let kept = aln.retain(|id| id.starts_with("keep")).unwrap();
        assert_eq!(kept.ids(), vec!["keep1", "keep2"]);
    }
}
