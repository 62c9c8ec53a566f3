// kimura.rs - Kimura two-parameter nucleotide model

use std::collections::BTreeSet;

use super::traits::{non_negative, ModelKind, SubstitutionModel};
use crate::data::sequence::NUCLEOTIDE_SYMBOLS;
use crate::data::GAP;
use crate::error::ModelError;

/// ## Kimura 2-Parameter (K-80) nucleotide substitution model.
///
/// Transitions (A ↔ G, C ↔ T) and transversions are counted separately over
/// columns where both rows carry an unambiguous base; gaps and `N` are
/// skipped. With `P` the transition and `Q` the transversion proportion:
///
/// $$ d = -\frac{1}{2} \ln\left(1 - 2P - Q\right) - \frac{1}{4} \ln\left(1 - 2Q\right) $$
///
/// The distance is undefined when either logarithm argument is not positive,
/// which happens for saturated (highly divergent) pairs.
///
/// ### Citations
///
/// - Kimura, M. (1980). "A simple method for estimating evolutionary rates of
///   base substitutions through comparative studies of nucleotide sequences."
///   Journal of Molecular Evolution. 16, 111-120.
#[derive(Debug, Clone, Default)]
pub struct KimuraModel;

const MODEL_NAME: &str = "Kimura";

#[inline]
fn is_purine(base: u8) -> bool {
    matches!(base, b'A' | b'G')
}

#[inline]
fn is_base(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

impl SubstitutionModel for KimuraModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Kimura
    }

    fn name(&self) -> &'static str {
        MODEL_NAME
    }

    fn description(&self) -> &'static str {
        "Kimura two-parameter distance (transitions weighted apart from transversions)"
    }

    fn check_alphabet(&self, residues: &BTreeSet<u8>) -> Result<(), ModelError> {
        match residues.iter().find(|r| !NUCLEOTIDE_SYMBOLS.contains(r)) {
            Some(&residue) => Err(ModelError::UnsupportedResidue {
                model: MODEL_NAME,
                residue: residue as char,
            }),
            None => Ok(()),
        }
    }

    fn distance(&self, seq1: &[u8], seq2: &[u8]) -> Result<f64, ModelError> {
        let mut compared = 0usize;
        let mut transitions = 0usize;
        let mut transversions = 0usize;

        for (&a, &b) in seq1.iter().zip(seq2) {
            if a == GAP || b == GAP || a == b'N' || b == b'N' {
                continue;
            }
            for residue in [a, b] {
                if !is_base(residue) {
                    return Err(ModelError::UnsupportedResidue {
                        model: MODEL_NAME,
                        residue: residue as char,
                    });
                }
            }

            compared += 1;
            if a != b {
                if is_purine(a) == is_purine(b) {
                    transitions += 1;
                } else {
                    transversions += 1;
                }
            }
        }

        if compared == 0 {
            return Err(ModelError::NoComparablePositions);
        }

        let p = transitions as f64 / compared as f64;
        let q = transversions as f64 / compared as f64;
        let w1 = 1.0 - 2.0 * p - q;
        let w2 = 1.0 - 2.0 * q;
        if w1 <= 0.0 || w2 <= 0.0 {
            return Err(ModelError::Saturated { model: MODEL_NAME });
        }

        let d = -0.5 * w1.ln() - 0.25 * w2.ln();
        if !d.is_finite() {
            return Err(ModelError::Saturated { model: MODEL_NAME });
        }
        Ok(non_negative(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sequences() {
        let d = KimuraModel.distance(b"ACGTACGT", b"ACGTACGT").unwrap();
        assert_eq!(d, 0.0);
        assert!(d.is_sign_positive());
    }

    #[test]
    fn test_single_transition() {
        // P = 0.1, Q = 0
        let d = KimuraModel.distance(b"AAAAAAAAAA", b"GAAAAAAAAA").unwrap();
        assert!((d - 0.111_571_775_657_104_9).abs() < 1e-9);
    }

    #[test]
    fn test_single_transversion() {
        // P = 0, Q = 0.1
        let d = KimuraModel.distance(b"AAAAAAAAAA", b"CAAAAAAAAA").unwrap();
        assert!((d - 0.108_466_145_657_465_6).abs() < 1e-9);
    }

    #[test]
    fn test_transition_and_transversion() {
        // P = 0.1, Q = 0.1
        let d = KimuraModel.distance(b"AAAAAAAAAA", b"GCAAAAAAAA").unwrap();
        assert!((d - 0.234_123_359_797_918_7).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_and_n_are_skipped() {
        let d = KimuraModel.distance(b"AN-T", b"ACGT").unwrap();
        assert_eq!(d, 0.0);
        assert_eq!(
            KimuraModel.distance(b"NNNN", b"ACGT"),
            Err(ModelError::NoComparablePositions)
        );
    }

    #[test]
    fn test_saturated_pair() {
        // Every column is a transversion: 1 - 2Q < 0
        assert_eq!(
            KimuraModel.distance(b"ACGT", b"CATG"),
            Err(ModelError::Saturated { model: "Kimura" })
        );
    }

    #[test]
    fn test_alphabet_check() {
        let dna: BTreeSet<u8> = b"ACGTN-".iter().copied().collect();
        assert!(KimuraModel.check_alphabet(&dna).is_ok());

        let protein: BTreeSet<u8> = b"ACDE".iter().copied().collect();
        assert!(matches!(
            KimuraModel.check_alphabet(&protein),
            Err(ModelError::UnsupportedResidue { residue: 'D', .. })
        ));
        assert!(KimuraModel.distance(b"AR", b"AC").is_err());
    }
}
