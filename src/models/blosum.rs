// blosum.rs - BLOSUM62 score-normalised protein distance

use std::collections::BTreeSet;

use super::traits::{non_negative, ModelKind, SubstitutionModel};
use crate::data::GAP;
use crate::error::ModelError;

/// Residue order of [`BLOSUM62`] rows and columns
pub const BLOSUM62_ALPHABET: &[u8; 23] = b"ARNDCQEGHILKMFPSTWYVBZX";

/// Stop codon symbol, skipped like a gap
const STOP: u8 = b'*';

const MODEL_NAME: &str = "BLOSUM62";

/// BLOSUM62 scoring matrix (NCBI), restricted to the 20 standard amino acids
/// plus the ambiguity codes B, Z and X.
#[rustfmt::skip]
pub const BLOSUM62: [[i8; 23]; 23] = [
    //A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V   B   Z   X
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0], // A
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1], // R
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1], // N
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1], // D
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2], // C
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1], // Q
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1], // E
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1], // G
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1], // L
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1], // K
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2], // P
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0], // S
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2], // W
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1], // Y
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1], // V
    [-2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1], // B
    [-1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1], // Z
    [ 0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1], // X
];

const NOT_IN_MATRIX: u8 = u8::MAX;

const fn build_index() -> [u8; 256] {
    let mut table = [NOT_IN_MATRIX; 256];
    let mut i = 0;
    while i < BLOSUM62_ALPHABET.len() {
        table[BLOSUM62_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

static RESIDUE_INDEX: [u8; 256] = build_index();

#[inline]
fn matrix_index(residue: u8) -> Option<usize> {
    match RESIDUE_INDEX[residue as usize] {
        NOT_IN_MATRIX => None,
        i => Some(i as usize),
    }
}

/// Score between two residues, `None` if either is outside the matrix
pub fn blosum62_score(a: u8, b: u8) -> Option<i32> {
    Some(BLOSUM62[matrix_index(a)?][matrix_index(b)?] as i32)
}

/// Protein distance normalised by the self-scores of both rows.
///
/// Over columns without gaps or stops, with `S` the summed pair score and
/// `S1`, `S2` the summed self-scores of each row:
///
/// $$ d = 1 - \frac{S}{\max(S_1, S_2)} $$
///
/// Negative results (only possible with unusual ambiguity codes) are clamped
/// to zero.
#[derive(Debug, Clone, Default)]
pub struct Blosum62Model;

impl Blosum62Model {
    fn unsupported(residue: u8) -> ModelError {
        ModelError::UnsupportedResidue {
            model: MODEL_NAME,
            residue: residue as char,
        }
    }
}

impl SubstitutionModel for Blosum62Model {
    fn kind(&self) -> ModelKind {
        ModelKind::Blosum62
    }

    fn name(&self) -> &'static str {
        MODEL_NAME
    }

    fn description(&self) -> &'static str {
        "BLOSUM62 score distance normalised by the maximum self-score"
    }

    fn check_alphabet(&self, residues: &BTreeSet<u8>) -> Result<(), ModelError> {
        match residues
            .iter()
            .find(|&&r| r != GAP && r != STOP && matrix_index(r).is_none())
        {
            Some(&residue) => Err(Self::unsupported(residue)),
            None => Ok(()),
        }
    }

    fn distance(&self, seq1: &[u8], seq2: &[u8]) -> Result<f64, ModelError> {
        let mut score = 0i64;
        let mut self_score1 = 0i64;
        let mut self_score2 = 0i64;
        let mut compared = 0usize;

        for (&a, &b) in seq1.iter().zip(seq2) {
            if a == GAP || b == GAP || a == STOP || b == STOP {
                continue;
            }
            let ia = matrix_index(a).ok_or_else(|| Self::unsupported(a))?;
            let ib = matrix_index(b).ok_or_else(|| Self::unsupported(b))?;

            compared += 1;
            score += BLOSUM62[ia][ib] as i64;
            self_score1 += BLOSUM62[ia][ia] as i64;
            self_score2 += BLOSUM62[ib][ib] as i64;
        }

        if compared == 0 {
            return Err(ModelError::NoComparablePositions);
        }

        let max_score = self_score1.max(self_score2);
        if max_score <= 0 {
            return Err(ModelError::Saturated { model: MODEL_NAME });
        }

        Ok(non_negative(1.0 - score as f64 / max_score as f64))
    }
}
