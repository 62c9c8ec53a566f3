// identity.rs - Identity (p-distance) model, the deterministic fallback

use super::traits::{ModelKind, SubstitutionModel};
use crate::data::GAP;
use crate::error::ModelError;

/// Proportion of differing positions, ignoring columns where either row has a gap
#[derive(Debug, Clone, Default)]
pub struct IdentityModel;

impl SubstitutionModel for IdentityModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Identity
    }

    fn name(&self) -> &'static str {
        "Identity"
    }

    fn description(&self) -> &'static str {
        "Fraction of mismatching non-gap positions (p-distance)"
    }

    fn distance(&self, seq1: &[u8], seq2: &[u8]) -> Result<f64, ModelError> {
        let mut compared = 0usize;
        let mut mismatches = 0usize;

        for (&a, &b) in seq1.iter().zip(seq2) {
            if a == GAP || b == GAP {
                continue;
            }
            compared += 1;
            if a != b {
                mismatches += 1;
            }
        }

        if compared == 0 {
            return Err(ModelError::NoComparablePositions);
        }

        Ok(mismatches as f64 / compared as f64)
    }
}
