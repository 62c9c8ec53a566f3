// traits.rs - Core traits and types for the substitution model system

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use crate::error::ModelError;

/// The substitution models known to the distance builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Fraction of differing non-gap positions
    Identity,
    /// Kimura two-parameter distance weighting transitions and transversions
    Kimura,
    /// BLOSUM62 expected-score normalised distance
    Blosum62,
}

impl ModelKind {
    /// Registry key for this model
    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::Identity => "identity",
            ModelKind::Kimura => "kimura",
            ModelKind::Blosum62 => "blosum62",
        }
    }

    pub fn all() -> [ModelKind; 3] {
        [ModelKind::Identity, ModelKind::Kimura, ModelKind::Blosum62]
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "p-distance" => Ok(ModelKind::Identity),
            "kimura" | "k2p" | "k80" | "trans" | "nucleotide-transition" => Ok(ModelKind::Kimura),
            "blosum62" | "blosum" | "protein-substitution-matrix" => Ok(ModelKind::Blosum62),
            _ => Err(format!(
                "Invalid substitution model: {}. Use: identity, kimura, blosum62",
                s
            )),
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Trait for pairwise evolutionary distance estimators.
///
/// Implementations are pure: the same pair of aligned residue strings always
/// yields the same result.
pub trait SubstitutionModel: Send + Sync + Debug {
    /// Which model this is
    fn kind(&self) -> ModelKind;

    /// Get a human-readable name for this model
    fn name(&self) -> &'static str;

    /// Get a description of this model
    fn description(&self) -> &'static str;

    /// Check the residues present in a whole alignment once, before any pair
    /// is computed
    fn check_alphabet(&self, _residues: &BTreeSet<u8>) -> Result<(), ModelError> {
        // Default implementation accepts any residue
        Ok(())
    }

    /// Distance between two equal-length, upper-case aligned residue strings
    fn distance(&self, seq1: &[u8], seq2: &[u8]) -> Result<f64, ModelError>;
}

/// Map `-0.0` and tiny negative rounding noise to exactly zero
pub(crate) fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}
