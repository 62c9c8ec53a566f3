// mod.rs - Aligner capability: turning raw sequences into an alignment

pub mod clustalw;

use std::fmt;
use std::str::FromStr;

use crate::data::{Alignment, Sequence};
use crate::error::Result;

pub use clustalw::ClustalwAligner;

/// Anything that can produce an equal-length gapped alignment from raw
/// sequences, keeping input ids and order.
///
/// Implementations must be shareable across threads so one aligner can
/// serve independent pipeline runs concurrently.
pub trait Aligner: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Align the sequences, or fail with an alignment or input error
    fn align(&self, sequences: &[Sequence]) -> Result<Alignment>;
}

impl<T: Aligner + ?Sized> Aligner for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn align(&self, sequences: &[Sequence]) -> Result<Alignment> {
        (**self).align(sequences)
    }
}

/// Pass-through aligner for input that is already aligned.
///
/// Only validates that every row has the same length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreAligned;

impl Aligner for PreAligned {
    fn name(&self) -> &str {
        "none"
    }

    fn align(&self, sequences: &[Sequence]) -> Result<Alignment> {
        Alignment::new(sequences.to_vec())
    }
}

/// Aligner selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignerKind {
    #[default]
    Clustalw,
    None,
}

impl FromStr for AlignerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clustalw" | "clustalw2" | "clustal" => Ok(AlignerKind::Clustalw),
            "none" | "prealigned" | "pre-aligned" => Ok(AlignerKind::None),
            _ => Err(format!("Invalid aligner: {}. Use: clustalw, none", s)),
        }
    }
}

impl fmt::Display for AlignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignerKind::Clustalw => write!(f, "clustalw"),
            AlignerKind::None => write!(f, "none"),
        }
    }
}
