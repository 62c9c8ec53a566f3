// lib.rs - njtree library root

//! # njtree - Distance-based phylogenetic tree inference
//!
//! This library turns a set of biological sequences into an evolutionary tree
//! in Newick notation: sequences are aligned by an external aligner, pairwise
//! evolutionary distances are estimated under a substitution model, and a tree
//! is built by neighbor-joining.
//!
//! ## Features
//!
//! - **Substitution models**: identity (p-distance), Kimura two-parameter for
//!   nucleotides and BLOSUM62-normalised distance for proteins
//! - **Deterministic fallback**: any model failure recomputes the whole matrix
//!   with the identity model
//! - **Neighbor-joining**: Saitou-Nei with stable tie-breaking and non-negative
//!   branch lengths
//! - **Newick**: canonical writer and a strict parser for round-trips
//! - **Pluggable aligners**: ClustalW process adapter or pre-aligned input
//! - **Multiple formats**: TSV, CSV, PHYLIP, NEXUS distance matrix output
//!
//! ## Basic Usage
//!
//! ```rust
//! use njtree::prelude::*;
//!
//! let fasta = ">a\nACGTACGTAC\n>b\nACGTACGTAT\n>c\nTCGAACGTAC\n";
//! let output = Pipeline::new(PreAligned).run_fasta(fasta).map_err(|e| e.to_string())?;
//!
//! assert_eq!(output.tree.num_leaves(), 3);
//! assert!(output.newick.ends_with(';'));
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod align;
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod newick;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::align::{Aligner, AlignerKind, ClustalwAligner, PreAligned};
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{calculate_distance_matrix, neighbor_joining};
    pub use crate::core::{DistanceMatrix, DistanceMatrixBuilder, ModelPolicy};
    pub use crate::core::{NeighborJoiningTreeBuilder, Node, NodeIndex, Tree};
    pub use crate::core::{Pipeline, PipelineOutput, Stage, StageFailure, TaxonFilter};
    pub use crate::data::{parse_fasta, read_fasta_file, Alignment, Alphabet, Sequence};
    pub use crate::error::{AlignmentError, ErrorKind, ModelError, PhyloError};
    pub use crate::models::{ModelKind, ModelRegistry, SubstitutionModel};
    pub use crate::newick::{parse_newick, to_newick};
    pub use crate::output::{write_matrix, MatrixFormat, TreeResponse};
}

// Re-export main types at the root level for convenience
pub use core::{DistanceMatrix, Pipeline, StageFailure, Tree};
pub use data::{Alignment, Sequence};
pub use error::{PhyloError, Result};
pub use models::ModelKind;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "njtree v{} - Neighbor-joining phylogenetic trees from sequences",
        VERSION
    )
}
