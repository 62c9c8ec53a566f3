// mod.rs - Core logic module

pub mod distance;
pub mod nj;
pub mod pipeline;
pub mod tree;

// Re-export main types for convenience
pub use distance::{calculate_distance_matrix, DistanceMatrix, DistanceMatrixBuilder, ModelPolicy};
pub use nj::{neighbor_joining, NeighborJoiningTreeBuilder};
pub use pipeline::{Pipeline, PipelineOutput, Stage, StageFailure, TaxonFilter};
pub use tree::{LeafComparison, Node, NodeIndex, Tree, TreeStats};
