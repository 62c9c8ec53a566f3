// mod.rs - Data structures module

pub mod alignment;
pub mod fasta;
pub mod sequence;

// Re-export main types for convenience
pub use alignment::Alignment;
pub use fasta::{parse_fasta, parse_fasta_for_tree, read_fasta_file, write_fasta};
pub use sequence::{Alphabet, Sequence, GAP};
