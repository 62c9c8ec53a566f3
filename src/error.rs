// error.rs - Error taxonomy for the tree inference pipeline

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main error type for njtree operations
#[derive(Error, Debug)]
pub enum PhyloError {
    /// Malformed or empty FASTA, fewer than two sequences, ragged alignment
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// Failure at the external aligner boundary
    #[error("Alignment failed: {0}")]
    Alignment(#[from] AlignmentError),

    /// Distance computation needs at least two sequences
    #[error("Alignment has {count} sequence(s), at least 2 are required for distance computation")]
    EmptyAlignment { count: usize },

    /// Not even the identity model can compare this pair
    #[error("No comparable residues between '{first}' and '{second}'")]
    DegenerateInput { first: String, second: String },

    /// Tree construction on a matrix without taxa
    #[error("Distance matrix is empty")]
    EmptyMatrix,

    /// Tree construction needs at least two taxa
    #[error("A tree needs at least 2 taxa, got {count}")]
    InsufficientTaxa { count: usize },

    /// A hand-built matrix violating symmetry, zero diagonal or non-negativity
    #[error("Invalid distance matrix: {message}")]
    InvalidMatrix { message: String },

    /// Newick text outside the accepted grammar
    #[error("Malformed tree text at byte {position}: {message}")]
    MalformedTreeText { position: usize, message: String },

    /// Invalid CLI arguments or configuration file
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O errors while reading inputs or writing outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using PhyloError
pub type Result<T> = std::result::Result<T, PhyloError>;

impl PhyloError {
    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid matrix error
    pub fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    /// Create a tree text parse error
    pub fn malformed_tree(position: usize, message: impl Into<String>) -> Self {
        Self::MalformedTreeText {
            position,
            message: message.into(),
        }
    }

    /// Coarse classification used by the pipeline boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            PhyloError::Input { .. } => ErrorKind::InputError,
            PhyloError::Alignment(_) => ErrorKind::AlignmentError,
            PhyloError::EmptyAlignment { .. } => ErrorKind::EmptyAlignmentError,
            PhyloError::DegenerateInput { .. } => ErrorKind::DegenerateInputError,
            PhyloError::EmptyMatrix => ErrorKind::EmptyMatrixError,
            PhyloError::InsufficientTaxa { .. } => ErrorKind::InsufficientTaxaError,
            PhyloError::InvalidMatrix { .. } => ErrorKind::InputError,
            PhyloError::MalformedTreeText { .. } => ErrorKind::SerializationError,
            PhyloError::Config { .. } => ErrorKind::ConfigError,
            PhyloError::Io(_) => ErrorKind::IoError,
        }
    }
}

/// Errors raised by an aligner implementation
#[derive(Error, Debug)]
pub enum AlignmentError {
    /// No aligner binary configured or found on PATH
    #[error("no aligner available: {message}")]
    Unavailable { message: String },

    /// The aligner produced nothing usable
    #[error("aligner output is empty or unparsable: {message}")]
    Empty { message: String },

    /// The aligner did not finish in time and was killed
    #[error("aligner timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// The aligner exited with a failure status
    #[error("aligner failed: {message}")]
    Failed { message: String },

    /// Scratch file handling around the aligner
    #[error("aligner I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable failure of a substitution model on one pair.
///
/// The distance builder catches these and recomputes the whole matrix with
/// the identity model; they never reach callers of the builder.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ModelError {
    #[error("residue '{residue}' is not supported by the {model} model")]
    UnsupportedResidue { model: &'static str, residue: char },

    #[error("no comparable positions")]
    NoComparablePositions,

    #[error("{model} distance is undefined (substitutions saturated)")]
    Saturated { model: &'static str },
}

/// Error kinds reported at the pipeline boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InputError,
    AlignmentError,
    EmptyAlignmentError,
    DegenerateInputError,
    EmptyMatrixError,
    InsufficientTaxaError,
    SerializationError,
    ConfigError,
    IoError,
}

impl ErrorKind {
    /// Whether the failure is caused by the caller's data rather than processing
    pub fn is_input_class(&self) -> bool {
        matches!(
            self,
            ErrorKind::InputError
                | ErrorKind::EmptyAlignmentError
                | ErrorKind::DegenerateInputError
                | ErrorKind::InsufficientTaxaError
                | ErrorKind::SerializationError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InputError => "InputError",
            ErrorKind::AlignmentError => "AlignmentError",
            ErrorKind::EmptyAlignmentError => "EmptyAlignmentError",
            ErrorKind::DegenerateInputError => "DegenerateInputError",
            ErrorKind::EmptyMatrixError => "EmptyMatrixError",
            ErrorKind::InsufficientTaxaError => "InsufficientTaxaError",
            ErrorKind::SerializationError => "SerializationError",
            ErrorKind::ConfigError => "ConfigError",
            ErrorKind::IoError => "IoError",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PhyloError::input("x").kind(), ErrorKind::InputError);
        assert_eq!(PhyloError::EmptyMatrix.kind(), ErrorKind::EmptyMatrixError);
        assert_eq!(
            PhyloError::malformed_tree(3, "bad").kind(),
            ErrorKind::SerializationError
        );
        let err: PhyloError = AlignmentError::Timeout { limit: Duration::from_secs(5) }.into();
        assert_eq!(err.kind(), ErrorKind::AlignmentError);
        assert!(err.to_string().contains("timed out after 5s"));

        let err = AlignmentError::Timeout { limit: Duration::from_millis(200) };
        assert!(err.to_string().contains("timed out after 200ms"));
    }

    #[test]
    fn test_input_class() {
        assert!(ErrorKind::InputError.is_input_class());
        assert!(ErrorKind::InsufficientTaxaError.is_input_class());
        assert!(!ErrorKind::AlignmentError.is_input_class());
        assert!(!ErrorKind::IoError.is_input_class());
    }
}
