// distance.rs - Pairwise distance matrix construction

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use crate::data::{Alignment, Alphabet};
use crate::error::{ModelError, PhyloError, Result};
use crate::models::{ModelKind, ModelRegistry, SubstitutionModel};

/// Symmetric matrix of pairwise distances keyed by taxon names.
///
/// The diagonal is zero and every entry is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    names: Vec<String>,
    values: Vec<f64>,
    model: Option<ModelKind>,
}

impl DistanceMatrix {
    /// Build from full square rows, validating every matrix invariant
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = names.len();
        if rows.len() != n {
            return Err(PhyloError::invalid_matrix(format!(
                "{} names but {} rows",
                n,
                rows.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(PhyloError::invalid_matrix(format!(
                    "duplicate taxon name '{}'",
                    name
                )));
            }
        }

        let mut values = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(PhyloError::invalid_matrix(format!(
                    "row '{}' has {} columns, expected {}",
                    names[i],
                    row.len(),
                    n
                )));
            }
            values.extend_from_slice(row);
        }

        for i in 0..n {
            if values[i * n + i] != 0.0 {
                return Err(PhyloError::invalid_matrix(format!(
                    "non-zero diagonal for '{}'",
                    names[i]
                )));
            }
            for j in 0..n {
                let d = values[i * n + j];
                if !d.is_finite() || d < 0.0 {
                    return Err(PhyloError::invalid_matrix(format!(
                        "distance between '{}' and '{}' must be finite and non-negative, got {}",
                        names[i], names[j], d
                    )));
                }
                if d != values[j * n + i] {
                    return Err(PhyloError::invalid_matrix(format!(
                        "asymmetric distance between '{}' and '{}'",
                        names[i], names[j]
                    )));
                }
            }
        }

        Ok(Self {
            names,
            values,
            model: None,
        })
    }

    /// Assemble from upper-triangle distances in `(0,1), (0,2), .., (n-2,n-1)` order
    fn from_upper_triangle(names: Vec<String>, upper: &[f64], model: ModelKind) -> Self {
        let n = names.len();
        let mut values = vec![0.0; n * n];
        let mut pairs = upper.iter();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = pairs.next().copied().unwrap_or(0.0);
                values[i * n + j] = d;
                values[j * n + i] = d;
            }
        }
        Self {
            names,
            values,
            model: Some(model),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Distance between taxa `i` and `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.names.len() + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.names.len();
        &self.values[i * n..(i + 1) * n]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get_by_name(&self, first: &str, second: &str) -> Option<f64> {
        Some(self.get(self.index_of(first)?, self.index_of(second)?))
    }

    /// Model that produced the matrix, `None` for hand-built matrices
    pub fn model(&self) -> Option<ModelKind> {
        self.model
    }
}

/// How the builder chooses the preferred model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelPolicy {
    /// Kimura for nucleotide alignments, BLOSUM62 otherwise
    #[default]
    Auto,
    /// Always prefer the given model
    Fixed(ModelKind),
}

impl FromStr for ModelPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(ModelPolicy::Auto)
        } else {
            s.parse::<ModelKind>()
                .map(ModelPolicy::Fixed)
                .map_err(|_| format!("Invalid model: {}. Use: auto, identity, kimura, blosum62", s))
        }
    }
}

impl fmt::Display for ModelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelPolicy::Auto => write!(f, "auto"),
            ModelPolicy::Fixed(kind) => write!(f, "{}", kind),
        }
    }
}

/// Model failure together with the pair it happened on, if any
#[derive(Debug)]
struct PairFailure {
    error: ModelError,
    pair: Option<(usize, usize)>,
}

/// Builds distance matrices with a preferred model and an identity fallback
#[derive(Debug)]
pub struct DistanceMatrixBuilder {
    registry: ModelRegistry,
    policy: ModelPolicy,
}

impl Default for DistanceMatrixBuilder {
    fn default() -> Self {
        Self::new(ModelPolicy::Auto)
    }
}

impl DistanceMatrixBuilder {
    pub fn new(policy: ModelPolicy) -> Self {
        Self::with_registry(ModelRegistry::new(), policy)
    }

    pub fn with_registry(registry: ModelRegistry, policy: ModelPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn policy(&self) -> ModelPolicy {
        self.policy
    }

    /// Preferred model for an alignment under the current policy
    pub fn select_model(&self, alignment: &Alignment) -> ModelKind {
        match self.policy {
            ModelPolicy::Fixed(kind) => kind,
            ModelPolicy::Auto => match alignment.alphabet() {
                Alphabet::Nucleotide => ModelKind::Kimura,
                Alphabet::AminoAcid => ModelKind::Blosum62,
            },
        }
    }

    /// Compute the full distance matrix for an alignment.
    ///
    /// The preferred model is tried first over every pair. If it fails
    /// anywhere, its results are discarded and the whole matrix is recomputed
    /// with the identity model. Only a pair that even identity cannot compare
    /// is an error.
    pub fn build(&self, alignment: &Alignment) -> Result<DistanceMatrix> {
        if alignment.len() < 2 {
            return Err(PhyloError::EmptyAlignment {
                count: alignment.len(),
            });
        }

        let start = Instant::now();
        let preferred = self.select_model(alignment);
        info!(
            "Computing {} x {} distance matrix ({} alphabet, preferred model: {})",
            alignment.len(),
            alignment.len(),
            alignment.alphabet(),
            preferred
        );

        let matrix = match self.try_model(preferred, alignment) {
            Ok(matrix) => matrix,
            Err(failure) if preferred != ModelKind::Identity => {
                match failure.pair {
                    Some((i, j)) => warn!(
                        "{} model failed between '{}' and '{}': {}. Falling back to identity model",
                        preferred,
                        alignment.sequences()[i].id,
                        alignment.sequences()[j].id,
                        failure.error
                    ),
                    None => warn!(
                        "{} model is not applicable to this alignment: {}. Falling back to identity model",
                        preferred, failure.error
                    ),
                }
                self.try_model(ModelKind::Identity, alignment)
                    .map_err(|failure| Self::degenerate(alignment, failure))?
            }
            Err(failure) => return Err(Self::degenerate(alignment, failure)),
        };

        info!(
            "Distance matrix computed with {} model in {:.3}s",
            matrix.model().map(|m| m.key()).unwrap_or("unknown"),
            start.elapsed().as_secs_f64()
        );
        Ok(matrix)
    }

    fn model(&self, kind: ModelKind) -> &dyn SubstitutionModel {
        match self.registry.get(kind) {
            Some(model) => model,
            None => {
                // A custom registry may omit models; the built-ins are always valid
                static IDENTITY: crate::models::IdentityModel = crate::models::IdentityModel;
                static KIMURA: crate::models::KimuraModel = crate::models::KimuraModel;
                static BLOSUM: crate::models::Blosum62Model = crate::models::Blosum62Model;
                match kind {
                    ModelKind::Identity => &IDENTITY,
                    ModelKind::Kimura => &KIMURA,
                    ModelKind::Blosum62 => &BLOSUM,
                }
            }
        }
    }

    /// Run one model over every pair; any failure aborts the whole attempt
    fn try_model(
        &self,
        kind: ModelKind,
        alignment: &Alignment,
    ) -> std::result::Result<DistanceMatrix, PairFailure> {
        let model = self.model(kind);
        model
            .check_alphabet(&alignment.residue_set())
            .map_err(|error| PairFailure { error, pair: None })?;

        let sequences = alignment.sequences();
        let n = sequences.len();
        let mut upper = Vec::with_capacity(n * (n - 1) / 2);

        for i in 0..n {
            for j in (i + 1)..n {
                let d = model
                    .distance(&sequences[i].residues, &sequences[j].residues)
                    .map_err(|error| PairFailure {
                        error,
                        pair: Some((i, j)),
                    })?;
                debug!(
                    "Distance between {} and {}: {}",
                    sequences[i].id, sequences[j].id, d
                );
                upper.push(d);
            }
        }

        Ok(DistanceMatrix::from_upper_triangle(
            alignment.ids(),
            &upper,
            kind,
        ))
    }

    fn degenerate(alignment: &Alignment, failure: PairFailure) -> PhyloError {
        match failure.pair {
            Some((i, j)) => PhyloError::DegenerateInput {
                first: alignment.sequences()[i].id.clone(),
                second: alignment.sequences()[j].id.clone(),
            },
            None => PhyloError::input(format!("identity model rejected alignment: {}", failure.error)),
        }
    }
}

/// Compute a distance matrix with the default (alphabet-driven) policy
pub fn calculate_distance_matrix(alignment: &Alignment) -> Result<DistanceMatrix> {
    DistanceMatrixBuilder::default().build(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sequence;

    fn alignment(rows: &[(&str, &str)]) -> Alignment {
        Alignment::new(rows.iter().map(|(id, r)| Sequence::new(*id, r)).collect()).unwrap()
    }

    fn assert_valid(matrix: &DistanceMatrix) {
        for i in 0..matrix.len() {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                assert!(matrix.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn test_nucleotide_alignment_uses_kimura() {
        let aln = alignment(&[
            ("a", "ACGTACGTAC"),
            ("b", "ACGTACGTAT"),
            ("c", "ACGAACGTAC"),
        ]);
        let matrix = calculate_distance_matrix(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Kimura));
        assert_eq!(matrix.names(), &["a", "b", "c"]);
        assert_valid(&matrix);
        // a/b differ by one C<->T transition in 10 columns
        assert!((matrix.get_by_name("a", "b").unwrap() - 0.111_571_775_657_104_9).abs() < 1e-9);
    }

    #[test]
    fn test_protein_alignment_uses_blosum() {
        let aln = alignment(&[("p1", "MKVLAW"), ("p2", "MKILAW"), ("p3", "MRVLSW")]);
        let matrix = calculate_distance_matrix(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Blosum62));
        assert_valid(&matrix);
    }

    #[test]
    fn test_saturated_pair_falls_back_to_identity() {
        let aln = alignment(&[("a", "ACGT"), ("b", "CATG"), ("c", "ACGA")]);
        let matrix = calculate_distance_matrix(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Identity));
        // Whole matrix is identity-based, including pairs Kimura could handle
        assert_eq!(matrix.get_by_name("a", "c"), Some(0.25));
        assert_eq!(matrix.get_by_name("a", "b"), Some(1.0));
        assert_valid(&matrix);
    }

    #[test]
    fn test_all_n_sequence_falls_back_to_identity() {
        let aln = alignment(&[("a", "ACGT"), ("b", "NNNN"), ("c", "ACGA")]);
        let matrix = calculate_distance_matrix(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Identity));
        assert_eq!(matrix.get_by_name("a", "b"), Some(1.0));
    }

    #[test]
    fn test_unsupported_protein_residue_falls_back() {
        let aln = alignment(&[("a", "MKJL"), ("b", "MKVL")]);
        let matrix = calculate_distance_matrix(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Identity));
        assert_eq!(matrix.get(0, 1), 0.25);
    }

    #[test]
    fn test_fully_gapped_pair_is_degenerate() {
        let aln = alignment(&[("a", "AC--"), ("b", "--GT"), ("c", "ACGT")]);
        let err = calculate_distance_matrix(&aln).unwrap_err();
        match err {
            PhyloError::DegenerateInput { first, second } => {
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_too_few_sequences() {
        let aln = alignment(&[("a", "ACGT")]);
        assert!(matches!(
            calculate_distance_matrix(&aln),
            Err(PhyloError::EmptyAlignment { count: 1 })
        ));
        let empty = Alignment::new(Vec::new()).unwrap();
        assert!(matches!(
            calculate_distance_matrix(&empty),
            Err(PhyloError::EmptyAlignment { count: 0 })
        ));
    }

    #[test]
    fn test_fixed_policy() {
        let aln = alignment(&[("a", "ACGTACGTAC"), ("b", "ACGTACGTAT")]);
        let builder = DistanceMatrixBuilder::new(ModelPolicy::Fixed(ModelKind::Identity));
        let matrix = builder.build(&aln).unwrap();
        assert_eq!(matrix.model(), Some(ModelKind::Identity));
        assert_eq!(matrix.get(0, 1), 0.1);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("auto".parse::<ModelPolicy>(), Ok(ModelPolicy::Auto));
        assert_eq!(
            "k2p".parse::<ModelPolicy>(),
            Ok(ModelPolicy::Fixed(ModelKind::Kimura))
        );
        assert!("nope".parse::<ModelPolicy>().is_err());
        assert_eq!(ModelPolicy::Fixed(ModelKind::Blosum62).to_string(), "blosum62");
    }

    #[test]
    fn test_hand_built_matrix_validation() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert!(DistanceMatrix::new(names.clone(), vec![vec![0.0, 1.0], vec![1.0, 0.0]]).is_ok());
        assert!(DistanceMatrix::new(names.clone(), vec![vec![0.0, 1.0], vec![2.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(names.clone(), vec![vec![0.5, 1.0], vec![1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(names.clone(), vec![vec![0.0, -1.0], vec![-1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(names, vec![vec![0.0, 1.0]]).is_err());
    }
}
