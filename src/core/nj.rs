// nj.rs - Neighbor-joining tree construction (Saitou & Nei, 1987)

use log::{debug, info};

use crate::core::distance::DistanceMatrix;
use crate::core::tree::{NodeIndex, Tree};
use crate::error::{PhyloError, Result};

/// Relative tolerance under which two Q values are treated as tied
const TIE_EPSILON: f64 = 1e-12;

/// Truncate negative branch lengths to zero (also normalises `-0.0`)
#[inline]
fn clamp_length(length: f64) -> f64 {
    if length > 0.0 {
        length
    } else {
        0.0
    }
}

/// Builds unrooted binary trees from distance matrices by neighbor-joining.
///
/// The result is drawn from the last internal node created, so a tree on
/// n ≥ 3 taxa has n leaves and n - 2 anonymous internal nodes, the root
/// carrying three children. Negative raw branch lengths are clamped to 0.
///
/// The final pair is not split: the last remaining cluster hangs off the
/// last internal node with the full distance between the two.
///
/// Two taxa give `(A:d/2,B:d/2);`. Internal nodes always have at least two
/// children, so the single edge of length `d` is drawn as two halves under
/// an anonymous root; the leaf-to-leaf path length is still `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborJoiningTreeBuilder;

impl NeighborJoiningTreeBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, matrix: &DistanceMatrix) -> Result<Tree> {
        let n = matrix.len();
        match n {
            0 => return Err(PhyloError::EmptyMatrix),
            1 => return Err(PhyloError::InsufficientTaxa { count: 1 }),
            _ => {}
        }

        let mut tree = Tree::with_capacity(2 * n - 2);
        for name in matrix.names() {
            tree.add_leaf(name.clone(), None);
        }

        if n == 2 {
            let half = clamp_length(matrix.get(0, 1) / 2.0);
            tree.set_branch_length(0, Some(half));
            tree.set_branch_length(1, Some(half));
            let root = tree.add_internal(vec![0, 1], None);
            tree.set_root(root);
            return Ok(tree);
        }

        // Working copy addressed by slot; a joined cluster reuses the slot of
        // its lower-indexed member
        let mut dist: Vec<Vec<f64>> = (0..n).map(|i| matrix.row(i).to_vec()).collect();
        let mut node_of: Vec<NodeIndex> = (0..n).collect();
        let mut active: Vec<usize> = (0..n).collect();
        let mut last_internal = 0;

        while active.len() > 2 {
            let m = active.len();
            let row_sums: Vec<f64> = active
                .iter()
                .map(|&x| active.iter().map(|&y| dist[x][y]).sum())
                .collect();

            let (a, b) = Self::select_pair(&active, &dist, &row_sums);
            let (i, j) = (active[a], active[b]);
            let d_ij = dist[i][j];

            let raw_i = d_ij / 2.0 + (row_sums[a] - row_sums[b]) / (2.0 * (m - 2) as f64);
            let raw_j = d_ij - raw_i;
            tree.set_branch_length(node_of[i], Some(clamp_length(raw_i)));
            tree.set_branch_length(node_of[j], Some(clamp_length(raw_j)));

            let u = tree.add_internal(vec![node_of[i], node_of[j]], None);
            debug!(
                "Joined nodes {} and {} into {} (lengths {:.5}, {:.5}; {} clusters left)",
                node_of[i],
                node_of[j],
                u,
                clamp_length(raw_i),
                clamp_length(raw_j),
                m - 1
            );

            for &k in &active {
                if k != i && k != j {
                    let d_uk = (dist[i][k] + dist[j][k] - d_ij) / 2.0;
                    dist[i][k] = d_uk;
                    dist[k][i] = d_uk;
                }
            }
            dist[i][i] = 0.0;
            node_of[i] = u;
            active.remove(b);
            last_internal = u;
        }

        // The remaining cluster hangs off the last join with the full distance
        let (x, y) = (active[0], active[1]);
        let remaining = if node_of[x] == last_internal { y } else { x };
        let length = clamp_length(dist[x][y]);
        tree.set_branch_length(node_of[remaining], Some(length));
        tree.add_child(last_internal, node_of[remaining]);
        tree.set_root(last_internal);

        info!(
            "Neighbor-joining tree built: {} leaves, {} internal nodes",
            tree.num_leaves(),
            tree.num_internal()
        );
        Ok(tree)
    }

    /// Positions in `active` of the pair minimising the Q criterion.
    ///
    /// Pairs are scanned in active-set order and a later pair only replaces
    /// the current best if it is strictly smaller beyond the tie tolerance,
    /// so ties resolve to the lowest index pair.
    fn select_pair(active: &[usize], dist: &[Vec<f64>], row_sums: &[f64]) -> (usize, usize) {
        let m = active.len();
        let scale = (m - 2) as f64;
        let mut best = (0, 1);
        let mut best_q = f64::INFINITY;

        for a in 0..m {
            for b in (a + 1)..m {
                let q = scale * dist[active[a]][active[b]] - row_sums[a] - row_sums[b];
                if best_q.is_infinite() || q < best_q - TIE_EPSILON * best_q.abs().max(1.0) {
                    best_q = q;
                    best = (a, b);
                }
            }
        }
        best
    }
}

/// Build a neighbor-joining tree with the default builder
pub fn neighbor_joining(matrix: &DistanceMatrix) -> Result<Tree> {
    NeighborJoiningTreeBuilder::new().build(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(names: &[&str], rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::new(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    fn leaf_length(tree: &Tree, name: &str) -> f64 {
        let index = tree.find_leaf(name).unwrap();
        tree.node(index).branch_length.unwrap()
    }

    #[test]
    fn test_three_taxa_closed_form() {
        let m = matrix(
            &["A", "B", "C"],
            vec![
                vec![0.0, 0.1, 0.3],
                vec![0.1, 0.0, 0.4],
                vec![0.3, 0.4, 0.0],
            ],
        );
        let tree = neighbor_joining(&m).unwrap();
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.num_internal(), 1);

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).children.len(), 3);
        assert!(tree.node(root).name.is_none());

        // len(u,A) = (d(A,B) + d(A,C) - d(B,C)) / 2 and so on
        assert!((leaf_length(&tree, "A") - 0.0).abs() < 1e-9);
        assert!((leaf_length(&tree, "B") - 0.1).abs() < 1e-9);
        assert!((leaf_length(&tree, "C") - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_additive_matrix_is_recovered() {
        // ((A:1,B:2):1,C:3,(D:1,E:1):2)
        let names = ["A", "B", "C", "D", "E"];
        let m = matrix(
            &names,
            vec![
                vec![0.0, 3.0, 5.0, 5.0, 5.0],
                vec![3.0, 0.0, 6.0, 6.0, 6.0],
                vec![5.0, 6.0, 0.0, 6.0, 6.0],
                vec![5.0, 6.0, 6.0, 0.0, 2.0],
                vec![5.0, 6.0, 6.0, 2.0, 0.0],
            ],
        );
        let tree = neighbor_joining(&m).unwrap();
        assert_eq!(tree.num_leaves(), 5);
        assert_eq!(tree.num_internal(), 3);
        assert!(tree.is_unrooted_binary());

        for (i, a) in names.iter().enumerate() {
            for (j, b) in names.iter().enumerate() {
                let path = tree.path_length(tree.find_leaf(a).unwrap(), tree.find_leaf(b).unwrap());
                assert!(
                    (path - m.get(i, j)).abs() < 1e-9,
                    "path {}-{} is {}, expected {}",
                    a,
                    b,
                    path,
                    m.get(i, j)
                );
            }
        }
    }

    #[test]
    fn test_negative_lengths_clamped() {
        // Violates the triangle inequality: raw len(u,A) = -0.5
        let m = matrix(
            &["A", "B", "C"],
            vec![
                vec![0.0, 1.0, 1.0],
                vec![1.0, 0.0, 3.0],
                vec![1.0, 3.0, 0.0],
            ],
        );
        let tree = neighbor_joining(&m).unwrap();
        let a = leaf_length(&tree, "A");
        assert_eq!(a, 0.0);
        assert!(a.is_sign_positive());
        assert!(tree.branch_lengths().iter().all(|&l| l >= 0.0));
    }

    #[test]
    fn test_topology_invariants() {
        let names: Vec<String> = (0..8).map(|i| format!("t{}", i)).collect();
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i: i32| {
                (0..8)
                    .map(|j: i32| if i == j { 0.0 } else { ((i - j).abs() as f64).sqrt() + 0.1 })
                    .collect()
            })
            .collect();
        let m = DistanceMatrix::new(names.clone(), rows).unwrap();
        let tree = neighbor_joining(&m).unwrap();

        assert_eq!(tree.num_leaves(), 8);
        assert_eq!(tree.num_internal(), 6);
        assert!(tree.is_unrooted_binary());
        assert!(tree.branch_lengths().iter().all(|&l| l >= 0.0));

        let mut leaves: Vec<&str> = tree.leaf_names();
        leaves.sort_unstable();
        let mut expected: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(leaves, expected);
        for node in tree.nodes() {
            assert_eq!(node.is_leaf(), node.name.is_some());
        }
    }

    #[test]
    fn test_deterministic() {
        let m = matrix(
            &["A", "B", "C", "D"],
            vec![
                vec![0.0, 0.2, 0.2, 0.2],
                vec![0.2, 0.0, 0.2, 0.2],
                vec![0.2, 0.2, 0.0, 0.2],
                vec![0.2, 0.2, 0.2, 0.0],
            ],
        );
        let first = neighbor_joining(&m).unwrap();
        let second = neighbor_joining(&m).unwrap();
        assert_eq!(first, second);

        // All Q values tie, so the first pair in index order is joined
        let first_join = first.node(4);
        assert_eq!(first_join.children, vec![0, 1]);
    }

    #[test]
    fn test_two_taxa() {
        let m = matrix(&["A", "B"], vec![vec![0.0, 0.4], vec![0.4, 0.0]]);
        let tree = neighbor_joining(&m).unwrap();
        assert_eq!(tree.num_leaves(), 2);
        assert_eq!(tree.num_internal(), 1);
        assert!((leaf_length(&tree, "A") - 0.2).abs() < 1e-12);
        assert!((leaf_length(&tree, "B") - 0.2).abs() < 1e-12);
        assert!(tree.is_unrooted_binary());

        // One edge of length d(A,B), drawn as two halves under the root
        let (a, b) = (tree.find_leaf("A").unwrap(), tree.find_leaf("B").unwrap());
        assert!((tree.path_length(a, b) - 0.4).abs() < 1e-12);
        assert_eq!(crate::newick::to_newick(&tree), "(A:0.20000,B:0.20000);");
    }

    #[test]
    fn test_too_few_taxa() {
        let one = matrix(&["A"], vec![vec![0.0]]);
        assert!(matches!(
            neighbor_joining(&one),
            Err(PhyloError::InsufficientTaxa { count: 1 })
        ));
        let empty = DistanceMatrix::new(Vec::new(), Vec::new()).unwrap();
        assert!(matches!(neighbor_joining(&empty), Err(PhyloError::EmptyMatrix)));
    }
}
