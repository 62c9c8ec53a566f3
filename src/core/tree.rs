// tree.rs - Arena-backed phylogenetic tree

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

/// Index of a node in the tree's node arena
pub type NodeIndex = usize;

/// A leaf (named, no children) or an internal node (anonymous, ≥2 children).
///
/// The branch length is stored on the child and describes the edge to its
/// parent; the root has none.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub children: Vec<NodeIndex>,
    pub branch_length: Option<f64>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree stored as a flat vector of nodes addressed by index.
///
/// Built bottom-up: children are always added before their parent, and the
/// root is the last node added with [`Tree::set_root`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeIndex>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    pub fn add_leaf(&mut self, name: impl Into<String>, branch_length: Option<f64>) -> NodeIndex {
        self.nodes.push(Node {
            name: Some(name.into()),
            children: Vec::new(),
            branch_length,
        });
        self.nodes.len() - 1
    }

    pub fn add_internal(&mut self, children: Vec<NodeIndex>, branch_length: Option<f64>) -> NodeIndex {
        self.nodes.push(Node {
            name: None,
            children,
            branch_length,
        });
        self.nodes.len() - 1
    }

    pub fn set_branch_length(&mut self, index: NodeIndex, length: Option<f64>) {
        self.nodes[index].branch_length = length;
    }

    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[parent].children.push(child);
    }

    pub fn set_root(&mut self, index: NodeIndex) {
        self.nodes[index].branch_length = None;
        self.root = Some(index);
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn num_internal(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_leaf()).count()
    }

    /// Nodes reachable from the root, parents before children, children in order
    pub fn pre_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeIndex> = self.root.into_iter().collect();
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index].children.iter().rev().copied());
        }
        order
    }

    /// Leaf names in pre-order
    pub fn leaf_names(&self) -> Vec<&str> {
        self.pre_order()
            .into_iter()
            .filter_map(|i| {
                let node = &self.nodes[i];
                if node.is_leaf() {
                    node.name.as_deref()
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn find_leaf(&self, name: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.is_leaf() && n.name.as_deref() == Some(name))
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.children.contains(&index))
    }

    /// Branch lengths of every non-root node, in pre-order
    pub fn branch_lengths(&self) -> Vec<f64> {
        self.pre_order()
            .into_iter()
            .filter_map(|i| self.nodes[i].branch_length)
            .collect()
    }

    pub fn total_branch_length(&self) -> f64 {
        self.branch_lengths().iter().sum()
    }

    pub fn max_branch_length(&self) -> Option<f64> {
        self.branch_lengths().into_iter().reduce(f64::max)
    }

    /// Path length between two nodes through their lowest common ancestor
    pub fn path_length(&self, a: NodeIndex, b: NodeIndex) -> f64 {
        let ancestors_of = |mut i: NodeIndex| {
            let mut path = vec![i];
            while let Some(p) = self.parent(i) {
                path.push(p);
                i = p;
            }
            path
        };
        let path_a = ancestors_of(a);
        let path_b = ancestors_of(b);
        let on_b: HashSet<NodeIndex> = path_b.iter().copied().collect();

        let mut total = 0.0;
        let mut lca = a;
        for &i in &path_a {
            if on_b.contains(&i) {
                lca = i;
                break;
            }
            total += self.nodes[i].branch_length.unwrap_or(0.0);
        }
        for &i in &path_b {
            if i == lca {
                break;
            }
            total += self.nodes[i].branch_length.unwrap_or(0.0);
        }
        total
    }

    /// Whether the tree is an unrooted binary tree drawn from one internal
    /// node: for n ≥ 3 leaves the root has three children, every other
    /// internal node two, giving n - 2 internal nodes. Two-leaf trees are a
    /// single root joining both leaves.
    pub fn is_unrooted_binary(&self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let leaves = self.num_leaves();
        let expected_root_degree = if leaves == 2 { 2 } else { 3 };

        self.nodes.iter().enumerate().all(|(i, node)| {
            node.is_leaf()
                || node.children.len() == if i == root { expected_root_degree } else { 2 }
        }) && (leaves == 2 && self.num_internal() == 1 || leaves >= 3 && self.num_internal() == leaves - 2)
    }
}

/// Summary statistics of a tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStats {
    pub leaves: usize,
    pub internal_nodes: usize,
    pub total_branch_length: f64,
    pub max_branch_length: Option<f64>,
    pub unrooted_binary: bool,
    pub duplicate_leaves: Vec<String>,
}

impl TreeStats {
    pub fn from_tree(tree: &Tree) -> Self {
        let mut seen = HashSet::new();
        let duplicates: BTreeSet<String> = tree
            .leaf_names()
            .into_iter()
            .filter(|name| !seen.insert(*name))
            .map(str::to_string)
            .collect();

        Self {
            leaves: tree.num_leaves(),
            internal_nodes: tree.num_internal(),
            total_branch_length: tree.total_branch_length(),
            max_branch_length: tree.max_branch_length(),
            unrooted_binary: tree.is_unrooted_binary(),
            duplicate_leaves: duplicates.into_iter().collect(),
        }
    }
}

/// Leaf names that differ between a tree and a set of expected taxa
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeafComparison {
    pub missing_from_tree: Vec<String>,
    pub unexpected_in_tree: Vec<String>,
}

impl LeafComparison {
    pub fn new<'a, I>(tree: &Tree, expected: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let leaves: BTreeSet<&str> = tree.leaf_names().into_iter().collect();
        let expected: BTreeSet<&str> = expected.into_iter().collect();
        Self {
            missing_from_tree: expected.difference(&leaves).map(|s| s.to_string()).collect(),
            unexpected_in_tree: leaves.difference(&expected).map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.missing_from_tree.is_empty() && self.unexpected_in_tree.is_empty()
    }
}
