// writer.rs - Tree to Newick text

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::tree::{NodeIndex, Tree};
use crate::error::Result;

/// Decimal places used for branch lengths
pub const BRANCH_LENGTH_PRECISION: usize = 5;

/// Characters that force a label into single quotes
const SPECIAL_CHARS: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ','];

/// Quote a label if it is empty or contains Newick punctuation or whitespace.
/// Embedded single quotes are doubled.
pub fn escape_label(label: &str) -> String {
    if label.is_empty() || label.chars().any(|c| c.is_whitespace() || SPECIAL_CHARS.contains(&c)) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Serialise a tree as a single-line Newick statement terminated by `;`.
///
/// Leaves render as `name:length`, internal nodes as `(children):length`
/// without a name token, and the root omits its length. Branch lengths use
/// a fixed number of decimals so identical trees give identical text.
///
/// ```
/// use njtree::core::tree::Tree;
/// use njtree::newick::to_newick;
///
/// let mut tree = Tree::new();
/// let a = tree.add_leaf("A", Some(0.1));
/// let b = tree.add_leaf("B", Some(0.25));
/// let root = tree.add_internal(vec![a, b], None);
/// tree.set_root(root);
/// assert_eq!(to_newick(&tree), "(A:0.10000,B:0.25000);");
/// ```
pub fn to_newick(tree: &Tree) -> String {
    to_newick_with_precision(tree, BRANCH_LENGTH_PRECISION)
}

pub fn to_newick_with_precision(tree: &Tree, precision: usize) -> String {
    fn push_length(newick: &mut String, length: Option<f64>, precision: usize) {
        if let Some(length) = length {
            newick.push(':');
            newick.push_str(&format!("{:.*}", precision, length));
        }
    }

    fn build(tree: &Tree, newick: &mut String, index: NodeIndex, is_root: bool, precision: usize) {
        let node = tree.node(index);
        if node.is_leaf() {
            newick.push_str(&escape_label(node.name.as_deref().unwrap_or("")));
        } else {
            newick.push('(');
            for (k, &child) in node.children.iter().enumerate() {
                if k > 0 {
                    newick.push(',');
                }
                build(tree, newick, child, false, precision);
            }
            newick.push(')');
        }
        if !is_root {
            push_length(newick, node.branch_length, precision);
        }
    }

    // Roughly: label + ":0.00000" + punctuation per node
    let mut newick = String::with_capacity(tree.num_nodes() * 16);
    if let Some(root) = tree.root() {
        build(tree, &mut newick, root, true, precision);
    }
    newick.push(';');
    newick
}

/// Write one tree per file, followed by a newline, creating parent directories
pub fn write_newick_file(path: &Path, tree: &Tree) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(to_newick(tree).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("seq_1"), "seq_1");
        assert_eq!(escape_label("Homo sapiens"), "'Homo sapiens'");
        assert_eq!(escape_label("a:b"), "'a:b'");
        assert_eq!(escape_label("O'Brien"), "'O''Brien'");
        assert_eq!(escape_label(""), "''");
    }

    #[test]
    fn test_nested_tree() {
        let mut tree = Tree::new();
        let a = tree.add_leaf("A", Some(0.0));
        let b = tree.add_leaf("B", Some(0.123456));
        let c = tree.add_leaf("C", Some(1.5));
        let ab = tree.add_internal(vec![a, b], Some(0.25));
        let root = tree.add_internal(vec![ab, c], None);
        tree.set_root(root);
        assert_eq!(to_newick(&tree), "((A:0.00000,B:0.12346):0.25000,C:1.50000);");
        assert_eq!(to_newick_with_precision(&tree, 2), "((A:0.00,B:0.12):0.25,C:1.50);");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(to_newick(&Tree::new()), ";");
    }
}
