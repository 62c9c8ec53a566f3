// mod.rs - Newick tree serialisation
//
// Grammar accepted by the parser, which is exactly what the writer emits:
//   tree     ::= node ';'
//   node     ::= internal | leaf
//   internal ::= '(' node (',' node)+ ')'
//   leaf     ::= label | quoted_label
//   (every non-root node is followed by ':' length; the root never is)

pub mod parser;
pub mod writer;

pub use parser::parse_newick;
pub use writer::{escape_label, to_newick, to_newick_with_precision, write_newick_file, BRANCH_LENGTH_PRECISION};
