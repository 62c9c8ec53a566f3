// parser.rs - Strict Newick parser for trees written by this crate

use crate::core::tree::{NodeIndex, Tree};
use crate::error::{PhyloError, Result};

/// Deepest parenthesis nesting accepted before parsing stops with an error
pub const MAX_NESTING_DEPTH: usize = 2048;

/// Recursive-descent parser over the bytes of one Newick statement
struct NewickParser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
    depth: usize,
    tree: Tree,
}

impl<'a> NewickParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            text,
            pos: 0,
            depth: 0,
            tree: Tree::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> PhyloError {
        PhyloError::malformed_tree(self.pos, message)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                byte as char, b as char
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", byte as char))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_tree(mut self) -> Result<Tree> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(self.error("empty tree text"));
        }
        let root = self.parse_node(true)?;
        self.expect(b';')?;
        self.skip_whitespace();
        if self.pos != self.bytes.len() {
            return Err(self.error("unexpected text after ';'"));
        }
        self.tree.set_root(root);
        Ok(self.tree)
    }

    fn parse_node(&mut self, is_root: bool) -> Result<NodeIndex> {
        let index = if self.peek() == Some(b'(') {
            if self.depth == MAX_NESTING_DEPTH {
                return Err(self.error("tree nested too deeply"));
            }
            self.depth += 1;
            self.pos += 1;
            let mut children = vec![self.parse_node(false)?];
            while self.peek() == Some(b',') {
                self.pos += 1;
                children.push(self.parse_node(false)?);
            }
            self.expect(b')')?;
            self.depth -= 1;
            if children.len() < 2 {
                return Err(self.error("internal node needs at least 2 children"));
            }
            if matches!(self.peek(), Some(b) if !b.is_ascii_whitespace() && !b":,);".contains(&b)) {
                return Err(self.error("internal nodes cannot carry a name"));
            }
            self.tree.add_internal(children, None)
        } else {
            let name = self.parse_label()?;
            self.tree.add_leaf(name, None)
        };

        if is_root {
            if self.peek() == Some(b':') {
                return Err(self.error("root cannot carry a branch length"));
            }
        } else {
            self.expect(b':')?;
            let length = self.parse_number()?;
            self.tree.set_branch_length(index, Some(length));
        }
        Ok(index)
    }

    fn parse_label(&mut self) -> Result<String> {
        if self.peek() == Some(b'\'') {
            return self.parse_quoted_label();
        }
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b"()[]':;,".contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a leaf label"));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn parse_quoted_label(&mut self) -> Result<String> {
        self.pos += 1;
        let mut label = String::new();
        let mut start = self.pos;
        loop {
            match self.peek() {
                Some(b'\'') if self.bytes.get(self.pos + 1) == Some(&b'\'') => {
                    label.push_str(&self.text[start..=self.pos]);
                    self.pos += 2;
                    start = self.pos;
                }
                Some(b'\'') => {
                    label.push_str(&self.text[start..self.pos]);
                    self.pos += 1;
                    return Ok(label);
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("unterminated quoted label")),
            }
        }
    }

    /// Non-negative decimal: digits with an optional fractional part
    fn parse_number(&mut self) -> Result<f64> {
        let start = self.pos;
        let digits = |p: &mut Self| {
            let from = p.pos;
            while matches!(p.peek(), Some(b) if b.is_ascii_digit()) {
                p.pos += 1;
            }
            p.pos - from
        };
        if digits(self) == 0 {
            return Err(self.error("expected a non-negative branch length"));
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if digits(self) == 0 {
                return Err(self.error("expected digits after decimal point"));
            }
        }
        self.text[start..self.pos]
            .parse::<f64>()
            .map_err(|e| PhyloError::malformed_tree(start, format!("invalid branch length: {}", e)))
    }
}

/// Parse a Newick statement of the form produced by [`super::to_newick`].
///
/// Every non-root node needs a `:length`, internal nodes need at least two
/// children and no name, and the statement must end with `;` followed only
/// by whitespace.
pub fn parse_newick(text: &str) -> Result<Tree> {
    NewickParser::new(text).parse_tree()
}
