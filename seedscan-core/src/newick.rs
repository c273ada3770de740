//! Newick phylogenetic-tree parsing and pruning.
//!
//! Just enough of the format for branch-length scoring: labels, branch
//! lengths, nested clades. Pruning keeps a set of leaves and collapses the
//! unary internal nodes that pruning leaves behind, summing their branch
//! lengths, matching the usual taxon-retention behavior of phylogenetics
//! toolkits.

use std::collections::BTreeSet;

use crate::types::ScanError;

/// Node of a rooted phylogenetic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NewickNode {
    /// Taxon label; internal nodes may be unlabeled.
    pub label: Option<String>,
    /// Length of the branch leading to this node.
    pub length: Option<f64>,
    /// Child clades, empty for leaves.
    pub children: Vec<NewickNode>,
}

impl NewickNode {
    /// Parse a Newick string, e.g. `(A:1,(B:2,C:3):4);`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ParseError`] on malformed input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seedscan_core::newick::NewickNode;
    ///
    /// let tree = NewickNode::parse("(A:1,(B:2,C:3):4);")?;
    /// assert_eq!(tree.leaf_labels(), vec!["A", "B", "C"]);
    /// # Ok::<(), seedscan_core::types::ScanError>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let mut parser = Parser {
            bytes: text.trim().as_bytes(),
            pos: 0,
        };
        let node = parser.node()?;
        parser.skip_ws();
        if parser.peek() == Some(b';') {
            parser.pos += 1;
        }
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(ScanError::ParseError(format!(
                "trailing characters at offset {} in Newick input",
                parser.pos
            )));
        }
        Ok(node)
    }

    /// True for nodes without children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Labels of all leaves, left to right.
    #[must_use]
    pub fn leaf_labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        self.collect_leaf_labels(&mut labels);
        labels
    }

    fn collect_leaf_labels<'a>(&'a self, labels: &mut Vec<&'a str>) {
        if self.is_leaf() {
            if let Some(label) = &self.label {
                labels.push(label);
            }
        } else {
            for child in &self.children {
                child.collect_leaf_labels(labels);
            }
        }
    }

    /// Prune the tree down to the leaves named in `keep`.
    ///
    /// Internal nodes left with one child are collapsed into that child,
    /// branch lengths added together. Returns `None` when no kept leaf
    /// remains.
    #[must_use]
    pub fn retain_leaves(&self, keep: &BTreeSet<String>) -> Option<NewickNode> {
        if self.is_leaf() {
            let label = self.label.as_ref()?;
            if keep.contains(label) {
                return Some(self.clone());
            }
            return None;
        }
        let mut kept: Vec<NewickNode> = self
            .children
            .iter()
            .filter_map(|c| c.retain_leaves(keep))
            .collect();
        match kept.len() {
            0 => None,
            1 => {
                let mut child = kept.remove(0);
                child.length = match (self.length, child.length) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
                Some(child)
            }
            _ => Some(NewickNode {
                label: self.label.clone(),
                length: self.length,
                children: kept,
            }),
        }
    }

    /// Sum of all branch lengths below this node. The branch leading to
    /// this node itself is not counted.
    #[must_use]
    pub fn branch_length_sum(&self) -> f64 {
        self.children
            .iter()
            .map(|c| c.length.unwrap_or(0.0) + c.branch_length_sum())
            .sum()
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn node(&mut self) -> Result<NewickNode, ScanError> {
        self.skip_ws();
        let mut children = Vec::new();
        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                children.push(self.node()?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => {
                        return Err(ScanError::ParseError(format!(
                            "expected ',' or ')' at offset {} in Newick input",
                            self.pos
                        )))
                    }
                }
            }
        }
        let label = self.label();
        let length = self.length()?;
        Ok(NewickNode {
            label,
            length,
            children,
        })
    }

    fn label(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, b':' | b',' | b'(' | b')' | b';') && !c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
        }
    }

    fn length(&mut self) -> Result<Option<f64>, ScanError> {
        self.skip_ws();
        if self.peek() != Some(b':') {
            return Ok(None);
        }
        self.pos += 1;
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| matches!(c, b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|e| ScanError::ParseError(e.to_string()))?;
        let value: f64 = text.parse().map_err(|_| {
            ScanError::ParseError(format!("invalid branch length '{text}' in Newick input"))
        })?;
        Ok(Some(value))
    }
}
