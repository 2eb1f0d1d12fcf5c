use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

use crate::algorithms::priority_queue::{Prioritized, PriorityQueue};
use crate::compressor::HuffError;

if_tracing! {
    use tracing::debug;
}

/// Width of one input unit.
pub const BITS_PER_WORD: u32 = 8;
/// Width of the fixed-size integer fields in the compressed stream.
pub const BITS_PER_INT: u32 = 32;
pub const ALPHABET_SIZE: usize = 1 << BITS_PER_WORD;
/// Leaf value marking the end of the body. One past the largest real symbol.
pub const PSEUDO_EOF: Symbol = ALPHABET_SIZE as Symbol;
/// Width of a leaf value in the standard tree format, wide enough for [`PSEUDO_EOF`].
pub const LEAF_VALUE_BITS: u32 = BITS_PER_WORD + 1;

/// A tree over the full alphabet has at most this many leaves, and twice as many nodes minus one.
const MAX_LEAVES: usize = ALPHABET_SIZE + 1;
const MAX_NODES: usize = 2 * MAX_LEAVES - 1;
/// Upper bound on the length of any serialized tree.
pub const MAX_TREE_BITS: usize = MAX_NODES + MAX_LEAVES * LEAF_VALUE_BITS as usize;

pub type Symbol = u16;

/// The bit string assigned to a symbol: its path from the root, left = `0`, right = `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code(Vec<bool>);

impl Code {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    #[cfg(test)]
    pub fn starts_with(&self, prefix: &Code) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        value: Symbol,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub const fn leaf(value: Symbol, weight: u64) -> Self {
        HuffNode::Leaf { weight, value }
    }

    pub const fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// `a` becomes the left child.
    pub fn merge(a: Self, b: Self) -> Self {
        HuffNode::Internal {
            weight: a.weight() + b.weight(),
            left: Box::new(a),
            right: Box::new(b),
        }
    }
}

impl Prioritized for HuffNode {
    fn priority(&self) -> u64 {
        self.weight()
    }
}

/// A full binary prefix-code tree with one leaf per symbol in use plus one for [`PSEUDO_EOF`].
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    root: HuffNode,
    size: usize,
    num_values: usize,
}

impl HuffmanTree {
    /// Builds a tree from a frequency table, where `freqs[i]` is the number of occurrences of symbol `i`.
    ///
    /// Symbols with a zero count get no leaf. A leaf for [`PSEUDO_EOF`] with weight 1 is always added.
    ///
    /// # Errors
    ///
    /// [`HuffError::InvalidArgument`] if the table is wider than the alphabet or has no positive entry.
    pub fn from_frequencies(freqs: &[u64]) -> Result<Self, HuffError> {
        if freqs.len() > ALPHABET_SIZE {
            return Err(HuffError::InvalidArgument(format!(
                "frequency table has {} entries, alphabet has {}",
                freqs.len(),
                ALPHABET_SIZE
            )));
        }

        let mut queue = PriorityQueue::new();
        for (value, &count) in freqs.iter().enumerate() {
            if count > 0 {
                queue.insert(HuffNode::leaf(value as Symbol, count));
            }
        }
        queue.insert(HuffNode::leaf(PSEUDO_EOF, 1));

        if queue.size() < 2 {
            return Err(HuffError::InvalidArgument(
                "at least one symbol must have a positive frequency".to_string(),
            ));
        }

        let num_values = queue.size();
        let mut size = num_values;
        let root = loop {
            let Some(first) = queue.extract_min() else {
                return Err(HuffError::InvalidArgument("priority queue drained while merging".to_string()));
            };
            match queue.extract_min() {
                Some(second) => {
                    queue.insert(HuffNode::merge(first, second));
                    size += 1;
                }
                None => break first,
            }
        };

        if_tracing! {
            debug!(target = "huffman_tree", size, num_values, "tree built from frequencies");
        }

        Ok(Self { root, size, num_values })
    }

    /// Rebuilds a tree from its standard tree format.
    ///
    /// # Errors
    ///
    /// [`HuffError::MalformedTree`] if the bits run out mid-node, bits are left over after the root,
    /// a leaf value lies past [`PSEUDO_EOF`], or the tree is deeper than any tree over the alphabet.
    pub fn from_standard_tree_format(bits: &[bool]) -> Result<Self, HuffError> {
        let mut parser = TreeParser { bits, pos: 0, size: 0, num_values: 0 };
        let root = parser.parse_node(0)?;
        if parser.pos != bits.len() {
            return Err(HuffError::MalformedTree(format!(
                "{} trailing bits after the root",
                bits.len() - parser.pos
            )));
        }

        if_tracing! {
            debug!(target = "huffman_tree", size = parser.size, num_values = parser.num_values, "tree rebuilt from standard tree format");
        }

        Ok(Self {
            root,
            size: parser.size,
            num_values: parser.num_values,
        })
    }

    /// Pre-order serialization: `0` for an internal node, `1` plus a [`LEAF_VALUE_BITS`]-wide value for a leaf.
    pub fn to_standard_tree_format(&self) -> Vec<bool> {
        let mut bits = Vec::with_capacity(self.serialized_len());
        write_node(&self.root, &mut bits);
        bits
    }

    /// Length of [`to_standard_tree_format`](HuffmanTree::to_standard_tree_format) without building it.
    pub const fn serialized_len(&self) -> usize {
        self.size + self.num_values * LEAF_VALUE_BITS as usize
    }

    /// symbol -> code
    pub fn value_mappings(&self) -> HashMap<Symbol, Code> {
        let mut result = HashMap::with_capacity(self.num_values);
        let mut path = Code::new();
        visit_leaves(&self.root, &mut path, &mut |value, code| {
            result.insert(value, code.clone());
        });
        result
    }

    /// code -> symbol
    pub fn code_mappings(&self) -> HashMap<Code, Symbol> {
        let mut result = HashMap::with_capacity(self.num_values);
        let mut path = Code::new();
        visit_leaves(&self.root, &mut path, &mut |value, code| {
            result.insert(code.clone(), value);
        });
        result
    }

    /// Total node count, leaves and internal nodes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Leaf count.
    pub const fn num_values(&self) -> usize {
        self.num_values
    }
}

fn visit_leaves(node: &HuffNode, path: &mut Code, visit: &mut impl FnMut(Symbol, &Code)) {
    match node {
        HuffNode::Leaf { value, .. } => visit(*value, path),
        HuffNode::Internal { left, right, .. } => {
            path.push(false);
            visit_leaves(left, path, visit);
            path.pop();

            path.push(true);
            visit_leaves(right, path, visit);
            path.pop();
        }
    }
}

fn write_node(node: &HuffNode, bits: &mut Vec<bool>) {
    match node {
        HuffNode::Leaf { value, .. } => {
            bits.push(true);
            for shift in (0..LEAF_VALUE_BITS).rev() {
                bits.push((*value >> shift) & 1 == 1);
            }
        }
        HuffNode::Internal { left, right, .. } => {
            bits.push(false);
            write_node(left, bits);
            write_node(right, bits);
        }
    }
}

struct TreeParser<'a> {
    bits: &'a [bool],
    pos: usize,
    size: usize,
    num_values: usize,
}

impl TreeParser<'_> {
    fn next_bit(&mut self) -> Result<bool, HuffError> {
        let bit = self
            .bits
            .get(self.pos)
            .copied()
            .ok_or_else(|| HuffError::MalformedTree(format!("ran out of bits at offset {}", self.pos)))?;
        self.pos += 1;
        Ok(bit)
    }

    fn parse_node(&mut self, depth: usize) -> Result<HuffNode, HuffError> {
        // a full binary tree with MAX_LEAVES leaves is at most MAX_LEAVES - 1 deep
        if depth >= MAX_LEAVES {
            return Err(HuffError::MalformedTree(format!("tree deeper than {} levels", MAX_LEAVES - 1)));
        }

        let node = if self.next_bit()? {
            let mut value: Symbol = 0;
            for _ in 0..LEAF_VALUE_BITS {
                value = (value << 1) | Symbol::from(self.next_bit()?);
            }
            if value > PSEUDO_EOF {
                return Err(HuffError::MalformedTree(format!("leaf value {} is outside the alphabet", value)));
            }
            self.num_values += 1;
            HuffNode::leaf(value, 0)
        } else {
            let left = self.parse_node(depth + 1)?;
            let right = self.parse_node(depth + 1)?;
            HuffNode::Internal {
                weight: 0,
                left: Box::new(left),
                right: Box::new(right),
            }
        };
        self.size += 1;
        Ok(node)
    }
}

/// Renders the standard tree format as a string of `0` and `1` characters.
impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.to_standard_tree_format() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Parses the textual standard tree format.
impl FromStr for HuffmanTree {
    type Err = HuffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .enumerate()
            .map(|(i, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(HuffError::InvalidArgument(format!(
                    "tree text may only contain '0' or '1', found {:?} at {}",
                    other, i
                ))),
            })
            .collect::<Result<Vec<bool>, HuffError>>()?;
        Self::from_standard_tree_format(&bits)
    }
}
