use core::fmt;
use core::mem;
use std::collections::HashMap;
use std::io::{Read, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::algorithms::bitio::{BitSink, BitSource};
use crate::algorithms::huffman_tree::{
    ALPHABET_SIZE, BITS_PER_INT, BITS_PER_WORD, Code, HuffmanTree, MAX_TREE_BITS, PSEUDO_EOF, Symbol,
};
use crate::compressor::{Compressor, HuffError, Result};

if_tracing! {
    use tracing::{debug, info, warn};
}

/// First field of every compressed stream.
pub const MAGIC_NUMBER: u32 = 0xface_8200;
/// Header tag: one `BITS_PER_INT` count per alphabet symbol.
pub const STORE_COUNTS: u32 = 0x7fff_0001;
/// Header tag: `BITS_PER_INT` tree length followed by the standard tree format.
pub const STORE_TREE: u32 = 0x7fff_0002;

/// How the tree is carried in the compressed stream's header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFormat {
    /// Raw symbol counts; the decoder rebuilds the tree from them.
    Counts,
    /// The pre-order serialized tree.
    #[default]
    Tree,
}

impl HeaderFormat {
    pub const fn tag(self) -> u32 {
        match self {
            HeaderFormat::Counts => STORE_COUNTS,
            HeaderFormat::Tree => STORE_TREE,
        }
    }

    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            STORE_COUNTS => Some(HeaderFormat::Counts),
            STORE_TREE => Some(HeaderFormat::Tree),
            _ => None,
        }
    }

    /// Header size in bits for `tree`, excluding the magic number and tag.
    pub const fn header_bits(self, tree: &HuffmanTree) -> u64 {
        match self {
            HeaderFormat::Counts => ALPHABET_SIZE as u64 * BITS_PER_INT as u64,
            HeaderFormat::Tree => BITS_PER_INT as u64 + tree.serialized_len() as u64,
        }
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderFormat::Counts => write!(f, "counts"),
            HeaderFormat::Tree => write!(f, "tree"),
        }
    }
}

/// Receives progress and advisory messages from [`HuffmanCoding`].
pub trait Viewer {
    /// Progress information.
    fn update(&mut self, _message: &str) {}

    /// Something the user has to act on, e.g. compression being skipped because it would not save space.
    fn show_error(&mut self, message: &str);
}

struct Preprocessed {
    freqs: Vec<u64>,
    tree: HuffmanTree,
    saved_bits: i64,
}

enum State {
    Idle,
    Preprocessed(Preprocessed),
}

/// Two-phase Huffman compressor and single-phase decompressor.
///
/// Compression is `preprocess_compress` followed by exactly one `compress` over the same data.
pub struct HuffmanCoding {
    state: State,
    header_format: HeaderFormat,
    viewer: Option<Box<dyn Viewer>>,
}

impl HuffmanCoding {
    pub fn new(header_format: HeaderFormat) -> Self {
        Self {
            state: State::Idle,
            header_format,
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Box<dyn Viewer>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    #[cfg(test)]
    pub const fn is_preprocessed(&self) -> bool {
        matches!(self.state, State::Preprocessed(_))
    }

    /// Reads `input` once, builds the tree and computes how many bits compression would save
    /// with the header format this coder was created with.
    ///
    /// The result counts every bit `compress` would write: magic number, format tag, header and body.
    /// A negative value means the output would be larger than the input.
    ///
    /// # Errors
    ///
    /// [`HuffError::InvalidArgument`] if `input` is empty, [`HuffError::Io`] on read failure.
    pub fn preprocess_compress<R: Read>(&mut self, input: R) -> Result<i64, HuffError> {
        let header_format = self.header_format;
        if_tracing! {
            debug!(target = "huffman", header_format = %header_format, "preprocess start");
        }
        self.state = State::Idle;

        let mut freqs = vec![0u64; ALPHABET_SIZE];
        let mut source = BitSource::new(input);
        while let Some(word) = source.read_bits(BITS_PER_WORD)? {
            freqs[word as usize] += 1;
        }
        let original_bits = source.bits_read();

        let tree = HuffmanTree::from_frequencies(&freqs)?;
        let codes = tree.value_mappings();

        let mut projected = 2 * BITS_PER_INT as u64 + header_format.header_bits(&tree);
        for (value, &count) in freqs.iter().enumerate() {
            if count > 0 {
                projected += count * code_len(&codes, value as Symbol)?;
            }
        }
        projected += code_len(&codes, PSEUDO_EOF)?;

        let saved_bits = original_bits as i64 - projected as i64;

        if_tracing! {
            info!(target = "huffman", input_bits = original_bits, projected_bits = projected, saved_bits, "preprocess complete");
        }
        self.notify(&format!(
            "{} input bits, {} symbols in use, {} bits projected with {} header",
            original_bits,
            tree.num_values() - 1,
            projected,
            header_format
        ));

        self.state = State::Preprocessed(Preprocessed {
            freqs,
            tree,
            saved_bits,
        });
        Ok(saved_bits)
    }

    /// Writes the compressed form of `input`, which must hold the same data given to
    /// [`preprocess_compress`](HuffmanCoding::preprocess_compress).
    ///
    /// If compression would not save space and `force` is false, nothing is written, the viewer
    /// is told by how much the output would grow, and `Ok(0)` is returned.
    /// Either way the processor returns to idle and needs another preprocess before the next call.
    ///
    /// Returns the number of bits written, padding excluded.
    ///
    /// # Errors
    ///
    /// [`HuffError::IllegalState`] without a preceding preprocess; [`HuffError::InvalidArgument`] if
    /// `input` contains a symbol that was not counted or a count does not fit the header.
    pub fn compress<R: Read, W: Write>(&mut self, input: R, output: W, force: bool) -> Result<u64, HuffError> {
        let State::Preprocessed(prep) = mem::replace(&mut self.state, State::Idle) else {
            return Err(HuffError::IllegalState(
                "preprocess_compress must be called before compress".to_string(),
            ));
        };

        if prep.saved_bits <= 0 && !force {
            if_tracing! {
                warn!(target = "huffman", saved_bits = prep.saved_bits, "compression skipped, output would grow");
            }
            let message = format!(
                "compressed output would have {} more bits than the input; force compression to proceed",
                -prep.saved_bits
            );
            self.show_error(&message);
            return Ok(0);
        }

        if_tracing! {
            debug!(target = "huffman", header_format = %self.header_format, force, "compress start");
        }

        // nothing reaches the output unless the whole header can be written
        if self.header_format == HeaderFormat::Counts {
            check_counts(&prep.freqs)?;
        }

        let mut sink = BitSink::new(output);
        sink.write_bits(BITS_PER_INT, MAGIC_NUMBER)?;
        sink.write_bits(BITS_PER_INT, self.header_format.tag())?;
        write_header(self.header_format, &prep, &mut sink)?;
        let header_end = sink.bits_written();

        let codes = prep.tree.value_mappings();
        let mut source = BitSource::new(input);
        while let Some(word) = source.read_bits(BITS_PER_WORD)? {
            let code = codes.get(&(word as Symbol)).ok_or_else(|| {
                HuffError::InvalidArgument(format!("symbol {} was not seen during preprocessing", word))
            })?;
            sink.write_code(code)?;
        }
        let eof = codes
            .get(&PSEUDO_EOF)
            .ok_or_else(|| HuffError::InvalidArgument("tree has no end-of-body code".to_string()))?;
        sink.write_code(eof)?;
        sink.finish()?;

        let bits_written = sink.bits_written();
        if_tracing! {
            info!(target = "huffman", header_bits = header_end, body_bits = bits_written - header_end, bits_written, "compress complete");
        }
        self.notify(&format!(
            "wrote {} header bits and {} body bits",
            header_end,
            bits_written - header_end
        ));
        Ok(bits_written)
    }

    /// Decodes a stream produced by [`compress`](HuffmanCoding::compress) into `output`.
    ///
    /// Returns the number of bits written to `output`.
    ///
    /// # Errors
    ///
    /// [`HuffError::CorruptHeader`] on a wrong magic number, [`HuffError::UnsupportedFormat`] on an
    /// unknown header tag, [`HuffError::TruncatedStream`] if the stream ends before the end-of-body
    /// code, [`HuffError::MalformedTree`] if the stored tree cannot be parsed.
    pub fn decompress<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<u64, HuffError> {
        let result = self.decompress_inner(input, output);
        if_tracing! {
            match &result {
                Ok(bits) => info!(target = "huffman", bits_written = bits, "decompress complete"),
                Err(err) => tracing::error!(target = "huffman", error = %err, "decompress failed"),
            }
        }
        result
    }

    fn decompress_inner<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<u64, HuffError> {
        let mut source = BitSource::new(input);

        let magic = read_int(&mut source)?;
        if magic != MAGIC_NUMBER {
            return Err(HuffError::CorruptHeader {
                expected: MAGIC_NUMBER,
                found: magic,
            });
        }

        let tag = read_int(&mut source)?;
        let header_format = HeaderFormat::from_tag(tag).ok_or(HuffError::UnsupportedFormat(tag))?;
        if_tracing! {
            debug!(target = "huffman", header_format = %header_format, "decompress start");
        }

        let tree = match header_format {
            HeaderFormat::Counts => {
                let mut freqs = vec![0u64; ALPHABET_SIZE];
                for freq in freqs.iter_mut() {
                    *freq = u64::from(read_int(&mut source)?);
                }
                HuffmanTree::from_frequencies(&freqs)?
            }
            HeaderFormat::Tree => {
                let tree_bits = read_int(&mut source)? as usize;
                if tree_bits > MAX_TREE_BITS {
                    return Err(HuffError::MalformedTree(format!(
                        "stored tree claims {} bits, no tree over the alphabet needs more than {}",
                        tree_bits, MAX_TREE_BITS
                    )));
                }
                let mut bits = Vec::with_capacity(tree_bits);
                for _ in 0..tree_bits {
                    bits.push(source.read_bit()?.ok_or(HuffError::TruncatedStream)?);
                }
                HuffmanTree::from_standard_tree_format(&bits)?
            }
        };
        self.notify(&format!("rebuilt tree with {} values from {} header", tree.num_values(), header_format));

        let codes = tree.code_mappings();
        let longest = codes.keys().map(Code::len).max().unwrap_or(0);

        let mut sink = BitSink::new(output);
        let mut current = Code::new();
        loop {
            let bit = source.read_bit()?.ok_or(HuffError::TruncatedStream)?;
            current.push(bit);
            match codes.get(&current) {
                Some(&PSEUDO_EOF) => break,
                Some(&value) => {
                    sink.write_bits(BITS_PER_WORD, u32::from(value))?;
                    current.clear();
                }
                // prefix-free: a miss can only extend to a longer code
                None if current.len() < longest => {}
                None => {
                    return Err(HuffError::MalformedTree(format!(
                        "no code matches {} after reading {} bits",
                        current,
                        source.bits_read()
                    )));
                }
            }
        }
        sink.finish()?;

        self.notify(&format!("decoded {} bits", sink.bits_written()));
        Ok(sink.bits_written())
    }

    fn notify(&mut self, message: &str) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.update(message);
        }
    }

    fn show_error(&mut self, message: &str) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.show_error(message);
        }
    }
}

impl Default for HuffmanCoding {
    fn default() -> Self {
        Self::new(HeaderFormat::default())
    }
}

fn code_len(codes: &HashMap<Symbol, Code>, value: Symbol) -> Result<u64, HuffError> {
    codes
        .get(&value)
        .map(|code| code.len() as u64)
        .ok_or_else(|| HuffError::InvalidArgument(format!("symbol {} has no code", value)))
}

fn read_int<R: Read>(source: &mut BitSource<R>) -> Result<u32, HuffError> {
    source.read_bits(BITS_PER_INT)?.ok_or(HuffError::TruncatedStream)
}

fn header_count(value: usize, count: u64) -> Result<u32, HuffError> {
    u32::try_from(count).map_err(|_| {
        HuffError::InvalidArgument(format!(
            "symbol {} occurs {} times, more than a {}-bit count can hold",
            value, count, BITS_PER_INT
        ))
    })
}

fn check_counts(freqs: &[u64]) -> Result<(), HuffError> {
    for (value, &count) in freqs.iter().enumerate() {
        header_count(value, count)?;
    }
    Ok(())
}

fn write_header<W: Write>(header_format: HeaderFormat, prep: &Preprocessed, sink: &mut BitSink<W>) -> Result<(), HuffError> {
    match header_format {
        HeaderFormat::Counts => {
            for (value, &count) in prep.freqs.iter().enumerate() {
                sink.write_bits(BITS_PER_INT, header_count(value, count)?)?;
            }
        }
        HeaderFormat::Tree => {
            let bits = prep.tree.to_standard_tree_format();
            sink.write_bits(BITS_PER_INT, bits.len() as u32)?;
            for bit in bits {
                sink.write_bit(bit)?;
            }
        }
    }
    Ok(())
}

impl Compressor for HuffmanCoding {
    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.preprocess_compress(data)?;
        self.compress(data, &mut out, true)?;
        Ok(out)
    }

    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress(data, &mut out)?;
        Ok(out)
    }

    fn compressor_name(&self) -> String {
        format!("Huffman Coding ({} header)", self.header_format)
    }
}
