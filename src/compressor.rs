pub use anyhow::Result;
use std::io;

use thiserror::Error;

/// Represents an error emitted by the Huffman engine while encoding or decoding data.
///
/// None of these are retried internally; the operation that produced one is aborted
/// and may be re-invoked from scratch.
#[derive(Debug, Error)]
pub enum HuffError {
    /// Bad input to a constructor or traversal, e.g. a frequency table with no
    /// positive entries or a tree text containing something other than `0`/`1`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `compress` was called without a preceding `preprocess_compress`.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The stream does not start with the expected magic number.
    #[error("corrupt header: expected magic number {expected:#010x}, found {found:#010x}")]
    CorruptHeader { expected: u32, found: u32 },

    /// The header format tag is not one this build understands.
    #[error("unsupported header format tag {0:#010x}")]
    UnsupportedFormat(u32),

    /// The stream ended before the pseudo-EOF code (or before the header was complete).
    #[error("stream ended before the end-of-body code was found")]
    TruncatedStream,

    /// The serialized tree could not be parsed into a full binary tree.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Represents shared behavior for all compressors.
///
/// Provides a method [`compress_bytes`](Compressor::compress_bytes) to compress data and
/// [`decompress_bytes`](Compressor::decompress_bytes) to decompress data.
///
/// # Note
///
/// No guarantees are made about the length of the resulting [`Vec<u8>`] from
/// [`compress_bytes`](Compressor::compress_bytes). It can be shorter, equal in length, or longer.
/// The only guarantee is that [`decompress_bytes`](Compressor::decompress_bytes) will be able to
/// reconstruct the original data.
pub trait Compressor {
    /// Compresses a given byte slice and returns the encoded data.
    ///
    /// The in-memory surface always forces compression, so the output may be larger
    /// than the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be modelled (e.g. it is empty).
    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses a given byte slice and returns the decoded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the input data was malformed or truncated.
    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Human readable name, used in reports.
    fn compressor_name(&self) -> String;

    /// Performs a round-trip test on the compressor.
    ///
    /// Use for sanity checking the compressor and decompressor.
    fn test_roundtrip<'orig>(&mut self, data: &'orig [u8]) -> Result<RoundTripTestResult<'orig>> {
        let compressed = self.compress_bytes(data)?;
        let decompressed = self.decompress_bytes(&compressed)?;
        let equal = data == decompressed.as_slice();

        Ok(RoundTripTestResult {
            equal,
            original: data,
            compressed,
            decompressed,
        })
    }
}

/// Represents the result of a round-trip test.
///
/// Use accessor methods to retrieve the [`result`][RoundTripTestResult::is_successful],
/// the [`original data`][RoundTripTestResult::get_original],
/// the [`compressed data`][RoundTripTestResult::get_compressed],
/// and the [`decompressed data`][RoundTripTestResult::get_decompressed].
#[derive(Clone, Debug, Hash)]
pub struct RoundTripTestResult<'orig> {
    pub(crate) equal: bool,
    pub(crate) original: &'orig [u8],
    pub(crate) compressed: Vec<u8>,
    pub(crate) decompressed: Vec<u8>,
}

impl<'orig> RoundTripTestResult<'orig> {
    /// Whether the original and decompressed data were equal.
    pub const fn is_successful(&self) -> bool {
        self.equal
    }

    /// The original data before any action was taken.
    pub const fn get_original(&self) -> &'orig [u8] {
        self.original
    }

    /// The data after it has been encoded by the compressor.
    pub fn get_compressed(&self) -> &[u8] {
        self.compressed.as_slice()
    }

    /// The data after it has been decoded by the decompressor.
    pub fn get_decompressed(&self) -> &[u8] {
        self.decompressed.as_slice()
    }
}
