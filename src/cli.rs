//! cli component of huffpack.
//!
//! > `$exename enc <input> <output> [--format counts|tree] [--force] [--config <path to config file>]`
//!
//! reads the input once to count symbols and build the tree, then a second time to write the
//! compressed stream. if the result would be larger than the input, nothing is written and the
//! reason is printed, unless `--force` (or `"force": true` in the config file) is given.
//!
//! > `$exename dec <input> <output>`
//!
//! the header format is read from the compressed stream itself, so decoding needs no options.
//!
//! > `$exename test <input>`
//!
//! compresses and decompresses the input in memory with both header formats and reports
//! sizes and savings. exits with a non-zero status if either round trip does not reproduce the input.
//!
//! > `$exename config save <output> [--format counts|tree] [--force]`
//!
//! writes a config file that `enc --config` accepts.
use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::algorithms::huffman::{HeaderFormat, Viewer};
use crate::compressor::HuffError;
use crate::config::CodecConfig;

pub mod config;
pub mod decode;
pub mod encode;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Huffman(#[from] HuffError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("round trip failed: {0}")]
    RoundTrip(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode (compress) a file
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode (decompress) a file
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Test compression/decompression roundtrip
    Test(TestArgs),

    /// Config file management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments specific to the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the output file
    pub output: PathBuf,

    /// Header format to store the tree with
    #[arg(long, value_enum)]
    pub format: Option<HeaderFormat>,

    /// Write the output even if it is larger than the input
    #[arg(long)]
    pub force: bool,

    /// Load codec settings from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl EncodeArgs {
    /// Settings from `--config` (or defaults), overridden by the command line flags.
    pub fn codec_config(&self) -> Result<CodecConfig> {
        let base = match &self.config {
            Some(path) => CodecConfig::from_file(path)?,
            None => CodecConfig::default(),
        };
        Ok(base.with_overrides(self.format, self.force))
    }
}

/// Arguments specific to the decode command
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Path for the decompressed file
    pub output: PathBuf,
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the file to roundtrip
    pub input: PathBuf,
}

/// Config file subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Save codec settings to a JSON file
    Save {
        /// Output file path
        output: PathBuf,

        /// Header format to store the tree with
        #[arg(long, value_enum)]
        format: Option<HeaderFormat>,

        /// Write the output even if it is larger than the input
        #[arg(long)]
        force: bool,
    },
}

/// Reports codec messages on stderr; progress goes to the log only.
pub struct StderrViewer;

impl Viewer for StderrViewer {
    fn update(&mut self, _message: &str) {
        if_tracing! {
            tracing::debug!(target = "viewer", text = _message, "progress");
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Creates `path`, fills it with `write` and flushes it. On any error the partial file is removed.
pub fn write_output<F>(path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut BufWriter<File>) -> std::result::Result<u64, HuffError>,
{
    let mut output = BufWriter::new(File::create(path)?);
    let result = write(&mut output).and_then(|bits| {
        output.flush()?;
        Ok(bits)
    });
    match result {
        Ok(bits) => Ok(bits),
        Err(e) => {
            drop(output);
            // don't leave a partial file behind
            let _ = fs::remove_file(path);
            Err(e.into())
        }
    }
}

/// Command execution functions
pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(args) => encode::encode(args),
        Command::Decode(args) => decode::decode(args),
        Command::Test(args) => test::test(args),
        Command::Config { command } => config::config(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_aliases_and_flags() {
        let cli = Cli::try_parse_from(["huffpack", "enc", "in.txt", "out.hf", "--format", "counts", "--force"]).unwrap();
        let args = match cli.command {
            Command::Encode(args) => args,
            other => panic!("expected encode, got {:?}", other),
        };
        assert_eq!(args.format, Some(HeaderFormat::Counts));
        assert!(args.force);

        let config = args.codec_config().unwrap();
        assert_eq!(config.header_format, HeaderFormat::Counts);
        assert!(config.force);
    }

    #[test]
    fn encode_defaults_to_tree_header() {
        let cli = Cli::try_parse_from(["huffpack", "encode", "in.txt", "out.hf"]).unwrap();
        let args = match cli.command {
            Command::Encode(args) => args,
            other => panic!("expected encode, got {:?}", other),
        };
        assert_eq!(args.codec_config().unwrap(), CodecConfig::default());
    }

    #[test]
    fn failed_write_removes_output() {
        let path = std::env::temp_dir().join(format!("huffpack-partial-{}.hf", std::process::id()));
        let err = write_output(&path, |out| {
            out.write_all(b"partial")?;
            Err(HuffError::InvalidArgument("symbol 90 was not seen during preprocessing".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Huffman(HuffError::InvalidArgument(_))), "got {:?}", err);
        assert!(!path.exists());
    }

    #[test]
    fn successful_write_keeps_output() {
        let path = std::env::temp_dir().join(format!("huffpack-complete-{}.hf", std::process::id()));
        let bits = write_output(&path, |out| {
            out.write_all(b"done")?;
            Ok(32)
        })
        .unwrap();
        assert_eq!(bits, 32);
        assert_eq!(std::fs::read(&path).unwrap(), b"done");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        assert!(Cli::try_parse_from(["huffpack", "enc", "a", "b", "--format", "custom"]).is_err());
    }
}
