use std::fs::File;
use std::io::{self, BufReader};

use crate::algorithms::huffman::HuffmanCoding;
use crate::cli::{EncodeArgs, Result, StderrViewer, write_output};

pub fn encode(args: EncodeArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;
    let config = args.codec_config()?;

    let mut coder = HuffmanCoding::new(config.header_format).with_viewer(Box::new(StderrViewer));
    let saved_bits = coder.preprocess_compress(BufReader::new(File::open(input_path)?))?;

    let input = BufReader::new(File::open(input_path)?);
    if saved_bits <= 0 && !config.force {
        // nothing will be written; only the advisory is reported
        coder.compress(input, io::sink(), false)?;
        return Ok(());
    }

    let bits_written = write_output(output_path, |output| coder.compress(input, output, config.force))?;

    if_tracing! {
        tracing::info!(event = "encode_complete", input = %input_path.display(), output = %output_path.display(), header_format = %config.header_format, saved_bits, bits_written, "encode finished");
    }
    if_not_tracing! {
        let _ = bits_written;
    }
    Ok(())
}
