use std::fs::File;
use std::io::BufReader;

use crate::algorithms::huffman::HuffmanCoding;
use crate::cli::{DecodeArgs, Result, StderrViewer, write_output};

pub fn decode(args: DecodeArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;

    let input = BufReader::new(File::open(input_path)?);
    let mut coder = HuffmanCoding::default().with_viewer(Box::new(StderrViewer));
    let bits_written = write_output(output_path, |output| coder.decompress(input, output))?;

    if_tracing! {
        tracing::info!(event = "decode_complete", input = %input_path.display(), output = %output_path.display(), decompressed_len = bits_written / 8, "decode finished");
    }
    if_not_tracing! {
        let _ = bits_written;
    }
    Ok(())
}
