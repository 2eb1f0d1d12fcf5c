//! Bit-granular reading and writing over byte streams.
//!
//! Both ends are MSB-first, matching the layout `arcode` uses for its own coded output.
//! Multi-bit fields are transferred most significant bit first.

use std::io::{ErrorKind, Read, Write};

use arcode::bitbit::{BitReader, BitWriter, MSB};

use crate::algorithms::huffman_tree::Code;
use crate::compressor::HuffError;

pub struct BitSource<R: Read> {
    reader: BitReader<R, MSB>,
    bits_read: u64,
}

impl<R: Read> BitSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BitReader::new(reader),
            bits_read: 0,
        }
    }

    /// Reads a single bit. `Ok(None)` is the end-of-stream sentinel.
    pub fn read_bit(&mut self) -> Result<Option<bool>, HuffError> {
        match self.reader.read_bit() {
            Ok(bit) => {
                self.bits_read += 1;
                Ok(Some(bit))
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(HuffError::Io(e)),
        }
    }

    /// Reads `n` bits (at most 32) as an unsigned value.
    ///
    /// Returns `Ok(None)` if the stream runs out before all `n` bits are available;
    /// the partial value is discarded.
    pub fn read_bits(&mut self, n: u32) -> Result<Option<u32>, HuffError> {
        debug_assert!(n <= u32::BITS, "cannot read more than 32 bits at once");
        let mut value = 0u32;
        for _ in 0..n {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | u32::from(bit),
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    pub const fn bits_read(&self) -> u64 {
        self.bits_read
    }
}

pub struct BitSink<W: Write> {
    writer: BitWriter<W>,
    bits_written: u64,
}

impl<W: Write> BitSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BitWriter::new(writer),
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), HuffError> {
        self.writer.write_bit(bit)?;
        self.bits_written += 1;
        Ok(())
    }

    /// Writes the low `n` bits of `value` (at most 32).
    pub fn write_bits(&mut self, n: u32, value: u32) -> Result<(), HuffError> {
        debug_assert!(n <= u32::BITS, "cannot write more than 32 bits at once");
        for shift in (0..n).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn write_code(&mut self, code: &Code) -> Result<(), HuffError> {
        for bit in code.iter() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Pads the last partial byte with zero bits. Padding is not counted in
    /// [`bits_written`](BitSink::bits_written).
    pub fn finish(&mut self) -> Result<(), HuffError> {
        self.writer.pad_to_byte()?;
        Ok(())
    }

    pub const fn bits_written(&self) -> u64 {
        self.bits_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_msb_first() {
        let mut out = Vec::new();
        {
            let mut sink = BitSink::new(&mut out);
            sink.write_bits(4, 0b1010).unwrap();
            sink.write_bits(12, 0x0f0).unwrap();
            sink.finish().unwrap();
            assert_eq!(sink.bits_written(), 16);
        }
        assert_eq!(out, vec![0b1010_0000, 0xf0]);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let mut out = Vec::new();
        {
            let mut sink = BitSink::new(&mut out);
            sink.write_bits(3, 0b111).unwrap();
            sink.finish().unwrap();
            assert_eq!(sink.bits_written(), 3);
        }
        assert_eq!(out, vec![0b1110_0000]);
    }

    #[test]
    fn reads_back_full_width_ints() {
        let mut out = Vec::new();
        {
            let mut sink = BitSink::new(&mut out);
            sink.write_bits(32, 0xface_8200).unwrap();
            sink.write_bits(1, 1).unwrap();
            sink.finish().unwrap();
        }

        let mut source = BitSource::new(out.as_slice());
        assert_eq!(source.read_bits(32).unwrap(), Some(0xface_8200));
        assert_eq!(source.read_bit().unwrap(), Some(true));
        assert_eq!(source.bits_read(), 33);
    }

    #[test]
    fn end_of_stream_is_a_sentinel() {
        let data = [0xffu8];
        let mut source = BitSource::new(&data[..]);
        assert_eq!(source.read_bits(8).unwrap(), Some(0xff));
        assert_eq!(source.read_bit().unwrap(), None);

        let mut short = BitSource::new(&data[..]);
        assert_eq!(short.read_bits(16).unwrap(), None);
    }
}
