//! n-Bit Unsigned Integer, alignment-abhängig kodiert.
//!
//! Im bit-packed Modus belegt der Wert genau `width` Bits. Im
//! byte-aligned Modus belegt er ceil(width / 8) ganze Bytes, least
//! significant byte first, damit der Stream ausgerichtet bleibt.
//! `width == 0` schreibt in beiden Modi nichts.

use crate::bitstream::{BitReader, BitWriter};
use crate::Result;

/// Writes `val` in `width` bits (bit-packed) or ceil(width/8) bytes
/// (byte-aligned).
pub fn write(writer: &mut BitWriter, val: u64, width: u8, byte_aligned: bool) {
    if width == 0 {
        return;
    }
    if byte_aligned {
        let mut rest = val;
        for _ in 0..width.div_ceil(8) {
            writer.write_byte((rest & 0xFF) as u8);
            rest >>= 8;
        }
    } else {
        writer.write_bits(val, width);
    }
}

/// Reads a value written by [`write`] with the same `width` and mode.
pub fn read(reader: &mut BitReader<'_>, width: u8, byte_aligned: bool) -> Result<u64> {
    if width == 0 {
        return Ok(0);
    }
    if byte_aligned {
        let mut result: u64 = 0;
        for i in 0..width.div_ceil(8) {
            let byte = reader.read_byte()?;
            result |= u64::from(byte) << (8 * i);
        }
        Ok(result)
    } else {
        reader.read_bits(width)
    }
}
