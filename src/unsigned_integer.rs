//! Unsigned-Integer-Kodierung als 7-Bit-Gruppen mit Continuation-Bit.
//!
//! Jedes Byte trägt 7 Wertbits (least significant group first); das
//! oberste Bit ist 1 solange weitere Gruppen folgen. Werte < 128 belegen
//! genau ein Byte. Die Kodierung ist von der Alignment-Einstellung
//! unabhängig und funktioniert auch mitten in einem Byte.

use crate::bitstream::{BitReader, BitWriter};
use crate::{Error, Result};

/// Maximale Gruppenzahl für ein u64: ceil(64 / 7) = 10.
const MAX_GROUPS: u32 = 10;

/// Writes `val` as a sequence of 7-bit groups with continuation bits.
pub fn write(writer: &mut BitWriter, mut val: u64) {
    loop {
        let group = (val & 0x7F) as u8;
        val >>= 7;
        if val == 0 {
            writer.write_byte(group);
            return;
        }
        writer.write_byte(group | 0x80);
    }
}

/// Reads an unsigned integer written by [`write`].
///
/// Fails with [`Error::IntegerOverflow`] if the encoding exceeds the
/// range of a `u64`.
pub fn read(reader: &mut BitReader<'_>) -> Result<u64> {
    let mut result: u64 = 0;
    for group_idx in 0..MAX_GROUPS {
        let byte = reader.read_byte()?;
        let group = u64::from(byte & 0x7F);
        // Die zehnte Gruppe darf nur noch 1 Wertbit tragen.
        if group_idx == MAX_GROUPS - 1 && group > 1 {
            return Err(Error::IntegerOverflow);
        }
        result |= group << (7 * group_idx);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(Error::IntegerOverflow)
}

/// Liest einen Wert und engt ihn auf `usize` ein.
pub fn read_usize(reader: &mut BitReader<'_>) -> Result<usize> {
    usize::try_from(read(reader)?).map_err(|_| Error::IntegerOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(val: u64) -> Vec<u8> {
        let mut w = BitWriter::new();
        write(&mut w, val);
        w.into_vec()
    }

    fn decode(data: &[u8]) -> Result<u64> {
        let mut r = BitReader::new(data);
        read(&mut r)
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7F]);
    }

    #[test]
    fn multi_byte_values() {
        // 128 = Gruppe 0 (Fortsetzung), Gruppe 1
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(encode(16_384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn round_trip_boundaries() {
        for val in [
            0u64,
            1,
            127,
            128,
            255,
            16_383,
            16_384,
            u64::from(u32::MAX),
            u64::MAX,
        ] {
            assert_eq!(decode(&encode(val)).unwrap(), val, "val = {val}");
        }
    }

    #[test]
    fn u64_max_takes_ten_groups() {
        assert_eq!(encode(u64::MAX).len(), 10);
    }

    #[test]
    fn unaligned_round_trip() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3);
        write(&mut w, 300);
        write(&mut w, 7);
        let data = w.into_vec();

        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(read(&mut r).unwrap(), 300);
        assert_eq!(read(&mut r).unwrap(), 7);
    }

    #[test]
    fn truncated_stream() {
        // Continuation-Bit gesetzt, aber keine Folgegruppe
        assert_eq!(decode(&[0x80]).unwrap_err(), Error::PrematureEndOfStream);
    }

    #[test]
    fn overflow_rejected() {
        // Elf Gruppen mit Fortsetzung überschreiten u64
        let data = [0xFF; 11];
        assert_eq!(decode(&data).unwrap_err(), Error::IntegerOverflow);
        // Zehnte Gruppe mit zu vielen Wertbits
        let mut data = vec![0x80u8; 9];
        data.push(0x02);
        assert_eq!(decode(&data).unwrap_err(), Error::IntegerOverflow);
    }
}
