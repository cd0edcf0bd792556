//! Der selbstbeschreibende Stream-Header.
//!
//! Aufbau, bitweise: Distinguishing Bits `10`, dann die Format-Version
//! als 4-Bit-Feld, dann sechs Options-Flags in fester Reihenfolge
//! (byte_aligned, comments, pis, prefixes, whitespace, intern_values).
//! Zusammen 12 Bits; im byte-aligned Modus folgt vor dem Body ein
//! Alignment-Padding.

use crate::bitstream::{BitReader, BitWriter};
use crate::options::SessionOptions;
use crate::{Error, Result};

/// Die beiden Distinguishing Bits am Streamanfang.
const DISTINGUISHING_BITS: u64 = 0b10;

/// Aktuelle Format-Version.
pub const FORMAT_VERSION: u16 = 1;

/// Writes the stream header for the given options.
pub fn write(writer: &mut BitWriter, options: &SessionOptions) {
    writer.write_bits(DISTINGUISHING_BITS, 2);
    writer.write_bits(u64::from(FORMAT_VERSION), 4);
    writer.write_bit(options.byte_aligned());
    writer.write_bit(options.preserve.comments);
    writer.write_bit(options.preserve.pis);
    writer.write_bit(options.preserve.prefixes);
    writer.write_bit(options.preserve.whitespace);
    writer.write_bit(options.intern_values);
    if options.byte_aligned() {
        writer.align_to_byte();
    }
}

/// Reads and validates the stream header, reconstructing the options
/// the encoder used.
pub fn read(reader: &mut BitReader<'_>) -> Result<SessionOptions> {
    let bits = reader.read_bits(2)? as u8;
    if u64::from(bits) != DISTINGUISHING_BITS {
        return Err(Error::InvalidDistinguishingBits(bits));
    }
    let version = reader.read_bits(4)? as u16;
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }
    let mut options = SessionOptions::new();
    if reader.read_bit()? {
        options = options.with_byte_alignment();
    }
    if reader.read_bit()? {
        options = options.with_comments();
    }
    if reader.read_bit()? {
        options = options.with_pis();
    }
    if reader.read_bit()? {
        options = options.with_prefixes();
    }
    if reader.read_bit()? {
        options = options.with_whitespace();
    }
    if reader.read_bit()? {
        options = options.with_value_interning();
    }
    if options.byte_aligned() {
        reader.align_to_byte();
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(options: SessionOptions) -> SessionOptions {
        let mut w = BitWriter::new();
        write(&mut w, &options);
        let data = w.into_vec();
        let mut r = BitReader::new(&data);
        read(&mut r).unwrap()
    }

    #[test]
    fn default_header_round_trip() {
        let opts = SessionOptions::new();
        assert_eq!(round_trip(opts), opts);
    }

    #[test]
    fn all_flags_round_trip() {
        let opts = SessionOptions::new()
            .with_byte_alignment()
            .with_comments()
            .with_pis()
            .with_prefixes()
            .with_whitespace()
            .with_value_interning();
        assert_eq!(round_trip(opts), opts);
    }

    #[test]
    fn default_header_bits() {
        let mut w = BitWriter::new();
        write(&mut w, &SessionOptions::new());
        // 10 0001 000000, mit 4 Padding-Nullen = 0x84 0x00
        assert_eq!(w.into_vec(), vec![0x84, 0x00]);
    }

    #[test]
    fn byte_aligned_header_ends_on_boundary() {
        let mut w = BitWriter::new();
        write(&mut w, &SessionOptions::new().with_byte_alignment());
        assert!(w.is_aligned());
        assert_eq!(w.bit_position(), 16);
    }

    #[test]
    fn bad_distinguishing_bits() {
        let data = [0b0100_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(
            read(&mut r).unwrap_err(),
            Error::InvalidDistinguishingBits(0b01)
        );
    }

    #[test]
    fn unsupported_version() {
        // 10, dann Version 2
        let data = [0b1000_1000, 0x00];
        let mut r = BitReader::new(&data);
        assert_eq!(read(&mut r).unwrap_err(), Error::UnsupportedVersion(2));
    }

    #[test]
    fn truncated_header() {
        // Distinguishing Bits und Version passen, Flags abgeschnitten
        let data = [0b1000_0100];
        let mut r = BitReader::new(&data);
        assert_eq!(read(&mut r).unwrap_err(), Error::PrematureEndOfStream);
    }
}
