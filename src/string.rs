//! String-Kodierung: Byte-Länge als Unsigned Integer, dann die rohen
//! UTF-8-Bytes.
//!
//! Im bit-packed Modus landen die Bytes ohne Alignment direkt im
//! Bit-Strom; im byte-aligned Modus ist der Stream an dieser Stelle
//! ohnehin ausgerichtet. Dekodierte Bytes müssen gültiges UTF-8 sein.

use crate::bitstream::{BitReader, BitWriter};
use crate::unsigned_integer;
use crate::{Error, Result};

/// Writes a string as its UTF-8 byte length followed by the raw bytes.
pub fn write(writer: &mut BitWriter, val: &str) {
    let bytes = val.as_bytes();
    unsigned_integer::write(writer, bytes.len() as u64);
    for &b in bytes {
        writer.write_byte(b);
    }
}

/// Reads a string written by [`write`].
///
/// Fails with [`Error::MalformedString`] if the bytes are not valid UTF-8.
pub fn read(reader: &mut BitReader<'_>) -> Result<String> {
    let len = unsigned_integer::read_usize(reader)?;
    if len > reader.remaining_bits() / 8 {
        return Err(Error::PrematureEndOfStream);
    }
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        bytes.push(reader.read_byte()?);
    }
    String::from_utf8(bytes).map_err(|_| Error::MalformedString)
}
