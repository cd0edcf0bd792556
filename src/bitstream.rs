//! Bit-level stream writer and reader, MSB first.
//!
//! Bits innerhalb eines Bytes sind von 7 (most significant, zuerst
//! geschrieben/gelesen) bis 0 nummeriert. Der Writer sammelt Bits in einem
//! partiellen Byte und flusht volle Bytes in einen wachsenden Buffer.
//!
//! Aligned-Zugriffe (`write_bytes`, `read_bytes`) setzen Byte-Ausrichtung
//! voraus und schlagen mit [`Error::Misaligned`] fehl wenn der Stream
//! mitten in einem Byte steht — sie padden nie implizit.

use crate::{Error, Result};

/// Writes individual bits into a growable byte buffer, MSB first.
///
/// Der Buffer ist bis `into_vec()` nicht beobachtbar; Finalisierung padded
/// das letzte partielle Byte mit Null-Bits und passiert genau einmal.
pub struct BitWriter {
    buf: Vec<u8>,
    /// Partielles Byte: die `used` obersten Bits sind gültig.
    partial: u8,
    /// Anzahl gültiger Bits in `partial` (0..=7).
    used: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    pub fn new() -> Self {
        Self { buf: Vec::new(), partial: 0, used: 0 }
    }

    /// Writes a single bit. `true` = 1, `false` = 0.
    #[inline]
    pub fn write_bit(&mut self, val: bool) {
        self.partial |= u8::from(val) << (7 - self.used);
        self.used += 1;
        if self.used == 8 {
            self.buf.push(self.partial);
            self.partial = 0;
            self.used = 0;
        }
    }

    /// Writes the lower `n` bits of `val`, MSB first, crossing byte
    /// boundaries transparently. `n == 0` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `n > 64`.
    pub fn write_bits(&mut self, val: u64, n: u8) {
        assert!(n <= 64, "bit count must be 0..=64, got {n}");
        let mut remaining = n;
        while remaining > 0 {
            let free = 8 - self.used;
            let take = remaining.min(free);
            // Die obersten `take` der verbleibenden Bits von val extrahieren.
            let shifted = if remaining == 64 {
                val
            } else {
                val & ((1u64 << remaining) - 1)
            };
            let chunk = (shifted >> (remaining - take)) as u8;
            self.partial |= chunk << (free - take);
            self.used += take;
            remaining -= take;
            if self.used == 8 {
                self.buf.push(self.partial);
                self.partial = 0;
                self.used = 0;
            }
        }
    }

    /// Writes a byte slice; requires the stream to be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.used != 0 {
            return Err(Error::Misaligned { bit_position: self.bit_position() });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Schreibt ein einzelnes Byte. Fast-Path bei Byte-Ausrichtung, sonst
    /// bitweise über die Byte-Grenze.
    #[inline]
    pub fn write_byte(&mut self, val: u8) {
        if self.used == 0 {
            self.buf.push(val);
        } else {
            self.write_bits(u64::from(val), 8);
        }
    }

    /// Pads with zero bits until the current position is byte-aligned.
    /// No-op if already aligned.
    pub fn align_to_byte(&mut self) {
        if self.used > 0 {
            self.buf.push(self.partial);
            self.partial = 0;
            self.used = 0;
        }
    }

    /// True wenn die aktuelle Position auf einer Byte-Grenze liegt.
    pub fn is_aligned(&self) -> bool {
        self.used == 0
    }

    /// Returns the current bit position (number of bits written so far).
    pub fn bit_position(&self) -> usize {
        self.buf.len() * 8 + self.used as usize
    }

    /// Finalises the writer, padding the last byte with zero bits, and
    /// returns the buffer.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.buf
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads individual bits from a byte slice, MSB first.
#[derive(Clone, Copy)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute Bit-Position im Slice.
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Reads a single bit. Returns `true` for 1, `false` for 0.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.bit_pos / 8)
            .copied()
            .ok_or(Error::PrematureEndOfStream)?;
        let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
        self.bit_pos += 1;
        Ok(bit != 0)
    }

    /// Reads `n` bits and returns them as a `u64`, MSB first.
    /// `n == 0` is a no-op returning 0. Bei Fehler bleibt die Position
    /// unverändert (kein partieller Fortschritt).
    ///
    /// # Panics
    ///
    /// Panics if `n > 64`.
    pub fn read_bits(&mut self, n: u8) -> Result<u64> {
        assert!(n <= 64, "bit count must be 0..=64, got {n}");
        if n as usize > self.remaining_bits() {
            return Err(Error::PrematureEndOfStream);
        }
        let mut result: u64 = 0;
        let mut remaining = n;
        while remaining > 0 {
            let byte = self.data[self.bit_pos / 8];
            let offset = (self.bit_pos % 8) as u8;
            let avail = 8 - offset;
            let take = remaining.min(avail);
            let chunk = (byte >> (avail - take)) & ((1u16 << take) - 1) as u8;
            result = (result << take) | u64::from(chunk);
            self.bit_pos += take as usize;
            remaining -= take;
        }
        Ok(result)
    }

    /// Liest ein einzelnes Byte, auch über Byte-Grenzen hinweg.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit_pos % 8 == 0 {
            let byte = self
                .data
                .get(self.bit_pos / 8)
                .copied()
                .ok_or(Error::PrematureEndOfStream)?;
            self.bit_pos += 8;
            Ok(byte)
        } else {
            Ok(self.read_bits(8)? as u8)
        }
    }

    /// Reads `n` bytes; requires the stream to be byte-aligned.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bit_pos % 8 != 0 {
            return Err(Error::Misaligned { bit_position: self.bit_pos });
        }
        let start = self.bit_pos / 8;
        let end = start.checked_add(n).ok_or(Error::PrematureEndOfStream)?;
        if end > self.data.len() {
            return Err(Error::PrematureEndOfStream);
        }
        self.bit_pos += n * 8;
        Ok(&self.data[start..end])
    }

    /// Discards unread bits up to the next byte boundary. No-op if aligned.
    pub fn align_to_byte(&mut self) {
        let rem = self.bit_pos % 8;
        if rem > 0 {
            self.bit_pos += 8 - rem;
        }
    }

    /// Returns the current bit position.
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the number of bits remaining to be read.
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.bit_pos
    }
}
