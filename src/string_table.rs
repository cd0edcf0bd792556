//! Die String Table: vier Partitionen für wiederholte Namen und Werte.
//!
//! Jede Partition vergibt monotone, nullbasierte Indizes in der
//! Reihenfolge des ersten Auftretens. Auf der Leitung läuft ein String
//! als Compact-ID: Breite = ceil(log2(count + 1)); ein Treffer schreibt
//! index + 1, ein Miss schreibt 0 gefolgt vom Literal, das anschließend
//! interniert wird. Encoder und Decoder internieren in identischer
//! Reihenfolge und bleiben so synchron.

use std::rc::Rc;

use crate::bit_width;
use crate::bitstream::{BitReader, BitWriter};
use crate::{n_bit_unsigned_integer, string};
use crate::{Error, FastHashMap, Result};

/// Ab dieser Größe lohnt sich die Hash-Map neben dem Vec; darunter ist
/// lineare Suche über die wenigen Einträge schneller und billiger.
const LOOKUP_THRESHOLD: usize = 64;

/// One partition of the string table.
#[derive(Debug, Default)]
pub struct Partition {
    name: &'static str,
    entries: Vec<Rc<str>>,
    /// Lazy aufgebaut sobald `entries` die Schwelle überschreitet.
    lookup: Option<FastHashMap<Rc<str>, usize>>,
}

impl Partition {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            lookup: None,
        }
    }

    /// Number of interned entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bit width of a compact ID for the current entry count.
    pub fn id_width(&self) -> u8 {
        bit_width::for_count(self.entries.len() + 1)
    }

    /// Looks up the index of a previously interned string.
    pub fn find(&self, val: &str) -> Option<usize> {
        match &self.lookup {
            Some(map) => map.get(val).copied(),
            None => self.entries.iter().position(|e| &**e == val),
        }
    }

    /// Resolves an index back to its string.
    pub fn get(&self, index: usize) -> Result<Rc<str>> {
        self.entries.get(index).cloned().ok_or(Error::UnknownIndex {
            partition: self.name,
            index,
        })
    }

    /// Interns a string, returning its index. Idempotent: a string that
    /// is already present keeps its first index.
    pub fn intern(&mut self, val: &str) -> usize {
        if let Some(idx) = self.find(val) {
            return idx;
        }
        let entry: Rc<str> = Rc::from(val);
        let idx = self.entries.len();
        self.entries.push(Rc::clone(&entry));
        if let Some(map) = &mut self.lookup {
            map.insert(entry, idx);
        } else if self.entries.len() > LOOKUP_THRESHOLD {
            let map: FastHashMap<Rc<str>, usize> = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| (Rc::clone(e), i))
                .collect();
            self.lookup = Some(map);
        }
        idx
    }

    /// Writes `val` as a compact ID: hit → index + 1, miss → 0 plus
    /// literal, und interniert den Miss danach.
    pub fn write_compact(&mut self, writer: &mut BitWriter, val: &str, byte_aligned: bool) {
        let width = self.id_width();
        match self.find(val) {
            Some(idx) => n_bit_unsigned_integer::write(writer, (idx + 1) as u64, width, byte_aligned),
            None => {
                n_bit_unsigned_integer::write(writer, 0, width, byte_aligned);
                string::write(writer, val);
                self.intern(val);
            }
        }
    }

    /// Reads a compact ID written by [`Partition::write_compact`].
    pub fn read_compact(
        &mut self,
        reader: &mut BitReader<'_>,
        byte_aligned: bool,
    ) -> Result<Rc<str>> {
        let width = self.id_width();
        let id = n_bit_unsigned_integer::read(reader, width, byte_aligned)?;
        if id == 0 {
            let literal = string::read(reader)?;
            let idx = self.intern(&literal);
            self.get(idx)
        } else {
            let idx = usize::try_from(id - 1).map_err(|_| Error::IntegerOverflow)?;
            self.get(idx)
        }
    }
}

/// The four partitions of an encode or decode session.
#[derive(Debug)]
pub struct StringTable {
    pub uris: Partition,
    pub element_names: Partition,
    pub attribute_names: Partition,
    pub values: Partition,
}

impl StringTable {
    /// Creates an empty string table.
    pub fn new() -> Self {
        Self {
            uris: Partition::new("namespace-uri"),
            element_names: Partition::new("element-name"),
            attribute_names: Partition::new("attribute-name"),
            values: Partition::new("value"),
        }
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
