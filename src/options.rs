//! Session-Optionen: Alignment und Fidelity-Einstellungen.
//!
//! Die Optionen werden im Stream-Header mitkodiert, so dass ein Decoder
//! den Stream ohne Vorwissen lesen kann. Defaults: bit-packed, keine
//! Kommentare/PIs/Prefixe, Whitespace verworfen, Werte nicht interniert.

/// Packing mode of the event stream body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Event-Codes und Integer teilen sich Bits ohne Padding.
    #[default]
    BitPacked,
    /// Jedes Event beginnt an einer Byte-Grenze; schneller zu parsen,
    /// größer auf der Leitung.
    ByteAligned,
}

/// Which optional event classes survive the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preserve {
    /// CM-Events erhalten statt verwerfen.
    pub comments: bool,
    /// PI-Events erhalten statt verwerfen.
    pub pis: bool,
    /// Namespace-Prefixe an QNames und NS-Events erhalten.
    pub prefixes: bool,
    /// Insignifikanten Whitespace (CH nur aus Whitespace zwischen
    /// Markup) erhalten statt verwerfen.
    pub whitespace: bool,
}

/// Options governing a single encode or decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub alignment: Alignment,
    pub preserve: Preserve,
    /// Attribut- und Textwerte in der Value-Partition internieren.
    /// Lohnt sich bei stark repetitiven Werten, kostet sonst ein
    /// Compact-ID-Bit pro Wert.
    pub intern_values: bool,
}

impl SessionOptions {
    /// Creates the default options: bit-packed, nothing preserved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects byte-aligned packing.
    pub fn with_byte_alignment(mut self) -> Self {
        self.alignment = Alignment::ByteAligned;
        self
    }

    /// Preserves comment events.
    pub fn with_comments(mut self) -> Self {
        self.preserve.comments = true;
        self
    }

    /// Preserves processing-instruction events.
    pub fn with_pis(mut self) -> Self {
        self.preserve.pis = true;
        self
    }

    /// Preserves namespace prefixes and NS events.
    pub fn with_prefixes(mut self) -> Self {
        self.preserve.prefixes = true;
        self
    }

    /// Preserves insignificant whitespace.
    pub fn with_whitespace(mut self) -> Self {
        self.preserve.whitespace = true;
        self
    }

    /// Interns attribute and character values in the string table.
    pub fn with_value_interning(mut self) -> Self {
        self.intern_values = true;
        self
    }

    /// True im byte-aligned Modus.
    pub fn byte_aligned(&self) -> bool {
        self.alignment == Alignment::ByteAligned
    }
}
