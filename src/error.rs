//! Central error types for the binary XML event codec.
//!
//! Zwei Klassen: Protokollfehler (die Event-Sequenz des Aufrufers verletzt
//! Nesting-/Ordnungsregeln — wird nie still repariert, weil sonst ein nicht
//! decodierbarer Stream entstuende) und interne Invariantenfehler (treten in
//! einer korrekten Implementierung nie auf; der Decoder meldet sie fuer
//! korrupte Eingaben).

use core::fmt;
use std::borrow::Cow;

/// All error conditions of the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Events appear in an order that violates the nesting rules
    /// (attribute after child content, end-element at depth 0, ...).
    OrderingViolation {
        /// Was erwartet wurde (leer wenn nicht verfügbar).
        expected: Cow<'static, str>,
        /// Was gefunden wurde (leer wenn nicht verfügbar).
        found: Cow<'static, str>,
    },
    /// The session was finished while elements were still open.
    UnclosedElements { depth: usize },
    /// A string table index is out of range for its partition.
    /// Indicates stream corruption or an internal bug; never recoverable.
    UnknownIndex { partition: &'static str, index: usize },
    /// A byte-aligned read/write was requested while the stream is mid-byte.
    /// Internal invariant violation; never recoverable.
    Misaligned { bit_position: usize },
    /// A decoded event code does not match any admissible event in the
    /// current grammar state.
    InvalidEventCode {
        code: u64,
        /// Der Grammar-Zustand in dem der Fehler auftrat.
        state: Cow<'static, str>,
    },
    /// The stream ended before a complete structure was decoded.
    PrematureEndOfStream,
    /// A variable-length unsigned integer exceeds 64 bits.
    IntegerOverflow,
    /// A decoded string literal is not valid UTF-8.
    MalformedString,
    /// The stream does not start with the distinguishing bits `10`.
    InvalidDistinguishingBits(u8),
    /// The stream's format version is not supported.
    UnsupportedVersion(u16),
    /// A namespace prefix could not be resolved to a URI.
    UnresolvedPrefix(String),
    /// XML parsing failed (fatal; the partial buffer is discarded).
    XmlParseError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderingViolation { expected, found } => {
                if expected.is_empty() && found.is_empty() {
                    write!(f, "event ordering violation")
                } else {
                    write!(f, "event ordering violation: expected '{expected}', found '{found}'")
                }
            }
            Self::UnclosedElements { depth } => {
                write!(f, "session finished with {depth} unclosed element(s)")
            }
            Self::UnknownIndex { partition, index } => {
                write!(f, "unknown index {index} in string table partition '{partition}'")
            }
            Self::Misaligned { bit_position } => {
                write!(f, "byte-aligned access at bit position {bit_position} (mid-byte)")
            }
            Self::InvalidEventCode { code, state } => {
                write!(f, "invalid event code {code} in state '{state}'")
            }
            Self::PrematureEndOfStream => write!(f, "premature end of stream"),
            Self::IntegerOverflow => write!(f, "unsigned integer overflow (> 64 bits)"),
            Self::MalformedString => write!(f, "string literal is not valid UTF-8"),
            Self::InvalidDistinguishingBits(bits) => {
                write!(f, "invalid distinguishing bits {bits:02b}, expected 10")
            }
            Self::UnsupportedVersion(v) => write!(f, "unsupported format version {v}"),
            Self::UnresolvedPrefix(prefix) => {
                write!(f, "unresolved namespace prefix '{prefix}'")
            }
            Self::XmlParseError(msg) => write!(f, "XML parse error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `OrderingViolation` Fehler mit Kontext.
    pub fn ordering_violation(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::OrderingViolation {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Erstellt einen `InvalidEventCode` Fehler mit Zustandskontext.
    pub fn invalid_event_code(code: u64, state: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidEventCode { code, state: state.into() }
    }

    /// True für Fehlerklassen die eine Verletzung der Aufrufer-Protokollregeln
    /// anzeigen (im Gegensatz zu internen Invariantenfehlern).
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::OrderingViolation { .. } | Self::UnclosedElements { .. }
        )
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
