//! bxi — compact binary serialization of XML structural events, in the
//! spirit of W3C EXI.
//!
//! Ein Encoder verwandelt einen sequentiellen Strom struktureller
//! XML-Events (SE, EE, AT, CH, NS, CM, PI) in eine kompakte,
//! selbstbeschreibende Byte-Folge; der Decoder stellt den Event-Strom
//! exakt wieder her. Kompaktheit kommt aus grammar-getriebenen
//! Event-Codes in minimaler Bit-Breite und einer String Table, die
//! wiederholte Namen und Werte als Index statt als Literal überträgt.
//!
//! ```
//! use bxi::{decode, encode, Event, QName, SessionOptions};
//!
//! let events = vec![
//!     Event::StartElement(QName::unqualified("greeting")),
//!     Event::attribute(QName::unqualified("lang"), "en"),
//!     Event::characters("hello"),
//!     Event::EndElement,
//! ];
//! let bytes = encode(&events, SessionOptions::new())?;
//! let (decoded, _options) = decode(&bytes)?;
//! assert_eq!(decoded, events);
//! # Ok::<(), bxi::Error>(())
//! ```
//!
//! XML-Text wird über die [`xml`]-Brücke (quick-xml) eingespeist:
//! [`xml::encode_document`] parst und kodiert in einem Zug.

pub mod bit_width;
pub mod bitstream;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;
pub mod grammar;
pub mod header;
pub mod n_bit_unsigned_integer;
pub mod options;
pub mod qname;
pub mod string;
pub mod string_table;
pub mod unsigned_integer;
pub mod xml;

pub use decoder::decode;
pub use encoder::{encode, Encoder};
pub use error::{Error, Result};
pub use event::Event;
pub use options::{Alignment, Preserve, SessionOptions};
pub use qname::QName;

/// HashMap mit AHash statt SipHash. Die Keys kommen aus dem Dokument
/// selbst, HashDoS ist hier kein Szenario.
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
