//! Der Decoder: liest Header und Event-Strom zurück in Events.
//!
//! Der Decoder spielt dieselbe Grammar- und String-Table-Maschine ab
//! wie der Encoder und bleibt so ohne Seitenkanal synchron. Die
//! Session-Optionen kommen aus dem selbstbeschreibenden Header; der
//! Aufrufer braucht kein Vorwissen über den Strom.

use std::rc::Rc;

use log::trace;

use crate::bitstream::BitReader;
use crate::event::Event;
use crate::grammar::{EventKind, Grammar};
use crate::header;
use crate::options::SessionOptions;
use crate::qname::QName;
use crate::string;
use crate::string_table::StringTable;
use crate::xml::is_xml_whitespace;
use crate::{n_bit_unsigned_integer, Error, Result};

struct Decoder<'a> {
    options: SessionOptions,
    reader: BitReader<'a>,
    table: StringTable,
    grammar: Grammar,
}

impl<'a> Decoder<'a> {
    fn read_code(&mut self) -> Result<EventKind> {
        let width = self.grammar.code_width();
        let code = n_bit_unsigned_integer::read(&mut self.reader, width, self.options.byte_aligned())?;
        let kind = self
            .grammar
            .kind_for(code)
            .ok_or_else(|| Error::invalid_event_code(code, self.grammar.phase().name()))?;
        trace!("event {} at bit {}", kind.name(), self.reader.bit_position());
        Ok(kind)
    }

    fn read_value(&mut self) -> Result<Rc<str>> {
        if self.options.intern_values {
            self.table
                .values
                .read_compact(&mut self.reader, self.options.byte_aligned())
        } else {
            Ok(Rc::from(string::read(&mut self.reader)?))
        }
    }

    /// Optionales Prefix, Gegenstück zum Flag-plus-Literal des Encoders.
    fn read_prefix(&mut self) -> Result<Option<Rc<str>>> {
        if !self.options.preserve.prefixes {
            return Ok(None);
        }
        let flag = n_bit_unsigned_integer::read(&mut self.reader, 1, self.options.byte_aligned())?;
        if flag == 0 {
            Ok(None)
        } else {
            Ok(Some(Rc::from(string::read(&mut self.reader)?)))
        }
    }

    fn read_event(&mut self, kind: EventKind) -> Result<Option<Event>> {
        let aligned = self.options.byte_aligned();
        let event = match kind {
            EventKind::StartElement => {
                let uri = self.table.uris.read_compact(&mut self.reader, aligned)?;
                let local_name = self
                    .table
                    .element_names
                    .read_compact(&mut self.reader, aligned)?;
                let prefix = self.read_prefix()?;
                self.grammar.on_start_element();
                Event::StartElement(QName {
                    uri,
                    local_name,
                    prefix,
                })
            }
            EventKind::EndElement => {
                self.grammar.on_end_element();
                Event::EndElement
            }
            EventKind::Attribute => {
                let uri = self.table.uris.read_compact(&mut self.reader, aligned)?;
                let local_name = self
                    .table
                    .attribute_names
                    .read_compact(&mut self.reader, aligned)?;
                let prefix = self.read_prefix()?;
                let value = self.read_value()?;
                Event::Attribute {
                    name: QName {
                        uri,
                        local_name,
                        prefix,
                    },
                    value,
                }
            }
            EventKind::Characters => {
                let value = self.read_value()?;
                self.grammar.on_characters();
                // Die Signifikanz steht nicht auf der Leitung; sie wird
                // wie in der XML-Brücke aus dem Inhalt klassifiziert.
                let significant = !is_xml_whitespace(&value);
                Event::Characters { value, significant }
            }
            EventKind::NamespaceDeclaration => {
                let prefix: Rc<str> = Rc::from(string::read(&mut self.reader)?);
                let uri = self.table.uris.read_compact(&mut self.reader, aligned)?;
                self.grammar.bind_prefix(Rc::clone(&prefix), Rc::clone(&uri));
                Event::NamespaceDeclaration { prefix, uri }
            }
            EventKind::Comment => Event::Comment(Rc::from(string::read(&mut self.reader)?)),
            EventKind::ProcessingInstruction => {
                let target: Rc<str> = Rc::from(string::read(&mut self.reader)?);
                let data: Rc<str> = Rc::from(string::read(&mut self.reader)?);
                Event::ProcessingInstruction { target, data }
            }
            EventKind::EndDocument => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Decodes a byte sequence produced by the encoder back into its event
/// sequence, together with the session options recovered from the
/// header.
///
/// Das Signifikanz-Flag von CH-Events steht nicht auf der Leitung; es
/// wird aus dem Inhalt klassifiziert (reiner Whitespace → insignifikant).
/// Ein vom Produzenten als signifikant markiertes Nur-Whitespace-Event
/// kommt deshalb als insignifikant zurück.
pub fn decode(data: &[u8]) -> Result<(Vec<Event>, SessionOptions)> {
    let mut reader = BitReader::new(data);
    let options = header::read(&mut reader)?;
    let mut decoder = Decoder {
        grammar: Grammar::new(&options),
        table: StringTable::new(),
        reader,
        options,
    };
    let mut events = Vec::new();
    loop {
        let kind = decoder.read_code()?;
        match decoder.read_event(kind)? {
            Some(event) => events.push(event),
            None => return Ok((events, options)),
        }
    }
}
