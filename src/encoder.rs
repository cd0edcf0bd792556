//! Der Event-Encoder: eine Session, ein Dokument, ein Byte-Strom.
//!
//! Die Session besitzt Writer, String Table und Grammar exklusiv. Pro
//! Event-Art gibt es eine Operation; `finish()` validiert Tiefe 0,
//! schreibt den ED-Code und liefert die finalisierten Bytes. Ein
//! fehlgeschlagenes Event verändert den Puffer nicht: die Zulässigkeit
//! wird geprüft bevor das erste Bit geschrieben wird. Abbruch == die
//! Session droppen.

use log::trace;

use crate::bitstream::BitWriter;
use crate::event::Event;
use crate::grammar::{EventKind, Grammar, Phase};
use crate::header;
use crate::options::SessionOptions;
use crate::qname::QName;
use crate::string;
use crate::string_table::StringTable;
use crate::{n_bit_unsigned_integer, Error, Result};

/// Encodes a stream of document events into a compact byte sequence.
pub struct Encoder {
    options: SessionOptions,
    writer: BitWriter,
    table: StringTable,
    grammar: Grammar,
}

impl Encoder {
    /// Opens a session and writes the stream header.
    pub fn new(options: SessionOptions) -> Self {
        let mut writer = BitWriter::new();
        header::write(&mut writer, &options);
        Self {
            grammar: Grammar::new(&options),
            table: StringTable::new(),
            writer,
            options,
        }
    }

    /// Current element nesting depth.
    pub fn depth(&self) -> usize {
        self.grammar.depth()
    }

    /// Prüft die Zulässigkeit und schreibt dann den Event-Code.
    /// Erst nach diesem Aufruf darf Inhalt in den Strom.
    fn write_code(&mut self, kind: EventKind) -> Result<()> {
        let code = self
            .grammar
            .code_for(kind)
            .ok_or_else(|| Error::ordering_violation(self.grammar.phase().name(), kind.name()))?;
        trace!(
            "event {} code {} width {} at bit {}",
            kind.name(),
            code,
            self.grammar.code_width(),
            self.writer.bit_position()
        );
        n_bit_unsigned_integer::write(
            &mut self.writer,
            code,
            self.grammar.code_width(),
            self.options.byte_aligned(),
        );
        Ok(())
    }

    fn write_value(&mut self, value: &str) {
        if self.options.intern_values {
            self.table
                .values
                .write_compact(&mut self.writer, value, self.options.byte_aligned());
        } else {
            string::write(&mut self.writer, value);
        }
    }

    /// Optionales Prefix: Flag-Bit plus Literal, nur bei Prefix-Erhalt.
    fn write_prefix(&mut self, prefix: Option<&str>) {
        if !self.options.preserve.prefixes {
            return;
        }
        match prefix {
            Some(p) => {
                n_bit_unsigned_integer::write(&mut self.writer, 1, 1, self.options.byte_aligned());
                string::write(&mut self.writer, p);
            }
            None => {
                n_bit_unsigned_integer::write(&mut self.writer, 0, 1, self.options.byte_aligned());
            }
        }
    }

    /// SE — opens an element.
    pub fn start_element(&mut self, name: &QName) -> Result<()> {
        self.write_code(EventKind::StartElement)?;
        let aligned = self.options.byte_aligned();
        self.table
            .uris
            .write_compact(&mut self.writer, &name.uri, aligned);
        self.table
            .element_names
            .write_compact(&mut self.writer, &name.local_name, aligned);
        self.write_prefix(name.prefix.as_deref());
        self.grammar.on_start_element();
        Ok(())
    }

    /// EE — closes the innermost open element. Bei Tiefe 0 ein
    /// Protokollfehler, der Puffer bleibt unverändert.
    pub fn end_element(&mut self) -> Result<()> {
        self.write_code(EventKind::EndElement)?;
        self.grammar.on_end_element();
        Ok(())
    }

    /// AT — an attribute of the element whose start-tag is open.
    pub fn attribute(&mut self, name: &QName, value: &str) -> Result<()> {
        self.write_code(EventKind::Attribute)?;
        let aligned = self.options.byte_aligned();
        self.table
            .uris
            .write_compact(&mut self.writer, &name.uri, aligned);
        self.table
            .attribute_names
            .write_compact(&mut self.writer, &name.local_name, aligned);
        self.write_prefix(name.prefix.as_deref());
        self.write_value(value);
        Ok(())
    }

    /// CH — character content. Insignifikanter Whitespace wird ohne
    /// Whitespace-Erhalt komplett verworfen.
    pub fn characters(&mut self, text: &str, significant: bool) -> Result<()> {
        if !significant && !self.options.preserve.whitespace {
            trace!("dropping insignificant whitespace ({} bytes)", text.len());
            return Ok(());
        }
        self.write_code(EventKind::Characters)?;
        self.write_value(text);
        self.grammar.on_characters();
        Ok(())
    }

    /// NS — a namespace binding on the element whose start-tag is open.
    /// Immer im Frame vermerkt; auf der Leitung nur bei Prefix-Erhalt.
    pub fn namespace_declaration(&mut self, prefix: &str, uri: &str) -> Result<()> {
        if self.options.preserve.prefixes {
            self.write_code(EventKind::NamespaceDeclaration)?;
            string::write(&mut self.writer, prefix);
            self.table
                .uris
                .write_compact(&mut self.writer, uri, self.options.byte_aligned());
        } else if self.grammar.phase() != Phase::StartTag {
            // Auch ungeschriebene Bindungen gehören in den Start-Tag.
            return Err(Error::ordering_violation(
                "element start-tag",
                EventKind::NamespaceDeclaration.name(),
            ));
        }
        self.grammar.bind_prefix(prefix.into(), uri.into());
        Ok(())
    }

    /// CM — written only when comments are preserved, dropped otherwise.
    pub fn comment(&mut self, text: &str) -> Result<()> {
        if !self.options.preserve.comments {
            return Ok(());
        }
        self.write_code(EventKind::Comment)?;
        string::write(&mut self.writer, text);
        Ok(())
    }

    /// PI — written only when processing instructions are preserved.
    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        if !self.options.preserve.pis {
            return Ok(());
        }
        self.write_code(EventKind::ProcessingInstruction)?;
        string::write(&mut self.writer, target);
        string::write(&mut self.writer, data);
        Ok(())
    }

    /// Dispatches one event to the matching operation.
    pub fn event(&mut self, ev: &Event) -> Result<()> {
        match ev {
            Event::StartElement(name) => self.start_element(name),
            Event::EndElement => self.end_element(),
            Event::Attribute { name, value } => self.attribute(name, value),
            Event::Characters { value, significant } => self.characters(value, *significant),
            Event::NamespaceDeclaration { prefix, uri } => {
                self.namespace_declaration(prefix, uri)
            }
            Event::Comment(text) => self.comment(text),
            Event::ProcessingInstruction { target, data } => {
                self.processing_instruction(target, data)
            }
        }
    }

    /// ED — validates that every element is closed, terminates the
    /// stream and returns the finalized bytes. Konsumiert die Session;
    /// Events nach `finish` verhindert der Typ.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let depth = self.grammar.depth();
        if depth > 0 {
            return Err(Error::UnclosedElements { depth });
        }
        self.write_code(EventKind::EndDocument)?;
        Ok(self.writer.into_vec())
    }
}

/// Encodes a complete event sequence in one call.
pub fn encode(events: &[Event], options: SessionOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(options);
    for ev in events {
        encoder.event(ev)?;
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    fn root() -> QName {
        QName::unqualified("root")
    }

    #[test]
    fn minimal_document() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.end_element().unwrap();
        let bytes = enc.finish().unwrap();
        // Header 12 Bits, SE-Code 0 Bits, URI-Miss (0-Bit-ID + ""),
        // Name-Miss (0-Bit-ID + "root"), EE-Code 2 Bits, ED-Code 0 Bits
        assert!(!bytes.is_empty());
        let (events, _) = decode(&bytes).unwrap();
        assert_eq!(
            events,
            vec![Event::StartElement(root()), Event::EndElement]
        );
    }

    #[test]
    fn end_element_at_depth_zero_leaves_buffer_unchanged() {
        let mut enc = Encoder::new(SessionOptions::new());
        let before = enc.writer.bit_position();
        let err = enc.end_element().unwrap_err();
        assert!(err.is_protocol());
        assert_eq!(enc.writer.bit_position(), before);
        // Session bleibt benutzbar
        enc.start_element(&root()).unwrap();
    }

    #[test]
    fn attribute_after_content_is_ordering_violation() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.characters("hi", true).unwrap();
        let err = enc
            .attribute(&QName::unqualified("id"), "1")
            .unwrap_err();
        assert_eq!(
            err,
            Error::ordering_violation("element content", "AT")
        );
    }

    #[test]
    fn attribute_after_child_is_ordering_violation() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.start_element(&QName::unqualified("child")).unwrap();
        enc.end_element().unwrap();
        let err = enc
            .attribute(&QName::unqualified("id"), "1")
            .unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn finish_with_open_elements_fails() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.start_element(&QName::unqualified("a")).unwrap();
        let err = enc.finish().unwrap_err();
        assert_eq!(err, Error::UnclosedElements { depth: 2 });
    }

    #[test]
    fn characters_at_document_level_rejected() {
        let mut enc = Encoder::new(SessionOptions::new());
        let err = enc.characters("stray", true).unwrap_err();
        assert_eq!(
            err,
            Error::ordering_violation("document content", "CH")
        );
    }

    #[test]
    fn second_root_rejected() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.end_element().unwrap();
        let err = enc.start_element(&root()).unwrap_err();
        assert_eq!(err, Error::ordering_violation("document end", "SE"));
    }

    #[test]
    fn finish_without_root_rejected() {
        let enc = Encoder::new(SessionOptions::new());
        let err = enc.finish().unwrap_err();
        assert_eq!(err, Error::ordering_violation("document content", "ED"));
    }

    #[test]
    fn comments_and_pis_dropped_by_default() {
        let a = {
            let mut enc = Encoder::new(SessionOptions::new());
            enc.start_element(&root()).unwrap();
            enc.comment("noise").unwrap();
            enc.processing_instruction("t", "d").unwrap();
            enc.end_element().unwrap();
            enc.finish().unwrap()
        };
        let b = {
            let mut enc = Encoder::new(SessionOptions::new());
            enc.start_element(&root()).unwrap();
            enc.end_element().unwrap();
            enc.finish().unwrap()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn insignificant_whitespace_dropped_by_default() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.characters("\n  ", false).unwrap();
        enc.end_element().unwrap();
        let bytes = enc.finish().unwrap();
        let (events, _) = decode(&bytes).unwrap();
        assert_eq!(
            events,
            vec![Event::StartElement(root()), Event::EndElement]
        );
    }

    #[test]
    fn namespace_binding_outside_start_tag_rejected() {
        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.characters("x", true).unwrap();
        let err = enc.namespace_declaration("p", "urn:x").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn repeated_names_shrink_the_stream() {
        let many = |n: usize| {
            let mut enc = Encoder::new(SessionOptions::new());
            enc.start_element(&root()).unwrap();
            for _ in 0..n {
                enc.start_element(&QName::unqualified("item")).unwrap();
                enc.end_element().unwrap();
            }
            enc.end_element().unwrap();
            enc.finish().unwrap().len()
        };
        let one = many(1);
        let ten = many(10);
        // Neun weitere <item/> kosten zusammen weniger als neun Literale
        assert!(ten - one < 9 * "item".len());
    }

    #[test]
    fn batch_encode_matches_manual_session() {
        let events = vec![
            Event::StartElement(root()),
            Event::attribute(QName::unqualified("id"), "1"),
            Event::characters("hi"),
            Event::EndElement,
        ];
        let batch = encode(&events, SessionOptions::new()).unwrap();

        let mut enc = Encoder::new(SessionOptions::new());
        enc.start_element(&root()).unwrap();
        enc.attribute(&QName::unqualified("id"), "1").unwrap();
        enc.characters("hi", true).unwrap();
        enc.end_element().unwrap();
        assert_eq!(batch, enc.finish().unwrap());
    }
}
