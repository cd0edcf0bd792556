//! Die XML-Brücke: quick-xml-Streaming-Parse in den Event-Strom.
//!
//! Die Brücke ist das Gegenstück zum SAX-Handler des Originalsystems:
//! sie löst Namespaces auf, fasst zusammenhängenden Text (inklusive
//! CDATA) zu einem CH-Event zusammen und klassifiziert reinen
//! Whitespace als insignifikant. Behebbare Befunde werden per `warn!`
//! geloggt und übergangen; fatale Parse-Fehler brechen mit
//! [`Error::XmlParseError`] ab.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::reader::NsReader;

use log::warn;

use crate::encoder;
use crate::event::Event;
use crate::options::SessionOptions;
use crate::qname::QName;
use crate::{Error, Result};

/// True wenn `s` nur aus XML-Whitespace besteht (Space, Tab, CR, LF).
pub fn is_xml_whitespace(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| Error::XmlParseError(format!("invalid UTF-8 in name: {e}")))
}

/// Aufgelöste Namespace-URI eines Elements oder Attributs.
fn resolved_uri(resolution: ResolveResult<'_>) -> Result<String> {
    match resolution {
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Bound(ns) => Ok(utf8(ns.as_ref())?.to_owned()),
        ResolveResult::Unknown(prefix) => Err(Error::UnresolvedPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

struct Bridge<'a> {
    reader: NsReader<&'a [u8]>,
    events: Vec<Event>,
    /// Zusammenhängender Text, bis zum nächsten Markup gesammelt.
    pending_text: String,
    depth: usize,
}

impl<'a> Bridge<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: NsReader::from_str(xml),
            events: Vec::new(),
            pending_text: String::new(),
            depth: 0,
        }
    }

    /// Gesammelten Text als ein CH-Event ausgeben. Whitespace auf
    /// Dokumentebene wird verworfen, anderer Text dort ist ein Fehler.
    fn flush_text(&mut self) -> Result<()> {
        if self.pending_text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending_text);
        let significant = !is_xml_whitespace(&text);
        if self.depth == 0 {
            if significant {
                return Err(Error::XmlParseError(
                    "character data outside the root element".into(),
                ));
            }
            return Ok(());
        }
        self.events.push(Event::Characters {
            value: text.into(),
            significant,
        });
        Ok(())
    }

    fn start_element(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.flush_text()?;
        let (resolution, local) = self.reader.resolve_element(e.name());
        let uri = resolved_uri(resolution)?;
        let mut name = QName::new(&uri, utf8(local.as_ref())?);
        if let Some(prefix) = e.name().prefix() {
            name = name.with_prefix(utf8(prefix.into_inner())?);
        }
        self.events.push(Event::StartElement(name));
        self.depth += 1;

        // Erst die Bindungen, dann die Attribute: beides gehört in den
        // Start-Tag, und der Decoder braucht die Bindungen zuerst.
        let mut attributes: Vec<Attribute<'_>> = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|er| Error::XmlParseError(er.to_string()))?;
            match attr.key.as_namespace_binding() {
                Some(decl) => {
                    let prefix = match decl {
                        PrefixDeclaration::Default => "",
                        PrefixDeclaration::Named(p) => utf8(p)?,
                    };
                    let bound = attr
                        .unescape_value()
                        .map_err(|er| Error::XmlParseError(er.to_string()))?;
                    self.events.push(Event::NamespaceDeclaration {
                        prefix: prefix.into(),
                        uri: bound.as_ref().into(),
                    });
                }
                None => attributes.push(attr),
            }
        }
        for attr in attributes {
            self.attribute(&attr)?;
        }
        Ok(())
    }

    fn attribute(&mut self, attr: &Attribute<'_>) -> Result<()> {
        let (resolution, local) = self.reader.resolve_attribute(attr.key);
        let uri = resolved_uri(resolution)?;
        let mut name = QName::new(&uri, utf8(local.as_ref())?);
        if let Some(prefix) = attr.key.prefix() {
            name = name.with_prefix(utf8(prefix.into_inner())?);
        }
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlParseError(e.to_string()))?;
        self.events.push(Event::attribute(name, &value));
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        self.flush_text()?;
        self.events.push(Event::EndElement);
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn run(mut self) -> Result<Vec<Event>> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|e| Error::XmlParseError(e.to_string()))?;
            match event {
                XmlEvent::Start(e) => self.start_element(&e)?,
                XmlEvent::Empty(e) => {
                    self.start_element(&e)?;
                    self.end_element()?;
                }
                XmlEvent::End(_) => self.end_element()?,
                XmlEvent::Text(e) => match e.unescape() {
                    Ok(text) => self.pending_text.push_str(&text),
                    Err(err) => {
                        // Unbekannte Entity o.ä.: Rohtext übernehmen
                        warn!("could not unescape character data: {err}");
                        self.pending_text
                            .push_str(&String::from_utf8_lossy(&e));
                    }
                },
                XmlEvent::CData(e) => {
                    self.pending_text.push_str(utf8(&e)?);
                }
                XmlEvent::Comment(e) => {
                    self.flush_text()?;
                    let text = e
                        .unescape()
                        .map_err(|er| Error::XmlParseError(er.to_string()))?;
                    self.events.push(Event::Comment(text.as_ref().into()));
                }
                XmlEvent::PI(e) => {
                    self.flush_text()?;
                    let target = utf8(e.target())?.to_owned();
                    // quick-xml liefert alles nach dem Target inklusive des
                    // trennenden Whitespace; SAX-Semantik ist ohne Trenner.
                    let data = utf8(e.content())?
                        .trim_start_matches([' ', '\t', '\r', '\n']);
                    self.events.push(Event::ProcessingInstruction {
                        target: target.into(),
                        data: data.into(),
                    });
                }
                XmlEvent::Decl(_) | XmlEvent::DocType(_) => {
                    // XML-Deklaration und DTD tragen keine Events bei
                }
                XmlEvent::Eof => {
                    self.flush_text()?;
                    return Ok(self.events);
                }
            }
        }
    }
}

/// Parses an XML document into its structural event sequence.
pub fn parse_document(xml: &str) -> Result<Vec<Event>> {
    Bridge::new(xml).run()
}

/// Parses and encodes an XML document in one call.
pub fn encode_document(xml: &str, options: SessionOptions) -> Result<Vec<u8>> {
    encoder::encode(&parse_document(xml)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn whitespace_classifier() {
        assert!(is_xml_whitespace(""));
        assert!(is_xml_whitespace(" \t\r\n"));
        assert!(!is_xml_whitespace(" x "));
    }

    #[test]
    fn simple_document() {
        let events = parse_document(r#"<root id="1">hi</root>"#).unwrap();
        assert_eq!(
            events,
            vec![
                Event::StartElement(QName::unqualified("root")),
                Event::attribute(QName::unqualified("id"), "1"),
                Event::characters("hi"),
                Event::EndElement,
            ]
        );
    }

    #[test]
    fn empty_element_becomes_se_ee() {
        let events = parse_document("<a><b/></a>").unwrap();
        assert_eq!(
            events,
            vec![
                Event::StartElement(QName::unqualified("a")),
                Event::StartElement(QName::unqualified("b")),
                Event::EndElement,
                Event::EndElement,
            ]
        );
    }

    #[test]
    fn namespaces_resolved() {
        let events =
            parse_document(r#"<x:r xmlns:x="urn:x" x:a="v"/>"#).unwrap();
        assert_eq!(
            events,
            vec![
                Event::StartElement(QName::new("urn:x", "r").with_prefix("x")),
                Event::NamespaceDeclaration {
                    prefix: "x".into(),
                    uri: "urn:x".into(),
                },
                Event::attribute(QName::new("urn:x", "a").with_prefix("x"), "v"),
                Event::EndElement,
            ]
        );
    }

    #[test]
    fn default_namespace() {
        let events = parse_document(r#"<r xmlns="urn:d"><c/></r>"#).unwrap();
        assert_eq!(events[0], Event::StartElement(QName::new("urn:d", "r")));
        assert_eq!(
            events[1],
            Event::NamespaceDeclaration {
                prefix: "".into(),
                uri: "urn:d".into(),
            }
        );
        // Kind erbt den Default-Namespace
        assert_eq!(events[2], Event::StartElement(QName::new("urn:d", "c")));
    }

    #[test]
    fn unprefixed_attribute_has_no_namespace() {
        let events = parse_document(r#"<r xmlns="urn:d" a="v"/>"#).unwrap();
        assert_eq!(
            events[2],
            Event::attribute(QName::unqualified("a"), "v")
        );
    }

    #[test]
    fn text_and_cdata_coalesce() {
        let events = parse_document("<r>one<![CDATA[ & two]]> three</r>").unwrap();
        assert_eq!(
            events[1],
            Event::characters("one & two three")
        );
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn inter_markup_whitespace_is_insignificant() {
        let events = parse_document("<r>\n  <c/>\n</r>").unwrap();
        assert_eq!(events[1], Event::whitespace("\n  "));
        assert_eq!(events[4], Event::whitespace("\n"));
    }

    #[test]
    fn entities_unescaped() {
        let events = parse_document(r#"<r a="&lt;x&gt;">&amp;</r>"#).unwrap();
        assert_eq!(
            events[1],
            Event::attribute(QName::unqualified("a"), "<x>")
        );
        assert_eq!(events[2], Event::characters("&"));
    }

    #[test]
    fn comments_and_pis() {
        let events =
            parse_document("<?pi data?><r><!-- hi --></r>").unwrap();
        assert_eq!(
            events[0],
            Event::ProcessingInstruction {
                target: Rc::from("pi"),
                data: Rc::from("data"),
            }
        );
        assert_eq!(events[2], Event::Comment(Rc::from(" hi ")));
    }

    #[test]
    fn pi_data_has_no_leading_separator() {
        // Der Whitespace-Lauf zwischen Target und Daten gehört nicht zu
        // den Daten; Whitespace innerhalb und am Ende schon
        let events = parse_document("<?t \t a b ?><r/>").unwrap();
        assert_eq!(
            events[0],
            Event::ProcessingInstruction {
                target: Rc::from("t"),
                data: Rc::from("a b "),
            }
        );

        let events = parse_document("<?bare?><r/>").unwrap();
        assert_eq!(
            events[0],
            Event::ProcessingInstruction {
                target: Rc::from("bare"),
                data: Rc::from(""),
            }
        );
    }

    #[test]
    fn unbound_prefix_is_an_error() {
        let err = parse_document("<x:r/>").unwrap_err();
        assert_eq!(err, Error::UnresolvedPrefix("x".into()));
    }

    #[test]
    fn mismatched_tags_rejected() {
        let err = parse_document("<a></b>").unwrap_err();
        assert!(matches!(err, Error::XmlParseError(_)));
    }

    #[test]
    fn document_level_text_rejected() {
        let err = parse_document("<a/>stray").unwrap_err();
        assert!(matches!(err, Error::XmlParseError(_)));
    }

    #[test]
    fn encode_document_round_trips() {
        let bytes = encode_document(r#"<r a="1">hi</r>"#, SessionOptions::new()).unwrap();
        let (events, _) = crate::decoder::decode(&bytes).unwrap();
        assert_eq!(
            events,
            vec![
                Event::StartElement(QName::unqualified("r")),
                Event::attribute(QName::unqualified("a"), "1"),
                Event::characters("hi"),
                Event::EndElement,
            ]
        );
    }
}
