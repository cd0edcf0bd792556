//! Das Event-Modell: die strukturellen Ereignisse eines XML-Dokuments,
//! wie ein SAX-Handler sie liefern würde.
//!
//! Events sind die Schnittstelle zwischen der XML-Brücke, dem Encoder
//! und dem Decoder. `Rc<str>` hält häufig wiederholte Namen und Werte
//! günstig klonbar; Sessions sind single-threaded.

use std::fmt;
use std::rc::Rc;

use crate::qname::QName;

/// A structural document event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// SE — Beginn eines Elements.
    StartElement(QName),
    /// EE — Ende des zuletzt geöffneten Elements.
    EndElement,
    /// AT — Attribut des gerade geöffneten Elements.
    Attribute { name: QName, value: Rc<str> },
    /// CH — Textinhalt.
    Characters {
        value: Rc<str>,
        /// False für reinen Whitespace zwischen Markup; die Brücke setzt
        /// das Flag, der Encoder entscheidet über den Erhalt.
        significant: bool,
    },
    /// NS — Namespace-Deklaration am gerade geöffneten Element.
    NamespaceDeclaration { prefix: Rc<str>, uri: Rc<str> },
    /// CM — Kommentar.
    Comment(Rc<str>),
    /// PI — Processing Instruction.
    ProcessingInstruction { target: Rc<str>, data: Rc<str> },
}

impl Event {
    /// Kurzname der Event-Art, für Logging und Fehlermeldungen.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::StartElement(_) => "SE",
            Event::EndElement => "EE",
            Event::Attribute { .. } => "AT",
            Event::Characters { .. } => "CH",
            Event::NamespaceDeclaration { .. } => "NS",
            Event::Comment(_) => "CM",
            Event::ProcessingInstruction { .. } => "PI",
        }
    }

    /// Convenience constructor for significant character content.
    pub fn characters(value: &str) -> Self {
        Event::Characters {
            value: Rc::from(value),
            significant: true,
        }
    }

    /// Convenience constructor for inter-markup whitespace.
    pub fn whitespace(value: &str) -> Self {
        Event::Characters {
            value: Rc::from(value),
            significant: false,
        }
    }

    /// Convenience constructor for an attribute.
    pub fn attribute(name: QName, value: &str) -> Self {
        Event::Attribute {
            name,
            value: Rc::from(value),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartElement(name) => write!(f, "SE({name})"),
            Event::EndElement => write!(f, "EE"),
            Event::Attribute { name, value } => write!(f, "AT({name}=\"{value}\")"),
            Event::Characters { value, .. } => write!(f, "CH({value:?})"),
            Event::NamespaceDeclaration { prefix, uri } => {
                write!(f, "NS({prefix}={uri})")
            }
            Event::Comment(text) => write!(f, "CM({text:?})"),
            Event::ProcessingInstruction { target, .. } => write!(f, "PI({target})"),
        }
    }
}
