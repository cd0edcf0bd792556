//! Die Grammar: Zustandsstapel und Event-Codes.
//!
//! Jede Phase besitzt eine geordnete Menge zulässiger Event-Arten; der
//! Event-Code ist der Index in dieser Menge, geschrieben in
//! ceil(log2(Mengengröße)) Bits. Die Mengen hängen von den
//! Fidelity-Optionen ab und stehen für die Dauer einer Session fest,
//! daher werden sie einmalig beim Anlegen berechnet.
//!
//! Invarianten: die Tiefe ist nie negativ (EE bei Tiefe 0 ist gar nicht
//! erst zulässig), und das Dokumentende ist nur bei Tiefe 0 erreichbar.

use std::rc::Rc;

use crate::bit_width;
use crate::options::SessionOptions;

/// The kinds of events a grammar state can admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StartElement,
    EndElement,
    Attribute,
    Characters,
    NamespaceDeclaration,
    Comment,
    ProcessingInstruction,
    /// ED — terminiert den Stream.
    EndDocument,
}

impl EventKind {
    /// Kurzname für Fehlermeldungen und Logging.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::StartElement => "SE",
            EventKind::EndElement => "EE",
            EventKind::Attribute => "AT",
            EventKind::Characters => "CH",
            EventKind::NamespaceDeclaration => "NS",
            EventKind::Comment => "CM",
            EventKind::ProcessingInstruction => "PI",
            EventKind::EndDocument => "ED",
        }
    }
}

/// Phase of the current grammar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dokumentebene vor dem Root-Element.
    DocContent,
    /// Dokumentebene nach dem Root-Element; nur noch ED (+ CM/PI).
    DocEnd,
    /// Im Start-Tag eines Elements; Attribute noch zulässig.
    StartTag,
    /// Im Inhalt eines Elements; Attribute nicht mehr zulässig.
    ElementContent,
}

impl Phase {
    /// Name der Phase, für `InvalidEventCode`-Meldungen.
    pub fn name(self) -> &'static str {
        match self {
            Phase::DocContent => "document content",
            Phase::DocEnd => "document end",
            Phase::StartTag => "element start-tag",
            Phase::ElementContent => "element content",
        }
    }
}

/// Ein offenes Element auf dem Stapel.
#[derive(Debug)]
struct Frame {
    phase: Phase,
    /// In diesem Start-Tag deklarierte Bindungen (Prefix, URI).
    ns_bindings: Vec<(Rc<str>, Rc<str>)>,
}

/// The grammar of one session: precomputed admissible sets plus the
/// element stack.
#[derive(Debug)]
pub struct Grammar {
    doc_content: Vec<EventKind>,
    doc_end: Vec<EventKind>,
    start_tag: Vec<EventKind>,
    element_content: Vec<EventKind>,
    doc_phase: Phase,
    stack: Vec<Frame>,
}

impl Grammar {
    /// Builds the grammar for the given fidelity options.
    pub fn new(options: &SessionOptions) -> Self {
        let optional = |set: &mut Vec<EventKind>| {
            if options.preserve.comments {
                set.push(EventKind::Comment);
            }
            if options.preserve.pis {
                set.push(EventKind::ProcessingInstruction);
            }
        };

        let mut doc_content = vec![EventKind::StartElement];
        optional(&mut doc_content);

        let mut doc_end = vec![EventKind::EndDocument];
        optional(&mut doc_end);

        let mut start_tag = vec![
            EventKind::Attribute,
            EventKind::StartElement,
            EventKind::Characters,
            EventKind::EndElement,
        ];
        if options.preserve.prefixes {
            start_tag.push(EventKind::NamespaceDeclaration);
        }
        optional(&mut start_tag);

        let mut element_content = vec![
            EventKind::StartElement,
            EventKind::Characters,
            EventKind::EndElement,
        ];
        optional(&mut element_content);

        Self {
            doc_content,
            doc_end,
            start_tag,
            element_content,
            doc_phase: Phase::DocContent,
            stack: Vec::new(),
        }
    }

    /// Current nesting depth (number of open elements).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Phase of the current state.
    pub fn phase(&self) -> Phase {
        match self.stack.last() {
            Some(frame) => frame.phase,
            None => self.doc_phase,
        }
    }

    /// The ordered admissible set of the current state.
    pub fn admissible(&self) -> &[EventKind] {
        match self.phase() {
            Phase::DocContent => &self.doc_content,
            Phase::DocEnd => &self.doc_end,
            Phase::StartTag => &self.start_tag,
            Phase::ElementContent => &self.element_content,
        }
    }

    /// Bit width of an event code in the current state.
    pub fn code_width(&self) -> u8 {
        bit_width::for_count(self.admissible().len())
    }

    /// Event code of `kind` in the current state, or `None` if the kind
    /// is not admissible here.
    pub fn code_for(&self, kind: EventKind) -> Option<u64> {
        self.admissible()
            .iter()
            .position(|&k| k == kind)
            .map(|idx| idx as u64)
    }

    /// Event kind behind `code` in the current state.
    pub fn kind_for(&self, code: u64) -> Option<EventKind> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.admissible().get(idx).copied())
    }

    /// Transition for SE: der umgebende Zustand verlässt seine
    /// Start-Tag-Phase, ein neuer Frame wird geöffnet.
    pub fn on_start_element(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.phase = Phase::ElementContent;
        }
        self.stack.push(Frame {
            phase: Phase::StartTag,
            ns_bindings: Vec::new(),
        });
    }

    /// Transition for EE: closes the current element. Bei Tiefe 0 wird
    /// EE vorher über die Zulässigkeitsmenge abgewiesen.
    pub fn on_end_element(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.doc_phase = Phase::DocEnd;
        }
    }

    /// Transition for CH: content seen, attributes no longer admissible.
    pub fn on_characters(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.phase = Phase::ElementContent;
        }
    }

    /// Records a namespace binding on the current frame.
    pub fn bind_prefix(&mut self, prefix: Rc<str>, uri: Rc<str>) {
        if let Some(frame) = self.stack.last_mut() {
            frame.ns_bindings.push((prefix, uri));
        }
    }

    /// Resolves a prefix against the binding scopes, innermost first.
    pub fn resolve_prefix(&self, prefix: &str) -> Option<Rc<str>> {
        self.stack
            .iter()
            .rev()
            .flat_map(|frame| frame.ns_bindings.iter().rev())
            .find(|(p, _)| &**p == prefix)
            .map(|(_, uri)| Rc::clone(uri))
    }
}
