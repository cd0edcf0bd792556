//! Qualified Names: Namespace-URI plus Local Name, mit optionalem Prefix.
//!
//! Identität eines QName ist das Paar (uri, local_name); das Prefix ist
//! reine Serialisierungs-Kosmetik und geht weder in `Eq` noch in `Hash`
//! ein. Zwei Elemente mit verschiedenen Prefixen, aber gleicher URI,
//! teilen sich denselben Grammar- und String-Table-Eintrag.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A qualified XML name.
#[derive(Debug, Clone)]
pub struct QName {
    /// Namespace-URI; leerer String = kein Namespace.
    pub uri: Rc<str>,
    pub local_name: Rc<str>,
    /// Deklariertes Prefix, falls Prefix-Erhaltung aktiv ist.
    pub prefix: Option<Rc<str>>,
}

impl QName {
    /// Creates a `QName` in the given namespace, without a prefix.
    pub fn new(uri: &str, local_name: &str) -> Self {
        Self {
            uri: Rc::from(uri),
            local_name: Rc::from(local_name),
            prefix: None,
        }
    }

    /// Creates a `QName` without a namespace.
    pub fn unqualified(local_name: &str) -> Self {
        Self::new("", local_name)
    }

    /// Attaches a prefix, builder-style.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(Rc::from(prefix));
        self
    }

    /// True wenn der Name keinem Namespace angehört.
    pub fn is_unqualified(&self) -> bool {
        self.uri.is_empty()
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
        self.local_name.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) if !p.is_empty() => write!(f, "{}:{}", p, self.local_name),
            _ if self.uri.is_empty() => write!(f, "{}", self.local_name),
            _ => write!(f, "{{{}}}{}", self.uri, self.local_name),
        }
    }
}
