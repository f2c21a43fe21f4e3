use std::fmt;

use thiserror::Error;

/// The three supported feed grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Rss1,
    Rss2,
    Atom,
}

impl Dialect {
    /// Local name of the root element the dialect requires.
    pub fn root_element(self) -> &'static str {
        match self {
            Dialect::Rss1 => "RDF",
            Dialect::Rss2 => "rss",
            Dialect::Atom => "feed",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Rss1 => f.write_str("RSS 1.0"),
            Dialect::Rss2 => f.write_str("RSS 2.0"),
            Dialect::Atom => f.write_str("Atom"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{dialect}: malformed XML: {message}")]
    Xml { dialect: Dialect, message: String },

    #[error("{dialect}: expected element type <{expected}> but have <{found}>")]
    UnexpectedRoot {
        dialect: Dialect,
        expected: &'static str,
        found: String,
    },

    #[error("{dialect}: missing <{element}> element")]
    MissingElement {
        dialect: Dialect,
        element: &'static str,
    },

    #[error("{dialect}: document has no root element")]
    Empty { dialect: Dialect },
}

impl ParseError {
    pub fn dialect(&self) -> Dialect {
        match self {
            ParseError::Xml { dialect, .. }
            | ParseError::UnexpectedRoot { dialect, .. }
            | ParseError::MissingElement { dialect, .. }
            | ParseError::Empty { dialect } => *dialect,
        }
    }

    /// The payload was tried as Atom and its root element was something
    /// else, which is what an HTML login page served in place of a feed
    /// looks like.
    pub fn is_atom_root_mismatch(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedRoot {
                dialect: Dialect::Atom,
                ..
            }
        )
    }
}
