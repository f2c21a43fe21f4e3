//! Minimal element tree over `quick-xml` events.
//!
//! Names are stored without their namespace prefix; the transcoders match
//! on local names only.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use super::error::{Dialect, ParseError};

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let attrs = start
            .attributes()
            .flatten()
            .filter(|attr| !attr.key.as_ref().starts_with(b"xmlns"))
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                };
                (key, value)
            })
            .collect();

        Self {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first child called `name`, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.text.trim())
            .find(|t| !t.is_empty())
    }

    /// Text of this element and all of its descendants, in document order.
    pub fn deep_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            let inner = child.deep_text();
            if !inner.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&inner);
            }
        }
        out
    }
}

/// Parse `data` into an element tree whose root must be the dialect's root
/// element. The root name is checked as soon as it is read, so a non-feed
/// body fails with [`ParseError::UnexpectedRoot`] even if it is not
/// well-formed XML further down.
pub fn parse_document(data: &[u8], dialect: Dialect) -> Result<Element, ParseError> {
    let expected = dialect.root_element();
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ParseError::Xml {
            dialect,
            message: format!("{} at byte {}", e, reader.error_position()),
        })?;

        match event {
            Event::Start(start) => {
                let element = Element::open(&start);
                if stack.is_empty() {
                    check_root(&element, dialect, expected)?;
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = Element::open(&start);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        check_root(&element, dialect, expected)?;
                        return Ok(element);
                    }
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(ParseError::Xml {
                        dialect,
                        message: "unexpected closing tag".into(),
                    });
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&decode_text(&text));
                }
            }
            Event::CData(cdata) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => {
                return Err(if stack.is_empty() {
                    ParseError::Empty { dialect }
                } else {
                    ParseError::Xml {
                        dialect,
                        message: "unexpected end of document".into(),
                    }
                });
            }
            _ => {}
        }
        buf.clear();
    }
}

fn check_root(element: &Element, dialect: Dialect, expected: &'static str) -> Result<(), ParseError> {
    if element.name == expected {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot {
            dialect,
            expected,
            found: element.name.clone(),
        })
    }
}

/// XML-unescape, falling back to HTML entity decoding for entities such as
/// `&nbsp;` that plain XML does not define.
fn decode_text(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            let raw = String::from_utf8_lossy(text);
            html_escape::decode_html_entities(&raw).into_owned()
        }
    }
}
