//! Format classification and the RSS 1.0 / RSS 2.0 / Atom transcoders.
//!
//! [`Parser::parse`] sniffs the payload with [`classify`] and hands it to
//! the matching transcoder, which turns it into a [`Feed`] snapshot.

pub mod cache;
mod atom;
mod date;
mod error;
mod rss1;
mod rss2;
mod xml;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use html_escape::decode_html_entities;

use crate::domain::{Feed, Item};

pub use cache::{cache_parsed_item_ids, known_identifiers, restore_known_identifiers, IdentifierCache};
pub use date::parse_date;
pub use error::{Dialect, ParseError};

/// Literal that marks an RSS 0.9x/2.0 root element.
pub const RSS2_MARKER: &str = "<rss";
/// RSS 1.0 default namespace declaration.
pub const RSS1_MARKER: &str = r#"xmlns="http://purl.org/rss/1.0/""#;

pub const DEFAULT_REFRESH_MINS: i64 = 10;

/// Decide which transcoder handles `data`.
///
/// Substring sniffing with fixed precedence: RSS 2.0 marker, then the
/// RSS 1.0 namespace, then Atom. Atom is never checked for; anything
/// unrecognised is attempted as Atom and fails there.
pub fn classify(data: &[u8]) -> Dialect {
    if contains(data, RSS2_MARKER.as_bytes()) {
        Dialect::Rss2
    } else if contains(data, RSS1_MARKER.as_bytes()) {
        Dialect::Rss1
    } else {
        Dialect::Atom
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Clone)]
pub struct Parser {
    cache: Arc<IdentifierCache>,
    default_refresh: Duration,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Parser backed by the process-wide identifier cache.
    pub fn new() -> Self {
        Self::with_cache(IdentifierCache::global())
    }

    pub fn with_cache(cache: Arc<IdentifierCache>) -> Self {
        Self {
            cache,
            default_refresh: Duration::minutes(DEFAULT_REFRESH_MINS),
        }
    }

    /// Refresh interval used when the document carries no hint of its own.
    pub fn default_refresh(mut self, interval: Duration) -> Self {
        self.default_refresh = interval;
        self
    }

    pub fn cache(&self) -> &Arc<IdentifierCache> {
        &self.cache
    }

    pub fn parse(&self, data: &[u8]) -> Result<Feed, ParseError> {
        let dialect = classify(data);
        tracing::debug!(%dialect, bytes = data.len(), "Classified feed payload");
        self.parse_as(dialect, data)
    }

    /// Parse with a fixed dialect, bypassing classification.
    pub fn parse_as(&self, dialect: Dialect, data: &[u8]) -> Result<Feed, ParseError> {
        let ctx = Transcode {
            cache: &self.cache,
            now: Utc::now(),
            default_refresh: self.default_refresh,
        };
        match dialect {
            Dialect::Rss2 => rss2::parse(data, &ctx),
            Dialect::Rss1 => rss1::parse(data, &ctx),
            Dialect::Atom => atom::parse(data, &ctx),
        }
    }
}

/// Per-parse state shared by the transcoders.
struct Transcode<'a> {
    cache: &'a IdentifierCache,
    now: DateTime<Utc>,
    default_refresh: Duration,
}

impl Transcode<'_> {
    fn refresh_after(&self, interval: Option<Duration>) -> DateTime<Utc> {
        self.now + interval.unwrap_or(self.default_refresh)
    }

    /// Resolve the entry's identity and admit it into the snapshot.
    fn admit(&self, feed: &mut Feed, entry: Entry) {
        let Some(item) = entry.into_item(self.now) else {
            tracing::debug!(feed = %feed.title, "Dropping entry without id, link, title or content");
            return;
        };
        if self.cache.observe(&item.id) {
            tracing::trace!(id = %item.id, "Identifier already seen");
        }
        feed.admit(item);
    }
}

/// Dialect-neutral view of one entry before its identity is resolved.
#[derive(Debug, Default)]
struct Entry {
    native_id: Option<String>,
    title: String,
    content: String,
    link: String,
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl Entry {
    fn into_item(self, now: DateTime<Utc>) -> Option<Item> {
        let id = match self.native_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None if !self.link.is_empty() => self.link.clone(),
            None if !self.title.is_empty() || !self.content.is_empty() => {
                Item::fingerprint(&[&self.title, &self.content])
            }
            None => return None,
        };

        let pub_date = self.published.or(self.updated);
        let mut item = Item::new(id);
        item.title = self.title;
        item.content = self.content;
        item.link = self.link;
        item.date = self.updated.or(self.published).unwrap_or(now);
        item.pub_date = pub_date;
        Some(item)
    }
}

fn clean_title(raw: Option<&str>) -> String {
    raw.map(|t| decode_html_entities(t.trim()).into_owned())
        .unwrap_or_default()
}

fn owned(raw: Option<&str>) -> String {
    raw.map(|t| t.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS2: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>R2</title></channel></rss>"#;
    const RSS1: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.com/"><title>R1</title></channel>
</rdf:RDF>"#;
    const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>A</title></feed>"#;

    fn parser() -> Parser {
        Parser::with_cache(Arc::new(IdentifierCache::new()))
    }

    #[test]
    fn test_classify_each_dialect() {
        assert_eq!(classify(RSS2.as_bytes()), Dialect::Rss2);
        assert_eq!(classify(RSS1.as_bytes()), Dialect::Rss1);
        assert_eq!(classify(ATOM.as_bytes()), Dialect::Atom);
    }

    #[test]
    fn test_classify_rss2_marker_wins_over_rss1_namespace() {
        let doc = format!("{}<!-- <rss -->", RSS1);
        assert_eq!(classify(doc.as_bytes()), Dialect::Rss2);
    }

    #[test]
    fn test_classify_unknown_falls_back_to_atom() {
        assert_eq!(classify(b"<html><body>Login</body></html>"), Dialect::Atom);
        assert_eq!(classify(b""), Dialect::Atom);
    }

    #[test]
    fn test_parse_dispatches_on_classification() {
        let parser = parser();
        assert_eq!(parser.parse(RSS2.as_bytes()).unwrap().title, "R2");
        assert_eq!(parser.parse(RSS1.as_bytes()).unwrap().title, "R1");
        assert_eq!(parser.parse(ATOM.as_bytes()).unwrap().title, "A");
    }

    #[test]
    fn test_misclassified_payload_fails_in_chosen_transcoder() {
        // An Atom document quoting "<rss" in CDATA goes to the RSS 2.0 transcoder.
        let doc = r#"<feed><title><![CDATA[about <rss> feeds]]></title></feed>"#;
        let err = parser().parse(doc.as_bytes()).unwrap_err();
        assert_eq!(err.dialect(), Dialect::Rss2);
    }

    #[test]
    fn test_default_refresh_applied() {
        let parser = parser().default_refresh(Duration::minutes(30));
        let before = Utc::now();
        let feed = parser.parse(ATOM.as_bytes()).unwrap();
        let refresh = feed.refresh.unwrap();
        assert!(refresh >= before + Duration::minutes(30));
        assert!(refresh <= Utc::now() + Duration::minutes(30));
    }

    #[test]
    fn test_entry_identity_fallbacks() {
        let now = Utc::now();
        let native = Entry {
            native_id: Some("guid".into()),
            link: "https://example.com/1".into(),
            ..Entry::default()
        };
        assert_eq!(native.into_item(now).unwrap().id, "guid");

        let linked = Entry {
            native_id: Some(String::new()),
            link: "https://example.com/1".into(),
            ..Entry::default()
        };
        assert_eq!(linked.into_item(now).unwrap().id, "https://example.com/1");

        let titled = Entry {
            title: "Only a title".into(),
            ..Entry::default()
        };
        assert_eq!(
            titled.into_item(now).unwrap().id,
            Item::fingerprint(&["Only a title", ""])
        );

        assert!(Entry::default().into_item(now).is_none());
    }

    #[test]
    fn test_entry_without_date_uses_parse_time() {
        let now = Utc::now();
        let item = Entry {
            native_id: Some("x".into()),
            ..Entry::default()
        }
        .into_item(now)
        .unwrap();
        assert_eq!(item.date, now);
        assert!(item.pub_date.is_none());
    }
}
