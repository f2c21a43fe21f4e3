use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    #[serde(rename = "description")]
    pub content: String,
    pub link: String,
    /// Effective date: the published date, or the parse time when the
    /// document carried none.
    pub date: DateTime<Utc>,
    #[serde(rename = "pubdate")]
    pub pub_date: Option<DateTime<Utc>>,
    /// Stable identity of the upstream entry, used for de-duplication.
    pub id: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub row_id: i64,
    /// Display name of the owning feed.
    #[serde(default)]
    pub feed: String,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            link: String::new(),
            date: Utc::now(),
            pub_date: None,
            id: id.into(),
            read: false,
            row_id: 0,
            feed: String::new(),
        }
    }

    /// Deterministic identity for entries that carry neither a native id
    /// nor a link.
    pub fn fingerprint(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Format the item with `indent` prefixed to every continuation line.
    pub fn format(&self, indent: &str) -> String {
        format!(
            "Item {:?}\n\t{indent}{:?}\n\t{indent}{}\n\t{indent}{:?}\n\t{indent}Read: {}\n\t{indent}{:?}",
            self.title,
            self.link,
            self.date.format("%a %-d %b %Y %H:%M:%S UTC"),
            self.id,
            self.read,
            self.content,
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(""))
    }
}
