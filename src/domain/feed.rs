use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Item;

/// Username/password pair sent as HTTP basic auth.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both halves must be present for basic auth to be sent.
    pub fn is_set(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// A username was configured, so a login page in place of the feed
    /// means the login was rejected.
    pub fn supplied(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub title: String,
    pub url: String,
    pub height: u32,
    pub width: u32,
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image {:?}", self.title)
    }
}

/// One syndication source plus its accumulated item history.
///
/// Items only enter the history through [`Feed::admit`], which keeps the
/// ordered item sequence and the identifier ledger in step. The ledger may
/// hold identifiers of items that are no longer in the sequence, never the
/// other way round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Feed {
    pub nickname: String,
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(rename = "xmlurl")]
    pub update_url: String,
    pub image: Option<Image>,
    items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_map: Option<HashSet<String>>,
    pub refresh: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,
    pub unread: u32,
    pub id: i64,
    pub status: String,
    pub insecure: bool,
    pub credentials: Credentials,
}

impl Feed {
    pub fn new(update_url: impl Into<String>) -> Self {
        Self {
            update_url: update_url.into(),
            ..Self::default()
        }
    }

    /// Feed with an existing history but no ledger yet, as when loaded
    /// from storage that only kept the items.
    pub fn from_items(update_url: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            update_url: update_url.into(),
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn item_map(&self) -> Option<&HashSet<String>> {
        self.item_map.as_ref()
    }

    /// Build the ledger from the current items if it does not exist yet.
    pub fn ensure_item_map(&mut self) -> &mut HashSet<String> {
        let items = &self.items;
        self.item_map
            .get_or_insert_with(|| items.iter().map(|item| item.id.clone()).collect())
    }

    /// Append `item` unless its id is already in the ledger.
    ///
    /// Returns whether the item was admitted. Admission counts as unread.
    pub fn admit(&mut self, mut item: Item) -> bool {
        let owner = self.display_title().to_string();
        if !self.ensure_item_map().insert(item.id.clone()) {
            return false;
        }
        item.feed = owner;
        self.items.push(item);
        self.unread += 1;
        true
    }

    /// Ledger covers every item and no id appears twice in the sequence.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.items.len());
        let unique = self.items.iter().all(|item| seen.insert(item.id.as_str()));
        let covered = match &self.item_map {
            Some(map) => self.items.iter().all(|item| map.contains(&item.id)),
            None => true,
        };
        unique && covered
    }

    pub fn display_title(&self) -> &str {
        if !self.nickname.is_empty() {
            &self.nickname
        } else if !self.title.is_empty() {
            &self.title
        } else {
            &self.update_url
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let image = self
            .image
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "no image".into());
        let refresh = self
            .refresh
            .map(|r| r.format("%a %-d %b %Y %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into());
        writeln!(
            f,
            "Feed {:?}\n\t{:?}\n\t{:?}\n\t{}\n\tRefresh at {}\n\tUnread: {}\n\tItems:",
            self.title, self.description, self.link, image, refresh, self.unread
        )?;
        for item in &self.items {
            writeln!(f, "\t{}", item.format("\t\t"))?;
        }
        Ok(())
    }
}
