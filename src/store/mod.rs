//! JSON state file holding every subscribed feed and the known-identifier set.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::app::{Result, RunnelError};
use crate::domain::Feed;
use crate::parser::IdentifierCache;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub feeds: Vec<Feed>,
    pub known_ids: HashSet<String>,
}

pub struct FeedStore {
    path: PathBuf,
    state: StateFile,
    cache: Arc<IdentifierCache>,
}

impl FeedStore {
    /// Load the state at `path`, or start empty if there is none yet.
    ///
    /// The saved identifiers replace whatever `cache` currently holds.
    pub fn open(path: impl Into<PathBuf>, cache: Arc<IdentifierCache>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read(&path)?;
            serde_json::from_slice(&content)?
        } else {
            StateFile::default()
        };

        tracing::debug!(path = %path.display(), feeds = state.feeds.len(), known = state.known_ids.len(), "Opened state file");
        cache.restore(state.known_ids.clone());

        Ok(Self { path, state, cache })
    }

    /// Write feeds and the cache's current identifiers back to disk.
    pub fn save(&mut self) -> Result<()> {
        self.state.known_ids = self.cache.known();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec_pretty(&self.state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), feeds = self.state.feeds.len(), "Saved state file");
        Ok(())
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.state.feeds
    }

    pub fn feeds_mut(&mut self) -> &mut Vec<Feed> {
        &mut self.state.feeds
    }

    pub fn take_feeds(&mut self) -> Vec<Feed> {
        std::mem::take(&mut self.state.feeds)
    }

    pub fn get_feed_by_url(&self, url: &str) -> Option<&Feed> {
        self.state.feeds.iter().find(|f| f.update_url == url)
    }

    /// Subscribe to `feed`, returning its id. A feed with the same URL is
    /// kept as is.
    pub fn add_feed(&mut self, mut feed: Feed) -> Result<i64> {
        if feed.update_url.is_empty() {
            return Err(RunnelError::NoUrl);
        }
        if let Some(existing) = self.get_feed_by_url(&feed.update_url) {
            return Ok(existing.id);
        }

        feed.id = self.state.feeds.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let id = feed.id;
        self.state.feeds.push(feed);
        Ok(id)
    }

    pub fn remove_feed(&mut self, url: &str) -> Result<Feed> {
        let pos = self
            .state
            .feeds
            .iter()
            .position(|f| f.update_url == url)
            .ok_or_else(|| RunnelError::FeedNotFound(url.to_string()))?;
        Ok(self.state.feeds.remove(pos))
    }
}
