//! Merging fresh snapshots into a feed's history.
//!
//! [`Updater::update`] and [`Updater::get_new`] share the fetch pipeline but
//! answer different questions and must stay distinct:
//!
//! - `update` is rate limited by the feed's refresh time and admits only
//!   items whose id is not in the feed's ledger. Safe to call on a schedule.
//! - `get_new` always fetches and returns every item of the latest snapshot,
//!   without touching the history or the ledger. It records a status string
//!   for display.
//!
//! Neither locks the feed: callers must not run two operations on the same
//! feed at once. Different feeds may be processed concurrently, see
//! [`parallel::ParallelUpdater`].

pub mod parallel;

use std::mem;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::app::{Result, RunnelError};
use crate::domain::{Credentials, Feed, Item};
use crate::fetcher::{fetch_feed, Fetcher};
use crate::parser::Parser;

pub const DEFAULT_STALE_AFTER_HOURS: i64 = 24;

pub const STATUS_UPDATED: &str = "Updated";
pub const STATUS_NOT_MODIFIED: &str = "not modified";
pub const STATUS_UNKNOWN_AUTHORITY: &str = "error: Certificat signed by unknown authority";
pub const STATUS_WRONG_LOGIN: &str = "error: Wrong Login/Password";
pub const STATUS_FETCH_FAILED: &str = "error: unable to fetch feed";

/// Status text recorded on a feed after a failed `get_new`.
pub fn status_for(err: &RunnelError, credentials: &Credentials) -> &'static str {
    match err {
        RunnelError::CertificateUntrusted => STATUS_UNKNOWN_AUTHORITY,
        RunnelError::AuthenticationFailure if credentials.supplied() => STATUS_WRONG_LOGIN,
        _ => STATUS_FETCH_FAILED,
    }
}

pub struct Updater {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: Parser,
    stale_after: Duration,
}

impl Updater {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, parser: Parser) -> Self {
        Self {
            fetcher,
            parser,
            stale_after: Duration::hours(DEFAULT_STALE_AFTER_HOURS),
        }
    }

    /// Age past which `get_new` re-dates an item to the fetch time.
    pub fn stale_after(mut self, age: Duration) -> Self {
        self.stale_after = age;
        self
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    async fn snapshot(&self, feed: &Feed) -> Result<Feed> {
        fetch_feed(
            self.fetcher.as_ref(),
            &self.parser,
            &feed.update_url,
            feed.insecure,
            &feed.credentials,
        )
        .await
    }

    /// Fetch `feed` and append the items it has not seen before.
    ///
    /// Does nothing while `feed.refresh` is in the future. On error the feed
    /// is left as it was, apart from a ledger built from existing items.
    pub async fn update(&self, feed: &mut Feed) -> Result<()> {
        if feed.update_url.is_empty() {
            return Err(RunnelError::NoUrl);
        }

        let now = Utc::now();
        if feed.refresh.is_some_and(|refresh| refresh > now) {
            tracing::debug!(url = %feed.update_url, refresh = ?feed.refresh, "Skipping update, refresh not due");
            return Ok(());
        }

        feed.ensure_item_map();

        let mut update = self.snapshot(feed).await?;

        feed.refresh = update.refresh;
        feed.title = mem::take(&mut update.title);
        feed.description = mem::take(&mut update.description);
        feed.update_date = Some(Utc::now());

        let mut admitted = 0;
        for item in update.into_items() {
            if feed.admit(item) {
                admitted += 1;
            }
        }

        tracing::info!(url = %feed.update_url, admitted, unread = feed.unread, "Feed updated");
        Ok(())
    }

    /// Fetch `feed` and return every item of the current snapshot.
    ///
    /// The history and ledger are untouched; `unread` grows by the number of
    /// items returned. Items dated more than the stale age ago are re-dated
    /// to now, since such dates are usually missing or placeholders.
    pub async fn get_new(&self, feed: &mut Feed) -> Result<Vec<Item>> {
        if feed.update_url.is_empty() {
            return Err(RunnelError::NoUrl);
        }

        let mut update = match self.snapshot(feed).await {
            Ok(update) => update,
            Err(e) => {
                feed.status = status_for(&e, &feed.credentials).to_string();
                tracing::warn!(url = %feed.update_url, error = %e, status = %feed.status, "Fetching new items failed");
                return Err(e);
            }
        };

        let now = Utc::now();
        feed.refresh = update.refresh;
        feed.title = mem::take(&mut update.title);
        feed.description = mem::take(&mut update.description);
        feed.update_date = Some(now);
        feed.status = STATUS_UPDATED.to_string();

        let owner = feed.display_title().to_string();
        let mut articles = Vec::new();
        for mut item in update.into_items() {
            if now.signed_duration_since(item.date) > self.stale_after {
                item.date = now;
            }
            item.feed = owner.clone();
            articles.push(item);
            feed.unread += 1;
        }

        if articles.is_empty() {
            feed.status = STATUS_NOT_MODIFIED.to_string();
        }

        tracing::info!(url = %feed.update_url, count = articles.len(), "Fetched new items");
        Ok(articles)
    }
}
