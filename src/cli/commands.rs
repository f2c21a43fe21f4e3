use std::path::Path;

use crate::app::{AppContext, Result};
use crate::domain::{Credentials, Feed};
use crate::fetcher;
use crate::store::FeedStore;

pub async fn add_feed(
    ctx: &AppContext,
    store: &mut FeedStore,
    url: &str,
    nickname: Option<String>,
    insecure: bool,
    credentials: Credentials,
) -> Result<()> {
    if store.get_feed_by_url(url).is_some() {
        println!("Feed already exists: {}", url);
        return Ok(());
    }

    let mut feed = Feed::new(url);
    feed.nickname = nickname.unwrap_or_default();
    feed.insecure = insecure;
    feed.credentials = credentials;

    match ctx.updater.update(&mut feed).await {
        Ok(()) => {
            if !feed.title.is_empty() {
                println!("Feed title: {}", feed.title);
            }
            println!("Fetched {} items", feed.items().len());
        }
        Err(e) => eprintln!("Could not fetch {}: {}", url, e),
    }

    store.add_feed(feed)?;
    println!("Added feed: {}", url);
    Ok(())
}

pub fn remove_feed(store: &mut FeedStore, url: &str) -> Result<()> {
    store.remove_feed(url)?;
    println!("Removed feed: {}", url);
    Ok(())
}

/// Merge new items into every feed whose refresh time has passed.
pub async fn update_feeds(ctx: &AppContext, store: &mut FeedStore) -> Result<()> {
    let feeds = store.take_feeds();

    if feeds.is_empty() {
        println!("No feeds to update");
        return Ok(());
    }

    println!("Updating {} feeds...", feeds.len());

    let results = ctx.parallel_updater.update_all(feeds).await;

    let mut total_new = 0;
    let mut errors = 0;

    for (feed, result) in results {
        match result {
            Ok(count) => {
                total_new += count;
                if count > 0 {
                    println!("  {} new items from {}", count, feed.display_title());
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error updating {}: {}", feed.display_title(), e);
            }
        }
        store.feeds_mut().push(feed);
    }

    println!("Update complete: {} new items, {} errors", total_new, errors);
    Ok(())
}

/// Print the current document of every feed, history untouched.
pub async fn print_new_items(ctx: &AppContext, store: &mut FeedStore) -> Result<()> {
    if store.feeds().is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in store.feeds_mut() {
        match ctx.updater.get_new(feed).await {
            Ok(items) => {
                println!("{} [{}]", feed.display_title(), feed.status);
                for item in items {
                    println!("  {}", item.format("  "));
                }
            }
            Err(e) => {
                eprintln!("{} [{}]: {}", feed.display_title(), feed.status, e);
            }
        }
    }

    Ok(())
}

pub fn list_feeds(store: &FeedStore) {
    if store.feeds().is_empty() {
        println!("No feeds");
        return;
    }

    for feed in store.feeds() {
        let status = if feed.status.is_empty() {
            String::new()
        } else {
            format!(" [{}]", feed.status)
        };
        println!(
            "{} ({} unread){}\n  {}",
            feed.display_title(),
            feed.unread,
            status,
            feed.update_url
        );
    }
}

pub fn list_items(store: &FeedStore) {
    let items: Vec<_> = store.feeds().iter().flat_map(|f| f.items()).collect();

    if items.is_empty() {
        println!("No items");
        return;
    }

    for item in items {
        let read_marker = if item.read { " " } else { "*" };
        let date = item.date.format("%Y-%m-%d");
        println!("{} {} {} ({})", read_marker, date, item.display_title(), item.feed);
    }
}

pub async fn fetch_once(ctx: &AppContext, url: &str, insecure: bool, credentials: &Credentials) -> Result<()> {
    let feed = fetcher::fetch(url, insecure, credentials, &ctx.config.fetch).await?;
    println!("{}", feed);
    Ok(())
}

pub fn parse_file(ctx: &AppContext, path: &Path) -> Result<()> {
    let data = std::fs::read(path)?;
    let feed = ctx.updater.parser().parse(&data)?;
    println!("{}", feed);
    Ok(())
}
