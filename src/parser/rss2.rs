use chrono::Duration;

use super::xml::{parse_document, Element};
use super::{clean_title, owned, parse_date, Dialect, Entry, ParseError, Transcode};
use crate::domain::{Feed, Image};

pub(super) fn parse(data: &[u8], ctx: &Transcode<'_>) -> Result<Feed, ParseError> {
    let root = parse_document(data, Dialect::Rss2)?;
    let channel = root.child("channel").ok_or(ParseError::MissingElement {
        dialect: Dialect::Rss2,
        element: "channel",
    })?;

    let mut feed = Feed::default();
    feed.title = clean_title(channel.child_text("title"));
    feed.description = owned(channel.child_text("description"));
    feed.link = owned(channel.child_text("link"));
    feed.image = channel.child("image").map(image);

    let ttl = channel
        .child_text("ttl")
        .and_then(|t| t.parse::<i64>().ok())
        .filter(|minutes| *minutes > 0)
        .map(Duration::minutes);
    feed.refresh = Some(ctx.refresh_after(ttl));

    // Some 0.9x feeds put items next to the channel rather than inside it.
    let items = channel
        .children_named("item")
        .chain(root.children_named("item"));
    for item in items {
        ctx.admit(&mut feed, entry(item));
    }

    Ok(feed)
}

fn entry(item: &Element) -> Entry {
    let content = item
        .child_text("encoded")
        .or_else(|| item.child_text("description"));
    let date = item
        .child_text("pubDate")
        .or_else(|| item.child_text("date"))
        .and_then(parse_date);

    Entry {
        native_id: item.child_text("guid").map(str::to_string),
        title: clean_title(item.child_text("title")),
        content: owned(content),
        link: owned(item.child_text("link")),
        published: date,
        updated: None,
    }
}

fn image(element: &Element) -> Image {
    let dimension = |name: &str| {
        element
            .child_text(name)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
    };
    Image {
        title: owned(element.child_text("title")),
        url: owned(element.child_text("url")),
        height: dimension("height"),
        width: dimension("width"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::parser::{IdentifierCache, Parser};

    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <link>https://example.com/</link>
    <atom:link href="https://example.com/feed.xml" rel="self"/>
    <ttl>60</ttl>
    <image>
      <title>Logo</title>
      <url>https://example.com/logo.png</url>
      <width>88</width>
      <height>31</height>
    </image>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
      <content:encoded><![CDATA[<p>Full item 1</p>]]></content:encoded>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <description>This is item 2</description>
    </item>
    <item>
      <title>Duplicate of item 1</title>
      <guid>item-1</guid>
    </item>
  </channel>
</rss>"#;

    fn parse_sample() -> Feed {
        Parser::with_cache(Arc::new(IdentifierCache::new()))
            .parse(RSS_SAMPLE.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_parse_rss2_fixture() {
        let feed = parse_sample();

        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.description, "A test feed");
        assert_eq!(feed.link, "https://example.com/");
        let ids: Vec<_> = feed.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item-1", "https://example.com/item2"]);
        assert_eq!(feed.unread, 2);
        assert!(feed.is_consistent());
    }

    #[test]
    fn test_item_fields() {
        let feed = parse_sample();
        let first = &feed.items()[0];

        assert_eq!(first.title, "Test Item 1");
        assert_eq!(first.link, "https://example.com/item1");
        assert_eq!(first.content, "<p>Full item 1</p>");
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(first.pub_date, Some(expected));
        assert_eq!(first.date, expected);

        let second = &feed.items()[1];
        assert_eq!(second.content, "This is item 2");
        assert!(second.pub_date.is_none());
    }

    #[test]
    fn test_image_and_ttl() {
        let before = Utc::now();
        let feed = parse_sample();

        let image = feed.image.unwrap();
        assert_eq!(image.title, "Logo");
        assert_eq!(image.url, "https://example.com/logo.png");
        assert_eq!((image.width, image.height), (88, 31));
        assert!(feed.refresh.unwrap() >= before + Duration::minutes(60));
    }

    #[test]
    fn test_ids_stable_across_parses() {
        let first: Vec<_> = parse_sample().into_items().into_iter().map(|i| i.id).collect();
        let second: Vec<_> = parse_sample().into_items().into_iter().map(|i| i.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_channel() {
        let err = Parser::with_cache(Arc::new(IdentifierCache::new()))
            .parse(br#"<rss version="2.0"></rss>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingElement {
                element: "channel",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_records_ids_in_cache() {
        let cache = Arc::new(IdentifierCache::new());
        Parser::with_cache(cache.clone())
            .parse(RSS_SAMPLE.as_bytes())
            .unwrap();
        let known = cache.known();
        assert!(known.contains("item-1"));
        assert!(known.contains("https://example.com/item2"));
    }

    #[test]
    fn test_disabled_cache_does_not_change_output() {
        let cache = Arc::new(IdentifierCache::new());
        cache.set_enabled(false);
        let feed = Parser::with_cache(cache.clone())
            .parse(RSS_SAMPLE.as_bytes())
            .unwrap();
        assert_eq!(feed.items().len(), 2);
        assert!(cache.is_empty());
    }
}
