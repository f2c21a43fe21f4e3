use chrono::Duration;

use super::xml::{parse_document, Element};
use super::{clean_title, owned, parse_date, Dialect, Entry, ParseError, Transcode};
use crate::domain::{Feed, Image};

pub(super) fn parse(data: &[u8], ctx: &Transcode<'_>) -> Result<Feed, ParseError> {
    let root = parse_document(data, Dialect::Rss1)?;
    let channel = root.child("channel").ok_or(ParseError::MissingElement {
        dialect: Dialect::Rss1,
        element: "channel",
    })?;

    let mut feed = Feed::default();
    feed.title = clean_title(channel.child_text("title"));
    feed.description = owned(channel.child_text("description"));
    feed.link = owned(channel.child_text("link"));
    feed.image = root.child("image").map(image);
    feed.refresh = Some(ctx.refresh_after(syndication_interval(channel)));

    for item in root.children_named("item") {
        ctx.admit(&mut feed, entry(item));
    }

    Ok(feed)
}

/// `sy:updatePeriod` / `sy:updateFrequency` from the syndication module.
fn syndication_interval(channel: &Element) -> Option<Duration> {
    let period = match channel.child_text("updatePeriod")? {
        "hourly" => Duration::hours(1),
        "daily" => Duration::days(1),
        "weekly" => Duration::weeks(1),
        "monthly" => Duration::days(30),
        "yearly" => Duration::days(365),
        _ => return None,
    };
    let frequency = channel
        .child_text("updateFrequency")
        .and_then(|f| f.parse::<i32>().ok())
        .filter(|f| *f > 0)
        .unwrap_or(1);
    Some(period / frequency)
}

fn entry(item: &Element) -> Entry {
    let content = item
        .child_text("encoded")
        .or_else(|| item.child_text("description"));

    Entry {
        native_id: item.attr("about").map(|about| about.trim().to_string()),
        title: clean_title(item.child_text("title")),
        content: owned(content),
        link: owned(item.child_text("link")),
        published: item.child_text("date").and_then(parse_date),
        updated: None,
    }
}

fn image(element: &Element) -> Image {
    Image {
        title: owned(element.child_text("title")),
        url: owned(element.child_text("url")),
        height: 0,
        width: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::parser::{IdentifierCache, Parser};

    use super::*;

    const RDF_SAMPLE: &str = r#"<?xml version="1.0"?>
<rdf:RDF
  xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
  xmlns:dc="http://purl.org/dc/elements/1.1/"
  xmlns:sy="http://purl.org/rss/1.0/modules/syndication/"
  xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.org/rss">
    <title>RDF Feed</title>
    <link>https://example.org/</link>
    <description>An RSS 1.0 feed</description>
    <sy:updatePeriod>hourly</sy:updatePeriod>
    <sy:updateFrequency>2</sy:updateFrequency>
    <image rdf:resource="https://example.org/logo.gif"/>
    <items>
      <rdf:Seq>
        <rdf:li resource="https://example.org/a"/>
        <rdf:li resource="https://example.org/b"/>
      </rdf:Seq>
    </items>
  </channel>
  <image rdf:about="https://example.org/logo.gif">
    <title>Example</title>
    <url>https://example.org/logo.gif</url>
    <link>https://example.org/</link>
  </image>
  <item rdf:about="https://example.org/a">
    <title>First</title>
    <link>https://example.org/a?utm=1</link>
    <description>First entry</description>
    <dc:date>2024-03-05T08:00:00Z</dc:date>
  </item>
  <item>
    <title>Second</title>
    <link>https://example.org/b</link>
  </item>
</rdf:RDF>"#;

    fn parse_sample() -> Feed {
        Parser::with_cache(Arc::new(IdentifierCache::new()))
            .parse(RDF_SAMPLE.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_parse_rss1_fixture() {
        let feed = parse_sample();

        assert_eq!(feed.title, "RDF Feed");
        assert_eq!(feed.description, "An RSS 1.0 feed");
        assert_eq!(feed.link, "https://example.org/");
        let ids: Vec<_> = feed.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["https://example.org/a", "https://example.org/b"]);
    }

    #[test]
    fn test_dc_date_and_content() {
        let feed = parse_sample();
        let first = &feed.items()[0];
        assert_eq!(first.content, "First entry");
        assert_eq!(first.link, "https://example.org/a?utm=1");
        assert_eq!(
            first.pub_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_image_from_root() {
        let image = parse_sample().image.unwrap();
        assert_eq!(image.title, "Example");
        assert_eq!(image.url, "https://example.org/logo.gif");
    }

    #[test]
    fn test_syndication_refresh() {
        let before = Utc::now();
        let refresh = parse_sample().refresh.unwrap();
        assert!(refresh >= before + Duration::minutes(30));
        assert!(refresh <= Utc::now() + Duration::minutes(30));
    }
}
