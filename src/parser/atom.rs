use super::xml::{parse_document, Element};
use super::{clean_title, owned, parse_date, Dialect, Entry, ParseError, Transcode};
use crate::domain::{Feed, Image};

pub(super) fn parse(data: &[u8], ctx: &Transcode<'_>) -> Result<Feed, ParseError> {
    let root = parse_document(data, Dialect::Atom)?;

    let mut feed = Feed::default();
    feed.title = clean_title(root.child_text("title"));
    feed.description = owned(root.child_text("subtitle"));
    feed.link = alternate_link(&root).unwrap_or_default();
    feed.image = root
        .child_text("logo")
        .or_else(|| root.child_text("icon"))
        .map(|url| Image {
            title: feed.title.clone(),
            url: url.to_string(),
            ..Image::default()
        });
    feed.refresh = Some(ctx.refresh_after(None));

    for entry_element in root.children_named("entry") {
        ctx.admit(&mut feed, entry(entry_element));
    }

    Ok(feed)
}

fn entry(element: &Element) -> Entry {
    let content = element
        .child("content")
        .map(text_construct)
        .filter(|c| !c.is_empty())
        .or_else(|| element.child("summary").map(text_construct));

    Entry {
        native_id: element.child_text("id").map(str::to_string),
        title: clean_title(element.child_text("title")),
        content: content.unwrap_or_default(),
        link: alternate_link(element).unwrap_or_default(),
        published: element.child_text("published").and_then(parse_date),
        updated: element.child_text("updated").and_then(parse_date),
    }
}

/// `href` of the first `<link>` whose rel is absent or `alternate`.
fn alternate_link(element: &Element) -> Option<String> {
    element
        .children_named("link")
        .filter(|link| matches!(link.attr("rel"), None | Some("alternate")))
        .find_map(|link| link.attr("href"))
        .map(|href| href.trim().to_string())
}

/// Atom text constructs may carry inline XHTML markup as child elements.
fn text_construct(element: &Element) -> String {
    if element.attr("type") == Some("xhtml") {
        element.deep_text().trim().to_string()
    } else {
        element.text.trim().to_string()
    }
}
