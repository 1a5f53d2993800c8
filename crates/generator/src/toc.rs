use agentsite_core::TocItem;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,3})\s+(.+)$").expect("valid heading pattern"));

pub(crate) const MARKDOWN_OPTIONS: Options =
    Options::ENABLE_TABLES.union(Options::ENABLE_STRIKETHROUGH);

/// Collect level-2 and level-3 ATX headings, in document order.
///
/// Identical heading text yields identical ids; nothing is de-duplicated.
pub fn extract_toc(markdown: &str) -> Vec<TocItem> {
    markdown.lines().filter_map(heading_item).collect()
}

/// TOC entry for a single source line, if it is a `##`/`###` heading.
///
/// The text is what the heading displays: closing `#`s, link targets and
/// emphasis markers are gone and entities are decoded. Rendered anchors use
/// this same function, so TOC ids and `id` attributes cannot drift apart.
pub(crate) fn heading_item(line: &str) -> Option<TocItem> {
    let line = line.trim_end_matches('\r');
    let caps = HEADING.captures(line)?;
    let events: Vec<Event<'_>> = Parser::new_ext(line, MARKDOWN_OPTIONS).collect();
    let start = events
        .iter()
        .position(|e| matches!(e, Event::Start(Tag::Heading { .. })))?;

    let text = heading_text(&events[start + 1..]);
    if text.is_empty() {
        return None;
    }
    Some(TocItem {
        id: slugify(&text),
        level: caps[1].len() as u8,
        text,
    })
}

/// Plain text of a heading, up to its end tag
pub(crate) fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Anchor id for a heading.
///
/// ```text
/// "Sub Point!"        → "sub-point"
/// "Agents  &  Tools"  → "agents-tools"
/// "Q&A - part 2"      → "qa-part-2"
/// ```
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut pending_hyphen = false;
    for c in kept.chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }
    if pending_hyphen {
        slug.push('-');
    }
    slug
}
