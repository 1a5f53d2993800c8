use agentsite_core::TocItem;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Parser, Tag, html};
use serde::Serialize;
use std::ops::Range;

use crate::toc::{MARKDOWN_OPTIONS, extract_toc, heading_item, heading_text, slugify};

/// Rendered article body and its outline
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub toc: Vec<TocItem>,
    pub html: String,
}

impl ArticleView {
    pub fn render(markdown: &str) -> Self {
        Self {
            toc: extract_toc(markdown),
            html: render_article(markdown),
        }
    }
}

/// Render markdown to HTML, giving h2/h3 headings the same ids the TOC links to
pub fn render_article(markdown: &str) -> String {
    let events: Vec<(Event<'_>, Range<usize>)> =
        Parser::new_ext(markdown, MARKDOWN_OPTIONS).into_offset_iter().collect();

    let mut tagged = Vec::with_capacity(events.len());
    for (i, (event, range)) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) if matches!(level, HeadingLevel::H2 | HeadingLevel::H3) => {
                // ATX headings take their id from the source line, like the TOC;
                // setext and nested headings fall back to the rendered text
                let id = markdown[range.start..]
                    .lines()
                    .next()
                    .and_then(heading_item)
                    .map(|item| item.id)
                    .unwrap_or_else(|| {
                        let rest: Vec<Event<'_>> =
                            events[i + 1..].iter().map(|(e, _)| e.clone()).collect();
                        slugify(&heading_text(&rest))
                    });

                tagged.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: (!id.is_empty()).then(|| CowStr::from(id)),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            other => tagged.push(other.clone()),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, tagged.into_iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_article_adds_heading_ids() {
        let html = render_article("## Intro\n\nSome text\n\n### Sub Point!\n");
        assert!(html.contains("<h2 id=\"intro\">Intro</h2>"));
        assert!(html.contains("<h3 id=\"sub-point\">Sub Point!</h3>"));
        assert!(html.contains("<p>Some text</p>"));
    }

    #[test]
    fn test_render_article_leaves_other_levels_alone() {
        let html = render_article("# Title\n\n#### Deep\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<h4>Deep</h4>"));
    }

    #[test]
    fn test_inline_code_heading_text() {
        let html = render_article("## Using `agent run`\n");
        assert!(html.contains("<h2 id=\"using-agent-run\">"));
    }

    #[test]
    fn test_article_view_ids_match_rendered_anchors() {
        let view = ArticleView::render("## Why Agents\n\n### Cost & Time\n");
        assert_eq!(view.toc.len(), 2);
        assert_toc_anchors_resolve(&view);
    }

    fn assert_toc_anchors_resolve(view: &ArticleView) {
        for item in &view.toc {
            assert!(
                view.html.contains(&format!("id=\"{}\"", item.id)),
                "missing anchor for {} in {}",
                item.id,
                view.html
            );
        }
    }

    #[test]
    fn test_closing_hashes_give_same_id_in_toc_and_html() {
        let view = ArticleView::render("## Pricing ##\n\nText\n");
        assert_eq!(view.toc[0].id, "pricing");
        assert!(view.html.contains("<h2 id=\"pricing\">Pricing</h2>"));
        assert_toc_anchors_resolve(&view);
    }

    #[test]
    fn test_linked_heading_gives_same_id_in_toc_and_html() {
        let view = ArticleView::render("## [Docs](https://example.com/docs)\n\n### Q&amp;A ###\n");
        assert_eq!(view.toc.len(), 2);
        assert_eq!(view.toc[0].id, "docs");
        assert!(view.html.contains("<h2 id=\"docs\">"));
        assert_toc_anchors_resolve(&view);
    }

    #[test]
    fn test_setext_heading_still_gets_id() {
        let html = render_article("Getting Started\n---------------\n");
        assert!(html.contains("<h2 id=\"getting-started\">Getting Started</h2>"));
    }
}
