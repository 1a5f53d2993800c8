//! SEO signal extraction from raw HTML.
//!
//! Pattern matching over text rather than a DOM parse: attribute order and
//! quoting style may vary, but malformed or unclosed tags are not repaired.

use agentsite_core::PageSignalReport;
use regex::Regex;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid title pattern"));
static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&tag_pattern("meta")).expect("valid meta pattern"));
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&tag_pattern("link")).expect("valid link pattern"));
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&tag_pattern("img")).expect("valid img pattern"));
static LD_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\btype\s*=\s*["']?\s*application/ld\+json"#)
        .expect("valid ld+json pattern")
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid attribute pattern")
});

/// Opening tag `name`; a `>` inside a quoted attribute value does not end it
fn tag_pattern(name: &str) -> String {
    format!(r#"(?is)<{}\b(?:[^>"']|"[^"]*"|'[^']*')*>"#, name)
}

/// Which attribute identifies a meta tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKey<'a> {
    /// `<meta name="...">`
    Name(&'a str),
    /// `<meta property="...">`, used by Open Graph
    Property(&'a str),
}

/// Image accessibility and loading audit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageAudit {
    pub total: usize,
    pub missing_alt: usize,
    pub lazy: usize,
}

/// Every signal the checklist looks at, for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSignals {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub canonical: Option<String>,
    pub has_structured_data: bool,
    pub has_viewport: bool,
    pub has_search_console_verification: bool,
    pub images: ImageAudit,
}

impl PageSignals {
    pub fn extract(html: &str) -> Self {
        Self {
            title: extract_title(html),
            description: extract_meta(html, MetaKey::Name("description")),
            og_title: extract_meta(html, MetaKey::Property("og:title")),
            og_description: extract_meta(html, MetaKey::Property("og:description")),
            og_image: extract_meta(html, MetaKey::Property("og:image")),
            canonical: extract_canonical(html),
            has_structured_data: has_structured_data(html),
            has_viewport: extract_meta(html, MetaKey::Name("viewport")).is_some(),
            has_search_console_verification: extract_meta(
                html,
                MetaKey::Name("google-site-verification"),
            )
            .is_some(),
            images: audit_images(html),
        }
    }

    pub fn has_open_graph(&self) -> bool {
        self.og_title.is_some() || self.og_description.is_some() || self.og_image.is_some()
    }

    pub fn report(&self, path: &str) -> PageSignalReport {
        PageSignalReport {
            path: path.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            has_open_graph: self.has_open_graph(),
            has_structured_data: self.has_structured_data,
            og_image: self.og_image.clone(),
        }
    }
}

/// Text of the first `<title>`, trimmed; `None` when absent or blank
pub fn extract_title(html: &str) -> Option<String> {
    let caps = TITLE.captures(html)?;
    non_blank(&decode_entities(&caps[1]))
}

/// `content` of the first meta tag matching `key`
pub fn extract_meta(html: &str, key: MetaKey<'_>) -> Option<String> {
    let (attr, wanted) = match key {
        MetaKey::Name(name) => ("name", name),
        MetaKey::Property(property) => ("property", property),
    };

    META_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        let is_match = attrs
            .iter()
            .any(|(name, value)| name == attr && value.trim().eq_ignore_ascii_case(wanted));
        if !is_match {
            return None;
        }
        attrs
            .into_iter()
            .find(|(name, _)| name == "content")
            .and_then(|(_, value)| non_blank(&decode_entities(&value)))
    })
}

/// `href` of `<link rel="canonical">`
pub fn extract_canonical(html: &str) -> Option<String> {
    LINK_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        let is_canonical = attrs.iter().any(|(name, value)| {
            name == "rel"
                && value
                    .split_ascii_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("canonical"))
        });
        if !is_canonical {
            return None;
        }
        attrs
            .into_iter()
            .find(|(name, _)| name == "href")
            .and_then(|(_, value)| non_blank(&value))
    })
}

/// Whether a JSON-LD script block is present; its content is not validated
pub fn has_structured_data(html: &str) -> bool {
    LD_JSON.is_match(html)
}

pub fn audit_images(html: &str) -> ImageAudit {
    let mut audit = ImageAudit::default();
    for tag in IMG_TAG.find_iter(html) {
        let attrs = attributes(tag.as_str());
        audit.total += 1;

        let has_alt = attrs
            .iter()
            .any(|(name, value)| name == "alt" && !value.trim().is_empty());
        if !has_alt {
            audit.missing_alt += 1;
        }

        let is_lazy = attrs
            .iter()
            .any(|(name, value)| name == "loading" && value.trim().eq_ignore_ascii_case("lazy"));
        if is_lazy {
            audit.lazy += 1;
        }
    }
    audit
}

/// Attribute pairs of one tag, names lowercased
fn attributes(tag: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(tag)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            (caps[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode the handful of entities that show up in titles and descriptions
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
