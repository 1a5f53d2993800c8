use agentsite_core::{
    ChangeFreq, RouteDescriptor, SiteConfig, SitemapEntry, SitemapImage,
};
use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::posts::{PostSource, PublishedPost};

pub const SITEMAP_NS: &str = "https://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// XML-escape a string for text and attribute nodes
///
/// Escapes: & < > " '
///
/// Characters outside the XML 1.0 `Char` production (most C0 controls,
/// U+FFFE, U+FFFF) cannot be written even as references, so they are dropped.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Build the sitemap document.
///
/// Static anchors come first, highest priority first, and always include the
/// homepage. Dynamic entries follow in the order given.
pub fn build_sitemap(
    origin: &str,
    static_routes: &[RouteDescriptor],
    dynamic: &[SitemapEntry],
    today: NaiveDate,
) -> String {
    let mut entries = static_entries(static_routes, today);
    entries.extend(dynamic.iter().cloned());
    render_urlset(origin, &entries)
}

/// Document holding only the homepage
pub fn minimal_sitemap(origin: &str, today: NaiveDate) -> String {
    build_sitemap(origin, &[], &[], today)
}

/// Build the sitemap for a site, pulling articles from `source`.
///
/// Never fails: when the source is unavailable the static anchors are still
/// emitted.
pub async fn generate_sitemap(
    config: &SiteConfig,
    source: Option<&dyn PostSource>,
    today: NaiveDate,
) -> String {
    let posts = match source {
        Some(source) => match source.published_posts().await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!("Post source unavailable, emitting static sitemap: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let dynamic: Vec<SitemapEntry> = posts.iter().map(|p| post_entry(p, today)).collect();
    tracing::debug!(
        static_routes = config.routes.len(),
        posts = dynamic.len(),
        "Rendering sitemap"
    );

    build_sitemap(&config.site.origin, &config.routes, &dynamic, today)
}

/// Sitemap entry for a published article at `/blog/{slug}`
pub fn post_entry(post: &PublishedPost, today: NaiveDate) -> SitemapEntry {
    let route = RouteDescriptor::new(&format!("/blog/{}", post.slug), ChangeFreq::Monthly, 0.7);
    let entry = SitemapEntry::dated(route, post.updated_at.or(post.published_at), today);

    match &post.cover_image {
        Some(url) => entry.with_image(SitemapImage {
            url: url.clone(),
            title: post.title.clone(),
            caption: post.excerpt.clone(),
        }),
        None => entry,
    }
}

fn static_entries(routes: &[RouteDescriptor], today: NaiveDate) -> Vec<SitemapEntry> {
    let mut routes = routes.to_vec();
    if !routes.iter().any(RouteDescriptor::is_home) {
        routes.insert(0, RouteDescriptor::new("/", ChangeFreq::Weekly, 1.0));
    }

    // Stable sort keeps configuration order for equal priorities
    routes.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));

    routes
        .into_iter()
        .map(|route| SitemapEntry::dated(route, None, today))
        .collect()
}

/// Render entries into a `urlset` document
pub fn render_urlset(origin: &str, entries: &[SitemapEntry]) -> String {
    let origin = origin.trim_end_matches('/');
    let has_images = entries.iter().any(|e| e.image.is_some());
    let has_alternates = entries.iter().any(|e| !e.route.alternates.is_empty());

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\"", SITEMAP_NS));
    if has_images {
        xml.push_str(&format!(" xmlns:image=\"{}\"", IMAGE_NS));
    }
    if has_alternates {
        xml.push_str(&format!(" xmlns:xhtml=\"{}\"", XHTML_NS));
    }
    xml.push_str(">\n");

    for entry in entries {
        xml.push_str(&render_url(origin, entry));
    }

    xml.push_str("</urlset>\n");
    xml
}

fn render_url(origin: &str, entry: &SitemapEntry) -> String {
    let route = &entry.route;
    let mut xml = String::from("  <url>\n");
    xml.push_str(&format!(
        "    <loc>{}</loc>\n",
        xml_escape(&absolute_url(origin, &route.url))
    ));
    xml.push_str(&format!(
        "    <lastmod>{}</lastmod>\n",
        entry.last_modified.format("%Y-%m-%d")
    ));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", route.changefreq));
    xml.push_str(&format!("    <priority>{:.1}</priority>\n", route.priority));

    for alt in &route.alternates {
        xml.push_str(&format!(
            "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
            xml_escape(&alt.lang),
            xml_escape(&absolute_url(origin, &alt.url))
        ));
    }

    if let Some(image) = &entry.image {
        xml.push_str("    <image:image>\n");
        xml.push_str(&format!(
            "      <image:loc>{}</image:loc>\n",
            xml_escape(&absolute_url(origin, &image.url))
        ));
        xml.push_str(&format!(
            "      <image:title>{}</image:title>\n",
            xml_escape(&image.title)
        ));
        if let Some(caption) = &image.caption {
            xml.push_str(&format!(
                "      <image:caption>{}</image:caption>\n",
                xml_escape(caption)
            ));
        }
        xml.push_str("    </image:image>\n");
    }

    xml.push_str("  </url>\n");
    xml
}

/// robots.txt allowing every crawler and pointing at the sitemap
pub fn robots_txt(origin: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        origin.trim_end_matches('/')
    )
}

/// Join origin and path; absolute URLs pass through untouched
fn absolute_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}
