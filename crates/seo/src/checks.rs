//! The fixed twelve-point SEO checklist.

use agentsite_core::{CheckResult, CheckStatus};

use crate::signals::PageSignals;

pub const TITLE: &str = "Page title";
pub const DESCRIPTION: &str = "Meta description";
pub const OPEN_GRAPH: &str = "Open Graph tags";
pub const STRUCTURED_DATA: &str = "Structured data";
pub const SITEMAP: &str = "XML sitemap";
pub const ROBOTS: &str = "robots.txt";
pub const CANONICAL: &str = "Canonical URL";
pub const ALT_TEXT: &str = "Image alt text";
pub const VIEWPORT: &str = "Mobile viewport";
pub const HTTPS: &str = "HTTPS";
pub const SEARCH_CONSOLE: &str = "Search Console verification";
pub const LAZY_IMAGES: &str = "Lazy-loaded images";

/// Labels in presentation order
pub const CHECK_LABELS: [&str; 12] = [
    TITLE,
    DESCRIPTION,
    OPEN_GRAPH,
    STRUCTURED_DATA,
    SITEMAP,
    ROBOTS,
    CANONICAL,
    ALT_TEXT,
    VIEWPORT,
    HTTPS,
    SEARCH_CONSOLE,
    LAZY_IMAGES,
];

const HOME_UNAVAILABLE: &str = "Home page could not be fetched";

/// Evaluate the checklist against the home page's signals.
///
/// `home` is `None` when the home page could not be fetched; the HTML-derived
/// checks then fail instead of erroring.
pub fn evaluate_checks(
    home: Option<&PageSignals>,
    origin: &str,
    sitemap_reachable: bool,
    robots_reachable: bool,
) -> Vec<CheckResult> {
    let reachability = |label: &str, path: &str, ok: bool| {
        if ok {
            CheckResult::new(label, CheckStatus::Pass, format!("{} is reachable", path))
        } else {
            CheckResult::new(label, CheckStatus::Fail, format!("{} could not be reached", path))
        }
    };

    let https = if origin.trim().to_ascii_lowercase().starts_with("https://") {
        CheckResult::new(HTTPS, CheckStatus::Pass, "Site is served over HTTPS")
    } else {
        CheckResult::new(HTTPS, CheckStatus::Fail, "Origin does not use HTTPS")
    };

    let Some(page) = home else {
        return CHECK_LABELS
            .iter()
            .map(|&label| match label {
                SITEMAP => reachability(SITEMAP, "/sitemap.xml", sitemap_reachable),
                ROBOTS => reachability(ROBOTS, "/robots.txt", robots_reachable),
                HTTPS => https.clone(),
                _ => CheckResult::new(label, CheckStatus::Fail, HOME_UNAVAILABLE),
            })
            .collect();
    };

    vec![
        title_check(page),
        description_check(page),
        open_graph_check(page),
        presence(
            STRUCTURED_DATA,
            page.has_structured_data,
            "JSON-LD structured data found",
            CheckStatus::Fail,
            "No application/ld+json script found",
        ),
        reachability(SITEMAP, "/sitemap.xml", sitemap_reachable),
        reachability(ROBOTS, "/robots.txt", robots_reachable),
        match &page.canonical {
            Some(href) => CheckResult::new(CANONICAL, CheckStatus::Pass, href.clone()),
            None => CheckResult::new(CANONICAL, CheckStatus::Fail, "No canonical link found"),
        },
        alt_text_check(page),
        presence(
            VIEWPORT,
            page.has_viewport,
            "Viewport meta tag present",
            CheckStatus::Fail,
            "No viewport meta tag",
        ),
        https,
        presence(
            SEARCH_CONSOLE,
            page.has_search_console_verification,
            "google-site-verification meta tag present",
            CheckStatus::Warn,
            "No google-site-verification meta tag (the site may be verified by DNS)",
        ),
        lazy_images_check(page),
    ]
}

fn presence(
    label: &str,
    present: bool,
    pass_detail: &str,
    missing_status: CheckStatus,
    missing_detail: &str,
) -> CheckResult {
    if present {
        CheckResult::new(label, CheckStatus::Pass, pass_detail)
    } else {
        CheckResult::new(label, missing_status, missing_detail)
    }
}

fn title_check(page: &PageSignals) -> CheckResult {
    match &page.title {
        Some(title) => CheckResult::new(
            TITLE,
            CheckStatus::Pass,
            format!("\"{}\" ({} characters)", title, title.chars().count()),
        ),
        None => CheckResult::new(TITLE, CheckStatus::Fail, "No <title> tag found"),
    }
}

fn description_check(page: &PageSignals) -> CheckResult {
    match &page.description {
        Some(description) => CheckResult::new(
            DESCRIPTION,
            CheckStatus::Pass,
            format!("{} characters", description.chars().count()),
        ),
        None => CheckResult::new(DESCRIPTION, CheckStatus::Fail, "No meta description found"),
    }
}

/// Pass needs both og:title and og:image; one of them is a warning
fn open_graph_check(page: &PageSignals) -> CheckResult {
    match (page.og_title.is_some(), page.og_image.is_some()) {
        (true, true) => CheckResult::new(
            OPEN_GRAPH,
            CheckStatus::Pass,
            "og:title and og:image present",
        ),
        (true, false) => CheckResult::new(OPEN_GRAPH, CheckStatus::Warn, "Missing og:image"),
        (false, true) => CheckResult::new(OPEN_GRAPH, CheckStatus::Warn, "Missing og:title"),
        (false, false) => CheckResult::new(
            OPEN_GRAPH,
            CheckStatus::Fail,
            "No og:title or og:image found",
        ),
    }
}

fn alt_text_check(page: &PageSignals) -> CheckResult {
    let images = page.images;
    if images.missing_alt == 0 {
        CheckResult::new(ALT_TEXT, CheckStatus::Pass, "All images have alt text")
    } else {
        CheckResult::new(
            ALT_TEXT,
            CheckStatus::Warn,
            format!(
                "{} of {} images missing alt text",
                images.missing_alt, images.total
            ),
        )
    }
}

fn lazy_images_check(page: &PageSignals) -> CheckResult {
    let images = page.images;
    if images.lazy > 0 {
        CheckResult::new(
            LAZY_IMAGES,
            CheckStatus::Pass,
            format!("{} of {} images use loading=\"lazy\"", images.lazy, images.total),
        )
    } else {
        CheckResult::new(
            LAZY_IMAGES,
            CheckStatus::Warn,
            "No images use loading=\"lazy\"",
        )
    }
}
