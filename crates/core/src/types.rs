use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete site configuration, loaded from `site.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteInfo,
    /// Static anchors, emitted ahead of dynamic sitemap entries
    pub routes: Vec<RouteDescriptor>,
    pub content: ContentConfig,
    pub seo: SeoConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatConfig>,
    pub pagespeed: PageSpeedConfig,
    pub share: ShareConfig,
}

/// Public identity of the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Scheme and host with no trailing slash, e.g. `https://agents.example.com`
    pub origin: String,
    pub name: String,
}

/// Where published articles come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteContent>,
}

/// Hosted backend table holding blog posts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteContent {
    pub url: String,
    pub table: String,
    /// Name of the environment variable holding the anon key
    pub api_key_env: String,
}

/// SEO checklist settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoConfig {
    pub pages: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            pages: crate::config::DEFAULT_SEO_PAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            timeout_secs: crate::config::DEFAULT_SEO_TIMEOUT_SECS,
        }
    }
}

/// Upstream chat-completion gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub system_prompt: String,
}

/// Upstream page-speed analysis API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpeedConfig {
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

/// Social-share webhooks and their delivery log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    pub webhooks: Vec<WebhookTarget>,
}

/// One outbound social-media webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub url: String,
    pub enabled: bool,
}

/// Sitemap change frequency hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-locale alternate for a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternate {
    pub lang: String,
    pub url: String,
}

/// One crawlable URL and its sitemap metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Root-relative path, always starting with `/`
    pub url: String,
    pub changefreq: ChangeFreq,
    pub priority: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<Alternate>,
}

impl RouteDescriptor {
    pub fn new(url: &str, changefreq: ChangeFreq, priority: f32) -> Self {
        Self {
            url: normalize_route_path(url),
            changefreq,
            priority,
            alternates: Vec::new(),
        }
    }

    pub fn with_alternate(mut self, lang: &str, url: &str) -> Self {
        self.alternates.push(Alternate {
            lang: lang.to_string(),
            url: normalize_route_path(url),
        });
        self
    }

    pub fn is_home(&self) -> bool {
        self.url == "/"
    }
}

/// Make a route path root-relative.
///
/// ```text
/// "/blog"     → "/blog"
/// "blog"      → "/blog"
/// "#services" → "/#services"
/// ""          → "/"
/// ```
pub fn normalize_route_path(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Image metadata attached to a sitemap entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapImage {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A route ready to be rendered into the sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub route: RouteDescriptor,
    pub last_modified: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<SitemapImage>,
}

impl SitemapEntry {
    /// Entry dated from an optional update time, falling back to `today`
    pub fn dated(route: RouteDescriptor, updated_at: Option<DateTime<Utc>>, today: NaiveDate) -> Self {
        Self {
            route,
            last_modified: updated_at.map(|t| t.date_naive()).unwrap_or(today),
            image: None,
        }
    }

    pub fn with_image(mut self, image: SitemapImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// SEO signals found on one fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignalReport {
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_open_graph: bool,
    pub has_structured_data: bool,
    pub og_image: Option<String>,
}

impl PageSignalReport {
    /// Report for a page whose fetch failed
    pub fn unreachable(path: &str) -> Self {
        Self {
            path: path.to_string(),
            title: None,
            description: None,
            has_open_graph: false,
            has_structured_data: false,
            og_image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One line of the SEO checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub label: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckResult {
    pub fn new(label: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            status,
            detail: Some(detail.into()),
        }
    }
}

/// Full checklist response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub checks: Vec<CheckResult>,
    pub pages: Vec<PageSignalReport>,
    pub checked_at: DateTime<Utc>,
}

/// One entry in an article's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub id: String,
    pub text: String,
    /// Heading depth, 2 or 3
    pub level: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_route_path() {
        assert_eq!(normalize_route_path("/blog"), "/blog");
        assert_eq!(normalize_route_path("blog"), "/blog");
        assert_eq!(normalize_route_path("#services"), "/#services");
        assert_eq!(normalize_route_path(""), "/");
        assert_eq!(normalize_route_path("  /faq "), "/faq");
    }

    #[test]
    fn test_sitemap_entry_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let route = RouteDescriptor::new("/blog/x", ChangeFreq::Monthly, 0.7);

        let undated = SitemapEntry::dated(route.clone(), None, today);
        assert_eq!(undated.last_modified, today);

        let updated = "2024-12-31T23:59:00Z".parse::<DateTime<Utc>>().unwrap();
        let dated = SitemapEntry::dated(route, Some(updated), today);
        assert_eq!(dated.last_modified, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_page_signal_report_serializes_camel_case() {
        let report = PageSignalReport::unreachable("/blog");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "/blog");
        assert_eq!(json["hasOpenGraph"], false);
        assert_eq!(json["hasStructuredData"], false);
        assert!(json["ogImage"].is_null());
        assert!(json["title"].is_null());
    }

    #[test]
    fn test_check_status_lowercase() {
        let check = CheckResult::new("HTTPS", CheckStatus::Warn, "detail");
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "warn");
        assert_eq!(json["label"], "HTTPS");
    }
}
