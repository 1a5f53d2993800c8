use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default upstream for the page-speed relay
pub const DEFAULT_PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Prompt prepended to every chat relay conversation unless `chat.system_prompt` overrides it
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the assistant for an AI agents marketplace. \
Help visitors understand which AI agents fit their business, how onboarding works, \
and how to contact the team. Keep answers short, friendly and accurate. \
If you do not know something, suggest booking a call through the contact form.";

/// Home, blog index and a static legal page
pub const DEFAULT_SEO_PAGES: &[&str] = &["/", "/blog", "/privacy"];
pub const DEFAULT_SEO_TIMEOUT_SECS: u64 = 10;

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSiteInfo,
    #[serde(default)]
    route: Vec<RawRoute>,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    seo: RawSeo,
    chat: Option<RawChat>,
    #[serde(default)]
    pagespeed: RawPageSpeed,
    #[serde(default)]
    share: RawShare,
}

#[derive(Debug, Deserialize)]
struct RawSiteInfo {
    origin: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    url: String,
    changefreq: ChangeFreq,
    priority: f32,
    #[serde(default)]
    alternates: Vec<Alternate>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    posts_dir: Option<String>, // Convert to PathBuf
    remote: Option<RemoteContent>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSeo {
    pages: Option<Vec<String>>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    endpoint: String,
    model: String,
    api_key_env: String,
    system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPageSpeed {
    endpoint: Option<String>,
    api_key_env: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawShare {
    log_path: Option<String>, // Convert to PathBuf
    #[serde(default)]
    webhook: Vec<RawWebhook>,
}

#[derive(Debug, Deserialize)]
struct RawWebhook {
    id: String,
    name: String,
    platform: String,
    url: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Static anchors of the marketing homepage, used when site.toml lists no routes
pub fn default_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::new("/", ChangeFreq::Weekly, 1.0),
        RouteDescriptor::new("#services", ChangeFreq::Monthly, 0.9),
        RouteDescriptor::new("#features", ChangeFreq::Monthly, 0.8),
        RouteDescriptor::new("/blog", ChangeFreq::Daily, 0.8),
        RouteDescriptor::new("#testimonials", ChangeFreq::Monthly, 0.7),
        RouteDescriptor::new("#faq", ChangeFreq::Monthly, 0.6),
    ]
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let site = SiteInfo {
        origin: validate_origin(&raw.site.origin, "site.origin")?,
        name: raw.site.name,
    };

    let routes = if raw.route.is_empty() {
        default_routes()
    } else {
        raw.route
            .into_iter()
            .map(|r| {
                validate_priority(r.priority, &r.url)?;
                let mut route = RouteDescriptor::new(&r.url, r.changefreq, r.priority);
                for alt in r.alternates {
                    route = route.with_alternate(&alt.lang, &alt.url);
                }
                Ok(route)
            })
            .collect::<Result<Vec<_>>>()?
    };

    let posts_dir = match raw.content.posts_dir {
        Some(dir) => Some(validate_path(&dir, "content.posts_dir")?),
        None => None,
    };
    if let Some(remote) = &raw.content.remote {
        validate_origin(&remote.url, "content.remote.url")?;
    }
    let content = ContentConfig {
        posts_dir,
        remote: raw.content.remote,
    };

    let timeout_secs = raw.seo.timeout_secs.unwrap_or(DEFAULT_SEO_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(Error::ConfigParse(
            "seo.timeout_secs must be greater than zero".to_string(),
        ));
    }
    let seo = SeoConfig {
        pages: raw
            .seo
            .pages
            .unwrap_or_else(|| DEFAULT_SEO_PAGES.iter().map(|p| p.to_string()).collect())
            .iter()
            .map(|p| normalize_route_path(p))
            .collect(),
        timeout_secs,
    };

    let chat = raw.chat.map(|c| ChatConfig {
        endpoint: c.endpoint,
        model: c.model,
        api_key_env: c.api_key_env,
        system_prompt: c
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
    });

    let pagespeed = PageSpeedConfig {
        endpoint: raw
            .pagespeed
            .endpoint
            .unwrap_or_else(|| DEFAULT_PAGESPEED_ENDPOINT.to_string()),
        api_key_env: raw.pagespeed.api_key_env,
    };

    let log_path = match raw.share.log_path {
        Some(p) => Some(validate_path(&p, "share.log_path")?),
        None => None,
    };
    let webhooks = raw
        .share
        .webhook
        .into_iter()
        .map(|w| {
            validate_origin(&w.url, &format!("share.webhook.{}.url", w.id))?;
            Ok(WebhookTarget {
                id: w.id,
                name: w.name,
                platform: w.platform,
                url: w.url,
                enabled: w.enabled,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SiteConfig {
        site,
        routes,
        content,
        seo,
        chat,
        pagespeed,
        share: ShareConfig { log_path, webhooks },
    })
}

/// Read a secret named by an `*_env` config field.
///
/// Returns `None` when the variable is unset or blank.
pub fn read_secret(env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check that a URL is http(s) and strip trailing slashes.
pub fn validate_origin(origin: &str, field_name: &str) -> Result<String> {
    let trimmed = origin.trim();
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(Error::ConfigParse(format!(
            "'{}' must start with http:// or https://: '{}'",
            field_name, origin
        )));
    }

    let normalized = trimmed.trim_end_matches('/');
    if normalized.ends_with(':') || normalized.ends_with("//") {
        return Err(Error::ConfigParse(format!(
            "'{}' has no host: '{}'",
            field_name, origin
        )));
    }

    Ok(normalized.to_string())
}

fn validate_priority(priority: f32, url: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&priority) {
        return Err(Error::ConfigParse(format!(
            "Route '{}' has priority {} outside 0.0..=1.0",
            url, priority
        )));
    }
    Ok(())
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and parent directory references (`..`) so that a
/// site.toml cannot point the server at files outside the project directory.
///
/// ```text
/// validate_path("content/blog", "posts_dir")  → Ok(PathBuf)
/// validate_path("/etc", "posts_dir")          → Err("Absolute paths not allowed...")
/// validate_path("../secrets", "posts_dir")    → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}
