//! Sources of published articles for the sitemap and blog pages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum PostSourceError {
    #[error("Post source unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid front matter in {path}: {reason}")]
    FrontMatter { path: String, reason: String },
}

/// A published article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Published posts, newest first
    async fn published_posts(&self) -> Result<Vec<PublishedPost>, PostSourceError>;
}

// ============================================================================
// Content directory
// ============================================================================

/// Markdown files with `+++`-delimited TOML front matter
pub struct DirectoryPostSource {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    slug: Option<String>,
    excerpt: Option<String>,
    cover_image: Option<String>,
    #[serde(default = "default_published")]
    published: bool,
    published_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
    true
}

impl DirectoryPostSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl PostSource for DirectoryPostSource {
    async fn published_posts(&self) -> Result<Vec<PublishedPost>, PostSourceError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || read_posts_dir(&root))
            .await
            .map_err(|e| PostSourceError::Unavailable(format!("Post scan aborted: {}", e)))?
    }
}

fn read_posts_dir(root: &Path) -> Result<Vec<PublishedPost>, PostSourceError> {
    if !root.is_dir() {
        return Err(PostSourceError::Unavailable(format!(
            "Posts directory does not exist: {}",
            root.display()
        )));
    }

    let mut posts = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }

        // One broken file must not hide the rest of the blog
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };
        match parse_post(path, &content) {
            Ok(Some(post)) => posts.push(post),
            Ok(None) => tracing::debug!("Skipping draft {}", path.display()),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    sort_newest_first(&mut posts);
    Ok(posts)
}

/// Split `+++` front matter from the markdown body.
///
/// Returns `None` when the file has no front matter block.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.trim_start_matches('\u{feff}');
    let rest = rest.strip_prefix("+++")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let end = rest.find("\n+++")?;
    let front = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    Some((front, body))
}

fn parse_post(path: &Path, content: &str) -> Result<Option<PublishedPost>, PostSourceError> {
    let front_matter_error = |reason: String| PostSourceError::FrontMatter {
        path: path.display().to_string(),
        reason,
    };

    let (front, _body) = split_front_matter(content)
        .ok_or_else(|| front_matter_error("missing +++ block".to_string()))?;
    let meta: FrontMatter = toml::from_str(front).map_err(|e| front_matter_error(e.to_string()))?;

    if !meta.published {
        return Ok(None);
    }

    let slug = match meta.slug {
        Some(slug) => slug,
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| front_matter_error("cannot derive slug from file name".to_string()))?,
    };

    Ok(Some(PublishedPost {
        slug,
        title: meta.title,
        excerpt: meta.excerpt,
        cover_image: meta.cover_image,
        published_at: meta.published_at,
        updated_at: meta.updated_at,
    }))
}

fn sort_newest_first(posts: &mut [PublishedPost]) {
    // None sorts last; ties fall back to slug for a stable listing
    posts.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

// ============================================================================
// Hosted backend REST table
// ============================================================================

/// Reads published posts from the hosted backend's REST interface
pub struct RestPostSource {
    client: reqwest::Client,
    base_url: String,
    table: String,
}

impl RestPostSource {
    pub fn new(base_url: &str, table: &str, api_key: &str) -> Result<Self, PostSourceError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| PostSourceError::Unavailable(format!("Invalid API key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| PostSourceError::Unavailable(format!("Invalid API key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
        })
    }

    fn query_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=slug,title,excerpt,cover_image,published_at,updated_at\
             &published=eq.true&order=published_at.desc",
            self.base_url, self.table
        )
    }
}

#[async_trait]
impl PostSource for RestPostSource {
    async fn published_posts(&self) -> Result<Vec<PublishedPost>, PostSourceError> {
        let url = self.query_url();
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostSourceError::Unavailable(format!(
                "{} returned {}",
                self.table, status
            )));
        }

        Ok(response.json::<Vec<PublishedPost>>().await?)
    }
}
