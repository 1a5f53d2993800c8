use agentsite_core::config::validate_origin;
use agentsite_core::parse_site_toml_str;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

const DEFAULT_ORIGIN: &str = "https://agents.example.com";
const DEFAULT_NAME: &str = "AI Agents Marketplace";

/// Escape a string for a TOML basic string.
///
/// The starter file is written by hand to keep its comments, so values
/// are escaped here instead of going through a serializer.
///
/// See: https://toml.io/en/v1.0.0#string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Write a starter site.toml and a sample post into `path`.
///
/// Fails when the directory is missing or already holds a site.toml.
pub fn run(path: PathBuf, origin: Option<&str>, name: Option<&str>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    if !path.exists() {
        anyhow::bail!(
            "Directory '{}' does not exist. Create it first: mkdir {}",
            path.display(),
            path.display()
        );
    }

    let site_toml_path = path.join("site.toml");
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    let origin = match origin {
        Some(origin) => validate_origin(origin, "--origin")?,
        None => DEFAULT_ORIGIN.to_string(),
    };

    let toml = generate_site_toml(&origin, name)?;
    fs::write(&site_toml_path, toml).context("Failed to write site.toml")?;

    let posts_dir = path.join("posts");
    fs::create_dir_all(&posts_dir).context("Failed to create posts directory")?;
    let sample = posts_dir.join("welcome.md");
    if !sample.exists() {
        fs::write(&sample, sample_post()).context("Failed to write sample post")?;
    }

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Set origin, chat gateway and webhooks");
    println!("  └── posts/");
    println!("      └── welcome.md       ← Sample article");

    println!("\nNext steps:");
    println!("  1. Edit site.toml");
    println!("  2. Put API keys in .env (names are listed in site.toml)");
    println!(
        "  3. Serve: agentsite --config {} serve",
        site_toml_path.display()
    );

    Ok(())
}

fn generate_site_toml(origin: &str, name: Option<&str>) -> Result<String> {
    let site_name = toml_escape_string(name.unwrap_or(DEFAULT_NAME));
    let name_comment = if name.is_some() {
        ""
    } else {
        "  # TODO: Set site name"
    };
    let origin = toml_escape_string(origin);

    let toml = format!(
        r##"# Generated by agentsite init
# Secrets never go in this file: *_env fields name environment variables

[site]
origin = "{origin}"
name = "{site_name}"{name_comment}

# Static sitemap routes; omit every [[route]] to use the homepage defaults
[[route]]
url = "/"
changefreq = "weekly"
priority = 1.0

[[route]]
url = "#services"
changefreq = "monthly"
priority = 0.9

[[route]]
url = "/blog"
changefreq = "daily"
priority = 0.8

[content]
posts_dir = "posts"

# Or read published posts from a hosted REST table instead:
# [content.remote]
# url = "https://project.example.co"
# table = "blog_posts"
# api_key_env = "CONTENT_API_KEY"

[seo]
pages = ["/", "/blog", "/privacy"]
timeout_secs = 10

[chat]
endpoint = "https://gateway.example.com/v1/chat/completions"
model = "default"
api_key_env = "CHAT_API_KEY"

[pagespeed]
# api_key_env = "PAGESPEED_API_KEY"

[share]
log_path = "logs/share.jsonl"

# [[share.webhook]]
# id = "linkedin"
# name = "LinkedIn automation"
# platform = "linkedin"
# url = "https://hooks.example.com/linkedin"
"##
    );

    // Catch template drift before it reaches disk
    parse_site_toml_str(&toml)
        .context("Generated site.toml is invalid - this is a bug in the template generator")?;

    Ok(toml)
}

fn sample_post() -> String {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r##"+++
title = "Welcome to the marketplace"
excerpt = "What our AI agents do and how to get started."
published_at = "{now}"
+++

## What is an AI agent?

Describe the agents you offer...

## Getting started

### Book a call

Explain onboarding...
"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentsite_core::parse_site_toml;
    use agentsite_generator::{DirectoryPostSource, PostSource};
    use std::path::Path;
    use tempfile::TempDir;

    fn is_initialized(dir: &Path) -> bool {
        dir.join("site.toml").is_file() && dir.join("posts").is_dir()
    }

    #[test]
    fn test_init_creates_valid_site() {
        let dir = TempDir::new().unwrap();
        run(dir.path().to_path_buf(), None, None).unwrap();

        assert!(is_initialized(dir.path()));
        let config = parse_site_toml(dir.path().join("site.toml")).unwrap();
        assert_eq!(config.site.origin, DEFAULT_ORIGIN);
        assert_eq!(config.site.name, DEFAULT_NAME);
        assert_eq!(config.routes.len(), 3);
        assert!(config.chat.is_some());
        assert!(config.share.webhooks.is_empty());
    }

    #[test]
    fn test_init_uses_given_origin_and_name() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path().to_path_buf(),
            Some("https://bots.example.org/"),
            Some(r#"Bots "R" Us"#),
        )
        .unwrap();

        let config = parse_site_toml(dir.path().join("site.toml")).unwrap();
        assert_eq!(config.site.origin, "https://bots.example.org");
        assert_eq!(config.site.name, r#"Bots "R" Us"#);
    }

    #[test]
    fn test_init_refuses_existing_site_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), "keep me").unwrap();

        let err = run(dir.path().to_path_buf(), None, None).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(dir.path().join("site.toml")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_init_requires_directory() {
        let dir = TempDir::new().unwrap();
        let err = run(dir.path().join("missing"), None, None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_init_rejects_bad_origin() {
        let dir = TempDir::new().unwrap();
        assert!(run(dir.path().to_path_buf(), Some("agents.example.com"), None).is_err());
        assert!(!dir.path().join("site.toml").exists());
    }

    #[tokio::test]
    async fn test_sample_post_is_published() {
        let dir = TempDir::new().unwrap();
        run(dir.path().to_path_buf(), None, None).unwrap();

        let posts = DirectoryPostSource::new(dir.path().join("posts"))
            .published_posts()
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "welcome");
        assert!(posts[0].published_at.is_some());
    }

    #[test]
    fn test_toml_escape_string() {
        // Test quote escaping
        assert_eq!(toml_escape_string(r#"Test "Quote""#), r#"Test \"Quote\""#);

        // Test backslash escaping
        assert_eq!(toml_escape_string(r"Test\Back"), r"Test\\Back");

        // Test newline escaping
        assert_eq!(toml_escape_string("Test\nNewline"), r"Test\nNewline");

        // Test normal string (no escaping needed)
        assert_eq!(toml_escape_string("Normal String"), "Normal String");
    }
}
