use agentsite_core::SiteConfig;
use agentsite_core::config::read_secret;
use anyhow::Result;
use std::path::Path;

use super::{load_config, site_root};

/// Parse site.toml and report what is missing at serve time
pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating site config: {}", config_path.display());

    let config = load_config(config_path)?;

    println!("✓ {} valid", config_path.display());
    println!("  Site: {} ({})", config.site.name, config.site.origin);
    println!("  Static routes: {}", config.routes.len());
    println!("  SEO pages: {}", config.seo.pages.join(", "));
    println!(
        "  Webhooks: {} ({} enabled)",
        config.share.webhooks.len(),
        config.share.webhooks.iter().filter(|w| w.enabled).count()
    );

    let warnings = readiness_warnings(&config, &site_root(config_path));
    if warnings.is_empty() {
        println!("\n✓ Ready to serve");
    } else {
        println!();
        for warning in &warnings {
            println!("⚠ {}", warning);
        }
    }

    Ok(())
}

/// Problems that do not stop the server but degrade an endpoint
fn readiness_warnings(config: &SiteConfig, root: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(dir) = &config.content.posts_dir {
        if !root.join(dir).is_dir() {
            warnings.push(format!(
                "content.posts_dir '{}' does not exist; sitemap will list static routes only",
                dir.display()
            ));
        }
    }
    if let Some(remote) = &config.content.remote {
        if read_secret(&remote.api_key_env).is_none() {
            warnings.push(format!("{} is not set (content.remote)", remote.api_key_env));
        }
    }

    match &config.chat {
        Some(chat) if read_secret(&chat.api_key_env).is_none() => {
            warnings.push(format!("{} is not set; /api/chat will fail", chat.api_key_env));
        }
        None => warnings.push("No [chat] section; /api/chat is disabled".to_string()),
        _ => {}
    }

    if let Some(env) = &config.pagespeed.api_key_env {
        if read_secret(env).is_none() {
            warnings.push(format!("{} is not set; page-speed calls run unauthenticated", env));
        }
    }

    warnings
}
