use agentsite_core::config::validate_origin;
use agentsite_core::{CheckStatus, SeoConfig, SeoReport};
use agentsite_seo::{HttpFetcher, SeoEvaluator};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use super::load_config;

/// Run the checklist against `url`, or against site.origin when omitted.
///
/// An explicit URL works without a site.toml; default pages are checked then.
pub async fn run(config_path: &Path, url: Option<&str>, json: bool) -> Result<()> {
    let (origin, seo) = match url {
        Some(url) => {
            let origin = validate_origin(url, "url")?;
            let seo = if config_path.exists() {
                load_config(config_path)?.seo
            } else {
                SeoConfig::default()
            };
            (origin, seo)
        }
        None => {
            let config = load_config(config_path)?;
            (config.site.origin, config.seo)
        }
    };

    if !json {
        println!("🔍 Checking {} ({} pages)...\n", origin, seo.pages.len());
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(seo.timeout_secs))
        .context("Failed to build HTTP client")?;
    let report = SeoEvaluator::new(fetcher, seo.pages).evaluate(&origin).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn status_mark(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✓",
        CheckStatus::Warn => "⚠",
        CheckStatus::Fail => "✗",
    }
}

fn print_report(report: &SeoReport) {
    for check in &report.checks {
        match &check.detail {
            Some(detail) => println!("  {} {}: {}", status_mark(check.status), check.label, detail),
            None => println!("  {} {}", status_mark(check.status), check.label),
        }
    }

    println!("\nPages:");
    for page in &report.pages {
        println!(
            "  {:<12} title: {}  description: {}  og: {}  ld+json: {}",
            page.path,
            page.title.as_deref().unwrap_or("-"),
            if page.description.is_some() { "yes" } else { "no" },
            if page.has_open_graph { "yes" } else { "no" },
            if page.has_structured_data { "yes" } else { "no" },
        );
    }

    let count = |status| report.checks.iter().filter(|c| c.status == status).count();
    println!(
        "\n{} passed, {} warnings, {} failed",
        count(CheckStatus::Pass),
        count(CheckStatus::Warn),
        count(CheckStatus::Fail)
    );
}
