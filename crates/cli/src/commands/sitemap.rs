use agentsite_generator::generate_sitemap;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use super::{load_config, site_root};
use crate::server::post_source;

/// Render sitemap.xml to stdout or `output`
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let source = post_source(&config, &site_root(config_path));

    let xml = generate_sitemap(&config, source.as_deref(), Utc::now().date_naive()).await;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            fs::write(&path, &xml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {} ({} URLs)", path.display(), xml.matches("<url>").count());
        }
        None => print!("{}", xml),
    }

    Ok(())
}
