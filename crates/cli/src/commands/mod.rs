pub mod init;
pub mod seo_check;
pub mod serve;
pub mod sitemap;
pub mod toc;
pub mod validate;

use agentsite_core::{SiteConfig, parse_site_toml};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load site.toml, pointing at `agentsite init` when it is missing
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        anyhow::bail!(
            "{} not found\nRun 'agentsite init <dir>' first",
            path.display()
        );
    }
    parse_site_toml(path).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Directory relative config paths resolve against
pub fn site_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
