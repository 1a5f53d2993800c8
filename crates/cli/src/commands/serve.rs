use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use super::{load_config, site_root};
use crate::server::{AppState, router};

/// Serve sitemap.xml, robots.txt and the API relays.
///
/// Relative paths in site.toml resolve against the directory holding it.
pub async fn run(config_path: &Path, port: u16) -> Result<()> {
    println!("🚀 Starting agentsite server...");
    println!("   Config: {}", config_path.display());

    let config = load_config(config_path)?;
    println!("   ✓ Site: {} ({})", config.site.name, config.site.origin);
    println!("   ✓ Static routes: {}", config.routes.len());
    println!("   ✓ Webhooks: {}", config.share.webhooks.len());

    let state = AppState::from_config(config, &site_root(config_path))?;
    if state.chat.is_none() {
        println!("   ⚠ Chat relay disabled");
    }
    let app = router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("\n   Listening on http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");
    tracing::info!("Serving on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
