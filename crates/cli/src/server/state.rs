use agentsite_core::SiteConfig;
use agentsite_core::config::read_secret;
use agentsite_generator::{DirectoryPostSource, PostSource, RestPostSource};
use agentsite_relay::{
    ChatRelay, JsonlShareLog, PageSpeedRelay, RelayError, ShareLog, ShareRelay,
    StaticWebhookStore, TracingShareLog,
};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Everything a request handler needs, built once at startup
pub struct AppState {
    pub config: SiteConfig,
    pub posts: Option<Arc<dyn PostSource>>,
    /// `None` when `[chat]` is absent or its key is unset
    pub chat: Option<ChatRelay>,
    pub pagespeed: PageSpeedRelay,
    pub share: ShareRelay,
}

impl AppState {
    /// Relative paths in `config` resolve against `root`
    pub fn from_config(config: SiteConfig, root: &Path) -> Result<Self> {
        let posts = post_source(&config, root);

        let chat = match &config.chat {
            Some(chat_config) => match ChatRelay::from_config(chat_config) {
                Ok(relay) => Some(relay),
                Err(RelayError::NotConfigured(what)) => {
                    tracing::warn!(
                        "{} missing (set {}); /api/chat will answer 500",
                        what,
                        chat_config.api_key_env
                    );
                    None
                }
                Err(e) => return Err(e).context("Failed to build chat relay"),
            },
            None => None,
        };

        let pagespeed =
            PageSpeedRelay::from_config(&config.pagespeed).context("Failed to build page-speed relay")?;

        let log: Arc<dyn ShareLog> = match &config.share.log_path {
            Some(path) => Arc::new(JsonlShareLog::new(root.join(path))),
            None => Arc::new(TracingShareLog),
        };
        let store = Arc::new(StaticWebhookStore::new(config.share.webhooks.clone()));
        let share = ShareRelay::new(store, log).context("Failed to build share relay")?;

        Ok(Self {
            config,
            posts,
            chat,
            pagespeed,
            share,
        })
    }
}

/// Where published articles come from; the REST table wins over a local directory
pub fn post_source(config: &SiteConfig, root: &Path) -> Option<Arc<dyn PostSource>> {
    if let Some(remote) = &config.content.remote {
        let Some(key) = read_secret(&remote.api_key_env) else {
            tracing::warn!(
                "{} is not set; sitemap will list static routes only",
                remote.api_key_env
            );
            return None;
        };
        return match RestPostSource::new(&remote.url, &remote.table, &key) {
            Ok(source) => Some(Arc::new(source)),
            Err(e) => {
                tracing::warn!("Remote post source disabled: {}", e);
                None
            }
        };
    }

    config
        .content
        .posts_dir
        .as_ref()
        .map(|dir| Arc::new(DirectoryPostSource::new(root.join(dir))) as Arc<dyn PostSource>)
}
