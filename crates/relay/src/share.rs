//! Social-share relay: fan a new post out to every enabled webhook.

use agentsite_core::WebhookTarget;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::error::RelayError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub post_id: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub post_url: String,
}

impl ShareRequest {
    pub fn validate(&self) -> Result<(), RelayError> {
        let required = [
            ("postId", &self.post_id),
            ("title", &self.title),
            ("postUrl", &self.post_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RelayError::InvalidRequest(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

/// Delivery result for one webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    pub webhook_id: String,
    pub name: String,
    pub platform: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub success: bool,
    pub results: Vec<ShareOutcome>,
    pub webhooks_configured: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLogEntry {
    pub post_id: String,
    pub title: String,
    pub results: Vec<ShareOutcome>,
    pub shared_at: DateTime<Utc>,
}

/// Where outbound webhook targets are configured
#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn enabled_webhooks(&self) -> Result<Vec<WebhookTarget>, RelayError>;
}

/// Best-effort record of share attempts
#[async_trait]
pub trait ShareLog: Send + Sync {
    async fn record(&self, entry: ShareLogEntry) -> Result<(), RelayError>;
}

/// Webhooks listed in site.toml
pub struct StaticWebhookStore {
    targets: Vec<WebhookTarget>,
}

impl StaticWebhookStore {
    pub fn new(targets: Vec<WebhookTarget>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl WebhookStore for StaticWebhookStore {
    async fn enabled_webhooks(&self) -> Result<Vec<WebhookTarget>, RelayError> {
        Ok(self.targets.iter().filter(|t| t.enabled).cloned().collect())
    }
}

/// Appends one JSON object per line
pub struct JsonlShareLog {
    path: PathBuf,
}

impl JsonlShareLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ShareLog for JsonlShareLog {
    async fn record(&self, entry: ShareLogEntry) -> Result<(), RelayError> {
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| RelayError::InvalidRequest(format!("Unserializable log entry: {}", e)))?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Log sink for deployments without a log file
pub struct TracingShareLog;

#[async_trait]
impl ShareLog for TracingShareLog {
    async fn record(&self, entry: ShareLogEntry) -> Result<(), RelayError> {
        let delivered = entry.results.iter().filter(|r| r.success).count();
        tracing::info!(
            post_id = %entry.post_id,
            delivered,
            attempted = entry.results.len(),
            "Shared post"
        );
        Ok(())
    }
}

pub struct ShareRelay {
    client: reqwest::Client,
    store: Arc<dyn WebhookStore>,
    log: Arc<dyn ShareLog>,
}

impl ShareRelay {
    pub fn new(store: Arc<dyn WebhookStore>, log: Arc<dyn ShareLog>) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, store, log })
    }

    /// Body POSTed to a webhook, annotated with its platform
    pub fn payload(platform: &str, request: &ShareRequest) -> serde_json::Value {
        json!({
            "platform": platform,
            "postId": request.post_id,
            "title": request.title,
            "excerpt": request.excerpt,
            "category": request.category,
            "imageUrl": request.image_url,
            "postUrl": request.post_url,
            "text": format!("{}\n\n{}\n\n{}", request.title, request.excerpt, request.post_url),
            "timestamp": Utc::now(),
        })
    }

    /// Deliver to every enabled webhook concurrently.
    ///
    /// Only malformed requests fail; delivery problems are reported per
    /// target in the response.
    pub async fn share(&self, request: &ShareRequest) -> Result<ShareResponse, RelayError> {
        request.validate()?;

        let targets = match self.store.enabled_webhooks().await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::warn!("Webhook store unavailable: {}", e);
                Vec::new()
            }
        };

        let results = join_all(targets.iter().map(|t| self.deliver(t, request))).await;
        tracing::info!(
            post_id = %request.post_id,
            webhooks = targets.len(),
            delivered = results.iter().filter(|r| r.success).count(),
            "Share fan-out complete"
        );

        self.spawn_log(ShareLogEntry {
            post_id: request.post_id.clone(),
            title: request.title.clone(),
            results: results.clone(),
            shared_at: Utc::now(),
        });

        Ok(ShareResponse {
            success: true,
            results,
            webhooks_configured: targets.len(),
        })
    }

    async fn deliver(&self, target: &WebhookTarget, request: &ShareRequest) -> ShareOutcome {
        let mut outcome = ShareOutcome {
            webhook_id: target.id.clone(),
            name: target.name.clone(),
            platform: target.platform.clone(),
            success: false,
            status: None,
            error: None,
        };

        let sent = self
            .client
            .post(&target.url)
            .json(&Self::payload(&target.platform, request))
            .send()
            .await;

        match sent {
            Ok(response) => {
                let status = response.status();
                outcome.status = Some(status.as_u16());
                outcome.success = status.is_success();
                if !outcome.success {
                    outcome.error = Some(format!("Webhook returned {}", status));
                }
            }
            Err(e) => {
                tracing::warn!("Webhook {} failed: {}", target.id, e);
                outcome.error = Some(e.to_string());
            }
        }

        outcome
    }

    /// Fire-and-forget; a failing sink never reaches the caller
    fn spawn_log(&self, entry: ShareLogEntry) {
        let log = Arc::clone(&self.log);
        tokio::spawn(async move {
            if let Err(e) = log.record(entry).await {
                tracing::warn!("Could not record share log: {}", e);
            }
        });
    }
}
