use agentsite_core::PageSpeedConfig;
use agentsite_core::config::read_secret;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Lighthouse categories requested on every analysis
pub const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpeedRequest {
    pub url: String,
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

/// Upstream status and body, passed through untouched
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

pub struct PageSpeedRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PageSpeedRelay {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, RelayError> {
        // Lighthouse runs routinely take 20-40s
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &PageSpeedConfig) -> Result<Self, RelayError> {
        let api_key = config.api_key_env.as_deref().and_then(read_secret);
        Self::new(&config.endpoint, api_key)
    }

    /// Query parameters for one analysis
    pub fn query(&self, request: &PageSpeedRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("url", request.url.trim().to_string()),
            ("strategy", request.strategy.unwrap_or_default().as_str().to_string()),
        ];
        query.extend(CATEGORIES.iter().map(|c| ("category", c.to_string())));
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        query
    }

    pub async fn analyze(&self, request: &PageSpeedRequest) -> Result<UpstreamReply, RelayError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(RelayError::InvalidRequest("url is required".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RelayError::InvalidRequest(format!(
                "url must start with http:// or https://: '{}'",
                url
            )));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(request))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if status >= 400 {
            tracing::warn!("PageSpeed API returned {} for {}", status, url);
        }

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, extract::RawQuery, http::StatusCode, routing::get};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/runPagespeed", addr)
    }

    fn request(url: &str, strategy: Option<Strategy>) -> PageSpeedRequest {
        PageSpeedRequest {
            url: url.to_string(),
            strategy,
        }
    }

    #[test]
    fn test_query_has_four_categories_and_default_strategy() {
        let relay = PageSpeedRelay::new("http://unused", None).unwrap();
        let query = relay.query(&request("https://a.example.com", None));

        let categories: Vec<&str> = query
            .iter()
            .filter(|(k, _)| *k == "category")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(categories, CATEGORIES.to_vec());
        assert!(query.contains(&("strategy", "mobile".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "key"));
    }

    #[test]
    fn test_query_includes_key_and_strategy() {
        let relay = PageSpeedRelay::new("http://unused", Some("k123".to_string())).unwrap();
        let query = relay.query(&request("https://a.example.com", Some(Strategy::Desktop)));
        assert!(query.contains(&("strategy", "desktop".to_string())));
        assert!(query.contains(&("key", "k123".to_string())));
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        let req: PageSpeedRequest =
            serde_json::from_str(r#"{"url":"https://a.example.com","strategy":"desktop"}"#).unwrap();
        assert_eq!(req.strategy, Some(Strategy::Desktop));
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_url() {
        let relay = PageSpeedRelay::new("http://unused", None).unwrap();
        let err = relay.analyze(&request("  ", None)).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = relay.analyze(&request("example.com", None)).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_analyze_passes_body_through() {
        let app = Router::new().route(
            "/runPagespeed",
            get(|RawQuery(query): RawQuery| async move { query.unwrap_or_default() }),
        );
        let endpoint = spawn(app).await;

        let relay = PageSpeedRelay::new(&endpoint, None).unwrap();
        let reply = relay
            .analyze(&request("https://a.example.com", None))
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
        assert!(reply.body.contains("category=best-practices"));
        assert!(reply.body.contains("strategy=mobile"));
        assert_eq!(reply.body.matches("category=").count(), 4);
    }

    #[tokio::test]
    async fn test_analyze_passes_error_status_through() {
        let app = Router::new().route(
            "/runPagespeed",
            get(|| async { (StatusCode::BAD_REQUEST, r#"{"error":{"code":400}}"#) }),
        );
        let endpoint = spawn(app).await;

        let relay = PageSpeedRelay::new(&endpoint, None).unwrap();
        let reply = relay
            .analyze(&request("https://a.example.com", None))
            .await
            .unwrap();
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body, r#"{"error":{"code":400}}"#);
    }
}
