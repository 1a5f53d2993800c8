use agentsite_core::ChatConfig;
use agentsite_core::config::read_secret;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::RelayError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.messages.is_empty() {
            return Err(RelayError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }
        if let Some(i) = self.messages.iter().position(|m| m.role.trim().is_empty()) {
            return Err(RelayError::InvalidRequest(format!(
                "messages[{}].role must not be empty",
                i
            )));
        }
        Ok(())
    }
}

/// Forwards conversations to the upstream chat-completion gateway
pub struct ChatRelay {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    system_prompt: String,
}

impl ChatRelay {
    pub fn new(endpoint: &str, model: &str, api_key: &str, system_prompt: &str) -> Result<Self, RelayError> {
        // No overall timeout: the body streams for as long as the model talks
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            system_prompt: system_prompt.to_string(),
        })
    }

    /// Build from site.toml, reading the key from the named environment variable
    pub fn from_config(config: &ChatConfig) -> Result<Self, RelayError> {
        let api_key = read_secret(&config.api_key_env).ok_or(RelayError::NotConfigured("chat API key"))?;
        Self::new(&config.endpoint, &config.model, &api_key, &config.system_prompt)
    }

    /// Upstream request body: system prompt first, then the conversation
    pub fn upstream_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(json!({ "role": "system", "content": self.system_prompt }));
        messages.extend(
            request
                .messages
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        })
    }

    /// Send the conversation upstream.
    ///
    /// On success the response body has not been read yet, so the caller can
    /// stream it back verbatim.
    pub async fn forward(&self, request: &ChatRequest) -> Result<reqwest::Response, RelayError> {
        request.validate()?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.upstream_body(request))
            .send()
            .await?;

        classify_upstream(response).await
    }
}

async fn classify_upstream(response: reqwest::Response) -> Result<reqwest::Response, RelayError> {
    let status = response.status();
    match status.as_u16() {
        429 => Err(RelayError::RateLimited),
        402 => Err(RelayError::PaymentRequired),
        _ if status.is_success() => Ok(response),
        code => {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat gateway error {}: {}", code, body);
            Err(RelayError::Upstream { status: code, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use std::sync::{Arc, Mutex};

    fn request(content: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: content.to_string(),
            }],
        }
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    async fn upstream_with_status(status: StatusCode) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || async move { (status, "upstream says no").into_response() }),
        );
        spawn(app).await
    }

    #[test]
    fn test_upstream_body_prepends_system_prompt() {
        let relay = ChatRelay::new("http://unused", "model-x", "key", "Be helpful").unwrap();
        let body = relay.upstream_body(&request("Which agent handles invoices?"));

        assert_eq!(body["model"], "model-x");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Which agent handles invoices?");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_validate_rejects_empty_conversation() {
        let empty = ChatRequest { messages: vec![] };
        assert!(matches!(empty.validate(), Err(RelayError::InvalidRequest(_))));

        let no_role = ChatRequest {
            messages: vec![ChatMessage {
                role: " ".to_string(),
                content: "hi".to_string(),
            }],
        };
        let err = no_role.validate().unwrap_err();
        assert!(err.to_string().contains("messages[0].role"));
    }

    #[tokio::test]
    async fn test_forward_streams_success_body() {
        let seen = Arc::new(Mutex::new(None));
        let recorder = Arc::clone(&seen);
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<serde_json::Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    *recorder.lock().unwrap() = Some(body);
                    "data: {\"choices\":[]}\n\ndata: [DONE]\n\n"
                }
            }),
        );
        let endpoint = spawn(app).await;

        let relay = ChatRelay::new(&endpoint, "m", "secret", "sys").unwrap();
        let response = relay.forward(&request("hello")).await.unwrap();
        let text = response.text().await.unwrap();
        assert_eq!(text, "data: {\"choices\":[]}\n\ndata: [DONE]\n\n");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["messages"][0]["content"], "sys");
    }

    #[tokio::test]
    async fn test_forward_maps_rate_limit() {
        let endpoint = upstream_with_status(StatusCode::TOO_MANY_REQUESTS).await;
        let relay = ChatRelay::new(&endpoint, "m", "k", "s").unwrap();
        let err = relay.forward(&request("hi")).await.unwrap_err();
        assert!(matches!(err, RelayError::RateLimited));
        assert_eq!(err.status_code(), 429);
    }

    #[tokio::test]
    async fn test_forward_maps_payment_required() {
        let endpoint = upstream_with_status(StatusCode::PAYMENT_REQUIRED).await;
        let relay = ChatRelay::new(&endpoint, "m", "k", "s").unwrap();
        let err = relay.forward(&request("hi")).await.unwrap_err();
        assert_eq!(err.status_code(), 402);
    }

    #[tokio::test]
    async fn test_forward_maps_other_failures_to_500() {
        let endpoint = upstream_with_status(StatusCode::BAD_GATEWAY).await;
        let relay = ChatRelay::new(&endpoint, "m", "k", "s").unwrap();
        let err = relay.forward(&request("hi")).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream { status: 502, .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_forward_network_failure_is_500() {
        let relay = ChatRelay::new("http://127.0.0.1:9/v1/chat", "m", "k", "s").unwrap();
        let err = relay.forward(&request("hi")).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
