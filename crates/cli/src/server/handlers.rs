use agentsite_core::SeoReport;
use agentsite_core::config::validate_origin;
use agentsite_generator::{ArticleView, generate_sitemap, robots_txt};
use agentsite_relay::{ChatRequest, PageSpeedRequest, RelayError, ShareRequest, ShareResponse};
use agentsite_seo::{HttpFetcher, SeoEvaluator};
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use super::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Answers bare OPTIONS requests; real preflights are handled by the CORS layer
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let xml = generate_sitemap(&state.config, state.posts.as_deref(), today).await;

    (
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    )
}

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&state.config.site.origin),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct SeoCheckRequest {
    pub url: Option<String>,
}

/// Body is optional; without a `url` the configured origin is checked
pub async fn seo_check(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<SeoReport>> {
    let request: SeoCheckRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SeoCheckRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    };

    let origin = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            validate_origin(url, "url").map_err(|e| ApiError::InvalidRequest(e.to_string()))?
        }
        _ => state.config.site.origin.clone(),
    };

    let fetcher = HttpFetcher::new(Duration::from_secs(state.config.seo.timeout_secs))
        .map_err(|e| ApiError::Internal(format!("Could not build HTTP client: {}", e)))?;
    let report = SeoEvaluator::new(fetcher, state.config.seo.pages.clone())
        .evaluate(&origin)
        .await;

    Ok(Json(report))
}

/// Streams the gateway's event stream back without buffering
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let relay = state
        .chat
        .as_ref()
        .ok_or(RelayError::NotConfigured("chat relay"))?;

    let upstream = relay.forward(&request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

pub async fn pagespeed(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PageSpeedRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let reply = state.pagespeed.analyze(&request).await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response())
}

pub async fn share(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShareRequest>, JsonRejection>,
) -> ApiResult<Json<ShareResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.share.share(&request).await?))
}

#[derive(Debug, Deserialize)]
pub struct TocRequest {
    pub markdown: String,
}

pub async fn toc(payload: Result<Json<TocRequest>, JsonRejection>) -> ApiResult<Json<ArticleView>> {
    let Json(request) = payload?;
    Ok(Json(ArticleView::render(&request.markdown)))
}
