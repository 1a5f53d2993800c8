// Relays to third-party APIs: chat gateway, page-speed analysis, social webhooks

pub mod chat;
pub mod error;
pub mod pagespeed;
pub mod share;

pub use chat::{ChatMessage, ChatRelay, ChatRequest};
pub use error::RelayError;
pub use pagespeed::{PageSpeedRelay, PageSpeedRequest, Strategy, UpstreamReply};
pub use share::{
    JsonlShareLog, ShareLog, ShareLogEntry, ShareOutcome, ShareRelay, ShareRequest, ShareResponse,
    StaticWebhookStore, TracingShareLog, WebhookStore,
};
