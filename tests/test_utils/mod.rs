//! Test utilities for integration tests
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

use study_assistant::chat::{ChatSession, HttpChatEndpoint};
use study_assistant::core::AppConfig;
use study_assistant::notify::{ChannelNotifier, Notice};

pub const CHAT_PATH: &str = "/functions/v1/study-assistant";

/// Config pointing at a mock server with short timeouts.
pub fn test_config(server: &mockito::Server) -> AppConfig {
    AppConfig {
        api_hostname: server.url(),
        api_key: String::from("test-publishable-key"),
        subject: None,
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(10),
        idle_timeout: Duration::from_secs(5),
    }
}

/// A session wired to the mock server over HTTP, plus the receiving end
/// of its notices.
pub fn test_session(config: &AppConfig) -> (ChatSession, UnboundedReceiver<Notice>) {
    let endpoint = HttpChatEndpoint::new(config).expect("Failed to build endpoint");
    let (notifier, notices) = ChannelNotifier::new();
    let session = ChatSession::from_config(config, Arc::new(endpoint), Arc::new(notifier));
    (session, notices)
}

/// One SSE content frame the way the chat function emits it.
pub fn content_frame(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
    )
}

pub fn sse_body(contents: &[&str]) -> String {
    let mut body: String = contents.iter().map(|c| content_frame(c)).collect();
    body.push_str("data: [DONE]\n\n");
    body
}
