//! Transport for the study assistant chat function.
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;

use super::error::{ExchangeError, GENERIC_FAILURE};
use super::models::ChatRequest;
use super::stream::ByteStream;
use crate::core::AppConfig;

/// Opens one streamed exchange. Implementations resolve once the
/// response head is in; the body is read lazily from the returned
/// stream and dropping it releases the connection.
#[async_trait]
pub trait ChatEndpoint {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ExchangeError>;
}

pub type BoxedChatEndpoint = Arc<dyn ChatEndpoint + Send + Sync + 'static>;

#[derive(Clone, Debug)]
pub struct HttpChatEndpoint {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpChatEndpoint {
    pub fn new(config: &AppConfig) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.chat_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatEndpoint for HttpChatEndpoint {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ExchangeError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Chat endpoint returned {}: {}", status, body);
            return Err(ExchangeError::Response {
                status,
                message: error_message(&body),
            });
        }

        if response.content_length() == Some(0) {
            return Err(ExchangeError::EmptyBody);
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ExchangeError::from));

        Ok(Box::pin(body))
    }
}

/// The function reports failures as `{"error": "..."}`. Anything else
/// gets the generic message.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
