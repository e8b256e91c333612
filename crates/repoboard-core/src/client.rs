use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::service::{parse_reply, ChatError, ChatReply, ChatRequest, ChatService};

/// Chat service reached over HTTP.
#[derive(Clone)]
pub struct HttpChatService {
    client: Client,
    endpoint: String,
}

impl HttpChatService {
    /// No timeout is applied unless one is given.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send(&self, message: &str) -> Result<ChatReply, ChatError> {
        tracing::debug!(endpoint = %self.endpoint, "posting chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}
