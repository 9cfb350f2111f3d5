// src/services/backend.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::{
    error::{ClientError, Result},
    message::{ChatRequest, ChatResponse, SessionResponse},
};

/// The remote side of a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the server for a fresh conversation via `POST /session/new`
    /// on the endpoint's origin.
    pub async fn open_session(&self) -> Result<String> {
        let url = self
            .endpoint
            .join("/session/new")
            .map_err(|e| ClientError::Config(format!("cannot derive session URL: {e}")))?;
        debug!(%url, "requesting new session");

        let response = self.client.post(url).send().await?;
        let body: SessionResponse = decode(response).await?;
        Ok(body.session_id)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status(status));
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
