use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use shared::protocol::{submit_route, SubmitResponse};

use crate::error::TransportError;

/// Delivers a serialized answer record to the relay.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, payload: Value) -> Result<(), TransportError>;
}

/// Posts submissions to a relay's `/api/submit` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelayTransport {
    http: Client,
    submit_url: Url,
}

impl HttpRelayTransport {
    pub fn new(relay_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), relay_url)
    }

    pub fn with_client(http: Client, relay_url: &str) -> Result<Self> {
        let base = Url::parse(relay_url)
            .with_context(|| format!("invalid relay url `{relay_url}`"))?;
        let submit_url = base
            .join(submit_route())
            .with_context(|| format!("cannot derive submit endpoint from `{relay_url}`"))?;
        Ok(Self { http, submit_url })
    }

    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }
}

#[async_trait]
impl SubmissionTransport for HttpRelayTransport {
    async fn send(&self, payload: Value) -> Result<(), TransportError> {
        let response = self
            .http
            .post(self.submit_url.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<SubmitResponse>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(TransportError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
