use axum::extract::rejection::BytesRejection;
use reqwest::{redirect, Client, StatusCode};
use serde_json::Value;
use shared::protocol::is_upstream_ack;
use thiserror::Error;
use tracing::debug;
use url::Url;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayErrorKind {
    InvalidRequest,
    Configuration,
    Network,
    UpstreamRejection,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("could not read submission body: {0}")]
    UnreadableBody(#[source] BytesRejection),
    #[error("submission body is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("spreadsheet destination is not configured; set GOOGLE_SHEETS_URL")]
    MissingDestination,
    #[error("spreadsheet destination `{url}` is not a valid URL: {source}")]
    InvalidDestination {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to spreadsheet destination failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("spreadsheet destination answered {status} with a non-JSON body: {body}")]
    MalformedResponse { status: StatusCode, body: String },
    #[error("spreadsheet destination rejected the submission ({status}): {body}")]
    UpstreamRejected { status: StatusCode, body: String },
}

impl RelayError {
    pub fn kind(&self) -> RelayErrorKind {
        match self {
            Self::UnreadableBody(_) | Self::InvalidPayload(_) => RelayErrorKind::InvalidRequest,
            Self::MissingDestination | Self::InvalidDestination { .. } => {
                RelayErrorKind::Configuration
            }
            Self::Network(_) | Self::MalformedResponse { .. } => RelayErrorKind::Network,
            Self::UpstreamRejected { .. } => RelayErrorKind::UpstreamRejection,
        }
    }

    /// Raw upstream body, when the destination answered at all.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { body, .. } | Self::UpstreamRejected { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

/// Stateless forwarder from the form endpoint to the spreadsheet endpoint.
#[derive(Debug, Clone)]
pub struct SubmissionRelay {
    http: Client,
    destination: Option<String>,
}

impl SubmissionRelay {
    pub fn new(destination: Option<String>) -> reqwest::Result<Self> {
        let http = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self::with_client(http, destination))
    }

    pub fn with_client(http: Client, destination: Option<String>) -> Self {
        Self { http, destination }
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Posts `payload` unchanged to the destination and succeeds only when the
    /// destination acknowledges with `"success": true`. Never retries.
    pub async fn relay(&self, payload: &Value) -> Result<(), RelayError> {
        let destination = self.resolve_destination()?;

        let response = self
            .http
            .post(destination)
            .json(payload)
            .send()
            .await
            .map_err(RelayError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(RelayError::Network)?;
        debug!(%status, bytes = body.len(), "spreadsheet destination answered");

        let ack: Value = match serde_json::from_str(&body) {
            Ok(ack) => ack,
            Err(_) => return Err(RelayError::MalformedResponse { status, body }),
        };
        if !is_upstream_ack(&ack) {
            return Err(RelayError::UpstreamRejected { status, body });
        }

        Ok(())
    }

    fn resolve_destination(&self) -> Result<Url, RelayError> {
        let raw = self
            .destination
            .as_deref()
            .ok_or(RelayError::MissingDestination)?;
        Url::parse(raw).map_err(|source| RelayError::InvalidDestination {
            url: raw.to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/forward_tests.rs"]
mod tests;
