use serde::{Deserialize, Serialize};

/// Body the relay returns on every failure, whatever went wrong behind it.
pub const RELAY_FAILURE_MESSAGE: &str = "Failed to submit survey";
/// Message the form shows after a failed submission.
pub const SUBMIT_FAILURE_PROMPT: &str = "Failed to submit. Please try again.";
/// Message the form shows when the overall rating was never chosen.
pub const RATING_PROMPT: &str = "Please rate your overall Varanasi experience";

pub fn submit_route() -> &'static str {
    "/api/submit"
}

pub fn health_route() -> &'static str {
    "/healthz"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            error: Some(RELAY_FAILURE_MESSAGE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// True only for a JSON object carrying `"success": true`.
pub fn is_upstream_ack(body: &serde_json::Value) -> bool {
    body.get("success").and_then(serde_json::Value::as_bool) == Some(true)
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
