use shared::{error::FieldError, protocol::RATING_PROMPT};
use thiserror::Error;

use crate::form::SubmissionStatus;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{}", RATING_PROMPT)]
    RatingRequired,
    #[error("please answer the required questions: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),
    #[error("cannot submit while the form is {0}")]
    SubmissionInProgress(SubmissionStatus),
    #[error("the form is locked while the confirmation is shown")]
    ConfirmationShowing,
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("failed to serialize answers: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl FormError {
    /// Client-side validation failures; these never reach the relay.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::RatingRequired | Self::MissingRequiredFields(_) | Self::Field(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay answered {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
}
