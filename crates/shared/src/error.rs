use thiserror::Error;

/// Rejection of a single field edit on an answer record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown survey field `{0}`")]
    UnknownField(String),
    #[error("`{value}` is not an option for {field}")]
    UnknownOption { field: &'static str, value: String },
    #[error("`{0}` is not a rating; expected a whole number from 1 to 5")]
    InvalidRating(String),
    #[error("rating {0} is out of range; expected 1 to 5")]
    RatingOutOfRange(u8),
}
