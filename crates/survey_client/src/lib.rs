//! Form controller for the traveler survey and its HTTP link to the relay.

pub mod error;
pub mod form;
pub mod transport;

pub use error::{FormError, TransportError};
pub use form::{FormController, FormEvent, FormSnapshot, SubmissionStatus, CONFIRMATION_WINDOW};
pub use transport::{HttpRelayTransport, SubmissionTransport};
