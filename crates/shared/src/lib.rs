//! Survey model and wire shapes shared by the relay and the form client.

pub mod domain;
pub mod error;
pub mod protocol;
