//! Configuration adapters

mod json;

pub use json::{ConfigPayload, FileError, JsonAdapter, Payload, PayloadError, StatementPayload};
