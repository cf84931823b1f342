use thiserror::Error as ThisError;

use crate::frame::Frame;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid range for field {field}; upper bound {high} is lower than {low}")]
    InvalidRange { field: String, low: i64, high: i64 },
    #[error("unknown operation {name}")]
    UnknownOperation { name: String },
    #[error("operation {name} is registered as {expected} but built a {actual} command")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("invalid arguments for {operation}; {reason}")]
    InvalidArguments { operation: String, reason: String },
    #[error("no keys were built, bind at least one field first")]
    NoKeys,
    #[error("{count} keys were built but the operation accepts a single key")]
    TooManyKeys { count: usize },
    #[error("key {key} still has unbound fields")]
    IncompleteKey { key: String },
    /// Any failure reported by the store or its transport, passed through untouched.
    #[error(transparent)]
    Store(#[from] redis::RedisError),
    #[error("unexpected reply for {operation}: {reply}")]
    Decode { operation: String, reply: Frame },
}

impl Error {
    pub(crate) fn decode(operation: impl ToString, reply: Frame) -> Self {
        Error::Decode {
            operation: operation.to_string(),
            reply,
        }
    }

    pub(crate) fn arguments(operation: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidArguments {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}
