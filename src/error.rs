//! Error types for the Lite3 core.
//!
//! Every error carries one of the five wire-level discriminants plus a short
//! human message. The engine never retries internally: each error is surfaced
//! immediately to the caller. Reads of missing keys are *not* errors — they
//! return `None` — so `KeyNotFound` exists for callers that want to convert
//! an absent read into a failure at their own boundary.

use thiserror::Error;

/// Errors surfaced across the Lite3 boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Uninitialized handle, wrong root type, or unsupported runtime value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation would grow the buffer past 2^32 - 1 bytes.
    #[error("no buffer space: {0}")]
    NoBufferSpace(String),

    /// Reserved for callers converting an absent read into a failure.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Corruption detected before any write: tree height overflow, a type
    /// tag outside 0..7 at a value position, or a length field pointing past
    /// the buffer end.
    #[error("bad message: {0}")]
    BadMessage(String),

    /// An offset points outside the used portion of the buffer.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn no_buffer_space(msg: impl Into<String>) -> Self {
        Error::NoBufferSpace(msg.into())
    }

    pub fn key_not_found(msg: impl Into<String>) -> Self {
        Error::KeyNotFound(msg.into())
    }

    pub fn bad_message(msg: impl Into<String>) -> Self {
        Error::BadMessage(msg.into())
    }

    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Error::OutOfBounds(msg.into())
    }
}

/// Result type for Lite3 operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_discriminant_and_message() {
        let err = Error::bad_message("tree height 10 exceeds maximum 9");
        assert_eq!(
            err.to_string(),
            "bad message: tree height 10 exceeds maximum 9"
        );

        let err = Error::out_of_bounds("offset 200 past used length 96");
        assert_eq!(err.to_string(), "out of bounds: offset 200 past used length 96");
    }

    #[test]
    fn variants_are_distinguishable() {
        assert!(matches!(
            Error::invalid_argument("x"),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(Error::no_buffer_space("x"), Error::NoBufferSpace(_)));
        assert!(matches!(Error::key_not_found("x"), Error::KeyNotFound(_)));
    }
}
