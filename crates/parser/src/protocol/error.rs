use std::io;
use thiserror::Error;

/// Raised when a parser is constructed with arguments that break its contract.
///
/// These are programming errors: they are reported by the constructor, never while parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max size {max_size} is below the protocol minimum {min_size}")]
    MaxSizeTooSmall { max_size: usize, min_size: usize },

    #[error("invalid multipart boundary: {reason}")]
    InvalidBoundary { reason: String },
}

impl ConfigError {
    pub fn max_size_too_small(max_size: usize, min_size: usize) -> Self {
        Self::MaxSizeTooSmall { max_size, min_size }
    }

    pub fn invalid_boundary<S: ToString>(str: S) -> Self {
        Self::InvalidBoundary { reason: str.to_string() }
    }
}

/// Errors surfaced by the [`codec`](crate::codec) decoders.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{what} too large, exceed the limit {max_size}")]
    TooLarge { what: &'static str, max_size: usize },

    #[error("invalid request line")]
    InvalidRequestLine,

    #[error("invalid status line")]
    InvalidStatusLine,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http uri")]
    InvalidUri,

    #[error("invalid http version: {0}")]
    InvalidVersion(String),

    #[error("invalid http status: {0}")]
    InvalidStatus(u16),

    #[error("invalid multipart body: {reason}")]
    InvalidMultipart { reason: String },

    #[error("invalid form body")]
    InvalidForm,

    #[error("config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large(what: &'static str, max_size: usize) -> Self {
        Self::TooLarge { what, max_size }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_multipart<S: ToString>(str: S) -> Self {
        Self::InvalidMultipart { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
