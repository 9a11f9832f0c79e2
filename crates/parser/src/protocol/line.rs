//! Parsed start lines: the request line of a request and the status line of a response.
//!
//! The parsers keep these tokens exactly as they appeared on the wire; conversion into the
//! typed [`http`] vocabulary is a separate, fallible step because the wire grammar accepts
//! more than `http` models (arbitrary version numbers, for example).

use std::fmt;

use http::{Method, StatusCode, Uri, Version};

use crate::protocol::ParseError;

/// An `HTTP/<major>.<minor>` version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpVersion {
    pub major: u32,
    pub minor: u32,
}

impl HttpVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl TryFrom<HttpVersion> for Version {
    type Error = ParseError;

    fn try_from(version: HttpVersion) -> Result<Self, Self::Error> {
        match (version.major, version.minor) {
            (0, 9) => Ok(Version::HTTP_09),
            (1, 0) => Ok(Version::HTTP_10),
            (1, 1) => Ok(Version::HTTP_11),
            (2, 0) => Ok(Version::HTTP_2),
            (3, 0) => Ok(Version::HTTP_3),
            _ => Err(ParseError::InvalidVersion(version.to_string())),
        }
    }
}

/// `METHOD SP REQUEST-URI SP HTTP-VERSION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: HttpVersion,
}

impl RequestLine {
    /// Converts the method token into an [`http::Method`].
    pub fn http_method(&self) -> Result<Method, ParseError> {
        Method::from_bytes(self.method.as_bytes()).map_err(|_| ParseError::InvalidMethod)
    }

    /// Converts the request target into an [`http::Uri`].
    pub fn http_uri(&self) -> Result<Uri, ParseError> {
        Uri::try_from(self.uri.as_str()).map_err(|_| ParseError::InvalidUri)
    }

    /// Converts the version into an [`http::Version`].
    pub fn http_version(&self) -> Result<Version, ParseError> {
        self.version.try_into()
    }
}

/// `HTTP-VERSION SP STATUS-CODE SP REASON-PHRASE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: HttpVersion,
    /// Always within `100..=999`.
    pub status: u16,
    pub reason: String,
}

impl StatusLine {
    pub fn http_status(&self) -> Result<StatusCode, ParseError> {
        StatusCode::from_u16(self.status).map_err(|_| ParseError::InvalidStatus(self.status))
    }

    pub fn http_version(&self) -> Result<Version, ParseError> {
        self.version.try_into()
    }
}
