//! HTTP response head built from a parsed status line and header block.
//!
//! `http::Response` has no place for the reason phrase, so it is kept next to the response.

use http::{HeaderMap, Response, StatusCode, Version};

use crate::protocol::{ParseError, StatusLine};

#[derive(Debug)]
pub struct ResponseHeader {
    inner: Response<()>,
    reason: String,
}

impl ResponseHeader {
    /// Builds the head from a status line and the parsed header fields.
    ///
    /// # Errors
    ///
    /// Fails if the version has no `http::Version` counterpart.
    pub fn from_parts(line: StatusLine, headers: HeaderMap) -> Result<Self, ParseError> {
        let mut inner = Response::new(());
        *inner.status_mut() = line.http_status()?;
        *inner.version_mut() = line.http_version()?;
        *inner.headers_mut() = headers;
        Ok(Self { inner, reason: line.reason })
    }

    pub fn into_inner(self) -> Response<()> {
        self.inner
    }

    pub fn body<T>(self, body: T) -> Response<T> {
        self.inner.map(|()| body)
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// The reason phrase exactly as received; may be empty.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl AsRef<Response<()>> for ResponseHeader {
    fn as_ref(&self) -> &Response<()> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpVersion;

    #[test]
    fn keeps_reason_phrase() {
        let line = StatusLine { version: HttpVersion::new(1, 0), status: 201, reason: "Created".into() };
        let header = ResponseHeader::from_parts(line, HeaderMap::new()).unwrap();

        assert_eq!(header.status(), StatusCode::CREATED);
        assert_eq!(header.version(), Version::HTTP_10);
        assert_eq!(header.reason(), "Created");
        assert!(header.headers().is_empty());
    }
}
