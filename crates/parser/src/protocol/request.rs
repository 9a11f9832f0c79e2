//! HTTP request head built from a parsed request line and header block.
//!
//! This module wraps the standard `http::Request` type so that a decoded head can be handed
//! to code that works with the `http` crate.

use http::{HeaderMap, Method, Request, Uri, Version};

use crate::protocol::{ParseError, RequestLine};

/// Represents an HTTP request head: method, uri, version and headers, no body.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Builds the head from the tokens of a request line and the parsed header fields.
    ///
    /// # Errors
    ///
    /// Fails if a token is syntactically valid on the wire but cannot be represented by the
    /// `http` types, e.g. an `HTTP/1.7` version or a request target `http::Uri` refuses.
    pub fn from_parts(line: &RequestLine, headers: HeaderMap) -> Result<Self, ParseError> {
        let mut inner = Request::new(());
        *inner.method_mut() = line.http_method()?;
        *inner.uri_mut() = line.http_uri()?;
        *inner.version_mut() = line.http_version()?;
        *inner.headers_mut() = headers;
        Ok(Self { inner })
    }

    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|()| body)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }
}

/// Converts a bodyless request into a RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}
