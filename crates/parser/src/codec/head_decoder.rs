//! Decoders for HTTP message heads
//!
//! A head is a start line followed by a header block. The decoders run the matching line
//! parser, then a [`HeaderParser`] collecting into an [`http::HeaderMap`], and build the typed
//! head from both. Bytes are advanced out of the read buffer as soon as a parser consumed them,
//! so whatever follows the head (usually the body) is left in the buffer untouched.
//!
//! A decoder handles one head after the other; once a head is returned it starts over.

use std::io;

use bytes::{Buf, BytesMut};
use http::HeaderMap;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::parser::{
    DEFAULT_MAX_HEADER_SIZE, DEFAULT_MAX_REQUEST_LINE_SIZE, DEFAULT_MAX_STATUS_LINE_SIZE, HeaderParser, Parser,
    RequestLineParser, StatusLineParser,
};
use crate::protocol::{ConfigError, ParseError, ParserState, RequestHeader, RequestLine, ResponseHeader, StatusLine};

/// Size limits of a message head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadLimits {
    /// Maximum size of the start line, CRLF included
    pub max_line_size: usize,
    /// Maximum size of the header block, the terminating empty line included
    pub max_header_size: usize,
}

impl HeadLimits {
    /// Defaults of [`RequestHeadDecoder`].
    pub const REQUEST: Self = Self { max_line_size: DEFAULT_MAX_REQUEST_LINE_SIZE, max_header_size: DEFAULT_MAX_HEADER_SIZE };

    /// Defaults of [`ResponseHeadDecoder`].
    pub const RESPONSE: Self = Self { max_line_size: DEFAULT_MAX_STATUS_LINE_SIZE, max_header_size: DEFAULT_MAX_HEADER_SIZE };
}

/// Same as [`HeadLimits::REQUEST`].
impl Default for HeadLimits {
    fn default() -> Self {
        Self::REQUEST
    }
}

/// A line parser the head decoder can start a message with.
trait StartLineParser: Parser + Sized {
    type Line: std::fmt::Debug;

    /// Name used in size errors
    const WHAT: &'static str;

    const DEFAULT_LIMITS: HeadLimits;

    fn with_max_size(max_size: usize) -> Result<Self, ConfigError>;

    fn into_line(self) -> Option<Self::Line>;

    fn invalid() -> ParseError;
}

impl StartLineParser for RequestLineParser {
    type Line = RequestLine;
    const WHAT: &'static str = "request line";
    const DEFAULT_LIMITS: HeadLimits = HeadLimits::REQUEST;

    fn with_max_size(max_size: usize) -> Result<Self, ConfigError> {
        Self::new(max_size)
    }

    fn into_line(self) -> Option<RequestLine> {
        self.into_request_line()
    }

    fn invalid() -> ParseError {
        ParseError::InvalidRequestLine
    }
}

impl StartLineParser for StatusLineParser {
    type Line = StatusLine;
    const WHAT: &'static str = "status line";
    const DEFAULT_LIMITS: HeadLimits = HeadLimits::RESPONSE;

    fn with_max_size(max_size: usize) -> Result<Self, ConfigError> {
        Self::new(max_size)
    }

    fn into_line(self) -> Option<StatusLine> {
        self.into_status_line()
    }

    fn invalid() -> ParseError {
        ParseError::InvalidStatusLine
    }
}

#[derive(Debug)]
enum HeadState<P: StartLineParser> {
    StartLine(P),
    Headers(P::Line, HeaderParser),
}

/// The state machine shared by the request and response head decoders.
#[derive(Debug)]
struct HeadDecoder<P: StartLineParser> {
    limits: HeadLimits,
    /// `None` between two heads
    state: Option<HeadState<P>>,
    /// Bytes consumed for the head in progress
    consumed: usize,
}

impl<P: StartLineParser> HeadDecoder<P> {
    fn new(limits: HeadLimits) -> Result<Self, ConfigError> {
        // validate both limits up front
        HeaderParser::new(HeaderMap::new(), limits.max_header_size)?;
        let parser = P::with_max_size(limits.max_line_size)?;
        Ok(Self { limits, state: Some(HeadState::StartLine(parser)), consumed: 0 })
    }

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<(P::Line, HeaderMap)>, ParseError> {
        loop {
            let state = match self.state.take() {
                Some(state) => state,
                None => HeadState::StartLine(P::with_max_size(self.limits.max_line_size)?),
            };

            match state {
                HeadState::StartLine(mut parser) => {
                    let progress = parser.parse(&src[..], false);
                    src.advance(progress.consumed);
                    self.consumed += progress.consumed;

                    match progress.state {
                        ParserState::NeedMoreData => {
                            self.state = Some(HeadState::StartLine(parser));
                            return Ok(None);
                        }
                        ParserState::Done => {
                            let line = parser.into_line().ok_or_else(P::invalid)?;
                            let headers = HeaderParser::new(HeaderMap::new(), self.limits.max_header_size)?;
                            self.state = Some(HeadState::Headers(line, headers));
                        }
                        ParserState::DataTooBig => return Err(ParseError::too_large(P::WHAT, self.limits.max_line_size)),
                        _ => return Err(P::invalid()),
                    }
                }
                HeadState::Headers(line, mut parser) => {
                    let progress = parser.parse(&src[..], false);
                    src.advance(progress.consumed);
                    self.consumed += progress.consumed;

                    return match progress.state {
                        ParserState::NeedMoreData => {
                            self.state = Some(HeadState::Headers(line, parser));
                            Ok(None)
                        }
                        ParserState::Done => {
                            trace!(?line, head_size = self.consumed, "decoded message head");
                            self.consumed = 0;
                            Ok(Some((line, parser.into_sink())))
                        }
                        ParserState::DataTooBig => Err(ParseError::too_large("header block", self.limits.max_header_size)),
                        _ => Err(ParseError::invalid_header("malformed header field")),
                    };
                }
            }
        }
    }

    /// A stream ending inside a head is an error, a stream ending between heads is not.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<(P::Line, HeaderMap)>, ParseError> {
        match self.decode(src)? {
            Some(head) => Ok(Some(head)),
            None if self.consumed == 0 => Ok(None),
            None => Err(ParseError::io(io::ErrorKind::UnexpectedEof)),
        }
    }
}

/// Decodes request heads into [`RequestHeader`]s.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use micro_parser::codec::{HeadLimits, RequestHeadDecoder};
/// use micro_parser::protocol::ParseError;
/// use tokio_util::codec::Decoder;
///
/// let limits = HeadLimits { max_line_size: 64, max_header_size: 64 };
/// let mut decoder = RequestHeadDecoder::with_limits(limits).unwrap();
///
/// let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nX-Long: 0123456789012345678901234567890123456789012345678901234567\r\n\r\n"[..]);
/// let error = decoder.decode(&mut buffer).unwrap_err();
/// assert!(matches!(error, ParseError::TooLarge { max_size: 64, .. }));
/// ```
#[derive(Debug)]
pub struct RequestHeadDecoder {
    inner: HeadDecoder<RequestLineParser>,
}

impl RequestHeadDecoder {
    /// A decoder with [`HeadLimits::REQUEST`].
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if a limit is below the minimum of its parser.
    pub fn with_limits(limits: HeadLimits) -> Result<Self, ConfigError> {
        Ok(Self { inner: HeadDecoder::new(limits)? })
    }
}

impl Default for RequestHeadDecoder {
    fn default() -> Self {
        Self {
            inner: HeadDecoder {
                limits: RequestLineParser::DEFAULT_LIMITS,
                state: Some(HeadState::StartLine(RequestLineParser::default())),
                consumed: 0,
            },
        }
    }
}

impl Decoder for RequestHeadDecoder {
    type Item = RequestHeader;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some((line, headers)) => Ok(Some(RequestHeader::from_parts(&line, headers)?)),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode_eof(src)? {
            Some((line, headers)) => Ok(Some(RequestHeader::from_parts(&line, headers)?)),
            None => Ok(None),
        }
    }
}

/// Decodes response heads into [`ResponseHeader`]s.
#[derive(Debug)]
pub struct ResponseHeadDecoder {
    inner: HeadDecoder<StatusLineParser>,
}

impl ResponseHeadDecoder {
    /// A decoder with [`HeadLimits::RESPONSE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if a limit is below the minimum of its parser.
    pub fn with_limits(limits: HeadLimits) -> Result<Self, ConfigError> {
        Ok(Self { inner: HeadDecoder::new(limits)? })
    }
}

impl Default for ResponseHeadDecoder {
    fn default() -> Self {
        Self {
            inner: HeadDecoder {
                limits: StatusLineParser::DEFAULT_LIMITS,
                state: Some(HeadState::StartLine(StatusLineParser::default())),
                consumed: 0,
            },
        }
    }
}

impl Decoder for ResponseHeadDecoder {
    type Item = ResponseHeader;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some((line, headers)) => Ok(Some(ResponseHeader::from_parts(line, headers)?)),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode_eof(src)? {
            Some((line, headers)) => Ok(Some(ResponseHeader::from_parts(line, headers)?)),
            None => Ok(None),
        }
    }
}
