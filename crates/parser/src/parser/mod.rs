//! Incremental, buffer-bounded parsers for HTTP and MIME messages.
//!
//! Every parser here is a small state machine driven by [`Parser::parse`]. The caller feeds
//! chunks of a byte stream as they arrive, of any size down to a single byte, and gets back a
//! [`Progress`]: how many bytes were consumed and which [`ParserState`] the parser is in.
//! Chopping the same stream differently never changes the outcome.
//!
//! # Parsers
//!
//! - [`RequestLineParser`]: `METHOD SP URI SP HTTP/x.y CRLF`
//! - [`StatusLineParser`]: `HTTP/x.y SP 3DIGIT SP reason CRLF`
//! - [`HeaderParser`]: RFC 5322 style header fields with folding, up to the empty line
//! - [`MimeMultipartParser`]: splits a multipart body into body parts on its boundary
//! - [`FormUrlEncodedParser`]: `name=value&name=value` pairs
//!
//! # Size limits
//!
//! Each parser is constructed with the maximum number of bytes it will ever consume. The
//! constructor rejects values below the protocol minimum. When the maximum is reached before
//! the parser can finish, it reports [`ParserState::DataTooBig`] with exactly the maximum
//! consumed.
//!
//! # Example
//!
//! ```
//! use micro_parser::parser::{HeaderParser, Parser};
//! use micro_parser::protocol::ParserState;
//!
//! let mut parser = HeaderParser::new(http::HeaderMap::new(), 1024).unwrap();
//! let input = b"Host: example.com\r\nAccept: */*\r\n\r\n";
//!
//! let progress = parser.parse(&input[..10], false);
//! assert_eq!(progress.state, ParserState::NeedMoreData);
//! let progress = parser.parse(&input[progress.consumed..], false);
//! assert_eq!(progress.state, ParserState::Done);
//!
//! assert_eq!(parser.sink()["host"], "example.com");
//! ```

mod form_parser;
mod header_parser;
mod multipart_parser;
mod request_line_parser;
mod status_line_parser;
mod token;

pub use form_parser::{DEFAULT_MAX_FORM_SIZE, FormUrlEncodedParser, MIN_FORM_SIZE};
pub use header_parser::{DEFAULT_MAX_HEADER_SIZE, HeaderParser, MIN_HEADER_SIZE};
pub use multipart_parser::{BodyPart, DEFAULT_MAX_MULTIPART_SIZE, MIN_MULTIPART_SIZE, MimeMultipartParser};
pub use request_line_parser::{DEFAULT_MAX_REQUEST_LINE_SIZE, MIN_REQUEST_LINE_SIZE, RequestLineParser};
pub use status_line_parser::{DEFAULT_MAX_STATUS_LINE_SIZE, MIN_STATUS_LINE_SIZE, StatusLineParser};

use crate::protocol::{ParserState, Progress};

/// The incremental parsing contract shared by the parser family.
pub trait Parser {
    /// Parses as much of `buf` as possible.
    ///
    /// `is_final` tells the parser that no bytes follow `buf`; only parsers whose grammar has
    /// no terminator of its own (form bodies, the end of a multipart body) look at it. An
    /// empty `buf` with `is_final` set is how a caller signals end-of-stream.
    ///
    /// The returned `consumed` never exceeds `buf.len()`. Bytes that were not consumed have to
    /// be offered again, at the start of the next call. After a terminal state every further
    /// call consumes nothing and reports the same state.
    fn parse(&mut self, buf: &[u8], is_final: bool) -> Progress;
}

/// Verdict of a byte-level state machine on a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The byte was accepted
    Continue,
    /// The byte was accepted and completed the grammar
    Done,
    /// The byte was not accepted
    Reject,
}

/// Runs `step` over `window` until it completes, rejects a byte or runs out of input.
///
/// A rejected byte is not counted as consumed.
pub(crate) fn scan(window: &[u8], mut step: impl FnMut(u8) -> Step) -> Progress {
    for (offset, &b) in window.iter().enumerate() {
        match step(b) {
            Step::Continue => {}
            Step::Done => return Progress::new(ParserState::Done, offset + 1),
            Step::Reject => return Progress::new(ParserState::Invalid, offset),
        }
    }
    Progress::new(ParserState::NeedMoreData, window.len())
}
