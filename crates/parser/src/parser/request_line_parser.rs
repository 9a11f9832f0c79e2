//! Incremental parser for the request line of an HTTP request.
//!
//! ```text
//! request-line = method SP request-target SP HTTP-version CRLF
//! ```
//!
//! Exactly one SP separates the fields. Runs of white space, tabs and empty fields are invalid,
//! so the parser accepts normalized lines only.

use tracing::{debug, trace};

use crate::parser::token::{Budget, CR, LF, SP, Scan, VersionScanner, is_token, is_visible};
use crate::parser::{Parser, Step, scan};
use crate::protocol::{ConfigError, HttpVersion, ParserState, Progress, RequestLine};
use crate::utils::latin1_string;

/// Length of the shortest request line, `GET / HTTP/1.1` without its CRLF.
pub const MIN_REQUEST_LINE_SIZE: usize = 14;

pub const DEFAULT_MAX_REQUEST_LINE_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Method,
    Uri,
    Version,
    LineFeed,
    Finished(ParserState),
}

/// Parses one CRLF terminated request line into a [`RequestLine`].
///
/// The parser is single use: once it reports `Done` the line is available through
/// [`RequestLineParser::request_line`] and the parser can be dropped.
#[derive(Debug)]
pub struct RequestLineParser {
    state: State,
    budget: Budget,
    method: Vec<u8>,
    uri: Vec<u8>,
    version: VersionScanner,
    parsed_version: Option<HttpVersion>,
    line: Option<RequestLine>,
}

impl RequestLineParser {
    /// Creates a parser that consumes at most `max_size` bytes, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if `max_size` is below [`MIN_REQUEST_LINE_SIZE`].
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_budget(Budget::new(max_size, MIN_REQUEST_LINE_SIZE)?))
    }

    fn with_budget(budget: Budget) -> Self {
        Self {
            state: State::Method,
            budget,
            method: Vec::new(),
            uri: Vec::new(),
            version: VersionScanner::new(),
            parsed_version: None,
            line: None,
        }
    }

    /// The parsed line, available once the parser reported `Done`.
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.line.as_ref()
    }

    pub fn into_request_line(self) -> Option<RequestLine> {
        self.line
    }

    fn step(&mut self, b: u8) -> Step {
        match self.state {
            State::Method => {
                if is_token(b) {
                    self.method.push(b);
                } else if b == SP && !self.method.is_empty() {
                    self.state = State::Uri;
                } else {
                    return Step::Reject;
                }
            }
            State::Uri => {
                if is_visible(b) {
                    self.uri.push(b);
                } else if b == SP && !self.uri.is_empty() {
                    self.state = State::Version;
                } else {
                    return Step::Reject;
                }
            }
            State::Version => match self.version.push(b, CR) {
                Scan::Pending => {}
                Scan::Complete(version) => {
                    self.parsed_version = Some(version);
                    self.state = State::LineFeed;
                }
                Scan::Rejected => return Step::Reject,
            },
            State::LineFeed => {
                if b != LF {
                    return Step::Reject;
                }
                let Some(version) = self.parsed_version else {
                    return Step::Reject;
                };
                self.line = Some(RequestLine {
                    method: latin1_string(&self.method),
                    uri: latin1_string(&self.uri),
                    version,
                });
                return Step::Done;
            }
            State::Finished(_) => return Step::Reject,
        }
        Step::Continue
    }
}

impl Default for RequestLineParser {
    fn default() -> Self {
        Self::with_budget(Budget::preset(DEFAULT_MAX_REQUEST_LINE_SIZE))
    }
}

impl Parser for RequestLineParser {
    fn parse(&mut self, buf: &[u8], _is_final: bool) -> Progress {
        if let State::Finished(state) = self.state {
            return Progress::new(state, 0);
        }

        let window = self.budget.window(buf);
        let mut progress = scan(window, |b| self.step(b));
        self.budget.spend(progress.consumed);

        match progress.state {
            ParserState::Done => {
                trace!(consumed = self.budget.consumed(), line = ?self.line, "parsed request line");
            }
            ParserState::Invalid => {
                debug!(consumed = self.budget.consumed(), "invalid request line");
            }
            _ if self.budget.is_exhausted() => {
                debug!(max_size = self.budget.max(), "request line exceeds the size limit");
                progress.state = ParserState::DataTooBig;
            }
            _ => return progress,
        }

        self.state = State::Finished(progress.state);
        progress
    }
}
