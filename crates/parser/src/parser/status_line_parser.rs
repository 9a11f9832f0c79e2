//! Incremental parser for the status line of an HTTP response.
//!
//! ```text
//! status-line = HTTP-version SP status-code SP reason-phrase CRLF
//! ```

use tracing::{debug, trace};

use crate::parser::token::{Budget, CR, LF, SP, Scan, VersionScanner, is_ctl};
use crate::parser::{Parser, Step, scan};
use crate::protocol::{ConfigError, HttpVersion, ParserState, Progress, StatusLine};
use crate::utils::latin1_string;

/// Length of the shortest status line, `HTTP/1.1 200 \r\n`.
pub const MIN_STATUS_LINE_SIZE: usize = 15;

pub const DEFAULT_MAX_STATUS_LINE_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Version,
    /// Read this many digits of the status code
    Status(u8),
    Reason,
    LineFeed,
    Finished(ParserState),
}

/// Parses one CRLF terminated status line into a [`StatusLine`].
///
/// The status code is exactly three digits in `100..=999`. The reason phrase may be empty but
/// must not contain control characters.
#[derive(Debug)]
pub struct StatusLineParser {
    state: State,
    budget: Budget,
    version: VersionScanner,
    parsed_version: Option<HttpVersion>,
    status: u16,
    reason: Vec<u8>,
    line: Option<StatusLine>,
}

impl StatusLineParser {
    /// Creates a parser that consumes at most `max_size` bytes, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if `max_size` is below [`MIN_STATUS_LINE_SIZE`].
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_budget(Budget::new(max_size, MIN_STATUS_LINE_SIZE)?))
    }

    fn with_budget(budget: Budget) -> Self {
        Self {
            state: State::Version,
            budget,
            version: VersionScanner::new(),
            parsed_version: None,
            status: 0,
            reason: Vec::new(),
            line: None,
        }
    }

    /// The parsed line, available once the parser reported `Done`.
    pub fn status_line(&self) -> Option<&StatusLine> {
        self.line.as_ref()
    }

    pub fn into_status_line(self) -> Option<StatusLine> {
        self.line
    }

    fn step(&mut self, b: u8) -> Step {
        match self.state {
            State::Version => match self.version.push(b, SP) {
                Scan::Pending => {}
                Scan::Complete(version) => {
                    self.parsed_version = Some(version);
                    self.state = State::Status(0);
                }
                Scan::Rejected => return Step::Reject,
            },
            State::Status(digits) if digits < 3 => {
                if !b.is_ascii_digit() {
                    return Step::Reject;
                }
                self.status = self.status * 10 + u16::from(b - b'0');
                self.state = State::Status(digits + 1);
            }
            State::Status(_) => {
                if b != SP || !(100..=999).contains(&self.status) {
                    return Step::Reject;
                }
                self.state = State::Reason;
            }
            State::Reason => {
                if b == CR {
                    self.state = State::LineFeed;
                } else if is_ctl(b) {
                    return Step::Reject;
                } else {
                    self.reason.push(b);
                }
            }
            State::LineFeed => {
                if b != LF {
                    return Step::Reject;
                }
                let Some(version) = self.parsed_version else {
                    return Step::Reject;
                };
                self.line = Some(StatusLine { version, status: self.status, reason: latin1_string(&self.reason) });
                return Step::Done;
            }
            State::Finished(_) => return Step::Reject,
        }
        Step::Continue
    }
}

impl Default for StatusLineParser {
    fn default() -> Self {
        Self::with_budget(Budget::preset(DEFAULT_MAX_STATUS_LINE_SIZE))
    }
}

impl Parser for StatusLineParser {
    fn parse(&mut self, buf: &[u8], _is_final: bool) -> Progress {
        if let State::Finished(state) = self.state {
            return Progress::new(state, 0);
        }

        let window = self.budget.window(buf);
        let mut progress = scan(window, |b| self.step(b));
        self.budget.spend(progress.consumed);

        match progress.state {
            ParserState::Done => {
                trace!(consumed = self.budget.consumed(), line = ?self.line, "parsed status line");
            }
            ParserState::Invalid => {
                debug!(consumed = self.budget.consumed(), "invalid status line");
            }
            _ if self.budget.is_exhausted() => {
                debug!(max_size = self.budget.max(), "status line exceeds the size limit");
                progress.state = ParserState::DataTooBig;
            }
            _ => return progress,
        }

        self.state = State::Finished(progress.state);
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bytewise(input: &[u8]) -> (StatusLineParser, ParserState) {
        let mut parser = StatusLineParser::default();
        let mut state = ParserState::NeedMoreData;
        for b in input.chunks(1) {
            state = parser.parse(b, false).state;
            if state != ParserState::NeedMoreData {
                break;
            }
        }
        (parser, state)
    }

    #[test]
    fn test_basic() {
        let mut parser = StatusLineParser::default();
        let progress = parser.parse(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n", false);
        assert_eq!(progress, Progress::new(ParserState::Done, 17));

        let line = parser.into_status_line().unwrap();
        assert_eq!(line.version, HttpVersion::new(1, 1));
        assert_eq!(line.status, 200);
        assert_eq!(line.reason, "OK");
    }

    #[test]
    fn bytewise_matches_single_shot() {
        let input = b"HTTP/1.0 404 Not Found Here\r\n";
        let (parser, state) = parse_bytewise(input);
        assert_eq!(state, ParserState::Done);

        let mut single = StatusLineParser::default();
        assert_eq!(single.parse(input, false).state, ParserState::Done);
        assert_eq!(parser.status_line(), single.status_line());
        assert_eq!(parser.status_line().unwrap().reason, "Not Found Here");
    }

    #[test]
    fn empty_reason_and_boundaries() {
        let (parser, state) = parse_bytewise(b"HTTP/1.1 100 \r\n");
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.status_line().unwrap().reason, "");

        let (parser, state) = parse_bytewise(b"HTTP/1.1 999 Custom\r\n");
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.status_line().unwrap().status, 999);
    }

    #[test]
    fn obs_text_reason() {
        let (parser, state) = parse_bytewise(b"HTTP/1.1 200 D\xe9j\xe0 vu\r\n");
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.status_line().unwrap().reason, "D\u{e9}j\u{e0} vu");
    }

    #[test]
    fn rejects_malformed_lines() {
        let invalid: &[&[u8]] = &[
            b"http/1.1 200 OK\r\n",
            b"HTTP/1.1  200 OK\r\n",
            b"HTTP/1.1 099 Too Low\r\n",
            b"HTTP/1.1 2000 OK\r\n",
            b"HTTP/1.1 20 OK\r\n",
            b"HTTP/1.1 2x0 OK\r\n",
            b"HTTP/1.1 200\r\n",
            b"HTTP/1.1 200 O\x01K\r\n",
            b"HTTP/1.1 200 O\tK\r\n",
            b"HTTP/1.1 200 OK\r\r\n",
            b"HTTP/1.1\t200 OK\r\n",
        ];

        for input in invalid {
            let (_, state) = parse_bytewise(input);
            assert_eq!(state, ParserState::Invalid, "{:?}", String::from_utf8_lossy(input));

            let mut parser = StatusLineParser::default();
            assert_eq!(parser.parse(input, false).state, ParserState::Invalid);
        }
    }

    #[test]
    fn data_too_big() {
        let mut parser = StatusLineParser::new(MIN_STATUS_LINE_SIZE).unwrap();
        let progress = parser.parse(b"HTTP/1.1 200 Fine\r\n", false);
        assert_eq!(progress, Progress::new(ParserState::DataTooBig, MIN_STATUS_LINE_SIZE));
        assert_eq!(parser.parse(b"\r\n", false), Progress::new(ParserState::DataTooBig, 0));
    }

    #[test]
    fn rejects_small_maximum() {
        assert!(matches!(StatusLineParser::new(14), Err(ConfigError::MaxSizeTooSmall { max_size: 14, min_size: 15 })));
    }
}
