//! Incremental parser for an RFC 5322 style header block.
//!
//! ```text
//! header-block = *( field-name ":" [ LWS ] field-value CRLF *( LWS field-value CRLF ) ) CRLF
//! ```
//!
//! A line starting with LWS continues the value of the previous field. Its bytes, the leading
//! white space included, are appended to that value as they are; no separator is synthesized.
//! A field is handed to the [`HeaderSink`] once the parser knows it cannot be folded any
//! further, i.e. when the next field starts or the block ends.

use tracing::{debug, trace};

use crate::parser::token::{Budget, CR, LF, is_field_value, is_lws, is_token};
use crate::parser::{Parser, Step, scan};
use crate::protocol::{ConfigError, HeaderSink, ParserState, Progress};

/// Size of the shortest header block, the empty line.
pub const MIN_HEADER_SIZE: usize = 2;

pub const DEFAULT_MAX_HEADER_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the first byte of a line: a new field, a folded continuation or the empty line
    LineStart,
    Name,
    /// After the colon, skipping LWS before the value
    ValueStart,
    Value,
    /// CR at the end of a field line
    ValueLf,
    /// CR of the empty line
    EndLf,
    Finished(ParserState),
}

/// The field being built; folded lines keep extending `value` until the field is committed.
#[derive(Debug, Default)]
struct CurrentField {
    name: Vec<u8>,
    value: Vec<u8>,
}

impl CurrentField {
    fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    fn commit<S: HeaderSink>(&mut self, sink: &mut S) -> bool {
        let end = self.value.iter().rposition(|&b| !is_lws(b)).map_or(0, |i| i + 1);
        let accepted = sink.append_field(&self.name, &self.value[..end]);
        trace!(name = %String::from_utf8_lossy(&self.name), accepted, "header field parsed");
        self.name.clear();
        self.value.clear();
        accepted
    }
}

/// Parses a header block into a [`HeaderSink`], by default an [`http::HeaderMap`].
///
/// The size limit covers the whole block, the terminating empty line included.
#[derive(Debug)]
pub struct HeaderParser<S = http::HeaderMap> {
    state: State,
    budget: Budget,
    current: CurrentField,
    sink: S,
}

impl<S: HeaderSink> HeaderParser<S> {
    /// Creates a parser appending to `sink` and consuming at most `max_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if `max_size` is below [`MIN_HEADER_SIZE`].
    pub fn new(sink: S, max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self { state: State::LineStart, budget: Budget::new(max_size, MIN_HEADER_SIZE)?, current: CurrentField::default(), sink })
    }

    /// A parser with [`DEFAULT_MAX_HEADER_SIZE`].
    pub fn with_sink(sink: S) -> Self {
        Self { state: State::LineStart, budget: Budget::preset(DEFAULT_MAX_HEADER_SIZE), current: CurrentField::default(), sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn step(&mut self, b: u8) -> Step {
        match self.state {
            State::LineStart => {
                if is_lws(b) {
                    // folding needs a field to continue
                    if self.current.is_empty() {
                        return Step::Reject;
                    }
                    self.current.value.push(b);
                    self.state = State::Value;
                    return Step::Continue;
                }

                if !self.current.is_empty() && !self.current.commit(&mut self.sink) {
                    return Step::Reject;
                }

                if b == CR {
                    self.state = State::EndLf;
                } else if is_token(b) {
                    self.current.name.push(b);
                    self.state = State::Name;
                } else {
                    return Step::Reject;
                }
            }
            State::Name => {
                if is_token(b) {
                    self.current.name.push(b);
                } else if b == b':' {
                    self.state = State::ValueStart;
                } else {
                    return Step::Reject;
                }
            }
            State::ValueStart if is_lws(b) => {}
            State::ValueStart | State::Value => {
                if b == CR {
                    self.state = State::ValueLf;
                } else if is_field_value(b) {
                    self.current.value.push(b);
                    self.state = State::Value;
                } else {
                    return Step::Reject;
                }
            }
            State::ValueLf => {
                if b != LF {
                    return Step::Reject;
                }
                self.state = State::LineStart;
            }
            State::EndLf => {
                return if b == LF { Step::Done } else { Step::Reject };
            }
            State::Finished(_) => return Step::Reject,
        }
        Step::Continue
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::with_sink(http::HeaderMap::new())
    }
}

impl<S: HeaderSink> Parser for HeaderParser<S> {
    fn parse(&mut self, buf: &[u8], _is_final: bool) -> Progress {
        if let State::Finished(state) = self.state {
            return Progress::new(state, 0);
        }

        let window = self.budget.window(buf);
        let mut progress = scan(window, |b| self.step(b));
        self.budget.spend(progress.consumed);

        match progress.state {
            ParserState::Done => {
                trace!(consumed = self.budget.consumed(), "parsed header block");
            }
            ParserState::Invalid => {
                debug!(consumed = self.budget.consumed(), "invalid header block");
            }
            _ if self.budget.is_exhausted() => {
                debug!(max_size = self.budget.max(), "header block exceeds the size limit");
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
    use http::HeaderMap;
    use indoc::indoc;

    use super::*;

    fn crlf(s: &str) -> Vec<u8> {
        s.replace('\n', "\r\n").into_bytes()
    }

    fn parse_in_chunks<S: HeaderSink>(sink: S, input: &[u8], chunk_size: usize) -> (HeaderParser<S>, Progress) {
        let mut parser = HeaderParser::new(sink, DEFAULT_MAX_HEADER_SIZE).unwrap();
        let mut offset = 0;
        loop {
            let end = (offset + chunk_size).min(input.len());
            let progress = parser.parse(&input[offset..end], false);
            offset += progress.consumed;
            if progress.state != ParserState::NeedMoreData || end == input.len() {
                return (parser, Progress::new(progress.state, offset));
            }
        }
    }

    #[test]
    fn from_curl() {
        let input = crlf(indoc! {r##"
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##});

        for chunk_size in [1, 2, 7, input.len()] {
            let (parser, progress) = parse_in_chunks(HeaderMap::new(), &input, chunk_size);
            assert_eq!(progress, Progress::new(ParserState::Done, input.len() - 3));

            let headers = parser.into_sink();
            assert_eq!(headers.len(), 3);
            assert_eq!(headers[http::header::HOST], "127.0.0.1:8080");
            assert_eq!(headers[http::header::USER_AGENT], "curl/7.79.1");
            assert_eq!(headers[http::header::ACCEPT], "*/*");
        }
    }

    #[test]
    fn empty_block() {
        let mut parser = HeaderParser::default();
        assert_eq!(parser.parse(b"\r\nbody", false), Progress::new(ParserState::Done, 2));
        assert!(parser.sink().is_empty());
    }

    #[test]
    fn folding_preserves_bytes() {
        let input = b"N:V1,\r\n V2,\r\n\tV3,\r\n\r\n";
        for chunk_size in 1..=input.len() {
            let (parser, progress) = parse_in_chunks(Vec::new(), input, chunk_size);
            assert_eq!(progress.state, ParserState::Done);
            assert_eq!(parser.into_sink(), vec![("N".to_string(), "V1, V2,\tV3,".to_string())]);
        }
    }

    #[test]
    fn folding_into_header_map() {
        let input = crlf("Subject: This\n is a test\nX: y\n\n");
        let (parser, progress) = parse_in_chunks(HeaderMap::new(), &input, 3);
        assert_eq!(progress.state, ParserState::Done);
        assert_eq!(parser.sink()["subject"], "This is a test");
        assert_eq!(parser.sink()["x"], "y");
    }

    #[test]
    fn repeated_names_append() {
        let input = crlf("Set-Cookie: a=1\nHost: h\nset-cookie: b=2\n\n");
        let (parser, _) = parse_in_chunks(Vec::new(), &input, 4);
        assert_eq!(
            parser.into_sink(),
            vec![
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Host".to_string(), "h".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ]
        );

        let (parser, _) = parse_in_chunks(HeaderMap::new(), &input, 4);
        let cookies: Vec<_> = parser.sink().get_all(http::header::SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn value_whitespace() {
        let input = b"A:   spaced out  \t\r\nB:\r\nC:\t\r\n\r\n";
        let (parser, progress) = parse_in_chunks(Vec::new(), input, 1);
        assert_eq!(progress.state, ParserState::Done);
        assert_eq!(
            parser.into_sink(),
            vec![
                ("A".to_string(), "spaced out".to_string()),
                ("B".to_string(), String::new()),
                ("C".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_blocks() {
        let invalid: &[&[u8]] = &[
            b" N: V\r\n\r\n",
            b"\tN: V\r\n\r\n",
            b"N : V\r\n\r\n",
            b"N\r\n\r\n",
            b": V\r\n\r\n",
            b"N: V\r\r\n\r\n",
            b"N: V\n\r\n",
            b"N: V\x00\r\n\r\n",
            b"N(: V\r\n\r\n",
            b"N: V\r\n\rX",
        ];

        for input in invalid {
            for chunk_size in [1, 3, input.len()] {
                let (_, progress) = parse_in_chunks(HeaderMap::new(), input, chunk_size);
                assert_eq!(progress.state, ParserState::Invalid, "{:?}", String::from_utf8_lossy(input));
            }
        }
    }

    #[test]
    fn rejecting_sink_invalidates() {
        struct Strict;
        impl HeaderSink for Strict {
            fn append_field(&mut self, name: &[u8], _value: &[u8]) -> bool {
                name != b"Forbidden"
            }
        }

        let mut parser = HeaderParser::new(Strict, 64).unwrap();
        let progress = parser.parse(b"Ok: 1\r\nForbidden: 2\r\n\r\n", false);
        assert_eq!(progress, Progress::new(ParserState::Invalid, 21));
    }

    #[test]
    fn data_too_big() {
        let input = b"Name: a rather long value\r\n\r\n";
        for chunk_size in [1, 4, input.len()] {
            let mut parser = HeaderParser::new(HeaderMap::new(), 16).unwrap();
            let mut total = 0;
            let mut state = ParserState::NeedMoreData;
            for chunk in input.chunks(chunk_size) {
                let progress = parser.parse(chunk, false);
                total += progress.consumed;
                state = progress.state;
                if state != ParserState::NeedMoreData {
                    break;
                }
            }
            assert_eq!(state, ParserState::DataTooBig);
            assert_eq!(total, 16);
        }
    }

    #[test]
    fn done_at_exact_maximum() {
        let input = b"A: b\r\n\r\n";
        let mut parser = HeaderParser::new(Vec::new(), input.len()).unwrap();
        assert_eq!(parser.parse(input, false), Progress::new(ParserState::Done, input.len()));
    }

    #[test]
    fn rejects_small_maximum() {
        assert!(HeaderParser::new(HeaderMap::new(), 1).is_err());
        assert!(HeaderParser::new(HeaderMap::new(), MIN_HEADER_SIZE).is_ok());
    }
}
