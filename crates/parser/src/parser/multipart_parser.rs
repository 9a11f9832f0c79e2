//! Incremental scanner splitting a MIME multipart body into body parts.
//!
//! The scanner only knows the boundary grammar of [RFC 2046 section 5.1.1]:
//!
//! ```text
//! delimiter       = [CRLF] "--" boundary *LWS CRLF
//! close-delimiter = CRLF "--" boundary "--" *LWS [CRLF]
//! ```
//!
//! Everything between two delimiters is the raw content of one body part, headers included.
//! The bytes before the first delimiter (the preamble) are reported as a body part of their
//! own, usually empty; the first delimiter may start the stream without its CRLF.
//!
//! A delimiter can be split across any number of `parse` calls. While the scanner cannot tell
//! whether a run of bytes is a delimiter, it withholds them in a residual buffer. If the run
//! turns out to be content after all (a near match such as `--boundaryX`), the withheld bytes
//! are handed back in front of the new content, which is why a [`BodyPart`] is made of up to
//! two slices.
//!
//! [RFC 2046 section 5.1.1]: https://www.rfc-editor.org/rfc/rfc2046#section-5.1.1

use std::ops::Range;

use tracing::{debug, trace};

use crate::ensure;
use crate::parser::Parser;
use crate::parser::token::{Budget, CR, LF, is_lws};
use crate::protocol::{ConfigError, ParserState, Progress};

/// Size of the shortest multipart body this scanner accepts.
pub const MIN_MULTIPART_SIZE: usize = 10;

pub const DEFAULT_MAX_MULTIPART_SIZE: usize = 64 * 1024 * 1024;

const MAX_BOUNDARY_LEN: usize = 70;

/// Longest run of LWS accepted after a boundary. Padding is withheld until the delimiter line
/// ends, so this bounds the residual buffer together with the boundary length.
const MAX_PADDING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Matching `CRLF "--" boundary`, this many bytes matched so far
    Delimiter(usize),
    /// The whole delimiter matched; `--`, LWS or CR may follow
    AfterBoundary,
    /// First dash of a close delimiter
    CloseDash,
    /// LWS after the boundary or after the closing dashes, this many bytes so far
    Padding(usize),
    /// CR of the delimiter line, expecting LF
    LineFeed,
    Finished(ParserState),
}

const IDLE: Stage = Stage::Delimiter(0);

/// Where the delimiter currently being matched started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStart {
    None,
    /// In an earlier call; the bytes are in the residual buffer
    Residual,
    /// At this offset of the current input
    Input(usize),
}

enum Advance {
    Continue,
    Mismatch,
    Complete,
}

/// Splits a multipart body into body parts, across arbitrarily fragmented input.
///
/// Each call to [`Parser::parse`] reports [`ParserState::NeedMoreData`] or
/// [`ParserState::BodyPartCompleted`], together with the body-part content confirmed by that
/// call, which [`MimeMultipartParser::body_part`] resolves. After `BodyPartCompleted` the caller
/// feeds the unconsumed rest of its buffer to get the next part. Once the final part (the one
/// closed by `--boundary--`) has been reported the scanner is `Done`; an epilogue after the
/// close delimiter is never consumed.
///
/// With `is_final` set and the whole buffer consumed, a close delimiter that lacks its trailing
/// CRLF still completes the final part; a stream ending anywhere else is `Invalid`.
///
/// # Example
///
/// ```
/// use micro_parser::parser::{MimeMultipartParser, Parser};
/// use micro_parser::protocol::ParserState;
///
/// let input = b"--sep\r\nfirst\r\n--sep\r\nsecond\r\n--sep--\r\n";
/// let mut parser = MimeMultipartParser::new("sep", 1024).unwrap();
///
/// let mut parts = vec![Vec::<u8>::new()];
/// let mut offset = 0;
/// loop {
///     let progress = parser.parse(&input[offset..], true);
///     let part = parser.body_part(&input[offset..]);
///     parts.last_mut().unwrap().extend(part.iter().flatten());
///     offset += progress.consumed;
///     if part.is_final() {
///         break;
///     }
///     assert_eq!(progress.state, ParserState::BodyPartCompleted);
///     parts.push(Vec::new());
/// }
///
/// assert_eq!(parts, vec![b"".to_vec(), b"first".to_vec(), b"second".to_vec()]);
/// ```
#[derive(Debug)]
pub struct MimeMultipartParser {
    /// `CRLF "--" boundary`
    delimiter: Box<[u8]>,
    stage: Stage,
    /// The closing `--` of the delimiter being matched has been seen
    closing: bool,
    budget: Budget,
    /// Bytes of a pending delimiter match carried over from earlier calls
    residual: Vec<u8>,
    /// Residual bytes the last call reclassified as content
    released: Vec<u8>,
    /// Content of the last call within its input buffer
    body: Range<usize>,
    final_part: bool,
    parts: usize,
}

impl MimeMultipartParser {
    /// Creates a scanner for `boundary` that consumes at most `max_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoundary`] unless `boundary` is 1 to 70 RFC 2046 `bchars`
    /// not ending with a space, and [`ConfigError::MaxSizeTooSmall`] if `max_size` is below
    /// [`MIN_MULTIPART_SIZE`].
    pub fn new(boundary: &str, max_size: usize) -> Result<Self, ConfigError> {
        validate_boundary(boundary)?;
        let budget = Budget::new(max_size, MIN_MULTIPART_SIZE)?;

        let mut delimiter = Vec::with_capacity(boundary.len() + 4);
        delimiter.extend_from_slice(b"\r\n--");
        delimiter.extend_from_slice(boundary.as_bytes());

        Ok(Self {
            delimiter: delimiter.into_boxed_slice(),
            // the first delimiter may omit its CRLF, so start as if it had been seen
            stage: Stage::Delimiter(2),
            closing: false,
            budget,
            residual: Vec::new(),
            released: Vec::new(),
            body: 0..0,
            final_part: false,
            parts: 0,
        })
    }

    /// A scanner with [`DEFAULT_MAX_MULTIPART_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoundary`] for a malformed boundary.
    pub fn with_boundary(boundary: &str) -> Result<Self, ConfigError> {
        Self::new(boundary, DEFAULT_MAX_MULTIPART_SIZE)
    }

    /// The body-part content confirmed by the last `parse` call.
    ///
    /// `buf` must be the buffer that was passed to that call. The returned slices are valid
    /// until the next call to `parse`.
    pub fn body_part<'a>(&'a self, buf: &'a [u8]) -> BodyPart<'a> {
        BodyPart { residual: &self.released, body: buf.get(self.body.clone()).unwrap_or_default(), is_final: self.final_part }
    }

    /// Parses `buf` and resolves the confirmed content in one go.
    pub fn feed<'a>(&'a mut self, buf: &'a [u8], is_final: bool) -> (Progress, BodyPart<'a>) {
        let progress = self.parse(buf, is_final);
        (progress, self.body_part(buf))
    }

    /// Range of the last call's content within its input buffer.
    pub(crate) fn body_range(&self) -> Range<usize> {
        self.body.clone()
    }

    /// Residual bytes the last call reclassified as content; they precede `body_range`.
    pub(crate) fn released(&self) -> &[u8] {
        &self.released
    }

    /// True if the last call completed the final body part.
    pub(crate) fn is_final_part(&self) -> bool {
        self.final_part
    }

    pub(crate) fn max_size(&self) -> usize {
        self.budget.max()
    }

    fn advance(&mut self, b: u8) -> Advance {
        self.stage = match self.stage {
            Stage::Delimiter(matched) => {
                if b != self.delimiter[matched] {
                    return Advance::Mismatch;
                }
                if matched + 1 == self.delimiter.len() { Stage::AfterBoundary } else { Stage::Delimiter(matched + 1) }
            }
            Stage::AfterBoundary => match b {
                b'-' => Stage::CloseDash,
                CR => Stage::LineFeed,
                b if is_lws(b) => Stage::Padding(1),
                _ => return Advance::Mismatch,
            },
            Stage::CloseDash => {
                if b != b'-' {
                    return Advance::Mismatch;
                }
                self.closing = true;
                Stage::Padding(0)
            }
            Stage::Padding(len) => match b {
                CR => Stage::LineFeed,
                b if is_lws(b) && len < MAX_PADDING => Stage::Padding(len + 1),
                _ => return Advance::Mismatch,
            },
            Stage::LineFeed => {
                return if b == LF { Advance::Complete } else { Advance::Mismatch };
            }
            Stage::Finished(_) => return Advance::Mismatch,
        };
        Advance::Continue
    }

    /// The withheld bytes were content after all: hand them out in front of the new content.
    fn release_residual(&mut self) {
        std::mem::swap(&mut self.released, &mut self.residual);
        self.residual.clear();
    }

    fn complete_part(&mut self, content_end: usize) -> ParserState {
        self.body = 0..content_end;
        self.residual.clear();
        self.final_part = self.closing;
        self.closing = false;
        self.parts += 1;
        trace!(
            part = self.parts,
            len = self.released.len() + content_end,
            is_final = self.final_part,
            "multipart body part completed"
        );

        self.stage = if self.final_part { Stage::Finished(ParserState::Done) } else { IDLE };
        ParserState::BodyPartCompleted
    }

    fn fail(&mut self, state: ParserState) -> ParserState {
        self.released.clear();
        self.residual.clear();
        self.body = 0..0;
        self.stage = Stage::Finished(state);
        state
    }
}

impl Parser for MimeMultipartParser {
    fn parse(&mut self, buf: &[u8], is_final: bool) -> Progress {
        self.released.clear();
        self.body = 0..0;
        self.final_part = false;

        if let Stage::Finished(state) = self.stage {
            return Progress::new(state, 0);
        }

        let overrun = self.budget.is_overrun(buf);
        let window = self.budget.window(buf);
        let mut match_start = if self.stage == IDLE { MatchStart::None } else { MatchStart::Residual };
        let mut offset = 0;

        while offset < window.len() {
            if self.stage == IDLE {
                // only a CR can start a delimiter
                match window[offset..].iter().position(|&b| b == CR) {
                    Some(skip) => offset += skip,
                    None => break,
                }
            }

            let b = window[offset];
            let idle = self.stage == IDLE;
            match self.advance(b) {
                Advance::Continue => {
                    if idle {
                        match_start = MatchStart::Input(offset);
                    }
                }
                Advance::Complete => {
                    let consumed = offset + 1;
                    self.budget.spend(consumed);
                    let content_end = match match_start {
                        MatchStart::Input(start) => start,
                        MatchStart::Residual | MatchStart::None => 0,
                    };
                    return Progress::new(self.complete_part(content_end), consumed);
                }
                Advance::Mismatch => {
                    if match_start == MatchStart::Residual {
                        self.release_residual();
                    }
                    self.closing = false;
                    self.stage = IDLE;
                    match_start = MatchStart::None;

                    // the mismatching byte may itself start a delimiter
                    if b == self.delimiter[0] {
                        self.stage = Stage::Delimiter(1);
                        match_start = MatchStart::Input(offset);
                    }
                }
            }
            offset += 1;
        }

        let consumed = window.len();
        self.budget.spend(consumed);
        self.body = match match_start {
            MatchStart::None => 0..consumed,
            MatchStart::Input(start) => {
                self.residual.extend_from_slice(&window[start..]);
                0..start
            }
            MatchStart::Residual => {
                self.residual.extend_from_slice(window);
                0..0
            }
        };

        let state = if is_final && consumed == buf.len() {
            if self.closing {
                trace!("close delimiter ends the stream without CRLF");
                self.complete_part(self.body.end)
            } else {
                debug!(parts = self.parts, stage = ?self.stage, "multipart body ends before its close delimiter");
                self.fail(ParserState::Invalid)
            }
        } else if overrun {
            debug!(max_size = self.budget.max(), "multipart body exceeds the size limit");
            self.fail(ParserState::DataTooBig)
        } else {
            ParserState::NeedMoreData
        };

        Progress::new(state, consumed)
    }
}

/// Body-part content confirmed by one `parse` call: withheld bytes released by this call,
/// then content from the call's input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyPart<'a> {
    residual: &'a [u8],
    body: &'a [u8],
    is_final: bool,
}

impl<'a> BodyPart<'a> {
    /// Content withheld by earlier calls; it precedes [`BodyPart::body`].
    pub fn residual(&self) -> &'a [u8] {
        self.residual
    }

    /// Content from the input buffer of the call.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// True if the call completed the last body part.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn len(&self) -> usize {
        self.residual.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The non-empty slices in stream order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        [self.residual, self.body].into_iter().filter(|s| !s.is_empty())
    }
}

fn is_bchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?' | b' ')
}

fn validate_boundary(boundary: &str) -> Result<(), ConfigError> {
    let bytes = boundary.as_bytes();
    ensure!(!bytes.is_empty(), ConfigError::invalid_boundary("boundary is empty"));
    ensure!(
        bytes.len() <= MAX_BOUNDARY_LEN,
        ConfigError::invalid_boundary(format!("boundary is longer than {MAX_BOUNDARY_LEN} bytes"))
    );
    ensure!(bytes.iter().all(|&b| is_bchar(b)), ConfigError::invalid_boundary(format!("{boundary:?} contains invalid characters")));
    ensure!(!bytes.ends_with(b" "), ConfigError::invalid_boundary("boundary ends with white space"));
    Ok(())
}
