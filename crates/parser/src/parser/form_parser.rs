//! Incremental parser for `application/x-www-form-urlencoded` bodies.
//!
//! ```text
//! form  = [ token *( "&" token ) ]
//! token = value / name "=" value
//! ```
//!
//! Names and values are handed over as they appear on the wire; percent decoding and `+`
//! handling are up to the sink.

use tracing::{debug, trace};

use crate::parser::token::{Budget, is_visible};
use crate::parser::{Parser, Step, scan};
use crate::protocol::{ConfigError, FormField, FormSink, ParserState, Progress};

pub const MIN_FORM_SIZE: usize = 1;

pub const DEFAULT_MAX_FORM_SIZE: usize = 1024 * 1024;

/// Parses a form body into a [`FormSink`], by default a `Vec<FormField>`.
///
/// The body has no terminator, so the parser only reports `Done` once it is handed the last
/// chunk with `is_final` set. An empty body is valid and yields no pairs; so do empty tokens
/// between two `&`.
#[derive(Debug)]
pub struct FormUrlEncodedParser<S = Vec<FormField>> {
    finished: Option<ParserState>,
    budget: Budget,
    token: Vec<u8>,
    /// Position of the `=` in `token`
    split: Option<usize>,
    pairs: usize,
    sink: S,
}

impl<S: FormSink> FormUrlEncodedParser<S> {
    /// Creates a parser appending to `sink` and consuming at most `max_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if `max_size` is below [`MIN_FORM_SIZE`].
    pub fn new(sink: S, max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self::with_budget(sink, Budget::new(max_size, MIN_FORM_SIZE)?))
    }

    /// A parser with [`DEFAULT_MAX_FORM_SIZE`].
    pub fn with_sink(sink: S) -> Self {
        Self::with_budget(sink, Budget::preset(DEFAULT_MAX_FORM_SIZE))
    }

    fn with_budget(sink: S, budget: Budget) -> Self {
        Self { finished: None, budget, token: Vec::new(), split: None, pairs: 0, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn step(&mut self, b: u8) -> Step {
        match b {
            b'&' => self.commit(),
            b'=' if self.split.is_some() => return Step::Reject,
            b'=' => {
                self.split = Some(self.token.len());
                self.token.push(b);
            }
            b if is_visible(b) => self.token.push(b),
            _ => return Step::Reject,
        }
        Step::Continue
    }

    fn commit(&mut self) {
        match self.split.take() {
            Some(at) => self.sink.append_pair(Some(&self.token[..at]), &self.token[at + 1..]),
            None if self.token.is_empty() => return,
            None => self.sink.append_pair(None, &self.token),
        }
        self.token.clear();
        self.pairs += 1;
    }
}

impl Default for FormUrlEncodedParser {
    fn default() -> Self {
        Self::with_sink(Vec::new())
    }
}

impl<S: FormSink> Parser for FormUrlEncodedParser<S> {
    fn parse(&mut self, buf: &[u8], is_final: bool) -> Progress {
        if let Some(state) = self.finished {
            return Progress::new(state, 0);
        }

        let overrun = self.budget.is_overrun(buf);
        let window = self.budget.window(buf);
        let mut progress = scan(window, |b| self.step(b));
        self.budget.spend(progress.consumed);

        match progress.state {
            ParserState::Invalid => {
                debug!(consumed = self.budget.consumed(), "invalid form body");
            }
            _ if is_final && progress.consumed == buf.len() => {
                self.commit();
                trace!(pairs = self.pairs, consumed = self.budget.consumed(), "parsed form body");
                progress.state = ParserState::Done;
            }
            _ if overrun => {
                debug!(max_size = self.budget.max(), "form body exceeds the size limit");
                progress.state = ParserState::DataTooBig;
            }
            _ => return progress,
        }

        self.finished = Some(progress.state);
        progress
    }
}
