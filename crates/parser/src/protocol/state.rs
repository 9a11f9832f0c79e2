//! Parse state vocabulary shared by every parser in the crate.
//!
//! Each call to [`Parser::parse`](crate::parser::Parser::parse) reports a [`Progress`]: the state the
//! parser is in after looking at the supplied bytes, and how many of those bytes it consumed.

/// The state of an incremental parser after a call to `parse`.
///
/// `NeedMoreData` and `BodyPartCompleted` are flow-control signals; `Done`, `Invalid` and
/// `DataTooBig` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// More bytes are needed before the parser can decide anything.
    NeedMoreData,
    /// A multipart body part is complete; feed the remaining bytes to get the next one.
    BodyPartCompleted,
    /// Parsing finished successfully.
    Done,
    /// The input violates the grammar.
    Invalid,
    /// The input exceeds the maximum size the parser was constructed with.
    DataTooBig,
}

impl ParserState {
    /// Returns true if the parser will not make any further progress.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, ParserState::Done | ParserState::Invalid | ParserState::DataTooBig)
    }

    /// Returns true if the parser stopped because of bad or oversized input.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, ParserState::Invalid | ParserState::DataTooBig)
    }
}

/// Outcome of one `parse` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// State after this call.
    pub state: ParserState,
    /// Bytes of the supplied buffer consumed by this call, never more than its length.
    pub consumed: usize,
}

impl Progress {
    #[inline]
    pub(crate) fn new(state: ParserState, consumed: usize) -> Self {
        Self { state, consumed }
    }
}
