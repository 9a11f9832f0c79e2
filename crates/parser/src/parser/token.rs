//! Grammar primitives shared by the parsers: byte classes, the size budget and the
//! `HTTP/<major>.<minor>` version scanner.

use crate::ensure;
use crate::protocol::{ConfigError, HttpVersion};

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const SP: u8 = b' ';
pub(crate) const HTAB: u8 = b'\t';

/// RFC 9110 `tchar`: visible US-ASCII except delimiters.
#[inline]
pub(crate) fn is_token(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
        | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}

/// Linear white space: SP or HTAB.
#[inline]
pub(crate) fn is_lws(b: u8) -> bool {
    b == SP || b == HTAB
}

/// Control characters, HTAB included.
#[inline]
pub(crate) fn is_ctl(b: u8) -> bool {
    b < 0x20 || b == 0x7f
}

/// Byte allowed inside a header field value: VCHAR, obs-text or LWS.
#[inline]
pub(crate) fn is_field_value(b: u8) -> bool {
    is_lws(b) || !is_ctl(b)
}

/// Visible US-ASCII, `0x21..=0x7E`.
#[inline]
pub(crate) fn is_visible(b: u8) -> bool {
    b.is_ascii_graphic()
}

/// Tracks how many bytes a parser consumed against the maximum it was constructed with.
///
/// Parsers only ever look at [`Budget::window`] of a buffer, so a token being accumulated can
/// never grow past the budget. Parsers of terminated grammars (lines, header blocks) report
/// `DataTooBig` as soon as the budget is spent without reaching a terminal state. Form and
/// multipart bodies can end at exactly `max` bytes, so they report it only once a byte beyond
/// the budget is offered, see [`Budget::is_overrun`]. Either way exactly `max` bytes are consumed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Budget {
    max: usize,
    consumed: usize,
}

impl Budget {
    /// Validates `max` against the protocol minimum of a parser.
    pub(crate) fn new(max: usize, min: usize) -> Result<Self, ConfigError> {
        ensure!(max >= min, ConfigError::max_size_too_small(max, min));
        Ok(Self { max, consumed: 0 })
    }

    /// For the `DEFAULT_*` sizes, which are well above every protocol minimum.
    pub(crate) const fn preset(max: usize) -> Self {
        Self { max, consumed: 0 }
    }

    /// The prefix of `buf` that still fits into the budget.
    #[inline]
    pub(crate) fn window<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        let remaining = self.max - self.consumed;
        &buf[..buf.len().min(remaining)]
    }

    #[inline]
    pub(crate) fn spend(&mut self, n: usize) {
        debug_assert!(self.consumed + n <= self.max);
        self.consumed += n;
    }

    #[inline]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.consumed >= self.max
    }

    /// True if `buf` holds bytes past the budget.
    #[inline]
    pub(crate) fn is_overrun(&self, buf: &[u8]) -> bool {
        buf.len() > self.max - self.consumed
    }

    #[inline]
    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub(crate) fn max(&self) -> usize {
        self.max
    }
}

/// Result of feeding one byte to a sub-scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan<T> {
    Pending,
    Complete(T),
    Rejected,
}

const VERSION_PREFIX: &[u8] = b"HTTP/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionStage {
    /// Matched this many bytes of `HTTP/`
    Prefix(usize),
    Major { digits: bool },
    Minor { digits: bool },
}

/// Scans `HTTP/<major>.<minor>` followed by a terminator byte, one byte at a time.
///
/// The prefix is case-sensitive, both numbers need at least one digit and must fit into `u32`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VersionScanner {
    stage: VersionStage,
    major: u32,
    minor: u32,
}

impl VersionScanner {
    pub(crate) fn new() -> Self {
        Self { stage: VersionStage::Prefix(0), major: 0, minor: 0 }
    }

    pub(crate) fn push(&mut self, b: u8, terminator: u8) -> Scan<HttpVersion> {
        match self.stage {
            VersionStage::Prefix(matched) => {
                if b != VERSION_PREFIX[matched] {
                    return Scan::Rejected;
                }
                self.stage = if matched + 1 == VERSION_PREFIX.len() {
                    VersionStage::Major { digits: false }
                } else {
                    VersionStage::Prefix(matched + 1)
                };
                Scan::Pending
            }
            VersionStage::Major { digits } => match b {
                b'0'..=b'9' => match accumulate(self.major, b) {
                    Some(major) => {
                        self.major = major;
                        self.stage = VersionStage::Major { digits: true };
                        Scan::Pending
                    }
                    None => Scan::Rejected,
                },
                b'.' if digits => {
                    self.stage = VersionStage::Minor { digits: false };
                    Scan::Pending
                }
                _ => Scan::Rejected,
            },
            VersionStage::Minor { digits } => match b {
                b'0'..=b'9' => match accumulate(self.minor, b) {
                    Some(minor) => {
                        self.minor = minor;
                        self.stage = VersionStage::Minor { digits: true };
                        Scan::Pending
                    }
                    None => Scan::Rejected,
                },
                b if b == terminator && digits => Scan::Complete(HttpVersion::new(self.major, self.minor)),
                _ => Scan::Rejected,
            },
        }
    }
}

#[inline]
fn accumulate(value: u32, digit: u8) -> Option<u32> {
    value.checked_mul(10)?.checked_add(u32::from(digit - b'0'))
}
