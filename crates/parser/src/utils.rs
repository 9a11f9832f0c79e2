//! Utility macros and functions for the parser crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the parser crate implementation.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// Constructors use it to reject arguments that break a parser's contract.
///
/// # Example
///
/// ```ignore
/// ensure!(max_size >= MIN_SIZE, ConfigError::max_size_too_small(max_size, MIN_SIZE));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Maps bytes to a `String` as ISO-8859-1.
///
/// HTTP allows obs-text (`0x80..=0xFF`) in reason phrases and field values; mapping each byte to
/// the code point of the same value never fails and never loses information.
pub(crate) fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1() {
        assert_eq!(latin1_string(b"plain"), "plain");
        assert_eq!(latin1_string(b"\xe9t\xe9"), "\u{e9}t\u{e9}");
        assert_eq!(latin1_string(b""), "");
    }
}
