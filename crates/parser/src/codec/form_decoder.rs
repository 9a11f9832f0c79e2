//! Decoder for `application/x-www-form-urlencoded` bodies.
//!
//! A form body has no terminator of its own, so the fields are only yielded from
//! [`Decoder::decode_eof`], once the body is known to be complete.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::parser::{DEFAULT_MAX_FORM_SIZE, FormUrlEncodedParser, Parser};
use crate::protocol::{ConfigError, FormField, ParseError, ParserState};

#[derive(Debug)]
pub struct FormDecoder {
    max_size: usize,
    /// `None` once the fields have been yielded
    parser: Option<FormUrlEncodedParser>,
}

impl FormDecoder {
    /// A decoder with [`DEFAULT_MAX_FORM_SIZE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MaxSizeTooSmall`] if `max_size` is zero.
    pub fn with_max_size(max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self { max_size, parser: Some(FormUrlEncodedParser::new(Vec::new(), max_size)?) })
    }

    fn feed(&mut self, src: &mut BytesMut, is_final: bool) -> Result<Option<Vec<FormField>>, ParseError> {
        let Some(parser) = self.parser.as_mut() else {
            src.clear();
            return Ok(None);
        };

        let progress = parser.parse(&src[..], is_final);
        src.advance(progress.consumed);

        match progress.state {
            ParserState::NeedMoreData => Ok(None),
            ParserState::Done => Ok(self.parser.take().map(FormUrlEncodedParser::into_sink)),
            ParserState::DataTooBig => Err(ParseError::too_large("form body", self.max_size)),
            _ => Err(ParseError::InvalidForm),
        }
    }
}

impl Default for FormDecoder {
    fn default() -> Self {
        Self { max_size: DEFAULT_MAX_FORM_SIZE, parser: Some(FormUrlEncodedParser::default()) }
    }
}

impl Decoder for FormDecoder {
    type Item = Vec<FormField>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.feed(src, false)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.feed(src, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_on_eof() {
        let mut decoder = FormDecoder::new();
        let mut buffer = BytesMut::from(&b"a=1&b"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        buffer.extend_from_slice(b"=2&flag");
        let fields = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(
            fields,
            vec![FormField::new(Some("a"), "1"), FormField::new(Some("b"), "2"), FormField::new(None, "flag")]
        );

        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn empty_body() {
        let mut decoder = FormDecoder::new();
        assert_eq!(decoder.decode_eof(&mut BytesMut::new()).unwrap(), Some(vec![]));
    }

    #[test]
    fn body_of_exactly_max_size() {
        let mut decoder = FormDecoder::with_max_size(3).unwrap();
        let mut buffer = BytesMut::from(&b"a=1"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(decoder.decode_eof(&mut buffer).unwrap(), Some(vec![FormField::new(Some("a"), "1")]));

        let mut decoder = FormDecoder::with_max_size(3).unwrap();
        let mut buffer = BytesMut::from(&b"a=1&"[..]);
        let error = decoder.decode(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::TooLarge { what: "form body", max_size: 3 }));
    }

    #[test]
    fn errors() {
        let mut buffer = BytesMut::from(&b"a=1=2"[..]);
        assert!(matches!(FormDecoder::new().decode(&mut buffer), Err(ParseError::InvalidForm)));

        let mut buffer = BytesMut::from(&b"a=12345"[..]);
        let error = FormDecoder::with_max_size(4).unwrap().decode(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::TooLarge { what: "form body", max_size: 4 }));

        assert!(FormDecoder::with_max_size(0).is_err());
    }
}
