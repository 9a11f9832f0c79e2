//! Decoder for MIME multipart bodies.
//!
//! Turns a multipart body into a stream of [`BodyPartItem`]s: the content of each body part as
//! [`BodyPartItem::Chunk`]s, then [`BodyPartItem::PartEnd`], or [`BodyPartItem::Eof`] for the
//! final part. The preamble counts as the first body part and is usually empty.
//!
//! Content confirmed within the read buffer is split off without copying; only bytes the
//! scanner had withheld across reads and then released as content are copied.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use http::HeaderMap;
use mime::Mime;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::parser::{DEFAULT_MAX_MULTIPART_SIZE, MimeMultipartParser, Parser};
use crate::protocol::{BodyPartItem, ConfigError, ParseError, ParserState};

#[derive(Debug)]
pub struct MultipartDecoder {
    parser: MimeMultipartParser,
    pending: VecDeque<BodyPartItem>,
    finished: bool,
}

impl MultipartDecoder {
    /// A decoder for `boundary` with [`DEFAULT_MAX_MULTIPART_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoundary`] for a malformed boundary.
    pub fn new(boundary: &str) -> Result<Self, ConfigError> {
        Self::with_max_size(boundary, DEFAULT_MAX_MULTIPART_SIZE)
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a malformed boundary or a `max_size` below the minimum.
    pub fn with_max_size(boundary: &str, max_size: usize) -> Result<Self, ConfigError> {
        Ok(Self { parser: MimeMultipartParser::new(boundary, max_size)?, pending: VecDeque::new(), finished: false })
    }

    /// A decoder for the boundary parameter of a `multipart/*` media type.
    ///
    /// ```
    /// use micro_parser::codec::MultipartDecoder;
    ///
    /// let content_type = "multipart/form-data; boundary=AaB03x".parse().unwrap();
    /// assert!(MultipartDecoder::from_content_type(&content_type).is_ok());
    ///
    /// let content_type = "text/plain; boundary=x".parse().unwrap();
    /// assert!(MultipartDecoder::from_content_type(&content_type).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the media type is not multipart or its boundary is missing or malformed.
    pub fn from_content_type(content_type: &Mime) -> Result<Self, ParseError> {
        ensure!(
            content_type.type_() == mime::MULTIPART,
            ParseError::invalid_multipart(format!("{content_type} is not a multipart media type"))
        );
        let boundary = content_type
            .get_param(mime::BOUNDARY)
            .ok_or_else(|| ParseError::invalid_multipart("missing boundary parameter"))?;
        Ok(Self::new(boundary.as_str())?)
    }

    /// A decoder for the `Content-Type` of a message head.
    ///
    /// # Errors
    ///
    /// Fails if the header is missing or not a multipart media type with a valid boundary.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ParseError> {
        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .ok_or_else(|| ParseError::invalid_multipart("missing content type"))?
            .to_str()
            .map_err(ParseError::invalid_multipart)?
            .parse::<Mime>()
            .map_err(ParseError::invalid_multipart)?;
        Self::from_content_type(&content_type)
    }

    /// Runs the scanner over `src` and queues what it confirmed.
    fn feed(&mut self, src: &mut BytesMut, is_final: bool) -> Result<(), ParseError> {
        let progress = self.parser.parse(&src[..], is_final);

        let released = self.parser.released();
        if !released.is_empty() {
            self.pending.push_back(BodyPartItem::Chunk(Bytes::copy_from_slice(released)));
        }

        let body = self.parser.body_range();
        let consumed = src.split_to(progress.consumed);
        if !body.is_empty() {
            self.pending.push_back(BodyPartItem::Chunk(consumed.freeze().slice(body)));
        }

        match progress.state {
            ParserState::NeedMoreData => Ok(()),
            ParserState::BodyPartCompleted if self.parser.is_final_part() => {
                trace!("decoded final body part");
                self.finished = true;
                self.pending.push_back(BodyPartItem::Eof);
                Ok(())
            }
            ParserState::BodyPartCompleted => {
                self.pending.push_back(BodyPartItem::PartEnd);
                Ok(())
            }
            ParserState::Done => {
                self.finished = true;
                Ok(())
            }
            ParserState::Invalid => Err(ParseError::invalid_multipart("body ends before its close delimiter")),
            ParserState::DataTooBig => Err(ParseError::too_large("multipart body", self.parser.max_size())),
        }
    }
}

impl Decoder for MultipartDecoder {
    type Item = BodyPartItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.pending.pop_front() {
            return Ok(Some(item));
        }

        if self.finished {
            // epilogue
            src.clear();
            return Ok(None);
        }

        self.feed(src, false)?;
        Ok(self.pending.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        if self.finished {
            return Ok(None);
        }

        self.feed(src, true)?;
        Ok(self.pending.pop_front())
    }
}
