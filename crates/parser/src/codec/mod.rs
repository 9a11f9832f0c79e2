//! `tokio_util` decoders built on the parser family
//!
//! The parsers are sans-IO; these decoders drive them over the `BytesMut` read buffer of a
//! [`FramedRead`](tokio_util::codec::FramedRead), splitting off the bytes each parser consumed.
//!
//! - [`RequestHeadDecoder`]: request line and header block into a [`RequestHeader`](crate::protocol::RequestHeader)
//! - [`ResponseHeadDecoder`]: status line and header block into a [`ResponseHeader`](crate::protocol::ResponseHeader)
//! - [`MultipartDecoder`]: a multipart body into a stream of [`BodyPartItem`](crate::protocol::BodyPartItem)s
//! - [`FormDecoder`]: a form body into its [`FormField`](crate::protocol::FormField)s
//!
//! A parser reporting `Invalid` or `DataTooBig` surfaces as a [`ParseError`](crate::protocol::ParseError).
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_parser::codec::MultipartDecoder;
//! use micro_parser::protocol::BodyPartItem;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = MultipartDecoder::new("sep").unwrap();
//! let mut buffer = BytesMut::from(&b"--sep\r\nhello\r\n--sep--\r\n"[..]);
//!
//! let mut items = Vec::new();
//! while let Some(item) = decoder.decode_eof(&mut buffer).unwrap() {
//!     items.push(item);
//! }
//!
//! assert_eq!(items, vec![BodyPartItem::PartEnd, BodyPartItem::Chunk("hello".into()), BodyPartItem::Eof]);
//! ```

mod form_decoder;
mod head_decoder;
mod multipart_decoder;

pub use form_decoder::FormDecoder;
pub use head_decoder::{HeadLimits, RequestHeadDecoder, ResponseHeadDecoder};
pub use multipart_decoder::MultipartDecoder;
