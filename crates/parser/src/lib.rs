//! Incremental, buffer-bounded parsers for HTTP and MIME messages
//!
//! This crate turns raw byte streams into structured message data: request lines, status lines,
//! RFC 5322 style header blocks with folding, MIME multipart body parts and
//! `application/x-www-form-urlencoded` bodies. Input may arrive in chunks of any size, down to a
//! single byte, and the result never depends on how the stream was chopped.
//!
//! # Features
//!
//! - Sans-IO parsers: no reads, no allocation beyond the token being built
//! - Every parser is bounded by a maximum size chosen at construction
//! - A multipart boundary scanner that recognizes delimiters split across chunks
//! - `tokio_util` decoders driving the parsers over a `BytesMut` read buffer
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_parser::codec::RequestHeadDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestHeadDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /index.html HTTP/1.1\r\nHost: exam"[..]);
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"ple.com\r\n\r\nbody");
//! let header = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(header.method(), &http::Method::GET);
//! assert_eq!(header.uri().path(), "/index.html");
//! assert_eq!(header.headers()[http::header::HOST], "example.com");
//! assert_eq!(&buffer[..], b"body");
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: the parser family and the [`parser::Parser`] contract they share
//! - [`protocol`]: parse states, start lines, sinks, message heads and error types
//! - [`codec`]: [`Decoder`](tokio_util::codec::Decoder) implementations built on the parsers
//!
//! # Error Handling
//!
//! Malformed or oversized input is never an error at the parser level; it is reported through
//! [`protocol::ParserState::Invalid`] and [`protocol::ParserState::DataTooBig`]. Errors are
//! reserved for broken constructor arguments ([`protocol::ConfigError`]) and for the codecs,
//! which surface parser failures as [`protocol::ParseError`].

pub mod codec;
pub mod parser;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
