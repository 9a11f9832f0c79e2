//! Vocabulary shared by the parsers and the codecs.
//!
//! - **State** ([`state`]): [`ParserState`] and [`Progress`], returned by every parse call
//! - **Start lines** ([`line`]): [`RequestLine`], [`StatusLine`] and [`HttpVersion`]
//! - **Sinks** ([`sink`]): [`HeaderSink`] and [`FormSink`], the collections parsers append to
//! - **Heads** ([`request`], [`response`]): `http` typed views of a decoded message head
//! - **Multipart items** ([`message`]): [`BodyPartItem`] produced by the multipart decoder
//! - **Errors** ([`error`]): [`ConfigError`] for broken constructor contracts and
//!   [`ParseError`] for the codecs

mod state;
pub use state::ParserState;
pub use state::Progress;

mod line;
pub use line::HttpVersion;
pub use line::RequestLine;
pub use line::StatusLine;

mod sink;
pub use sink::FormField;
pub use sink::FormSink;
pub use sink::HeaderSink;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHeader;

mod message;
pub use message::BodyPartItem;

mod error;
pub use error::ConfigError;
pub use error::ParseError;
