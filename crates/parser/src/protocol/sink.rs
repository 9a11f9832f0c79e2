//! Collections the parsers write into.
//!
//! The parsers do not own an object model; they append what they recognise into a sink supplied
//! by the caller. Sinks are implemented for the common containers and for `&mut S`, so a parser
//! can either own its sink or borrow one for the duration of the parse.

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::utils::latin1_string;

/// Receives complete header fields, in the order they appear in the header block.
///
/// A field name is always a non-empty token; the value has folded continuation lines appended
/// verbatim and surrounding linear white space trimmed.
pub trait HeaderSink {
    /// Appends one field. Returning `false` rejects the field and fails the parse as invalid.
    fn append_field(&mut self, name: &[u8], value: &[u8]) -> bool;
}

impl<S: HeaderSink + ?Sized> HeaderSink for &mut S {
    fn append_field(&mut self, name: &[u8], value: &[u8]) -> bool {
        (**self).append_field(name, value)
    }
}

/// Case-insensitive, multi-valued: a repeated name adds a value instead of replacing it.
impl HeaderSink for HeaderMap {
    fn append_field(&mut self, name: &[u8], value: &[u8]) -> bool {
        match (HeaderName::from_bytes(name), HeaderValue::from_bytes(value)) {
            (Ok(name), Ok(value)) => {
                self.append(name, value);
                true
            }
            _ => false,
        }
    }
}

impl HeaderSink for Vec<(String, String)> {
    fn append_field(&mut self, name: &[u8], value: &[u8]) -> bool {
        self.push((latin1_string(name), latin1_string(value)));
        true
    }
}

/// One `name=value` pair from an `application/x-www-form-urlencoded` body.
///
/// A token without `=` has no name at all, which is different from an empty name (`=value`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormField {
    pub name: Option<String>,
    pub value: String,
}

impl FormField {
    pub fn new(name: Option<&str>, value: &str) -> Self {
        Self { name: name.map(str::to_owned), value: value.to_owned() }
    }
}

/// Receives form pairs in body order.
pub trait FormSink {
    fn append_pair(&mut self, name: Option<&[u8]>, value: &[u8]);
}

impl<S: FormSink + ?Sized> FormSink for &mut S {
    fn append_pair(&mut self, name: Option<&[u8]>, value: &[u8]) {
        (**self).append_pair(name, value);
    }
}

impl FormSink for Vec<FormField> {
    fn append_pair(&mut self, name: Option<&[u8]>, value: &[u8]) {
        self.push(FormField { name: name.map(latin1_string), value: latin1_string(value) });
    }
}
