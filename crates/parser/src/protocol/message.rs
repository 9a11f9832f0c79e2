use bytes::Bytes;

/// Represents an item in a decoded multipart body stream.
///
/// The multipart decoder produces the content of each body part as a run of chunks followed by
/// a marker: `PartEnd` after every part except the last, `Eof` after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPartItem {
    /// A run of body-part content, in stream order
    Chunk(Bytes),
    /// The current body part is complete and another one follows
    PartEnd,
    /// The final body part is complete
    Eof,
}

impl BodyPartItem {
    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, BodyPartItem::Chunk(_))
    }

    /// Returns true if this item ends a body part, final or not
    #[inline]
    pub fn is_part_end(&self) -> bool {
        matches!(self, BodyPartItem::PartEnd | BodyPartItem::Eof)
    }

    /// Returns true if this item ends the last body part
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, BodyPartItem::Eof)
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            BodyPartItem::Chunk(bytes) => Some(bytes),
            BodyPartItem::PartEnd | BodyPartItem::Eof => None,
        }
    }

    /// Consumes the item and returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            BodyPartItem::Chunk(bytes) => Some(bytes),
            BodyPartItem::PartEnd | BodyPartItem::Eof => None,
        }
    }
}

impl From<Bytes> for BodyPartItem {
    fn from(bytes: Bytes) -> Self {
        Self::Chunk(bytes)
    }
}
