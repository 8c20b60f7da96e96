//! Codec trait, the JSON codec, and the incremental element reader.
//!
//! A codec converts between [`Element`]s and bytes. It supports two ways
//! of reading:
//!
//! - [`Codec::decode`] takes a buffer that holds exactly one element.
//! - [`Codec::decode_next`] reads the first element of a buffer that may
//!   hold several, and reports how many bytes that element used.
//!   [`ElementReader`] wraps this in a cursor, so back-to-back elements
//!   can be read without any lookahead that crosses into the next one.

use crate::{Element, ProtocolError};

/// Separator written between elements in a batch. Purely cosmetic: the
/// JSON codec skips whitespace before each element.
pub const ELEMENT_SEPARATOR: u8 = b'\n';

/// A codec that turns elements into bytes and back.
pub trait Codec: Send + Sync + 'static {
    /// Appends the encoding of `element` to `out`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the codec cannot represent the
    /// element. The JSON codec never fails here.
    fn encode_into(
        &self,
        element: &Element,
        out: &mut Vec<u8>,
    ) -> Result<(), ProtocolError>;

    /// Encodes a single element into a fresh buffer.
    fn encode(&self, element: &Element) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        self.encode_into(element, &mut out)?;
        Ok(out)
    }

    /// Decodes a buffer that holds exactly one element.
    ///
    /// # Errors
    /// Returns `ProtocolError::MalformedMessage` if the bytes are not one
    /// well-formed element (trailing data included).
    fn decode(&self, data: &[u8]) -> Result<Element, ProtocolError>;

    /// Decodes the first element in `data`.
    ///
    /// Returns the element and the number of bytes it occupied (leading
    /// whitespace included), or `None` if only whitespace remains.
    fn decode_next(
        &self,
        data: &[u8],
    ) -> Result<Option<(Element, usize)>, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// A JSON object is self-delimiting, so the stream reader knows an element
/// has ended at its closing brace and never reads past it.
///
/// ## Example
///
/// ```rust
/// use colonnade_protocol::{Codec, Element, JsonCodec};
///
/// let codec = JsonCodec;
/// let element = Element::new("close").with_attribute("panel", "negotiationDialog");
///
/// let bytes = codec.encode(&element).unwrap();
/// assert_eq!(bytes, br#"{"close":{"panel":"negotiationDialog"}}"#);
///
/// let decoded = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, element);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode_into(
        &self,
        element: &Element,
        out: &mut Vec<u8>,
    ) -> Result<(), ProtocolError> {
        serde_json::to_writer(out, element).map_err(ProtocolError::Encode)
    }

    fn decode(&self, data: &[u8]) -> Result<Element, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| {
            ProtocolError::MalformedMessage(format!("invalid element: {e}"))
        })
    }

    fn decode_next(
        &self,
        data: &[u8],
    ) -> Result<Option<(Element, usize)>, ProtocolError> {
        let mut stream =
            serde_json::Deserializer::from_slice(data).into_iter::<Element>();
        match stream.next() {
            None => Ok(None),
            Some(Ok(element)) => Ok(Some((element, stream.byte_offset()))),
            Some(Err(e)) => Err(ProtocolError::MalformedMessage(format!(
                "invalid element at byte {}: {e}",
                stream.byte_offset()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ElementReader
// ---------------------------------------------------------------------------

/// A cursor over a buffer of back-to-back elements.
///
/// Each [`next_element`](Self::next_element) call consumes exactly one
/// element and leaves the cursor immediately after it. A failed read does
/// not move the cursor.
pub struct ElementReader<'a, C: Codec> {
    codec: &'a C,
    data: &'a [u8],
    position: usize,
}

impl<'a, C: Codec> ElementReader<'a, C> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(codec: &'a C, data: &'a [u8]) -> Self {
        Self {
            codec,
            data,
            position: 0,
        }
    }

    /// Reads the next element, or `None` once only whitespace remains.
    pub fn next_element(&mut self) -> Result<Option<Element>, ProtocolError> {
        match self.codec.decode_next(self.remaining())? {
            Some((element, consumed)) => {
                self.position += consumed;
                Ok(Some(element))
            }
            None => {
                self.position = self.data.len();
                Ok(None)
            }
        }
    }

    /// Byte offset of the cursor from the start of the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close() -> Element {
        Element::new("close").with_attribute("panel", "negotiationDialog")
    }

    fn chat() -> Element {
        Element::new("chat")
            .with_attribute("sender", "Stuyvesant")
            .with_attribute("message", "{not json}")
    }

    #[test]
    fn test_encode_close_matches_wire_form() {
        let bytes = JsonCodec.encode(&close()).unwrap();
        assert_eq!(bytes, br#"{"close":{"panel":"negotiationDialog"}}"#);
    }

    #[test]
    fn test_decode_rejects_trailing_data() {
        let mut bytes = JsonCodec.encode(&close()).unwrap();
        bytes.extend_from_slice(b"{}");
        let err = JsonCodec.decode(&bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let err = JsonCodec.decode(b"not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_reader_stops_exactly_at_element_boundary() {
        let first = JsonCodec.encode(&close()).unwrap();
        let mut buf = first.clone();
        buf.push(ELEMENT_SEPARATOR);
        JsonCodec.encode_into(&chat(), &mut buf).unwrap();

        let mut reader = ElementReader::new(&JsonCodec, &buf);
        assert_eq!(reader.next_element().unwrap(), Some(close()));
        assert_eq!(reader.position(), first.len());
        assert_eq!(reader.remaining()[0], ELEMENT_SEPARATOR);

        assert_eq!(reader.next_element().unwrap(), Some(chat()));
        assert_eq!(reader.position(), buf.len());
        assert_eq!(reader.next_element().unwrap(), None);
    }

    #[test]
    fn test_reader_treats_trailing_whitespace_as_end() {
        let mut buf = JsonCodec.encode(&close()).unwrap();
        buf.extend_from_slice(b" \n\t ");

        let mut reader = ElementReader::new(&JsonCodec, &buf);
        assert!(reader.next_element().unwrap().is_some());
        assert!(reader.next_element().unwrap().is_none());
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn test_reader_failed_read_does_not_move_cursor() {
        let mut buf = JsonCodec.encode(&close()).unwrap();
        let boundary = buf.len();
        buf.extend_from_slice(br#"{"chat":{"sender":"#);

        let mut reader = ElementReader::new(&JsonCodec, &buf);
        reader.next_element().unwrap();
        assert!(reader.next_element().is_err());
        assert_eq!(reader.position(), boundary);
    }

    #[test]
    fn test_duplicate_attribute_is_malformed_on_both_paths() {
        let bytes = br#"{"close":{"panel":"a","panel":"b"}}"#;
        let err = JsonCodec.decode(bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));

        let mut reader = ElementReader::new(&JsonCodec, bytes);
        let err = reader.next_element().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MalformedMessage(ref m) if m.contains("duplicate")
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_whole_and_streaming_paths_agree() {
        let bytes = JsonCodec.encode(&chat()).unwrap();
        let whole = JsonCodec.decode(&bytes).unwrap();
        let (streamed, consumed) = JsonCodec.decode_next(&bytes).unwrap().unwrap();
        assert_eq!(whole, streamed);
        assert_eq!(consumed, bytes.len());
    }
}
