//! Message types for the sync protocol
//!
//! Messages are divided into two directions:
//! - Controller → Watch: batches of [`SyncField`] updates
//! - Watch → Controller: single-tuple [`Intent`] messages

use crate::dict::{DictError, Dictionary, DictionaryWriter, Tuple, TupleValue, OUTBOUND_CAPACITY};
use crate::keys::{FieldType, SyncKey};
use heapless::Vec;

/// Marker text carried by outbound intents
pub const INTENT_MARKER: &str = ".";

/// One decoded field update for a known key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncField<'a> {
    pub key: SyncKey,
    pub value: TupleValue<'a>,
}

impl<'a> SyncField<'a> {
    /// Map a raw tuple to a field, or `None` if its key is unknown
    pub fn from_tuple(tuple: &Tuple<'a>) -> Option<Self> {
        SyncKey::from_u32(tuple.key).map(|key| Self {
            key,
            value: tuple.value,
        })
    }

    /// Returns true if the value carries the type this key expects
    ///
    /// Integer keys accept unsigned values as long as they fit in `i32`.
    pub fn is_well_typed(&self) -> bool {
        match self.key.field_type() {
            FieldType::Text => self.value.as_text().is_some(),
            FieldType::Integer => self.value.as_i32().is_some(),
        }
    }
}

/// Intents sent from the watch to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    /// Advance to the next slide
    Next,
    /// Go back to the previous slide
    Prev,
}

impl Intent {
    /// Key this intent is sent under
    pub fn key(self) -> SyncKey {
        match self {
            Intent::Next => SyncKey::NextIntent,
            Intent::Prev => SyncKey::PrevIntent,
        }
    }

    /// Encode this intent as a one-tuple dictionary
    ///
    /// Returns the number of bytes written
    pub fn encode(self, marker: &str, buffer: &mut [u8]) -> Result<usize, DictError> {
        let mut writer = DictionaryWriter::new(buffer)?;
        writer.write(&Tuple::text(self.key().to_u32(), marker))?;
        Ok(writer.finish())
    }

    /// Encode this intent into a heapless Vec sized for the outbound channel
    pub fn encode_to_vec(self, marker: &str) -> Result<Vec<u8, OUTBOUND_CAPACITY>, DictError> {
        let mut buffer = [0u8; OUTBOUND_CAPACITY];
        let len = self.encode(marker, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| DictError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Recognise an intent in a received dictionary (controller side)
    pub fn from_dictionary(dict: &Dictionary<'_>) -> Option<Self> {
        dict.iter()
            .filter_map(|tuple| SyncKey::from_u32(tuple.key))
            .find_map(|key| match key {
                SyncKey::NextIntent => Some(Intent::Next),
                SyncKey::PrevIntent => Some(Intent::Prev),
                _ => None,
            })
    }
}

/// Typed builder for controller → watch batches
pub struct SyncBatch<'b> {
    writer: DictionaryWriter<'b>,
}

impl<'b> SyncBatch<'b> {
    /// Start a batch in `buffer`
    pub fn new(buffer: &'b mut [u8]) -> Result<Self, DictError> {
        Ok(Self {
            writer: DictionaryWriter::new(buffer)?,
        })
    }

    /// Add a text field
    pub fn text(mut self, key: SyncKey, text: &str) -> Result<Self, DictError> {
        self.writer.write(&Tuple::text(key.to_u32(), text))?;
        Ok(self)
    }

    /// Add an integer field
    pub fn int(mut self, key: SyncKey, value: i32) -> Result<Self, DictError> {
        self.writer.write(&Tuple::int(key.to_u32(), value))?;
        Ok(self)
    }

    /// Add an arbitrary tuple, including unknown keys or mistyped values
    pub fn raw(mut self, tuple: Tuple<'_>) -> Result<Self, DictError> {
        self.writer.write(&tuple)?;
        Ok(self)
    }

    /// Finish the batch, returning the number of bytes written
    pub fn finish(self) -> usize {
        self.writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_next_encoding() {
        let encoded = Intent::Next.encode_to_vec(INTENT_MARKER).unwrap();
        assert_eq!(encoded.len(), 10);
        assert_eq!(encoded[0], 1); // count
        assert_eq!(&encoded[1..5], &[1, 0, 0, 0]); // next-intent key
        assert_eq!(&encoded[8..10], b".\0");
    }

    #[test]
    fn test_intent_prev_key() {
        assert_eq!(Intent::Prev.key(), SyncKey::PrevIntent);
        let encoded = Intent::Prev.encode_to_vec(INTENT_MARKER).unwrap();
        assert_eq!(&encoded[1..5], &[2, 0, 0, 0]);
    }

    #[test]
    fn test_intent_buffer_too_small() {
        let mut buffer = [0u8; 8];
        assert_eq!(
            Intent::Next.encode(INTENT_MARKER, &mut buffer),
            Err(DictError::BufferTooSmall)
        );
    }

    #[test]
    fn test_intent_marker_too_long_for_outbound() {
        let marker = [b'x'; OUTBOUND_CAPACITY];
        let marker = core::str::from_utf8(&marker).unwrap();
        assert_eq!(
            Intent::Next.encode_to_vec(marker),
            Err(DictError::BufferTooSmall)
        );
    }

    #[test]
    fn test_intent_from_dictionary() {
        let encoded = Intent::Prev.encode_to_vec(INTENT_MARKER).unwrap();
        let dict = Dictionary::parse(&encoded).unwrap();
        assert_eq!(Intent::from_dictionary(&dict), Some(Intent::Prev));
    }

    #[test]
    fn test_non_intent_dictionary() {
        let mut buffer = [0u8; 32];
        let len = SyncBatch::new(&mut buffer)
            .and_then(|b| b.text(SyncKey::SlideId, "3"))
            .map(SyncBatch::finish)
            .unwrap();
        let dict = Dictionary::parse(&buffer[..len]).unwrap();
        assert_eq!(Intent::from_dictionary(&dict), None);
    }

    #[test]
    fn test_sync_batch_builder() {
        let mut buffer = [0u8; 64];
        let len = SyncBatch::new(&mut buffer)
            .and_then(|b| b.text(SyncKey::PresentationTitle, "Deck"))
            .and_then(|b| b.int(SyncKey::SlideStart, 42))
            .and_then(|b| b.raw(Tuple::text(99, "ignored")))
            .map(SyncBatch::finish)
            .unwrap();

        let dict = Dictionary::parse(&buffer[..len]).unwrap();
        assert_eq!(dict.len(), 3);

        let fields: heapless::Vec<SyncField<'_>, 4> =
            dict.iter().filter_map(|t| SyncField::from_tuple(&t)).collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key, SyncKey::PresentationTitle);
        assert_eq!(fields[1].value, TupleValue::Int(42));
    }

    #[test]
    fn test_field_typing() {
        let text = SyncField {
            key: SyncKey::SlideId,
            value: TupleValue::Text("1"),
        };
        let wrong = SyncField {
            key: SyncKey::SlideStart,
            value: TupleValue::Text("1"),
        };
        let unsigned = SyncField {
            key: SyncKey::SlideStart,
            value: TupleValue::Uint(10),
        };
        assert!(text.is_well_typed());
        assert!(!wrong.is_well_typed());
        assert!(unsigned.is_well_typed());
    }
}
