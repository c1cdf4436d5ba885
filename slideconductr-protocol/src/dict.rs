//! Dictionary encoding and decoding for the sync protocol.
//!
//! Dictionary format:
//! - COUNT (1 byte): number of tuples that follow
//! - per tuple:
//!   - KEY (4 bytes, little-endian): field identifier
//!   - TYPE (1 byte): 0 byte array, 1 text, 2 unsigned int, 3 signed int
//!   - LENGTH (2 bytes, little-endian): value length in bytes
//!   - VALUE (LENGTH bytes): text is NUL-terminated, integers are 1/2/4 bytes

use heapless::Vec;

/// Inbound buffer size on the watch (controller → watch)
pub const INBOUND_CAPACITY: usize = 2000;

/// Outbound buffer size on the watch (watch → controller)
pub const OUTBOUND_CAPACITY: usize = 64;

/// Size of the COUNT header
pub const DICT_HEADER_SIZE: usize = 1;

/// Size of KEY + TYPE + LENGTH
pub const TUPLE_HEADER_SIZE: usize = 4 + 1 + 2;

/// Errors that can occur while encoding or decoding a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DictError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Input ended in the middle of a header or value
    Truncated,
    /// Unknown type tag
    InvalidType(u8),
    /// Value length not valid for its type
    InvalidLength,
    /// Text value is not UTF-8
    InvalidUtf8,
    /// More tuples than the COUNT byte can express
    TooManyTuples,
    /// Bytes left over after the last tuple
    TrailingBytes,
}

/// Wire type tag of a tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupleType {
    ByteArray,
    CString,
    Uint,
    Int,
}

impl TupleType {
    /// Parse a type tag from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TupleType::ByteArray),
            1 => Some(TupleType::CString),
            2 => Some(TupleType::Uint),
            3 => Some(TupleType::Int),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            TupleType::ByteArray => 0,
            TupleType::CString => 1,
            TupleType::Uint => 2,
            TupleType::Int => 3,
        }
    }
}

/// A typed tuple value, borrowing from the buffer it was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TupleValue<'a> {
    Bytes(&'a [u8]),
    /// Text without its NUL terminator
    Text(&'a str),
    Uint(u32),
    Int(i32),
}

impl<'a> TupleValue<'a> {
    /// Wire type tag for this value
    pub fn tuple_type(&self) -> TupleType {
        match self {
            TupleValue::Bytes(_) => TupleType::ByteArray,
            TupleValue::Text(_) => TupleType::CString,
            TupleValue::Uint(_) => TupleType::Uint,
            TupleValue::Int(_) => TupleType::Int,
        }
    }

    /// Encoded length of the VALUE field
    pub fn encoded_len(&self) -> usize {
        match self {
            TupleValue::Bytes(bytes) => bytes.len(),
            TupleValue::Text(text) => text.len() + 1,
            TupleValue::Uint(_) | TupleValue::Int(_) => 4,
        }
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            TupleValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content, if this is an integer that fits in `i32`
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            TupleValue::Int(value) => Some(value),
            TupleValue::Uint(value) => i32::try_from(value).ok(),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            TupleValue::Bytes(bytes) => out.copy_from_slice(bytes),
            TupleValue::Text(text) => {
                let n = text.len();
                out[..n].copy_from_slice(text.as_bytes());
                out[n] = 0;
            }
            TupleValue::Uint(value) => out.copy_from_slice(&value.to_le_bytes()),
            TupleValue::Int(value) => out.copy_from_slice(&value.to_le_bytes()),
        }
    }
}

/// A single key/value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuple<'a> {
    /// Raw wire key
    pub key: u32,
    /// Typed value
    pub value: TupleValue<'a>,
}

impl<'a> Tuple<'a> {
    /// Create a text tuple
    pub fn text(key: u32, text: &'a str) -> Self {
        Self {
            key,
            value: TupleValue::Text(text),
        }
    }

    /// Create a signed integer tuple
    pub fn int(key: u32, value: i32) -> Self {
        Self {
            key,
            value: TupleValue::Int(value),
        }
    }

    /// Create an unsigned integer tuple
    pub fn uint(key: u32, value: u32) -> Self {
        Self {
            key,
            value: TupleValue::Uint(value),
        }
    }

    /// Encoded size of this tuple including its header
    pub fn encoded_len(&self) -> usize {
        TUPLE_HEADER_SIZE + self.value.encoded_len()
    }
}

/// Writes tuples into a caller-provided buffer
///
/// The COUNT byte is kept current after every write, so the first
/// [`len`](Self::len) bytes of the buffer are always a valid dictionary.
pub struct DictionaryWriter<'b> {
    buf: &'b mut [u8],
    len: usize,
    count: u8,
}

impl<'b> DictionaryWriter<'b> {
    /// Start an empty dictionary in `buf`
    pub fn new(buf: &'b mut [u8]) -> Result<Self, DictError> {
        if buf.len() < DICT_HEADER_SIZE {
            return Err(DictError::BufferTooSmall);
        }
        buf[0] = 0;
        Ok(Self {
            buf,
            len: DICT_HEADER_SIZE,
            count: 0,
        })
    }

    /// Append a tuple
    ///
    /// Nothing is written if the tuple does not fit.
    pub fn write(&mut self, tuple: &Tuple<'_>) -> Result<(), DictError> {
        if self.count == u8::MAX {
            return Err(DictError::TooManyTuples);
        }

        let value_len = tuple.value.encoded_len();
        let length = u16::try_from(value_len).map_err(|_| DictError::InvalidLength)?;
        let end = self.len + TUPLE_HEADER_SIZE + value_len;
        if end > self.buf.len() {
            return Err(DictError::BufferTooSmall);
        }

        let header = &mut self.buf[self.len..self.len + TUPLE_HEADER_SIZE];
        header[0..4].copy_from_slice(&tuple.key.to_le_bytes());
        header[4] = tuple.value.tuple_type().to_byte();
        header[5..7].copy_from_slice(&length.to_le_bytes());
        tuple
            .value
            .write_to(&mut self.buf[self.len + TUPLE_HEADER_SIZE..end]);

        self.len = end;
        self.count += 1;
        self.buf[0] = self.count;
        Ok(())
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no tuple has been written
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }


    /// Finish the dictionary, returning the number of bytes written
    pub fn finish(self) -> usize {
        self.len
    }
}

/// Encode a set of tuples into a heapless Vec
pub fn encode_to_vec<const N: usize>(tuples: &[Tuple<'_>]) -> Result<Vec<u8, N>, DictError> {
    let mut buffer = [0u8; N];
    let mut writer = DictionaryWriter::new(&mut buffer)?;
    for tuple in tuples {
        writer.write(tuple)?;
    }
    let len = writer.finish();

    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| DictError::BufferTooSmall)?;
    Ok(vec)
}

/// A validated dictionary borrowing its encoded bytes
///
/// [`parse`](Self::parse) checks every tuple up front; iterating a
/// `Dictionary` cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dictionary<'a> {
    bytes: &'a [u8],
    count: u8,
}

impl<'a> Dictionary<'a> {
    /// Validate and wrap an encoded dictionary
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DictError> {
        let (&count, mut rest) = bytes.split_first().ok_or(DictError::Truncated)?;

        for _ in 0..count {
            let (_, used) = decode_tuple(rest)?;
            rest = &rest[used..];
        }

        if !rest.is_empty() {
            return Err(DictError::TrailingBytes);
        }

        Ok(Self { bytes, count })
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns true if the dictionary holds no tuples
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.bytes.len()
    }

    /// Iterate over the tuples in wire order
    pub fn iter(&self) -> TupleIter<'a> {
        TupleIter {
            rest: &self.bytes[DICT_HEADER_SIZE..],
            remaining: self.count,
        }
    }

    /// Value of the first tuple with the given key
    pub fn get(&self, key: u32) -> Option<TupleValue<'a>> {
        self.iter().find(|t| t.key == key).map(|t| t.value)
    }
}

impl<'a> IntoIterator for &Dictionary<'a> {
    type Item = Tuple<'a>;
    type IntoIter = TupleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tuples of a validated [`Dictionary`]
#[derive(Debug, Clone)]
pub struct TupleIter<'a> {
    rest: &'a [u8],
    remaining: u8,
}

impl<'a> Iterator for TupleIter<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (tuple, used) = decode_tuple(self.rest).ok()?;
        self.rest = &self.rest[used..];
        self.remaining -= 1;
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

/// Decode one tuple, returning it and the number of bytes consumed
fn decode_tuple(bytes: &[u8]) -> Result<(Tuple<'_>, usize), DictError> {
    if bytes.len() < TUPLE_HEADER_SIZE {
        return Err(DictError::Truncated);
    }

    let key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let tuple_type = TupleType::from_byte(bytes[4]).ok_or(DictError::InvalidType(bytes[4]))?;
    let length = u16::from_le_bytes([bytes[5], bytes[6]]) as usize;

    let end = TUPLE_HEADER_SIZE + length;
    if bytes.len() < end {
        return Err(DictError::Truncated);
    }

    let value = decode_value(tuple_type, &bytes[TUPLE_HEADER_SIZE..end])?;
    Ok((Tuple { key, value }, end))
}

fn decode_value(tuple_type: TupleType, raw: &[u8]) -> Result<TupleValue<'_>, DictError> {
    match tuple_type {
        TupleType::ByteArray => Ok(TupleValue::Bytes(raw)),
        TupleType::CString => {
            // Text ends at the first NUL; a missing terminator is tolerated
            let text = match raw.iter().position(|&b| b == 0) {
                Some(nul) => &raw[..nul],
                None => raw,
            };
            core::str::from_utf8(text)
                .map(TupleValue::Text)
                .map_err(|_| DictError::InvalidUtf8)
        }
        TupleType::Uint => match *raw {
            [b0] => Ok(TupleValue::Uint(b0 as u32)),
            [b0, b1] => Ok(TupleValue::Uint(u16::from_le_bytes([b0, b1]) as u32)),
            [b0, b1, b2, b3] => Ok(TupleValue::Uint(u32::from_le_bytes([b0, b1, b2, b3]))),
            _ => Err(DictError::InvalidLength),
        },
        TupleType::Int => match *raw {
            [b0] => Ok(TupleValue::Int(b0 as i8 as i32)),
            [b0, b1] => Ok(TupleValue::Int(i16::from_le_bytes([b0, b1]) as i32)),
            [b0, b1, b2, b3] => Ok(TupleValue::Int(i32::from_le_bytes([b0, b1, b2, b3]))),
            _ => Err(DictError::InvalidLength),
        },
    }
}
