//! Variant-typed attribute records exchanged with game clients.
//!
//! A record travels as base64 and has no length field; the buffer itself is
//! authoritative:
//!
//! ```text
//! offset 0   attribute key      u32 little-endian
//! offset 4   data type tag      u8
//! offset 12  payload            fixed-width types (big-endian)
//! offset 20  payload            WString / Binary / Unset (rest of buffer)
//! ```
//!
//! Decoding rejects any input whose canonical re-encoding differs from what was
//! received, so transport damage surfaces as an error instead of a wrong number.

pub mod keys;

use std::fmt;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// Bit that marks a platform-defined attribute.
pub const SYSTEM_ATTRIBUTE_MASK: u32 = 0x0000_8000;

const HEADER_LEN: usize = 5;
const FIXED_PAYLOAD_OFFSET: usize = 12;
const VARIABLE_PAYLOAD_OFFSET: usize = 20;
const CONTEXT_RECORD_LEN: usize = 20;

/// Data type tag stored at offset 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PropertyDataType {
    Context = 0,
    Int32 = 1,
    Int64 = 2,
    Double = 3,
    WString = 4,
    Float = 5,
    Binary = 6,
    DateTime = 7,
    Unset = 0xFF,
}

impl PropertyDataType {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Context),
            1 => Some(Self::Int32),
            2 => Some(Self::Int64),
            3 => Some(Self::Double),
            4 => Some(Self::WString),
            5 => Some(Self::Float),
            6 => Some(Self::Binary),
            7 => Some(Self::DateTime),
            0xFF => Some(Self::Unset),
            _ => None,
        }
    }

    /// Byte offset where this type's payload starts.
    pub const fn payload_offset(self) -> usize {
        match self {
            Self::WString | Self::Binary | Self::Unset => VARIABLE_PAYLOAD_OFFSET,
            _ => FIXED_PAYLOAD_OFFSET,
        }
    }

    /// Width of fixed-size payloads; `None` for variable-length types.
    pub const fn natural_size(self) -> Option<usize> {
        match self {
            Self::Context | Self::Int32 | Self::Float => Some(4),
            Self::Int64 | Self::Double | Self::DateTime => Some(8),
            Self::WString | Self::Binary | Self::Unset => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Context => "Context",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Double => "Double",
            Self::WString => "u16String",
            Self::Float => "Float",
            Self::Binary => "Binary",
            Self::DateTime => "Datetime",
            Self::Unset => "Unset",
        }
    }
}

impl fmt::Display for PropertyDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded payload, one variant per data type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Context(u32),
    Int32(i32),
    Int64(i64),
    Double(f64),
    WString(String),
    Float(f32),
    Binary(Vec<u8>),
    DateTime(u64),
    Unset,
}

impl PropertyValue {
    pub fn data_type(&self) -> PropertyDataType {
        match self {
            Self::Context(_) => PropertyDataType::Context,
            Self::Int32(_) => PropertyDataType::Int32,
            Self::Int64(_) => PropertyDataType::Int64,
            Self::Double(_) => PropertyDataType::Double,
            Self::WString(_) => PropertyDataType::WString,
            Self::Float(_) => PropertyDataType::Float,
            Self::Binary(_) => PropertyDataType::Binary,
            Self::DateTime(_) => PropertyDataType::DateTime,
            Self::Unset => PropertyDataType::Unset,
        }
    }

    fn decode(data_type: PropertyDataType, payload: &[u8]) -> Self {
        match data_type {
            PropertyDataType::Context => Self::Context(u32::from_be_bytes(word(payload))),
            PropertyDataType::Int32 => Self::Int32(i32::from_be_bytes(word(payload))),
            PropertyDataType::Int64 => Self::Int64(i64::from_be_bytes(dword(payload))),
            PropertyDataType::Double => Self::Double(f64::from_be_bytes(dword(payload))),
            PropertyDataType::WString => Self::WString(decode_utf16_be(payload)),
            PropertyDataType::Float => Self::Float(f32::from_be_bytes(word(payload))),
            PropertyDataType::Binary => Self::Binary(payload.to_vec()),
            PropertyDataType::DateTime => Self::DateTime(u64::from_be_bytes(dword(payload))),
            PropertyDataType::Unset => Self::Unset,
        }
    }
}

/// One decoded attribute record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Property {
    encoded: String,
    attribute_key: u32,
    value: PropertyValue,
    payload: Vec<u8>,
}

impl Property {
    /// Decode a base64 record.
    ///
    /// # Errors
    ///
    /// Returns `PropertyError` if the input is not base64, is not the canonical
    /// encoding of its own bytes, carries an unknown type tag, or is too short
    /// for the offsets its type implies.
    pub fn decode(encoded: &str) -> Result<Self, PropertyError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| PropertyError::InvalidBase64(e.to_string()))?;

        if BASE64_STANDARD.encode(&bytes) != encoded {
            return Err(PropertyError::NonCanonical);
        }

        if bytes.len() < HEADER_LEN {
            return Err(PropertyError::MissingHeader(bytes.len()));
        }

        let attribute_key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let data_type =
            PropertyDataType::from_tag(bytes[4]).ok_or(PropertyError::UnknownDataType(bytes[4]))?;

        let offset = data_type.payload_offset();
        let required = offset + data_type.natural_size().unwrap_or(0);
        if bytes.len() < required {
            return Err(PropertyError::Truncated {
                data_type,
                len: bytes.len(),
                required,
            });
        }

        let payload = bytes[offset..].to_vec();
        let value = PropertyValue::decode(data_type, &payload);

        Ok(Self {
            encoded: encoded.to_string(),
            attribute_key,
            value,
            payload,
        })
    }

    /// Serialize a context value as a canonical 20-byte record.
    pub fn encode_context(attribute_key: u32, value: u32) -> String {
        BASE64_STANDARD.encode(context_bytes(attribute_key, value))
    }

    /// Build a context record without a decode round-trip.
    pub fn context(attribute_key: u32, value: u32) -> Self {
        let bytes = context_bytes(attribute_key, value);
        Self {
            encoded: BASE64_STANDARD.encode(bytes),
            attribute_key,
            value: PropertyValue::Context(value),
            payload: bytes[FIXED_PAYLOAD_OFFSET..].to_vec(),
        }
    }

    pub fn attribute_key(&self) -> u32 {
        self.attribute_key
    }

    pub fn data_type(&self) -> PropertyDataType {
        self.value.data_type()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Everything after the payload offset, as received.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The canonical base64 form this record was decoded from.
    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    pub fn is_system(&self) -> bool {
        is_system_attribute(self.attribute_key)
    }

    /// Text payload of a `WString` record, `None` for every other type.
    pub fn as_utf16_string(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::WString(text) => Some(text),
            _ => None,
        }
    }

    /// Uppercase hex rendering of numeric and binary payloads.
    ///
    /// Numeric types are zero-padded to their natural width (8 or 16 digits).
    /// `WString` and `Unset` have no hex form.
    pub fn as_hex_string(&self) -> Option<String> {
        match &self.value {
            PropertyValue::Context(v) => Some(format!("{v:08X}")),
            PropertyValue::Int32(v) => Some(format!("{:08X}", *v as u32)),
            PropertyValue::Int64(v) => Some(format!("{:016X}", *v as u64)),
            PropertyValue::Double(v) => Some(format!("{:016X}", v.to_bits())),
            PropertyValue::Float(v) => Some(format!("{:08X}", v.to_bits())),
            PropertyValue::DateTime(v) => Some(format!("{v:016X}")),
            PropertyValue::Binary(bytes) => Some(hex::encode_upper(bytes)),
            PropertyValue::WString(_) | PropertyValue::Unset => None,
        }
    }

    /// Natural width for fixed types, actual payload length otherwise.
    pub fn byte_size(&self) -> usize {
        self.data_type()
            .natural_size()
            .unwrap_or(self.payload.len())
    }

    /// Attribute key as 8 uppercase hex digits.
    pub fn id_string(&self) -> String {
        format!("{:08X}", self.attribute_key)
    }

    pub fn type_name(&self) -> &'static str {
        self.data_type().name()
    }

    pub fn friendly_name(&self) -> &'static str {
        keys::friendly_name(self.attribute_key)
    }

    /// Best printable form of the payload.
    pub fn display_value(&self) -> String {
        match &self.value {
            PropertyValue::WString(text) => text.clone(),
            PropertyValue::Unset => "Unset".to_string(),
            _ => self.as_hex_string().unwrap_or_default(),
        }
    }

    /// One-line summary of the record header.
    pub fn describe(&self) -> String {
        format!(
            "{} ID:\t0x{}  Data Type: {}  Size: {}  Type: {}",
            if self.data_type() == PropertyDataType::Context {
                "Context"
            } else {
                "Property"
            },
            self.id_string(),
            self.data_type().tag(),
            self.byte_size(),
            if self.is_system() { "System" } else { "Custom" }
        )
    }
}

impl TryFrom<String> for Property {
    type Error = PropertyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::decode(&s)
    }
}

impl From<Property> for String {
    fn from(property: Property) -> String {
        property.encoded
    }
}

pub const fn is_system_attribute(attribute_key: u32) -> bool {
    attribute_key & SYSTEM_ATTRIBUTE_MASK != 0
}

fn context_bytes(attribute_key: u32, value: u32) -> [u8; CONTEXT_RECORD_LEN] {
    let mut bytes = [0u8; CONTEXT_RECORD_LEN];
    bytes[0..4].copy_from_slice(&attribute_key.to_le_bytes());
    bytes[4] = PropertyDataType::Context.tag();
    bytes[FIXED_PAYLOAD_OFFSET..FIXED_PAYLOAD_OFFSET + 4].copy_from_slice(&value.to_be_bytes());
    bytes
}

// Callers have already checked the payload against the type's natural size.
fn word(payload: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&payload[..4]);
    out
}

fn dword(payload: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&payload[..8]);
    out
}

fn decode_utf16_be(payload: &[u8]) -> String {
    let units = payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if payload.len() % 2 == 1 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text.trim_end_matches('\0').to_string()
}
