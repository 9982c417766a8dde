use std::fmt;
use std::sync::OnceLock;

use crate::errors::PackError;
use crate::numeric::{decode_number, encode_number};
use crate::pack::record::Record;

/// Field kinds supported on the wire, one type character each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Text,
    Bytes,
    Record,
}

impl FieldType {
    /// The character written into the record prefix for this kind.
    pub fn type_char(self) -> char {
        match self {
            FieldType::Number => '#',
            FieldType::Text => '$',
            FieldType::Bytes => '[',
            FieldType::Record => '&',
        }
    }

    pub fn from_type_char(c: char, field: &str) -> Result<Self, PackError> {
        match c {
            '#' => Ok(FieldType::Number),
            '$' => Ok(FieldType::Text),
            '[' => Ok(FieldType::Bytes),
            '&' => Ok(FieldType::Record),
            _ => Err(PackError::UnknownFieldType {
                type_char: c,
                field: field.to_string(),
            }),
        }
    }
}

/// A field value. The variant fixes the field's type for its lifetime.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
    Record(Record),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Bytes(_) => FieldType::Bytes,
            FieldValue::Record(_) => FieldType::Record,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(r) => Some(r),
            _ => None,
        }
    }
}

// Numbers compare by value with NaN equal to NaN, so a record holding NaN
// still equals its decoded copy. Nested records compare structurally.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Bytes(a), FieldValue::Bytes(b)) => a == b,
            (FieldValue::Record(a), FieldValue::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(b.to_vec())
    }
}

impl From<Record> for FieldValue {
    fn from(r: Record) -> Self {
        FieldValue::Record(r)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            FieldValue::Record(r) => write!(f, "{{{} fields}}", r.len()),
        }
    }
}

/// True when `name` classifies a field as data rather than control:
/// empty, or starting with a decimal digit.
pub fn is_data_name(name: &str) -> bool {
    name.chars().next().is_none_or(|c| c.is_ascii_digit())
}

/// One named, typed value inside a [`Record`].
///
/// The wire bytes are computed on first use and reused afterwards.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: FieldValue,
    encoded: OnceLock<Vec<u8>>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            encoded: OnceLock::new(),
        }
    }

    /// Build a field from its wire bytes and type character.
    ///
    /// Text, numbers and nested records are decoded immediately; raw bytes
    /// are kept as given and double as the cached encoding.
    pub fn from_wire(name: &str, type_char: char, bytes: &[u8]) -> Result<Self, PackError> {
        let value = match FieldType::from_type_char(type_char, name)? {
            FieldType::Number => FieldValue::Number(decode_number(bytes)),
            FieldType::Text => {
                let text =
                    String::from_utf8(bytes.to_vec()).map_err(|_| PackError::InvalidUtf8 {
                        context: format!("text field {:?}", name),
                    })?;
                FieldValue::Text(text)
            }
            FieldType::Bytes => FieldValue::Bytes(bytes.to_vec()),
            FieldType::Record => FieldValue::Record(Record::decode(bytes)?),
        };

        let encoded = OnceLock::new();
        let _ = encoded.set(bytes.to_vec());
        Ok(Self {
            name: name.to_string(),
            value,
            encoded,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn into_value(self) -> FieldValue {
        self.value
    }

    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }

    pub fn is_data(&self) -> bool {
        is_data_name(&self.name)
    }

    /// Wire bytes of the value, memoized.
    pub fn bytes(&self) -> Result<&[u8], PackError> {
        if let Some(bytes) = self.encoded.get() {
            return Ok(bytes);
        }
        let bytes = match &self.value {
            FieldValue::Number(n) => encode_number(*n),
            FieldValue::Text(s) => s.as_bytes().to_vec(),
            FieldValue::Bytes(b) => b.clone(),
            FieldValue::Record(r) => r.encode()?,
        };
        Ok(self.encoded.get_or_init(|| bytes))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}
