//! Recursive JSON-like value used for tool inputs and JSON tool results.

use crate::error::CodecError;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A dynamically typed document.
///
/// Integers and floats are kept apart so a value decoded from JSON encodes
/// back to the same JSON number form.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicDocument {
    /// JSON `null`.
    Null,
    /// Integral number.
    Int(i64),
    /// Non-integral number.
    Float(f64),
    /// String value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Ordered list.
    Array(Vec<DynamicDocument>),
    /// String-keyed map.
    Object(BTreeMap<String, DynamicDocument>),
}

impl DynamicDocument {
    /// An empty object.
    pub fn empty_object() -> Self {
        DynamicDocument::Object(BTreeMap::new())
    }

    /// Decode from JSON text. Empty input decodes as `{}`.
    pub fn from_json_str(json: &str) -> Result<Self, CodecError> {
        if json.trim().is_empty() {
            return Ok(Self::empty_object());
        }
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CodecError::decoding(format!("invalid JSON document: {}", e)))?;
        Self::try_from(value)
    }

    /// Decode from JSON bytes. Empty input decodes as `{}`.
    pub fn from_json_slice(json: &[u8]) -> Result<Self, CodecError> {
        let text = std::str::from_utf8(json)
            .map_err(|e| CodecError::decoding(format!("document is not UTF-8: {}", e)))?;
        Self::from_json_str(text)
    }

    /// Encode as compact JSON text.
    pub fn to_json_string(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|e| CodecError::encoding(e.to_string()))
    }

    /// Convert into a `serde_json::Value`.
    pub fn to_value(&self) -> Result<Value, CodecError> {
        serde_json::to_value(self).map_err(|e| CodecError::encoding(e.to_string()))
    }

    /// Returns the string if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicDocument::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicDocument::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float, for integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicDocument::Int(i) => Some(*i as f64),
            DynamicDocument::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicDocument::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the items if this is an array.
    pub fn as_array(&self) -> Option<&[DynamicDocument]> {
        match self {
            DynamicDocument::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map if this is an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, DynamicDocument>> {
        match self {
            DynamicDocument::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key if this is an object.
    pub fn get(&self, key: &str) -> Option<&DynamicDocument> {
        self.as_object().and_then(|map| map.get(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicDocument::Null)
    }
}

impl Default for DynamicDocument {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl TryFrom<Value> for DynamicDocument {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => DynamicDocument::Null,
            Value::Bool(b) => DynamicDocument::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynamicDocument::Int(i)
                } else if n.is_u64() {
                    return Err(CodecError::decoding(format!(
                        "integer {} does not fit in a signed 64-bit value",
                        n
                    )));
                } else if let Some(f) = n.as_f64() {
                    DynamicDocument::Float(f)
                } else {
                    return Err(CodecError::decoding(format!("unsupported number {}", n)));
                }
            }
            Value::String(s) => DynamicDocument::String(s),
            Value::Array(items) => DynamicDocument::Array(
                items
                    .into_iter()
                    .map(DynamicDocument::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => DynamicDocument::Object(
                map.into_iter()
                    .map(|(k, v)| DynamicDocument::try_from(v).map(|d| (k, d)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl Serialize for DynamicDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicDocument::Null => serializer.serialize_unit(),
            DynamicDocument::Int(i) => serializer.serialize_i64(*i),
            DynamicDocument::Float(f) => {
                if !f.is_finite() {
                    return Err(S::Error::custom(format!(
                        "non-finite number {} cannot be encoded",
                        f
                    )));
                }
                serializer.serialize_f64(*f)
            }
            DynamicDocument::String(s) => serializer.serialize_str(s),
            DynamicDocument::Bool(b) => serializer.serialize_bool(*b),
            DynamicDocument::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DynamicDocument::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DynamicDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DynamicDocument::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for DynamicDocument {
    fn from(value: &str) -> Self {
        DynamicDocument::String(value.to_string())
    }
}

impl From<String> for DynamicDocument {
    fn from(value: String) -> Self {
        DynamicDocument::String(value)
    }
}

impl From<i64> for DynamicDocument {
    fn from(value: i64) -> Self {
        DynamicDocument::Int(value)
    }
}

impl From<f64> for DynamicDocument {
    fn from(value: f64) -> Self {
        DynamicDocument::Float(value)
    }
}

impl From<bool> for DynamicDocument {
    fn from(value: bool) -> Self {
        DynamicDocument::Bool(value)
    }
}

impl From<Vec<DynamicDocument>> for DynamicDocument {
    fn from(value: Vec<DynamicDocument>) -> Self {
        DynamicDocument::Array(value)
    }
}

impl From<BTreeMap<String, DynamicDocument>> for DynamicDocument {
    fn from(value: BTreeMap<String, DynamicDocument>) -> Self {
        DynamicDocument::Object(value)
    }
}
