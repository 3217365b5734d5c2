//! Wire model for test result values.
//!
//! The backend sends every measured value as `{"type": ..., "data": ...}`.
//! Decoding is lenient: an unknown `type`, or a known one whose `data` has
//! the wrong shape, is kept as [`TypedValue::Other`] so it can still be shown
//! verbatim. Encoding writes the same `{type, data}` form back.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A typed result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValue", into = "RawValue")]
pub enum TypedValue {
    String(String),
    Integer(Number),
    Float(Number),
    /// ISO-8601 duration text, decoded at render time.
    Duration(String),
    /// Legacy list payload, superseded by `Ndarray`.
    List(Value),
    Ndarray(NdArray),
    /// Base64-encoded PNG.
    Image(String),
    Other { kind: String, data: Value },
}

/// An n-dimensional array value stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    pub shape: Vec<usize>,
    pub entries: Vec<TypedValue>,
}

impl NdArray {
    /// Number of dimensions.
    pub fn order(&self) -> usize {
        self.shape.len()
    }

    /// Number of entries implied by the shape. The empty shape is a scalar.
    /// `None` when the product does not fit in `usize`.
    pub fn volume(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
    }

    /// Whether the shape describes exactly the entries present.
    pub fn is_consistent(&self) -> bool {
        self.volume() == Some(self.entries.len())
    }
}

/// Value type tags as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Duration,
    List,
    Ndarray,
    Image,
}

impl ValueKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "duration" => Some(Self::Duration),
            "list" => Some(Self::List),
            "ndarray" => Some(Self::Ndarray),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Duration => "duration",
            Self::List => "list",
            Self::Ndarray => "ndarray",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl TypedValue {
    /// The wire tag of this value.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::String(_) => ValueKind::String.tag(),
            Self::Integer(_) => ValueKind::Integer.tag(),
            Self::Float(_) => ValueKind::Float.tag(),
            Self::Duration(_) => ValueKind::Duration.tag(),
            Self::List(_) => ValueKind::List.tag(),
            Self::Ndarray(_) => ValueKind::Ndarray.tag(),
            Self::Image(_) => ValueKind::Image.tag(),
            Self::Other { kind, .. } => kind,
        }
    }

    pub fn kind(&self) -> Option<ValueKind> {
        ValueKind::from_tag(self.type_tag())
    }
}

/// Untyped `{type, data}` pair used for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawValue {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl From<RawValue> for TypedValue {
    fn from(raw: RawValue) -> Self {
        let RawValue { kind, data } = raw;
        let decoded = match ValueKind::from_tag(&kind) {
            Some(ValueKind::String) => data.as_str().map(|s| Self::String(s.to_string())),
            Some(ValueKind::Integer) => match &data {
                Value::Number(n) if !n.is_f64() => Some(Self::Integer(n.clone())),
                _ => None,
            },
            Some(ValueKind::Float) => match &data {
                Value::Number(n) => Some(Self::Float(n.clone())),
                _ => None,
            },
            Some(ValueKind::Duration) => data.as_str().map(|s| Self::Duration(s.to_string())),
            Some(ValueKind::List) => Some(Self::List(data.clone())),
            Some(ValueKind::Ndarray) => serde_json::from_value::<NdArray>(data.clone())
                .ok()
                .map(Self::Ndarray),
            Some(ValueKind::Image) => data.as_str().map(|s| Self::Image(s.to_string())),
            None => None,
        };
        decoded.unwrap_or(Self::Other { kind, data })
    }
}

impl From<TypedValue> for RawValue {
    fn from(value: TypedValue) -> Self {
        let kind = value.type_tag().to_string();
        let data = match value {
            TypedValue::String(s) | TypedValue::Duration(s) | TypedValue::Image(s) => {
                Value::String(s)
            }
            TypedValue::Integer(n) | TypedValue::Float(n) => Value::Number(n),
            TypedValue::List(v) => v,
            TypedValue::Ndarray(arr) => serde_json::to_value(arr).unwrap_or(Value::Null),
            TypedValue::Other { data, .. } => data,
        };
        Self { kind, data }
    }
}

/// Id of the submission a reference value was taken from.
///
/// The backend sends it as a number or as a string. The wire form is kept so
/// that an id is sent back exactly as it was received (`"007"` stays a
/// string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    Number(Number),
    Text(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for SourceId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> TypedValue {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn decodes_scalars() {
        assert_eq!(
            decode(json!({"type": "string", "data": "ok"})),
            TypedValue::String("ok".into())
        );
        assert_eq!(
            decode(json!({"type": "integer", "data": 42})),
            TypedValue::Integer(42.into())
        );
        assert!(matches!(
            decode(json!({"type": "float", "data": 1.5})),
            TypedValue::Float(_)
        ));
    }

    #[test]
    fn decodes_nested_ndarray() {
        let value = decode(json!({
            "type": "ndarray",
            "data": {
                "shape": [2],
                "entries": [
                    {"type": "integer", "data": 1},
                    {"type": "integer", "data": 2}
                ]
            }
        }));
        let TypedValue::Ndarray(arr) = value else {
            panic!("expected ndarray");
        };
        assert_eq!(arr.shape, vec![2]);
        assert_eq!(arr.entries.len(), 2);
        assert!(arr.is_consistent());
    }

    #[test]
    fn unknown_type_is_kept_verbatim() {
        let value = decode(json!({"type": "matrix", "data": [1, 2]}));
        assert_eq!(
            value,
            TypedValue::Other {
                kind: "matrix".into(),
                data: json!([1, 2])
            }
        );
        assert_eq!(value.type_tag(), "matrix");
        assert_eq!(value.kind(), None);
    }

    #[test]
    fn mismatched_data_falls_back_to_other() {
        let value = decode(json!({"type": "integer", "data": "seven"}));
        assert!(matches!(value, TypedValue::Other { .. }));
        let value = decode(json!({"type": "ndarray", "data": {"shape": "x"}}));
        assert!(matches!(value, TypedValue::Other { .. }));
    }

    #[test]
    fn encodes_back_to_wire_form() {
        let wire = json!({"type": "duration", "data": "PT1S"});
        let value = decode(wire.clone());
        assert_eq!(serde_json::to_value(&value).unwrap(), wire);
    }

    #[test]
    fn empty_shape_has_unit_volume() {
        let arr = NdArray {
            shape: vec![],
            entries: vec![TypedValue::String("x".into())],
        };
        assert_eq!(arr.volume(), Some(1));
        assert!(arr.is_consistent());
    }

    #[test]
    fn overflowing_shape_is_inconsistent() {
        let arr = NdArray {
            shape: vec![1 << 32, 1 << 32, 1 << 32],
            entries: vec![],
        };
        assert_eq!(arr.volume(), None);
        assert!(!arr.is_consistent());
    }

    #[test]
    fn source_id_accepts_numbers_and_strings() {
        let id: SourceId = serde_json::from_value(json!(17)).unwrap();
        assert_eq!(id, SourceId::from(17));
        assert_eq!(id.to_string(), "17");
        let id: SourceId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(id.to_string(), "abc");
        assert_eq!(serde_json::to_value(SourceId::from(5)).unwrap(), json!(5));
    }

    #[test]
    fn source_id_keeps_its_wire_form() {
        let id: SourceId = serde_json::from_value(json!("007")).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("007"));
        assert_eq!(serde_json::to_value(SourceId::from("12")).unwrap(), json!("12"));
    }
}
