//! Tagged values, used both for query parameters and for decoded result cells.

use serde::Serialize;

/// The type tag of a [`Value`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, enum_iterator::Sequence,
)]
pub enum Kind {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "blob")]
    Blob,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "bool[]")]
    BoolArray,
    #[serde(rename = "float[]")]
    FloatArray,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "blob[]")]
    BlobArray,
    #[serde(rename = "invalid")]
    Invalid,
}

impl Kind {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Kind::IntArray | Kind::BoolArray | Kind::FloatArray | Kind::StringArray | Kind::BlobArray
        )
    }

    /// The scalar kind held by an array kind. Scalars are their own element kind.
    pub fn element(self) -> Kind {
        match self {
            Kind::IntArray => Kind::Int,
            Kind::BoolArray => Kind::Bool,
            Kind::FloatArray => Kind::Float,
            Kind::StringArray => Kind::String,
            Kind::BlobArray => Kind::Blob,
            scalar => scalar,
        }
    }

    /// The array kind holding elements of this kind, if there is one.
    pub fn array_of(self) -> Option<Kind> {
        match self {
            Kind::Int => Some(Kind::IntArray),
            Kind::Bool => Some(Kind::BoolArray),
            Kind::Float => Some(Kind::FloatArray),
            Kind::String => Some(Kind::StringArray),
            Kind::Blob => Some(Kind::BlobArray),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Int => "int",
            Kind::Bool => "bool",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Blob => "blob",
            Kind::IntArray => "int[]",
            Kind::BoolArray => "bool[]",
            Kind::FloatArray => "float[]",
            Kind::StringArray => "string[]",
            Kind::BlobArray => "blob[]",
            Kind::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value carrying its own type tag.
///
/// The payload is always the one matching the tag. `Invalid` carries nothing and is never
/// a null: it marks a cell or parameter that could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Float(f64),
    String(String),
    Blob(Vec<u8>),
    IntArray(Vec<i64>),
    BoolArray(Vec<bool>),
    FloatArray(Vec<f64>),
    StringArray(Vec<String>),
    BlobArray(Vec<Vec<u8>>),
    Invalid,
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Int(_) => Kind::Int,
            Value::Bool(_) => Kind::Bool,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Blob(_) => Kind::Blob,
            Value::IntArray(_) => Kind::IntArray,
            Value::BoolArray(_) => Kind::BoolArray,
            Value::FloatArray(_) => Kind::FloatArray,
            Value::StringArray(_) => Kind::StringArray,
            Value::BlobArray(_) => Kind::BlobArray,
            Value::Invalid => Kind::Invalid,
        }
    }

    /// Number of elements of an array value, 0 for scalars.
    pub fn element_count(&self) -> usize {
        match self {
            Value::IntArray(elements) => elements.len(),
            Value::BoolArray(elements) => elements.len(),
            Value::FloatArray(elements) => elements.len(),
            Value::StringArray(elements) => elements.len(),
            Value::BlobArray(elements) => elements.len(),
            _ => 0,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Value::IntArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Value::BoolArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f64]> {
        match self {
            Value::FloatArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Value::StringArray(values) => Some(values),
            _ => None,
        }
    }

    /// JSON rendering of the value. Invalid values have none.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;
        let json = match self {
            Value::Null => Json::Null,
            Value::Int(value) => Json::from(*value),
            Value::Bool(value) => Json::Bool(*value),
            Value::Float(value) => Json::from(*value),
            Value::String(value) => Json::String(value.clone()),
            Value::Blob(bytes) => Json::from(bytes.clone()),
            Value::IntArray(values) => Json::from(values.clone()),
            Value::BoolArray(values) => Json::from(values.clone()),
            Value::FloatArray(values) => Json::from(values.clone()),
            Value::StringArray(values) => Json::from(values.clone()),
            Value::BlobArray(values) => Json::from(values.clone()),
            Value::Invalid => return None,
        };
        Some(json)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn list<T: std::fmt::Display>(
            f: &mut std::fmt::Formatter<'_>,
            elements: &[T],
        ) -> std::fmt::Result {
            f.write_str("{")?;
            for (index, element) in elements.iter().enumerate() {
                if index > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{element}")?;
            }
            f.write_str("}")
        }

        match self {
            Value::Null => f.write_str("null"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::Blob(bytes) => write!(f, "<blob: {} bytes>", bytes.len()),
            Value::IntArray(values) => list(f, values),
            Value::BoolArray(values) => list(f, values),
            Value::FloatArray(values) => list(f, values),
            Value::StringArray(values) => list(f, values),
            Value::BlobArray(values) => write!(f, "<blob[]: {} elements>", values.len()),
            Value::Invalid => f.write_str("<invalid>"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<i64>> for Value {
    fn from(values: Vec<i64>) -> Self {
        Value::IntArray(values)
    }
}

impl From<Vec<bool>> for Value {
    fn from(values: Vec<bool>) -> Self {
        Value::BoolArray(values)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::FloatArray(values)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::StringArray(values)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::{Kind, Value};

    #[test]
    fn kind_matches_payload() {
        assert_eq!(Value::from(3).kind(), Kind::Int);
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::from(vec![1.5, 2.5]).kind(), Kind::FloatArray);
        assert_eq!(Value::from(None::<i64>).kind(), Kind::Null);
        assert_eq!(Value::Invalid.kind(), Kind::Invalid);
    }

    #[test]
    fn element_count_is_zero_for_scalars() {
        assert_eq!(Value::from(7).element_count(), 0);
        assert_eq!(Value::Null.element_count(), 0);
        assert_eq!(Value::from(vec![1_i64, 2, 3]).element_count(), 3);
        assert_eq!(Value::StringArray(vec![]).element_count(), 0);
    }

    #[test]
    fn array_kinds_pair_with_their_elements() {
        for kind in enum_iterator::all::<Kind>() {
            if let Some(array) = kind.array_of() {
                assert!(array.is_array());
                assert_eq!(array.element(), kind);
            }
        }
        assert_eq!(Kind::Invalid.array_of(), None);
    }

    #[test]
    fn invalid_is_not_null() {
        assert!(!Value::Invalid.is_null());
        assert_eq!(Value::Invalid.to_json(), None);
        assert_eq!(Value::Null.to_json(), Some(serde_json::Value::Null));
    }

    #[test]
    fn display_renders_arrays_as_literals() {
        assert_eq!(Value::from(vec![1_i64, 2, 3]).to_string(), "{1,2,3}");
        assert_eq!(Value::from(vec![true, false]).to_string(), "{true,false}");
        assert_eq!(Value::Invalid.to_string(), "<invalid>");
    }
}
