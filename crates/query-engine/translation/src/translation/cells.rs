//! Decode result cells, received as text, into tagged values.

use query_engine_sql::sql::{Kind, Value};

use super::arrays::{self, ArrayElement};

/// Decode a single cell of a column mapped to `kind`.
///
/// `None` is a null sent by the server and decodes to `Null` whatever the column kind. A cell
/// that cannot be read as its kind decodes to `Invalid` and leaves sibling cells untouched.
pub fn decode_cell(kind: Kind, cell: Option<&[u8]>) -> Value {
    let Some(bytes) = cell else {
        return Value::Null;
    };
    let Ok(text) = std::str::from_utf8(bytes) else {
        tracing::debug!(%kind, "cell is not valid utf-8");
        return Value::Invalid;
    };

    let value = if kind.is_array() {
        decode_array(kind, text)
    } else {
        decode_scalar(kind, text)
    };
    value.unwrap_or(Value::Invalid)
}

fn decode_scalar(kind: Kind, text: &str) -> Option<Value> {
    match kind {
        Kind::Int => parse_int(text).map(Value::Int),
        Kind::Bool => parse_bool(text).map(Value::Bool),
        Kind::Float => parse_float(text).map(Value::Float),
        Kind::String => Some(Value::String(text.to_string())),
        _ => None,
    }
}

fn decode_array(kind: Kind, literal: &str) -> Option<Value> {
    let elements = match arrays::split_elements(literal) {
        Ok(elements) => elements,
        Err(error) => {
            tracing::debug!(%kind, %error, "cell is not a valid array literal");
            return None;
        }
    };

    // array payloads have no room for null elements
    let texts = elements
        .iter()
        .map(|element| match element {
            ArrayElement::Text(text) => Some(text.as_ref()),
            ArrayElement::Null => None,
        })
        .collect::<Option<Vec<&str>>>()?;

    match kind.element() {
        Kind::Int => texts
            .into_iter()
            .map(parse_int)
            .collect::<Option<_>>()
            .map(Value::IntArray),
        Kind::Bool => texts
            .into_iter()
            .map(parse_bool)
            .collect::<Option<_>>()
            .map(Value::BoolArray),
        Kind::Float => texts
            .into_iter()
            .map(parse_float)
            .collect::<Option<_>>()
            .map(Value::FloatArray),
        Kind::String => Some(Value::StringArray(
            texts.into_iter().map(str::to_string).collect(),
        )),
        _ => None,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("t") || text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("f") || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}
