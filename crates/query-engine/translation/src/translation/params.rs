//! Serialize tagged parameters into the text form sent alongside a query.

use std::borrow::Cow;

use query_engine_sql::sql::Value;

use super::error::Error;

/// A parameter ready to be bound positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireParam {
    /// A SQL NULL.
    Null,
    Text(String),
}

impl WireParam {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireParam::Null => None,
            WireParam::Text(text) => Some(text),
        }
    }
}

/// Serialize every parameter, in order. Positions in errors are 1-based, like `$1`.
pub fn serialize_params(params: &[Value]) -> Result<Vec<WireParam>, Error> {
    params
        .iter()
        .enumerate()
        .map(|(index, value)| serialize_param(index + 1, value))
        .collect()
}

pub fn serialize_param(position: usize, value: &Value) -> Result<WireParam, Error> {
    let text = match value {
        Value::Null => return Ok(WireParam::Null),
        Value::Int(value) => value.to_string(),
        Value::Bool(value) => bool_text(*value).to_string(),
        Value::Float(value) => float_text(*value),
        Value::String(value) => value.clone(),
        Value::IntArray(values) => array_text(values.iter().map(|value| value.to_string().into())),
        Value::BoolArray(values) => {
            array_text(values.iter().map(|value| Cow::Borrowed(bool_text(*value))))
        }
        Value::FloatArray(values) => array_text(values.iter().map(|value| float_text(*value).into())),
        Value::StringArray(values) => array_text(values.iter().map(|value| quote_element(value))),
        Value::Blob(_) | Value::BlobArray(_) => {
            return Err(Error::UnsupportedParameter {
                position,
                kind: value.kind(),
            })
        }
        Value::Invalid => return Err(Error::InvalidParameter { position }),
    };
    Ok(WireParam::Text(text))
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Shortest text that reads back as the same float, with the spellings the server uses for
/// the special values.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        value.to_string()
    }
}

fn array_text<'a>(elements: impl Iterator<Item = Cow<'a, str>>) -> String {
    let mut text = String::from("{");
    for (index, element) in elements.enumerate() {
        if index > 0 {
            text.push(',');
        }
        text.push_str(&element);
    }
    text.push('}');
    text
}

/// Quote a string element when reading it back unquoted would change it.
fn quote_element(element: &str) -> Cow<'_, str> {
    let needs_quotes = element.is_empty()
        || element.eq_ignore_ascii_case("null")
        || element
            .chars()
            .any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace());

    if !needs_quotes {
        return Cow::Borrowed(element);
    }

    let mut quoted = String::with_capacity(element.len() + 2);
    quoted.push('"');
    for c in element.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_sql::sql::Kind;
    use similar_asserts::assert_eq;

    fn text(value: Value) -> String {
        match serialize_param(1, &value).unwrap() {
            WireParam::Text(text) => text,
            WireParam::Null => panic!("expected text"),
        }
    }

    #[test]
    fn scalars_use_canonical_text() {
        assert_eq!(text(Value::Int(-42)), "-42");
        assert_eq!(text(Value::Bool(true)), "true");
        assert_eq!(text(Value::Bool(false)), "false");
        assert_eq!(text(Value::Float(0.1)), "0.1");
        assert_eq!(text(Value::Float(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(text(Value::Float(f64::NAN)), "NaN");
        assert_eq!(text(Value::from("olá, mundo")), "olá, mundo");
    }

    #[test]
    fn null_is_bound_as_sql_null() {
        assert_eq!(serialize_param(1, &Value::Null), Ok(WireParam::Null));
        assert_eq!(WireParam::Null.as_text(), None);
    }

    #[test]
    fn arrays_are_brace_delimited() {
        assert_eq!(text(Value::from(vec![1_i64, 2, 3])), "{1,2,3}");
        assert_eq!(text(Value::from(vec![true, false])), "{true,false}");
        assert_eq!(text(Value::from(vec![1.5, f64::INFINITY])), "{1.5,Infinity}");
        assert_eq!(text(Value::IntArray(vec![])), "{}");
    }

    #[test]
    fn string_elements_are_quoted_only_when_needed() {
        let value = Value::from(vec![
            "plain".to_string(),
            "a,b".to_string(),
            String::new(),
            "NULL".to_string(),
            "say \"hi\"".to_string(),
            "back\\slash".to_string(),
        ]);
        assert_eq!(
            text(value),
            r#"{plain,"a,b","","NULL","say \"hi\"","back\\slash"}"#
        );
    }

    #[test]
    fn unsupported_kinds_are_rejected() {
        assert_eq!(
            serialize_params(&[Value::Int(1), Value::Blob(vec![1, 2])]),
            Err(Error::UnsupportedParameter {
                position: 2,
                kind: Kind::Blob
            })
        );
        assert_eq!(
            serialize_params(&[Value::Invalid]),
            Err(Error::InvalidParameter { position: 1 })
        );
    }
}
