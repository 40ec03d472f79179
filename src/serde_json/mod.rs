use serde_json::{Map, Number, Value as JsonValue};

use crate::builder::JsonBuilder;
use crate::error::{ErrorCode, ParseError};
use crate::parser::{self, Cursor};
use crate::span::Span;
use crate::value::{ContainerKind, JsonType, Key, Numeric, Value};

/// A [`JsonBuilder`] whose handles are [`serde_json::Value`] containers
/// under construction.
struct ValueBuilder;

impl JsonBuilder for ValueBuilder {
    type Handle = JsonValue;

    fn open(
        &mut self,
        kind: ContainerKind,
        _parent: &mut JsonValue,
        _parent_tag: u32,
        _key: &Key<'_>,
    ) -> Result<(JsonValue, u32), ErrorCode> {
        let handle = match kind {
            ContainerKind::Object => JsonValue::Object(Map::new()),
            ContainerKind::Array => JsonValue::Array(vec![]),
        };
        Ok((handle, 0))
    }

    fn push(
        &mut self,
        array: &mut JsonValue,
        _tag: u32,
        _index: usize,
        value: Value<'_, JsonValue>,
    ) -> Result<(), ErrorCode> {
        match array.as_array_mut() {
            Some(a) => {
                a.push(to_value(value));
                Ok(())
            }
            None => Err(ErrorCode::UnexpectedKey),
        }
    }

    fn set(
        &mut self,
        object: &mut JsonValue,
        _tag: u32,
        id: Span<'_>,
        value: Value<'_, JsonValue>,
    ) -> Result<(), ErrorCode> {
        match object.as_object_mut() {
            Some(m) => {
                m.insert(id.decode(), to_value(value));
                Ok(())
            }
            None => Err(ErrorCode::UnexpectedKey),
        }
    }
}

fn to_value(value: Value<'_, JsonValue>) -> JsonValue {
    match value {
        Value::String(span) => JsonValue::String(span.decode()),
        Value::Number(Numeric::Integer(i)) => JsonValue::Number(i.into()),
        Value::Number(Numeric::Decimal(d)) => Number::from_f64(d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Null => JsonValue::Null,
        Value::Object(v) | Value::Array(v) => v,
    }
}

/// Parse a JSON text into a Serde JSON [`Value`](serde_json::Value).
///
/// For testing and compatibility; the builder protocol does all the work,
/// Serde itself is never involved in parsing.
///
/// ```
/// use serde_json::json;
/// use spanson::serde_json::from_str;
///
/// let expected = json!({ "name": "Elvis" });
/// let actual = from_str(r#"{"name": "Elvis"}"#).unwrap();
/// assert_eq!(expected, actual);
/// ```
pub fn from_str(json: &str) -> Result<JsonValue, ParseError> {
    let mut cur = Cursor::new(json);
    parser::skip_ws(&mut cur);

    let ty = parser::peek_type(&cur).map_err(|c| ParseError::new(c, json, cur.pos()))?;
    let mut builder = ValueBuilder;

    let result = match ty {
        JsonType::Object => {
            let mut root = JsonValue::Object(Map::new());
            parser::parse_object(&mut builder, &mut root, 0, &mut cur).map(|_| root)
        }
        JsonType::Array => {
            let mut root = JsonValue::Array(vec![]);
            parser::parse_array(&mut builder, &mut root, 0, &mut cur).map(|_| root)
        }
        _ => parser::parse_primitive(&mut cur).map(to_value),
    };
    result.map_err(|c| ParseError::new(c, json, cur.pos()))
}

#[cfg(test)]
mod test {
    use crate::serde_json::from_str;
    use serde_json::{from_str as serde_from_str, Value};

    /// Test that an empty object is parsed correctly
    #[test]
    fn empty_object() {
        let json = r#"{}"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that a simple object is parsed correctly
    #[test]
    fn simple_object() {
        let json = r#"{"name": "Elvis"}"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that an empty array is parsed correctly
    #[test]
    fn empty_array() {
        let json = r#"[]"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that a simple array is parsed correctly
    #[test]
    fn simple_array() {
        let json = r#"["Elvis", "Max"]"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that an array with mixed values is parsed correctly
    #[test]
    fn mixed_array() {
        let json = r#"["Elvis", 132, "Max", 80.67]"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that embedded objects are parsed correctly
    #[test]
    fn embedded_objects() {
        let json = r#"{
            "name": "Elvis",
            "address": {"street": "Graceland", "city": "Memphis"},
            "albums": [
                "Elvis Presley",
                "Elvis",
                "Elvis' Christmas Album",
                "Elvis Is Back!",
                {
                    "title": "His Hand in Mine",
                    "year": 1960
                },
                "... any many others :)"
            ]
        }"#;
        assert_eq!(serde_from_str::<Value>(json).unwrap(), from_str(json).unwrap());
    }

    /// Test that primitive roots are parsed correctly
    #[test]
    fn primitive_roots() {
        for json in ["null", "true", "false", "628", "80.67", r#""Elvis""#] {
            assert_eq!(
                serde_from_str::<Value>(json).unwrap(),
                from_str(json).unwrap(),
                "{json}"
            );
        }
    }
}
