use num_traits::FromPrimitive;

use crate::span::Span;

/// All JSON value types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JsonType {
    String,
    Object,
    Array,
    Number,
    Bool,
    Null,
}

/// The two JSON container types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Object,
    Array,
}

/// A numeric JSON value, either an integer or a decimal.
///
/// The parser produces [`Numeric::Integer`] if and only if the lexeme has
/// neither a fractional part nor an exponent. Integers that do not fit into
/// an `i64` saturate to `i64::MIN`/`i64::MAX`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
}

impl Numeric {
    /// Get the value as any primitive integer type. Returns `None` if the
    /// value is a decimal or does not fit into `I`.
    pub fn as_integer<I>(&self) -> Option<I>
    where
        I: FromPrimitive,
    {
        match *self {
            Numeric::Integer(i) => I::from_i64(i),
            Numeric::Decimal(_) => None,
        }
    }

    /// Get the value as a float, converting integers lossily.
    pub fn as_decimal(&self) -> f64 {
        match *self {
            Numeric::Integer(i) => i as f64,
            Numeric::Decimal(d) => d,
        }
    }
}

/// A parsed JSON value as handed to [`JsonBuilder`](crate::JsonBuilder)
/// callbacks.
///
/// Strings are [`Span`]s into the parsed input and must be duplicated if
/// they are kept beyond the callback. For the container variants the handle
/// is the one the builder returned from its
/// [`open`](crate::JsonBuilder::open) call for this container.
#[derive(Debug, PartialEq)]
pub enum Value<'a, H> {
    String(Span<'a>),
    Number(Numeric),
    Bool(bool),
    Null,
    Object(H),
    Array(H),
}

impl<H> Value<'_, H> {
    /// The JSON type of this value.
    pub fn json_type(&self) -> JsonType {
        match self {
            Value::String(_) => JsonType::String,
            Value::Number(_) => JsonType::Number,
            Value::Bool(_) => JsonType::Bool,
            Value::Null => JsonType::Null,
            Value::Object(_) => JsonType::Object,
            Value::Array(_) => JsonType::Array,
        }
    }
}

/// The key under which a value hangs in its enclosing container: a member
/// id in an object or a 0-based index in an array. Which variant is passed
/// to a callback is determined by the container currently being parsed.
#[derive(Copy, Clone, Debug)]
pub enum Key<'a> {
    Id(Span<'a>),
    Index(usize),
}
