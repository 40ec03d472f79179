use crate::builder::JsonBuilder;
use crate::error::{ErrorCode, ParseError};
use crate::span::Span;
use crate::value::{ContainerKind, JsonType, Key, Numeric, Value};

/// A byte cursor over the input text. The parser never allocates; it only
/// moves this cursor and cuts [`Span`]s out of the input.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    /// Byte offset of the cursor into the input.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// The byte under the cursor, or `None` at the end of the input.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn starts_with(&self, lit: &str) -> bool {
        self.input.as_bytes()[self.pos..].starts_with(lit.as_bytes())
    }

    fn slice(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }
}

/// Parse a JSON object into caller-defined storage.
///
/// The input must start directly with the opening `{`. `root` and
/// `root_tag` are the handle/tag pair for the outermost object, as if the
/// builder's [`open`](JsonBuilder::open) had returned them. Input after the
/// closing `}` is not inspected.
pub fn parse_object_into<B>(
    builder: &mut B,
    input: &str,
    root: &mut B::Handle,
    root_tag: u32,
) -> Result<(), ParseError>
where
    B: JsonBuilder,
{
    let mut cur = Cursor::new(input);
    parse_object(builder, root, root_tag, &mut cur)
        .map_err(|code| ParseError::new(code, input, cur.pos()))
}

/// Parse a JSON array into caller-defined storage.
///
/// The counterpart of [`parse_object_into`] for a top-level array.
pub fn parse_array_into<B>(
    builder: &mut B,
    input: &str,
    root: &mut B::Handle,
    root_tag: u32,
) -> Result<(), ParseError>
where
    B: JsonBuilder,
{
    let mut cur = Cursor::new(input);
    parse_array(builder, root, root_tag, &mut cur)
        .map_err(|code| ParseError::new(code, input, cur.pos()))
}

/// Determine the type of the next value from its first byte, without moving
/// the cursor.
pub(crate) fn peek_type(cur: &Cursor<'_>) -> Result<JsonType, ErrorCode> {
    match cur.peek() {
        Some(b'{') => Ok(JsonType::Object),
        Some(b'[') => Ok(JsonType::Array),
        Some(b'"') => Ok(JsonType::String),
        Some(b't') | Some(b'f') => Ok(JsonType::Bool),
        Some(b'n') => Ok(JsonType::Null),
        Some(b'-') | Some(b'0'..=b'9') => Ok(JsonType::Number),
        _ => Err(ErrorCode::ExpectedValue),
    }
}

pub(crate) fn skip_ws(cur: &mut Cursor<'_>) {
    while matches!(cur.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
        cur.bump();
    }
}

fn consume_comma(cur: &mut Cursor<'_>) -> Result<(), ErrorCode> {
    if cur.peek() != Some(b',') {
        return Err(ErrorCode::ExpectedComma);
    }
    cur.bump();
    Ok(())
}

fn consume_colon(cur: &mut Cursor<'_>) -> Result<(), ErrorCode> {
    if cur.peek() != Some(b':') {
        return Err(ErrorCode::ExpectedColon);
    }
    cur.bump();
    Ok(())
}

pub(crate) fn parse_object<'a, B>(
    builder: &mut B,
    this: &mut B::Handle,
    this_tag: u32,
    cur: &mut Cursor<'a>,
) -> Result<(), ErrorCode>
where
    B: JsonBuilder,
{
    if cur.peek() != Some(b'{') {
        return Err(ErrorCode::ExpectedOpenObject);
    }
    cur.bump();

    // `{}` has no members at all
    if cur.peek() != Some(b'}') {
        loop {
            if cur.peek().is_none() {
                return Err(ErrorCode::UnexpectedEof);
            }

            skip_ws(cur);
            let id = parse_string(cur)?;
            skip_ws(cur);
            consume_colon(cur)?;
            skip_ws(cur);

            let key = Key::Id(id);
            match peek_type(cur)? {
                JsonType::Object => {
                    let (mut child, child_tag) =
                        builder.open(ContainerKind::Object, this, this_tag, &key)?;
                    parse_object(builder, &mut child, child_tag, cur)?;
                    builder.set(this, this_tag, id, Value::Object(child))?;
                }
                JsonType::Array => {
                    let (mut child, child_tag) =
                        builder.open(ContainerKind::Array, this, this_tag, &key)?;
                    parse_array(builder, &mut child, child_tag, cur)?;
                    builder.set(this, this_tag, id, Value::Array(child))?;
                }
                _ => {
                    let value = parse_primitive(cur)?;
                    builder.set(this, this_tag, id, value)?;
                }
            }

            skip_ws(cur);
            if consume_comma(cur).is_err() {
                break;
            }
        }
    }

    if cur.peek() != Some(b'}') {
        return Err(ErrorCode::ExpectedCloseObject);
    }
    cur.bump();
    Ok(())
}

pub(crate) fn parse_array<'a, B>(
    builder: &mut B,
    this: &mut B::Handle,
    this_tag: u32,
    cur: &mut Cursor<'a>,
) -> Result<(), ErrorCode>
where
    B: JsonBuilder,
{
    if cur.peek() != Some(b'[') {
        return Err(ErrorCode::ExpectedOpenArray);
    }
    cur.bump();

    let mut index = 0;
    if cur.peek() != Some(b']') {
        loop {
            skip_ws(cur);

            let key = Key::Index(index);
            match peek_type(cur)? {
                JsonType::Object => {
                    let (mut child, child_tag) =
                        builder.open(ContainerKind::Object, this, this_tag, &key)?;
                    parse_object(builder, &mut child, child_tag, cur)?;
                    builder.push(this, this_tag, index, Value::Object(child))?;
                }
                JsonType::Array => {
                    let (mut child, child_tag) =
                        builder.open(ContainerKind::Array, this, this_tag, &key)?;
                    parse_array(builder, &mut child, child_tag, cur)?;
                    builder.push(this, this_tag, index, Value::Array(child))?;
                }
                _ => {
                    let value = parse_primitive(cur)?;
                    builder.push(this, this_tag, index, value)?;
                }
            }
            index += 1;

            skip_ws(cur);
            if consume_comma(cur).is_err() {
                break;
            }
        }
    }

    if cur.peek() != Some(b']') {
        return Err(ErrorCode::ExpectedCloseArray);
    }
    cur.bump();
    Ok(())
}

/// Parse a string, number, boolean or null into a [`Value`].
pub(crate) fn parse_primitive<'a, H>(cur: &mut Cursor<'a>) -> Result<Value<'a, H>, ErrorCode> {
    match peek_type(cur)? {
        JsonType::String => Ok(Value::String(parse_string(cur)?)),
        JsonType::Number => Ok(Value::Number(parse_number(cur)?)),
        JsonType::Bool => Ok(Value::Bool(parse_bool(cur)?)),
        JsonType::Null => {
            parse_null(cur)?;
            Ok(Value::Null)
        }
        JsonType::Object | JsonType::Array => Err(ErrorCode::ExpectedPrimitive),
    }
}

/// Scan a string token and cut it out of the input as a [`Span`], quotes
/// included. Escape sequences are checked for shape but not decoded.
pub(crate) fn parse_string<'a>(cur: &mut Cursor<'a>) -> Result<Span<'a>, ErrorCode> {
    if cur.peek() != Some(b'"') {
        return Err(ErrorCode::ExpectedQuote);
    }
    let start = cur.pos();
    cur.bump();

    loop {
        match cur.peek() {
            None => return Err(ErrorCode::UnexpectedEof),
            Some(b'"') => break,
            Some(b'\\') => {
                cur.bump();
                match cur.peek() {
                    None => return Err(ErrorCode::UnexpectedEof),
                    Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => cur.bump(),
                    Some(b'u') => {
                        cur.bump();
                        for _ in 0..4 {
                            match cur.peek() {
                                None => return Err(ErrorCode::UnexpectedEof),
                                Some(h) if h.is_ascii_hexdigit() => cur.bump(),
                                Some(_) => return Err(ErrorCode::ExpectedHex),
                            }
                        }
                    }
                    Some(_) => return Err(ErrorCode::ExpectedEscapedChar),
                }
            }
            Some(_) => cur.bump(),
        }
    }

    cur.bump();
    Ok(Span::new(cur.slice(start)))
}

/// Scan a number lexeme and convert it once: integer if it has neither a
/// fractional part nor an exponent, decimal otherwise. The lexeme ends at
/// the first byte that cannot continue it.
pub(crate) fn parse_number(cur: &mut Cursor<'_>) -> Result<Numeric, ErrorCode> {
    let start = cur.pos();
    let mut is_decimal = false;

    if cur.peek() == Some(b'-') {
        cur.bump();
    }

    if cur.peek() == Some(b'0') {
        cur.bump();
    } else if matches!(cur.peek(), Some(b'1'..=b'9')) {
        cur.bump();
        while matches!(cur.peek(), Some(b'0'..=b'9')) {
            cur.bump();
        }
    } else {
        return Err(ErrorCode::ExpectedDigits);
    }

    if cur.peek() == Some(b'.') {
        is_decimal = true;
        cur.bump();
        if !matches!(cur.peek(), Some(b'0'..=b'9')) {
            return Err(ErrorCode::ExpectedDigits);
        }
        while matches!(cur.peek(), Some(b'0'..=b'9')) {
            cur.bump();
        }
    }

    if matches!(cur.peek(), Some(b'e' | b'E')) {
        is_decimal = true;
        cur.bump();
        if matches!(cur.peek(), Some(b'+' | b'-')) {
            cur.bump();
        }
        if !matches!(cur.peek(), Some(b'0'..=b'9')) {
            return Err(ErrorCode::ExpectedDigits);
        }
        while matches!(cur.peek(), Some(b'0'..=b'9')) {
            cur.bump();
        }
    }

    let lexeme = cur.slice(start);
    if is_decimal {
        let d = lexeme.parse().map_err(|_| ErrorCode::ExpectedDigits)?;
        Ok(Numeric::Decimal(d))
    } else {
        let i = match btoi::btoi(lexeme.as_bytes()) {
            Ok(i) => i,
            // the lexeme is digits-only here, so a failure means overflow
            Err(_) => {
                if lexeme.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                }
            }
        };
        Ok(Numeric::Integer(i))
    }
}

pub(crate) fn parse_bool(cur: &mut Cursor<'_>) -> Result<bool, ErrorCode> {
    if cur.remaining() < 4 {
        return Err(ErrorCode::UnexpectedEof);
    }
    if cur.starts_with("true") {
        cur.advance(4);
        return Ok(true);
    }

    if cur.remaining() < 5 {
        return Err(ErrorCode::UnexpectedEof);
    }
    if cur.starts_with("false") {
        cur.advance(5);
        return Ok(false);
    }

    Err(ErrorCode::ExpectedValue)
}

pub(crate) fn parse_null(cur: &mut Cursor<'_>) -> Result<(), ErrorCode> {
    if cur.remaining() < 4 {
        return Err(ErrorCode::UnexpectedEof);
    }
    if cur.starts_with("null") {
        cur.advance(4);
        return Ok(());
    }

    Err(ErrorCode::ExpectedValue)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::NoopBuilder;

    fn number(input: &str) -> Result<Numeric, ErrorCode> {
        parse_number(&mut Cursor::new(input))
    }

    /// Test number lexeme edge cases
    #[test]
    fn numbers() {
        assert_eq!(number(""), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-."), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-.e"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-.e1"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-0.e"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-0.0e"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-0.0e-"), Err(ErrorCode::ExpectedDigits));
        assert_eq!(number("-0.0e-0"), Ok(Numeric::Decimal(0.0)));

        assert_eq!(number("0"), Ok(Numeric::Integer(0)));
        assert_eq!(number("1"), Ok(Numeric::Integer(1)));
        assert_eq!(number("-1"), Ok(Numeric::Integer(-1)));
        assert_eq!(number("628"), Ok(Numeric::Integer(628)));
        assert_eq!(number("0.2"), Ok(Numeric::Decimal(0.2)));
        assert_eq!(number("-0.2"), Ok(Numeric::Decimal(-0.2)));
        assert_eq!(number("-0.2e2"), Ok(Numeric::Decimal(-20.0)));
        assert_eq!(number("-0.2e-2"), Ok(Numeric::Decimal(-0.002)));
    }

    /// Test that integers beyond the i64 range saturate
    #[test]
    fn number_saturation() {
        assert_eq!(
            number("99999999999999999999"),
            Ok(Numeric::Integer(i64::MAX))
        );
        assert_eq!(
            number("-99999999999999999999"),
            Ok(Numeric::Integer(i64::MIN))
        );
    }

    /// Test that the lexeme ends at the first non-numeric byte
    #[test]
    fn number_lexeme_ends_naturally() {
        let mut cur = Cursor::new("7.5e1]");
        assert_eq!(parse_number(&mut cur), Ok(Numeric::Decimal(75.0)));
        assert_eq!(cur.peek(), Some(b']'));

        let mut cur = Cursor::new("628,");
        assert_eq!(parse_number(&mut cur), Ok(Numeric::Integer(628)));
        assert_eq!(cur.peek(), Some(b','));
    }

    /// Test string scanning: spans keep their quotes and the cursor ends up
    /// after the closing quote
    #[test]
    fn strings() {
        let mut cur = Cursor::new(r#""plain" tail"#);
        let span = parse_string(&mut cur).unwrap();
        assert_eq!(span.as_str(), r#""plain""#);
        assert_eq!(cur.peek(), Some(b' '));

        // the scanner resumes directly after the four hex digits
        let mut cur = Cursor::new(r#""x\uD800y""#);
        let span = parse_string(&mut cur).unwrap();
        assert_eq!(span.as_str(), r#""x\uD800y""#);
        assert_eq!(cur.peek(), None);

        assert_eq!(
            parse_string(&mut Cursor::new("x")),
            Err(ErrorCode::ExpectedQuote)
        );
        assert_eq!(
            parse_string(&mut Cursor::new("\"abc")),
            Err(ErrorCode::UnexpectedEof)
        );
        assert_eq!(
            parse_string(&mut Cursor::new("\"ab\\")),
            Err(ErrorCode::UnexpectedEof)
        );
        assert_eq!(
            parse_string(&mut Cursor::new(r#""\x""#)),
            Err(ErrorCode::ExpectedEscapedChar)
        );
        assert_eq!(
            parse_string(&mut Cursor::new(r#""\u09fx""#)),
            Err(ErrorCode::ExpectedHex)
        );
        assert_eq!(
            parse_string(&mut Cursor::new(r#""\u12"#)),
            Err(ErrorCode::UnexpectedEof)
        );
    }

    /// Test keyword parsing
    #[test]
    fn keywords() {
        assert_eq!(parse_bool(&mut Cursor::new("true")), Ok(true));
        assert_eq!(parse_bool(&mut Cursor::new("false")), Ok(false));
        assert_eq!(parse_bool(&mut Cursor::new("falsetrue")), Ok(false));
        assert_eq!(
            parse_bool(&mut Cursor::new("tru")),
            Err(ErrorCode::UnexpectedEof)
        );
        assert_eq!(
            parse_bool(&mut Cursor::new("truthy")),
            Err(ErrorCode::ExpectedValue)
        );
        assert_eq!(parse_null(&mut Cursor::new("nulltrue")), Ok(()));
        assert_eq!(
            parse_null(&mut Cursor::new("nul")),
            Err(ErrorCode::UnexpectedEof)
        );
        assert_eq!(
            parse_null(&mut Cursor::new("nope")),
            Err(ErrorCode::ExpectedValue)
        );
    }

    /// Test a bad hex digit inside an object member
    #[test]
    fn object_with_bad_hex() {
        let err = parse_object_into(&mut NoopBuilder, "{\"hex_test\":\"\\u09fx\"}", &mut (), 0)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedHex);
    }

    /// Test that the error record carries line and column of the offending
    /// byte
    #[test]
    fn error_position() {
        let err =
            parse_object_into(&mut NoopBuilder, "{\"a\": 1,\n  \"b\" 2}", &mut (), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedColon);
        assert_eq!(err.offset, 15);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 6);
    }

    /// Test that on success the cursor rests on the first byte after the
    /// parsed construct
    #[test]
    fn cursor_rests_after_construct() {
        let mut cur = Cursor::new("{\"a\":1}tail");
        parse_object(&mut NoopBuilder, &mut (), 0, &mut cur).unwrap();
        assert_eq!(cur.peek(), Some(b't'));

        let mut cur = Cursor::new("[1,[2],3] tail");
        parse_array(&mut NoopBuilder, &mut (), 0, &mut cur).unwrap();
        assert_eq!(cur.peek(), Some(b' '));
    }

    /// Test empty containers and whitespace between tokens
    #[test]
    fn empty_containers() {
        parse_object_into(&mut NoopBuilder, "{}", &mut (), 0).unwrap();
        parse_array_into(&mut NoopBuilder, "[]", &mut (), 0).unwrap();
        parse_object_into(&mut NoopBuilder, "{\n\"a\" : \t1\r}", &mut (), 0).unwrap();
    }

    /// Test structural error codes
    #[test]
    fn structural_errors() {
        let object = |json| {
            parse_object_into(&mut NoopBuilder, json, &mut (), 0)
                .unwrap_err()
                .code
        };
        assert_eq!(object("["), ErrorCode::ExpectedOpenObject);
        assert_eq!(object("{"), ErrorCode::UnexpectedEof);
        assert_eq!(object("{\"a\" 1}"), ErrorCode::ExpectedColon);
        assert_eq!(object("{\"a\":}"), ErrorCode::ExpectedValue);
        assert_eq!(object("{\"a\":1"), ErrorCode::ExpectedCloseObject);
        assert_eq!(object("{\"a\":1,}"), ErrorCode::ExpectedQuote);
        assert_eq!(object("{x}"), ErrorCode::ExpectedQuote);

        let array = |json| {
            parse_array_into(&mut NoopBuilder, json, &mut (), 0)
                .unwrap_err()
                .code
        };
        assert_eq!(array("{"), ErrorCode::ExpectedOpenArray);
        assert_eq!(array("["), ErrorCode::ExpectedValue);
        assert_eq!(array("[1"), ErrorCode::ExpectedCloseArray);
        assert_eq!(array("[1,]"), ErrorCode::ExpectedValue);
        assert_eq!(array("[1 2]"), ErrorCode::ExpectedCloseArray);
    }

    /// Test first-byte dispatch
    #[test]
    fn peek_dispatch() {
        let mut cur = Cursor::new("{\"a\":1}");
        assert_eq!(peek_type(&cur), Ok(JsonType::Object));
        assert_eq!(
            parse_primitive::<()>(&mut cur),
            Err(ErrorCode::ExpectedPrimitive)
        );
    }
}
