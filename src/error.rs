use thiserror::Error;

/// Stable error codes shared by the parser, the span decoder and builder
/// callbacks.
///
/// The library itself only raises the codes up to [`ErrorCode::ExpectedHex`].
/// The remaining four are never produced by the parser; they are reserved
/// for [`JsonBuilder`](crate::JsonBuilder) implementations that want to
/// abort a parse with a domain error of their own.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The input ended in the middle of a construct
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// There is unparsed input where none was expected
    #[error("unexpected input")]
    UnexpectedInput,

    #[error("expecting ','")]
    ExpectedComma,

    #[error("expecting ':'")]
    ExpectedColon,

    #[error("expecting '\"'")]
    ExpectedQuote,

    #[error("expecting '{{'")]
    ExpectedOpenObject,

    #[error("expecting '['")]
    ExpectedOpenArray,

    #[error("expecting '}}'")]
    ExpectedCloseObject,

    #[error("expecting ']'")]
    ExpectedCloseArray,

    #[error("expecting object, array, string, number, boolean or null")]
    ExpectedValue,

    #[error("expecting string, number, boolean or null")]
    ExpectedPrimitive,

    #[error("expecting escaped character (\", \\, /, b, f, n, r, t, u)")]
    ExpectedEscapedChar,

    #[error("expecting digits 0..9")]
    ExpectedDigits,

    #[error("expecting hexadecimal digits 0..9, a..f or A..F")]
    ExpectedHex,

    /// Reserved for builders: an object member was not expected here
    #[error("unexpected key in object")]
    UnexpectedKey,

    /// Reserved for builders: an object member appeared twice
    #[error("duplicate key in object")]
    DuplicateKey,

    /// Reserved for builders: a decoded string did not match
    #[error("decoded string does not match")]
    NotEqual,

    /// A [`Span`](crate::Span) does not start and end with a double quote
    #[error("span not enclosed by quotes")]
    SpanNotQuoted,
}

/// An error returned by the parser entry points, enriched with the position
/// at which parsing stopped.
///
/// `offset` is a byte index into the parsed input; it always lies within
/// `0..=input.len()`. On failure it points at the offending byte (or at the
/// end of the input when it ended prematurely). `line` and `column` are
/// derived from the text before `offset` and are both 0-based.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("{code} at {line}:{column}")]
pub struct ParseError {
    /// What went wrong
    pub code: ErrorCode,

    /// Byte offset at which the parser stopped
    pub offset: usize,

    /// 0-based line of `offset`
    pub line: usize,

    /// 0-based column (in bytes) of `offset` within its line
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(code: ErrorCode, input: &str, offset: usize) -> Self {
        let mut line = 0;
        let mut column = 0;
        for &b in &input.as_bytes()[..offset] {
            if b == b'\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        ParseError {
            code,
            offset,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ErrorCode, ParseError};

    /// Test that line and column are derived from the offset
    #[test]
    fn position() {
        let input = "{\n  \"a\": x\n}";
        let err = ParseError::new(ErrorCode::ExpectedValue, input, 9);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 7);
        assert_eq!(err.to_string(), "expecting object, array, string, number, boolean or null at 1:7");
    }

    /// Test that an offset at the very start maps to 0:0
    #[test]
    fn position_at_start() {
        let err = ParseError::new(ErrorCode::UnexpectedEof, "", 0);
        assert_eq!((err.line, err.column), (0, 0));
    }
}
