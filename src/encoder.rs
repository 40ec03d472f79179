use thiserror::Error;

use crate::reset::Reset;
use crate::value::Numeric;

const NULL: &str = "null";
const TRUE: &str = "true";
const FALSE: &str = "false";
const COMMA: &str = ",";
const COLON: &str = ":";
const OPEN_OBJECT: &str = "{";
const CLOSE_OBJECT: &str = "}";
const OPEN_ARRAY: &str = "[";
const CLOSE_ARRAY: &str = "]";

/// An error returned by [`JsonEncoder::collapse`].
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// A command was issued in a state that does not accept it
    #[error("invalid command sequence")]
    InvalidState,

    /// The encoded value is incomplete (open containers, or nothing pushed)
    #[error("encoded value is incomplete")]
    Incomplete,

    /// The encoder has already been collapsed
    #[error("encoder has already been collapsed")]
    Collapsed,
}

/// One piece of pending output. Separators and keywords are borrowed
/// singletons; encoded values are owned.
enum Fragment {
    Borrowed(&'static str),
    Owned(String),
}

impl Fragment {
    fn as_str(&self) -> &str {
        match self {
            Fragment::Borrowed(s) => s,
            Fragment::Owned(s) => s,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Root,
    Object,
    ObjectAwaitingValue,
    Array,
    EndObject,
    EndArray,
    EndRoot,
    Error,
}

#[derive(Copy, Clone)]
enum Cmd {
    PutId,
    PutValue,
    Close,
}

/// The transition table of the encoder automaton. Everything not listed
/// here is a protocol violation.
fn next_state(state: State, cmd: Cmd) -> State {
    match (state, cmd) {
        (State::Root, Cmd::PutValue) => State::EndRoot,
        (State::Object, Cmd::PutId) => State::ObjectAwaitingValue,
        (State::Object, Cmd::Close) => State::EndObject,
        (State::ObjectAwaitingValue, Cmd::PutValue) => State::Object,
        (State::Array, Cmd::PutValue) => State::Array,
        (State::Array, Cmd::Close) => State::EndArray,
        _ => State::Error,
    }
}

struct Frame {
    state: State,
    has_value: bool,
}

/// A pushdown JSON encoder.
///
/// Values, ids and container brackets are pushed one call at a time; the
/// encoder buffers output fragments and verifies with a small state machine
/// that the call sequence produces well-formed JSON. A single complete
/// value must be encoded, then [`collapse`](Self::collapse) concatenates
/// the fragments into the final string.
///
/// An invalid call puts the encoder into a sticky error state: the call
/// and everything after it are ignored, [`is_error`](Self::is_error)
/// reports `true`, and `collapse` fails. A collapsed or poisoned encoder
/// can be reused after [`reset`](Reset::reset).
///
/// ```
/// use spanson::JsonEncoder;
///
/// let mut enc = JsonEncoder::new();
/// enc.begin_object();
/// enc.push_id("name");
/// enc.push_string("Elvis");
/// enc.end();
/// assert_eq!(enc.collapse().unwrap(), r#"{"name":"Elvis"}"#);
/// ```
pub struct JsonEncoder {
    /// Frame 0 is the root frame; it is never popped
    stack: Vec<Frame>,
    data: Vec<Fragment>,
    collapsed: bool,
    error: bool,
}

impl JsonEncoder {
    pub fn new() -> Self {
        JsonEncoder {
            stack: vec![Frame {
                state: State::Root,
                has_value: false,
            }],
            data: vec![],
            collapsed: false,
            error: false,
        }
    }

    /// `true` once an invalid command sequence has been detected (or a
    /// command was issued after [`collapse`](Self::collapse)).
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Apply `cmd` to the top frame. On a protocol violation the encoder
    /// is poisoned and `false` is returned.
    fn transition(&mut self, cmd: Cmd) -> bool {
        if self.error || self.collapsed {
            self.error = true;
            return false;
        }
        let top = self.stack.last_mut().unwrap();
        let next = next_state(top.state, cmd);
        if next == State::Error {
            self.error = true;
            return false;
        }
        top.state = next;
        true
    }

    fn emit(&mut self, fragment: Fragment) {
        self.data.push(fragment);
    }

    fn begin(&mut self, state: State, bracket: &'static str) {
        let container = self.stack.last().unwrap().state;
        if !self.transition(Cmd::PutValue) {
            return;
        }
        if container == State::Array && self.stack.last().unwrap().has_value {
            self.emit(Fragment::Borrowed(COMMA));
        }
        self.stack.last_mut().unwrap().has_value = true;
        self.stack.push(Frame {
            state,
            has_value: false,
        });
        self.emit(Fragment::Borrowed(bracket));
    }

    /// Open a nested object.
    pub fn begin_object(&mut self) {
        self.begin(State::Object, OPEN_OBJECT);
    }

    /// Open a nested array.
    pub fn begin_array(&mut self) {
        self.begin(State::Array, OPEN_ARRAY);
    }

    fn put_value(&mut self, fragment: Fragment) {
        let container = self.stack.last().unwrap().state;
        if !self.transition(Cmd::PutValue) {
            return;
        }
        if container == State::Array && self.stack.last().unwrap().has_value {
            self.emit(Fragment::Borrowed(COMMA));
        }
        self.stack.last_mut().unwrap().has_value = true;
        self.emit(fragment);
    }

    /// Push an object member id. Must be followed by exactly one value
    /// (or `begin_*`).
    pub fn push_id(&mut self, id: &str) {
        if !self.transition(Cmd::PutId) {
            return;
        }
        if self.stack.last().unwrap().has_value {
            self.emit(Fragment::Borrowed(COMMA));
        }
        self.emit(Fragment::Owned(encode_string(id)));
        self.emit(Fragment::Borrowed(COLON));
    }

    /// Push a raw, pre-encoded value verbatim. Useful for numbers
    /// formatted by the caller, or for strings that are already valid JSON
    /// string tokens.
    pub fn push_value(&mut self, value: &str) {
        self.put_value(Fragment::Owned(value.to_owned()));
    }

    /// Encode `value` as a JSON string token and push it.
    pub fn push_string(&mut self, value: &str) {
        self.put_value(Fragment::Owned(encode_string(value)));
    }

    /// Push a numeric value, dispatching on its variant.
    pub fn push_numeric(&mut self, value: Numeric) {
        match value {
            Numeric::Integer(i) => self.push_integer(i),
            Numeric::Decimal(d) => self.push_decimal(d),
        }
    }

    /// Push an integer in plain decimal notation.
    pub fn push_integer(&mut self, value: i64) {
        self.put_value(Fragment::Owned(value.to_string()));
    }

    /// Push a float formatted with six significant digits. Callers that
    /// need a different precision can format themselves and use
    /// [`push_value`](Self::push_value).
    pub fn push_decimal(&mut self, value: f64) {
        self.put_value(Fragment::Owned(format_decimal(value)));
    }

    /// Push a boolean value.
    pub fn push_bool(&mut self, value: bool) {
        self.put_value(Fragment::Borrowed(if value { TRUE } else { FALSE }));
    }

    /// Push a null value.
    pub fn push_null(&mut self) {
        self.put_value(Fragment::Borrowed(NULL));
    }

    /// Close the innermost open object or array.
    pub fn end(&mut self) {
        if !self.transition(Cmd::Close) {
            return;
        }
        let frame = self.stack.pop().unwrap();
        if frame.state == State::EndObject {
            self.emit(Fragment::Borrowed(CLOSE_OBJECT));
        } else if frame.state == State::EndArray {
            self.emit(Fragment::Borrowed(CLOSE_ARRAY));
        }
    }

    /// Concatenate everything pushed so far into the final JSON string.
    ///
    /// Fails unless exactly one complete value has been encoded and every
    /// container is closed. Afterwards the encoder refuses further input
    /// until [`reset`](Reset::reset).
    pub fn collapse(&mut self) -> Result<String, EncodeError> {
        if self.error {
            return Err(EncodeError::InvalidState);
        }
        if self.collapsed {
            return Err(EncodeError::Collapsed);
        }
        if self.stack.len() != 1 || self.stack[0].state != State::EndRoot {
            return Err(EncodeError::Incomplete);
        }

        self.collapsed = true;
        let len: usize = self.data.iter().map(|f| f.as_str().len()).sum();
        let mut out = String::with_capacity(len);
        for fragment in self.data.drain(..) {
            out.push_str(fragment.as_str());
        }
        Ok(out)
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Reset for JsonEncoder {
    /// Reset the encoder to the state it was in when it was constructed
    fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(Frame {
            state: State::Root,
            has_value: false,
        });
        self.data.clear();
        self.collapsed = false;
        self.error = false;
    }
}

/// Encode `value` as a JSON string token, quotes included. `/` stays
/// unescaped, control characters below 0x20 without a short escape become
/// `\u00XX`, and everything else passes through unchanged.
fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u00{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Format `value` the way C's `printf("%g")` with its default precision of
/// six significant digits would.
fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() {
            "-0".to_owned()
        } else {
            "0".to_owned()
        };
    }

    let sci = format!("{:.5e}", value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };

    if !(-4..6).contains(&exp) {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        format!(
            "{}e{}{:02}",
            mantissa,
            if exp < 0 { '-' } else { '+' },
            exp.abs()
        )
    } else {
        let fixed = format!("{:.*}", (5 - exp) as usize, value);
        if fixed.contains('.') {
            fixed
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_owned()
        } else {
            fixed
        }
    }
}
