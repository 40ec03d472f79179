//! # Spanson
//!
//! A span-based, single-pass JSON parser and encoder.
//!
//! The parser is a recursive-descent scanner over a fully-buffered input
//! string. It allocates nothing itself: strings are handed out as
//! [`Span`]s, slices of the input that still carry their quotes and escape
//! sequences, and parsed values are delivered to a caller-supplied
//! [`JsonBuilder`] that decides how (and whether) the document is
//! materialized. Decoding a span into UTF-8 text, including `\uXXXX`
//! escapes and surrogate pairs, only happens when a builder asks for it.
//!
//! ## Examples
//!
//! ### Decoding into the entity tree
//!
//! [`Entity::decode`] is the stock builder: it materializes any document
//! as an owned tree.
//!
//! ```
//! use spanson::Entity;
//!
//! let json = r#"{"name": "Elvis", "albums": ["Elvis Presley", "Elvis"]}"#;
//!
//! let root = Entity::decode(json).unwrap();
//! assert_eq!(root.get_member("name").and_then(|e| e.as_str()), Some("Elvis"));
//! assert_eq!(root.get_member("albums").map(|e| e.len()), Some(2));
//! ```
//!
//! ### Parsing into your own types
//!
//! Implement [`JsonBuilder`] to route parsed values directly into your own
//! data structures, without an intermediate document model.
//!
//! ```
//! use spanson::{parse_object_into, ContainerKind, ErrorCode, JsonBuilder, Key, Span, Value};
//!
//! /// Sums every number in the document, however deeply nested.
//! struct Sum(f64);
//!
//! impl JsonBuilder for Sum {
//!     type Handle = ();
//!
//!     fn open(
//!         &mut self,
//!         _kind: ContainerKind,
//!         _parent: &mut (),
//!         _parent_tag: u32,
//!         _key: &Key<'_>,
//!     ) -> Result<((), u32), ErrorCode> {
//!         Ok(((), 0))
//!     }
//!
//!     fn push(
//!         &mut self,
//!         _array: &mut (),
//!         _tag: u32,
//!         _index: usize,
//!         value: Value<'_, ()>,
//!     ) -> Result<(), ErrorCode> {
//!         if let Value::Number(n) = value {
//!             self.0 += n.as_decimal();
//!         }
//!         Ok(())
//!     }
//!
//!     fn set(
//!         &mut self,
//!         _object: &mut (),
//!         _tag: u32,
//!         _id: Span<'_>,
//!         value: Value<'_, ()>,
//!     ) -> Result<(), ErrorCode> {
//!         if let Value::Number(n) = value {
//!             self.0 += n.as_decimal();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut sum = Sum(0.0);
//! parse_object_into(&mut sum, r#"{"a": 1, "b": [2, 3], "c": {"d": 4}}"#, &mut (), 0).unwrap();
//! assert_eq!(sum.0, 10.0);
//! ```
//!
//! ### Encoding
//!
//! [`JsonEncoder`] accepts one value/id/bracket per call and verifies the
//! call sequence with a state machine before anything is concatenated.
//!
//! ```
//! use spanson::JsonEncoder;
//!
//! let mut enc = JsonEncoder::new();
//! enc.begin_object();
//! enc.push_id("name");
//! enc.push_string("Elvis");
//! enc.push_id("alive");
//! enc.push_bool(false);
//! enc.end();
//!
//! assert_eq!(enc.collapse().unwrap(), r#"{"name":"Elvis","alive":false}"#);
//! ```
//!
//! ### Parsing into a Serde JSON Value
//!
//! For testing and compatibility reasons, Spanson can parse a string into
//! a [Serde JSON](https://github.com/serde-rs/json) Value. You need to
//! enable the `serde_json` feature for this.
mod builder;
mod encoder;
mod entity;
mod error;
mod parser;
mod reset;
mod span;
mod value;

#[cfg(feature = "serde_json")]
pub mod serde_json;

pub use builder::{JsonBuilder, NoopBuilder};
pub use encoder::{EncodeError, JsonEncoder};
pub use entity::{Children, Entity};
pub use error::{ErrorCode, ParseError};
pub use parser::{parse_array_into, parse_object_into};
pub use reset::Reset;
pub use span::Span;
pub use value::{ContainerKind, JsonType, Key, Numeric, Value};
