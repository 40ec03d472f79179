use crate::builder::JsonBuilder;
use crate::encoder::JsonEncoder;
use crate::error::{ErrorCode, ParseError};
use crate::parser::{self, Cursor};
use crate::span::Span;
use crate::value::{ContainerKind, JsonType, Key, Numeric, Value};

/// An owned tree node representing one JSON value.
///
/// [`Entity::decode`] materializes a whole document into a tree of these;
/// every string is decoded and copied, so the tree is independent of the
/// input text. Container children form a singly-linked sibling chain, an
/// implementation detail hidden behind [`children`](Self::children),
/// [`get_member`](Self::get_member), [`get_item`](Self::get_item) and
/// [`len`](Self::len).
#[derive(Debug, PartialEq)]
pub struct Entity {
    key: EntityKey,
    value: EntityValue,
    first: Option<Box<Entity>>,
    next: Option<Box<Entity>>,
}

/// Where a node hangs in its parent.
#[derive(Debug, PartialEq)]
enum EntityKey {
    Root,
    Member(String),
    Item(usize),
}

#[derive(Debug, PartialEq)]
enum EntityValue {
    String(String),
    Number(Numeric),
    Bool(bool),
    Null,
    Object,
    Array,
}

impl Entity {
    /// Parse and decode a JSON text into an owned tree.
    ///
    /// The root may be any JSON value. Leading whitespace is skipped;
    /// trailing input after the root value is tolerated (use
    /// [`decode_exact`](Self::decode_exact) to reject it).
    pub fn decode(input: &str) -> Result<Entity, ParseError> {
        Self::decode_inner(input, false)
    }

    /// Like [`decode`](Self::decode), but reports
    /// [`ErrorCode::UnexpectedInput`] if anything but whitespace follows
    /// the root value.
    pub fn decode_exact(input: &str) -> Result<Entity, ParseError> {
        Self::decode_inner(input, true)
    }

    fn decode_inner(input: &str, exact: bool) -> Result<Entity, ParseError> {
        let mut cur = Cursor::new(input);
        parser::skip_ws(&mut cur);

        let ty = parser::peek_type(&cur).map_err(|c| ParseError::new(c, input, cur.pos()))?;

        let mut root = Entity {
            key: EntityKey::Root,
            value: EntityValue::Null,
            first: None,
            next: None,
        };
        let mut builder = EntityBuilder;

        let result = match ty {
            JsonType::Object => {
                root.value = EntityValue::Object;
                parser::parse_object(&mut builder, &mut root, 0, &mut cur)
            }
            JsonType::Array => {
                root.value = EntityValue::Array;
                parser::parse_array(&mut builder, &mut root, 0, &mut cur)
            }
            JsonType::String => parser::parse_string(&mut cur).map(|span| {
                root.value = EntityValue::String(span.decode());
            }),
            JsonType::Number => parser::parse_number(&mut cur).map(|n| {
                root.value = EntityValue::Number(n);
            }),
            JsonType::Bool => parser::parse_bool(&mut cur).map(|b| {
                root.value = EntityValue::Bool(b);
            }),
            JsonType::Null => parser::parse_null(&mut cur),
        };
        result.map_err(|c| ParseError::new(c, input, cur.pos()))?;

        if exact {
            parser::skip_ws(&mut cur);
            if cur.peek().is_some() {
                return Err(ParseError::new(ErrorCode::UnexpectedInput, input, cur.pos()));
            }
        }

        Ok(root)
    }

    /// Encode this entity (and everything below it) into minified JSON.
    pub fn encode(&self) -> String {
        let mut enc = JsonEncoder::new();
        encode_value(&mut enc, self);
        enc.collapse().unwrap_or_default()
    }

    /// The JSON type of this node.
    pub fn json_type(&self) -> JsonType {
        match self.value {
            EntityValue::String(_) => JsonType::String,
            EntityValue::Number(_) => JsonType::Number,
            EntityValue::Bool(_) => JsonType::Bool,
            EntityValue::Null => JsonType::Null,
            EntityValue::Object => JsonType::Object,
            EntityValue::Array => JsonType::Array,
        }
    }

    /// The member id under which this node hangs in its parent object, if
    /// its parent is an object.
    pub fn id(&self) -> Option<&str> {
        match &self.key {
            EntityKey::Member(id) => Some(id),
            _ => None,
        }
    }

    /// The index of this node in its parent array, if its parent is an
    /// array.
    pub fn index(&self) -> Option<usize> {
        match self.key {
            EntityKey::Item(i) => Some(i),
            _ => None,
        }
    }

    /// The numeric value of this node. Returns `Integer(0)` for
    /// non-numbers.
    pub fn as_number(&self) -> Numeric {
        match self.value {
            EntityValue::Number(n) => n,
            _ => Numeric::Integer(0),
        }
    }

    /// The boolean value of this node. Returns `false` for non-booleans.
    pub fn as_bool(&self) -> bool {
        matches!(self.value, EntityValue::Bool(true))
    }

    /// The string value of this node, or `None` for non-strings.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            EntityValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this node is a JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self.value, EntityValue::Null)
    }

    /// Iterate over the direct children of this node, in document order.
    pub fn children(&self) -> Children<'_> {
        Children {
            next: self.first.as_deref(),
        }
    }

    /// Find a member of this object by its (decoded) id.
    pub fn get_member(&self, id: &str) -> Option<&Entity> {
        self.children().find(|c| c.id() == Some(id))
    }

    /// Find an item of this array by its index.
    pub fn get_item(&self, index: usize) -> Option<&Entity> {
        self.children().find(|c| c.index() == Some(index))
    }

    /// The number of direct children.
    pub fn len(&self) -> usize {
        self.children().count()
    }

    /// Whether this node has no children.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    fn append(&mut self, child: Entity) {
        let mut slot = &mut self.first;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        *slot = Some(Box::new(child));
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        // unlink the sibling chain iteratively so a long array cannot
        // overflow the stack
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

/// Iterator over the direct children of an [`Entity`].
pub struct Children<'a> {
    next: Option<&'a Entity>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<&'a Entity> {
        let cur = self.next?;
        self.next = cur.next.as_deref();
        Some(cur)
    }
}

fn encode_value(enc: &mut JsonEncoder, entity: &Entity) {
    if let Some(id) = entity.id() {
        enc.push_id(id);
    }
    match &entity.value {
        EntityValue::String(s) => enc.push_string(s),
        EntityValue::Number(n) => enc.push_numeric(*n),
        EntityValue::Bool(b) => enc.push_bool(*b),
        EntityValue::Null => enc.push_null(),
        EntityValue::Object => {
            enc.begin_object();
            for child in entity.children() {
                encode_value(enc, child);
            }
            enc.end();
        }
        EntityValue::Array => {
            enc.begin_array();
            for child in entity.children() {
                encode_value(enc, child);
            }
            enc.end();
        }
    }
}

/// The stock builder behind [`Entity::decode`]. `open` allocates the child
/// node and records its key; `set`/`push` hang finished children into their
/// parent's chain.
struct EntityBuilder;

impl JsonBuilder for EntityBuilder {
    type Handle = Entity;

    fn open(
        &mut self,
        kind: ContainerKind,
        _parent: &mut Entity,
        _parent_tag: u32,
        key: &Key<'_>,
    ) -> Result<(Entity, u32), ErrorCode> {
        let child = Entity {
            key: entity_key(key),
            value: match kind {
                ContainerKind::Object => EntityValue::Object,
                ContainerKind::Array => EntityValue::Array,
            },
            first: None,
            next: None,
        };
        Ok((child, 0))
    }

    fn push(
        &mut self,
        array: &mut Entity,
        _tag: u32,
        index: usize,
        value: Value<'_, Entity>,
    ) -> Result<(), ErrorCode> {
        array.append(entity_from(EntityKey::Item(index), value));
        Ok(())
    }

    fn set(
        &mut self,
        object: &mut Entity,
        _tag: u32,
        id: Span<'_>,
        value: Value<'_, Entity>,
    ) -> Result<(), ErrorCode> {
        object.append(entity_from(EntityKey::Member(id.decode()), value));
        Ok(())
    }
}

fn entity_key(key: &Key<'_>) -> EntityKey {
    match key {
        Key::Id(id) => EntityKey::Member(id.decode()),
        Key::Index(i) => EntityKey::Item(*i),
    }
}

fn entity_from(key: EntityKey, value: Value<'_, Entity>) -> Entity {
    let value = match value {
        // container children already carry their key from `open`
        Value::Object(child) | Value::Array(child) => return child,
        Value::String(span) => EntityValue::String(span.decode()),
        Value::Number(n) => EntityValue::Number(n),
        Value::Bool(b) => EntityValue::Bool(b),
        Value::Null => EntityValue::Null,
    };
    Entity {
        key,
        value,
        first: None,
        next: None,
    }
}
