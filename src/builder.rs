use crate::error::ErrorCode;
use crate::span::Span;
use crate::value::{ContainerKind, Key, Value};

/// The contract between the parser and the caller: three callbacks that
/// materialize parsed JSON into caller-chosen storage.
///
/// [`open`](Self::open) is invoked when the parser encounters `{` or `[` in
/// value position, before the container's contents are parsed. It returns a
/// *handle* for the container under construction together with a
/// caller-chosen *tag*. The handle is passed back to the [`set`](Self::set)
/// and [`push`](Self::push) calls for the container's members, and finally
/// to the parent's `set`/`push` wrapped in [`Value::Object`] or
/// [`Value::Array`]. The tag travels alongside the handle and lets one
/// builder host several container schemas without inspecting handles; the
/// library never interprets either.
///
/// Any callback may abort the parse by returning an error code, which then
/// becomes the result of the enclosing
/// [`parse_object_into`](crate::parse_object_into) or
/// [`parse_array_into`](crate::parse_array_into) call. The codes
/// [`ErrorCode::UnexpectedKey`], [`ErrorCode::DuplicateKey`] and
/// [`ErrorCode::NotEqual`] are never raised by the library and are free for
/// builders to use.
pub trait JsonBuilder {
    /// The type of container handles produced by [`open`](Self::open).
    type Handle;

    /// Called when a child container starts. `key` identifies where the
    /// container will hang in its parent: an id span when the parent is an
    /// object, an index when it is an array. Returns the handle for the new
    /// container and its tag.
    fn open(
        &mut self,
        kind: ContainerKind,
        parent: &mut Self::Handle,
        parent_tag: u32,
        key: &Key<'_>,
    ) -> Result<(Self::Handle, u32), ErrorCode>;

    /// Called once per array element, in order, after the element has been
    /// fully parsed. `index` starts at 0 and increments by one for each
    /// element.
    fn push(
        &mut self,
        array: &mut Self::Handle,
        tag: u32,
        index: usize,
        value: Value<'_, Self::Handle>,
    ) -> Result<(), ErrorCode>;

    /// Called once per object member, in order of appearance, after the
    /// member value has been fully parsed.
    fn set(
        &mut self,
        object: &mut Self::Handle,
        tag: u32,
        id: Span<'_>,
        value: Value<'_, Self::Handle>,
    ) -> Result<(), ErrorCode>;
}

/// A builder that discards everything it is given. Parsing with it is a
/// pure syntax check.
pub struct NoopBuilder;

impl JsonBuilder for NoopBuilder {
    type Handle = ();

    fn open(
        &mut self,
        _kind: ContainerKind,
        _parent: &mut (),
        _parent_tag: u32,
        _key: &Key<'_>,
    ) -> Result<((), u32), ErrorCode> {
        Ok(((), 0))
    }

    fn push(
        &mut self,
        _array: &mut (),
        _tag: u32,
        _index: usize,
        _value: Value<'_, ()>,
    ) -> Result<(), ErrorCode> {
        Ok(())
    }

    fn set(
        &mut self,
        _object: &mut (),
        _tag: u32,
        _id: Span<'_>,
        _value: Value<'_, ()>,
    ) -> Result<(), ErrorCode> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::NoopBuilder;
    use crate::error::ErrorCode;
    use crate::parser::{parse_array_into, parse_object_into};

    /// Test that parsing with the no-op builder is a pure syntax check
    #[test]
    fn noop_syntax_check() {
        parse_object_into(
            &mut NoopBuilder,
            r#"{"a": [1, {"b": null}], "c": "d"}"#,
            &mut (),
            0,
        )
        .unwrap();

        let err = parse_array_into(&mut NoopBuilder, "[1, 2", &mut (), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedCloseArray);
    }
}
