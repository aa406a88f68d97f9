//! Decoding wire values into native types.
//!
//! [`WireDeserializer`] is a `serde::Deserializer` over a borrowed
//! [`WireValue`]. The target type drives which `deserialize_*` method gets
//! called; each method checks the wire shape against that request and either
//! visits the data, substitutes an empty value for an unhandled null or
//! unknown, or fails with a [`DecodeError`] carrying the current path.

use std::collections::btree_map;
use std::slice;

use serde::de::value::{BorrowedStrDeserializer, MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeSeed, Visitor};
use serde::Deserialize;
use tfattr_wire::{AttributePath, Context, Number, PathStep, Raw, ValueState, WireType, WireValue};
use tracing::debug;

use crate::{DecodeError, DecodeErrorKind, Options};

/// Decode `value` into `T`.
///
/// `path` is where `value` lives inside whatever the caller is decoding; it
/// prefixes the path of every error. Container elements are decoded in order
/// and `ctx` is checked between them.
pub fn into<'a, T>(
    ctx: &'a Context,
    value: &'a WireValue,
    opts: &'a Options,
    path: AttributePath,
) -> Result<T, DecodeError>
where
    T: Deserialize<'a>,
{
    debug!(
        ty = %value.ty(),
        native = std::any::type_name::<T>(),
        path = %path,
        "decoding wire value"
    );
    let de = WireDeserializer::new(ctx, Input::Value(value), opts, path.clone());
    T::deserialize(de).map_err(|e| e.or_at(path))
}

/// What the deserializer is looking at.
///
/// `Null` and `Unknown` stand in for struct fields synthesized when a whole
/// struct is being emptied: there is no wire value for them, only a state.
#[derive(Clone, Copy)]
enum Input<'a> {
    Value(&'a WireValue),
    Null,
    Unknown,
}

/// A value that is either known data or should become the target's empty value.
enum Resolved<'a> {
    Known(&'a WireValue, &'a Raw),
    Empty,
}

struct WireDeserializer<'a> {
    ctx: &'a Context,
    input: Input<'a>,
    opts: &'a Options,
    path: AttributePath,
}

impl<'a> WireDeserializer<'a> {
    fn new(ctx: &'a Context, input: Input<'a>, opts: &'a Options, path: AttributePath) -> Self {
        Self {
            ctx,
            input,
            opts,
            path,
        }
    }

    fn state(&self) -> ValueState<(&'a WireValue, &'a Raw)> {
        match self.input {
            Input::Value(value) => match value.payload() {
                ValueState::Unknown => ValueState::Unknown,
                ValueState::Null => ValueState::Null,
                ValueState::Known(raw) => ValueState::Known((value, raw)),
            },
            Input::Null => ValueState::Null,
            Input::Unknown => ValueState::Unknown,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(self.path.clone(), kind)
    }

    fn mismatch(&self, target: &'static str, value: &WireValue) -> DecodeError {
        self.error(DecodeErrorKind::ShapeMismatch {
            target,
            found: value.ty().clone(),
        })
    }

    fn unhandled_unknown(&self, target: &'static str) -> Result<(), DecodeError> {
        if self.opts.unhandled_unknown_as_empty {
            Ok(())
        } else {
            Err(self.error(DecodeErrorKind::UnhandledUnknown { target }))
        }
    }

    fn unhandled_null(&self, target: &'static str) -> Result<(), DecodeError> {
        if self.opts.unhandled_null_as_empty {
            Ok(())
        } else {
            Err(self.error(DecodeErrorKind::UnhandledNull { target }))
        }
    }

    /// Known data, or `Empty` if the options allow substituting for a null
    /// or unknown. Anything else is an error.
    fn resolve(&self, target: &'static str) -> Result<Resolved<'a>, DecodeError> {
        match self.state() {
            ValueState::Unknown => self.unhandled_unknown(target).map(|()| Resolved::Empty),
            ValueState::Null => self.unhandled_null(target).map(|()| Resolved::Empty),
            ValueState::Known((value, raw)) => Ok(Resolved::Known(value, raw)),
        }
    }

    fn deserialize_integer<V: Visitor<'a>>(
        self,
        visitor: V,
        target: &'static str,
    ) -> Result<V::Value, DecodeError> {
        match self.resolve(target)? {
            Resolved::Empty => visitor.visit_i64(0),
            Resolved::Known(_, Raw::Number(Number::Integer(i))) => visitor.visit_i64(*i),
            Resolved::Known(_, Raw::Number(n @ Number::Float(f))) => {
                if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if f.fract() == 0.0 && *f > 0.0 && *f < u64::MAX as f64 {
                    visitor.visit_u64(*f as u64)
                } else {
                    Err(self.error(DecodeErrorKind::NotAnInteger { number: *n }))
                }
            }
            Resolved::Known(value, _) => Err(self.mismatch(target, value)),
        }
    }

    fn visit_elements<V: Visitor<'a>>(
        self,
        visitor: V,
        value: &'a WireValue,
        elems: &'a [WireValue],
    ) -> Result<V::Value, DecodeError> {
        let mut access = ElementAccess {
            ctx: self.ctx,
            opts: self.opts,
            path: &self.path,
            elems: elems.iter(),
            index: 0,
            by_value: value.ty().is_set(),
        };
        let out = visitor.visit_seq(&mut access)?;
        if access.elems.next().is_some() {
            return Err(self.error(DecodeErrorKind::LengthMismatch {
                expected: access.index,
                found: elems.len(),
            }));
        }
        Ok(out)
    }

    fn visit_entries<V: Visitor<'a>>(
        self,
        visitor: V,
        value: &'a WireValue,
        entries: &'a btree_map::BTreeMap<String, WireValue>,
    ) -> Result<V::Value, DecodeError> {
        let mut access = EntryAccess {
            ctx: self.ctx,
            opts: self.opts,
            path: &self.path,
            entries: entries.iter(),
            pending: None,
            attributes: value.ty().is_object(),
        };
        visitor.visit_map(&mut access)
    }
}

macro_rules! forward_integers {
    ($($method:ident => $target:literal),* $(,)?) => {
        $(
            fn $method<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                self.deserialize_integer(visitor, $target)
            }
        )*
    };
}

impl<'a> de::Deserializer<'a> for WireDeserializer<'a> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.state() {
            // A dynamic target can represent null on its own.
            ValueState::Null => visitor.visit_unit(),
            ValueState::Unknown => {
                self.unhandled_unknown("any")?;
                visitor.visit_unit()
            }
            ValueState::Known((value, raw)) => match raw {
                Raw::Bool(b) => visitor.visit_bool(*b),
                Raw::Number(Number::Integer(i)) => visitor.visit_i64(*i),
                Raw::Number(Number::Float(f)) => visitor.visit_f64(*f),
                Raw::String(s) => visitor.visit_borrowed_str(s),
                Raw::List(elems) => self.visit_elements(visitor, value, elems),
                Raw::Map(entries) => self.visit_entries(visitor, value, entries),
            },
        }
    }

    fn deserialize_bool<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("bool")? {
            Resolved::Empty => visitor.visit_bool(false),
            Resolved::Known(_, Raw::Bool(b)) => visitor.visit_bool(*b),
            Resolved::Known(value, _) => Err(self.mismatch("bool", value)),
        }
    }

    forward_integers! {
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
    }

    fn deserialize_f32<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("float")? {
            Resolved::Empty => visitor.visit_f64(0.0),
            Resolved::Known(_, Raw::Number(n)) => visitor.visit_f64(n.as_f64()),
            Resolved::Known(value, _) => Err(self.mismatch("float", value)),
        }
    }

    fn deserialize_char<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("char")? {
            Resolved::Empty => visitor.visit_char('\0'),
            Resolved::Known(_, Raw::String(s)) => visitor.visit_borrowed_str(s),
            Resolved::Known(value, _) => Err(self.mismatch("char", value)),
        }
    }

    fn deserialize_str<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("string")? {
            Resolved::Empty => visitor.visit_borrowed_str(""),
            Resolved::Known(_, Raw::String(s)) => visitor.visit_borrowed_str(s),
            Resolved::Known(value, _) => Err(self.mismatch("string", value)),
        }
    }

    fn deserialize_string<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("bytes")? {
            Resolved::Empty => visitor.visit_borrowed_bytes(&[]),
            Resolved::Known(_, Raw::String(s)) => visitor.visit_borrowed_bytes(s.as_bytes()),
            Resolved::Known(value, Raw::List(elems)) => self.visit_elements(visitor, value, elems),
            Resolved::Known(value, _) => Err(self.mismatch("bytes", value)),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.state() {
            ValueState::Null => visitor.visit_none(),
            ValueState::Unknown => {
                self.unhandled_unknown("option")?;
                visitor.visit_none()
            }
            ValueState::Known(_) => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.state() {
            ValueState::Null => visitor.visit_unit(),
            ValueState::Unknown => {
                self.unhandled_unknown("unit")?;
                visitor.visit_unit()
            }
            ValueState::Known((value, _)) => Err(self.mismatch("unit", value)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'a>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'a>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("sequence")? {
            Resolved::Empty => {
                visitor.visit_seq(SeqDeserializer::<_, DecodeError>::new(std::iter::empty::<()>()))
            }
            Resolved::Known(value, Raw::List(elems)) => self.visit_elements(visitor, value, elems),
            Resolved::Known(value, _) => Err(self.mismatch("sequence", value)),
        }
    }

    fn deserialize_tuple<V: Visitor<'a>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        if let ValueState::Known((value, Raw::List(elems))) = self.state() {
            if elems.len() != len {
                return Err(self.error(DecodeErrorKind::LengthMismatch {
                    expected: len,
                    found: elems.len(),
                }));
            }
            return self.visit_elements(visitor, value, elems);
        }
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'a>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.resolve("map")? {
            Resolved::Empty => visitor.visit_map(MapDeserializer::<_, DecodeError>::new(
                std::iter::empty::<((), ())>(),
            )),
            Resolved::Known(value, Raw::Map(entries)) => {
                self.visit_entries(visitor, value, entries)
            }
            Resolved::Known(value, _) => Err(self.mismatch("map", value)),
        }
    }

    fn deserialize_struct<V: Visitor<'a>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let empty_field = match self.state() {
            ValueState::Unknown => Input::Unknown,
            _ => Input::Null,
        };
        match self.resolve(name)? {
            Resolved::Empty => {
                let mut access = EmptyStructAccess {
                    ctx: self.ctx,
                    opts: self.opts,
                    path: &self.path,
                    fields: fields.iter(),
                    pending: None,
                    input: empty_field,
                };
                visitor.visit_map(&mut access)
            }
            Resolved::Known(value, Raw::Map(entries)) => {
                if let WireType::Object(attributes) = value.ty() {
                    let extra: Vec<String> = attributes
                        .keys()
                        .filter(|name| !fields.contains(&name.as_str()))
                        .cloned()
                        .collect();
                    if !extra.is_empty() {
                        return Err(self.error(DecodeErrorKind::StructMismatch {
                            target: name,
                            extra,
                        }));
                    }
                }
                self.visit_entries(visitor, value, entries)
            }
            Resolved::Known(value, _) => Err(self.mismatch(name, value)),
        }
    }

    fn deserialize_enum<V: Visitor<'a>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        match self.resolve(name)? {
            Resolved::Empty => Err(self.error(DecodeErrorKind::NoEmptyValue { target: name })),
            Resolved::Known(_, Raw::String(s)) => {
                visitor.visit_enum(BorrowedStrDeserializer::<DecodeError>::new(s))
            }
            Resolved::Known(value, _) => Err(self.mismatch(name, value)),
        }
    }

    fn deserialize_identifier<V: Visitor<'a>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'a>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }
}

/// Elements of a list, set, or tuple.
struct ElementAccess<'a, 'p> {
    ctx: &'a Context,
    opts: &'a Options,
    path: &'p AttributePath,
    elems: slice::Iter<'a, WireValue>,
    index: usize,
    by_value: bool,
}

impl<'a> de::SeqAccess<'a> for ElementAccess<'a, '_> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'a>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        let Some(elem) = self.elems.next() else {
            return Ok(None);
        };
        let step = if self.by_value {
            PathStep::ElementKeyValue(elem.clone())
        } else {
            PathStep::ElementKeyInt(self.index as i64)
        };
        let path = self.path.with_step(step);
        self.ctx
            .check()
            .map_err(|e| DecodeError::new(path.clone(), e.into()))?;
        self.index += 1;

        let de = WireDeserializer::new(self.ctx, Input::Value(elem), self.opts, path.clone());
        seed.deserialize(de).map(Some).map_err(|e| e.or_at(path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elems.len())
    }
}

/// Entries of a map, or attributes of an object.
struct EntryAccess<'a, 'p> {
    ctx: &'a Context,
    opts: &'a Options,
    path: &'p AttributePath,
    entries: btree_map::Iter<'a, String, WireValue>,
    pending: Option<(&'a String, &'a WireValue)>,
    attributes: bool,
}

impl<'a> de::MapAccess<'a> for EntryAccess<'a, '_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'a>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.ctx
            .check()
            .map_err(|e| DecodeError::new(self.path.clone(), e.into()))?;
        self.pending = Some((key, value));
        seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(key))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'a>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
        let Some((key, value)) = self.pending.take() else {
            return Err(DecodeError::new(
                self.path.clone(),
                DecodeErrorKind::Custom("value requested before key".into()),
            ));
        };
        let path = if self.attributes {
            self.path.with_attribute_name(key.clone())
        } else {
            self.path.with_element_key_string(key.clone())
        };
        let de = WireDeserializer::new(self.ctx, Input::Value(value), self.opts, path.clone());
        seed.deserialize(de).map_err(|e| e.or_at(path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Every field of a struct being emptied, each as a null or unknown.
struct EmptyStructAccess<'a, 'p> {
    ctx: &'a Context,
    opts: &'a Options,
    path: &'p AttributePath,
    fields: slice::Iter<'static, &'static str>,
    pending: Option<&'static str>,
    input: Input<'a>,
}

impl<'a> de::MapAccess<'a> for EmptyStructAccess<'a, '_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'a>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        let Some(&field) = self.fields.next() else {
            return Ok(None);
        };
        self.pending = Some(field);
        seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(field))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'a>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
        let Some(field) = self.pending.take() else {
            return Err(DecodeError::new(
                self.path.clone(),
                DecodeErrorKind::Custom("value requested before key".into()),
            ));
        };
        let path = self.path.with_attribute_name(field);
        let de = WireDeserializer::new(self.ctx, self.input, self.opts, path.clone());
        seed.deserialize(de).map_err(|e| e.or_at(path))
    }
}
