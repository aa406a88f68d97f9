//! The WireValue type - a type descriptor paired with a tri-state payload.
//!
//! Every `WireValue` is valid for its own type: the only way to build one
//! with data is [`WireValue::new`], which checks the payload against the
//! descriptor. Nested values were checked when they were built, so validation
//! only ever looks one level down.

use std::collections::BTreeMap;
use std::fmt;

use crate::{AttributePath, WireError, WireType};

/// The three states any value can be in.
///
/// Shared by the wire layer and every typed attribute value so that "exactly
/// one of unknown, null, or known" holds by construction rather than by
/// convention.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueState<T> {
    /// Not yet determined; the peer will only know after some later step.
    Unknown,
    /// Absent. Distinct from "known and empty".
    #[default]
    Null,
    /// Present with data.
    Known(T),
}

impl<T> ValueState<T> {
    /// Check if this is the unknown state.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ValueState::Unknown)
    }

    /// Check if this is the null state.
    pub fn is_null(&self) -> bool {
        matches!(self, ValueState::Null)
    }

    /// The data, if known.
    pub fn known(&self) -> Option<&T> {
        match self {
            ValueState::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Consume the state, returning the data if known.
    pub fn into_known(self) -> Option<T> {
        match self {
            ValueState::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the data while keeping the state.
    pub fn as_ref(&self) -> ValueState<&T> {
        match self {
            ValueState::Unknown => ValueState::Unknown,
            ValueState::Null => ValueState::Null,
            ValueState::Known(v) => ValueState::Known(v),
        }
    }

    /// Transform known data, keeping unknown and null as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValueState<U> {
        match self {
            ValueState::Unknown => ValueState::Unknown,
            ValueState::Null => ValueState::Null,
            ValueState::Known(v) => ValueState::Known(f(v)),
        }
    }

    /// Fallibly transform known data, keeping unknown and null as they are.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ValueState<U>, E> {
        Ok(match self {
            ValueState::Unknown => ValueState::Unknown,
            ValueState::Null => ValueState::Null,
            ValueState::Known(v) => ValueState::Known(f(v)?),
        })
    }
}

impl<T> From<T> for ValueState<T> {
    fn from(v: T) -> Self {
        ValueState::Known(v)
    }
}

/// The payload accepted by [`WireValue::new`].
pub type Payload = ValueState<Raw>;

/// Known data inside a [`WireValue`].
///
/// `List` carries the elements of lists, sets and tuples; `Map` carries the
/// entries of maps and the attributes of objects. The paired [`WireType`]
/// decides which.
#[derive(Clone, Debug, PartialEq)]
pub enum Raw {
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<WireValue>),
    Map(BTreeMap<String, WireValue>),
}

impl Raw {
    /// The bare name of this payload shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Raw::Bool(_) => "bool",
            Raw::Number(_) => "number",
            Raw::String(_) => "string",
            Raw::List(_) => "list",
            Raw::Map(_) => "map",
        }
    }
}

/// A number as carried on the wire.
///
/// Integers and floats compare equal when they denote the same number, so
/// `Integer(3) == Float(3.0)`. NaN equals NaN, so equality stays reflexive.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// The number as an `i64`, if it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Integer(i) => Some(i),
            Number::Float(f) => float_to_i64(f),
        }
    }

    /// The number as an `f64`. Large integers may lose precision.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
                float_to_i64(f) == Some(i)
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Integer(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Integer(v as i64)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A dynamically-typed value exchanged with the protocol peer.
#[derive(Clone, Debug, PartialEq)]
pub struct WireValue {
    ty: WireType,
    payload: Payload,
}

impl WireValue {
    /// Build a value, checking the payload against the type.
    ///
    /// Unknown and null payloads are valid for every type.
    pub fn new(ty: WireType, payload: impl Into<Payload>) -> Result<Self, WireError> {
        let payload = payload.into();
        validate_value(&ty, &payload)?;
        Ok(Self { ty, payload })
    }

    /// The unknown value of a type.
    pub fn unknown(ty: WireType) -> Self {
        Self {
            ty,
            payload: ValueState::Unknown,
        }
    }

    /// The null value of a type.
    pub fn null(ty: WireType) -> Self {
        Self {
            ty,
            payload: ValueState::Null,
        }
    }

    /// A known string.
    pub fn string(v: impl Into<String>) -> Self {
        Self {
            ty: WireType::String,
            payload: ValueState::Known(Raw::String(v.into())),
        }
    }

    /// A known bool.
    pub fn bool(v: bool) -> Self {
        Self {
            ty: WireType::Bool,
            payload: ValueState::Known(Raw::Bool(v)),
        }
    }

    /// A known number.
    pub fn number(v: impl Into<Number>) -> Self {
        Self {
            ty: WireType::Number,
            payload: ValueState::Known(Raw::Number(v.into())),
        }
    }

    /// The type this value was built with.
    pub fn ty(&self) -> &WireType {
        &self.ty
    }

    /// The payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Split into type and payload.
    pub fn into_parts(self) -> (WireType, Payload) {
        (self.ty, self.payload)
    }

    /// False only for unknown values. Null values are known to be null.
    pub fn is_known(&self) -> bool {
        !self.payload.is_unknown()
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        self.payload.is_null()
    }

    /// Check that neither this value nor anything nested in it is unknown.
    pub fn is_fully_known(&self) -> bool {
        match &self.payload {
            ValueState::Unknown => false,
            ValueState::Null => true,
            ValueState::Known(Raw::List(elems)) => elems.iter().all(WireValue::is_fully_known),
            ValueState::Known(Raw::Map(entries)) => {
                entries.values().all(WireValue::is_fully_known)
            }
            ValueState::Known(_) => true,
        }
    }

    /// Read a bool.
    pub fn as_bool(&self) -> Result<bool, WireError> {
        self.expect_shape("bool", matches!(self.ty, WireType::Bool))?;
        match self.known("bool")? {
            Raw::Bool(b) => Ok(*b),
            _ => Err(self.shape_mismatch("bool")),
        }
    }

    /// Read a number.
    pub fn as_number(&self) -> Result<Number, WireError> {
        self.expect_shape("number", matches!(self.ty, WireType::Number))?;
        match self.known("number")? {
            Raw::Number(n) => Ok(*n),
            _ => Err(self.shape_mismatch("number")),
        }
    }

    /// Read a string.
    pub fn as_str(&self) -> Result<&str, WireError> {
        self.expect_shape("string", matches!(self.ty, WireType::String))?;
        match self.known("string")? {
            Raw::String(s) => Ok(s),
            _ => Err(self.shape_mismatch("string")),
        }
    }

    /// Read the elements of a list, set, or tuple.
    pub fn as_list(&self) -> Result<&[WireValue], WireError> {
        self.expect_shape(
            "list",
            matches!(
                self.ty,
                WireType::List(_) | WireType::Set(_) | WireType::Tuple(_)
            ),
        )?;
        match self.known("list")? {
            Raw::List(elems) => Ok(elems),
            _ => Err(self.shape_mismatch("list")),
        }
    }

    /// Read the entries of a map or the attributes of an object.
    pub fn as_map(&self) -> Result<&BTreeMap<String, WireValue>, WireError> {
        self.expect_shape(
            "map",
            matches!(self.ty, WireType::Map(_) | WireType::Object(_)),
        )?;
        match self.known("map")? {
            Raw::Map(entries) => Ok(entries),
            _ => Err(self.shape_mismatch("map")),
        }
    }

    fn expect_shape(&self, expected: &'static str, ok: bool) -> Result<(), WireError> {
        if ok {
            Ok(())
        } else {
            Err(self.shape_mismatch(expected))
        }
    }

    fn shape_mismatch(&self, expected: &'static str) -> WireError {
        WireError::ShapeMismatch {
            expected,
            found: self.ty.clone(),
        }
    }

    fn known(&self, expected: &'static str) -> Result<&Raw, WireError> {
        match &self.payload {
            ValueState::Unknown => Err(WireError::NotKnown { expected }),
            ValueState::Null => Err(WireError::Null { expected }),
            ValueState::Known(raw) => Ok(raw),
        }
    }
}

/// Check a payload against a type descriptor.
///
/// Nested `WireValue`s are already valid for their own types, so this only
/// has to check that each child's type is the one the container declares.
pub fn validate_value(ty: &WireType, payload: &Payload) -> Result<(), WireError> {
    let ValueState::Known(raw) = payload else {
        return Ok(());
    };

    match (ty, raw) {
        (WireType::Bool, Raw::Bool(_))
        | (WireType::Number, Raw::Number(_))
        | (WireType::String, Raw::String(_)) => Ok(()),
        (WireType::List(elem), Raw::List(elems)) => {
            for (i, child) in elems.iter().enumerate() {
                check_child(elem, child, || {
                    AttributePath::new().with_element_key_int(i as i64)
                })?;
            }
            Ok(())
        }
        (WireType::Set(elem), Raw::List(elems)) => {
            for child in elems {
                check_child(elem, child, || {
                    AttributePath::new().with_element_key_value(child.clone())
                })?;
            }
            Ok(())
        }
        (WireType::Tuple(types), Raw::List(elems)) => {
            if types.len() != elems.len() {
                return Err(WireError::TupleLength {
                    path: AttributePath::new(),
                    expected: types.len(),
                    found: elems.len(),
                });
            }
            for (i, (elem, child)) in types.iter().zip(elems).enumerate() {
                check_child(elem, child, || {
                    AttributePath::new().with_element_key_int(i as i64)
                })?;
            }
            Ok(())
        }
        (WireType::Map(elem), Raw::Map(entries)) => {
            for (key, child) in entries {
                check_child(elem, child, || {
                    AttributePath::new().with_element_key_string(key.clone())
                })?;
            }
            Ok(())
        }
        (WireType::Object(attributes), Raw::Map(entries)) => {
            if let Some(name) = entries.keys().find(|k| !attributes.contains_key(*k)) {
                return Err(WireError::UnexpectedAttribute {
                    path: AttributePath::new(),
                    name: name.clone(),
                });
            }
            for (name, attr_type) in attributes {
                let Some(child) = entries.get(name) else {
                    return Err(WireError::MissingAttribute {
                        path: AttributePath::new(),
                        name: name.clone(),
                    });
                };
                check_child(attr_type, child, || {
                    AttributePath::new().with_attribute_name(name.clone())
                })?;
            }
            Ok(())
        }
        (ty, raw) => Err(WireError::PayloadMismatch {
            path: AttributePath::new(),
            expected: ty.clone(),
            found: raw.kind_name(),
        }),
    }
}

fn check_child(
    expected: &WireType,
    child: &WireValue,
    path: impl FnOnce() -> AttributePath,
) -> Result<(), WireError> {
    if child.ty() == expected {
        Ok(())
    } else {
        Err(WireError::TypeMismatch {
            path: path(),
            expected: expected.clone(),
            found: child.ty().clone(),
        })
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.ty)?;
        write_payload(f, &self.payload)?;
        write!(f, ">")
    }
}

fn write_payload(f: &mut fmt::Formatter<'_>, payload: &Payload) -> fmt::Result {
    match payload {
        ValueState::Unknown => write!(f, "unknown"),
        ValueState::Null => write!(f, "null"),
        ValueState::Known(Raw::Bool(b)) => write!(f, "{}", b),
        ValueState::Known(Raw::Number(n)) => write!(f, "{}", n),
        ValueState::Known(Raw::String(s)) => write!(f, "{:?}", s),
        ValueState::Known(Raw::List(elems)) => {
            write!(f, "[")?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_payload(f, elem.payload())?;
            }
            write!(f, "]")
        }
        ValueState::Known(Raw::Map(entries)) => {
            write!(f, "{{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}: ", key)?;
                write_payload(f, value.payload())?;
            }
            write!(f, "}}")
        }
    }
}
