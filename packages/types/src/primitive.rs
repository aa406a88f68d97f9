//! Primitive attribute kinds: strings, bools, and numbers.
//!
//! Each kind is a unit type struct plus a value struct holding a
//! `ValueState` of the native representation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tfattr_wire::{
    AttributePath, Context, Number, Payload, Raw, ValueState, WireError, WireType, WireValue,
};

use crate::{AttrError, AttrType, AttrValue, Result};

/// Equality of native values. Floats treat NaN as equal to itself.
trait Same {
    fn same(&self, other: &Self) -> bool;
}

macro_rules! same_by_eq {
    ($($native:ty),*) => {
        $(impl Same for $native {
            fn same(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

same_by_eq!(String, bool, i64, Number);

impl Same for f64 {
    fn same(&self, other: &Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

macro_rules! primitive {
    (
        $(#[$type_meta:meta])*
        type $ty:ident;
        $(#[$value_meta:meta])*
        value $value:ident($native:ty);
        wire = $wire:expr;
        name = $name:literal;
        read = $read:expr;
        write = $write:expr;
    ) => {
        $(#[$type_meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $ty;

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($name)
            }
        }

        impl AttrType for $ty {
            fn terraform_type(&self) -> WireType {
                $wire
            }

            fn value_from_terraform(
                &self,
                _ctx: &Context,
                value: &WireValue,
            ) -> Result<Arc<dyn AttrValue>> {
                Ok(Arc::new($value::from_wire(value)?))
            }

            fn equal(&self, other: &dyn AttrType) -> bool {
                other.as_any().is::<$ty>()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        $(#[$value_meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $value {
            state: ValueState<$native>,
        }

        impl $value {
            pub fn new(value: impl Into<$native>) -> Self {
                Self {
                    state: ValueState::Known(value.into()),
                }
            }

            pub fn unknown() -> Self {
                Self {
                    state: ValueState::Unknown,
                }
            }

            pub fn null() -> Self {
                Self {
                    state: ValueState::Null,
                }
            }

            pub fn state(&self) -> &ValueState<$native> {
                &self.state
            }

            /// The native value, if known.
            pub fn value(&self) -> Option<&$native> {
                self.state.known()
            }

            /// Convert a wire value. Unknown and null carry over as-is.
            pub fn from_wire(value: &WireValue) -> Result<Self> {
                if value.ty() != &$wire {
                    return Err(WireError::TypeMismatch {
                        path: AttributePath::new(),
                        expected: $wire,
                        found: value.ty().clone(),
                    }
                    .into());
                }
                let read: fn(&WireValue) -> Result<$native> = $read;
                let state = match value.payload() {
                    ValueState::Unknown => ValueState::Unknown,
                    ValueState::Null => ValueState::Null,
                    ValueState::Known(_) => ValueState::Known(read(value)?),
                };
                Ok(Self { state })
            }
        }

        impl PartialEq for $value {
            fn eq(&self, other: &Self) -> bool {
                match (&self.state, &other.state) {
                    (ValueState::Known(a), ValueState::Known(b)) => a.same(b),
                    (ValueState::Unknown, ValueState::Unknown)
                    | (ValueState::Null, ValueState::Null) => true,
                    _ => false,
                }
            }
        }

        impl From<$native> for $value {
            fn from(value: $native) -> Self {
                Self {
                    state: ValueState::Known(value),
                }
            }
        }

        impl AttrValue for $value {
            fn attr_type(&self) -> Arc<dyn AttrType> {
                Arc::new($ty)
            }

            fn to_terraform_value(&self, _ctx: &Context) -> Result<Payload> {
                let write: fn(&$native) -> Raw = $write;
                Ok(self.state.as_ref().map(write))
            }

            fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
                Ok(WireValue::new($wire, self.to_terraform_value(ctx)?)?)
            }

            fn equal(&self, other: &dyn AttrValue) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$value>()
                    .is_some_and(|other| self == other)
            }

            fn is_null(&self) -> bool {
                self.state.is_null()
            }

            fn is_unknown(&self) -> bool {
                self.state.is_unknown()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

primitive! {
    /// UTF-8 strings.
    type StringType;
    value StringValue(String);
    wire = WireType::String;
    name = "StringType";
    read = |v| Ok(v.as_str()?.to_owned());
    write = |s| Raw::String(s.clone());
}

primitive! {
    type BoolType;
    value BoolValue(bool);
    wire = WireType::Bool;
    name = "BoolType";
    read = |v| Ok(v.as_bool()?);
    write = |b| Raw::Bool(*b);
}

primitive! {
    /// Numbers that must be integers in the `i64` range.
    type Int64Type;
    value Int64Value(i64);
    wire = WireType::Number;
    name = "Int64Type";
    read = |v| {
        let number = v.as_number()?;
        number.as_i64().ok_or(AttrError::NumberRange {
            number,
            target: "int64",
        })
    };
    write = |i| Raw::Number(Number::Integer(*i));
}

primitive! {
    /// Numbers as `f64`. Integers beyond 2^53 lose precision.
    type Float64Type;
    value Float64Value(f64);
    wire = WireType::Number;
    name = "Float64Type";
    read = |v| Ok(v.as_number()?.as_f64());
    write = |f| Raw::Number(Number::Float(*f));
}

primitive! {
    /// Numbers exactly as they arrived, integer or float.
    type NumberType;
    value NumberValue(Number);
    wire = WireType::Number;
    name = "NumberType";
    read = |v| Ok(v.as_number()?);
    write = |n| Raw::Number(*n);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_round_trip() {
        let ctx = Context::background();
        for value in [StringValue::new("x"), StringValue::null(), StringValue::unknown()] {
            let wire = value.to_wire(&ctx).unwrap();
            let back = StringType.value_from_terraform(&ctx, &wire).unwrap();
            assert!(back.equal(&value));
        }
    }

    #[test]
    fn kinds_never_compare_equal() {
        // Same wire type, different kinds.
        assert!(!Int64Value::new(1).equal(&NumberValue::new(1)));
        assert!(!Int64Type.equal(&Float64Type));
        assert!(Int64Type.equal(&Int64Type));
        assert!(!StringValue::null().equal(&BoolValue::null()));
    }

    #[test]
    fn int64_rejects_fractions() {
        let err = Int64Value::from_wire(&WireValue::number(2.5)).unwrap_err();
        assert!(matches!(err, AttrError::NumberRange { target: "int64", .. }));
        assert_eq!(
            Int64Value::from_wire(&WireValue::number(3.0)).unwrap(),
            Int64Value::new(3)
        );
    }

    #[test]
    fn shape_mismatch() {
        let err = StringValue::from_wire(&WireValue::bool(true)).unwrap_err();
        assert!(matches!(err, AttrError::Wire(_)));
        let err = StringValue::from_wire(&WireValue::null(WireType::Bool)).unwrap_err();
        assert!(matches!(err, AttrError::Wire(WireError::TypeMismatch { .. })));
    }

    #[test]
    fn nan_equals_itself() {
        let nan = Float64Value::new(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert!(nan.equal(&nan));
        assert!(!nan.equal(&Float64Value::new(0.0)));
        assert!(NumberValue::new(f64::NAN).equal(&NumberValue::new(f64::NAN)));

        let ctx = Context::background();
        let back = Float64Type
            .value_from_terraform(&ctx, &nan.to_wire(&ctx).unwrap())
            .unwrap();
        assert!(back.equal(&nan));
    }

    #[test]
    fn unknown_and_null_are_distinct() {
        let unknown = BoolValue::unknown();
        let null = BoolValue::null();
        assert!(unknown.is_unknown() && !unknown.is_null());
        assert!(null.is_null() && !null.is_unknown());
        assert!(!unknown.equal(&null));
        assert_eq!(BoolValue::default(), null);
    }

    #[test]
    fn float_and_number() {
        let ctx = Context::background();
        let wire = Float64Value::new(1.5).to_wire(&ctx).unwrap();
        assert_eq!(wire, WireValue::number(1.5));
        assert_eq!(NumberValue::from_wire(&wire).unwrap().value(), Some(&Number::Float(1.5)));
    }
}
