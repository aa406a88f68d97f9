//! Tuples: fixed-length sequences with a type per position.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tfattr_wire::{
    AttributePath, Context, Payload, PathStep, Raw, ValueState, WireError, WireType, WireValue,
};
use tracing::trace;

use crate::container::{
    element_at, element_from_terraform, element_to_wire, elements_equal, expect_type, invalid_step,
};
use crate::{AttrError, AttrType, AttrValue, Result};

#[derive(Clone, Debug)]
pub struct TupleType {
    elem_types: Vec<Arc<dyn AttrType>>,
}

impl TupleType {
    pub fn new(elem_types: Vec<Arc<dyn AttrType>>) -> Self {
        Self { elem_types }
    }

    pub fn elem_types(&self) -> &[Arc<dyn AttrType>] {
        &self.elem_types
    }

    pub fn tuple_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Tuple> {
        expect_type(value, self, "tuple", |ty| matches!(ty, WireType::Tuple(_)))?;
        if !value.is_known() {
            return Ok(Tuple::unknown(self.elem_types.clone()));
        }
        if value.is_null() {
            return Ok(Tuple::null(self.elem_types.clone()));
        }

        let elems = value.as_list()?;
        if elems.len() != self.elem_types.len() {
            return Err(WireError::TupleLength {
                path: AttributePath::new(),
                expected: self.elem_types.len(),
                found: elems.len(),
            }
            .into());
        }
        trace!(ty = %self, "converting tuple from wire value");

        let mut out = Vec::with_capacity(elems.len());
        for (i, (elem_type, elem)) in self.elem_types.iter().zip(elems).enumerate() {
            out.push(element_from_terraform(ctx, elem_type.as_ref(), elem, || {
                PathStep::ElementKeyInt(i as i64)
            })?);
        }
        Ok(Tuple::new(self.elem_types.clone(), out))
    }
}

impl fmt::Display for TupleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TupleType[")?;
        for (i, ty) in self.elem_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, "]")
    }
}

impl AttrType for TupleType {
    fn terraform_type(&self) -> WireType {
        WireType::tuple(self.elem_types.iter().map(|t| t.terraform_type()).collect())
    }

    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>> {
        Ok(Arc::new(self.tuple_from_terraform(ctx, value)?))
    }

    fn equal(&self, other: &dyn AttrType) -> bool {
        other.as_any().downcast_ref::<TupleType>().is_some_and(|other| {
            self.elem_types.len() == other.elem_types.len()
                && self
                    .elem_types
                    .iter()
                    .zip(&other.elem_types)
                    .all(|(a, b)| a.equal(b.as_ref()))
        })
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        match step {
            PathStep::ElementKeyInt(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| self.elem_types.get(i))
                .cloned()
                .ok_or_else(|| invalid_step(step, self)),
            _ => Err(invalid_step(step, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
pub struct Tuple {
    elem_types: Vec<Arc<dyn AttrType>>,
    elem_wire: Vec<WireType>,
    state: ValueState<Vec<Arc<dyn AttrValue>>>,
}

impl Tuple {
    pub fn new(elem_types: Vec<Arc<dyn AttrType>>, elems: Vec<Arc<dyn AttrValue>>) -> Self {
        Self::with_state(elem_types, ValueState::Known(elems))
    }

    pub fn unknown(elem_types: Vec<Arc<dyn AttrType>>) -> Self {
        Self::with_state(elem_types, ValueState::Unknown)
    }

    pub fn null(elem_types: Vec<Arc<dyn AttrType>>) -> Self {
        Self::with_state(elem_types, ValueState::Null)
    }

    fn with_state(
        elem_types: Vec<Arc<dyn AttrType>>,
        state: ValueState<Vec<Arc<dyn AttrValue>>>,
    ) -> Self {
        Self {
            elem_wire: elem_types.iter().map(|t| t.terraform_type()).collect(),
            elem_types,
            state,
        }
    }

    pub fn elem_types(&self) -> &[Arc<dyn AttrType>] {
        &self.elem_types
    }

    /// The wire descriptor of each position.
    pub fn elem_wire_types(&self) -> &[WireType] {
        &self.elem_wire
    }

    pub fn elements(&self) -> Option<&[Arc<dyn AttrValue>]> {
        self.state.known().map(Vec::as_slice)
    }
}

impl AttrValue for Tuple {
    fn attr_type(&self) -> Arc<dyn AttrType> {
        Arc::new(TupleType::new(self.elem_types.clone()))
    }

    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload> {
        let elems = match &self.state {
            ValueState::Unknown => return Ok(ValueState::Unknown),
            ValueState::Null => return Ok(ValueState::Null),
            ValueState::Known(elems) => elems,
        };
        if elems.len() != self.elem_wire.len() {
            return Err(AttrError::Wire(WireError::TupleLength {
                path: AttributePath::new(),
                expected: self.elem_wire.len(),
                found: elems.len(),
            }));
        }

        let mut out = Vec::with_capacity(elems.len());
        for (i, (elem, elem_type)) in elems.iter().zip(&self.elem_wire).enumerate() {
            out.push(element_to_wire(ctx, elem.as_ref(), elem_type, || {
                PathStep::ElementKeyInt(i as i64)
            })?);
        }
        Ok(ValueState::Known(Raw::List(out)))
    }

    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(WireType::tuple(self.elem_wire.clone()), payload)?)
    }

    fn equal(&self, other: &dyn AttrValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Tuple>() else {
            return false;
        };
        if self.elem_wire != other.elem_wire {
            return false;
        }
        match (&self.state, &other.state) {
            (ValueState::Unknown, ValueState::Unknown) | (ValueState::Null, ValueState::Null) => {
                true
            }
            (ValueState::Known(a), ValueState::Known(b)) => elements_equal(a, b),
            _ => false,
        }
    }

    fn is_null(&self) -> bool {
        self.state.is_null()
    }

    fn is_unknown(&self) -> bool {
        self.state.is_unknown()
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrValue>, WireError> {
        self.elements()
            .and_then(|elems| element_at(elems, step))
            .ok_or_else(|| invalid_step(step, WireType::tuple(self.elem_wire.clone())))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
