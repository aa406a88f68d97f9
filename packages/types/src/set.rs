//! Sets: unordered collections of values of one element type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfattr_wire::{
    AttributePath, Context, Payload, PathStep, Raw, ValueState, WireError, WireType, WireValue,
};
use tracing::trace;

use crate::container::{
    decode_into, element_from_terraform, element_to_wire, expect_type, invalid_step, members_equal,
};
use crate::{AttrType, AttrValue, Result};

/// The type of a set whose elements are all of `elem_type`.
#[derive(Clone, Debug)]
pub struct SetType {
    elem_type: Arc<dyn AttrType>,
}

impl SetType {
    pub fn new(elem_type: Arc<dyn AttrType>) -> Self {
        Self { elem_type }
    }

    pub fn elem_type(&self) -> &Arc<dyn AttrType> {
        &self.elem_type
    }

    /// Like [`AttrType::value_from_terraform`], returning the concrete value.
    pub fn set_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Set> {
        expect_type(value, self, "set", WireType::is_set)?;
        if !value.is_known() {
            return Ok(Set::unknown(self.elem_type.clone()));
        }
        if value.is_null() {
            return Ok(Set::null(self.elem_type.clone()));
        }

        let elems = value.as_list()?;
        trace!(ty = %self, len = elems.len(), "converting set from wire value");

        let mut out = Vec::with_capacity(elems.len());
        for elem in elems {
            out.push(element_from_terraform(ctx, self.elem_type.as_ref(), elem, || {
                PathStep::ElementKeyValue(elem.clone())
            })?);
        }
        Ok(Set::new(self.elem_type.clone(), out))
    }

    /// Build a set of this type from a native value.
    pub fn set_from_native<T: Serialize + ?Sized>(&self, ctx: &Context, value: &T) -> Result<Set> {
        let wire =
            tfattr_reflect::from_native(ctx, &self.terraform_type(), value, AttributePath::new())?;
        self.set_from_terraform(ctx, &wire)
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetType[{}]", self.elem_type)
    }
}

impl AttrType for SetType {
    fn terraform_type(&self) -> WireType {
        WireType::set(self.elem_type.terraform_type())
    }

    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>> {
        Ok(Arc::new(self.set_from_terraform(ctx, value)?))
    }

    fn equal(&self, other: &dyn AttrType) -> bool {
        other
            .as_any()
            .downcast_ref::<SetType>()
            .is_some_and(|other| self.elem_type.equal(other.elem_type.as_ref()))
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        match step {
            PathStep::ElementKeyValue(_) => Ok(self.elem_type.clone()),
            _ => Err(invalid_step(step, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A set value.
///
/// Element order is kept as given but carries no meaning: two known sets are
/// equal when their elements can be paired off one to one.
#[derive(Clone, Debug)]
pub struct Set {
    elem_type: Arc<dyn AttrType>,
    elem_wire: WireType,
    state: ValueState<Vec<Arc<dyn AttrValue>>>,
}

impl Set {
    /// A known set. Elements are checked when converted to a wire value.
    pub fn new(elem_type: Arc<dyn AttrType>, elems: Vec<Arc<dyn AttrValue>>) -> Self {
        Self::with_state(elem_type, ValueState::Known(elems))
    }

    pub fn unknown(elem_type: Arc<dyn AttrType>) -> Self {
        Self::with_state(elem_type, ValueState::Unknown)
    }

    pub fn null(elem_type: Arc<dyn AttrType>) -> Self {
        Self::with_state(elem_type, ValueState::Null)
    }

    fn with_state(elem_type: Arc<dyn AttrType>, state: ValueState<Vec<Arc<dyn AttrValue>>>) -> Self {
        Self {
            elem_wire: elem_type.terraform_type(),
            elem_type,
            state,
        }
    }

    pub fn elem_type(&self) -> &Arc<dyn AttrType> {
        &self.elem_type
    }

    /// The wire descriptor of the element type.
    pub fn elem_wire_type(&self) -> &WireType {
        &self.elem_wire
    }

    pub fn state(&self) -> &ValueState<Vec<Arc<dyn AttrValue>>> {
        &self.state
    }

    pub fn elements(&self) -> Option<&[Arc<dyn AttrValue>]> {
        self.state.known().map(Vec::as_slice)
    }

    /// Populate `target` with the set's elements. See [`List::elements_as`].
    ///
    /// [`List::elements_as`]: crate::List::elements_as
    pub fn elements_as<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        target: &mut T,
        allow_unhandled: bool,
    ) -> Result<()> {
        let wire = self.to_wire(ctx)?;
        decode_into(ctx, &wire, target, allow_unhandled)
    }
}

impl AttrValue for Set {
    fn attr_type(&self) -> Arc<dyn AttrType> {
        Arc::new(SetType::new(self.elem_type.clone()))
    }

    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload> {
        let elems = match &self.state {
            ValueState::Unknown => return Ok(ValueState::Unknown),
            ValueState::Null => return Ok(ValueState::Null),
            ValueState::Known(elems) => elems,
        };
        trace!(elem_type = %self.elem_wire, len = elems.len(), "converting set to wire value");

        let mut out = Vec::with_capacity(elems.len());
        for (i, elem) in elems.iter().enumerate() {
            // Members have no wire value yet, so failures are tagged by position.
            out.push(element_to_wire(ctx, elem.as_ref(), &self.elem_wire, || {
                PathStep::ElementKeyInt(i as i64)
            })?);
        }
        Ok(ValueState::Known(Raw::List(out)))
    }

    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(WireType::set(self.elem_wire.clone()), payload)?)
    }

    fn equal(&self, other: &dyn AttrValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Set>() else {
            return false;
        };
        if self.elem_wire != other.elem_wire {
            return false;
        }
        match (&self.state, &other.state) {
            (ValueState::Unknown, ValueState::Unknown) | (ValueState::Null, ValueState::Null) => {
                true
            }
            (ValueState::Known(a), ValueState::Known(b)) => members_equal(a, b),
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
        let invalid = || invalid_step(step, format!("set of {}", self.elem_wire));
        let (PathStep::ElementKeyValue(member), Some(elems)) = (step, self.elements()) else {
            return Err(invalid());
        };
        // Stepping has no caller context. Each member is matched by its own
        // wire form, which is built from values already in memory and never
        // waits on anything, so a context that can't be cancelled is used.
        let ctx = Context::background();
        elems
            .iter()
            .find(|elem| elem.to_wire(&ctx).is_ok_and(|wire| &wire == member))
            .cloned()
            .ok_or_else(invalid)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
