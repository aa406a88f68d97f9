//! The attribute type and attribute value capability traits.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tfattr_wire::{AttributePathStepper, Context, Payload, PathStep, WireError, WireType, WireValue};

use crate::Result;

/// A type in the attribute system.
///
/// An attribute type knows which wire type descriptor it stands for and how
/// to turn wire values of that descriptor into typed [`AttrValue`]s. Types
/// are immutable and shared across threads as `Arc<dyn AttrType>`.
pub trait AttrType: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The wire type descriptor for values of this type.
    fn terraform_type(&self) -> WireType;

    /// Convert a wire value into a typed value.
    ///
    /// Unknown and null wire values become the unknown and null states of
    /// this type's value without further inspection.
    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>>;

    /// Structural equality with another type.
    fn equal(&self, other: &dyn AttrType) -> bool;

    /// The type of the child a path step leads to.
    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        Err(WireError::InvalidStep {
            step: step.clone(),
            target: self.to_string(),
        })
    }

    fn as_any(&self) -> &dyn Any;
}

/// A typed, tri-state value.
///
/// Values are immutable. Every value is in exactly one of the unknown, null,
/// and known states; only known values carry data.
pub trait AttrValue: fmt::Debug + Send + Sync + 'static {
    /// The attribute type this value belongs to.
    fn attr_type(&self) -> Arc<dyn AttrType>;

    /// The payload `WireValue::new` accepts for this value's wire type.
    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload>;

    /// This value as a validated wire value.
    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(self.attr_type().terraform_type(), payload)?)
    }

    /// Semantic equality. Values of different concrete kinds are never equal.
    fn equal(&self, other: &dyn AttrValue) -> bool;

    fn is_null(&self) -> bool;

    fn is_unknown(&self) -> bool;

    /// The child value a path step leads to.
    fn apply_path_step(
        &self,
        step: &PathStep,
    ) -> std::result::Result<Arc<dyn AttrValue>, WireError> {
        Err(WireError::InvalidStep {
            step: step.clone(),
            target: format!("{:?}", self),
        })
    }

    fn as_any(&self) -> &dyn Any;
}

impl PartialEq for dyn AttrType {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl PartialEq for dyn AttrValue {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl AttributePathStepper for dyn AttrType {
    type Output = Arc<dyn AttrType>;

    fn apply_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        self.apply_path_step(step)
    }
}

impl AttributePathStepper for dyn AttrValue {
    type Output = Arc<dyn AttrValue>;

    fn apply_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrValue>, WireError> {
        self.apply_path_step(step)
    }
}
