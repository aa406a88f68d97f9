//! Routines shared by every container kind.
//!
//! Lists, sets, maps, objects and tuples differ only in how their elements
//! are keyed. Conversion in both directions, validation, decoding and
//! equality all go through here so the containers can't drift apart.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tfattr_reflect::Options;
use tfattr_wire::{
    validate_value, AttributePath, Context, PathStep, WireError, WireType, WireValue,
};

use crate::{AttrError, AttrType, AttrValue, Result};

/// Convert one wire element with its element type, tagging failures with
/// the element's step.
pub(crate) fn element_from_terraform(
    ctx: &Context,
    elem_type: &dyn AttrType,
    elem: &WireValue,
    step: impl Fn() -> PathStep,
) -> Result<Arc<dyn AttrValue>> {
    ctx.check().map_err(|e| AttrError::element(step(), e.into()))?;
    elem_type
        .value_from_terraform(ctx, elem)
        .map_err(|e| AttrError::element(step(), e))
}

/// Convert one element to a wire value of `elem_type`.
///
/// Conversion failures are tagged as element errors. A payload that doesn't
/// fit `elem_type` means the container was built with an element of the
/// wrong type, and is reported as a validation error.
pub(crate) fn element_to_wire(
    ctx: &Context,
    elem: &dyn AttrValue,
    elem_type: &WireType,
    step: impl Fn() -> PathStep,
) -> Result<WireValue> {
    ctx.check().map_err(|e| AttrError::element(step(), e.into()))?;
    let payload = elem
        .to_terraform_value(ctx)
        .map_err(|e| AttrError::element(step(), e))?;
    validate_value(elem_type, &payload).map_err(|source| AttrError::Validation {
        step: step(),
        source,
    })?;
    WireValue::new(elem_type.clone(), payload).map_err(|source| AttrError::Validation {
        step: step(),
        source,
    })
}

/// Check that a wire value has exactly the descriptor of `ty`.
///
/// A value of the wrong container kind is a shape mismatch. A value of the
/// right kind with different element or attribute types is a type mismatch,
/// even when it is null, unknown or empty.
pub(crate) fn expect_type(
    value: &WireValue,
    ty: &dyn AttrType,
    kind: &'static str,
    is_kind: impl FnOnce(&WireType) -> bool,
) -> Result<()> {
    if !is_kind(value.ty()) {
        return Err(WireError::ShapeMismatch {
            expected: kind,
            found: value.ty().clone(),
        }
        .into());
    }
    let expected = ty.terraform_type();
    if value.ty() != &expected {
        return Err(WireError::TypeMismatch {
            path: AttributePath::new(),
            expected,
            found: value.ty().clone(),
        }
        .into());
    }
    Ok(())
}

/// Decode a container's wire form into a native target.
///
/// `target` is only written when decoding succeeds.
pub(crate) fn decode_into<T: DeserializeOwned>(
    ctx: &Context,
    wire: &WireValue,
    target: &mut T,
    allow_unhandled: bool,
) -> Result<()> {
    let opts = Options::allow_unhandled(allow_unhandled);
    *target = tfattr_reflect::into(ctx, wire, &opts, AttributePath::new())?;
    Ok(())
}

/// Pairwise equality of two element sequences.
pub(crate) fn elements_equal(a: &[Arc<dyn AttrValue>], b: &[Arc<dyn AttrValue>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equal(y.as_ref()))
}

/// Equality of two element sequences regardless of order.
///
/// Every element of `a` must be matched by a distinct equal element of `b`.
pub(crate) fn members_equal(a: &[Arc<dyn AttrValue>], b: &[Arc<dyn AttrValue>]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut matched = vec![false; b.len()];
    a.iter().all(|x| {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, y)| !matched[i] && x.equal(y.as_ref()));
        match found {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Find the element at a list or tuple index.
pub(crate) fn element_at(
    elems: &[Arc<dyn AttrValue>],
    step: &PathStep,
) -> Option<Arc<dyn AttrValue>> {
    match step {
        PathStep::ElementKeyInt(i) => usize::try_from(*i).ok().and_then(|i| elems.get(i)).cloned(),
        _ => None,
    }
}

pub(crate) fn invalid_step(step: &PathStep, target: impl ToString) -> WireError {
    WireError::InvalidStep {
        step: step.clone(),
        target: target.to_string(),
    }
}
