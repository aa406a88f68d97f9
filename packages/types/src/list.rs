//! Lists: ordered sequences of values of one element type.

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
    decode_into, element_at, element_from_terraform, element_to_wire, elements_equal, expect_type,
    invalid_step,
};
use crate::{AttrType, AttrValue, Result};

/// The type of a list whose elements are all of `elem_type`.
#[derive(Clone, Debug)]
pub struct ListType {
    elem_type: Arc<dyn AttrType>,
}

impl ListType {
    pub fn new(elem_type: Arc<dyn AttrType>) -> Self {
        Self { elem_type }
    }

    pub fn elem_type(&self) -> &Arc<dyn AttrType> {
        &self.elem_type
    }

    /// Like [`AttrType::value_from_terraform`], returning the concrete value.
    pub fn list_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<List> {
        expect_type(value, self, "list", WireType::is_list)?;
        if !value.is_known() {
            return Ok(List::unknown(self.elem_type.clone()));
        }
        if value.is_null() {
            return Ok(List::null(self.elem_type.clone()));
        }

        let elems = value.as_list()?;
        trace!(ty = %self, len = elems.len(), "converting list from wire value");

        let mut out = Vec::with_capacity(elems.len());
        for (i, elem) in elems.iter().enumerate() {
            out.push(element_from_terraform(ctx, self.elem_type.as_ref(), elem, || {
                PathStep::ElementKeyInt(i as i64)
            })?);
        }
        Ok(List::new(self.elem_type.clone(), out))
    }

    /// Build a list of this type from a native value.
    ///
    /// `None` becomes a null list; `None` elements become null elements.
    pub fn list_from_native<T: Serialize + ?Sized>(&self, ctx: &Context, value: &T) -> Result<List> {
        let wire =
            tfattr_reflect::from_native(ctx, &self.terraform_type(), value, AttributePath::new())?;
        self.list_from_terraform(ctx, &wire)
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListType[{}]", self.elem_type)
    }
}

impl AttrType for ListType {
    fn terraform_type(&self) -> WireType {
        WireType::list(self.elem_type.terraform_type())
    }

    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>> {
        Ok(Arc::new(self.list_from_terraform(ctx, value)?))
    }

    fn equal(&self, other: &dyn AttrType) -> bool {
        other
            .as_any()
            .downcast_ref::<ListType>()
            .is_some_and(|other| self.elem_type.equal(other.elem_type.as_ref()))
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        match step {
            PathStep::ElementKeyInt(_) => Ok(self.elem_type.clone()),
            _ => Err(invalid_step(step, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A list value.
///
/// A list whose element count isn't known yet is unknown as a whole. A known
/// list may still hold unknown elements; each element tracks its own state.
#[derive(Clone, Debug)]
pub struct List {
    elem_type: Arc<dyn AttrType>,
    elem_wire: WireType,
    state: ValueState<Vec<Arc<dyn AttrValue>>>,
}

impl List {
    /// A known list.
    ///
    /// Elements aren't checked against `elem_type` here; a mismatch surfaces
    /// as a validation error when the list is converted to a wire value.
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

    /// The elements, if the list is known.
    pub fn elements(&self) -> Option<&[Arc<dyn AttrValue>]> {
        self.state.known().map(Vec::as_slice)
    }

    /// Populate `target` with the list's elements.
    ///
    /// With `allow_unhandled`, nulls and unknowns the target can't represent
    /// become the target's empty value; without it they are decode errors.
    /// `target` is left untouched on failure.
    pub fn elements_as<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        target: &mut T,
        allow_unhandled: bool,
    ) -> Result<()> {
        let wire = self.to_wire(ctx)?;
        decode_into(ctx, &wire, target, allow_unhandled)
    }

    fn wire_type(&self) -> WireType {
        WireType::list(self.elem_wire.clone())
    }
}

impl AttrValue for List {
    fn attr_type(&self) -> Arc<dyn AttrType> {
        Arc::new(ListType::new(self.elem_type.clone()))
    }

    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload> {
        let elems = match &self.state {
            ValueState::Unknown => return Ok(ValueState::Unknown),
            ValueState::Null => return Ok(ValueState::Null),
            ValueState::Known(elems) => elems,
        };
        trace!(elem_type = %self.elem_wire, len = elems.len(), "converting list to wire value");

        let mut out = Vec::with_capacity(elems.len());
        for (i, elem) in elems.iter().enumerate() {
            out.push(element_to_wire(ctx, elem.as_ref(), &self.elem_wire, || {
                PathStep::ElementKeyInt(i as i64)
            })?);
        }
        Ok(ValueState::Known(Raw::List(out)))
    }

    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(self.wire_type(), payload)?)
    }

    fn equal(&self, other: &dyn AttrValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<List>() else {
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
            .ok_or_else(|| invalid_step(step, format!("list of {}", self.elem_wire)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BoolType, BoolValue, Float64Type, Float64Value, Int64Type, Int64Value, NumberType,
        StringType, StringValue,
    };
    use tfattr_reflect::DecodeErrorKind;

    fn string_list() -> ListType {
        ListType::new(Arc::new(StringType))
    }

    fn strings(items: &[&str]) -> List {
        List::new(
            Arc::new(StringType),
            items
                .iter()
                .map(|s| Arc::new(StringValue::new(*s)) as Arc<dyn AttrValue>)
                .collect(),
        )
    }

    fn wire_strings(items: Vec<WireValue>) -> WireValue {
        WireValue::new(WireType::list(WireType::String), Raw::List(items)).unwrap()
    }

    #[test]
    fn known_list_round_trips() {
        let ctx = Context::background();
        let list = strings(&["a", "b"]);

        let wire = list.to_wire(&ctx).unwrap();
        assert_eq!(
            wire,
            wire_strings(vec![WireValue::string("a"), WireValue::string("b")])
        );

        let back = string_list().list_from_terraform(&ctx, &wire).unwrap();
        assert_eq!(back, list);
        assert!(list.equal(&list));
        assert_eq!(back.elements().map(<[_]>::len), Some(2));
    }

    #[test]
    fn unknown_list_is_not_inspected() {
        let ctx = Context::background();
        let wire = WireValue::unknown(WireType::list(WireType::String));

        let list = string_list().list_from_terraform(&ctx, &wire).unwrap();
        assert!(list.is_unknown());
        assert!(!list.is_null());
        assert!(list.elements().is_none());
        assert_eq!(list.to_terraform_value(&ctx).unwrap(), ValueState::Unknown);
        assert_eq!(list.to_wire(&ctx).unwrap(), wire);
    }

    #[test]
    fn null_list_round_trips() {
        let ctx = Context::background();
        let wire = WireValue::null(WireType::list(WireType::String));

        let list = string_list().list_from_terraform(&ctx, &wire).unwrap();
        assert!(list.is_null());
        assert_eq!(list.to_terraform_value(&ctx).unwrap(), ValueState::Null);
        assert_eq!(list.to_wire(&ctx).unwrap(), wire);
    }

    #[test]
    fn element_type_is_part_of_equality() {
        let a = List::new(Arc::new(StringType), vec![]);
        let b = List::new(Arc::new(BoolType), vec![]);
        assert!(!a.equal(&b));
        assert!(!b.equal(&a));

        let a = List::new(Arc::new(StringType), vec![Arc::new(StringValue::new("x"))]);
        let b = List::new(Arc::new(NumberType), vec![Arc::new(StringValue::new("x"))]);
        assert!(!a.equal(&b));
    }

    #[test]
    fn states_are_compared_before_elements() {
        let string: Arc<dyn AttrType> = Arc::new(StringType);
        assert!(List::unknown(string.clone()).equal(&List::unknown(string.clone())));
        assert!(!List::unknown(string.clone()).equal(&List::null(string.clone())));
        assert!(!strings(&[]).equal(&List::null(string)));
        assert!(!strings(&["a"]).equal(&strings(&["a", "b"])));
        assert!(!strings(&["a", "b"]).equal(&strings(&["b", "a"])));
    }

    #[test]
    fn decode_stores_element_type_not_list_type() {
        let ctx = Context::background();
        let wire = wire_strings(vec![WireValue::string("a")]);
        let list = string_list().list_from_terraform(&ctx, &wire).unwrap();
        assert_eq!(list.elem_wire_type(), &WireType::String);
        assert!(list.elem_type().equal(&StringType));
    }

    #[test]
    fn numeric_lists_keep_their_element_kind() {
        let ctx = Context::background();
        let ints = List::new(Arc::new(Int64Type), vec![Arc::new(Int64Value::new(7))]);
        let floats = List::new(Arc::new(Float64Type), vec![Arc::new(Float64Value::new(0.5))]);

        for list in [ints, floats] {
            let wire = list.to_wire(&ctx).unwrap();
            let back = list.attr_type().value_from_terraform(&ctx, &wire).unwrap();
            assert!(back.equal(&list), "{:?} came back as {:?}", list, back);
        }
    }

    #[test]
    fn declared_descriptor_must_match() {
        let ctx = Context::background();
        let bools = WireType::list(WireType::Bool);
        for wire in [
            WireValue::new(bools.clone(), Raw::List(vec![])).unwrap(),
            WireValue::null(bools.clone()),
            WireValue::unknown(bools.clone()),
        ] {
            let err = string_list().list_from_terraform(&ctx, &wire).unwrap_err();
            assert!(
                matches!(err, crate::AttrError::Wire(WireError::TypeMismatch { .. })),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let ctx = Context::background();
        let set = WireValue::new(
            WireType::set(WireType::String),
            Raw::List(vec![WireValue::string("a")]),
        )
        .unwrap();
        let err = string_list().list_from_terraform(&ctx, &set).unwrap_err();
        assert!(matches!(
            err,
            crate::AttrError::Wire(WireError::ShapeMismatch {
                expected: "list",
                ..
            })
        ));
    }

    #[test]
    fn element_errors_carry_the_index() {
        let ctx = Context::background();
        let wire = WireValue::new(
            WireType::list(WireType::Number),
            Raw::List(vec![WireValue::number(1), WireValue::number(1.5)]),
        )
        .unwrap();
        let err = ListType::new(Arc::new(Int64Type))
            .list_from_terraform(&ctx, &wire)
            .unwrap_err();
        assert_eq!(err.path(), AttributePath::new().with_element_key_int(1));
    }

    #[test]
    fn misbuilt_list_fails_validation() {
        let ctx = Context::background();
        let list = List::new(
            Arc::new(StringType),
            vec![Arc::new(StringValue::new("a")), Arc::new(BoolValue::new(true))],
        );
        match list.to_wire(&ctx).unwrap_err() {
            crate::AttrError::Validation { step, .. } => {
                assert_eq!(step, PathStep::ElementKeyInt(1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn elements_as_strict_rejects_unknown_element() {
        let ctx = Context::background();
        let list = List::new(
            Arc::new(StringType),
            vec![
                Arc::new(StringValue::new("a")),
                Arc::new(StringValue::unknown()),
            ],
        );
        let mut target: Vec<String> = vec!["untouched".into()];
        let err = list.elements_as(&ctx, &mut target, false).unwrap_err();
        match &err {
            crate::AttrError::Decode(e) => {
                assert_eq!(e.path, AttributePath::new().with_element_key_int(1));
                assert!(matches!(e.kind, DecodeErrorKind::UnhandledUnknown { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(target, vec!["untouched".to_string()]);

        list.elements_as(&ctx, &mut target, true).unwrap();
        assert_eq!(target, vec!["a".to_string(), String::new()]);
    }

    #[test]
    fn elements_as_into_options() {
        let ctx = Context::background();
        let list = List::new(
            Arc::new(StringType),
            vec![Arc::new(StringValue::new("a")), Arc::new(StringValue::null())],
        );
        let mut target: Vec<Option<String>> = Vec::new();
        list.elements_as(&ctx, &mut target, false).unwrap();
        assert_eq!(target, vec![Some("a".to_string()), None]);
    }

    #[test]
    fn null_list_elements_as() {
        let ctx = Context::background();
        let list = List::null(Arc::new(StringType));
        let mut target = vec!["x".to_string()];
        assert!(list.elements_as(&ctx, &mut target, false).is_err());
        list.elements_as(&ctx, &mut target, true).unwrap();
        assert!(target.is_empty());
    }

    #[test]
    fn from_native() {
        let ctx = Context::background();
        let list = string_list()
            .list_from_native(&ctx, &[Some("a"), None])
            .unwrap();
        assert_eq!(
            list,
            List::new(
                Arc::new(StringType),
                vec![Arc::new(StringValue::new("a")), Arc::new(StringValue::null())],
            )
        );
        assert!(string_list()
            .list_from_native(&ctx, &None::<Vec<String>>)
            .unwrap()
            .is_null());
    }

    #[test]
    fn cancellation_stops_conversion() {
        let ctx = Context::background();
        ctx.cancel();
        let wire = wire_strings(vec![WireValue::string("a")]);
        let err = string_list().list_from_terraform(&ctx, &wire).unwrap_err();
        assert!(matches!(err.root_cause(), crate::AttrError::Cancelled(_)));
    }

    #[test]
    fn path_steps() {
        let ty: Arc<dyn AttrType> = Arc::new(string_list());
        let elem = ty.apply_path_step(&PathStep::ElementKeyInt(4)).unwrap();
        assert!(elem.equal(&StringType));
        assert!(ty
            .apply_path_step(&PathStep::AttributeName("x".into()))
            .is_err());

        let list = strings(&["a", "b"]);
        let b = list.apply_path_step(&PathStep::ElementKeyInt(1)).unwrap();
        assert!(b.equal(&StringValue::new("b")));
        assert!(list.apply_path_step(&PathStep::ElementKeyInt(2)).is_err());
    }
}
