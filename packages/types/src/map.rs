//! Maps: string-keyed collections of values of one element type.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfattr_wire::{
    AttributePath, Context, Payload, PathStep, Raw, ValueState, WireError, WireType, WireValue,
};
use tracing::trace;

use crate::container::{
    decode_into, element_from_terraform, element_to_wire, expect_type, invalid_step,
};
use crate::{AttrType, AttrValue, Result};

/// The type of a map whose values are all of `elem_type`.
#[derive(Clone, Debug)]
pub struct MapType {
    elem_type: Arc<dyn AttrType>,
}

impl MapType {
    pub fn new(elem_type: Arc<dyn AttrType>) -> Self {
        Self { elem_type }
    }

    pub fn elem_type(&self) -> &Arc<dyn AttrType> {
        &self.elem_type
    }

    /// Like [`AttrType::value_from_terraform`], returning the concrete value.
    pub fn map_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Map> {
        expect_type(value, self, "map", WireType::is_map)?;
        if !value.is_known() {
            return Ok(Map::unknown(self.elem_type.clone()));
        }
        if value.is_null() {
            return Ok(Map::null(self.elem_type.clone()));
        }

        let entries = value.as_map()?;
        trace!(ty = %self, len = entries.len(), "converting map from wire value");

        let mut out = BTreeMap::new();
        for (key, elem) in entries {
            let converted = element_from_terraform(ctx, self.elem_type.as_ref(), elem, || {
                PathStep::ElementKeyString(key.clone())
            })?;
            out.insert(key.clone(), converted);
        }
        Ok(Map::new(self.elem_type.clone(), out))
    }

    /// Build a map of this type from a native value.
    pub fn map_from_native<T: Serialize + ?Sized>(&self, ctx: &Context, value: &T) -> Result<Map> {
        let wire =
            tfattr_reflect::from_native(ctx, &self.terraform_type(), value, AttributePath::new())?;
        self.map_from_terraform(ctx, &wire)
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapType[{}]", self.elem_type)
    }
}

impl AttrType for MapType {
    fn terraform_type(&self) -> WireType {
        WireType::map(self.elem_type.terraform_type())
    }

    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>> {
        Ok(Arc::new(self.map_from_terraform(ctx, value)?))
    }

    fn equal(&self, other: &dyn AttrType) -> bool {
        other
            .as_any()
            .downcast_ref::<MapType>()
            .is_some_and(|other| self.elem_type.equal(other.elem_type.as_ref()))
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        match step {
            PathStep::ElementKeyString(_) => Ok(self.elem_type.clone()),
            _ => Err(invalid_step(step, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A map value.
#[derive(Clone, Debug)]
pub struct Map {
    elem_type: Arc<dyn AttrType>,
    elem_wire: WireType,
    state: ValueState<BTreeMap<String, Arc<dyn AttrValue>>>,
}

impl Map {
    /// A known map. Entries are checked when converted to a wire value.
    pub fn new(elem_type: Arc<dyn AttrType>, entries: BTreeMap<String, Arc<dyn AttrValue>>) -> Self {
        Self::with_state(elem_type, ValueState::Known(entries))
    }

    pub fn unknown(elem_type: Arc<dyn AttrType>) -> Self {
        Self::with_state(elem_type, ValueState::Unknown)
    }

    pub fn null(elem_type: Arc<dyn AttrType>) -> Self {
        Self::with_state(elem_type, ValueState::Null)
    }

    fn with_state(
        elem_type: Arc<dyn AttrType>,
        state: ValueState<BTreeMap<String, Arc<dyn AttrValue>>>,
    ) -> Self {
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

    pub fn state(&self) -> &ValueState<BTreeMap<String, Arc<dyn AttrValue>>> {
        &self.state
    }

    pub fn entries(&self) -> Option<&BTreeMap<String, Arc<dyn AttrValue>>> {
        self.state.known()
    }

    /// Populate `target` with the map's entries. See [`List::elements_as`].
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

impl AttrValue for Map {
    fn attr_type(&self) -> Arc<dyn AttrType> {
        Arc::new(MapType::new(self.elem_type.clone()))
    }

    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload> {
        let entries = match &self.state {
            ValueState::Unknown => return Ok(ValueState::Unknown),
            ValueState::Null => return Ok(ValueState::Null),
            ValueState::Known(entries) => entries,
        };
        trace!(elem_type = %self.elem_wire, len = entries.len(), "converting map to wire value");

        let mut out = BTreeMap::new();
        for (key, elem) in entries {
            let wire = element_to_wire(ctx, elem.as_ref(), &self.elem_wire, || {
                PathStep::ElementKeyString(key.clone())
            })?;
            out.insert(key.clone(), wire);
        }
        Ok(ValueState::Known(Raw::Map(out)))
    }

    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(WireType::map(self.elem_wire.clone()), payload)?)
    }

    fn equal(&self, other: &dyn AttrValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Map>() else {
            return false;
        };
        if self.elem_wire != other.elem_wire {
            return false;
        }
        match (&self.state, &other.state) {
            (ValueState::Unknown, ValueState::Unknown) | (ValueState::Null, ValueState::Null) => {
                true
            }
            (ValueState::Known(a), ValueState::Known(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equal(vb.as_ref()))
            }
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
        let found = match (step, self.entries()) {
            (PathStep::ElementKeyString(key), Some(entries)) => entries.get(key).cloned(),
            _ => None,
        };
        found.ok_or_else(|| invalid_step(step, format!("map of {}", self.elem_wire)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoolType, BoolValue, NumberType, NumberValue, StringType};
    use collection_literals::btree;
    use tfattr_wire::Number;

    fn flags() -> Map {
        Map::new(
            Arc::new(BoolType),
            btree! {
                "a".to_string() => Arc::new(BoolValue::new(true)) as Arc<dyn AttrValue>,
                "b".to_string() => Arc::new(BoolValue::unknown()) as Arc<dyn AttrValue>,
            },
        )
    }

    #[test]
    fn round_trip_keeps_unknown_entries() {
        let ctx = Context::background();
        let wire = flags().to_wire(&ctx).unwrap();
        assert!(!wire.is_fully_known());

        let back = MapType::new(Arc::new(BoolType))
            .map_from_terraform(&ctx, &wire)
            .unwrap();
        assert_eq!(back, flags());
    }

    #[test]
    fn keys_matter_for_equality() {
        let other = Map::new(
            Arc::new(BoolType),
            btree! {
                "a".to_string() => Arc::new(BoolValue::new(true)) as Arc<dyn AttrValue>,
                "c".to_string() => Arc::new(BoolValue::unknown()) as Arc<dyn AttrValue>,
            },
        );
        assert_ne!(flags(), other);
    }

    #[test]
    fn elements_as_map() {
        let ctx = Context::background();
        let mut target: BTreeMap<String, bool> = BTreeMap::new();

        let err = flags().elements_as(&ctx, &mut target, false).unwrap_err();
        assert_eq!(err.path(), AttributePath::new().with_element_key_string("b"));
        assert!(target.is_empty());

        flags().elements_as(&ctx, &mut target, true).unwrap();
        assert_eq!(target, btree! { "a".to_string() => true, "b".to_string() => false });
    }

    #[test]
    fn from_native_map() {
        let ctx = Context::background();
        let map = MapType::new(Arc::new(BoolType))
            .map_from_native(&ctx, &btree! { "on" => true })
            .unwrap();
        let on = map
            .apply_path_step(&PathStep::ElementKeyString("on".into()))
            .unwrap();
        assert!(on.equal(&BoolValue::new(true)));
    }

    #[test]
    fn numbers_round_trip_through_own_type() {
        let ctx = Context::background();
        let map = Map::new(
            Arc::new(NumberType),
            btree! {
                "int".to_string() => Arc::new(NumberValue::new(Number::Integer(4))) as Arc<dyn AttrValue>,
                "float".to_string() => Arc::new(NumberValue::new(Number::Float(0.25))) as Arc<dyn AttrValue>,
                "later".to_string() => Arc::new(NumberValue::unknown()) as Arc<dyn AttrValue>,
            },
        );
        let wire = map.to_wire(&ctx).unwrap();
        let back = map.attr_type().value_from_terraform(&ctx, &wire).unwrap();
        assert!(back.equal(&map));
    }

    #[test]
    fn declared_descriptor_must_match() {
        let ctx = Context::background();
        let ty = MapType::new(Arc::new(StringType));
        let bools = WireType::map(WireType::Bool);
        for wire in [
            WireValue::new(bools.clone(), Raw::Map(BTreeMap::new())).unwrap(),
            WireValue::null(bools.clone()),
            WireValue::unknown(bools),
        ] {
            assert!(matches!(
                ty.map_from_terraform(&ctx, &wire),
                Err(crate::AttrError::Wire(WireError::TypeMismatch { .. }))
            ));
        }
    }
}
