//! Objects: fixed sets of named attributes, each with its own type.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfattr_wire::{
    AttributePath, Context, Payload, PathStep, Raw, ValueState, WireError, WireType, WireValue,
};
use tracing::trace;

use crate::container::{decode_into, element_from_terraform, element_to_wire, expect_type, invalid_step};
use crate::{AttrError, AttrType, AttrValue, Result};

/// The type of an object with the given attribute types.
///
/// The wire descriptor is derived on first use and cached; the type is
/// immutable after construction so the cache never goes stale.
#[derive(Debug)]
pub struct ObjectType {
    attr_types: BTreeMap<String, Arc<dyn AttrType>>,
    wire: OnceLock<WireType>,
}

impl ObjectType {
    pub fn new(attr_types: BTreeMap<String, Arc<dyn AttrType>>) -> Self {
        Self {
            attr_types,
            wire: OnceLock::new(),
        }
    }

    pub fn attr_types(&self) -> &BTreeMap<String, Arc<dyn AttrType>> {
        &self.attr_types
    }

    /// Like [`AttrType::value_from_terraform`], returning the concrete value.
    pub fn object_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Object> {
        expect_type(value, self, "object", WireType::is_object)?;
        if !value.is_known() {
            return Ok(Object::unknown(self.attr_types.clone()));
        }
        if value.is_null() {
            return Ok(Object::null(self.attr_types.clone()));
        }

        let attrs = value.as_map()?;
        trace!(ty = %self, len = attrs.len(), "converting object from wire value");

        let mut out = BTreeMap::new();
        for (name, attr_type) in &self.attr_types {
            let step = || PathStep::AttributeName(name.clone());
            let Some(attr) = attrs.get(name) else {
                return Err(AttrError::element(
                    step(),
                    WireError::MissingAttribute {
                        path: AttributePath::new(),
                        name: name.clone(),
                    }
                    .into(),
                ));
            };
            out.insert(
                name.clone(),
                element_from_terraform(ctx, attr_type.as_ref(), attr, step)?,
            );
        }
        Ok(Object::new(self.attr_types.clone(), out))
    }

    /// Build an object of this type from a native value, typically a struct.
    pub fn object_from_native<T: Serialize + ?Sized>(&self, ctx: &Context, value: &T) -> Result<Object> {
        let wire =
            tfattr_reflect::from_native(ctx, &self.terraform_type(), value, AttributePath::new())?;
        self.object_from_terraform(ctx, &wire)
    }
}

impl Clone for ObjectType {
    fn clone(&self) -> Self {
        Self::new(self.attr_types.clone())
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType[")?;
        for (i, (name, ty)) in self.attr_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}:{}", name, ty)?;
        }
        write!(f, "]")
    }
}

impl AttrType for ObjectType {
    fn terraform_type(&self) -> WireType {
        self.wire
            .get_or_init(|| {
                WireType::Object(
                    self.attr_types
                        .iter()
                        .map(|(name, ty)| (name.clone(), ty.terraform_type()))
                        .collect(),
                )
            })
            .clone()
    }

    fn value_from_terraform(&self, ctx: &Context, value: &WireValue) -> Result<Arc<dyn AttrValue>> {
        Ok(Arc::new(self.object_from_terraform(ctx, value)?))
    }

    fn equal(&self, other: &dyn AttrType) -> bool {
        let Some(other) = other.as_any().downcast_ref::<ObjectType>() else {
            return false;
        };
        self.attr_types.len() == other.attr_types.len()
            && self
                .attr_types
                .iter()
                .zip(&other.attr_types)
                .all(|((na, ta), (nb, tb))| na == nb && ta.equal(tb.as_ref()))
    }

    fn apply_path_step(&self, step: &PathStep) -> std::result::Result<Arc<dyn AttrType>, WireError> {
        match step {
            PathStep::AttributeName(name) => self
                .attr_types
                .get(name)
                .cloned()
                .ok_or_else(|| invalid_step(step, self)),
            _ => Err(invalid_step(step, self)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object value.
///
/// A known object holds a value for every declared attribute; conversion to
/// a wire value reports any attribute that is missing or undeclared.
#[derive(Clone, Debug)]
pub struct Object {
    attr_types: BTreeMap<String, Arc<dyn AttrType>>,
    attr_wire: BTreeMap<String, WireType>,
    state: ValueState<BTreeMap<String, Arc<dyn AttrValue>>>,
}

impl Object {
    pub fn new(
        attr_types: BTreeMap<String, Arc<dyn AttrType>>,
        attrs: BTreeMap<String, Arc<dyn AttrValue>>,
    ) -> Self {
        Self::with_state(attr_types, ValueState::Known(attrs))
    }

    pub fn unknown(attr_types: BTreeMap<String, Arc<dyn AttrType>>) -> Self {
        Self::with_state(attr_types, ValueState::Unknown)
    }

    pub fn null(attr_types: BTreeMap<String, Arc<dyn AttrType>>) -> Self {
        Self::with_state(attr_types, ValueState::Null)
    }

    fn with_state(
        attr_types: BTreeMap<String, Arc<dyn AttrType>>,
        state: ValueState<BTreeMap<String, Arc<dyn AttrValue>>>,
    ) -> Self {
        Self {
            attr_wire: attr_types
                .iter()
                .map(|(name, ty)| (name.clone(), ty.terraform_type()))
                .collect(),
            attr_types,
            state,
        }
    }

    pub fn attr_types(&self) -> &BTreeMap<String, Arc<dyn AttrType>> {
        &self.attr_types
    }

    /// The wire descriptor of each attribute.
    pub fn attr_wire_types(&self) -> &BTreeMap<String, WireType> {
        &self.attr_wire
    }

    pub fn state(&self) -> &ValueState<BTreeMap<String, Arc<dyn AttrValue>>> {
        &self.state
    }

    pub fn attributes(&self) -> Option<&BTreeMap<String, Arc<dyn AttrValue>>> {
        self.state.known()
    }

    /// Populate `target`, usually a struct, with the object's attributes.
    ///
    /// Every attribute must correspond to a field of the target. See
    /// [`List::elements_as`] for `allow_unhandled`.
    ///
    /// [`List::elements_as`]: crate::List::elements_as
    pub fn as_struct<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        target: &mut T,
        allow_unhandled: bool,
    ) -> Result<()> {
        let wire = self.to_wire(ctx)?;
        decode_into(ctx, &wire, target, allow_unhandled)
    }
}

impl AttrValue for Object {
    fn attr_type(&self) -> Arc<dyn AttrType> {
        Arc::new(ObjectType::new(self.attr_types.clone()))
    }

    fn to_terraform_value(&self, ctx: &Context) -> Result<Payload> {
        let attrs = match &self.state {
            ValueState::Unknown => return Ok(ValueState::Unknown),
            ValueState::Null => return Ok(ValueState::Null),
            ValueState::Known(attrs) => attrs,
        };
        trace!(len = attrs.len(), "converting object to wire value");

        if let Some(name) = attrs.keys().find(|name| !self.attr_wire.contains_key(*name)) {
            return Err(AttrError::Validation {
                step: PathStep::AttributeName(name.clone()),
                source: WireError::UnexpectedAttribute {
                    path: AttributePath::new(),
                    name: name.clone(),
                },
            });
        }

        let mut out = BTreeMap::new();
        for (name, attr_type) in &self.attr_wire {
            let step = || PathStep::AttributeName(name.clone());
            let Some(attr) = attrs.get(name) else {
                return Err(AttrError::Validation {
                    step: step(),
                    source: WireError::MissingAttribute {
                        path: AttributePath::new(),
                        name: name.clone(),
                    },
                });
            };
            out.insert(name.clone(), element_to_wire(ctx, attr.as_ref(), attr_type, step)?);
        }
        Ok(ValueState::Known(Raw::Map(out)))
    }

    fn to_wire(&self, ctx: &Context) -> Result<WireValue> {
        let payload = self.to_terraform_value(ctx)?;
        Ok(WireValue::new(WireType::Object(self.attr_wire.clone()), payload)?)
    }

    fn equal(&self, other: &dyn AttrValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Object>() else {
            return false;
        };
        if self.attr_wire != other.attr_wire {
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
                        .all(|((na, va), (nb, vb))| na == nb && va.equal(vb.as_ref()))
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
        let found = match (step, self.attributes()) {
            (PathStep::AttributeName(name), Some(attrs)) => attrs.get(name).cloned(),
            _ => None,
        };
        found.ok_or_else(|| invalid_step(step, WireType::Object(self.attr_wire.clone())))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
