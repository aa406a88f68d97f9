//! Typed attribute values for tfattr
//!
//! This layer adds types and meaning on top of the wire model:
//! - [`AttrType`]: a type that knows its wire descriptor and converts wire values
//! - [`AttrValue`]: a typed tri-state value that converts back to wire form
//! - Primitive kinds: [`StringValue`], [`BoolValue`], [`Int64Value`], [`Float64Value`], [`NumberValue`]
//! - Container kinds: [`List`], [`Set`], [`Map`], [`Object`], [`Tuple`]
//!
//! Converting a wire value to a typed value and back yields a value equal to
//! the original. Unknown and null containers never expose elements.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tfattr_types::{AttrValue, ListType, StringType};
//! use tfattr_wire::{Context, Raw, WireType, WireValue};
//!
//! let ctx = Context::background();
//! let ty = ListType::new(Arc::new(StringType));
//! let wire = WireValue::new(
//!     WireType::list(WireType::String),
//!     Raw::List(vec![WireValue::string("a"), WireValue::string("b")]),
//! )
//! .unwrap();
//!
//! let list = ty.list_from_terraform(&ctx, &wire).unwrap();
//! assert_eq!(list.to_wire(&ctx).unwrap(), wire);
//!
//! let mut names: Vec<String> = Vec::new();
//! list.elements_as(&ctx, &mut names, false).unwrap();
//! assert_eq!(names, ["a", "b"]);
//! ```

mod attr;
mod container;
mod convert;
mod error;
mod list;
mod map;
mod object;
mod primitive;
mod set;
mod tuple;

pub use attr::{AttrType, AttrValue};
pub use convert::from_terraform_type;
pub use error::{AttrError, Result};
pub use list::{List, ListType};
pub use map::{Map, MapType};
pub use object::{Object, ObjectType};
pub use primitive::{
    BoolType, BoolValue, Float64Type, Float64Value, Int64Type, Int64Value, NumberType, NumberValue,
    StringType, StringValue,
};
pub use set::{Set, SetType};
pub use tuple::{Tuple, TupleType};
