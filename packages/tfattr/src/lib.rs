//! tfattr: typed attribute values for provider plugins
//!
//! Values crossing the plugin boundary are tri-state: known, null, or unknown
//! until apply. This crate gathers the layers that deal with them:
//!
//! - [`wire`]: dynamically-typed type descriptors, values and attribute paths
//! - [`reflect`]: decoding wire values into native Rust types and back
//! - [`types`]: typed attribute values with semantic equality
//! - [`schema`]: schema blocks and lookups by attribute path
//!
//! The most used items are re-exported at the root and in [`prelude`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde::Deserialize;
//! use tfattr::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct Rule {
//!     port: i64,
//!     note: Option<String>,
//! }
//!
//! let schema = Schema::default().with_block(
//!     "rule",
//!     Arc::new(ListNestedBlock::new(
//!         NestedBlockObject::default()
//!             .with_attribute("port", Attribute::required(Arc::new(Int64Type)))
//!             .with_attribute("note", Attribute::optional(Arc::new(StringType))),
//!     )),
//! );
//!
//! let ctx = Context::background();
//! let rule_type = schema
//!     .type_at_path(&AttributePath::new().with_attribute_name("rule"))
//!     .unwrap();
//! let wire = WireValue::new(
//!     rule_type.terraform_type(),
//!     Raw::List(vec![WireValue::new(
//!         rule_type.terraform_type().element_type().unwrap().clone(),
//!         Raw::Map(
//!             [
//!                 ("port".to_string(), WireValue::number(22)),
//!                 ("note".to_string(), WireValue::null(WireType::String)),
//!             ]
//!             .into_iter()
//!             .collect(),
//!         ),
//!     )
//!     .unwrap()]),
//! )
//! .unwrap();
//!
//! let value = rule_type.value_from_terraform(&ctx, &wire).unwrap();
//! let list = value.as_any().downcast_ref::<List>().unwrap();
//! let mut rules: Vec<Rule> = Vec::new();
//! list.elements_as(&ctx, &mut rules, false).unwrap();
//! assert_eq!(rules[0].port, 22);
//! assert!(rules[0].note.is_none());
//! ```

pub use tfattr_reflect as reflect;
pub use tfattr_schema as schema;
pub use tfattr_types as types;
pub use tfattr_wire as wire;

pub use tfattr_reflect::{DecodeError, DecodeErrorKind, Options};
pub use tfattr_schema::{Schema, SchemaError};
pub use tfattr_types::{AttrError, AttrType, AttrValue};
pub use tfattr_wire::{AttributePath, Context, WireError, WireType, WireValue};

/// Everything needed to define a schema and work with its values.
pub mod prelude {
    pub use tfattr_reflect::{from_native, into, DecodeError, DecodeErrorKind, Options};
    pub use tfattr_schema::{
        blocks_equal, Attribute, Block, ListNestedBlock, MapNestedBlock, NestedBlockObject,
        NestingMode, Schema, SchemaError, SchemaNode, SetNestedBlock, SingleNestedBlock,
    };
    pub use tfattr_types::{
        from_terraform_type, AttrError, AttrType, AttrValue, BoolType, BoolValue, Float64Type,
        Float64Value, Int64Type, Int64Value, List, ListType, Map, MapType, NumberType,
        NumberValue, Object, ObjectType, Set, SetType, StringType, StringValue, Tuple, TupleType,
    };
    pub use tfattr_wire::{
        walk_attribute_path, AttributePath, AttributePathStepper, Cancelled, Context, Number,
        Payload, PathStep, Raw, ValueState, WireError, WireType, WireValue,
    };
}
