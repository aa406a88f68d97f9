//! Schema blocks for tfattr
//!
//! A schema describes the shape of a resource's configuration: attributes
//! with their types, and blocks grouping further attributes and blocks. This
//! layer provides:
//! - [`Block`]: the capability set shared by every block kind
//! - [`blocks_equal`]: the comparison every block kind starts from
//! - One block kind per [`NestingMode`]: [`SingleNestedBlock`], [`ListNestedBlock`],
//!   [`SetNestedBlock`], [`MapNestedBlock`]
//! - [`Schema`]: the top level, with type and node lookups by attribute path
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tfattr_schema::{Attribute, ListNestedBlock, NestedBlockObject, Schema};
//! use tfattr_types::{Int64Type, StringType};
//! use tfattr_wire::{AttributePath, WireType};
//!
//! let schema = Schema::default()
//!     .with_attribute("name", Attribute::required(Arc::new(StringType)))
//!     .with_block(
//!         "rule",
//!         Arc::new(ListNestedBlock::new(
//!             NestedBlockObject::default()
//!                 .with_attribute("port", Attribute::required(Arc::new(Int64Type))),
//!         )),
//!     );
//! schema.validate_implementation().unwrap();
//!
//! let path = AttributePath::new()
//!     .with_attribute_name("rule")
//!     .with_element_key_int(0)
//!     .with_attribute_name("port");
//! let port = schema.type_at_path(&path).unwrap();
//! assert_eq!(port.terraform_type(), WireType::Number);
//! ```

mod attribute;
mod block;
mod error;
mod nested;
mod node;
mod schema;

pub use attribute::Attribute;
pub use block::{blocks_equal, Block, NestedBlockObject, NestingMode};
pub use error::{Result, SchemaError};
pub use nested::{ListNestedBlock, MapNestedBlock, SetNestedBlock, SingleNestedBlock};
pub use node::SchemaNode;
pub use schema::Schema;
