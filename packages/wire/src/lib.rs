//! tfattr-wire: the wire-level value model
//!
//! This is the narrow waist of the tfattr stack. Everything at this level is
//! dynamically typed: a [`WireType`] describes a shape, a [`WireValue`] pairs a
//! shape with a tri-state payload (known, null, or unknown), and an
//! [`AttributePath`] points at a value nested somewhere inside another.
//!
//! Use this layer for:
//! - Constructing values that must validate against a type descriptor
//! - Inspecting inbound values before handing them to typed code
//! - Reporting exactly which nested attribute a problem refers to
//!
//! # Example
//!
//! ```rust
//! use tfattr_wire::{Raw, ValueState, WireType, WireValue};
//!
//! let ty = WireType::list(WireType::String);
//! let value = WireValue::new(
//!     ty.clone(),
//!     ValueState::Known(Raw::List(vec![WireValue::string("a"), WireValue::string("b")])),
//! )
//! .unwrap();
//!
//! assert!(value.is_known());
//! assert_eq!(value.as_list().unwrap().len(), 2);
//! assert!(WireValue::new(ty, ValueState::Known(Raw::Bool(true))).is_err());
//! ```

mod context;
mod error;
mod path;
mod ty;
mod value;

pub use context::{Cancelled, Context};
pub use error::WireError;
pub use path::{walk_attribute_path, AttributePath, AttributePathStepper, PathStep};
pub use ty::WireType;
pub use value::{validate_value, Number, Payload, Raw, ValueState, WireValue};
