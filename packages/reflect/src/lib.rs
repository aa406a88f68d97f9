//! Reflective decoding for tfattr
//!
//! This layer maps dynamically-typed [`WireValue`]s onto native Rust shapes.
//! It adds:
//! - [`into`]: decode a wire value into any `serde::Deserialize` target
//! - [`from_native`]: build a validated wire value from any `serde::Serialize` value
//! - [`Options`]: how null and unknown values the target can't represent are treated
//!
//! All runtime shape inspection in tfattr happens here. Typed attribute
//! values never match shapes themselves; they rebuild a wire value and hand
//! it to [`into`].
//!
//! # Example
//!
//! ```rust
//! use serde::Deserialize;
//! use tfattr_reflect::{into, Options};
//! use tfattr_wire::{AttributePath, Context, Raw, WireType, WireValue};
//!
//! #[derive(Deserialize)]
//! struct Rule {
//!     port: u16,
//!     note: Option<String>,
//! }
//!
//! let ty = WireType::object([("port", WireType::Number), ("note", WireType::String)]);
//! let value = WireValue::new(
//!     ty.clone(),
//!     Raw::Map(
//!         [
//!             ("port".to_string(), WireValue::number(443)),
//!             ("note".to_string(), WireValue::null(WireType::String)),
//!         ]
//!         .into_iter()
//!         .collect(),
//!     ),
//! )
//! .unwrap();
//!
//! let rule: Rule = into(&Context::background(), &value, &Options::default(), AttributePath::new()).unwrap();
//! assert_eq!(rule.port, 443);
//! assert!(rule.note.is_none());
//! ```

mod de;
mod error;
mod options;
mod ser;

pub use de::into;
pub use error::{DecodeError, DecodeErrorKind};
pub use options::Options;
pub use ser::from_native;

// Re-export wire types for convenience
pub use tfattr_wire::{AttributePath, Context, WireType, WireValue};
