//! Error types for the wire layer.
//!
//! Errors at this level are about shapes only: a payload that doesn't fit its
//! descriptor, an extractor used on the wrong kind of value, a path step that
//! doesn't apply. Typed conversion failures belong in higher layers.

use thiserror::Error;

use crate::{AttributePath, Cancelled, PathStep, WireType};

/// Errors at the wire layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// A value was read as a shape its type doesn't have.
    #[error("cannot read {found} value as {expected}")]
    ShapeMismatch {
        expected: &'static str,
        found: WireType,
    },

    /// An unknown value was read as if it were known.
    #[error("unknown value cannot be read as {expected}")]
    NotKnown { expected: &'static str },

    /// A null value was read as if it held data.
    #[error("null value cannot be read as {expected}")]
    Null { expected: &'static str },

    /// A nested value's type doesn't match the type its container declares.
    #[error("at {path}: expected value of type {expected}, got {found}")]
    TypeMismatch {
        path: AttributePath,
        expected: WireType,
        found: WireType,
    },

    /// A payload's shape doesn't match the type it was paired with.
    #[error("at {path}: {found} payload is not valid for type {expected}")]
    PayloadMismatch {
        path: AttributePath,
        expected: WireType,
        found: &'static str,
    },

    /// An object payload lacks an attribute its type declares.
    #[error("at {path}: missing attribute {name:?}")]
    MissingAttribute { path: AttributePath, name: String },

    /// An object payload has an attribute its type doesn't declare.
    #[error("at {path}: unexpected attribute {name:?}")]
    UnexpectedAttribute { path: AttributePath, name: String },

    /// A tuple payload has the wrong number of elements.
    #[error("at {path}: tuple expects {expected} elements, got {found}")]
    TupleLength {
        path: AttributePath,
        expected: usize,
        found: usize,
    },

    /// A path step can't be applied to the value or type it was given.
    #[error("cannot apply step {step} to {target}")]
    InvalidStep { step: PathStep, target: String },

    /// A failure while walking a path, with the prefix that was reached.
    #[error("at {path}: {source}")]
    AtPath {
        path: AttributePath,
        source: Box<WireError>,
    },

    /// A JSON type descriptor couldn't be parsed.
    #[error("invalid type descriptor: {message}")]
    InvalidTypeDescriptor { message: String },

    /// The operation was cancelled through its context.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}
