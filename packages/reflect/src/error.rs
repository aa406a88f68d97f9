//! Error types for reflective decoding.

use std::fmt;

use thiserror::Error;
use tfattr_wire::{AttributePath, Cancelled, Number, WireError, WireType};

/// A failure to map a wire value onto a native shape, or back.
///
/// Carries the path of the value that couldn't be mapped. Errors raised by
/// serde visitors (missing struct fields, out-of-range integers) are given
/// the path of the value being visited.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at {path}: {kind}")]
pub struct DecodeError {
    pub path: AttributePath,
    pub kind: DecodeErrorKind,
}

/// What went wrong, without the where.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeErrorKind {
    /// A null reached a target that can't represent it.
    #[error("received null value, but {target} cannot hold null; use an Option or allow unhandled nulls")]
    UnhandledNull { target: &'static str },

    /// An unknown reached a target that can't represent it.
    #[error("received unknown value, but {target} cannot hold unknown values; allow unhandled unknowns")]
    UnhandledUnknown { target: &'static str },

    /// The wire value's shape doesn't fit the target.
    #[error("cannot decode {found} into {target}")]
    ShapeMismatch {
        target: &'static str,
        found: WireType,
    },

    /// The native value's shape doesn't fit the wire type.
    #[error("cannot encode {found} as {expected}")]
    IncompatibleNative {
        expected: WireType,
        found: &'static str,
    },

    /// A fractional or out-of-range number reached an integer target.
    #[error("number {number} is not representable as an integer")]
    NotAnInteger { number: Number },

    /// The object has attributes the target struct doesn't declare.
    #[error("object defines attributes not found in struct {target}: {}", .extra.join(", "))]
    StructMismatch {
        target: &'static str,
        extra: Vec<String>,
    },

    /// A tuple's length doesn't match.
    #[error("expected {expected} elements, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// The target has no empty value to substitute for null or unknown.
    #[error("{target} has no empty value")]
    NoEmptyValue { target: &'static str },

    /// A value built during encoding didn't validate against its type.
    #[error(transparent)]
    Wire(WireError),

    /// Decoding was cancelled through its context.
    #[error(transparent)]
    Cancelled(Cancelled),

    /// An error raised by a serde visitor or serializer.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    pub fn new(path: AttributePath, kind: DecodeErrorKind) -> Self {
        Self { path, kind }
    }

    /// Attach `path` if no path has been recorded yet.
    ///
    /// Errors raised inside serde visitors start at the root; the nearest
    /// enclosing element fills in where they happened.
    pub(crate) fn or_at(mut self, path: AttributePath) -> Self {
        if self.path.is_empty() {
            self.path = path;
        }
        self
    }
}

impl serde::de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(AttributePath::new(), DecodeErrorKind::Custom(msg.to_string()))
    }
}

impl From<Cancelled> for DecodeErrorKind {
    fn from(e: Cancelled) -> Self {
        DecodeErrorKind::Cancelled(e)
    }
}

impl From<WireError> for DecodeErrorKind {
    fn from(e: WireError) -> Self {
        DecodeErrorKind::Wire(e)
    }
}
