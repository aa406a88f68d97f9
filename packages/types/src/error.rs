//! Error types for attribute conversion.

use thiserror::Error;
use tfattr_reflect::DecodeError;
use tfattr_wire::{AttributePath, Cancelled, Number, PathStep, WireError};

/// Errors converting between attribute values and wire values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttrError {
    /// The wire value's shape doesn't match the type converting it.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// An element failed to convert. Conversion stops at the first one.
    #[error("element {step}: {source}")]
    Element {
        step: PathStep,
        source: Box<AttrError>,
    },

    /// A converted element doesn't match its container's declared element
    /// type. The container was built with inconsistent elements.
    #[error("element {step} does not match the declared element type: {source}")]
    Validation { step: PathStep, source: WireError },

    /// Decoding into a native target failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Conversion was cancelled through its context.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// A number doesn't fit the native type of the attribute.
    #[error("number {number} is not a valid {target}")]
    NumberRange {
        number: Number,
        target: &'static str,
    },
}

impl AttrError {
    pub(crate) fn element(step: PathStep, source: AttrError) -> Self {
        AttrError::Element {
            step,
            source: Box::new(source),
        }
    }

    /// The path of the value the error is about, relative to the value being
    /// converted.
    pub fn path(&self) -> AttributePath {
        let mut steps = Vec::new();
        let mut current = self;
        loop {
            match current {
                AttrError::Element { step, source } => {
                    steps.push(step.clone());
                    current = &**source;
                }
                AttrError::Validation { step, .. } => {
                    steps.push(step.clone());
                    break;
                }
                AttrError::Decode(e) => {
                    steps.extend(e.path.iter().cloned());
                    break;
                }
                _ => break,
            }
        }
        AttributePath::from_steps(steps)
    }

    /// The innermost error, past every element wrapper.
    pub fn root_cause(&self) -> &AttrError {
        let mut current = self;
        while let AttrError::Element { source, .. } = current {
            current = &**source;
        }
        current
    }
}

pub type Result<T> = std::result::Result<T, AttrError>;
