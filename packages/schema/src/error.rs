//! Error types for schema lookups and checks.

use thiserror::Error;
use tfattr_wire::{AttributePath, WireError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A name isn't made of lowercase letters, digits and underscores.
    #[error("at {path}: invalid name {name:?}; names may only contain lowercase letters, digits and underscores")]
    InvalidName { path: AttributePath, name: String },

    /// The same name is used for an attribute and a block.
    #[error("at {path}: {name:?} is defined as both an attribute and a block")]
    NameCollision { path: AttributePath, name: String },

    /// A path doesn't lead anywhere in the schema.
    #[error(transparent)]
    Wire(#[from] WireError),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
