//! The block capability trait and the object nested inside every block.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tfattr_types::{AttrType, ObjectType};
use tfattr_wire::{AttributePathStepper, PathStep, WireError};

use crate::{Attribute, SchemaNode};

/// How a block's nested object repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    /// Exactly one nested object.
    Single,
    /// An ordered sequence of nested objects.
    List,
    /// An unordered collection of distinct nested objects.
    Set,
    /// Nested objects keyed by label.
    Map,
}

impl fmt::Display for NestingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NestingMode::Single => "single",
            NestingMode::List => "list",
            NestingMode::Set => "set",
            NestingMode::Map => "map",
        };
        f.write_str(name)
    }
}

/// A schema block: a named, possibly repeated grouping of attributes and
/// further blocks.
///
/// Blocks are built once and shared read-only across threads.
pub trait Block: fmt::Debug + Send + Sync + 'static {
    /// Full equality: everything [`blocks_equal`] compares, plus the
    /// nesting mode and the nested object.
    fn equal(&self, other: &dyn Block) -> bool;

    /// Non-empty if the block is deprecated.
    fn deprecation_message(&self) -> &str;

    fn description(&self) -> &str;

    fn markdown_description(&self) -> &str;

    /// The object each repetition of the block holds.
    fn nested_object(&self) -> &NestedBlockObject;

    fn nesting_mode(&self) -> NestingMode;

    /// The attribute type of the block's value.
    fn attr_type(&self) -> Arc<dyn AttrType>;

    /// The schema node a path step into this block's value leads to.
    fn apply_path_step(&self, step: &PathStep) -> Result<SchemaNode, WireError>;

    fn as_any(&self) -> &dyn Any;
}

impl AttributePathStepper for dyn Block {
    type Output = SchemaNode;

    fn apply_step(&self, step: &PathStep) -> Result<SchemaNode, WireError> {
        self.apply_path_step(step)
    }
}

impl PartialEq for dyn Block {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

/// Compare the parts every block kind has in common: the derived type, the
/// deprecation message, and both descriptions.
///
/// Nesting mode and nested object are left to each kind's own
/// [`Block::equal`].
pub fn blocks_equal(a: &dyn Block, b: &dyn Block) -> bool {
    a.attr_type().equal(b.attr_type().as_ref())
        && a.deprecation_message() == b.deprecation_message()
        && a.description() == b.description()
        && a.markdown_description() == b.markdown_description()
}

/// The attributes and blocks inside a block.
#[derive(Clone, Debug, Default)]
pub struct NestedBlockObject {
    attributes: BTreeMap<String, Attribute>,
    blocks: BTreeMap<String, Arc<dyn Block>>,
}

impl NestedBlockObject {
    pub fn new(
        attributes: BTreeMap<String, Attribute>,
        blocks: BTreeMap<String, Arc<dyn Block>>,
    ) -> Self {
        Self { attributes, blocks }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: Arc<dyn Block>) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.attributes
    }

    pub fn blocks(&self) -> &BTreeMap<String, Arc<dyn Block>> {
        &self.blocks
    }

    /// The object type of this nested object's value.
    pub fn object_type(&self) -> ObjectType {
        let attrs = self
            .attributes
            .iter()
            .map(|(name, attr)| (name.clone(), attr.attr_type().clone()));
        let blocks = self
            .blocks
            .iter()
            .map(|(name, block)| (name.clone(), block.attr_type()));
        ObjectType::new(attrs.chain(blocks).collect())
    }

    pub fn equal(&self, other: &NestedBlockObject) -> bool {
        self.attributes == other.attributes
            && self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|((na, a), (nb, b))| na == nb && a.equal(b.as_ref()))
    }
}

impl PartialEq for NestedBlockObject {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl AttributePathStepper for NestedBlockObject {
    type Output = SchemaNode;

    fn apply_step(&self, step: &PathStep) -> Result<SchemaNode, WireError> {
        let invalid = || WireError::InvalidStep {
            step: step.clone(),
            target: "nested block object".into(),
        };
        let PathStep::AttributeName(name) = step else {
            return Err(invalid());
        };
        if let Some(attr) = self.attributes.get(name) {
            return Ok(SchemaNode::Attribute(attr.clone()));
        }
        self.blocks
            .get(name)
            .map(|block| SchemaNode::Block(block.clone()))
            .ok_or_else(invalid)
    }
}
