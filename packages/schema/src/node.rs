use std::sync::Arc;

use tfattr_types::AttrType;
use tfattr_wire::{AttributePathStepper, PathStep, WireError};

use crate::{Attribute, Block, NestedBlockObject};

/// Where a path leads in a schema.
#[derive(Clone, Debug)]
pub enum SchemaNode {
    /// The object nested inside a block, or the schema root.
    Object(NestedBlockObject),
    Block(Arc<dyn Block>),
    Attribute(Attribute),
    /// Somewhere inside an attribute's value, such as a list element.
    Type(Arc<dyn AttrType>),
}

impl SchemaNode {
    /// The attribute type of the value at this node.
    pub fn attr_type(&self) -> Arc<dyn AttrType> {
        match self {
            SchemaNode::Object(object) => Arc::new(object.object_type()),
            SchemaNode::Block(block) => block.attr_type(),
            SchemaNode::Attribute(attr) => attr.attr_type().clone(),
            SchemaNode::Type(ty) => ty.clone(),
        }
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            SchemaNode::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Arc<dyn Block>> {
        match self {
            SchemaNode::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl AttributePathStepper for SchemaNode {
    type Output = SchemaNode;

    fn apply_step(&self, step: &PathStep) -> Result<SchemaNode, WireError> {
        match self {
            SchemaNode::Object(object) => object.apply_step(step),
            SchemaNode::Block(block) => block.apply_path_step(step),
            SchemaNode::Attribute(attr) => attr.attr_type().apply_path_step(step).map(SchemaNode::Type),
            SchemaNode::Type(ty) => ty.apply_path_step(step).map(SchemaNode::Type),
        }
    }
}
