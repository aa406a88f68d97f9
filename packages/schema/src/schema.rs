//! Top-level schemas.

use std::collections::BTreeMap;
use std::sync::Arc;

use tfattr_types::{AttrType, ObjectType};
use tfattr_wire::{walk_attribute_path, AttributePath};
use tracing::{debug, trace};

use crate::{Attribute, Block, NestedBlockObject, Result, SchemaError, SchemaNode};

/// The attributes and blocks of a resource, data source, or provider.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    root: NestedBlockObject,
    description: String,
    markdown_description: String,
    deprecation_message: String,
    version: i64,
}

impl Schema {
    pub fn new(root: NestedBlockObject) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.root = self.root.with_attribute(name, attribute);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: Arc<dyn Block>) -> Self {
        self.root = self.root.with_block(name, block);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_markdown_description(mut self, description: impl Into<String>) -> Self {
        self.markdown_description = description.into();
        self
    }

    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// Set the schema version, bumped when stored state needs upgrading.
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        self.root.attributes()
    }

    pub fn blocks(&self) -> &BTreeMap<String, Arc<dyn Block>> {
        self.root.blocks()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn markdown_description(&self) -> &str {
        &self.markdown_description
    }

    pub fn deprecation_message(&self) -> &str {
        &self.deprecation_message
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// The object type of a whole value of this schema.
    pub fn attr_type(&self) -> ObjectType {
        self.root.object_type()
    }

    /// The attribute type of the value at `path`.
    pub fn type_at_path(&self, path: &AttributePath) -> Result<Arc<dyn AttrType>> {
        trace!(path = %path, "looking up type in schema");
        let root: Arc<dyn AttrType> = Arc::new(self.attr_type());
        Ok(walk_attribute_path(root, path)?)
    }

    /// The attribute, block, or nested object at `path`.
    pub fn node_at_path(&self, path: &AttributePath) -> Result<SchemaNode> {
        trace!(path = %path, "looking up node in schema");
        Ok(walk_attribute_path(SchemaNode::Object(self.root.clone()), path)?)
    }

    /// Check the schema for mistakes a provider could make defining it.
    ///
    /// Every attribute and block name must be made of lowercase letters,
    /// digits and underscores, and no name may be used for both an
    /// attribute and a block in the same object. The first problem found is
    /// returned with its path.
    pub fn validate_implementation(&self) -> Result<()> {
        debug!(
            attributes = self.root.attributes().len(),
            blocks = self.root.blocks().len(),
            "validating schema"
        );
        validate_object(&self.root, &AttributePath::new())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn validate_object(object: &NestedBlockObject, path: &AttributePath) -> Result<()> {
    for name in object.attributes().keys() {
        if !is_valid_name(name) {
            return Err(SchemaError::InvalidName {
                path: path.with_attribute_name(name.clone()),
                name: name.clone(),
            });
        }
        if object.blocks().contains_key(name) {
            return Err(SchemaError::NameCollision {
                path: path.with_attribute_name(name.clone()),
                name: name.clone(),
            });
        }
    }
    for (name, block) in object.blocks() {
        let block_path = path.with_attribute_name(name.clone());
        if !is_valid_name(name) {
            return Err(SchemaError::InvalidName {
                path: block_path,
                name: name.clone(),
            });
        }
        validate_object(block.nested_object(), &block_path)?;
    }
    Ok(())
}
