//! The four block kinds, one per nesting mode.

use std::any::Any;
use std::sync::Arc;

use tfattr_types::{AttrType, ListType, MapType, SetType};
use tfattr_wire::{AttributePathStepper, PathStep, WireError};

use crate::{blocks_equal, Block, NestedBlockObject, NestingMode, SchemaNode};

macro_rules! nested_block {
    (
        $(#[$meta:meta])*
        $name:ident, $mode:expr,
        derive = |$obj:ident| $derive:expr,
        step = |$this:ident, $step:ident| $apply:expr $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            nested_object: NestedBlockObject,
            custom_type: Option<Arc<dyn AttrType>>,
            description: String,
            markdown_description: String,
            deprecation_message: String,
        }

        impl $name {
            pub fn new(nested_object: NestedBlockObject) -> Self {
                Self {
                    nested_object,
                    custom_type: None,
                    description: String::new(),
                    markdown_description: String::new(),
                    deprecation_message: String::new(),
                }
            }

            /// Use `custom_type` as the block's type instead of deriving one
            /// from the nested object.
            pub fn with_custom_type(mut self, custom_type: Arc<dyn AttrType>) -> Self {
                self.custom_type = Some(custom_type);
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

            pub fn custom_type(&self) -> Option<&Arc<dyn AttrType>> {
                self.custom_type.as_ref()
            }
        }

        impl Block for $name {
            fn equal(&self, other: &dyn Block) -> bool {
                if self.nesting_mode() != other.nesting_mode() {
                    return false;
                }
                let Some(other) = other.as_any().downcast_ref::<$name>() else {
                    return false;
                };
                blocks_equal(self, other) && self.nested_object.equal(&other.nested_object)
            }

            fn deprecation_message(&self) -> &str {
                &self.deprecation_message
            }

            fn description(&self) -> &str {
                &self.description
            }

            fn markdown_description(&self) -> &str {
                &self.markdown_description
            }

            fn nested_object(&self) -> &NestedBlockObject {
                &self.nested_object
            }

            fn nesting_mode(&self) -> NestingMode {
                $mode
            }

            fn attr_type(&self) -> Arc<dyn AttrType> {
                if let Some(custom) = &self.custom_type {
                    return custom.clone();
                }
                let $obj: Arc<dyn AttrType> = Arc::new(self.nested_object.object_type());
                $derive
            }

            fn apply_path_step(&self, $step: &PathStep) -> Result<SchemaNode, WireError> {
                let $this = self;
                $apply
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

fn invalid(step: &PathStep, mode: NestingMode) -> WireError {
    WireError::InvalidStep {
        step: step.clone(),
        target: format!("{} nested block", mode),
    }
}

nested_block! {
    /// A block that appears at most once. Its value is the nested object.
    SingleNestedBlock, NestingMode::Single,
    derive = |object| object,
    step = |this, step| this.nested_object.apply_step(step),
}

nested_block! {
    /// A block that may repeat, keeping order.
    ListNestedBlock, NestingMode::List,
    derive = |object| Arc::new(ListType::new(object)),
    step = |this, step| match step {
        PathStep::ElementKeyInt(_) => Ok(SchemaNode::Object(this.nested_object.clone())),
        _ => Err(invalid(step, NestingMode::List)),
    },
}

nested_block! {
    /// A block that may repeat, without order or duplicates.
    SetNestedBlock, NestingMode::Set,
    derive = |object| Arc::new(SetType::new(object)),
    step = |this, step| match step {
        PathStep::ElementKeyValue(_) => Ok(SchemaNode::Object(this.nested_object.clone())),
        _ => Err(invalid(step, NestingMode::Set)),
    },
}

nested_block! {
    /// A block that repeats under distinct labels.
    MapNestedBlock, NestingMode::Map,
    derive = |object| Arc::new(MapType::new(object)),
    step = |this, step| match step {
        PathStep::ElementKeyString(_) => Ok(SchemaNode::Object(this.nested_object.clone())),
        _ => Err(invalid(step, NestingMode::Map)),
    },
}
