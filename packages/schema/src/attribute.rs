//! Schema attributes.

use std::sync::Arc;

use tfattr_types::AttrType;

/// A named value in a schema: its type, its documentation, and how
/// practitioners and providers may set it.
#[derive(Clone, Debug)]
pub struct Attribute {
    attr_type: Arc<dyn AttrType>,
    description: String,
    markdown_description: String,
    deprecation_message: String,
    required: bool,
    optional: bool,
    computed: bool,
    sensitive: bool,
}

impl Attribute {
    pub fn new(attr_type: Arc<dyn AttrType>) -> Self {
        Self {
            attr_type,
            description: String::new(),
            markdown_description: String::new(),
            deprecation_message: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
        }
    }

    /// An attribute practitioners must set.
    pub fn required(attr_type: Arc<dyn AttrType>) -> Self {
        Self {
            required: true,
            ..Self::new(attr_type)
        }
    }

    /// An attribute practitioners may set.
    pub fn optional(attr_type: Arc<dyn AttrType>) -> Self {
        Self {
            optional: true,
            ..Self::new(attr_type)
        }
    }

    /// An attribute only the provider sets.
    pub fn computed(attr_type: Arc<dyn AttrType>) -> Self {
        Self {
            computed: true,
            ..Self::new(attr_type)
        }
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

    /// Also let the provider fill the value in when practitioners leave it out.
    pub fn with_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn attr_type(&self) -> &Arc<dyn AttrType> {
        &self.attr_type
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

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Equal types, documentation and flags.
    pub fn equal(&self, other: &Attribute) -> bool {
        self.attr_type.equal(other.attr_type.as_ref())
            && self.description == other.description
            && self.markdown_description == other.markdown_description
            && self.deprecation_message == other.deprecation_message
            && self.required == other.required
            && self.optional == other.optional
            && self.computed == other.computed
            && self.sensitive == other.sensitive
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfattr_types::{Int64Type, StringType};

    #[test]
    fn flags_and_docs_are_compared() {
        let a = Attribute::optional(Arc::new(StringType)).with_description("name");
        assert_eq!(a, a.clone());
        assert_ne!(a, a.clone().with_sensitive());
        assert_ne!(a, a.clone().with_description("other"));
        assert_ne!(a, Attribute::optional(Arc::new(Int64Type)).with_description("name"));
        assert_ne!(a, Attribute::required(Arc::new(StringType)).with_description("name"));
    }

    #[test]
    fn optional_computed() {
        let a = Attribute::optional(Arc::new(StringType)).with_computed();
        assert!(a.is_optional() && a.is_computed());
        assert!(!a.is_required());
    }
}
