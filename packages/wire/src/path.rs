//! Attribute paths: pointers to values nested inside other values.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::{Raw, ValueState, WireError, WireType, WireValue};

/// One step of an [`AttributePath`].
#[derive(Clone, Debug, PartialEq)]
pub enum PathStep {
    /// An attribute of an object, or a child of a schema block.
    AttributeName(String),
    /// An entry of a map.
    ElementKeyString(String),
    /// A position in a list or tuple.
    ElementKeyInt(i64),
    /// A member of a set, identified by its own value.
    ElementKeyValue(WireValue),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::AttributeName(name) => write!(f, ".{}", name),
            PathStep::ElementKeyString(key) => write!(f, "[{:?}]", key),
            PathStep::ElementKeyInt(i) => write!(f, "[{}]", i),
            PathStep::ElementKeyValue(value) => write!(f, "[{}]", value),
        }
    }
}

/// A path from a root value to something nested inside it.
///
/// Paths are built by appending steps; builders return a new path and leave
/// the original untouched so a parent path can be reused for every child.
///
/// # Examples
///
/// ```rust
/// use tfattr_wire::{AttributePath, PathStep};
///
/// let path = AttributePath::new()
///     .with_attribute_name("rules")
///     .with_element_key_int(0)
///     .with_attribute_name("port");
///
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "rules[0].port");
/// assert_eq!(path.last_step(), Some(&PathStep::AttributeName("port".into())));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributePath {
    steps: Vec<PathStep>,
}

impl AttributePath {
    /// The empty (root) path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from steps.
    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// The steps, root first.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Check if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Iterate over steps, root first.
    pub fn iter(&self) -> impl Iterator<Item = &PathStep> {
        self.steps.iter()
    }

    /// The final step, if any.
    pub fn last_step(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// This path without its final step. The root's parent is the root.
    #[must_use]
    pub fn parent(&self) -> AttributePath {
        let mut steps = self.steps.clone();
        steps.pop();
        Self { steps }
    }

    /// This path with one more step.
    #[must_use]
    pub fn with_step(&self, step: PathStep) -> AttributePath {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Self { steps }
    }

    /// This path followed by an attribute name.
    #[must_use]
    pub fn with_attribute_name(&self, name: impl Into<String>) -> AttributePath {
        self.with_step(PathStep::AttributeName(name.into()))
    }

    /// This path followed by a map key.
    #[must_use]
    pub fn with_element_key_string(&self, key: impl Into<String>) -> AttributePath {
        self.with_step(PathStep::ElementKeyString(key.into()))
    }

    /// This path followed by a list index.
    #[must_use]
    pub fn with_element_key_int(&self, index: i64) -> AttributePath {
        self.with_step(PathStep::ElementKeyInt(index))
    }

    /// This path followed by a set member.
    #[must_use]
    pub fn with_element_key_value(&self, value: WireValue) -> AttributePath {
        self.with_step(PathStep::ElementKeyValue(value))
    }

    /// This path followed by every step of `other`.
    #[must_use]
    pub fn join(&self, other: &AttributePath) -> AttributePath {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Self { steps }
    }

    /// Check if this path starts with `prefix`.
    pub fn has_prefix(&self, prefix: &AttributePath) -> bool {
        prefix.steps.len() <= self.steps.len()
            && prefix.steps[..] == self.steps[..prefix.steps.len()]
    }
}

impl Index<usize> for AttributePath {
    type Output = PathStep;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(root)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                step => write!(f, "{}", step)?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathStep> for AttributePath {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Something a path step can be applied to.
///
/// Values step into their children, types into their element or attribute
/// types, schema nodes into nested attributes and blocks. When `Output` is the
/// stepper itself, [`walk_attribute_path`] can follow a whole path.
pub trait AttributePathStepper {
    type Output;

    /// Apply one step, failing with [`WireError::InvalidStep`] if it doesn't
    /// make sense here.
    fn apply_step(&self, step: &PathStep) -> Result<Self::Output, WireError>;
}

/// Follow every step of `path` starting at `start`.
///
/// Failures report the path up to and including the step that failed.
pub fn walk_attribute_path<S>(start: S, path: &AttributePath) -> Result<S, WireError>
where
    S: AttributePathStepper<Output = S>,
{
    let mut current = start;
    for (i, step) in path.iter().enumerate() {
        current = current.apply_step(step).map_err(|e| WireError::AtPath {
            path: AttributePath::from_steps(path.steps()[..=i].to_vec()),
            source: Box::new(e),
        })?;
    }
    Ok(current)
}

/// Shared steppers (`Arc<dyn AttrType>` and friends) step through their target.
impl<T> AttributePathStepper for Arc<T>
where
    T: AttributePathStepper<Output = Arc<T>> + ?Sized,
{
    type Output = Arc<T>;

    fn apply_step(&self, step: &PathStep) -> Result<Arc<T>, WireError> {
        (**self).apply_step(step)
    }
}

impl AttributePathStepper for WireValue {
    type Output = WireValue;

    fn apply_step(&self, step: &PathStep) -> Result<WireValue, WireError> {
        let invalid = || WireError::InvalidStep {
            step: step.clone(),
            target: self.to_string(),
        };

        let ValueState::Known(raw) = self.payload() else {
            return Err(invalid());
        };

        let found = match (self.ty(), raw, step) {
            (WireType::Object(_), Raw::Map(attrs), PathStep::AttributeName(name)) => {
                attrs.get(name)
            }
            (WireType::Map(_), Raw::Map(entries), PathStep::ElementKeyString(key)) => {
                entries.get(key)
            }
            (
                WireType::List(_) | WireType::Tuple(_),
                Raw::List(elems),
                PathStep::ElementKeyInt(i),
            ) => usize::try_from(*i).ok().and_then(|i| elems.get(i)),
            (WireType::Set(_), Raw::List(elems), PathStep::ElementKeyValue(member)) => {
                elems.iter().find(|e| *e == member)
            }
            _ => None,
        };

        found.cloned().ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    fn sample() -> WireValue {
        let rule = WireValue::new(
            WireType::object([("port", WireType::Number)]),
            Raw::Map(btree! { "port".to_string() => WireValue::number(443) }),
        )
        .unwrap();
        let rules = WireValue::new(
            WireType::list(rule.ty().clone()),
            Raw::List(vec![rule]),
        )
        .unwrap();
        WireValue::new(
            WireType::object([("rules", rules.ty().clone())]),
            Raw::Map(btree! { "rules".to_string() => rules }),
        )
        .unwrap()
    }

    #[test]
    fn builders_do_not_mutate() {
        let root = AttributePath::new().with_attribute_name("a");
        let child = root.with_element_key_int(1);
        assert_eq!(root.len(), 1);
        assert_eq!(child.len(), 2);
        assert_eq!(child.parent(), root);
        assert!(child.has_prefix(&root));
        assert!(!root.has_prefix(&child));
    }

    #[test]
    fn display_forms() {
        let path = AttributePath::new()
            .with_attribute_name("tags")
            .with_element_key_string("env")
            .with_element_key_value(WireValue::string("x"));
        assert_eq!(path.to_string(), r#"tags["env"][String<"x">]"#);
        assert_eq!(AttributePath::new().to_string(), "(root)");
    }

    #[test]
    fn index_and_join() {
        let a = AttributePath::new().with_attribute_name("a");
        let b = AttributePath::new().with_element_key_int(0);
        let joined = a.join(&b);
        assert_eq!(joined[0], PathStep::AttributeName("a".into()));
        assert_eq!(joined[1], PathStep::ElementKeyInt(0));
    }

    #[test]
    fn walk_into_value() {
        let path = AttributePath::new()
            .with_attribute_name("rules")
            .with_element_key_int(0)
            .with_attribute_name("port");
        let port = walk_attribute_path(sample(), &path).unwrap();
        assert_eq!(port, WireValue::number(443));
    }

    #[test]
    fn walk_reports_failing_prefix() {
        let path = AttributePath::new()
            .with_attribute_name("rules")
            .with_element_key_int(5)
            .with_attribute_name("port");
        match walk_attribute_path(sample(), &path).unwrap_err() {
            WireError::AtPath { path: failed, source } => {
                assert_eq!(failed.len(), 2);
                assert!(matches!(*source, WireError::InvalidStep { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn step_into_set_by_value() {
        let set = WireValue::new(
            WireType::set(WireType::String),
            Raw::List(vec![WireValue::string("a"), WireValue::string("b")]),
        )
        .unwrap();
        let found = set
            .apply_step(&PathStep::ElementKeyValue(WireValue::string("b")))
            .unwrap();
        assert_eq!(found, WireValue::string("b"));
        assert!(set.apply_step(&PathStep::ElementKeyInt(0)).is_err());
    }

    #[test]
    fn cannot_step_into_unknown() {
        let v = WireValue::unknown(WireType::list(WireType::String));
        assert!(v.apply_step(&PathStep::ElementKeyInt(0)).is_err());
    }
}
