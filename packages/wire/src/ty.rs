//! Wire type descriptors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::WireError;

/// The shape of a value as the protocol peer understands it.
///
/// Descriptors are immutable and compared structurally: two independently
/// built `List[String]` descriptors are equal.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for object attributes so iteration order, `Display` and
///   the JSON form are deterministic
/// - Element types are boxed so the enum stays small; descriptors are cloned
///   freely, they are never shared mutably
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    /// `true` or `false`.
    Bool,
    /// An arbitrary number, integral or fractional.
    Number,
    /// UTF-8 string.
    String,
    /// Ordered sequence where every element has the same type.
    List(Box<WireType>),
    /// Unordered collection of unique elements of the same type.
    Set(Box<WireType>),
    /// String-keyed collection where every value has the same type.
    Map(Box<WireType>),
    /// Fixed-length sequence with a type per position.
    Tuple(Vec<WireType>),
    /// Fixed set of named attributes, each with its own type.
    Object(BTreeMap<String, WireType>),
}

impl WireType {
    /// A list of `elem`.
    pub fn list(elem: WireType) -> Self {
        WireType::List(Box::new(elem))
    }

    /// A set of `elem`.
    pub fn set(elem: WireType) -> Self {
        WireType::Set(Box::new(elem))
    }

    /// A map of string to `elem`.
    pub fn map(elem: WireType) -> Self {
        WireType::Map(Box::new(elem))
    }

    /// An object with the given attribute types.
    pub fn object<K: Into<String>>(attributes: impl IntoIterator<Item = (K, WireType)>) -> Self {
        WireType::Object(
            attributes
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// A tuple with the given positional types.
    pub fn tuple(elements: Vec<WireType>) -> Self {
        WireType::Tuple(elements)
    }

    /// The element type of a list, set, or map.
    pub fn element_type(&self) -> Option<&WireType> {
        match self {
            WireType::List(elem) | WireType::Set(elem) | WireType::Map(elem) => Some(elem),
            _ => None,
        }
    }

    /// The attribute types of an object.
    pub fn attribute_types(&self) -> Option<&BTreeMap<String, WireType>> {
        match self {
            WireType::Object(attributes) => Some(attributes),
            _ => None,
        }
    }

    /// Check if this is a bool, number, or string.
    pub fn is_primitive(&self) -> bool {
        matches!(self, WireType::Bool | WireType::Number | WireType::String)
    }

    /// Check if this is a list type.
    pub fn is_list(&self) -> bool {
        matches!(self, WireType::List(_))
    }

    /// Check if this is a set type.
    pub fn is_set(&self) -> bool {
        matches!(self, WireType::Set(_))
    }

    /// Check if this is a map type.
    pub fn is_map(&self) -> bool {
        matches!(self, WireType::Map(_))
    }

    /// Check if this is an object type.
    pub fn is_object(&self) -> bool {
        matches!(self, WireType::Object(_))
    }

    /// The bare name of this kind of type, without parameters.
    pub fn kind_name(&self) -> &'static str {
        match self {
            WireType::Bool => "Bool",
            WireType::Number => "Number",
            WireType::String => "String",
            WireType::List(_) => "List",
            WireType::Set(_) => "Set",
            WireType::Map(_) => "Map",
            WireType::Tuple(_) => "Tuple",
            WireType::Object(_) => "Object",
        }
    }

    /// Encode this descriptor in the protocol's JSON type syntax.
    ///
    /// Primitives are bare strings (`"string"`); parameterized types are
    /// two-element arrays (`["list", "string"]`, `["object", {"a": "bool"}]`).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            WireType::Bool => Json::from("bool"),
            WireType::Number => Json::from("number"),
            WireType::String => Json::from("string"),
            WireType::List(elem) => Json::Array(vec![Json::from("list"), elem.to_json()]),
            WireType::Set(elem) => Json::Array(vec![Json::from("set"), elem.to_json()]),
            WireType::Map(elem) => Json::Array(vec![Json::from("map"), elem.to_json()]),
            WireType::Tuple(elems) => Json::Array(vec![
                Json::from("tuple"),
                Json::Array(elems.iter().map(WireType::to_json).collect()),
            ]),
            WireType::Object(attributes) => Json::Array(vec![
                Json::from("object"),
                Json::Object(
                    attributes
                        .iter()
                        .map(|(name, ty)| (name.clone(), ty.to_json()))
                        .collect(),
                ),
            ]),
        }
    }

    /// Parse a descriptor from the protocol's JSON type syntax.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, WireError> {
        use serde_json::Value as Json;

        let invalid = |message: String| WireError::InvalidTypeDescriptor { message };

        match json {
            Json::String(name) => match name.as_str() {
                "bool" => Ok(WireType::Bool),
                "number" => Ok(WireType::Number),
                "string" => Ok(WireType::String),
                other => Err(invalid(format!("unknown primitive type {:?}", other))),
            },
            Json::Array(parts) => {
                let [kind, param] = parts.as_slice() else {
                    return Err(invalid(format!(
                        "expected [kind, parameter], got {} elements",
                        parts.len()
                    )));
                };
                let Some(kind) = kind.as_str() else {
                    return Err(invalid(format!("type kind must be a string, got {}", kind)));
                };
                match (kind, param) {
                    ("list", elem) => Ok(WireType::list(WireType::from_json(elem)?)),
                    ("set", elem) => Ok(WireType::set(WireType::from_json(elem)?)),
                    ("map", elem) => Ok(WireType::map(WireType::from_json(elem)?)),
                    ("tuple", Json::Array(elems)) => Ok(WireType::Tuple(
                        elems
                            .iter()
                            .map(WireType::from_json)
                            .collect::<Result<_, _>>()?,
                    )),
                    ("object", Json::Object(attributes)) => Ok(WireType::Object(
                        attributes
                            .iter()
                            .map(|(name, ty)| Ok((name.clone(), WireType::from_json(ty)?)))
                            .collect::<Result<_, WireError>>()?,
                    )),
                    ("tuple", _) | ("object", _) => Err(invalid(format!(
                        "malformed parameter for {} type: {}",
                        kind, param
                    ))),
                    (other, _) => Err(invalid(format!("unknown type kind {:?}", other))),
                }
            }
            other => Err(invalid(format!("unexpected JSON {}", other))),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Bool | WireType::Number | WireType::String => {
                write!(f, "{}", self.kind_name())
            }
            WireType::List(elem) | WireType::Set(elem) | WireType::Map(elem) => {
                write!(f, "{}[{}]", self.kind_name(), elem)
            }
            WireType::Tuple(elems) => {
                write!(f, "Tuple[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            WireType::Object(attributes) => {
                write!(f, "Object[")?;
                for (i, (name, ty)) in attributes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}:{}", name, ty)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for WireType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        WireType::from_json(&json).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structural_equality() {
        assert_eq!(WireType::list(WireType::String), WireType::list(WireType::String));
        assert_ne!(WireType::list(WireType::String), WireType::set(WireType::String));
        assert_ne!(WireType::list(WireType::String), WireType::list(WireType::Bool));
    }

    #[test]
    fn display_nested() {
        let ty = WireType::object([
            ("names", WireType::list(WireType::String)),
            ("enabled", WireType::Bool),
        ]);
        assert_eq!(
            ty.to_string(),
            r#"Object["enabled":Bool, "names":List[String]]"#
        );
        assert_eq!(
            WireType::tuple(vec![WireType::Number, WireType::String]).to_string(),
            "Tuple[Number, String]"
        );
    }

    #[test]
    fn json_syntax() {
        let ty = WireType::map(WireType::object([("port", WireType::Number)]));
        assert_eq!(ty.to_json(), json!(["map", ["object", {"port": "number"}]]));
    }

    #[test]
    fn json_parse_roundtrip() {
        let json = json!(["object", {
            "tags": ["set", "string"],
            "pair": ["tuple", ["bool", "number"]],
        }]);
        let ty = WireType::from_json(&json).unwrap();
        assert_eq!(
            ty,
            WireType::object([
                ("tags", WireType::set(WireType::String)),
                ("pair", WireType::tuple(vec![WireType::Bool, WireType::Number])),
            ])
        );
        assert_eq!(ty.to_json(), json);
    }

    #[test]
    fn json_parse_rejects_garbage() {
        assert!(WireType::from_json(&json!("float")).is_err());
        assert!(WireType::from_json(&json!(["list"])).is_err());
        assert!(WireType::from_json(&json!(["object", "string"])).is_err());
        assert!(WireType::from_json(&json!(42)).is_err());
    }

    #[test]
    fn serde_uses_json_syntax() {
        let ty: WireType = serde_json::from_str(r#"["list","bool"]"#).unwrap();
        assert_eq!(ty, WireType::list(WireType::Bool));
        assert_eq!(serde_json::to_string(&ty).unwrap(), r#"["list","bool"]"#);
    }

    #[test]
    fn element_type_accessors() {
        assert_eq!(
            WireType::set(WireType::Number).element_type(),
            Some(&WireType::Number)
        );
        assert_eq!(WireType::String.element_type(), None);
        assert!(WireType::object([("a", WireType::Bool)])
            .attribute_types()
            .is_some());
    }
}
