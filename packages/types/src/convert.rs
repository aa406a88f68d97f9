//! Mapping wire type descriptors back to attribute types.

use std::sync::Arc;

use tfattr_wire::WireType;

use crate::{
    AttrType, BoolType, ListType, MapType, NumberType, ObjectType, SetType, StringType, TupleType,
};

/// The built-in attribute type for a wire type descriptor.
///
/// Numbers map to [`NumberType`], which keeps integers and floats apart.
/// Containers store their element types as descriptors, so this is how they
/// recover an attribute type for themselves.
pub fn from_terraform_type(ty: &WireType) -> Arc<dyn AttrType> {
    match ty {
        WireType::Bool => Arc::new(BoolType),
        WireType::Number => Arc::new(NumberType),
        WireType::String => Arc::new(StringType),
        WireType::List(elem) => Arc::new(ListType::new(from_terraform_type(elem))),
        WireType::Set(elem) => Arc::new(SetType::new(from_terraform_type(elem))),
        WireType::Map(elem) => Arc::new(MapType::new(from_terraform_type(elem))),
        WireType::Tuple(elems) => Arc::new(TupleType::new(
            elems.iter().map(from_terraform_type).collect(),
        )),
        WireType::Object(attrs) => Arc::new(ObjectType::new(
            attrs
                .iter()
                .map(|(name, ty)| (name.clone(), from_terraform_type(ty)))
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_survives() {
        let ty = WireType::object([
            ("names", WireType::list(WireType::String)),
            ("ports", WireType::set(WireType::Number)),
            ("labels", WireType::map(WireType::String)),
            ("pair", WireType::tuple(vec![WireType::Bool, WireType::Number])),
        ]);
        assert_eq!(from_terraform_type(&ty).terraform_type(), ty);
    }

    #[test]
    fn container_kinds_follow_descriptor() {
        let list = from_terraform_type(&WireType::list(WireType::String));
        assert!(list.equal(&ListType::new(Arc::new(StringType))));
        assert!(!list.equal(&SetType::new(Arc::new(StringType))));
    }
}
