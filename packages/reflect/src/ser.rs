//! Building wire values from native Rust values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as Json;
use tfattr_wire::{AttributePath, Context, Number, Raw, WireError, WireType, WireValue};
use tracing::debug;

use crate::{DecodeError, DecodeErrorKind};

/// Build a wire value of type `ty` from a native value.
///
/// The native value is serialized to JSON first, then the JSON is walked
/// alongside `ty`. `None` becomes null at any level; object attributes the
/// native value doesn't mention become null too. Every value built is
/// validated, so the result always matches `ty`.
pub fn from_native<T: Serialize + ?Sized>(
    ctx: &Context,
    ty: &WireType,
    value: &T,
    path: AttributePath,
) -> Result<WireValue, DecodeError> {
    debug!(ty = %ty, path = %path, "encoding native value");
    let json = serde_json::to_value(value)
        .map_err(|e| DecodeError::new(path.clone(), DecodeErrorKind::Custom(e.to_string())))?;
    json_to_wire(ctx, ty, json, &path)
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn json_number(n: &serde_json::Number) -> Number {
    match n.as_i64() {
        Some(i) => Number::Integer(i),
        // u64 beyond i64 range, or a float.
        None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn json_to_wire(
    ctx: &Context,
    ty: &WireType,
    json: Json,
    path: &AttributePath,
) -> Result<WireValue, DecodeError> {
    let incompatible = |json: &Json| {
        DecodeError::new(
            path.clone(),
            DecodeErrorKind::IncompatibleNative {
                expected: ty.clone(),
                found: json_kind(json),
            },
        )
    };

    let raw = match (ty, json) {
        (_, Json::Null) => return Ok(WireValue::null(ty.clone())),
        (WireType::Bool, Json::Bool(b)) => Raw::Bool(b),
        (WireType::Number, Json::Number(n)) => Raw::Number(json_number(&n)),
        (WireType::String, Json::String(s)) => Raw::String(s),
        (WireType::List(elem) | WireType::Set(elem), Json::Array(items)) => {
            let mut elems = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let elem_path = path.with_element_key_int(i as i64);
                ctx.check()
                    .map_err(|e| DecodeError::new(elem_path.clone(), e.into()))?;
                elems.push(json_to_wire(ctx, elem, item, &elem_path)?);
            }
            Raw::List(elems)
        }
        (WireType::Tuple(types), Json::Array(items)) => {
            if types.len() != items.len() {
                return Err(DecodeError::new(
                    path.clone(),
                    DecodeErrorKind::LengthMismatch {
                        expected: types.len(),
                        found: items.len(),
                    },
                ));
            }
            let mut elems = Vec::with_capacity(items.len());
            for (i, (elem, item)) in types.iter().zip(items).enumerate() {
                let elem_path = path.with_element_key_int(i as i64);
                ctx.check()
                    .map_err(|e| DecodeError::new(elem_path.clone(), e.into()))?;
                elems.push(json_to_wire(ctx, elem, item, &elem_path)?);
            }
            Raw::List(elems)
        }
        (WireType::Map(elem), Json::Object(entries)) => {
            let mut out = BTreeMap::new();
            for (key, item) in entries {
                let entry_path = path.with_element_key_string(key.clone());
                ctx.check()
                    .map_err(|e| DecodeError::new(entry_path.clone(), e.into()))?;
                let value = json_to_wire(ctx, elem, item, &entry_path)?;
                out.insert(key, value);
            }
            Raw::Map(out)
        }
        (WireType::Object(attributes), Json::Object(mut entries)) => {
            if let Some(name) = entries.keys().find(|k| !attributes.contains_key(*k)) {
                return Err(DecodeError::new(
                    path.clone(),
                    DecodeErrorKind::Wire(WireError::UnexpectedAttribute {
                        path: AttributePath::new(),
                        name: name.clone(),
                    }),
                ));
            }
            let mut out = BTreeMap::new();
            for (name, attr_type) in attributes {
                let attr_path = path.with_attribute_name(name.clone());
                let item = entries.remove(name).unwrap_or(Json::Null);
                out.insert(name.clone(), json_to_wire(ctx, attr_type, item, &attr_path)?);
            }
            Raw::Map(out)
        }
        (_, json) => return Err(incompatible(&json)),
    };

    WireValue::new(ty.clone(), raw).map_err(|e| DecodeError::new(path.clone(), e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Rule {
        port: u16,
        cidr: Option<String>,
    }

    fn rule_type() -> WireType {
        WireType::object([("port", WireType::Number), ("cidr", WireType::String)])
    }

    fn encode<T: Serialize + ?Sized>(ty: &WireType, value: &T) -> Result<WireValue, DecodeError> {
        from_native(&Context::background(), ty, value, AttributePath::new())
    }

    #[test]
    fn encodes_list_of_strings() {
        let ty = WireType::list(WireType::String);
        let v = encode(&ty, &["a", "b"]).unwrap();
        assert_eq!(v.ty(), &ty);
        assert_eq!(
            v.as_list().unwrap(),
            &[WireValue::string("a"), WireValue::string("b")]
        );
    }

    #[test]
    fn none_becomes_null() {
        let v = encode(&WireType::String, &None::<String>).unwrap();
        assert!(v.is_null());
        assert_eq!(v.ty(), &WireType::String);
    }

    #[test]
    fn encodes_struct_as_object() {
        let v = encode(
            &rule_type(),
            &Rule {
                port: 443,
                cidr: None,
            },
        )
        .unwrap();
        let attrs = v.as_map().unwrap();
        assert_eq!(attrs["port"], WireValue::number(443));
        assert_eq!(attrs["cidr"], WireValue::null(WireType::String));
    }

    #[test]
    fn missing_attributes_are_null() {
        let v = encode(&rule_type(), &btree! { "port" => 80 }).unwrap();
        assert!(v.as_map().unwrap()["cidr"].is_null());
    }

    #[test]
    fn extra_attributes_rejected() {
        let err = encode(&rule_type(), &btree! { "port" => 80, "proto" => 6 }).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::Wire(WireError::UnexpectedAttribute { ref name, .. }) if name == "proto"
        ));
    }

    #[test]
    fn mismatch_reports_path() {
        let ty = WireType::list(WireType::Bool);
        let err = encode(&ty, &vec![serde_json::json!(true), serde_json::json!("no")]).unwrap_err();
        assert_eq!(err.path, AttributePath::new().with_element_key_int(1));
        assert!(matches!(
            err.kind,
            DecodeErrorKind::IncompatibleNative { found: "string", .. }
        ));
    }

    #[test]
    fn tuple_length_checked() {
        let ty = WireType::tuple(vec![WireType::String, WireType::Number]);
        assert!(encode(&ty, &("a", 1)).is_ok());
        let err = encode(&ty, &("a", 1, true)).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::LengthMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn floats_and_integers() {
        assert_eq!(
            encode(&WireType::Number, &1.5).unwrap().as_number().unwrap(),
            Number::Float(1.5)
        );
        assert_eq!(
            encode(&WireType::Number, &7u8).unwrap().as_number().unwrap(),
            Number::Integer(7)
        );
    }

    #[test]
    fn cancelled_between_elements() {
        let ctx = Context::background();
        ctx.cancel();
        let err = from_native(
            &ctx,
            &WireType::list(WireType::String),
            &["a"],
            AttributePath::new(),
        )
        .unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::Cancelled(_)));
    }
}
