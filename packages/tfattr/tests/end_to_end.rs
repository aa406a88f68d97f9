use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tfattr::prelude::*;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Backend {
    address: String,
    weight: Option<i64>,
}

fn schema() -> Schema {
    Schema::default()
        .with_attribute("name", Attribute::required(Arc::new(StringType)))
        .with_block(
            "backend",
            Arc::new(ListNestedBlock::new(
                NestedBlockObject::default()
                    .with_attribute("address", Attribute::required(Arc::new(StringType)))
                    .with_attribute("weight", Attribute::optional(Arc::new(Int64Type))),
            )),
        )
}

fn backends_type(schema: &Schema) -> Arc<dyn AttrType> {
    schema
        .type_at_path(&AttributePath::new().with_attribute_name("backend"))
        .unwrap()
}

#[test]
fn native_to_typed_to_native() {
    let ctx = Context::background();
    let schema = schema();
    schema.validate_implementation().unwrap();
    let ty = backends_type(&schema);

    let backends = vec![
        Backend {
            address: "10.0.0.1".into(),
            weight: Some(3),
        },
        Backend {
            address: "10.0.0.2".into(),
            weight: None,
        },
    ];
    let wire = from_native(&ctx, &ty.terraform_type(), &backends, AttributePath::new()).unwrap();
    let value = ty.value_from_terraform(&ctx, &wire).unwrap();
    assert_eq!(value.to_wire(&ctx).unwrap(), wire);

    let list = value.as_any().downcast_ref::<List>().unwrap();
    let mut decoded: Vec<Backend> = Vec::new();
    list.elements_as(&ctx, &mut decoded, false).unwrap();
    assert_eq!(decoded, backends);

    let weight = walk_attribute_path(
        value.clone(),
        &AttributePath::new()
            .with_element_key_int(0)
            .with_attribute_name("weight"),
    )
    .unwrap();
    let weight = weight.as_any().downcast_ref::<Int64Value>().unwrap();
    assert_eq!(weight.value(), Some(&3));
}

#[test]
fn unknown_nested_value_needs_permission() {
    let ctx = Context::background();
    let ty = backends_type(&schema());
    let elem_type = ty.terraform_type().element_type().unwrap().clone();

    let backend = WireValue::new(
        elem_type.clone(),
        Raw::Map(
            [
                ("address".to_string(), WireValue::unknown(WireType::String)),
                ("weight".to_string(), WireValue::null(WireType::Number)),
            ]
            .into_iter()
            .collect(),
        ),
    )
    .unwrap();
    let wire = WireValue::new(ty.terraform_type(), Raw::List(vec![backend])).unwrap();
    let value = ty.value_from_terraform(&ctx, &wire).unwrap();
    let list = value.as_any().downcast_ref::<List>().unwrap();

    let mut strict: Vec<Backend> = Vec::new();
    let err = list.elements_as(&ctx, &mut strict, false).unwrap_err();
    assert_eq!(err.path().to_string(), "[0].address");
    assert!(strict.is_empty());

    let mut lenient: Vec<Backend> = Vec::new();
    list.elements_as(&ctx, &mut lenient, true).unwrap();
    assert_eq!(lenient, vec![Backend::default()]);
}

#[test]
fn cancelled_token_stops_conversion() {
    let token = CancellationToken::new();
    let ctx = Context::with_token(token.clone());
    let ty = ListType::new(Arc::new(StringType));
    let wire = WireValue::new(
        WireType::list(WireType::String),
        Raw::List(vec![WireValue::string("a"), WireValue::string("b")]),
    )
    .unwrap();

    assert!(ty.list_from_terraform(&ctx, &wire).is_ok());
    token.cancel();
    let err = ty.list_from_terraform(&ctx, &wire).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        AttrError::Cancelled(Cancelled::Cancelled)
    ));
}

#[test]
fn schema_types_come_back_from_descriptors() {
    let schema = schema();
    let descriptor = schema.attr_type().terraform_type();
    let rebuilt = from_terraform_type(&descriptor);
    assert_eq!(rebuilt.terraform_type(), descriptor);
    // Int64 attributes come back as plain numbers.
    assert!(!rebuilt.equal(&schema.attr_type()));
    assert!(rebuilt.equal(from_terraform_type(&descriptor).as_ref()));
}
