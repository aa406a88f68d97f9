use std::sync::Arc;

use collection_literals::btree;
use tfattr_schema::{
    blocks_equal, Attribute, Block, ListNestedBlock, MapNestedBlock, NestedBlockObject,
    NestingMode, Schema, SchemaError, SchemaNode, SetNestedBlock, SingleNestedBlock,
};
use tfattr_types::{AttrType, BoolType, Int64Type, ListType, StringType};
use tfattr_wire::{AttributePath, Raw, WireType, WireValue};

fn firewall() -> Schema {
    let rule = NestedBlockObject::default()
        .with_attribute("port", Attribute::required(Arc::new(Int64Type)))
        .with_attribute(
            "cidrs",
            Attribute::optional(Arc::new(ListType::new(Arc::new(StringType)))),
        );
    let timeouts = NestedBlockObject::default()
        .with_attribute("create", Attribute::optional(Arc::new(StringType)));
    let tag = NestedBlockObject::default()
        .with_attribute("value", Attribute::required(Arc::new(StringType)));

    Schema::default()
        .with_description("A firewall")
        .with_version(2)
        .with_attribute("name", Attribute::required(Arc::new(StringType)))
        .with_attribute(
            "id",
            Attribute::computed(Arc::new(StringType)).with_description("Assigned on create"),
        )
        .with_block("ingress", Arc::new(ListNestedBlock::new(rule.clone())))
        .with_block("egress", Arc::new(SetNestedBlock::new(rule)))
        .with_block("timeouts", Arc::new(SingleNestedBlock::new(timeouts)))
        .with_block("tags", Arc::new(MapNestedBlock::new(tag)))
}

#[test]
fn whole_schema_type() {
    let schema = firewall();
    schema.validate_implementation().unwrap();
    assert_eq!(schema.version(), 2);
    assert_eq!(schema.description(), "A firewall");

    let rule = WireType::object([
        ("port", WireType::Number),
        ("cidrs", WireType::list(WireType::String)),
    ]);
    let expected = WireType::object([
        ("name", WireType::String),
        ("id", WireType::String),
        ("ingress", WireType::list(rule.clone())),
        ("egress", WireType::set(rule)),
        (
            "timeouts",
            WireType::object([("create", WireType::String)]),
        ),
        (
            "tags",
            WireType::map(WireType::object([("value", WireType::String)])),
        ),
    ]);
    assert_eq!(schema.attr_type().terraform_type(), expected);
}

#[test]
fn type_lookups_through_blocks_and_attributes() {
    let schema = firewall();

    let cidr = AttributePath::new()
        .with_attribute_name("ingress")
        .with_element_key_int(3)
        .with_attribute_name("cidrs")
        .with_element_key_int(0);
    assert_eq!(
        schema.type_at_path(&cidr).unwrap().terraform_type(),
        WireType::String
    );

    let create = AttributePath::new()
        .with_attribute_name("timeouts")
        .with_attribute_name("create");
    assert_eq!(
        schema.type_at_path(&create).unwrap().terraform_type(),
        WireType::String
    );

    let tag = AttributePath::new()
        .with_attribute_name("tags")
        .with_element_key_string("env");
    assert!(schema.type_at_path(&tag).unwrap().terraform_type().is_object());
}

#[test]
fn node_lookups() {
    let schema = firewall();

    let node = schema
        .node_at_path(&AttributePath::new().with_attribute_name("id"))
        .unwrap();
    let attr = node.as_attribute().unwrap();
    assert!(attr.is_computed());
    assert_eq!(attr.description(), "Assigned on create");

    let node = schema
        .node_at_path(&AttributePath::new().with_attribute_name("egress"))
        .unwrap();
    assert_eq!(node.as_block().unwrap().nesting_mode(), NestingMode::Set);

    let member = WireValue::new(
        WireType::object([
            ("port", WireType::Number),
            ("cidrs", WireType::list(WireType::String)),
        ]),
        Raw::Map(btree! {
            "port".to_string() => WireValue::number(443),
            "cidrs".to_string() => WireValue::null(WireType::list(WireType::String)),
        }),
    )
    .unwrap();
    let port = AttributePath::new()
        .with_attribute_name("egress")
        .with_element_key_value(member)
        .with_attribute_name("port");
    let node = schema.node_at_path(&port).unwrap();
    assert!(node.as_attribute().unwrap().is_required());
    assert_eq!(node.attr_type().terraform_type(), WireType::Number);

    let root = schema.node_at_path(&AttributePath::new()).unwrap();
    assert!(matches!(root, SchemaNode::Object(_)));
}

#[test]
fn bad_steps_report_where_they_failed() {
    let schema = firewall();
    let path = AttributePath::new()
        .with_attribute_name("ingress")
        .with_element_key_string("first")
        .with_attribute_name("port");
    match schema.node_at_path(&path) {
        Err(SchemaError::Wire(err)) => {
            assert!(err.to_string().starts_with("at ingress[\"first\"]"), "{}", err);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn validation_finds_problems_in_nested_blocks() {
    let deep = NestedBlockObject::default()
        .with_attribute("ok", Attribute::optional(Arc::new(BoolType)))
        .with_attribute("shared", Attribute::optional(Arc::new(BoolType)))
        .with_block(
            "shared",
            Arc::new(SingleNestedBlock::new(NestedBlockObject::default())),
        );
    let schema = firewall().with_block("outer", Arc::new(ListNestedBlock::new(deep)));

    match schema.validate_implementation() {
        Err(SchemaError::NameCollision { path, name }) => {
            assert_eq!(name, "shared");
            assert_eq!(path.to_string(), "outer.shared");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn block_equality_across_kinds() {
    let object = NestedBlockObject::new(
        btree! { "port".to_string() => Attribute::required(Arc::new(Int64Type)) },
        Default::default(),
    );
    let custom: Arc<dyn AttrType> = Arc::new(ListType::new(Arc::new(object.object_type())));

    let list: Arc<dyn Block> = Arc::new(
        ListNestedBlock::new(object.clone())
            .with_custom_type(custom.clone())
            .with_description("rules"),
    );
    let set: Arc<dyn Block> = Arc::new(
        SetNestedBlock::new(object)
            .with_custom_type(custom)
            .with_description("rules"),
    );

    assert!(blocks_equal(list.as_ref(), set.as_ref()));
    assert!(list.as_ref() != set.as_ref());
    assert!(list.as_ref() == list.as_ref());
}

#[test]
fn nesting_mode_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&NestingMode::Map).unwrap(),
        "\"map\""
    );
    let mode: NestingMode = serde_json::from_str("\"single\"").unwrap();
    assert_eq!(mode, NestingMode::Single);
    assert_eq!(NestingMode::List.to_string(), "list");
}
