use beeson::{BeeSon, BeeSonError, FormatError, TypeTag, ValidationError};
use futures::executor::block_on;
use serde_json::json;

fn roundtrip(node: &BeeSon) -> BeeSon {
    let bytes = node.serialize().expect("serialize");
    block_on(BeeSon::deserialize(&bytes, None, None)).expect("deserialize")
}

#[test]
fn nullable_conversion_leaves_original_untouched_matrix() {
    let node = BeeSon::from_json(&json!({"a": 1, "b": "x"})).unwrap();
    let before = node.serialize().unwrap();

    let mut nullable = node.with_nullable_container().unwrap();
    assert_eq!(nullable.schema().tag(), TypeTag::NullableObject);
    assert!(nullable.schema().children().iter().all(|c| c.schema.is_nullable()));
    nullable.set_json(json!({"a": null, "b": "x"})).unwrap();

    assert_eq!(node.serialize().unwrap(), before);
    assert_eq!(node.to_json().unwrap(), json!({"a": 1, "b": "x"}));
    assert_eq!(node.schema().tag(), TypeTag::Object);
}

#[test]
fn nullable_object_byte_layout_matrix() {
    let mut node = BeeSon::from_json(&json!({"a": 1, "b": "x"}))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    node.set_json(json!({"a": 1, "b": null})).unwrap();
    let bytes = node.serialize().unwrap();
    // header | table (24 bytes + nullable bits, padded) | null bits | a
    assert_eq!(bytes.len(), 32 * 4);
    assert_eq!(&bytes[30..32], &[0x02, 0x01]);
    assert_eq!(bytes[32 + 24], 0b11);
    assert_eq!(bytes[64], 0b10);
    assert_eq!(&bytes[96 + 28..], &[0, 0, 0, 1]);
}

#[test]
fn null_bit_on_strict_slot_is_rejected_matrix() {
    let node = BeeSon::from_json(&json!({"a": 1, "b": 2}))
        .unwrap()
        .with_nullable_container()
        .unwrap()
        .with_child_nullable("b", false)
        .unwrap();
    let mut bytes = node.serialize().unwrap();
    assert_eq!(bytes[64], 0);
    assert_eq!(roundtrip(&node).to_json().unwrap(), json!({"a": 1, "b": 2}));

    bytes[64] |= 0b10;
    let err = block_on(BeeSon::deserialize(&bytes, None, None)).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Format(FormatError::NullInStrictSlot(1))
    ));
}

#[test]
fn nullable_roundtrip_matrix() {
    let template = json!({
        "id": 7,
        "name": "coke",
        "tags": ["a", "b"],
        "meta": {"x": true},
    });
    let base = BeeSon::from_json(&template)
        .unwrap()
        .with_nullable_container()
        .unwrap();
    let cases = vec![
        template.clone(),
        json!({"id": null, "name": "coke", "tags": ["a", "b"], "meta": {"x": true}}),
        json!({"id": 7, "name": null, "tags": null, "meta": {"x": true}}),
        json!({"id": null, "name": null, "tags": null, "meta": null}),
    ];
    for case in cases {
        let mut node = base.clone();
        node.set_json(case.clone()).unwrap();
        assert_eq!(roundtrip(&node).to_json().unwrap(), case, "{}", case);
    }
}

#[test]
fn nullable_array_matrix() {
    let mut node = BeeSon::from_json(&json!([1, "two", 3.5]))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    assert_eq!(node.schema().tag(), TypeTag::NullableArray);
    node.set_json(json!([null, "two", null])).unwrap();
    let back = roundtrip(&node);
    assert_eq!(back.to_json().unwrap(), json!([null, "two", null]));
    assert_eq!(back.schema().tag(), TypeTag::NullableArray);
    assert!(back.schema().children()[1].schema.is_nullable());
}

#[test]
fn null_container_child_decodes_without_children_matrix() {
    let mut node = BeeSon::from_json(&json!({"inner": [1, 2]}))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    node.set_json(json!({"inner": null})).unwrap();
    let back = roundtrip(&node);
    assert_eq!(back.to_json().unwrap(), json!({"inner": null}));
    let inner = &back.schema().children()[0];
    assert_eq!(inner.schema.tag(), TypeTag::Array);
    assert!(inner.schema.children().is_empty());
    assert_eq!(inner.segment_length, node.schema().children()[0].segment_length);
}

#[test]
fn child_nullability_by_key_matrix() {
    let node = BeeSon::from_json(&json!({"a": 1, "b": 2}))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    let strict_b = node.with_child_nullable("b", false).unwrap();
    assert!(strict_b.schema().children()[0].schema.is_nullable());
    assert!(!strict_b.schema().children()[1].schema.is_nullable());

    let mut rejected = strict_b.clone();
    let err = rejected.set_json(json!({"a": 1, "b": null})).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::AtKey { ref key, .. }) if key == "b"
    ));

    let mut holds_null = node.clone();
    holds_null.set_json(json!({"a": 1, "b": null})).unwrap();
    assert!(holds_null.with_child_nullable("b", false).is_err());
    assert!(holds_null.with_child_nullable("a", false).is_ok());
    assert!(holds_null.with_child_nullable("zzz", false).is_err());

    let array = BeeSon::from_json(&json!([1, 2]))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    assert!(array.with_child_nullable(1usize, false).is_ok());
    assert!(array.with_child_nullable(2usize, false).is_err());

    let strict = BeeSon::from_json(&json!([1])).unwrap();
    assert!(matches!(
        strict.with_child_nullable(0usize, true).unwrap_err(),
        BeeSonError::Validation(ValidationError::NotNullableContainer(TypeTag::Array))
    ));
}

#[test]
fn nested_nullable_container_matrix() {
    let inner = BeeSon::from_json(&json!({"x": 1, "y": 2}))
        .unwrap()
        .with_nullable_container()
        .unwrap();
    let desc = json!({
        "type": "object",
        "children": [
            {
                "marker": "inner",
                "segmentLength": 4,
                "schema": serde_json::to_value(inner.schema().to_description()).unwrap(),
            },
            {"marker": "name", "segmentLength": 1, "schema": {"type": "string"}},
        ],
    });
    let mut outer = BeeSon::from_schema(beeson::SchemaNode::from_json_description(&desc).unwrap());
    let value = json!({"inner": {"x": null, "y": 2}, "name": "n"});
    outer.set_json(value.clone()).unwrap();
    let back = roundtrip(&outer);
    assert_eq!(back.to_json().unwrap(), value);
    assert_eq!(back.schema(), outer.schema());
}
