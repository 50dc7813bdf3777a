use beeson::{
    BeeSon, BeeSonError, ErrorKind, FormatError, SchemaNode, TypeTag, ValidationError, Value,
};
use futures::executor::block_on;
use serde_json::json;

fn roundtrip(node: &BeeSon) -> BeeSon {
    let bytes = node.serialize().expect("serialize");
    block_on(BeeSon::deserialize(&bytes, None, None)).expect("deserialize")
}

#[test]
fn coke_scenario_matrix() {
    let mut node = BeeSon::from_json(&json!({"name": "coke", "age": 48, "id": "ID2"})).unwrap();
    let schema = node.schema();
    assert_eq!(schema.tag(), TypeTag::Object);
    assert_eq!(schema.markers().collect::<Vec<_>>(), vec!["age", "id", "name"]);
    let tags: Vec<_> = schema.children().iter().map(|c| c.schema.tag()).collect();
    assert_eq!(tags, vec![TypeTag::Int32, TypeTag::String, TypeTag::String]);

    let back = roundtrip(&node);
    assert_eq!(back.to_json().unwrap(), json!({"name": "coke", "age": 48, "id": "ID2"}));
    assert_eq!(back.schema(), node.schema());

    node.set_json(json!({"name": "coke", "age": 49, "id": "ID2"}))
        .unwrap();
    assert_eq!(roundtrip(&node).to_json().unwrap()["age"], json!(49));

    let err = node
        .set_json(json!({"name": 123, "age": 49, "id": "ID2"}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        BeeSonError::Validation(ValidationError::AtKey { key, source }) => {
            assert_eq!(key, "name");
            assert_eq!(
                *source,
                ValidationError::WrongValue {
                    expected: TypeTag::String,
                    actual: "integer",
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(node.to_json().unwrap()["age"], json!(49));
}

#[test]
fn coke_byte_layout_matrix() {
    let node = BeeSon::from_json(&json!({"name": "coke", "age": 48, "id": "ID2"})).unwrap();
    let bytes = node.serialize().unwrap();
    // header + two table segments + three payload segments
    assert_eq!(bytes.len(), 32 * 6);
    assert_eq!(&bytes[..4], &[1, 0, 1, 0]);
    assert_eq!(&bytes[30..32], &[0x02, 0x00]);
    assert_eq!(&bytes[32..38], &[0, 3, 0, 0, 0, 9]);
    assert_eq!(&bytes[62..71], b"ageidname");
    assert_eq!(&bytes[96 + 28..128], &[0, 0, 0, 48]);
    assert_eq!(&bytes[128..132], b"ID2\"");
    assert_eq!(&bytes[160..165], b"coke\"");
    assert!(bytes[165..].iter().all(|&b| b == 0));
}

#[test]
fn canonical_schema_matrix() {
    let a = BeeSon::from_json(&json!({"x": 1, "y": "two", "z": [true]})).unwrap();
    let b = BeeSon::from_json(&json!({"z": [true], "x": 1, "y": "two"})).unwrap();
    assert_eq!(a.schema().serialize(true).unwrap(), b.schema().serialize(true).unwrap());
    assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
}

#[test]
fn scalar_roots_matrix() {
    let cases = vec![
        json!(null),
        json!(true),
        json!(false),
        json!(-17),
        json!(2.5),
        json!(9007199254740993i64),
        json!(""),
        json!("with \"quotes\" inside"),
        json!("bah5acgzadxcwdayt52nxhygvpou6e63p2vsl23m4kc63f2hyk2avg4joafoq"),
        json!("bah5qcgzaymd4255atbv6kkelx75ezqaq64n7vhxgbkw64bjfjedougktli6q"),
    ];
    for case in cases {
        let node = BeeSon::from_json(&case).unwrap();
        assert_eq!(roundtrip(&node).to_json().unwrap(), case, "{}", case);
    }
}

#[test]
fn address_values_matrix() {
    let node =
        BeeSon::from_json(&json!("bah5acgzadxcwdayt52nxhygvpou6e63p2vsl23m4kc63f2hyk2avg4joafoq"))
            .unwrap();
    assert_eq!(node.schema().tag(), TypeTag::ManifestRef);
    let bytes = node.serialize().unwrap();
    assert_eq!(bytes.len(), 64);
    assert_eq!(&bytes[32..36], &[0x1d, 0xc5, 0x61, 0x83]);
    assert!(matches!(roundtrip(&node).json().unwrap(), Value::ManifestRef(_)));

    // Only the canonical CID text is an address; anything else stays a string.
    let loose = "bah5acgzadxcwdayt52nxhygvpou6e63p2vsl23m4kc63f2hyk2avg4joafor";
    let node = BeeSon::from_json(&json!(loose)).unwrap();
    assert_eq!(node.schema().tag(), TypeTag::String);
    assert_eq!(roundtrip(&node).to_json().unwrap(), json!(loose));
}

#[test]
fn nested_heterogeneous_matrix() {
    let cases = vec![
        json!([]),
        json!({}),
        json!([[], {}, [[]]]),
        json!([1, "a", [2.5, {"k": false}], {"deep": {"deeper": ["x", null]}}]),
        json!({"list": [1, 2, 3], "obj": {"a": "b"}, "n": null, "big": 4294967296i64}),
        json!({"long": "x".repeat(100), "after": 7}),
    ];
    for case in cases {
        let node = BeeSon::from_json(&case).unwrap();
        let back = roundtrip(&node);
        assert_eq!(back.to_json().unwrap(), case, "{}", case);
        assert_eq!(back.schema(), node.schema(), "{}", case);
    }
}

#[test]
fn array_length_and_key_set_are_exact_matrix() {
    let mut node = BeeSon::from_json(&json!([1, 2])).unwrap();
    let err = node.set_json(json!([1, 2, 3])).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::ArrayLength { expected: 2, actual: 3 })
    ));

    let mut node = BeeSon::from_json(&json!({"a": 1, "b": 2})).unwrap();
    let err = node.set_json(json!({"a": 1})).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::MissingKeys(ref keys)) if keys == &["b"]
    ));
    let err = node.set_json(json!({"a": 1, "b": 2, "c": 3})).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::UnexpectedKeys(ref keys)) if keys == &["c"]
    ));
    assert_eq!(node.to_json().unwrap(), json!({"a": 1, "b": 2}));
}

#[test]
fn segment_lengths_are_authoritative_matrix() {
    let mut node = BeeSon::from_json(&json!({"s": "short"})).unwrap();
    node.set_json(json!({"s": "x".repeat(40)})).unwrap();
    let err = node.serialize().unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::SegmentOverflow { declared: 1, actual: 2 })
    ));
}

#[test]
fn unidentifiable_values_matrix() {
    let err = BeeSon::from_value(Value::Int(1 << 40)).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::Unidentifiable(_))
    ));
    let err = BeeSon::from_value(Value::Array(vec![Value::Int(1), Value::Int(-(1 << 40))]))
        .unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::AtIndex { index: 1, .. })
    ));
}

#[test]
fn malformed_input_matrix() {
    let bytes = BeeSon::from_json(&json!([1, "a"])).unwrap().serialize().unwrap();

    let mut bad_version = bytes.clone();
    bad_version[1] = 9;
    let err = block_on(BeeSon::deserialize(&bad_version, None, None)).unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Format(FormatError::UnsupportedVersion([1, 9, 1, 0]))
    ));

    let mut bad_tag = bytes.clone();
    bad_tag[30..32].copy_from_slice(&77u16.to_be_bytes());
    let err = block_on(BeeSon::deserialize(&bad_tag, None, None)).unwrap_err();
    assert!(matches!(err, BeeSonError::Format(FormatError::UnknownTypeTag(77))));

    for cut in [0, 16, 40, bytes.len() - 1] {
        let err = block_on(BeeSon::deserialize(&bytes[..cut], None, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "cut at {}", cut);
    }
}

#[test]
fn authored_schema_matrix() {
    let schema = SchemaNode::from_json_description(&json!({
        "type": "object",
        "children": [
            {"marker": "small", "segmentLength": 1, "schema": {"type": "uint8"}},
            {"marker": "ratio", "segmentLength": 1, "schema": {"type": "float32"}},
            {"marker": "word", "schema": {"type": "string"}},
        ],
    }))
    .unwrap();
    let mut node = BeeSon::from_schema(schema);
    let err = node
        .set_json(json!({"small": 256, "ratio": 0.5, "word": "hi"}))
        .unwrap_err();
    assert!(matches!(
        err,
        BeeSonError::Validation(ValidationError::AtKey { ref key, .. }) if key == "small"
    ));

    // "word" is the last child in marker order and has no declared length.
    let value = json!({"small": 255, "ratio": 0.5, "word": "x".repeat(70)});
    node.set_json(value.clone()).unwrap();
    let back = roundtrip(&node);
    assert_eq!(back.to_json().unwrap(), value);
    assert_eq!(back.schema(), node.schema());
    assert_eq!(back.schema().children()[2].segment_length, None);

    // An integer in a float slot is held as the float it decodes to.
    node.set_json(json!({"small": 1, "ratio": 3, "word": "w"})).unwrap();
    let expected = Value::from(json!({"small": 1, "ratio": 3.0, "word": "w"}));
    assert_eq!(node.json().unwrap(), expected);
    assert_eq!(roundtrip(&node).json().unwrap(), expected);
}

#[test]
fn headerless_encoding_matrix() {
    let node = BeeSon::from_json(&json!([true, "x"])).unwrap();
    let bytes = node.serialize_with(false, &beeson::BmtHasher).unwrap();
    let header = beeson::Header::new(TypeTag::Array);
    let back = block_on(BeeSon::deserialize(&bytes, Some(header), None)).unwrap();
    assert_eq!(back.to_json().unwrap(), json!([true, "x"]));
}
