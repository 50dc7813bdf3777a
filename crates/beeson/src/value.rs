//! The JSON-like values BeeSon encodes.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};

use crate::marshal::address::{parse_cid, to_cid, AddressKind};
use crate::reference::Reference;

/// A BeeSon value.
///
/// Integers and big integers are kept apart the way a JavaScript runtime
/// keeps `number` and `bigint` apart: the former infers to `int32`, the latter
/// to `int64`. Objects keep insertion order; the schema sorts markers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(i64),
    String(String),
    ManifestRef(Reference),
    FeedRef(Reference),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the value kind, used in validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::ManifestRef(_) => "manifest reference",
            Value::FeedRef(_) => "feed reference",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Converts to `serde_json`, rendering addresses as CIDs. Non-finite
    /// floats have no JSON form and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) | Value::BigInt(n) => JsonValue::Number((*n).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::ManifestRef(r) => JsonValue::String(to_cid(AddressKind::Manifest, r)),
            Value::FeedRef(r) => JsonValue::String(to_cid(AddressKind::Feed, r)),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, JsonValue>>(),
            ),
        }
    }
}

fn from_json_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        if i32::try_from(i).is_ok() {
            Value::Int(i)
        } else {
            Value::BigInt(i)
        }
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Strings that parse as a feed CID, then a manifest CID, become addresses.
fn from_json_string(s: &str) -> Value {
    if let Ok(r) = parse_cid(AddressKind::Feed, s) {
        return Value::FeedRef(r);
    }
    if let Ok(r) = parse_cid(AddressKind::Manifest, s) {
        return Value::ManifestRef(r);
    }
    Value::String(s.to_owned())
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => from_json_number(n),
            JsonValue::String(s) => from_json_string(s),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_split_by_width() {
        assert_eq!(Value::from(json!(48)), Value::Int(48));
        assert_eq!(Value::from(json!(-2147483648i64)), Value::Int(-2147483648));
        assert_eq!(Value::from(json!(2147483648i64)), Value::BigInt(2147483648));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
    }

    #[test]
    fn cid_strings_become_addresses() {
        let feed = "bah5qcgzaymd4255atbv6kkelx75ezqaq64n7vhxgbkw64bjfjedougktli6q";
        let manifest = "bah5acgzadxcwdayt52nxhygvpou6e63p2vsl23m4kc63f2hyk2avg4joafoq";
        assert!(matches!(Value::from(json!(feed)), Value::FeedRef(_)));
        assert!(matches!(Value::from(json!(manifest)), Value::ManifestRef(_)));
        assert_eq!(Value::from(json!("coke")), Value::String("coke".into()));
        assert_eq!(Value::from(json!(manifest)).to_json(), json!(manifest));
    }

    #[test]
    fn objects_keep_insertion_order() {
        let json = json!({"name": "coke", "age": 48, "id": "ID2"});
        let value = Value::from(&json);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "age", "id"]);
        assert_eq!(value.to_json(), json);
    }
}
