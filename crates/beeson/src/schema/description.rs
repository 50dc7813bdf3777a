//! Lossless, JSON-shaped export and import of schema trees.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::tag::TypeTag;

use super::{ChildDescriptor, SchemaNode};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Serializable form of a [`SchemaNode`].
///
/// ```
/// use beeson::{SchemaDescription, SchemaNode};
///
/// let desc: SchemaDescription = serde_json::from_value(serde_json::json!({
///     "type": "object",
///     "children": [
///         { "marker": "id", "segmentLength": 1, "schema": { "type": "uint8" } },
///     ],
/// }))
/// .unwrap();
/// let node = SchemaNode::from_description(&desc).unwrap();
/// assert_eq!(node.to_description(), desc);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescription {
    #[serde(rename = "type")]
    pub tag: TypeTag,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub indirected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ChildDescription>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Omitted means "the rest of the slice" (last child only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_length: Option<u32>,
    pub schema: SchemaDescription,
}

impl SchemaNode {
    pub fn to_description(&self) -> SchemaDescription {
        let children = self.tag.is_container().then(|| {
            self.children
                .iter()
                .map(|child| ChildDescription {
                    marker: child.marker.clone(),
                    segment_length: child.segment_length,
                    schema: child.schema.to_description(),
                })
                .collect()
        });
        SchemaDescription {
            tag: self.tag,
            nullable: self.nullable,
            indirected: self.indirected,
            children,
        }
    }

    /// Rebuilds a schema tree from its description. Object children may come
    /// in any order; they are sorted by marker.
    pub fn from_description(desc: &SchemaDescription) -> Result<Self, ValidationError> {
        if desc.nullable {
            return Err(ValidationError::InvalidDescription(
                "only children of nullable containers can be nullable".into(),
            ));
        }
        from_description(desc)
    }

    /// Parses a description from its JSON form.
    pub fn from_json_description(json: &serde_json::Value) -> Result<Self, ValidationError> {
        let desc: SchemaDescription = serde_json::from_value(json.clone())
            .map_err(|err| ValidationError::InvalidDescription(err.to_string()))?;
        Self::from_description(&desc)
    }
}

fn from_description(desc: &SchemaDescription) -> Result<SchemaNode, ValidationError> {
    let node = if desc.tag.is_container() {
        let children = desc
            .children
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, child)| {
                let schema = from_description(&child.schema).map_err(|err| match &child.marker {
                    Some(marker) => ValidationError::at_key(marker, err),
                    None => ValidationError::at_index(i, err),
                })?;
                Ok(ChildDescriptor {
                    segment_length: child.segment_length,
                    marker: child.marker.clone(),
                    schema: Arc::new(schema),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        SchemaNode::container(desc.tag, children)?
    } else {
        if desc.children.is_some() {
            return Err(ValidationError::InvalidDescription(format!(
                "{} cannot have children",
                desc.tag
            )));
        }
        SchemaNode::scalar(desc.tag)?
    };
    let node = if desc.indirected {
        node.indirected(true)?
    } else {
        node
    };
    Ok(node.with_nullable(desc.nullable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_schema;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn inferred_schema_roundtrips_through_description() {
        let value = Value::from(json!({"b": [1, "x"], "a": {"c": true}}));
        let node = infer_schema(&value).unwrap();
        let desc = node.to_description();
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["type"], json!("object"));
        assert_eq!(json["children"][0]["marker"], json!("a"));
        assert_eq!(SchemaNode::from_json_description(&json).unwrap(), node);
    }

    #[test]
    fn numeric_tags_can_be_swapped() {
        let node = SchemaNode::from_json_description(&json!({
            "type": "nullableObject",
            "children": [
                {"marker": "n", "segmentLength": 1, "schema": {"type": "int16", "nullable": true}},
                {"marker": "f", "segmentLength": 1, "schema": {"type": "float32"}},
            ],
        }))
        .unwrap();
        assert_eq!(node.markers().collect::<Vec<_>>(), vec!["f", "n"]);
        assert_eq!(node.children()[1].schema.tag(), TypeTag::Int16);
        assert!(node.children()[1].schema.is_nullable());
    }

    #[test]
    fn rejects_inconsistent_descriptions() {
        let cases = [
            json!({"type": "string", "children": []}),
            json!({"type": "string", "indirected": true}),
            json!({"type": "array", "nullable": true, "children": []}),
            json!({"type": "array", "children": [
                {"schema": {"type": "int32", "nullable": true}, "segmentLength": 1},
            ]}),
            json!({"type": "object", "children": [
                {"schema": {"type": "int32"}, "segmentLength": 1},
            ]}),
            json!({"type": "array", "children": [
                {"schema": {"type": "int32"}},
                {"schema": {"type": "int32"}, "segmentLength": 1},
            ]}),
            json!({"type": "bogus"}),
        ];
        for case in cases {
            assert!(SchemaNode::from_json_description(&case).is_err(), "{}", case);
        }
    }
}
