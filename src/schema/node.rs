use crate::descriptor::{component_ref, Primitive};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A schema fragment: either a reference to a named component or an inline
/// schema object.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SchemaNode {
    Reference(Reference),
    Inline(Box<SchemaObject>),
}

impl SchemaNode {
    pub fn reference(canonical: &str) -> Self {
        SchemaNode::Reference(Reference::schema(canonical))
    }

    pub fn inline(obj: SchemaObject) -> Self {
        SchemaNode::Inline(Box::new(obj))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            SchemaNode::Reference(r) => Some(r),
            SchemaNode::Inline(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            SchemaNode::Inline(obj) => Some(obj),
            SchemaNode::Reference(_) => None,
        }
    }
}

/// A `$ref` to a named component.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl Reference {
    /// Component schema reference for a canonical type name.
    pub fn schema(canonical: &str) -> Self {
        Reference {
            ref_path: component_ref(canonical),
        }
    }

    /// Canonical component name this reference points at.
    pub fn component_name(&self) -> &str {
        self.ref_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.ref_path)
    }
}

/// Schema value kind.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Boolean,
    Integer,
    Number,
    Array,
    Object,
}

/// An inline schema value.
///
/// Absent fields are omitted from the serialized JSON; a default object
/// serializes as `{}`, which is also the forward-declaration placeholder and
/// the shape of an untyped/empty struct.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SchemaObject {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "x-enum-varnames", skip_serializing_if = "Option::is_none")]
    pub enum_titles: Option<Vec<Value>>,
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,
}

impl SchemaObject {
    pub fn string() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::String),
            ..Default::default()
        }
    }

    pub fn boolean() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Boolean),
            ..Default::default()
        }
    }

    pub fn int32() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Integer),
            format: Some("int32".to_string()),
            ..Default::default()
        }
    }

    pub fn int64() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Integer),
            format: Some("int64".to_string()),
            ..Default::default()
        }
    }

    pub fn double() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Number),
            format: Some("double".to_string()),
            ..Default::default()
        }
    }

    /// Binary payload: a string with `format: binary`, distinct from a
    /// generic element collection.
    pub fn binary_string() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::String),
            format: Some("binary".to_string()),
            ..Default::default()
        }
    }

    pub fn date_time() -> Self {
        SchemaObject {
            kind: Some(SchemaKind::String),
            format: Some("date-time".to_string()),
            ..Default::default()
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn map_of(value: SchemaNode) -> Self {
        SchemaObject {
            kind: Some(SchemaKind::Object),
            additional_properties: Some(Box::new(value)),
            ..Default::default()
        }
    }

    /// Schema for a primitive scalar. Unsigned widths promote to `int64`.
    pub fn primitive(p: Primitive) -> Self {
        match p {
            Primitive::Str => SchemaObject::string(),
            Primitive::Bool => SchemaObject::boolean(),
            Primitive::I8 | Primitive::I16 | Primitive::I32 => SchemaObject::int32(),
            Primitive::I64
            | Primitive::U8
            | Primitive::U16
            | Primitive::U32
            | Primitive::U64 => SchemaObject::int64(),
            Primitive::F32 | Primitive::F64 => SchemaObject::double(),
        }
    }

    /// Whether this object carries the `object` kind.
    pub fn is_object(&self) -> bool {
        self.kind == Some(SchemaKind::Object)
    }
}
