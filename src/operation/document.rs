use crate::schema::SchemaNode;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// API metadata carried at the top of the generated document.
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    pub fn new(title: &str, version: &str) -> Self {
        Info {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A server entry advertised by the document.
#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameter location within the request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
        }
    }
}

/// One operation parameter.
///
/// Scalar parameters carry their schema inline; object-shaped and referenced
/// schemas are nested under a JSON media type in `content` instead, since a
/// structured value on the wire arrives as a JSON literal.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaTypeObject>>,
}

impl ParameterObject {
    pub fn new(name: &str, location: ParameterLocation) -> Self {
        ParameterObject {
            name: name.to_string(),
            location,
            description: None,
            required: None,
            deprecated: None,
            style: None,
            explode: None,
            example: None,
            schema: None,
            content: None,
        }
    }
}

/// Schema wrapper keyed by media type.
#[derive(Debug, Clone, Serialize)]
pub struct MediaTypeObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

/// Operation request body.
#[derive(Debug, Clone, Serialize)]
pub struct RequestBodyObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub content: BTreeMap<String, MediaTypeObject>,
}

/// One response entry.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseObject {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaTypeObject>>,
}

/// One operation under a path item.
#[derive(Debug, Clone, Serialize)]
pub struct OperationObject {
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyObject>,
    pub responses: BTreeMap<String, ResponseObject>,
}

/// Methods registered under one path pattern, keyed by lowercase verb.
pub type PathItem = BTreeMap<String, OperationObject>;

/// Reusable components referenced from the paths tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Components {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, SchemaNode>,
}

/// The complete generated document.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "components_empty")]
    pub components: Components,
}

fn components_empty(c: &Components) -> bool {
    c.schemas.is_empty()
}

impl ApiDocument {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
