use super::document::{
    ApiDocument, Components, Info, MediaTypeObject, OperationObject, ParameterLocation,
    ParameterObject, PathItem, RequestBodyObject, ResponseObject, Server,
};
use crate::binder::{Capability, CapabilitySet, Endpoint};
use crate::callbacks::Callbacks;
use crate::descriptor::{
    classify, descriptor_of, EndpointShape, FieldDescriptor, StructDescriptor, TypeClass,
    TypeDescriptor,
};
use crate::schema::{Document, SchemaGenerator, SchemaNode};
use crate::tag::{parse_field_tag, FieldTag, TagError};
use anyhow::Context;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

static PATH_CAPTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^/{}]+)\}").expect("path capture regex"));

/// Registration-time failure. Declaration errors represent programming
/// mistakes and stop the operation from being advertised at all.
#[derive(Debug)]
pub enum DeclarationError {
    /// Endpoint types must be named structs; the name becomes the
    /// operation id.
    AnonymousEndpoint { pattern: String },
    EndpointNotAStruct { pattern: String },
    /// A declared section (`path`, `query`, `header`) is not struct-shaped.
    SectionNotAStruct { operation: String, section: String },
    /// The pattern declares captures but the endpoint has no path section.
    MissingPathSection { operation: String },
    /// A pattern capture has no matching field in the path section.
    MissingPathField { operation: String, capture: String },
    /// A declared section requires a capability the endpoint does not
    /// provide.
    MissingCapability {
        operation: String,
        capability: Capability,
    },
    DuplicateOperation { method: Method, pattern: String },
    /// A section field tag failed to parse.
    Tag {
        operation: String,
        field: String,
        source: TagError,
    },
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationError::AnonymousEndpoint { pattern } => {
                write!(f, "endpoint for {pattern:?} must be a named struct")
            }
            DeclarationError::EndpointNotAStruct { pattern } => {
                write!(f, "endpoint for {pattern:?} must be struct-shaped")
            }
            DeclarationError::SectionNotAStruct { operation, section } => {
                write!(f, "{operation}: {section} section must be a struct")
            }
            DeclarationError::MissingPathSection { operation } => {
                write!(f, "{operation}: pattern has captures but no path section")
            }
            DeclarationError::MissingPathField { operation, capture } => {
                write!(
                    f,
                    "{operation}: capture {capture:?} has no matching path field"
                )
            }
            DeclarationError::MissingCapability {
                operation,
                capability,
            } => {
                write!(f, "{operation} must implement {capability}")
            }
            DeclarationError::DuplicateOperation { method, pattern } => {
                write!(f, "operation already registered: {method} {pattern}")
            }
            DeclarationError::Tag {
                operation,
                field,
                source,
            } => {
                write!(f, "{operation}: invalid tag on field {field:?}: {source}")
            }
        }
    }
}

impl std::error::Error for DeclarationError {}

/// Operation-level documentation, normally produced by the comment-driven
/// annotation generator.
#[derive(Debug, Clone, Default)]
pub struct OperationDocs {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
}

/// One registered operation.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub method: Method,
    pub pattern: String,
    pub operation_id: String,
    pub descriptor: Arc<TypeDescriptor>,
    pub capabilities: CapabilitySet,
    pub docs: OperationDocs,
}

/// Registry of typed operations and entry point for document generation.
pub struct Api {
    info: Info,
    servers: Vec<Server>,
    operations: Vec<OperationSpec>,
}

impl Api {
    pub fn new(info: Info) -> Self {
        Api {
            info,
            servers: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn add_server(&mut self, url: &str, description: Option<&str>) {
        self.servers.push(Server {
            url: url.to_string(),
            description: description.map(str::to_string),
        });
    }

    pub fn get<T: Endpoint>(&mut self, pattern: &str) -> Result<(), DeclarationError> {
        self.route::<T>(Method::GET, pattern)
    }

    pub fn post<T: Endpoint>(&mut self, pattern: &str) -> Result<(), DeclarationError> {
        self.route::<T>(Method::POST, pattern)
    }

    pub fn put<T: Endpoint>(&mut self, pattern: &str) -> Result<(), DeclarationError> {
        self.route::<T>(Method::PUT, pattern)
    }

    pub fn patch<T: Endpoint>(&mut self, pattern: &str) -> Result<(), DeclarationError> {
        self.route::<T>(Method::PATCH, pattern)
    }

    pub fn delete<T: Endpoint>(&mut self, pattern: &str) -> Result<(), DeclarationError> {
        self.route::<T>(Method::DELETE, pattern)
    }

    pub fn route<T: Endpoint>(
        &mut self,
        method: Method,
        pattern: &str,
    ) -> Result<(), DeclarationError> {
        self.route_with::<T>(method, pattern, OperationDocs::default())
    }

    /// Register an operation, validating the endpoint declaration.
    pub fn route_with<T: Endpoint>(
        &mut self,
        method: Method,
        pattern: &str,
        docs: OperationDocs,
    ) -> Result<(), DeclarationError> {
        let descriptor = descriptor_of::<T>();
        let sd = descriptor
            .as_struct()
            .ok_or_else(|| DeclarationError::EndpointNotAStruct {
                pattern: pattern.to_string(),
            })?;
        let operation_id = sd
            .bare_name()
            .map(str::to_string)
            .ok_or_else(|| DeclarationError::AnonymousEndpoint {
                pattern: pattern.to_string(),
            })?;

        if self
            .operations
            .iter()
            .any(|op| op.method == method && op.pattern == pattern)
        {
            return Err(DeclarationError::DuplicateOperation {
                method,
                pattern: pattern.to_string(),
            });
        }

        let shape = EndpointShape::of(sd);
        validate_sections(&operation_id, sd, &shape)?;
        validate_captures(&operation_id, pattern, &shape)?;

        let required = required_capabilities(&shape);
        if let Some(capability) = T::capabilities().missing(&required).into_iter().next() {
            return Err(DeclarationError::MissingCapability {
                operation: operation_id,
                capability,
            });
        }

        info!(
            operation = %operation_id,
            method = %method,
            pattern = %pattern,
            "operation registered"
        );

        self.operations.push(OperationSpec {
            method,
            pattern: pattern.to_string(),
            operation_id,
            descriptor,
            capabilities: T::capabilities(),
            docs,
        });

        Ok(())
    }

    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Generate the full document.
    ///
    /// Components accumulate in a private arena; the document is returned
    /// whole or not at all, so a failed build never publishes a partially
    /// filled component map.
    pub fn generate_document(&self, callbacks: &dyn Callbacks) -> anyhow::Result<ApiDocument> {
        let generator = SchemaGenerator::new(callbacks);
        let mut doc = Document::new();
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

        for op in &self.operations {
            if callbacks.filter_route(&op.method, &op.pattern)? {
                debug!(method = %op.method, pattern = %op.pattern, "operation filtered out");
                continue;
            }

            let object = generate_operation(&generator, &mut doc, op)
                .with_context(|| format!("operation {}", op.operation_id))?;

            paths
                .entry(op.pattern.clone())
                .or_default()
                .insert(op.method.as_str().to_ascii_lowercase(), object);
        }

        Ok(ApiDocument {
            openapi: "3.1.0".to_string(),
            info: self.info.clone(),
            servers: self.servers.clone(),
            paths,
            components: Components {
                schemas: doc.schemas,
            },
        })
    }

    /// Generate and serialize the document as pretty-printed JSON.
    pub fn to_json(&self, callbacks: &dyn Callbacks) -> anyhow::Result<String> {
        self.generate_document(callbacks)?.to_json()
    }
}

fn generate_operation(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    op: &OperationSpec,
) -> anyhow::Result<OperationObject> {
    let sd = op
        .descriptor
        .as_struct()
        .context("endpoint descriptor is not a struct")?;
    let shape = EndpointShape::of(sd);

    let mut object = OperationObject {
        operation_id: op.operation_id.clone(),
        summary: op.docs.summary.clone(),
        description: op.docs.description.clone(),
        tags: op.docs.tags.clone(),
        deprecated: op.docs.deprecated.then_some(true),
        parameters: Vec::new(),
        request_body: None,
        responses: BTreeMap::new(),
    };

    if let Some(section) = shape.path {
        let section_sd = section
            .ty
            .as_struct()
            .context("path section is not a struct")?;
        for capture in path_captures(&op.pattern) {
            object
                .parameters
                .push(path_parameter(generator, doc, section_sd, &capture)?);
        }
    }

    if let Some(section) = shape.query {
        let section_sd = section
            .ty
            .as_struct()
            .context("query section is not a struct")?;
        for field in section_sd.fields() {
            if let Some(param) = query_parameter(generator, doc, field)? {
                object.parameters.push(param);
            }
        }
    }

    if let Some(section) = shape.header {
        let section_sd = section
            .ty
            .as_struct()
            .context("header section is not a struct")?;
        for field in section_sd.fields() {
            if let Some(param) = header_parameter(generator, doc, field)? {
                object.parameters.push(param);
            }
        }
    }

    if let Some(section) = shape.body {
        object.request_body = Some(request_body(generator, doc, section)?);
    }

    match shape.response {
        Some(section) => {
            object
                .responses
                .insert("200".to_string(), response_entry(generator, doc, section)?);
        }
        None => {
            // no response section: document an empty success
            object.responses.insert(
                "204".to_string(),
                ResponseObject {
                    description: "no data".to_string(),
                    content: None,
                },
            );
        }
    }

    Ok(object)
}

fn required_capabilities(shape: &EndpointShape<'_>) -> CapabilitySet {
    let mut required = CapabilitySet::handler();
    if shape.body.is_some() {
        required = required.with_body_decoder();
    }
    if shape.response.is_some() {
        required = required.with_response_encoder();
    }
    required
}

fn validate_sections(
    operation: &str,
    sd: &StructDescriptor,
    shape: &EndpointShape<'_>,
) -> Result<(), DeclarationError> {
    for field in sd.fields() {
        validate_tag(operation, field)?;
    }

    for (section, name) in [
        (shape.path, "path"),
        (shape.query, "query"),
        (shape.header, "header"),
    ] {
        let Some(section) = section else { continue };
        let section_sd =
            section
                .ty
                .as_struct()
                .ok_or_else(|| DeclarationError::SectionNotAStruct {
                    operation: operation.to_string(),
                    section: name.to_string(),
                })?;
        for field in section_sd.fields() {
            validate_tag(operation, field)?;
        }
    }

    Ok(())
}

fn validate_tag(operation: &str, field: &FieldDescriptor) -> Result<(), DeclarationError> {
    parse_field_tag(&field.tag)
        .map(|_| ())
        .map_err(|source| DeclarationError::Tag {
            operation: operation.to_string(),
            field: field.name.clone(),
            source,
        })
}

fn validate_captures(
    operation: &str,
    pattern: &str,
    shape: &EndpointShape<'_>,
) -> Result<(), DeclarationError> {
    let captures = path_captures(pattern);
    if captures.is_empty() {
        return Ok(());
    }

    let section = shape
        .path
        .ok_or_else(|| DeclarationError::MissingPathSection {
            operation: operation.to_string(),
        })?;
    let section_sd = section
        .ty
        .as_struct()
        .ok_or_else(|| DeclarationError::SectionNotAStruct {
            operation: operation.to_string(),
            section: "path".to_string(),
        })?;

    for capture in captures {
        if find_wire_field(section_sd, &capture).is_none() {
            return Err(DeclarationError::MissingPathField {
                operation: operation.to_string(),
                capture,
            });
        }
    }

    Ok(())
}

/// Named captures in a path pattern, in order. The `*` wildcard is not a
/// bindable parameter.
fn path_captures(pattern: &str) -> Vec<String> {
    PATH_CAPTURE_RE
        .captures_iter(pattern)
        .map(|c| c[1].to_string())
        .filter(|name| name != "*")
        .collect()
}

fn find_wire_field<'a>(sd: &'a StructDescriptor, wire: &str) -> Option<&'a FieldDescriptor> {
    sd.fields().iter().find(|field| {
        parse_field_tag(&field.tag)
            .map(|tag| tag.effective_name(&field.name) == wire)
            .unwrap_or(false)
    })
}

fn path_parameter(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    section_sd: &StructDescriptor,
    capture: &str,
) -> anyhow::Result<ParameterObject> {
    let field = find_wire_field(section_sd, capture)
        .with_context(|| format!("no path field for capture {capture:?}"))?;
    let tag = parse_field_tag(&field.tag)?;

    let mut param = ParameterObject::new(capture, ParameterLocation::Path);
    param.required = Some(true);
    param.schema = generator.generate(doc, &field.ty)?;
    fill_parameter_from_tag(&mut param, &tag, &field.ty)?;
    Ok(param)
}

fn query_parameter(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    field: &FieldDescriptor,
) -> anyhow::Result<Option<ParameterObject>> {
    let tag = parse_field_tag(&field.tag)?;
    if tag.is_ignored() || field.embedded {
        return Ok(None);
    }

    let Some(schema) = generator.generate(doc, &field.ty)? else {
        return Ok(None);
    };

    let mut param = ParameterObject::new(&tag.effective_name(&field.name), ParameterLocation::Query);

    // structured values arrive as JSON literals, so the schema is nested
    // under a media type instead of inlined
    let wrap = match &schema {
        SchemaNode::Reference(_) => true,
        SchemaNode::Inline(obj) => obj.is_object(),
    };
    if wrap {
        let mut content = BTreeMap::new();
        content.insert(
            "application/json".to_string(),
            MediaTypeObject {
                schema: Some(schema),
            },
        );
        param.content = Some(content);
    } else {
        param.schema = Some(schema);
    }

    fill_parameter_from_tag(&mut param, &tag, &field.ty)?;
    Ok(Some(param))
}

fn header_parameter(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    field: &FieldDescriptor,
) -> anyhow::Result<Option<ParameterObject>> {
    let tag = parse_field_tag(&field.tag)?;
    if tag.is_ignored() {
        return Ok(None);
    }

    let header_name = tag.header_name.clone().unwrap_or_else(|| field.name.clone());
    let mut param = ParameterObject::new(&header_name, ParameterLocation::Header);
    param.schema = generator.generate(doc, &field.ty)?;
    fill_parameter_from_tag(&mut param, &tag, &field.ty)?;
    Ok(Some(param))
}

fn request_body(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    section: &FieldDescriptor,
) -> anyhow::Result<RequestBodyObject> {
    let tag = parse_field_tag(&section.tag)?;
    let schema = generator.generate(doc, &section.ty)?;
    let content_type = tag
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    let mut content = BTreeMap::new();
    content.insert(content_type, MediaTypeObject { schema });

    Ok(RequestBodyObject {
        description: tag.description,
        required: tag.required,
        content,
    })
}

fn response_entry(
    generator: &SchemaGenerator<'_>,
    doc: &mut Document,
    section: &FieldDescriptor,
) -> anyhow::Result<ResponseObject> {
    let tag = parse_field_tag(&section.tag)?;
    let mut content_type = tag
        .content_type
        .clone()
        .unwrap_or_else(|| "application/json".to_string());

    // only structured payloads document a response schema; binary payloads
    // switch to the octet-stream media type
    let schema = match classify(&section.ty) {
        TypeClass::Binary => {
            content_type = "application/octet-stream".to_string();
            generator.generate(doc, &section.ty)?
        }
        TypeClass::Struct(_) | TypeClass::List(_) => generator.generate(doc, &section.ty)?,
        _ => None,
    };

    let content = schema.map(|node| {
        let mut map = BTreeMap::new();
        map.insert(content_type, MediaTypeObject { schema: Some(node) });
        map
    });

    Ok(ResponseObject {
        description: tag.description.unwrap_or_default(),
        content,
    })
}

fn fill_parameter_from_tag(
    param: &mut ParameterObject,
    tag: &FieldTag,
    ty: &TypeDescriptor,
) -> anyhow::Result<()> {
    if let Some(description) = &tag.description {
        param.description = Some(description.clone());
    }
    if let Some(style) = &tag.style {
        param.style = Some(style.clone());
    }
    if tag.explode.is_some() {
        param.explode = tag.explode;
    }
    if tag.deprecated == Some(true) {
        param.deprecated = Some(true);
    }
    if let Some(required) = tag.required {
        param.required = Some(required);
    }
    if let Some(example) = &tag.example {
        param.example = Some(prepare_example(ty, example)?);
    }
    Ok(())
}

/// Examples for structured parameter types are JSON literals; scalar
/// examples stay verbatim strings.
fn prepare_example(ty: &TypeDescriptor, raw: &str) -> anyhow::Result<Value> {
    match classify(ty) {
        TypeClass::List(_) | TypeClass::Map(_) | TypeClass::Struct(_) => {
            serde_json::from_str(raw).with_context(|| format!("invalid example {raw:?}"))
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}
