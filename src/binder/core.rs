use super::capabilities::Endpoint;
use super::convert::convert_value;
use crate::descriptor::{
    descriptor_of, to_snake_case, EndpointShape, FieldDescriptor, StructDescriptor,
};
use crate::tag::parse_field_tag;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Raw request inputs, as delivered by the surrounding transport.
///
/// Path captures come from the router, query parameters from the URL
/// (first value wins for duplicates), headers from the request head, and
/// the body as an undecoded byte stream.
#[derive(Debug, Default)]
pub struct RequestParts {
    path_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl RequestParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_param(mut self, name: &str, value: &str) -> Self {
        self.query_params.push((name.to_string(), value.to_string()));
        self
    }

    /// Parse query parameters out of a request target (`/pets?limit=10`).
    pub fn parse_query(mut self, target: &str) -> Self {
        if let Some(pos) = target.find('?') {
            for (k, v) in form_urlencoded::parse(target[pos + 1..].as_bytes()) {
                self.query_params.push((k.to_string(), v.to_string()));
            }
        }
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(bytes.into());
        self
    }

    fn query_first(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive header lookup per RFC 7230.
    fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Progress of a binding pass. `Rejected` and `BodyBound` are terminal;
/// a single pass either fully succeeds or the request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Allocated,
    PathBound,
    QueryBound,
    HeaderBound,
    Rejected,
    BodyBound,
}

impl fmt::Display for BindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindState::Allocated => "Allocated",
            BindState::PathBound => "PathBound",
            BindState::QueryBound => "QueryBound",
            BindState::HeaderBound => "HeaderBound",
            BindState::Rejected => "Rejected",
            BindState::BodyBound => "BodyBound",
        };
        write!(f, "{name}")
    }
}

/// Accumulated per-field binding errors, keyed by dotted field path
/// (`request.query.limit`). Serializes as the client-facing JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// A rejected binding pass: every bad envelope field (or the body) reported
/// together. Expected to be serialized and returned with a client-error
/// status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRejection {
    pub state: BindState,
    pub errors: FieldErrors,
}

impl fmt::Display for BindRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request binding rejected ({} field(s))", self.errors.len())
    }
}

impl std::error::Error for BindRejection {}

/// A successfully bound request instance.
#[derive(Debug)]
pub struct Bound<T> {
    instance: T,
    state: BindState,
}

impl<T> Bound<T> {
    pub fn get(&self) -> &T {
        &self.instance
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.instance
    }

    pub fn into_inner(self) -> T {
        self.instance
    }

    pub fn state(&self) -> BindState {
        self.state
    }
}

impl<T: Endpoint + Serialize> Bound<T> {
    /// Handle to the instance's response section: its current value as JSON,
    /// or `None` when the endpoint declares no response section.
    pub fn response_value(&self) -> anyhow::Result<Option<Value>> {
        let descriptor = descriptor_of::<T>();
        let sd = match descriptor.as_struct() {
            Some(sd) => sd,
            None => return Ok(None),
        };
        let section = match EndpointShape::of(sd).response {
            Some(field) => to_snake_case(&field.name),
            None => return Ok(None),
        };
        let mut serialized = serde_json::to_value(&self.instance)?;
        Ok(serialized
            .as_object_mut()
            .and_then(|obj| obj.remove(&section)))
    }
}

/// Bind an incoming request onto a fresh instance of `T`.
///
/// The template supplies caller-pre-populated fields (injected dependencies
/// next to the bindable sections); the returned instance is freshly
/// allocated and never shared across requests.
///
/// Path, query and header conversions all run before the pass can fail, so
/// a rejection reports every bad field at once. The body is only decoded,
/// through the endpoint's declared body-decoding capability, once the
/// envelope is clean.
pub fn bind_request<T>(template: &T, mut parts: RequestParts) -> Result<Bound<T>, BindRejection>
where
    T: Endpoint + Serialize + DeserializeOwned,
{
    let descriptor = descriptor_of::<T>();
    let mut errors = FieldErrors::default();

    let sd = match descriptor.as_struct() {
        Some(sd) => sd,
        None => {
            errors.insert("request", "endpoint descriptor is not a struct");
            return Err(reject(errors));
        }
    };
    let shape = EndpointShape::of(sd);

    // freshly allocated instance, seeded with the caller's template
    let mut instance = match serde_json::to_value(template) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(_) => {
            errors.insert("request", "endpoint must serialize as an object");
            return Err(reject(errors));
        }
        Err(err) => {
            errors.insert("request", err.to_string());
            return Err(reject(errors));
        }
    };

    debug!(
        endpoint = sd.name().unwrap_or("<anonymous>"),
        path_params = parts.path_params.len(),
        query_params = parts.query_params.len(),
        "binding request"
    );

    if let Some(section) = shape.path {
        bind_path_section(&mut instance, section, &parts, &mut errors);
    }
    if let Some(section) = shape.query {
        bind_query_section(&mut instance, section, &parts, &mut errors);
    }
    if let Some(section) = shape.header {
        bind_header_section(&mut instance, section, &parts, &mut errors);
    }

    // the body is not worth decoding if the envelope is already invalid
    if !errors.is_empty() {
        warn!(
            endpoint = sd.name().unwrap_or("<anonymous>"),
            field_errors = errors.len(),
            "request binding rejected"
        );
        return Err(reject(errors));
    }

    let mut bound: T = match serde_json::from_value(instance) {
        Ok(v) => v,
        Err(err) => {
            errors.insert("request", err.to_string());
            return Err(reject(errors));
        }
    };

    let mut state = BindState::HeaderBound;
    if shape.body.is_some() {
        let bytes = parts.body.take().unwrap_or_default();
        let mut reader: &[u8] = &bytes;
        if let Err(err) = bound.decode_body(&mut reader) {
            errors.insert("request.body", err.to_string());
            return Err(reject(errors));
        }
        state = BindState::BodyBound;
    }

    Ok(Bound {
        instance: bound,
        state,
    })
}

fn reject(errors: FieldErrors) -> BindRejection {
    BindRejection {
        state: BindState::Rejected,
        errors,
    }
}

fn bind_path_section(
    instance: &mut Value,
    section: &FieldDescriptor,
    parts: &RequestParts,
    errors: &mut FieldErrors,
) {
    let section_key = to_snake_case(&section.name);
    let sd = match section.ty.as_struct() {
        Some(sd) => sd,
        None => {
            errors.insert("request.path", "path section is not a struct");
            return;
        }
    };

    for (capture, raw) in &parts.path_params {
        let field = match find_wire_field(sd, capture) {
            Some(field) => field,
            // captures without a matching field are not this endpoint's
            None => continue,
        };
        let path = format!("request.path.{capture}");
        match convert_value(&field.ty, raw) {
            Ok(value) => set_section_value(instance, &section_key, capture, value),
            Err(err) => errors.insert(path, err.to_string()),
        }
    }
}

fn bind_query_section(
    instance: &mut Value,
    section: &FieldDescriptor,
    parts: &RequestParts,
    errors: &mut FieldErrors,
) {
    let section_key = to_snake_case(&section.name);
    let sd = match section.ty.as_struct() {
        Some(sd) => sd,
        None => {
            errors.insert("request.query", "query section is not a struct");
            return;
        }
    };

    for field in sd.fields() {
        let tag = match parse_field_tag(&field.tag) {
            Ok(tag) => tag,
            Err(err) => {
                errors.insert(
                    format!("request.query.{}", to_snake_case(&field.name)),
                    err.to_string(),
                );
                continue;
            }
        };
        if tag.is_ignored() {
            continue;
        }

        let wire_name = tag.effective_name(&field.name);
        let Some(raw) = parts.query_first(&wire_name) else {
            continue;
        };
        let path = format!("request.query.{wire_name}");
        match convert_value(&field.ty, raw) {
            Ok(value) => set_section_value(instance, &section_key, &wire_name, value),
            Err(err) => errors.insert(path, err.to_string()),
        }
    }
}

fn bind_header_section(
    instance: &mut Value,
    section: &FieldDescriptor,
    parts: &RequestParts,
    errors: &mut FieldErrors,
) {
    let section_key = to_snake_case(&section.name);
    let sd = match section.ty.as_struct() {
        Some(sd) => sd,
        None => {
            errors.insert("request.header", "header section is not a struct");
            return;
        }
    };

    for field in sd.fields() {
        let field_key = to_snake_case(&field.name);
        let tag = match parse_field_tag(&field.tag) {
            Ok(tag) => tag,
            Err(err) => {
                errors.insert(format!("request.header.{field_key}"), err.to_string());
                continue;
            }
        };
        if tag.is_ignored() {
            continue;
        }

        let header_name = tag.header_name.as_deref().unwrap_or(&field.name);
        let raw = match parts.header_value(header_name) {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };
        match convert_value(&field.ty, raw) {
            Ok(value) => set_section_value(instance, &section_key, &field_key, value),
            Err(err) => {
                errors.insert(format!("request.header.{field_key}"), err.to_string())
            }
        }
    }
}

fn find_wire_field<'a>(sd: &'a StructDescriptor, wire: &str) -> Option<&'a FieldDescriptor> {
    sd.fields().iter().find(|field| {
        parse_field_tag(&field.tag)
            .map(|tag| tag.effective_name(&field.name) == wire)
            .unwrap_or(false)
    })
}

fn set_section_value(instance: &mut Value, section: &str, key: &str, value: Value) {
    let Some(root) = instance.as_object_mut() else {
        return;
    };
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Some(map) = entry.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}
