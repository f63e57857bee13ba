use super::document::Document;
use super::node::{SchemaKind, SchemaNode, SchemaObject};
use crate::callbacks::{AttributeInfo, Callbacks, EnumEntry};
use crate::descriptor::{
    classify, to_snake_case, StructDescriptor, TypeClass, TypeDescriptor,
};
use crate::tag::{parse_field_tag, FieldTag, TagError, TypeCast};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Declaration-time schema generation failure.
///
/// These represent programming mistakes in type declarations, not runtime
/// conditions: they abort document generation for the offending operation.
#[derive(Debug)]
pub enum SchemaError {
    /// A field tag failed to parse.
    Tag { field: String, source: TagError },
    /// A filter callback reported an error.
    Callback {
        field: String,
        source: anyhow::Error,
    },
    /// A field carries an `as:<cast>` hint but the callbacks object does not
    /// resolve it.
    MissingCastResolver { cast: TypeCast, field: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Tag { field, source } => {
                write!(f, "invalid tag on field {field:?}: {source}")
            }
            SchemaError::Callback { field, source } => {
                write!(f, "filter callback failed for {field:?}: {source}")
            }
            SchemaError::MissingCastResolver { cast, field } => {
                write!(
                    f,
                    "field {field:?} is cast as {cast} but no cast resolver is installed"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Recursive schema generator.
///
/// Stateless apart from the injected callbacks; all accumulation happens in
/// the [`Document`] passed to each call.
pub struct SchemaGenerator<'cb> {
    callbacks: &'cb dyn Callbacks,
}

impl<'cb> SchemaGenerator<'cb> {
    pub fn new(callbacks: &'cb dyn Callbacks) -> Self {
        SchemaGenerator { callbacks }
    }

    /// Generate the schema node for a type, registering named struct
    /// components in `doc` as they are encountered.
    ///
    /// Returns `None` when the type was filtered away entirely; the caller
    /// must omit the corresponding property, not emit a null one.
    pub fn generate(
        &self,
        doc: &mut Document,
        ty: &TypeDescriptor,
    ) -> Result<Option<SchemaNode>, SchemaError> {
        self.generate_at(doc, ty, 0, AttributeInfo::new())
    }

    /// Like [`SchemaGenerator::generate`], but synthesizes the first
    /// `inline_level` levels of named structs inline instead of registering
    /// them as components.
    pub fn generate_inlined(
        &self,
        doc: &mut Document,
        ty: &TypeDescriptor,
        inline_level: i32,
    ) -> Result<Option<SchemaNode>, SchemaError> {
        self.generate_at(doc, ty, inline_level, AttributeInfo::new())
    }

    fn generate_at(
        &self,
        doc: &mut Document,
        ty: &TypeDescriptor,
        inline_level: i32,
        field_info: AttributeInfo,
    ) -> Result<Option<SchemaNode>, SchemaError> {
        if !field_info.is_empty() {
            let vetoed =
                self.callbacks
                    .filter_field(&field_info)
                    .map_err(|source| SchemaError::Callback {
                        field: field_info.query_path(),
                        source,
                    })?;
            if vetoed {
                return Ok(None);
            }
        }

        // pointer indirection is transparent; nullability is a tag concern
        let mut ty = ty;
        while let TypeDescriptor::Pointer(inner) = ty {
            ty = inner;
        }

        // a deferred back-reference resolves to the registered component when
        // one exists (placeholders included, which is what terminates
        // cycles); otherwise the real descriptor is materialized and walked
        if let TypeDescriptor::Deferred { name, resolve } = ty {
            let canonical = crate::descriptor::canonical_type_name(name);
            if doc.has_component(&canonical) {
                return Ok(Some(SchemaNode::reference(&canonical)));
            }
            let resolved = resolve();
            return self.generate_at(doc, &resolved, inline_level, field_info);
        }

        // named types get one shot at enum resolution before unwrapping
        if let TypeDescriptor::Named { name, inner } = ty {
            if let Some(entries) = self.callbacks.resolve_enum(ty) {
                let canonical = crate::descriptor::canonical_type_name(name);
                if !doc.has_component(&canonical) {
                    debug!(component = %canonical, "enum component registered");
                    doc.fill_component(
                        &canonical,
                        SchemaNode::inline(enum_object(inner, &entries)),
                    );
                }
                return Ok(Some(SchemaNode::reference(&canonical)));
            }
            return self.generate_at(doc, inner, inline_level, field_info);
        }

        let node = match classify(ty) {
            TypeClass::Primitive(p) => SchemaNode::inline(SchemaObject::primitive(p)),
            TypeClass::Binary => SchemaNode::inline(SchemaObject::binary_string()),
            TypeClass::Timestamp => SchemaNode::inline(SchemaObject::date_time()),
            TypeClass::Any => SchemaNode::inline(SchemaObject::default()),
            TypeClass::List(item) => {
                match self.generate_at(doc, item, 0, field_info)? {
                    Some(items) => SchemaNode::inline(SchemaObject::array(items)),
                    None => return Ok(None),
                }
            }
            TypeClass::Map(value) => {
                match self.generate_at(doc, value, 0, field_info)? {
                    Some(ap) => SchemaNode::inline(SchemaObject::map_of(ap)),
                    None => return Ok(None),
                }
            }
            TypeClass::Struct(sd) => {
                return self.generate_struct_node(doc, sd, inline_level, field_info)
            }
        };

        Ok(Some(node))
    }

    fn generate_struct_node(
        &self,
        doc: &mut Document,
        sd: &StructDescriptor,
        inline_level: i32,
        field_info: AttributeInfo,
    ) -> Result<Option<SchemaNode>, SchemaError> {
        // anonymous structures are synthesized inline so nested groupings
        // never pollute the shared component namespace; an explicit inline
        // level forces the same treatment for named types
        let canonical = match sd.canonical_name() {
            Some(name) if inline_level <= 0 => name,
            _ => {
                let body = self.generate_struct_body(doc, sd, inline_level, field_info)?;
                return Ok(body.map(SchemaNode::inline));
            }
        };

        if !doc.has_component(&canonical) {
            // forward declaration: a self- or mutually-referential body sees
            // the name as present and resolves to a reference
            doc.forward_declare(&canonical);
            match self.generate_struct_body(doc, sd, inline_level, field_info)? {
                Some(body) => {
                    debug!(component = %canonical, "component registered");
                    doc.fill_component(&canonical, SchemaNode::inline(body));
                }
                None => {
                    doc.remove_component(&canonical);
                    return Ok(None);
                }
            }
        }

        Ok(Some(SchemaNode::reference(&canonical)))
    }

    fn generate_struct_body(
        &self,
        doc: &mut Document,
        sd: &StructDescriptor,
        inline_level: i32,
        field_info: AttributeInfo,
    ) -> Result<Option<SchemaObject>, SchemaError> {
        let struct_name = sd.bare_name().map(to_snake_case);
        let pkg_name = sd.package_name().map(to_snake_case).unwrap_or_default();

        let field_info = match &struct_name {
            Some(name) => field_info.append(name),
            None => field_info,
        };

        if !field_info.is_empty() {
            let vetoed = self
                .callbacks
                .filter_field(&field_info)
                .map_err(|source| SchemaError::Callback {
                    field: field_info.query_path(),
                    source,
                })?;
            if vetoed {
                return Ok(None);
            }
        }

        let mut obj = SchemaObject::default();

        for field in sd.fields() {
            let tag = parse_field_tag(&field.tag).map_err(|source| SchemaError::Tag {
                field: field.name.clone(),
                source,
            })?;
            if tag.is_ignored() {
                continue;
            }

            let field_snake = to_snake_case(&field.name);
            let model_path = format!(
                "{pkg_name}.{}.{field_snake}",
                struct_name.as_deref().unwrap_or("")
            );
            let child_info = field_info
                .with_model_path(&model_path)
                .append(&field_snake);

            let node = match self.generate_at(doc, &field.ty, inline_level - 1, child_info.clone())?
            {
                Some(node) => node,
                // filtered out: invisible to properties and required alike
                None => continue,
            };

            // embedding must be transparent in the output: splice the
            // registered component's properties instead of nesting a level
            if field.embedded {
                if let Some(reference) = node.as_reference() {
                    let spliced = doc
                        .component(reference.component_name())
                        .and_then(SchemaNode::as_object)
                        .map(|comp| comp.properties.clone());
                    if let Some(props) = spliced {
                        obj.properties.extend(props);
                        continue;
                    }
                }
            }

            let node = match tag.type_cast {
                Some(cast) => self.resolve_cast_node(doc, cast, &field.ty, &child_info)?,
                None => node,
            };

            let wire_name = tag.effective_name(&field.name);
            if tag.is_required() {
                obj.required.push(wire_name.clone());
            }
            obj.properties
                .insert(wire_name, apply_field_metadata(node, &tag));
        }

        // object type requires properties; an empty struct stays untyped
        if !obj.properties.is_empty() {
            obj.kind = Some(SchemaKind::Object);
        }

        Ok(Some(obj))
    }

    fn resolve_cast_node(
        &self,
        doc: &mut Document,
        cast: TypeCast,
        ty: &TypeDescriptor,
        field_info: &AttributeInfo,
    ) -> Result<SchemaNode, SchemaError> {
        let resolved = self
            .callbacks
            .resolve_cast(cast, field_info)
            .ok_or_else(|| SchemaError::MissingCastResolver {
                cast,
                field: field_info.query_path(),
            })?;

        // named targets register the cast result once and share a reference;
        // everything else stays inline
        match ty.named_canonical() {
            Some(base) => {
                let canonical = format!("{base}..as_{}", cast.as_str());
                if !doc.has_component(&canonical) {
                    debug!(component = %canonical, cast = %cast, "cast component registered");
                    doc.fill_component(&canonical, SchemaNode::inline(resolved));
                }
                Ok(SchemaNode::reference(&canonical))
            }
            None => Ok(SchemaNode::inline(resolved)),
        }
    }
}

/// Attach tag metadata to a generated node.
///
/// References cannot carry sibling metadata in the output format, so a
/// reference that needs any is wrapped in an `allOf` composition rather than
/// mutating (or discarding) the shared component.
fn apply_field_metadata(node: SchemaNode, tag: &FieldTag) -> SchemaNode {
    match node {
        SchemaNode::Inline(mut obj) => {
            if tag.read_only == Some(true) {
                obj.read_only = Some(true);
            }
            if tag.write_only == Some(true) {
                obj.write_only = Some(true);
            }
            if tag.nullable == Some(true) {
                obj.nullable = Some(true);
            }
            if tag.deprecated == Some(true) {
                obj.deprecated = Some(true);
            }
            if let Some(description) = &tag.description {
                obj.description = Some(description.clone());
            }
            if let Some(example) = &tag.example {
                obj.example = Some(Value::String(example.clone()));
            }
            SchemaNode::Inline(obj)
        }
        SchemaNode::Reference(reference) => {
            let has_metadata = tag.nullable == Some(true)
                || tag.deprecated == Some(true)
                || tag.description.is_some()
                || tag.example.is_some();
            if !has_metadata {
                return SchemaNode::Reference(reference);
            }

            let mut wrapper = SchemaObject {
                all_of: Some(vec![SchemaNode::Reference(reference)]),
                ..Default::default()
            };
            if tag.nullable == Some(true) {
                wrapper.nullable = Some(true);
            }
            if tag.deprecated == Some(true) {
                wrapper.deprecated = Some(true);
            }
            wrapper.description = tag.description.clone();
            wrapper.example = tag.example.clone().map(Value::String);
            SchemaNode::inline(wrapper)
        }
    }
}

/// Build the enumeration object for a named type: the representation's
/// scalar kind plus one entry per reported value.
fn enum_object(repr: &TypeDescriptor, entries: &[EnumEntry]) -> SchemaObject {
    let mut obj = match classify(repr) {
        TypeClass::Primitive(p) => SchemaObject::primitive(p),
        _ => SchemaObject::string(),
    };
    obj.enum_values = Some(entries.iter().map(|e| e.value.clone()).collect());
    obj.enum_titles = Some(entries.iter().map(|e| e.title.clone()).collect());
    obj
}
