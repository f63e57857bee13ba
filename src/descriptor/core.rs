use super::name::{canonical_type_name, to_snake_case};
use std::sync::Arc;

/// Primitive scalar kinds recognized by the classifier.
///
/// Widths matter: 8/16/32-bit signed integers map to the `int32` schema
/// representation, everything wider (and every unsigned width) is promoted to
/// `int64`. Both float widths share the double-precision `number` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Str,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// Structural description of a type.
///
/// The variant set is closed on purpose: anything the engine cannot express
/// here cannot be registered, which turns "unknown type" into a construction
/// error instead of a failure buried deep in a generation pass.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A primitive scalar.
    Primitive(Primitive),
    /// An ordered collection. `List(Primitive(U8))` classifies as binary.
    List(Arc<TypeDescriptor>),
    /// A string-keyed map; only the value shape is described.
    Map(Arc<TypeDescriptor>),
    /// A struct with named fields, possibly anonymous.
    Struct(StructDescriptor),
    /// Pointer indirection (`Option<T>`, `Box<T>`). Transparent for shape.
    Pointer(Arc<TypeDescriptor>),
    /// A declared named type wrapping another shape (`type Status = i32`
    /// equivalents). Gives enum resolvers an identity to latch onto.
    Named {
        name: String,
        inner: Arc<TypeDescriptor>,
    },
    /// A wall-clock timestamp. Terminal: fields are never inspected.
    Timestamp,
    /// An opaque JSON value.
    Any,
    /// A by-name back-reference used to break descriptor cycles. The
    /// resolver is only invoked when the named component is not already
    /// registered, which is what lets self- and mutually-referential
    /// structures terminate.
    Deferred {
        name: String,
        resolve: fn() -> Arc<TypeDescriptor>,
    },
}

/// One field of a [`StructDescriptor`].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared field name (`id`, `created_at`).
    pub name: String,
    /// Raw tag text, parsed lazily by the tag parser on every pass.
    pub tag: String,
    /// Embedded fields splice their component's properties into the parent.
    pub embedded: bool,
    /// Field type.
    pub ty: Arc<TypeDescriptor>,
}

/// Struct shape: an optional qualified name plus ordered fields.
///
/// A `None` name marks an anonymous struct, which is always synthesized
/// inline and never registered as a document component.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    name: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
    /// Qualified declared name, e.g. `pets.Pet`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name with the package prefix stripped, e.g. `Pet`.
    pub fn bare_name(&self) -> Option<&str> {
        self.name().map(|n| n.rsplit('.').next().unwrap_or(n))
    }

    /// Package prefix of the qualified name, e.g. `pets`.
    pub fn package_name(&self) -> Option<&str> {
        self.name()
            .and_then(|n| n.rsplit_once('.').map(|(pkg, _)| pkg))
    }

    /// `$ref`-safe canonical name; `None` for anonymous structs.
    pub fn canonical_name(&self) -> Option<String> {
        self.name().map(canonical_type_name)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by its declared (snake-cased) name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| to_snake_case(&f.name) == name)
    }
}

/// Builder for struct descriptors.
#[derive(Debug, Default)]
pub struct StructBuilder {
    name: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl StructBuilder {
    pub fn field(mut self, name: &str, ty: Arc<TypeDescriptor>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            tag: String::new(),
            embedded: false,
            ty,
        });
        self
    }

    pub fn tagged_field(mut self, name: &str, tag: &str, ty: Arc<TypeDescriptor>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            tag: tag.to_string(),
            embedded: false,
            ty,
        });
        self
    }

    pub fn embedded_field(mut self, name: &str, ty: Arc<TypeDescriptor>) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            tag: String::new(),
            embedded: true,
            ty,
        });
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Struct(StructDescriptor {
            name: self.name,
            fields: self.fields,
        }))
    }
}

impl TypeDescriptor {
    /// Start a named struct descriptor. The name should be qualified
    /// (`pets.Pet`); generic instantiations use bracketed argument notation
    /// (`pets.Page<pets.Pet>`) and are canonicalized on registration.
    pub fn structure(name: &str) -> StructBuilder {
        StructBuilder {
            name: Some(name.to_string()),
            fields: Vec::new(),
        }
    }

    /// Start an anonymous struct descriptor; always inlined, never a component.
    pub fn anonymous() -> StructBuilder {
        StructBuilder::default()
    }

    pub fn string() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::Str))
    }

    pub fn boolean() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::Bool))
    }

    pub fn int32() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::I32))
    }

    pub fn int64() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::I64))
    }

    pub fn uint64() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::U64))
    }

    pub fn float64() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Primitive(Primitive::F64))
    }

    /// Byte collection; classifies as a binary-formatted string.
    pub fn bytes() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::List(Arc::new(TypeDescriptor::Primitive(
            Primitive::U8,
        ))))
    }

    pub fn list(item: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::List(item))
    }

    pub fn map(value: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Map(value))
    }

    pub fn pointer(inner: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Pointer(inner))
    }

    pub fn named(name: &str, inner: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Named {
            name: name.to_string(),
            inner,
        })
    }

    pub fn timestamp() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Timestamp)
    }

    pub fn any() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Any)
    }

    /// Deferred by-name reference for cyclic structures. Use for the
    /// back-edge of a recursive or mutually-recursive data type; sections
    /// and top-level types should use their direct descriptors.
    pub fn deferred(name: &str, resolve: fn() -> Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::Deferred {
            name: name.to_string(),
            resolve,
        })
    }

    /// Struct shape of this descriptor, looking through pointer and named
    /// indirection.
    pub fn as_struct(&self) -> Option<&StructDescriptor> {
        match unwrap_indirection(self) {
            TypeDescriptor::Struct(sd) => Some(sd),
            _ => None,
        }
    }

    /// Canonical name of this descriptor if it refers to a named type,
    /// looking through pointer indirection.
    pub fn named_canonical(&self) -> Option<String> {
        let mut t = self;
        while let TypeDescriptor::Pointer(inner) = t {
            t = inner;
        }
        match t {
            TypeDescriptor::Named { name, .. } => Some(canonical_type_name(name)),
            TypeDescriptor::Struct(sd) => sd.canonical_name(),
            TypeDescriptor::Deferred { name, .. } => Some(canonical_type_name(name)),
            _ => None,
        }
    }
}

/// Classification of an unwrapped descriptor, shared by the schema generator
/// and the value converter.
#[derive(Debug)]
pub enum TypeClass<'a> {
    Primitive(Primitive),
    Binary,
    List(&'a TypeDescriptor),
    Map(&'a TypeDescriptor),
    Struct(&'a StructDescriptor),
    Timestamp,
    Any,
}

fn unwrap_indirection(ty: &TypeDescriptor) -> &TypeDescriptor {
    let mut t = ty;
    loop {
        match t {
            TypeDescriptor::Pointer(inner) => t = inner,
            TypeDescriptor::Named { inner, .. } => t = inner,
            _ => return t,
        }
    }
}

/// Map a descriptor to its schema class. Pointer and named indirection are
/// looked through; a list of unsigned bytes classifies as [`TypeClass::Binary`]
/// rather than a generic element collection.
pub fn classify(ty: &TypeDescriptor) -> TypeClass<'_> {
    match unwrap_indirection(ty) {
        TypeDescriptor::Primitive(p) => TypeClass::Primitive(*p),
        TypeDescriptor::List(item) => match unwrap_indirection(item) {
            TypeDescriptor::Primitive(Primitive::U8) => TypeClass::Binary,
            _ => TypeClass::List(item),
        },
        TypeDescriptor::Map(value) => TypeClass::Map(value),
        TypeDescriptor::Struct(sd) => TypeClass::Struct(sd),
        TypeDescriptor::Timestamp => TypeClass::Timestamp,
        // deferred references are resolved by the generator and converter
        // before classification; a stray one classifies as opaque
        TypeDescriptor::Any | TypeDescriptor::Deferred { .. } => TypeClass::Any,
        // unwrap_indirection never returns these
        TypeDescriptor::Pointer(_) | TypeDescriptor::Named { .. } => unreachable!(),
    }
}

/// The well-known sections of an endpoint struct.
///
/// Section fields are matched by their snake-cased declared name. The shape is
/// computed at registration time and again by the binder; it never caches
/// across types.
#[derive(Debug, Default)]
pub struct EndpointShape<'a> {
    pub path: Option<&'a FieldDescriptor>,
    pub query: Option<&'a FieldDescriptor>,
    pub header: Option<&'a FieldDescriptor>,
    pub body: Option<&'a FieldDescriptor>,
    pub response: Option<&'a FieldDescriptor>,
}

impl<'a> EndpointShape<'a> {
    pub fn of(sd: &'a StructDescriptor) -> Self {
        let mut shape = EndpointShape::default();
        for field in sd.fields() {
            match to_snake_case(&field.name).as_str() {
                "path" => shape.path = Some(field),
                "query" => shape.query = Some(field),
                "header" => shape.header = Some(field),
                "body" => shape.body = Some(field),
                "response" => shape.response = Some(field),
                _ => {}
            }
        }
        shape
    }
}
