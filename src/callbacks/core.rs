use crate::descriptor::TypeDescriptor;
use crate::schema::SchemaObject;
use crate::tag::TypeCast;
use serde_json::Value;
use std::fmt;

/// Attribute visibility scope. Only [`Scope::None`] exists today; the variant
/// is kept so filter implementations can switch on it without an API break
/// when body/response scoping lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    None,
}

/// Immutable path descriptor handed to field filters.
///
/// `query_path` is the dot-joined logical path (`pet.id`); `model_path` is
/// the fully qualified structural path (`pets.pet.id`). Appending returns a
/// new value: the same prefix is shared across sibling fields during one
/// recursive descent, so mutation would corrupt the walk.
#[derive(Debug, Clone, Default)]
pub struct AttributeInfo {
    scope: Scope,
    query_path: Vec<String>,
    model_path: String,
}

impl AttributeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.query_path.is_empty()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Dot-joined logical path, e.g. `pet.id`.
    pub fn query_path(&self) -> String {
        self.query_path.join(".")
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// New descriptor with one more path segment appended.
    pub fn append(&self, segment: &str) -> Self {
        let mut query_path = self.query_path.clone();
        query_path.push(segment.to_string());
        AttributeInfo {
            scope: self.scope,
            query_path,
            model_path: self.model_path.clone(),
        }
    }

    /// New descriptor with the structural path replaced.
    pub fn with_model_path(&self, path: &str) -> Self {
        AttributeInfo {
            scope: self.scope,
            query_path: self.query_path.clone(),
            model_path: path.to_string(),
        }
    }
}

impl fmt::Display for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] <{}> <{}>",
            self.scope,
            self.query_path(),
            self.model_path
        )
    }
}

/// One enumeration entry reported by an enum resolver: a display label plus
/// the literal wire value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub title: Value,
    pub value: Value,
}

impl EnumEntry {
    pub fn new(title: impl Into<Value>, value: impl Into<Value>) -> Self {
        EnumEntry {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Injected customization boundary for document generation.
///
/// Defaults never veto and never resolve, so a plain `struct MyCallbacks;`
/// with a single override is a valid implementation.
pub trait Callbacks {
    /// Return `true` to drop the operation from the generated document.
    fn filter_route(&self, _method: &http::Method, _pattern: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    /// Return `true` to omit the field entirely. Consulted once per field per
    /// generation pass; a vetoed field is invisible to both `properties` and
    /// `required`.
    fn filter_field(&self, _field: &AttributeInfo) -> anyhow::Result<bool> {
        Ok(false)
    }

    /// Report a named type as an enumeration. The component is registered
    /// exactly once; all referencing sites share it.
    fn resolve_enum(&self, _ty: &TypeDescriptor) -> Option<Vec<EnumEntry>> {
        None
    }

    /// Resolve an `api:"as:<cast>"` hint to a replacement schema. A cast
    /// hint without a resolver is a declaration error.
    fn resolve_cast(&self, _cast: TypeCast, _field: &AttributeInfo) -> Option<SchemaObject> {
        None
    }
}

/// The no-customization callbacks object.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl Callbacks for NoCallbacks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_does_not_mutate_the_original() {
        let root = AttributeInfo::new().append("pet");
        let child = root.append("id");
        assert_eq!(root.query_path(), "pet");
        assert_eq!(child.query_path(), "pet.id");
    }

    #[test]
    fn no_callbacks_never_vetoes() {
        let cb = NoCallbacks;
        assert!(!cb.filter_field(&AttributeInfo::new()).expect("filter"));
        assert!(!cb
            .filter_route(&http::Method::GET, "/pets")
            .expect("filter"));
    }
}
