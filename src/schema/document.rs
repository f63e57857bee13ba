use super::node::{SchemaNode, SchemaObject};
use serde::Serialize;
use std::collections::BTreeMap;

/// Shared component accumulator for one document build.
///
/// Invariant: a canonical name is registered at most once, and a placeholder
/// is inserted *before* its body is computed. The placeholder is what lets a
/// type reference itself (directly or through another type) and terminate:
/// the inner recursion sees the name as already present and emits a `$ref`.
///
/// The document is single-writer: generation takes `&mut Document`, and
/// concurrent builds must use separate private documents.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Document {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, SchemaNode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_component(&self, canonical: &str) -> bool {
        self.schemas.contains_key(canonical)
    }

    pub fn component(&self, canonical: &str) -> Option<&SchemaNode> {
        self.schemas.get(canonical)
    }

    /// Insert the forward-declaration placeholder for a name whose body is
    /// about to be computed.
    pub fn forward_declare(&mut self, canonical: &str) {
        self.schemas.insert(
            canonical.to_string(),
            SchemaNode::inline(SchemaObject::default()),
        );
    }

    /// Fill a previously forward-declared placeholder in place.
    pub fn fill_component(&mut self, canonical: &str, node: SchemaNode) {
        self.schemas.insert(canonical.to_string(), node);
    }

    /// Remove a component (used when a forward-declared body turns out to be
    /// fully filtered away).
    pub fn remove_component(&mut self, canonical: &str) {
        self.schemas.remove(canonical);
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
