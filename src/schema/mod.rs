//! # Schema Module
//!
//! Recursive conversion of a [`crate::descriptor::TypeDescriptor`] into
//! OpenAPI schema fragments, with component de-duplication and cycle-safe
//! registration.
//!
//! ## Overview
//!
//! [`SchemaGenerator::generate`] walks a descriptor and returns a
//! [`SchemaNode`]: either an inline schema object or a `$ref` to a named
//! component registered in the shared [`Document`] accumulator.
//!
//! Recursion terminates on self- and mutually-referential structures because
//! a placeholder is registered under the canonical name *before* the body is
//! computed; any reference encountered while the body is being built
//! resolves against the placeholder instead of descending again.
//!
//! ## Concurrency
//!
//! The generator takes `&mut Document`, making every build single-writer by
//! construction. Callers that publish documents should build into a private
//! accumulator and swap it in whole on success; the operation registry does
//! exactly that.

mod document;
mod generate;
mod node;

pub use document::Document;
pub use generate::{SchemaError, SchemaGenerator};
pub use node::{Reference, SchemaKind, SchemaNode, SchemaObject};
