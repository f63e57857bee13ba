//! # Operation Module
//!
//! Registration of typed operations and assembly of the full OpenAPI
//! document. This is the layer that turns one endpoint type per route into
//! the published `paths` + `components` tree, invoking the schema generator
//! once per registered operation.
//!
//! ## Registration
//!
//! [`Api::route`] validates an endpoint *up front*: path captures in the
//! pattern must have matching fields in the `path` section, section fields
//! must be struct-shaped, the tags on section fields must parse, and the
//! capabilities required by the declared sections (`body` needs a body
//! decoder, `response` a response encoder) must be provided. These are
//! programming mistakes: they fail registration rather than surfacing per
//! request, and a broken operation is never advertised.
//!
//! ## Document builds
//!
//! [`Api::generate_document`] builds into a private component arena and only
//! returns the finished document, so a failed build never publishes a
//! half-filled component map. Concurrent builds each use their own arena.

mod core;
mod document;

pub use core::{Api, DeclarationError, OperationDocs, OperationSpec};
pub use document::{
    ApiDocument, Components, Info, MediaTypeObject, OperationObject, ParameterLocation,
    ParameterObject, PathItem, RequestBodyObject, ResponseObject, Server,
};
