//! # schemabind
//!
//! **schemabind** derives machine-readable OpenAPI schema documents and
//! runtime request bindings directly from typed data-structure declarations
//! annotated with tags, instead of requiring a separately maintained
//! specification.
//!
//! ## Overview
//!
//! The crate is built around one closed type model, the
//! [`descriptor::TypeDescriptor`], consumed in both directions:
//!
//! - The **schema generator** recursively walks a descriptor and produces an
//!   OpenAPI schema fragment, de-duplicating named components, terminating on
//!   recursive structures via forward declarations, canonicalizing generic
//!   type names, and offering filter/enum/cast extension points.
//! - The **request binder** performs the inverse operation at request time:
//!   it takes an incoming request's path captures, query parameters, headers
//!   and body and populates a freshly allocated instance of the same
//!   structural description, converting raw strings into typed values with
//!   the same classification rules.
//!
//! ## Architecture
//!
//! - **[`tag`]** - per-field declarative tag parsing into a structured record
//! - **[`descriptor`]** - the closed type model, classification rules,
//!   canonical type naming, and the per-type descriptor cache
//! - **[`schema`]** - schema nodes, the shared component accumulator, and the
//!   recursive generator
//! - **[`binder`]** - string-to-typed-value conversion, the per-request
//!   binding pass, and the endpoint capability model
//! - **[`callbacks`]** - the seam through which an external object vetoes
//!   routes and fields and resolves enumerations and casts
//! - **[`operation`]** - operation registration with declaration-time
//!   validation, plus full-document assembly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemabind::operation::{Api, Info};
//! use schemabind::{bind_request, NoCallbacks, RequestParts};
//!
//! let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
//! api.get::<GetPetRequest>("/pets/{id}")?;
//!
//! // documentation snapshot
//! let json = api.to_json(&NoCallbacks)?;
//!
//! // per-request binding
//! let parts = RequestParts::new().path_param("id", "42");
//! let bound = bind_request(&GetPetRequest::default(), parts)?;
//! ```
//!
//! ## Error model
//!
//! Declaration problems (malformed tags, missing path fields, missing
//! capabilities) surface at registration or document-generation time and
//! stop a broken operation from being advertised. Per-request conversion
//! failures are accumulated across all envelope fields and reported together
//! as a structured client-error payload; they never abort the process.
//!
//! ## Concurrency
//!
//! Request binding touches only its own freshly allocated instance and needs
//! no synchronization. Document generation uses a shared mutable component
//! accumulator and is single-writer by construction: each build owns a
//! private arena that is returned whole on success.

pub mod binder;
pub mod callbacks;
pub mod descriptor;
pub mod operation;
pub mod schema;
pub mod tag;

pub use binder::{
    bind_request, decode_json_body, encode_json_response, BindRejection, BindState, Bound,
    Capability, CapabilitySet, Endpoint, FieldErrors, RequestParts,
};
pub use callbacks::{AttributeInfo, Callbacks, EnumEntry, NoCallbacks};
pub use descriptor::{
    canonical_type_name, descriptor_of, to_snake_case, Describe, StructBuilder, TypeDescriptor,
};
pub use operation::{Api, ApiDocument, DeclarationError, Info, OperationDocs};
pub use schema::{Document, SchemaGenerator, SchemaNode, SchemaObject};
pub use tag::{parse_field_tag, FieldTag, TagError, TypeCast};
