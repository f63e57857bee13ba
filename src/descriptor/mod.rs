//! # Descriptor Module
//!
//! The descriptor module provides the closed, explicit type model the rest of
//! the crate operates on. Instead of inspecting arbitrary values at runtime,
//! every bindable type is described once by a [`TypeDescriptor`], a small
//! variant tree covering primitives, collections, maps, structs, pointer
//! indirection, named scalar types, timestamps and opaque JSON values.
//!
//! ## Overview
//!
//! The descriptor is the single seam between user types and the engine:
//!
//! - The schema generator walks a descriptor to produce OpenAPI schema nodes.
//! - The request binder walks the same descriptor, in reverse, to convert raw
//!   request strings into a typed instance.
//!
//! Both sides therefore share one set of classification rules, implemented by
//! [`classify`].
//!
//! ## Caching
//!
//! Descriptors are constructed once per type and cached. Types implement
//! [`Describe`] and callers go through [`descriptor_of`], which memoizes the
//! result by `std::any::TypeId`.
//!
//! ## Canonical names
//!
//! Named struct types carry a qualified name such as `pets.Pet`. For generic
//! instantiations (`pets.Page<pets.Pet>`) the bracketed argument notation is
//! rewritten into a `$ref`-safe canonical form; see [`canonical_type_name`].

mod cache;
mod core;
mod name;

pub use cache::{descriptor_of, Describe};
pub use core::{
    classify, EndpointShape, FieldDescriptor, Primitive, StructBuilder, StructDescriptor,
    TypeClass, TypeDescriptor,
};
pub use name::{canonical_type_name, component_ref, to_snake_case};
