//! # Callbacks Module
//!
//! The seam through which an external authorization or customization object
//! participates in document generation. The engine never owns policy: a
//! [`Callbacks`] implementation may veto whole routes, veto individual fields
//! by their dotted path, resolve type casts, and mark named types as
//! enumerations.
//!
//! Every method has a no-veto default, so implementors only override what
//! they need; [`NoCallbacks`] is the all-default implementation used when no
//! customization object is injected.

mod core;

pub use core::{AttributeInfo, Callbacks, EnumEntry, NoCallbacks, Scope};
