//! # Tag Module
//!
//! Parses per-field declarative tag text into a structured [`FieldTag`]
//! record. Tags drive both schema generation (naming, required sets, display
//! metadata, casts) and request binding (wire-name and header-name overrides).
//!
//! ## Tag syntax
//!
//! A tag is a whitespace-separated list of `namespace:"value"` entries:
//!
//! ```text
//! json:"pet_id,omitempty" api:"required,readonly" description:"the pet id"
//! ```
//!
//! Recognized namespaces:
//!
//! | namespace | value | effect |
//! |---|---|---|
//! | `json` | `-`, `omitempty`, or a name | serialization name / ignore |
//! | `api` | `ignore`, `readonly`, `writeonly`, `nullable`, `deprecated`, `required`, `as:<cast>` | framework flags |
//! | `description`, `example`, `style` | verbatim | display metadata |
//! | `explode` | `true` / `false` | display metadata |
//! | `name` | verbatim | header-name override |
//! | `content-type` | media type | body/response media type |
//!
//! Unknown entries inside the `api` namespace are an error, since a typo
//! there silently changes API behavior. The empty entry is the exception and
//! tolerated. Unknown namespaces belong to foreign tooling and are skipped.
//!
//! Flags are three-valued (`Option<bool>`): "not specified" stays
//! distinguishable from "explicitly false", which the required-set
//! computation depends on.

mod core;

pub use core::{parse_field_tag, FieldTag, TagError, TypeCast};
