//! # Binder Module
//!
//! The request binder is the inverse of the schema generator: it takes the
//! raw pieces of an incoming request (path captures, query parameters,
//! headers and the body stream) and populates a freshly allocated instance
//! of an endpoint type, using the same descriptor and the same
//! classification rules the generator uses.
//!
//! ## Binding pass
//!
//! One pass per request, no retries:
//!
//! ```text
//! Allocated -> PathBound -> QueryBound -> HeaderBound -> Rejected
//!                                                     \-> BodyBound
//! ```
//!
//! Conversion failures in the envelope (path/query/header) are accumulated
//! per field and reported together; the body is only decoded once the
//! envelope is clean. A rejection carries a [`FieldErrors`] map from dotted
//! field path to message, ready to serialize as the client-facing payload.
//!
//! ## Capabilities
//!
//! Endpoint types declare what they implement through a closed
//! [`CapabilitySet`]. The operation registry checks the declared sections
//! against the capability set once, at registration time: a `body` section
//! without a body decoder is a declaration error, not a request-time
//! surprise.

mod capabilities;
mod convert;
mod core;

pub use capabilities::{
    decode_json_body, encode_json_response, Capability, CapabilitySet, Endpoint,
};
pub use convert::{convert_value, ConvertError};
pub use core::{bind_request, BindRejection, BindState, Bound, FieldErrors, RequestParts};
