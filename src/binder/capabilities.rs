use crate::descriptor::Describe;
use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};

/// The closed set of optional endpoint capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Handler,
    BodyDecoder,
    ResponseEncoder,
    ErrorHandler,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Handler => "Handler",
            Capability::BodyDecoder => "BodyDecoder",
            Capability::ResponseEncoder => "ResponseEncoder",
            Capability::ErrorHandler => "ErrorHandler",
        };
        write!(f, "{name}")
    }
}

/// What an endpoint implementation provides.
///
/// Checked once at registration against what the declared sections require;
/// a shortfall is a declaration error, so the hot path never re-asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    pub handler: bool,
    pub body_decoder: bool,
    pub response_encoder: bool,
    pub error_handler: bool,
}

impl CapabilitySet {
    pub fn handler() -> Self {
        CapabilitySet {
            handler: true,
            ..Default::default()
        }
    }

    pub fn with_body_decoder(mut self) -> Self {
        self.body_decoder = true;
        self
    }

    pub fn with_response_encoder(mut self) -> Self {
        self.response_encoder = true;
        self
    }

    pub fn with_error_handler(mut self) -> Self {
        self.error_handler = true;
        self
    }

    /// Capabilities in `required` that this set does not provide.
    pub fn missing(&self, required: &CapabilitySet) -> Vec<Capability> {
        let mut missing = Vec::new();
        if required.handler && !self.handler {
            missing.push(Capability::Handler);
        }
        if required.body_decoder && !self.body_decoder {
            missing.push(Capability::BodyDecoder);
        }
        if required.response_encoder && !self.response_encoder {
            missing.push(Capability::ResponseEncoder);
        }
        if required.error_handler && !self.error_handler {
            missing.push(Capability::ErrorHandler);
        }
        missing
    }
}

/// A bindable request/handler type.
///
/// An endpoint struct exposes its sections (`path`, `query`, `header`,
/// `body`, `response`) through its descriptor, declares the capabilities its
/// implementation actually provides, and carries the optional hooks behind
/// those capabilities. Hooks are only invoked when the matching capability
/// was declared; registration guarantees the pairing.
pub trait Endpoint: Describe {
    /// Capabilities provided by this implementation.
    fn capabilities() -> CapabilitySet {
        CapabilitySet::handler()
    }

    /// Process the bound request. Invoked by the surrounding transport
    /// integration after a successful bind.
    fn handle(&mut self) -> anyhow::Result<()> {
        Err(anyhow!("endpoint does not implement a handler"))
    }

    /// Decode the raw body stream into this instance's body section.
    /// Required when the descriptor declares a `body` section.
    fn decode_body(&mut self, _body: &mut dyn Read) -> anyhow::Result<()> {
        Err(anyhow!("endpoint does not implement a body decoder"))
    }

    /// Encode this instance's response section onto the output stream.
    /// Required when the descriptor declares a `response` section.
    fn encode_response(&self, _out: &mut dyn Write) -> anyhow::Result<()> {
        Err(anyhow!("endpoint does not implement a response encoder"))
    }

    /// Render a handler error into a client-facing payload.
    fn render_error(&self, error: &anyhow::Error) -> serde_json::Value {
        serde_json::json!({ "error": error.to_string() })
    }
}

/// Decode a JSON body stream. An empty stream yields `None` rather than an
/// error, so requests without a payload leave the body section zeroed.
pub fn decode_json_body<B: DeserializeOwned>(body: &mut dyn Read) -> anyhow::Result<Option<B>> {
    let mut buf = String::new();
    body.read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&buf)?))
}

/// Encode a value as JSON onto the output stream.
pub fn encode_json_response<T: Serialize>(value: &T, out: &mut dyn Write) -> anyhow::Result<()> {
    serde_json::to_writer(out, value)?;
    Ok(())
}
