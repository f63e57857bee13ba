#![allow(dead_code)]

use schemabind::{
    decode_json_body, descriptor_of, encode_json_response, CapabilitySet, Describe, Endpoint,
    TypeDescriptor,
};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Describe for Pet {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::structure("pets.Pet")
            .tagged_field(
                "id",
                r#"api:"required" description:"pet identifier""#,
                TypeDescriptor::int64(),
            )
            .field("name", TypeDescriptor::string())
            .field("tags", TypeDescriptor::list(TypeDescriptor::string()))
            .build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPetPath {
    pub id: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPetQuery {
    pub limit: Option<i32>,
    pub active: Option<bool>,
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPetHeader {
    pub request_id: Option<String>,
}

/// Read one pet. Carries an injected `trace` value next to the bindable
/// sections to exercise template pre-population.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPetRequest {
    pub trace: Option<String>,
    pub path: GetPetPath,
    pub query: GetPetQuery,
    pub header: GetPetHeader,
    pub response: Option<Pet>,
}

impl Describe for GetPetRequest {
    fn describe() -> Arc<TypeDescriptor> {
        let path = TypeDescriptor::anonymous()
            .tagged_field("id", r#"description:"pet identifier""#, TypeDescriptor::int32())
            .build();
        let query = TypeDescriptor::anonymous()
            .tagged_field(
                "limit",
                r#"description:"page size" example:"20""#,
                TypeDescriptor::pointer(TypeDescriptor::int32()),
            )
            .field("active", TypeDescriptor::pointer(TypeDescriptor::boolean()))
            .field("ids", TypeDescriptor::list(TypeDescriptor::int64()))
            .build();
        let header = TypeDescriptor::anonymous()
            .tagged_field(
                "request_id",
                r#"name:"X-Request-Id""#,
                TypeDescriptor::pointer(TypeDescriptor::string()),
            )
            .build();

        TypeDescriptor::structure("pets.GetPetRequest")
            .field("trace", TypeDescriptor::pointer(TypeDescriptor::string()))
            .field("path", path)
            .field("query", query)
            .field("header", header)
            .tagged_field(
                "response",
                r#"description:"the pet""#,
                TypeDescriptor::pointer(descriptor_of::<Pet>()),
            )
            .build()
    }
}

impl Endpoint for GetPetRequest {
    fn capabilities() -> CapabilitySet {
        CapabilitySet::handler().with_response_encoder()
    }

    fn handle(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn encode_response(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        encode_json_response(&self.response, out)
    }
}

/// Create a pet from a JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePetRequest {
    pub body: Pet,
    pub response: Option<Pet>,
}

impl Describe for CreatePetRequest {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::structure("pets.CreatePetRequest")
            .tagged_field(
                "body",
                r#"api:"required" description:"the pet to create""#,
                descriptor_of::<Pet>(),
            )
            .field("response", TypeDescriptor::pointer(descriptor_of::<Pet>()))
            .build()
    }
}

impl Endpoint for CreatePetRequest {
    fn capabilities() -> CapabilitySet {
        CapabilitySet::handler()
            .with_body_decoder()
            .with_response_encoder()
    }

    fn handle(&mut self) -> anyhow::Result<()> {
        self.response = Some(self.body.clone());
        Ok(())
    }

    fn decode_body(&mut self, body: &mut dyn Read) -> anyhow::Result<()> {
        if let Some(pet) = decode_json_body::<Pet>(body)? {
            self.body = pet;
        }
        Ok(())
    }

    fn encode_response(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        encode_json_response(&self.response, out)
    }
}

/// Declares a body section without providing a body decoder; registration
/// must refuse it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokenCreateRequest {
    pub body: Pet,
}

impl Describe for BrokenCreateRequest {
    fn describe() -> Arc<TypeDescriptor> {
        TypeDescriptor::structure("pets.BrokenCreateRequest")
            .field("body", descriptor_of::<Pet>())
            .build()
    }
}

impl Endpoint for BrokenCreateRequest {
    fn handle(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Delete has neither body nor response section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletePetRequest {
    pub path: GetPetPath,
}

impl Describe for DeletePetRequest {
    fn describe() -> Arc<TypeDescriptor> {
        let path = TypeDescriptor::anonymous()
            .field("id", TypeDescriptor::int32())
            .build();
        TypeDescriptor::structure("pets.DeletePetRequest")
            .field("path", path)
            .build()
    }
}

impl Endpoint for DeletePetRequest {
    fn handle(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
