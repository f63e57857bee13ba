mod common;

use common::{BrokenCreateRequest, CreatePetRequest, DeletePetRequest, GetPetRequest};
use schemabind::{
    Api, AttributeInfo, Callbacks, Capability, Describe, DeclarationError, Endpoint, Info,
    NoCallbacks, OperationDocs, TypeDescriptor,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn pet_api() -> Api {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    api.get::<GetPetRequest>("/pets/{id}").expect("register get");
    api.post::<CreatePetRequest>("/pets").expect("register post");
    api.delete::<DeletePetRequest>("/pets/{id}").expect("register delete");
    api
}

fn document_json(api: &Api) -> Value {
    let doc = api.generate_document(&NoCallbacks).expect("generate document");
    serde_json::to_value(doc).expect("serialize document")
}

#[test]
fn test_document_shape() {
    let api = pet_api();
    let doc = document_json(&api);

    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"]["title"], "Pet Store");

    let get = &doc["paths"]["/pets/{id}"]["get"];
    assert_eq!(get["operationId"], "GetPetRequest");

    let params = get["parameters"].as_array().expect("parameters");
    let id_param = params
        .iter()
        .find(|p| p["in"] == "path" && p["name"] == "id")
        .expect("path parameter");
    assert_eq!(id_param["required"], json!(true));
    assert_eq!(id_param["schema"], json!({"type": "integer", "format": "int32"}));
    assert_eq!(id_param["description"], "pet identifier");

    let limit_param = params
        .iter()
        .find(|p| p["in"] == "query" && p["name"] == "limit")
        .expect("query parameter");
    assert_eq!(limit_param["schema"], json!({"type": "integer", "format": "int32"}));
    assert_eq!(limit_param["example"], "20");

    let header_param = params
        .iter()
        .find(|p| p["in"] == "header")
        .expect("header parameter");
    assert_eq!(header_param["name"], "X-Request-Id");

    // response schema goes through the shared component map
    assert_eq!(
        get["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/pets.Pet"})
    );
    assert_eq!(get["responses"]["200"]["description"], "the pet");
    assert!(doc["components"]["schemas"]["pets.Pet"].is_object());
}

#[test]
fn test_request_body_document() {
    let api = pet_api();
    let doc = document_json(&api);

    let body = &doc["paths"]["/pets"]["post"]["requestBody"];
    assert_eq!(body["required"], json!(true));
    assert_eq!(body["description"], "the pet to create");
    assert_eq!(
        body["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/pets.Pet"})
    );
}

#[test]
fn test_missing_response_section_documents_no_data() {
    let api = pet_api();
    let doc = document_json(&api);

    let delete = &doc["paths"]["/pets/{id}"]["delete"];
    assert_eq!(delete["responses"]["204"]["description"], "no data");
    assert!(delete["responses"]["204"]["content"].is_null());
}

#[test]
fn test_operation_docs_are_applied() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    api.route_with::<GetPetRequest>(
        http::Method::GET,
        "/pets/{id}",
        OperationDocs {
            summary: Some("Fetch one pet".to_string()),
            description: Some("Longer text".to_string()),
            tags: vec!["pets".to_string()],
            deprecated: true,
        },
    )
    .expect("register");

    let doc = document_json(&api);
    let get = &doc["paths"]["/pets/{id}"]["get"];
    assert_eq!(get["summary"], "Fetch one pet");
    assert_eq!(get["tags"], json!(["pets"]));
    assert_eq!(get["deprecated"], json!(true));
}

#[test]
fn test_duplicate_operation_is_rejected() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    api.get::<GetPetRequest>("/pets/{id}").expect("register");
    let err = api
        .get::<GetPetRequest>("/pets/{id}")
        .expect_err("duplicate must fail");
    assert!(matches!(err, DeclarationError::DuplicateOperation { .. }));
}

#[test]
fn test_capture_without_path_field_is_rejected() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    let err = api
        .get::<GetPetRequest>("/pets/{pet_key}")
        .expect_err("unknown capture must fail");
    match err {
        DeclarationError::MissingPathField { capture, .. } => assert_eq!(capture, "pet_key"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_capability_is_rejected() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    let err = api
        .post::<BrokenCreateRequest>("/pets")
        .expect_err("missing body decoder must fail");
    match err {
        DeclarationError::MissingCapability { capability, .. } => {
            assert_eq!(capability, Capability::BodyDecoder)
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Query fields with a bad framework tag fail at registration, not at
/// document-generation time.
#[derive(Debug, Default)]
struct BadTagRequest;

impl Describe for BadTagRequest {
    fn describe() -> Arc<TypeDescriptor> {
        let query = TypeDescriptor::anonymous()
            .tagged_field("q", r#"api:"bogus""#, TypeDescriptor::string())
            .build();
        TypeDescriptor::structure("pets.BadTagRequest")
            .field("query", query)
            .build()
    }
}

impl Endpoint for BadTagRequest {
    fn handle(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_bad_section_tag_is_rejected_at_registration() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    let err = api
        .get::<BadTagRequest>("/pets")
        .expect_err("bad tag must fail registration");
    assert!(matches!(err, DeclarationError::Tag { .. }));
}

/// Structured query parameters are nested under a media type.
#[derive(Debug, Default)]
struct SearchPetsRequest;

impl Describe for SearchPetsRequest {
    fn describe() -> Arc<TypeDescriptor> {
        let filter = TypeDescriptor::anonymous()
            .field("species", TypeDescriptor::string())
            .field("min_age", TypeDescriptor::pointer(TypeDescriptor::int32()))
            .build();
        let query = TypeDescriptor::anonymous().field("filter", filter).build();
        TypeDescriptor::structure("pets.SearchPetsRequest")
            .field("query", query)
            .build()
    }
}

impl Endpoint for SearchPetsRequest {
    fn handle(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_object_query_parameter_is_wrapped_in_content() {
    let mut api = Api::new(Info::new("Pet Store", "1.0.0"));
    api.get::<SearchPetsRequest>("/pets/search").expect("register");

    let doc = document_json(&api);
    let params = doc["paths"]["/pets/search"]["get"]["parameters"]
        .as_array()
        .expect("parameters");
    let filter = &params[0];
    assert_eq!(filter["name"], "filter");
    assert!(filter["schema"].is_null());
    assert_eq!(
        filter["content"]["application/json"]["schema"]["type"],
        "object"
    );
}

struct DropPets;

impl Callbacks for DropPets {
    fn filter_route(&self, _method: &http::Method, pattern: &str) -> anyhow::Result<bool> {
        Ok(pattern == "/pets")
    }

    fn filter_field(&self, _field: &AttributeInfo) -> anyhow::Result<bool> {
        Ok(false)
    }
}

#[test]
fn test_filtered_routes_are_omitted() {
    let api = pet_api();
    let doc = api.generate_document(&DropPets).expect("generate");
    let value = serde_json::to_value(doc).expect("serialize");

    assert!(value["paths"]["/pets"].is_null());
    assert!(value["paths"]["/pets/{id}"].is_object());
}
