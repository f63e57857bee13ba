use schemabind::{
    AttributeInfo, Callbacks, Document, EnumEntry, NoCallbacks, SchemaGenerator, SchemaNode,
    SchemaObject, TypeCast, TypeDescriptor,
};
use schemabind::schema::SchemaError;
use serde_json::{json, Value};
use std::sync::Arc;

fn generate(doc: &mut Document, ty: &Arc<TypeDescriptor>) -> SchemaNode {
    SchemaGenerator::new(&NoCallbacks)
        .generate(doc, ty)
        .expect("generation failed")
        .expect("type was filtered")
}

fn node_json(node: &SchemaNode) -> Value {
    serde_json::to_value(node).expect("serialize node")
}

fn component_json(doc: &Document, name: &str) -> Value {
    serde_json::to_value(doc.component(name).expect("component missing")).expect("serialize")
}

fn pet_descriptor() -> Arc<TypeDescriptor> {
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

#[test]
fn test_basic_types() {
    let cases = vec![
        (TypeDescriptor::string(), json!({"type": "string"})),
        (TypeDescriptor::boolean(), json!({"type": "boolean"})),
        (
            TypeDescriptor::int32(),
            json!({"type": "integer", "format": "int32"}),
        ),
        (
            TypeDescriptor::int64(),
            json!({"type": "integer", "format": "int64"}),
        ),
        // unsigned widths promote to the int64 representation
        (
            TypeDescriptor::uint64(),
            json!({"type": "integer", "format": "int64"}),
        ),
        (
            TypeDescriptor::float64(),
            json!({"type": "number", "format": "double"}),
        ),
    ];

    let mut doc = Document::new();
    for (ty, expected) in cases {
        let node = generate(&mut doc, &ty);
        assert_eq!(node_json(&node), expected);
    }
    assert!(doc.is_empty(), "scalars must not register components");
}

#[test]
fn test_collections_and_maps() {
    let mut doc = Document::new();

    let list = generate(&mut doc, &TypeDescriptor::list(TypeDescriptor::int32()));
    assert_eq!(
        node_json(&list),
        json!({"type": "array", "items": {"type": "integer", "format": "int32"}})
    );

    let map = generate(&mut doc, &TypeDescriptor::map(TypeDescriptor::string()));
    assert_eq!(
        node_json(&map),
        json!({"type": "object", "additionalProperties": {"type": "string"}})
    );

    // a byte collection is a binary string, not an array
    let bytes = generate(&mut doc, &TypeDescriptor::bytes());
    assert_eq!(node_json(&bytes), json!({"type": "string", "format": "binary"}));

    let ts = generate(&mut doc, &TypeDescriptor::timestamp());
    assert_eq!(node_json(&ts), json!({"type": "string", "format": "date-time"}));
}

#[test]
fn test_named_struct_registers_component() {
    let mut doc = Document::new();
    let node = generate(&mut doc, &pet_descriptor());

    assert_eq!(node_json(&node), json!({"$ref": "#/components/schemas/pets.Pet"}));
    assert_eq!(
        component_json(&doc, "pets.Pet"),
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer", "format": "int64", "description": "pet identifier"},
                "name": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["id"]
        })
    );
}

#[test]
fn test_generation_is_idempotent() {
    let mut doc = Document::new();
    let first = generate(&mut doc, &pet_descriptor());
    let len = doc.len();
    let second = generate(&mut doc, &pet_descriptor());

    assert_eq!(first, second);
    assert_eq!(doc.len(), len, "second pass must not add components");
}

#[test]
fn test_anonymous_struct_is_inlined() {
    let anon = TypeDescriptor::anonymous()
        .field("cool", TypeDescriptor::boolean())
        .build();

    let mut doc = Document::new();
    let node = generate(&mut doc, &anon);

    assert_eq!(
        node_json(&node),
        json!({"type": "object", "properties": {"cool": {"type": "boolean"}}})
    );
    assert!(doc.is_empty(), "anonymous structs must not become components");
}

#[test]
fn test_inline_level_suppresses_component_registration() {
    let mut doc = Document::new();
    let node = SchemaGenerator::new(&NoCallbacks)
        .generate_inlined(&mut doc, &pet_descriptor(), 1)
        .expect("generation failed")
        .expect("node");

    assert!(node.as_object().is_some(), "expected an inline object");
    assert!(!doc.has_component("pets.Pet"));
}

#[test]
fn test_empty_struct_stays_untyped() {
    let empty = TypeDescriptor::anonymous().build();
    let mut doc = Document::new();
    let node = generate(&mut doc, &empty);
    assert_eq!(node_json(&node), json!({}));
}

#[test]
fn test_ignored_fields_are_excluded() {
    let desc = TypeDescriptor::structure("pets.Sparse")
        .field("kept", TypeDescriptor::string())
        .tagged_field("dropped", r#"json:"-""#, TypeDescriptor::string())
        .tagged_field("hidden", r#"api:"ignore""#, TypeDescriptor::string())
        .build();

    let mut doc = Document::new();
    generate(&mut doc, &desc);

    let component = component_json(&doc, "pets.Sparse");
    assert_eq!(
        component["properties"],
        json!({"kept": {"type": "string"}})
    );
}

fn node_descriptor() -> Arc<TypeDescriptor> {
    TypeDescriptor::structure("nodes.Node")
        .field("name", TypeDescriptor::string())
        .field(
            "next",
            TypeDescriptor::pointer(TypeDescriptor::deferred("nodes.Node", node_descriptor)),
        )
        .build()
}

#[test]
fn test_self_referential_struct_terminates() {
    let mut doc = Document::new();
    let node = generate(&mut doc, &node_descriptor());

    assert_eq!(node_json(&node), json!({"$ref": "#/components/schemas/nodes.Node"}));
    let component = component_json(&doc, "nodes.Node");
    assert_eq!(
        component["properties"]["next"],
        json!({"$ref": "#/components/schemas/nodes.Node"})
    );
}

fn group_descriptor() -> Arc<TypeDescriptor> {
    TypeDescriptor::structure("teams.Group")
        .field("name", TypeDescriptor::string())
        .field("users", TypeDescriptor::list(user_descriptor()))
        .build()
}

fn user_descriptor() -> Arc<TypeDescriptor> {
    TypeDescriptor::structure("teams.User")
        .field("name", TypeDescriptor::string())
        .field(
            "group",
            TypeDescriptor::pointer(TypeDescriptor::deferred("teams.Group", group_descriptor)),
        )
        .build()
}

#[test]
fn test_mutually_referential_structs_terminate() {
    let mut doc = Document::new();
    generate(&mut doc, &group_descriptor());

    assert!(doc.has_component("teams.Group"));
    assert!(doc.has_component("teams.User"));
    let user = component_json(&doc, "teams.User");
    assert_eq!(
        user["properties"]["group"],
        json!({"$ref": "#/components/schemas/teams.Group"})
    );
}

#[test]
fn test_generic_names_are_canonical_and_stable() {
    let page = TypeDescriptor::structure("pets.Page<pets.Pet>")
        .field("items", TypeDescriptor::list(pet_descriptor()))
        .field("total", TypeDescriptor::int64())
        .build();

    let mut doc = Document::new();
    let first = generate(&mut doc, &page);
    let second = generate(&mut doc, &page);

    assert_eq!(
        node_json(&first),
        json!({"$ref": "#/components/schemas/pets.Page..pets.Pet"})
    );
    assert_eq!(first, second);
    assert!(doc.has_component("pets.Page..pets.Pet"));
    assert!(doc.has_component("pets.Pet"));
}

#[test]
fn test_embedded_struct_is_spliced_into_parent() {
    let timestamps = TypeDescriptor::structure("base.Timestamps")
        .field("created_at", TypeDescriptor::timestamp())
        .field("updated_at", TypeDescriptor::timestamp())
        .build();
    let post = TypeDescriptor::structure("posts.Post")
        .field("title", TypeDescriptor::string())
        .embedded_field("Timestamps", timestamps)
        .build();

    let mut doc = Document::new();
    generate(&mut doc, &post);

    let component = component_json(&doc, "posts.Post");
    let properties = component["properties"].as_object().expect("properties");
    assert!(properties.contains_key("title"));
    assert!(properties.contains_key("created_at"));
    assert!(properties.contains_key("updated_at"));
    // no intermediate nesting level for the embedded struct
    assert!(!properties.contains_key("timestamps"));
}

#[test]
fn test_nullable_reference_wraps_in_all_of() {
    let order = TypeDescriptor::structure("orders.Order")
        .tagged_field(
            "pet",
            r#"api:"nullable" description:"maybe a pet""#,
            pet_descriptor(),
        )
        .build();

    let mut doc = Document::new();
    generate(&mut doc, &order);

    let component = component_json(&doc, "orders.Order");
    assert_eq!(
        component["properties"]["pet"],
        json!({
            "allOf": [{"$ref": "#/components/schemas/pets.Pet"}],
            "nullable": true,
            "description": "maybe a pet"
        })
    );
    // the shared component itself is untouched
    assert!(component_json(&doc, "pets.Pet")["nullable"].is_null());
}

struct AllowList(Vec<&'static str>);

impl Callbacks for AllowList {
    fn filter_field(&self, field: &AttributeInfo) -> anyhow::Result<bool> {
        Ok(!self.0.iter().any(|p| *p == field.query_path()))
    }
}

#[test]
fn test_filtered_fields_are_invisible() {
    let filter = AllowList(vec!["pet", "pet.id"]);
    let mut doc = Document::new();
    SchemaGenerator::new(&filter)
        .generate(&mut doc, &pet_descriptor())
        .expect("generation failed")
        .expect("node");

    let component = component_json(&doc, "pets.Pet");
    assert_eq!(
        component,
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer", "format": "int64", "description": "pet identifier"}
            },
            "required": ["id"]
        })
    );
}

#[test]
fn test_filtered_required_field_leaves_required_set() {
    let filter = AllowList(vec!["pet", "pet.name"]);
    let mut doc = Document::new();
    SchemaGenerator::new(&filter)
        .generate(&mut doc, &pet_descriptor())
        .expect("generation failed")
        .expect("node");

    let component = component_json(&doc, "pets.Pet");
    assert_eq!(
        component,
        json!({
            "type": "object",
            "properties": {"name": {"type": "string"}}
        })
    );
}

struct StatusEnum;

impl Callbacks for StatusEnum {
    fn resolve_enum(&self, ty: &TypeDescriptor) -> Option<Vec<EnumEntry>> {
        match ty {
            TypeDescriptor::Named { name, .. } if name == "pets.Status" => Some(vec![
                EnumEntry::new("available", 1),
                EnumEntry::new("sold", 2),
            ]),
            _ => None,
        }
    }
}

#[test]
fn test_enum_registered_once_and_shared() {
    let status = TypeDescriptor::named("pets.Status", TypeDescriptor::int32());
    let order = TypeDescriptor::structure("orders.Order")
        .field("status", Arc::clone(&status))
        .build();
    let listing = TypeDescriptor::structure("orders.Listing")
        .field("status", status)
        .build();

    let callbacks = StatusEnum;
    let generator = SchemaGenerator::new(&callbacks);
    let mut doc = Document::new();
    generator.generate(&mut doc, &order).expect("generate").expect("node");
    generator.generate(&mut doc, &listing).expect("generate").expect("node");

    assert_eq!(
        component_json(&doc, "pets.Status"),
        json!({
            "type": "integer",
            "format": "int32",
            "enum": [1, 2],
            "x-enum-varnames": ["available", "sold"]
        })
    );

    let expected_ref = json!({"$ref": "#/components/schemas/pets.Status"});
    assert_eq!(component_json(&doc, "orders.Order")["properties"]["status"], expected_ref);
    assert_eq!(component_json(&doc, "orders.Listing")["properties"]["status"], expected_ref);
}

struct DatetimeCasts;

impl Callbacks for DatetimeCasts {
    fn resolve_cast(&self, cast: TypeCast, _field: &AttributeInfo) -> Option<SchemaObject> {
        (cast == TypeCast::Datetime).then(SchemaObject::date_time)
    }
}

#[test]
fn test_cast_resolution() {
    let event = TypeDescriptor::structure("events.Event")
        .tagged_field(
            "at",
            r#"api:"as:datetime""#,
            TypeDescriptor::named("times.UnixTime", TypeDescriptor::int64()),
        )
        .tagged_field("seen", r#"api:"as:datetime""#, TypeDescriptor::int64())
        .build();

    let callbacks = DatetimeCasts;
    let mut doc = Document::new();
    SchemaGenerator::new(&callbacks)
        .generate(&mut doc, &event)
        .expect("generate")
        .expect("node");

    let component = component_json(&doc, "events.Event");
    // named cast target: registered once under a cast-specific name
    assert_eq!(
        component["properties"]["at"],
        json!({"$ref": "#/components/schemas/times.UnixTime..as_datetime"})
    );
    assert_eq!(
        component_json(&doc, "times.UnixTime..as_datetime"),
        json!({"type": "string", "format": "date-time"})
    );
    // unnamed cast target stays inline
    assert_eq!(
        component["properties"]["seen"],
        json!({"type": "string", "format": "date-time"})
    );
}

#[test]
fn test_cast_without_resolver_is_an_error() {
    let event = TypeDescriptor::structure("events.Orphan")
        .tagged_field("at", r#"api:"as:datetime""#, TypeDescriptor::int64())
        .build();

    let mut doc = Document::new();
    let err = SchemaGenerator::new(&NoCallbacks)
        .generate(&mut doc, &event)
        .expect_err("cast must fail without a resolver");
    assert!(matches!(err, SchemaError::MissingCastResolver { .. }));
}

#[test]
fn test_unknown_framework_tag_key_is_an_error() {
    let bad = TypeDescriptor::structure("pets.Bad")
        .tagged_field("x", r#"api:"bogus""#, TypeDescriptor::string())
        .build();

    let mut doc = Document::new();
    let err = SchemaGenerator::new(&NoCallbacks)
        .generate(&mut doc, &bad)
        .expect_err("unknown api key must fail");
    assert!(matches!(err, SchemaError::Tag { .. }));
}
