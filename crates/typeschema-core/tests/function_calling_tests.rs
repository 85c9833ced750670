use indexmap::IndexMap;
use serde_json::{Value, json};

use typeschema_core::config::FunctionCallingConfig;
use typeschema_core::error::TransformError;
use typeschema_core::introspect::from_yaml;
use typeschema_core::ir::{
    EnumNode, ListNode, ObjectNode, PrimitiveKind, Property, TypeGraph, TypeId, TypeNode, TypeRef,
};
use typeschema_core::schema::{FunctionCallingSchema, ToolType};
use typeschema_core::transform::FunctionCallingTransformer;

fn load(yaml: &str) -> TypeGraph {
    from_yaml(yaml).expect("fixture should be a valid type graph")
}

fn tool(graph: &TypeGraph, name: &str) -> FunctionCallingSchema {
    FunctionCallingTransformer::default()
        .transform(graph, name)
        .unwrap()
}

fn graph_of(root: TypeRef, nodes: Vec<(&str, TypeNode)>) -> TypeGraph {
    let nodes: IndexMap<TypeId, TypeNode> = nodes
        .into_iter()
        .map(|(id, node)| (TypeId::from(id), node))
        .collect();
    TypeGraph::new(root, nodes)
}

fn location() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lat": {"type": "number"},
            "lon": {"type": "number"}
        },
        "required": ["lat", "lon"],
        "additionalProperties": false
    })
}

#[test]
fn test_weather_tool() {
    let graph = load(include_str!("fixtures/weather.yaml"));
    let schema = tool(&graph, "get_weather");
    assert_eq!(schema.tool_type, ToolType::Function);
    assert_eq!(schema.name, "get_weather");
    assert_eq!(schema.description, "Look up the current weather");
    assert!(schema.strict);

    let mut home = location();
    home["type"] = json!(["object", "null"]);

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "type": "function",
            "name": "get_weather",
            "description": "Look up the current weather",
            "strict": true,
            "parameters": {
                "type": "object",
                "description": "Look up the current weather",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "units": {
                        "type": ["string", "null"],
                        "description": "Temperature scale",
                        "enum": ["celsius", "fahrenheit", null]
                    },
                    "days": {"type": "integer"},
                    "tags": {
                        "type": ["object", "null"],
                        "additionalProperties": {"type": "array", "items": {"type": "string"}}
                    },
                    "location": location(),
                    "home": home
                },
                "required": ["city", "units", "days", "tags", "location", "home"],
                "additionalProperties": false
            }
        })
    );
}

#[test]
fn test_defaults_are_dropped() {
    let graph = load(include_str!("fixtures/weather.yaml"));
    let value = serde_json::to_value(tool(&graph, "get_weather")).unwrap();
    assert!(value["parameters"]["properties"]["units"].get("default").is_none());
}

#[test]
fn test_no_defs_in_output() {
    let graph = load(include_str!("fixtures/weather.yaml"));
    let text = serde_json::to_string(&tool(&graph, "get_weather")).unwrap();
    assert!(!text.contains("$defs"));
    assert!(!text.contains("$ref"));
}

#[test]
fn test_strict_can_be_disabled() {
    let graph = load(include_str!("fixtures/user.yaml"));
    let schema = FunctionCallingTransformer::new(FunctionCallingConfig { strict: false })
        .transform(&graph, "create_user")
        .unwrap();
    assert!(!schema.strict);
    assert_eq!(schema.description, "");
    let text = serde_json::to_string(&schema).unwrap();
    insta::assert_snapshot!(text, @r#"{"type":"function","name":"create_user","description":"","strict":false,"parameters":{"type":"object","properties":{"name":{"type":"string"}},"required":["name"],"additionalProperties":false}}"#);
}

#[test]
fn test_polymorphic_branches_are_inlined_and_tagged() {
    let mut graph = load(include_str!("fixtures/animals.yaml"));
    graph.nodes.insert(
        TypeId::from("Adopt"),
        TypeNode::Object(
            ObjectNode::new("Adopt")
                .with_property(Property::new("pet", TypeRef::to("Animal")))
                .with_property(Property::new("backup", TypeRef::to("Animal").nullable())),
        ),
    );
    graph.root = TypeRef::to("Adopt");

    let value = serde_json::to_value(tool(&graph, "adopt")).unwrap();
    let dog = json!({
        "type": "object",
        "properties": {"barks": {"type": "boolean"}, "type": {"const": "Dog"}},
        "required": ["barks", "type"],
        "additionalProperties": false
    });
    let cat = json!({
        "type": "object",
        "properties": {"lives": {"type": "integer"}, "type": {"const": "Cat"}},
        "required": ["lives", "type"],
        "additionalProperties": false
    });
    assert_eq!(
        value["parameters"]["properties"]["pet"],
        json!({"oneOf": [dog.clone(), cat.clone()], "description": "A pet"})
    );
    assert_eq!(
        value["parameters"]["properties"]["backup"],
        json!({"oneOf": [dog, cat, {"type": "null"}], "description": "A pet"})
    );
}

#[test]
fn test_repeated_type_is_expanded_twice() {
    let graph = load(include_str!("fixtures/weather.yaml"));
    let value = serde_json::to_value(tool(&graph, "get_weather")).unwrap();
    let props = &value["parameters"]["properties"];
    assert_eq!(props["location"]["properties"], props["home"]["properties"]);
}

#[test]
fn test_cycle_is_rejected() {
    let graph = load(include_str!("fixtures/tree.yaml"));
    let err = FunctionCallingTransformer::default()
        .transform(&graph, "tree")
        .unwrap_err();
    assert_eq!(err, TransformError::CyclicReference("TreeNode".into()));
}

#[test]
fn test_indirect_cycle_is_rejected() {
    let graph = graph_of(
        TypeRef::to("A"),
        vec![
            (
                "A",
                TypeNode::Object(ObjectNode::new("A").with_property(Property::new(
                    "bs",
                    TypeRef::inline(TypeNode::List(ListNode {
                        element: TypeRef::to("B"),
                        description: None,
                    })),
                ))),
            ),
            (
                "B",
                TypeNode::Object(
                    ObjectNode::new("B").with_property(Property::new("a", TypeRef::to("A"))),
                ),
            ),
        ],
    );
    let err = FunctionCallingTransformer::default()
        .transform(&graph, "a")
        .unwrap_err();
    assert_eq!(err, TransformError::CyclicReference("A".into()));
}

#[test]
fn test_root_must_be_object() {
    let status = EnumNode {
        name: "Status".into(),
        entries: vec!["ON".into()],
        description: None,
    };
    let graph = graph_of(TypeRef::to("Status"), vec![("Status", TypeNode::Enum(status))]);
    let err = FunctionCallingTransformer::default()
        .transform(&graph, "status")
        .unwrap_err();
    assert_eq!(err, TransformError::InvalidRoot("enum".into()));
    assert_eq!(
        err.to_string(),
        "root must be object for tool schema, got enum"
    );

    let inline = graph_of(TypeRef::primitive(PrimitiveKind::String), vec![]);
    let err = FunctionCallingTransformer::default()
        .transform(&inline, "text")
        .unwrap_err();
    assert_eq!(err, TransformError::InvalidRoot("primitive".into()));
}

#[test]
fn test_missing_root() {
    let graph = graph_of(TypeRef::to("Ghost"), vec![]);
    let err = FunctionCallingTransformer::default()
        .transform(&graph, "ghost")
        .unwrap_err();
    assert_eq!(err, TransformError::UnresolvedRef("Ghost".into()));
}

#[test]
fn test_any_property_is_unconstrained() {
    let graph = graph_of(
        TypeRef::to("Log"),
        vec![(
            "Log",
            TypeNode::Object(
                ObjectNode::new("Log")
                    .with_property(Property::new("extra", TypeRef::to("Any").nullable())),
            ),
        )],
    );
    let value = serde_json::to_value(tool(&graph, "log")).unwrap();
    assert_eq!(value["parameters"]["properties"]["extra"], json!({}));
    assert_eq!(value["parameters"]["required"], json!(["extra"]));
}

#[test]
fn test_optional_nullable_string_is_still_required() {
    let graph = graph_of(
        TypeRef::to("Profile"),
        vec![(
            "Profile",
            TypeNode::Object(ObjectNode::new("Profile").with_property(
                Property::new("bio", TypeRef::primitive(PrimitiveKind::String).nullable())
                    .with_default(None),
            )),
        )],
    );
    let value = serde_json::to_value(tool(&graph, "update_profile")).unwrap();
    let parameters = &value["parameters"];
    assert_eq!(parameters["required"], json!(["bio"]));
    assert_eq!(parameters["properties"]["bio"], json!({"type": ["string", "null"]}));
    assert!(parameters["properties"]["bio"].get("nullable").is_none());
}
