use indexmap::IndexMap;
use serde_json::{Number, Value, json};

use typeschema_core::config::JsonSchemaConfig;
use typeschema_core::introspect::from_yaml;
use typeschema_core::schema::{
    AdditionalProperties, AllOfPropertyDefinition, AnyOfPropertyDefinition,
    ArrayPropertyDefinition, BooleanPropertyDefinition, JsonSchemaDefinition,
    NumericPropertyDefinition, ObjectPropertyDefinition, OneOfPropertyDefinition,
    PropertyDefinition, SchemaDiscriminator, StringOrList, StringPropertyDefinition, decode,
    encode,
};
use typeschema_core::transform::JsonSchemaTransformer;

fn one_of_each_shape() -> Vec<PropertyDefinition> {
    let mut properties = IndexMap::new();
    properties.insert(
        "id".to_string(),
        NumericPropertyDefinition::of_type("integer").into(),
    );
    vec![
        StringPropertyDefinition {
            format: Some("email".into()),
            min_length: Some(3),
            pattern: Some("^.+@.+$".into()),
            ..Default::default()
        }
        .into(),
        NumericPropertyDefinition {
            minimum: Some(Number::from(0)),
            multiple_of: Some(Number::from_f64(0.5).unwrap()),
            ..NumericPropertyDefinition::of_type("number")
        }
        .into(),
        BooleanPropertyDefinition::default()
            .with_default(json!(false))
            .unwrap()
            .into(),
        ArrayPropertyDefinition {
            max_items: Some(4),
            ..ArrayPropertyDefinition::of(StringPropertyDefinition::default().into())
        }
        .into(),
        ObjectPropertyDefinition::closed(properties, vec!["id".into()]).into(),
        PropertyDefinition::reference("User"),
        OneOfPropertyDefinition {
            one_of: vec![PropertyDefinition::reference("Dog"), PropertyDefinition::null()],
            description: Some("maybe a dog".into()),
            discriminator: Some(SchemaDiscriminator {
                property_name: "kind".into(),
                mapping: None,
            }),
            default: None,
        }
        .into(),
        AnyOfPropertyDefinition {
            any_of: vec![
                StringPropertyDefinition::default().into(),
                NumericPropertyDefinition::of_type("integer").into(),
            ],
            ..Default::default()
        }
        .into(),
        AllOfPropertyDefinition {
            all_of: vec![PropertyDefinition::reference("Base")],
            description: Some("extends Base".into()),
            ..Default::default()
        }
        .into(),
    ]
}

#[test]
fn test_every_shape_survives_a_round_trip() {
    for definition in one_of_each_shape() {
        let value = encode(&definition).unwrap();
        let back = decode(value.clone()).unwrap();
        assert_eq!(back, definition, "{value}");
    }
}

#[test]
fn test_constraint_only_shapes_keep_their_kind() {
    let numeric: PropertyDefinition = NumericPropertyDefinition {
        minimum: Some(Number::from(1)),
        ..Default::default()
    }
    .into();
    let value = encode(&numeric).unwrap();
    assert_eq!(value, json!({"type": "number", "minimum": 1}));
    assert_eq!(decode(value).unwrap(), numeric);

    let array = decode(json!({"items": {"type": "string"}})).unwrap();
    assert_eq!(
        encode(&array).unwrap(),
        json!({"type": "array", "items": {"type": "string"}})
    );
    assert_eq!(decode(encode(&array).unwrap()).unwrap(), array);

    let object = decode(json!({"properties": {}})).unwrap();
    assert_eq!(object.kind_name(), "object");
    assert_eq!(decode(encode(&object).unwrap()).unwrap(), object);
}

#[test]
fn test_wire_document_round_trip() {
    let wire = json!({
        "type": "object",
        "description": "An order",
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "total": {"type": "number", "exclusiveMinimum": 0},
            "tags": {"type": "array", "items": {"type": "string"}, "minItems": 1},
            "status": {"type": "string", "enum": ["open", "closed"], "default": "open"},
            "notes": {"type": ["string", "null"], "maxLength": 500},
            "metadata": {"type": "object", "additionalProperties": {"type": "string"}},
            "customer": {"$ref": "#/$defs/Customer"},
            "payment": {"anyOf": [{"$ref": "#/$defs/Card"}, {"$ref": "#/$defs/Cash"}]},
            "discount": {"oneOf": [{"type": "number"}, {"type": "null"}]}
        },
        "required": ["id", "total"],
        "additionalProperties": false
    });
    let decoded = decode(wire.clone()).unwrap();
    assert_eq!(encode(&decoded).unwrap(), wire);
}

#[test]
fn test_const_only_decodes_as_string() {
    let decoded = decode(json!({"type": "string", "const": "fixed"})).unwrap();
    match decoded {
        PropertyDefinition::String(ref s) => {
            assert_eq!(s.const_value, Some(json!("fixed")));
            assert_eq!(s.schema_type, Some(StringOrList::single("string")));
        }
        ref other => panic!("expected string shape, got {}", other.kind_name()),
    }
    assert_eq!(
        encode(&decoded).unwrap(),
        json!({"type": "string", "const": "fixed"})
    );
}

#[test]
fn test_structure_wins_over_type() {
    let decoded = decode(json!({"type": "string", "items": {"type": "integer"}})).unwrap();
    assert_eq!(decoded.kind_name(), "array");

    let decoded = decode(json!({"properties": {}})).unwrap();
    assert_eq!(decoded.kind_name(), "object");
}

#[test]
fn test_type_union_picks_first_known_member() {
    let decoded = decode(json!({"type": ["null", "integer"]})).unwrap();
    assert_eq!(decoded.kind_name(), "numeric");
}

#[test]
fn test_unknown_shape_falls_back_to_string() {
    let decoded = decode(json!({})).unwrap();
    assert_eq!(decoded, StringPropertyDefinition::untyped().into());
    assert_eq!(encode(&decoded).unwrap(), json!({}));
}

#[test]
fn test_integer_bounds_keep_integer_form() {
    let wire = json!({"type": "integer", "minimum": 0, "maximum": 10});
    let decoded = decode(wire).unwrap();
    let text = serde_json::to_string(&decoded).unwrap();
    assert_eq!(text, r#"{"type":"integer","minimum":0,"maximum":10}"#);
}

#[test]
fn test_decode_rejects_non_objects() {
    let err = decode(json!("string")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "property definition must be a JSON object, got string"
    );
    assert!(decode(json!(true)).is_err());
}

#[test]
fn test_checked_defaults_and_consts() {
    assert!(StringPropertyDefinition::default().with_default(json!("x")).is_ok());
    assert!(StringPropertyDefinition::default().with_default(Value::Null).is_ok());
    let err = NumericPropertyDefinition::default()
        .with_default(json!("ten"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "numeric property cannot take a default of JSON type string"
    );
    assert!(ArrayPropertyDefinition::default().with_const(json!({})).is_err());
    assert!(ObjectPropertyDefinition::default().with_const(json!({})).is_ok());
}

#[test]
fn test_additional_properties_forms() {
    let closed = decode(json!({"type": "object", "additionalProperties": false})).unwrap();
    let open = decode(json!({"type": "object", "additionalProperties": {"type": "number"}})).unwrap();
    assert_eq!(
        closed.as_object().unwrap().additional_properties,
        Some(AdditionalProperties::Bool(false))
    );
    assert!(matches!(
        open.as_object().unwrap().additional_properties,
        Some(AdditionalProperties::Schema(_))
    ));
}

#[test]
fn test_transformer_output_round_trips() {
    let graph = from_yaml(include_str!("fixtures/animals.yaml")).unwrap();
    let config = JsonSchemaConfig {
        include_openapi_discriminator: true,
        include_schema_uri: true,
        ..JsonSchemaConfig::STRICT
    };
    let doc = JsonSchemaTransformer::new(config)
        .transform(&graph, "Animal")
        .unwrap();
    let text = doc.to_json_string_pretty().unwrap();
    let back = JsonSchemaDefinition::from_json_str(&text).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_document_reads_foreign_schema() {
    let text = r##"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$defs": {"Id": {"type": "string", "format": "uuid"}},
        "type": "object",
        "properties": {"id": {"$ref": "#/$defs/Id"}}
    }"##;
    let doc = JsonSchemaDefinition::from_json_str(text).unwrap();
    assert_eq!(doc.id, None);
    assert_eq!(doc.strict, None);
    assert_eq!(doc.defs.len(), 1);
    assert_eq!(doc.def("Id").unwrap().kind_name(), "string");
    assert_eq!(doc.body.kind_name(), "object");
}
