//! Property schema synthesis.
//!
//! Converts one property descriptor into a JSON Schema fragment. Any property
//! value in a template may be an intrinsic function call instead of a literal,
//! so every synthesized type schema is wrapped exactly once as
//! `oneOf: [<type schema>, {"$ref": intrinsic-function}]`, at every recursion
//! level. The wrapping is the contract of this module: consumers (and the
//! fragment documents) rely on it being uniform.

use hotschema_types::{PropertyDescriptor, PropertyShape};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::render;

/// `$ref` targets expected to exist in the surrounding schema document.
pub const INTRINSIC_FUNCTION: &str = "#/definitions/intrinsic-function";
pub const ARRAY_WITH_FUNCTIONS: &str = "#/definitions/array-with-intrinsic-functions";
pub const OBJECT_WITH_FUNCTIONS: &str = "#/definitions/object-with-intrinsic-functions";

/// Synthesize the schema fragment for one property descriptor.
///
/// The fragment carries the rendered description pair (when non-empty) and,
/// for any descriptor with a declared kind, the wrapped type schema. An
/// untyped descriptor yields only its description fields; `{}` in the
/// degenerate case.
pub fn property_schema(descriptor: &PropertyDescriptor) -> Value {
    let mut node = Map::new();

    let docs = render::property_docs(descriptor);
    if let Some(plain) = docs.plain {
        node.insert("description".to_string(), Value::String(plain));
    }
    if let Some(markdown) = docs.markdown {
        node.insert("markdownDescription".to_string(), Value::String(markdown));
    }

    let type_schema = match descriptor.shape() {
        PropertyShape::Primitive(kind) => Some(json!({ "type": kind.json_type() })),
        PropertyShape::UniformList(item) => Some(json!({
            "type": "array",
            "items": property_schema(item)
        })),
        PropertyShape::UnconstrainedList => Some(json!({ "$ref": ARRAY_WITH_FUNCTIONS })),
        PropertyShape::UniformMap(value) => Some(json!({
            "type": "object",
            "additionalProperties": property_schema(value)
        })),
        PropertyShape::FixedMap(fields) => Some(object_schema(fields)),
        PropertyShape::UnconstrainedMap => Some(json!({ "$ref": OBJECT_WITH_FUNCTIONS })),
        PropertyShape::Untyped => None,
    };
    if let Some(type_schema) = type_schema {
        node.insert(
            "oneOf".to_string(),
            json!([type_schema, { "$ref": INTRINSIC_FUNCTION }]),
        );
    }

    Value::Object(node)
}

/// Build a fixed-shape object schema from named sub-properties.
///
/// Each sub-property is synthesized (and wrapped) at its own level;
/// sub-properties flagged required are collected into the `required` list,
/// which is omitted when empty. Unknown keys are rejected.
pub fn object_schema(fields: &IndexMap<String, PropertyDescriptor>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, field) in fields {
        properties.insert(name.clone(), property_schema(field));
        if field.required {
            required.push(Value::String(name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert("additionalProperties".to_string(), Value::Bool(false));
    Value::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(value: Value) -> PropertyDescriptor {
        serde_json::from_value(value).expect("property fixture")
    }

    /// Root shape of every typed property: description fields plus exactly one
    /// `oneOf` pairing the type schema with the intrinsic-function reference.
    fn assert_wrapped(fragment: &Value) -> &Value {
        let object = fragment.as_object().expect("fragment is an object");
        for key in object.keys() {
            assert!(
                matches!(key.as_str(), "description" | "markdownDescription" | "oneOf"),
                "unexpected key {key}"
            );
        }
        let one_of = object["oneOf"].as_array().expect("oneOf is an array");
        assert_eq!(one_of.len(), 2);
        assert_eq!(one_of[1], json!({ "$ref": INTRINSIC_FUNCTION }));
        &one_of[0]
    }

    #[test]
    fn primitive_kinds_map_to_json_types() {
        for (kind, json_type) in [
            ("string", "string"),
            ("integer", "integer"),
            ("number", "number"),
            ("boolean", "boolean"),
        ] {
            let fragment = property_schema(&property(json!({ "type": kind })));
            assert_eq!(assert_wrapped(&fragment), &json!({ "type": json_type }));
        }
    }

    #[test]
    fn untyped_descriptor_yields_empty_fragment() {
        assert_eq!(property_schema(&PropertyDescriptor::default()), json!({}));
    }

    #[test]
    fn uniform_list_recurses_into_items() {
        let fragment = property_schema(&property(json!({
            "type": "list",
            "schema": { "*": { "type": "string" } }
        })));
        let type_schema = assert_wrapped(&fragment);
        assert_eq!(type_schema["type"], json!("array"));
        // the element schema is wrapped at its own level, not re-wrapped here
        assert_eq!(
            type_schema["items"],
            json!({ "oneOf": [ { "type": "string" }, { "$ref": INTRINSIC_FUNCTION } ] })
        );
    }

    #[test]
    fn bare_list_references_predefined_array_schema() {
        let fragment = property_schema(&property(json!({ "type": "list" })));
        assert_eq!(assert_wrapped(&fragment), &json!({ "$ref": ARRAY_WITH_FUNCTIONS }));
    }

    #[test]
    fn wildcard_takes_precedence_over_fixed_shape() {
        let fragment = property_schema(&property(json!({
            "type": "list",
            "schema": {
                "*": { "type": "integer" },
                "fixed": { "type": "string" }
            }
        })));
        let type_schema = assert_wrapped(&fragment);
        assert_eq!(
            type_schema["items"]["oneOf"][0],
            json!({ "type": "integer" })
        );
    }

    #[test]
    fn uniform_map_recurses_into_values() {
        let fragment = property_schema(&property(json!({
            "type": "map",
            "schema": { "*": { "type": "boolean" } }
        })));
        let type_schema = assert_wrapped(&fragment);
        assert_eq!(type_schema["type"], json!("object"));
        assert_eq!(
            type_schema["additionalProperties"]["oneOf"][0],
            json!({ "type": "boolean" })
        );
    }

    #[test]
    fn bare_map_references_predefined_object_schema() {
        let fragment = property_schema(&property(json!({ "type": "map" })));
        assert_eq!(assert_wrapped(&fragment), &json!({ "$ref": OBJECT_WITH_FUNCTIONS }));
    }

    #[test]
    fn fixed_shape_map_collects_required_fields() {
        let fragment = property_schema(&property(json!({
            "type": "map",
            "schema": {
                "a": { "type": "string", "required": true },
                "b": { "type": "integer" }
            }
        })));
        let type_schema = assert_wrapped(&fragment);
        assert_eq!(type_schema["type"], json!("object"));
        assert_eq!(type_schema["required"], json!(["a"]));
        assert_eq!(type_schema["additionalProperties"], json!(false));
        assert_wrapped(&type_schema["properties"]["a"]);
        assert_wrapped(&type_schema["properties"]["b"]);
    }

    #[test]
    fn object_schema_omits_empty_required_list() {
        let fields: IndexMap<String, PropertyDescriptor> =
            serde_json::from_value(json!({ "a": { "type": "string" } })).expect("fields fixture");
        let schema = object_schema(&fields);
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn deeply_nested_composites_wrap_each_level_once() {
        let fragment = property_schema(&property(json!({
            "type": "list",
            "schema": {
                "*": {
                    "type": "map",
                    "schema": {
                        "inner": { "type": "list", "schema": { "*": { "type": "string" } } }
                    }
                }
            }
        })));
        let list_schema = assert_wrapped(&fragment);
        let map_schema = assert_wrapped(&list_schema["items"]);
        let inner = assert_wrapped(&map_schema["properties"]["inner"]);
        assert_eq!(inner["type"], json!("array"));
        assert_wrapped(&inner["items"]);
    }
}
