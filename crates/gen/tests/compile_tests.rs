use hotschema_gen::{Fragments, compile_catalog, property::INTRINSIC_FUNCTION};
use hotschema_types::ResourceTypeCatalog;
use serde_json::{Value, json};

fn load_catalog(value: Value) -> ResourceTypeCatalog {
    serde_json::from_value(value).expect("catalog fixture")
}

fn minimal_fragments() -> Fragments {
    Fragments {
        template: json!({
            "properties": {
                "resources": {
                    "type": "object",
                    "additionalProperties": { "type": "object" }
                }
            }
        }),
        resource: json!({
            "allOf": [ {
                "type": "object",
                "properties": {
                    "type": { "type": "string", "enum": [] },
                    "properties": { "type": "object" }
                }
            } ]
        }),
    }
}

#[test]
fn compiles_a_single_server_type_end_to_end() {
    let catalog = load_catalog(json!({
        "resource_types": {
            "OS::Nova::Server": {
                "description": "An instance.",
                "properties": {
                    "name": { "type": "string", "required": true }
                }
            }
        }
    }));

    let document = compile_catalog(&catalog, minimal_fragments()).expect("compile");
    let one_of = document
        .pointer("/properties/resources/additionalProperties/oneOf")
        .and_then(Value::as_array)
        .expect("discriminator list");
    assert_eq!(one_of.len(), 1);

    let resource_schema = &one_of[0]["allOf"][0];
    assert_eq!(
        resource_schema["properties"]["type"]["enum"],
        json!(["OS::Nova::Server"])
    );
    assert_eq!(
        resource_schema["properties"]["properties"],
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "description": "type: string\nrequired: true",
                    "markdownDescription": "*type*: `string`\n\n*required*: `true`",
                    "oneOf": [
                        { "type": "string" },
                        { "$ref": INTRINSIC_FUNCTION }
                    ]
                }
            },
            "required": ["name"],
            "additionalProperties": false
        })
    );
}

#[test]
fn embedded_fragments_carry_the_predefined_definitions() {
    let fragments = Fragments::embedded().expect("embedded fragments");
    for definition in [
        "intrinsic-function",
        "array-with-intrinsic-functions",
        "object-with-intrinsic-functions",
    ] {
        assert!(
            fragments.template["definitions"][definition].is_object(),
            "missing definition {definition}"
        );
    }
    assert_eq!(
        fragments.resource["allOf"][0]["properties"]["type"]["enum"],
        json!([])
    );
}

#[test]
fn compiles_against_the_embedded_fragments() {
    let catalog = load_catalog(json!({
        "resource_types": {
            "OS::Nova::Server": {
                "description": "A server.",
                "properties": {
                    "flavor": { "type": "string", "required": true },
                    "networks": {
                        "type": "list",
                        "schema": {
                            "*": {
                                "type": "map",
                                "schema": {
                                    "network": { "type": "string" },
                                    "port": { "type": "string" }
                                }
                            }
                        }
                    }
                },
                "attributes": {
                    "first_address": { "type": "string" }
                }
            },
            "OS::Cinder::Volume": {
                "description": "A volume."
            }
        }
    }));

    let fragments = Fragments::embedded().expect("embedded fragments");
    let document = compile_catalog(&catalog, fragments).expect("compile");

    // the rest of the template skeleton survives compilation
    assert_eq!(document["title"], json!("Heat Orchestration Template"));
    assert!(document["definitions"]["intrinsic-function"].is_object());

    let one_of = document
        .pointer("/properties/resources/additionalProperties/oneOf")
        .and_then(Value::as_array)
        .expect("discriminator list");
    assert_eq!(one_of.len(), 2);

    // sorted by name: Cinder before Nova
    assert_eq!(
        one_of[0]["allOf"][0]["properties"]["type"]["enum"],
        json!(["OS::Cinder::Volume"])
    );
    assert_eq!(
        one_of[1]["allOf"][0]["properties"]["type"]["enum"],
        json!(["OS::Nova::Server"])
    );

    // the volume type declares no properties, so the skeleton node is kept
    assert_eq!(
        one_of[0]["allOf"][0]["properties"]["properties"],
        json!({ "description": "Resource-type-specific properties.", "type": "object" })
    );

    // the server branch synthesized its property schemas in place
    let server_properties = &one_of[1]["allOf"][0]["properties"]["properties"];
    assert_eq!(server_properties["required"], json!(["flavor"]));
    assert_eq!(
        server_properties["properties"]["networks"]["oneOf"][0]["type"],
        json!("array")
    );
}

#[test]
fn compilation_output_is_byte_identical_across_runs() {
    let catalog = load_catalog(json!({
        "resource_types": {
            "OS::Heat::RandomString": {
                "properties": {
                    "length": { "type": "integer", "default": 32 }
                }
            },
            "OS::Nova::Server": {}
        }
    }));

    let first = compile_catalog(&catalog, Fragments::embedded().expect("fragments")).expect("compile");
    let second = compile_catalog(&catalog, Fragments::embedded().expect("fragments")).expect("compile");
    assert_eq!(
        serde_json::to_vec_pretty(&first).expect("serialize"),
        serde_json::to_vec_pretty(&second).expect("serialize")
    );
}
