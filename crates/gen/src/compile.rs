//! Resource catalog compilation.
//!
//! Takes a full resource type catalog plus two base fragments and produces
//! the final schema document: one `oneOf` branch per resource type, hung off
//! the template's `resources.additionalProperties` node and discriminated by
//! the `type` property's singleton `enum`.

use hotschema_types::{ResourceTypeCatalog, ResourceTypeDescriptor};
use serde_json::Value;
use thiserror::Error;

use crate::property::object_schema;
use crate::render;

const TEMPLATE_FRAGMENT: &str = include_str!("../fragments/template.json");
const RESOURCE_FRAGMENT: &str = include_str!("../fragments/resource.json");

/// Compilation faults. All of them are unrecoverable: the compiler produces
/// either a complete document or nothing.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A base fragment does not have the structure the compiler relies on.
    /// This is a deployment/programming fault, not a catalog problem.
    #[error("{fragment} fragment is missing the {path} node")]
    MalformedFragment {
        fragment: &'static str,
        path: &'static str,
    },
    #[error("embedded {fragment} fragment does not parse")]
    EmbeddedFragment {
        fragment: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The two externally supplied base documents the compiler works against.
///
/// The template fragment is the overall document skeleton; it must contain a
/// `properties.resources.additionalProperties` object. The resource fragment
/// is the per-resource-type skeleton; its first `allOf` branch must contain a
/// `type` property with an `enum` list. Both are owned values: the compiler
/// clones the resource fragment per branch and consumes the template.
#[derive(Debug, Clone)]
pub struct Fragments {
    pub template: Value,
    pub resource: Value,
}

impl Fragments {
    /// The fragments shipped with this crate, modeling a Heat Orchestration
    /// Template and carrying the three intrinsic-function definitions.
    pub fn embedded() -> Result<Self, CompileError> {
        Ok(Self {
            template: parse_embedded("template", TEMPLATE_FRAGMENT)?,
            resource: parse_embedded("resource", RESOURCE_FRAGMENT)?,
        })
    }
}

fn parse_embedded(fragment: &'static str, text: &str) -> Result<Value, CompileError> {
    serde_json::from_str(text).map_err(|source| CompileError::EmbeddedFragment { fragment, source })
}

/// Compile the catalog into the final schema document.
///
/// Resource types are emitted sorted by name, so the output is deterministic
/// regardless of the catalog's own enumeration order. Each branch is built on
/// an independent deep copy of the resource fragment; the fragments passed in
/// are never shared between branches.
pub fn compile_catalog(catalog: &ResourceTypeCatalog, fragments: Fragments) -> Result<Value, CompileError> {
    let Fragments { mut template, resource } = fragments;

    let mut names: Vec<&String> = catalog.resource_types.keys().collect();
    names.sort();

    let mut branches = Vec::with_capacity(names.len());
    for name in names {
        branches.push(resource_branch(name, &catalog.resource_types[name.as_str()], &resource)?);
    }

    let resources_schema = template
        .pointer_mut("/properties/resources/additionalProperties")
        .and_then(Value::as_object_mut)
        .ok_or(CompileError::MalformedFragment {
            fragment: "template",
            path: "properties.resources.additionalProperties",
        })?;
    resources_schema.insert("oneOf".to_string(), Value::Array(branches));

    Ok(template)
}

/// Build one `oneOf` branch for a resource type on a fresh copy of the
/// resource fragment skeleton.
fn resource_branch(
    name: &str,
    descriptor: &ResourceTypeDescriptor,
    skeleton: &Value,
) -> Result<Value, CompileError> {
    let mut branch = skeleton.clone();

    let schema_properties = branch
        .pointer_mut("/allOf/0/properties")
        .and_then(Value::as_object_mut)
        .ok_or(CompileError::MalformedFragment {
            fragment: "resource",
            path: "allOf[0].properties",
        })?;

    let type_property = schema_properties
        .get_mut("type")
        .and_then(Value::as_object_mut)
        .ok_or(CompileError::MalformedFragment {
            fragment: "resource",
            path: "allOf[0].properties.type",
        })?;
    type_property
        .get_mut("enum")
        .and_then(Value::as_array_mut)
        .ok_or(CompileError::MalformedFragment {
            fragment: "resource",
            path: "allOf[0].properties.type.enum",
        })?
        .push(Value::String(name.to_string()));

    let docs = render::resource_docs(descriptor);
    if let Some(plain) = docs.plain {
        type_property.insert("description".to_string(), Value::String(plain));
    }
    if let Some(markdown) = docs.markdown {
        type_property.insert("markdownDescription".to_string(), Value::String(markdown));
    }

    if let Some(fields) = &descriptor.properties {
        schema_properties.insert("properties".to_string(), object_schema(fields));
    }

    Ok(branch)
}
