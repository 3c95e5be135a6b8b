//! Data model for OpenStack Heat resource type catalogs.
//!
//! A catalog maps resource type names (e.g. `OS::Nova::Server`) to
//! descriptors of their configuration properties and output attributes, as
//! returned by the orchestration service's `resource_types` endpoints. The
//! shapes here mirror the wire format; higher-level interpretation (schema
//! synthesis) lives in `hotschema-gen`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the wildcard entry in a property's nested schema, denoting "every
/// element/value conforms to this one descriptor".
pub const WILDCARD_KEY: &str = "*";

/// The primitive kinds a property or attribute may declare.
///
/// Wire names are the Heat property-type names; [`PropertyKind::json_type`]
/// maps each kind to the corresponding JSON Schema type. A kind outside this
/// set fails catalog deserialization, which is the desired behavior: such a
/// catalog is malformed and compilation must not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Integer,
    Number,
    Boolean,
    List,
    Map,
}

impl PropertyKind {
    /// The Heat-side name of the kind, as it appears in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Map => "map",
        }
    }

    /// The JSON Schema `type` this kind maps to.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "array",
            Self::Map => "object",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full resource type catalog, the top-level input document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTypeCatalog {
    pub resource_types: IndexMap<String, ResourceTypeDescriptor>,
}

/// One resource type: its documentation, support status, configuration
/// properties and output attributes. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTypeDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle metadata reported by the service. Carried through catalogs
    /// but not interpreted by the schema compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_status: Option<SupportStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, PropertyDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, AttributeDescriptor>>,
}

/// A configuration property of a resource type.
///
/// `schema` is only meaningful for composite kinds: a `list` or `map` with a
/// [`WILDCARD_KEY`] entry describes a uniform element/value type, and a `map`
/// with named entries describes a fixed shape. [`PropertyDescriptor::shape`]
/// resolves which interpretation applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<IndexMap<String, PropertyDescriptor>>,
    #[serde(default)]
    pub required: bool,
    /// Value constraints (allowed values, ranges, patterns). Carried through
    /// catalogs but not interpreted by the schema compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Value>>,
    #[serde(default)]
    pub update_allowed: bool,
    #[serde(default)]
    pub immutable: bool,
}

/// An output attribute of a resource type. Attributes never carry a nested
/// schema; only their kind and description matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Support lifecycle metadata of a resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SupportStatusKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<Box<SupportStatus>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportStatusKind {
    Unknown,
    Supported,
    Deprecated,
    Unsupported,
    Hidden,
}

/// One entry of the orchestration service's resource type listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTypeSummary {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The resolved interpretation of a [`PropertyDescriptor`].
///
/// Resolution happens once per descriptor; consumers match on the variant
/// instead of re-probing `kind` and `schema` at every use site.
#[derive(Debug, Clone, Copy)]
pub enum PropertyShape<'a> {
    /// A scalar kind, or a bare `list`/`map` never reaches here.
    Primitive(PropertyKind),
    /// `list` whose elements all conform to one descriptor.
    UniformList(&'a PropertyDescriptor),
    /// `list` with no element schema.
    UnconstrainedList,
    /// `map` whose values all conform to one descriptor.
    UniformMap(&'a PropertyDescriptor),
    /// `map` with a fixed set of named sub-properties.
    FixedMap(&'a IndexMap<String, PropertyDescriptor>),
    /// `map` with no value schema.
    UnconstrainedMap,
    /// No kind declared at all.
    Untyped,
}

impl PropertyDescriptor {
    /// Resolve this descriptor's shape.
    ///
    /// For composite kinds the wildcard entry takes precedence over a
    /// fixed-shape `schema`; a `list` never has a fixed shape, so a
    /// non-wildcard schema on a list is ignored.
    pub fn shape(&self) -> PropertyShape<'_> {
        let wildcard = self.schema.as_ref().and_then(|schema| schema.get(WILDCARD_KEY));
        match self.kind {
            Some(PropertyKind::List) => match wildcard {
                Some(item) => PropertyShape::UniformList(item),
                None => PropertyShape::UnconstrainedList,
            },
            Some(PropertyKind::Map) => match (wildcard, self.schema.as_ref()) {
                (Some(value), _) => PropertyShape::UniformMap(value),
                (None, Some(fields)) => PropertyShape::FixedMap(fields),
                (None, None) => PropertyShape::UnconstrainedMap,
            },
            Some(kind) => PropertyShape::Primitive(kind),
            None => PropertyShape::Untyped,
        }
    }
}

/// Common view over property and attribute descriptors for documentation
/// rendering: both expose a kind and a description.
pub trait CatalogEntry {
    fn kind(&self) -> Option<PropertyKind>;
    fn description(&self) -> Option<&str>;
}

impl CatalogEntry for PropertyDescriptor {
    fn kind(&self) -> Option<PropertyKind> {
        self.kind
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl CatalogEntry for AttributeDescriptor {
    fn kind(&self) -> Option<PropertyKind> {
        self.kind
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
