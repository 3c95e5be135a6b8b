//! Documentation rendering for synthesized schema nodes.
//!
//! Every description is produced in two variants at once: a plain-text
//! rendering for the JSON Schema `description` keyword and a markdown
//! rendering for `markdownDescription` (honored by editors such as VS Code).
//! An empty rendering yields `None`, never an empty string, so callers can
//! omit the keyword entirely.

use hotschema_types::{CatalogEntry, PropertyDescriptor, ResourceTypeDescriptor};
use indexmap::IndexMap;
use serde_json::Value;

/// A description rendered in both output dialects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDoc {
    pub plain: Option<String>,
    pub markdown: Option<String>,
}

/// Render the documentation block for one property descriptor: its
/// description followed by the metadata lines that are present and truthy,
/// in fixed order.
pub fn property_docs(descriptor: &PropertyDescriptor) -> RenderedDoc {
    let mut doc = DocBuilder::default();
    if let Some(text) = &descriptor.description {
        doc.paragraph(text);
    }
    if let Some(kind) = descriptor.kind {
        doc.field("type", kind.as_str());
    }
    if descriptor.required {
        doc.field("required", "true");
    }
    if let Some(default) = &descriptor.default
        && is_truthy(default)
    {
        doc.field("default", &pretty_value(default));
    }
    if descriptor.update_allowed {
        doc.field("update_allowed", "true");
    }
    if descriptor.immutable {
        doc.field("immutable", "true");
    }
    doc.finish()
}

/// Render the documentation block for a whole resource type: its description
/// plus "Properties" and "Output Attributes" listings.
pub fn resource_docs(descriptor: &ResourceTypeDescriptor) -> RenderedDoc {
    let mut doc = DocBuilder::default();
    if let Some(text) = &descriptor.description {
        doc.paragraph(text);
    }
    if let Some(properties) = &descriptor.properties {
        doc.entry_list("Properties", properties);
    }
    if let Some(attributes) = &descriptor.attributes {
        doc.entry_list("Output Attributes", attributes);
    }
    doc.finish()
}

/// Collapse paragraphs for single-line-oriented consumers: double newlines
/// become single newlines, single newlines become spaces.
pub fn compact_paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Accumulates documentation items in both dialects simultaneously.
///
/// Plain items are joined by single newlines; markdown items are separated by
/// blank lines so each renders as its own paragraph.
#[derive(Debug, Default)]
struct DocBuilder {
    plain: Vec<String>,
    markdown: Vec<String>,
}

impl DocBuilder {
    fn paragraph(&mut self, text: &str) {
        self.plain.push(compact_paragraphs(text));
        self.markdown.push(text.to_string());
    }

    fn field(&mut self, label: &str, value: &str) {
        self.plain.push(format!("{label}: {value}"));
        self.markdown.push(format!("*{label}*: `{value}`"));
    }

    /// A heading plus one bullet per entry, sorted by name. Empty maps render
    /// nothing at all, not a bare heading.
    fn entry_list<E: CatalogEntry>(&mut self, heading: &str, entries: &IndexMap<String, E>) {
        if entries.is_empty() {
            return;
        }
        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();

        let mut plain_bullets = Vec::with_capacity(names.len());
        let mut markdown_bullets = Vec::with_capacity(names.len());
        for name in names {
            let entry = &entries[name.as_str()];
            let description = entry.description().map(compact_paragraphs);

            let mut plain = format!("* {name}");
            let mut markdown = format!("* **{name}**");
            if let Some(kind) = entry.kind() {
                plain.push_str(&format!(": {kind}"));
                markdown.push_str(&format!(": `{kind}`"));
            }
            if let Some(description) = description.filter(|text| !text.is_empty()) {
                plain.push_str(&format!(" - {description}"));
                markdown.push_str(&format!(" - {description}"));
            }
            plain_bullets.push(plain);
            markdown_bullets.push(markdown);
        }

        self.plain.push(format!("{heading}:\n{}", plain_bullets.join("\n")));
        self.markdown.push(format!("### {heading}\n\n{}", markdown_bullets.join("\n")));
    }

    fn finish(self) -> RenderedDoc {
        RenderedDoc {
            plain: non_empty(self.plain.join("\n")),
            markdown: non_empty(self.markdown.join("\n\n")),
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn pretty_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Truthiness in the sense of the catalog wire format: `null`, `false`, zero
/// and the empty string suppress their metadata line.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(truth) => *truth,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
