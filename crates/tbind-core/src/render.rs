//! Rendering contexts and the template-engine wrapper.
//!
//! Templates see the model through plain data contexts built here: one JSON
//! object per class (or per batched extraction) exposing name variants, type
//! variants, and separators. Type-name display is a two-stage resolution:
//! the output's override table first, then a deterministic fallback
//! transform of the normalized name.

use handlebars::Handlebars;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::model::{Argument, Class, ClassRegistry, Extraction, Method};

/// Wrapper around the template engine, configured for code generation
/// (no HTML escaping).
pub struct Renderer {
    hbs: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer with escaping disabled.
    #[must_use]
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Parses and registers a template under a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the template source fails to parse.
    pub fn register_template(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<(), handlebars::TemplateError> {
        self.hbs.register_template_string(name, source)
    }

    /// Renders a registered template against a context.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&self, name: &str, ctx: &Value) -> Result<String, handlebars::RenderError> {
        self.hbs.render(name, ctx)
    }

    /// Renders an unregistered template string against a context. Used for
    /// per-class output path patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to parse or render.
    pub fn render_inline(
        &self,
        template: &str,
        ctx: &Value,
    ) -> Result<String, handlebars::RenderError> {
        self.hbs.render_template(template, ctx)
    }
}

/// Builds the data context for one class, honoring the output's type
/// remapping table.
#[must_use]
pub fn class_context(class: &Class, types: &HashMap<String, String>) -> Value {
    json!({
        "class_name": class.name,
        "class_name_camel_case": camel_case(&class.name),
        "class_base_name": class.base_name.as_deref().unwrap_or("void"),
        "methods": class
            .methods
            .iter()
            .map(|m| method_context(m, types))
            .collect::<Vec<_>>(),
    })
}

/// Builds the data context for one batched extraction: the accumulated
/// classes in first-encountered order.
#[must_use]
pub fn extraction_context(
    extraction: &Extraction,
    registry: &ClassRegistry,
    types: &HashMap<String, String>,
) -> Value {
    json!({
        "classes": extraction
            .ids()
            .iter()
            .map(|&id| class_context(registry.get(id), types))
            .collect::<Vec<_>>(),
    })
}

fn method_context(method: &Method, types: &HashMap<String, String>) -> Value {
    json!({
        "method_name": method.name,
        "method_other_name": method.visible_name,
        "method_name_camel_case": camel_case(&method.name),
        "method_other_name_camel_case": camel_case(&method.visible_name),
        "method_return": if method.return_type == "void" { "" } else { "return " },
        "method_const_qualifier": if method.is_const { " const" } else { "" },
        "result_type": resolve_display(types, &method.return_type, verbatim),
        "result_type_pascal_case": resolve_display(types, &method.return_type, pascal_case),
        "result_full_type": method.return_full_type,
        "arguments": method
            .arguments
            .iter()
            .map(|a| argument_context(a, types))
            .collect::<Vec<_>>(),
    })
}

fn argument_context(arg: &Argument, types: &HashMap<String, String>) -> Value {
    json!({
        "argument_name": arg.name,
        "argument_type": resolve_display(types, &arg.type_name, verbatim),
        "argument_type_pascal_case": resolve_display(types, &arg.type_name, pascal_case),
        "argument_full_type": arg.full_type,
        "comma": if arg.last { "" } else { ", " },
    })
}

/// Two-stage type display resolution: the override table wins, otherwise
/// the fallback transform of the normalized name applies.
fn resolve_display(
    types: &HashMap<String, String>,
    name: &str,
    fallback: fn(&str) -> String,
) -> String {
    types
        .get(name)
        .cloned()
        .unwrap_or_else(|| fallback(name))
}

fn verbatim(name: &str) -> String {
    name.to_string()
}

fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
