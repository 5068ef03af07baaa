//! Prompt-template variable analysis
//!
//! Walks a compiled handlebars template and collects every variable/path
//! reference in value positions and block-helper subjects/parameters,
//! recursing through block bodies, else/inverse branches, and
//! subexpressions. Built-in control-flow helper names are control
//! constructs, not data references, and are excluded.

use handlebars::template::{HelperTemplate, Parameter, Template, TemplateElement};
use handlebars::Path;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fixed control-flow helpers that never count as variables
const BUILT_IN_HELPERS: [&str; 6] = ["if", "unless", "each", "with", "lookup", "log"];

/// What a prompt template references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    /// Referenced variable names, de-duplicated, first occurrence first
    pub variables: Vec<String>,
    /// True iff any referenced name starts with `docs`
    pub uses_docs: bool,
    /// True iff any referenced name starts with `history`
    pub uses_history: bool,
}

/// Analyze a prompt template's variable references
///
/// Malformed template syntax propagates as the engine's parse error.
pub fn parse_prompt_template(template: &str) -> Result<PromptInfo> {
    let compiled = Template::compile(template)?;

    let mut variables = Vec::new();
    collect_template(&compiled, &mut variables);

    let uses_docs = variables.iter().any(|name| name.starts_with("docs"));
    let uses_history = variables.iter().any(|name| name.starts_with("history"));

    Ok(PromptInfo {
        variables,
        uses_docs,
        uses_history,
    })
}

fn collect_template(template: &Template, variables: &mut Vec<String>) {
    for element in &template.elements {
        collect_element(element, variables);
    }
}

fn collect_element(element: &TemplateElement, variables: &mut Vec<String>) {
    match element {
        TemplateElement::Expression(helper)
        | TemplateElement::HtmlExpression(helper)
        | TemplateElement::HelperBlock(helper) => collect_helper(helper, variables),
        // Raw content, comments, partials, decorators carry no data references.
        _ => {}
    }
}

fn collect_helper(helper: &HelperTemplate, variables: &mut Vec<String>) {
    collect_parameter(&helper.name, variables);
    for param in &helper.params {
        collect_parameter(param, variables);
    }
    for value in helper.hash.values() {
        collect_parameter(value, variables);
    }
    if let Some(body) = &helper.template {
        collect_template(body, variables);
    }
    if let Some(inverse) = &helper.inverse {
        collect_template(inverse, variables);
    }
}

fn collect_parameter(parameter: &Parameter, variables: &mut Vec<String>) {
    match parameter {
        Parameter::Name(name) => record_variable(name, variables),
        Parameter::Path(path) => record_variable(path_raw(path), variables),
        Parameter::Subexpression(sub) => collect_element(sub.as_element(), variables),
        Parameter::Literal(_) => {}
    }
}

/// Raw textual form of a compiled handlebars path.
///
/// Mirrors the engine's own (crate-private) `Path::raw`: both variants carry
/// the original source string as their last tuple field.
fn path_raw(path: &Path) -> &str {
    match path {
        Path::Relative((_, raw)) => raw,
        Path::Local((_, _, raw)) => raw,
    }
}

fn record_variable(name: &str, variables: &mut Vec<String>) {
    if name.is_empty() || BUILT_IN_HELPERS.contains(&name) {
        return;
    }
    // Scope and data references (`this`, `.`, `@index`, ..) point at the
    // iteration context, not caller-supplied data.
    if name == "this" || name == "." || name.starts_with('@') {
        return;
    }
    if !variables.iter().any(|existing| existing == name) {
        variables.push(name.to_string());
    }
}
