//! Placeholder handling for the second prompt pair.
//!
//! Substitution is literal and single-pass per binding: replacement text is
//! never re-scanned, so this is not a templating language. Bindings are
//! applied in lexicographic key order; if one binding's value contains
//! another binding's `${name}` token, the binding applied later wins.
//! The closing bare-`FIRST_RESPONSE` pass runs over the whole result, so it
//! also covers text inserted by bindings, the injected output included.

use super::schema_utils::Issue;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Binding value and bare token meaning "the first call's output".
pub const FIRST_RESPONSE: &str = "FIRST_RESPONSE";

const FIRST_RESPONSE_PLACEHOLDER: &str = "${FIRST_RESPONSE}";

pub const JSON_HEADING: &str = "First response (JSON):";
pub const FALLBACK_HEADING: &str = "First response:";

pub const MIGRATED_PARAMETER_TITLE: &str = "migrated parameter";
pub const MIGRATED_PARAMETER_DETAIL: &str =
    "In the Responses API, 'response_format' has moved to 'text.format'.";

pub const STRUCTURED_OUTPUT_TITLE: &str = "structured outputs error";
pub const STRUCTURED_OUTPUT_DETAIL: &str = r#"Check that the schema only uses the supported subset (objects with additionalProperties:false; every property in "required"; depth ≤ 5; ≤ 100 properties; no anyOf at the root)."#;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));
static RESPONSE_FORMAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)response_format").expect("static regex"));
static STRUCTURED_FORMAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)json_schema|text\.format").expect("static regex"));

/// A system instruction plus user input, ready for the model endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub instructions: String,
    pub input: String,
}

/// Names of every `${name}` token in `template`, first occurrence first.
pub fn extract_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in PLACEHOLDER_RE.captures_iter(template) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replaces `${name}` tokens with their bindings, then any remaining
/// `FIRST_RESPONSE` token with `injected`. Unbound placeholders are left as is.
pub fn substitute(template: &str, bindings: &BTreeMap<String, String>, injected: &str) -> String {
    let mut out = template.to_string();

    for (name, value) in bindings {
        let replacement = if value == FIRST_RESPONSE { injected } else { value.as_str() };
        out = out.replace(&format!("${{{name}}}"), replacement);
    }

    if !bindings.contains_key(FIRST_RESPONSE) {
        out = out.replace(FIRST_RESPONSE_PLACEHOLDER, injected);
    }

    out.replace(FIRST_RESPONSE, injected)
}

/// Wraps JSON output (object or array) in a labeled fence; other text is
/// returned untouched.
pub fn format_injected(raw: &str) -> String {
    let trimmed = raw.trim();
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) if v.is_object() || v.is_array() => {
            format!("{JSON_HEADING}\n```json\n{trimmed}\n```")
        }
        _ => raw.to_string(),
    }
}

/// Builds the second prompt pair. When neither template nor any binding
/// mentions `FIRST_RESPONSE`, the injected value is appended to the input
/// so the first output is not dropped.
pub fn render_second_prompt(
    instructions: &str,
    input: &str,
    bindings: &BTreeMap<String, String>,
    injected: &str,
) -> PromptPair {
    let referenced = instructions.contains(FIRST_RESPONSE)
        || input.contains(FIRST_RESPONSE)
        || bindings.values().any(|v| v.contains(FIRST_RESPONSE));

    let instructions = substitute(instructions, bindings, injected);
    let mut input = substitute(input, bindings, injected);

    if !referenced {
        log::debug!("no FIRST_RESPONSE reference; appending first output to input");
        if !input.is_empty() {
            input.push_str("\n\n");
        }
        input.push_str(FALLBACK_HEADING);
        input.push('\n');
        input.push_str(injected);
    }

    PromptPair { instructions, input }
}

/// Static hints for upstream messages that point at known API migration
/// pitfalls.
pub fn remediation_hints(message: &str) -> Vec<Issue> {
    let mut hints = Vec::new();
    if RESPONSE_FORMAT_RE.is_match(message) {
        hints.push(Issue::new(MIGRATED_PARAMETER_TITLE, MIGRATED_PARAMETER_DETAIL));
    }
    if STRUCTURED_FORMAT_RE.is_match(message) {
        hints.push(Issue::new(STRUCTURED_OUTPUT_TITLE, STRUCTURED_OUTPUT_DETAIL));
    }
    hints
}
