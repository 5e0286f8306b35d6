//! Checks a user-supplied JSON Schema against the subset accepted by
//! structured outputs: depth ≤ 5, ≤ 100 properties in total, objects closed
//! with `additionalProperties: false` and every property listed in
//! `required`, no `anyOf` at the root, a limited set of types and no
//! validation keywords the endpoint refuses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const MAX_DEPTH: usize = 5;
pub const MAX_TOTAL_PROPERTIES: usize = 100;

const SUPPORTED_TYPES: [&str; 6] = ["string", "number", "integer", "boolean", "object", "array"];

const STRING_DENYLIST: &[&str] = &["minlength", "minLength", "maxLength", "pattern", "format"];
const NUMBER_DENYLIST: &[&str] = &["minimum", "maximum", "multipleOf"];
const OBJECT_DENYLIST: &[&str] = &[
    "patternProperties",
    "unevaluatedProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
];
const ARRAY_DENYLIST: &[&str] = &[
    "unevaluatedItems",
    "contains",
    "minContains",
    "maxContains",
    "minItems",
    "maxItems",
    "uniqueItems",
];

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Issue {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { title: title.into(), detail: Some(detail.into()) }
    }
}

/// Validates a parsed schema document. An empty result means the schema can
/// be attached as an output-shape constraint; anything else rejects it.
pub fn validate_schema(schema: &Value) -> Vec<Issue> {
    let Some(root) = schema.as_object() else {
        return vec![Issue::new("invalid schema", "must be a JSON object")];
    };

    let mut walker = Walker::default();

    if root.contains_key("anyOf") {
        walker
            .issues
            .push(Issue::new("root anyOf not supported", "the root schema cannot be an anyOf"));
    }

    walker.walk(schema, 1, "$");

    if walker.total_properties > MAX_TOTAL_PROPERTIES {
        walker.issues.push(Issue::new(
            "property count exceeded",
            format!(
                "at most {MAX_TOTAL_PROPERTIES} properties are supported in total (found {})",
                walker.total_properties
            ),
        ));
    }

    walker.issues
}

/// Per-call walk state. Never shared between validations.
#[derive(Default)]
struct Walker {
    issues: Vec<Issue>,
    total_properties: usize,
    seen: HashSet<*const Map<String, Value>>,
}

impl Walker {
    fn walk(&mut self, node: &Value, depth: usize, path: &str) {
        let Value::Object(map) = node else { return };

        if !self.seen.insert(map as *const _) {
            return;
        }

        if depth > MAX_DEPTH {
            self.issues.push(Issue::new(
                "depth exceeded",
                format!("maximum nesting depth is {MAX_DEPTH} (at {path})"),
            ));
            return;
        }

        // $ref stays opaque; its target is never expanded from here.
        if map.contains_key("$ref") {
            return;
        }

        self.check_type(map.get("type"), path);

        if let Some(Value::Array(branches)) = map.get("anyOf") {
            for (i, branch) in branches.iter().enumerate() {
                self.walk(branch, depth + 1, &format!("{path}.anyOf[{i}]"));
            }
        }

        if let Some(Value::Object(defs)) = map.get("$defs") {
            for (name, def) in defs {
                self.walk(def, depth + 1, &format!("{path}.$defs.{name}"));
            }
        }

        match map.get("type").and_then(Value::as_str) {
            Some("string") => self.deny_keywords(map, STRING_DENYLIST, path),
            Some("number") | Some("integer") => self.deny_keywords(map, NUMBER_DENYLIST, path),
            Some("object") => {
                self.deny_keywords(map, OBJECT_DENYLIST, path);
                self.check_object(map, depth, path);
            }
            Some("array") => {
                self.deny_keywords(map, ARRAY_DENYLIST, path);
                match map.get("items") {
                    Some(items) => self.walk(items, depth + 1, &format!("{path}[]")),
                    None => self.issues.push(Issue::new(
                        "missing items",
                        format!("arrays must declare \"items\" ({path})"),
                    )),
                }
            }
            _ => {}
        }
    }

    fn check_type(&mut self, declared: Option<&Value>, path: &str) {
        match declared {
            Some(Value::String(t)) => self.check_type_symbol(t, path),
            Some(Value::Array(types)) => {
                for t in types {
                    match t.as_str() {
                        Some(t) => self.check_type_symbol(t, path),
                        None => self.issues.push(Issue::new(
                            "unsupported type",
                            format!("non-string type entry {t} at {path}"),
                        )),
                    }
                }
            }
            _ => {}
        }
    }

    fn check_type_symbol(&mut self, t: &str, path: &str) {
        if t != "null" && !SUPPORTED_TYPES.contains(&t) {
            self.issues.push(Issue::new(
                "unsupported type",
                format!("type \"{t}\" at {path} is not supported"),
            ));
        }
    }

    fn deny_keywords(&mut self, map: &Map<String, Value>, denylist: &[&str], path: &str) {
        for keyword in denylist {
            if map.contains_key(*keyword) {
                self.issues.push(Issue::new(
                    "unsupported keyword",
                    format!("{keyword} is not supported at {path}"),
                ));
            }
        }
    }

    fn check_object(&mut self, map: &Map<String, Value>, depth: usize, path: &str) {
        if map.get("additionalProperties") != Some(&Value::Bool(false)) {
            self.issues.push(Issue::new(
                "additionalProperties required",
                format!("set \"additionalProperties\": false at {path}"),
            ));
        }

        let empty = Map::new();
        let properties = map.get("properties").and_then(Value::as_object).unwrap_or(&empty);
        self.total_properties += properties.len();

        let required: HashSet<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        for name in properties.keys() {
            if !required.contains(name.as_str()) {
                self.issues.push(Issue::new(
                    "missing from required",
                    format!("property \"{name}\" at {path} must be listed in \"required\""),
                ));
            }
        }

        for (name, child) in properties {
            self.walk(child, depth + 1, &format!("{path}.{name}"));
        }
    }
}
