/*!
shared.rs - helpers shared by the `tools` and `call` subcommands.

  - parse_param_pairs / load_param_file_into_map: collect raw KEY=VALUE input
  - find_tool_case_insensitive: look a tool up in the advertised catalog
  - build_arguments_from_schema + coerce_value: turn raw strings into the
    JSON object a tool's input schema expects
  - param_summary: "name:type" list for table output
*/

use anyhow::{Context, Result, bail};
use rmcp::model::Tool;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/* ---- Raw parameter collection ---- */

/// Parse repeated `KEY=VALUE` flags. Keys and values are trimmed.
pub fn parse_param_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut provided = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --param (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.trim().to_string());
    }
    Ok(provided)
}

/// Merge a JSON or YAML object file into `provided`. Existing keys win.
pub fn load_param_file_into_map(path: &Path, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let Some(obj) = value.as_object() else {
        bail!("param file root must be an object");
    };
    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            Value::String(sv) => sv.clone(),
            other => other.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/* ---- Catalog lookups ---- */

pub fn find_tool_case_insensitive<'a>(tools: &'a [Tool], name: &str) -> Option<&'a Tool> {
    tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Declared primitive type of a schema property. Nullable unions such as
/// `["string", "null"]` resolve to their non-null member.
fn property_type(prop: &Value) -> &str {
    match prop.get("type") {
        Some(Value::String(t)) => t.as_str(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("string"),
        _ => "string",
    }
}

/// `name:type` for each schema property, in schema order.
pub fn param_summary(schema: &Map<String, Value>) -> Vec<String> {
    let required = required_names(schema);
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| {
                    let marker = if required.contains(name.as_str()) { "" } else { "?" };
                    format!("{name}{marker}:{}", property_type(prop))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn required_names(schema: &Map<String, Value>) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/* ---- Argument building ---- */

/// Build a tool's argument object from raw strings.
///
/// Each schema property present in `provided` is coerced by its declared
/// type; a required property that is absent is an error. Keys unknown to the
/// schema pass through as strings so the tool itself reports them.
pub fn build_arguments_from_schema(
    schema: &Map<String, Value>,
    provided: &HashMap<String, String>,
) -> Result<Map<String, Value>> {
    let required = required_names(schema);
    let mut remaining = provided.clone();
    let mut result = Map::new();

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (pname, pobj) in props {
            if let Some(raw) = remaining.remove(pname) {
                result.insert(pname.clone(), coerce_value(&raw, property_type(pobj)));
            } else if required.contains(pname.as_str()) {
                bail!("missing required parameter: {pname}");
            }
        }
    }

    for (k, v) in remaining {
        result.insert(k, Value::String(v));
    }
    Ok(result)
}

/// Coerce a raw string by a primitive type hint; unparsable input stays a string.
pub fn coerce_value(raw: &str, type_hint: &str) -> Value {
    match type_hint {
        "integer" => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        "array" => Value::Array(
            raw.split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .collect(),
        ),
        _ => Value::String(raw.to_string()),
    }
}
