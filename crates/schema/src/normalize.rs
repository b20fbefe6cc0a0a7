//! Trimming raw CloudFormation resource schemas for use as model context.
//!
//! AWS's provider schemas carry handler permissions, transform rules and
//! `$ref`-linked definitions. The model only needs the property surface, so
//! each document is reduced to that, with definitions inlined where they are
//! referenced.

use serde_json::{Map, Value};

/// Keys that say nothing about how to write a template.
const DROPPED_KEYS: &[&str] = &["handlers", "propertyTransforms", "sourceUrl"];

/// Keys hoisted to the top, in this order. Everything else follows in its
/// original order.
const LEADING_KEYS: &[&str] = &[
    "typeName",
    "description",
    "properties",
    "definitions",
    "createOnlyProperties",
    "additionalProperties",
    "readOnlyProperties",
    "writeOnlyProperties",
];

/// Clean up a schema and inline its definitions.
pub fn normalize_schema(schema: Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(inline_definitions(cleanup(map))),
        other => other,
    }
}

/// Drop noise keys, hoist the interesting ones, and leave out hoisted keys
/// that are empty or false (`additionalProperties: false` included).
pub fn cleanup(mut schema: Map<String, Value>) -> Map<String, Value> {
    for key in DROPPED_KEYS {
        schema.shift_remove(*key);
    }

    let mut sorted = Map::new();
    for key in LEADING_KEYS {
        if let Some(value) = schema.shift_remove(*key)
            && is_truthy(&value)
        {
            sorted.insert((*key).to_string(), value);
        }
    }

    sorted.extend(schema);
    sorted
}

/// Replace every `{"$ref": "#/definitions/Name"}` under `properties` with
/// `{"$ref": "Name", ...definition}` and remove `definitions`.
///
/// Only one level is inlined: definitions that reference other definitions
/// keep those inner `$ref`s as they are.
pub fn inline_definitions(mut schema: Map<String, Value>) -> Map<String, Value> {
    let definitions = match schema.shift_remove("definitions") {
        Some(Value::Object(defs)) => defs,
        _ => Map::new(),
    };

    let properties = schema
        .shift_remove("properties")
        .unwrap_or_else(|| Value::Object(Map::new()));
    let mut pending = Some(replace_refs(properties, &definitions));

    // Put `properties` back in its hoisted slot.
    let mut out = Map::new();
    for (key, value) in schema {
        if !is_before_properties(&key)
            && let Some(properties) = pending.take()
        {
            out.insert("properties".into(), properties);
        }
        out.insert(key, value);
    }
    if let Some(properties) = pending {
        out.insert("properties".into(), properties);
    }
    out
}

fn is_before_properties(key: &str) -> bool {
    matches!(key, "typeName" | "description")
}

fn replace_refs(value: Value, definitions: &Map<String, Value>) -> Value {
    match value {
        Value::Object(obj) => {
            if let Some(target) = obj.get("$ref").and_then(Value::as_str) {
                let name = target.rsplit('/').next().unwrap_or(target);
                if let Some(def) = definitions.get(name) {
                    let mut inlined = Map::new();
                    inlined.insert("$ref".into(), Value::String(name.to_string()));
                    if let Value::Object(fields) = def {
                        inlined.extend(fields.clone());
                    }
                    return Value::Object(inlined);
                }
            }
            Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, replace_refs(v, definitions)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| replace_refs(v, definitions))
                .collect(),
        ),
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
