use serde_json::{Map, Value};
use std::fmt;

/// Object fields that add-commands sometimes place at the command's top level.
const OBJECT_FIELDS: &[&str] = &["id", "status", "layer", "transform", "semanticTag", "shapes"];
/// Fields that update-commands must carry inside `patch`.
const PATCH_FIELDS: &[&str] = &["transform", "shapes", "layer", "status", "semanticTag"];
/// Commands addressed to an existing object by `id`.
const TARGETED_KINDS: &[&str] = &[
    "update_preview_object",
    "update_object",
    "commit_preview_object",
    "cancel_preview_object",
    "delete_object",
    "set_path",
];

/// One syntactic repair applied by [`normalize_envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    UnwrappedEnvelope,
    WrappedCommandArray,
    WrappedSingleCommand,
    RenamedCommandType,
    RenamedTargetId,
    SynthesizedObject,
    DefaultedStatus,
    FoldedPatch,
    LineEndpointsToPoints,
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnwrappedEnvelope => "unwrapped {envelope: ...}",
            Self::WrappedCommandArray => "wrapped bare command array",
            Self::WrappedSingleCommand => "wrapped bare command",
            Self::RenamedCommandType => "renamed command_type to type",
            Self::RenamedTargetId => "renamed object_id/objectId to id",
            Self::SynthesizedObject => "synthesized missing object wrapper",
            Self::DefaultedStatus => "filled missing object status",
            Self::FoldedPatch => "folded stray fields into patch",
            Self::LineEndpointsToPoints => "converted x1/y1/x2/y2 line to points",
        };
        f.write_str(s)
    }
}

/// Normalized JSON plus the repairs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Value,
    pub repairs: Vec<Repair>,
}

/// Rewrite common malformations of upstream output into the shape the validator expects.
///
/// Only syntax is rewritten; nothing that the safety guard would block becomes authorized.
/// Idempotent: normalizing already-normalized input applies no repairs.
pub fn normalize_envelope(value: Value) -> Normalized {
    let mut repairs = Vec::new();
    let mut value = value;

    while let Value::Object(map) = &mut value {
        if map.contains_key("commands") || !matches!(map.get("envelope"), Some(Value::Object(_))) {
            break;
        }
        let inner = map.remove("envelope").unwrap_or(Value::Null);
        value = inner;
        repairs.push(Repair::UnwrappedEnvelope);
    }

    let mut root = match value {
        Value::Array(items) => {
            repairs.push(Repair::WrappedCommandArray);
            wrap_commands(items)
        }
        Value::Object(map)
            if !map.contains_key("commands")
                && (map.contains_key("type") || map.contains_key("command_type")) =>
        {
            repairs.push(Repair::WrappedSingleCommand);
            wrap_commands(vec![Value::Object(map)])
        }
        Value::Object(map) => map,
        other => {
            return Normalized {
                value: other,
                repairs,
            };
        }
    };

    if let Some(Value::Array(commands)) = root.get_mut("commands") {
        for cmd in commands.iter_mut() {
            normalize_command(cmd, &mut repairs);
        }
    }

    Normalized {
        value: Value::Object(root),
        repairs,
    }
}

fn wrap_commands(items: Vec<Value>) -> Map<String, Value> {
    let mut root = Map::new();
    root.insert("commands".to_string(), Value::Array(items));
    root
}

fn normalize_command(cmd: &mut Value, repairs: &mut Vec<Repair>) {
    let Value::Object(map) = cmd else {
        return;
    };

    if !map.contains_key("type") {
        if let Some(t) = map.remove("command_type") {
            map.insert("type".to_string(), t);
            repairs.push(Repair::RenamedCommandType);
        }
    }

    let kind = match map.get("type").and_then(Value::as_str) {
        Some(k) => k.to_string(),
        None => return,
    };

    if TARGETED_KINDS.contains(&kind.as_str()) && !map.contains_key("id") {
        let alias = map
            .remove("object_id")
            .or_else(|| map.remove("objectId"));
        if let Some(id) = alias {
            map.insert("id".to_string(), id);
            repairs.push(Repair::RenamedTargetId);
        }
    }

    match kind.as_str() {
        "add_preview_object" => normalize_add(map, "preview", repairs),
        "add_object" => normalize_add(map, "committed", repairs),
        "update_preview_object" | "update_object" => normalize_update(map, repairs),
        "batch" => {
            if let Some(Value::Array(inner)) = map.get_mut("commands") {
                for c in inner.iter_mut() {
                    normalize_command(c, repairs);
                }
            }
        }
        _ => {}
    }
}

fn normalize_add(map: &mut Map<String, Value>, status: &str, repairs: &mut Vec<Repair>) {
    if !map.contains_key("object") {
        let mut object = Map::new();
        for key in OBJECT_FIELDS {
            if let Some(v) = map.remove(*key) {
                object.insert((*key).to_string(), v);
            }
        }
        if object.is_empty() {
            return;
        }
        map.insert("object".to_string(), Value::Object(object));
        repairs.push(Repair::SynthesizedObject);
    }

    if let Some(Value::Object(object)) = map.get_mut("object") {
        if !object.contains_key("status") {
            object.insert("status".to_string(), Value::String(status.to_string()));
            repairs.push(Repair::DefaultedStatus);
        }
        normalize_shapes(object.get_mut("shapes"), repairs);
    }
}

fn normalize_update(map: &mut Map<String, Value>, repairs: &mut Vec<Repair>) {
    let mut folded = Map::new();

    for key in PATCH_FIELDS {
        if let Some(v) = map.remove(*key) {
            folded.insert((*key).to_string(), v);
        }
    }

    if let Some(Value::Object(mut object)) = map.remove("object") {
        // Identity never reaches the patch; a nested id only names the target.
        if let Some(id) = object.remove("id") {
            if !map.contains_key("id") {
                map.insert("id".to_string(), id);
                repairs.push(Repair::RenamedTargetId);
            }
        }
        for key in PATCH_FIELDS {
            if let Some(v) = object.remove(*key) {
                folded.entry((*key).to_string()).or_insert(v);
            }
        }
    }

    if !folded.is_empty() {
        let patch = map
            .entry("patch".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(patch) = patch {
            for (k, v) in folded {
                patch.entry(k).or_insert(v);
            }
            repairs.push(Repair::FoldedPatch);
        }
    }

    if let Some(Value::Object(patch)) = map.get_mut("patch") {
        normalize_shapes(patch.get_mut("shapes"), repairs);
    }
}

fn normalize_shapes(shapes: Option<&mut Value>, repairs: &mut Vec<Repair>) {
    let Some(Value::Array(shapes)) = shapes else {
        return;
    };
    for shape in shapes.iter_mut() {
        let Value::Object(s) = shape else {
            continue;
        };
        if s.get("type").and_then(Value::as_str) != Some("line") || s.contains_key("points") {
            continue;
        }
        let coords: Option<Vec<f64>> = ["x1", "y1", "x2", "y2"]
            .iter()
            .map(|k| s.get(*k).and_then(Value::as_f64))
            .collect();
        if let Some(coords) = coords {
            for k in ["x1", "y1", "x2", "y2"] {
                s.remove(k);
            }
            s.insert("points".to_string(), serde_json::json!(coords));
            repairs.push(Repair::LineEndpointsToPoints);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/pass.rs"]
mod tests;
