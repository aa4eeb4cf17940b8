use crate::foundation::config::Limits;
use crate::foundation::core::{Transform, TransformPatch};
use crate::scene::command::{CommandEnvelope, DrawingCommand, ObjectPatch};
use crate::scene::model::{
    GradientStops, Layer, ObjectStatus, SceneIntent, SceneObject, ShapeStyle, VectorShape,
};
use kurbo::BezPath;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

/// First grammar violation found in a candidate envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    pub path: Vec<SchemaPathElem>,
    pub message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// The violated field path rendered as `$.commands[0].object.id`.
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

impl std::error::Error for SchemaError {}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

fn child(path: &[SchemaPathElem], elem: SchemaPathElem) -> Vec<SchemaPathElem> {
    [path, &[elem]].concat()
}

type Check<T> = Result<T, SchemaError>;

/// Validate an arbitrary JSON value against the command grammar and return the typed envelope.
///
/// This is the single gate between untrusted JSON and typed commands; it never panics and
/// reports the first violated field path.
pub fn validate_envelope(value: &Value, limits: &Limits) -> Check<CommandEnvelope> {
    let root = as_object(value, &[], "envelope must be a JSON object")?;

    let refused = match root.get("refused") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(SchemaError::at(
                &[SchemaPathElem::Field("refused")],
                "refused must be a boolean",
            ));
        }
    };
    let notes = optional_string(root, "notes", &[])?;
    let refusal_reason = optional_string(root, "refusalReason", &[])?;

    let commands_path = [SchemaPathElem::Field("commands")];
    let raw_commands: &[Value] = match root.get("commands") {
        None if refused => &[],
        None => return Err(SchemaError::at(&commands_path, "commands is required")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SchemaError::at(&commands_path, "commands must be an array")),
    };

    if refused && !raw_commands.is_empty() {
        return Err(SchemaError::at(
            &commands_path,
            "refused envelopes must carry an empty command list",
        ));
    }

    let total = count_raw_commands(raw_commands);
    if total > limits.max_commands {
        return Err(SchemaError::at(
            &commands_path,
            format!(
                "too many commands ({total}); at most {} are accepted per envelope",
                limits.max_commands
            ),
        ));
    }

    let commands = validate_command_list(raw_commands, &commands_path, 0, limits)?;
    Ok(CommandEnvelope {
        commands,
        notes,
        refused,
        refusal_reason,
    })
}

fn count_raw_commands(items: &[Value]) -> usize {
    items
        .iter()
        .map(|c| match c.get("commands").and_then(Value::as_array) {
            Some(inner) if c.get("type").and_then(Value::as_str) == Some("batch") => {
                1 + count_raw_commands(inner)
            }
            _ => 1,
        })
        .sum()
}

fn validate_command_list(
    items: &[Value],
    path: &[SchemaPathElem],
    depth: usize,
    limits: &Limits,
) -> Check<Vec<DrawingCommand>> {
    items
        .iter()
        .enumerate()
        .map(|(i, c)| validate_command(c, &child(path, SchemaPathElem::Index(i)), depth, limits))
        .collect()
}

fn validate_command(
    value: &Value,
    path: &[SchemaPathElem],
    depth: usize,
    limits: &Limits,
) -> Check<DrawingCommand> {
    let obj = as_object(value, path, "command must be an object")?;
    let kind = match obj.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("type")),
                "command type must be a string",
            ));
        }
        None => {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("type")),
                "command type is required",
            ));
        }
    };

    let cmd = match kind {
        "set_scene_intent" => {
            let intent = match obj.get("intent") {
                None | Some(Value::Null) => None,
                Some(v) => Some(parse_at::<SceneIntent>(
                    v,
                    &child(path, SchemaPathElem::Field("intent")),
                )?),
            };
            DrawingCommand::SetSceneIntent { intent }
        }
        "add_preview_object" => DrawingCommand::AddPreviewObject {
            object: validate_object(obj, path, ObjectStatus::Preview, kind, limits)?,
        },
        "add_object" => DrawingCommand::AddObject {
            object: validate_object(obj, path, ObjectStatus::Committed, kind, limits)?,
        },
        "update_preview_object" => DrawingCommand::UpdatePreviewObject {
            id: required_id(obj, "id", path)?,
            patch: validate_patch(obj, path, limits)?,
        },
        "update_object" => DrawingCommand::UpdateObject {
            id: required_id(obj, "id", path)?,
            patch: validate_patch(obj, path, limits)?,
        },
        "commit_preview_object" => DrawingCommand::CommitPreviewObject {
            id: required_id(obj, "id", path)?,
        },
        "cancel_preview_object" => DrawingCommand::CancelPreviewObject {
            id: required_id(obj, "id", path)?,
        },
        "delete_object" => DrawingCommand::DeleteObject {
            id: required_id(obj, "id", path)?,
        },
        "set_background_gradient" => {
            let stops_path = child(path, SchemaPathElem::Field("stops"));
            let v = obj
                .get("stops")
                .ok_or_else(|| SchemaError::at(&stops_path, "stops is required"))?;
            let stops = parse_at::<GradientStops>(v, &stops_path)?;
            if stops.0.len() < 2 {
                return Err(SchemaError::at(&stops_path, "at least two stops are required"));
            }
            check_stops(&stops, &stops_path)?;
            DrawingCommand::SetBackgroundGradient { stops }
        }
        "set_ground_fill" => DrawingCommand::SetGroundFill {
            fill: required_id(obj, "fill", path)?,
        },
        "set_path" => {
            let d = required_id(obj, "d", path)?;
            check_path_data(&d, &child(path, SchemaPathElem::Field("d")))?;
            DrawingCommand::SetPath {
                id: required_id(obj, "id", path)?,
                shape_id: required_id(obj, "shapeId", path)?,
                d,
            }
        }
        "batch" => {
            let inner_path = child(path, SchemaPathElem::Field("commands"));
            if depth + 1 > limits.max_batch_depth {
                return Err(SchemaError::at(
                    &inner_path,
                    format!("batch nesting exceeds depth {}", limits.max_batch_depth),
                ));
            }
            let items = match obj.get("commands") {
                Some(Value::Array(items)) => items,
                _ => return Err(SchemaError::at(&inner_path, "batch commands must be an array")),
            };
            DrawingCommand::Batch {
                commands: validate_command_list(items, &inner_path, depth + 1, limits)?,
            }
        }
        other => {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("type")),
                format!("unknown command type \"{other}\""),
            ));
        }
    };
    Ok(cmd)
}

fn validate_object(
    cmd: &Map<String, Value>,
    cmd_path: &[SchemaPathElem],
    expected: ObjectStatus,
    kind: &str,
    limits: &Limits,
) -> Check<SceneObject> {
    let path = child(cmd_path, SchemaPathElem::Field("object"));
    let value = cmd
        .get("object")
        .ok_or_else(|| SchemaError::at(&path, format!("{kind} requires an object")))?;
    let obj = as_object(value, &path, "object must be an object")?;

    let id = required_id(obj, "id", &path)?;

    let status_path = child(&path, SchemaPathElem::Field("status"));
    let status_value = obj
        .get("status")
        .ok_or_else(|| SchemaError::at(&status_path, "status is required"))?;
    let status = parse_at::<ObjectStatus>(status_value, &status_path)?;
    if status != expected {
        return Err(SchemaError::at(
            &status_path,
            format!("{kind} requires status \"{}\"", expected.as_str()),
        ));
    }

    let layer = match obj.get("layer") {
        None | Some(Value::Null) => Layer::default(),
        Some(v) => parse_at::<Layer>(v, &child(&path, SchemaPathElem::Field("layer")))?,
    };
    let transform = match obj.get("transform") {
        None | Some(Value::Null) => Transform::IDENTITY,
        Some(v) => parse_at::<Transform>(v, &child(&path, SchemaPathElem::Field("transform")))?,
    };
    let semantic_tag = optional_string(obj, "semanticTag", &path)?;

    let shapes_path = child(&path, SchemaPathElem::Field("shapes"));
    let shapes = match obj.get("shapes") {
        Some(v) => validate_shapes(v, &shapes_path, limits)?,
        None => return Err(SchemaError::at(&shapes_path, "shapes is required")),
    };

    Ok(SceneObject {
        id,
        status,
        layer,
        transform,
        semantic_tag,
        shapes,
    })
}

fn validate_patch(
    cmd: &Map<String, Value>,
    cmd_path: &[SchemaPathElem],
    limits: &Limits,
) -> Check<ObjectPatch> {
    let path = child(cmd_path, SchemaPathElem::Field("patch"));
    let value = cmd
        .get("patch")
        .ok_or_else(|| SchemaError::at(&path, "patch is required"))?;
    let obj = as_object(value, &path, "patch must be an object")?;

    for (key, field) in [("id", SchemaPathElem::Field("id")), ("type", SchemaPathElem::Field("type"))] {
        if obj.contains_key(key) {
            return Err(SchemaError::at(
                &child(&path, field),
                format!("patch may not modify \"{key}\""),
            ));
        }
    }

    let layer = match obj.get("layer") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_at::<Layer>(v, &child(&path, SchemaPathElem::Field("layer")))?),
    };
    let status = match obj.get("status") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_at::<ObjectStatus>(
            v,
            &child(&path, SchemaPathElem::Field("status")),
        )?),
    };
    let transform = match obj.get("transform") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_at::<TransformPatch>(
            v,
            &child(&path, SchemaPathElem::Field("transform")),
        )?),
    };
    let semantic_tag = optional_string(obj, "semanticTag", &path)?;
    let shapes = match obj.get("shapes") {
        None | Some(Value::Null) => None,
        Some(v) => Some(validate_shapes(
            v,
            &child(&path, SchemaPathElem::Field("shapes")),
            limits,
        )?),
    };

    Ok(ObjectPatch {
        layer,
        status,
        transform,
        semantic_tag,
        shapes,
    })
}

fn validate_shapes(
    value: &Value,
    path: &[SchemaPathElem],
    limits: &Limits,
) -> Check<Vec<VectorShape>> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(SchemaError::at(path, "shapes must be an array")),
    };
    if items.is_empty() || items.len() > limits.max_shapes_per_object {
        return Err(SchemaError::at(
            path,
            format!(
                "objects must have between 1 and {} shapes (got {})",
                limits.max_shapes_per_object,
                items.len()
            ),
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut shapes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let shape_path = child(path, SchemaPathElem::Index(i));
        let shape = validate_shape(item, &shape_path)?;
        if !seen.insert(shape.id().to_string()) {
            return Err(SchemaError::at(
                &child(&shape_path, SchemaPathElem::Field("id")),
                format!("duplicate shape id \"{}\"", shape.id()),
            ));
        }
        shapes.push(shape);
    }
    Ok(shapes)
}

const SHAPE_KINDS: &[&str] = &[
    "rect", "circle", "ellipse", "line", "polyline", "polygon", "path", "text",
];

fn validate_shape(value: &Value, path: &[SchemaPathElem]) -> Check<VectorShape> {
    let obj = as_object(value, path, "shape must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some(k) if SHAPE_KINDS.contains(&k) => {}
        Some(k) => {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("type")),
                format!("unknown shape type \"{k}\""),
            ));
        }
        None => {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("type")),
                "shape type is required",
            ));
        }
    }
    required_id(obj, "id", path)?;

    let shape = parse_at::<VectorShape>(value, path)?;
    let field = |name: &'static str| child(path, SchemaPathElem::Field(name));
    match &shape {
        VectorShape::Rect(s) => {
            positive(s.width, &field("width"))?;
            positive(s.height, &field("height"))?;
        }
        VectorShape::Circle(s) => positive(s.r, &field("r"))?,
        VectorShape::Ellipse(s) => {
            positive(s.rx, &field("rx"))?;
            positive(s.ry, &field("ry"))?;
        }
        VectorShape::Line(s) => {
            if s.points.len() != 4 {
                return Err(SchemaError::at(
                    &field("points"),
                    "line points must be [x1, y1, x2, y2]",
                ));
            }
        }
        VectorShape::Polyline(s) | VectorShape::Polygon(s) => {
            if s.points.len() < 4 || s.points.len() % 2 != 0 {
                return Err(SchemaError::at(
                    &field("points"),
                    "points must be an even-length list of at least two x,y pairs",
                ));
            }
        }
        VectorShape::Path(s) => check_path_data(&s.d, &field("d"))?,
        VectorShape::Text(s) => {
            if let Some(size) = s.font_size {
                positive(size, &field("fontSize"))?;
            }
        }
    }
    check_style(shape.style(), path)?;
    Ok(shape)
}

fn check_style(style: &ShapeStyle, path: &[SchemaPathElem]) -> Check<()> {
    if let Some(w) = style.stroke_width {
        if w < 0.0 {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Field("strokeWidth")),
                "strokeWidth must be >= 0",
            ));
        }
    }
    if let Some(stops) = &style.linear_gradient {
        check_stops(stops, &child(path, SchemaPathElem::Field("linearGradient")))?;
    }
    if let Some(stops) = &style.radial_gradient {
        check_stops(stops, &child(path, SchemaPathElem::Field("radialGradient")))?;
    }
    Ok(())
}

fn check_stops(stops: &GradientStops, path: &[SchemaPathElem]) -> Check<()> {
    for (i, stop) in stops.0.iter().enumerate() {
        if !(0.0..=1.0).contains(&stop.offset) {
            return Err(SchemaError::at(
                &child(path, SchemaPathElem::Index(i * 2)),
                "gradient offsets must be within [0, 1]",
            ));
        }
    }
    Ok(())
}

fn check_path_data(d: &str, path: &[SchemaPathElem]) -> Check<()> {
    match BezPath::from_svg(d) {
        Ok(p) if !p.elements().is_empty() => Ok(()),
        Ok(_) => Err(SchemaError::at(path, "path data is empty")),
        Err(e) => Err(SchemaError::at(path, format!("invalid path data: {e}"))),
    }
}

fn positive(v: f64, path: &[SchemaPathElem]) -> Check<()> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(SchemaError::at(path, "must be > 0"))
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &[SchemaPathElem],
    message: &str,
) -> Check<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::at(path, message))
}

fn required_id(
    obj: &Map<String, Value>,
    key: &'static str,
    path: &[SchemaPathElem],
) -> Check<String> {
    let p = child(path, SchemaPathElem::Field(key));
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(SchemaError::at(&p, format!("{key} must be non-empty"))),
        Some(_) => Err(SchemaError::at(&p, format!("{key} must be a string"))),
        None => Err(SchemaError::at(&p, format!("{key} is required"))),
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &'static str,
    path: &[SchemaPathElem],
) -> Check<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::at(
            &child(path, SchemaPathElem::Field(key)),
            format!("{key} must be a string"),
        )),
    }
}

fn parse_at<T: DeserializeOwned>(value: &Value, path: &[SchemaPathElem]) -> Check<T> {
    T::deserialize(value).map_err(|e| SchemaError::at(path, e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
