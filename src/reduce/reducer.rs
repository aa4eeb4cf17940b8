use crate::foundation::core::{HORIZON_Y, Transform, WORLD_MAX, WORLD_MIN};
use crate::reduce::order::{key_of, place};
use crate::scene::command::{DrawingCommand, ObjectPatch};
use crate::scene::model::{
    GradientStops, Layer, MAX_SHAPES, ObjectStatus, PathShape, RectShape, SceneGraph, SceneObject,
    ShapeStyle, VectorShape,
};

/// Id of the object upserted by `set_background_gradient`.
pub const BACKGROUND_ID: &str = "background";
/// Id of the object upserted by `set_ground_fill`.
pub const GROUND_ID: &str = "ground";

/// Apply `commands` in order to a copy of `scene`.
///
/// Pure: `scene` is never modified, and the same inputs always produce equal outputs. Commands
/// that target absent objects, re-add existing ids or re-commit committed objects are no-ops.
pub fn apply(scene: &SceneGraph, commands: &[DrawingCommand]) -> SceneGraph {
    apply_with_limit(scene, commands, MAX_SHAPES)
}

/// [`apply`] with a lower per-object shape ceiling for `set_path` appends.
#[tracing::instrument(skip_all, fields(commands = commands.len()))]
pub fn apply_with_limit(
    scene: &SceneGraph,
    commands: &[DrawingCommand],
    max_shapes: usize,
) -> SceneGraph {
    let max_shapes = max_shapes.min(MAX_SHAPES);
    let mut next = scene.clone();
    for cmd in commands {
        apply_command(&mut next, cmd, max_shapes);
    }
    debug_assert!(next.is_consistent());
    next
}

fn apply_command(scene: &mut SceneGraph, cmd: &DrawingCommand, max_shapes: usize) {
    match cmd {
        DrawingCommand::SetSceneIntent { intent } => scene.intent = intent.clone(),
        DrawingCommand::AddPreviewObject { object } | DrawingCommand::AddObject { object } => {
            add(scene, object)
        }
        DrawingCommand::UpdatePreviewObject { id, patch }
        | DrawingCommand::UpdateObject { id, patch } => update(scene, id, patch),
        DrawingCommand::CommitPreviewObject { id } => {
            match scene.objects.get_mut(id) {
                Some(o) if o.status == ObjectStatus::Preview => o.status = ObjectStatus::Committed,
                _ => tracing::trace!(%id, "commit is a no-op"),
            }
        }
        DrawingCommand::CancelPreviewObject { id } | DrawingCommand::DeleteObject { id } => {
            if scene.objects.remove(id).is_some() {
                scene.order.retain(|o| o != id);
            }
        }
        DrawingCommand::SetBackgroundGradient { stops } => {
            upsert_backdrop(scene, BACKGROUND_ID, Layer::Sky, "sky", sky_rect(stops));
        }
        DrawingCommand::SetGroundFill { fill } => {
            upsert_backdrop(scene, GROUND_ID, Layer::Ground, "ground", ground_rect(fill));
        }
        DrawingCommand::SetPath { id, shape_id, d } => {
            set_path(scene, id, shape_id, d, max_shapes)
        }
        DrawingCommand::Batch { commands } => {
            for inner in commands {
                apply_command(scene, inner, max_shapes);
            }
        }
    }
}

fn add(scene: &mut SceneGraph, object: &SceneObject) {
    if scene.objects.contains_key(&object.id) {
        tracing::trace!(id = %object.id, "add of existing id is a no-op");
        return;
    }
    scene.objects.insert(object.id.clone(), object.clone());
    place(scene, &object.id);
}

fn update(scene: &mut SceneGraph, id: &str, patch: &ObjectPatch) {
    let before = key_of(scene, id);
    let Some(object) = scene.objects.get_mut(id) else {
        tracing::trace!(%id, "update of absent id is a no-op");
        return;
    };
    if let Some(layer) = patch.layer {
        object.layer = layer;
    }
    // Lifecycle only moves forward.
    if patch.status == Some(ObjectStatus::Committed) {
        object.status = ObjectStatus::Committed;
    }
    if let Some(t) = &patch.transform {
        object.transform = t.merge_over(object.transform);
    }
    if let Some(tag) = &patch.semantic_tag {
        object.semantic_tag = Some(tag.clone());
    }
    if let Some(shapes) = &patch.shapes {
        object.shapes = shapes.clone();
    }
    if key_of(scene, id) != before {
        place(scene, id);
    }
}

fn upsert_backdrop(scene: &mut SceneGraph, id: &str, layer: Layer, tag: &str, rect: VectorShape) {
    let object = SceneObject {
        id: id.to_string(),
        status: ObjectStatus::Committed,
        layer,
        transform: Transform::IDENTITY,
        semantic_tag: Some(tag.to_string()),
        shapes: vec![rect],
    };
    let before = key_of(scene, id);
    scene.objects.insert(id.to_string(), object);
    if before != key_of(scene, id) {
        place(scene, id);
    }
}

fn sky_rect(stops: &GradientStops) -> VectorShape {
    VectorShape::Rect(RectShape {
        id: "gradient".into(),
        x: WORLD_MIN,
        y: WORLD_MIN,
        width: WORLD_MAX - WORLD_MIN,
        height: HORIZON_Y - WORLD_MIN,
        rx: None,
        style: ShapeStyle {
            fill: stops.0.first().map(|s| s.color.clone()),
            linear_gradient: Some(stops.clone()),
            ..ShapeStyle::default()
        },
    })
}

fn ground_rect(fill: &str) -> VectorShape {
    VectorShape::Rect(RectShape {
        id: "fill".into(),
        x: WORLD_MIN,
        y: HORIZON_Y,
        width: WORLD_MAX - WORLD_MIN,
        height: WORLD_MAX - HORIZON_Y,
        rx: None,
        style: ShapeStyle::filled(fill),
    })
}

fn set_path(scene: &mut SceneGraph, id: &str, shape_id: &str, d: &str, max_shapes: usize) {
    let Some(object) = scene.objects.get_mut(id) else {
        tracing::trace!(%id, "set_path on absent id is a no-op");
        return;
    };
    let path = |style: ShapeStyle| {
        VectorShape::Path(PathShape {
            id: shape_id.to_string(),
            d: d.to_string(),
            style,
        })
    };
    let len = object.shapes.len();
    match object.shapes.iter_mut().find(|s| s.id() == shape_id) {
        Some(shape) => *shape = path(shape.style().clone()),
        None if len < max_shapes => object.shapes.push(path(ShapeStyle::default())),
        None => tracing::debug!(%id, %shape_id, "set_path would exceed the shape ceiling"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reduce/reducer.rs"]
mod tests;
