use super::*;
use crate::foundation::core::TransformPatch;
use crate::scene::model::{CircleShape, GradientStop, SceneIntent};

fn circle(id: &str) -> VectorShape {
    VectorShape::Circle(CircleShape {
        id: id.to_string(),
        cx: 0.0,
        cy: 0.0,
        r: 3.0,
        style: ShapeStyle::filled("#fc0"),
    })
}

fn obj(id: &str, status: ObjectStatus, layer: Layer, tag: Option<&str>) -> SceneObject {
    SceneObject {
        id: id.to_string(),
        status,
        layer,
        transform: Transform::IDENTITY,
        semantic_tag: tag.map(str::to_string),
        shapes: vec![circle("c")],
    }
}

fn add_preview(id: &str, layer: Layer, tag: Option<&str>) -> DrawingCommand {
    DrawingCommand::AddPreviewObject {
        object: obj(id, ObjectStatus::Preview, layer, tag),
    }
}

fn add(id: &str, layer: Layer, tag: Option<&str>) -> DrawingCommand {
    DrawingCommand::AddObject {
        object: obj(id, ObjectStatus::Committed, layer, tag),
    }
}

fn commit(id: &str) -> DrawingCommand {
    DrawingCommand::CommitPreviewObject { id: id.to_string() }
}

#[test]
fn backdrop_paints_before_same_layer_content() {
    let scene = apply(
        &SceneGraph::new(),
        &[
            add("sun", Layer::Sky, Some("sun")),
            add("sky", Layer::Sky, Some("sky")),
        ],
    );
    assert_eq!(scene.order, vec!["sky", "sun"]);

    let scene = apply(
        &SceneGraph::new(),
        &[
            add("sky", Layer::Sky, Some("sky")),
            add("sun", Layer::Sky, Some("sun")),
            add("tree", Layer::Ground, Some("tree")),
            add("grass", Layer::Ground, Some("grass")),
            add("cloud", Layer::Sky, Some("cloud")),
        ],
    );
    assert_eq!(scene.order, vec!["sky", "sun", "cloud", "grass", "tree"]);
    assert!(scene.is_consistent());
}

#[test]
fn apply_leaves_input_untouched_and_is_deterministic() {
    let start = apply(&SceneGraph::new(), &[add("sky", Layer::Sky, Some("sky"))]);
    let snapshot = start.clone();
    let cmds = vec![
        add_preview("tree", Layer::Ground, Some("tree")),
        DrawingCommand::DeleteObject { id: "sky".into() },
    ];
    let a = apply(&start, &cmds);
    let b = apply(&start, &cmds);
    assert_eq!(start, snapshot);
    assert_eq!(a, b);
    assert_eq!(a.order, vec!["tree"]);
}

#[test]
fn sequential_application_composes() {
    let c1 = vec![
        add_preview("tree", Layer::Ground, Some("tree")),
        add("sky", Layer::Sky, Some("sky")),
    ];
    let c2 = vec![
        commit("tree"),
        DrawingCommand::UpdateObject {
            id: "sky".into(),
            patch: ObjectPatch {
                layer: Some(Layer::Background),
                ..ObjectPatch::default()
            },
        },
    ];
    let s = SceneGraph::new();
    let stepwise = apply(&apply(&s, &c1), &c2);
    let joined: Vec<DrawingCommand> = c1.iter().chain(&c2).cloned().collect();
    assert_eq!(stepwise, apply(&s, &joined));
    let batched = apply(
        &s,
        &[DrawingCommand::Batch { commands: c1 }, DrawingCommand::Batch { commands: c2 }],
    );
    assert_eq!(stepwise, batched);
}

#[test]
fn preview_lifecycle() {
    let s = apply(&SceneGraph::new(), &[add_preview("p", Layer::Ground, None)]);
    assert_eq!(s.active_preview_ids(), vec!["p"]);

    assert_eq!(apply(&s, &[commit("absent")]), s);

    let moved = apply(
        &s,
        &[DrawingCommand::UpdatePreviewObject {
            id: "p".into(),
            patch: ObjectPatch {
                transform: Some(TransformPatch {
                    x: Some(40.0),
                    ..TransformPatch::default()
                }),
                ..ObjectPatch::default()
            },
        }],
    );
    let p = moved.get("p").unwrap();
    assert_eq!(p.status, ObjectStatus::Preview);
    assert_eq!(p.transform.x, 40.0);
    assert_eq!(moved.order, vec!["p"]);

    let committed = apply(&s, &[commit("p")]);
    assert_eq!(committed.get("p").unwrap().status, ObjectStatus::Committed);
    assert_eq!(apply(&committed, &[commit("p")]), committed);

    let cancelled = apply(&s, &[DrawingCommand::CancelPreviewObject { id: "p".into() }]);
    assert!(cancelled.objects.is_empty() && cancelled.order.is_empty());
}

#[test]
fn duplicate_add_and_absent_targets_are_no_ops() {
    let s = apply(&SceneGraph::new(), &[add("a", Layer::Ground, Some("tree"))]);
    assert_eq!(apply(&s, &[add("a", Layer::Sky, Some("sky"))]), s);
    assert_eq!(
        apply(&s, &[DrawingCommand::DeleteObject { id: "zzz".into() }]),
        s
    );
    assert_eq!(
        apply(
            &s,
            &[DrawingCommand::UpdateObject {
                id: "zzz".into(),
                patch: ObjectPatch::default(),
            }]
        ),
        s
    );
}

#[test]
fn status_patch_never_demotes() {
    let s = apply(&SceneGraph::new(), &[add("a", Layer::Ground, None)]);
    let out = apply(
        &s,
        &[DrawingCommand::UpdateObject {
            id: "a".into(),
            patch: ObjectPatch {
                status: Some(ObjectStatus::Preview),
                ..ObjectPatch::default()
            },
        }],
    );
    assert_eq!(out, s);
}

#[test]
fn retag_to_backdrop_repositions() {
    let s = apply(
        &SceneGraph::new(),
        &[
            add("tree", Layer::Ground, Some("tree")),
            add("pond", Layer::Ground, Some("pond")),
        ],
    );
    assert_eq!(s.order, vec!["tree", "pond"]);
    let out = apply(
        &s,
        &[DrawingCommand::UpdateObject {
            id: "pond".into(),
            patch: ObjectPatch {
                semantic_tag: Some("water".into()),
                ..ObjectPatch::default()
            },
        }],
    );
    assert_eq!(out.order, vec!["pond", "tree"]);
}

#[test]
fn scene_intent_is_replaced_and_cleared() {
    let intent = SceneIntent {
        summary: "a quiet farm".into(),
        style: None,
        palette: vec!["#8a6".into()],
    };
    let s = apply(
        &SceneGraph::new(),
        &[DrawingCommand::SetSceneIntent {
            intent: Some(intent.clone()),
        }],
    );
    assert_eq!(s.intent, Some(intent));
    let cleared = apply(&s, &[DrawingCommand::SetSceneIntent { intent: None }]);
    assert_eq!(cleared.intent, None);
}

#[test]
fn backdrop_commands_upsert() {
    let stops = GradientStops(vec![
        GradientStop {
            offset: 0.0,
            color: "#036".into(),
        },
        GradientStop {
            offset: 1.0,
            color: "#9cf".into(),
        },
    ]);
    let s = apply(
        &SceneGraph::new(),
        &[
            add("tree", Layer::Ground, Some("tree")),
            DrawingCommand::SetGroundFill {
                fill: "#4a3".into(),
            },
            DrawingCommand::SetBackgroundGradient {
                stops: stops.clone(),
            },
        ],
    );
    assert_eq!(s.order, vec![BACKGROUND_ID, GROUND_ID, "tree"]);
    let bg = s.get(BACKGROUND_ID).unwrap();
    assert_eq!(bg.status, ObjectStatus::Committed);
    assert_eq!(bg.shapes[0].style().linear_gradient.as_ref(), Some(&stops));
    let b = bg.shapes[0].bounds().unwrap();
    assert_eq!((b.y0, b.y1), (0.0, HORIZON_Y));

    let again = apply(
        &s,
        &[DrawingCommand::SetGroundFill {
            fill: "#575".into(),
        }],
    );
    assert_eq!(again.order, s.order);
    assert_eq!(
        again.get(GROUND_ID).unwrap().shapes[0].style().fill.as_deref(),
        Some("#575")
    );
}

#[test]
fn set_path_replaces_or_appends() {
    let s = apply(&SceneGraph::new(), &[add("hill", Layer::Ground, Some("hill"))]);
    let set = |shape_id: &str| DrawingCommand::SetPath {
        id: "hill".into(),
        shape_id: shape_id.into(),
        d: "M0 0 L10 0 L5 -5 Z".into(),
    };

    let replaced = apply(&s, &[set("c")]);
    let shapes = &replaced.get("hill").unwrap().shapes;
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].kind(), "path");
    assert_eq!(shapes[0].style().fill.as_deref(), Some("#fc0"));

    let appended = apply(&s, &[set("ridge")]);
    assert_eq!(appended.get("hill").unwrap().shapes.len(), 2);

    let absent = DrawingCommand::SetPath {
        id: "nope".into(),
        shape_id: "x".into(),
        d: "M0 0".into(),
    };
    assert_eq!(apply(&s, &[absent]), s);
}

#[test]
fn set_path_append_respects_configured_ceiling() {
    let s = apply(&SceneGraph::new(), &[add("hill", Layer::Ground, Some("hill"))]);
    let append = [DrawingCommand::SetPath {
        id: "hill".into(),
        shape_id: "ridge".into(),
        d: "M0 0 L10 0".into(),
    }];

    assert_eq!(apply_with_limit(&s, &append, 1), s);
    let grown = apply_with_limit(&s, &append, 2);
    assert_eq!(grown.get("hill").unwrap().shapes.len(), 2);
    assert_eq!(grown, apply(&s, &append));
}
