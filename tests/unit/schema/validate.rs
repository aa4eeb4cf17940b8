use super::*;
use serde_json::json;

fn limits() -> Limits {
    Limits::default()
}

fn tree_object(status: &str) -> Value {
    json!({
        "id": "tree-1",
        "status": status,
        "layer": "ground",
        "transform": {"x": 30, "y": 60, "scale": 1, "rotation": 0},
        "semanticTag": "tree",
        "shapes": [
            {"type": "rect", "id": "trunk", "x": -1, "y": 0, "width": 2, "height": 8, "fill": "#6b4423"},
            {"type": "circle", "id": "crown", "cx": 0, "cy": -3, "r": 5, "fill": "#2e8b57"}
        ]
    })
}

fn err_path(v: Value) -> String {
    validate_envelope(&v, &limits()).unwrap_err().path_string()
}

#[test]
fn well_formed_envelope_is_typed() {
    let v = json!({
        "commands": [
            {"type": "add_preview_object", "object": tree_object("preview")},
            {"type": "update_preview_object", "id": "tree-1", "patch": {"transform": {"x": 40}}},
            {"type": "commit_preview_object", "id": "tree-1"}
        ],
        "notes": "one tree"
    });
    let env = validate_envelope(&v, &limits()).unwrap();
    assert_eq!(env.commands.len(), 3);
    let DrawingCommand::AddPreviewObject { object } = &env.commands[0] else {
        panic!("expected add_preview_object")
    };
    assert_eq!(object.shapes.len(), 2);
    assert_eq!(object.layer, Layer::Ground);
    let DrawingCommand::UpdatePreviewObject { patch, .. } = &env.commands[1] else {
        panic!("expected update_preview_object")
    };
    assert_eq!(patch.transform.and_then(|t| t.x), Some(40.0));
    assert_eq!(env.notes.as_deref(), Some("one tree"));
}

#[test]
fn non_object_root_fails_at_root() {
    assert_eq!(err_path(json!([1, 2])), "$");
}

#[test]
fn status_must_match_command_kind() {
    let v = json!({"commands": [{"type": "add_object", "object": tree_object("preview")}]});
    let err = validate_envelope(&v, &limits()).unwrap_err();
    assert_eq!(err.path_string(), "$.commands[0].object.status");
    assert!(err.message.contains("committed"));

    let v = json!({"commands": [{"type": "add_preview_object", "object": tree_object("committed")}]});
    assert_eq!(err_path(v), "$.commands[0].object.status");
}

#[test]
fn patch_with_identity_fields_is_rejected() {
    let v = json!({"commands": [
        {"type": "update_object", "id": "a", "patch": {"id": "b"}}
    ]});
    assert_eq!(err_path(v), "$.commands[0].patch.id");

    let v = json!({"commands": [
        {"type": "update_preview_object", "id": "a", "patch": {"layer": "sky", "type": "rect"}}
    ]});
    assert_eq!(err_path(v), "$.commands[0].patch.type");
}

#[test]
fn shape_count_is_bounded() {
    let mut obj = tree_object("committed");
    obj["shapes"] = json!([]);
    let v = json!({"commands": [{"type": "add_object", "object": obj.clone()}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes");

    let many: Vec<Value> = (0..61)
        .map(|i| json!({"type": "circle", "id": format!("c{i}"), "cx": 0, "cy": 0, "r": 1}))
        .collect();
    obj["shapes"] = Value::Array(many);
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes");
}

#[test]
fn duplicate_shape_ids_are_rejected() {
    let mut obj = tree_object("committed");
    obj["shapes"][1]["id"] = json!("trunk");
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes[1].id");
}

#[test]
fn bad_geometry_reports_the_field() {
    let mut obj = tree_object("committed");
    obj["shapes"][1]["r"] = json!(0);
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes[1].r");

    let mut obj = tree_object("committed");
    obj["shapes"][0] = json!({"type": "line", "id": "l", "points": [0, 0, 1]});
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes[0].points");

    let mut obj = tree_object("committed");
    obj["shapes"][0] = json!({"type": "hexagon", "id": "h"});
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    assert_eq!(err_path(v), "$.commands[0].object.shapes[0].type");
}

#[test]
fn out_of_range_transforms_pass_through_for_clamping() {
    let mut obj = tree_object("committed");
    obj["transform"] = json!({"x": 150, "y": -50, "scale": 10, "rotation": 500});
    let v = json!({"commands": [{"type": "add_object", "object": obj}]});
    let env = validate_envelope(&v, &limits()).unwrap();
    let DrawingCommand::AddObject { object } = &env.commands[0] else {
        panic!("expected add_object")
    };
    assert_eq!(object.transform.x, 150.0);
}

#[test]
fn unknown_command_type_is_rejected() {
    let v = json!({"commands": [{"type": "explode", "id": "a"}]});
    let err = validate_envelope(&v, &limits()).unwrap_err();
    assert_eq!(err.path_string(), "$.commands[0].type");
    assert!(err.to_string().contains("explode"));
}

#[test]
fn refused_envelopes_must_be_empty() {
    let ok = validate_envelope(
        &json!({"refused": true, "refusalReason": "ambiguous_target"}),
        &limits(),
    )
    .unwrap();
    assert!(ok.refused);
    assert!(ok.commands.is_empty());

    let v = json!({"refused": true, "commands": [{"type": "delete_object", "id": "a"}]});
    assert_eq!(err_path(v), "$.commands");
}

#[test]
fn batch_depth_and_size_are_capped() {
    let mut cmd = json!({"type": "delete_object", "id": "a"});
    for _ in 0..9 {
        cmd = json!({"type": "batch", "commands": [cmd]});
    }
    let err = validate_envelope(&json!({"commands": [cmd]}), &limits()).unwrap_err();
    assert!(err.message.contains("depth"));

    let small = Limits {
        max_commands: 3,
        ..Limits::default()
    };
    let v = json!({"commands": [
        {"type": "batch", "commands": [
            {"type": "delete_object", "id": "a"},
            {"type": "delete_object", "id": "b"},
            {"type": "delete_object", "id": "c"}
        ]}
    ]});
    let err = validate_envelope(&v, &small).unwrap_err();
    assert_eq!(err.path_string(), "$.commands");
}

#[test]
fn gradient_and_path_commands_are_checked() {
    let v = json!({"commands": [{"type": "set_background_gradient", "stops": [0, "#00f", 1.5, "#fff"]}]});
    assert_eq!(err_path(v), "$.commands[0].stops[2]");

    let v = json!({"commands": [{"type": "set_path", "id": "r", "shapeId": "p", "d": "bogus"}]});
    assert_eq!(err_path(v), "$.commands[0].d");

    let v = json!({"commands": [
        {"type": "set_background_gradient", "stops": [0, "#00f", 1, "#fff"]},
        {"type": "set_ground_fill", "fill": "#3a5"},
        {"type": "set_path", "id": "r", "shapeId": "p", "d": "M0 0 L5 5"}
    ]});
    assert_eq!(validate_envelope(&v, &limits()).unwrap().commands.len(), 3);
}
