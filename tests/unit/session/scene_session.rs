use super::*;
use serde_json::json;

fn tree_envelope() -> Value {
    json!({"commands": [{"type": "add_preview_object", "object": {
        "id": "tree-1", "status": "preview", "layer": "ground", "semanticTag": "tree",
        "transform": {"x": 30, "y": 70, "scale": 1, "rotation": 0},
        "shapes": [
            {"type": "rect", "id": "trunk", "x": -1, "y": 0, "width": 2, "height": 6},
            {"type": "circle", "id": "crown", "cx": 0, "cy": -3, "r": 4}
        ]
    }}]})
}

#[test]
fn applied_envelope_updates_scene_and_log() {
    let mut s = SceneSession::new(PipelineConfig::default());
    let ev = s.apply_envelope("add a tree", tree_envelope());
    assert_eq!(ev.status, EventStatus::Applied);
    assert_eq!(ev.diff_summary.as_deref(), Some("added preview \"tree-1\" (tree)"));
    assert_eq!(s.revision(), 1);

    let snap = s.snapshot();
    assert_eq!(snap.active_preview_ids, vec!["tree-1"]);
    assert_eq!(snap.session_events.len(), 1);
    let wire = serde_json::to_value(&snap).unwrap();
    assert_eq!(wire["type"], "scene_update");
    assert_eq!(wire["revision"], 1);
    assert!(wire["sceneGraph"]["objects"]["tree-1"].is_object());
}

#[test]
fn rejected_and_refused_still_bump_revision() {
    let mut s = SceneSession::new(PipelineConfig::default());
    let ev = s.submit_model_output("add a tree", "{ not json");
    assert_eq!(ev.status, EventStatus::Rejected);
    assert!(ev.commands.is_empty());

    let ev = s.apply_envelope(
        "commit it",
        json!({"refused": true, "refusalReason": "ambiguous_target"}),
    );
    assert_eq!(ev.status, EventStatus::Refused);
    assert_eq!(s.revision(), 2);
    assert!(s.scene().objects.is_empty());
}

#[test]
fn model_failure_is_an_error_event() {
    let mut s = SceneSession::new(PipelineConfig::default());
    let down = |_: &str, _: &SceneGraph| -> SceneResult<String> {
        Err(SceneError::session("connection refused"))
    };
    let ev = s.submit_utterance("add a tree", &down);
    assert_eq!(ev.status, EventStatus::Error);
    assert!(ev.latency_ms.is_some());
    assert!(ev.notes.unwrap().contains("connection refused"));
}

#[test]
fn model_output_is_processed_with_latency() {
    let mut s = SceneSession::new(PipelineConfig::default());
    let model = |utterance: &str, scene: &SceneGraph| -> SceneResult<String> {
        assert_eq!(utterance, "add a tree");
        assert!(scene.objects.is_empty());
        Ok(format!("```json\n{}\n```", tree_envelope()))
    };
    let ev = s.submit_utterance("add a tree", &model);
    assert_eq!(ev.status, EventStatus::Applied);
    assert!(ev.latency_ms.is_some());
    assert!(s.scene().get("tree-1").is_some());
}

#[test]
fn reset_clears_scene_but_keeps_history() {
    let mut s = SceneSession::new(PipelineConfig::default());
    s.apply_envelope("add a tree", tree_envelope());
    let ev = s.reset();
    assert_eq!(ev.status, EventStatus::Applied);
    assert!(s.scene().objects.is_empty());
    assert_eq!(s.revision(), 2);
    assert_eq!(s.events().count(), 2);
}

#[test]
fn log_capacity_comes_from_config() {
    let mut cfg = PipelineConfig::default();
    cfg.limits.event_log_capacity = 3;
    let mut s = SceneSession::new(cfg);
    for _ in 0..5 {
        s.reset();
    }
    assert_eq!(s.events().count(), 3);
    assert_eq!(s.revision(), 5);
}

#[test]
fn inconsistent_starting_scene_is_rejected() {
    let mut scene = SceneGraph::new();
    scene.order.push("ghost".into());
    let err = SceneSession::with_scene(PipelineConfig::default(), scene).unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));

    assert!(matches!(parse_scene("{"), Err(SceneError::Parse(_))));
    assert!(parse_scene(r#"{"objects": {}, "order": []}"#).is_ok());
}
