use super::*;
use crate::foundation::core::Transform;
use crate::scene::model::{CircleShape, ObjectStatus, RectShape, ShapeStyle};

fn lone_circle(id: &str, tag: &str, cx: f64, cy: f64, r: f64) -> SceneObject {
    SceneObject {
        id: id.to_string(),
        status: ObjectStatus::Preview,
        layer: Layer::Ground,
        transform: Transform {
            x: 30.0,
            y: 60.0,
            scale: 1.0,
            rotation: 0.0,
        },
        semantic_tag: Some(tag.to_string()),
        shapes: vec![VectorShape::Circle(CircleShape {
            id: "c".into(),
            cx,
            cy,
            r,
            style: ShapeStyle::filled("#228b22"),
        })],
    }
}

#[test]
fn lone_circle_tree_gets_template() {
    let obj = lone_circle("tree-1", "oak tree", 0.0, 0.0, 5.0);
    let out = enrich_object(&obj, "add a tree", &EnrichmentOpts::default(), MAX_SHAPES).unwrap();
    assert_eq!(out.shapes.len(), 4);
    assert_eq!(out.transform, obj.transform);
    assert_eq!(out.layer, Layer::Ground);
    let crown = out.shapes.iter().find(|s| s.id() == "crown").unwrap();
    assert_eq!(crown.style().fill.as_deref(), Some("#228b22"));
    let b = shapes_bounds(&out.shapes).unwrap();
    assert!((b.height() - 10.0).abs() < 1e-9);
}

#[test]
fn template_is_centered_on_the_original() {
    let obj = lone_circle("tree-1", "tree", 20.0, 30.0, 2.0);
    let out = enrich_object(&obj, "add a tree", &EnrichmentOpts::default(), MAX_SHAPES).unwrap();
    let c = shapes_bounds(&out.shapes).unwrap().center();
    assert!((c.x - 20.0).abs() < 1e-9 && (c.y - 30.0).abs() < 1e-9);
}

#[test]
fn plain_requests_and_rich_objects_are_left_alone() {
    let opts = EnrichmentOpts::default();
    let obj = lone_circle("tree-1", "tree", 0.0, 0.0, 5.0);
    assert_eq!(enrich_object(&obj, "a simple tree", &opts, MAX_SHAPES), None);
    assert_eq!(enrich_object(&obj, "keep it MINIMAL", &opts, MAX_SHAPES), None);

    let mut rich = obj.clone();
    rich.shapes.push(rich.shapes[0].clone());
    assert_eq!(enrich_object(&rich, "add a tree", &opts, MAX_SHAPES), None);

    let lamp = lone_circle("lamp", "street lamp", 0.0, 0.0, 1.0);
    assert_eq!(enrich_object(&lamp, "add a lamp", &opts, MAX_SHAPES), None);

    let off = EnrichmentOpts {
        enabled: false,
        ..EnrichmentOpts::default()
    };
    assert_eq!(enrich_object(&obj, "add a tree", &off, MAX_SHAPES), None);
}

#[test]
fn sky_backdrop_moves_to_its_band() {
    let sky = SceneObject {
        id: "sky".into(),
        status: ObjectStatus::Committed,
        layer: Layer::Background,
        transform: Transform {
            x: 10.0,
            y: 5.0,
            scale: 1.0,
            rotation: 0.0,
        },
        semantic_tag: Some("sky".into()),
        shapes: vec![VectorShape::Rect(RectShape {
            id: "s".into(),
            x: 0.0,
            y: 0.0,
            width: 90.0,
            height: 30.0,
            rx: None,
            style: ShapeStyle::filled("#ff8800"),
        })],
    };
    let out = enrich_object(&sky, "orange sky", &EnrichmentOpts::default(), MAX_SHAPES).unwrap();
    assert_eq!(out.layer, Layer::Sky);
    assert_eq!(out.transform, Transform::IDENTITY);
    assert_eq!(out.shapes[0].style().fill.as_deref(), Some("#ff8800"));
    let b = shapes_bounds(&out.shapes).unwrap();
    assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.0, 0.0, 100.0, 45.0));
}

#[test]
fn every_template_respects_the_shape_ceiling() {
    use crate::scene::semantic::Category::*;
    for c in [
        Tree, House, Person, Car, Bush, Flower, Mountain, Cloud, Sun, Bird, Sky, Ground,
    ] {
        let shapes = templates::template(c, None);
        assert!(shapes.len() <= MAX_SHAPES);
        let min = EnrichmentOpts::default().min_shapes[c.key()];
        assert!(shapes.len() >= min, "{} template below its minimum", c.key());
        let mut ids: Vec<&str> = shapes.iter().map(VectorShape::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), shapes.len());
    }
}

#[test]
fn envelope_enrichment_recurses_and_notes() {
    let mut env = CommandEnvelope::with_commands(vec![
        DrawingCommand::Batch {
            commands: vec![DrawingCommand::AddPreviewObject {
                object: lone_circle("tree-1", "tree", 0.0, 0.0, 5.0),
            }],
        },
        DrawingCommand::UpdateObject {
            id: "tree-1".into(),
            patch: Default::default(),
        },
    ]);
    let done = enrich_envelope(&mut env, "add a tree", &EnrichmentOpts::default(), MAX_SHAPES);
    assert_eq!(done, vec![("tree-1".to_string(), "tree")]);
    assert_eq!(env.notes.as_deref(), Some("enriched tree-1 (tree)"));
    let DrawingCommand::Batch { commands } = &env.commands[0] else {
        panic!("expected batch")
    };
    let DrawingCommand::AddPreviewObject { object } = &commands[0] else {
        panic!("expected add")
    };
    assert_eq!(object.shapes.len(), 4);
}

#[test]
fn templates_over_the_shape_cap_are_skipped() {
    let sun = lone_circle("sun-1", "sun", 0.0, 0.0, 5.0);
    let opts = EnrichmentOpts::default();
    assert_eq!(enrich_object(&sun, "add a sun", &opts, 4), None);
    assert_eq!(enrich_object(&sun, "add a sun", &opts, 10).unwrap().shapes.len(), 10);

    let mut env = CommandEnvelope::with_commands(vec![DrawingCommand::AddPreviewObject {
        object: sun.clone(),
    }]);
    assert!(enrich_envelope(&mut env, "add a sun", &opts, 4).is_empty());
    assert_eq!(env.commands[0], DrawingCommand::AddPreviewObject { object: sun });
    assert_eq!(env.notes, None);
}
