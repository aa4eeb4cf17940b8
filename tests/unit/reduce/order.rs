use super::*;

#[test]
fn keys_follow_layer_then_backdrop() {
    assert_eq!(order_key(Layer::Sky, Some("sky")), 0);
    assert_eq!(order_key(Layer::Sky, Some("sun")), 10);
    assert_eq!(order_key(Layer::Background, None), 110);
    assert_eq!(order_key(Layer::Ground, Some("grass field")), 200);
    assert_eq!(order_key(Layer::Foreground, Some("tree")), 310);
}

#[test]
fn place_inserts_before_first_greater_key() {
    use crate::foundation::core::Transform;
    use crate::scene::model::{ObjectStatus, SceneObject};

    let mut scene = SceneGraph::new();
    for (id, layer, tag) in [
        ("tree", Layer::Ground, "tree"),
        ("sun", Layer::Sky, "sun"),
        ("grass", Layer::Ground, "grass"),
        ("rock", Layer::Ground, "rock"),
    ] {
        scene.objects.insert(
            id.to_string(),
            SceneObject {
                id: id.to_string(),
                status: ObjectStatus::Committed,
                layer,
                transform: Transform::IDENTITY,
                semantic_tag: Some(tag.to_string()),
                shapes: Vec::new(),
            },
        );
        place(&mut scene, id);
    }
    assert_eq!(scene.order, vec!["sun", "grass", "tree", "rock"]);

    place(&mut scene, "tree");
    assert_eq!(scene.order, vec!["sun", "grass", "rock", "tree"]);
    place(&mut scene, "missing");
    assert_eq!(scene.order.len(), 4);
}
