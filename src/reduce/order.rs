use crate::scene::model::{Layer, SceneGraph};
use crate::scene::semantic::is_backdrop_tag;

/// Paint-order key: `rank(layer) * 100`, plus 10 for non-backdrop objects.
pub fn order_key(layer: Layer, semantic_tag: Option<&str>) -> u32 {
    layer.rank() * 100 + if is_backdrop_tag(semantic_tag) { 0 } else { 10 }
}

/// Key of object `id` in `scene`, if present.
pub fn key_of(scene: &SceneGraph, id: &str) -> Option<u32> {
    scene
        .get(id)
        .map(|o| order_key(o.layer, o.semantic_tag.as_deref()))
}

/// Move `id` to the first position whose existing key is strictly greater than its own.
///
/// Objects with equal keys keep arrival order. `id` must already be in `scene.objects`.
pub fn place(scene: &mut SceneGraph, id: &str) {
    let Some(key) = key_of(scene, id) else {
        return;
    };
    scene.order.retain(|o| o != id);
    let at = scene
        .order
        .iter()
        .position(|other| key_of(scene, other).is_some_and(|k| k > key))
        .unwrap_or(scene.order.len());
    scene.order.insert(at, id.to_string());
}

#[cfg(test)]
#[path = "../../tests/unit/reduce/order.rs"]
mod tests;
