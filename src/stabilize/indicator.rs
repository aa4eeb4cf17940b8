use crate::scene::model::VectorShape;
use regex::Regex;
use std::sync::OnceLock;

fn indicator_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(^|[-_])(arrow|indicator|direction|pointer|heading)s?($|[-_\d])")
            .expect("indicator id regex")
    })
}

fn indicator_request_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(arrows?|indicators?|directions?|pointers?|pointing|heading)\b")
            .expect("indicator request regex")
    })
}

/// Return `true` when the utterance explicitly asks for a facing/direction marker.
pub fn requests_indicator(utterance: &str) -> bool {
    indicator_request_re().is_match(utterance)
}

/// Drop facing-indicator shapes (arrows, pointers) from a person's shape list.
///
/// Never empties the list: when every shape looks like an indicator, nothing is removed.
/// Returns the number of shapes removed.
pub fn drop_indicators(shapes: &mut Vec<VectorShape>) -> usize {
    let keep = shapes
        .iter()
        .filter(|s| !indicator_id_re().is_match(s.id()))
        .count();
    if keep == 0 || keep == shapes.len() {
        return 0;
    }
    let before = shapes.len();
    shapes.retain(|s| !indicator_id_re().is_match(s.id()));
    before - shapes.len()
}

#[cfg(test)]
#[path = "../../tests/unit/stabilize/indicator.rs"]
mod tests;
