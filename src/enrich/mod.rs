//! Realism enrichment: under-specified objects of a known category get a richer canned shape set.

pub(crate) mod templates;

use crate::foundation::config::EnrichmentOpts;
use crate::foundation::core::{Transform, Vec2};
use crate::scene::command::{CommandEnvelope, DrawingCommand};
use crate::scene::model::{Layer, MAX_SHAPES, SceneObject, VectorShape, shapes_bounds};
use crate::scene::semantic::Category;
use regex::Regex;
use std::sync::OnceLock;

// Bounds on the template rescale factor.
const MIN_FIT: f64 = 0.25;
const MAX_FIT: f64 = 4.0;

fn plain_request_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(simple|simply|minimal|minimalist|basic)\b").expect("plain request regex")
    })
}

/// Return `true` when the utterance asks to keep things simple.
pub fn wants_plain(utterance: &str) -> bool {
    plain_request_re().is_match(utterance)
}

/// Category the object would be enriched as, if it is under-specified.
pub fn enrichment_category(
    object: &SceneObject,
    utterance: &str,
    opts: &EnrichmentOpts,
) -> Option<Category> {
    if !opts.enabled || wants_plain(utterance) {
        return None;
    }
    let category = Category::from_tag(object.semantic_tag.as_deref()?)?;
    let min = *opts.min_shapes.get(category.key())?;
    (object.shapes.len() < min).then_some(category)
}

/// Return the enriched object, or `None` when it is left as is.
///
/// Templates with more than `max_shapes` shapes are not applied. Depends only on the arguments.
pub fn enrich_object(
    object: &SceneObject,
    utterance: &str,
    opts: &EnrichmentOpts,
    max_shapes: usize,
) -> Option<SceneObject> {
    enrichment_category(object, utterance, opts).and_then(|c| enrich_as(object, c, max_shapes))
}

fn enrich_as(object: &SceneObject, category: Category, max_shapes: usize) -> Option<SceneObject> {
    let primary = object
        .shapes
        .iter()
        .filter_map(|s| s.style().fill.as_deref())
        .find(|f| !f.eq_ignore_ascii_case("none"));
    let mut shapes = templates::template(category, primary);
    if shapes.len() > max_shapes.min(MAX_SHAPES) || shapes.len() <= object.shapes.len() {
        return None;
    }

    let mut enriched = object.clone();
    if category.is_backdrop() {
        enriched.layer = if category == Category::Sky {
            Layer::Sky
        } else {
            Layer::Ground
        };
        enriched.transform = Transform::IDENTITY;
    } else {
        fit_to(&mut shapes, &object.shapes);
    }
    enriched.shapes = shapes;
    Some(enriched)
}

/// Enrich every added object in `envelope`, noting which objects changed.
///
/// Returns `(object id, category key)` for each enriched object.
#[tracing::instrument(skip_all)]
pub fn enrich_envelope(
    envelope: &mut CommandEnvelope,
    utterance: &str,
    opts: &EnrichmentOpts,
    max_shapes: usize,
) -> Vec<(String, &'static str)> {
    let mut enriched = Vec::new();
    let ctx = Ctx {
        utterance,
        opts,
        max_shapes,
    };
    enrich_list(&mut envelope.commands, ctx, &mut enriched);
    if !enriched.is_empty() {
        let list: Vec<String> = enriched
            .iter()
            .map(|(id, key)| format!("{id} ({key})"))
            .collect();
        let note = format!("enriched {}", list.join(", "));
        tracing::debug!(%note, "applied realism templates");
        envelope.push_note(note);
    }
    enriched
}

#[derive(Clone, Copy)]
struct Ctx<'a> {
    utterance: &'a str,
    opts: &'a EnrichmentOpts,
    max_shapes: usize,
}

fn enrich_list(
    commands: &mut [DrawingCommand],
    ctx: Ctx<'_>,
    out: &mut Vec<(String, &'static str)>,
) {
    for cmd in commands {
        match cmd {
            DrawingCommand::AddPreviewObject { object } | DrawingCommand::AddObject { object } => {
                let Some(category) = enrichment_category(object, ctx.utterance, ctx.opts) else {
                    continue;
                };
                if let Some(next) = enrich_as(object, category, ctx.max_shapes) {
                    out.push((object.id.clone(), category.key()));
                    *object = next;
                }
            }
            DrawingCommand::Batch { commands } => enrich_list(commands, ctx, out),
            _ => {}
        }
    }
}

// Scale the template to the original's larger extent and center it where the original was.
fn fit_to(shapes: &mut [VectorShape], original: &[VectorShape]) {
    let (Some(tb), Some(ob)) = (shapes_bounds(shapes), shapes_bounds(original)) else {
        return;
    };
    let t_extent = tb.width().max(tb.height());
    let o_extent = ob.width().max(ob.height());
    let factor = if t_extent > 0.0 && o_extent.is_finite() && o_extent > 0.0 {
        (o_extent / t_extent).clamp(MIN_FIT, MAX_FIT)
    } else {
        1.0
    };
    for s in shapes.iter_mut() {
        s.scale_about_origin(factor);
    }
    let shift: Vec2 = ob.center() - (tb.center().to_vec2() * factor).to_point();
    for s in shapes.iter_mut() {
        s.translate(shift.x, shift.y);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/enrich/mod.rs"]
mod tests;
