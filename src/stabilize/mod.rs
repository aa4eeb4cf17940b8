//! Geometric stabilizer.
//!
//! Deterministic repairs of geometry the upstream model routinely gets wrong, applied to a
//! validated and guarded envelope before it reaches the reducer:
//!
//! 1. facing indicators are dropped from people unless the utterance asks for them,
//! 2. band stacks are re-tiled to cover their target span exactly,
//! 3. world-space shapes are rebased around the object origin,
//! 4. transforms and opacities are clamped into their declared bounds.
//!
//! Updates are resolved against a working view of the scene that already reflects earlier
//! commands of the same envelope, so `add` followed by `update` of the same id merges correctly.

pub(crate) mod bands;
pub(crate) mod indicator;
pub(crate) mod rebase;

use crate::foundation::config::StabilizerOpts;
use crate::foundation::core::{Transform, TransformPatch};
use crate::scene::command::{CommandEnvelope, DrawingCommand, ObjectPatch};
use crate::scene::model::{SceneGraph, SceneObject, VectorShape};
use crate::scene::semantic::is_person_tag;
use std::collections::HashMap;

/// What the stabilizer changed, by object id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilizeReport {
    pub clamped: Vec<String>,
    pub rebased: Vec<String>,
    pub band_stacks: Vec<String>,
    /// `(object id, shapes removed)`.
    pub indicators: Vec<(String, usize)>,
}

impl StabilizeReport {
    pub fn is_empty(&self) -> bool {
        self.clamped.is_empty()
            && self.rebased.is_empty()
            && self.band_stacks.is_empty()
            && self.indicators.is_empty()
    }

    /// Human-readable summary, or `None` when nothing changed.
    pub fn note(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.clamped.is_empty() {
            parts.push(format!(
                "clamped out-of-range values on {}",
                self.clamped.join(", ")
            ));
        }
        if !self.rebased.is_empty() {
            parts.push(format!(
                "rebased world-space shapes of {}",
                self.rebased.join(", ")
            ));
        }
        if !self.band_stacks.is_empty() {
            parts.push(format!(
                "re-tiled band stack of {}",
                self.band_stacks.join(", ")
            ));
        }
        for (id, n) in &self.indicators {
            parts.push(format!("removed {n} facing indicator shape(s) from {id}"));
        }
        (!parts.is_empty()).then(|| format!("stabilizer {}", parts.join("; ")))
    }
}

/// Scene view that reflects the commands already walked in the current envelope.
struct Working<'a> {
    base: &'a SceneGraph,
    // `None` marks an object removed earlier in the envelope.
    overlay: HashMap<String, Option<SceneObject>>,
}

impl<'a> Working<'a> {
    fn new(base: &'a SceneGraph) -> Self {
        Self {
            base,
            overlay: HashMap::new(),
        }
    }

    fn get(&self, id: &str) -> Option<&SceneObject> {
        match self.overlay.get(id) {
            Some(entry) => entry.as_ref(),
            None => self.base.get(id),
        }
    }

    fn put(&mut self, object: SceneObject) {
        self.overlay.insert(object.id.clone(), Some(object));
    }

    fn remove(&mut self, id: &str) {
        self.overlay.insert(id.to_string(), None);
    }
}

/// Stabilize every command of `envelope` in place against `scene`, noting what changed.
#[tracing::instrument(skip_all, fields(commands = envelope.commands.len()))]
pub fn stabilize_envelope(
    envelope: &mut CommandEnvelope,
    scene: &SceneGraph,
    utterance: &str,
    opts: &StabilizerOpts,
) -> StabilizeReport {
    let mut report = StabilizeReport::default();
    let mut working = Working::new(scene);
    let ctx = Ctx { utterance, opts };
    stabilize_list(&mut envelope.commands, &mut working, ctx, &mut report);
    if let Some(note) = report.note() {
        tracing::debug!(%note, "stabilized geometry");
        envelope.push_note(note);
    }
    report
}

/// Stabilize a single object as it would be on insertion.
pub fn stabilize_object(
    object: &mut SceneObject,
    utterance: &str,
    opts: &StabilizerOpts,
    report: &mut StabilizeReport,
) {
    if is_person_tag(object.semantic_tag.as_deref()) && !indicator::requests_indicator(utterance) {
        let removed = indicator::drop_indicators(&mut object.shapes);
        if removed > 0 {
            report.indicators.push((object.id.clone(), removed));
        }
    }

    let span = bands::band_target(object.layer, object.semantic_tag.as_deref(), utterance);
    if bands::normalize_band_stack(&mut object.shapes, span, opts) {
        object.transform = Transform::IDENTITY;
        report.band_stacks.push(object.id.clone());
    } else if let Some(t) = rebase::rebase_shapes(&mut object.shapes, object.transform, opts) {
        object.transform = t;
        report.rebased.push(object.id.clone());
    }

    let clamped = object.transform.clamped();
    let opacity_changed = clamp_opacity(&mut object.shapes);
    if clamped != object.transform || opacity_changed {
        object.transform = clamped;
        report.clamped.push(object.id.clone());
    }
}

#[derive(Clone, Copy)]
struct Ctx<'u> {
    utterance: &'u str,
    opts: &'u StabilizerOpts,
}

fn stabilize_list(
    commands: &mut [DrawingCommand],
    working: &mut Working<'_>,
    ctx: Ctx<'_>,
    report: &mut StabilizeReport,
) {
    for cmd in commands.iter_mut() {
        match cmd {
            DrawingCommand::AddPreviewObject { object } | DrawingCommand::AddObject { object } => {
                stabilize_object(object, ctx.utterance, ctx.opts, report);
                // Adding an existing id is a no-op in the reducer, so the view keeps the original.
                if working.get(&object.id).is_none() {
                    working.put(object.clone());
                }
            }
            DrawingCommand::UpdatePreviewObject { id, patch }
            | DrawingCommand::UpdateObject { id, patch } => {
                stabilize_patch(id, patch, working, ctx, report);
            }
            DrawingCommand::DeleteObject { id } | DrawingCommand::CancelPreviewObject { id } => {
                working.remove(id);
            }
            DrawingCommand::Batch { commands } => stabilize_list(commands, working, ctx, report),
            DrawingCommand::SetSceneIntent { .. }
            | DrawingCommand::CommitPreviewObject { .. }
            | DrawingCommand::SetBackgroundGradient { .. }
            | DrawingCommand::SetGroundFill { .. }
            | DrawingCommand::SetPath { .. } => {}
        }
    }
}

fn stabilize_patch(
    id: &str,
    patch: &mut ObjectPatch,
    working: &mut Working<'_>,
    ctx: Ctx<'_>,
    report: &mut StabilizeReport,
) {
    let mut clamped = false;
    if let Some(t) = patch.transform {
        let c = t.clamped();
        clamped |= c != t;
        patch.transform = Some(c);
    }
    if let Some(shapes) = &mut patch.shapes {
        clamped |= clamp_opacity(shapes);
    }
    if clamped {
        report.clamped.push(id.to_string());
    }

    // Geometry repairs need the merged object; updates of unknown ids are no-ops downstream.
    let Some(current) = working.get(id).cloned() else {
        return;
    };
    let mut merged = current.clone();
    if let Some(layer) = patch.layer {
        merged.layer = layer;
    }
    if let Some(tag) = &patch.semantic_tag {
        merged.semantic_tag = Some(tag.clone());
    }
    merged.transform = patch
        .transform
        .map_or(current.transform, |p| p.merge_over(current.transform));

    if let Some(shapes) = &mut patch.shapes {
        let tag = merged.semantic_tag.as_deref();
        if is_person_tag(tag) && !indicator::requests_indicator(ctx.utterance) {
            let removed = indicator::drop_indicators(shapes);
            if removed > 0 {
                report.indicators.push((id.to_string(), removed));
            }
        }

        let span = bands::band_target(merged.layer, tag, ctx.utterance);
        if bands::normalize_band_stack(shapes, span, ctx.opts) {
            merged.transform = Transform::IDENTITY;
            patch.transform = Some(TransformPatch::full(Transform::IDENTITY));
            report.band_stacks.push(id.to_string());
        } else if let Some(t) = rebase::rebase_shapes(shapes, merged.transform, ctx.opts) {
            merged.transform = t.clamped();
            patch.transform = Some(TransformPatch::full(merged.transform));
            report.rebased.push(id.to_string());
        }
        merged.shapes = shapes.clone();
    } else if patch.transform.is_some() || patch.layer.is_some() || patch.semantic_tag.is_some() {
        // Moving or retagging an existing band stack keeps it tiled over its span.
        let span = bands::band_target(merged.layer, merged.semantic_tag.as_deref(), ctx.utterance);
        let mut shapes = merged.shapes.clone();
        if bands::normalize_band_stack(&mut shapes, span, ctx.opts)
            && (shapes != merged.shapes || merged.transform != Transform::IDENTITY)
        {
            merged.transform = Transform::IDENTITY;
            merged.shapes = shapes.clone();
            patch.shapes = Some(shapes);
            patch.transform = Some(TransformPatch::full(Transform::IDENTITY));
            report.band_stacks.push(id.to_string());
        }
    }

    working.put(merged);
}

fn clamp_opacity(shapes: &mut [VectorShape]) -> bool {
    let mut changed = false;
    for s in shapes {
        let style = s.style_mut();
        if let Some(o) = style.opacity {
            let c = if o.is_nan() { 1.0 } else { o.clamp(0.0, 1.0) };
            if c != o {
                style.opacity = Some(c);
                changed = true;
            }
        }
    }
    changed
}

#[cfg(test)]
#[path = "../../tests/unit/stabilize/mod.rs"]
mod tests;
