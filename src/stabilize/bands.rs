//! Band stacks: several full-width rects stacked vertically to fake a gradient with solid fills.
//!
//! Upstream output rarely tiles these exactly; gaps and overlaps show up as seams. Normalization
//! re-partitions the stack so it covers a target vertical span with integer heights, no gaps and
//! no overlap.

use crate::foundation::config::StabilizerOpts;
use crate::foundation::core::{HORIZON_Y, WORLD_MAX, WORLD_MIN};
use crate::scene::model::{Layer, VectorShape};
use crate::scene::semantic::{Category, is_ground_like_tag};
use regex::Regex;
use std::sync::OnceLock;

/// Vertical world-space span a band stack should cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSpan {
    pub top: f64,
    pub bottom: f64,
}

impl BandSpan {
    pub const SKY: Self = Self {
        top: WORLD_MIN,
        bottom: HORIZON_Y,
    };
    pub const GROUND: Self = Self {
        top: HORIZON_Y,
        bottom: WORLD_MAX,
    };
    pub const FULL: Self = Self {
        top: WORLD_MIN,
        bottom: WORLD_MAX,
    };

    pub fn height(self) -> f64 {
        self.bottom - self.top
    }
}

fn whole_canvas_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(whole|entire|full)\s+(canvas|screen|background|picture|scene)\b")
            .expect("whole-canvas regex")
    })
}

/// Choose the span for a band stack from explicit phrasing, then tag, then layer.
pub fn band_target(layer: Layer, tag: Option<&str>, utterance: &str) -> BandSpan {
    if whole_canvas_re().is_match(utterance) {
        return BandSpan::FULL;
    }
    if tag.and_then(Category::from_tag) == Some(Category::Sky) {
        return BandSpan::SKY;
    }
    if is_ground_like_tag(tag) {
        return BandSpan::GROUND;
    }
    match layer {
        Layer::Sky | Layer::Background => BandSpan::SKY,
        Layer::Ground | Layer::Foreground => BandSpan::GROUND,
    }
}

/// Indices (top to bottom) of the longest contiguous run of full-width rects, when that run is
/// long enough to count as a band stack.
pub fn find_band_stack(shapes: &[VectorShape], opts: &StabilizerOpts) -> Option<Vec<usize>> {
    let mut candidates: Vec<(usize, f64, f64)> = shapes
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match s {
            VectorShape::Rect(r)
                if r.x.abs() <= opts.band_edge_tolerance && r.width >= opts.band_full_width =>
            {
                Some((i, r.y, r.height))
            }
            _ => None,
        })
        .collect();
    if candidates.len() < opts.band_min_count {
        return None;
    }
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut best: &[(usize, f64, f64)] = &[];
    let mut run_start = 0;
    for i in 1..=candidates.len() {
        let breaks = i == candidates.len() || {
            let (_, prev_y, prev_h) = candidates[i - 1];
            (candidates[i].1 - (prev_y + prev_h)).abs() > opts.band_gap_tolerance
        };
        if breaks {
            let run = &candidates[run_start..i];
            if run.len() > best.len() {
                best = run;
            }
            run_start = i;
        }
    }

    (best.len() >= opts.band_min_count).then(|| best.iter().map(|c| c.0).collect())
}

/// Integer heights that sum exactly to `total` (remainder goes to the first bands).
pub fn partition_heights(total: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let base = (total / n as f64).floor();
    let remainder = (total - base * n as f64).round().max(0.0) as usize;
    (0..n)
        .map(|i| if i < remainder { base + 1.0 } else { base })
        .collect()
}

/// Re-tile the rects at `indices` (top-to-bottom order) so they exactly cover `span`.
pub fn retile(shapes: &mut [VectorShape], indices: &[usize], span: BandSpan) {
    let heights = partition_heights(span.height(), indices.len());
    let mut y = span.top;
    for (n, (&i, h)) in indices.iter().zip(heights).enumerate() {
        if let Some(VectorShape::Rect(r)) = shapes.get_mut(i) {
            r.x = WORLD_MIN;
            r.width = WORLD_MAX - WORLD_MIN;
            r.y = y;
            // The last band absorbs float residue so the stack ends exactly on the span edge.
            r.height = if n + 1 == indices.len() {
                span.bottom - y
            } else {
                h
            };
            y += h;
        }
    }
}

/// Detect and re-tile a band stack; returns `true` when `shapes` held one.
pub fn normalize_band_stack(
    shapes: &mut [VectorShape],
    span: BandSpan,
    opts: &StabilizerOpts,
) -> bool {
    match find_band_stack(shapes, opts) {
        Some(indices) => {
            retile(shapes, &indices, span);
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stabilize/bands.rs"]
mod tests;
