use crate::foundation::config::StabilizerOpts;
use crate::foundation::core::{Point, Rect, Transform, Vec2};
use crate::scene::model::{VectorShape, shapes_bounds};

/// Return `true` when local bounds look like world-space coordinates rather than geometry around
/// the object origin.
pub fn needs_rebase(bounds: Rect, opts: &StabilizerOpts) -> bool {
    let near = opts.rebase_near_margin;
    let far = opts.rebase_far_margin;
    bounds.x0 > near
        || bounds.y0 > near
        || bounds.x0 < -far
        || bounds.y0 < -far
        || bounds.x1 > far
        || bounds.y1 > far
}

/// Shift shapes so their local bbox starts at the origin and fold the shift into the transform.
///
/// When the transform already sits inside the (near-inflated) shape bounds, the shapes were
/// authored in world space on top of a world-space transform; the bbox corner then becomes the
/// new translation instead of being added to it. Returns the new (unclamped) transform, or `None`
/// when no rebase was needed or the bbox already starts at the origin.
pub fn rebase_shapes(
    shapes: &mut [VectorShape],
    transform: Transform,
    opts: &StabilizerOpts,
) -> Option<Transform> {
    let bounds = shapes_bounds(shapes)?;
    if !needs_rebase(bounds, opts) {
        return None;
    }

    let shift = Vec2::new(bounds.x0, bounds.y0);
    if shift == Vec2::ZERO {
        return None;
    }
    for s in shapes.iter_mut() {
        s.translate(-shift.x, -shift.y);
    }

    let placed = transform.x != 0.0 || transform.y != 0.0;
    let doubled = placed
        && bounds
            .inflate(opts.rebase_near_margin, opts.rebase_near_margin)
            .contains(Point::new(transform.x, transform.y));

    let origin = if doubled {
        shift
    } else {
        Vec2::new(transform.x, transform.y) + transform.map_local_offset(shift)
    };

    Some(Transform {
        x: origin.x,
        y: origin.y,
        ..transform
    })
}

#[cfg(test)]
#[path = "../../tests/unit/stabilize/rebase.rs"]
mod tests;
