pub use kurbo::{Affine, Point, Rect, Vec2};

/// Lower bound of world coordinates on both axes.
pub const WORLD_MIN: f64 = 0.0;
/// Upper bound of world coordinates on both axes.
pub const WORLD_MAX: f64 = 100.0;
/// World-space boundary between the sky/background band and the ground/foreground band.
pub const HORIZON_Y: f64 = 45.0;
/// Smallest allowed object scale.
pub const SCALE_MIN: f64 = 0.1;
/// Largest allowed object scale.
pub const SCALE_MAX: f64 = 3.0;
/// Rotation bound in degrees (symmetric).
pub const ROTATION_LIMIT_DEG: f64 = 180.0;

/// Placement of an object in world space.
///
/// World coordinates are percent-of-canvas with `y` increasing downward. A shape's geometry is local
/// to its object; world position is `translate(x, y) * rotate(rotation) * scale(scale)` applied to it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Horizontal offset in `[0, 100]`.
    #[serde(default)]
    pub x: f64,
    /// Vertical offset in `[0, 100]`.
    #[serde(default)]
    pub y: f64,
    /// Uniform scale in `[0.1, 3]`.
    #[serde(default = "one")]
    pub scale: f64,
    /// Rotation in degrees in `[-180, 180]`.
    #[serde(default)]
    pub rotation: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity placement `{0, 0, 1, 0}`.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotation: 0.0,
    };

    /// Saturate every field into its declared bound.
    ///
    /// Already-bounded transforms are returned unchanged.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_coord(self.x),
            y: clamp_coord(self.y),
            scale: clamp_finite(self.scale, SCALE_MIN, SCALE_MAX, 1.0),
            rotation: clamp_finite(self.rotation, -ROTATION_LIMIT_DEG, ROTATION_LIMIT_DEG, 0.0),
        }
    }

    /// Return `true` when every field is inside its declared bound.
    pub fn is_bounded(&self) -> bool {
        self.clamped() == *self
    }

    /// Local-to-world affine map.
    pub fn to_affine(self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(self.scale)
    }

    /// Map a local-space displacement into world space (scale and rotation, no translation).
    pub fn map_local_offset(self, offset: Vec2) -> Vec2 {
        let a = Affine::rotate(self.rotation.to_radians()) * Affine::scale(self.scale);
        (a * offset.to_point()).to_vec2()
    }
}

/// Partial transform carried by update patches; present fields override the current transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformPatch {
    /// New horizontal offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New vertical offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// New rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl TransformPatch {
    /// A patch that sets every field.
    pub fn full(t: Transform) -> Self {
        Self {
            x: Some(t.x),
            y: Some(t.y),
            scale: Some(t.scale),
            rotation: Some(t.rotation),
        }
    }

    /// Overlay present fields onto `base`.
    pub fn merge_over(&self, base: Transform) -> Transform {
        Transform {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            scale: self.scale.unwrap_or(base.scale),
            rotation: self.rotation.unwrap_or(base.rotation),
        }
    }

    /// Saturate present fields into their declared bounds.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.map(clamp_coord),
            y: self.y.map(clamp_coord),
            scale: self.scale.map(|s| clamp_finite(s, SCALE_MIN, SCALE_MAX, 1.0)),
            rotation: self
                .rotation
                .map(|r| clamp_finite(r, -ROTATION_LIMIT_DEG, ROTATION_LIMIT_DEG, 0.0)),
        }
    }
}

/// Saturate a world coordinate into `[0, 100]`.
pub fn clamp_coord(v: f64) -> f64 {
    clamp_finite(v, WORLD_MIN, WORLD_MAX, WORLD_MIN)
}

// NaN has no meaningful saturation, so it falls back to `fallback`.
fn clamp_finite(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_nan() { fallback } else { v.clamp(lo, hi) }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
