use crate::foundation::core::{Affine, Point, Rect, Transform};
use kurbo::{BezPath, Shape as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard ceiling on shapes per object.
pub const MAX_SHAPES: usize = 60;

/// Paint layer, ordered back to front.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Painted first.
    Sky,
    /// Behind ground content.
    #[default]
    Background,
    /// Terrain and things standing on it.
    Ground,
    /// Painted last.
    Foreground,
}

impl Layer {
    /// Back-to-front rank: `sky=0 < background=1 < ground=2 < foreground=3`.
    pub fn rank(self) -> u32 {
        match self {
            Self::Sky => 0,
            Self::Background => 1,
            Self::Ground => 2,
            Self::Foreground => 3,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sky => "sky",
            Self::Background => "background",
            Self::Ground => "ground",
            Self::Foreground => "foreground",
        }
    }
}

/// Object lifecycle state. Transitions exactly once, `preview -> committed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    /// Tentative, awaiting confirmation.
    Preview,
    /// Permanent.
    Committed,
}

impl ObjectStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Committed => "committed",
        }
    }
}

/// One stop of a gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    /// CSS color string.
    pub color: String,
}

/// Gradient stop list, serialized as the flat array `[offset, color, offset, color, ...]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientStops(pub Vec<GradientStop>);

impl Serialize for GradientStops {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq as _;
        let mut seq = serializer.serialize_seq(Some(self.0.len() * 2))?;
        for stop in &self.0 {
            seq.serialize_element(&stop.offset)?;
            seq.serialize_element(&stop.color)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for GradientStops {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Item {
            Offset(f64),
            Color(String),
        }

        let items = Vec::<Item>::deserialize(deserializer)?;
        if items.len() % 2 != 0 {
            return Err(serde::de::Error::custom(
                "gradient stops must alternate offset and color (even length)",
            ));
        }
        let mut stops = Vec::with_capacity(items.len() / 2);
        for pair in items.chunks_exact(2) {
            match (&pair[0], &pair[1]) {
                (Item::Offset(offset), Item::Color(color)) => stops.push(GradientStop {
                    offset: *offset,
                    color: color.clone(),
                }),
                _ => {
                    return Err(serde::de::Error::custom(
                        "gradient stops must alternate offset (number) and color (string)",
                    ));
                }
            }
        }
        Ok(Self(stops))
    }
}

/// Paint attributes shared by every shape variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_gradient: Option<GradientStops>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radial_gradient: Option<GradientStops>,
}

impl ShapeStyle {
    /// Solid fill only.
    pub fn filled(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleShape {
    pub id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseShape {
    pub id: String,
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

/// Straight segment; `points` is `[x1, y1, x2, y2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    pub id: String,
    pub points: Vec<f64>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

/// Polyline or polygon; `points` is a flat `[x, y, x, y, ...]` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyShape {
    pub id: String,
    pub points: Vec<f64>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

/// SVG path data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathShape {
    pub id: String,
    pub d: String,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

/// Closed set of drawing primitives. Geometry is local to the owning object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorShape {
    Rect(RectShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Line(LineShape),
    Polyline(PolyShape),
    Polygon(PolyShape),
    Path(PathShape),
    Text(TextShape),
}

impl VectorShape {
    /// Shape id, unique within the owning object.
    pub fn id(&self) -> &str {
        match self {
            Self::Rect(s) => &s.id,
            Self::Circle(s) => &s.id,
            Self::Ellipse(s) => &s.id,
            Self::Line(s) => &s.id,
            Self::Polyline(s) | Self::Polygon(s) => &s.id,
            Self::Path(s) => &s.id,
            Self::Text(s) => &s.id,
        }
    }

    /// Wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rect(_) => "rect",
            Self::Circle(_) => "circle",
            Self::Ellipse(_) => "ellipse",
            Self::Line(_) => "line",
            Self::Polyline(_) => "polyline",
            Self::Polygon(_) => "polygon",
            Self::Path(_) => "path",
            Self::Text(_) => "text",
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Self::Rect(s) => &s.style,
            Self::Circle(s) => &s.style,
            Self::Ellipse(s) => &s.style,
            Self::Line(s) => &s.style,
            Self::Polyline(s) | Self::Polygon(s) => &s.style,
            Self::Path(s) => &s.style,
            Self::Text(s) => &s.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Self::Rect(s) => &mut s.style,
            Self::Circle(s) => &mut s.style,
            Self::Ellipse(s) => &mut s.style,
            Self::Line(s) => &mut s.style,
            Self::Polyline(s) | Self::Polygon(s) => &mut s.style,
            Self::Path(s) => &mut s.style,
            Self::Text(s) => &mut s.style,
        }
    }

    /// Local-space bounding box, or `None` for shapes with no measurable geometry
    /// (empty point lists, unparseable path data).
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(s) => Some(Rect::new(s.x, s.y, s.x + s.width, s.y + s.height)),
            Self::Circle(s) => Some(Rect::new(s.cx - s.r, s.cy - s.r, s.cx + s.r, s.cy + s.r)),
            Self::Ellipse(s) => Some(Rect::new(
                s.cx - s.rx,
                s.cy - s.ry,
                s.cx + s.rx,
                s.cy + s.ry,
            )),
            Self::Line(s) => points_bounds(&s.points),
            Self::Polyline(s) | Self::Polygon(s) => points_bounds(&s.points),
            Self::Path(s) => BezPath::from_svg(&s.d).ok().and_then(|p| {
                if p.elements().is_empty() {
                    None
                } else {
                    Some(p.bounding_box())
                }
            }),
            Self::Text(s) => Some(Rect::from_points(Point::new(s.x, s.y), Point::new(s.x, s.y))),
        }
    }

    /// Shift local geometry by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.apply_affine(Affine::translate((dx, dy)), 1.0);
    }

    /// Uniformly scale local geometry about the local origin.
    pub fn scale_about_origin(&mut self, factor: f64) {
        self.apply_affine(Affine::scale(factor), factor);
    }

    // `affine` must be a translate/uniform-scale map; `size_factor` scales radii and extents.
    fn apply_affine(&mut self, affine: Affine, size_factor: f64) {
        let map = |x: f64, y: f64| {
            let p = affine * Point::new(x, y);
            (p.x, p.y)
        };
        match self {
            Self::Rect(s) => {
                (s.x, s.y) = map(s.x, s.y);
                s.width *= size_factor;
                s.height *= size_factor;
                s.rx = s.rx.map(|r| r * size_factor);
            }
            Self::Circle(s) => {
                (s.cx, s.cy) = map(s.cx, s.cy);
                s.r *= size_factor;
            }
            Self::Ellipse(s) => {
                (s.cx, s.cy) = map(s.cx, s.cy);
                s.rx *= size_factor;
                s.ry *= size_factor;
            }
            Self::Line(s) => map_points(&mut s.points, map),
            Self::Polyline(s) | Self::Polygon(s) => map_points(&mut s.points, map),
            Self::Path(s) => {
                // Unparseable path data is left untouched rather than dropped.
                if let Ok(mut p) = BezPath::from_svg(&s.d) {
                    p.apply_affine(affine);
                    s.d = p.to_svg();
                }
            }
            Self::Text(s) => {
                (s.x, s.y) = map(s.x, s.y);
                s.font_size = s.font_size.map(|f| f * size_factor);
            }
        }
    }
}

fn map_points(points: &mut [f64], map: impl Fn(f64, f64) -> (f64, f64)) {
    for pair in points.chunks_exact_mut(2) {
        let (x, y) = map(pair[0], pair[1]);
        pair[0] = x;
        pair[1] = y;
    }
}

fn points_bounds(points: &[f64]) -> Option<Rect> {
    let mut it = points
        .chunks_exact(2)
        .map(|p| Point::new(p[0], p[1]));
    let first = it.next()?;
    Some(it.fold(Rect::from_points(first, first), |r, p| {
        r.union_pt(p)
    }))
}

/// Union of the local bounds of every measurable shape.
pub fn shapes_bounds(shapes: &[VectorShape]) -> Option<Rect> {
    shapes
        .iter()
        .filter_map(VectorShape::bounds)
        .reduce(|a, b| a.union(b))
}

/// A positioned, tagged group of shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: String,
    pub status: ObjectStatus,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_tag: Option<String>,
    pub shapes: Vec<VectorShape>,
}

/// High-level description of what the scene depicts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneIntent {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
}

/// The canonical scene.
///
/// `order` is a permutation of the keys of `objects`; index 0 is painted first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGraph {
    #[serde(default)]
    pub intent: Option<SceneIntent>,
    #[serde(default)]
    pub objects: BTreeMap<String, SceneObject>,
    #[serde(default)]
    pub order: Vec<String>,
}

impl SceneGraph {
    /// Empty scene with no intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object by id.
    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Objects in paint order.
    pub fn iter_painted(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Ids of preview objects in paint order.
    pub fn active_preview_ids(&self) -> Vec<String> {
        self.iter_painted()
            .filter(|o| o.status == ObjectStatus::Preview)
            .map(|o| o.id.clone())
            .collect()
    }

    /// Return `true` when `order` is exactly the key set of `objects` with no duplicates.
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.objects.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(self.order.len());
        self.order
            .iter()
            .all(|id| self.objects.contains_key(id) && seen.insert(id.as_str()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
