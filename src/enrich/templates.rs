//! Canned shape sets per semantic category.
//!
//! Object templates are authored around the local origin with the object's base near `y = 0`.
//! Backdrop templates are world-space bands meant for an identity transform.

use crate::foundation::core::{HORIZON_Y, WORLD_MAX, WORLD_MIN};
use crate::scene::model::{
    CircleShape, EllipseShape, GradientStop, GradientStops, LineShape, PolyShape, RectShape,
    ShapeStyle, VectorShape,
};
use crate::scene::semantic::Category;

/// Template shapes for `category`, using `primary` as the main color when given.
pub fn template(category: Category, primary: Option<&str>) -> Vec<VectorShape> {
    let main = |default: &str| primary.unwrap_or(default).to_string();
    match category {
        Category::Tree => vec![
            rect("trunk", -1.0, 0.0, 2.0, 8.0, "#6b4423"),
            circle("crown", 0.0, -3.0, 5.0, &main("#2e8b57")),
            circle("crown-left", -3.0, -1.0, 3.5, &main("#2e8b57")),
            circle("crown-right", 3.0, -1.0, 3.5, &main("#2e8b57")),
        ],
        Category::House => vec![
            rect("walls", -8.0, -8.0, 16.0, 10.0, &main("#d9a066")),
            polygon("roof", &[-10.0, -8.0, 0.0, -16.0, 10.0, -8.0], "#8b3a3a"),
            rect("door", -1.5, -3.0, 3.0, 5.0, "#5b3a29"),
            rect("window-left", -6.0, -6.0, 3.0, 3.0, "#9fd3ff"),
            rect("window-right", 3.0, -6.0, 3.0, 3.0, "#9fd3ff"),
        ],
        Category::Person => vec![
            rect("torso", -2.0, -12.0, 4.0, 7.0, &main("#3b6fb6")),
            circle("head", 0.0, -14.0, 2.0, "#f1c27d"),
            line("arms", [-4.0, -10.0, 4.0, -10.0], "#333333"),
            line("leg-left", [-1.0, -5.0, -2.0, 0.0], "#333333"),
            line("leg-right", [1.0, -5.0, 2.0, 0.0], "#333333"),
        ],
        Category::Car => {
            let mut body = rect("body", -8.0, -5.0, 16.0, 4.0, &main("#c0392b"));
            if let VectorShape::Rect(r) = &mut body {
                r.rx = Some(1.0);
            }
            vec![
                rect("cabin", -4.0, -8.0, 8.0, 3.5, &main("#c0392b")),
                body,
                rect("windshield", -3.0, -7.5, 6.0, 2.5, "#cfe8ff"),
                circle("wheel-front", 5.0, -1.0, 1.8, "#222222"),
                circle("wheel-back", -5.0, -1.0, 1.8, "#222222"),
            ]
        }
        Category::Bush => vec![
            ellipse("bush-left", -3.0, -2.0, 3.5, 2.5, &main("#3f7d3a")),
            ellipse("bush-right", 3.0, -2.0, 3.5, 2.5, &main("#3f7d3a")),
            ellipse("bush-top", 0.0, -3.5, 4.0, 3.0, &main("#3f7d3a")),
        ],
        Category::Flower => {
            let petal = main("#e91e63");
            let mut shapes = vec![line("stem", [0.0, 0.0, 0.0, -6.0], "#2e7d32")];
            for (i, (dx, dy)) in [(0.0, -1.2), (1.2, 0.0), (0.0, 1.2), (-1.2, 0.0)]
                .into_iter()
                .enumerate()
            {
                shapes.push(circle(&format!("petal-{i}"), dx, -7.0 + dy, 1.0, &petal));
            }
            shapes.push(circle("center", 0.0, -7.0, 0.8, "#ffd54f"));
            shapes
        }
        Category::Mountain => vec![
            polygon("slope", &[-15.0, 0.0, 0.0, -20.0, 15.0, 0.0], &main("#7d7d8a")),
            with_opacity(
                polygon("shade", &[0.0, -20.0, 15.0, 0.0, 5.0, 0.0], "#5e5e6b"),
                0.6,
            ),
            polygon("snowcap", &[-4.5, -14.0, 0.0, -20.0, 4.5, -14.0], "#ffffff"),
        ],
        Category::Cloud => vec![
            ellipse("puff-base", 0.0, 0.0, 7.0, 2.5, &main("#ffffff")),
            circle("puff-left", -3.0, -1.5, 2.5, &main("#ffffff")),
            circle("puff-mid", 0.5, -2.5, 3.2, &main("#ffffff")),
            circle("puff-right", 3.5, -1.2, 2.2, &main("#ffffff")),
        ],
        Category::Sun => {
            let color = main("#ffd23f");
            let mut shapes = vec![
                with_opacity(circle("glow", 0.0, 0.0, 7.0, &color), 0.3),
                circle("disc", 0.0, 0.0, 5.0, &color),
            ];
            for i in 0..8 {
                let a = f64::from(i) * std::f64::consts::FRAC_PI_4;
                let (s, c) = a.sin_cos();
                shapes.push(line(
                    &format!("ray-{i}"),
                    [c * 7.5, s * 7.5, c * 9.5, s * 9.5],
                    &color,
                ));
            }
            shapes
        }
        Category::Bird => vec![
            VectorShape::Polyline(PolyShape {
                id: "wings".into(),
                points: vec![-3.0, 0.0, -1.5, -1.0, 0.0, 0.0, 1.5, -1.0, 3.0, 0.0],
                style: ShapeStyle {
                    fill: Some("none".into()),
                    stroke: Some(main("#333333")),
                    stroke_width: Some(0.4),
                    ..ShapeStyle::default()
                },
            }),
            ellipse("body", 0.0, 0.2, 0.8, 0.4, &main("#333333")),
        ],
        Category::Sky => {
            let top = main("#4a90d9");
            let mut base = rect("sky-base", WORLD_MIN, WORLD_MIN, WORLD_MAX, HORIZON_Y, &top);
            base.style_mut().linear_gradient = Some(GradientStops(vec![
                GradientStop {
                    offset: 0.0,
                    color: top.clone(),
                },
                GradientStop {
                    offset: 1.0,
                    color: "#cfe9ff".into(),
                },
            ]));
            vec![
                base,
                with_opacity(
                    rect("sky-haze", WORLD_MIN, HORIZON_Y - 10.0, WORLD_MAX, 10.0, "#ffffff"),
                    0.25,
                ),
            ]
        }
        Category::Ground => vec![
            rect(
                "ground-base",
                WORLD_MIN,
                HORIZON_Y,
                WORLD_MAX,
                WORLD_MAX - HORIZON_Y,
                &main("#5a9e4b"),
            ),
            with_opacity(
                rect("ground-shade", WORLD_MIN, 80.0, WORLD_MAX, WORLD_MAX - 80.0, "#3e7a32"),
                0.5,
            ),
        ],
    }
}

fn rect(id: &str, x: f64, y: f64, width: f64, height: f64, fill: &str) -> VectorShape {
    VectorShape::Rect(RectShape {
        id: id.into(),
        x,
        y,
        width,
        height,
        rx: None,
        style: ShapeStyle::filled(fill),
    })
}

fn circle(id: &str, cx: f64, cy: f64, r: f64, fill: &str) -> VectorShape {
    VectorShape::Circle(CircleShape {
        id: id.into(),
        cx,
        cy,
        r,
        style: ShapeStyle::filled(fill),
    })
}

fn ellipse(id: &str, cx: f64, cy: f64, rx: f64, ry: f64, fill: &str) -> VectorShape {
    VectorShape::Ellipse(EllipseShape {
        id: id.into(),
        cx,
        cy,
        rx,
        ry,
        style: ShapeStyle::filled(fill),
    })
}

fn line(id: &str, points: [f64; 4], stroke: &str) -> VectorShape {
    VectorShape::Line(LineShape {
        id: id.into(),
        points: points.to_vec(),
        style: ShapeStyle {
            stroke: Some(stroke.into()),
            stroke_width: Some(0.8),
            ..ShapeStyle::default()
        },
    })
}

fn polygon(id: &str, points: &[f64], fill: &str) -> VectorShape {
    VectorShape::Polygon(PolyShape {
        id: id.into(),
        points: points.to_vec(),
        style: ShapeStyle::filled(fill),
    })
}

fn with_opacity(mut shape: VectorShape, opacity: f64) -> VectorShape {
    shape.style_mut().opacity = Some(opacity);
    shape
}
