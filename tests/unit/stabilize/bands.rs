use super::*;
use crate::scene::model::{CircleShape, RectShape, ShapeStyle};

fn band(id: &str, y: f64, height: f64) -> VectorShape {
    VectorShape::Rect(RectShape {
        id: id.to_string(),
        x: 0.0,
        y,
        width: 100.0,
        height,
        rx: None,
        style: ShapeStyle::filled("#88c"),
    })
}

fn rect_geom(s: &VectorShape) -> (f64, f64, f64, f64) {
    let VectorShape::Rect(r) = s else {
        panic!("expected rect")
    };
    (r.x, r.y, r.width, r.height)
}

#[test]
fn heights_partition_exactly() {
    assert_eq!(partition_heights(100.0, 3), vec![34.0, 33.0, 33.0]);
    assert_eq!(partition_heights(45.0, 4), vec![12.0, 11.0, 11.0, 11.0]);
    assert_eq!(partition_heights(55.0, 5), vec![11.0; 5]);
    assert!(partition_heights(10.0, 0).is_empty());
}

#[test]
fn three_bands_tile_whole_canvas() {
    let mut shapes = vec![band("a", 0.0, 30.0), band("b", 31.0, 30.0), band("c", 60.0, 38.0)];
    assert!(normalize_band_stack(
        &mut shapes,
        BandSpan::FULL,
        &StabilizerOpts::default()
    ));
    assert_eq!(rect_geom(&shapes[0]), (0.0, 0.0, 100.0, 34.0));
    assert_eq!(rect_geom(&shapes[1]), (0.0, 34.0, 100.0, 33.0));
    assert_eq!(rect_geom(&shapes[2]), (0.0, 67.0, 100.0, 33.0));
}

#[test]
fn stack_is_found_out_of_order_and_among_other_shapes() {
    let sun = VectorShape::Circle(CircleShape {
        id: "sun".into(),
        cx: 80.0,
        cy: 10.0,
        r: 5.0,
        style: ShapeStyle::default(),
    });
    let shapes = vec![band("low", 30.0, 15.0), sun, band("top", 0.0, 15.0), band("mid", 15.0, 15.0)];
    assert_eq!(
        find_band_stack(&shapes, &StabilizerOpts::default()),
        Some(vec![2, 3, 0])
    );
}

#[test]
fn gaps_break_the_stack() {
    let shapes = vec![band("a", 0.0, 10.0), band("b", 10.0, 10.0), band("c", 40.0, 10.0)];
    assert_eq!(find_band_stack(&shapes, &StabilizerOpts::default()), None);
}

#[test]
fn narrow_rects_are_not_bands() {
    let mut shapes = vec![band("a", 0.0, 10.0), band("b", 10.0, 10.0), band("c", 20.0, 10.0)];
    if let VectorShape::Rect(r) = &mut shapes[1] {
        r.width = 50.0;
    }
    assert_eq!(find_band_stack(&shapes, &StabilizerOpts::default()), None);
}

#[test]
fn target_prefers_phrase_then_tag_then_layer() {
    assert_eq!(
        band_target(Layer::Sky, Some("sky"), "fill the entire canvas with a sunset"),
        BandSpan::FULL
    );
    assert_eq!(band_target(Layer::Ground, Some("sky"), "sunset"), BandSpan::SKY);
    assert_eq!(band_target(Layer::Sky, Some("grass field"), ""), BandSpan::GROUND);
    assert_eq!(band_target(Layer::Foreground, None, ""), BandSpan::GROUND);
    assert_eq!(band_target(Layer::Background, Some("stripes"), ""), BandSpan::SKY);
}
