//! Data space → canvas space mapping with aspect-preserving letterboxing.

use glam::DVec2;

use crate::errors::LayoutError;
use crate::types::{DataRect, Point, Viewport};

/// Linearly rescale `t` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// No clamping: a result outside the output range means the input was
/// outside the input range.
#[inline]
pub fn map_range(t: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (t - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Apply [`map_range`] to each axis independently.
#[inline]
pub fn map_point(point: Point, in_min: Point, in_max: Point, out_min: Point, out_max: Point) -> Point {
    DVec2::new(
        map_range(point.x, in_min.x, in_max.x, out_min.x, out_max.x),
        map_range(point.y, in_min.y, in_max.y, out_min.y, out_max.y),
    )
}

/// Map a data-space point into the viewport.
#[inline]
pub fn to_canvas(point: Point, data_rect: &DataRect, viewport: &Viewport) -> Point {
    map_point(point, data_rect.min(), data_rect.max(), viewport.min(), viewport.max())
}

/// Compute the letterboxed viewport for `data_rect` on a padded canvas.
///
/// The axis where the data is relatively longer fills the padded canvas; the
/// other axis is centered. When both aspect ratios are equal the horizontal
/// axis is the padded one.
pub fn compute_viewport(
    canvas_width: f64,
    canvas_height: f64,
    padding: f64,
    data_rect: &DataRect,
) -> Result<Viewport, LayoutError> {
    data_rect.validate()?;

    let inner_w = canvas_width - 2.0 * padding;
    let inner_h = canvas_height - 2.0 * padding;
    if !(inner_w > 0.0 && inner_h > 0.0) || padding < 0.0 {
        return Err(LayoutError::InvalidCanvas {
            width: canvas_width,
            height: canvas_height,
            padding,
        });
    }

    let data_aspect = data_rect.aspect();
    let canvas_aspect = inner_w / inner_h;

    let viewport = if data_aspect < canvas_aspect {
        // Data is relatively taller: pad vertically, center horizontally
        let h = inner_h;
        let w = data_aspect * h;
        Viewport { x: 0.5 * (canvas_width - w), y: padding, w, h }
    } else {
        let w = inner_w;
        let h = w / data_aspect;
        Viewport { x: padding, y: 0.5 * (canvas_height - h), w, h }
    };

    crate::log::debug!(
        data_aspect,
        canvas_aspect,
        x = viewport.x,
        y = viewport.y,
        w = viewport.w,
        h = viewport.h,
        "computed viewport"
    );

    Ok(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "{} != {}",
            actual,
            expected
        );
    }

    fn assert_contained(vp: &Viewport, width: f64, height: f64, padding: f64) {
        assert!(vp.x >= padding - EPSILON, "x {} < padding", vp.x);
        assert!(vp.y >= padding - EPSILON, "y {} < padding", vp.y);
        assert!(vp.x + vp.w <= width - padding + EPSILON, "right edge {}", vp.x + vp.w);
        assert!(vp.y + vp.h <= height - padding + EPSILON, "bottom edge {}", vp.y + vp.h);
        let touches_x = (vp.x - padding).abs() < EPSILON && (vp.x + vp.w - (width - padding)).abs() < EPSILON;
        let touches_y = (vp.y - padding).abs() < EPSILON && (vp.y + vp.h - (height - padding)).abs() < EPSILON;
        assert!(touches_x || touches_y, "no axis touches padding: {:?}", vp);
    }

    #[test]
    fn map_range_linear() {
        assert_close(map_range(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_close(map_range(0.0, -1.0, 1.0, 10.0, 20.0), 15.0);
        // No clamping
        assert_close(map_range(20.0, 0.0, 10.0, 0.0, 100.0), 200.0);
        assert_close(map_range(-5.0, 0.0, 10.0, 0.0, 100.0), -50.0);
    }

    #[test]
    fn map_point_is_monotonic() {
        let (in_min, in_max) = (DVec2::new(-4.2, 1.5), DVec2::new(2.2, 14.0));
        let (out_min, out_max) = (DVec2::new(25.0, 300.0), DVec2::new(2315.0, 3000.0));
        let samples = [-4.0, -3.1, -0.5, 0.0, 1.7, 2.1];
        for pair in samples.windows(2) {
            let a = map_point(DVec2::new(pair[0], pair[0] + 6.0), in_min, in_max, out_min, out_max);
            let b = map_point(DVec2::new(pair[1], pair[1] + 6.0), in_min, in_max, out_min, out_max);
            assert!(a.x < b.x && a.y < b.y, "{:?} !< {:?}", a, b);
        }
    }

    #[test]
    fn map_point_round_trip() {
        let (in_min, in_max) = (DVec2::new(-4.2, 1.5), DVec2::new(2.2, 14.0));
        let (out_min, out_max) = (DVec2::new(25.0, 312.5), DVec2::new(2315.0, 2997.5));
        for p in [DVec2::new(-4.2, 1.5), DVec2::new(0.3, 7.77), DVec2::new(9.0, -3.0)] {
            let there = map_point(p, in_min, in_max, out_min, out_max);
            let back = map_point(there, out_min, out_max, in_min, in_max);
            assert_close(back.x, p.x);
            assert_close(back.y, p.y);
        }
    }

    #[test]
    fn tall_data_pads_vertically() {
        // Original plotter layout: A1 portrait at 100 dpi with quarter inch padding
        let rect = DataRect::new(-4.2, 2.2, 1.5, 14.0);
        let vp = compute_viewport(2340.0, 3310.0, 25.0, &rect).unwrap();
        assert_close(vp.y, 25.0);
        assert_close(vp.h, 3260.0);
        assert_close(vp.w, 6.4 / 12.5 * 3260.0);
        assert_close(vp.x, 0.5 * (2340.0 - vp.w));
        assert_contained(&vp, 2340.0, 3310.0, 25.0);
    }

    #[test]
    fn wide_data_pads_horizontally() {
        let rect = DataRect::new(0.0, 40.0, 0.0, 10.0);
        let vp = compute_viewport(200.0, 300.0, 10.0, &rect).unwrap();
        assert_close(vp.x, 10.0);
        assert_close(vp.w, 180.0);
        assert_close(vp.h, 45.0);
        assert_close(vp.y, 127.5);
        assert_contained(&vp, 200.0, 300.0, 10.0);
    }

    #[test]
    fn equal_aspect_takes_horizontal_branch() {
        let rect = DataRect::new(0.0, 10.0, 0.0, 10.0);
        let vp = compute_viewport(120.0, 120.0, 10.0, &rect).unwrap();
        assert_eq!(vp, Viewport { x: 10.0, y: 10.0, w: 100.0, h: 100.0 });
    }

    #[test]
    fn viewport_always_contained() {
        let canvases = [(2340.0, 3310.0, 25.0), (500.0, 200.0, 0.0), (90.0, 90.0, 5.0)];
        let rects = [
            DataRect::new(-4.2, 2.2, 1.5, 14.0),
            DataRect::new(0.0, 1000.0, 0.0, 1.0),
            DataRect::new(-1.0, 1.0, -50.0, 50.0),
            DataRect::new(3.0, 4.0, 3.0, 4.0),
        ];
        for (w, h, p) in canvases {
            for rect in &rects {
                let vp = compute_viewport(w, h, p, rect).unwrap();
                assert_contained(&vp, w, h, p);
            }
        }
    }

    #[test]
    fn degenerate_data_rect_is_invalid_range() {
        let flat = DataRect::new(0.0, 10.0, 3.0, 3.0);
        assert!(matches!(
            compute_viewport(100.0, 100.0, 0.0, &flat),
            Err(LayoutError::InvalidRange { .. })
        ));
        let inverted = DataRect::new(10.0, 0.0, 0.0, 10.0);
        assert!(matches!(
            compute_viewport(100.0, 100.0, 0.0, &inverted),
            Err(LayoutError::InvalidRange { .. })
        ));
    }

    #[test]
    fn padding_swallowing_canvas_is_invalid() {
        let rect = DataRect::new(0.0, 1.0, 0.0, 1.0);
        assert!(matches!(
            compute_viewport(100.0, 100.0, 50.0, &rect),
            Err(LayoutError::InvalidCanvas { .. })
        ));
    }
}
