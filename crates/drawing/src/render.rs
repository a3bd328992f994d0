//! Deterministic stroke rasterization
//!
//! Paths are rendered by distance-to-path coverage, which yields round caps
//! and joins for free. Each segment is composited once, so overlapping
//! segments build up the way separately stroked canvas paths do.

use glam::Vec2;
use tracing::debug;

use crate::brush::BrushSettings;
use crate::constants::{
    CURVE_TOLERANCE, MAX_SEGMENT_ALPHA, MIN_DASH_LENGTH, MIN_ELAPSED_MS, MIN_LINE_WIDTH,
    MIN_SEGMENT_ALPHA, SOFT_BRUSH_HARDNESS, VELOCITY_TAPER,
};
use crate::geometry::{bounds_of, distance_to_segment, flatten_quadratic, midpoint};
use crate::stroke::Stroke;
use crate::surface::CpuSurface;
use crate::types::{BlendMode, Point};

/// Pixel bounding box (x, y, width, height)
pub type PixelRect = (u32, u32, u32, u32);

/// Style for one stroked path
#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    /// Line width in pixels
    pub width: f32,
    /// Straight RGBA
    pub color: [f32; 4],
    /// Opacity multiplier 0.0-1.0
    pub alpha: f32,
    /// Edge hardness 0.0-1.0
    pub hardness: f32,
    pub mode: BlendMode,
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if distance_normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = distance_normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        soft * (1.0 - hardness) + hardness
    }
}

/// Stroke a polyline onto the surface
///
/// A single point renders a round dot. Returns the affected region, or None
/// when the path misses the surface entirely.
pub fn stroke_polyline(
    surface: &mut CpuSurface,
    points: &[Vec2],
    style: &LineStyle,
) -> Option<PixelRect> {
    let (min, max) = bounds_of(points)?;
    let radius = style.width * 0.5;
    if radius <= 0.0 || style.alpha <= 0.0 {
        return None;
    }

    // One pixel of slack for the anti-aliased rim
    let pad = radius + 1.0;
    let x_min = ((min.x - pad).floor().max(0.0) as u32).min(surface.width);
    let y_min = ((min.y - pad).floor().max(0.0) as u32).min(surface.height);
    let x_max = ((max.x + pad).ceil().max(0.0) as u32).min(surface.width);
    let y_max = ((max.y + pad).ceil().max(0.0) as u32).min(surface.height);

    if x_min >= x_max || y_min >= y_max {
        return None;
    }

    for py in y_min..y_max {
        for px in x_min..x_max {
            let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let distance = distance_to_path(center, points);

            let edge = (radius + 0.5 - distance).clamp(0.0, 1.0);
            if edge <= 0.0 {
                continue;
            }
            let falloff = calculate_hardness_falloff((distance / radius).min(1.0), style.hardness);
            let coverage = edge * falloff * style.alpha;
            if coverage > 0.0 {
                surface.composite_pixel(px, py, style.color, coverage, style.mode);
            }
        }
    }

    Some((x_min, y_min, x_max - x_min, y_max - y_min))
}

fn distance_to_path(p: Vec2, points: &[Vec2]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => p.distance(*only),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Stroke a polyline as alternating dashes and gaps
///
/// A non-positive `dash` or `gap` draws a solid line. Positive lengths are
/// raised to at least [`MIN_DASH_LENGTH`].
pub fn stroke_dashed_polyline(
    surface: &mut CpuSurface,
    points: &[Vec2],
    style: &LineStyle,
    dash: f32,
    gap: f32,
) {
    if dash <= 0.0 || gap <= 0.0 {
        stroke_polyline(surface, points, style);
        return;
    }
    let dash = dash.max(MIN_DASH_LENGTH);
    let gap = gap.max(MIN_DASH_LENGTH);

    let mut current: Vec<Vec2> = Vec::new();
    let mut drawing = true;
    let mut remaining = dash;

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg_len = a.distance(b);
        if seg_len <= 0.0 {
            continue;
        }
        let dir = (b - a) / seg_len;

        // Distance walked along this segment
        let mut offset = 0.0;
        while offset < seg_len {
            let left = seg_len - offset;
            let start = a + dir * offset;
            let step = remaining.min(left);
            let end = if step >= left {
                offset = seg_len;
                b
            } else {
                offset += step;
                a + dir * offset
            };

            if drawing {
                if current.is_empty() {
                    current.push(start);
                }
                current.push(end);
            }

            remaining -= step;
            if remaining <= 0.0 {
                if drawing && current.len() > 1 {
                    stroke_polyline(surface, &current, style);
                }
                current.clear();
                drawing = !drawing;
                remaining = if drawing { dash } else { gap };
            }
        }
    }

    if drawing && current.len() > 1 {
        stroke_polyline(surface, &current, style);
    }
}

/// Line width for a segment ending at `pressure`, travelled at `velocity` px/ms
pub fn segment_width(brush: &BrushSettings, pressure: f32, velocity: f32) -> f32 {
    let pressured = brush.size * (1.0 + (pressure - 1.0) * brush.pressure_size_multiplier);
    let tapered = pressured * (1.0 - velocity.clamp(0.0, 1.0) * VELOCITY_TAPER);
    tapered.max(MIN_LINE_WIDTH)
}

/// Alpha for a segment ending at `pressure`
pub fn segment_alpha(brush: &BrushSettings, pressure: f32) -> f32 {
    let alpha =
        brush.opacity * (1.0 + (pressure - 1.0) * brush.pressure_opacity_multiplier) * brush.flow;
    alpha.clamp(MIN_SEGMENT_ALPHA, MAX_SEGMENT_ALPHA)
}

/// Velocity between two stored points in px/ms
pub fn point_velocity(from: &Point, to: &Point) -> f32 {
    let elapsed = to
        .timestamp_ms
        .saturating_sub(from.timestamp_ms)
        .max(MIN_ELAPSED_MS);
    from.position().distance(to.position()) / elapsed as f32
}

/// Render a stroke onto `surface`
///
/// Soft brushes (hardness below 0.9) are drawn as quadratic curves through
/// segment midpoints; hard brushes as straight segments. Erasers always use
/// `DestinationOut`, other brushes use `blend_override` when given.
pub fn render_stroke(stroke: &Stroke, surface: &mut CpuSurface, blend_override: Option<BlendMode>) {
    let brush = stroke.brush();
    let mode = brush.effective_blend_mode(blend_override);
    let points = stroke.points();

    let style_for = |pressure: f32, velocity: f32| LineStyle {
        width: segment_width(brush, pressure, velocity),
        color: if brush.is_eraser() {
            [0.0, 0.0, 0.0, 1.0]
        } else {
            brush.color
        },
        alpha: segment_alpha(brush, pressure),
        hardness: brush.hardness,
        mode,
    };

    if let [only] = points {
        stroke_polyline(surface, &[only.position()], &style_for(only.pressure, 0.0));
        return;
    }

    let soft = brush.hardness < SOFT_BRUSH_HARDNESS;
    let last = points.len() - 1;
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let curr = &points[i];
        let style = style_for(curr.pressure, point_velocity(prev, curr));

        let path = if soft {
            let start = if i == 1 {
                prev.position()
            } else {
                midpoint(points[i - 2].position(), prev.position())
            };
            let end = if i == last {
                curr.position()
            } else {
                midpoint(prev.position(), curr.position())
            };
            flatten_quadratic(start, prev.position(), end, CURVE_TOLERANCE)
        } else {
            vec![prev.position(), curr.position()]
        };

        stroke_polyline(surface, &path, &style);
    }

    debug!(
        "render_stroke: {} -> {} points, mode={:?}, soft={}",
        stroke.id(),
        points.len(),
        mode,
        soft
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushPreset;
    use crate::types::StrokeId;

    fn stroke(points: Vec<Point>, brush: BrushSettings) -> Stroke {
        Stroke::from_points(StrokeId(1), points, brush).unwrap()
    }

    #[test]
    fn test_hardness_falloff() {
        // Hard brush (hardness = 1.0)
        assert_eq!(calculate_hardness_falloff(0.0, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.5, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(1.0, 1.0), 1.0);

        // Soft brush (hardness = 0.0)
        assert_eq!(calculate_hardness_falloff(0.0, 0.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.5, 0.0), 0.5);
        assert_eq!(calculate_hardness_falloff(1.0, 0.0), 0.0);

        // Medium brush (hardness = 0.5)
        let mid = calculate_hardness_falloff(0.5, 0.5);
        assert!(mid > 0.5 && mid < 1.0);
    }

    #[test]
    fn test_stroke_polyline_covers_segment() {
        let mut surface = CpuSurface::new(20, 20);
        let style = LineStyle {
            width: 3.0,
            color: [1.0, 0.0, 0.0, 1.0],
            alpha: 1.0,
            hardness: 1.0,
            mode: BlendMode::Normal,
        };
        let rect = stroke_polyline(
            &mut surface,
            &[Vec2::new(2.0, 10.0), Vec2::new(18.0, 10.0)],
            &style,
        )
        .unwrap();

        assert!(rect.2 > 0 && rect.3 > 0);
        assert_eq!(surface.alpha_at(10, 9), 1.0);
        assert_eq!(surface.alpha_at(10, 2), 0.0);
    }

    #[test]
    fn test_stroke_polyline_outside_surface() {
        let mut surface = CpuSurface::new(10, 10);
        let style = LineStyle {
            width: 2.0,
            color: [1.0, 1.0, 1.0, 1.0],
            alpha: 1.0,
            hardness: 1.0,
            mode: BlendMode::Normal,
        };
        assert!(stroke_polyline(&mut surface, &[Vec2::new(-50.0, -50.0)], &style).is_none());
        assert!(surface.is_blank());
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut surface = CpuSurface::new(40, 5);
        let style = LineStyle {
            width: 1.0,
            color: [0.0, 0.0, 0.0, 1.0],
            alpha: 1.0,
            hardness: 1.0,
            mode: BlendMode::Normal,
        };
        stroke_dashed_polyline(
            &mut surface,
            &[Vec2::new(0.0, 2.5), Vec2::new(40.0, 2.5)],
            &style,
            5.0,
            5.0,
        );

        // Dash covers x in [0, 5], gap (5, 10), dash [10, 15]
        assert!(surface.alpha_at(2, 2) > 0.9);
        assert_eq!(surface.alpha_at(7, 2), 0.0);
        assert!(surface.alpha_at(12, 2) > 0.9);
    }

    #[test]
    fn test_pressure_monotonic_width() {
        let brush = BrushPreset::Pencil.settings().with_size(20.0);
        let mut last = 0.0;
        for step in 0..=10 {
            let pressure = step as f32 / 10.0;
            let width = segment_width(&brush, pressure, 0.25);
            assert!(width >= last, "width decreased at pressure {pressure}");
            last = width;
        }
    }

    #[test]
    fn test_pressure_monotonic_coverage() {
        let brush = BrushPreset::Pencil.settings().with_size(10.0);
        let coverage = |pressure: f32| {
            let mut surface = CpuSurface::new(64, 64);
            let line = stroke(
                vec![
                    Point::new(10.0, 32.0, pressure, 0),
                    Point::new(54.0, 32.0, pressure, 40),
                ],
                brush,
            );
            render_stroke(&line, &mut surface, None);
            (0..64)
                .flat_map(|y| (0..64).map(move |x| (x, y)))
                .filter(|&(x, y)| surface.alpha_at(x, y) > 0.0)
                .count()
        };

        let mut last = 0;
        for step in 1..=10 {
            let covered = coverage(step as f32 / 10.0);
            assert!(covered >= last, "coverage shrank at pressure {}", step as f32 / 10.0);
            last = covered;
        }
        assert!(coverage(1.0) > coverage(0.2));
    }

    #[test]
    fn test_tiny_dash_terminates() {
        let mut surface = CpuSurface::new(160, 20);
        let style = LineStyle {
            width: 2.0,
            color: [0.0, 0.0, 0.0, 1.0],
            alpha: 1.0,
            hardness: 1.0,
            mode: BlendMode::Normal,
        };
        stroke_dashed_polyline(
            &mut surface,
            &[Vec2::new(0.0, 10.0), Vec2::new(150.0, 10.0)],
            &style,
            1e-6,
            1e-6,
        );

        // Dashes and gaps clamp to half a pixel, which the round caps close up
        assert!(surface.alpha_at(75, 10) > 0.0);
        assert!(surface.alpha_at(149, 10) > 0.0);
        assert_eq!(surface.alpha_at(155, 10), 0.0);
    }

    #[test]
    fn test_velocity_tapers_width() {
        let brush = BrushPreset::Marker.settings();
        let slow = segment_width(&brush, 1.0, 0.0);
        let fast = segment_width(&brush, 1.0, 5.0);
        assert!((slow - 12.0).abs() < 1e-5);
        assert!((fast - 12.0 * 0.7).abs() < 1e-5);
        // Width never drops below one pixel
        let tiny = BrushSettings {
            size: 0.5,
            ..brush
        };
        assert_eq!(segment_width(&tiny, 0.0, 1.0), MIN_LINE_WIDTH);
    }

    #[test]
    fn test_segment_alpha_clamped() {
        let faint = BrushSettings {
            opacity: 0.01,
            ..BrushPreset::Spray.settings()
        };
        assert_eq!(segment_alpha(&faint, 0.0), MIN_SEGMENT_ALPHA);
        assert!((segment_alpha(&BrushPreset::Pencil.settings(), 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_velocity_floors_elapsed() {
        let a = Point::new(0.0, 0.0, 1.0, 10);
        let b = Point::new(3.0, 4.0, 1.0, 10);
        assert!((point_velocity(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_eraser_clears_opaque_surface() {
        let mut surface = CpuSurface::new(40, 40);
        surface.clear([0.2, 0.3, 0.9, 1.0]);

        let eraser = BrushSettings {
            blend_mode: BlendMode::Multiply,
            ..BrushPreset::Eraser.settings()
        };
        let stroke = stroke(
            vec![Point::new(5.0, 10.0, 1.0, 0), Point::new(35.0, 10.0, 1.0, 100)],
            eraser,
        );
        render_stroke(&stroke, &mut surface, Some(BlendMode::Screen));

        for x in 5..35 {
            assert_eq!(surface.alpha_at(x, 10), 0.0, "pixel {x} not erased");
        }
        // Outside the stroked band nothing changes
        assert_eq!(surface.alpha_at(20, 30), 1.0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let brush = BrushPreset::Spray.settings().with_color([0.8, 0.1, 0.1, 1.0]);
        let points = vec![
            Point::new(5.0, 5.0, 0.4, 0),
            Point::new(20.0, 12.0, 0.7, 16),
            Point::new(30.0, 30.0, 0.9, 32),
            Point::new(45.0, 35.0, 0.6, 48),
        ];
        let stroke = stroke(points, brush);

        let mut a = CpuSurface::new(64, 64);
        let mut b = CpuSurface::new(64, 64);
        render_stroke(&stroke, &mut a, None);
        render_stroke(&stroke, &mut b, None);

        assert!(!a.is_blank());
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_point_renders_dot() {
        let mut surface = CpuSurface::new(10, 10);
        let stroke = stroke(
            vec![Point::new(5.0, 5.0, 1.0, 0)],
            BrushPreset::Pencil.settings(),
        );
        render_stroke(&stroke, &mut surface, None);
        assert!(surface.alpha_at(4, 4) > 0.0);
        assert_eq!(surface.alpha_at(0, 0), 0.0);
    }
}
