//! Geometry helpers shared by the stroke engine, rasterizer and mask.

use std::ops::{Add, Mul};

use glam::Vec2;

use crate::constants::MIN_SMOOTHING_WINDOW;

/// Upper bound on curve subdivisions per segment
const MAX_CURVE_STEPS: usize = 64;

#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Number of raw samples averaged for a given smoothing amount (0..1)
pub fn smoothing_window(smoothing: f32) -> usize {
    let scaled = (smoothing.max(0.0) * 10.0).floor() as usize;
    scaled.max(MIN_SMOOTHING_WINDOW)
}

/// Weighted moving average with linearly increasing weights
///
/// The oldest value has weight 1 and the newest weight `values.len()`.
/// Returns None for an empty slice.
pub fn weighted_mean<T>(values: &[T]) -> Option<T>
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let (first, rest) = values.split_first()?;
    let mut sum = *first * 1.0;
    let mut total = 1.0;
    for (i, value) in rest.iter().enumerate() {
        let weight = (i + 2) as f32;
        sum = sum + *value * weight;
        total += weight;
    }
    Some(sum * (1.0 / total))
}

/// Shortest distance from `p` to the segment `a..b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Evaluate a quadratic Bezier at `t`
#[inline]
pub fn quadratic_point(p0: Vec2, control: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    p0 * (mt * mt) + control * (2.0 * mt * t) + p1 * (t * t)
}

/// Flatten a quadratic Bezier into a polyline including both endpoints
///
/// The step count is chosen so the chord error stays under `tolerance`.
pub fn flatten_quadratic(p0: Vec2, control: Vec2, p1: Vec2, tolerance: f32) -> Vec<Vec2> {
    let deviation = (p0 - control * 2.0 + p1).length();
    let steps = if deviation <= f32::EPSILON || tolerance <= 0.0 {
        1
    } else {
        ((deviation / (4.0 * tolerance)).sqrt().ceil() as usize).clamp(1, MAX_CURVE_STEPS)
    };

    let mut points = Vec::with_capacity(steps + 1);
    points.push(p0);
    for i in 1..steps {
        let t = i as f32 / steps as f32;
        points.push(quadratic_point(p0, control, p1, t));
    }
    points.push(p1);
    points
}

/// Axis-aligned bounds of a set of points, or None if empty
pub fn bounds_of(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
    )
}
