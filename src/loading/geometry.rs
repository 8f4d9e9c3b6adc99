//! Points and the quadratic Bezier control point solver.

use serde::Serialize;

/// Parameter at which the rope's apex is evaluated.
const APEX_T: f64 = 0.5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Back-solves the control point of `B(t) = (1-t)²·start + 2t(1-t)·C + t²·end` so that the curve
/// passes through `apex` at `t = 0.5`.
///
/// Only the `y` component is meaningful. The `x` component is computed from `start.y` and `end.y`
/// too, so it is not a real abscissa; callers place the control point at the horizontal center
/// instead.
pub fn control_point(start: Point, end: Point, apex: Point) -> Point {
    let t = APEX_T;
    let s = 1. - t;
    let weight = 2. * t * s;

    // x 分量沿用 start.y / end.y，与 y 分量同一公式
    let x = (apex.x - s * s * start.y - t * t * end.y) / weight;
    let y = (apex.y - s * s * start.y - t * t * end.y) / weight;
    Point { x, y }
}

/// Evaluates the quadratic Bezier `start → control → end` at `t`.
pub fn quad_at(start: Point, control: Point, end: Point, t: f64) -> Point {
    let s = 1. - t;
    Point {
        x: s * s * start.x + 2. * t * s * control.x + t * t * end.x,
        y: s * s * start.y + 2. * t * s * control.y + t * t * end.y,
    }
}
