// rope.rs
// 绳子形状：根据小球圆心高度 ballY 和当前阶段求出贝塞尔曲线控制点的 Y 坐标。
//
// 下降：球接触绳子之前绳子保持水平，接触之后绳子贴着球一起下沉到最低点。
// 上升：球线分离之前绳子随球上升；分离后绳子先向下回弹 1.5 倍下沉距离，
// 再向上反弹 0.5 倍下沉距离，最后静止。
//
//   ballY 从大到小（屏幕坐标向上为负）：
//   bottom ─┬─ 随球上升
//   separation ─┬─ 向下回弹（镜像）
//   overshoot_end ─┬─ 向上反弹
//   rebound_end ─┴─ 静止

use serde::Serialize;

use crate::loading::geometry::{control_point, Point};
use crate::loading::layout::Layout;

/// How far the rope swings back down after the ball leaves it, in drop distances.
pub const OVERSHOOT_FACTOR: f64 = 1.5;

/// How far the rope then bounces back up past the rest line, in drop distances.
///
/// Must equal `OVERSHOOT_FACTOR - 1` for the rope to settle without a jump.
pub const REBOUND_FACTOR: f64 = OVERSHOOT_FACTOR - 1.;

/// Offset, in drop distances, between the ball and the rope center while rebounding.
const REBOUND_OFFSET: f64 = 2. * OVERSHOOT_FACTOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Ball falls from the top onto the rope, accelerating.
    Descending,
    /// Ball bounces back up, decelerating; the rope springs back.
    Ascending,
}

/// `ballY` thresholds that split each phase into rope behaviors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeBands {
    start: Point,
    end: Point,
    center_x: f64,
    rest_y: f64,
    drop_distance: f64,
    contact_offset: f64,
    /// Ball height at which it first touches the rope from above.
    pub contact: f64,
    pub bottom: f64,
    /// Ball height at which it leaves the rope on the way up.
    pub separation: f64,
    pub overshoot_end: f64,
    pub rebound_end: f64,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Descending => Phase::Ascending,
            Phase::Ascending => Phase::Descending,
        }
    }
}

impl RopeBands {
    pub fn new(layout: &Layout) -> Self {
        let d = layout.metrics.drop_distance;
        let contact_offset = layout.contact_offset();
        let contact = layout.rest_y - contact_offset;
        let separation = contact - d;
        let overshoot_end = separation - OVERSHOOT_FACTOR * d;
        let rebound_end = overshoot_end - REBOUND_FACTOR * d;

        Self {
            start: layout.start,
            end: layout.end,
            center_x: layout.center_x,
            rest_y: layout.rest_y,
            drop_distance: d,
            contact_offset,
            contact,
            bottom: layout.bottom_y(),
            separation,
            overshoot_end,
            rebound_end,
        }
    }

    pub fn rest_y(&self) -> f64 {
        self.rest_y
    }

    /// Returns the height of the rope's control point for a ball at `ball_y`.
    pub fn control_y(&self, phase: Phase, ball_y: f64) -> f64 {
        match phase {
            Phase::Descending => self.descending(ball_y),
            Phase::Ascending => self.ascending(ball_y),
        }
    }

    fn descending(&self, ball_y: f64) -> f64 {
        if ball_y < self.contact {
            self.rest_y
        } else {
            self.solve(ball_y)
        }
    }

    fn ascending(&self, ball_y: f64) -> f64 {
        let d = self.drop_distance;

        if self.separation <= ball_y && ball_y <= self.bottom {
            self.solve(ball_y)
        } else if self.overshoot_end <= ball_y && ball_y < self.separation {
            // 以分离点为轴镜像球的位移
            self.solve(2. * self.separation - ball_y)
        } else if self.rebound_end <= ball_y && ball_y < self.overshoot_end {
            self.solve(ball_y + REBOUND_OFFSET * d)
        } else {
            self.rest_y
        }
    }

    /// Control point height for a rope whose center rests under a ball at `center_y`.
    fn solve(&self, center_y: f64) -> f64 {
        let apex = Point::new(self.center_x, center_y + self.contact_offset);
        control_point(self.start, self.end, apex).y
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::config::Config;
    use crate::loading::layout::LayoutMetrics;

    fn bands() -> RopeBands {
        let layout = Layout::new(LayoutMetrics::new(1000., 1000.), &Config::default()).unwrap();
        RopeBands::new(&layout)
    }

    #[test]
    fn band_boundaries() {
        let b = bands();
        assert_eq!(b.rest_y(), 500.);
        assert_eq!(b.contact, 455.);
        assert_eq!(b.bottom, 600.);
        assert_eq!(b.separation, 355.);
        assert_eq!(b.overshoot_end, 205.);
        assert_eq!(b.rebound_end, 155.);
    }

    #[test]
    fn descending_rope_flat_until_contact() {
        let b = bands();
        assert_eq!(b.control_y(Phase::Descending, 100.), 500.);
        assert_eq!(b.control_y(Phase::Descending, 454.9), 500.);
        assert_abs_diff_eq!(b.control_y(Phase::Descending, 455.), 500., epsilon = 1e-9);
        // 最低点：绳子中点在 645，控制点 = (645 - 250) / 0.5
        assert_abs_diff_eq!(b.control_y(Phase::Descending, 600.), 790., epsilon = 1e-9);
    }

    #[test]
    fn ascending_rope_springs_back() {
        let b = bands();
        // 随球上升
        assert_abs_diff_eq!(b.control_y(Phase::Ascending, 600.), 790., epsilon = 1e-9);
        assert_abs_diff_eq!(b.control_y(Phase::Ascending, 455.), 500., epsilon = 1e-9);
        // 分离点：绳子中点在 400
        assert_abs_diff_eq!(b.control_y(Phase::Ascending, 355.), 300., epsilon = 1e-9);
        // 向下回弹到最低：绳子中点 = 2 * 355 - 205 + 45 = 550
        assert_abs_diff_eq!(b.control_y(Phase::Ascending, 205.), 600., epsilon = 1e-9);
        // 静止
        assert_abs_diff_eq!(b.control_y(Phase::Ascending, 155.), 500., epsilon = 1e-9);
        assert_eq!(b.control_y(Phase::Ascending, 100.), 500.);
    }

    #[test]
    fn ascending_is_continuous_at_boundaries() {
        let b = bands();
        let eps = 1e-6;
        for boundary in [b.separation, b.overshoot_end, b.rebound_end] {
            let above = b.control_y(Phase::Ascending, boundary + eps);
            let below = b.control_y(Phase::Ascending, boundary - eps);
            assert!(
                (above - below).abs() < 1e-4,
                "jump of {} at {boundary}",
                above - below
            );
        }
    }

    #[test]
    fn phase_cycles() {
        assert_eq!(Phase::Descending.next(), Phase::Ascending);
        assert_eq!(Phase::Ascending.next(), Phase::Descending);
    }

    proptest! {
        #[test]
        fn continuity_for_any_geometry(
            height in 400f64..4000.,
            jump in 50f64..1500.,
            drop in 5f64..300.,
            radius in 1f64..60.,
            stroke in 0f64..20.,
        ) {
            let config = Config {
                jump_height: jump,
                drop_distance: drop,
                point_radius: radius,
                stroke_width: stroke,
                endpoint_radius: stroke,
                ..Config::default()
            };
            let layout = Layout::new(LayoutMetrics::new(800., height), &config).unwrap();
            let b = RopeBands::new(&layout);
            let eps = 1e-7;
            for boundary in [b.separation, b.overshoot_end, b.rebound_end] {
                let jump = b.control_y(Phase::Ascending, boundary + eps)
                    - b.control_y(Phase::Ascending, boundary - eps);
                prop_assert!(jump.abs() < 1e-4);
            }
            let jump = b.control_y(Phase::Descending, b.contact + eps)
                - b.control_y(Phase::Descending, b.contact - eps);
            prop_assert!(jump.abs() < 1e-4);
        }
    }
}
