// animation/mod.rs
// 补间动画：在固定时长内按缓动曲线把一个标量从 from 过渡到 to。
// 小球下降使用加速曲线，上升使用减速曲线。

use std::time::Duration;

use keyframe::functions::{EaseInQuad, EaseOutQuad};
use keyframe::EasingFunction;

mod clock;
pub use clock::Clock;

#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    start_time: Duration,
    clock: Clock,
    curve: Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// Accelerating curve, `x²`.
    EaseInQuad,
    /// Decelerating curve, `1 - (1 - x)²`.
    EaseOutQuad,
}

impl Animation {
    /// Creates an eased tween with an explicit start time.
    ///
    /// Used to chain tweens back to back without accumulating frame-time drift.
    pub fn ease_from(
        clock: Clock,
        start_time: Duration,
        from: f64,
        to: f64,
        duration_ms: u64,
        curve: Curve,
    ) -> Self {
        Self {
            from,
            to,
            duration: Duration::from_millis(duration_ms),
            start_time,
            clock,
            curve,
        }
    }

    pub fn is_done(&self) -> bool {
        self.clock.now() >= self.end_time()
    }

    pub fn value_at(&self, at: Duration) -> f64 {
        if at <= self.start_time {
            return self.from;
        } else if self.end_time() <= at {
            return self.to;
        }

        let passed = (at - self.start_time).as_secs_f64();
        let total = self.duration.as_secs_f64();
        let x = (passed / total).clamp(0., 1.);
        self.curve.y(x) * (self.to - self.from) + self.from
    }

    pub fn value(&self) -> f64 {
        self.value_at(self.clock.now())
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn end_time(&self) -> Duration {
        self.start_time + self.duration
    }
}

impl Curve {
    /// Maps progress `x` in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::EaseInQuad => EaseInQuad.y(x),
            Curve::EaseOutQuad => EaseOutQuad.y(x),
        }
    }
}
