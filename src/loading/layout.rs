// layout.rs
// 布局：根据 view 尺寸计算绳子两个端点，并把弹跳高度、绳子下沉距离压缩到 view 能容纳的范围。
// 这些值在一次布局之后固定不变，直到下一次布局。

use std::fmt;

use crate::config::Config;
use crate::loading::geometry::Point;

/// Gap subtracted from the drop distance when the jump is too low for the spring effect.
const DROP_SHRINK_MARGIN: f64 = 10.;

/// The spring effect needs the ball to rise more than this many drop distances.
const MIN_JUMP_TO_DROP_RATIO: f64 = 3.;

/// View dimensions reported by the host on each layout pass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub width: f64,
    pub height: f64,
    pub padding_left: f64,
    pub padding_right: f64,
}

/// Amplitudes after clamping to the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub jump_height: f64,
    pub drop_distance: f64,
    pub point_radius: f64,
    pub stroke_width: f64,
}

/// Everything derived from one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub metrics: Metrics,
    pub start: Point,
    pub end: Point,
    /// Height of the undisturbed rope, `height / 2`.
    pub rest_y: f64,
    /// Horizontal center of the view, where the ball and the curve apex sit.
    pub center_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutError {
    /// Width or height is not a positive finite number.
    Degenerate { width: f64, height: f64 },
    /// A padding is NaN or infinite.
    InvalidPadding { left: f64, right: f64 },
    /// Paddings and endpoint insets leave no rope between the two endpoints.
    TooNarrow { start_x: f64, end_x: f64 },
    /// The clamped amplitudes no longer describe a downward bounce.
    TooShort {
        height: f64,
        jump_height: f64,
        drop_distance: f64,
    },
}

impl LayoutMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, left: f64, right: f64) -> Self {
        self.padding_left = left;
        self.padding_right = right;
        self
    }
}

impl Metrics {
    /// Clamps the configured amplitudes so the ball stays inside the view and the rope keeps its
    /// springiness.
    pub fn clamped(config: &Config, view_height: f64) -> Self {
        let point_radius = config.point_radius;
        let mut jump_height = config.jump_height;
        let mut drop_distance = config.drop_distance;

        let max_jump = (view_height / 2. - 2. * point_radius).max(0.);
        if jump_height > max_jump {
            jump_height = max_jump;
        }

        if jump_height <= MIN_JUMP_TO_DROP_RATIO * drop_distance {
            drop_distance = jump_height / MIN_JUMP_TO_DROP_RATIO - DROP_SHRINK_MARGIN;
        }

        Self {
            jump_height,
            drop_distance,
            point_radius,
            stroke_width: config.stroke_width,
        }
    }
}

impl Layout {
    pub fn new(metrics: LayoutMetrics, config: &Config) -> Result<Self, LayoutError> {
        let LayoutMetrics {
            width,
            height,
            padding_left,
            padding_right,
        } = metrics;

        let valid = |v: f64| v.is_finite() && v > 0.;
        if !valid(width) || !valid(height) {
            return Err(LayoutError::Degenerate { width, height });
        }
        if !padding_left.is_finite() || !padding_right.is_finite() {
            return Err(LayoutError::InvalidPadding {
                left: padding_left,
                right: padding_right,
            });
        }

        let rest_y = height / 2.;
        let inset = config.stroke_width + config.endpoint_margin;
        let start = Point::new(padding_left + inset, rest_y);
        let end = Point::new(width - padding_right - inset, rest_y);
        if end.x <= start.x {
            return Err(LayoutError::TooNarrow {
                start_x: start.x,
                end_x: end.x,
            });
        }

        let clamped = Metrics::clamped(config, height);
        // 下沉距离为负时下降阶段会让小球向上走，绳子的弹簧分段也随之颠倒
        if clamped.drop_distance < 0. {
            return Err(LayoutError::TooShort {
                height,
                jump_height: clamped.jump_height,
                drop_distance: clamped.drop_distance,
            });
        }
        if clamped.jump_height != config.jump_height || clamped.drop_distance != config.drop_distance
        {
            debug!(
                jump_height = clamped.jump_height,
                drop_distance = clamped.drop_distance,
                "clamped amplitudes to {width}x{height} view",
            );
        }

        Ok(Self {
            metrics: clamped,
            start,
            end,
            rest_y,
            center_x: width / 2.,
        })
    }

    /// Ball height at the top of the bounce.
    pub fn top_y(&self) -> f64 {
        self.rest_y - self.metrics.jump_height
    }

    /// Ball height at the lowest point, with the rope fully stretched.
    pub fn bottom_y(&self) -> f64 {
        self.rest_y + self.metrics.drop_distance
    }

    /// Distance from the ball center to the rope's centerline when the two touch.
    pub fn contact_offset(&self) -> f64 {
        self.metrics.point_radius + self.metrics.stroke_width / 2.
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Degenerate { width, height } => {
                write!(f, "degenerate view size {width}x{height}")
            }
            LayoutError::InvalidPadding { left, right } => {
                write!(f, "invalid padding left={left} right={right}")
            }
            LayoutError::TooNarrow { start_x, end_x } => write!(
                f,
                "no room for the rope: start x {start_x} is not left of end x {end_x}"
            ),
            LayoutError::TooShort {
                height,
                jump_height,
                drop_distance,
            } => write!(
                f,
                "view height {height} is too short to bounce \
                 (jump {jump_height}, drop {drop_distance})"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}
