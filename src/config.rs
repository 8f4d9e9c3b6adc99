//! 加载动画配置
//!
//! 配置文件为 TOML 格式，所有字段都有默认值，缺省的字段使用默认值。
//!
//! ```toml
//! jump-height = 400
//! drop-distance = 100
//! point-radius = 40
//! stroke-width = 10
//! phase-duration-ms = 1500
//! animation-slowdown = 1.0
//! foreground = "#ffffff"
//! background = "#3f51b5"
//! ```

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::render::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Maximum rise of the ball above the rest line, before clamping to the view.
    pub jump_height: f64,
    /// How far the rope sags below the rest line under the ball.
    pub drop_distance: f64,
    pub point_radius: f64,
    pub stroke_width: f64,
    /// Duration of each of the two phases.
    pub phase_duration_ms: u64,
    /// Plays the animation this many times slower; values below 1 speed it up.
    pub animation_slowdown: f64,
    /// Gap between the inner padding edge and the rope attachment points.
    pub endpoint_margin: f64,
    pub endpoint_radius: f64,
    pub foreground: Color,
    pub background: Color,
}

/// A configuration value out of its valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NotFinite { field: &'static str },
    Negative { field: &'static str, value: f64 },
    ZeroDuration,
    NonPositive { field: &'static str, value: f64 },
    /// The endpoint ring is too thin for its stroke and would invert the eraser circle.
    EndpointTooSmall { radius: f64, stroke_width: f64 },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jump_height: 400.,
            drop_distance: 100.,
            point_radius: 40.,
            stroke_width: 10.,
            phase_duration_ms: 1500,
            animation_slowdown: 1.,
            endpoint_margin: 10.,
            endpoint_radius: 12.,
            foreground: Color::WHITE,
            background: Color::rgb(0x3f, 0x51, 0xb5),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let _span = tracy_client::span!("Config::load");

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("error reading {path:?}"))?;
        let config = Self::parse(&contents).with_context(|| format!("error parsing {path:?}"))?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("jump-height", self.jump_height),
            ("drop-distance", self.drop_distance),
            ("point-radius", self.point_radius),
            ("stroke-width", self.stroke_width),
            ("endpoint-margin", self.endpoint_margin),
            ("endpoint-radius", self.endpoint_radius),
        ];
        for (field, value) in lengths {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value < 0. {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.phase_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        if !self.animation_slowdown.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "animation-slowdown",
            });
        }
        if self.animation_slowdown <= 0. {
            return Err(ConfigError::NonPositive {
                field: "animation-slowdown",
                value: self.animation_slowdown,
            });
        }

        if self.endpoint_radius < self.stroke_width / 2. {
            return Err(ConfigError::EndpointTooSmall {
                radius: self.endpoint_radius,
                stroke_width: self.stroke_width,
            });
        }

        Ok(())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFinite { field } => write!(f, "{field} must be a finite number"),
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            ConfigError::ZeroDuration => f.write_str("phase-duration-ms must be greater than 0"),
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be greater than 0, got {value}")
            }
            ConfigError::EndpointTooSmall {
                radius,
                stroke_width,
            } => write!(
                f,
                "endpoint-radius {radius} is smaller than half of stroke-width {stroke_width}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
