// render/mod.rs
// 渲染模型：状态机每帧产出一个不可变的 Frame 快照，
// 宿主根据快照得到有序的绘制指令并交给自己的画布执行。

use std::fmt;

use serde::Serialize;

use crate::config::Config;
use crate::loading::geometry::Point;
use crate::loading::Phase;

pub mod raster;

/// Immutable drawing state for one animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub phase: Phase,
    /// Center of the bouncing ball.
    pub ball: Point,
    /// Control point of the rope curve, horizontally centered.
    pub control: Point,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Paint parameters shared by every frame of one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub foreground: Color,
    pub background: Color,
    pub stroke_width: f64,
    pub point_radius: f64,
    pub endpoint_radius: f64,
}

/// One drawing command, in paint order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    StrokeQuad {
        start: Point,
        control: Point,
        end: Point,
        width: f64,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        width: f64,
        color: Color,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
    },
}

/// Drawing surface supplied by the host.
pub trait Canvas {
    fn clear(&mut self, color: Color);
    fn stroke_quad(&mut self, start: Point, control: Point, end: Point, width: f64, color: Color);
    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);
}

impl Frame {
    /// Returns the drawing commands for this frame.
    ///
    /// Order matters: the rope goes first, then the endpoint rings, then the background-colored
    /// discs that hollow the rings out over the rope's ends, and the ball last on top.
    pub fn draw_ops(&self, style: &Style) -> Vec<DrawOp> {
        let mut ops = Vec::with_capacity(6);

        ops.push(DrawOp::StrokeQuad {
            start: self.start,
            control: self.control,
            end: self.end,
            width: style.stroke_width,
            color: style.foreground,
        });

        for center in [self.start, self.end] {
            ops.push(DrawOp::StrokeCircle {
                center,
                radius: style.endpoint_radius,
                width: style.stroke_width,
                color: style.foreground,
            });
        }

        let eraser = style.endpoint_radius - style.stroke_width / 2.;
        for center in [self.start, self.end] {
            ops.push(DrawOp::FillCircle {
                center,
                radius: eraser,
                color: style.background,
            });
        }

        ops.push(DrawOp::FillCircle {
            center: self.ball,
            radius: style.point_radius,
            color: style.foreground,
        });

        ops
    }

    /// Clears `canvas` to the background and paints this frame onto it.
    pub fn paint(&self, style: &Style, canvas: &mut impl Canvas) {
        canvas.clear(style.background);
        for op in self.draw_ops(style) {
            op.apply(canvas);
        }
    }
}

impl DrawOp {
    pub fn apply(self, canvas: &mut impl Canvas) {
        match self {
            DrawOp::StrokeQuad {
                start,
                control,
                end,
                width,
                color,
            } => canvas.stroke_quad(start, control, end, width, color),
            DrawOp::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => canvas.stroke_circle(center, radius, width, color),
            DrawOp::FillCircle {
                center,
                radius,
                color,
            } => canvas.fill_circle(center, radius, color),
        }
    }
}

impl Style {
    pub fn from_config(config: &Config) -> Self {
        Self {
            foreground: config.foreground,
            background: config.background,
            stroke_width: config.stroke_width,
            point_radius: config.point_radius,
            endpoint_radius: config.endpoint_radius,
        }
    }
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { byte(6)? } else { 0xff };
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid color {value:?}, expected #rrggbb"))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use insta::assert_snapshot;

    use super::*;

    fn frame() -> Frame {
        Frame {
            phase: Phase::Descending,
            ball: Point::new(500., 0.),
            control: Point::new(500., 400.),
            start: Point::new(20., 400.),
            end: Point::new(980., 400.),
        }
    }

    fn format_ops(ops: &[DrawOp]) -> String {
        let mut buf = String::new();
        for op in ops {
            let line = match op {
                DrawOp::StrokeQuad {
                    start,
                    control,
                    end,
                    width,
                    color,
                } => format!(
                    "quad ({}, {}) ({}, {}) ({}, {}) w={width} {color}",
                    start.x, start.y, control.x, control.y, end.x, end.y
                ),
                DrawOp::StrokeCircle {
                    center,
                    radius,
                    width,
                    color,
                } => format!(
                    "ring ({}, {}) r={radius} w={width} {color}",
                    center.x, center.y
                ),
                DrawOp::FillCircle {
                    center,
                    radius,
                    color,
                } => format!("disc ({}, {}) r={radius} {color}", center.x, center.y),
            };
            writeln!(buf, "{line}").unwrap();
        }
        buf
    }

    #[test]
    fn draw_order() {
        let style = Style::from_config(&Config::default());
        assert_snapshot!(format_ops(&frame().draw_ops(&style)), @r"
        quad (20, 400) (500, 400) (980, 400) w=10 #ffffff
        ring (20, 400) r=12 w=10 #ffffff
        ring (980, 400) r=12 w=10 #ffffff
        disc (20, 400) r=7 #3f51b5
        disc (980, 400) r=7 #3f51b5
        disc (500, 0) r=40 #ffffff
        ");
    }

    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl Canvas for Recorder {
        fn clear(&mut self, _color: Color) {
            self.0.push("clear");
        }

        fn stroke_quad(&mut self, _: Point, _: Point, _: Point, _: f64, _: Color) {
            self.0.push("quad");
        }

        fn stroke_circle(&mut self, _: Point, _: f64, _: f64, _: Color) {
            self.0.push("ring");
        }

        fn fill_circle(&mut self, _: Point, _: f64, _: Color) {
            self.0.push("disc");
        }
    }

    #[test]
    fn paint_clears_first() {
        let style = Style::from_config(&Config::default());
        let mut canvas = Recorder::default();
        frame().paint(&style, &mut canvas);
        assert_eq!(
            canvas.0,
            ["clear", "quad", "ring", "ring", "disc", "disc", "disc"]
        );
    }

    #[test]
    fn color_parsing() {
        assert_eq!(Color::parse("#3f51b5"), Some(Color::rgb(0x3f, 0x51, 0xb5)));
        assert_eq!(
            Color::parse("#00000080"),
            Some(Color {
                r: 0,
                g: 0,
                b: 0,
                a: 0x80
            })
        );
        assert_eq!(Color::parse("3f51b5"), None);
        assert_eq!(Color::parse("#3f51b"), None);
        assert_eq!(Color::parse("#zz51b5"), None);
        assert_eq!(Color::parse("#00000080").unwrap().to_string(), "#00000080");
    }
}
