// raster.rs
// 软件光栅化画布：把绘制指令画进 RGBA8 缓冲区，用于无窗口环境下导出 PNG 帧。
// 抗锯齿采用按像素中心到图形距离计算覆盖率的方式，足够用来检查动画效果。

use std::io::Write;

use crate::loading::geometry::{quad_at, Point};
use crate::render::{Canvas, Color};
use crate::utils::write_png_rgba8;

/// Segments used to flatten the rope curve.
const QUAD_SEGMENTS: usize = 64;

#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }

    pub fn write_png(&self, w: impl Write) -> Result<(), png::EncodingError> {
        let _span = tracy_client::span!("PixelCanvas::write_png");
        write_png_rgba8(w, self.width, self.height, &self.pixels)
    }

    /// Paints every pixel within `reach` of `center` by the coverage `shape` returns for it.
    fn cover(&mut self, center: Point, reach: f64, color: Color, shape: impl Fn(Point) -> f64) {
        if !center.is_finite() || !reach.is_finite() || color.a == 0 {
            return;
        }

        let x0 = (center.x - reach).floor().max(0.) as u32;
        let y0 = (center.y - reach).floor().max(0.) as u32;
        let x1 = ((center.x + reach).ceil().max(0.) as u32).min(self.width);
        let y1 = ((center.y + reach).ceil().max(0.) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let coverage = shape(p).clamp(0., 1.);
                if coverage > 0. {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f64) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst = &mut self.pixels[i..i + 4];

        let a = f64::from(color.a) / 255. * coverage;
        let src = [color.r, color.g, color.b];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = (f64::from(s) * a + f64::from(*d) * (1. - a)).round() as u8;
        }
        dst[3] = (255. * a + f64::from(dst[3]) * (1. - a)).round() as u8;
    }
}

impl Canvas for PixelCanvas {
    fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    fn stroke_quad(&mut self, start: Point, control: Point, end: Point, width: f64, color: Color) {
        let _span = tracy_client::span!("PixelCanvas::stroke_quad");

        let points: Vec<Point> = (0..=QUAD_SEGMENTS)
            .map(|i| quad_at(start, control, end, i as f64 / QUAD_SEGMENTS as f64))
            .collect();

        let half = width / 2.;
        for segment in points.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let mid = Point::new((a.x + b.x) / 2., (a.y + b.y) / 2.);
            let reach = distance(a, b) / 2. + half + 1.;
            self.cover(mid, reach, color, |p| half - segment_distance(p, a, b) + 0.5);
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) {
        let half = width / 2.;
        self.cover(center, radius + half + 1., color, |p| {
            half - (distance(p, center) - radius).abs() + 0.5
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.cover(center, radius + 1., color, |p| {
            radius - distance(p, center) + 0.5
        });
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0. {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0., 1.);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}
