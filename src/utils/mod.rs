//! 实用工具：版本字符串、单调时钟、PNG 编码。

use std::io::Write;
use std::time::Duration;

use git_version::git_version;
use rustix::time::{clock_gettime, ClockId};

/// Returns the version string, including the git commit when available.
pub fn version() -> String {
    if let Some(v) = option_env!("POINT_LOADING_BUILD_VERSION_STRING") {
        return String::from(v);
    }

    const MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
    const MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
    const PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");

    let commit = option_env!("POINT_LOADING_BUILD_COMMIT")
        .unwrap_or(git_version!(fallback = "unknown commit"));

    if PATCH == "0" {
        format!("{MAJOR}.{MINOR} ({commit})")
    } else {
        format!("{MAJOR}.{MINOR}.{PATCH} ({commit})")
    }
}

/// 单调时钟时间（不受系统时间调整影响）
pub fn get_monotonic_time() -> Duration {
    let ts = clock_gettime(ClockId::Monotonic);
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

pub fn write_png_rgba8(
    w: impl Write,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)
}
