/// cli.rs - 命令行接口定义
/// 使用 clap 派生宏定义参数和子命令
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/point-loading/config.toml`).
    ///
    /// This can also be set with the `POINT_LOADING_CONFIG` environment variable. If both are
    /// set, the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate,

    /// Run the animation headless on a timer and log the frames.
    Run {
        /// View width in pixels.
        #[arg(long, default_value_t = 1000.)]
        width: f64,

        /// View height in pixels.
        #[arg(long, default_value_t = 1000.)]
        height: f64,

        /// How long to run, in seconds.
        #[arg(long, default_value = "3", value_parser = parse_seconds)]
        seconds: Duration,

        /// Refresh rate of the simulated display, in Hz.
        #[arg(long, default_value_t = 60., value_parser = parse_refresh_rate)]
        refresh_rate: f64,

        /// Play the animation this many times slower, overriding `animation-slowdown`.
        #[arg(long)]
        slowdown: Option<f64>,

        /// Print every frame to stdout as a JSON line.
        #[arg(short, long)]
        json: bool,
    },

    /// Render one full bounce cycle to numbered PNG files.
    Render {
        /// Output directory; created if missing.
        #[arg(short, long)]
        out: PathBuf,

        /// Number of frames spread evenly over one cycle.
        #[arg(short, long, default_value_t = 30)]
        frames: u32,

        #[arg(long, default_value_t = 540)]
        width: u32,

        #[arg(long, default_value_t = 960)]
        height: u32,
    },

    /// Generate shell completions.
    Completions { shell: Shell },
}

// 秒数必须能表示为 Duration，负数、NaN、溢出都在解析阶段拒绝
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|err| format!("{err}"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| format!("invalid duration {secs}: {err}"))
}

// 刷新间隔 1/hz 必须是非零且可表示的 Duration
fn parse_refresh_rate(s: &str) -> Result<f64, String> {
    let hz: f64 = s.parse().map_err(|err| format!("{err}"))?;
    match Duration::try_from_secs_f64(1. / hz) {
        Ok(interval) if hz > 0. && !interval.is_zero() => Ok(hz),
        _ => Err(format!("refresh rate must be a positive number of Hz, got {hz}")),
    }
}
