// main.rs - point-loading 命令行入口
// 负责日志初始化、配置文件查找与加载，然后分派到各个子命令：
// validate 校验配置，run 用 calloop 定时器无界面运行动画，render 把一个完整周期渲染成 PNG。

#[macro_use]
extern crate tracing;

use std::cell::RefCell;
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{ensure, Context};
use calloop::{EventLoop, LoopSignal};
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use point_loading::animation::Clock;
use point_loading::cli::{Cli, Sub};
use point_loading::config::Config;
use point_loading::loading::{LayoutMetrics, PointLoadingView};
use point_loading::render::raster::PixelCanvas;
use point_loading::ticker::Ticker;
use point_loading::utils::{get_monotonic_time, version};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "point_loading=debug";

const CONFIG_PATH_ENV: &str = "POINT_LOADING_CONFIG";

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    if let Sub::Completions { shell } = cli.subcommand {
        clap_complete::generate(shell, &mut Cli::command(), "point-loading", &mut io::stdout());
        return Ok(());
    }

    tracy_client::Client::start();
    info!("starting version {}", &version());

    let (path, explicit) = config_path(cli.config);

    if let Sub::Validate = cli.subcommand {
        Config::load(&path)?;
        info!("config is valid");
        return Ok(());
    }

    // 显式指定的配置文件必须存在；默认路径不存在时使用默认配置
    let mut config = if explicit || path.exists() {
        Config::load(&path)?
    } else {
        debug!("no config at {path:?}, using defaults");
        Config::default()
    };

    match cli.subcommand {
        Sub::Run {
            width,
            height,
            seconds,
            refresh_rate,
            slowdown,
            json,
        } => {
            // 命令行参数优先于配置文件
            if let Some(slowdown) = slowdown {
                config.animation_slowdown = slowdown;
                config.validate().context("invalid --slowdown")?;
            }
            run(config, LayoutMetrics::new(width, height), seconds, refresh_rate, json)
        }
        Sub::Render {
            out,
            frames,
            width,
            height,
        } => render(config, &out, frames, width, height),
        Sub::Validate | Sub::Completions { .. } => Ok(()),
    }
}

struct RunState {
    signal: LoopSignal,
    deadline: Duration,
    json: bool,
    frames: u64,
}

fn run(
    config: Config,
    metrics: LayoutMetrics,
    run_time: Duration,
    refresh_rate: f64,
    json: bool,
) -> anyhow::Result<()> {
    let refresh_interval = Duration::try_from_secs_f64(1. / refresh_rate)
        .with_context(|| format!("invalid refresh rate {refresh_rate}"))?;

    let mut event_loop: EventLoop<'static, RunState> =
        EventLoop::try_new().context("error creating event loop")?;
    let mut state = RunState {
        signal: event_loop.get_signal(),
        deadline: get_monotonic_time()
            .checked_add(run_time)
            .context("run duration is too long")?,
        json,
        frames: 0,
    };

    let view = PointLoadingView::new(config, Clock::default());
    let view = Rc::new(RefCell::new(view));
    view.borrow_mut().on_layout(metrics)?;

    let mut ticker = Ticker::new(event_loop.handle());
    ticker.start(view.clone(), refresh_interval, |frame, _, state: &mut RunState| {
        state.frames += 1;

        if state.json {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("error serializing frame: {err:?}"),
            }
        } else {
            trace!(?frame.phase, ball_y = frame.ball.y, control_y = frame.control.y, "frame");
        }

        if get_monotonic_time() >= state.deadline {
            state.signal.stop();
        }
    })?;

    event_loop
        .run(None, &mut state, |_| ())
        .context("error running event loop")?;

    ticker.stop();
    let mut view = view.borrow_mut();
    view.stop();
    let cycles = view.bounce().map_or(0, |b| b.cycles());
    info!(frames = state.frames, cycles, "done");
    Ok(())
}

fn render(config: Config, out: &Path, frames: u32, width: u32, height: u32) -> anyhow::Result<()> {
    ensure!(frames > 0, "need at least one frame");

    fs::create_dir_all(out).with_context(|| format!("error creating {out:?}"))?;

    // 渲染输出与慢放无关，始终按原速度取一个完整周期
    let config = Config {
        animation_slowdown: 1.,
        ..config
    };
    let mut view = PointLoadingView::new(config, Clock::with_time(Duration::ZERO));
    view.on_layout(LayoutMetrics::new(f64::from(width), f64::from(height)))?;
    view.start();

    let cycle = Duration::from_millis(view.config().phase_duration_ms) * 2;
    let mut canvas = PixelCanvas::new(width, height);

    for i in 0..frames {
        let at = cycle * i / frames;
        let frame = view.advance(at).context("view has no layout")?;
        frame.paint(view.style(), &mut canvas);

        let path = out.join(format!("frame-{i:04}.png"));
        let file = File::create(&path).with_context(|| format!("error creating {path:?}"))?;
        let mut writer = BufWriter::new(file);
        canvas
            .write_png(&mut writer)
            .with_context(|| format!("error encoding {path:?}"))?;
        writer.flush()?;
        debug!(?at, ?frame.phase, "wrote {path:?}");
    }

    info!("wrote {frames} frames to {out:?}");
    Ok(())
}

fn env_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_ENV)
        .filter(|x| !x.is_empty())
        .map(PathBuf::from)
}

fn default_config_path() -> Option<PathBuf> {
    let Some(dirs) = ProjectDirs::from("", "", "point-loading") else {
        warn!("error retrieving home directory");
        return None;
    };

    let mut path = dirs.config_dir().to_owned();
    path.push("config.toml");
    Some(path)
}

/// Resolves the config path.
///
/// Returns the path and whether it was given explicitly (and so must exist).
fn config_path(cli_path: Option<PathBuf>) -> (PathBuf, bool) {
    if let Some(explicit) = cli_path.or_else(env_config_path) {
        return (explicit, true);
    }

    let path = default_config_path().unwrap_or_else(|| PathBuf::from("config.toml"));
    (path, false)
}
