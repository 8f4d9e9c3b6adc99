// machine.rs
// 两阶段循环状态机：下降 → 上升 → 下降 → ……
// 状态机不负责调度，宿主每帧调用 advance() 推进时钟并取得当前帧快照。

use std::time::Duration;

use crate::animation::{Animation, Clock, Curve};
use crate::loading::geometry::Point;
use crate::loading::layout::Layout;
use crate::loading::rope::{Phase, RopeBands};
use crate::render::Frame;

#[derive(Debug)]
pub struct BounceLoop {
    layout: Layout,
    bands: RopeBands,
    clock: Clock,
    phase_duration_ms: u64,
    running: Option<Running>,
    frame: Frame,
    cycles: u64,
}

#[derive(Debug, Clone)]
struct Running {
    phase: Phase,
    tween: Animation,
}

impl BounceLoop {
    /// Creates an idle loop showing the ball at the top of its bounce.
    pub fn new(layout: Layout, clock: Clock, phase_duration_ms: u64) -> Self {
        let bands = RopeBands::new(&layout);
        let mut rv = Self {
            layout,
            bands,
            clock,
            // 时长为 0 时 advance() 会陷入死循环
            phase_duration_ms: phase_duration_ms.max(1),
            running: None,
            frame: Frame {
                phase: Phase::Descending,
                ball: Point::default(),
                control: Point::default(),
                start: layout.start,
                end: layout.end,
            },
            cycles: 0,
        };
        rv.frame = rv.initial_frame();
        rv
    }

    /// Starts the loop from the top of the Descending phase.
    ///
    /// Does nothing and returns `false` if the loop is already running.
    pub fn start(&mut self) -> bool {
        if self.running.is_some() {
            trace!("loop already running, ignoring start");
            return false;
        }

        let now = self.clock.now();
        debug!(?now, "starting bounce loop");
        self.running = Some(Running {
            phase: Phase::Descending,
            tween: self.tween(Phase::Descending, now),
        });
        self.frame = self.initial_frame();
        true
    }

    /// Stops the loop, keeping the last frame on screen.
    pub fn stop(&mut self) {
        if self.running.take().is_some() {
            debug!(cycles = self.cycles, "stopped bounce loop");
        }
    }

    /// Stops the loop and returns to the initial frame.
    pub fn reset(&mut self) {
        self.stop();
        self.cycles = 0;
        self.frame = self.initial_frame();
    }

    /// Moves the clock to `now` and returns the frame for that time.
    pub fn advance(&mut self, now: Duration) -> Frame {
        self.clock.set_unadjusted(now);
        self.tick()
    }

    /// Recomputes the frame for the clock's current time.
    pub fn tick(&mut self) -> Frame {
        let _span = tracy_client::span!("BounceLoop::tick");

        let Some(Running { mut phase, mut tween }) = self.running.take() else {
            return self.frame;
        };

        if tween.is_done() {
            let from = phase;
            let cycles_before = self.cycles;

            // 落后超过一个完整周期时直接跳过整周期，余下最多两次阶段切换
            let behind = self.clock.now() - tween.end_time();
            let cycle = self.phase_duration() * 2;
            let skipped =
                u64::try_from(behind.as_nanos() / cycle.as_nanos()).unwrap_or(u64::MAX);
            if skipped > 0 {
                let rest = behind.as_nanos() % cycle.as_nanos();
                let skipped_time = behind - Duration::from_nanos(rest as u64);
                self.cycles = self.cycles.saturating_add(skipped);
                tween = self.tween(phase, tween.start_time() + skipped_time);
            }

            // 下一阶段从上一阶段的结束时刻开始，不受帧间隔影响
            while tween.is_done() {
                let next = phase.next();
                if next == Phase::Descending {
                    self.cycles = self.cycles.saturating_add(1);
                }
                tween = self.tween(next, tween.end_time());
                phase = next;
            }

            debug!(
                ?from,
                to = ?phase,
                skipped_cycles = skipped,
                cycles = self.cycles,
                completed = self.cycles - cycles_before,
                "phase complete"
            );
        }

        let ball_y = tween.value();
        self.frame = self.frame_at(phase, ball_y);
        trace!(?phase, ball_y, control_y = self.frame.control.y, "tick");

        self.running = Some(Running { phase, tween });
        self.frame
    }

    /// Returns the most recent frame without advancing.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.frame.phase
    }

    /// Number of completed Descending + Ascending cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn bands(&self) -> &RopeBands {
        &self.bands
    }

    pub fn phase_duration(&self) -> Duration {
        Duration::from_millis(self.phase_duration_ms)
    }

    fn tween(&self, phase: Phase, start: Duration) -> Animation {
        let (from, to, curve) = match phase {
            Phase::Descending => (
                self.layout.top_y(),
                self.layout.bottom_y(),
                Curve::EaseInQuad,
            ),
            Phase::Ascending => (
                self.layout.bottom_y(),
                self.layout.top_y(),
                Curve::EaseOutQuad,
            ),
        };
        Animation::ease_from(
            self.clock.clone(),
            start,
            from,
            to,
            self.phase_duration_ms,
            curve,
        )
    }

    fn initial_frame(&self) -> Frame {
        self.frame_at(Phase::Descending, self.layout.top_y())
    }

    fn frame_at(&self, phase: Phase, ball_y: f64) -> Frame {
        let center_x = self.layout.center_x;
        Frame {
            phase,
            ball: Point::new(center_x, ball_y),
            control: Point::new(center_x, self.bands.control_y(phase, ball_y)),
            start: self.layout.start,
            end: self.layout.end,
        }
    }
}
