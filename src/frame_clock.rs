// frame_clock.rs
// 帧时钟：根据刷新间隔和上一帧的呈现时间，预测下一帧应当在什么时刻绘制。
// 宿主的定时器据此安排下一次 tick，使动画帧对齐到刷新周期上。

use std::num::NonZeroU64;
use std::time::Duration;

/// Refresh interval used when the host does not report one, 60 Hz.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_nanos(16_666_667);

#[derive(Debug)]
pub struct FrameClock {
    last_presentation_time: Option<Duration>,
    refresh_interval_ns: NonZeroU64,
}

impl FrameClock {
    /// Creates a frame clock; a zero interval falls back to [`DEFAULT_REFRESH_INTERVAL`].
    pub fn new(refresh_interval: Duration) -> Self {
        let ns = u64::try_from(refresh_interval.as_nanos()).unwrap_or(u64::MAX);
        let refresh_interval_ns = NonZeroU64::new(ns).unwrap_or_else(|| {
            warn!("zero refresh interval, using the default");
            default_refresh_interval_ns()
        });

        Self {
            last_presentation_time: None,
            refresh_interval_ns,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_nanos(self.refresh_interval_ns.get())
    }

    /// Records that a frame was presented at `presentation_time`.
    pub fn presented(&mut self, presentation_time: Duration) {
        if presentation_time.is_zero() {
            return;
        }

        self.last_presentation_time = Some(presentation_time);
    }

    /// Returns the next refresh boundary strictly after `now`.
    pub fn next_presentation_time(&self, mut now: Duration) -> Duration {
        let Some(last_presentation_time) = self.last_presentation_time else {
            return now;
        };

        let refresh_interval_ns = self.refresh_interval_ns.get();

        if now < last_presentation_time {
            let orig_now = now;
            now += Duration::from_nanos(refresh_interval_ns);

            if now < last_presentation_time {
                error!(
                    now = ?orig_now,
                    ?last_presentation_time,
                    "presentation time is more than one refresh ahead of now",
                );
                now = last_presentation_time + Duration::from_nanos(refresh_interval_ns);
            }
        }

        let since_last = now - last_presentation_time;
        let since_last_ns = u64::try_from(since_last.as_nanos()).unwrap_or(u64::MAX);
        let to_next_ns = (since_last_ns / refresh_interval_ns + 1) * refresh_interval_ns;

        last_presentation_time + Duration::from_nanos(to_next_ns)
    }

    /// Time from `now` until the next refresh boundary.
    pub fn time_until_next(&self, now: Duration) -> Duration {
        self.next_presentation_time(now).saturating_sub(now)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

fn default_refresh_interval_ns() -> NonZeroU64 {
    NonZeroU64::new(DEFAULT_REFRESH_INTERVAL.as_nanos() as u64).unwrap_or(NonZeroU64::MIN)
}
