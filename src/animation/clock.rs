// clock.rs
// 动画时钟：宿主每帧把时间推进到某个时刻，所有动画从同一个时钟读取“当前时间”。
// 时钟可以调节速率，配置里的 animation-slowdown 通过它实现慢动作。

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable lazy clock that can change rate.
///
/// The clock fetches the monotonic time once and then only moves when the host sets it with
/// [`Clock::set_unadjusted`], so every animation read during one frame sees the same instant.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<RateClock>>,
}

/// 惰性读取的原始时间源
#[derive(Debug, Default)]
struct SourceTime {
    time: Option<Duration>,
}

/// Clock that scales the passage of its source time by `rate`.
#[derive(Debug)]
struct RateClock {
    source: SourceTime,
    adjusted: Duration,
    last_source: Duration,
    rate: f64,
}

impl Clock {
    /// Creates a new clock frozen at the given time.
    pub fn with_time(time: Duration) -> Self {
        let clock = RateClock::new(SourceTime { time: Some(time) });
        Self {
            inner: Rc::new(RefCell::new(clock)),
        }
    }

    /// Returns the current time, adjusted for rate changes.
    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Sets the unadjusted clock time.
    pub fn set_unadjusted(&mut self, time: Duration) {
        self.inner.borrow_mut().source.time = Some(time);
    }

    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    /// Sets the clock rate, clamped to `0..=1000`.
    pub fn set_rate(&mut self, rate: f64) {
        self.inner.borrow_mut().rate = rate.clamp(0., 1000.);
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl SourceTime {
    fn now(&mut self) -> Duration {
        *self.time.get_or_insert_with(get_monotonic_time)
    }
}

impl RateClock {
    fn new(mut source: SourceTime) -> Self {
        let time = source.now();
        Self {
            source,
            adjusted: time,
            last_source: time,
            rate: 1.,
        }
    }

    fn now(&mut self) -> Duration {
        let time = self.source.now();
        if self.last_source == time {
            return self.adjusted;
        }

        // 时间前进或回退时都按速率缩放差值
        if self.last_source < time {
            let delta = (time - self.last_source).mul_f64(self.rate);
            self.adjusted = self.adjusted.saturating_add(delta);
        } else {
            let delta = (self.last_source - time).mul_f64(self.rate);
            self.adjusted = self.adjusted.saturating_sub(delta);
        }

        self.last_source = time;
        self.adjusted
    }
}

impl Default for RateClock {
    fn default() -> Self {
        Self::new(SourceTime::default())
    }
}
