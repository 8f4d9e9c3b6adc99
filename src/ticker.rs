// ticker.rs
// 定时驱动：在 calloop 事件循环里注册定时器，每个刷新周期推进一次动画并通知宿主重绘。
// stop() 会移除定时器，之后不会再有 tick 触发。

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::frame_clock::FrameClock;
use crate::loading::PointLoadingView;
use crate::render::{Frame, Style};
use crate::utils::get_monotonic_time;

/// Drives a [`PointLoadingView`] from a calloop timer.
pub struct Ticker<D: 'static> {
    handle: LoopHandle<'static, D>,
    token: Option<RegistrationToken>,
}

impl<D: 'static> Ticker<D> {
    pub fn new(handle: LoopHandle<'static, D>) -> Self {
        Self {
            handle,
            token: None,
        }
    }

    /// Starts the view and schedules a tick on every refresh.
    ///
    /// `on_frame` is the repaint request: it receives each new frame along with the view's style.
    /// Returns `Ok(false)` if the ticker is already running.
    pub fn start<F>(
        &mut self,
        view: Rc<RefCell<PointLoadingView>>,
        refresh_interval: Duration,
        mut on_frame: F,
    ) -> Result<bool, calloop::Error>
    where
        F: FnMut(&Frame, &Style, &mut D) + 'static,
    {
        if self.token.is_some() {
            trace!("ticker already running");
            return Ok(false);
        }

        {
            let mut view = view.borrow_mut();
            // 先把时钟拨到当前时刻，动画从这一刻开始计时
            view.advance(get_monotonic_time());
            view.start();
        }

        let mut frame_clock = FrameClock::new(refresh_interval);
        let token = self
            .handle
            .insert_source(Timer::immediate(), move |_, _, data| {
                let _span = tracy_client::span!("Ticker tick");

                let now = get_monotonic_time();
                let mut view = view.borrow_mut();
                if let Some(frame) = view.advance(now) {
                    on_frame(&frame, view.style(), data);
                }

                frame_clock.presented(now);
                TimeoutAction::ToDuration(frame_clock.time_until_next(now))
            })
            .map_err(|err| err.error)?;

        debug!(?refresh_interval, "ticker started");
        self.token = Some(token);
        Ok(true)
    }

    /// Cancels the pending tick. The view itself is left as is.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
            debug!("ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }
}

impl<D: 'static> Drop for Ticker<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
