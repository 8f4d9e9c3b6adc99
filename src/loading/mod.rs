//! The rope and bouncing ball loading view.
//!
//! The view owns the animation state but no timer. A host reports the view size through
//! [`PointLoadingView::on_layout`], calls [`PointLoadingView::start`] once the view is ready, and
//! then on every frame calls [`PointLoadingView::advance`] and paints the returned [`Frame`].

use std::time::Duration;

use crate::animation::Clock;
use crate::config::Config;
use crate::render::{Frame, Style};

pub mod geometry;
pub mod layout;
pub mod machine;
pub mod rope;

pub use layout::{Layout, LayoutError, LayoutMetrics};
pub use machine::BounceLoop;
pub use rope::Phase;

#[derive(Debug)]
pub struct PointLoadingView {
    config: Config,
    style: Style,
    clock: Clock,
    bounce: Option<BounceLoop>,
    /// `start()` arrived before the first layout.
    start_pending: bool,
}

impl PointLoadingView {
    /// Creates a view that reads time from `clock`.
    ///
    /// The clock's rate is set from `animation-slowdown`, so clones of the clock held elsewhere
    /// run slowed down as well.
    pub fn new(config: Config, mut clock: Clock) -> Self {
        if config.animation_slowdown != 1. {
            clock.set_rate(1. / config.animation_slowdown);
            debug!(rate = clock.rate(), "slowing down animations");
        }

        Self {
            style: Style::from_config(&config),
            config,
            clock,
            bounce: None,
            start_pending: false,
        }
    }

    /// Applies a new view size.
    ///
    /// A degenerate size is rejected and the previous layout, if any, is kept. A view that was
    /// running keeps running, restarted from the top with the new geometry.
    pub fn on_layout(&mut self, metrics: LayoutMetrics) -> Result<(), LayoutError> {
        let layout = match Layout::new(metrics, &self.config) {
            Ok(layout) => layout,
            Err(err) => {
                warn!("ignoring layout: {err}");
                return Err(err);
            }
        };

        if self.bounce.as_ref().is_some_and(|b| *b.layout() == layout) {
            return Ok(());
        }

        let was_running = self.is_running() || self.start_pending;
        let mut bounce = BounceLoop::new(layout, self.clock.clone(), self.config.phase_duration_ms);
        if was_running {
            bounce.start();
        }
        debug!(
            width = metrics.width,
            height = metrics.height,
            running = was_running,
            "laid out"
        );

        self.bounce = Some(bounce);
        self.start_pending = false;
        Ok(())
    }

    /// Starts the animation loop.
    ///
    /// Does nothing if the loop is already running. Before the first layout, the start is
    /// deferred until the view has a size.
    pub fn start(&mut self) {
        match &mut self.bounce {
            Some(bounce) => {
                bounce.start();
            }
            None => {
                debug!("start requested before layout, deferring");
                self.start_pending = true;
            }
        }
    }

    /// Stops the loop, keeping the current frame.
    pub fn stop(&mut self) {
        self.start_pending = false;
        if let Some(bounce) = &mut self.bounce {
            bounce.stop();
        }
    }

    /// Stops the loop and rewinds to the initial frame.
    pub fn reset(&mut self) {
        self.start_pending = false;
        if let Some(bounce) = &mut self.bounce {
            bounce.reset();
        }
    }

    /// Advances the animation to `now` and returns the frame to paint.
    ///
    /// Returns `None` until the view has been laid out.
    pub fn advance(&mut self, now: Duration) -> Option<Frame> {
        self.bounce.as_mut().map(|b| b.advance(now))
    }

    /// Returns the last computed frame.
    pub fn frame(&self) -> Option<Frame> {
        self.bounce.as_ref().map(BounceLoop::frame)
    }

    pub fn is_running(&self) -> bool {
        self.bounce.as_ref().is_some_and(BounceLoop::is_running)
    }

    pub fn bounce(&self) -> Option<&BounceLoop> {
        self.bounce.as_ref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}
