// 端到端场景测试：通过 PointLoadingView 的公开接口驱动完整的动画周期。

use std::time::Duration;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use crate::animation::Clock;
use crate::config::Config;
use crate::loading::geometry::Point;
use crate::loading::{LayoutMetrics, Phase, PointLoadingView};
use crate::render::Frame;

fn started_view(config: Config, width: f64, height: f64) -> PointLoadingView {
    let mut view = PointLoadingView::new(config, Clock::with_time(Duration::ZERO));
    view.on_layout(LayoutMetrics::new(width, height)).unwrap();
    view.start();
    view
}

fn frame_at(view: &mut PointLoadingView, ms: u64) -> Frame {
    view.advance(Duration::from_millis(ms)).unwrap()
}

#[test]
fn first_frame_on_800_high_view() {
    let mut view = started_view(Config::default(), 1000., 800.);
    let bounce = view.bounce().unwrap();
    // 400 > 800 / 2 - 2 * 40
    assert_eq!(bounce.layout().metrics.jump_height, 320.);
    assert_eq!(bounce.layout().metrics.drop_distance, 100.);

    let frame = frame_at(&mut view, 0);
    assert_eq!(frame.start, Point::new(20., 400.));
    assert_eq!(frame.end, Point::new(980., 400.));
    assert_eq!(frame.ball, Point::new(500., 80.));
    assert_eq!(frame.control, Point::new(500., 400.));
    assert_eq!(frame.phase, Phase::Descending);
}

#[test]
fn first_frame_on_unclamped_view() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    let frame = frame_at(&mut view, 0);
    assert_eq!(frame.ball.y, 500. - 400.);
    assert_eq!(frame.control.y, 500.);
}

#[test]
fn descending_is_monotonic() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    let first = frame_at(&mut view, 0).ball.y;
    assert_eq!(first, 100.);

    let mut prev = first;
    for step in 1..=100 {
        let y = frame_at(&mut view, step * 15).ball.y;
        assert!(y >= prev, "ball went up at step {step}: {prev} -> {y}");
        prev = y;
    }
    assert_abs_diff_eq!(prev, 600., epsilon = 1e-9);
}

#[test]
fn ascending_is_monotonic() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    let mut prev = f64::INFINITY;
    for step in 0..=100 {
        let frame = frame_at(&mut view, 1500 + step * 15);
        let y = frame.ball.y;
        assert!(y <= prev, "ball went down at step {step}: {prev} -> {y}");
        if step < 100 {
            assert_eq!(frame.phase, Phase::Ascending);
        }
        prev = y;
    }
    assert_abs_diff_eq!(prev, 100., epsilon = 1e-9);
}

#[test]
fn rope_moves_without_jumps_over_a_cycle() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    let mut prev = frame_at(&mut view, 0);
    let mut lowest = prev.control.y;
    let mut highest = prev.control.y;

    for ms in 1..=6000 {
        let frame = frame_at(&mut view, ms);
        let delta = (frame.control.y - prev.control.y).abs();
        assert!(delta < 3., "rope jumped by {delta} at {ms} ms");
        lowest = lowest.max(frame.control.y);
        highest = highest.min(frame.control.y);
        prev = frame;
    }

    // 最低点由球落到底部时决定；回弹时控制点越过静止线向上
    assert_abs_diff_eq!(lowest, 790., epsilon = 1e-6);
    assert!(highest < 310., "rope never rebounded above rest: {highest}");
}

#[test]
fn rope_is_flat_at_the_top() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    for ms in [0, 3000, 6000, 9000] {
        let frame = frame_at(&mut view, ms);
        assert_eq!(frame.phase, Phase::Descending);
        assert_abs_diff_eq!(frame.ball.y, 100., epsilon = 1e-9);
        assert_abs_diff_eq!(frame.control.y, 500., epsilon = 1e-9);
    }
    assert_eq!(view.bounce().unwrap().cycles(), 3);
}

#[test]
fn short_view_never_bounces_upward() {
    let mut view = PointLoadingView::new(Config::default(), Clock::with_time(Duration::ZERO));
    view.start();
    assert!(view.on_layout(LayoutMetrics::new(1000., 150.)).is_err());
    assert_eq!(view.frame(), None);

    // 刚好能容纳弹跳的最小高度
    view.on_layout(LayoutMetrics::new(1000., 220.)).unwrap();
    assert!(view.is_running());
    let mut prev = f64::NEG_INFINITY;
    for ms in (0..1500).step_by(7) {
        let frame = frame_at(&mut view, ms);
        assert_eq!(frame.phase, Phase::Descending);
        assert!(frame.ball.y >= prev, "ball rose at {ms} ms");
        assert!(frame.control.is_finite());
        prev = frame.ball.y;
    }
}

#[test]
fn nan_padding_never_reaches_a_frame() {
    let mut view = PointLoadingView::new(Config::default(), Clock::with_time(Duration::ZERO));
    let metrics = LayoutMetrics::new(1000., 1000.).with_padding(f64::NAN, 0.);
    assert!(view.on_layout(metrics).is_err());
    view.start();
    assert_eq!(view.advance(Duration::from_millis(16)), None);
}

#[test]
fn late_advance_skips_whole_cycles() {
    let mut view = started_view(Config::default(), 1000., 1000.);
    frame_at(&mut view, 0);

    // 一天之后：28800 个完整周期 + 下降阶段的一半
    let frame = frame_at(&mut view, 86_400_000 + 750);
    assert_eq!(frame.phase, Phase::Descending);
    assert_abs_diff_eq!(frame.ball.y, 225., epsilon = 1e-9);
    assert_eq!(view.bounce().unwrap().cycles(), 28_800);
}

#[test]
fn slowdown_stretches_phases() {
    let config = Config {
        animation_slowdown: 2.,
        ..Config::default()
    };
    let mut view = started_view(config, 1000., 1000.);

    // 两倍慢放：1500ms 真实时间只走了半个下降阶段
    let frame = frame_at(&mut view, 1500);
    assert_eq!(frame.phase, Phase::Descending);
    assert_abs_diff_eq!(frame.ball.y, 225., epsilon = 1e-9);

    let frame = frame_at(&mut view, 3000);
    assert_eq!(frame.phase, Phase::Ascending);
    assert_abs_diff_eq!(frame.ball.y, 600., epsilon = 1e-9);
}

proptest! {
    #[test]
    fn phases_are_monotonic_for_any_view(
        width in 50f64..3000.,
        height in 1f64..3000.,
        jump in 30f64..1000.,
        drop in 0f64..300.,
        duration in 100u64..5000,
    ) {
        let config = Config {
            jump_height: jump,
            drop_distance: drop,
            phase_duration_ms: duration,
            ..Config::default()
        };
        let mut view = PointLoadingView::new(config, Clock::with_time(Duration::ZERO));
        // 放不下弹跳的尺寸整体被拒绝，不会产生倒转的帧
        prop_assume!(view.on_layout(LayoutMetrics::new(width, height)).is_ok());
        view.start();

        let mut prev = f64::NEG_INFINITY;
        for step in 0..=50 {
            let y = frame_at(&mut view, duration * step / 50).ball.y;
            prop_assert!(y >= prev - 1e-9);
            prev = y;
        }

        let mut prev = f64::INFINITY;
        for step in 0..=50 {
            let frame = frame_at(&mut view, duration + duration * step / 50);
            prop_assert!(frame.ball.y <= prev + 1e-9);
            prop_assert!(frame.control.is_finite());
            prev = frame.ball.y;
        }
    }
}
