//! Frame-by-frame interpolation
//!
//! An [`Interpolation`] describes *how* to animate (duration, easing, frame
//! rate). Calling [`Interpolation::frames`] with a start and end value gives a
//! finite, restartable [`Frames`] iterator that the host's render loop pulls
//! one value from per frame.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tessera_animation::{Easing, Interpolation};
//! use tessera_core::CanvasPoint;
//!
//! let snap = Interpolation::new(Duration::from_millis(100), Easing::EaseOut, 60);
//! let frames: Vec<_> = snap
//!     .frames(CanvasPoint::new(0.0, 0.0), CanvasPoint::new(100.0, 50.0))
//!     .collect();
//!
//! assert_eq!(frames.first().unwrap().value, CanvasPoint::new(0.0, 0.0));
//! assert_eq!(frames.last().unwrap().value, CanvasPoint::new(100.0, 50.0));
//! ```

use crate::cancel::CancelToken;
use crate::easing::Easing;
use crate::paced::PacedFrames;
use crate::values::Interpolate;
use std::iter::FusedIterator;
use std::time::Duration;

/// Frame rate used when zero is requested
pub const MIN_FPS: u32 = 1;

const MIN_FRAME_INTERVAL: Duration = Duration::from_nanos(1);

/// Timing and easing of an animation, independent of the animated value
#[derive(Clone, Debug)]
pub struct Interpolation {
    duration: Duration,
    easing: Easing,
    fps: u32,
    cancel: CancelToken,
}

impl Interpolation {
    pub fn new(duration: Duration, easing: Easing, fps: u32) -> Self {
        Self {
            duration,
            easing,
            fps: fps.max(MIN_FPS),
            cancel: CancelToken::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Time between two frames at the target frame rate, never below one
    /// nanosecond
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64).max(MIN_FRAME_INTERVAL)
    }

    /// Number of steps between the start and end frame, at least one and
    /// at most `u32::MAX - 1` so the frame count fits a `u32`
    pub fn steps(&self) -> u32 {
        let steps = (self.duration.as_secs_f64() * self.fps as f64).ceil();
        (steps as u32).clamp(1, u32::MAX - 1)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop every frame sequence produced by this interpolation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Value at progress `t`. Returns `from` and `to` verbatim at the ends.
    pub fn sample<T: Interpolate>(&self, from: &T, to: &T, t: f64) -> T {
        sample(self.easing, from, to, t)
    }

    /// Lazily produce `steps() + 1` frames from `from` to `to`
    pub fn frames<T: Interpolate>(&self, from: T, to: T) -> Frames<T> {
        Frames {
            from,
            to,
            easing: self.easing,
            steps: self.steps(),
            next: 0,
            interval: self.frame_interval(),
            cancel: self.cancel.clone(),
        }
    }
}

fn sample<T: Interpolate>(easing: Easing, from: &T, to: &T, t: f64) -> T {
    if t.is_nan() || t <= 0.0 {
        from.clone()
    } else if t >= 1.0 {
        to.clone()
    } else {
        from.lerp(to, easing.apply(t))
    }
}

/// One produced animation frame
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<T> {
    /// Frame number, starting at 0
    pub index: u32,
    /// Linear progress in `[0, 1]`
    pub progress: f64,
    /// Progress after easing
    pub eased: f64,
    pub value: T,
}

impl<T> Frame<T> {
    pub fn is_last(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Finite sequence of frames between two values
#[derive(Clone, Debug)]
pub struct Frames<T> {
    from: T,
    to: T,
    easing: Easing,
    steps: u32,
    next: u32,
    interval: Duration,
    cancel: CancelToken,
}

impl<T: Interpolate> Frames<T> {
    /// Rewind to the first frame. Cancellation is not undone.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.next > self.steps || self.is_cancelled()
    }

    /// Frames left to produce
    pub fn remaining(&self) -> usize {
        if self.is_cancelled() {
            0
        } else {
            (self.steps + 1).saturating_sub(self.next) as usize
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.interval
    }

    /// Wrap in an async producer that waits for each frame boundary
    pub fn paced(self) -> PacedFrames<T> {
        PacedFrames::new(self)
    }
}

impl<T: Interpolate> Iterator for Frames<T> {
    type Item = Frame<T>;

    fn next(&mut self) -> Option<Frame<T>> {
        if self.is_finished() {
            return None;
        }

        let index = self.next;
        self.next += 1;

        let progress = if index >= self.steps {
            1.0
        } else {
            index as f64 / self.steps as f64
        };
        Some(Frame {
            index,
            progress,
            eased: self.easing.apply(progress),
            value: sample(self.easing, &self.from, &self.to, progress),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Cancellation can end the sequence early
        (0, Some(self.remaining()))
    }
}

impl<T: Interpolate> FusedIterator for Frames<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Affine2D, CanvasPoint, ViewState, WorkspacePoint};

    const MODES: [Easing; 7] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Cubic,
        Easing::Bounce,
        Easing::Elastic,
    ];

    #[test]
    fn test_steps_follow_duration_and_fps() {
        let anim = Interpolation::new(Duration::from_millis(500), Easing::Linear, 60);
        assert_eq!(anim.steps(), 30);

        let anim = Interpolation::new(Duration::from_millis(10), Easing::Linear, 60);
        assert_eq!(anim.steps(), 1);

        let anim = Interpolation::new(Duration::ZERO, Easing::Linear, 0);
        assert_eq!(anim.fps(), 1);
        assert_eq!(anim.steps(), 1);
    }

    #[test]
    fn test_extreme_rates_stay_in_range() {
        let anim = Interpolation::new(Duration::from_secs(1), Easing::Linear, u32::MAX);
        assert_eq!(anim.frame_interval(), Duration::from_nanos(1));

        let anim = Interpolation::new(Duration::from_secs(86_400 * 365), Easing::Linear, 60);
        assert_eq!(anim.steps(), u32::MAX - 1);

        let mut frames = anim.frames(0.0_f64, 1.0);
        assert_eq!(frames.remaining(), u32::MAX as usize);
        assert_eq!(frames.next().unwrap().value, 0.0);
    }

    #[test]
    fn test_boundary_values_are_exact() {
        let from = WorkspacePoint::new(0.1, 0.7);
        let to = WorkspacePoint::new(1234.567, -89.01);

        for easing in MODES {
            let anim = Interpolation::new(Duration::from_millis(250), easing, 60);
            let frames: Vec<_> = anim.frames(from, to).collect();

            assert_eq!(frames.len(), anim.steps() as usize + 1);
            assert_eq!(frames[0].value, from, "{:?}", easing);
            assert_eq!(frames[0].progress, 0.0);
            let last = frames.last().unwrap();
            assert_eq!(last.value, to, "{:?}", easing);
            assert!(last.is_last());
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let anim = Interpolation::new(Duration::from_millis(100), Easing::Linear, 20);
        let frames: Vec<_> = anim.frames(0.0_f64, 10.0).collect();
        assert_eq!(frames.len(), 3);
        assert!((frames[1].value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_matches_frames() {
        let anim = Interpolation::new(Duration::from_secs(1), Easing::EaseInOut, 4);
        let from = ViewState::default();
        let to = ViewState::new(2.0, tessera_core::Vec2::new(-100.0, 40.0));
        for frame in anim.frames(from, to) {
            let sampled = anim.sample(&from, &to, frame.progress);
            assert!(Interpolate::approx_eq(&sampled, &frame.value, 1e-12));
        }
    }

    #[test]
    fn test_cancel_stops_sequence() {
        let anim = Interpolation::new(Duration::from_secs(1), Easing::Linear, 60);
        let mut frames = anim.frames(CanvasPoint::ZERO, CanvasPoint::new(10.0, 10.0));

        assert!(frames.next().is_some());
        assert!(frames.next().is_some());
        anim.cancel();

        assert!(frames.next().is_none());
        assert_eq!(frames.remaining(), 0);

        frames.restart();
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_restart_replays_frames() {
        let anim = Interpolation::new(Duration::from_millis(50), Easing::Bounce, 60);
        let mut frames = anim.frames(Affine2D::IDENTITY, Affine2D::scale(2.0, 2.0));
        let first: Vec<_> = frames.by_ref().collect();
        assert!(frames.next().is_none());

        frames.restart();
        let second: Vec<_> = frames.collect();
        assert_eq!(first, second);
    }
}
