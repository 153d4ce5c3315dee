//! Frame pacing for async hosts
//!
//! `PacedFrames` hands out the frames of a [`Frames`] sequence no faster than
//! the target frame rate, suspending between frame boundaries.

use crate::interpolation::{Frame, Frames};
use crate::values::Interpolate;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Async producer of frames, one per frame interval
pub struct PacedFrames<T> {
    frames: Frames<T>,
    /// Created on first use so construction doesn't need a runtime
    ticker: Option<Interval>,
}

impl<T: Interpolate> PacedFrames<T> {
    pub fn new(frames: Frames<T>) -> Self {
        Self {
            frames,
            ticker: None,
        }
    }

    /// Wait for the next frame boundary and produce its frame.
    ///
    /// The first frame is produced immediately. Returns `None` once the
    /// sequence is finished or cancelled, without waiting.
    pub async fn next_frame(&mut self) -> Option<Frame<T>> {
        if self.frames.is_finished() {
            return None;
        }

        let period = self.frames.frame_interval();
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        ticker.tick().await;

        // Cancellation may have happened while suspended
        self.frames.next()
    }

    /// Drive every remaining frame through `apply`, returning how many ran
    pub async fn for_each<F>(mut self, mut apply: F) -> usize
    where
        F: FnMut(Frame<T>),
    {
        let mut count = 0;
        while let Some(frame) = self.next_frame().await {
            apply(frame);
            count += 1;
        }
        tracing::trace!(frames = count, "paced animation finished");
        count
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Easing, Interpolation};
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_frames_are_paced_at_fps() {
        let anim = Interpolation::new(Duration::from_millis(100), Easing::Linear, 20);
        let mut paced = anim.frames(0.0_f64, 1.0).paced();

        let start = Instant::now();
        let first = paced.next_frame().await.unwrap();
        assert_eq!(first.value, 0.0);
        assert!(start.elapsed() < Duration::from_millis(1));

        let second = paced.next_frame().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!((second.value - 0.5).abs() < 1e-12);

        let last = paced.next_frame().await.unwrap();
        assert_eq!(last.value, 1.0);
        assert!(paced.next_frame().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_nanosecond_rate_still_ticks() {
        let anim = Interpolation::new(Duration::from_nanos(3), Easing::Linear, u32::MAX);
        assert!(anim.frame_interval() > Duration::ZERO);

        let mut paced = anim.frames(0.0_f64, 1.0).paced();
        let first = paced.next_frame().await.unwrap();
        assert_eq!(first.value, 0.0);

        let mut count = 1;
        while let Some(frame) = paced.next_frame().await {
            count += 1;
            if frame.is_last() {
                assert_eq!(frame.value, 1.0);
            }
        }
        assert_eq!(count, anim.steps() + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_suspended() {
        let anim = Interpolation::new(Duration::from_secs(1), Easing::EaseOut, 60);
        let token = anim.cancel_token();
        let mut seen = Vec::new();

        let count = anim
            .frames(0.0_f64, 100.0)
            .paced()
            .for_each(|frame| {
                if frame.index == 3 {
                    token.cancel();
                }
                seen.push(frame.value);
            })
            .await;

        assert_eq!(count, 4);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], 0.0);
    }
}
