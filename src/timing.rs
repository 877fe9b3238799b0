//! Frame timing: per-frame durations, a once-per-second FPS counter and the
//! optional frame cap.

use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_secs(1);

pub struct FrameClock {
    target: Duration,
    frame_cap: bool,
    frame_start: Instant,
    window_start: Instant,
    frames_in_window: u32,
    fps: u32,
}

impl FrameClock {
    pub fn new(target: Duration, frame_cap: bool) -> FrameClock {
        FrameClock::starting_at(Instant::now(), target, frame_cap)
    }

    pub fn starting_at(now: Instant, target: Duration, frame_cap: bool) -> FrameClock {
        FrameClock {
            target,
            frame_cap,
            frame_start: now,
            window_start: now,
            frames_in_window: 0,
            fps: 0,
        }
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn begin_at(&mut self, now: Instant) {
        self.frame_start = now;
    }

    /// Ends the frame and returns how long it took.
    pub fn end(&mut self) -> Duration {
        self.end_at(Instant::now())
    }

    pub fn end_at(&mut self, now: Instant) -> Duration {
        self.tick_at(now);
        now.saturating_duration_since(self.frame_start)
    }

    /// Counts a finished frame. Returns the new FPS figure whenever a full
    /// second has been measured.
    pub fn tick_at(&mut self, now: Instant) -> Option<u32> {
        self.frames_in_window += 1;
        if now.saturating_duration_since(self.window_start) >= FPS_WINDOW {
            self.fps = self.frames_in_window;
            self.frames_in_window = 0;
            self.window_start = now;
            Some(self.fps)
        } else {
            None
        }
    }

    /// Frames counted during the last complete second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// True when a fresh FPS figure was published during the last `end`.
    pub fn fps_updated(&self) -> bool {
        self.frames_in_window == 0
    }

    /// How long to sleep so a frame that took `elapsed` fills the budget.
    pub fn cap_delay(&self, elapsed: Duration) -> Option<Duration> {
        if self.frame_cap && elapsed < self.target {
            Some(self.target - elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_frame_time() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start, Duration::from_millis(16), false);
        clock.begin_at(start + Duration::from_millis(100));
        let elapsed = clock.end_at(start + Duration::from_millis(112));
        assert_eq!(elapsed, Duration::from_millis(12));
    }

    #[test]
    fn publishes_fps_once_per_second() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start, Duration::from_millis(16), false);
        for frame in 1..60 {
            let now = start + Duration::from_millis(frame * 16);
            assert_eq!(clock.tick_at(now), None);
            assert!(!clock.fps_updated());
        }
        assert_eq!(clock.tick_at(start + Duration::from_millis(1000)), Some(60));
        assert_eq!(clock.fps(), 60);
        assert!(clock.fps_updated());
        assert_eq!(clock.tick_at(start + Duration::from_millis(1016)), None);
        assert_eq!(clock.fps(), 60);
    }

    #[test]
    fn cap_fills_the_rest_of_the_budget() {
        let target = Duration::from_millis(16);
        let capped = FrameClock::new(target, true);
        assert_eq!(
            capped.cap_delay(Duration::from_millis(10)),
            Some(Duration::from_millis(6))
        );
        assert_eq!(capped.cap_delay(Duration::from_millis(16)), None);
        assert_eq!(capped.cap_delay(Duration::from_millis(30)), None);

        let uncapped = FrameClock::new(target, false);
        assert_eq!(uncapped.cap_delay(Duration::from_millis(10)), None);
    }
}
