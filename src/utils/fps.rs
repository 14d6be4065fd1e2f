use std::time::{Duration, Instant};

/// Counts rendered frames and reports a rate about once per second.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0 }
    }

    /// Call once per rendered frame. Returns `Some(fps)` when a one-second window closes.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

/// Deadline scheduler for a fixed frame rate.
pub struct FramePacer {
    interval: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self { interval: Duration::from_secs(1) / fps.max(1), next: now }
    }

    #[inline(always)]
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// True when a frame is due at `now`; advances the deadline. If the loop
    /// fell more than one interval behind, the schedule restarts from `now`
    /// instead of bursting to catch up.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next < now {
            self.next = now + self.interval;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let t0 = Instant::now();
        let mut counter = FpsCounter::new(t0);
        for i in 1..60 {
            assert_eq!(counter.tick(t0 + Duration::from_millis(i * 16)), None);
        }
        let fps = counter.tick(t0 + Duration::from_secs(1)).unwrap();
        assert!((fps - 60.0).abs() < 1e-3);
        assert_eq!(counter.tick(t0 + Duration::from_millis(1010)), None);
    }

    #[test]
    fn pacer_skips_missed_frames() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(50, t0);
        assert!(pacer.due(t0));
        assert!(!pacer.due(t0 + Duration::from_millis(10)));
        assert!(pacer.due(t0 + Duration::from_millis(20)));
        assert!(pacer.due(t0 + Duration::from_millis(200)));
        assert_eq!(pacer.next_deadline(), t0 + Duration::from_millis(220));
    }
}
