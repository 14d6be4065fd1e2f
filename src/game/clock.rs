use std::time::Instant;

/// Game time in whole milliseconds since playback started.
#[derive(Debug, Clone, Copy)]
pub struct GameClock {
    started_at: Instant,
}

impl GameClock {
    pub fn start(at: Instant) -> Self {
        Self { started_at: at }
    }

    pub fn restart(&mut self, at: Instant) {
        self.started_at = at;
    }

    pub fn now_ms(&self) -> i64 {
        self.ms_at(Instant::now())
    }

    /// Instants before the start map to 0.
    pub fn ms_at(&self, at: Instant) -> i64 {
        at.saturating_duration_since(self.started_at).as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn converts_instants_relative_to_start() {
        let t0 = Instant::now();
        let clock = GameClock::start(t0);
        assert_eq!(clock.ms_at(t0), 0);
        assert_eq!(clock.ms_at(t0 + Duration::from_millis(1250)), 1250);
    }

    #[test]
    fn earlier_instants_saturate_and_restart_reanchors() {
        let t0 = Instant::now();
        let mut clock = GameClock::start(t0 + Duration::from_secs(1));
        assert_eq!(clock.ms_at(t0), 0);
        clock.restart(t0);
        assert_eq!(clock.ms_at(t0 + Duration::from_millis(40)), 40);
    }
}
