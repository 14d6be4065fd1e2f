use log::warn;

/// Every tunable constant of the engine. Distances and windows are in
/// pixel-equivalent units; frame counts are measured at `fps`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub fps: u32,
    pub note_speed: f32,
    pub note_height: f32,
    pub judgement_line_y: f32,
    pub perfect_window: f32,
    pub good_window: f32,
    pub perfect_score: u64,
    pub good_score: u64,
    pub max_hp: i32,
    pub miss_penalty: i32,
    pub regen_amount: i32,
    pub regen_every: u32,
    pub boost_every: u32,
    pub boost_frames: u32,
    pub fever_threshold: u32,
    pub judgment_frames: u32,
    pub lane_effect_frames: u32,
    pub hold_threshold_ms: i64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            fps: 60,
            note_speed: 5.0,
            note_height: 20.0,
            judgement_line_y: 500.0,
            perfect_window: 15.0,
            good_window: 30.0,
            perfect_score: 100,
            good_score: 50,
            max_hp: 100,
            miss_penalty: 10,
            regen_amount: 10,
            regen_every: 3,
            boost_every: 10,
            boost_frames: 300,
            fever_threshold: 20,
            judgment_frames: 30,
            lane_effect_frames: 10,
            hold_threshold_ms: 200,
        }
    }
}

impl RuleSet {
    #[inline(always)]
    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.fps as f32
    }

    #[inline(always)]
    pub fn px_per_ms(&self) -> f32 {
        self.note_speed / self.frame_ms()
    }

    /// Distance a note travels from spawn (just above the screen) to the line.
    #[inline(always)]
    pub fn fall_distance(&self) -> f32 {
        self.judgement_line_y + self.note_height
    }

    pub fn fall_time_ms(&self) -> i64 {
        (self.fall_distance() / self.note_speed * self.frame_ms()).round() as i64
    }

    /// Converts a time offset into the pixel distance used by the judgement windows.
    #[inline(always)]
    pub fn distance_for(&self, delta_ms: i64) -> f32 {
        delta_ms as f32 * self.px_per_ms()
    }

    /// Replaces values that would break the engine with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = RuleSet::default();
        if self.fps == 0 {
            warn!("Fps must be positive; using {}.", defaults.fps);
            self.fps = defaults.fps;
        }
        if !(self.note_speed.is_finite() && self.note_speed > 0.0) {
            warn!("NoteSpeed must be positive; using {}.", defaults.note_speed);
            self.note_speed = defaults.note_speed;
        }
        if !(self.perfect_window >= 0.0 && self.good_window >= self.perfect_window) {
            warn!(
                "Judgement windows {}/{} are inconsistent; using {}/{}.",
                self.perfect_window, self.good_window, defaults.perfect_window, defaults.good_window
            );
            self.perfect_window = defaults.perfect_window;
            self.good_window = defaults.good_window;
        }
        if !(self.judgement_line_y.is_finite() && self.judgement_line_y >= 0.0) {
            warn!("JudgementLineY must be a non-negative number; using {}.", defaults.judgement_line_y);
            self.judgement_line_y = defaults.judgement_line_y;
        }
        if !(self.note_height.is_finite() && self.note_height >= 0.0) {
            warn!("NoteHeight must be a non-negative number; using {}.", defaults.note_height);
            self.note_height = defaults.note_height;
        }
        if self.max_hp <= 0 {
            warn!("MaxHp must be positive; using {}.", defaults.max_hp);
            self.max_hp = defaults.max_hp;
        }
        if self.miss_penalty < 0 {
            warn!("MissPenalty must not be negative; using {}.", defaults.miss_penalty);
            self.miss_penalty = defaults.miss_penalty;
        }
        if self.regen_amount < 0 {
            warn!("RegenAmount must not be negative; using {}.", defaults.regen_amount);
            self.regen_amount = defaults.regen_amount;
        }
        if self.regen_every == 0 {
            self.regen_every = defaults.regen_every;
        }
        if self.boost_every == 0 {
            self.boost_every = defaults.boost_every;
        }
        if self.hold_threshold_ms < 0 {
            self.hold_threshold_ms = defaults.hold_threshold_ms;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fall_time_matches_sixty_fps_speed() {
        let rules = RuleSet::default();
        // 520 px at 5 px per 16.67 ms frame.
        assert_eq!(rules.fall_time_ms(), 1733);
    }

    #[test]
    fn distance_scales_with_speed() {
        let rules = RuleSet { fps: 50, note_speed: 20.0, ..RuleSet::default() };
        assert_eq!(rules.px_per_ms(), 1.0);
        assert_eq!(rules.distance_for(-15), -15.0);
    }

    #[test]
    fn sanitized_restores_broken_values() {
        let rules = RuleSet { fps: 0, good_window: 5.0, regen_every: 0, ..RuleSet::default() }.sanitized();
        assert_eq!(rules.fps, 60);
        assert_eq!(rules.perfect_window, 15.0);
        assert_eq!(rules.good_window, 30.0);
        assert_eq!(rules.regen_every, 3);
    }

    #[test]
    fn sanitized_rejects_negative_hp_deltas_and_bad_geometry() {
        let rules = RuleSet {
            regen_amount: -200,
            miss_penalty: -5,
            judgement_line_y: f32::NAN,
            note_height: f32::INFINITY,
            ..RuleSet::default()
        }
        .sanitized();
        assert_eq!(rules.regen_amount, 10);
        assert_eq!(rules.miss_penalty, 10);
        assert_eq!(rules.judgement_line_y, 500.0);
        assert_eq!(rules.note_height, 20.0);
        assert_eq!(rules.fall_time_ms(), 1733);
    }
}
