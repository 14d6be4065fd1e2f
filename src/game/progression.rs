use crate::game::rules::RuleSet;
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub hp: i32,
    pub boost_frames_remaining: u32,
    pub fever: bool,
}

impl ProgressionState {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            hp: rules.max_hp,
            boost_frames_remaining: 0,
            fever: false,
        }
    }

    #[inline(always)]
    pub fn boost_active(&self) -> bool {
        self.boost_frames_remaining > 0
    }

    #[inline(always)]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn register_hit(&mut self, points: u64, rules: &RuleSet) {
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);

        if self.combo % rules.regen_every == 0 {
            self.hp = (self.hp + rules.regen_amount).clamp(0, rules.max_hp);
        }
        if self.combo % rules.boost_every == 0 {
            self.boost_frames_remaining = rules.boost_frames;
            info!("Boost activated at combo {} for {} frames.", self.combo, rules.boost_frames);
        }
        let was_fever = self.fever;
        self.fever = self.combo >= rules.fever_threshold;
        if self.fever && !was_fever {
            info!("Fever reached at combo {}.", self.combo);
        }
    }

    pub fn register_miss(&mut self, rules: &RuleSet) {
        self.combo = 0;
        self.fever = false;
        self.hp = (self.hp - rules.miss_penalty).clamp(0, rules.max_hp);
    }

    /// Advances the boost countdown by one frame.
    pub fn tick_frame(&mut self) {
        self.boost_frames_remaining = self.boost_frames_remaining.saturating_sub(1);
    }
}
