use crate::core::input::Lane;
use crate::game::rules::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgment {
    Perfect,
    Good,
    Miss,
    TooLate,
}

impl Judgment {
    pub const fn label(self) -> &'static str {
        match self {
            Judgment::Perfect => "PERFECT!",
            Judgment::Good => "GOOD!",
            Judgment::Miss => "MISS!",
            Judgment::TooLate => "TOO LATE!",
        }
    }

    pub const fn color(self) -> [f32; 4] {
        match self {
            Judgment::Perfect | Judgment::Good => [0.0, 1.0, 0.0, 1.0],
            Judgment::Miss | Judgment::TooLate => [1.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Perfect is strictly inside its window, Good includes its edge.
/// Boost promotes Good to Perfect.
pub fn classify(distance: f32, rules: &RuleSet, boost_active: bool) -> Judgment {
    let d = distance.abs();
    if d < rules.perfect_window {
        Judgment::Perfect
    } else if d <= rules.good_window {
        if boost_active { Judgment::Perfect } else { Judgment::Good }
    } else {
        Judgment::Miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgmentDisplay {
    pub judgment: Judgment,
    pub lane: Lane,
    pub frames_left: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
    pub too_late: u32,
}

impl JudgmentCounts {
    pub fn record(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Perfect => self.perfect += 1,
            Judgment::Good => self.good += 1,
            Judgment::Miss => self.miss += 1,
            Judgment::TooLate => self.too_late += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.good + self.miss + self.too_late
    }

    /// Perfect counts fully, Good counts half.
    pub fn accuracy_percent(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.perfect as f32 + 0.5 * self.good as f32) / total as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet { perfect_window: 15.0, good_window: 30.0, ..RuleSet::default() }
    }

    #[test]
    fn window_edges() {
        let r = rules();
        assert_eq!(classify(0.0, &r, false), Judgment::Perfect);
        assert_eq!(classify(-14.9, &r, false), Judgment::Perfect);
        assert_eq!(classify(15.0, &r, false), Judgment::Good);
        assert_eq!(classify(-30.0, &r, false), Judgment::Good);
        assert_eq!(classify(30.5, &r, false), Judgment::Miss);
    }

    #[test]
    fn boost_promotes_good_only() {
        let r = rules();
        assert_eq!(classify(15.0, &r, true), Judgment::Perfect);
        assert_eq!(classify(31.0, &r, true), Judgment::Miss);
    }

    #[test]
    fn accuracy_weights_goods_half() {
        let mut counts = JudgmentCounts::default();
        assert_eq!(counts.accuracy_percent(), 0.0);
        counts.record(Judgment::Perfect);
        counts.record(Judgment::Good);
        counts.record(Judgment::Miss);
        counts.record(Judgment::TooLate);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.accuracy_percent(), 37.5);
    }
}
