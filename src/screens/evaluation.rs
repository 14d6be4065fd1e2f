// src/screens/evaluation.rs
use crate::core::gamepad::{PadButton, PadEvent};
use crate::core::gfx::RenderList;
use crate::core::space::screen_center_x;
use crate::game::gameplay::SessionPhase;
use crate::game::judgment::Judgment;
use crate::screens::gameplay::RunSummary;
use crate::screens::{Screen, ScreenAction};
use crate::ui::color;
use crate::ui::font::{self, Align};
use crate::ui::primitives;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const TITLE_SCALE: f32 = 6.0;
const ROW_SCALE: f32 = 3.0;
const ROW_SPACING: f32 = 36.0;
const LABEL_X: f32 = 220.0;
const VALUE_X: f32 = 580.0;

pub struct State {
    pub summary: RunSummary,
}

pub fn init(summary: RunSummary) -> State {
    State { summary }
}

/// Letter grade from accuracy; a failed run is always an F.
pub fn grade(summary: &RunSummary) -> &'static str {
    if summary.phase == SessionPhase::GameOver {
        return "F";
    }
    let acc = summary.counts.accuracy_percent();
    match acc {
        a if a >= 95.0 => "S",
        a if a >= 85.0 => "A",
        a if a >= 70.0 => "B",
        a if a >= 50.0 => "C",
        _ => "D",
    }
}

pub fn handle_key_press(_state: &mut State, event: &KeyEvent) -> ScreenAction {
    if event.state != ElementState::Pressed { return ScreenAction::None; }
    match event.physical_key {
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) | PhysicalKey::Code(KeyCode::Escape) => {
            ScreenAction::Navigate(Screen::Menu)
        }
        PhysicalKey::Code(KeyCode::KeyR) | PhysicalKey::Code(KeyCode::F5) => ScreenAction::Navigate(Screen::Gameplay),
        _ => ScreenAction::None,
    }
}

pub fn handle_pad_event(_state: &mut State, event: PadEvent) -> ScreenAction {
    match event {
        PadEvent::Button { btn: PadButton::Confirm | PadButton::Back, pressed: true } => ScreenAction::Navigate(Screen::Menu),
        _ => ScreenAction::None,
    }
}

fn row(out: &mut RenderList, i: usize, label: &str, value: String, c: [f32; 4]) {
    let y = 170.0 + i as f32 * ROW_SPACING;
    font::draw_text(out, label, LABEL_X, y, ROW_SCALE, Align::Left, c);
    font::draw_text(out, &value, VALUE_X, y, ROW_SCALE, Align::Right, color::WHITE);
}

pub fn build(state: &State, out: &mut RenderList) {
    let s = &state.summary;
    let cx = screen_center_x();
    let (title, title_color) = match s.phase {
        SessionPhase::GameOver => ("FAILED", color::HP_LOW),
        _ => ("CLEARED", color::HP_GOOD),
    };
    font::draw_text(out, title, cx, 50.0, TITLE_SCALE, Align::Center, title_color);
    font::draw_text(out, grade(s), VALUE_X + 90.0, 165.0, 10.0, Align::Center, color::WHITE);

    let c = &s.counts;
    let p = &s.progression;
    row(out, 0, Judgment::Perfect.label(), c.perfect.to_string(), Judgment::Perfect.color());
    row(out, 1, Judgment::Good.label(), c.good.to_string(), Judgment::Good.color());
    row(out, 2, Judgment::Miss.label(), c.miss.to_string(), Judgment::Miss.color());
    row(out, 3, Judgment::TooLate.label(), c.too_late.to_string(), Judgment::TooLate.color());
    row(out, 4, "SCORE", p.score.to_string(), color::WHITE);
    row(out, 5, "MAX COMBO", p.max_combo.to_string(), color::WHITE);
    row(out, 6, "ACCURACY", format!("{:.1}%", c.accuracy_percent()), color::WHITE);
    row(out, 7, "NOTES", format!("{}/{}", s.resolved_notes, s.total_notes), color::WHITE);

    let frac = p.hp as f32 / s.max_hp.max(1) as f32;
    primitives::gauge(out, LABEL_X, 470.0, VALUE_X - LABEL_X, 16.0, frac, color::HP_GOOD, color::DIM);
    font::draw_text(out, "ENTER: MENU   R: RETRY", cx, 540.0, 2.0, Align::Center, color::GRAY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::judgment::JudgmentCounts;
    use crate::game::progression::ProgressionState;
    use crate::game::rules::RuleSet;

    fn summary(phase: SessionPhase, perfect: u32, good: u32, miss: u32) -> RunSummary {
        let rules = RuleSet::default();
        RunSummary {
            phase,
            progression: ProgressionState::new(&rules),
            counts: JudgmentCounts { perfect, good, miss, too_late: 0 },
            resolved_notes: (perfect + good + miss) as usize,
            total_notes: (perfect + good + miss) as usize,
            max_hp: rules.max_hp,
        }
    }

    #[test]
    fn grades_follow_accuracy() {
        assert_eq!(grade(&summary(SessionPhase::Finished, 10, 0, 0)), "S");
        assert_eq!(grade(&summary(SessionPhase::Finished, 8, 2, 0)), "A");
        assert_eq!(grade(&summary(SessionPhase::Finished, 0, 0, 4)), "D");
        assert_eq!(grade(&summary(SessionPhase::GameOver, 10, 0, 0)), "F");
    }

    #[test]
    fn stray_misses_lower_the_grade() {
        // One hold played cleanly (two Perfects) plus one press with no note.
        let mut s = summary(SessionPhase::Finished, 2, 0, 1);
        s.resolved_notes = 1;
        s.total_notes = 1;
        assert_eq!(s.counts.total(), 3);
        assert_eq!(grade(&s), "C");
    }

    #[test]
    fn build_emits_quads() {
        let state = init(summary(SessionPhase::Finished, 3, 1, 1));
        let mut list = RenderList::new(color::BLACK);
        build(&state, &mut list);
        assert!(!list.objects.is_empty());
    }
}
