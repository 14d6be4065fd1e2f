use crate::core::input::Lane;
use crate::game::beatmap::BeatEvent;
use crate::game::rules::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Tap,
    Hold { holding: bool, released: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Falling,
    Holding,
}

/// A live instance of one `BeatEvent`, present from spawn until it resolves.
#[derive(Debug, Clone)]
pub struct Note {
    pub event_index: usize,
    pub lane: Lane,
    pub target_time_ms: i64,
    pub end_time_ms: i64,
    pub kind: NoteKind,
}

impl Note {
    pub fn from_event(event_index: usize, event: &BeatEvent) -> Self {
        let kind = if event.is_hold() {
            NoteKind::Hold { holding: false, released: false }
        } else {
            NoteKind::Tap
        };
        Self {
            event_index,
            lane: event.lane,
            target_time_ms: event.hit_time_ms,
            end_time_ms: event.end_time_ms,
            kind,
        }
    }

    #[inline(always)]
    pub fn state(&self) -> NoteState {
        match self.kind {
            NoteKind::Hold { holding: true, .. } => NoteState::Holding,
            _ => NoteState::Falling,
        }
    }

    #[inline(always)]
    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    /// Signed distance of the head from the line; positive once past it.
    #[inline(always)]
    pub fn head_distance(&self, now_ms: i64, rules: &RuleSet) -> f32 {
        rules.distance_for(now_ms - self.target_time_ms)
    }

    /// Signed distance of the hold end from the line.
    #[inline(always)]
    pub fn tail_distance(&self, now_ms: i64, rules: &RuleSet) -> f32 {
        rules.distance_for(now_ms - self.end_time_ms)
    }

    /// Screen y of the head. A held note stays pinned to the line.
    pub fn head_y(&self, now_ms: i64, rules: &RuleSet) -> f32 {
        let y = rules.judgement_line_y + self.head_distance(now_ms, rules);
        match self.state() {
            NoteState::Holding => y.min(rules.judgement_line_y),
            NoteState::Falling => y,
        }
    }

    pub fn tail_y(&self, now_ms: i64, rules: &RuleSet) -> f32 {
        rules.judgement_line_y + self.tail_distance(now_ms, rules)
    }

    pub fn begin_hold(&mut self) {
        if let NoteKind::Hold { holding, .. } = &mut self.kind {
            *holding = true;
        }
    }

    pub fn release(&mut self) {
        if let NoteKind::Hold { holding, released } = &mut self.kind {
            *holding = false;
            *released = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet { fps: 50, note_speed: 20.0, judgement_line_y: 480.0, note_height: 20.0, ..RuleSet::default() }
    }

    #[test]
    fn head_reaches_line_at_target_time() {
        let r = rules();
        let note = Note::from_event(0, &BeatEvent::tap(1000, Lane::Left));
        assert_eq!(note.head_y(1000, &r), 480.0);
        assert_eq!(note.head_y(500, &r), -20.0);
        assert_eq!(note.head_distance(1010, &r), 10.0);
    }

    #[test]
    fn held_note_is_pinned_to_line() {
        let r = rules();
        let mut note = Note::from_event(0, &BeatEvent::hold(1000, Lane::Right, 1600));
        assert_eq!(note.state(), NoteState::Falling);
        note.begin_hold();
        assert_eq!(note.state(), NoteState::Holding);
        assert_eq!(note.head_y(1300, &r), 480.0);
        assert_eq!(note.tail_y(1300, &r), 180.0);
        note.release();
        assert_eq!(note.kind, NoteKind::Hold { holding: false, released: true });
    }

    #[test]
    fn taps_ignore_hold_transitions() {
        let mut note = Note::from_event(3, &BeatEvent::tap(10, Lane::InnerLeft));
        note.begin_hold();
        assert_eq!(note.kind, NoteKind::Tap);
        assert_eq!(note.state(), NoteState::Falling);
    }
}
