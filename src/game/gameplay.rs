use crate::core::input::{InputEdge, InputSource, Lane, LANE_COUNT};
use crate::game::beatmap::Beatmap;
use crate::game::clock::GameClock;
use crate::game::judgment::{self, Judgment, JudgmentCounts, JudgmentDisplay};
use crate::game::note::{Note, NoteState};
use crate::game::progression::ProgressionState;
use crate::game::rules::RuleSet;
use crate::game::spawner::NoteSpawner;
use log::{debug, info};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

const HEARTBEAT_INTERVAL_MS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    GameOver,
    Finished,
}

impl SessionPhase {
    #[inline(always)]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionPhase::Playing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteView {
    pub lane: Lane,
    pub head_y: f32,
    /// Present for hold notes.
    pub tail_y: Option<f32>,
    pub state: NoteState,
}

/// Read-only view handed to the presentation layer each frame.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub now_ms: i64,
    pub phase: SessionPhase,
    pub progression: ProgressionState,
    pub counts: JudgmentCounts,
    pub notes: Vec<NoteView>,
    pub judgment: Option<JudgmentDisplay>,
    pub lane_effects: [bool; LANE_COUNT],
    pub lanes_held: [bool; LANE_COUNT],
}

/// Owns everything that changes during one playthrough.
pub struct GameSession {
    rules: RuleSet,
    beatmap: Arc<Beatmap>,
    clock: GameClock,
    spawner: NoteSpawner,
    notes: Vec<Note>,
    progression: ProgressionState,
    counts: JudgmentCounts,
    /// Beatmap events fully resolved: tap hit, hold released, or expired.
    resolved_notes: usize,
    judgment_display: Option<JudgmentDisplay>,
    lane_effects: [u32; LANE_COUNT],
    phase: SessionPhase,

    keyboard_lane_state: [bool; LANE_COUNT],
    gamepad_lane_state: [bool; LANE_COUNT],
    pending_edges: VecDeque<InputEdge>,

    last_now_ms: i64,
    next_log_ms: i64,
}

impl GameSession {
    pub fn new(beatmap: Arc<Beatmap>, rules: RuleSet, start: Instant) -> Self {
        let spawner = NoteSpawner::new(rules.fall_time_ms());
        info!(
            "Starting session: {} notes, fall time {} ms, windows {}/{}.",
            beatmap.len(),
            spawner.fall_time_ms(),
            rules.perfect_window,
            rules.good_window
        );
        Self {
            progression: ProgressionState::new(&rules),
            rules,
            beatmap,
            clock: GameClock::start(start),
            spawner,
            notes: Vec::new(),
            counts: JudgmentCounts::default(),
            resolved_notes: 0,
            judgment_display: None,
            lane_effects: [0; LANE_COUNT],
            phase: SessionPhase::Playing,
            keyboard_lane_state: [false; LANE_COUNT],
            gamepad_lane_state: [false; LANE_COUNT],
            pending_edges: VecDeque::new(),
            last_now_ms: 0,
            next_log_ms: HEARTBEAT_INTERVAL_MS,
        }
    }

    /// Discards every live note and all progression, and re-anchors the clock.
    pub fn restart(&mut self, start: Instant) {
        info!("Restarting session.");
        self.clock.restart(start);
        self.spawner.reset();
        self.notes.clear();
        self.progression = ProgressionState::new(&self.rules);
        self.counts = JudgmentCounts::default();
        self.resolved_notes = 0;
        self.judgment_display = None;
        self.lane_effects = [0; LANE_COUNT];
        self.phase = SessionPhase::Playing;
        self.keyboard_lane_state = [false; LANE_COUNT];
        self.gamepad_lane_state = [false; LANE_COUNT];
        self.pending_edges.clear();
        self.last_now_ms = 0;
        self.next_log_ms = HEARTBEAT_INTERVAL_MS;
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn counts(&self) -> &JudgmentCounts {
        &self.counts
    }

    pub fn resolved_notes(&self) -> usize {
        self.resolved_notes
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn judgment_display(&self) -> Option<&JudgmentDisplay> {
        self.judgment_display.as_ref()
    }

    pub fn queue_input_edge(&mut self, source: InputSource, lane: Lane, pressed: bool, timestamp: Instant) {
        self.pending_edges.push_back(InputEdge { lane, pressed, source, timestamp });
    }

    /// Runs one frame: drains queued edges, each judged at its own timestamp,
    /// then advances the session to `now`.
    pub fn frame(&mut self, now: Instant, music_playing: bool) {
        self.process_input_edges();
        let now_ms = self.clock.ms_at(now);
        self.update(now_ms, music_playing);
    }

    fn process_input_edges(&mut self) {
        while let Some(edge) = self.pending_edges.pop_front() {
            let idx = edge.lane.index();
            let was_down = self.keyboard_lane_state[idx] || self.gamepad_lane_state[idx];
            match edge.source {
                InputSource::Keyboard => self.keyboard_lane_state[idx] = edge.pressed,
                InputSource::Gamepad => self.gamepad_lane_state[idx] = edge.pressed,
            }
            let is_down = self.keyboard_lane_state[idx] || self.gamepad_lane_state[idx];

            let edge_ms = self.clock.ms_at(edge.timestamp).max(self.last_now_ms);
            if is_down && !was_down {
                self.key_down(edge.lane, edge_ms);
            } else if !is_down && was_down {
                self.key_up(edge.lane, edge_ms);
            }
        }
    }

    /// Judges a press in `lane` at `now_ms`. Returns `None` once the session is over.
    pub fn key_down(&mut self, lane: Lane, now_ms: i64) -> Option<Judgment> {
        self.advance_to(now_ms);
        if self.phase.is_terminal() {
            return None;
        }

        let rules = &self.rules;
        let candidate = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.lane == lane && n.state() == NoteState::Falling)
            .map(|(i, n)| (i, n.head_distance(now_ms, rules).abs(), n.target_time_ms))
            .filter(|(_, d, _)| *d <= rules.good_window)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));

        let Some((index, distance, _)) = candidate else {
            debug!("Key-down in lane {} at {} ms found no note.", lane.index(), now_ms);
            self.apply_judgment(Judgment::Miss, lane);
            return Some(Judgment::Miss);
        };

        let result = judgment::classify(distance, &self.rules, self.progression.boost_active());
        debug!(
            "Key-down in lane {} at {} ms: {:?} (distance {:.1}).",
            lane.index(),
            now_ms,
            result,
            distance
        );
        if self.notes[index].is_hold() {
            self.notes[index].begin_hold();
        } else {
            self.notes.remove(index);
            self.resolved_notes += 1;
        }
        self.apply_judgment(result, lane);
        Some(result)
    }

    /// Judges the release of a held note in `lane`. Releases with nothing held do nothing.
    pub fn key_up(&mut self, lane: Lane, now_ms: i64) -> Option<Judgment> {
        self.advance_to(now_ms);
        if self.phase.is_terminal() {
            return None;
        }

        let index = self
            .notes
            .iter()
            .position(|n| n.lane == lane && n.state() == NoteState::Holding)?;

        let mut note = self.notes.remove(index);
        note.release();
        self.resolved_notes += 1;
        let distance = note.tail_distance(now_ms, &self.rules);
        let result = judgment::classify(distance, &self.rules, self.progression.boost_active());
        debug!(
            "Released hold in lane {} at {} ms: {:?} (distance {:.1}).",
            lane.index(),
            now_ms,
            result,
            distance
        );
        self.apply_judgment(result, lane);
        Some(result)
    }

    /// Per-frame step: spawn, expire, tick transient timers, check for the end.
    pub fn update(&mut self, now_ms: i64, music_playing: bool) {
        if self.phase.is_terminal() {
            return;
        }
        self.advance_to(now_ms);
        self.tick_frame();

        if self.phase == SessionPhase::Playing
            && self.spawner.is_exhausted(self.beatmap.events())
            && self.notes.is_empty()
            && !music_playing
        {
            self.phase = SessionPhase::Finished;
            info!(
                "Session finished. Score: {}, Max Combo: {}, HP: {}.",
                self.progression.score, self.progression.max_combo, self.progression.hp
            );
        }

        if now_ms >= self.next_log_ms {
            info!(
                "Time: {} ms, Score: {}, Combo: {}, HP: {}, Active Notes: {}",
                now_ms,
                self.progression.score,
                self.progression.combo,
                self.progression.hp,
                self.notes.len()
            );
            self.next_log_ms = now_ms - now_ms % HEARTBEAT_INTERVAL_MS + HEARTBEAT_INTERVAL_MS;
        }
    }

    fn advance_to(&mut self, now_ms: i64) {
        if self.phase.is_terminal() {
            return;
        }
        self.last_now_ms = self.last_now_ms.max(now_ms);
        let spawned = self.spawner.spawn_due(self.beatmap.events(), now_ms, &mut self.notes);
        if spawned > 0 {
            debug!("Spawned {} notes at {} ms.", spawned, now_ms);
        }
        self.sweep_expired(now_ms);
    }

    fn sweep_expired(&mut self, now_ms: i64) {
        let mut i = 0;
        while i < self.notes.len() {
            if self.phase.is_terminal() {
                return;
            }
            let note = &self.notes[i];
            let overshoot = match note.state() {
                NoteState::Falling => note.head_distance(now_ms, &self.rules),
                NoteState::Holding => note.tail_distance(now_ms, &self.rules),
            };
            if overshoot <= self.rules.good_window {
                i += 1;
                continue;
            }

            let note = self.notes.remove(i);
            self.resolved_notes += 1;
            let result = if self.progression.boost_active() {
                Judgment::Perfect
            } else {
                Judgment::TooLate
            };
            debug!(
                "Note in lane {} (target {} ms) expired at {} ms: {:?}.",
                note.lane.index(),
                note.target_time_ms,
                now_ms,
                result
            );
            self.apply_judgment(result, note.lane);
        }
    }

    fn apply_judgment(&mut self, result: Judgment, lane: Lane) {
        match result {
            Judgment::Perfect => self.progression.register_hit(self.rules.perfect_score, &self.rules),
            Judgment::Good => self.progression.register_hit(self.rules.good_score, &self.rules),
            Judgment::Miss | Judgment::TooLate => self.progression.register_miss(&self.rules),
        }
        self.counts.record(result);
        self.judgment_display = Some(JudgmentDisplay {
            judgment: result,
            lane,
            frames_left: self.rules.judgment_frames,
        });
        self.lane_effects[lane.index()] = self.rules.lane_effect_frames;

        if self.progression.is_dead() && self.phase == SessionPhase::Playing {
            self.phase = SessionPhase::GameOver;
            info!(
                "HP depleted. Game over with score {} and max combo {}.",
                self.progression.score, self.progression.max_combo
            );
        }
    }

    fn tick_frame(&mut self) {
        if let Some(display) = self.judgment_display.as_mut() {
            display.frames_left = display.frames_left.saturating_sub(1);
            if display.frames_left == 0 {
                self.judgment_display = None;
            }
        }
        for frames in &mut self.lane_effects {
            *frames = frames.saturating_sub(1);
        }
        self.progression.tick_frame();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now_ms = self.last_now_ms;
        let notes = self
            .notes
            .iter()
            .map(|n| NoteView {
                lane: n.lane,
                head_y: n.head_y(now_ms, &self.rules),
                tail_y: n.is_hold().then(|| n.tail_y(now_ms, &self.rules)),
                state: n.state(),
            })
            .collect();

        let mut lanes_held = [false; LANE_COUNT];
        for (i, held) in lanes_held.iter_mut().enumerate() {
            *held = self.keyboard_lane_state[i] || self.gamepad_lane_state[i];
        }

        SessionSnapshot {
            now_ms,
            phase: self.phase,
            progression: self.progression.clone(),
            counts: self.counts,
            notes,
            judgment: self.judgment_display,
            lane_effects: self.lane_effects.map(|f| f > 0),
            lanes_held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::beatmap::BeatEvent;
    use std::time::Duration;

    // 1 px per ms and a 500 ms fall time keep the arithmetic readable.
    fn rules() -> RuleSet {
        RuleSet {
            fps: 50,
            note_speed: 20.0,
            judgement_line_y: 480.0,
            note_height: 20.0,
            ..RuleSet::default()
        }
    }

    fn session(events: Vec<BeatEvent>) -> GameSession {
        GameSession::new(Arc::new(Beatmap::from_events(events)), rules(), Instant::now())
    }

    fn scenario() -> GameSession {
        session(vec![
            BeatEvent::tap(1000, Lane::Left),
            BeatEvent::tap(1000, Lane::InnerLeft),
            BeatEvent::tap(2000, Lane::Left),
        ])
    }

    #[test]
    fn fall_time_is_500ms() {
        assert_eq!(rules().fall_time_ms(), 500);
    }

    #[test]
    fn two_notes_spawn_together() {
        let mut s = scenario();
        s.update(499, true);
        assert!(s.notes().is_empty());
        s.update(500, true);
        assert_eq!(s.notes().len(), 2);
        assert_eq!(s.snapshot().notes[0].head_y, -20.0);
    }

    #[test]
    fn documented_scenario() {
        let mut s = scenario();
        s.update(500, true);
        assert_eq!(s.key_down(Lane::Left, 1000), Some(Judgment::Perfect));
        assert_eq!(s.progression().combo, 1);
        assert_eq!(s.notes().len(), 1);
        assert_eq!(s.notes()[0].lane, Lane::InnerLeft);

        s.update(1030, true);
        assert_eq!(s.notes().len(), 1);
        s.update(1031, true);
        assert!(s.notes().iter().all(|n| n.lane != Lane::InnerLeft));
        assert_eq!(s.progression().combo, 0);
        assert_eq!(s.counts().too_late, 1);
        assert_eq!(s.judgment_display().map(|d| d.judgment), Some(Judgment::TooLate));
        assert_eq!(s.progression().max_combo, 1);
    }

    #[test]
    fn press_with_nothing_in_window_is_miss() {
        let mut s = scenario();
        s.update(900, true);
        assert_eq!(s.key_down(Lane::Left, 900), Some(Judgment::Miss));
        assert_eq!(s.progression().combo, 0);
        assert_eq!(s.progression().hp, 90);
        // The note itself is still there to be hit.
        assert_eq!(s.notes().len(), 2);
        assert_eq!(s.key_down(Lane::Right, 1000), Some(Judgment::Miss));
    }

    #[test]
    fn perfect_boundary_is_good_without_boost() {
        let mut s = scenario();
        assert_eq!(s.key_down(Lane::Left, 1015), Some(Judgment::Good));
        assert_eq!(s.progression().score, 50);
        assert_eq!(s.key_down(Lane::InnerLeft, 970), Some(Judgment::Good));
        assert_eq!(s.key_down(Lane::Left, 2014), Some(Judgment::Perfect));
        assert_eq!(s.progression().score, 200);
    }

    #[test]
    fn closest_note_wins_then_earlier() {
        let mut s = session(vec![BeatEvent::tap(1000, Lane::Right), BeatEvent::tap(1020, Lane::Right)]);
        assert_eq!(s.key_down(Lane::Right, 1012), Some(Judgment::Perfect));
        assert_eq!(s.notes().len(), 1);
        assert_eq!(s.notes()[0].target_time_ms, 1000);

        let mut s = session(vec![BeatEvent::tap(1000, Lane::Right), BeatEvent::tap(1020, Lane::Right)]);
        s.key_down(Lane::Right, 1010);
        assert_eq!(s.notes()[0].target_time_ms, 1020);
    }

    #[test]
    fn each_note_resolves_once() {
        let mut s = session(vec![BeatEvent::tap(1000, Lane::Left)]);
        assert_eq!(s.key_down(Lane::Left, 1000), Some(Judgment::Perfect));
        assert_eq!(s.key_down(Lane::Left, 1001), Some(Judgment::Miss));
        s.update(3000, true);
        assert_eq!(s.counts().total(), 2);
        assert_eq!(s.counts().too_late, 0);
    }

    #[test]
    fn hold_press_release_on_time() {
        let mut s = session(vec![BeatEvent::hold(1000, Lane::InnerRight, 1600)]);
        assert_eq!(s.key_down(Lane::InnerRight, 1005), Some(Judgment::Perfect));
        assert_eq!(s.notes()[0].state(), NoteState::Holding);
        s.update(1500, true);
        assert_eq!(s.notes().len(), 1);
        assert_eq!(s.snapshot().notes[0].head_y, 480.0);
        assert_eq!(s.key_up(Lane::InnerRight, 1620), Some(Judgment::Good));
        assert!(s.notes().is_empty());
        assert_eq!(s.progression().combo, 2);
        assert_eq!(s.key_up(Lane::InnerRight, 1700), None);
    }

    #[test]
    fn early_release_is_miss() {
        let mut s = session(vec![BeatEvent::hold(1000, Lane::Left, 2000)]);
        s.key_down(Lane::Left, 1000);
        assert_eq!(s.key_up(Lane::Left, 1500), Some(Judgment::Miss));
        assert!(s.notes().is_empty());
        assert_eq!(s.progression().combo, 0);
    }

    #[test]
    fn hold_kept_past_end_expires() {
        let mut s = session(vec![BeatEvent::hold(1000, Lane::Left, 1200)]);
        s.key_down(Lane::Left, 1000);
        s.update(1230, true);
        assert_eq!(s.notes().len(), 1);
        s.update(1231, true);
        assert!(s.notes().is_empty());
        assert_eq!(s.counts().too_late, 1);
    }

    #[test]
    fn holding_notes_are_not_pressed_again() {
        let mut s = session(vec![BeatEvent::hold(1000, Lane::Left, 1400)]);
        s.key_down(Lane::Left, 1000);
        assert_eq!(s.key_down(Lane::Left, 1010), Some(Judgment::Miss));
        assert_eq!(s.notes()[0].state(), NoteState::Holding);
    }

    #[test]
    fn boost_turns_too_late_into_perfect() {
        let mut events: Vec<BeatEvent> = (0..10).map(|i| BeatEvent::tap(1000 + i * 100, Lane::Left)).collect();
        events.push(BeatEvent::tap(2000, Lane::Right));
        let mut s = session(events);
        for i in 0..10 {
            let t = 1000 + i * 100;
            s.update(t, true);
            assert_eq!(s.key_down(Lane::Left, t), Some(Judgment::Perfect));
        }
        assert_eq!(s.progression().combo, 10);
        assert!(s.progression().boost_active());

        s.update(2031, true);
        assert!(s.notes().is_empty());
        assert_eq!(s.progression().combo, 11);
        assert_eq!(s.counts().too_late, 0);
        assert_eq!(s.counts().perfect, 11);
    }

    #[test]
    fn boost_promotes_good_presses() {
        let mut events: Vec<BeatEvent> = (0..10).map(|i| BeatEvent::tap(1000 + i * 100, Lane::Left)).collect();
        events.push(BeatEvent::tap(3000, Lane::InnerLeft));
        let mut s = session(events);
        for i in 0..10 {
            s.key_down(Lane::Left, 1000 + i * 100);
        }
        assert_eq!(s.key_down(Lane::InnerLeft, 3020), Some(Judgment::Perfect));
    }

    #[test]
    fn boost_expires_after_its_frames() {
        let mut events: Vec<BeatEvent> = (0..10).map(|i| BeatEvent::tap(1000 + i * 100, Lane::Left)).collect();
        events.push(BeatEvent::tap(9000, Lane::Right));
        let mut s = session(events);
        for i in 0..10 {
            s.key_down(Lane::Left, 1000 + i * 100);
        }
        for frame in 0..300 {
            s.update(2000 + frame, true);
        }
        assert!(!s.progression().boost_active());
        s.update(9031, true);
        assert_eq!(s.counts().too_late, 1);
    }

    #[test]
    fn hp_zero_ends_session() {
        let mut s = session(vec![BeatEvent::tap(60_000, Lane::Left)]);
        for i in 0..9 {
            s.key_down(Lane::Left, i * 10);
        }
        assert_eq!(s.progression().hp, 10);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.key_down(Lane::Left, 100), Some(Judgment::Miss));
        assert_eq!(s.progression().hp, 0);
        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(s.key_down(Lane::Left, 110), None);
        s.update(70_000, false);
        assert_eq!(s.phase(), SessionPhase::GameOver);
    }

    #[test]
    fn resolved_notes_count_events_not_judgements() {
        let mut s = session(vec![BeatEvent::hold(1000, Lane::Left, 1500), BeatEvent::tap(3000, Lane::Right)]);
        assert_eq!(s.key_down(Lane::Left, 1000), Some(Judgment::Perfect));
        assert_eq!(s.resolved_notes(), 0);
        assert_eq!(s.key_up(Lane::Left, 1500), Some(Judgment::Perfect));
        assert_eq!(s.key_down(Lane::Right, 1600), Some(Judgment::Miss));
        assert_eq!(s.counts().total(), 3);
        assert_eq!(s.resolved_notes(), 1);

        s.update(3031, true);
        assert_eq!(s.counts().too_late, 1);
        assert_eq!(s.resolved_notes(), 2);

        s.restart(Instant::now());
        assert_eq!(s.resolved_notes(), 0);
    }

    #[test]
    fn expiry_during_press_can_end_the_session() {
        let mut s = session(vec![BeatEvent::tap(1000, Lane::Left), BeatEvent::tap(5000, Lane::Right)]);
        for i in 0..9 {
            s.key_down(Lane::Right, i * 10);
        }
        assert_eq!(s.progression().hp, 10);
        assert_eq!(s.phase(), SessionPhase::Playing);

        // The press catches up the clock first; the expired tap drains the last HP.
        assert_eq!(s.key_down(Lane::Right, 2000), None);
        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(s.progression().hp, 0);
        assert_eq!(s.counts().too_late, 1);
        assert_eq!(s.counts().miss, 9);
    }

    #[test]
    fn finishes_only_after_music_stops() {
        let mut s = session(vec![BeatEvent::tap(1000, Lane::Left)]);
        s.key_down(Lane::Left, 1000);
        s.update(1100, true);
        assert_eq!(s.phase(), SessionPhase::Playing);
        s.update(1200, false);
        assert_eq!(s.phase(), SessionPhase::Finished);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = scenario();
        s.key_down(Lane::Left, 1000);
        s.key_down(Lane::Right, 1000);
        s.restart(Instant::now());
        assert_eq!(s.progression(), &ProgressionState::new(&rules()));
        assert!(s.notes().is_empty());
        assert_eq!(s.counts().total(), 0);
        s.update(500, true);
        assert_eq!(s.notes().len(), 2);
    }

    #[test]
    fn display_and_lane_effect_expire_by_frames() {
        let mut s = scenario();
        s.key_down(Lane::Left, 1000);
        assert!(s.snapshot().lane_effects[0]);
        for f in 0..10 {
            s.update(1001 + f, true);
        }
        assert!(!s.snapshot().lane_effects[0]);
        assert!(s.judgment_display().is_some());
        for f in 0..20 {
            s.update(1011 + f, true);
        }
        assert!(s.judgment_display().is_none());
    }

    #[test]
    fn queued_edges_are_judged_at_their_timestamps() {
        let start = Instant::now();
        let mut s = GameSession::new(
            Arc::new(Beatmap::from_events(vec![BeatEvent::tap(1000, Lane::Left)])),
            rules(),
            start,
        );
        s.queue_input_edge(InputSource::Keyboard, Lane::Left, true, start + Duration::from_millis(1002));
        s.queue_input_edge(InputSource::Gamepad, Lane::Left, true, start + Duration::from_millis(1003));
        s.frame(start + Duration::from_millis(1040), true);
        assert_eq!(s.counts().perfect, 1);
        // Second source pressing the held lane is not a new press.
        assert_eq!(s.counts().total(), 1);
        assert!(s.snapshot().lanes_held[0]);

        s.queue_input_edge(InputSource::Keyboard, Lane::Left, false, start + Duration::from_millis(1050));
        s.frame(start + Duration::from_millis(1060), true);
        assert!(s.snapshot().lanes_held[0]);
    }
}
