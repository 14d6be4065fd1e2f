// src/screens/gameplay.rs
use crate::config::Config;
use crate::core::audio;
use crate::core::gamepad::{PadButton, PadEvent};
use crate::core::gfx::{BlendMode, RenderList, RenderObject};
use crate::core::input::{self, InputSource, KeyLayout, Lane};
use crate::core::space::{screen_center_x, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::game::beatmap::Beatmap;
use crate::game::gameplay::{GameSession, SessionPhase, SessionSnapshot};
use crate::game::judgment::JudgmentCounts;
use crate::game::note::NoteState;
use crate::game::progression::ProgressionState;
use crate::game::rules::RuleSet;
use crate::screens::{Screen, ScreenAction};
use crate::ui::color;
use crate::ui::font::{self, Align};
use crate::ui::primitives;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

// --- Layout ---
const LANE_X0: f32 = 80.0;
const LANE_STRIDE: f32 = 180.0;
pub const LANE_WIDTH: f32 = 100.0;
const LANE_BORDER: f32 = 2.0;
const LINE_THICKNESS: f32 = 3.0;
const HOLD_BODY_WIDTH: f32 = 60.0;

const HUD_SCALE: f32 = 3.0;
const JUDGMENT_SCALE: f32 = 5.0;
const KEY_LABEL_SCALE: f32 = 3.0;
const OVERLAY_SCALE: f32 = 8.0;

/// How long the FINISH / GAME OVER banner stays before the results screen.
const END_BANNER: Duration = Duration::from_secs(2);

#[inline(always)]
pub fn lane_x(lane: Lane) -> f32 {
    LANE_X0 + lane.index() as f32 * LANE_STRIDE
}

/// What the evaluation screen needs once a run is over.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub phase: SessionPhase,
    pub progression: ProgressionState,
    pub counts: JudgmentCounts,
    /// Beatmap events resolved before the run ended.
    pub resolved_notes: usize,
    pub total_notes: usize,
    pub max_hp: i32,
}

pub struct State {
    session: GameSession,
    beatmap: Arc<Beatmap>,
    layout: KeyLayout,
    music_path: PathBuf,
    /// False when the track could not be started; the run then ends on notes alone.
    music_started: bool,
    ended_at: Option<Instant>,
    snapshot: SessionSnapshot,
}

fn start_music(path: &Path) -> bool {
    match audio::play_music(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Music unavailable ({}); playing without audio.", e);
            false
        }
    }
}

pub fn init(beatmap: Arc<Beatmap>, config: &Config, now: Instant) -> State {
    let music_started = start_music(&config.music_path);
    let session = GameSession::new(beatmap.clone(), config.rules.clone(), now);
    let snapshot = session.snapshot();
    State {
        session,
        beatmap,
        layout: config.key_layout,
        music_path: config.music_path.clone(),
        music_started,
        ended_at: None,
        snapshot,
    }
}

pub fn restart(state: &mut State, now: Instant) {
    audio::stop_music();
    state.music_started = start_music(&state.music_path);
    state.session.restart(now);
    state.ended_at = None;
    state.snapshot = state.session.snapshot();
}

#[inline(always)]
fn music_playing(state: &State) -> bool {
    state.music_started && audio::is_music_playing()
}

pub fn summary(state: &State) -> RunSummary {
    RunSummary {
        phase: state.session.phase(),
        progression: state.session.progression().clone(),
        counts: *state.session.counts(),
        resolved_notes: state.session.resolved_notes(),
        total_notes: state.beatmap.len(),
        max_hp: state.session.rules().max_hp,
    }
}

pub fn session(state: &State) -> &GameSession {
    &state.session
}

pub fn handle_key_press(state: &mut State, event: &KeyEvent, now: Instant) -> ScreenAction {
    let PhysicalKey::Code(code) = event.physical_key else { return ScreenAction::None; };
    let pressed = event.state == ElementState::Pressed;

    if let Some(lane) = input::lane_from_keycode(state.layout, code) {
        if !event.repeat {
            state.session.queue_input_edge(InputSource::Keyboard, lane, pressed, now);
        }
        return ScreenAction::None;
    }

    if !pressed {
        return ScreenAction::None;
    }
    match code {
        KeyCode::Escape => {
            audio::stop_music();
            ScreenAction::Navigate(Screen::Menu)
        }
        KeyCode::F5 | KeyCode::KeyR => {
            restart(state, now);
            ScreenAction::None
        }
        _ => ScreenAction::None,
    }
}

pub fn handle_pad_event(state: &mut State, event: PadEvent, now: Instant) -> ScreenAction {
    match event {
        PadEvent::Lane { lane, pressed } => {
            state.session.queue_input_edge(InputSource::Gamepad, lane, pressed, now);
            ScreenAction::None
        }
        PadEvent::Button { btn: PadButton::Back, pressed: true } => {
            audio::stop_music();
            ScreenAction::Navigate(Screen::Menu)
        }
        PadEvent::Button { btn: PadButton::Confirm, pressed: true } => {
            restart(state, now);
            ScreenAction::None
        }
        PadEvent::Button { .. } => ScreenAction::None,
    }
}

/// Advances the session by one frame. Returns `Navigate(Evaluation)` once the
/// end banner has been on screen long enough.
pub fn update(state: &mut State, now: Instant) -> ScreenAction {
    let playing = music_playing(state);
    state.session.frame(now, playing);
    state.snapshot = state.session.snapshot();

    let phase = state.session.phase();
    if !phase.is_terminal() {
        return ScreenAction::None;
    }

    match state.ended_at {
        None => {
            info!("Run ended: {:?}.", phase);
            if phase == SessionPhase::GameOver {
                audio::stop_music();
            }
            state.ended_at = Some(now);
            ScreenAction::None
        }
        Some(at) if now.duration_since(at) >= END_BANNER => ScreenAction::Navigate(Screen::Evaluation),
        Some(_) => ScreenAction::None,
    }
}

fn build_lanes(snap: &SessionSnapshot, rules: &RuleSet, layout: KeyLayout, out: &mut RenderList) {
    let labels = layout.lane_labels();
    for lane in Lane::ALL {
        let i = lane.index();
        let x = lane_x(lane);
        if snap.lanes_held[i] {
            out.push(RenderObject::rect(x, 0.0, LANE_WIDTH, LOGICAL_HEIGHT, color::with_alpha(color::lane(lane), 0.12)));
        }
        if snap.lane_effects[i] {
            let glow = color::with_alpha(color::lighten(color::lane(lane), 0.5), 0.35);
            out.push(RenderObject::rect(x, 0.0, LANE_WIDTH, rules.judgement_line_y, glow).with_blend(BlendMode::Add));
        }
        primitives::rect_outline(out, x, 0.0, LANE_WIDTH, LOGICAL_HEIGHT, LANE_BORDER, color::GRAY);
        font::draw_text(
            out,
            labels[i],
            x + 0.5 * LANE_WIDTH,
            rules.judgement_line_y + 50.0,
            KEY_LABEL_SCALE,
            Align::Center,
            color::WHITE,
        );
    }
    primitives::hline(out, 0.0, LOGICAL_WIDTH, rules.judgement_line_y, LINE_THICKNESS, color::WHITE);
}

fn build_notes(snap: &SessionSnapshot, rules: &RuleSet, out: &mut RenderList) {
    let h = rules.note_height;
    for note in &snap.notes {
        let x = lane_x(note.lane);
        let base = color::lane(note.lane);
        let c = match note.state {
            NoteState::Holding => color::lighten(base, 0.4),
            NoteState::Falling => base,
        };
        if let Some(tail_y) = note.tail_y {
            let top = tail_y.min(note.head_y);
            let body = (note.head_y - top).max(0.0);
            let bx = x + 0.5 * (LANE_WIDTH - HOLD_BODY_WIDTH);
            out.push(RenderObject::rect(bx, top, HOLD_BODY_WIDTH, body, color::with_alpha(c, 0.6)));
            out.push(RenderObject::rect(x, tail_y - 0.25 * h, LANE_WIDTH, 0.5 * h, c));
        }
        out.push(RenderObject::rect(x, note.head_y - 0.5 * h, LANE_WIDTH, h, c));
    }
}

fn build_hud(snap: &SessionSnapshot, rules: &RuleSet, out: &mut RenderList) {
    let p = &snap.progression;
    font::draw_text(out, &format!("Score: {}", p.score), 10.0, 10.0, HUD_SCALE, Align::Left, color::WHITE);
    let combo_color = if p.fever { color::FEVER } else { color::WHITE };
    font::draw_text(out, &format!("Combo: {}", p.combo), 10.0, 50.0, HUD_SCALE, Align::Left, combo_color);

    let frac = p.hp as f32 / rules.max_hp.max(1) as f32;
    let hp_color = if frac > 0.3 { color::HP_GOOD } else { color::HP_LOW };
    font::draw_text(out, "HP", LOGICAL_WIDTH - 230.0, 14.0, 2.0, Align::Left, color::WHITE);
    primitives::gauge(out, LOGICAL_WIDTH - 200.0, 12.0, 190.0, 18.0, frac, hp_color, color::DIM);

    if p.boost_active() {
        let secs = p.boost_frames_remaining as f32 / rules.fps.max(1) as f32;
        let text = format!("BOOST {:.1}", secs);
        font::draw_text(out, &text, LOGICAL_WIDTH - 10.0, 44.0, 2.0, Align::Right, color::BOOST);
    }
    if p.fever {
        font::draw_text(out, "FEVER!", LOGICAL_WIDTH - 10.0, 66.0, 2.0, Align::Right, color::FEVER);
    }

    if let Some(display) = &snap.judgment {
        let j = display.judgment;
        font::draw_text_centered(out, j.label(), screen_center_x(), rules.judgement_line_y - 50.0, JUDGMENT_SCALE, j.color());
    }
}

fn build_end_banner(phase: SessionPhase, out: &mut RenderList) {
    let (text, c) = match phase {
        SessionPhase::Finished => ("FINISH!", color::WHITE),
        SessionPhase::GameOver => ("GAME OVER", color::HP_LOW),
        SessionPhase::Playing => return,
    };
    out.push(RenderObject::rect(0.0, 0.0, LOGICAL_WIDTH, LOGICAL_HEIGHT, [0.0, 0.0, 0.0, 0.5]));
    font::draw_text_centered(out, text, screen_center_x(), 0.5 * LOGICAL_HEIGHT, OVERLAY_SCALE, c);
}

pub fn build(state: &State, out: &mut RenderList) {
    let snap = &state.snapshot;
    let rules = state.session.rules();
    if snap.progression.fever {
        out.clear_color = [0.12, 0.02, 0.10, 1.0];
    }
    build_lanes(snap, rules, state.layout, out);
    build_notes(snap, rules, out);
    build_hud(snap, rules, out);
    build_end_banner(snap.phase, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::LANE_COUNT;
    use crate::game::beatmap::BeatEvent;

    fn state_with(events: Vec<BeatEvent>, now: Instant) -> State {
        let config = Config { music_path: PathBuf::from("does-not-exist.ogg"), ..Config::default() };
        init(Arc::new(Beatmap::from_events(events)), &config, now)
    }

    #[test]
    fn lanes_are_laid_out_left_to_right() {
        assert_eq!(lane_x(Lane::Left), 80.0);
        assert_eq!(lane_x(Lane::Right), 620.0);
        assert_eq!(lane_x(Lane::Right) + LANE_WIDTH, 720.0);
    }

    #[test]
    fn empty_beatmap_finishes_then_navigates_after_banner() {
        let t0 = Instant::now();
        let mut state = state_with(vec![], t0);
        assert_eq!(update(&mut state, t0), ScreenAction::None);
        assert_eq!(state.session.phase(), SessionPhase::Finished);
        assert_eq!(update(&mut state, t0 + Duration::from_millis(500)), ScreenAction::None);
        assert_eq!(update(&mut state, t0 + END_BANNER), ScreenAction::Navigate(Screen::Evaluation));
    }

    #[test]
    fn restart_clears_the_end_banner() {
        let t0 = Instant::now();
        let mut state = state_with(vec![BeatEvent::tap(60_000, Lane::Left)], t0);
        update(&mut state, t0);
        assert!(!state.session.phase().is_terminal());
        state.ended_at = Some(t0);
        restart(&mut state, t0);
        assert!(state.ended_at.is_none());
        assert_eq!(summary(&state).total_notes, 1);
        assert_eq!(summary(&state).resolved_notes, 0);
    }

    #[test]
    fn build_draws_lanes_line_and_hud() {
        let t0 = Instant::now();
        let mut state = state_with(vec![BeatEvent::tap(1000, Lane::Left)], t0);
        update(&mut state, t0 + Duration::from_millis(900));
        let mut list = RenderList::new(color::BLACK);
        build(&state, &mut list);
        assert_eq!(state.snapshot.notes.len(), 1);
        assert!(list.objects.len() > LANE_COUNT * 4);
    }
}
