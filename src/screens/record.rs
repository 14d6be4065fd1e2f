// src/screens/record.rs
use crate::config::Config;
use crate::core::audio;
use crate::core::gamepad::{PadButton, PadEvent};
use crate::core::gfx::{RenderList, RenderObject};
use crate::core::input::{self, KeyLayout, Lane};
use crate::core::space::{screen_center_x, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::game::clock::GameClock;
use crate::game::recorder::{self, Recorder, SaveOutcome};
use crate::screens::gameplay::{lane_x, LANE_WIDTH};
use crate::screens::{Screen, ScreenAction};
use crate::ui::color;
use crate::ui::font::{self, Align};
use crate::ui::primitives;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const HUD_SCALE: f32 = 3.0;
const PAD_Y: f32 = 440.0;
const PAD_H: f32 = 60.0;

pub struct State {
    clock: GameClock,
    /// Taken when the recording is saved; `None` afterwards.
    recorder: Option<Recorder>,
    layout: KeyLayout,
    beatmap_path: PathBuf,
    music_started: bool,
    now_ms: i64,
    /// Result line handed back to the menu.
    notice: Option<String>,
}

pub fn init(config: &Config, now: Instant) -> State {
    let music_started = match audio::play_music(&config.music_path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Music unavailable ({}); recording until Escape.", e);
            false
        }
    };
    info!("Recording to '{}'. Press Escape to stop.", config.beatmap_path.display());
    State {
        clock: GameClock::start(now),
        recorder: Some(Recorder::new(config.rules.hold_threshold_ms)),
        layout: config.key_layout,
        beatmap_path: config.beatmap_path.clone(),
        music_started,
        now_ms: 0,
        notice: None,
    }
}

#[inline(always)]
pub fn is_recording(state: &State) -> bool {
    state.recorder.is_some()
}

pub fn take_notice(state: &mut State) -> Option<String> {
    state.notice.take()
}

fn lane_edge(state: &mut State, lane: Lane, pressed: bool, now: Instant) {
    let ms = state.clock.ms_at(now);
    let Some(rec) = state.recorder.as_mut() else { return; };
    if pressed {
        rec.press(lane, ms);
    } else {
        rec.release(lane, ms);
    }
}

/// Stops the music, closes open presses and writes the beatmap. Safe to call twice.
pub fn finish(state: &mut State, now: Instant) {
    let Some(rec) = state.recorder.take() else { return; };
    audio::stop_music();
    let events = rec.finish(state.clock.ms_at(now));
    state.notice = Some(match recorder::save_recording(&state.beatmap_path, &events) {
        Ok(SaveOutcome::Written { count, .. }) => format!("Saved {} notes", count),
        Ok(SaveOutcome::Skipped) => "No notes recorded".to_string(),
        Err(e) => {
            error!("Failed to save '{}': {}", state.beatmap_path.display(), e);
            "Failed to save beatmap".to_string()
        }
    });
}

pub fn handle_key_press(state: &mut State, event: &KeyEvent, now: Instant) -> ScreenAction {
    let PhysicalKey::Code(code) = event.physical_key else { return ScreenAction::None; };
    let pressed = event.state == ElementState::Pressed;

    if let Some(lane) = input::lane_from_keycode(state.layout, code) {
        if !event.repeat {
            lane_edge(state, lane, pressed, now);
        }
        return ScreenAction::None;
    }
    if pressed && code == KeyCode::Escape {
        finish(state, now);
        return ScreenAction::Navigate(Screen::Menu);
    }
    ScreenAction::None
}

pub fn handle_pad_event(state: &mut State, event: PadEvent, now: Instant) -> ScreenAction {
    match event {
        PadEvent::Lane { lane, pressed } => {
            lane_edge(state, lane, pressed, now);
            ScreenAction::None
        }
        PadEvent::Button { btn: PadButton::Back, pressed: true } => {
            finish(state, now);
            ScreenAction::Navigate(Screen::Menu)
        }
        PadEvent::Button { .. } => ScreenAction::None,
    }
}

/// Ends the recording on its own once the track has played out.
pub fn update(state: &mut State, now: Instant) -> ScreenAction {
    state.now_ms = state.clock.ms_at(now);
    if state.music_started && is_recording(state) && !audio::is_music_playing() {
        info!("Music finished at {} ms.", state.now_ms);
        finish(state, now);
        return ScreenAction::Navigate(Screen::Menu);
    }
    ScreenAction::None
}

pub fn build(state: &State, out: &mut RenderList) {
    let count = state.recorder.as_ref().map_or(0, Recorder::len);
    font::draw_text(out, &format!("Time: {} ms", state.now_ms), 10.0, 10.0, HUD_SCALE, Align::Left, color::WHITE);
    font::draw_text(out, &format!("Notes: {}", count), 10.0, 50.0, HUD_SCALE, Align::Left, color::WHITE);
    font::draw_text(out, "RECORDING", LOGICAL_WIDTH - 10.0, 10.0, HUD_SCALE, Align::Right, color::HP_LOW);

    let labels = state.layout.lane_labels();
    for lane in Lane::ALL {
        let x = lane_x(lane);
        let held = state.recorder.as_ref().is_some_and(|r| r.is_pressed(lane));
        if held {
            out.push(RenderObject::rect(x, PAD_Y, LANE_WIDTH, PAD_H, color::lane(lane)));
        }
        primitives::rect_outline(out, x, PAD_Y, LANE_WIDTH, PAD_H, 2.0, color::GRAY);
        font::draw_text(out, labels[lane.index()], x + 0.5 * LANE_WIDTH, PAD_Y + PAD_H + 20.0, HUD_SCALE, Align::Center, color::WHITE);
    }
    font::draw_text(out, "ESC: STOP AND SAVE", screen_center_x(), LOGICAL_HEIGHT - 30.0, 2.0, Align::Center, color::GRAY);
}
