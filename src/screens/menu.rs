// src/screens/menu.rs
use crate::config::WINDOW_TITLE;
use crate::core::gamepad::{PadButton, PadEvent};
use crate::core::gfx::RenderList;
use crate::core::input::Lane;
use crate::core::space::screen_center_x;
use crate::screens::{Screen, ScreenAction};
use crate::ui::color;
use crate::ui::font::{self, Align};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const OPTION_COUNT: usize = 3;
const MENU_OPTIONS: [&str; OPTION_COUNT] = ["PLAY", "RECORD", "EXIT"];

const TITLE_Y: f32 = 120.0;
const TITLE_SCALE: f32 = 8.0;
const MENU_START_Y: f32 = 280.0;
const MENU_ROW_SPACING: f32 = 50.0;
const MENU_SELECTED_SCALE: f32 = 5.0;
const MENU_NORMAL_SCALE: f32 = 4.0;
const INFO_SCALE: f32 = 2.0;

pub struct State {
    pub selected_index: usize,
    /// One-line message shown under the menu, e.g. a missing beatmap.
    pub notice: Option<String>,
    pub layout_hint: String,
}

pub fn init(layout_hint: String) -> State {
    State { selected_index: 0, notice: None, layout_hint }
}

fn move_selection(state: &mut State, delta: isize) {
    let n = OPTION_COUNT as isize;
    let cur = state.selected_index as isize;
    state.selected_index = ((cur + delta + n) % n) as usize;
}

fn confirm(state: &State) -> ScreenAction {
    match state.selected_index {
        0 => ScreenAction::Navigate(Screen::Gameplay),
        1 => ScreenAction::Navigate(Screen::Record),
        _ => ScreenAction::Exit,
    }
}

pub fn handle_key_press(state: &mut State, event: &KeyEvent) -> ScreenAction {
    if event.state != ElementState::Pressed { return ScreenAction::None; }

    match event.physical_key {
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) => confirm(state),
        PhysicalKey::Code(KeyCode::Escape) => ScreenAction::Exit,
        PhysicalKey::Code(KeyCode::ArrowUp) | PhysicalKey::Code(KeyCode::KeyW) => {
            move_selection(state, -1);
            ScreenAction::None
        }
        PhysicalKey::Code(KeyCode::ArrowDown) | PhysicalKey::Code(KeyCode::KeyS) => {
            move_selection(state, 1);
            ScreenAction::None
        }
        _ => ScreenAction::None,
    }
}

/// D-pad up/down (lanes 2 and 1) move the cursor; Start confirms, Select exits.
pub fn handle_pad_event(state: &mut State, event: PadEvent) -> ScreenAction {
    match event {
        PadEvent::Lane { lane: Lane::InnerRight, pressed: true } => {
            move_selection(state, -1);
            ScreenAction::None
        }
        PadEvent::Lane { lane: Lane::InnerLeft, pressed: true } => {
            move_selection(state, 1);
            ScreenAction::None
        }
        PadEvent::Button { btn: PadButton::Confirm, pressed: true } => confirm(state),
        PadEvent::Button { btn: PadButton::Back, pressed: true } => ScreenAction::Exit,
        _ => ScreenAction::None,
    }
}

pub fn build(state: &State, out: &mut RenderList) {
    let cx = screen_center_x();
    font::draw_text(out, &WINDOW_TITLE.to_uppercase(), cx, TITLE_Y, TITLE_SCALE, Align::Center, color::WHITE);

    for (i, label) in MENU_OPTIONS.iter().enumerate() {
        let y = MENU_START_Y + i as f32 * MENU_ROW_SPACING;
        let (scale, c) = if i == state.selected_index {
            (MENU_SELECTED_SCALE, color::SELECTED)
        } else {
            (MENU_NORMAL_SCALE, color::GRAY)
        };
        font::draw_text_centered(out, label, cx, y, scale, c);
    }

    font::draw_text(out, &state.layout_hint, cx, 500.0, INFO_SCALE, Align::Center, color::GRAY);
    if let Some(notice) = &state.notice {
        font::draw_text(out, notice, cx, 540.0, INFO_SCALE, Align::Center, color::HP_LOW);
    }
}
