use crate::core::input::{Lane, LANE_COUNT};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use log::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadButton {
    Confirm,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadEvent {
    Lane { lane: Lane, pressed: bool },
    Button { btn: PadButton, pressed: bool },
}

/// Raw per-source state; a lane is down while any of its sources is.
#[derive(Default, Clone, Copy)]
pub struct GamepadState {
    lanes: [bool; LANE_COUNT],
    dpad: [bool; LANE_COUNT],
    face: [bool; LANE_COUNT],
    lx: f32,
    ly: f32,
}

#[inline(always)]
const fn deadzone() -> f32 { 0.35 }

/// Stick directions in lane order: left, down, up, right. gilrs reports up as positive y.
#[inline(always)]
fn stick_to_lanes(x: f32, y: f32) -> [bool; LANE_COUNT] {
    let dz = deadzone();
    [x <= -dz, y <= -dz, y >= dz, x >= dz]
}

#[inline(always)]
fn dpad_lane(btn: Button) -> Option<Lane> {
    match btn {
        Button::DPadLeft => Some(Lane::Left),
        Button::DPadDown => Some(Lane::InnerLeft),
        Button::DPadUp => Some(Lane::InnerRight),
        Button::DPadRight => Some(Lane::Right),
        _ => None,
    }
}

#[inline(always)]
fn face_lane(btn: Button) -> Option<Lane> {
    match btn {
        Button::West => Some(Lane::Left),
        Button::South => Some(Lane::InnerLeft),
        Button::North => Some(Lane::InnerRight),
        Button::East => Some(Lane::Right),
        _ => None,
    }
}

fn apply_button(state: &mut GamepadState, btn: Button, pressed: bool, out: &mut Vec<PadEvent>) {
    if let Some(lane) = dpad_lane(btn) {
        state.dpad[lane.index()] = pressed;
    } else if let Some(lane) = face_lane(btn) {
        state.face[lane.index()] = pressed;
    } else {
        match btn {
            Button::Start => out.push(PadEvent::Button { btn: PadButton::Confirm, pressed }),
            Button::Select => out.push(PadEvent::Button { btn: PadButton::Back, pressed }),
            _ => {}
        }
    }
}

/// Emits lane edges for the combined D-pad, face button and stick state.
fn emit_lane_edges(state: &mut GamepadState, out: &mut Vec<PadEvent>) {
    let stick = stick_to_lanes(state.lx, state.ly);
    for lane in Lane::ALL {
        let i = lane.index();
        let want = state.dpad[i] || state.face[i] || stick[i];
        if want != state.lanes[i] {
            out.push(PadEvent::Lane { lane, pressed: want });
            state.lanes[i] = want;
        }
    }
}

/// Polls gilrs, keeps a single active pad, and returns high-level events.
pub fn poll_and_collect(gilrs: &mut Gilrs, active_id: &mut Option<GamepadId>, state: &mut GamepadState) -> Vec<PadEvent> {
    let mut out = Vec::with_capacity(8);

    while let Some(Event { id, event, .. }) = gilrs.next_event() {
        if active_id.is_none() {
            *active_id = Some(id);
        }
        if Some(id) != *active_id {
            continue;
        }

        match event {
            EventType::Connected => {
                info!("Gamepad {:?} connected.", id);
                *active_id = Some(id);
            }
            EventType::Disconnected => {
                info!("Gamepad {:?} disconnected.", id);
                *active_id = None;
                for lane in Lane::ALL {
                    if state.lanes[lane.index()] {
                        out.push(PadEvent::Lane { lane, pressed: false });
                    }
                }
                *state = GamepadState::default();
                continue;
            }
            EventType::ButtonPressed(btn, _) => apply_button(state, btn, true, &mut out),
            EventType::ButtonReleased(btn, _) => apply_button(state, btn, false, &mut out),
            EventType::AxisChanged(axis, value, _) => match axis {
                Axis::LeftStickX => state.lx = value,
                Axis::LeftStickY => state.ly = value,
                _ => {}
            },
            _ => {}
        }

        emit_lane_edges(state, &mut out);
    }

    out
}

#[inline(always)]
pub fn try_init() -> Option<Gilrs> { Gilrs::new().ok() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpad_and_face_share_a_lane() {
        let mut state = GamepadState::default();
        let mut out = Vec::new();
        apply_button(&mut state, Button::DPadLeft, true, &mut out);
        emit_lane_edges(&mut state, &mut out);
        apply_button(&mut state, Button::West, true, &mut out);
        emit_lane_edges(&mut state, &mut out);
        apply_button(&mut state, Button::DPadLeft, false, &mut out);
        emit_lane_edges(&mut state, &mut out);
        assert_eq!(out, vec![PadEvent::Lane { lane: Lane::Left, pressed: true }]);

        apply_button(&mut state, Button::West, false, &mut out);
        emit_lane_edges(&mut state, &mut out);
        assert_eq!(out.last(), Some(&PadEvent::Lane { lane: Lane::Left, pressed: false }));
    }

    #[test]
    fn start_and_select_are_menu_buttons() {
        let mut state = GamepadState::default();
        let mut out = Vec::new();
        apply_button(&mut state, Button::Start, true, &mut out);
        apply_button(&mut state, Button::Select, false, &mut out);
        assert_eq!(
            out,
            vec![
                PadEvent::Button { btn: PadButton::Confirm, pressed: true },
                PadEvent::Button { btn: PadButton::Back, pressed: false },
            ]
        );
    }

    #[test]
    fn stick_respects_deadzone() {
        assert_eq!(stick_to_lanes(0.2, -0.2), [false; LANE_COUNT]);
        assert_eq!(stick_to_lanes(0.9, -0.5), [false, true, false, true]);
    }
}
