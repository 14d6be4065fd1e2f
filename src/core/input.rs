use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use winit::keyboard::KeyCode;

pub const LANE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Lane {
    Left = 0,
    InnerLeft = 1,
    InnerRight = 2,
    Right = 3,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::InnerLeft, Lane::InnerRight, Lane::Right];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Gamepad,
}

/// A single lane press or release, stamped when the platform delivered it.
#[derive(Clone, Copy, Debug)]
pub struct InputEdge {
    pub lane: Lane,
    pub pressed: bool,
    pub source: InputSource,
    pub timestamp: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyLayout {
    #[default]
    Asdf,
    Dfjk,
}

impl KeyLayout {
    pub const fn lane_keys(self) -> [KeyCode; LANE_COUNT] {
        match self {
            KeyLayout::Asdf => [KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD, KeyCode::KeyF],
            KeyLayout::Dfjk => [KeyCode::KeyD, KeyCode::KeyF, KeyCode::KeyJ, KeyCode::KeyK],
        }
    }

    /// Caption drawn under each lane.
    pub const fn lane_labels(self) -> [&'static str; LANE_COUNT] {
        match self {
            KeyLayout::Asdf => ["A", "S", "D", "F"],
            KeyLayout::Dfjk => ["D", "F", "J", "K"],
        }
    }
}

impl fmt::Display for KeyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLayout::Asdf => write!(f, "asdf"),
            KeyLayout::Dfjk => write!(f, "dfjk"),
        }
    }
}

impl FromStr for KeyLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asdf" => Ok(KeyLayout::Asdf),
            "dfjk" => Ok(KeyLayout::Dfjk),
            other => Err(format!("'{}' is not a valid key layout (expected asdf or dfjk)", other)),
        }
    }
}

/// Arrow keys always drive the lanes, on top of the configured letter layout.
#[inline(always)]
pub fn lane_from_keycode(layout: KeyLayout, code: KeyCode) -> Option<Lane> {
    match code {
        KeyCode::ArrowLeft => return Some(Lane::Left),
        KeyCode::ArrowDown => return Some(Lane::InnerLeft),
        KeyCode::ArrowUp => return Some(Lane::InnerRight),
        KeyCode::ArrowRight => return Some(Lane::Right),
        _ => {}
    }
    layout
        .lane_keys()
        .iter()
        .position(|key| *key == code)
        .and_then(Lane::from_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asdf_layout_maps_home_row_to_lanes() {
        let layout = KeyLayout::Asdf;
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyA), Some(Lane::Left));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyS), Some(Lane::InnerLeft));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyD), Some(Lane::InnerRight));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyF), Some(Lane::Right));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyJ), None);
    }

    #[test]
    fn dfjk_layout_shifts_keys_and_keeps_arrows() {
        let layout = KeyLayout::Dfjk;
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyD), Some(Lane::Left));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyK), Some(Lane::Right));
        assert_eq!(lane_from_keycode(layout, KeyCode::KeyA), None);
        assert_eq!(lane_from_keycode(layout, KeyCode::ArrowUp), Some(Lane::InnerRight));
    }

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!("DFJK".parse::<KeyLayout>(), Ok(KeyLayout::Dfjk));
        assert_eq!(" asdf ".parse::<KeyLayout>(), Ok(KeyLayout::Asdf));
        assert!("qwer".parse::<KeyLayout>().is_err());
    }

    #[test]
    fn lane_index_round_trips() {
        for lane in Lane::ALL {
            assert_eq!(Lane::from_index(lane.index()), Some(lane));
        }
        assert_eq!(Lane::from_index(LANE_COUNT), None);
    }
}
