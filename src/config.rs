use crate::core::input::KeyLayout;
use crate::game::rules::RuleSet;
use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "keyfall.ini";

pub const WINDOW_TITLE: &str = "Keyfall";

#[derive(Debug, Clone)]
pub struct Config {
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    pub key_layout: KeyLayout,
    pub beatmap_path: PathBuf,
    pub music_path: PathBuf,
    pub rules: RuleSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            vsync: true,
            key_layout: KeyLayout::Asdf,
            beatmap_path: PathBuf::from("beatmap.csv"),
            music_path: PathBuf::from("music.ogg"),
            rules: RuleSet::default(),
        }
    }
}

static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

fn bool_str(b: bool) -> String {
    (if b { "1" } else { "0" }).to_string()
}

fn default_ini() -> Ini {
    let d = Config::default();
    let r = &d.rules;
    let mut conf = Ini::new();
    conf.set("Options", "WindowWidth", Some(d.window_width.to_string()));
    conf.set("Options", "WindowHeight", Some(d.window_height.to_string()));
    conf.set("Options", "VSync", Some(bool_str(d.vsync)));
    conf.set("Options", "KeyLayout", Some(d.key_layout.to_string()));
    conf.set("Options", "BeatmapPath", Some(d.beatmap_path.display().to_string()));
    conf.set("Options", "MusicPath", Some(d.music_path.display().to_string()));

    conf.set("Rules", "Fps", Some(r.fps.to_string()));
    conf.set("Rules", "NoteSpeed", Some(r.note_speed.to_string()));
    conf.set("Rules", "NoteHeight", Some(r.note_height.to_string()));
    conf.set("Rules", "JudgementLineY", Some(r.judgement_line_y.to_string()));
    conf.set("Rules", "PerfectWindow", Some(r.perfect_window.to_string()));
    conf.set("Rules", "GoodWindow", Some(r.good_window.to_string()));
    conf.set("Rules", "PerfectScore", Some(r.perfect_score.to_string()));
    conf.set("Rules", "GoodScore", Some(r.good_score.to_string()));
    conf.set("Rules", "MaxHp", Some(r.max_hp.to_string()));
    conf.set("Rules", "MissPenalty", Some(r.miss_penalty.to_string()));
    conf.set("Rules", "RegenAmount", Some(r.regen_amount.to_string()));
    conf.set("Rules", "RegenEvery", Some(r.regen_every.to_string()));
    conf.set("Rules", "BoostEvery", Some(r.boost_every.to_string()));
    conf.set("Rules", "BoostFrames", Some(r.boost_frames.to_string()));
    conf.set("Rules", "FeverThreshold", Some(r.fever_threshold.to_string()));
    conf.set("Rules", "JudgmentFrames", Some(r.judgment_frames.to_string()));
    conf.set("Rules", "LaneEffectFrames", Some(r.lane_effect_frames.to_string()));
    conf.set("Rules", "HoldThresholdMs", Some(r.hold_threshold_ms.to_string()));
    conf
}

/// Creates the default keyfall.ini if it doesn't exist.
fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("'{}' not found, creating it with default values.", path.display());
    default_ini().write(path)
}

/// Reads `key`, falling back to `default` when it is missing or fails to parse.
fn read_or<T>(conf: &Ini, section: &str, key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match conf.get(section, key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("Invalid value '{}' for {}.{}; using {}.", raw, section, key, default);
                default
            }
        },
        None => default,
    }
}

fn read_bool(conf: &Ini, section: &str, key: &str, default: bool) -> bool {
    match conf.get(section, key).as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        Some(other) => {
            warn!("Invalid value '{}' for {}.{}; using {}.", other, section, key, default);
            default
        }
        None => default,
    }
}

fn read_path(conf: &Ini, section: &str, key: &str, default: PathBuf) -> PathBuf {
    conf.get(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

pub fn from_ini(conf: &Ini) -> Config {
    let d = Config::default();
    let r = d.rules.clone();

    let key_layout = match conf.get("Options", "KeyLayout") {
        Some(raw) => raw.parse::<KeyLayout>().unwrap_or_else(|e| {
            warn!("{}; using {}.", e, d.key_layout);
            d.key_layout
        }),
        None => d.key_layout,
    };

    let rules = RuleSet {
        fps: read_or(conf, "Rules", "Fps", r.fps),
        note_speed: read_or(conf, "Rules", "NoteSpeed", r.note_speed),
        note_height: read_or(conf, "Rules", "NoteHeight", r.note_height),
        judgement_line_y: read_or(conf, "Rules", "JudgementLineY", r.judgement_line_y),
        perfect_window: read_or(conf, "Rules", "PerfectWindow", r.perfect_window),
        good_window: read_or(conf, "Rules", "GoodWindow", r.good_window),
        perfect_score: read_or(conf, "Rules", "PerfectScore", r.perfect_score),
        good_score: read_or(conf, "Rules", "GoodScore", r.good_score),
        max_hp: read_or(conf, "Rules", "MaxHp", r.max_hp),
        miss_penalty: read_or(conf, "Rules", "MissPenalty", r.miss_penalty),
        regen_amount: read_or(conf, "Rules", "RegenAmount", r.regen_amount),
        regen_every: read_or(conf, "Rules", "RegenEvery", r.regen_every),
        boost_every: read_or(conf, "Rules", "BoostEvery", r.boost_every),
        boost_frames: read_or(conf, "Rules", "BoostFrames", r.boost_frames),
        fever_threshold: read_or(conf, "Rules", "FeverThreshold", r.fever_threshold),
        judgment_frames: read_or(conf, "Rules", "JudgmentFrames", r.judgment_frames),
        lane_effect_frames: read_or(conf, "Rules", "LaneEffectFrames", r.lane_effect_frames),
        hold_threshold_ms: read_or(conf, "Rules", "HoldThresholdMs", r.hold_threshold_ms),
    }
    .sanitized();

    Config {
        window_width: read_or(conf, "Options", "WindowWidth", d.window_width).max(1),
        window_height: read_or(conf, "Options", "WindowHeight", d.window_height).max(1),
        vsync: read_bool(conf, "Options", "VSync", d.vsync),
        key_layout,
        beatmap_path: read_path(conf, "Options", "BeatmapPath", d.beatmap_path),
        music_path: read_path(conf, "Options", "MusicPath", d.music_path),
        rules,
    }
}

pub fn load() {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        if let Err(e) = create_default_file(path) {
            warn!("Failed to create '{}': {}", CONFIG_PATH, e);
            return;
        }
    }

    let mut conf = Ini::new();
    match conf.load(path) {
        Ok(_) => {
            let loaded = from_ini(&conf);
            info!(
                "Loaded '{}': {}x{}, layout {}, beatmap '{}', music '{}'.",
                CONFIG_PATH,
                loaded.window_width,
                loaded.window_height,
                loaded.key_layout,
                loaded.beatmap_path.display(),
                loaded.music_path.display()
            );
            match CONFIG.lock() {
                Ok(mut cfg) => *cfg = loaded,
                Err(poisoned) => *poisoned.into_inner() = loaded,
            }
        }
        Err(e) => warn!("Failed to load '{}': {}; using defaults.", CONFIG_PATH, e),
    }
}

/// Returns a copy of the loaded configuration.
pub fn get() -> Config {
    match CONFIG.lock() {
        Ok(cfg) => cfg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
