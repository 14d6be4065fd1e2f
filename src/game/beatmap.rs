use crate::core::input::{Lane, LANE_COUNT};
use log::{info, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One scheduled note. Taps have `end_time_ms == hit_time_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEvent {
    pub hit_time_ms: i64,
    pub lane: Lane,
    pub end_time_ms: i64,
}

impl BeatEvent {
    pub const fn tap(hit_time_ms: i64, lane: Lane) -> Self {
        Self { hit_time_ms, lane, end_time_ms: hit_time_ms }
    }

    pub const fn hold(hit_time_ms: i64, lane: Lane, end_time_ms: i64) -> Self {
        Self { hit_time_ms, lane, end_time_ms }
    }

    #[inline(always)]
    pub const fn is_hold(&self) -> bool {
        self.end_time_ms > self.hit_time_ms
    }
}

/// Immutable schedule, sorted by `(hit_time_ms, lane)`.
#[derive(Debug, Clone, Default)]
pub struct Beatmap {
    events: Vec<BeatEvent>,
}

impl Beatmap {
    pub fn from_events(mut events: Vec<BeatEvent>) -> Self {
        sort_events(&mut events);
        Self { events }
    }

    pub fn events(&self) -> &[BeatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn hold_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_hold()).count()
    }

    pub fn last_time_ms(&self) -> i64 {
        self.events.iter().map(|e| e.end_time_ms).max().unwrap_or(0)
    }
}

#[inline(always)]
pub fn sort_events(events: &mut [BeatEvent]) {
    events.sort_by_key(|e| (e.hit_time_ms, e.lane));
}

#[derive(Debug)]
pub enum BeatmapError {
    NotFound(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Empty { path: PathBuf, rejected: usize },
}

impl fmt::Display for BeatmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeatmapError::NotFound(path) => {
                write!(f, "beatmap '{}' not found; record one first", path.display())
            }
            BeatmapError::Io { path, source } => {
                write!(f, "failed to read beatmap '{}': {}", path.display(), source)
            }
            BeatmapError::Empty { path, rejected } => write!(
                f,
                "beatmap '{}' has no playable rows ({} rejected)",
                path.display(),
                rejected
            ),
        }
    }
}

impl std::error::Error for BeatmapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BeatmapError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowError {
    ColumnCount(usize),
    InvalidNumber(String),
    LaneOutOfRange(i64),
    NegativeTime(i64),
    EndBeforeHit { hit: i64, end: i64 },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::ColumnCount(n) => write!(f, "expected 2 or 3 columns, found {}", n),
            RowError::InvalidNumber(s) => write!(f, "'{}' is not an integer", s),
            RowError::LaneOutOfRange(l) => write!(f, "lane {} is outside 0..{}", l, LANE_COUNT),
            RowError::NegativeTime(t) => write!(f, "time {} is negative", t),
            RowError::EndBeforeHit { hit, end } => {
                write!(f, "end time {} precedes hit time {}", end, hit)
            }
        }
    }
}

fn parse_field(field: &str) -> Result<i64, RowError> {
    field
        .parse::<i64>()
        .map_err(|_| RowError::InvalidNumber(field.to_string()))
}

/// Parses one `hit_time_ms,lane[,end_time_ms]` row.
pub fn parse_row(line: &str) -> Result<BeatEvent, RowError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(RowError::ColumnCount(fields.len()));
    }

    let hit = parse_field(fields[0])?;
    let lane_raw = parse_field(fields[1])?;
    let end = match fields.get(2) {
        Some(f) => parse_field(f)?,
        None => hit,
    };

    if hit < 0 {
        return Err(RowError::NegativeTime(hit));
    }
    let lane = usize::try_from(lane_raw)
        .ok()
        .and_then(Lane::from_index)
        .ok_or(RowError::LaneOutOfRange(lane_raw))?;
    if end < hit {
        return Err(RowError::EndBeforeHit { hit, end });
    }

    Ok(BeatEvent::hold(hit, lane, end))
}

/// Returns the accepted events (sorted) and every rejected row with its
/// 1-based line number. Blank lines and `#` comments are skipped.
pub fn parse_beatmap(text: &str) -> (Vec<BeatEvent>, Vec<(usize, RowError)>) {
    let mut events = Vec::new();
    let mut rejected = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_row(line) {
            Ok(ev) => events.push(ev),
            Err(e) => rejected.push((idx + 1, e)),
        }
    }

    sort_events(&mut events);
    (events, rejected)
}

pub fn load(path: &Path) -> Result<Beatmap, BeatmapError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BeatmapError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(BeatmapError::Io { path: path.to_path_buf(), source: e }),
    };

    let (events, rejected) = parse_beatmap(&text);
    for (line_no, err) in &rejected {
        warn!("{}:{}: skipping row: {}", path.display(), line_no, err);
    }
    if events.is_empty() {
        return Err(BeatmapError::Empty { path: path.to_path_buf(), rejected: rejected.len() });
    }

    let map = Beatmap { events };
    info!(
        "Loaded beatmap '{}': {} notes ({} holds) over {} ms, {} rows rejected.",
        path.display(),
        map.len(),
        map.hold_count(),
        map.last_time_ms(),
        rejected.len()
    );
    Ok(map)
}

/// Taps are written with two columns, holds with three.
pub fn to_csv(events: &[BeatEvent]) -> String {
    let mut out = String::with_capacity(events.len() * 12);
    for ev in events {
        if ev.is_hold() {
            out.push_str(&format!("{},{},{}\n", ev.hit_time_ms, ev.lane.index(), ev.end_time_ms));
        } else {
            out.push_str(&format!("{},{}\n", ev.hit_time_ms, ev.lane.index()));
        }
    }
    out
}

pub fn save(path: &Path, events: &[BeatEvent]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_csv(events))
}
