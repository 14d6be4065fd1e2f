use crate::core::input::{Lane, LANE_COUNT};
use crate::game::beatmap::{self, BeatEvent};
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Captures lane presses against game time and turns them into beat events.
#[derive(Debug, Clone)]
pub struct Recorder {
    open_presses: [Option<i64>; LANE_COUNT],
    events: Vec<BeatEvent>,
    hold_threshold_ms: i64,
}

impl Recorder {
    pub fn new(hold_threshold_ms: i64) -> Self {
        Self {
            open_presses: [None; LANE_COUNT],
            events: Vec::new(),
            hold_threshold_ms,
        }
    }

    /// Number of completed events so far.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_pressed(&self, lane: Lane) -> bool {
        self.open_presses[lane.index()].is_some()
    }

    /// A repeated press while the lane is already open is ignored.
    pub fn press(&mut self, lane: Lane, now_ms: i64) {
        let slot = &mut self.open_presses[lane.index()];
        if slot.is_none() {
            *slot = Some(now_ms.max(0));
        }
    }

    pub fn release(&mut self, lane: Lane, now_ms: i64) {
        let Some(start) = self.open_presses[lane.index()].take() else { return; };
        let end = now_ms.max(start);
        let event = if end - start >= self.hold_threshold_ms {
            BeatEvent::hold(start, lane, end)
        } else {
            BeatEvent::tap(start, lane)
        };
        debug!("Recorded {:?}.", event);
        self.events.push(event);
    }

    /// Closes every press still open at `now_ms` and returns the events in time order.
    pub fn finish(mut self, now_ms: i64) -> Vec<BeatEvent> {
        for lane in Lane::ALL {
            self.release(lane, now_ms);
        }
        beatmap::sort_events(&mut self.events);
        self.events
    }
}

#[derive(Debug, PartialEq)]
pub enum SaveOutcome {
    Written { path: PathBuf, backup: Option<PathBuf>, count: usize },
    Skipped,
}

fn backup_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("beatmap");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    path.with_file_name(format!("{}-{}.{}.bak", stem, stamp, ext))
}

/// Writes the recording, moving any existing file aside first. An empty
/// recording leaves the disk untouched.
pub fn save_recording(path: &Path, events: &[BeatEvent]) -> io::Result<SaveOutcome> {
    if events.is_empty() {
        info!("No notes were recorded, so no beatmap file was created.");
        return Ok(SaveOutcome::Skipped);
    }

    let backup = if path.exists() {
        let target = backup_path(path);
        fs::rename(path, &target)?;
        info!("Backed up existing beatmap to '{}'.", target.display());
        Some(target)
    } else {
        None
    };

    beatmap::save(path, events)?;
    info!("Saved {} notes to '{}'.", events.len(), path.display());
    Ok(SaveOutcome::Written { path: path.to_path_buf(), backup, count: events.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_presses_are_taps_long_ones_holds() {
        let mut rec = Recorder::new(200);
        rec.press(Lane::Left, 100);
        rec.release(Lane::Left, 150);
        rec.press(Lane::Right, 300);
        rec.release(Lane::Right, 500);
        let events = rec.finish(1000);
        assert_eq!(events, vec![BeatEvent::tap(100, Lane::Left), BeatEvent::hold(300, Lane::Right, 500)]);
    }

    #[test]
    fn finish_sorts_and_closes_open_presses() {
        let mut rec = Recorder::new(200);
        rec.press(Lane::InnerLeft, 400);
        rec.press(Lane::Left, 900);
        rec.release(Lane::Left, 950);
        rec.press(Lane::Right, 990);
        rec.press(Lane::Right, 995);
        assert!(rec.is_pressed(Lane::Right));
        let events = rec.finish(1000);
        assert_eq!(
            events,
            vec![
                BeatEvent::hold(400, Lane::InnerLeft, 1000),
                BeatEvent::tap(900, Lane::Left),
                BeatEvent::tap(990, Lane::Right),
            ]
        );
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut rec = Recorder::new(200);
        rec.release(Lane::Left, 10);
        assert!(rec.is_empty());
    }

    #[test]
    fn empty_recording_writes_nothing() {
        let path = std::env::temp_dir().join(format!("keyfall-rec-empty-{}.csv", std::process::id()));
        assert_eq!(save_recording(&path, &[]).unwrap(), SaveOutcome::Skipped);
        assert!(!path.exists());
    }

    #[test]
    fn existing_file_is_backed_up() {
        let dir = std::env::temp_dir().join(format!("keyfall-rec-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("beatmap.csv");
        fs::write(&path, "1,0\n").unwrap();

        let outcome = save_recording(&path, &[BeatEvent::tap(5, Lane::Right)]).unwrap();
        let backup = match outcome {
            SaveOutcome::Written { backup: Some(b), count, .. } => {
                assert_eq!(count, 1);
                b
            }
            other => panic!("unexpected outcome {:?}", other),
        };
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("beatmap-") && name.ends_with(".csv.bak"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "1,0\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "5,3\n");
        let _ = fs::remove_dir_all(&dir);
    }
}
