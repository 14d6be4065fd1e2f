use crate::game::beatmap::BeatEvent;
use crate::game::note::Note;

/// Cursor over the schedule. Each event is spawned once, in order.
#[derive(Debug, Clone)]
pub struct NoteSpawner {
    cursor: usize,
    fall_time_ms: i64,
}

impl NoteSpawner {
    pub fn new(fall_time_ms: i64) -> Self {
        Self { cursor: 0, fall_time_ms }
    }

    pub fn fall_time_ms(&self) -> i64 {
        self.fall_time_ms
    }

    #[inline(always)]
    pub fn spawn_time_ms(&self, event: &BeatEvent) -> i64 {
        event.hit_time_ms - self.fall_time_ms
    }

    /// Appends every event due by `now_ms` and returns how many were spawned.
    pub fn spawn_due(&mut self, events: &[BeatEvent], now_ms: i64, notes: &mut Vec<Note>) -> usize {
        let start = self.cursor;
        while let Some(event) = events.get(self.cursor) {
            if self.spawn_time_ms(event) > now_ms {
                break;
            }
            notes.push(Note::from_event(self.cursor, event));
            self.cursor += 1;
        }
        self.cursor - start
    }

    pub fn is_exhausted(&self, events: &[BeatEvent]) -> bool {
        self.cursor >= events.len()
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
