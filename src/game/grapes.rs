use crate::config::{CHIME_COUNT, CHIME_INTERVAL_MS, DEFAULT_TAP_WINDOW_MS};
use crate::game::phase::Phase;
use crate::game::timer::{PhaseEvent, Snapshot};
use log::{debug, info};

pub const GRAPE_COUNT: usize = CHIME_COUNT as usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GrapeStatus {
    Correct,
    Incorrect,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The grape was eaten; only the status tells whether it was on time.
    Eaten { grape: u8, status: GrapeStatus, chime: u32 },
    /// Grape already has a status. Nothing changes.
    AlreadyEaten,
    /// Chimes have not started. The caller shows a hint.
    Early,
    /// The twelve bells are over; the grid no longer reacts.
    Closed,
    NoSuchGrape,
}

/// Chime number and whether `ms_since_midnight` falls inside its tap window.
pub fn judge_tap(ms_since_midnight: u64, window_ms: u64) -> (u32, bool) {
    let interval = CHIME_INTERVAL_MS as u64;
    let chime = (ms_since_midnight / interval) as u32 + 1;
    let window_start = (chime as u64 - 1) * interval;
    let in_window = ms_since_midnight >= window_start && ms_since_midnight < window_start + window_ms;
    (chime, in_window)
}

/// Per-round scoring state for the twelve grapes.
#[derive(Debug, Clone)]
pub struct GrapeBoard {
    status: [Option<GrapeStatus>; GRAPE_COUNT],
    last_correct_chime: u32,
    eaten_order: Vec<u8>,
    tap_window_ms: u64,
}

impl Default for GrapeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_WINDOW_MS)
    }
}

impl GrapeBoard {
    pub fn new(tap_window_ms: i64) -> Self {
        Self {
            status: [None; GRAPE_COUNT],
            last_correct_chime: 0,
            eaten_order: Vec::with_capacity(GRAPE_COUNT),
            tap_window_ms: tap_window_ms.max(1) as u64,
        }
    }

    #[inline(always)]
    fn slot(grape: u8) -> Option<usize> {
        (1..=GRAPE_COUNT as u8).contains(&grape).then(|| grape as usize - 1)
    }

    pub fn status(&self, grape: u8) -> Option<GrapeStatus> {
        Self::slot(grape).and_then(|i| self.status[i])
    }

    pub fn statuses(&self) -> &[Option<GrapeStatus>; GRAPE_COUNT] {
        &self.status
    }

    pub fn last_correct_chime(&self) -> u32 {
        self.last_correct_chime
    }

    pub fn eaten_order(&self) -> &[u8] {
        &self.eaten_order
    }

    pub fn correct_count(&self) -> usize {
        self.status.iter().filter(|s| **s == Some(GrapeStatus::Correct)).count()
    }

    pub fn eaten_count(&self) -> usize {
        self.eaten_order.len()
    }

    pub fn tap_window_ms(&self) -> u64 {
        self.tap_window_ms
    }

    pub fn reset(&mut self) {
        self.status = [None; GRAPE_COUNT];
        self.last_correct_chime = 0;
        self.eaten_order.clear();
    }

    pub fn on_event(&mut self, event: PhaseEvent) {
        if event == PhaseEvent::RoundReset {
            if self.eaten_count() > 0 {
                info!("New round: clearing {} eaten grapes.", self.eaten_count());
            }
            self.reset();
        }
    }

    /// Classifies a tap on `grape` against the current sample.
    pub fn tap(&mut self, grape: u8, snap: &Snapshot) -> TapOutcome {
        let Some(idx) = Self::slot(grape) else {
            return TapOutcome::NoSuchGrape;
        };
        if self.status[idx].is_some() {
            return TapOutcome::AlreadyEaten;
        }
        match snap.phase {
            p if p < Phase::Chimes => return TapOutcome::Early,
            Phase::Celebration => return TapOutcome::Closed,
            _ => {}
        }

        let ms = snap.ms_since_midnight();
        let (chime, in_window) = judge_tap(ms, self.tap_window_ms);
        let correct = in_window && chime > self.last_correct_chime;
        let status = if correct {
            self.last_correct_chime = chime;
            GrapeStatus::Correct
        } else {
            GrapeStatus::Incorrect
        };
        self.status[idx] = Some(status);
        self.eaten_order.push(grape);
        debug!(
            "Grape {} at {} ms (chime {}, in window: {}) -> {:?}",
            grape, ms, chime, in_window, status
        );
        TapOutcome::Eaten { grape, status, chime }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::TimeState;

    fn snap(time_diff: i64) -> Snapshot {
        Snapshot {
            phase: crate::game::phase::resolve(time_diff),
            time: TimeState::default(),
            time_diff,
            chime_count: 0,
        }
    }

    fn chimes_at(ms_since_midnight: i64) -> Snapshot {
        snap(-ms_since_midnight)
    }

    #[test]
    fn window_edges() {
        assert_eq!(judge_tap(0, 300), (1, true));
        assert_eq!(judge_tap(150, 300), (1, true));
        assert_eq!(judge_tap(299, 300), (1, true));
        assert_eq!(judge_tap(300, 300), (1, false));
        assert_eq!(judge_tap(2_900, 300), (1, false));
        assert_eq!(judge_tap(3_000, 300), (2, true));
        assert_eq!(judge_tap(33_299, 300), (12, true));
    }

    #[test]
    fn tap_inside_window_is_correct() {
        let mut board = GrapeBoard::default();
        let out = board.tap(1, &chimes_at(150));
        assert_eq!(out, TapOutcome::Eaten { grape: 1, status: GrapeStatus::Correct, chime: 1 });
        assert_eq!(board.last_correct_chime(), 1);
    }

    #[test]
    fn late_tap_is_incorrect() {
        let mut board = GrapeBoard::default();
        let out = board.tap(4, &chimes_at(2_900));
        assert_eq!(out, TapOutcome::Eaten { grape: 4, status: GrapeStatus::Incorrect, chime: 1 });
        assert_eq!(board.last_correct_chime(), 0);
        let out = board.tap(5, &chimes_at(300));
        assert!(matches!(out, TapOutcome::Eaten { status: GrapeStatus::Incorrect, .. }));
    }

    #[test]
    fn same_chime_is_credited_once() {
        let mut board = GrapeBoard::default();
        board.tap(1, &chimes_at(3_010));
        let out = board.tap(2, &chimes_at(3_020));
        assert!(matches!(out, TapOutcome::Eaten { status: GrapeStatus::Incorrect, chime: 2, .. }));
        assert_eq!(board.correct_count(), 1);
        assert_eq!(board.last_correct_chime(), 2);
    }

    #[test]
    fn double_tap_changes_nothing() {
        let mut board = GrapeBoard::default();
        board.tap(3, &chimes_at(100));
        let before = (*board.statuses(), board.last_correct_chime());
        assert_eq!(board.tap(3, &chimes_at(3_100)), TapOutcome::AlreadyEaten);
        assert_eq!(board.tap(3, &snap(30_000)), TapOutcome::AlreadyEaten);
        assert_eq!((*board.statuses(), board.last_correct_chime()), before);
        assert_eq!(board.eaten_order(), &[3]);
    }

    #[test]
    fn early_taps_record_nothing() {
        let mut board = GrapeBoard::default();
        for diff in [100_000, 30_000, 15_000, 1] {
            assert_eq!(board.tap(1, &snap(diff)), TapOutcome::Early);
        }
        assert_eq!(board.status(1), None);
        assert_eq!(board.eaten_count(), 0);
    }

    #[test]
    fn celebration_and_bad_numbers_are_ignored() {
        let mut board = GrapeBoard::default();
        assert_eq!(board.tap(1, &chimes_at(40_000)), TapOutcome::Closed);
        assert_eq!(board.tap(0, &chimes_at(100)), TapOutcome::NoSuchGrape);
        assert_eq!(board.tap(13, &chimes_at(100)), TapOutcome::NoSuchGrape);
        assert_eq!(board.eaten_count(), 0);
    }

    #[test]
    fn perfect_round_and_monotonic_credit() {
        let mut board = GrapeBoard::default();
        let mut last = 0;
        for grape in 1..=12u8 {
            let ms = (grape as i64 - 1) * CHIME_INTERVAL_MS + 50;
            board.tap(grape, &chimes_at(ms));
            assert!(board.last_correct_chime() >= last);
            last = board.last_correct_chime();
        }
        assert_eq!(board.correct_count(), 12);
        assert_eq!(board.last_correct_chime(), 12);
    }

    #[test]
    fn round_reset_clears_everything() {
        let mut board = GrapeBoard::default();
        board.tap(1, &chimes_at(10));
        board.tap(2, &chimes_at(1_000));
        board.on_event(PhaseEvent::Entered(Phase::Celebration));
        assert_eq!(board.eaten_count(), 2);
        board.on_event(PhaseEvent::RoundReset);
        assert_eq!(board.statuses(), &[None; GRAPE_COUNT]);
        assert_eq!(board.last_correct_chime(), 0);
        assert!(board.eaten_order().is_empty());
    }

    #[test]
    fn wider_window_is_configurable() {
        let mut board = GrapeBoard::new(1_000);
        let out = board.tap(1, &chimes_at(900));
        assert!(matches!(out, TapOutcome::Eaten { status: GrapeStatus::Correct, .. }));
        assert_eq!(board.tap_window_ms(), 1_000);
    }
}
