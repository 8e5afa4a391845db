use crate::config::{CHIME_COUNT, QUARTER_COUNT, QUARTER_INTERVAL_MS, QUARTERS_REFERENCE_MS};
use crate::core::effects::Sounds;
use crate::game::phase::{self, Phase};
use crate::game::timer::{PhaseEvent, Snapshot};
use log::debug;

/// Decides which bell to ring. Each sound fires at most once per edge; the
/// trackers below only exist to detect those edges.
#[derive(Debug, Default)]
pub struct CueController {
    carillon_played: bool,
    last_quarter: Option<u32>,
    last_chime: Option<u32>,
}

/// Index of the quarter bell due at `time_diff`, if any.
pub fn quarter_index(time_diff: i64) -> Option<u32> {
    let idx = (QUARTERS_REFERENCE_MS - time_diff).div_euclid(QUARTER_INTERVAL_MS);
    (0..QUARTER_COUNT as i64).contains(&idx).then_some(idx as u32)
}

impl CueController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(&mut self, event: PhaseEvent, sounds: &mut dyn Sounds) {
        match event {
            PhaseEvent::RoundReset => {
                *self = Self::default();
            }
            PhaseEvent::Entered(Phase::Celebration) => sounds.play_celebration_crowd(),
            PhaseEvent::Entered(Phase::Carillon) if !self.carillon_played => {
                self.carillon_played = true;
                sounds.play_carillon();
            }
            PhaseEvent::Entered(_) => {}
        }
    }

    pub fn on_sample(&mut self, snap: &Snapshot, sounds: &mut dyn Sounds) {
        match snap.phase {
            Phase::Quarters => {
                if let Some(idx) = quarter_index(snap.time_diff) {
                    if self.last_quarter != Some(idx) {
                        debug!("Quarter bell {}.", idx + 1);
                        self.last_quarter = Some(idx);
                        sounds.play_quarter();
                    }
                }
            }
            Phase::Chimes => {
                let idx = phase::chime_index(snap.ms_since_midnight());
                if idx < CHIME_COUNT && self.last_chime != Some(idx) {
                    self.last_chime = Some(idx);
                    sounds.play_chime();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::tests::ManualClock;
    use crate::core::effects::Sound;
    use crate::core::effects::tests::Recorder;
    use crate::game::timer::CampanadasTimer;

    const TARGET: i64 = 1_798_761_600_000;

    /// Runs the timer from `from_diff` to `to_diff` in `step` ms frames.
    fn run(cues: &mut CueController, rec: &mut Recorder, from_diff: i64, to_diff: i64, step: i64) {
        let mut timer = CampanadasTimer::new(TARGET);
        let clock = ManualClock::at(TARGET - from_diff);
        while TARGET - clock.now.get() > to_diff {
            let (snap, events) = timer.sample(&clock);
            for e in events {
                cues.on_event(e, rec);
            }
            cues.on_sample(&snap, rec);
            clock.advance(step);
        }
    }

    #[test]
    fn quarter_index_formula() {
        assert_eq!(quarter_index(20_000), Some(0));
        assert_eq!(quarter_index(20_001), None);
        assert_eq!(quarter_index(16_501), Some(0));
        assert_eq!(quarter_index(16_500), Some(1));
        assert_eq!(quarter_index(15_000), Some(1));
        assert_eq!(quarter_index(13_000), Some(2));
        assert_eq!(quarter_index(9_500), Some(3));
        assert_eq!(quarter_index(6_001), Some(3));
        assert_eq!(quarter_index(6_000), None);
    }

    #[test]
    fn full_night_rings_every_bell_once() {
        let mut cues = CueController::new();
        let mut rec = Recorder::default();
        run(&mut cues, &mut rec, 60_000, -60_000, 16);

        assert_eq!(rec.count(Sound::Carillon), 1);
        assert_eq!(rec.count(Sound::Chime), 12);
        assert_eq!(rec.count(Sound::CelebrationCrowd), 1);
        assert_eq!(rec.count(Sound::Quarter), 4);
        assert_eq!(rec.count(Sound::Gulp), 0);

        let first_chime = rec.sounds.iter().position(|s| *s == Sound::Chime).unwrap();
        let last_quarter = rec.sounds.iter().rposition(|s| *s == Sound::Quarter).unwrap();
        assert!(last_quarter < first_chime);
    }

    #[test]
    fn quarters_ring_three_and_a_half_seconds_apart() {
        let mut cues = CueController::new();
        let mut rec = Recorder::default();
        let mut rung = Vec::new();
        let mut timer = CampanadasTimer::new(TARGET);
        let clock = ManualClock::at(TARGET - 21_000);
        while TARGET - clock.now.get() > 4_000 {
            let (snap, events) = timer.sample(&clock);
            for e in events {
                cues.on_event(e, &mut rec);
            }
            let before = rec.count(Sound::Quarter);
            cues.on_sample(&snap, &mut rec);
            if rec.count(Sound::Quarter) > before {
                rung.push(snap.time_diff);
            }
            clock.advance(10);
        }
        assert_eq!(rung, vec![20_000, 16_500, 13_000, 9_500]);
    }

    #[test]
    fn chimes_ring_on_coarse_sampling_too() {
        let mut cues = CueController::new();
        let mut rec = Recorder::default();
        run(&mut cues, &mut rec, 1_000, -37_000, 1_000);
        assert_eq!(rec.count(Sound::Chime), 12);
    }

    #[test]
    fn carillon_only_once_per_round() {
        let mut cues = CueController::new();
        let mut rec = Recorder::default();
        cues.on_event(PhaseEvent::Entered(Phase::Carillon), &mut rec);
        cues.on_event(PhaseEvent::Entered(Phase::Quarters), &mut rec);
        cues.on_event(PhaseEvent::Entered(Phase::Carillon), &mut rec);
        assert_eq!(rec.count(Sound::Carillon), 1);

        cues.on_event(PhaseEvent::RoundReset, &mut rec);
        cues.on_event(PhaseEvent::Entered(Phase::Carillon), &mut rec);
        assert_eq!(rec.count(Sound::Carillon), 2);
    }

    #[test]
    fn round_reset_rearms_chimes() {
        let mut cues = CueController::new();
        let mut rec = Recorder::default();
        run(&mut cues, &mut rec, 1_000, -37_000, 50);
        cues.on_event(PhaseEvent::RoundReset, &mut rec);
        run(&mut cues, &mut rec, 1_000, -37_000, 50);
        assert_eq!(rec.count(Sound::Chime), 24);
    }
}
