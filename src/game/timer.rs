use crate::core::clock::{Clock, TimeState};
use crate::game::phase::{self, Phase};
use log::{debug, info};

/// Everything the rest of the app needs from one sample of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub time: TimeState,
    /// Target minus now, in ms. Positive before midnight.
    pub time_diff: i64,
    /// 1..=12 while chiming, 0 in the countdown, frozen elsewhere.
    pub chime_count: u32,
}

impl Snapshot {
    #[inline(always)]
    pub fn ms_since_midnight(&self) -> u64 {
        if self.time_diff <= 0 {
            self.time_diff.unsigned_abs()
        } else {
            0
        }
    }
}

/// Edges produced by the phase state machine. Observers react to these
/// instead of keeping their own copy of the previous phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Fired before `Entered(Countdown)` whenever a new round starts.
    RoundReset,
    Entered(Phase),
}

pub struct CampanadasTimer {
    target_ms: i64,
    current: Option<Snapshot>,
}

impl CampanadasTimer {
    pub fn new(target_ms: i64) -> Self {
        Self { target_ms, current: None }
    }

    pub fn target_ms(&self) -> i64 {
        self.target_ms
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.current.map_or(Phase::Countdown, |s| s.phase)
    }

    /// Samples `clock` once. Returns the new snapshot and the edges crossed
    /// since the previous sample (empty when the phase did not change).
    pub fn sample(&mut self, clock: &dyn Clock) -> (Snapshot, Vec<PhaseEvent>) {
        let now = clock.now_ms();
        let time_diff = self.target_ms.saturating_sub(now);
        let phase = phase::resolve(time_diff);
        let previous = self.current;

        let chime_count = match phase {
            Phase::Chimes => phase::chime_number(time_diff.unsigned_abs()),
            Phase::Countdown => 0,
            _ => previous.map_or(0, |s| s.chime_count),
        };

        let snap = Snapshot { phase, time: TimeState::from_epoch_ms(now), time_diff, chime_count };

        let mut events = Vec::new();
        match previous.map(|s| s.phase) {
            Some(prev) if prev == phase => {}
            prev => {
                if phase == Phase::Countdown {
                    // Also on the very first sample: a fresh start is a new round.
                    events.push(PhaseEvent::RoundReset);
                }
                events.push(PhaseEvent::Entered(phase));
                match prev {
                    Some(prev) => info!("Phase {:?} -> {:?} ({} ms to target).", prev, phase, time_diff),
                    None => info!("Starting in phase {:?} ({} ms to target).", phase, time_diff),
                }
            }
        }
        if previous.is_some_and(|p| p.chime_count != chime_count) && phase == Phase::Chimes {
            debug!("Chime {} of 12.", chime_count);
        }

        self.current = Some(snap);
        (snap, events)
    }
}
