use crate::config::{
    EARLY_TAP_OVERLAY, INSTRUCTIONS_OVERLAY, REHEARSAL_LEAD_MS, VIBRATION_PATTERN_MS, WINDOW_HEIGHT,
    WINDOW_WIDTH,
};
use crate::core::clock::Clock;
use crate::core::effects::{Confetti, Haptics, Sounds};
use crate::core::timers::Timers;
use crate::game::cues::CueController;
use crate::game::fireworks::FireworksController;
use crate::game::grapes::{GrapeBoard, TapOutcome};
use crate::game::phase::Phase;
use crate::game::timer::{CampanadasTimer, Snapshot};
use crate::ui::layout::Layout;
use crate::ui::stage::Stage;
use log::{info, warn};
use rand::rngs::StdRng;
use std::time::Instant;

pub const EARLY_TAP_MESSAGE: &str = "¡Aún no ansioso!, espera a que empiecen las campanadas.";
pub const INSTRUCTIONS_MESSAGE: &str = "Vamos a empezar bien el año!!! Espera a que empiecen las campanadas y toca cada uva cuando suene la campana.";

/// Everything scheduled on the frame loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alarm {
    MouthClose,
    FlyingGrapeDone(u64),
    OverlayClose,
    FireworksBurst,
    FireworksExplosion,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Tap(u8),
    Instructions,
    Rehearse,
    /// First user gesture; lets the audio output start.
    ResumeAudio,
    DismissMessage,
}

/// The side-effect sinks for one call into the session.
pub struct Effects<'a> {
    pub sounds: &'a mut dyn Sounds,
    pub haptics: &'a mut dyn Haptics,
    pub confetti: &'a mut dyn Confetti,
}

/// One night of campanadas: the timer and everything that reacts to it.
pub struct Session<C: Clock> {
    clock: C,
    timer: CampanadasTimer,
    cues: CueController,
    fireworks: FireworksController,
    board: GrapeBoard,
    stage: Stage,
    alarms: Timers<Alarm>,
    layout: Layout,
    rng: StdRng,
    target_year: i32,
    rehearsing: bool,
}

impl<C: Clock> Session<C> {
    pub fn new(clock: C, target_year: i32, target_ms: i64, tap_window_ms: i64, rng: StdRng) -> Self {
        Self {
            clock,
            timer: CampanadasTimer::new(target_ms),
            cues: CueController::new(),
            fireworks: FireworksController::new(),
            board: GrapeBoard::new(tap_window_ms),
            stage: Stage::new(),
            alarms: Timers::new(),
            layout: Layout::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            rng,
            target_year,
            rehearsing: false,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.timer.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }

    pub fn board(&self) -> &GrapeBoard {
        &self.board
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn target_year(&self) -> i32 {
        self.target_year
    }

    pub fn is_rehearsing(&self) -> bool {
        self.rehearsing
    }

    pub fn fireworks_running(&self) -> bool {
        self.fireworks.is_running()
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Samples the clock, notifies observers of any phase edge, then runs
    /// whatever alarms came due.
    pub fn tick(&mut self, now: Instant, fx: &mut Effects) -> Snapshot {
        let (snap, events) = self.timer.sample(&self.clock);
        for event in events {
            self.board.on_event(event);
            self.cues.on_event(event, fx.sounds);
            self.fireworks.on_event(event, now, &mut self.alarms, &mut self.rng, fx.confetti);
        }
        self.cues.on_sample(&snap, fx.sounds);

        for alarm in self.alarms.poll(now) {
            match alarm {
                Alarm::FireworksBurst => {
                    self.fireworks.on_burst(now, &mut self.alarms, &mut self.rng, fx.confetti)
                }
                Alarm::FireworksExplosion => self.fireworks.on_explosion(fx.sounds),
                other => {
                    self.stage.on_alarm(other);
                }
            }
        }
        snap
    }

    pub fn handle(&mut self, command: Command, now: Instant, fx: &mut Effects) -> Option<TapOutcome> {
        match command {
            Command::Tap(grape) => return Some(self.tap(grape, now, fx)),
            Command::Instructions => {
                if self.phase() == Phase::Celebration {
                    return None;
                }
                self.stage.show_message(INSTRUCTIONS_MESSAGE, INSTRUCTIONS_OVERLAY, now, &mut self.alarms);
                fx.haptics.vibrate(&VIBRATION_PATTERN_MS);
            }
            Command::Rehearse => {
                if self.rehearsing {
                    warn!("Rehearsal already running.");
                    return None;
                }
                fx.sounds.init();
                self.rehearsing = true;
                self.clock.rehearse(self.timer.target_ms(), REHEARSAL_LEAD_MS);
                info!("Rehearsal: target moved {} s ahead.", REHEARSAL_LEAD_MS / 1000);
                fx.haptics.vibrate(&VIBRATION_PATTERN_MS);
            }
            Command::ResumeAudio => fx.sounds.init(),
            Command::DismissMessage => self.stage.dismiss_message(&mut self.alarms),
        }
        None
    }

    fn tap(&mut self, grape: u8, now: Instant, fx: &mut Effects) -> TapOutcome {
        let snap = match self.timer.snapshot() {
            Some(s) => *s,
            None => self.tick(now, fx),
        };
        let outcome = self.board.tap(grape, &snap);
        match outcome {
            TapOutcome::Eaten { grape, status, chime } => {
                info!("Grape {} eaten on chime {}: {:?}.", grape, chime, status);
                self.stage.open_mouth(now, &mut self.alarms);
                self.stage.launch_grape(grape, &self.layout, now, &mut self.alarms);
                fx.sounds.play_gulp();
                fx.haptics.vibrate(&VIBRATION_PATTERN_MS);
            }
            TapOutcome::Early => {
                self.stage.show_message(EARLY_TAP_MESSAGE, EARLY_TAP_OVERLAY, now, &mut self.alarms);
                fx.haptics.vibrate(&VIBRATION_PATTERN_MS);
            }
            TapOutcome::AlreadyEaten | TapOutcome::Closed | TapOutcome::NoSuchGrape => {}
        }
        outcome
    }

    /// Cancels every pending timer. Called on teardown.
    pub fn shutdown(&mut self) {
        self.fireworks.stop(&mut self.alarms);
        self.stage.clear(&mut self.alarms);
        self.alarms.clear_all();
    }

    #[cfg(test)]
    pub fn pending_alarms(&self) -> usize {
        self.alarms.len()
    }
}

impl<C: Clock> Drop for Session<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
