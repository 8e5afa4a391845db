use crate::config::{
    FIREWORKS_COLORS, FIREWORKS_DURATION, FIREWORKS_INTERVAL, FIREWORKS_MAX_EXPLOSION_DELAY_MS,
};
use crate::core::effects::{Confetti, ConfettiBurst, Sounds};
use crate::core::timers::{TimerId, Timers};
use crate::game::phase::Phase;
use crate::game::session::Alarm;
use crate::game::timer::PhaseEvent;
use log::info;
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Show {
    ends_at: Instant,
    interval: TimerId,
}

/// Runs the fifteen seconds of fireworks that open the celebration.
#[derive(Debug, Default)]
pub struct FireworksController {
    show: Option<Show>,
}

/// One or two bursts with random size and position.
pub fn random_bursts<R: Rng + ?Sized>(rng: &mut R) -> Vec<ConfettiBurst> {
    let count = rng.random_range(1..=2);
    (0..count)
        .map(|_| ConfettiBurst {
            particle_count: rng.random_range(30..60),
            origin: (rng.random_range(0.1..0.9), rng.random_range(0.0..0.5)),
            colors: &FIREWORKS_COLORS,
        })
        .collect()
}

impl FireworksController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.show.is_some()
    }

    pub fn on_event<R: Rng + ?Sized>(
        &mut self,
        event: PhaseEvent,
        now: Instant,
        timers: &mut Timers<Alarm>,
        rng: &mut R,
        confetti: &mut dyn Confetti,
    ) {
        match event {
            PhaseEvent::Entered(Phase::Celebration) => {
                self.stop(timers);
                let interval = timers.set_interval(now, FIREWORKS_INTERVAL, Alarm::FireworksBurst);
                self.show = Some(Show { ends_at: now + FIREWORKS_DURATION, interval });
                info!("Fireworks started.");
                self.burst(now, timers, rng, confetti);
            }
            PhaseEvent::Entered(_) | PhaseEvent::RoundReset => self.stop(timers),
        }
    }

    /// Handles one tick of the burst interval.
    pub fn on_burst<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        timers: &mut Timers<Alarm>,
        rng: &mut R,
        confetti: &mut dyn Confetti,
    ) {
        match &self.show {
            Some(show) if now >= show.ends_at => {
                timers.clear(show.interval);
                self.show = None;
                info!("Fireworks finished.");
            }
            Some(_) => self.burst(now, timers, rng, confetti),
            None => {}
        }
    }

    pub fn on_explosion(&mut self, sounds: &mut dyn Sounds) {
        sounds.play_firework_explosion();
    }

    /// Cancels the interval and any explosion still waiting to sound.
    pub fn stop(&mut self, timers: &mut Timers<Alarm>) {
        if let Some(show) = self.show.take() {
            timers.clear(show.interval);
            info!("Fireworks stopped.");
        }
        timers.clear_where(|a| matches!(a, Alarm::FireworksBurst | Alarm::FireworksExplosion));
    }

    fn burst<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        timers: &mut Timers<Alarm>,
        rng: &mut R,
        confetti: &mut dyn Confetti,
    ) {
        for burst in random_bursts(rng) {
            confetti.burst(&burst);
            let delay = Duration::from_millis(rng.random_range(0..FIREWORKS_MAX_EXPLOSION_DELAY_MS));
            timers.set_timeout(now, delay, Alarm::FireworksExplosion);
        }
    }
}
