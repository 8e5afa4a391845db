use crate::config::{
    FLYING_GRAPE_FADE, FLYING_GRAPE_FADE_DELAY, FLYING_GRAPE_FLIGHT, MOUTH_OPEN_DURATION,
};
use crate::core::timers::{TimerId, Timers};
use crate::game::session::Alarm;
use crate::ui::layout::Layout;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub struct FlyingGrape {
    pub id: u64,
    pub grape: u8,
    /// Viewport fractions.
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub launched_at: Instant,
}

impl FlyingGrape {
    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.launched_at)
    }

    /// Eased position along the flight, as a viewport fraction.
    pub fn position(&self, now: Instant) -> (f32, f32) {
        let t = (self.elapsed(now).as_secs_f32() / FLYING_GRAPE_FLIGHT.as_secs_f32()).clamp(0.0, 1.0);
        let eased = if t < 0.5 {
            2.0 * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
        };
        (
            self.start.0 + (self.end.0 - self.start.0) * eased,
            self.start.1 + (self.end.1 - self.start.1) * eased,
        )
    }

    pub fn alpha(&self, now: Instant) -> f32 {
        let fade_from = FLYING_GRAPE_FLIGHT + FLYING_GRAPE_FADE_DELAY;
        let elapsed = self.elapsed(now);
        if elapsed <= fade_from {
            return 1.0;
        }
        1.0 - ((elapsed - fade_from).as_secs_f32() / FLYING_GRAPE_FADE.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub text: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

/// Purely visual state: the mouth, grapes in flight and the message bubble.
/// Each kind of timer has at most one pending instance.
#[derive(Debug, Default)]
pub struct Stage {
    mouth_open: bool,
    mouth_timer: Option<TimerId>,
    flying: Vec<FlyingGrape>,
    next_flying_id: u64,
    overlay: Option<Overlay>,
    overlay_timer: Option<TimerId>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mouth_open(&self) -> bool {
        self.mouth_open
    }

    pub fn flying_grapes(&self) -> &[FlyingGrape] {
        &self.flying
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn open_mouth(&mut self, now: Instant, timers: &mut Timers<Alarm>) {
        self.mouth_open = true;
        if let Some(id) = self.mouth_timer.take() {
            timers.clear(id);
        }
        self.mouth_timer = Some(timers.set_timeout(now, MOUTH_OPEN_DURATION, Alarm::MouthClose));
    }

    pub fn launch_grape(&mut self, grape: u8, layout: &Layout, now: Instant, timers: &mut Timers<Alarm>) {
        let id = self.next_flying_id;
        self.next_flying_id += 1;
        self.flying.push(FlyingGrape {
            id,
            grape,
            start: Layout::grape_anchor(grape),
            end: layout.mouth_anchor(),
            launched_at: now,
        });
        let lifetime = FLYING_GRAPE_FLIGHT + FLYING_GRAPE_FADE_DELAY + FLYING_GRAPE_FADE;
        timers.set_timeout(now, lifetime, Alarm::FlyingGrapeDone(id));
    }

    /// Replaces any visible message and its pending auto-close.
    pub fn show_message(&mut self, text: &str, duration: Duration, now: Instant, timers: &mut Timers<Alarm>) {
        if let Some(id) = self.overlay_timer.take() {
            timers.clear(id);
        }
        self.overlay = Some(Overlay { text: text.to_string(), shown_at: now, duration });
        self.overlay_timer = Some(timers.set_timeout(now, duration, Alarm::OverlayClose));
    }

    pub fn dismiss_message(&mut self, timers: &mut Timers<Alarm>) {
        if let Some(id) = self.overlay_timer.take() {
            timers.clear(id);
        }
        self.overlay = None;
    }

    /// Applies a stage alarm. Returns false for alarms owned by someone else.
    pub fn on_alarm(&mut self, alarm: Alarm) -> bool {
        match alarm {
            Alarm::MouthClose => {
                self.mouth_open = false;
                self.mouth_timer = None;
            }
            Alarm::FlyingGrapeDone(id) => self.flying.retain(|g| g.id != id),
            Alarm::OverlayClose => {
                self.overlay = None;
                self.overlay_timer = None;
            }
            _ => return false,
        }
        true
    }

    pub fn clear(&mut self, timers: &mut Timers<Alarm>) {
        timers.clear_where(|a| {
            matches!(a, Alarm::MouthClose | Alarm::OverlayClose | Alarm::FlyingGrapeDone(_))
        });
        *self = Self { next_flying_id: self.next_flying_id, ..Self::default() };
    }
}
