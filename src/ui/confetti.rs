use crate::core::effects::{Confetti, ConfettiBurst};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const START_VELOCITY: f32 = 0.9; // viewport heights per second
const GRAVITY: f32 = 0.6;
const DRAG: f32 = 0.9;
const LIFETIME_SECS: f32 = 1.6;
const MAX_PARTICLES: usize = 4000;

#[derive(Clone, Debug)]
pub struct Particle {
    /// Viewport fractions.
    pub pos: (f32, f32),
    vel: (f32, f32),
    pub color: [u8; 3],
    pub age: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / LIFETIME_SECS).clamp(0.0, 1.0)
    }
}

/// Simple 360-degree burst particles, advanced once per frame.
pub struct ConfettiField {
    particles: Vec<Particle>,
    rng: SmallRng,
}

impl Default for ConfettiField {
    fn default() -> Self {
        Self { particles: Vec::new(), rng: SmallRng::from_os_rng() }
    }
}

impl ConfettiField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn update(&mut self, dt: f32) {
        let damp = DRAG.powf(dt * 10.0);
        for p in &mut self.particles {
            p.vel.0 *= damp;
            p.vel.1 = p.vel.1 * damp + GRAVITY * dt;
            p.pos.0 += p.vel.0 * dt;
            p.pos.1 += p.vel.1 * dt;
            p.age += dt;
        }
        self.particles.retain(|p| p.age < LIFETIME_SECS && p.pos.1 < 1.2);
    }
}

impl Confetti for ConfettiField {
    fn burst(&mut self, burst: &ConfettiBurst) {
        if burst.colors.is_empty() {
            return;
        }
        for i in 0..burst.particle_count {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = START_VELOCITY * self.rng.random_range(0.4..1.0);
            self.particles.push(Particle {
                pos: burst.origin,
                vel: (angle.cos() * speed, angle.sin() * speed),
                color: burst.colors[i as usize % burst.colors.len()],
                age: 0.0,
            });
        }
    }
}
