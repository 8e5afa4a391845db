//! Offline renderers for the named sounds. Each recipe builds a mono f32
//! buffer at the device rate from oscillators, noise and gain envelopes.

use crate::core::effects::Sound;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ramp {
    Step,
    Linear,
    Exponential,
}

/// Breakpoint envelope with the same ramp rules as a Web Audio `AudioParam`.
#[derive(Clone, Debug)]
pub struct Envelope {
    points: Vec<(f32, f32, Ramp)>,
}

impl Envelope {
    pub fn new(initial: f32) -> Self {
        Self { points: vec![(0.0, initial, Ramp::Step)] }
    }

    pub fn set(mut self, t: f32, v: f32) -> Self {
        self.points.push((t, v, Ramp::Step));
        self
    }

    pub fn linear(mut self, t: f32, v: f32) -> Self {
        self.points.push((t, v, Ramp::Linear));
        self
    }

    pub fn exp(mut self, t: f32, v: f32) -> Self {
        self.points.push((t, v, Ramp::Exponential));
        self
    }

    pub fn at(&self, t: f32) -> f32 {
        let next = self.points.iter().position(|p| p.0 > t);
        let prev_idx = match next {
            Some(0) => return self.points[0].1,
            Some(i) => i - 1,
            None => return self.points[self.points.len() - 1].1,
        };
        let (t0, v0, _) = self.points[prev_idx];
        let (t1, v1, ramp) = self.points[prev_idx + 1];
        let x = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        match ramp {
            Ramp::Step => v0,
            Ramp::Linear => v0 + (v1 - v0) * x,
            Ramp::Exponential if v0 > 0.0 && v1 > 0.0 => v0 * (v1 / v0).powf(x),
            Ramp::Exponential => v0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Sawtooth,
}

#[inline(always)]
fn wave_sample(wave: Wave, phase: f32) -> f32 {
    match wave {
        Wave::Sine => (phase * TAU).sin(),
        Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Wave::Sawtooth => 2.0 * phase - 1.0,
    }
}

/// One-pole lowpass.
#[derive(Default)]
struct Lowpass {
    y: f32,
}

impl Lowpass {
    #[inline(always)]
    fn process(&mut self, x: f32, cutoff_hz: f32, sample_rate: f32) -> f32 {
        let a = 1.0 - (-TAU * cutoff_hz / sample_rate).exp();
        self.y += a * (x - self.y);
        self.y
    }
}

struct Canvas {
    buf: Vec<f32>,
    rate: f32,
}

impl Canvas {
    fn new(sample_rate: u32, seconds: f32) -> Self {
        let len = (sample_rate as f32 * seconds).ceil() as usize;
        Self { buf: vec![0.0; len], rate: sample_rate as f32 }
    }

    fn range(&self, start: f32, stop: f32) -> std::ops::Range<usize> {
        let a = ((start * self.rate) as usize).min(self.buf.len());
        let b = ((stop * self.rate) as usize).min(self.buf.len());
        a..b.max(a)
    }

    /// Adds an oscillator playing from `start` to `stop`; `freq` and `gain`
    /// are evaluated in seconds since `start`.
    fn tone(&mut self, start: f32, stop: f32, wave: Wave, freq: &Envelope, gain: &Envelope, cutoff: Option<f32>) {
        let mut phase = 0.0f32;
        let mut lp = Lowpass::default();
        for i in self.range(start, stop) {
            let t = i as f32 / self.rate - start;
            let mut s = wave_sample(wave, phase);
            if let Some(fc) = cutoff {
                s = lp.process(s, fc, self.rate);
            }
            self.buf[i] += s * gain.at(t);
            phase = (phase + freq.at(t) / self.rate).fract();
        }
    }

    fn noise<R: Rng + ?Sized>(&mut self, rng: &mut R, start: f32, stop: f32, cutoff: &Envelope, gain: &Envelope) {
        let mut lp = Lowpass::default();
        for i in self.range(start, stop) {
            let t = i as f32 / self.rate - start;
            let x: f32 = rng.random_range(-1.0..1.0);
            self.buf[i] += lp.process(x, cutoff.at(t), self.rate) * gain.at(t);
        }
    }
}

fn carillon<R: Rng + ?Sized>(rate: u32, rng: &mut R) -> Vec<f32> {
    let mut c = Canvas::new(rate, 10.0 * 0.15 + 0.5);
    for i in 0..10 {
        let start = i as f32 * 0.15;
        let freq = Envelope::new(800.0 + rng.random_range(0.0..400.0));
        let gain = Envelope::new(0.0).linear(0.05, 0.05).exp(0.3, 0.001);
        c.tone(start, start + 0.5, Wave::Triangle, &freq, &gain, None);
    }
    c.buf
}

fn quarter(rate: u32) -> Vec<f32> {
    let mut c = Canvas::new(rate, 2.9);
    let high = Envelope::new(0.0).linear(0.05, 0.4).exp(1.0, 0.001);
    c.tone(0.0, 1.5, Wave::Sine, &Envelope::new(600.0), &high, None);
    let low = Envelope::new(0.0).linear(0.05, 0.4).exp(1.6, 0.001);
    c.tone(0.4, 2.9, Wave::Sine, &Envelope::new(400.0), &low, None);
    c.buf
}

const BELL_FUNDAMENTAL: f32 = 200.0;
const BELL_LENGTH: f32 = 12.0;
// (frequency ratio, amplitude, decay seconds)
const BELL_PARTIALS: [(f32, f32, f32); 7] = [
    (0.5, 0.15, 6.0),
    (1.0, 0.6, 5.0),
    (1.2, 0.25, 3.5),
    (1.5, 0.2, 2.5),
    (2.0, 0.15, 2.0),
    (2.5, 0.1, 1.5),
    (4.0, 0.05, 1.0),
];

fn chime<R: Rng + ?Sized>(rate: u32, rng: &mut R) -> Vec<f32> {
    let mut c = Canvas::new(rate, BELL_LENGTH);
    for (ratio, amp, decay) in BELL_PARTIALS {
        let gain = Envelope::new(0.0).linear(0.05, amp).exp(decay, 0.001).set(decay, 0.0);
        c.tone(0.0, BELL_LENGTH, Wave::Sine, &Envelope::new(BELL_FUNDAMENTAL * ratio), &gain, None);
    }
    let strike = Envelope::new(0.3).exp(0.04, 0.001);
    c.noise(rng, 0.0, 0.04, &Envelope::new(1000.0), &strike);

    // Master fade with a 4.5 Hz tremolo on top.
    let master = Envelope::new(0.8).exp(BELL_LENGTH, 0.001);
    let rate_f = rate as f32;
    for (i, s) in c.buf.iter_mut().enumerate() {
        let t = i as f32 / rate_f;
        let tremolo = 1.0 + 0.15 * (TAU * 4.5 * t).sin();
        *s *= master.at(t) * tremolo;
    }
    c.buf
}

fn gulp(rate: u32) -> Vec<f32> {
    let mut c = Canvas::new(rate, 0.25);
    let freq = Envelope::new(400.0).exp(0.15, 150.0);
    let gain = Envelope::new(0.0).linear(0.05, 0.8).exp(0.2, 0.01);
    c.tone(0.0, 0.25, Wave::Sine, &freq, &gain, None);
    c.buf
}

fn firework_explosion<R: Rng + ?Sized>(rate: u32, rng: &mut R) -> Vec<f32> {
    let speed = rng.random_range(0.8..1.2);
    let mut c = Canvas::new(rate, 1.5 / speed);
    let cutoff = Envelope::new(800.0 * speed).exp(0.4 / speed, 50.0 * speed);
    let gain = Envelope::new(0.4).exp(1.2 / speed, 0.001);
    c.noise(rng, 0.0, 1.5 / speed, &cutoff, &gain);
    c.buf
}

const CROWD_LENGTH: f32 = 15.0;
const CROWD_SHOUTS: usize = 40;

fn celebration_crowd<R: Rng + ?Sized>(rate: u32, rng: &mut R) -> Vec<f32> {
    let mut c = Canvas::new(rate, CROWD_LENGTH);
    let mut murmur = Envelope::new(0.0).linear(1.0, 0.3);
    let mut t = 1.0;
    while t < CROWD_LENGTH - 1.0 {
        murmur = murmur.linear(t, rng.random_range(0.2..0.4));
        t += 0.5;
    }
    let murmur = murmur.linear(CROWD_LENGTH, 0.0);
    c.noise(rng, 0.0, CROWD_LENGTH, &Envelope::new(1000.0), &murmur);

    for _ in 0..CROWD_SHOUTS {
        let start = rng.random_range(0.0..CROWD_LENGTH - 2.0);
        let kind: f32 = rng.random();
        let wave = if kind > 0.6 {
            Wave::Sawtooth
        } else if kind > 0.3 {
            Wave::Triangle
        } else {
            Wave::Sine
        };
        let f0 = rng.random_range(600.0..1500.0);
        let f1 = f0 + rng.random_range(-200.0..400.0);
        let dur = rng.random_range(0.2..0.8);
        let freq = Envelope::new(f0).linear(dur, f1);
        let gain = Envelope::new(0.0).linear(0.05, 0.05).linear(dur, 0.0);
        let cutoff = (wave == Wave::Sawtooth).then_some(2000.0);
        c.tone(start, start + dur, wave, &freq, &gain, cutoff);
    }
    c.buf
}

/// Renders `sound` as mono samples at `sample_rate`.
pub fn render<R: Rng + ?Sized>(sound: Sound, sample_rate: u32, rng: &mut R) -> Vec<f32> {
    match sound {
        Sound::Carillon => carillon(sample_rate, rng),
        Sound::Quarter => quarter(sample_rate),
        Sound::Chime => chime(sample_rate, rng),
        Sound::Gulp => gulp(sample_rate),
        Sound::FireworkExplosion => firework_explosion(sample_rate, rng),
        Sound::CelebrationCrowd => celebration_crowd(sample_rate, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn envelope_ramps() {
        let env = Envelope::new(0.0).linear(0.05, 0.4).exp(1.0, 0.001);
        assert_eq!(env.at(-1.0), 0.0);
        assert!((env.at(0.025) - 0.2).abs() < 1e-6);
        assert!((env.at(0.05) - 0.4).abs() < 1e-6);
        let mid = env.at(0.525);
        assert!(mid < 0.4 && mid > 0.001);
        assert_eq!(env.at(5.0), 0.001);
    }

    #[test]
    fn every_sound_renders_bounded_audio() {
        let mut rng = StdRng::seed_from_u64(5);
        for sound in Sound::ALL {
            let buf = render(sound, 8_000, &mut rng);
            assert!(!buf.is_empty(), "{:?}", sound);
            assert!(buf.iter().all(|s| s.is_finite() && s.abs() < 4.0), "{:?}", sound);
            assert!(buf.iter().any(|s| s.abs() > 1e-3), "{:?} is silent", sound);
        }
    }

    #[test]
    fn lengths_follow_recipes() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(render(Sound::Gulp, 8_000, &mut rng).len(), 2_000);
        assert_eq!(render(Sound::Chime, 8_000, &mut rng).len(), 96_000);
        assert_eq!(render(Sound::CelebrationCrowd, 8_000, &mut rng).len(), 120_000);
    }
}
