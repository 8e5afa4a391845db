//! Fire-and-forget side effects the game logic triggers. None of these return
//! anything the caller depends on, and every implementation is free to do
//! nothing when its device is missing.

use log::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Carillon,
    Quarter,
    Chime,
    Gulp,
    FireworkExplosion,
    CelebrationCrowd,
}

impl Sound {
    pub const ALL: [Sound; 6] = [
        Sound::Carillon,
        Sound::Quarter,
        Sound::Chime,
        Sound::Gulp,
        Sound::FireworkExplosion,
        Sound::CelebrationCrowd,
    ];
}

pub trait Sounds {
    /// Creates or resumes the output. Safe to call repeatedly.
    fn init(&mut self);
    fn play(&mut self, sound: Sound);

    fn play_carillon(&mut self) {
        self.play(Sound::Carillon)
    }

    fn play_quarter(&mut self) {
        self.play(Sound::Quarter)
    }

    fn play_chime(&mut self) {
        self.play(Sound::Chime)
    }

    fn play_gulp(&mut self) {
        self.play(Sound::Gulp)
    }

    fn play_firework_explosion(&mut self) {
        self.play(Sound::FireworkExplosion)
    }

    fn play_celebration_crowd(&mut self) {
        self.play(Sound::CelebrationCrowd)
    }
}

pub trait Haptics {
    /// Alternating on/off durations in ms.
    fn vibrate(&mut self, pattern: &[u32]);
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiBurst {
    pub particle_count: u32,
    /// Fractions of the viewport, (0,0) top-left.
    pub origin: (f32, f32),
    pub colors: &'static [[u8; 3]],
}

pub trait Confetti {
    fn burst(&mut self, burst: &ConfettiBurst);
}

/// Desktop stand-in for the phone vibration motor.
pub struct LogHaptics {
    pub enabled: bool,
}

impl Haptics for LogHaptics {
    fn vibrate(&mut self, pattern: &[u32]) {
        if self.enabled {
            debug!("Vibrate {:?}", pattern);
        }
    }
}

/// Confetti sink for runs without a window.
pub struct LogConfetti;

impl Confetti for LogConfetti {
    fn burst(&mut self, burst: &ConfettiBurst) {
        debug!(
            "Confetti: {} particles at ({:.2}, {:.2})",
            burst.particle_count, burst.origin.0, burst.origin.1
        );
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Records every side effect so tests can assert on them.
    #[derive(Default)]
    pub struct Recorder {
        pub inits: u32,
        pub sounds: Vec<Sound>,
        pub vibrations: Vec<Vec<u32>>,
        pub bursts: Vec<ConfettiBurst>,
    }

    impl Recorder {
        pub fn count(&self, sound: Sound) -> usize {
            self.sounds.iter().filter(|s| **s == sound).count()
        }
    }

    impl Sounds for Recorder {
        fn init(&mut self) {
            self.inits += 1;
        }

        fn play(&mut self, sound: Sound) {
            self.sounds.push(sound);
        }
    }

    impl Haptics for Recorder {
        fn vibrate(&mut self, pattern: &[u32]) {
            self.vibrations.push(pattern.to_vec());
        }
    }

    impl Confetti for Recorder {
        fn burst(&mut self, burst: &ConfettiBurst) {
            self.bursts.push(burst.clone());
        }
    }

    #[test]
    fn named_helpers_forward_to_play() {
        let mut rec = Recorder::default();
        rec.play_carillon();
        rec.play_quarter();
        rec.play_chime();
        rec.play_gulp();
        rec.play_firework_explosion();
        rec.play_celebration_crowd();
        assert_eq!(rec.sounds, Sound::ALL.to_vec());
    }
}
