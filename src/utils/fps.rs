use std::time::{Duration, Instant};

/// Counts rendered frames and reports once per second.
pub struct FPSCounter {
    last_update_time: Instant,
    frames_since_last_update: u32,
}

impl FPSCounter {
    pub fn new(now: Instant) -> Self {
        FPSCounter { last_update_time: now, frames_since_last_update: 0 }
    }

    /// Call once per rendered frame. Returns `Some(fps)` roughly every second.
    pub fn update(&mut self, now: Instant) -> Option<u32> {
        self.frames_since_last_update += 1;
        if now.duration_since(self.last_update_time) < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames_since_last_update;
        self.frames_since_last_update = 0;
        self.last_update_time += Duration::from_secs(1);
        // Fell behind by more than a second: restart the window.
        if self.last_update_time + Duration::from_secs(1) < now {
            self.last_update_time = now;
        }
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let t0 = Instant::now();
        let mut fps = FPSCounter::new(t0);
        let mut reports = Vec::new();
        for frame in 1..=120u64 {
            if let Some(n) = fps.update(t0 + Duration::from_millis(frame * 1000 / 60)) {
                reports.push(n);
            }
        }
        assert_eq!(reports, vec![60, 60]);
    }

    #[test]
    fn long_stall_resets_the_window() {
        let t0 = Instant::now();
        let mut fps = FPSCounter::new(t0);
        assert_eq!(fps.update(t0 + Duration::from_secs(5)), Some(1));
        assert_eq!(fps.update(t0 + Duration::from_millis(5500)), None);
        assert_eq!(fps.update(t0 + Duration::from_secs(6)), Some(2));
    }
}
