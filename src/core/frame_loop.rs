use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate loop for runs without a window. Stops when the frame asks to,
/// or when any holder of the stop flag sets it.
pub struct FrameLoop {
    period: Duration,
    stop_signal: Arc<AtomicBool>,
}

impl FrameLoop {
    pub fn new(period: Duration) -> Self {
        Self { period, stop_signal: Arc::new(AtomicBool::new(false)) }
    }

    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        self.stop_signal.clone()
    }

    /// Runs `frame` once per period. Returns the number of frames run.
    pub fn run<F>(&self, mut frame: F) -> u64
    where
        F: FnMut(Instant) -> ControlFlow<()>,
    {
        let mut frames = 0;
        let mut next = Instant::now();
        while !self.stop_signal.load(Ordering::Relaxed) {
            let now = Instant::now();
            frames += 1;
            if frame(now).is_break() {
                break;
            }
            next += self.period;
            let after = Instant::now();
            if next <= after {
                // Fell behind; don't try to catch up with a burst of frames.
                next = after + self.period;
            }
            thread::sleep(next - after);
        }
        frames
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_can_end_the_loop() {
        let fl = FrameLoop::new(Duration::from_millis(1));
        let mut seen = 0;
        let frames = fl.run(|_| {
            seen += 1;
            if seen == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(frames, 5);
    }

    #[test]
    fn stop_signal_ends_the_loop_from_another_thread() {
        let fl = FrameLoop::new(Duration::from_millis(2));
        let stop = fl.stop_signal();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stop.store(true, Ordering::Relaxed);
        });
        let frames = fl.run(|_| ControlFlow::Continue(()));
        assert!(frames >= 1);
        let _ = stopper.join();
    }

    #[test]
    fn frames_are_paced() {
        let fl = FrameLoop::new(Duration::from_millis(5));
        let start = Instant::now();
        let mut n = 0;
        fl.run(|_| {
            n += 1;
            if n == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn drop_raises_the_stop_flag() {
        let fl = FrameLoop::new(Duration::from_millis(1));
        let stop = fl.stop_signal();
        drop(fl);
        assert!(stop.load(Ordering::Relaxed));
    }
}
