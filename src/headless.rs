use crate::config::{HEADLESS_STATUS_INTERVAL, HEADLESS_TICK};
use crate::core::clock::Clock;
use crate::core::effects::{Confetti, Haptics, Sounds};
use crate::core::frame_loop::FrameLoop;
use crate::game::phase::Phase;
use crate::game::session::{Command, Effects, Session};
use crate::screens::campanadas;
use log::info;
use std::ops::ControlFlow;
use std::time::Instant;

/// Drives the session without a window, logging a status line every
/// second. With `until_show_ends` the run finishes once the fireworks do.
pub fn run<C: Clock>(
    session: &mut Session<C>,
    fx: &mut Effects,
    frame_loop: &FrameLoop,
    rehearse: bool,
    until_show_ends: bool,
) -> u64 {
    let start = Instant::now();
    // No user gesture to wait for.
    session.handle(Command::ResumeAudio, start, fx);
    if rehearse {
        session.handle(Command::Rehearse, start, fx);
    }

    let mut next_status = start;
    let mut celebrated = false;
    let frames = frame_loop.run(|now| {
        let snap = session.tick(now, fx);
        if now >= next_status {
            info!("{}", campanadas::status_line(&snap, session.board(), session.target_year()));
            next_status = now + HEADLESS_STATUS_INTERVAL;
        }
        if snap.phase == Phase::Celebration && session.fireworks_running() {
            celebrated = true;
        }
        if until_show_ends && celebrated && !session.fireworks_running() {
            info!("Show over.");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    session.shutdown();
    frames
}

/// `run` with fresh sinks.
pub fn run_with<C: Clock>(
    session: &mut Session<C>,
    sounds: &mut dyn Sounds,
    haptics: &mut dyn Haptics,
    confetti: &mut dyn Confetti,
    rehearse: bool,
) {
    let frame_loop = FrameLoop::new(HEADLESS_TICK);
    let mut fx = Effects { sounds, haptics, confetti };
    let frames = run(session, &mut fx, &frame_loop, rehearse, rehearse);
    info!("Headless run finished after {} frames.", frames);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::tests::ManualClock;
    use crate::core::effects::tests::Recorder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const TARGET: i64 = 1_798_761_600_000;

    #[test]
    fn starts_audio_and_stops_on_signal() {
        let mut session = Session::new(ManualClock::at(TARGET - 60_000), 2027, TARGET, 300, StdRng::seed_from_u64(1));
        let (mut sounds, mut haptics, mut confetti) = (Recorder::default(), Recorder::default(), Recorder::default());
        let mut fx = Effects { sounds: &mut sounds, haptics: &mut haptics, confetti: &mut confetti };
        let frame_loop = FrameLoop::new(Duration::from_millis(1));
        let stop = frame_loop.stop_signal();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            stop.store(true, Ordering::Relaxed);
        });
        let frames = run(&mut session, &mut fx, &frame_loop, false, true);
        let _ = stopper.join();
        assert!(frames >= 1);
        assert_eq!(sounds.inits, 1);
        assert_eq!(session.phase(), Phase::Countdown);
        assert!(!session.is_rehearsing());
    }

    #[test]
    fn rehearse_flag_moves_the_clock() {
        let mut session = Session::new(ManualClock::at(TARGET - 86_400_000), 2027, TARGET, 300, StdRng::seed_from_u64(1));
        let (mut sounds, mut haptics, mut confetti) = (Recorder::default(), Recorder::default(), Recorder::default());
        let mut fx = Effects { sounds: &mut sounds, haptics: &mut haptics, confetti: &mut confetti };
        let frame_loop = FrameLoop::new(Duration::from_millis(1));
        frame_loop.stop_signal().store(true, Ordering::Relaxed);
        run(&mut session, &mut fx, &frame_loop, true, true);
        assert!(session.is_rehearsing());
        assert_eq!(haptics.vibrations.len(), 1);
    }
}
