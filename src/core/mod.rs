pub mod audio;
pub mod clock;
pub mod effects;
pub mod frame_loop;
pub mod input;
pub mod synth;
pub mod timers;
