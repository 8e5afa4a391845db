pub mod cues;
pub mod fireworks;
pub mod grapes;
pub mod phase;
pub mod session;
pub mod timer;
