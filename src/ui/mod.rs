pub mod confetti;
pub mod face;
pub mod font;
pub mod layout;
pub mod render;
pub mod stage;
