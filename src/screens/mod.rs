pub mod campanadas;

use crate::game::session::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Exit,
    Command(Command),
}
