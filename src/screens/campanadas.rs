use crate::config::WINDOW_TITLE;
use crate::core::input::{self, KeyAction};
use crate::game::grapes::{GRAPE_COUNT, GrapeBoard, GrapeStatus};
use crate::game::phase::Phase;
use crate::game::session::Command;
use crate::game::timer::Snapshot;
use crate::screens::ScreenAction;
use winit::keyboard::KeyCode;

/* ---------------------------- text ----------------------------- */

pub fn phase_text(phase: Phase, year: i32) -> String {
    match phase {
        Phase::Countdown => "CUENTA ATRÁS...".to_string(),
        Phase::Carillon => "BAJA LA BOLA (CARILLÓN)".to_string(),
        Phase::Quarters => "LOS CUARTOS".to_string(),
        Phase::Gap => "ATENTOS...".to_string(),
        Phase::Chimes => "¡A POR LAS 12 UVAS!".to_string(),
        Phase::Celebration => format!("¡FELIZ AÑO {}!", year),
    }
}

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// `HH:MM:SS` with a day prefix when whole days remain.
pub fn format_countdown(ms: i64) -> String {
    if ms <= 0 {
        return "00:00:00".to_string();
    }
    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let time = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => time,
        1 => format!("1 día {}", time),
        n => format!("{} días {}", n, time),
    }
}

/// Second line under the phase text: the countdown before midnight, the
/// bell number while chiming.
pub fn detail_text(snap: &Snapshot) -> Option<String> {
    match snap.phase {
        Phase::Countdown => Some(format_countdown(snap.time_diff)),
        Phase::Chimes => Some(format!("Campanada {}/12", snap.chime_count)),
        _ => None,
    }
}

pub fn header_text(year: i32) -> String {
    format!("CAMPANADAS {}", year)
}

fn score_text(board: &GrapeBoard) -> String {
    format!("Uvas {}/{} ({} a tiempo)", board.eaten_count(), GRAPE_COUNT, board.correct_count())
}

pub fn window_title(snap: &Snapshot, board: &GrapeBoard, year: i32, fps: Option<u32>) -> String {
    let mut title = format!("{} {} | {}", WINDOW_TITLE, year, phase_text(snap.phase, year));
    if let Some(detail) = detail_text(snap) {
        title.push_str(" | ");
        title.push_str(&detail);
    }
    title.push_str(" | ");
    title.push_str(&score_text(board));
    if let Some(fps) = fps {
        title.push_str(&format!(" | {} FPS", fps));
    }
    title
}

pub fn status_line(snap: &Snapshot, board: &GrapeBoard, year: i32) -> String {
    let t = &snap.time;
    let mut line = format!(
        "{:02}:{:02}:{:02} {}",
        t.hours,
        t.minutes,
        t.seconds,
        phase_text(snap.phase, year)
    );
    if let Some(detail) = detail_text(snap) {
        line.push(' ');
        line.push_str(&detail);
    }
    line.push_str(" | ");
    line.push_str(&score_text(board));
    line
}

/* ---------------------------- grid ----------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrapeCell {
    pub grape: u8,
    pub status: Option<GrapeStatus>,
    /// The grape for the bell that just rang, still uneaten.
    pub highlighted: bool,
}

/// Grape associated with the latest bell; grape 1 before the first.
pub fn target_grape(chime_count: u32) -> u8 {
    if chime_count == 0 {
        1
    } else {
        chime_count.min(GRAPE_COUNT as u32) as u8
    }
}

pub fn grape_cells(board: &GrapeBoard, chime_count: u32) -> [GrapeCell; GRAPE_COUNT] {
    let target = target_grape(chime_count);
    std::array::from_fn(|i| {
        let grape = i as u8 + 1;
        let status = board.status(grape);
        GrapeCell { grape, status, highlighted: grape == target && status.is_none() }
    })
}

/// The grid fades back until the final seconds before midnight.
pub fn grid_dimmed(phase: Phase) -> bool {
    phase < Phase::Gap
}

/* -------------------------- input -> cmd ----------------------- */

pub fn handle_key_press(code: KeyCode) -> ScreenAction {
    match input::action_from_keycode(code) {
        Some(KeyAction::Grape(n)) => ScreenAction::Command(Command::Tap(n)),
        Some(KeyAction::Instructions) => ScreenAction::Command(Command::Instructions),
        Some(KeyAction::Rehearse) => ScreenAction::Command(Command::Rehearse),
        Some(KeyAction::Exit) => ScreenAction::Exit,
        None => ScreenAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::TimeState;

    fn snap(phase: Phase, time_diff: i64, chime_count: u32) -> Snapshot {
        Snapshot { phase, time: TimeState::default(), time_diff, chime_count }
    }

    #[test]
    fn countdown_format() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(-5_000), "00:00:00");
        assert_eq!(format_countdown(999), "00:00:00");
        assert_eq!(format_countdown(61_000), "00:01:01");
        assert_eq!(format_countdown(MS_PER_DAY + 3_723_000), "1 día 01:02:03");
        assert_eq!(format_countdown(3 * MS_PER_DAY), "3 días 00:00:00");
    }

    #[test]
    fn phase_texts() {
        assert_eq!(phase_text(Phase::Countdown, 2027), "CUENTA ATRÁS...");
        assert_eq!(phase_text(Phase::Quarters, 2027), "LOS CUARTOS");
        assert_eq!(phase_text(Phase::Celebration, 2027), "¡FELIZ AÑO 2027!");
    }

    #[test]
    fn detail_only_in_countdown_and_chimes() {
        assert_eq!(detail_text(&snap(Phase::Countdown, 61_000, 0)).as_deref(), Some("00:01:01"));
        assert_eq!(detail_text(&snap(Phase::Chimes, -4_000, 2)).as_deref(), Some("Campanada 2/12"));
        assert_eq!(detail_text(&snap(Phase::Gap, 3_000, 0)), None);
    }

    #[test]
    fn title_carries_phase_score_and_fps() {
        let board = GrapeBoard::default();
        let title = window_title(&snap(Phase::Chimes, -100, 1), &board, 2027, Some(60));
        assert_eq!(title, "Campanadas 2027 | ¡A POR LAS 12 UVAS! | Campanada 1/12 | Uvas 0/12 (0 a tiempo) | 60 FPS");
    }

    #[test]
    fn target_grape_follows_the_bells() {
        let mut board = GrapeBoard::default();
        let cells = grape_cells(&board, 0);
        assert!(cells[0].highlighted);
        assert_eq!(cells.iter().filter(|c| c.highlighted).count(), 1);

        board.tap(3, &snap(Phase::Chimes, -6_100, 3));
        let cells = grape_cells(&board, 3);
        assert_eq!(cells[2].status, Some(GrapeStatus::Correct));
        assert!(cells.iter().all(|c| !c.highlighted));
    }

    #[test]
    fn keys_become_commands() {
        assert_eq!(handle_key_press(KeyCode::Digit0), ScreenAction::Command(Command::Tap(10)));
        assert_eq!(handle_key_press(KeyCode::KeyT), ScreenAction::Command(Command::Rehearse));
        assert_eq!(handle_key_press(KeyCode::Escape), ScreenAction::Exit);
        assert_eq!(handle_key_press(KeyCode::Space), ScreenAction::None);
    }

    #[test]
    fn grid_lights_up_for_the_gap() {
        assert!(grid_dimmed(Phase::Quarters));
        assert!(!grid_dimmed(Phase::Gap));
        assert!(!grid_dimmed(Phase::Celebration));
    }
}
