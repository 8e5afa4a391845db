//! tiny-skia drawing of one frame: clock, face, grape grid, grapes in
//! flight, the message bubble and confetti.

use crate::game::grapes::{GrapeBoard, GrapeStatus};
use crate::game::phase::Phase;
use crate::game::timer::Snapshot;
use crate::screens::campanadas::{self, GrapeCell};
use crate::ui::confetti::Particle;
use crate::ui::face::{self, Eyes, FaceView, Mouth};
use crate::ui::font;
use crate::ui::layout::Layout;
use crate::ui::stage::Stage;
use std::time::Instant;
use tiny_skia::*;

const BACKGROUND: [u8; 3] = [15, 23, 42];
const GOLD: [u8; 3] = [234, 179, 8];
const TEXT: [u8; 3] = [248, 250, 252];
const MUTED: [u8; 3] = [148, 163, 184];
const INK: [u8; 3] = [30, 41, 59];

/// Everything one frame needs, borrowed from the session.
pub struct Frame<'a> {
    pub snap: &'a Snapshot,
    pub board: &'a GrapeBoard,
    pub stage: &'a Stage,
    pub confetti: &'a [Particle],
    pub year: i32,
    pub now: Instant,
}

fn paint(rgb: [u8; 3], alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], (alpha.clamp(0.0, 1.0) * 255.0) as u8);
    paint.anti_alias = true;
    paint
}

fn fill_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, r: f32, paint: &Paint, ts: Transform) {
    if let Some(circle) = PathBuilder::from_circle(cx, cy, r) {
        pixmap.fill_path(&circle, paint, FillRule::Winding, ts, None);
    }
}

fn fill_ellipse(pixmap: &mut Pixmap, cx: f32, cy: f32, rx: f32, ry: f32, paint: &Paint, ts: Transform) {
    if let Some(oval) = Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0).and_then(PathBuilder::from_oval) {
        pixmap.fill_path(&oval, paint, FillRule::Winding, ts, None);
    }
}

fn round_stroke(width: f32) -> Stroke {
    Stroke { width, line_cap: LineCap::Round, ..Stroke::default() }
}

fn rounded_rect(rect: Rect, radius: f32) -> Option<Path> {
    let (x, y, w, h) = (rect.x(), rect.y(), rect.width(), rect.height());
    let r = radius.min(w / 2.0).min(h / 2.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/* ----------------------------- clock ----------------------------- */

fn draw_clock(pixmap: &mut Pixmap, layout: &Layout, snap: &Snapshot) {
    let (cx, cy) = layout.clock_center();
    let r = layout.clock_radius();
    fill_circle(pixmap, cx, cy, r, &paint([241, 245, 249], 1.0), Transform::identity());
    if let Some(rim) = PathBuilder::from_circle(cx, cy, r) {
        pixmap.stroke_path(&rim, &paint(GOLD, 1.0), &Stroke { width: r * 0.05, ..Stroke::default() }, Transform::identity(), None);
    }

    let mut ticks = PathBuilder::new();
    for i in 0..12 {
        let a = (i as f32 * 30.0).to_radians();
        let (s, c) = a.sin_cos();
        ticks.move_to(cx + s * r * 0.82, cy - c * r * 0.82);
        ticks.line_to(cx + s * r * 0.92, cy - c * r * 0.92);
    }
    if let Some(path) = ticks.finish() {
        pixmap.stroke_path(&path, &paint(INK, 1.0), &round_stroke(r * 0.03), Transform::identity(), None);
    }

    let angles = face::hand_angles(&snap.time);
    let hands = [
        (angles.hours, 0.5, 0.06, INK),
        (angles.minutes, 0.75, 0.04, INK),
        (angles.seconds, 0.85, 0.015, [220, 38, 38]),
    ];
    for (deg, len, width, color) in hands {
        let mut pb = PathBuilder::new();
        pb.move_to(cx, cy);
        pb.line_to(cx, cy - r * len);
        if let Some(path) = pb.finish() {
            let ts = Transform::from_rotate_at(deg, cx, cy);
            pixmap.stroke_path(&path, &paint(color, 1.0), &round_stroke(r * width), ts, None);
        }
    }
    fill_circle(pixmap, cx, cy, r * 0.04, &paint(INK, 1.0), Transform::identity());
}

/* ------------------------------ face ----------------------------- */

/// Draws in a 200x200 face space mapped over the clock.
fn draw_face(pixmap: &mut Pixmap, layout: &Layout, view: &FaceView) {
    let (cx, cy) = layout.clock_center();
    let s = layout.clock_radius() * 2.0 / 200.0;
    let ts = Transform::from_row(s, 0.0, 0.0, s, cx - 100.0 * s, cy - 100.0 * s);
    let ink = paint(INK, 1.0);

    fill_circle(pixmap, 100.0, 100.0, 95.0, &paint([252, 211, 77], 1.0), ts);
    if let Some(rim) = PathBuilder::from_circle(100.0, 100.0, 95.0) {
        pixmap.stroke_path(&rim, &paint([180, 83, 9], 1.0), &Stroke { width: 4.0, ..Stroke::default() }, ts, None);
    }

    // Cheeks swell from their own centers.
    for x in [40.0, 160.0] {
        fill_circle(pixmap, x, 110.0, 20.0 * view.cheek_scale, &paint([251, 146, 60], 0.6), ts);
    }

    let mut eyes = PathBuilder::new();
    match view.eyes {
        Eyes::Squeezed => {
            for x in [55.0, 125.0] {
                eyes.move_to(x, 75.0);
                eyes.line_to(x + 20.0, 75.0);
            }
        }
        Eyes::Happy => {
            for x in [55.0, 125.0] {
                eyes.move_to(x, 75.0);
                eyes.quad_to(x + 10.0, 60.0, x + 20.0, 75.0);
            }
        }
        Eyes::Normal => {
            fill_circle(pixmap, 65.0, 75.0, 10.0, &ink, ts);
            fill_circle(pixmap, 135.0, 75.0, 10.0, &ink, ts);
        }
    }
    if let Some(path) = eyes.finish() {
        pixmap.stroke_path(&path, &ink, &round_stroke(4.0), ts, None);
    }

    let mut brows = PathBuilder::new();
    for x in [50.0, 120.0] {
        brows.move_to(x, 55.0 - view.brow_lift);
        brows.quad_to(x + 15.0, 40.0 - view.brow_lift, x + 30.0, 55.0 - view.brow_lift);
    }
    if let Some(path) = brows.finish() {
        pixmap.stroke_path(&path, &ink, &round_stroke(4.0), ts, None);
    }

    let mouth_ts = ts.pre_concat(Transform::from_row(
        view.mouth_scale,
        0.0,
        0.0,
        view.mouth_scale,
        100.0 * (1.0 - view.mouth_scale),
        140.0 * (1.0 - view.mouth_scale),
    ));
    match view.mouth {
        Mouth::Open => fill_circle(pixmap, 100.0, 140.0, 15.0, &paint([63, 12, 24], 1.0), mouth_ts),
        Mouth::Stuffed => fill_ellipse(pixmap, 100.0, 140.0, 15.0, 8.0, &paint([190, 18, 60], 1.0), mouth_ts),
        Mouth::Kiss => {
            let mut heart = PathBuilder::new();
            heart.move_to(100.0, 155.0);
            heart.cubic_to(100.0, 155.0, 90.0, 140.0, 90.0, 135.0);
            heart.cubic_to(90.0, 128.0, 98.0, 128.0, 100.0, 135.0);
            heart.cubic_to(102.0, 128.0, 110.0, 128.0, 110.0, 135.0);
            heart.cubic_to(110.0, 140.0, 100.0, 155.0, 100.0, 155.0);
            heart.close();
            if let Some(path) = heart.finish() {
                pixmap.fill_path(&path, &paint([225, 29, 72], 1.0), FillRule::Winding, mouth_ts, None);
            }
        }
    }
}

/* ------------------------------ text ----------------------------- */

fn text_size(layout: &Layout, fraction: f32) -> f32 {
    (layout.unit() * fraction / font::GLYPH_ROWS as f32).max(1.0).round()
}

fn draw_labels(pixmap: &mut Pixmap, layout: &Layout, snap: &Snapshot, year: i32) {
    let cx = layout.width / 2.0;
    let header = text_size(layout, 0.045);
    font::draw_text_centered(pixmap, &campanadas::header_text(year), cx, layout.height * 0.03, header, &paint(GOLD, 1.0));

    let big = text_size(layout, 0.05);
    let color = match snap.phase {
        Phase::Chimes => GOLD,
        Phase::Quarters => [253, 186, 116],
        _ => TEXT,
    };
    let y = layout.height * 0.58;
    font::draw_text_centered(pixmap, &campanadas::phase_text(snap.phase, year), cx, y, big, &paint(color, 1.0));
    if let Some(detail) = campanadas::detail_text(snap) {
        let small = text_size(layout, 0.035);
        let y = y + font::line_height(big) * 1.5;
        font::draw_text_centered(pixmap, &detail, cx, y, small, &paint(MUTED, 1.0));
    }
}

fn draw_overlay(pixmap: &mut Pixmap, layout: &Layout, text: &str) {
    let (x, y, w, h) = layout.overlay_rect();
    let Some(rect) = Rect::from_xywh(x, y, w, h) else { return };
    if let Some(path) = rounded_rect(rect, layout.unit() * 0.03) {
        pixmap.fill_path(&path, &paint([30, 30, 30], 0.94), FillRule::Winding, Transform::identity(), None);
    }
    let size = text_size(layout, 0.025);
    let pad = w * 0.05;
    let lines = font::wrap(text, w - pad * 2.0, size);
    let step = font::line_height(size) * 1.6;
    let top = y + (h - step * lines.len() as f32) / 2.0;
    let ink = paint(TEXT, 1.0);
    for (i, line) in lines.iter().enumerate() {
        font::draw_text_centered(pixmap, line, x + w / 2.0, top + i as f32 * step, size, &ink);
    }
}

/* ------------------------------ grapes --------------------------- */

fn grape_fill(cell: &GrapeCell) -> ([u8; 3], f32, f32) {
    // (color, alpha, radius scale)
    match cell.status {
        Some(GrapeStatus::Correct) => ([20, 83, 45], 0.6, 0.75),
        Some(GrapeStatus::Incorrect) => ([127, 29, 29], 0.6, 0.75),
        None if cell.highlighted => ([134, 239, 172], 1.0, 1.1),
        None => ([34, 197, 94], 1.0, 1.0),
    }
}

fn draw_grid(pixmap: &mut Pixmap, layout: &Layout, snap: &Snapshot, board: &GrapeBoard) {
    let dim = if campanadas::grid_dimmed(snap.phase) {
        0.2
    } else {
        1.0
    };
    let r = layout.grape_radius();
    let label = text_size(layout, 0.03);
    for cell in campanadas::grape_cells(board, snap.chime_count) {
        let (gx, gy) = layout.to_px(Layout::grape_anchor(cell.grape));
        let (color, alpha, scale) = grape_fill(&cell);
        if cell.highlighted {
            fill_circle(pixmap, gx, gy, r * 1.35, &paint([74, 222, 128], 0.35 * dim), Transform::identity());
        }
        fill_circle(pixmap, gx, gy, r * scale, &paint(color, alpha * dim), Transform::identity());
        let text = cell.grape.to_string();
        let ink = if cell.status.is_some() {
            [107, 114, 128]
        } else {
            [5, 46, 22]
        };
        let y = gy - font::line_height(label) / 2.0;
        font::draw_text_centered(pixmap, &text, gx, y, label, &paint(ink, dim));
    }
}

fn draw_flying(pixmap: &mut Pixmap, layout: &Layout, stage: &Stage, now: Instant) {
    let r = layout.grape_radius();
    for grape in stage.flying_grapes() {
        let (x, y) = layout.to_px(grape.position(now));
        fill_circle(pixmap, x, y, r, &paint([34, 197, 94], grape.alpha(now)), Transform::identity());
    }
}

fn draw_confetti(pixmap: &mut Pixmap, layout: &Layout, particles: &[Particle]) {
    let size = (layout.unit() * 0.008).max(2.0);
    for p in particles {
        let (x, y) = layout.to_px(p.pos);
        if let Some(rect) = Rect::from_xywh(x, y, size, size * 1.6) {
            pixmap.fill_rect(rect, &paint(p.color, p.alpha()), Transform::identity(), None);
        }
    }
}

/// The face puffs up with each bell rung, whether or not the grape was eaten.
fn face_for(frame: &Frame) -> FaceView {
    face::face_view(
        frame.snap.chime_count,
        frame.stage.is_mouth_open(),
        frame.snap.phase == Phase::Celebration,
    )
}

pub fn render(pixmap: &mut Pixmap, layout: &Layout, frame: &Frame) {
    pixmap.fill(Color::from_rgba8(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], 255));

    draw_clock(pixmap, layout, frame.snap);
    if face::face_visible(frame.snap.phase) {
        draw_face(pixmap, layout, &face_for(frame));
    }
    draw_labels(pixmap, layout, frame.snap, frame.year);
    draw_grid(pixmap, layout, frame.snap, frame.board);
    draw_flying(pixmap, layout, frame.stage, frame.now);
    if let Some(overlay) = frame.stage.overlay() {
        draw_overlay(pixmap, layout, &overlay.text);
    }
    draw_confetti(pixmap, layout, frame.confetti);
}

/// Packs an opaque pixmap into softbuffer's `0RGB` words.
pub fn copy_to_buffer(pixmap: &Pixmap, buffer: &mut [u32]) {
    for (dst, px) in buffer.iter_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *dst = (c.red() as u32) << 16 | (c.green() as u32) << 8 | c.blue() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::TimeState;
    use crate::core::timers::Timers;
    use crate::game::session::Alarm;

    fn snap(phase: Phase, time_diff: i64, chime_count: u32) -> Snapshot {
        Snapshot {
            phase,
            time: TimeState { hours: 23, minutes: 59, seconds: 40, milliseconds: 0 },
            time_diff,
            chime_count,
        }
    }

    fn px(pixmap: &Pixmap, at: (f32, f32)) -> [u8; 3] {
        let c = pixmap.pixel(at.0 as u32, at.1 as u32).map(|p| p.demultiply());
        c.map_or([0, 0, 0], |c| [c.red(), c.green(), c.blue()])
    }

    #[test]
    fn renders_every_phase() {
        let layout = Layout::new(180, 240);
        let Some(mut pixmap) = Pixmap::new(180, 240) else { panic!("pixmap") };
        let board = GrapeBoard::default();
        let mut stage = Stage::new();
        let mut timers: Timers<Alarm> = Timers::new();
        let now = Instant::now();
        stage.launch_grape(3, &layout, now, &mut timers);
        stage.show_message("¡Aún no ansioso!", std::time::Duration::from_secs(3), now, &mut timers);
        for phase in Phase::ALL {
            let s = snap(phase, 1_000, 1);
            let frame = Frame { snap: &s, board: &board, stage: &stage, confetti: &[], year: 2027, now };
            render(&mut pixmap, &layout, &frame);
        }
        let mut words = vec![0u32; 180 * 240];
        copy_to_buffer(&pixmap, &mut words);
        assert_eq!(words[0], (BACKGROUND[0] as u32) << 16 | (BACKGROUND[1] as u32) << 8 | BACKGROUND[2] as u32);
    }

    #[test]
    fn cheeks_follow_the_bells_not_the_taps() {
        let board = GrapeBoard::default();
        let stage = Stage::new();
        let s = snap(Phase::Chimes, -16_000, 6);
        let frame = Frame { snap: &s, board: &board, stage: &stage, confetti: &[], year: 2027, now: Instant::now() };
        assert_eq!(board.eaten_count(), 0);
        assert_eq!(face_for(&frame), face::face_view(6, false, false));
        assert!(face_for(&frame).cheek_scale > 1.0);
    }

    #[test]
    fn target_grape_is_brighter_than_the_rest() {
        let layout = Layout::new(360, 480);
        let Some(mut pixmap) = Pixmap::new(360, 480) else { panic!("pixmap") };
        let board = GrapeBoard::default();
        let stage = Stage::new();
        let s = snap(Phase::Chimes, -3_100, 2);
        let frame = Frame { snap: &s, board: &board, stage: &stage, confetti: &[], year: 2027, now: Instant::now() };
        render(&mut pixmap, &layout, &frame);

        // Sample near the rim, away from the number label.
        let r = layout.grape_radius() * 0.8;
        let rim = |g: u8| {
            let (x, y) = layout.to_px(Layout::grape_anchor(g));
            (x - r, y)
        };
        assert_eq!(px(&pixmap, rim(2)), [134, 239, 172]);
        assert_eq!(px(&pixmap, rim(5)), [34, 197, 94]);
    }
}
