use crate::game::grapes::GRAPE_COUNT;

/// Anchors are fractions of the viewport so they survive resizes; sizes are
/// fractions of the shorter side.
const CLOCK_CENTER: (f32, f32) = (0.5, 0.36);
const CLOCK_RADIUS: f32 = 0.34;
const GRID_COLUMNS: usize = 6;
const GRID_TOP: f32 = 0.74;
const GRID_ROW_GAP: f32 = 0.09;
const GRID_LEFT: f32 = 0.15;
const GRID_COLUMN_GAP: f32 = 0.14;
const GRAPE_RADIUS: f32 = 0.045;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1) as f32, height: height.max(1) as f32 }
    }

    #[inline(always)]
    pub fn unit(&self) -> f32 {
        self.width.min(self.height)
    }

    #[inline(always)]
    pub fn to_px(&self, anchor: (f32, f32)) -> (f32, f32) {
        (anchor.0 * self.width, anchor.1 * self.height)
    }

    pub fn clock_center(&self) -> (f32, f32) {
        self.to_px(CLOCK_CENTER)
    }

    pub fn clock_radius(&self) -> f32 {
        CLOCK_RADIUS * self.unit()
    }

    /// Where the face's mouth sits, as a viewport fraction.
    pub fn mouth_anchor(&self) -> (f32, f32) {
        // Mouth is 40% of the radius below the center of the face.
        let dy = 0.4 * self.clock_radius() / self.height;
        (CLOCK_CENTER.0, CLOCK_CENTER.1 + dy)
    }

    /// Center of grape `grape` (1-based), as a viewport fraction.
    pub fn grape_anchor(grape: u8) -> (f32, f32) {
        let idx = (grape.clamp(1, GRAPE_COUNT as u8) - 1) as usize;
        let col = idx % GRID_COLUMNS;
        let row = idx / GRID_COLUMNS;
        (GRID_LEFT + col as f32 * GRID_COLUMN_GAP, GRID_TOP + row as f32 * GRID_ROW_GAP)
    }

    pub fn grape_radius(&self) -> f32 {
        GRAPE_RADIUS * self.unit()
    }

    /// Grape under a cursor position in pixels, if any.
    pub fn grape_at(&self, x: f32, y: f32) -> Option<u8> {
        let r = self.grape_radius() * 1.2;
        (1..=GRAPE_COUNT as u8).find(|g| {
            let (gx, gy) = self.to_px(Self::grape_anchor(*g));
            (gx - x).powi(2) + (gy - y).powi(2) <= r * r
        })
    }

    /// Rounded box for message overlays: (x, y, w, h) in pixels.
    pub fn overlay_rect(&self) -> (f32, f32, f32, f32) {
        let w = self.width * 0.8;
        let h = self.height * 0.16;
        ((self.width - w) / 2.0, self.height * 0.52, w, h)
    }

    pub fn overlay_at(&self, x: f32, y: f32) -> bool {
        let (ox, oy, w, h) = self.overlay_rect();
        x >= ox && x <= ox + w && y >= oy && y <= oy + h
    }
}
