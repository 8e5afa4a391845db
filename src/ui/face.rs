use crate::config::CHIME_COUNT;
use crate::core::clock::TimeState;
use crate::game::phase::Phase;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mouth {
    /// Wide open while a grape goes in.
    Open,
    /// Heart-shaped kiss once the year has changed.
    Kiss,
    /// Closed, shrinking as the cheeks fill up.
    Stuffed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Eyes {
    Squeezed,
    Happy,
    Normal,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceView {
    pub cheek_scale: f32,
    pub mouth: Mouth,
    pub mouth_scale: f32,
    pub eyes: Eyes,
    /// Upward shift of the eyebrows in face units (face is 200 wide).
    pub brow_lift: f32,
}

pub fn face_visible(phase: Phase) -> bool {
    matches!(phase, Phase::Chimes | Phase::Celebration)
}

pub fn face_view(chime_count: u32, eating: bool, celebrating: bool) -> FaceView {
    let count = if celebrating {
        0.0
    } else {
        chime_count.min(CHIME_COUNT) as f32
    };
    let (mouth, mouth_scale) = if celebrating {
        (Mouth::Kiss, 1.2)
    } else if eating {
        (Mouth::Open, 1.5)
    } else {
        (Mouth::Stuffed, (1.0 - count * 0.05).max(0.5))
    };
    let eyes = if eating {
        Eyes::Squeezed
    } else if celebrating {
        Eyes::Happy
    } else {
        Eyes::Normal
    };
    FaceView { cheek_scale: 1.0 + count * 0.08, mouth, mouth_scale, eyes, brow_lift: count * 2.0 }
}

/// Hand angles in degrees, clockwise from twelve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandAngles {
    pub hours: f32,
    pub minutes: f32,
    pub seconds: f32,
}

pub fn hand_angles(t: &TimeState) -> HandAngles {
    let (h, m, s) = (t.hours as f32, t.minutes as f32, t.seconds as f32);
    HandAngles {
        seconds: s / 60.0 * 360.0,
        minutes: (m + s / 60.0) / 60.0 * 360.0,
        hours: ((h % 12.0) + m / 60.0) / 12.0 * 360.0,
    }
}
