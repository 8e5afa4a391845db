use chrono::{Datelike, Local};
use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

// Window
pub const WINDOW_TITLE: &str = "Campanadas";
pub const WINDOW_WIDTH: u32 = 720;
pub const WINDOW_HEIGHT: u32 = 960;

// Phase thresholds, in ms before the target instant
pub const CHIME_INTERVAL_MS: i64 = 3000;
pub const CHIME_COUNT: u32 = 12;
pub const CARILLON_START_MS: i64 = 35_000;
pub const QUARTERS_START_MS: i64 = 20_000;
pub const GAP_START_MS: i64 = 5_000;
pub const CELEBRATION_START_MS: i64 = CHIME_COUNT as i64 * CHIME_INTERVAL_MS;

// Los cuartos: four double chimes counted from the start of the phase
pub const QUARTERS_REFERENCE_MS: i64 = QUARTERS_START_MS;
pub const QUARTER_INTERVAL_MS: i64 = 3_500;
pub const QUARTER_COUNT: u32 = 4;

// Rehearsal lands this far before the target
pub const REHEARSAL_LEAD_MS: i64 = 40_000;

// Mouth / grapes
pub const MOUTH_OPEN_DURATION: Duration = Duration::from_millis(300);
pub const DEFAULT_TAP_WINDOW_MS: i64 = 300;
pub const FLYING_GRAPE_FLIGHT: Duration = Duration::from_millis(500);
pub const FLYING_GRAPE_FADE_DELAY: Duration = Duration::from_millis(20);
pub const FLYING_GRAPE_FADE: Duration = Duration::from_millis(200);

// Overlay messages
pub const EARLY_TAP_OVERLAY: Duration = Duration::from_millis(3000);
pub const INSTRUCTIONS_OVERLAY: Duration = Duration::from_millis(6000);
pub const VIBRATION_PATTERN_MS: [u32; 2] = [200, 200];

// Fireworks
pub const FIREWORKS_DURATION: Duration = Duration::from_millis(15_000);
pub const FIREWORKS_INTERVAL: Duration = Duration::from_millis(800);
pub const FIREWORKS_MAX_EXPLOSION_DELAY_MS: u64 = 100;
pub const FIREWORKS_COLORS: [[u8; 3]; 5] = [
    [0xFF, 0xD7, 0x00], // gold
    [0xFF, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00],
    [0x00, 0x00, 0xFF],
];

// Loops
pub const HEADLESS_TICK: Duration = Duration::from_millis(16);
pub const HEADLESS_STATUS_INTERVAL: Duration = Duration::from_secs(1);

// --- Runtime Options ---
const DEFAULT_CONFIG_PATH: &str = "campanadas.ini";
const SECTION: &str = "Options";

#[derive(Debug, Clone)]
pub struct Config {
    pub target_year: i32,
    pub tap_window_ms: i64,
    pub master_volume: f32,
    pub enable_audio: bool,
    pub vibration: bool,
    pub windowed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_year: Local::now().year() + 1,
            tap_window_ms: DEFAULT_TAP_WINDOW_MS,
            master_volume: 0.8,
            enable_audio: true,
            vibration: true,
            windowed: true,
        }
    }
}

static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

fn write_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, creating defaults at '{}'.", path.display());
    let defaults = Config::default();
    let mut conf = Ini::new();
    conf.set(SECTION, "TargetYear", Some(defaults.target_year.to_string()));
    conf.set(SECTION, "TapWindowMs", Some(defaults.tap_window_ms.to_string()));
    conf.set(SECTION, "MasterVolume", Some(format!("{:.2}", defaults.master_volume)));
    conf.set(SECTION, "EnableAudio", Some("1".to_string()));
    conf.set(SECTION, "Vibration", Some("1".to_string()));
    conf.set(SECTION, "Windowed", Some("1".to_string()));
    conf.write(path)
}

fn flag(conf: &Ini, key: &str, default: bool) -> bool {
    conf.get(SECTION, key)
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map_or(default, |v| v != 0)
}

/// Reads options from an already-loaded ini, falling back per key.
fn from_ini(conf: &Ini) -> Config {
    let default = Config::default();
    let target_year = conf
        .get(SECTION, "TargetYear")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(default.target_year);
    let tap_window_ms = conf
        .get(SECTION, "TapWindowMs")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|ms| *ms > 0 && *ms <= CHIME_INTERVAL_MS)
        .unwrap_or(default.tap_window_ms);
    let master_volume = conf
        .get(SECTION, "MasterVolume")
        .and_then(|v| v.trim().parse::<f32>().ok())
        .map_or(default.master_volume, |v| v.clamp(0.0, 1.0));

    Config {
        target_year,
        tap_window_ms,
        master_volume,
        enable_audio: flag(conf, "EnableAudio", default.enable_audio),
        vibration: flag(conf, "Vibration", default.vibration),
        windowed: flag(conf, "Windowed", default.windowed),
    }
}

pub fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Loads `path` into the global config, writing a default file first when missing.
pub fn load(path: &Path) {
    if !path.exists() {
        if let Err(e) = write_default_file(path) {
            warn!("Failed to create default config '{}': {}", path.display(), e);
            return;
        }
    }

    let mut conf = Ini::new();
    let loaded = match conf.load(path) {
        Ok(_) => from_ini(&conf),
        Err(e) => {
            warn!("Failed to load '{}' ({}), using defaults.", path.display(), e);
            Config::default()
        }
    };
    info!(
        "Config: target year {}, tap window {} ms, volume {:.2}, audio {}.",
        loaded.target_year, loaded.tap_window_ms, loaded.master_volume, loaded.enable_audio
    );
    match CONFIG.lock() {
        Ok(mut cfg) => *cfg = loaded,
        Err(poisoned) => *poisoned.into_inner() = loaded,
    }
}

/// Applies command-line overrides on top of the loaded file.
pub fn override_target_year(year: i32) {
    match CONFIG.lock() {
        Ok(mut cfg) => cfg.target_year = year,
        Err(poisoned) => poisoned.into_inner().target_year = year,
    }
}

/// Returns a copy of the current options.
pub fn get() -> Config {
    match CONFIG.lock() {
        Ok(cfg) => cfg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini(text: &str) -> Ini {
        let mut conf = Ini::new();
        conf.read(text.to_string()).unwrap();
        conf
    }

    #[test]
    fn reads_every_key() {
        let conf = ini(
            "[Options]\nTargetYear=2031\nTapWindowMs=450\nMasterVolume=0.25\nEnableAudio=0\nVibration=0\nWindowed=0\n",
        );
        let cfg = from_ini(&conf);
        assert_eq!(cfg.target_year, 2031);
        assert_eq!(cfg.tap_window_ms, 450);
        assert!((cfg.master_volume - 0.25).abs() < f32::EPSILON);
        assert!(!cfg.enable_audio);
        assert!(!cfg.vibration);
        assert!(!cfg.windowed);
    }

    #[test]
    fn bad_values_fall_back() {
        let conf = ini("[Options]\nTargetYear=soon\nTapWindowMs=9000\nMasterVolume=7\n");
        let cfg = from_ini(&conf);
        let default = Config::default();
        assert_eq!(cfg.target_year, default.target_year);
        assert_eq!(cfg.tap_window_ms, DEFAULT_TAP_WINDOW_MS);
        assert_eq!(cfg.master_volume, 1.0);
        assert!(cfg.enable_audio);
    }

    #[test]
    fn celebration_starts_after_twelve_chimes() {
        assert_eq!(CELEBRATION_START_MS, 36_000);
    }
}
