use chrono::{DateTime, Local, LocalResult, NaiveDate, TimeZone, Timelike};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock display value, recomputed on every sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeState {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl TimeState {
    /// Local time of day for an epoch-millisecond instant.
    pub fn from_epoch_ms(ms: i64) -> Self {
        match DateTime::from_timestamp_millis(ms) {
            Some(utc) => {
                let local = utc.with_timezone(&Local);
                Self {
                    hours: local.hour(),
                    minutes: local.minute(),
                    seconds: local.second(),
                    milliseconds: local.timestamp_subsec_millis().min(999),
                }
            }
            None => Self::default(),
        }
    }
}

pub trait Clock {
    /// Milliseconds since the Unix epoch, with any rehearsal offset applied.
    fn now_ms(&self) -> i64;
    fn offset_ms(&self) -> i64;
    /// Takes effect on the next reading.
    fn set_offset_ms(&mut self, offset_ms: i64);

    /// Shifts the clock so that `target_ms` is `lead_ms` away from now.
    fn rehearse(&mut self, target_ms: i64, lead_ms: i64) {
        let real_now = self.now_ms() - self.offset_ms();
        self.set_offset_ms(target_ms - lead_ms - real_now);
    }
}

/// The real clock plus a signed offset for rehearsing the sequence.
#[derive(Debug, Default)]
pub struct SystemClock {
    offset_ms: i64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { offset_ms: 0 }
    }

    pub fn real_now_ms() -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Self::real_now_ms() + self.offset_ms
    }

    fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    fn set_offset_ms(&mut self, offset_ms: i64) {
        self.offset_ms = offset_ms;
    }
}

/// Local midnight opening the given year, as epoch milliseconds.
///
/// Returns `None` only for years chrono cannot represent.
pub fn new_year_target_ms(year: i32) -> Option<i64> {
    let naive = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let local = match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Midnight skipped by a DST jump: fall back to the UTC reading of the same wall time.
        LocalResult::None => return Some(naive.and_utc().timestamp_millis()),
    };
    Some(local.timestamp_millis())
}
