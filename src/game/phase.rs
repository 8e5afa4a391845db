use crate::config::{
    CARILLON_START_MS, CELEBRATION_START_MS, CHIME_COUNT, CHIME_INTERVAL_MS, GAP_START_MS,
    QUARTERS_START_MS,
};

/// The six stages of the night, in the order they happen.
///
/// The derived `Ord` follows declaration order, which the grape grid relies on
/// when it asks whether the chimes have started yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Countdown,
    Carillon,
    Quarters,
    Gap,
    Chimes,
    Celebration,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Countdown,
        Phase::Carillon,
        Phase::Quarters,
        Phase::Gap,
        Phase::Chimes,
        Phase::Celebration,
    ];
}

/// Maps `time_diff` (target minus now, in ms) to its phase. First match wins.
pub fn resolve(time_diff: i64) -> Phase {
    if time_diff > CARILLON_START_MS {
        Phase::Countdown
    } else if time_diff > QUARTERS_START_MS {
        Phase::Carillon
    } else if time_diff > GAP_START_MS {
        Phase::Quarters
    } else if time_diff > 0 {
        Phase::Gap
    } else if time_diff.unsigned_abs() < CELEBRATION_START_MS as u64 {
        Phase::Chimes
    } else {
        Phase::Celebration
    }
}

/// Zero-based index of the chime window that contains `ms_since_midnight`.
#[inline(always)]
pub fn chime_index(ms_since_midnight: u64) -> u32 {
    (ms_since_midnight / CHIME_INTERVAL_MS as u64).min(u32::MAX as u64) as u32
}

/// One-based chime number shown while chiming, clamped to the twelve bells.
#[inline(always)]
pub fn chime_number(ms_since_midnight: u64) -> u32 {
    (chime_index(ms_since_midnight) + 1).min(CHIME_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_moments() {
        assert_eq!(resolve(40_000), Phase::Countdown);
        assert_eq!(resolve(30_000), Phase::Carillon);
        assert_eq!(resolve(15_000), Phase::Quarters);
        assert_eq!(resolve(-1_500), Phase::Chimes);
        assert_eq!(resolve(-36_500), Phase::Celebration);
    }

    #[test]
    fn boundaries_belong_to_the_later_bucket_before_midnight() {
        assert_eq!(resolve(35_001), Phase::Countdown);
        assert_eq!(resolve(35_000), Phase::Carillon);
        assert_eq!(resolve(20_001), Phase::Carillon);
        assert_eq!(resolve(20_000), Phase::Quarters);
        assert_eq!(resolve(5_001), Phase::Quarters);
        assert_eq!(resolve(5_000), Phase::Gap);
        assert_eq!(resolve(1), Phase::Gap);
        assert_eq!(resolve(0), Phase::Chimes);
        assert_eq!(resolve(-35_999), Phase::Chimes);
        assert_eq!(resolve(-36_000), Phase::Celebration);
        assert_eq!(resolve(i64::MIN), Phase::Celebration);
        assert_eq!(resolve(i64::MAX), Phase::Countdown);
    }

    #[test]
    fn resolver_is_monotonic_step_function() {
        // Walking time forward never moves the phase backwards.
        let mut last = resolve(60_000);
        let mut diff = 60_000;
        while diff > -60_000 {
            let phase = resolve(diff);
            assert!(phase >= last, "{:?} after {:?} at {}", phase, last, diff);
            last = phase;
            diff -= 7;
        }
        assert_eq!(last, Phase::Celebration);
    }

    #[test]
    fn positive_diffs_never_reach_chimes() {
        for diff in [1, 2_500, 5_000, 19_999, 34_999, 1_000_000] {
            assert!(resolve(diff) < Phase::Chimes);
        }
    }

    #[test]
    fn phase_order_matches_declaration() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
        assert!(Phase::Gap < Phase::Chimes);
    }

    #[test]
    fn chime_numbers() {
        assert_eq!(chime_number(0), 1);
        assert_eq!(chime_number(1_500), 1);
        assert_eq!(chime_number(2_999), 1);
        assert_eq!(chime_number(3_000), 2);
        assert_eq!(chime_number(35_999), 12);
        assert_eq!(chime_number(90_000), 12);
        assert_eq!(chime_index(35_999), 11);
    }
}
