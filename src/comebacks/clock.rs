//! Game clock arithmetic.
//!
//! nflverse reports the clock as "MM:SS" remaining in the current period.
//! The extractor converts that into seconds elapsed since kickoff so that
//! deficits from different periods share one axis.

/// Length of a regulation period in seconds.
pub const PERIOD_SECONDS: u32 = 15 * 60;

/// Number of regulation periods.
pub const REGULATION_PERIODS: u8 = 4;

/// Period lengths used for elapsed-time computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    pub period_seconds: u32,
    /// Length of each overtime period; equals `period_seconds` unless configured.
    pub overtime_period_seconds: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        GameClock {
            period_seconds: PERIOD_SECONDS,
            overtime_period_seconds: PERIOD_SECONDS,
        }
    }
}

impl GameClock {
    pub fn with_overtime(overtime_period_seconds: Option<u32>) -> Self {
        let base = GameClock::default();
        GameClock {
            overtime_period_seconds: overtime_period_seconds.unwrap_or(base.period_seconds),
            ..base
        }
    }

    /// Length of regulation, `None` if it does not fit in `u32`.
    pub fn regulation_seconds(&self) -> Option<u32> {
        self.period_seconds.checked_mul(REGULATION_PERIODS as u32)
    }

    /// Seconds elapsed since kickoff at `clock` remaining in `period`.
    ///
    /// Returns `None` for a malformed clock string, a zero period, a
    /// remaining time longer than the period itself, or an elapsed time
    /// that does not fit in `u32`.
    pub fn elapsed_seconds(&self, period: u8, clock: &str) -> Option<u32> {
        if period == 0 {
            return None;
        }
        let remaining = parse_clock(clock)?;
        if period <= REGULATION_PERIODS {
            if remaining > self.period_seconds {
                return None;
            }
            (period as u32 - 1)
                .checked_mul(self.period_seconds)?
                .checked_add(self.period_seconds - remaining)
        } else {
            let ot = self.overtime_period_seconds;
            if remaining > ot {
                return None;
            }
            let prior_ot = (period - REGULATION_PERIODS - 1) as u32;
            prior_ot
                .checked_mul(ot)?
                .checked_add(self.regulation_seconds()?)?
                .checked_add(ot - remaining)
        }
    }
}

/// Parse "MM:SS" into seconds.
pub fn parse_clock(clock: &str) -> Option<u32> {
    let (mm, ss) = clock.trim().split_once(':')?;
    let minutes: u32 = mm.parse().ok()?;
    let seconds: u32 = ss.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Caption for an elapsed game time, e.g. "Q2 7:30" or "End Reg.".
pub fn format_game_time(elapsed: u32) -> String {
    if elapsed >= PERIOD_SECONDS * REGULATION_PERIODS as u32 {
        return "End Reg.".to_string();
    }
    let quarter = elapsed / PERIOD_SECONDS + 1;
    let remaining = PERIOD_SECONDS - elapsed % PERIOD_SECONDS;
    format!("Q{} {}:{:02}", quarter, remaining / 60, remaining % 60)
}
