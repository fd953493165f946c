//! Deficit extraction for a single completed game.
//!
//! Given the game's scoring events in chronological order, labelled from the
//! eventual winner's perspective, find the moments where the worst deficit
//! the winner still had to face dropped. Each such moment is a checkpoint:
//!
//! 1. `instant_deficit = loser_score - winner_score` per event.
//! 2. `max_future_deficit` is the suffix maximum of that series (one backward
//!    pass).
//! 3. An event is a checkpoint when its suffix maximum is strictly below the
//!    previous event's (one forward pass). The first event always qualifies.
//! 4. A checkpoint's deficit ends at the next checkpoint's scoring play; the
//!    last checkpoint has no end.

use super::clock::GameClock;

/// A play at which the combined score increased, seen from the winner's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringEvent {
    pub period: Option<u8>,
    /// Clock remaining in the period, "MM:SS"
    pub clock: Option<String>,
    pub winner_score: i32,
    pub loser_score: i32,
}

impl ScoringEvent {
    /// Points the winner trails by after this event (negative when leading).
    pub fn instant_deficit(&self) -> i32 {
        self.loser_score.saturating_sub(self.winner_score)
    }
}

/// The scoring play that reduced a checkpoint's deficit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeficitEnd {
    pub period: Option<u8>,
    pub clock: Option<String>,
    /// `None` when the period or clock is missing or malformed
    pub elapsed_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeficitCheckpoint {
    /// Index of the checkpoint's scoring event in the input sequence
    pub event_index: usize,
    /// Unclamped suffix maximum at this event
    pub max_future_deficit: i32,
    pub end: Option<DeficitEnd>,
}

impl DeficitCheckpoint {
    /// Reported deficit, clamped so a winner who was never behind reports 0.
    pub fn deficit_magnitude(&self) -> i32 {
        self.max_future_deficit.max(0)
    }
}

/// Right-to-left running maximum of the instant deficit.
pub fn max_future_deficits(events: &[ScoringEvent]) -> Vec<i32> {
    let mut out = vec![0; events.len()];
    let mut running = i32::MIN;
    for (i, ev) in events.iter().enumerate().rev() {
        running = running.max(ev.instant_deficit());
        out[i] = running;
    }
    out
}

/// Indices where the suffix maximum strictly drops versus the previous event.
pub fn strict_drops(suffix_max: &[i32]) -> Vec<usize> {
    let mut prev: Option<i32> = None;
    let mut out = Vec::new();
    for (i, &value) in suffix_max.iter().enumerate() {
        if prev.map_or(true, |p| value < p) {
            out.push(i);
        }
        prev = Some(value);
    }
    out
}

/// Extract the ordered deficit checkpoints of one game.
///
/// An empty event sequence yields no checkpoints.
pub fn extract_checkpoints(events: &[ScoringEvent], clock: &GameClock) -> Vec<DeficitCheckpoint> {
    let suffix_max = max_future_deficits(events);
    let selected = strict_drops(&suffix_max);

    selected
        .iter()
        .enumerate()
        .map(|(k, &idx)| {
            let end = selected.get(k + 1).map(|&next| {
                let ev = &events[next];
                let elapsed_seconds = match (ev.period, ev.clock.as_deref()) {
                    (Some(p), Some(c)) => clock.elapsed_seconds(p, c),
                    _ => None,
                };
                DeficitEnd {
                    period: ev.period,
                    clock: ev.clock.clone(),
                    elapsed_seconds,
                }
            });
            DeficitCheckpoint {
                event_index: idx,
                max_future_deficit: suffix_max[idx],
                end,
            }
        })
        .collect()
}
