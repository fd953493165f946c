use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One deficit checkpoint, flattened with its game metadata.
///
/// Passthrough fields describe the checkpoint's own scoring play; the
/// `deficit_end*` fields describe the later scoring play that reduced the
/// deficit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComebackRow {
    /// Season the game belongs to
    pub year: u16,
    pub game_id: String,
    pub play_id: Option<i64>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    /// Team abbreviation of the eventual winner
    pub winner_team: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub week: Option<u32>,
    /// "REG" | "POST"
    pub season_type: Option<String>,
    pub drive: Option<u32>,
    pub qtr: Option<u8>,
    pub down: Option<u8>,
    pub ydstogo: Option<i32>,
    pub yrdln: Option<String>,
    pub desc: Option<String>,
    pub time: Option<String>,
    pub game_seconds_remaining: Option<f64>,
    pub total_home_score: i32,
    pub total_away_score: i32,
    /// Final home score
    pub home_score: i32,
    /// Final away score
    pub away_score: i32,
    /// Winner's pre-play win probability at the checkpoint play
    pub winner_wp: Option<f64>,
    /// Worst deficit still ahead of the winner, clamped to ≥ 0
    pub max_future_deficit: i32,
    /// Clock ("MM:SS") of the scoring play that ended the deficit
    pub deficit_end: Option<String>,
    pub deficit_end_qtr: Option<u8>,
    /// Seconds since kickoff at `deficit_end`
    pub deficit_end_seconds: Option<u32>,
}

impl ComebackRow {
    pub fn is_regular_season(&self) -> bool {
        self.season_type.as_deref() == Some("REG")
    }
}
