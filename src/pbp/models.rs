use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// One row of an nflverse play-by-play season table.
///
/// Only the columns used by the comeback extractor and the drive chart are
/// read; every other column in the file is ignored. Blank and `NA` cells
/// deserialize to `None`, as do numeric cells that fail to parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayRecord {
    pub game_id: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub play_id: Option<i64>,
    #[serde(default, deserialize_with = "na_string")]
    pub home_team: Option<String>,
    #[serde(default, deserialize_with = "na_string")]
    pub away_team: Option<String>,
    /// "REG" | "POST"
    #[serde(default, deserialize_with = "na_string")]
    pub season_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub week: Option<u32>,
    #[serde(default, deserialize_with = "na_date")]
    pub game_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub drive: Option<u32>,
    /// Period number, 1-indexed; 5+ is overtime
    #[serde(default, deserialize_with = "lenient_int")]
    pub qtr: Option<u8>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub down: Option<u8>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub ydstogo: Option<i32>,
    /// Line of scrimmage, e.g. "KC 25" or "50"
    #[serde(default, deserialize_with = "na_string")]
    pub yrdln: Option<String>,
    #[serde(default, deserialize_with = "na_string")]
    pub desc: Option<String>,
    /// Clock remaining in the period, "MM:SS"
    #[serde(default, deserialize_with = "na_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub game_seconds_remaining: Option<f64>,
    /// Running home score after the play
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_home_score: Option<i32>,
    /// Running away score after the play
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_away_score: Option<i32>,
    /// Final home score, repeated on every row of the game
    #[serde(default, deserialize_with = "lenient_int")]
    pub home_score: Option<i32>,
    /// Final away score, repeated on every row of the game
    #[serde(default, deserialize_with = "lenient_int")]
    pub away_score: Option<i32>,
    #[serde(default, deserialize_with = "na_string")]
    pub posteam: Option<String>,
    /// "home" | "away"
    #[serde(default, deserialize_with = "na_string")]
    pub posteam_type: Option<String>,
    /// e.g. "pass", "run", "punt", "field_goal", "no_play"
    #[serde(default, deserialize_with = "na_string")]
    pub play_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub yards_gained: Option<i32>,
    #[serde(default, deserialize_with = "na_string")]
    pub end_yard_line: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub penalty: bool,
    #[serde(default, deserialize_with = "flag")]
    pub touchdown: bool,
    #[serde(default, deserialize_with = "flag")]
    pub interception: bool,
    #[serde(default, deserialize_with = "flag")]
    pub fumble_lost: bool,
    #[serde(default, deserialize_with = "flag")]
    pub sack: bool,
    #[serde(default, deserialize_with = "flag")]
    pub safety: bool,
    /// Pre-play home win probability (0.0–1.0)
    #[serde(default, deserialize_with = "lenient_float")]
    pub home_wp: Option<f64>,
    /// Pre-play away win probability (0.0–1.0)
    #[serde(default, deserialize_with = "lenient_float")]
    pub away_wp: Option<f64>,
}

fn na_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "NA"))
}

fn na_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(na_string(d)?.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
}

fn lenient_int<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(na_string(d)?
        .and_then(|s| parse_int(&s))
        .and_then(|v| T::try_from(v).ok()))
}

fn lenient_float<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(na_string(d)?
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

fn flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(na_string(d)?.and_then(|s| parse_int(&s)).unwrap_or(0) != 0)
}

/// Parse an integer cell, accepting R-style "7.0" as well as "7".
fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Vec<PlayRecord> {
        csv::Reader::from_reader(data.as_bytes())
            .deserialize()
            .collect::<Result<Vec<PlayRecord>, _>>()
            .expect("rows should deserialize")
    }

    #[test]
    fn test_na_cells_become_none() {
        let rows = read(
            "game_id,play_id,qtr,down,time,total_home_score,home_wp,touchdown\n\
             2023_01_DET_KC,1,1,NA,15:00,0,NA,0\n",
        );
        let r = &rows[0];
        assert_eq!(r.play_id, Some(1));
        assert_eq!(r.qtr, Some(1));
        assert_eq!(r.down, None);
        assert_eq!(r.time.as_deref(), Some("15:00"));
        assert_eq!(r.total_home_score, Some(0));
        assert_eq!(r.home_wp, None);
        assert!(!r.touchdown);
    }

    #[test]
    fn test_r_style_floats_parse_as_ints() {
        let rows = read("game_id,play_id,total_home_score,touchdown\ng,36.0,7.0,1.0\n");
        assert_eq!(rows[0].play_id, Some(36));
        assert_eq!(rows[0].total_home_score, Some(7));
        assert!(rows[0].touchdown);
    }

    #[test]
    fn test_non_numeric_score_is_none() {
        let rows = read("game_id,total_home_score,total_away_score\ng,seven,3.5\n");
        assert_eq!(rows[0].total_home_score, None);
        assert_eq!(rows[0].total_away_score, None);
    }

    #[test]
    fn test_missing_columns_default() {
        let rows = read("game_id\n2023_01_DET_KC\n");
        assert_eq!(rows[0].game_id, "2023_01_DET_KC");
        assert_eq!(rows[0].home_score, None);
        assert_eq!(rows[0].game_date, None);
    }

    #[test]
    fn test_game_date_and_season_type() {
        let rows = read("game_id,game_date,season_type\ng,2024-01-14,POST\n");
        assert_eq!(
            rows[0].game_date,
            NaiveDate::from_ymd_opt(2024, 1, 14)
        );
        assert_eq!(rows[0].season_type.as_deref(), Some("POST"));
    }
}
