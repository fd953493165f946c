pub mod field;
pub mod labels;

use serde::Serialize;

use crate::pbp::PlayRecord;
use field::*;
use labels::{down_label, play_label, tooltip};

/// Plays of one game that belong to a drive and have a play type, in game
/// order, with missing yard lines back-filled from the next play.
pub fn game_plays(season: &[PlayRecord], game_id: &str) -> Vec<PlayRecord> {
    let mut plays: Vec<PlayRecord> = season
        .iter()
        .filter(|p| p.game_id == game_id && p.drive.is_some() && p.play_type.is_some())
        .cloned()
        .collect();

    let mut next_yrdln: Option<String> = None;
    for play in plays.iter_mut().rev() {
        match &play.yrdln {
            Some(y) => next_yrdln = Some(y.clone()),
            None => play.yrdln = next_yrdln.clone(),
        }
    }
    plays
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveSummary {
    /// 1-based position of the drive within the game
    pub number: usize,
    /// nflverse drive id
    pub drive: u32,
    pub posteam: Option<String>,
    pub qtr: Option<u8>,
    pub time: Option<String>,
    pub label: String,
}

fn drive_ids(plays: &[PlayRecord]) -> Vec<u32> {
    let mut ids: Vec<u32> = plays.iter().filter_map(|p| p.drive).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Drives of a game, labelled "(Q1 15:00) Drive 1 (KC)".
pub fn list_drives(plays: &[PlayRecord]) -> Vec<DriveSummary> {
    drive_ids(plays)
        .into_iter()
        .enumerate()
        .filter_map(|(i, drive)| {
            let first = plays.iter().find(|p| p.drive == Some(drive))?;
            let qtr = first.qtr;
            let time = first.time.clone();
            let posteam = first.posteam.clone();
            let label = format!(
                "(Q{} {}) Drive {} ({})",
                qtr.map_or_else(|| "?".to_string(), |q| q.to_string()),
                time.as_deref().unwrap_or(""),
                i + 1,
                posteam.as_deref().unwrap_or("?")
            );
            Some(DriveSummary {
                number: i + 1,
                drive,
                posteam,
                qtr,
                time,
                label,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlay {
    pub play_id: Option<i64>,
    /// `None` when the yard line cannot be parsed
    pub start_x: Option<f64>,
    pub end_x: Option<f64>,
    pub y: f64,
    pub down_label: String,
    pub play_label: String,
    pub tooltip: String,
    /// Dashed gain line width; 0 hides it for plays that did not count
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndZone {
    pub team: String,
    pub x_min: f64,
    pub x_max: f64,
    pub label_x: f64,
    pub label_y: f64,
    /// Degrees of rotation for the team name
    pub text_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveChart {
    pub game_id: String,
    pub title: String,
    pub home_team: String,
    pub away_team: String,
    pub posteam: Option<String>,
    pub width: f64,
    pub height: f64,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub plays: Vec<ChartPlay>,
    pub yard_numbers: Vec<YardNumber>,
    /// y positions of the bottom and top rows of yard numbers
    pub number_rows: [f64; 2],
    /// x positions of the 10-yard lines, drawn from `grid_y[0]` to `grid_y[1]`
    pub grid_x: Vec<f64>,
    pub grid_y: [f64; 2],
    pub end_zones: Vec<EndZone>,
}

/// Lay out the `number`-th drive (1-based) of a game onto the field.
pub fn build_drive_chart(plays: &[PlayRecord], number: usize) -> Option<DriveChart> {
    let summary = list_drives(plays).into_iter().find(|d| d.number == number)?;
    let drive_plays: Vec<&PlayRecord> = plays.iter().filter(|p| p.drive == Some(summary.drive)).collect();
    let first = drive_plays.first()?;
    let home_team = first.home_team.clone().unwrap_or_default();
    let away_team = first.away_team.clone().unwrap_or_default();

    // Row i of n sits at PLAY_HEIGHT * (n - i + 1); the extra row at the
    // bottom leaves room for the yard numbers.
    let n = drive_plays.len();
    let row_y = |i: usize| PLAY_HEIGHT * (n - i + 1) as f64;
    let top = row_y(0);
    let bottom = row_y(n);

    let chart_plays = drive_plays
        .iter()
        .enumerate()
        .map(|(i, play)| {
            let start = play
                .yrdln
                .as_deref()
                .and_then(|y| yrdln_to_numeric(y, &home_team))
                .map(|yards| yards as f64 + END_ZONE_WIDTH);
            let sign = direction_sign(play.posteam_type.as_deref()) as f64;
            let end = start.zip(play.yards_gained).map(|(s, g)| s + sign * g as f64);
            ChartPlay {
                play_id: play.play_id,
                start_x: start,
                end_x: end,
                y: row_y(i),
                down_label: down_label(play),
                play_label: play_label(play),
                tooltip: tooltip(play, &home_team, &away_team),
                line_width: if play.play_type.as_deref() == Some("no_play") {
                    0.0
                } else {
                    2.0
                },
            }
        })
        .collect();

    let label_y = ((top + bottom + DRIVE_PADDING * 0.75) / 2.0).max(2.0 * PLAY_HEIGHT);
    let end_zones = vec![
        EndZone {
            team: home_team.clone(),
            x_min: X_HOME_ENDZONE,
            x_max: X_HOME_ENDZONE + END_ZONE_WIDTH,
            label_x: X_HOME_ENDZONE + END_ZONE_WIDTH / 2.0,
            label_y,
            text_angle: 90.0,
        },
        EndZone {
            team: away_team.clone(),
            x_min: X_AWAY_GOAL_LINE,
            x_max: X_AWAY_ENDZONE,
            label_x: X_AWAY_GOAL_LINE + END_ZONE_WIDTH / 2.0,
            label_y,
            text_angle: 270.0,
        },
    ];

    let grid_x = (0..9).map(|i| X_HOME_10YD + i as f64 * X_NUMBER_SPACING).collect();

    Some(DriveChart {
        game_id: first.game_id.clone(),
        title: format!(
            "Drive #{}: {}, Q{} {}",
            summary.number,
            summary.posteam.as_deref().unwrap_or("?"),
            summary.qtr.map_or_else(|| "?".to_string(), |q| q.to_string()),
            summary.time.as_deref().unwrap_or("")
        ),
        home_team,
        away_team,
        posteam: summary.posteam,
        width: X_AWAY_ENDZONE * DRAW_SCALE,
        height: (n + 1).max(6) as f64 * PLAY_HEIGHT * DRAW_SCALE,
        x_range: [X_HOME_ENDZONE, X_AWAY_ENDZONE],
        y_range: [bottom, top + DRIVE_PADDING / 2.0],
        plays: chart_plays,
        yard_numbers: yard_numbers(),
        number_rows: [bottom + TEXT_MARGIN, top + DRIVE_PADDING / 2.0 - TEXT_MARGIN],
        grid_x,
        grid_y: [top + DRIVE_PADDING, bottom],
        end_zones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(drive: Option<u32>, play_type: Option<&str>, yrdln: Option<&str>, gain: i32, posteam_type: &str) -> PlayRecord {
        PlayRecord {
            game_id: "2023_01_DET_KC".into(),
            home_team: Some("KC".into()),
            away_team: Some("DET".into()),
            drive,
            qtr: Some(1),
            time: Some("15:00".into()),
            down: Some(1),
            ydstogo: Some(10),
            yrdln: yrdln.map(String::from),
            posteam: Some(if posteam_type == "home" { "KC" } else { "DET" }.into()),
            posteam_type: Some(posteam_type.into()),
            play_type: play_type.map(String::from),
            yards_gained: Some(gain),
            ..Default::default()
        }
    }

    fn season() -> Vec<PlayRecord> {
        vec![
            play(None, None, Some("KC 35"), 0, "away"),
            play(Some(1), Some("run"), Some("DET 25"), 4, "away"),
            play(Some(1), Some("pass"), None, -6, "away"),
            play(Some(1), Some("punt"), Some("DET 23"), 45, "away"),
            play(Some(2), Some("run"), Some("KC 32"), 8, "home"),
            play(Some(2), Some("no_play"), Some("KC 40"), 0, "home"),
        ]
    }

    #[test]
    fn test_game_plays_filters_and_backfills() {
        let plays = game_plays(&season(), "2023_01_DET_KC");
        assert_eq!(plays.len(), 5);
        assert_eq!(plays[1].yrdln.as_deref(), Some("DET 23"));
        assert!(game_plays(&season(), "other").is_empty());
    }

    #[test]
    fn test_list_drives() {
        let drives = list_drives(&game_plays(&season(), "2023_01_DET_KC"));
        let labels: Vec<&str> = drives.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["(Q1 15:00) Drive 1 (DET)", "(Q1 15:00) Drive 2 (KC)"]);
    }

    #[test]
    fn test_chart_coordinates_for_away_drive() {
        let plays = game_plays(&season(), "2023_01_DET_KC");
        let chart = build_drive_chart(&plays, 1).unwrap();

        // three plays: rows at 48, 36, 24; bottom row 12
        let ys: Vec<f64> = chart.plays.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![48.0, 36.0, 24.0]);
        assert_eq!(chart.y_range, [12.0, 58.0]);

        // DET 25 with KC at home is 75 yards from the KC goal line, +10 end zone
        assert_eq!(chart.plays[0].start_x, Some(85.0));
        assert_eq!(chart.plays[0].end_x, Some(81.0));
        // loss of 6 moves the away offense to the right
        assert_eq!(chart.plays[1].end_x, Some(93.0));

        assert_eq!(chart.width, 1200.0);
        assert_eq!(chart.height, 6.0 * 12.0 * 10.0);
        assert_eq!(chart.end_zones[0].team, "KC");
        assert_eq!(chart.end_zones[1].x_min, 110.0);
        assert_eq!(chart.grid_x.len(), 9);
    }

    #[test]
    fn test_no_play_hides_gain_line() {
        let plays = game_plays(&season(), "2023_01_DET_KC");
        let chart = build_drive_chart(&plays, 2).unwrap();
        assert_eq!(chart.plays[0].start_x, Some(42.0));
        assert_eq!(chart.plays[0].end_x, Some(50.0));
        assert_eq!(chart.plays[1].line_width, 0.0);
        assert_eq!(chart.title, "Drive #2: KC, Q1 15:00");
    }

    #[test]
    fn test_unknown_drive_number() {
        let plays = game_plays(&season(), "2023_01_DET_KC");
        assert!(build_drive_chart(&plays, 3).is_none());
        assert!(build_drive_chart(&plays, 0).is_none());
    }
}
