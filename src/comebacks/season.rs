use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::clock::GameClock;
use super::deficit::{extract_checkpoints, ScoringEvent};
use super::models::ComebackRow;
use crate::pbp::PlayRecord;

/// Data-quality failures that skip a single game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("game {game_id}: missing or non-numeric {column} at play {}", fmt_play_id(.play_id))]
    MissingScore {
        game_id: String,
        play_id: Option<i64>,
        column: &'static str,
    },
    #[error("game {game_id}: {column} out of range at play {}", fmt_play_id(.play_id))]
    ScoreOutOfRange {
        game_id: String,
        play_id: Option<i64>,
        column: &'static str,
    },
    #[error("game {game_id}: missing or non-numeric final score")]
    MissingFinalScore { game_id: String },
    #[error("game {game_id}: final score tied at {score}")]
    TiedFinal { game_id: String, score: i32 },
}

fn fmt_play_id(play_id: &Option<i64>) -> String {
    play_id.map_or_else(|| "?".to_string(), |id| id.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Home,
    Away,
}

/// Running scores of a play plus their sum. Scores are non-negative and
/// their sum fits in `i32`, so any difference of two of them does too.
fn running_total(game_id: &str, play: &PlayRecord) -> Result<(i32, i32, i32), ExtractError> {
    let missing = |column| ExtractError::MissingScore {
        game_id: game_id.to_string(),
        play_id: play.play_id,
        column,
    };
    let out_of_range = |column| ExtractError::ScoreOutOfRange {
        game_id: game_id.to_string(),
        play_id: play.play_id,
        column,
    };
    let home = play.total_home_score.ok_or_else(|| missing("total_home_score"))?;
    let away = play.total_away_score.ok_or_else(|| missing("total_away_score"))?;
    if home < 0 {
        return Err(out_of_range("total_home_score"));
    }
    if away < 0 {
        return Err(out_of_range("total_away_score"));
    }
    let total = home
        .checked_add(away)
        .ok_or_else(|| out_of_range("total_home_score + total_away_score"))?;
    Ok((home, away, total))
}

/// Indices of plays at which the combined running score strictly increased
/// versus the previous play. The first play is never a scoring event.
pub fn scoring_play_indices(game_id: &str, plays: &[PlayRecord]) -> Result<Vec<usize>, ExtractError> {
    let mut out = Vec::new();
    let mut prev_total: Option<i32> = None;
    for (i, play) in plays.iter().enumerate() {
        let (_, _, total) = running_total(game_id, play)?;
        if prev_total.is_some_and(|p| total > p) {
            out.push(i);
        }
        prev_total = Some(total);
    }
    Ok(out)
}

/// Extract the comeback checkpoints of one game whose plays are in
/// chronological order.
pub fn extract_game(
    year: u16,
    game_id: &str,
    plays: &[PlayRecord],
    clock: &GameClock,
) -> Result<Vec<ComebackRow>, ExtractError> {
    let Some(first) = plays.first() else {
        return Ok(vec![]);
    };
    let (Some(home_final), Some(away_final)) = (first.home_score, first.away_score) else {
        return Err(ExtractError::MissingFinalScore {
            game_id: game_id.to_string(),
        });
    };
    let winner = match home_final.cmp(&away_final) {
        std::cmp::Ordering::Greater => Side::Home,
        std::cmp::Ordering::Less => Side::Away,
        std::cmp::Ordering::Equal => {
            return Err(ExtractError::TiedFinal {
                game_id: game_id.to_string(),
                score: home_final,
            })
        }
    };

    let scoring = scoring_play_indices(game_id, plays)?;
    let events: Vec<ScoringEvent> = scoring
        .iter()
        .map(|&i| {
            let play = &plays[i];
            // Totals were validated by scoring_play_indices
            let home = play.total_home_score.unwrap_or_default();
            let away = play.total_away_score.unwrap_or_default();
            let (winner_score, loser_score) = match winner {
                Side::Home => (home, away),
                Side::Away => (away, home),
            };
            ScoringEvent {
                period: play.qtr,
                clock: play.time.clone(),
                winner_score,
                loser_score,
            }
        })
        .collect();

    let rows = extract_checkpoints(&events, clock)
        .into_iter()
        .map(|cp| {
            let play = &plays[scoring[cp.event_index]];
            let end = cp.end.as_ref();
            ComebackRow {
                year,
                game_id: game_id.to_string(),
                play_id: play.play_id,
                home_team: play.home_team.clone(),
                away_team: play.away_team.clone(),
                winner_team: match winner {
                    Side::Home => play.home_team.clone(),
                    Side::Away => play.away_team.clone(),
                },
                game_date: play.game_date,
                week: play.week,
                season_type: play.season_type.clone(),
                drive: play.drive,
                qtr: play.qtr,
                down: play.down,
                ydstogo: play.ydstogo,
                yrdln: play.yrdln.clone(),
                desc: play.desc.clone(),
                time: play.time.clone(),
                game_seconds_remaining: play.game_seconds_remaining,
                total_home_score: play.total_home_score.unwrap_or_default(),
                total_away_score: play.total_away_score.unwrap_or_default(),
                home_score: home_final,
                away_score: away_final,
                winner_wp: match winner {
                    Side::Home => play.home_wp,
                    Side::Away => play.away_wp,
                },
                max_future_deficit: cp.deficit_magnitude(),
                deficit_end: end.and_then(|e| e.clock.clone()),
                deficit_end_qtr: end.and_then(|e| e.period),
                deficit_end_seconds: end.and_then(|e| e.elapsed_seconds),
            }
        })
        .collect();
    Ok(rows)
}

/// Group plays by `game_id`, keeping each game's plays in input order.
pub fn group_by_game(plays: Vec<PlayRecord>) -> BTreeMap<String, Vec<PlayRecord>> {
    let mut games: BTreeMap<String, Vec<PlayRecord>> = BTreeMap::new();
    for play in plays {
        games.entry(play.game_id.clone()).or_default().push(play);
    }
    games
}

#[derive(Debug, Clone, Default)]
pub struct SeasonReport {
    pub season: u16,
    pub rows: Vec<ComebackRow>,
    pub games_processed: usize,
    pub games_tied: usize,
    pub skipped: Vec<ExtractError>,
}

/// Run extraction over one season's plays. Games with equal final scores are
/// left out; malformed games are logged and skipped.
pub fn extract_season(season: u16, plays: Vec<PlayRecord>, clock: &GameClock) -> SeasonReport {
    let mut report = SeasonReport {
        season,
        ..Default::default()
    };

    for (game_id, game_plays) in group_by_game(plays) {
        match extract_game(season, &game_id, &game_plays, clock) {
            Ok(rows) => {
                debug!("{}: {} checkpoint(s)", game_id, rows.len());
                report.games_processed += 1;
                report.rows.extend(rows);
            }
            Err(ExtractError::TiedFinal { .. }) => {
                debug!("{}: tied final score, excluded", game_id);
                report.games_tied += 1;
            }
            Err(e) => {
                warn!("Skipping game: {}", e);
                report.skipped.push(e);
            }
        }
    }

    info!(
        "Season {}: {} games, {} checkpoints, {} tied, {} skipped",
        report.season,
        report.games_processed,
        report.rows.len(),
        report.games_tied,
        report.skipped.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game_id: &str, play_id: i64, qtr: u8, time: &str, home: i32, away: i32, finals: (i32, i32)) -> PlayRecord {
        PlayRecord {
            game_id: game_id.to_string(),
            play_id: Some(play_id),
            home_team: Some("KC".into()),
            away_team: Some("BUF".into()),
            season_type: Some("REG".into()),
            qtr: Some(qtr),
            time: Some(time.to_string()),
            total_home_score: Some(home),
            total_away_score: Some(away),
            home_score: Some(finals.0),
            away_score: Some(finals.1),
            home_wp: Some(0.5),
            away_wp: Some(0.5),
            ..Default::default()
        }
    }

    /// Away team wins 24-21 after trailing 21-7.
    fn away_comeback(game_id: &str) -> Vec<PlayRecord> {
        let f = (21, 24);
        vec![
            play(game_id, 1, 1, "15:00", 0, 0, f),
            play(game_id, 10, 1, "8:12", 7, 0, f),
            play(game_id, 11, 1, "8:12", 7, 0, f),
            play(game_id, 30, 2, "11:40", 14, 0, f),
            play(game_id, 45, 2, "0:31", 14, 7, f),
            play(game_id, 60, 3, "6:02", 21, 7, f),
            play(game_id, 75, 4, "12:00", 21, 14, f),
            play(game_id, 90, 4, "4:45", 21, 21, f),
            play(game_id, 99, 4, "0:02", 21, 24, f),
        ]
    }

    #[test]
    fn test_scoring_play_detection() {
        let plays = away_comeback("g");
        assert_eq!(scoring_play_indices("g", &plays).unwrap(), vec![1, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_extract_away_comeback() {
        let rows = extract_game(2023, "g", &away_comeback("g"), &GameClock::default()).unwrap();
        // instant deficits: 7, 14, 7, 14, 7, 0, -3 -> suffix max 14,14,14,14,7,0,-3
        let summary: Vec<(Option<i64>, i32, Option<&str>, Option<u32>)> = rows
            .iter()
            .map(|r| (r.play_id, r.max_future_deficit, r.deficit_end.as_deref(), r.deficit_end_seconds))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some(10), 14, Some("12:00"), Some(2700 + 180)),
                (Some(75), 7, Some("4:45"), Some(2700 + 615)),
                (Some(90), 0, Some("0:02"), Some(2700 + 898)),
                (Some(99), 0, None, None),
            ]
        );
        assert_eq!(rows[0].winner_team.as_deref(), Some("BUF"));
        assert_eq!(rows[0].deficit_end_qtr, Some(4));
        assert_eq!((rows[0].home_score, rows[0].away_score), (21, 24));
    }

    #[test]
    fn test_missing_score_fails_game_with_id() {
        let mut plays = away_comeback("2023_05_BUF_KC");
        plays[4].total_away_score = None;
        let err = extract_game(2023, "2023_05_BUF_KC", &plays, &GameClock::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingScore {
                game_id: "2023_05_BUF_KC".into(),
                play_id: Some(45),
                column: "total_away_score",
            }
        );
        assert!(err.to_string().contains("2023_05_BUF_KC"));
        assert!(err.to_string().contains("45"));
    }

    #[test]
    fn test_missing_final_score() {
        let mut plays = away_comeback("g");
        plays[0].home_score = None;
        assert!(matches!(
            extract_game(2023, "g", &plays, &GameClock::default()),
            Err(ExtractError::MissingFinalScore { .. })
        ));
    }

    #[test]
    fn test_overflowing_scores_skip_only_that_game() {
        let f = (1, 0);
        let corrupt = vec![
            play("c", 1, 1, "15:00", 0, 0, f),
            play("c", 2, 1, "10:00", i32::MAX, 1, f),
        ];
        let negative = vec![
            play("n", 1, 1, "15:00", 0, 0, f),
            play("n", 2, 1, "10:00", 3, i32::MIN, f),
        ];
        let plays: Vec<PlayRecord> = away_comeback("a")
            .into_iter()
            .chain(corrupt)
            .chain(negative)
            .collect();

        let report = extract_season(2023, plays, &GameClock::default());
        assert_eq!(report.games_processed, 1);
        assert_eq!(
            report.skipped,
            vec![
                ExtractError::ScoreOutOfRange {
                    game_id: "c".into(),
                    play_id: Some(2),
                    column: "total_home_score + total_away_score",
                },
                ExtractError::ScoreOutOfRange {
                    game_id: "n".into(),
                    play_id: Some(2),
                    column: "total_away_score",
                },
            ]
        );
        assert!(report.rows.iter().all(|r| r.game_id == "a"));
    }

    #[test]
    fn test_game_without_scoring_plays() {
        let plays = vec![play("g", 1, 1, "15:00", 0, 0, (3, 0))];
        let rows = extract_game(2023, "g", &plays, &GameClock::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_season_skips_bad_and_tied_games() {
        let mut bad = away_comeback("b");
        bad[2].total_home_score = None;
        let tied = vec![
            play("t", 1, 1, "15:00", 0, 0, (10, 10)),
            play("t", 2, 2, "5:00", 10, 10, (10, 10)),
        ];
        let plays: Vec<PlayRecord> = away_comeback("a").into_iter().chain(bad).chain(tied).collect();

        let report = extract_season(2023, plays, &GameClock::default());
        assert_eq!(report.games_processed, 1);
        assert_eq!(report.games_tied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.rows.iter().all(|r| r.game_id == "a"));
    }

    #[test]
    fn test_partition_independence() {
        let clock = GameClock::default();
        let a = away_comeback("2023_01_A_B");
        let b: Vec<PlayRecord> = away_comeback("2023_01_C_D")
            .into_iter()
            .map(|mut p| {
                // flip the winner to the home side
                p.home_score = Some(30);
                p
            })
            .collect();

        let mut per_game = extract_game(2023, "2023_01_A_B", &a, &clock).unwrap();
        per_game.extend(extract_game(2023, "2023_01_C_D", &b, &clock).unwrap());

        // interleave the two games, preserving each game's own order
        let mut mixed = Vec::new();
        for (from_a, from_b) in a.iter().zip(b.iter()) {
            mixed.push(from_b.clone());
            mixed.push(from_a.clone());
        }
        let batch = extract_season(2023, mixed.clone(), &clock);
        assert_eq!(batch.rows, per_game);

        let again = extract_season(2023, mixed, &clock);
        assert_eq!(again.rows, batch.rows);
    }
}
