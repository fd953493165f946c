use super::field::{direction_sign, numeric_to_yrdln, yrdln_to_numeric};
use crate::pbp::PlayRecord;

const DOWNS: [&str; 4] = ["1st", "2nd", "3rd", "4th"];

/// "KC 25: 2nd & 7", or the play type for untimed downs such as kickoffs.
pub fn down_label(play: &PlayRecord) -> String {
    match play.down.filter(|d| (1..=4).contains(d)) {
        Some(down) => format!(
            "{}: {} & {}",
            play.yrdln.as_deref().unwrap_or("?"),
            DOWNS[down as usize - 1],
            play.ydstogo.unwrap_or_default()
        ),
        None => play.play_type.clone().unwrap_or_default(),
    }
}

fn play_type_text(play_type: &str) -> String {
    match play_type {
        "pass" => "Pass".to_string(),
        "run" => "Run".to_string(),
        "punt" => "Punt".to_string(),
        "field_goal" => "FG".to_string(),
        "extra_point" => "XP".to_string(),
        "kickoff" => "Kickoff".to_string(),
        "qb_kneel" => "Kneel".to_string(),
        "qb_spike" => "Spike".to_string(),
        "no_play" => "No play".to_string(),
        other => other.to_string(),
    }
}

/// Marker text for the end of a play, with result tags appended.
pub fn play_label(play: &PlayRecord) -> String {
    let mut label = play_type_text(play.play_type.as_deref().unwrap_or(""));
    let tags = [
        (play.touchdown, "TD"),
        (play.interception, "INT"),
        (play.fumble_lost, "FUM"),
        (play.sack, "SACK"),
        (play.safety, "SAFETY"),
        (play.penalty, "FLAG"),
    ];
    for (set, tag) in tags {
        if set {
            label.push(' ');
            label.push_str(tag);
        }
    }
    label
}

/// Multi-line hover text for a play.
pub fn tooltip(play: &PlayRecord, home_team: &str, away_team: &str) -> String {
    let qtr = play.qtr.map_or_else(|| "?".to_string(), |q| q.to_string());
    let time = play.time.as_deref().unwrap_or("");
    let start = play.yrdln.as_deref().unwrap_or("?");
    let desc = play.desc.as_deref().unwrap_or("");
    let header = format!("(Q{} {}) {}", qtr, time, start);

    let play_type = play.play_type.as_deref().unwrap_or("");
    if play_type == "no_play" {
        return format!("{}\n{}", header, desc);
    }
    let Some(gain) = play.yards_gained else {
        return format!("{}\n{}", header, desc);
    };

    let end = play.end_yard_line.clone().or_else(|| {
        let start_n = yrdln_to_numeric(start, home_team)?;
        let end_n = start_n + direction_sign(play.posteam_type.as_deref()) * gain;
        Some(numeric_to_yrdln(end_n, home_team, away_team))
    });

    format!(
        "{} ➤ {} [{:+} yds]\nPlay selection: {}\n{}",
        header,
        end.as_deref().unwrap_or("?"),
        gain,
        play_type,
        desc
    )
}
