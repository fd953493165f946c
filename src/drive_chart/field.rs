//! Field geometry for drive charts.
//!
//! The x axis runs 0–120: the home end zone is [0, 10], the away end zone is
//! [110, 120], and a yard line `n` yards from the home goal line sits at
//! `n + END_ZONE_WIDTH`. The home team always drives left to right.

use serde::Serialize;

pub const DRAW_SCALE: f64 = 10.0;
pub const END_ZONE_WIDTH: f64 = 10.0;
pub const X_HOME_ENDZONE: f64 = 0.0;
pub const X_HOME_10YD: f64 = 20.0;
pub const X_AWAY_GOAL_LINE: f64 = 110.0;
pub const X_AWAY_ENDZONE: f64 = 120.0;
pub const X_NUMBER_SPACING: f64 = 10.0;

pub const PLAY_HEIGHT: f64 = 12.0;
pub const DRIVE_PADDING: f64 = 20.0;
pub const TEXT_MARGIN: f64 = 3.0;

/// Convert an nflverse yard line ("KC 25", "50") into yards from the home
/// goal line.
pub fn yrdln_to_numeric(yrdln: &str, home_team: &str) -> Option<i32> {
    let mut parts = yrdln.split_whitespace();
    let first = parts.next()?;
    match parts.next() {
        None => {
            let n: i32 = first.parse().ok()?;
            (n == 50).then_some(50)
        }
        Some(num) => {
            let n: i32 = num.parse().ok()?;
            if !(0..=50).contains(&n) || parts.next().is_some() {
                return None;
            }
            Some(if first == home_team { n } else { 100 - n })
        }
    }
}

/// Inverse of [`yrdln_to_numeric`].
pub fn numeric_to_yrdln(n: i32, home_team: &str, away_team: &str) -> String {
    match n.cmp(&50) {
        std::cmp::Ordering::Less => format!("{} {}", home_team, n),
        std::cmp::Ordering::Greater => format!("{} {}", away_team, 100 - n),
        std::cmp::Ordering::Equal => "50".to_string(),
    }
}

/// +1 when the home team has the ball (moving right), −1 otherwise.
pub fn direction_sign(posteam_type: Option<&str>) -> i32 {
    if posteam_type == Some("home") {
        1
    } else {
        -1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YardNumber {
    pub x: f64,
    pub label: String,
}

/// Painted yard numbers: 10, 20, 30, 40, 50, 40, 30, 20, 10.
pub fn yard_numbers() -> Vec<YardNumber> {
    (1..=9)
        .map(|i| {
            let yards = i * 10;
            let label = if yards <= 50 { yards } else { 100 - yards };
            YardNumber {
                x: X_HOME_10YD + (i - 1) as f64 * X_NUMBER_SPACING,
                label: label.to_string(),
            }
        })
        .collect()
}
