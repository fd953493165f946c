pub mod clock;
pub mod deficit;
pub mod models;
pub mod output;
pub mod season;

pub use clock::{format_game_time, GameClock};
pub use models::ComebackRow;
pub use output::{load_comebacks, save_comebacks, COMEBACKS_FILE};
pub use season::extract_season;

use anyhow::{Context, Result};
use std::ops::RangeInclusive;
use tracing::info;

use crate::pbp::SeasonSource;

/// Extract every season in `seasons` from `source` and concatenate the rows
/// year by year. A season that cannot be loaded aborts the run.
pub async fn extract_seasons(
    source: &dyn SeasonSource,
    seasons: RangeInclusive<u16>,
    clock: GameClock,
) -> Result<Vec<ComebackRow>> {
    info!(
        "Reading data from {} to {} via {}",
        seasons.start(),
        seasons.end(),
        source.name()
    );

    let mut rows = Vec::new();
    let mut skipped = 0;
    for season in seasons {
        info!("Processing {} play-by-play data...", season);
        let plays = source
            .load_season(season)
            .await
            .with_context(|| format!("Failed to load season {}", season))?;
        let report = tokio::task::spawn_blocking(move || extract_season(season, plays, &clock))
            .await
            .context("Extraction task panicked")?;
        skipped += report.skipped.len();
        rows.extend(report.rows);
    }

    info!("Extracted {} checkpoints ({} games skipped)", rows.len(), skipped);
    Ok(rows)
}
